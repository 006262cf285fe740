//! Reconciliation of external iCal feeds into draft reservations.

use std::collections::HashSet;
use std::sync::Mutex;

use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::config::StayConfig;
use crate::date_range::{DateRange, local_availability};
use crate::error::{StayResult, SyncError};
use crate::event::{CalendarEvent, DEFAULT_RESERVATION_KEYWORDS};
use crate::ics::parse_feed;
use crate::property::{FeedLink, Property};
use crate::reservation::{AvailabilityReport, NewReservation, Reservation};
use crate::sync::backend::ReservationBackend;
use crate::sync::report::SyncResult;

#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Upper bound on properties processed at the same time. Feeds of one
    /// property always run one after another.
    pub concurrency: usize,
    pub keywords: Vec<String>,
    /// Evaluate availability against the known reservations when the
    /// availability endpoint is unreachable.
    pub fallback_to_local: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        SyncOptions {
            concurrency: 4,
            keywords: DEFAULT_RESERVATION_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect(),
            fallback_to_local: true,
        }
    }
}

impl From<&StayConfig> for SyncOptions {
    fn from(config: &StayConfig) -> Self {
        SyncOptions {
            concurrency: config.concurrency.max(1),
            keywords: config.reservation_keywords.clone(),
            fallback_to_local: config.fallback_to_local,
        }
    }
}

/// What happened to one reservation-like event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EventOutcome {
    Created,
    /// A reservation with this UID already exists.
    Existing,
    /// Another feed produced the same UID earlier in this run.
    RepeatedInRun,
    /// The dates collide with another reservation.
    Unavailable,
}

/// Shared by every feed of a run.
struct RunState {
    known: Vec<Reservation>,
    known_uids: HashSet<String>,
    claimed_uids: Mutex<HashSet<String>>,
    /// Drafts created so far in this run.
    created: Mutex<Vec<Reservation>>,
}

impl RunState {
    fn new(known: Vec<Reservation>) -> Self {
        let known_uids = known
            .iter()
            .filter_map(|r| r.calendar_event_uid.clone())
            .collect();

        RunState {
            known,
            known_uids,
            claimed_uids: Mutex::new(HashSet::new()),
            created: Mutex::new(Vec::new()),
        }
    }

    /// Returns false if the UID was already claimed during this run.
    fn claim(&self, uid: &str) -> bool {
        let mut claimed = self
            .claimed_uids
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        claimed.insert(uid.to_string())
    }

    /// Give a UID back after its import failed, so a later feed can retry it.
    fn release(&self, uid: &str) {
        let mut claimed = self
            .claimed_uids
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        claimed.remove(uid);
    }

    fn record_created(&self, reservation: Reservation) {
        self.created
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(reservation);
    }

    /// Availability against the reservations known at start plus the drafts
    /// created since.
    fn local_availability(&self, property_id: &str, range: &DateRange) -> AvailabilityReport {
        let created = self
            .created
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let all: Vec<Reservation> = self.known.iter().chain(created.iter()).cloned().collect();
        local_availability(&all, property_id, range, None)
    }
}

pub struct ReconciliationEngine<'a> {
    backend: &'a dyn ReservationBackend,
    options: SyncOptions,
}

impl<'a> ReconciliationEngine<'a> {
    pub fn new(backend: &'a dyn ReservationBackend, options: SyncOptions) -> Self {
        ReconciliationEngine { backend, options }
    }

    /// Pull every feed of every property and create draft reservations for
    /// bookings not seen before.
    ///
    /// Only loading the already-known reservations can fail the run; feed and
    /// event errors are counted in the result and logged.
    pub async fn synchronize(&self, properties: &[Property], user_id: &str) -> StayResult<SyncResult> {
        let work: Vec<(&Property, Vec<FeedLink>)> = properties
            .iter()
            .map(|p| (p, p.feeds()))
            .filter(|(_, feeds)| !feeds.is_empty())
            .collect();

        if work.is_empty() {
            info!("no property has calendar feeds, nothing to sync");
            return Ok(SyncResult::nothing_to_sync());
        }

        let known = self.backend.list_reservations().await?;
        info!(
            properties = work.len(),
            feeds = work.iter().map(|(_, feeds)| feeds.len()).sum::<usize>(),
            known = known.len(),
            "starting calendar sync"
        );
        let state = RunState::new(known);

        let results: Vec<SyncResult> = stream::iter(work)
            .map(|(property, feeds)| self.sync_property(property, feeds, user_id, &state))
            .buffer_unordered(self.options.concurrency.max(1))
            .collect()
            .await;

        Ok(SyncResult::merge(results))
    }

    /// Feeds of one property run in order so each availability check sees
    /// the drafts created by the feeds before it.
    async fn sync_property(
        &self,
        property: &Property,
        feeds: Vec<FeedLink>,
        user_id: &str,
        state: &RunState,
    ) -> SyncResult {
        let mut result = SyncResult::default();
        for feed in feeds {
            result += self.sync_feed(property, feed, user_id, state).await;
        }
        result
    }

    async fn sync_feed(
        &self,
        property: &Property,
        feed: FeedLink,
        user_id: &str,
        state: &RunState,
    ) -> SyncResult {
        let mut result = SyncResult::default();

        let content = match self.backend.fetch_feed(&feed.url).await {
            Ok(content) => content,
            Err(e) => {
                warn!(property = %property.id, source = %feed.source, url = %feed.url, error = %e, "could not fetch feed");
                result.failed += 1;
                return result;
            }
        };

        let events = parse_feed(&content);
        let candidates: Vec<&CalendarEvent> = events
            .iter()
            .filter(|e| e.is_reservation(&self.options.keywords))
            .collect();

        debug!(
            property = %property.id,
            source = %feed.source,
            events = events.len(),
            candidates = candidates.len(),
            "parsed feed"
        );

        for event in candidates {
            match self.reconcile_event(property, &feed, event, user_id, state).await {
                Ok(EventOutcome::Created) => result.new_reservations += 1,
                Ok(EventOutcome::Existing) => result.skipped_existing += 1,
                Ok(EventOutcome::RepeatedInRun) => {
                    result.skipped_existing += 1;
                    result.in_run_duplicates += 1;
                }
                Ok(EventOutcome::Unavailable) => {}
                Err(e) => {
                    warn!(
                        property = %property.id,
                        source = %feed.source,
                        uid = ?event.uid,
                        error = %e,
                        "could not reconcile event"
                    );
                    result.failed += 1;
                }
            }
        }

        result.successful += 1;
        info!(
            property = %property.id,
            source = %feed.source,
            created = result.new_reservations,
            skipped = result.skipped_existing,
            failed = result.failed,
            "feed synced"
        );
        result
    }

    async fn reconcile_event(
        &self,
        property: &Property,
        feed: &FeedLink,
        event: &CalendarEvent,
        user_id: &str,
        state: &RunState,
    ) -> StayResult<EventOutcome> {
        let uid = event.resolved_uid(&property.id, &feed.source);

        if state.known_uids.contains(&uid) {
            debug!(%uid, "already imported");
            return Ok(EventOutcome::Existing);
        }

        if !state.claim(&uid) {
            warn!(
                property = %property.id,
                source = %feed.source,
                %uid,
                "event UID already handled by another feed in this run, skipping"
            );
            return Ok(EventOutcome::RepeatedInRun);
        }

        let outcome = self
            .reconcile_claimed(property, feed, event, &uid, user_id, state)
            .await;
        if outcome.is_err() {
            state.release(&uid);
        }
        outcome
    }

    async fn reconcile_claimed(
        &self,
        property: &Property,
        feed: &FeedLink,
        event: &CalendarEvent,
        uid: &str,
        user_id: &str,
        state: &RunState,
    ) -> StayResult<EventOutcome> {
        if self.backend.reservation_exists(uid).await? {
            debug!(%uid, "backend already has a reservation for this event");
            return Ok(EventOutcome::Existing);
        }

        let (Some(start), Some(end)) = (event.start.as_deref(), event.end.as_deref()) else {
            return Err(SyncError::InvalidDate(format!("event {uid} has no date range")));
        };
        let range = DateRange::from_tokens(start, end)?;

        let report = self.availability(&property.id, &range, state).await?;
        if !report.available {
            debug!(
                %uid,
                %range,
                conflicts = report.conflicting_reservations.len(),
                "dates already taken"
            );
            return Ok(EventOutcome::Unavailable);
        }

        let body = NewReservation::draft_from_feed(&property.id, range, &feed.source, user_id, uid);
        let created = self.backend.create_reservation(&body).await?;
        debug!(%uid, reservation = %created.id, "created draft reservation");
        state.record_created(created);

        Ok(EventOutcome::Created)
    }

    async fn availability(
        &self,
        property_id: &str,
        range: &DateRange,
        state: &RunState,
    ) -> StayResult<AvailabilityReport> {
        match self.backend.check_availability(property_id, range, None).await {
            Err(e) if e.is_transport() && self.options.fallback_to_local => {
                warn!(property = %property_id, error = %e, "availability check unreachable, using known reservations");
                Ok(state.local_availability(property_id, range))
            }
            other => other,
        }
    }
}
