//! Colored terminal rendering for staysync-core types.

use owo_colors::OwoColorize;
use staysync_core::api::protocol::ServerSyncResults;
use staysync_core::reservation::{AvailabilityReport, Reservation, ReservationStatus};
use staysync_core::sync::SyncResult;
use staysync_core::{CalendarEvent, FeedLink, Property};

pub trait Render {
    fn render(&self) -> String;
}

impl Render for Property {
    fn render(&self) -> String {
        format!("🏠 {} {}", self.display_name(), format!("({})", self.id).dimmed())
    }
}

impl Render for FeedLink {
    fn render(&self) -> String {
        format!("{} {}", self.source.cyan(), self.url.dimmed())
    }
}

impl Render for ReservationStatus {
    fn render(&self) -> String {
        let label = self.to_string();
        match self {
            ReservationStatus::Confirmed | ReservationStatus::Signed => label.green().to_string(),
            ReservationStatus::Draft | ReservationStatus::Sent => label.yellow().to_string(),
            ReservationStatus::Cancelled => label.red().to_string(),
            ReservationStatus::Unknown => label.dimmed().to_string(),
        }
    }
}

impl Render for Reservation {
    fn render(&self) -> String {
        let source = self.booking_source.as_deref().unwrap_or("direct");
        format!(
            "{} {} {}",
            self.range(),
            self.status.render(),
            source.dimmed()
        )
    }
}

/// Renders an event together with whether it counts as a booking.
pub struct ClassifiedEvent<'a> {
    pub event: &'a CalendarEvent,
    pub is_reservation: bool,
}

impl Render for ClassifiedEvent<'_> {
    fn render(&self) -> String {
        let event = self.event;
        let dates = format!(
            "{}..{}",
            event.start.as_deref().unwrap_or("?"),
            event.end.as_deref().unwrap_or("?")
        );
        let summary = event.summary.as_deref().unwrap_or("(no summary)");
        let uid = event.uid.as_deref().unwrap_or("(no uid)");

        if self.is_reservation {
            format!("{} {} {} {}", "+".green(), summary.green(), dates, uid.dimmed())
        } else {
            format!("{} {} {} {}", "-".dimmed(), summary.dimmed(), dates.dimmed(), uid.dimmed())
        }
    }
}

impl Render for AvailabilityReport {
    fn render(&self) -> String {
        if self.available {
            return "Available".green().to_string();
        }

        let mut lines = vec![format!(
            "{} ({} conflicting)",
            "Not available".red(),
            self.conflicting_reservations.len()
        )];
        lines.extend(
            self.conflicting_reservations
                .iter()
                .map(|r| format!("   {}", r.render())),
        );
        lines.join("\n")
    }
}

impl Render for SyncResult {
    fn render(&self) -> String {
        let message = self.to_string();
        if self.nothing_to_sync {
            message.dimmed().to_string()
        } else if self.has_failures() {
            message.yellow().to_string()
        } else {
            message.green().to_string()
        }
    }
}

impl Render for ServerSyncResults {
    fn render(&self) -> String {
        let message = format!(
            "Server sync finished: {} of {} feeds synced, {} failed",
            self.successful, self.total, self.failed
        );
        if self.failed > 0 {
            message.yellow().to_string()
        } else {
            message.green().to_string()
        }
    }
}
