//! Stay date ranges and the client-side overlap fallback.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{StayResult, SyncError};
use crate::reservation::{AvailabilityReport, Reservation};

/// Check-in to check-out. `end` is the departure day, so the range is
/// half-open when testing for overlaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }

    /// Build a range from raw feed tokens (`DTSTART` / `DTEND` values).
    /// Parse raw DTSTART/DTEND tokens. An end before the start is rejected.
    pub fn from_tokens(start: &str, end: &str) -> StayResult<Self> {
        let range = DateRange {
            start: parse_date_token(start)?,
            end: parse_date_token(end)?,
        };
        if range.end < range.start {
            return Err(SyncError::InvalidDate(format!("{end} is before {start}")));
        }
        Ok(range)
    }

    /// `[s1,e1)` and `[s2,e2)` overlap iff `s1 < e2 && s2 < e1`.
    /// Back-to-back stays (checkout day == next check-in) don't conflict.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Every calendar day touched by the range, departure day included.
    pub fn days_inclusive(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(move |d| *d <= self.end)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Parse a date the way feeds and the backend write them.
///
/// Accepts `20250710`, `20250710T150000`, `20250710T150000Z`, `2025-07-10`,
/// and ISO/RFC 3339 timestamps. Time of day and zone are dropped.
pub fn parse_date_token(raw: &str) -> StayResult<NaiveDate> {
    let s = raw.trim();

    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y%m%d") {
        return Ok(d);
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(d);
    }

    let basic = s.trim_end_matches('Z');
    if let Ok(dt) = NaiveDateTime::parse_from_str(basic, "%Y%m%dT%H%M%S") {
        return Ok(dt.date());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(basic, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(dt.date());
    }

    Err(SyncError::InvalidDate(raw.to_string()))
}

/// Client-side stand-in for the availability endpoint.
///
/// Only non-cancelled reservations of `property_id` are considered, and
/// `exclude_id` lets an existing reservation be checked against the others.
pub fn local_availability(
    reservations: &[Reservation],
    property_id: &str,
    range: &DateRange,
    exclude_id: Option<&str>,
) -> AvailabilityReport {
    let conflicting_reservations: Vec<Reservation> = reservations
        .iter()
        .filter(|r| r.property_id == property_id)
        .filter(|r| !r.is_cancelled())
        .filter(|r| exclude_id != Some(r.id.as_str()))
        .filter(|r| r.range().overlaps(range))
        .cloned()
        .collect();

    AvailabilityReport {
        available: conflicting_reservations.is_empty(),
        conflicting_reservations,
    }
}

/// Days to grey out on a booking calendar, sorted and without duplicates.
pub fn disabled_dates(reservations: &[Reservation]) -> Vec<NaiveDate> {
    let mut days: Vec<NaiveDate> = reservations
        .iter()
        .filter(|r| !r.is_cancelled())
        .flat_map(|r| r.range().days_inclusive().collect::<Vec<_>>())
        .collect();
    days.sort();
    days.dedup();
    days
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reservation::ReservationStatus;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn reservation(id: &str, start: NaiveDate, end: NaiveDate, status: ReservationStatus) -> Reservation {
        Reservation {
            id: id.into(),
            property_id: "p1".into(),
            start_date: start,
            end_date: end,
            status,
            calendar_event_uid: None,
            booking_source: None,
            created_by_user_id: None,
        }
    }

    #[test]
    fn test_from_tokens_rejects_end_before_start() {
        assert!(matches!(
            DateRange::from_tokens("20250715", "20250710"),
            Err(SyncError::InvalidDate(_))
        ));

        let same_day = DateRange::from_tokens("20250710", "20250710").unwrap();
        assert_eq!(same_day.start, same_day.end);
    }

    #[test]
    fn test_parse_feed_and_backend_formats() {
        let expected = d(2025, 7, 10);
        for token in [
            "20250710",
            "20250710T150000",
            "20250710T150000Z",
            "2025-07-10",
            "2025-07-10T15:00:00Z",
            "2025-07-10T00:00:00.000Z",
            "2025-07-10T15:00:00+02:00",
            "2025-07-10T15:00:00.000",
        ] {
            assert_eq!(parse_date_token(token).unwrap(), expected, "token {token}");
        }
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_date_token("next tuesday"),
            Err(SyncError::InvalidDate(_))
        ));
        assert!(parse_date_token("").is_err());
    }

    #[test]
    fn test_overlap_is_half_open() {
        let a = DateRange::new(d(2025, 6, 1), d(2025, 6, 5));
        assert!(a.overlaps(&DateRange::new(d(2025, 6, 3), d(2025, 6, 4))));
        assert!(a.overlaps(&DateRange::new(d(2025, 5, 30), d(2025, 6, 2))));
        assert!(!a.overlaps(&DateRange::new(d(2025, 6, 5), d(2025, 6, 8))));
        assert!(!a.overlaps(&DateRange::new(d(2025, 5, 28), d(2025, 6, 1))));
    }

    #[test]
    fn test_local_availability_reports_conflicts() {
        let existing = vec![
            reservation("r1", d(2025, 6, 1), d(2025, 6, 5), ReservationStatus::Confirmed),
            reservation("r2", d(2025, 6, 3), d(2025, 6, 9), ReservationStatus::Cancelled),
        ];
        let range = DateRange::new(d(2025, 6, 3), d(2025, 6, 4));

        let report = local_availability(&existing, "p1", &range, None);
        assert!(!report.available);
        assert_eq!(report.conflicting_reservations.len(), 1);
        assert_eq!(report.conflicting_reservations[0].id, "r1");

        let report = local_availability(&existing, "p1", &range, Some("r1"));
        assert!(report.available);

        let report = local_availability(&existing, "p2", &range, None);
        assert!(report.available);
    }

    #[test]
    fn test_disabled_dates_include_both_ends() {
        let existing = vec![
            reservation("r1", d(2025, 6, 1), d(2025, 6, 3), ReservationStatus::Draft),
            reservation("r2", d(2025, 6, 3), d(2025, 6, 4), ReservationStatus::Signed),
            reservation("r3", d(2025, 7, 1), d(2025, 7, 9), ReservationStatus::Cancelled),
        ];

        assert_eq!(
            disabled_dates(&existing),
            vec![d(2025, 6, 1), d(2025, 6, 2), d(2025, 6, 3), d(2025, 6, 4)]
        );
    }
}
