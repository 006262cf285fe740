//! Calendar events as they come out of an external feed.

use serde::{Deserialize, Serialize};

/// Summary keywords that mark a feed event as a booking by default.
pub const DEFAULT_RESERVATION_KEYWORDS: &[&str] = &["reserved", "booked"];

/// One VEVENT block from a feed.
///
/// Dates are kept as the raw tokens found in the feed (`20250710`,
/// `20250710T150000Z`, ...). Normalization happens later, when the engine
/// needs a calendar date for the availability check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub uid: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub summary: Option<String>,
}

impl CalendarEvent {
    /// Both ends of the range are present.
    pub fn is_actionable(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }

    /// Whether this event represents a booking on the external platform.
    ///
    /// The summary must contain one of `keywords` (case-insensitive) and the
    /// event must carry both a start and an end.
    pub fn is_reservation<S: AsRef<str>>(&self, keywords: &[S]) -> bool {
        if !self.is_actionable() {
            return false;
        }
        let Some(summary) = &self.summary else {
            return false;
        };
        let summary = summary.to_lowercase();
        keywords
            .iter()
            .any(|k| summary.contains(&k.as_ref().to_lowercase()))
    }

    /// The UID used for de-duplication.
    ///
    /// Feeds that omit UID get a fallback built from the property, feed source
    /// and raw dates, so syncing the same feed again resolves to the same id.
    pub fn resolved_uid(&self, property_id: &str, source: &str) -> String {
        match self.uid.as_deref().map(str::trim) {
            Some(uid) if !uid.is_empty() => uid.to_string(),
            _ => format!(
                "{}-{}-{}-{}",
                property_id,
                source,
                self.start.as_deref().unwrap_or_default(),
                self.end.as_deref().unwrap_or_default()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(summary: &str) -> CalendarEvent {
        CalendarEvent {
            uid: Some("abc".into()),
            start: Some("20250601".into()),
            end: Some("20250605".into()),
            summary: Some(summary.into()),
        }
    }

    #[test]
    fn reserved_summary_is_a_reservation() {
        assert!(event("Reserved by Airbnb").is_reservation(DEFAULT_RESERVATION_KEYWORDS));
        assert!(event("BOOKED - John").is_reservation(DEFAULT_RESERVATION_KEYWORDS));
    }

    #[test]
    fn blocked_summary_is_not_a_reservation() {
        assert!(!event("Blocked").is_reservation(DEFAULT_RESERVATION_KEYWORDS));
        assert!(!event("Airbnb (Not available)").is_reservation(DEFAULT_RESERVATION_KEYWORDS));
    }

    #[test]
    fn missing_dates_disqualify_even_with_keyword() {
        let mut e = event("Reserved");
        e.end = None;
        assert!(!e.is_reservation(DEFAULT_RESERVATION_KEYWORDS));

        let mut e = event("Reserved");
        e.summary = None;
        assert!(!e.is_reservation(DEFAULT_RESERVATION_KEYWORDS));
    }

    #[test]
    fn custom_keywords() {
        assert!(event("Not available").is_reservation(&["not available"]));
    }

    #[test]
    fn uid_is_used_when_present() {
        assert_eq!(event("Reserved").resolved_uid("p1", "airbnb"), "abc");
    }

    #[test]
    fn fallback_uid_is_deterministic() {
        let mut e = event("Reserved");
        e.uid = None;
        let first = e.resolved_uid("p1", "airbnb");
        assert_eq!(first, "p1-airbnb-20250601-20250605");
        assert_eq!(first, e.clone().resolved_uid("p1", "airbnb"));
        assert_ne!(first, e.resolved_uid("p1", "booking"));
    }

    #[test]
    fn blank_uid_falls_back() {
        let mut e = event("Reserved");
        e.uid = Some("  ".into());
        assert_eq!(e.resolved_uid("p1", "vrbo"), "p1-vrbo-20250601-20250605");
    }
}
