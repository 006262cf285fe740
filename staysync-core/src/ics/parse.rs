//! Feed parsing.
//!
//! Deliberately lenient: external booking platforms produce all kinds of
//! almost-RFC-5545 output, so a malformed block is dropped instead of failing
//! the whole feed.

use icalendar::parser::unfold;

use crate::event::CalendarEvent;

/// Parse feed text into its VEVENT blocks.
///
/// Only `DTSTART`, `DTEND`, `SUMMARY` and `UID` are read. Property parameters
/// (`DTSTART;VALUE=DATE`, `DTSTART;TZID=...`) are ignored and the raw value is
/// kept. Blocks without a closing `END:VEVENT` never produce an event.
pub fn parse_feed(content: &str) -> Vec<CalendarEvent> {
    let unfolded = unfold(content);

    let mut events = Vec::new();
    let mut current: Option<CalendarEvent> = None;

    for line in unfolded.lines() {
        let line = line.trim_end_matches('\r');

        match line {
            "BEGIN:VEVENT" => {
                current = Some(CalendarEvent::default());
                continue;
            }
            "END:VEVENT" => {
                if let Some(event) = current.take() {
                    events.push(event);
                }
                continue;
            }
            _ => {}
        }

        let Some(event) = current.as_mut() else {
            continue;
        };
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };

        // DTSTART;VALUE=DATE -> DTSTART
        let name = key.split(';').next().unwrap_or(key);
        let value = value.to_string();

        match name {
            "DTSTART" => event.start = Some(value),
            "DTEND" => event.end = Some(value),
            "SUMMARY" => event.summary = Some(value),
            "UID" => event.uid = Some(value),
            _ => {}
        }
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const AIRBNB_FEED: &str = "BEGIN:VCALENDAR\r\n\
PRODID:-//Airbnb Inc//Hosting Calendar 0.8.8//EN\r\n\
CALSCALE:GREGORIAN\r\n\
VERSION:2.0\r\n\
BEGIN:VEVENT\r\n\
DTEND;VALUE=DATE:20250712\r\n\
DTSTART;VALUE=DATE:20250710\r\n\
UID:1418fb94e984-f2d1c1b6c4bbc2bfd4e5b4b8e2@airbnb.com\r\n\
SUMMARY:Reserved\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
DTEND;VALUE=DATE:20250820\r\n\
DTSTART;VALUE=DATE:20250815\r\n\
UID:7f3b2c1d9e-a8b7c6d5e4f3a2b1@airbnb.com\r\n\
SUMMARY:Airbnb (Not available)\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

    #[test]
    fn test_parse_every_well_formed_block() {
        let events = parse_feed(AIRBNB_FEED);

        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0],
            CalendarEvent {
                uid: Some("1418fb94e984-f2d1c1b6c4bbc2bfd4e5b4b8e2@airbnb.com".into()),
                start: Some("20250710".into()),
                end: Some("20250712".into()),
                summary: Some("Reserved".into()),
            }
        );
        assert_eq!(events[1].summary.as_deref(), Some("Airbnb (Not available)"));
        assert_eq!(events[1].start.as_deref(), Some("20250815"));
    }

    #[test]
    fn test_parse_folded_summary() {
        let feed = "BEGIN:VCALENDAR\r\n\
BEGIN:VEVENT\r\n\
UID:folded-1\r\n\
DTSTART:20250601\r\n\
DTEND:20250605\r\n\
SUMMARY:Reserved by a very long guest na\r\n me that wraps\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

        let events = parse_feed(feed);
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].summary.as_deref(),
            Some("Reserved by a very long guest name that wraps")
        );
    }

    #[test]
    fn test_parse_lf_only_feed() {
        let feed = "BEGIN:VEVENT\nUID:lf\nDTSTART:20250601T140000Z\nDTEND:20250603T100000Z\nSUMMARY:Booked\nEND:VEVENT\n";

        let events = parse_feed(feed);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].start.as_deref(), Some("20250601T140000Z"));
        assert_eq!(events[0].end.as_deref(), Some("20250603T100000Z"));
    }

    #[test]
    fn test_unterminated_block_is_dropped() {
        let feed = "BEGIN:VCALENDAR\n\
BEGIN:VEVENT\n\
UID:ok\n\
SUMMARY:Reserved\n\
END:VEVENT\n\
BEGIN:VEVENT\n\
UID:broken\n\
SUMMARY:Reserved\n\
END:VCALENDAR\n";

        let events = parse_feed(feed);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].uid.as_deref(), Some("ok"));
    }

    #[test]
    fn test_value_split_at_first_colon_only() {
        let feed = "BEGIN:VEVENT\nUID:booking:12345\nSUMMARY:Booked: Jane Doe\nEND:VEVENT\n";

        let events = parse_feed(feed);
        assert_eq!(events[0].uid.as_deref(), Some("booking:12345"));
        assert_eq!(events[0].summary.as_deref(), Some("Booked: Jane Doe"));
    }

    #[test]
    fn test_missing_uid_still_yields_event() {
        let feed = "BEGIN:VEVENT\nDTSTART:20250601\nDTEND:20250602\nSUMMARY:Reserved\nEND:VEVENT\n";

        let events = parse_feed(feed);
        assert_eq!(events.len(), 1);
        assert!(events[0].uid.is_none());
    }

    #[test]
    fn test_garbage_yields_nothing() {
        assert!(parse_feed("").is_empty());
        assert!(parse_feed("<html>502 Bad Gateway</html>").is_empty());
    }
}
