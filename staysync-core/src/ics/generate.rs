//! Feed generation: publish a property's reservations as an iCal feed that
//! booking platforms can import back.

use chrono::NaiveDate;
use icalendar::{Calendar, Component, Property as IcsProperty, ValueType};

use crate::property::Property;
use crate::reservation::Reservation;

const EXPORT_SUMMARY: &str = "Reserved";

/// Generate a VCALENDAR with one all-day VEVENT per non-cancelled reservation
/// of `property`.
pub fn export_reservations(property: &Property, reservations: &[Reservation]) -> String {
    let mut cal = Calendar::new();
    cal.name(property.display_name());

    for reservation in reservations
        .iter()
        .filter(|r| r.property_id == property.id && !r.is_cancelled())
    {
        let mut ics_event = icalendar::Event::new();
        ics_event.uid(&export_uid(reservation));
        ics_event.summary(EXPORT_SUMMARY);
        add_date_property(&mut ics_event, "DTSTART", reservation.start_date);
        add_date_property(&mut ics_event, "DTEND", reservation.end_date);

        if let Some(ref source) = reservation.booking_source {
            ics_event.description(&format!("Source: {source}"));
        }

        cal.push(ics_event.done());
    }

    let cal = cal.done();
    strip_ics_bloat(&cal.to_string())
}

/// Reservations imported from a feed keep the feed's UID so the platform
/// recognizes its own events.
fn export_uid(reservation: &Reservation) -> String {
    reservation
        .calendar_event_uid
        .clone()
        .unwrap_or_else(|| format!("reservation-{}@staysync", reservation.id))
}

/// Suggested file name for an exported feed, e.g. `sea-view.ics`.
pub fn export_filename(property: &Property) -> String {
    let slug = slug::slugify(property.display_name());
    if slug.is_empty() {
        format!("property-{}.ics", property.id)
    } else {
        format!("{slug}.ics")
    }
}

fn add_date_property(ics_event: &mut icalendar::Event, name: &str, date: NaiveDate) {
    let mut prop = IcsProperty::new(name, date.format("%Y%m%d").to_string());
    prop.append_parameter(ValueType::Date);
    ics_event.append_property(prop);
}

/// Replace the icalendar crate's PRODID and drop CALSCALE:GREGORIAN (the default).
fn strip_ics_bloat(ics: &str) -> String {
    let mut result = String::with_capacity(ics.len());

    for line in ics.lines() {
        if line.starts_with("PRODID:") {
            result.push_str("PRODID:-//staysync//reservations//EN\r\n");
            continue;
        }
        if line == "CALSCALE:GREGORIAN" {
            continue;
        }
        result.push_str(line);
        result.push_str("\r\n");
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::DEFAULT_RESERVATION_KEYWORDS;
    use crate::ics::parse_feed;
    use crate::reservation::ReservationStatus;

    fn reservation(id: &str, start: (u32, u32), end: (u32, u32), uid: Option<&str>, status: ReservationStatus) -> Reservation {
        Reservation {
            id: id.into(),
            property_id: "p1".into(),
            start_date: NaiveDate::from_ymd_opt(2025, start.0, start.1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, end.0, end.1).unwrap(),
            status,
            calendar_event_uid: uid.map(str::to_string),
            booking_source: Some("booking".into()),
            created_by_user_id: None,
        }
    }

    #[test]
    fn test_exported_feed_reimports_as_reservations() {
        let property = Property::new("p1", Some("Sea View"));
        let reservations = vec![
            reservation("1", (7, 10), (7, 12), Some("abc123"), ReservationStatus::Draft),
            reservation("2", (8, 1), (8, 4), None, ReservationStatus::Confirmed),
            reservation("3", (9, 1), (9, 4), None, ReservationStatus::Cancelled),
        ];

        let ics = export_reservations(&property, &reservations);
        assert!(ics.contains("PRODID:-//staysync//reservations//EN"));
        assert!(!ics.contains("CALSCALE:GREGORIAN"));

        let events = parse_feed(&ics);
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.is_reservation(DEFAULT_RESERVATION_KEYWORDS)));

        let first = events.iter().find(|e| e.uid.as_deref() == Some("abc123")).unwrap();
        assert_eq!(first.start.as_deref(), Some("20250710"));
        assert_eq!(first.end.as_deref(), Some("20250712"));

        assert!(events.iter().any(|e| e.uid.as_deref() == Some("reservation-2@staysync")));
    }

    #[test]
    fn test_other_properties_are_not_exported() {
        let property = Property::new("p2", None);
        let reservations = vec![reservation("1", (7, 10), (7, 12), None, ReservationStatus::Draft)];

        let ics = export_reservations(&property, &reservations);
        assert!(parse_feed(&ics).is_empty());
    }

    #[test]
    fn test_export_filename() {
        assert_eq!(export_filename(&Property::new("p1", Some("Sea View Loft #2"))), "sea-view-loft-2.ics");
        assert_eq!(export_filename(&Property::new("p9", Some("!!!"))), "property-p9.ics");
    }
}
