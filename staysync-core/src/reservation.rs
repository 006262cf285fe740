//! Reservation records owned by the backend.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::date_range::{DateRange, parse_date_token};
use crate::property::{opt_string_or_number, string_or_number};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Draft,
    Sent,
    Signed,
    Confirmed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReservationStatus::Draft => "draft",
            ReservationStatus::Sent => "sent",
            ReservationStatus::Signed => "signed",
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::Cancelled => "cancelled",
            ReservationStatus::Unknown => "unknown",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(deserialize_with = "string_or_number")]
    pub property_id: String,
    #[serde(deserialize_with = "lenient_date")]
    pub start_date: NaiveDate,
    #[serde(deserialize_with = "lenient_date")]
    pub end_date: NaiveDate,
    pub status: ReservationStatus,
    #[serde(rename = "calendarEventUID", default)]
    pub calendar_event_uid: Option<String>,
    #[serde(default)]
    pub booking_source: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub created_by_user_id: Option<String>,
}

impl Reservation {
    pub fn range(&self) -> DateRange {
        DateRange::new(self.start_date, self.end_date)
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == ReservationStatus::Cancelled
    }
}

/// Body of `POST /api/v1/reservations` for reservations created from a feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReservation {
    pub property_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: ReservationStatus,
    pub booking_source: String,
    pub created_by_user_id: String,
    #[serde(rename = "calendarEventUID")]
    pub calendar_event_uid: String,
}

impl NewReservation {
    /// A draft reservation sourced from an external calendar feed.
    pub fn draft_from_feed(
        property_id: &str,
        range: DateRange,
        source: &str,
        user_id: &str,
        uid: &str,
    ) -> Self {
        NewReservation {
            property_id: property_id.to_string(),
            start_date: range.start,
            end_date: range.end,
            status: ReservationStatus::Draft,
            booking_source: source.to_string(),
            created_by_user_id: user_id.to_string(),
            calendar_event_uid: uid.to_string(),
        }
    }
}

/// Answer of the availability check.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityReport {
    pub available: bool,
    #[serde(default)]
    pub conflicting_reservations: Vec<Reservation>,
}

/// Backend dates arrive as `2025-07-10` or full ISO timestamps.
fn lenient_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date_token(&raw).map_err(serde::de::Error::custom)
}
