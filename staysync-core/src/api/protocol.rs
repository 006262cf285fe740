//! Typed requests for the reservations backend.
//!
//! Each endpoint is a struct implementing [`ApiRequest`]; the response type is
//! tied to the request so callers get it inferred at compile time.

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::date_range::DateRange;
use crate::error::{StayResult, SyncError};
use crate::property::Property;
use crate::reservation::{AvailabilityReport, NewReservation, Reservation};
use crate::session::SessionUser;

pub trait ApiRequest: Serialize {
    type Response: DeserializeOwned;

    fn method() -> Method;

    /// Path segments below the base URL; they are percent-encoded by the client.
    fn path(&self) -> Vec<String>;

    fn query(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// Send `self` as the JSON body.
    fn has_body() -> bool {
        Self::method() == Method::POST
    }

    fn requires_auth() -> bool {
        true
    }

    fn decode(body: &str) -> StayResult<Self::Response> {
        Ok(serde_json::from_str(body)?)
    }
}

fn segments(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

/// Decode `T` either bare or wrapped in one of `keys` (`{"data": ...}`).
fn decode_enveloped<T: DeserializeOwned>(body: &str, keys: &[&str]) -> StayResult<T> {
    let value: serde_json::Value = serde_json::from_str(body)?;

    for key in keys {
        if let Some(inner) = value.get(key) {
            if let Ok(decoded) = serde_json::from_value(inner.clone()) {
                return Ok(decoded);
            }
        }
    }

    Ok(serde_json::from_value(value)?)
}

// ============================================================================
// Auth
// ============================================================================

/// `POST /api/v1/auth/login`
#[derive(Debug, Serialize)]
pub struct Login {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: SessionUser,
}

impl ApiRequest for Login {
    type Response = LoginResponse;

    fn method() -> Method {
        Method::POST
    }

    fn path(&self) -> Vec<String> {
        segments(&["api", "v1", "auth", "login"])
    }

    fn requires_auth() -> bool {
        false
    }

    fn decode(body: &str) -> StayResult<Self::Response> {
        decode_enveloped(body, &["data"])
    }
}

// ============================================================================
// Properties
// ============================================================================

/// `GET /api/v1/properties`
#[derive(Debug, Serialize)]
pub struct ListProperties;

impl ApiRequest for ListProperties {
    type Response = Vec<Property>;

    fn method() -> Method {
        Method::GET
    }

    fn path(&self) -> Vec<String> {
        segments(&["api", "v1", "properties"])
    }

    fn decode(body: &str) -> StayResult<Self::Response> {
        decode_enveloped(body, &["properties", "data"])
    }
}

/// `GET /api/v1/properties/:id`
#[derive(Debug, Serialize)]
pub struct GetProperty {
    pub property_id: String,
}

impl ApiRequest for GetProperty {
    type Response = Property;

    fn method() -> Method {
        Method::GET
    }

    fn path(&self) -> Vec<String> {
        segments(&["api", "v1", "properties", &self.property_id])
    }

    fn decode(body: &str) -> StayResult<Self::Response> {
        decode_enveloped(body, &["property", "data"])
    }
}

// ============================================================================
// iCal
// ============================================================================

/// `POST /api/v1/icals/fetch-ical` - the backend fetches a third-party feed
/// on our behalf.
#[derive(Debug, Serialize)]
pub struct FetchIcal {
    pub url: String,
}

/// What the feed proxy answers with. Deployments differ: raw text, a JSON
/// string, or an object carrying the text.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FeedPayload {
    Text(String),
    Wrapped {
        #[serde(default)]
        data: Option<String>,
        #[serde(default)]
        content: Option<String>,
        #[serde(default)]
        ical: Option<String>,
    },
}

impl FeedPayload {
    pub fn into_text(self) -> StayResult<String> {
        match self {
            FeedPayload::Text(text) => Ok(text),
            FeedPayload::Wrapped { data, content, ical } => data
                .or(content)
                .or(ical)
                .ok_or_else(|| SyncError::Serialization("feed payload has no calendar text".into())),
        }
    }
}

impl ApiRequest for FetchIcal {
    type Response = FeedPayload;

    fn method() -> Method {
        Method::POST
    }

    fn path(&self) -> Vec<String> {
        segments(&["api", "v1", "icals", "fetch-ical"])
    }

    fn decode(body: &str) -> StayResult<Self::Response> {
        match serde_json::from_str(body) {
            Ok(payload) => Ok(payload),
            Err(_) => Ok(FeedPayload::Text(body.to_string())),
        }
    }
}

/// `POST /api/v1/icals/sync/:propertyId` - server-driven sync of one property.
#[derive(Debug, Serialize)]
pub struct ServerSync {
    #[serde(skip)]
    pub property_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSyncResults {
    #[serde(default)]
    pub successful: usize,
    #[serde(default)]
    pub failed: usize,
    #[serde(default)]
    pub total: usize,
}

#[derive(Debug, Deserialize)]
pub struct ServerSyncResponse {
    pub results: ServerSyncResults,
}

impl ApiRequest for ServerSync {
    type Response = ServerSyncResponse;

    fn method() -> Method {
        Method::POST
    }

    fn path(&self) -> Vec<String> {
        segments(&["api", "v1", "icals", "sync", &self.property_id])
    }
}

// ============================================================================
// Reservations
// ============================================================================

/// `GET /api/v1/reservations[?propertyId=]`
#[derive(Debug, Default, Serialize)]
pub struct ListReservations {
    pub property_id: Option<String>,
}

impl ApiRequest for ListReservations {
    type Response = Vec<Reservation>;

    fn method() -> Method {
        Method::GET
    }

    fn path(&self) -> Vec<String> {
        segments(&["api", "v1", "reservations"])
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        self.property_id
            .iter()
            .map(|id| ("propertyId", id.clone()))
            .collect()
    }

    fn decode(body: &str) -> StayResult<Self::Response> {
        decode_enveloped(body, &["reservations", "data"])
    }
}

/// `GET /api/v1/reservations/check-uid/:uid`
#[derive(Debug, Serialize)]
pub struct CheckUid {
    pub uid: String,
}

#[derive(Debug, Deserialize)]
pub struct UidCheck {
    pub exists: bool,
}

impl ApiRequest for CheckUid {
    type Response = UidCheck;

    fn method() -> Method {
        Method::GET
    }

    fn path(&self) -> Vec<String> {
        segments(&["api", "v1", "reservations", "check-uid", &self.uid])
    }
}

/// `GET /api/v1/reservations/property/:propertyId/check-availability`
#[derive(Debug, Serialize)]
pub struct CheckAvailability {
    pub property_id: String,
    pub range: DateRange,
    pub exclude_reservation_id: Option<String>,
}

impl ApiRequest for CheckAvailability {
    type Response = AvailabilityReport;

    fn method() -> Method {
        Method::GET
    }

    fn path(&self) -> Vec<String> {
        segments(&[
            "api",
            "v1",
            "reservations",
            "property",
            &self.property_id,
            "check-availability",
        ])
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("startDate", self.range.start.format("%Y-%m-%d").to_string()),
            ("endDate", self.range.end.format("%Y-%m-%d").to_string()),
        ];
        if let Some(ref id) = self.exclude_reservation_id {
            query.push(("excludeReservationId", id.clone()));
        }
        query
    }
}

/// `POST /api/v1/reservations`
#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct CreateReservation(pub NewReservation);

impl ApiRequest for CreateReservation {
    type Response = Reservation;

    fn method() -> Method {
        Method::POST
    }

    fn path(&self) -> Vec<String> {
        segments(&["api", "v1", "reservations"])
    }

    fn decode(body: &str) -> StayResult<Self::Response> {
        decode_enveloped(body, &["reservation", "data"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_feed_payload_shapes() {
        let raw = "BEGIN:VCALENDAR\r\nEND:VCALENDAR\r\n";
        assert_eq!(FetchIcal::decode(raw).unwrap().into_text().unwrap(), raw);

        let json_string = serde_json::to_string(raw).unwrap();
        assert_eq!(FetchIcal::decode(&json_string).unwrap().into_text().unwrap(), raw);

        let wrapped = serde_json::json!({ "success": true, "data": raw }).to_string();
        assert_eq!(FetchIcal::decode(&wrapped).unwrap().into_text().unwrap(), raw);

        let empty = serde_json::json!({ "success": false }).to_string();
        assert!(FetchIcal::decode(&empty).unwrap().into_text().is_err());
    }

    #[test]
    fn test_list_decoding_accepts_envelopes() {
        let bare = r#"[{"id": 1, "name": "Loft"}]"#;
        let wrapped = r#"{"properties": [{"id": 1, "name": "Loft"}]}"#;
        let data = r#"{"data": [{"id": 1, "name": "Loft"}]}"#;

        for body in [bare, wrapped, data] {
            let props = ListProperties::decode(body).unwrap();
            assert_eq!(props.len(), 1);
            assert_eq!(props[0].id, "1");
        }
    }

    #[test]
    fn test_availability_query() {
        let req = CheckAvailability {
            property_id: "p1".into(),
            range: DateRange::new(
                NaiveDate::from_ymd_opt(2025, 6, 3).unwrap(),
                NaiveDate::from_ymd_opt(2025, 6, 4).unwrap(),
            ),
            exclude_reservation_id: Some("r9".into()),
        };

        assert_eq!(
            req.query(),
            vec![
                ("startDate", "2025-06-03".to_string()),
                ("endDate", "2025-06-04".to_string()),
                ("excludeReservationId", "r9".to_string()),
            ]
        );
        assert!(!CheckAvailability::has_body());
        assert!(CreateReservation::has_body());
        assert!(!Login::requires_auth());
    }
}
