//! HTTP client for the reservations backend.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use tokio::time::timeout;
use tracing::debug;

use crate::api::protocol::{
    ApiRequest, CheckAvailability, CheckUid, CreateReservation, FetchIcal, GetProperty,
    ListProperties, ListReservations, Login, ServerSync, ServerSyncResults,
};
use crate::config::StayConfig;
use crate::date_range::DateRange;
use crate::error::{StayResult, SyncError};
use crate::property::Property;
use crate::reservation::{AvailabilityReport, NewReservation, Reservation};
use crate::session::{Session, SessionStore, SessionUser};
use crate::sync::{AvailabilityOracle, ReservationBackend};

/// Longest backend error body echoed back to the user.
const MAX_ERROR_BODY: usize = 200;

pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    request_timeout: Duration,
    session: Arc<dyn SessionStore>,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        request_timeout: Duration,
        session: Arc<dyn SessionStore>,
    ) -> StayResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| SyncError::Config(format!("Invalid api_url '{base_url}': {e}")))?;

        if base_url.cannot_be_a_base() {
            return Err(SyncError::Config(format!(
                "Invalid api_url '{base_url}': not an http(s) URL"
            )));
        }

        Ok(ApiClient {
            http: reqwest::Client::new(),
            base_url,
            request_timeout,
            session,
        })
    }

    pub fn from_config(config: &StayConfig, session: Arc<dyn SessionStore>) -> StayResult<Self> {
        Self::new(&config.api_url, config.timeout()?, session)
    }

    pub fn session(&self) -> Session<'_> {
        Session::new(self.session.as_ref())
    }

    /// Call a typed endpoint and return its decoded response.
    pub async fn call<R: ApiRequest>(&self, request: R) -> StayResult<R::Response> {
        timeout(self.request_timeout, self.call_raw(&request))
            .await
            .map_err(|_| SyncError::Timeout(self.request_timeout))?
    }

    fn url_for(&self, path: &[String]) -> StayResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SyncError::Config(format!("Invalid api_url '{}'", self.base_url)))?
            .pop_if_empty()
            .extend(path);
        Ok(url)
    }

    async fn call_raw<R: ApiRequest>(&self, request: &R) -> StayResult<R::Response> {
        let url = self.url_for(&request.path())?;
        debug!(method = %R::method(), %url, "backend request");

        let mut builder = self.http.request(R::method(), url);

        let query = request.query();
        if !query.is_empty() {
            builder = builder.query(&query);
        }

        if R::requires_auth() {
            let token = self.session().token().ok_or(SyncError::NotAuthenticated)?;
            builder = builder.bearer_auth(token);
        }

        if R::has_body() {
            builder = builder.json(request);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(SyncError::Api {
                status: status.as_u16(),
                message: error_message(&body, status.canonical_reason()),
            });
        }

        R::decode(&body)
    }

    // =========================================================================
    // Endpoints
    // =========================================================================

    /// Log in and persist the token in the session store.
    pub async fn login(&self, email: &str, password: &str) -> StayResult<SessionUser> {
        let response = self
            .call(Login {
                email: email.to_string(),
                password: password.to_string(),
            })
            .await?;

        self.session().login(&response.token, &response.user)?;
        Ok(response.user)
    }

    pub async fn list_properties(&self) -> StayResult<Vec<Property>> {
        self.call(ListProperties).await
    }

    pub async fn get_property(&self, property_id: &str) -> StayResult<Property> {
        match self
            .call(GetProperty {
                property_id: property_id.to_string(),
            })
            .await
        {
            Err(SyncError::Api { status: 404, .. }) => {
                Err(SyncError::PropertyNotFound(property_id.to_string()))
            }
            other => other,
        }
    }

    pub async fn reservations_for(&self, property_id: Option<&str>) -> StayResult<Vec<Reservation>> {
        self.call(ListReservations {
            property_id: property_id.map(str::to_string),
        })
        .await
    }

    /// Ask the backend to run its own sync of one property's feeds.
    pub async fn server_sync(&self, property_id: &str) -> StayResult<ServerSyncResults> {
        let response = self
            .call(ServerSync {
                property_id: property_id.to_string(),
            })
            .await?;
        Ok(response.results)
    }
}

#[async_trait]
impl AvailabilityOracle for ApiClient {
    async fn check_availability(
        &self,
        property_id: &str,
        range: &DateRange,
        exclude_reservation_id: Option<&str>,
    ) -> StayResult<AvailabilityReport> {
        self.call(CheckAvailability {
            property_id: property_id.to_string(),
            range: *range,
            exclude_reservation_id: exclude_reservation_id.map(str::to_string),
        })
        .await
    }
}

#[async_trait]
impl ReservationBackend for ApiClient {
    async fn fetch_feed(&self, url: &str) -> StayResult<String> {
        self.call(FetchIcal {
            url: url.to_string(),
        })
        .await?
        .into_text()
    }

    async fn reservation_exists(&self, uid: &str) -> StayResult<bool> {
        let check = self
            .call(CheckUid {
                uid: uid.to_string(),
            })
            .await?;
        Ok(check.exists)
    }

    async fn create_reservation(&self, reservation: &NewReservation) -> StayResult<Reservation> {
        self.call(CreateReservation(reservation.clone())).await
    }

    async fn list_reservations(&self) -> StayResult<Vec<Reservation>> {
        self.reservations_for(None).await
    }
}

/// Pull a readable message out of an error response body.
fn error_message(body: &str, reason: Option<&str>) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error"] {
            if let Some(message) = value.get(key).and_then(|v| v.as_str()) {
                return message.to_string();
            }
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        return reason.unwrap_or("request failed").to_string();
    }
    trimmed.chars().take(MAX_ERROR_BODY).collect()
}
