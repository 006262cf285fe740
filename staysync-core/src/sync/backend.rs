//! The backend operations reconciliation depends on.

use async_trait::async_trait;

use crate::date_range::DateRange;
use crate::error::StayResult;
use crate::reservation::{AvailabilityReport, NewReservation, Reservation};

/// Decides whether a date range is free for a property.
#[async_trait]
pub trait AvailabilityOracle: Send + Sync {
    async fn check_availability(
        &self,
        property_id: &str,
        range: &DateRange,
        exclude_reservation_id: Option<&str>,
    ) -> StayResult<AvailabilityReport>;
}

/// Everything the engine asks of the reservations backend.
#[async_trait]
pub trait ReservationBackend: AvailabilityOracle {
    /// Fetch a third-party feed through the backend's proxy.
    async fn fetch_feed(&self, url: &str) -> StayResult<String>;

    async fn reservation_exists(&self, uid: &str) -> StayResult<bool>;

    async fn create_reservation(&self, reservation: &NewReservation) -> StayResult<Reservation>;

    async fn list_reservations(&self) -> StayResult<Vec<Reservation>>;
}
