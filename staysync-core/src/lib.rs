//! Core of staysync.
//!
//! Pulls third-party iCal feeds for rental properties and turns the bookings
//! they contain into draft reservations on the reservations backend:
//! - `ics` parses feeds and exports reservations back to iCal
//! - `sync` holds the reconciliation engine and the backend traits it needs
//! - `api` is the HTTP client implementing those traits
//! - `session` and `config` hold the persisted login and user settings

pub mod api;
pub mod async_op;
pub mod config;
pub mod date_range;
pub mod error;
pub mod event;
pub mod ics;
pub mod property;
pub mod reservation;
pub mod session;
pub mod sync;

pub use async_op::AsyncOperation;
pub use config::StayConfig;
pub use date_range::DateRange;
pub use error::{StayResult, SyncError};
pub use event::CalendarEvent;
pub use property::{FeedLink, Property};
pub use reservation::{AvailabilityReport, NewReservation, Reservation, ReservationStatus};
