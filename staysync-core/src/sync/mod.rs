mod backend;
mod engine;
mod report;

pub use backend::{AvailabilityOracle, ReservationBackend};
pub use engine::{ReconciliationEngine, SyncOptions};
pub use report::SyncResult;
