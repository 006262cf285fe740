//! The reservations backend over HTTP.

mod client;
pub mod protocol;

pub use client::ApiClient;
