//! iCal feed parsing and generation.

mod generate;
mod parse;

pub use generate::{export_filename, export_reservations};
pub use parse::parse_feed;
