//! Utility modules.

pub mod datetime;

pub use datetime::{format_da, format_dt, format_tm, parse_da, parse_tm, DateTimeParseError};
