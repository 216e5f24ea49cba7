//! Shared utilities: calendar arithmetic, lenient date parsing, logging and
//! progress reporting.

pub mod dates;
pub mod logging;
pub mod progress;

pub use dates::{DateWindow, add_months, months_between, parse_date_string, sub_months};
pub use logging::{init_logging, log_stage_complete, log_stage_start};
