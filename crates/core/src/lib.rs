//! Domain logic for the ENTYRE content backend.
//!
//! Everything in this crate is pure: no database, network, or filesystem
//! access. The persistence and HTTP layers call into it to validate and
//! normalize content before storing it.

pub mod choice;
pub mod coerce;
pub mod error;
pub mod excel;
pub mod login_limiter;
pub mod roles;
pub mod section;
pub mod spreadsheet;
pub mod types;
pub mod workflow;
