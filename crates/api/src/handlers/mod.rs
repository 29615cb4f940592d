//! Request handlers, one submodule per resource.
//!
//! Handlers validate input through `entyre_core`, delegate persistence to
//! the repositories in `entyre_db`, and map failures via [`AppError`].
//!
//! [`AppError`]: crate::error::AppError

pub mod articles;
pub mod auth;
pub mod banners;
pub mod excel_files;
pub mod sections;
pub mod uploads;
pub mod videos;
pub mod workflows;
