//! # studydrive-core
//!
//! Core crate for StudyDrive. Contains traits, configuration schemas,
//! domain events, shared types, and the unified error system.
//!
//! This crate has **no** internal dependencies on other StudyDrive crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
