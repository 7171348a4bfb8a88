//! # studydrive-api
//!
//! HTTP surface for StudyDrive: the Axum router, handlers, request DTOs,
//! the trusted-gateway actor extractor, and the error-to-status mapping.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;
