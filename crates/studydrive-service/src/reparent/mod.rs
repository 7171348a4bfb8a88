//! Batch move engine.

pub mod service;

pub use service::{MoveFailure, MoveOutcome, ReparentService};
