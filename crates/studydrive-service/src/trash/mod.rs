//! The trash lifecycle: soft-delete, restore, listing, and permanent purge.

pub mod service;

pub use service::{RestoreFailure, RestoreOutcome, TrashService};
