//! # studydrive-service
//!
//! Business logic for StudyDrive: folder and file CRUD, path resolution,
//! cycle validation, batch reparenting, and the soft-delete / restore /
//! purge lifecycle. Services depend on the store traits only, so they run
//! unchanged against PostgreSQL or the in-memory backend.

pub mod context;
pub mod file;
pub mod folder;
pub mod reparent;
pub mod trash;

#[cfg(test)]
mod test_util;
