//! # studydrive-worker
//!
//! Background work for StudyDrive: a cron scheduler driving registered
//! job handlers. The only built-in job is the retention sweep that purges
//! expired trash.

pub mod executor;
pub mod jobs;
pub mod scheduler;
