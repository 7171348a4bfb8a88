//! # studydrive-storage
//!
//! Blob storage backends implementing [`studydrive_core::traits::BlobStore`].
//! Content is addressed by opaque `content_ref` locators minted at write
//! time; StudyDrive never interprets the stored bytes.

pub mod providers;

pub use providers::local::LocalBlobStore;
