//! Folder CRUD and tree navigation services.

pub mod service;
pub mod tree;

pub use service::{CreateFolderRequest, FolderService};
pub use tree::{ReparentCheck, TreeService};
