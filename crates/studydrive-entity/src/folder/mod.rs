//! Folder entity.

pub mod model;
pub mod path;

pub use model::{CreateFolder, Folder};
pub use path::Breadcrumb;
