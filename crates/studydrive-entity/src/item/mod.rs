//! Tagged item union and trash entries.

pub mod model;
pub mod trash;

pub use model::Item;
pub use trash::TrashEntry;
