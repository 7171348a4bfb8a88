//! sqlx repository implementations of the store traits.

pub mod file;
pub mod folder;
pub mod trash;

pub use file::FileRepository;
pub use folder::FolderRepository;
pub use trash::TrashRepository;
