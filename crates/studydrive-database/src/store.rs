//! Store traits for the folder/file tree.
//!
//! The traits are defined here and implemented twice: by the sqlx
//! repositories in [`crate::repositories`] for production, and by
//! [`crate::memory::MemoryStore`] for tests and embedded use. Services
//! depend on the traits only.
//!
//! Mutations are guarded per item: every write carries the caller's
//! expected `version` and only applies to a row still in the expected
//! lifecycle state (`deleted_at IS NULL` for live mutations, `IS NOT
//! NULL` for restores). A guard miss surfaces as
//! [`studydrive_core::error::ErrorKind::Conflict`]; cascades additionally
//! roll back wholesale so a guard miss never leaves a half-stamped
//! subtree.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use studydrive_core::result::AppResult;
use studydrive_core::types::TrashFilter;
use studydrive_entity::file::{CreateFile, File, UpdateFileMeta};
use studydrive_entity::folder::{CreateFolder, Folder};
use studydrive_entity::item::Item;

/// An item id paired with the version the caller observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionedId {
    /// The row id.
    pub id: Uuid,
    /// The version the row must still have for the write to apply.
    pub version: i64,
}

impl VersionedId {
    /// Pair an id with its expected version.
    pub fn new(id: Uuid, version: i64) -> Self {
        Self { id, version }
    }
}

/// A pre-collected soft-delete cascade: the live subtree snapshot to stamp
/// in one transaction.
#[derive(Debug, Clone)]
pub struct SoftDeleteCascade {
    /// The actor performing the deletion.
    pub actor_id: Uuid,
    /// Deletion timestamp applied to every member.
    pub deleted_at: DateTime<Utc>,
    /// Folders in the cascade (the root first).
    pub folders: Vec<VersionedId>,
    /// Files directly inside any cascade folder.
    pub files: Vec<VersionedId>,
}

impl SoftDeleteCascade {
    /// Total number of items the cascade stamps.
    pub fn len(&self) -> usize {
        self.folders.len() + self.files.len()
    }

    /// Whether the cascade stamps nothing.
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty() && self.files.is_empty()
    }
}

/// A single restore target: where the item reattaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestoreTarget {
    /// The row id.
    pub id: Uuid,
    /// The version the row must still have.
    pub version: i64,
    /// The parent (folder) to reattach to; None = root level.
    pub new_parent_id: Option<Uuid>,
}

/// A pre-collected restore cascade applied in one transaction.
#[derive(Debug, Clone)]
pub struct RestoreCascade {
    /// Timestamp stamped into `updated_at` on every restored row.
    pub restored_at: DateTime<Utc>,
    /// Folders to restore.
    pub folders: Vec<RestoreTarget>,
    /// Files to restore.
    pub files: Vec<RestoreTarget>,
}

impl RestoreCascade {
    /// Total number of items the cascade restores.
    pub fn len(&self) -> usize {
        self.folders.len() + self.files.len()
    }

    /// Whether the cascade restores nothing.
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty() && self.files.is_empty()
    }
}

/// A file removed by a purge, with the blob reference that now needs
/// cleanup.
#[derive(Debug, Clone)]
pub struct PurgedFile {
    /// The purged file id.
    pub id: Uuid,
    /// The orphaned blob locator.
    pub content_ref: String,
}

/// Result of a permanent purge.
#[derive(Debug, Clone, Default)]
pub struct PurgeOutcome {
    /// Folder rows removed.
    pub folders_purged: u64,
    /// File rows removed, with their blob references.
    pub purged_files: Vec<PurgedFile>,
}

impl PurgeOutcome {
    /// Total rows removed.
    pub fn total(&self) -> u64 {
        self.folders_purged + self.purged_files.len() as u64
    }
}

/// Folder persistence operations.
#[async_trait]
pub trait FolderStore: Send + Sync + std::fmt::Debug + 'static {
    /// Insert a new live folder.
    async fn create(&self, data: &CreateFolder) -> AppResult<Folder>;

    /// Find a folder by id, live or trashed.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Folder>>;

    /// List live child folders (None = root level), name-ordered.
    async fn list_children(
        &self,
        owner_id: Uuid,
        parent_id: Option<Uuid>,
    ) -> AppResult<Vec<Folder>>;

    /// Find a live sibling by name (case-insensitive), for duplicate checks.
    async fn find_live_child_named(
        &self,
        owner_id: Uuid,
        parent_id: Option<Uuid>,
        name: &str,
    ) -> AppResult<Option<Folder>>;

    /// All live descendants of a folder, parents before children. The
    /// folder itself is not included.
    async fn live_descendants(&self, folder_id: Uuid) -> AppResult<Vec<Folder>>;

    /// Rename a live folder, guarded by its version.
    async fn rename(&self, id: Uuid, new_name: &str, expected_version: i64) -> AppResult<Folder>;

    /// Move a live folder to a new parent, guarded by its version. Cycle
    /// and destination checks happen in the service layer.
    async fn reparent(
        &self,
        id: Uuid,
        new_parent_id: Option<Uuid>,
        expected_version: i64,
    ) -> AppResult<Folder>;
}

/// File persistence operations.
#[async_trait]
pub trait FileStore: Send + Sync + std::fmt::Debug + 'static {
    /// Insert a new live file record.
    async fn create(&self, data: &CreateFile) -> AppResult<File>;

    /// Find a file by id, live or trashed.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<File>>;

    /// List live files in a folder (None = root level), name-ordered.
    async fn list_in_folder(
        &self,
        owner_id: Uuid,
        folder_id: Option<Uuid>,
    ) -> AppResult<Vec<File>>;

    /// Find a live file by name in a folder (case-insensitive).
    async fn find_live_named(
        &self,
        owner_id: Uuid,
        folder_id: Option<Uuid>,
        name: &str,
    ) -> AppResult<Option<File>>;

    /// All live files directly inside any of the given folders.
    async fn live_in_folders(&self, folder_ids: &[Uuid]) -> AppResult<Vec<File>>;

    /// Update file metadata, guarded by its version.
    async fn update_meta(
        &self,
        id: Uuid,
        changes: &UpdateFileMeta,
        expected_version: i64,
    ) -> AppResult<File>;

    /// Move a live file to another folder, guarded by its version.
    async fn reparent(
        &self,
        id: Uuid,
        new_folder_id: Option<Uuid>,
        expected_version: i64,
    ) -> AppResult<File>;
}

/// Trash lifecycle operations: cascades, listings, and permanent purges.
#[async_trait]
pub trait TrashStore: Send + Sync + std::fmt::Debug + 'static {
    /// Stamp every cascade member as deleted in a single transaction.
    ///
    /// Each row snapshots its own current parent into `original_*`. Any
    /// guard miss rolls the whole cascade back and returns `Conflict`.
    async fn soft_delete_cascade(&self, cascade: &SoftDeleteCascade) -> AppResult<()>;

    /// Clear deletion fields and reattach every cascade member in a single
    /// transaction. Any guard miss rolls the whole cascade back and
    /// returns `Conflict`.
    async fn restore_cascade(&self, cascade: &RestoreCascade) -> AppResult<()>;

    /// All trashed items for an owner matching the filter,
    /// most-recently-deleted first.
    async fn list_trash(&self, owner_id: Uuid, filter: &TrashFilter) -> AppResult<Vec<Item>>;

    /// The trashed subtree rooted at a trashed folder (the folder itself
    /// included), parents before children. Empty when the folder is
    /// missing or live.
    async fn trashed_folder_subtree(&self, folder_id: Uuid) -> AppResult<Vec<Folder>>;

    /// All trashed files directly inside any of the given folders.
    async fn trashed_files_in_folders(&self, folder_ids: &[Uuid]) -> AppResult<Vec<File>>;

    /// Permanently delete the given trashed rows. Rows that are missing or
    /// live are skipped, which makes the purge idempotent.
    async fn purge_items(&self, folder_ids: &[Uuid], file_ids: &[Uuid]) -> AppResult<PurgeOutcome>;

    /// Permanently delete every trashed item of an owner.
    async fn purge_for_owner(&self, owner_id: Uuid) -> AppResult<PurgeOutcome>;

    /// Permanently delete every trashed item older than the cutoff, across
    /// all owners.
    async fn purge_expired(&self, cutoff: DateTime<Utc>) -> AppResult<PurgeOutcome>;
}
