//! Soft-delete and restore cascades, trash listings, and purges.
//!
//! Cascades follow a collect-then-apply shape: the service snapshots the
//! affected subtree, then asks the store to stamp every member in one
//! transaction. Per-row version guards detect concurrent interference; on
//! a guard miss the store rolls the whole cascade back and the service
//! re-collects and retries a bounded number of times.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use studydrive_core::config::retention::RetentionConfig;
use studydrive_core::error::{AppError, ErrorKind};
use studydrive_core::events::{
    DomainEvent, EventBus, EventPayload, FileEvent, FolderEvent, TrashEvent,
};
use studydrive_core::traits::BlobStore;
use studydrive_core::types::{ItemKind, ItemRef, TrashFilter};
use studydrive_database::store::{
    FileStore, FolderStore, PurgeOutcome, RestoreCascade, RestoreTarget, SoftDeleteCascade,
    TrashStore, VersionedId,
};
use studydrive_entity::item::TrashEntry;

use crate::context::RequestContext;
use crate::folder::tree::TreeService;

/// How many times a cascade is re-collected and re-applied after losing a
/// race before the operation surfaces as a cascade failure.
const MAX_CASCADE_ATTEMPTS: usize = 3;

/// One item that could not be restored, with the reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestoreFailure {
    /// The item that failed.
    pub item: ItemRef,
    /// Human-readable reason.
    pub reason: String,
}

/// Result of a bulk restore.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RestoreOutcome {
    /// Items brought back to the live tree.
    pub restored: usize,
    /// Items skipped, with reasons.
    pub failures: Vec<RestoreFailure>,
}

/// Manages the soft-delete / restore / purge lifecycle.
#[derive(Debug, Clone)]
pub struct TrashService {
    /// Folder store.
    folders: Arc<dyn FolderStore>,
    /// File store.
    files: Arc<dyn FileStore>,
    /// Trash store (cascades and purges).
    trash: Arc<dyn TrashStore>,
    /// Blob storage, for post-purge content cleanup.
    blobs: Arc<dyn BlobStore>,
    /// Tree navigation (path rendering, cache invalidation).
    tree: Arc<TreeService>,
    /// Event bus.
    events: EventBus,
    /// Retention policy for automatic purges.
    retention: RetentionConfig,
}

impl TrashService {
    /// Creates a new trash service.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        folders: Arc<dyn FolderStore>,
        files: Arc<dyn FileStore>,
        trash: Arc<dyn TrashStore>,
        blobs: Arc<dyn BlobStore>,
        tree: Arc<TreeService>,
        events: EventBus,
        retention: RetentionConfig,
    ) -> Self {
        Self {
            folders,
            files,
            trash,
            blobs,
            tree,
            events,
            retention,
        }
    }

    /// Soft-deletes a folder and every live item nested under it.
    ///
    /// Returns the number of items stamped. Each member records its own
    /// current parent in `original_*`, so a file two levels down
    /// remembers its immediate containing folder, not the cascade root.
    pub async fn soft_delete_folder(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
    ) -> Result<usize, AppError> {
        let mut attempt = 0;
        loop {
            attempt += 1;

            let root = self
                .folders
                .find_by_id(folder_id)
                .await?
                .ok_or_else(|| AppError::not_found("Folder not found"))?;
            if root.is_deleted() {
                return Err(AppError::conflict("Folder is already in the trash"));
            }

            let descendants = self.folders.live_descendants(folder_id).await?;
            let mut folder_stamps = vec![VersionedId::new(root.id, root.version)];
            folder_stamps.extend(
                descendants
                    .iter()
                    .map(|f| VersionedId::new(f.id, f.version)),
            );
            let folder_ids: Vec<Uuid> = folder_stamps.iter().map(|s| s.id).collect();

            let files = self.files.live_in_folders(&folder_ids).await?;
            let cascade = SoftDeleteCascade {
                actor_id: ctx.actor_id,
                deleted_at: Utc::now(),
                folders: folder_stamps,
                files: files
                    .iter()
                    .map(|f| VersionedId::new(f.id, f.version))
                    .collect(),
            };
            let size = cascade.len();

            match self.trash.soft_delete_cascade(&cascade).await {
                Ok(()) => {
                    self.tree.invalidate();
                    info!(
                        actor_id = %ctx.actor_id,
                        folder_id = %folder_id,
                        cascade_size = size,
                        "Folder soft-deleted"
                    );
                    self.events.publish(DomainEvent::new(
                        Some(ctx.actor_id),
                        EventPayload::Folder(FolderEvent::SoftDeleted {
                            folder_id,
                            cascade_size: size,
                        }),
                    ));
                    return Ok(size);
                }
                Err(e) if e.kind == ErrorKind::Conflict => {
                    if attempt >= MAX_CASCADE_ATTEMPTS {
                        return Err(AppError::cascade(format!(
                            "Soft-delete of folder {folder_id} kept losing to concurrent \
                             changes after {MAX_CASCADE_ATTEMPTS} attempts"
                        )));
                    }
                    warn!(
                        folder_id = %folder_id,
                        attempt,
                        "Soft-delete cascade raced a concurrent change; re-collecting"
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Soft-deletes a single file: the one-item case of the cascade.
    pub async fn soft_delete_file(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
    ) -> Result<(), AppError> {
        let file = self
            .files
            .find_by_id(file_id)
            .await?
            .ok_or_else(|| AppError::not_found("File not found"))?;
        if file.is_deleted() {
            return Err(AppError::conflict("File is already in the trash"));
        }

        let cascade = SoftDeleteCascade {
            actor_id: ctx.actor_id,
            deleted_at: Utc::now(),
            folders: Vec::new(),
            files: vec![VersionedId::new(file.id, file.version)],
        };
        self.trash.soft_delete_cascade(&cascade).await?;
        self.tree.invalidate();

        info!(actor_id = %ctx.actor_id, file_id = %file_id, "File soft-deleted");
        self.events.publish(DomainEvent::new(
            Some(ctx.actor_id),
            EventPayload::File(FileEvent::SoftDeleted { file_id }),
        ));
        Ok(())
    }

    /// Restores a single trashed item to its recorded original location,
    /// falling back to the root when that location is deleted or gone.
    pub async fn restore_item(&self, ctx: &RequestContext, item: ItemRef) -> Result<(), AppError> {
        match item.kind {
            ItemKind::Folder => self.restore_single_folder(ctx, item.id).await,
            ItemKind::File => self.restore_single_file(ctx, item.id).await,
        }
    }

    /// Restores a selection of items independently; failures are reported,
    /// not silently dropped.
    pub async fn restore_items(
        &self,
        ctx: &RequestContext,
        items: &[ItemRef],
    ) -> Result<RestoreOutcome, AppError> {
        let mut outcome = RestoreOutcome::default();
        for item in items {
            match self.restore_item(ctx, *item).await {
                Ok(()) => outcome.restored += 1,
                Err(e) => outcome.failures.push(RestoreFailure {
                    item: *item,
                    reason: e.message.clone(),
                }),
            }
        }
        Ok(outcome)
    }

    /// Restores a trashed folder together with every trashed item still
    /// nested under it, preserving each item's own recorded location
    /// relative to the restored subtree. Returns the number restored.
    pub async fn restore_folder_with_contents(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
    ) -> Result<usize, AppError> {
        let mut attempt = 0;
        loop {
            attempt += 1;

            let subtree = self.trash.trashed_folder_subtree(folder_id).await?;
            let Some(root) = subtree.first().cloned() else {
                return match self.folders.find_by_id(folder_id).await? {
                    Some(_) => Err(AppError::conflict("Folder is not in the trash")),
                    None => Err(AppError::not_found("Folder not found")),
                };
            };

            let root_target = self.resolve_restore_parent(root.original_parent_id).await?;
            self.ensure_folder_slot_free(&root, root_target).await?;

            let subtree_ids: HashSet<Uuid> = subtree.iter().map(|f| f.id).collect();
            let mut folder_targets = Vec::with_capacity(subtree.len());
            for folder in &subtree {
                let new_parent_id = if folder.id == root.id {
                    root_target
                } else {
                    match folder.original_parent_id {
                        // Reattach inside the subtree being revived.
                        Some(p) if subtree_ids.contains(&p) => Some(p),
                        original => self.resolve_restore_parent(original).await?,
                    }
                };
                folder_targets.push(RestoreTarget {
                    id: folder.id,
                    version: folder.version,
                    new_parent_id,
                });
            }

            let folder_ids: Vec<Uuid> = subtree.iter().map(|f| f.id).collect();
            let files = self.trash.trashed_files_in_folders(&folder_ids).await?;
            let mut file_targets = Vec::with_capacity(files.len());
            for file in &files {
                let new_parent_id = match file.original_folder_id {
                    Some(p) if subtree_ids.contains(&p) => Some(p),
                    original => self.resolve_restore_parent(original).await?,
                };
                file_targets.push(RestoreTarget {
                    id: file.id,
                    version: file.version,
                    new_parent_id,
                });
            }

            let cascade = RestoreCascade {
                restored_at: Utc::now(),
                folders: folder_targets,
                files: file_targets,
            };
            let count = cascade.len();

            match self.trash.restore_cascade(&cascade).await {
                Ok(()) => {
                    self.tree.invalidate();
                    info!(
                        actor_id = %ctx.actor_id,
                        folder_id = %folder_id,
                        restored = count,
                        "Folder restored with contents"
                    );
                    self.events.publish(DomainEvent::new(
                        Some(ctx.actor_id),
                        EventPayload::Folder(FolderEvent::Restored {
                            folder_id,
                            parent_id: root_target,
                        }),
                    ));
                    return Ok(count);
                }
                Err(e) if e.kind == ErrorKind::Conflict => {
                    if attempt >= MAX_CASCADE_ATTEMPTS {
                        return Err(AppError::cascade(format!(
                            "Restore of folder {folder_id} kept losing to concurrent \
                             changes after {MAX_CASCADE_ATTEMPTS} attempts"
                        )));
                    }
                    warn!(
                        folder_id = %folder_id,
                        attempt,
                        "Restore cascade raced a concurrent change; re-collecting"
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Lists an owner's trash, most-recently-deleted first, with the
    /// original location rendered through deleted ancestors.
    pub async fn list_trash(
        &self,
        _ctx: &RequestContext,
        owner_id: Uuid,
        filter: &TrashFilter,
    ) -> Result<Vec<TrashEntry>, AppError> {
        let items = self.trash.list_trash(owner_id, filter).await?;
        let mut entries = Vec::with_capacity(items.len());
        for item in items {
            let original_path = match self.tree.full_path(item.original_location()).await {
                Ok(path) => path,
                // The recorded location was purged; show the item at root.
                Err(e) if e.kind == ErrorKind::NotFound => String::new(),
                Err(e) => return Err(e),
            };
            entries.push(TrashEntry {
                item,
                original_path,
            });
        }
        Ok(entries)
    }

    /// Permanently purges every trashed item of an owner. Irreversible;
    /// confirmation is the caller's contract.
    pub async fn empty_trash(&self, ctx: &RequestContext, owner_id: Uuid) -> Result<u64, AppError> {
        let outcome = self.trash.purge_for_owner(owner_id).await?;
        self.cleanup_blobs(&outcome).await;
        self.tree.invalidate();

        info!(
            actor_id = %ctx.actor_id,
            owner_id = %owner_id,
            purged = outcome.total(),
            "Trash emptied"
        );
        self.events.publish(DomainEvent::new(
            Some(ctx.actor_id),
            EventPayload::Trash(TrashEvent::Emptied {
                owner_id,
                purged: outcome.total(),
            }),
        ));
        Ok(outcome.total())
    }

    /// Permanently purges trashed items older than the retention window,
    /// across all owners. Idempotent; safe to run concurrently.
    pub async fn purge_expired(&self) -> Result<u64, AppError> {
        let cutoff = Utc::now() - Duration::days(self.retention.window_days);
        let outcome = self.trash.purge_expired(cutoff).await?;
        self.cleanup_blobs(&outcome).await;

        if outcome.total() > 0 {
            self.tree.invalidate();
            info!(
                purged = outcome.total(),
                window_days = self.retention.window_days,
                "Retention sweep purged expired trash"
            );
            self.events.publish(DomainEvent::new(
                None,
                EventPayload::Trash(TrashEvent::RetentionSweep {
                    purged: outcome.total(),
                }),
            ));
        }
        Ok(outcome.total())
    }

    /// Permanently purges one trashed item. For a folder this includes its
    /// trashed subtree, so no unreachable trash rows are left behind.
    pub async fn purge_item(&self, ctx: &RequestContext, item: ItemRef) -> Result<u64, AppError> {
        let outcome = match item.kind {
            ItemKind::Folder => {
                let subtree = self.trash.trashed_folder_subtree(item.id).await?;
                if subtree.is_empty() {
                    return match self.folders.find_by_id(item.id).await? {
                        Some(_) => Err(AppError::conflict("Folder is not in the trash")),
                        None => Err(AppError::not_found("Folder not found")),
                    };
                }
                let folder_ids: Vec<Uuid> = subtree.iter().map(|f| f.id).collect();
                let file_ids: Vec<Uuid> = self
                    .trash
                    .trashed_files_in_folders(&folder_ids)
                    .await?
                    .iter()
                    .map(|f| f.id)
                    .collect();
                let outcome = self.trash.purge_items(&folder_ids, &file_ids).await?;
                self.events.publish(DomainEvent::new(
                    Some(ctx.actor_id),
                    EventPayload::Folder(FolderEvent::Purged { folder_id: item.id }),
                ));
                outcome
            }
            ItemKind::File => {
                let file = self
                    .files
                    .find_by_id(item.id)
                    .await?
                    .ok_or_else(|| AppError::not_found("File not found"))?;
                if !file.is_deleted() {
                    return Err(AppError::conflict("File is not in the trash"));
                }
                let outcome = self.trash.purge_items(&[], &[item.id]).await?;
                self.events.publish(DomainEvent::new(
                    Some(ctx.actor_id),
                    EventPayload::File(FileEvent::Purged { file_id: item.id }),
                ));
                outcome
            }
        };

        self.cleanup_blobs(&outcome).await;
        info!(
            actor_id = %ctx.actor_id,
            item_id = %item.id,
            kind = %item.kind,
            purged = outcome.total(),
            "Item permanently purged"
        );
        Ok(outcome.total())
    }

    /// Resolve where a restored item should reattach: its recorded
    /// original location when that folder is still live, otherwise the
    /// root.
    async fn resolve_restore_parent(
        &self,
        original: Option<Uuid>,
    ) -> Result<Option<Uuid>, AppError> {
        match original {
            Some(id) => match self.folders.find_by_id(id).await? {
                Some(folder) if !folder.is_deleted() => Ok(Some(id)),
                _ => Ok(None),
            },
            None => Ok(None),
        }
    }

    /// Reject a restore whose target slot is occupied by a live folder of
    /// the same name.
    async fn ensure_folder_slot_free(
        &self,
        folder: &studydrive_entity::folder::Folder,
        target: Option<Uuid>,
    ) -> Result<(), AppError> {
        if self
            .folders
            .find_live_child_named(folder.owner_id, target, &folder.name)
            .await?
            .is_some()
        {
            return Err(AppError::validation(format!(
                "A live folder named '{}' already occupies the restore location",
                folder.name
            )));
        }
        Ok(())
    }

    /// Restore one trashed folder (not its contents).
    async fn restore_single_folder(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
    ) -> Result<(), AppError> {
        let folder = self
            .folders
            .find_by_id(folder_id)
            .await?
            .ok_or_else(|| AppError::not_found("Folder not found"))?;
        if !folder.is_deleted() {
            return Err(AppError::conflict("Folder is not in the trash"));
        }

        let target = self.resolve_restore_parent(folder.original_parent_id).await?;
        self.ensure_folder_slot_free(&folder, target).await?;

        let cascade = RestoreCascade {
            restored_at: Utc::now(),
            folders: vec![RestoreTarget {
                id: folder.id,
                version: folder.version,
                new_parent_id: target,
            }],
            files: Vec::new(),
        };
        self.trash.restore_cascade(&cascade).await?;
        self.tree.invalidate();

        info!(
            actor_id = %ctx.actor_id,
            folder_id = %folder_id,
            parent_id = ?target,
            "Folder restored"
        );
        self.events.publish(DomainEvent::new(
            Some(ctx.actor_id),
            EventPayload::Folder(FolderEvent::Restored {
                folder_id,
                parent_id: target,
            }),
        ));
        Ok(())
    }

    /// Restore one trashed file.
    async fn restore_single_file(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
    ) -> Result<(), AppError> {
        let file = self
            .files
            .find_by_id(file_id)
            .await?
            .ok_or_else(|| AppError::not_found("File not found"))?;
        if !file.is_deleted() {
            return Err(AppError::conflict("File is not in the trash"));
        }

        let target = self.resolve_restore_parent(file.original_folder_id).await?;
        if self
            .files
            .find_live_named(file.owner_id, target, &file.name)
            .await?
            .is_some()
        {
            return Err(AppError::validation(format!(
                "A live file named '{}' already occupies the restore location",
                file.name
            )));
        }

        let cascade = RestoreCascade {
            restored_at: Utc::now(),
            folders: Vec::new(),
            files: vec![RestoreTarget {
                id: file.id,
                version: file.version,
                new_parent_id: target,
            }],
        };
        self.trash.restore_cascade(&cascade).await?;
        self.tree.invalidate();

        info!(
            actor_id = %ctx.actor_id,
            file_id = %file_id,
            folder_id = ?target,
            "File restored"
        );
        self.events.publish(DomainEvent::new(
            Some(ctx.actor_id),
            EventPayload::File(FileEvent::Restored {
                file_id,
                folder_id: target,
            }),
        ));
        Ok(())
    }

    /// Request blob deletion for purged files. Failure is a cleanup
    /// warning, never an operation failure: the metadata row is
    /// authoritative and an orphaned blob is a later cleanup problem.
    async fn cleanup_blobs(&self, outcome: &PurgeOutcome) {
        for file in &outcome.purged_files {
            if let Err(e) = self.blobs.delete(&file.content_ref).await {
                warn!(
                    file_id = %file.id,
                    content_ref = %file.content_ref,
                    error = %e,
                    "Blob cleanup failed after purge; blob left orphaned"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::TestEnv;
    use bytes::Bytes;
    use studydrive_entity::folder::Folder;

    /// Build the scenario tree: "Reports" (root) > "2024" > "q1.pdf".
    async fn scenario(env: &TestEnv) -> (Folder, Folder, studydrive_entity::file::File) {
        let reports = env.mkdir(None, "Reports").await;
        let y2024 = env.mkdir(Some(reports.id), "2024").await;
        let q1 = env.mkfile(Some(y2024.id), "q1.pdf").await;
        (reports, y2024, q1)
    }

    #[tokio::test]
    async fn test_cascade_stamps_whole_subtree() {
        let env = TestEnv::new().await;
        let (reports, y2024, q1) = scenario(&env).await;

        let stamped = env
            .trash
            .soft_delete_folder(&env.ctx, reports.id)
            .await
            .unwrap();
        assert_eq!(stamped, 3);

        let reports_after = env.folder(reports.id).await;
        let y2024_after = env.folder(y2024.id).await;
        let q1_after = env.file(q1.id).await;

        for deleted_at in [
            reports_after.deleted_at,
            y2024_after.deleted_at,
            q1_after.deleted_at,
        ] {
            assert!(deleted_at.is_some());
        }
        assert_eq!(reports_after.deleted_by, Some(env.ctx.actor_id));

        // Each member records its own immediate location.
        assert_eq!(reports_after.original_parent_id, None);
        assert_eq!(y2024_after.original_parent_id, Some(reports.id));
        assert_eq!(q1_after.original_folder_id, Some(y2024.id));

        // Nothing remains visible in the live tree.
        assert!(env.folders.list_roots(&env.ctx, env.owner).await.unwrap().is_empty());
        assert!(
            env.files
                .list_files(&env.ctx, env.owner, None)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_restore_with_contents_is_inverse_of_soft_delete() {
        let env = TestEnv::new().await;
        let (reports, y2024, q1) = scenario(&env).await;

        env.trash
            .soft_delete_folder(&env.ctx, reports.id)
            .await
            .unwrap();
        let restored = env
            .trash
            .restore_folder_with_contents(&env.ctx, reports.id)
            .await
            .unwrap();
        assert_eq!(restored, 3);

        let reports_after = env.folder(reports.id).await;
        let y2024_after = env.folder(y2024.id).await;
        let q1_after = env.file(q1.id).await;

        // Exactly the pre-deletion shape.
        assert_eq!(reports_after.parent_id, None);
        assert_eq!(y2024_after.parent_id, Some(reports.id));
        assert_eq!(q1_after.folder_id, Some(y2024.id));

        // Deletion fields cleared together.
        assert!(!reports_after.is_deleted());
        assert!(y2024_after.deleted_by.is_none());
        assert!(y2024_after.original_parent_id.is_none());
        assert!(!q1_after.is_deleted());

        // Live again, trash empty.
        let roots = env.folders.list_roots(&env.ctx, env.owner).await.unwrap();
        assert_eq!(roots.len(), 1);
        let trash = env
            .trash
            .list_trash(&env.ctx, env.owner, &TrashFilter::default())
            .await
            .unwrap();
        assert!(trash.is_empty());
    }

    #[tokio::test]
    async fn test_soft_delete_rejects_missing_and_trashed_targets() {
        let env = TestEnv::new().await;
        let folder = env.mkdir(None, "once").await;
        env.trash
            .soft_delete_folder(&env.ctx, folder.id)
            .await
            .unwrap();

        let err = env
            .trash
            .soft_delete_folder(&env.ctx, folder.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);

        let err = env
            .trash
            .soft_delete_folder(&env.ctx, Uuid::new_v4())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_single_restore_falls_back_to_root_when_parent_trashed() {
        let env = TestEnv::new().await;
        let q = env.mkdir(None, "Q").await;
        let p = env.mkdir(Some(q.id), "P").await;
        let y = env.mkfile(Some(p.id), "y.txt").await;

        env.trash.soft_delete_folder(&env.ctx, p.id).await.unwrap();
        env.trash.soft_delete_folder(&env.ctx, q.id).await.unwrap();

        // P is still in the trash, so Y must land at the root, never under
        // a deleted P.
        env.trash
            .restore_item(&env.ctx, ItemRef::file(y.id))
            .await
            .unwrap();
        let y_after = env.file(y.id).await;
        assert!(!y_after.is_deleted());
        assert_eq!(y_after.folder_id, None);
    }

    #[tokio::test]
    async fn test_single_restore_reattaches_to_live_original() {
        let env = TestEnv::new().await;
        let p = env.mkdir(None, "P").await;
        let y = env.mkfile(Some(p.id), "y.txt").await;

        env.trash.soft_delete_folder(&env.ctx, p.id).await.unwrap();
        env.trash
            .restore_item(&env.ctx, ItemRef::folder(p.id))
            .await
            .unwrap();
        env.trash
            .restore_item(&env.ctx, ItemRef::file(y.id))
            .await
            .unwrap();

        assert_eq!(env.file(y.id).await.folder_id, Some(p.id));
    }

    #[tokio::test]
    async fn test_restore_with_contents_includes_items_trashed_separately() {
        let env = TestEnv::new().await;
        let (reports, y2024, q1) = scenario(&env).await;

        // The file goes first on its own, then the folder cascade.
        env.trash.soft_delete_file(&env.ctx, q1.id).await.unwrap();
        env.trash
            .soft_delete_folder(&env.ctx, reports.id)
            .await
            .unwrap();

        let restored = env
            .trash
            .restore_folder_with_contents(&env.ctx, reports.id)
            .await
            .unwrap();
        assert_eq!(restored, 3);
        assert_eq!(env.file(q1.id).await.folder_id, Some(y2024.id));
    }

    #[tokio::test]
    async fn test_restore_of_nested_folder_falls_back_to_root() {
        let env = TestEnv::new().await;
        let (reports, y2024, _q1) = scenario(&env).await;
        env.trash
            .soft_delete_folder(&env.ctx, reports.id)
            .await
            .unwrap();

        // Restoring the nested folder alone: its original parent is still
        // trashed, so the subtree surfaces at the root.
        let restored = env
            .trash
            .restore_folder_with_contents(&env.ctx, y2024.id)
            .await
            .unwrap();
        assert_eq!(restored, 2);

        let y2024_after = env.folder(y2024.id).await;
        assert!(!y2024_after.is_deleted());
        assert_eq!(y2024_after.parent_id, None);
        assert!(env.folder(reports.id).await.is_deleted());
    }

    #[tokio::test]
    async fn test_restore_racing_purge_has_one_winner() {
        let env = TestEnv::new().await;
        let file = env.mkfile(None, "contested.txt").await;
        env.trash.soft_delete_file(&env.ctx, file.id).await.unwrap();

        // Purge commits first: the restore sees nothing to revive.
        env.trash
            .purge_item(&env.ctx, ItemRef::file(file.id))
            .await
            .unwrap();
        let err = env
            .trash
            .restore_item(&env.ctx, ItemRef::file(file.id))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);

        // Restore commits first: the purge refuses a live item.
        let file = env.mkfile(None, "contested2.txt").await;
        env.trash.soft_delete_file(&env.ctx, file.id).await.unwrap();
        env.trash
            .restore_item(&env.ctx, ItemRef::file(file.id))
            .await
            .unwrap();
        let err = env
            .trash
            .purge_item(&env.ctx, ItemRef::file(file.id))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
        assert!(!env.file(file.id).await.is_deleted());
    }

    #[tokio::test]
    async fn test_purge_expired_is_idempotent() {
        let env = TestEnv::new().await;
        let sweeper = env.trash_with_retention(0);

        let folder = env.mkdir(None, "old").await;
        let file = env.mkfile(None, "old.txt").await;
        env.trash
            .soft_delete_folder(&env.ctx, folder.id)
            .await
            .unwrap();
        env.trash.soft_delete_file(&env.ctx, file.id).await.unwrap();

        let first = sweeper.purge_expired().await.unwrap();
        assert_eq!(first, 2);
        let second = sweeper.purge_expired().await.unwrap();
        assert_eq!(second, 0);
    }

    #[tokio::test]
    async fn test_purge_expired_spares_recent_trash() {
        let env = TestEnv::new().await;
        let file = env.mkfile(None, "fresh.txt").await;
        env.trash.soft_delete_file(&env.ctx, file.id).await.unwrap();

        // Default 30-day window: a just-deleted item stays recoverable.
        assert_eq!(env.trash.purge_expired().await.unwrap(), 0);
        assert!(env.file(file.id).await.is_deleted());
    }

    #[tokio::test]
    async fn test_empty_trash_purges_metadata_and_blobs() {
        let env = TestEnv::new().await;
        let file = env
            .files
            .upload(
                &env.ctx,
                crate::file::UploadFileRequest {
                    owner_id: env.owner,
                    folder_id: None,
                    name: "essay.txt".to_string(),
                    content_type: None,
                    description: None,
                    data: Bytes::from("final draft"),
                },
            )
            .await
            .unwrap();
        let content_ref = file.content_ref.clone();
        env.trash.soft_delete_file(&env.ctx, file.id).await.unwrap();

        let purged = env.trash.empty_trash(&env.ctx, env.owner).await.unwrap();
        assert_eq!(purged, 1);
        assert!(!env.blobs.exists(&content_ref).await.unwrap());
        assert!(
            env.trash
                .list_trash(&env.ctx, env.owner, &TrashFilter::default())
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_list_trash_annotations_and_filters() {
        let env = TestEnv::new().await;
        let (reports, y2024, q1) = scenario(&env).await;
        env.trash
            .soft_delete_folder(&env.ctx, reports.id)
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let loose = env.mkfile(None, "loose.txt").await;
        env.trash.soft_delete_file(&env.ctx, loose.id).await.unwrap();

        let all = env
            .trash
            .list_trash(&env.ctx, env.owner, &TrashFilter::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 4);
        // Most recently deleted first.
        assert_eq!(all[0].item.id(), loose.id);

        // The file deep in the cascade shows its path through deleted
        // ancestors.
        let q1_entry = all.iter().find(|e| e.item.id() == q1.id).unwrap();
        assert_eq!(q1_entry.original_path, "Reports / 2024");
        assert_eq!(q1_entry.item.deleted_by(), Some(env.ctx.actor_id));
        let y2024_entry = all.iter().find(|e| e.item.id() == y2024.id).unwrap();
        assert_eq!(y2024_entry.original_path, "Reports");

        let files_only = env
            .trash
            .list_trash(
                &env.ctx,
                env.owner,
                &TrashFilter {
                    name_contains: None,
                    kind: Some(ItemKind::File),
                },
            )
            .await
            .unwrap();
        assert_eq!(files_only.len(), 2);

        let named = env
            .trash
            .list_trash(
                &env.ctx,
                env.owner,
                &TrashFilter {
                    name_contains: Some("LOOSE".to_string()),
                    kind: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(named.len(), 1);
        assert_eq!(named[0].item.id(), loose.id);
    }

    #[tokio::test]
    async fn test_purge_folder_removes_trashed_subtree() {
        let env = TestEnv::new().await;
        let (reports, y2024, q1) = scenario(&env).await;
        env.trash
            .soft_delete_folder(&env.ctx, reports.id)
            .await
            .unwrap();

        let purged = env
            .trash
            .purge_item(&env.ctx, ItemRef::folder(reports.id))
            .await
            .unwrap();
        assert_eq!(purged, 3);

        use studydrive_database::store::{FileStore, FolderStore};
        assert!(
            FolderStore::find_by_id(env.store.as_ref(), y2024.id)
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            FileStore::find_by_id(env.store.as_ref(), q1.id)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_restore_blocked_by_live_name_squatter() {
        let env = TestEnv::new().await;
        let original = env.mkdir(None, "Reports").await;
        env.trash
            .soft_delete_folder(&env.ctx, original.id)
            .await
            .unwrap();
        env.mkdir(None, "Reports").await;

        let err = env
            .trash
            .restore_item(&env.ctx, ItemRef::folder(original.id))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_bulk_restore_reports_partial_failures() {
        let env = TestEnv::new().await;
        let file = env.mkfile(None, "ok.txt").await;
        env.trash.soft_delete_file(&env.ctx, file.id).await.unwrap();

        let outcome = env
            .trash
            .restore_items(
                &env.ctx,
                &[ItemRef::file(file.id), ItemRef::file(Uuid::new_v4())],
            )
            .await
            .unwrap();
        assert_eq!(outcome.restored, 1);
        assert_eq!(outcome.failures.len(), 1);
        assert!(!env.file(file.id).await.is_deleted());
    }
}
