//! Moving folders and files to a new parent.
//!
//! Batch moves are partial-success: each item is validated and applied
//! independently, so one item whose move would create a cycle cannot
//! block the other forty-nine.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use studydrive_core::error::AppError;
use studydrive_core::events::{DomainEvent, EventBus, EventPayload, FileEvent, FolderEvent};
use studydrive_core::types::{ItemKind, ItemRef};
use studydrive_database::store::{FileStore, FolderStore};
use studydrive_entity::item::Item;

use crate::context::RequestContext;
use crate::folder::tree::{ReparentCheck, TreeService};

/// One item that could not be moved, with the reason it was skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveFailure {
    /// The item that failed validation or application.
    pub item: ItemRef,
    /// Human-readable reason.
    pub reason: String,
}

/// Result of a batch move.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MoveOutcome {
    /// Items whose location changed.
    pub moved: usize,
    /// Items already at the destination (allowed, nothing done).
    pub unchanged: usize,
    /// Items skipped, with reasons.
    pub failures: Vec<MoveFailure>,
}

/// What applying a single move did.
enum MoveApplied {
    /// The item's location changed.
    Moved,
    /// The item was already at the destination.
    Unchanged,
}

/// Applies single and batch moves after cycle validation.
#[derive(Debug, Clone)]
pub struct ReparentService {
    /// Folder store.
    folders: Arc<dyn FolderStore>,
    /// File store.
    files: Arc<dyn FileStore>,
    /// Cycle validation and cache invalidation.
    tree: Arc<TreeService>,
    /// Event bus.
    events: EventBus,
}

impl ReparentService {
    /// Creates a new reparent service.
    pub fn new(
        folders: Arc<dyn FolderStore>,
        files: Arc<dyn FileStore>,
        tree: Arc<TreeService>,
        events: EventBus,
    ) -> Self {
        Self {
            folders,
            files,
            tree,
            events,
        }
    }

    /// Moves a batch of items to a destination folder (None = root).
    ///
    /// Items failing validation are reported in the outcome, never
    /// silently dropped; valid items move regardless of failures
    /// elsewhere in the batch.
    pub async fn move_items(
        &self,
        ctx: &RequestContext,
        items: &[ItemRef],
        destination_id: Option<Uuid>,
    ) -> Result<MoveOutcome, AppError> {
        let mut outcome = MoveOutcome::default();

        for item in items {
            match self.move_one(ctx, *item, destination_id).await {
                Ok(MoveApplied::Moved) => outcome.moved += 1,
                Ok(MoveApplied::Unchanged) => outcome.unchanged += 1,
                Err(e) => outcome.failures.push(MoveFailure {
                    item: *item,
                    reason: e.message.clone(),
                }),
            }
        }

        if outcome.moved > 0 {
            self.tree.invalidate();
        }

        info!(
            actor_id = %ctx.actor_id,
            moved = outcome.moved,
            unchanged = outcome.unchanged,
            failed = outcome.failures.len(),
            "Batch move completed"
        );
        Ok(outcome)
    }

    /// Validates and applies a single move.
    async fn move_one(
        &self,
        ctx: &RequestContext,
        item_ref: ItemRef,
        destination_id: Option<Uuid>,
    ) -> Result<MoveApplied, AppError> {
        let item = match item_ref.kind {
            ItemKind::Folder => self
                .folders
                .find_by_id(item_ref.id)
                .await?
                .map(Item::Folder),
            ItemKind::File => self.files.find_by_id(item_ref.id).await?.map(Item::File),
        }
        .ok_or_else(|| {
            AppError::not_found(format!("{} {} not found", item_ref.kind, item_ref.id))
        })?;

        if item.deleted_at().is_some() {
            return Err(AppError::not_found(format!(
                "{} {} is in the trash",
                item_ref.kind, item_ref.id
            )));
        }

        match self.tree.check_reparent(&item, destination_id).await? {
            ReparentCheck::NoOp => Ok(MoveApplied::Unchanged),
            ReparentCheck::Move => {
                match &item {
                    Item::Folder(folder) => {
                        self.folders
                            .reparent(folder.id, destination_id, folder.version)
                            .await?;
                        self.events.publish(DomainEvent::new(
                            Some(ctx.actor_id),
                            EventPayload::Folder(FolderEvent::Moved {
                                folder_id: folder.id,
                                from_parent_id: folder.parent_id,
                                to_parent_id: destination_id,
                            }),
                        ));
                    }
                    Item::File(file) => {
                        self.files
                            .reparent(file.id, destination_id, file.version)
                            .await?;
                        self.events.publish(DomainEvent::new(
                            Some(ctx.actor_id),
                            EventPayload::File(FileEvent::Moved {
                                file_id: file.id,
                                from_folder_id: file.folder_id,
                                to_folder_id: destination_id,
                            }),
                        ));
                    }
                }
                Ok(MoveApplied::Moved)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::TestEnv;

    #[tokio::test]
    async fn test_moves_file_and_folder() {
        let env = TestEnv::new().await;
        let dest = env.mkdir(None, "dest").await;
        let folder = env.mkdir(None, "src").await;
        let file = env.mkfile(None, "notes.txt").await;

        let outcome = env
            .reparent
            .move_items(
                &env.ctx,
                &[ItemRef::folder(folder.id), ItemRef::file(file.id)],
                Some(dest.id),
            )
            .await
            .unwrap();
        assert_eq!(outcome.moved, 2);
        assert!(outcome.failures.is_empty());

        assert_eq!(env.folder(folder.id).await.parent_id, Some(dest.id));
        assert_eq!(env.file(file.id).await.folder_id, Some(dest.id));
    }

    #[tokio::test]
    async fn test_partial_success_reports_cycling_folder() {
        let env = TestEnv::new().await;
        let a = env.mkdir(None, "a").await;
        let b = env.mkdir(Some(a.id), "b").await;
        let dest = env.mkdir(Some(b.id), "dest").await;
        let file = env.mkfile(None, "x.txt").await;

        // Moving `a` into its own grandchild cycles; the file is unrelated
        // and must still move.
        let outcome = env
            .reparent
            .move_items(
                &env.ctx,
                &[ItemRef::folder(a.id), ItemRef::file(file.id)],
                Some(dest.id),
            )
            .await
            .unwrap();

        assert_eq!(outcome.moved, 1);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].item, ItemRef::folder(a.id));
        assert_eq!(env.file(file.id).await.folder_id, Some(dest.id));
        assert_eq!(env.folder(a.id).await.parent_id, None);
    }

    #[tokio::test]
    async fn test_unchanged_item_is_counted_not_failed() {
        let env = TestEnv::new().await;
        let dest = env.mkdir(None, "dest").await;
        let file = env.mkfile(Some(dest.id), "x.txt").await;

        let outcome = env
            .reparent
            .move_items(&env.ctx, &[ItemRef::file(file.id)], Some(dest.id))
            .await
            .unwrap();
        assert_eq!(outcome.moved, 0);
        assert_eq!(outcome.unchanged, 1);
        assert!(outcome.failures.is_empty());
    }

    #[tokio::test]
    async fn test_move_to_root() {
        let env = TestEnv::new().await;
        let parent = env.mkdir(None, "parent").await;
        let child = env.mkdir(Some(parent.id), "child").await;

        let outcome = env
            .reparent
            .move_items(&env.ctx, &[ItemRef::folder(child.id)], None)
            .await
            .unwrap();
        assert_eq!(outcome.moved, 1);
        assert_eq!(env.folder(child.id).await.parent_id, None);
    }

    #[tokio::test]
    async fn test_missing_item_is_reported() {
        let env = TestEnv::new().await;
        let outcome = env
            .reparent
            .move_items(&env.ctx, &[ItemRef::file(Uuid::new_v4())], None)
            .await
            .unwrap();
        assert_eq!(outcome.moved, 0);
        assert_eq!(outcome.failures.len(), 1);
    }
}
