//! Path resolution and reparent validation.
//!
//! Both concerns share one bounded ancestor walk: breadcrumbs are the walk
//! rendered root-first, and the cycle check is the walk searched for the
//! moving folder's id. Sharing the walk keeps the failure modes identical.

use std::sync::Arc;

use moka::future::Cache;
use uuid::Uuid;

use studydrive_core::error::AppError;
use studydrive_core::result::AppResult;
use studydrive_core::types::ItemKind;
use studydrive_database::store::FolderStore;
use studydrive_entity::folder::path::render_path;
use studydrive_entity::folder::{Breadcrumb, Folder};
use studydrive_entity::item::Item;

/// Upper bound on ancestor-walk length.
///
/// The live tree is a forest, so a walk longer than this can only mean the
/// persisted data no longer upholds the invariant (crash mid-write,
/// manual edits). Failing beats looping.
pub const MAX_TREE_DEPTH: usize = 1000;

/// Capacity of the breadcrumb cache.
const BREADCRUMB_CACHE_CAPACITY: u64 = 10_000;

/// Outcome of a reparent validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReparentCheck {
    /// The move is valid and changes the item's location.
    Move,
    /// The destination equals the current location; nothing to do.
    NoOp,
}

/// Resolves ancestor chains and validates reparent requests.
#[derive(Debug, Clone)]
pub struct TreeService {
    /// Folder store.
    folders: Arc<dyn FolderStore>,
    /// Resolved breadcrumb chains by folder id, dropped on tree mutation.
    breadcrumbs: Cache<Uuid, Arc<Vec<Breadcrumb>>>,
}

impl TreeService {
    /// Creates a new tree service.
    pub fn new(folders: Arc<dyn FolderStore>) -> Self {
        Self {
            folders,
            breadcrumbs: Cache::new(BREADCRUMB_CACHE_CAPACITY),
        }
    }

    /// Walk the parent chain of a folder, returning the chain root-first.
    ///
    /// The walk traverses deleted folders (trash views need paths through
    /// deleted ancestors). A vanished ancestor ends the chain early; only
    /// the starting folder itself must exist. Exceeding
    /// [`MAX_TREE_DEPTH`] fails with `CorruptTree`.
    pub async fn ancestors(&self, folder_id: Uuid) -> AppResult<Vec<Folder>> {
        let mut chain: Vec<Folder> = Vec::new();
        let mut cursor = Some(folder_id);

        while let Some(id) = cursor {
            if chain.len() >= MAX_TREE_DEPTH {
                return Err(AppError::corrupt_tree(format!(
                    "Ancestor walk from folder {folder_id} exceeded {MAX_TREE_DEPTH} steps"
                )));
            }
            match self.folders.find_by_id(id).await? {
                Some(folder) => {
                    cursor = folder.parent_id;
                    chain.push(folder);
                }
                None if chain.is_empty() => {
                    return Err(AppError::not_found(format!("Folder {id} not found")));
                }
                // A purged ancestor: render the path up to here.
                None => break,
            }
        }

        chain.reverse();
        Ok(chain)
    }

    /// Breadcrumbs from the root to the given folder, root-first.
    ///
    /// `None` is the root itself and yields an empty chain. Crumbs carry a
    /// `deleted` flag; trash views render through deleted ancestors while
    /// live navigation filters them out.
    pub async fn breadcrumbs(&self, folder_id: Option<Uuid>) -> AppResult<Arc<Vec<Breadcrumb>>> {
        let Some(id) = folder_id else {
            return Ok(Arc::new(Vec::new()));
        };

        if let Some(hit) = self.breadcrumbs.get(&id).await {
            return Ok(hit);
        }

        let crumbs: Vec<Breadcrumb> = self
            .ancestors(id)
            .await?
            .iter()
            .map(Breadcrumb::from_folder)
            .collect();
        let crumbs = Arc::new(crumbs);
        self.breadcrumbs.insert(id, Arc::clone(&crumbs)).await;
        Ok(crumbs)
    }

    /// Breadcrumbs restricted to live ancestors, for live-tree navigation.
    pub async fn live_breadcrumbs(&self, folder_id: Option<Uuid>) -> AppResult<Vec<Breadcrumb>> {
        let crumbs = self.breadcrumbs(folder_id).await?;
        Ok(crumbs.iter().filter(|c| !c.deleted).cloned().collect())
    }

    /// Human-readable full path of a folder (`"A / B / C"`; empty for the
    /// root).
    pub async fn full_path(&self, folder_id: Option<Uuid>) -> AppResult<String> {
        let crumbs = self.breadcrumbs(folder_id).await?;
        Ok(render_path(&crumbs))
    }

    /// Drop all cached breadcrumb chains.
    ///
    /// Called after any tree mutation (move, soft-delete, restore, purge);
    /// chains are cheap to rebuild.
    pub fn invalidate(&self) {
        self.breadcrumbs.invalidate_all();
    }

    /// Validate moving `item` under `new_parent_id` (None = root).
    ///
    /// Pure check, no side effects. For folders this rejects self-parenting
    /// and any destination inside the folder's own subtree, detected by
    /// walking up from the destination: if the moving folder's id appears
    /// in that chain, the move would create a cycle.
    pub async fn check_reparent(
        &self,
        item: &Item,
        new_parent_id: Option<Uuid>,
    ) -> AppResult<ReparentCheck> {
        let current = match item {
            Item::Folder(f) => f.parent_id,
            Item::File(f) => f.folder_id,
        };
        if current == new_parent_id {
            return Ok(ReparentCheck::NoOp);
        }

        if let Some(dest_id) = new_parent_id {
            if item.kind() == ItemKind::Folder && dest_id == item.id() {
                return Err(AppError::validation("Cannot move a folder into itself"));
            }

            let dest = self
                .folders
                .find_by_id(dest_id)
                .await?
                .ok_or_else(|| AppError::not_found("Destination folder not found"))?;
            if dest.is_deleted() {
                return Err(AppError::not_found("Destination folder is in the trash"));
            }
            if dest.owner_id != item.owner_id() {
                return Err(AppError::validation(
                    "Destination folder belongs to a different owner",
                ));
            }

            if item.kind() == ItemKind::Folder {
                let dest_chain = self.ancestors(dest_id).await?;
                if dest_chain.iter().any(|f| f.id == item.id()) {
                    return Err(AppError::validation(
                        "Cannot move a folder into one of its descendants",
                    ));
                }
            }
        }

        Ok(ReparentCheck::Move)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::TestEnv;

    #[tokio::test]
    async fn test_breadcrumbs_root_is_empty() {
        let env = TestEnv::new().await;
        let crumbs = env.tree.breadcrumbs(None).await.unwrap();
        assert!(crumbs.is_empty());
        assert_eq!(env.tree.full_path(None).await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_breadcrumbs_are_root_first() {
        let env = TestEnv::new().await;
        let reports = env.mkdir(None, "Reports").await;
        let y2024 = env.mkdir(Some(reports.id), "2024").await;
        let q1 = env.mkdir(Some(y2024.id), "Q1").await;

        let crumbs = env.tree.breadcrumbs(Some(q1.id)).await.unwrap();
        let names: Vec<&str> = crumbs.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Reports", "2024", "Q1"]);
        assert_eq!(
            env.tree.full_path(Some(q1.id)).await.unwrap(),
            "Reports / 2024 / Q1"
        );
    }

    #[tokio::test]
    async fn test_missing_folder_is_not_found() {
        let env = TestEnv::new().await;
        let err = env.tree.breadcrumbs(Some(Uuid::new_v4())).await.unwrap_err();
        assert_eq!(err.kind, studydrive_core::error::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_parent_loop_fails_with_corrupt_tree() {
        let env = TestEnv::new().await;
        let a = env.mkdir(None, "a").await;
        let b = env.mkdir(Some(a.id), "b").await;

        // Corrupt the stored tree directly: a's parent becomes its own child.
        env.raw_reparent_folder(a.id, Some(b.id), a.version).await;

        let err = env.tree.ancestors(b.id).await.unwrap_err();
        assert_eq!(err.kind, studydrive_core::error::ErrorKind::CorruptTree);
    }

    #[tokio::test]
    async fn test_move_into_own_subtree_is_rejected() {
        let env = TestEnv::new().await;
        let a = env.mkdir(None, "a").await;
        let b = env.mkdir(Some(a.id), "b").await;
        let c = env.mkdir(Some(b.id), "c").await;

        let err = env
            .tree
            .check_reparent(&Item::Folder(a.clone()), Some(c.id))
            .await
            .unwrap_err();
        assert_eq!(err.kind, studydrive_core::error::ErrorKind::Validation);

        let err = env
            .tree
            .check_reparent(&Item::Folder(a.clone()), Some(a.id))
            .await
            .unwrap_err();
        assert_eq!(err.kind, studydrive_core::error::ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_unchanged_destination_is_noop() {
        let env = TestEnv::new().await;
        let a = env.mkdir(None, "a").await;
        let b = env.mkdir(Some(a.id), "b").await;

        let check = env
            .tree
            .check_reparent(&Item::Folder(b), Some(a.id))
            .await
            .unwrap();
        assert_eq!(check, ReparentCheck::NoOp);
    }

    #[tokio::test]
    async fn test_file_move_into_trashed_folder_is_rejected() {
        let env = TestEnv::new().await;
        let dest = env.mkdir(None, "dest").await;
        env.trash.soft_delete_folder(&env.ctx, dest.id).await.unwrap();

        let file = env.mkfile(None, "notes.txt").await;

        let err = env
            .tree
            .check_reparent(&Item::File(file), Some(dest.id))
            .await
            .unwrap_err();
        assert_eq!(err.kind, studydrive_core::error::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_move_to_valid_destination_is_allowed() {
        let env = TestEnv::new().await;
        let a = env.mkdir(None, "a").await;
        let b = env.mkdir(None, "b").await;

        let check = env
            .tree
            .check_reparent(&Item::Folder(b), Some(a.id))
            .await
            .unwrap();
        assert_eq!(check, ReparentCheck::Move);
    }
}
