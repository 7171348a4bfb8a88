//! Folder CRUD operations.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use studydrive_core::error::AppError;
use studydrive_core::events::{DomainEvent, EventBus, EventPayload, FolderEvent};
use studydrive_database::store::FolderStore;
use studydrive_entity::folder::{CreateFolder, Folder};

use crate::context::RequestContext;
use crate::folder::tree::TreeService;

/// Maximum folder/file name length.
pub const MAX_NAME_LENGTH: usize = 255;

/// Manages folder CRUD operations.
#[derive(Debug, Clone)]
pub struct FolderService {
    /// Folder store.
    folders: Arc<dyn FolderStore>,
    /// Tree navigation service (for cache invalidation).
    tree: Arc<TreeService>,
    /// Event bus.
    events: EventBus,
}

/// Request to create a new folder.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CreateFolderRequest {
    /// The owner whose tree receives the folder.
    pub owner_id: Uuid,
    /// Parent folder ID (None for root level).
    pub parent_id: Option<Uuid>,
    /// Folder name.
    pub name: String,
}

/// Validate and normalize an incoming folder or file name.
pub(crate) fn normalize_name(name: &str) -> Result<String, AppError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("Name cannot be empty"));
    }
    if trimmed.len() > MAX_NAME_LENGTH {
        return Err(AppError::validation(format!(
            "Name exceeds {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(trimmed.to_string())
}

impl FolderService {
    /// Creates a new folder service.
    pub fn new(folders: Arc<dyn FolderStore>, tree: Arc<TreeService>, events: EventBus) -> Self {
        Self {
            folders,
            tree,
            events,
        }
    }

    /// Gets a folder by ID, live or trashed.
    pub async fn get_folder(
        &self,
        _ctx: &RequestContext,
        folder_id: Uuid,
    ) -> Result<Folder, AppError> {
        self.folders
            .find_by_id(folder_id)
            .await?
            .ok_or_else(|| AppError::not_found("Folder not found"))
    }

    /// Lists an owner's live root-level folders.
    pub async fn list_roots(
        &self,
        _ctx: &RequestContext,
        owner_id: Uuid,
    ) -> Result<Vec<Folder>, AppError> {
        self.folders.list_children(owner_id, None).await
    }

    /// Lists live children of a folder.
    pub async fn list_children(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
    ) -> Result<Vec<Folder>, AppError> {
        let folder = self.get_folder(ctx, folder_id).await?;
        if folder.is_deleted() {
            return Err(AppError::not_found("Folder is in the trash"));
        }
        self.folders
            .list_children(folder.owner_id, Some(folder_id))
            .await
    }

    /// Creates a new folder.
    pub async fn create_folder(
        &self,
        ctx: &RequestContext,
        req: CreateFolderRequest,
    ) -> Result<Folder, AppError> {
        let name = normalize_name(&req.name)?;

        if let Some(parent_id) = req.parent_id {
            let parent = self.get_folder(ctx, parent_id).await?;
            if parent.is_deleted() {
                return Err(AppError::not_found("Parent folder is in the trash"));
            }
            if parent.owner_id != req.owner_id {
                return Err(AppError::validation(
                    "Parent folder belongs to a different owner",
                ));
            }
        }

        // Friendlier than waiting for the unique index to fire.
        if self
            .folders
            .find_live_child_named(req.owner_id, req.parent_id, &name)
            .await?
            .is_some()
        {
            return Err(AppError::validation(format!(
                "A folder named '{name}' already exists here"
            )));
        }

        let folder = self
            .folders
            .create(&CreateFolder {
                parent_id: req.parent_id,
                name,
                owner_id: req.owner_id,
            })
            .await?;

        info!(
            actor_id = %ctx.actor_id,
            folder_id = %folder.id,
            owner_id = %folder.owner_id,
            "Folder created"
        );
        self.events.publish(DomainEvent::new(
            Some(ctx.actor_id),
            EventPayload::Folder(FolderEvent::Created {
                folder_id: folder.id,
                parent_id: folder.parent_id,
                owner_id: folder.owner_id,
                name: folder.name.clone(),
            }),
        ));

        Ok(folder)
    }

    /// Renames a folder.
    pub async fn rename_folder(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
        new_name: &str,
    ) -> Result<Folder, AppError> {
        let name = normalize_name(new_name)?;

        let folder = self.get_folder(ctx, folder_id).await?;
        if folder.is_deleted() {
            return Err(AppError::not_found("Folder is in the trash"));
        }

        if let Some(existing) = self
            .folders
            .find_live_child_named(folder.owner_id, folder.parent_id, &name)
            .await?
            && existing.id != folder_id
        {
            return Err(AppError::validation(format!(
                "A folder named '{name}' already exists here"
            )));
        }

        let renamed = self
            .folders
            .rename(folder_id, &name, folder.version)
            .await?;

        // Breadcrumb chains embed folder names.
        self.tree.invalidate();

        info!(
            actor_id = %ctx.actor_id,
            folder_id = %folder_id,
            new_name = %name,
            "Folder renamed"
        );
        self.events.publish(DomainEvent::new(
            Some(ctx.actor_id),
            EventPayload::Folder(FolderEvent::Renamed {
                folder_id,
                name: renamed.name.clone(),
            }),
        ));

        Ok(renamed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::TestEnv;
    use studydrive_core::error::ErrorKind;

    #[tokio::test]
    async fn test_create_and_list_roots() {
        let env = TestEnv::new().await;

        let folder = env
            .folders
            .create_folder(
                &env.ctx,
                CreateFolderRequest {
                    owner_id: env.owner,
                    parent_id: None,
                    name: "Reports".to_string(),
                },
            )
            .await
            .unwrap();
        assert!(folder.is_root());

        let roots = env.folders.list_roots(&env.ctx, env.owner).await.unwrap();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].name, "Reports");
    }

    #[tokio::test]
    async fn test_empty_name_is_rejected() {
        let env = TestEnv::new().await;
        let err = env
            .folders
            .create_folder(
                &env.ctx,
                CreateFolderRequest {
                    owner_id: env.owner,
                    parent_id: None,
                    name: "   ".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_duplicate_live_sibling_is_rejected_case_insensitively() {
        let env = TestEnv::new().await;
        env.mkdir(None, "Reports").await;

        let err = env
            .folders
            .create_folder(
                &env.ctx,
                CreateFolderRequest {
                    owner_id: env.owner,
                    parent_id: None,
                    name: "reports".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_trashed_name_does_not_block_reuse() {
        let env = TestEnv::new().await;
        let old = env.mkdir(None, "Reports").await;
        env.trash.soft_delete_folder(&env.ctx, old.id).await.unwrap();

        let replacement = env
            .folders
            .create_folder(
                &env.ctx,
                CreateFolderRequest {
                    owner_id: env.owner,
                    parent_id: None,
                    name: "Reports".to_string(),
                },
            )
            .await
            .unwrap();
        assert_ne!(replacement.id, old.id);
    }

    #[tokio::test]
    async fn test_create_under_trashed_parent_is_rejected() {
        let env = TestEnv::new().await;
        let parent = env.mkdir(None, "Reports").await;
        env.trash
            .soft_delete_folder(&env.ctx, parent.id)
            .await
            .unwrap();

        let err = env
            .folders
            .create_folder(
                &env.ctx,
                CreateFolderRequest {
                    owner_id: env.owner,
                    parent_id: Some(parent.id),
                    name: "2024".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_rename_checks_siblings_but_allows_self() {
        let env = TestEnv::new().await;
        let a = env.mkdir(None, "a").await;
        env.mkdir(None, "b").await;

        // Renaming onto a sibling's name fails.
        let err = env
            .folders
            .rename_folder(&env.ctx, a.id, "b")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        // Renaming to its own name (case change) is allowed.
        let renamed = env.folders.rename_folder(&env.ctx, a.id, "A").await.unwrap();
        assert_eq!(renamed.name, "A");
        assert_eq!(renamed.version, a.version + 1);
    }

    #[tokio::test]
    async fn test_list_children_excludes_trashed() {
        let env = TestEnv::new().await;
        let root = env.mkdir(None, "root").await;
        env.mkdir(Some(root.id), "keep").await;
        let gone = env.mkdir(Some(root.id), "gone").await;
        env.trash.soft_delete_folder(&env.ctx, gone.id).await.unwrap();

        let children = env.folders.list_children(&env.ctx, root.id).await.unwrap();
        let names: Vec<&str> = children.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["keep"]);
    }
}
