//! Folder repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use studydrive_core::error::{AppError, ErrorKind};
use studydrive_core::result::AppResult;
use studydrive_entity::folder::{CreateFolder, Folder};

use crate::store::FolderStore;

/// Column projection used when selecting out of CTEs.
const FOLDER_COLUMNS: &str = "id, parent_id, name, owner_id, version, created_at, updated_at, \
     deleted_at, deleted_by, original_parent_id";

/// Repository for folder CRUD and tree queries.
#[derive(Debug, Clone)]
pub struct FolderRepository {
    pool: PgPool,
}

impl FolderRepository {
    /// Create a new folder repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Explain why a guarded update matched no row.
    async fn explain_update_miss(&self, id: Uuid) -> AppError {
        match self.find_by_id(id).await {
            Ok(Some(folder)) if folder.is_deleted() => {
                AppError::not_found(format!("Folder {id} is in the trash"))
            }
            Ok(Some(_)) => AppError::conflict(format!("Folder {id} was modified concurrently")),
            Ok(None) => AppError::not_found(format!("Folder {id} not found")),
            Err(e) => e,
        }
    }
}

#[async_trait]
impl FolderStore for FolderRepository {
    async fn create(&self, data: &CreateFolder) -> AppResult<Folder> {
        sqlx::query_as::<_, Folder>(
            "INSERT INTO folders (parent_id, name, owner_id) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(data.parent_id)
        .bind(&data.name)
        .bind(data.owner_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err)
                if db_err.constraint() == Some("folders_live_sibling_idx") =>
            {
                AppError::validation(format!(
                    "A folder named '{}' already exists here",
                    data.name
                ))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create folder", e),
        })
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find folder", e))
    }

    async fn list_children(
        &self,
        owner_id: Uuid,
        parent_id: Option<Uuid>,
    ) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders \
             WHERE owner_id = $1 AND parent_id IS NOT DISTINCT FROM $2 AND deleted_at IS NULL \
             ORDER BY name ASC",
        )
        .bind(owner_id)
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list children", e))
    }

    async fn find_live_child_named(
        &self,
        owner_id: Uuid,
        parent_id: Option<Uuid>,
        name: &str,
    ) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders \
             WHERE owner_id = $1 AND parent_id IS NOT DISTINCT FROM $2 \
               AND LOWER(name) = LOWER($3) AND deleted_at IS NULL",
        )
        .bind(owner_id)
        .bind(parent_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find folder by name", e)
        })
    }

    async fn live_descendants(&self, folder_id: Uuid) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(&format!(
            "WITH RECURSIVE subtree AS ( \
                SELECT f.*, 0 AS rel_depth FROM folders f \
                    WHERE f.id = $1 AND f.deleted_at IS NULL \
                UNION ALL \
                SELECT f.*, s.rel_depth + 1 FROM folders f \
                    INNER JOIN subtree s ON f.parent_id = s.id \
                    WHERE f.deleted_at IS NULL \
             ) SELECT {FOLDER_COLUMNS} FROM subtree \
               WHERE id != $1 ORDER BY rel_depth ASC, name ASC"
        ))
        .bind(folder_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list descendants", e))
    }

    async fn rename(&self, id: Uuid, new_name: &str, expected_version: i64) -> AppResult<Folder> {
        let updated = sqlx::query_as::<_, Folder>(
            "UPDATE folders SET name = $2, version = version + 1, updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL AND version = $3 RETURNING *",
        )
        .bind(id)
        .bind(new_name)
        .bind(expected_version)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err)
                if db_err.constraint() == Some("folders_live_sibling_idx") =>
            {
                AppError::validation(format!("A folder named '{new_name}' already exists here"))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to rename folder", e),
        })?;

        match updated {
            Some(folder) => Ok(folder),
            None => Err(self.explain_update_miss(id).await),
        }
    }

    async fn reparent(
        &self,
        id: Uuid,
        new_parent_id: Option<Uuid>,
        expected_version: i64,
    ) -> AppResult<Folder> {
        let updated = sqlx::query_as::<_, Folder>(
            "UPDATE folders SET parent_id = $2, version = version + 1, updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL AND version = $3 RETURNING *",
        )
        .bind(id)
        .bind(new_parent_id)
        .bind(expected_version)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err)
                if db_err.constraint() == Some("folders_live_sibling_idx") =>
            {
                AppError::validation(
                    "A folder with the same name already exists at the destination",
                )
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to move folder", e),
        })?;

        match updated {
            Some(folder) => Ok(folder),
            None => Err(self.explain_update_miss(id).await),
        }
    }
}
