//! File repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use studydrive_core::error::{AppError, ErrorKind};
use studydrive_core::result::AppResult;
use studydrive_entity::file::{CreateFile, File, UpdateFileMeta};

use crate::store::FileStore;

/// Repository for file CRUD and query operations.
#[derive(Debug, Clone)]
pub struct FileRepository {
    pool: PgPool,
}

impl FileRepository {
    /// Create a new file repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Explain why a guarded update matched no row.
    async fn explain_update_miss(&self, id: Uuid) -> AppError {
        match self.find_by_id(id).await {
            Ok(Some(file)) if file.is_deleted() => {
                AppError::not_found(format!("File {id} is in the trash"))
            }
            Ok(Some(_)) => AppError::conflict(format!("File {id} was modified concurrently")),
            Ok(None) => AppError::not_found(format!("File {id} not found")),
            Err(e) => e,
        }
    }
}

#[async_trait]
impl FileStore for FileRepository {
    async fn create(&self, data: &CreateFile) -> AppResult<File> {
        sqlx::query_as::<_, File>(
            "INSERT INTO files \
                (folder_id, name, content_type, description, owner_id, uploader_id, \
                 content_ref, size_bytes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
        )
        .bind(data.folder_id)
        .bind(&data.name)
        .bind(&data.content_type)
        .bind(&data.description)
        .bind(data.owner_id)
        .bind(data.uploader_id)
        .bind(&data.content_ref)
        .bind(data.size_bytes)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err)
                if db_err.constraint() == Some("files_live_sibling_idx") =>
            {
                AppError::validation(format!("A file named '{}' already exists here", data.name))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create file", e),
        })
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>("SELECT * FROM files WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find file", e))
    }

    async fn list_in_folder(
        &self,
        owner_id: Uuid,
        folder_id: Option<Uuid>,
    ) -> AppResult<Vec<File>> {
        sqlx::query_as::<_, File>(
            "SELECT * FROM files \
             WHERE owner_id = $1 AND folder_id IS NOT DISTINCT FROM $2 AND deleted_at IS NULL \
             ORDER BY name ASC",
        )
        .bind(owner_id)
        .bind(folder_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list files", e))
    }

    async fn find_live_named(
        &self,
        owner_id: Uuid,
        folder_id: Option<Uuid>,
        name: &str,
    ) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>(
            "SELECT * FROM files \
             WHERE owner_id = $1 AND folder_id IS NOT DISTINCT FROM $2 \
               AND LOWER(name) = LOWER($3) AND deleted_at IS NULL",
        )
        .bind(owner_id)
        .bind(folder_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find file by name", e))
    }

    async fn live_in_folders(&self, folder_ids: &[Uuid]) -> AppResult<Vec<File>> {
        sqlx::query_as::<_, File>(
            "SELECT * FROM files \
             WHERE folder_id = ANY($1) AND deleted_at IS NULL ORDER BY name ASC",
        )
        .bind(folder_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list files in folders", e)
        })
    }

    async fn update_meta(
        &self,
        id: Uuid,
        changes: &UpdateFileMeta,
        expected_version: i64,
    ) -> AppResult<File> {
        let updated = sqlx::query_as::<_, File>(
            "UPDATE files SET \
                name = COALESCE($2, name), \
                description = COALESCE($3, description), \
                content_type = COALESCE($4, content_type), \
                version = version + 1, updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL AND version = $5 RETURNING *",
        )
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.description)
        .bind(&changes.content_type)
        .bind(expected_version)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err)
                if db_err.constraint() == Some("files_live_sibling_idx") =>
            {
                AppError::validation("A file with the new name already exists here")
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to update file", e),
        })?;

        match updated {
            Some(file) => Ok(file),
            None => Err(self.explain_update_miss(id).await),
        }
    }

    async fn reparent(
        &self,
        id: Uuid,
        new_folder_id: Option<Uuid>,
        expected_version: i64,
    ) -> AppResult<File> {
        let updated = sqlx::query_as::<_, File>(
            "UPDATE files SET folder_id = $2, version = version + 1, updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL AND version = $3 RETURNING *",
        )
        .bind(id)
        .bind(new_folder_id)
        .bind(expected_version)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err)
                if db_err.constraint() == Some("files_live_sibling_idx") =>
            {
                AppError::validation("A file with the same name already exists at the destination")
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to move file", e),
        })?;

        match updated {
            Some(file) => Ok(file),
            None => Err(self.explain_update_miss(id).await),
        }
    }
}
