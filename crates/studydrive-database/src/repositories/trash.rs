//! Trash repository: transactional cascades, listings, and purges.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use studydrive_core::error::{AppError, ErrorKind};
use studydrive_core::result::AppResult;
use studydrive_core::types::{ItemKind, TrashFilter};
use studydrive_entity::file::File;
use studydrive_entity::folder::Folder;
use studydrive_entity::item::Item;

use crate::store::{PurgeOutcome, PurgedFile, RestoreCascade, SoftDeleteCascade, TrashStore};

/// Column projection used when selecting out of CTEs.
const FOLDER_COLUMNS: &str = "id, parent_id, name, owner_id, version, created_at, updated_at, \
     deleted_at, deleted_by, original_parent_id";

/// Repository for the trash lifecycle.
///
/// Cascades run inside a single transaction with per-row lifecycle and
/// version guards; a guard miss aborts the transaction so the subtree is
/// never half-stamped.
#[derive(Debug, Clone)]
pub struct TrashRepository {
    pool: PgPool,
}

impl TrashRepository {
    /// Create a new trash repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_err(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Database, context, e)
}

#[async_trait]
impl TrashStore for TrashRepository {
    async fn soft_delete_cascade(&self, cascade: &SoftDeleteCascade) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_err("Failed to begin soft-delete transaction"))?;

        for folder in &cascade.folders {
            let result = sqlx::query(
                "UPDATE folders SET deleted_at = $2, deleted_by = $3, \
                    original_parent_id = parent_id, version = version + 1, updated_at = $2 \
                 WHERE id = $1 AND deleted_at IS NULL AND version = $4",
            )
            .bind(folder.id)
            .bind(cascade.deleted_at)
            .bind(cascade.actor_id)
            .bind(folder.version)
            .execute(&mut *tx)
            .await
            .map_err(db_err("Failed to stamp folder in cascade"))?;

            if result.rows_affected() != 1 {
                // Dropping the transaction rolls everything back.
                return Err(AppError::conflict(format!(
                    "Folder {} changed during soft-delete cascade",
                    folder.id
                )));
            }
        }

        for file in &cascade.files {
            let result = sqlx::query(
                "UPDATE files SET deleted_at = $2, deleted_by = $3, \
                    original_folder_id = folder_id, version = version + 1, updated_at = $2 \
                 WHERE id = $1 AND deleted_at IS NULL AND version = $4",
            )
            .bind(file.id)
            .bind(cascade.deleted_at)
            .bind(cascade.actor_id)
            .bind(file.version)
            .execute(&mut *tx)
            .await
            .map_err(db_err("Failed to stamp file in cascade"))?;

            if result.rows_affected() != 1 {
                return Err(AppError::conflict(format!(
                    "File {} changed during soft-delete cascade",
                    file.id
                )));
            }
        }

        tx.commit()
            .await
            .map_err(db_err("Failed to commit soft-delete cascade"))
    }

    async fn restore_cascade(&self, cascade: &RestoreCascade) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_err("Failed to begin restore transaction"))?;

        for folder in &cascade.folders {
            let result = sqlx::query(
                "UPDATE folders SET deleted_at = NULL, deleted_by = NULL, \
                    original_parent_id = NULL, parent_id = $2, \
                    version = version + 1, updated_at = $3 \
                 WHERE id = $1 AND deleted_at IS NOT NULL AND version = $4",
            )
            .bind(folder.id)
            .bind(folder.new_parent_id)
            .bind(cascade.restored_at)
            .bind(folder.version)
            .execute(&mut *tx)
            .await
            .map_err(db_err("Failed to restore folder in cascade"))?;

            if result.rows_affected() != 1 {
                return Err(AppError::conflict(format!(
                    "Folder {} changed during restore cascade",
                    folder.id
                )));
            }
        }

        for file in &cascade.files {
            let result = sqlx::query(
                "UPDATE files SET deleted_at = NULL, deleted_by = NULL, \
                    original_folder_id = NULL, folder_id = $2, \
                    version = version + 1, updated_at = $3 \
                 WHERE id = $1 AND deleted_at IS NOT NULL AND version = $4",
            )
            .bind(file.id)
            .bind(file.new_parent_id)
            .bind(cascade.restored_at)
            .bind(file.version)
            .execute(&mut *tx)
            .await
            .map_err(db_err("Failed to restore file in cascade"))?;

            if result.rows_affected() != 1 {
                return Err(AppError::conflict(format!(
                    "File {} changed during restore cascade",
                    file.id
                )));
            }
        }

        tx.commit()
            .await
            .map_err(db_err("Failed to commit restore cascade"))
    }

    async fn list_trash(&self, owner_id: Uuid, filter: &TrashFilter) -> AppResult<Vec<Item>> {
        let name_pattern = filter
            .name_contains
            .as_ref()
            .map(|needle| format!("%{needle}%"));

        let mut items: Vec<Item> = Vec::new();

        if filter.kind != Some(ItemKind::File) {
            let folders = sqlx::query_as::<_, Folder>(
                "SELECT * FROM folders \
                 WHERE owner_id = $1 AND deleted_at IS NOT NULL \
                   AND ($2::text IS NULL OR name ILIKE $2)",
            )
            .bind(owner_id)
            .bind(&name_pattern)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err("Failed to list trashed folders"))?;
            items.extend(folders.into_iter().map(Item::Folder));
        }

        if filter.kind != Some(ItemKind::Folder) {
            let files = sqlx::query_as::<_, File>(
                "SELECT * FROM files \
                 WHERE owner_id = $1 AND deleted_at IS NOT NULL \
                   AND ($2::text IS NULL OR name ILIKE $2)",
            )
            .bind(owner_id)
            .bind(&name_pattern)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err("Failed to list trashed files"))?;
            items.extend(files.into_iter().map(Item::File));
        }

        // Most recently deleted first.
        items.sort_by(|a, b| b.deleted_at().cmp(&a.deleted_at()));
        Ok(items)
    }

    async fn trashed_folder_subtree(&self, folder_id: Uuid) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(&format!(
            "WITH RECURSIVE subtree AS ( \
                SELECT f.*, 0 AS rel_depth FROM folders f \
                    WHERE f.id = $1 AND f.deleted_at IS NOT NULL \
                UNION ALL \
                SELECT f.*, s.rel_depth + 1 FROM folders f \
                    INNER JOIN subtree s ON f.parent_id = s.id \
                    WHERE f.deleted_at IS NOT NULL \
             ) SELECT {FOLDER_COLUMNS} FROM subtree \
               ORDER BY rel_depth ASC, name ASC"
        ))
        .bind(folder_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to collect trashed subtree"))
    }

    async fn trashed_files_in_folders(&self, folder_ids: &[Uuid]) -> AppResult<Vec<File>> {
        sqlx::query_as::<_, File>(
            "SELECT * FROM files \
             WHERE folder_id = ANY($1) AND deleted_at IS NOT NULL ORDER BY name ASC",
        )
        .bind(folder_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to list trashed files in folders"))
    }

    async fn purge_items(&self, folder_ids: &[Uuid], file_ids: &[Uuid]) -> AppResult<PurgeOutcome> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_err("Failed to begin purge transaction"))?;

        let purged_files = sqlx::query_as::<_, (Uuid, String)>(
            "DELETE FROM files WHERE id = ANY($1) AND deleted_at IS NOT NULL \
             RETURNING id, content_ref",
        )
        .bind(file_ids)
        .fetch_all(&mut *tx)
        .await
        .map_err(db_err("Failed to purge files"))?;

        let folders_purged = sqlx::query(
            "DELETE FROM folders WHERE id = ANY($1) AND deleted_at IS NOT NULL",
        )
        .bind(folder_ids)
        .execute(&mut *tx)
        .await
        .map_err(db_err("Failed to purge folders"))?
        .rows_affected();

        tx.commit()
            .await
            .map_err(db_err("Failed to commit purge"))?;

        Ok(PurgeOutcome {
            folders_purged,
            purged_files: purged_files
                .into_iter()
                .map(|(id, content_ref)| PurgedFile { id, content_ref })
                .collect(),
        })
    }

    async fn purge_for_owner(&self, owner_id: Uuid) -> AppResult<PurgeOutcome> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_err("Failed to begin empty-trash transaction"))?;

        let purged_files = sqlx::query_as::<_, (Uuid, String)>(
            "DELETE FROM files WHERE owner_id = $1 AND deleted_at IS NOT NULL \
             RETURNING id, content_ref",
        )
        .bind(owner_id)
        .fetch_all(&mut *tx)
        .await
        .map_err(db_err("Failed to purge owner files"))?;

        let folders_purged = sqlx::query(
            "DELETE FROM folders WHERE owner_id = $1 AND deleted_at IS NOT NULL",
        )
        .bind(owner_id)
        .execute(&mut *tx)
        .await
        .map_err(db_err("Failed to purge owner folders"))?
        .rows_affected();

        tx.commit()
            .await
            .map_err(db_err("Failed to commit empty-trash"))?;

        Ok(PurgeOutcome {
            folders_purged,
            purged_files: purged_files
                .into_iter()
                .map(|(id, content_ref)| PurgedFile { id, content_ref })
                .collect(),
        })
    }

    async fn purge_expired(&self, cutoff: DateTime<Utc>) -> AppResult<PurgeOutcome> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_err("Failed to begin retention purge transaction"))?;

        let purged_files = sqlx::query_as::<_, (Uuid, String)>(
            "DELETE FROM files WHERE deleted_at IS NOT NULL AND deleted_at < $1 \
             RETURNING id, content_ref",
        )
        .bind(cutoff)
        .fetch_all(&mut *tx)
        .await
        .map_err(db_err("Failed to purge expired files"))?;

        let folders_purged = sqlx::query(
            "DELETE FROM folders WHERE deleted_at IS NOT NULL AND deleted_at < $1",
        )
        .bind(cutoff)
        .execute(&mut *tx)
        .await
        .map_err(db_err("Failed to purge expired folders"))?
        .rows_affected();

        tx.commit()
            .await
            .map_err(db_err("Failed to commit retention purge"))?;

        Ok(PurgeOutcome {
            folders_purged,
            purged_files: purged_files
                .into_iter()
                .map(|(id, content_ref)| PurgedFile { id, content_ref })
                .collect(),
        })
    }
}
