//! File upload, metadata, and download operations.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use studydrive_core::error::AppError;
use studydrive_core::events::{DomainEvent, EventBus, EventPayload, FileEvent};
use studydrive_core::traits::BlobStore;
use studydrive_database::store::{FileStore, FolderStore};
use studydrive_entity::file::{CreateFile, File, UpdateFileMeta};

use crate::context::RequestContext;
use crate::folder::service::normalize_name;

/// Manages file records and their blob content.
#[derive(Debug, Clone)]
pub struct FileService {
    /// File store.
    files: Arc<dyn FileStore>,
    /// Folder store (destination liveness checks).
    folders: Arc<dyn FolderStore>,
    /// Blob storage backend.
    blobs: Arc<dyn BlobStore>,
    /// Event bus.
    events: EventBus,
}

/// Request to upload a new file.
#[derive(Debug, Clone)]
pub struct UploadFileRequest {
    /// The owner whose tree receives the file.
    pub owner_id: Uuid,
    /// Containing folder (None for root level).
    pub folder_id: Option<Uuid>,
    /// File name.
    pub name: String,
    /// Free-form extension/category label.
    pub content_type: Option<String>,
    /// Optional description.
    pub description: Option<String>,
    /// The raw content.
    pub data: Bytes,
}

impl FileService {
    /// Creates a new file service.
    pub fn new(
        files: Arc<dyn FileStore>,
        folders: Arc<dyn FolderStore>,
        blobs: Arc<dyn BlobStore>,
        events: EventBus,
    ) -> Self {
        Self {
            files,
            folders,
            blobs,
            events,
        }
    }

    /// Gets a file by ID, live or trashed.
    pub async fn get_file(&self, _ctx: &RequestContext, file_id: Uuid) -> Result<File, AppError> {
        self.files
            .find_by_id(file_id)
            .await?
            .ok_or_else(|| AppError::not_found("File not found"))
    }

    /// Lists live files in a folder (None = root level).
    ///
    /// A folder-scoped listing with a missing or trashed folder is a hard
    /// error; the scope never silently widens.
    pub async fn list_files(
        &self,
        _ctx: &RequestContext,
        owner_id: Uuid,
        folder_id: Option<Uuid>,
    ) -> Result<Vec<File>, AppError> {
        if let Some(id) = folder_id {
            let folder = self
                .folders
                .find_by_id(id)
                .await?
                .ok_or_else(|| AppError::not_found("Folder not found"))?;
            if folder.is_deleted() {
                return Err(AppError::not_found("Folder is in the trash"));
            }
        }
        self.files.list_in_folder(owner_id, folder_id).await
    }

    /// Stores content in the blob store and creates the file record.
    pub async fn upload(
        &self,
        ctx: &RequestContext,
        req: UploadFileRequest,
    ) -> Result<File, AppError> {
        let name = normalize_name(&req.name)?;

        if let Some(folder_id) = req.folder_id {
            let folder = self
                .folders
                .find_by_id(folder_id)
                .await?
                .ok_or_else(|| AppError::not_found("Folder not found"))?;
            if folder.is_deleted() {
                return Err(AppError::not_found("Folder is in the trash"));
            }
            if folder.owner_id != req.owner_id {
                return Err(AppError::validation(
                    "Folder belongs to a different owner",
                ));
            }
        }

        if self
            .files
            .find_live_named(req.owner_id, req.folder_id, &name)
            .await?
            .is_some()
        {
            return Err(AppError::validation(format!(
                "A file named '{name}' already exists here"
            )));
        }

        let size_bytes = req.data.len() as i64;
        let content_ref = self.blobs.put(req.data).await?;

        let created = self
            .files
            .create(&CreateFile {
                folder_id: req.folder_id,
                name,
                content_type: req.content_type,
                description: req.description,
                owner_id: req.owner_id,
                uploader_id: ctx.actor_id,
                content_ref: content_ref.clone(),
                size_bytes,
            })
            .await;

        let file = match created {
            Ok(file) => file,
            Err(e) => {
                // The blob is orphaned; reclaim it best-effort.
                if let Err(cleanup) = self.blobs.delete(&content_ref).await {
                    warn!(
                        content_ref = %content_ref,
                        error = %cleanup,
                        "Failed to reclaim blob after record creation failure"
                    );
                }
                return Err(e);
            }
        };

        info!(
            actor_id = %ctx.actor_id,
            file_id = %file.id,
            owner_id = %file.owner_id,
            size_bytes,
            "File uploaded"
        );
        self.events.publish(DomainEvent::new(
            Some(ctx.actor_id),
            EventPayload::File(FileEvent::Created {
                file_id: file.id,
                folder_id: file.folder_id,
                owner_id: file.owner_id,
                name: file.name.clone(),
                size_bytes,
            }),
        ));

        Ok(file)
    }

    /// Updates file metadata (name, description, content type).
    pub async fn update_meta(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
        mut changes: UpdateFileMeta,
    ) -> Result<File, AppError> {
        if changes.is_empty() {
            return Err(AppError::validation("No fields to update"));
        }

        let file = self.get_file(ctx, file_id).await?;
        if file.is_deleted() {
            return Err(AppError::not_found("File is in the trash"));
        }

        if let Some(raw) = &changes.name {
            let name = normalize_name(raw)?;
            if let Some(existing) = self
                .files
                .find_live_named(file.owner_id, file.folder_id, &name)
                .await?
                && existing.id != file_id
            {
                return Err(AppError::validation(format!(
                    "A file named '{name}' already exists here"
                )));
            }
            changes.name = Some(name);
        }

        let updated = self.files.update_meta(file_id, &changes, file.version).await?;

        info!(
            actor_id = %ctx.actor_id,
            file_id = %file_id,
            fields = ?changes.changed_fields(),
            "File metadata updated"
        );
        self.events.publish(DomainEvent::new(
            Some(ctx.actor_id),
            EventPayload::File(FileEvent::Updated {
                file_id,
                changed_fields: changes.changed_fields(),
            }),
        ));

        Ok(updated)
    }

    /// Reads a live file's content from the blob store.
    pub async fn download(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
    ) -> Result<(File, Bytes), AppError> {
        let file = self.get_file(ctx, file_id).await?;
        if file.is_deleted() {
            return Err(AppError::not_found("File is in the trash"));
        }
        let data = self.blobs.get(&file.content_ref).await?;
        Ok((file, data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::TestEnv;
    use studydrive_core::error::ErrorKind;

    fn upload_req(env: &TestEnv, folder_id: Option<Uuid>, name: &str, body: &str) -> UploadFileRequest {
        UploadFileRequest {
            owner_id: env.owner,
            folder_id,
            name: name.to_string(),
            content_type: Some("pdf".to_string()),
            description: None,
            data: Bytes::from(body.to_string()),
        }
    }

    #[tokio::test]
    async fn test_upload_and_download_roundtrip() {
        let env = TestEnv::new().await;
        let folder = env.mkdir(None, "Reports").await;

        let file = env
            .files
            .upload(&env.ctx, upload_req(&env, Some(folder.id), "q1.pdf", "q1 body"))
            .await
            .unwrap();
        assert_eq!(file.size_bytes, 7);
        assert_eq!(file.uploader_id, env.ctx.actor_id);

        let (fetched, data) = env.files.download(&env.ctx, file.id).await.unwrap();
        assert_eq!(fetched.id, file.id);
        assert_eq!(data, Bytes::from("q1 body"));
    }

    #[tokio::test]
    async fn test_upload_into_trashed_folder_is_rejected() {
        let env = TestEnv::new().await;
        let folder = env.mkdir(None, "Reports").await;
        env.trash
            .soft_delete_folder(&env.ctx, folder.id)
            .await
            .unwrap();

        let err = env
            .files
            .upload(&env.ctx, upload_req(&env, Some(folder.id), "q1.pdf", "x"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_duplicate_file_name_is_rejected() {
        let env = TestEnv::new().await;
        env.files
            .upload(&env.ctx, upload_req(&env, None, "notes.txt", "a"))
            .await
            .unwrap();

        let err = env
            .files
            .upload(&env.ctx, upload_req(&env, None, "NOTES.txt", "b"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_update_meta_renames_and_bumps_version() {
        let env = TestEnv::new().await;
        let file = env
            .files
            .upload(&env.ctx, upload_req(&env, None, "draft.txt", "x"))
            .await
            .unwrap();

        let updated = env
            .files
            .update_meta(
                &env.ctx,
                file.id,
                UpdateFileMeta {
                    name: Some("final.txt".to_string()),
                    description: Some("submitted".to_string()),
                    content_type: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "final.txt");
        assert_eq!(updated.description.as_deref(), Some("submitted"));
        assert_eq!(updated.version, file.version + 1);
    }

    #[tokio::test]
    async fn test_download_trashed_file_is_rejected() {
        let env = TestEnv::new().await;
        let file = env
            .files
            .upload(&env.ctx, upload_req(&env, None, "gone.txt", "x"))
            .await
            .unwrap();
        env.trash.soft_delete_file(&env.ctx, file.id).await.unwrap();

        let err = env.files.download(&env.ctx, file.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
