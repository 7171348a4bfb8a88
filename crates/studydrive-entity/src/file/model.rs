//! File entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A file attached to a student's virtual filesystem.
///
/// The record holds metadata only; content lives in the blob store under
/// the opaque `content_ref` locator.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct File {
    /// Unique file identifier.
    pub id: Uuid,
    /// The containing folder (None for root level).
    pub folder_id: Option<Uuid>,
    /// The file name.
    pub name: String,
    /// Free-form extension/category label (e.g., "pdf", "notes").
    pub content_type: Option<String>,
    /// Optional description.
    pub description: Option<String>,
    /// The student whose tree this file belongs to. Immutable.
    pub owner_id: Uuid,
    /// The actor who created the record; may differ from the owner.
    pub uploader_id: Uuid,
    /// Opaque locator into the external blob store.
    pub content_ref: String,
    /// File size in bytes.
    pub size_bytes: i64,
    /// Optimistic-concurrency guard, bumped on every mutation.
    pub version: i64,
    /// When the file was uploaded.
    pub uploaded_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
    /// When the file was soft-deleted (None = live).
    pub deleted_at: Option<DateTime<Utc>>,
    /// Actor who soft-deleted the file. Set iff `deleted_at` is set.
    pub deleted_by: Option<Uuid>,
    /// Snapshot of `folder_id` at the moment of deletion. May be None for
    /// a file deleted at root level.
    pub original_folder_id: Option<Uuid>,
}

impl File {
    /// Check if the file is currently in the trash.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Get the file extension (lowercase), if any.
    pub fn extension(&self) -> Option<String> {
        self.name
            .rsplit('.')
            .next()
            .filter(|ext| *ext != self.name)
            .map(|ext| ext.to_lowercase())
    }
}

/// Data required to create a new file record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFile {
    /// The folder to place the file in (None for root level).
    pub folder_id: Option<Uuid>,
    /// The file name.
    pub name: String,
    /// Free-form extension/category label.
    pub content_type: Option<String>,
    /// Optional description.
    pub description: Option<String>,
    /// The owner of the tree.
    pub owner_id: Uuid,
    /// The actor performing the upload.
    pub uploader_id: Uuid,
    /// Blob store locator for the content.
    pub content_ref: String,
    /// File size in bytes.
    pub size_bytes: i64,
}

/// Metadata changes applied to an existing file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateFileMeta {
    /// New name, if changing.
    pub name: Option<String>,
    /// New description, if changing.
    pub description: Option<String>,
    /// New content-type label, if changing.
    pub content_type: Option<String>,
}

impl UpdateFileMeta {
    /// Names of the fields this update touches.
    pub fn changed_fields(&self) -> Vec<String> {
        let mut fields = Vec::new();
        if self.name.is_some() {
            fields.push("name".to_string());
        }
        if self.description.is_some() {
            fields.push("description".to_string());
        }
        if self.content_type.is_some() {
            fields.push("content_type".to_string());
        }
        fields
    }

    /// Whether the update changes anything at all.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.content_type.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_file(name: &str) -> File {
        File {
            id: Uuid::new_v4(),
            folder_id: None,
            name: name.to_string(),
            content_type: None,
            description: None,
            owner_id: Uuid::new_v4(),
            uploader_id: Uuid::new_v4(),
            content_ref: "ab/cd/ref".to_string(),
            size_bytes: 42,
            version: 1,
            uploaded_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
            deleted_by: None,
            original_folder_id: None,
        }
    }

    #[test]
    fn test_extension() {
        assert_eq!(sample_file("q1.PDF").extension().as_deref(), Some("pdf"));
        assert_eq!(sample_file("notes").extension(), None);
    }

    #[test]
    fn test_changed_fields() {
        let update = UpdateFileMeta {
            name: Some("renamed.pdf".to_string()),
            description: None,
            content_type: None,
        };
        assert_eq!(update.changed_fields(), vec!["name".to_string()]);
        assert!(!update.is_empty());
        assert!(UpdateFileMeta::default().is_empty());
    }
}
