//! In-memory store backend.
//!
//! Implements the same store traits as the sqlx repositories against
//! plain hash maps. Used by service-level tests and by embedded
//! single-process deployments. A single `RwLock` guards both tables so
//! cascades apply atomically, mirroring the transactional guarantees of
//! the Postgres backend: every guard is checked before any row changes.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use studydrive_core::error::AppError;
use studydrive_core::result::AppResult;
use studydrive_core::types::{ItemKind, TrashFilter};
use studydrive_entity::file::{CreateFile, File, UpdateFileMeta};
use studydrive_entity::folder::{CreateFolder, Folder};
use studydrive_entity::item::Item;

use crate::store::{
    FileStore, FolderStore, PurgeOutcome, PurgedFile, RestoreCascade, SoftDeleteCascade,
    TrashStore, VersionedId,
};

/// Both tables behind one lock.
#[derive(Debug, Default)]
struct MemoryInner {
    /// Folder rows by id.
    folders: HashMap<Uuid, Folder>,
    /// File rows by id.
    files: HashMap<Uuid, File>,
}

impl MemoryInner {
    /// Live sibling with the same (case-insensitive) name, if any.
    fn live_folder_named(
        &self,
        owner_id: Uuid,
        parent_id: Option<Uuid>,
        name: &str,
    ) -> Option<&Folder> {
        self.folders.values().find(|f| {
            f.owner_id == owner_id
                && f.parent_id == parent_id
                && f.deleted_at.is_none()
                && f.name.eq_ignore_ascii_case(name)
        })
    }

    /// Live file with the same (case-insensitive) name in the folder, if any.
    fn live_file_named(
        &self,
        owner_id: Uuid,
        folder_id: Option<Uuid>,
        name: &str,
    ) -> Option<&File> {
        self.files.values().find(|f| {
            f.owner_id == owner_id
                && f.folder_id == folder_id
                && f.deleted_at.is_none()
                && f.name.eq_ignore_ascii_case(name)
        })
    }

    /// Breadth-first walk over children matching the given liveness,
    /// parents before children, name-ordered within a level.
    fn folder_subtree(&self, root_id: Uuid, live: bool) -> Vec<Folder> {
        let mut ordered = Vec::new();
        let mut frontier = vec![root_id];
        while let Some(parent) = frontier.pop() {
            let mut level: Vec<&Folder> = self
                .folders
                .values()
                .filter(|f| f.parent_id == Some(parent) && f.deleted_at.is_none() == live)
                .collect();
            level.sort_by(|a, b| a.name.cmp(&b.name));
            for child in level {
                frontier.push(child.id);
                ordered.push(child.clone());
            }
        }
        ordered
    }
}

/// In-memory implementation of the folder, file, and trash stores.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    /// Shared table state.
    inner: Arc<RwLock<MemoryInner>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn folder_miss(folder: Option<&Folder>, id: Uuid) -> AppError {
    match folder {
        Some(f) if f.is_deleted() => AppError::not_found(format!("Folder {id} is in the trash")),
        Some(_) => AppError::conflict(format!("Folder {id} was modified concurrently")),
        None => AppError::not_found(format!("Folder {id} not found")),
    }
}

fn file_miss(file: Option<&File>, id: Uuid) -> AppError {
    match file {
        Some(f) if f.is_deleted() => AppError::not_found(format!("File {id} is in the trash")),
        Some(_) => AppError::conflict(format!("File {id} was modified concurrently")),
        None => AppError::not_found(format!("File {id} not found")),
    }
}

#[async_trait]
impl FolderStore for MemoryStore {
    async fn create(&self, data: &CreateFolder) -> AppResult<Folder> {
        let mut inner = self.inner.write().await;

        if data.name.trim().is_empty() {
            return Err(AppError::validation("Folder name cannot be empty"));
        }
        if inner
            .live_folder_named(data.owner_id, data.parent_id, &data.name)
            .is_some()
        {
            return Err(AppError::validation(format!(
                "A folder named '{}' already exists here",
                data.name
            )));
        }

        let now = Utc::now();
        let folder = Folder {
            id: Uuid::new_v4(),
            parent_id: data.parent_id,
            name: data.name.clone(),
            owner_id: data.owner_id,
            version: 1,
            created_at: now,
            updated_at: now,
            deleted_at: None,
            deleted_by: None,
            original_parent_id: None,
        };
        inner.folders.insert(folder.id, folder.clone());
        Ok(folder)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Folder>> {
        Ok(self.inner.read().await.folders.get(&id).cloned())
    }

    async fn list_children(
        &self,
        owner_id: Uuid,
        parent_id: Option<Uuid>,
    ) -> AppResult<Vec<Folder>> {
        let inner = self.inner.read().await;
        let mut children: Vec<Folder> = inner
            .folders
            .values()
            .filter(|f| {
                f.owner_id == owner_id && f.parent_id == parent_id && f.deleted_at.is_none()
            })
            .cloned()
            .collect();
        children.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(children)
    }

    async fn find_live_child_named(
        &self,
        owner_id: Uuid,
        parent_id: Option<Uuid>,
        name: &str,
    ) -> AppResult<Option<Folder>> {
        let inner = self.inner.read().await;
        Ok(inner.live_folder_named(owner_id, parent_id, name).cloned())
    }

    async fn live_descendants(&self, folder_id: Uuid) -> AppResult<Vec<Folder>> {
        let inner = self.inner.read().await;
        match inner.folders.get(&folder_id) {
            Some(root) if !root.is_deleted() => Ok(inner.folder_subtree(folder_id, true)),
            _ => Ok(Vec::new()),
        }
    }

    async fn rename(&self, id: Uuid, new_name: &str, expected_version: i64) -> AppResult<Folder> {
        let mut inner = self.inner.write().await;

        let current = inner.folders.get(&id);
        let Some(folder) = current.filter(|f| !f.is_deleted() && f.version == expected_version)
        else {
            return Err(folder_miss(inner.folders.get(&id), id));
        };
        let (owner_id, parent_id) = (folder.owner_id, folder.parent_id);

        if let Some(existing) = inner.live_folder_named(owner_id, parent_id, new_name)
            && existing.id != id
        {
            return Err(AppError::validation(format!(
                "A folder named '{new_name}' already exists here"
            )));
        }

        let folder = inner.folders.get_mut(&id).expect("checked above");
        folder.name = new_name.to_string();
        folder.version += 1;
        folder.updated_at = Utc::now();
        Ok(folder.clone())
    }

    async fn reparent(
        &self,
        id: Uuid,
        new_parent_id: Option<Uuid>,
        expected_version: i64,
    ) -> AppResult<Folder> {
        let mut inner = self.inner.write().await;

        let current = inner.folders.get(&id);
        let Some(folder) = current.filter(|f| !f.is_deleted() && f.version == expected_version)
        else {
            return Err(folder_miss(inner.folders.get(&id), id));
        };
        let (owner_id, name) = (folder.owner_id, folder.name.clone());

        if let Some(existing) = inner.live_folder_named(owner_id, new_parent_id, &name)
            && existing.id != id
        {
            return Err(AppError::validation(
                "A folder with the same name already exists at the destination",
            ));
        }

        let folder = inner.folders.get_mut(&id).expect("checked above");
        folder.parent_id = new_parent_id;
        folder.version += 1;
        folder.updated_at = Utc::now();
        Ok(folder.clone())
    }
}

#[async_trait]
impl FileStore for MemoryStore {
    async fn create(&self, data: &CreateFile) -> AppResult<File> {
        let mut inner = self.inner.write().await;

        if data.name.trim().is_empty() {
            return Err(AppError::validation("File name cannot be empty"));
        }
        if inner
            .live_file_named(data.owner_id, data.folder_id, &data.name)
            .is_some()
        {
            return Err(AppError::validation(format!(
                "A file named '{}' already exists here",
                data.name
            )));
        }

        let now = Utc::now();
        let file = File {
            id: Uuid::new_v4(),
            folder_id: data.folder_id,
            name: data.name.clone(),
            content_type: data.content_type.clone(),
            description: data.description.clone(),
            owner_id: data.owner_id,
            uploader_id: data.uploader_id,
            content_ref: data.content_ref.clone(),
            size_bytes: data.size_bytes,
            version: 1,
            uploaded_at: now,
            updated_at: now,
            deleted_at: None,
            deleted_by: None,
            original_folder_id: None,
        };
        inner.files.insert(file.id, file.clone());
        Ok(file)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<File>> {
        Ok(self.inner.read().await.files.get(&id).cloned())
    }

    async fn list_in_folder(
        &self,
        owner_id: Uuid,
        folder_id: Option<Uuid>,
    ) -> AppResult<Vec<File>> {
        let inner = self.inner.read().await;
        let mut files: Vec<File> = inner
            .files
            .values()
            .filter(|f| {
                f.owner_id == owner_id && f.folder_id == folder_id && f.deleted_at.is_none()
            })
            .cloned()
            .collect();
        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }

    async fn find_live_named(
        &self,
        owner_id: Uuid,
        folder_id: Option<Uuid>,
        name: &str,
    ) -> AppResult<Option<File>> {
        let inner = self.inner.read().await;
        Ok(inner.live_file_named(owner_id, folder_id, name).cloned())
    }

    async fn live_in_folders(&self, folder_ids: &[Uuid]) -> AppResult<Vec<File>> {
        let inner = self.inner.read().await;
        let mut files: Vec<File> = inner
            .files
            .values()
            .filter(|f| {
                f.deleted_at.is_none()
                    && f.folder_id.is_some_and(|id| folder_ids.contains(&id))
            })
            .cloned()
            .collect();
        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }

    async fn update_meta(
        &self,
        id: Uuid,
        changes: &UpdateFileMeta,
        expected_version: i64,
    ) -> AppResult<File> {
        let mut inner = self.inner.write().await;

        let current = inner.files.get(&id);
        let Some(file) = current.filter(|f| !f.is_deleted() && f.version == expected_version)
        else {
            return Err(file_miss(inner.files.get(&id), id));
        };
        let (owner_id, folder_id) = (file.owner_id, file.folder_id);

        if let Some(new_name) = &changes.name
            && let Some(existing) = inner.live_file_named(owner_id, folder_id, new_name)
            && existing.id != id
        {
            return Err(AppError::validation(
                "A file with the new name already exists here",
            ));
        }

        let file = inner.files.get_mut(&id).expect("checked above");
        if let Some(name) = &changes.name {
            file.name = name.clone();
        }
        if let Some(description) = &changes.description {
            file.description = Some(description.clone());
        }
        if let Some(content_type) = &changes.content_type {
            file.content_type = Some(content_type.clone());
        }
        file.version += 1;
        file.updated_at = Utc::now();
        Ok(file.clone())
    }

    async fn reparent(
        &self,
        id: Uuid,
        new_folder_id: Option<Uuid>,
        expected_version: i64,
    ) -> AppResult<File> {
        let mut inner = self.inner.write().await;

        let current = inner.files.get(&id);
        let Some(file) = current.filter(|f| !f.is_deleted() && f.version == expected_version)
        else {
            return Err(file_miss(inner.files.get(&id), id));
        };
        let (owner_id, name) = (file.owner_id, file.name.clone());

        if let Some(existing) = inner.live_file_named(owner_id, new_folder_id, &name)
            && existing.id != id
        {
            return Err(AppError::validation(
                "A file with the same name already exists at the destination",
            ));
        }

        let file = inner.files.get_mut(&id).expect("checked above");
        file.folder_id = new_folder_id;
        file.version += 1;
        file.updated_at = Utc::now();
        Ok(file.clone())
    }
}

#[async_trait]
impl TrashStore for MemoryStore {
    async fn soft_delete_cascade(&self, cascade: &SoftDeleteCascade) -> AppResult<()> {
        let mut inner = self.inner.write().await;

        // Verify every guard before touching any row.
        for VersionedId { id, version } in &cascade.folders {
            match inner.folders.get(id) {
                Some(f) if !f.is_deleted() && f.version == *version => {}
                other => return Err(folder_miss(other, *id)),
            }
        }
        for VersionedId { id, version } in &cascade.files {
            match inner.files.get(id) {
                Some(f) if !f.is_deleted() && f.version == *version => {}
                other => return Err(file_miss(other, *id)),
            }
        }

        for VersionedId { id, .. } in &cascade.folders {
            let folder = inner.folders.get_mut(id).expect("verified above");
            folder.original_parent_id = folder.parent_id;
            folder.deleted_at = Some(cascade.deleted_at);
            folder.deleted_by = Some(cascade.actor_id);
            folder.version += 1;
            folder.updated_at = cascade.deleted_at;
        }
        for VersionedId { id, .. } in &cascade.files {
            let file = inner.files.get_mut(id).expect("verified above");
            file.original_folder_id = file.folder_id;
            file.deleted_at = Some(cascade.deleted_at);
            file.deleted_by = Some(cascade.actor_id);
            file.version += 1;
            file.updated_at = cascade.deleted_at;
        }
        Ok(())
    }

    async fn restore_cascade(&self, cascade: &RestoreCascade) -> AppResult<()> {
        let mut inner = self.inner.write().await;

        for target in &cascade.folders {
            match inner.folders.get(&target.id) {
                Some(f) if f.is_deleted() && f.version == target.version => {}
                Some(f) if !f.is_deleted() => {
                    return Err(AppError::conflict(format!(
                        "Folder {} is no longer in the trash",
                        target.id
                    )));
                }
                other => return Err(folder_miss(other, target.id)),
            }
        }
        for target in &cascade.files {
            match inner.files.get(&target.id) {
                Some(f) if f.is_deleted() && f.version == target.version => {}
                Some(f) if !f.is_deleted() => {
                    return Err(AppError::conflict(format!(
                        "File {} is no longer in the trash",
                        target.id
                    )));
                }
                other => return Err(file_miss(other, target.id)),
            }
        }

        for target in &cascade.folders {
            let folder = inner.folders.get_mut(&target.id).expect("verified above");
            folder.parent_id = target.new_parent_id;
            folder.deleted_at = None;
            folder.deleted_by = None;
            folder.original_parent_id = None;
            folder.version += 1;
            folder.updated_at = cascade.restored_at;
        }
        for target in &cascade.files {
            let file = inner.files.get_mut(&target.id).expect("verified above");
            file.folder_id = target.new_parent_id;
            file.deleted_at = None;
            file.deleted_by = None;
            file.original_folder_id = None;
            file.version += 1;
            file.updated_at = cascade.restored_at;
        }
        Ok(())
    }

    async fn list_trash(&self, owner_id: Uuid, filter: &TrashFilter) -> AppResult<Vec<Item>> {
        let inner = self.inner.read().await;
        let mut items: Vec<Item> = Vec::new();

        if filter.kind != Some(ItemKind::File) {
            items.extend(
                inner
                    .folders
                    .values()
                    .filter(|f| f.owner_id == owner_id && f.is_deleted())
                    .filter(|f| filter.matches(ItemKind::Folder, &f.name))
                    .cloned()
                    .map(Item::Folder),
            );
        }
        if filter.kind != Some(ItemKind::Folder) {
            items.extend(
                inner
                    .files
                    .values()
                    .filter(|f| f.owner_id == owner_id && f.is_deleted())
                    .filter(|f| filter.matches(ItemKind::File, &f.name))
                    .cloned()
                    .map(Item::File),
            );
        }

        items.sort_by(|a, b| b.deleted_at().cmp(&a.deleted_at()));
        Ok(items)
    }

    async fn trashed_folder_subtree(&self, folder_id: Uuid) -> AppResult<Vec<Folder>> {
        let inner = self.inner.read().await;
        match inner.folders.get(&folder_id) {
            Some(root) if root.is_deleted() => {
                let mut subtree = vec![root.clone()];
                subtree.extend(inner.folder_subtree(folder_id, false));
                Ok(subtree)
            }
            _ => Ok(Vec::new()),
        }
    }

    async fn trashed_files_in_folders(&self, folder_ids: &[Uuid]) -> AppResult<Vec<File>> {
        let inner = self.inner.read().await;
        let mut files: Vec<File> = inner
            .files
            .values()
            .filter(|f| {
                f.is_deleted() && f.folder_id.is_some_and(|id| folder_ids.contains(&id))
            })
            .cloned()
            .collect();
        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }

    async fn purge_items(&self, folder_ids: &[Uuid], file_ids: &[Uuid]) -> AppResult<PurgeOutcome> {
        let mut inner = self.inner.write().await;
        let mut outcome = PurgeOutcome::default();

        for id in file_ids {
            if inner.files.get(id).is_some_and(|f| f.is_deleted())
                && let Some(file) = inner.files.remove(id)
            {
                outcome.purged_files.push(PurgedFile {
                    id: file.id,
                    content_ref: file.content_ref,
                });
            }
        }
        for id in folder_ids {
            if inner.folders.get(id).is_some_and(|f| f.is_deleted()) {
                inner.folders.remove(id);
                outcome.folders_purged += 1;
            }
        }
        Ok(outcome)
    }

    async fn purge_for_owner(&self, owner_id: Uuid) -> AppResult<PurgeOutcome> {
        let inner = self.inner.read().await;
        let folder_ids: Vec<Uuid> = inner
            .folders
            .values()
            .filter(|f| f.owner_id == owner_id && f.is_deleted())
            .map(|f| f.id)
            .collect();
        let file_ids: Vec<Uuid> = inner
            .files
            .values()
            .filter(|f| f.owner_id == owner_id && f.is_deleted())
            .map(|f| f.id)
            .collect();
        drop(inner);

        self.purge_items(&folder_ids, &file_ids).await
    }

    async fn purge_expired(&self, cutoff: DateTime<Utc>) -> AppResult<PurgeOutcome> {
        let inner = self.inner.read().await;
        let folder_ids: Vec<Uuid> = inner
            .folders
            .values()
            .filter(|f| f.deleted_at.is_some_and(|at| at < cutoff))
            .map(|f| f.id)
            .collect();
        let file_ids: Vec<Uuid> = inner
            .files
            .values()
            .filter(|f| f.deleted_at.is_some_and(|at| at < cutoff))
            .map(|f| f.id)
            .collect();
        drop(inner);

        self.purge_items(&folder_ids, &file_ids).await
    }
}
