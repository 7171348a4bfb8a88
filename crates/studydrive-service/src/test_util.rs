//! Shared fixtures for service tests.

use std::sync::Arc;

use uuid::Uuid;

use studydrive_core::config::retention::RetentionConfig;
use studydrive_core::events::EventBus;
use studydrive_database::memory::MemoryStore;
use studydrive_database::store::{FileStore, FolderStore};
use studydrive_entity::file::{CreateFile, File};
use studydrive_entity::folder::{CreateFolder, Folder};
use studydrive_storage::LocalBlobStore;

use crate::context::{ActorRole, RequestContext};
use crate::file::FileService;
use crate::folder::{FolderService, TreeService};
use crate::reparent::ReparentService;
use crate::trash::TrashService;

/// A full service stack over the in-memory store and a temp-dir blob store.
pub struct TestEnv {
    /// The owner whose tree the fixtures operate on.
    pub owner: Uuid,
    /// A student context acting as the owner.
    pub ctx: RequestContext,
    /// The shared in-memory backend.
    pub store: Arc<MemoryStore>,
    /// Blob store rooted in a temp dir.
    pub blobs: Arc<LocalBlobStore>,
    /// Event bus shared by all services.
    pub events: EventBus,
    /// Tree navigation / validation service.
    pub tree: Arc<TreeService>,
    /// Folder CRUD service.
    pub folders: FolderService,
    /// File service.
    pub files: FileService,
    /// Batch move engine.
    pub reparent: ReparentService,
    /// Trash lifecycle service.
    pub trash: TrashService,
    /// Keeps the blob directory alive for the test's duration.
    _blob_dir: tempfile::TempDir,
}

impl TestEnv {
    /// Build a fresh environment.
    pub async fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let blob_dir = tempfile::tempdir().expect("create blob tempdir");
        let blobs = Arc::new(
            LocalBlobStore::new(blob_dir.path().to_str().expect("utf-8 tempdir path"))
                .await
                .expect("create blob store"),
        );
        let events = EventBus::default();
        let tree = Arc::new(TreeService::new(store.clone()));

        let folders = FolderService::new(store.clone(), Arc::clone(&tree), events.clone());
        let files = FileService::new(
            store.clone(),
            store.clone(),
            blobs.clone(),
            events.clone(),
        );
        let reparent = ReparentService::new(
            store.clone(),
            store.clone(),
            Arc::clone(&tree),
            events.clone(),
        );
        let trash = TrashService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            blobs.clone(),
            Arc::clone(&tree),
            events.clone(),
            RetentionConfig::default(),
        );

        let owner = Uuid::new_v4();
        let ctx = RequestContext::new(owner, ActorRole::Student);

        Self {
            owner,
            ctx,
            store,
            blobs,
            events,
            tree,
            folders,
            files,
            reparent,
            trash,
            _blob_dir: blob_dir,
        }
    }

    /// Create a folder directly in the store.
    pub async fn mkdir(&self, parent_id: Option<Uuid>, name: &str) -> Folder {
        FolderStore::create(
            self.store.as_ref(),
            &CreateFolder {
                parent_id,
                name: name.to_string(),
                owner_id: self.owner,
            },
        )
        .await
        .expect("create folder")
    }

    /// Create a file directly in the store.
    pub async fn mkfile(&self, folder_id: Option<Uuid>, name: &str) -> File {
        FileStore::create(
            self.store.as_ref(),
            &CreateFile {
                folder_id,
                name: name.to_string(),
                content_type: None,
                description: None,
                owner_id: self.owner,
                uploader_id: self.owner,
                content_ref: format!("te/st/{}", Uuid::new_v4().simple()),
                size_bytes: 4,
            },
        )
        .await
        .expect("create file")
    }

    /// Reparent a folder directly in the store, bypassing validation.
    pub async fn raw_reparent_folder(
        &self,
        id: Uuid,
        parent_id: Option<Uuid>,
        version: i64,
    ) -> Folder {
        FolderStore::reparent(self.store.as_ref(), id, parent_id, version)
            .await
            .expect("raw reparent")
    }

    /// Fetch a folder, panicking when missing.
    pub async fn folder(&self, id: Uuid) -> Folder {
        FolderStore::find_by_id(self.store.as_ref(), id)
            .await
            .expect("find folder")
            .expect("folder exists")
    }

    /// Fetch a file, panicking when missing.
    pub async fn file(&self, id: Uuid) -> File {
        FileStore::find_by_id(self.store.as_ref(), id)
            .await
            .expect("find file")
            .expect("file exists")
    }

    /// A trash service over the same stores with a custom retention window.
    pub fn trash_with_retention(&self, window_days: i64) -> TrashService {
        TrashService::new(
            self.store.clone(),
            self.store.clone(),
            self.store.clone(),
            self.blobs.clone(),
            Arc::clone(&self.tree),
            self.events.clone(),
            RetentionConfig { window_days },
        )
    }
}
