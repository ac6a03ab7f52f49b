//! Object storage collaborator.
//!
//! # Responsibilities
//! - Look up an object by key
//! - Hand back a streaming body plus an entity tag
//!
//! # Design Decisions
//! - Absence is `Ok(None)`, never an error
//! - Bodies stream; nothing is read into memory up front
//! - Content-type hints from storage are not exposed

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::UNIX_EPOCH;

use async_trait::async_trait;
use axum::body::Body;
use bytes::Bytes;
use thiserror::Error;
use tokio_util::io::ReaderStream;

/// A stored object ready to be streamed to a client.
#[derive(Debug)]
pub struct ObjectRecord {
    pub body: Body,
    pub etag: String,
}

/// Failure inside the storage layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Read access to one application's bundle.
#[async_trait]
pub trait ObjectStore: Send + Sync + std::fmt::Debug {
    /// Fetch an object, or `None` if the key does not exist.
    async fn get(&self, key: &str) -> Result<Option<ObjectRecord>, StoreError>;
}

/// Bundle stored as files under a root directory.
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn get(&self, key: &str) -> Result<Option<ObjectRecord>, StoreError> {
        let path = self.root.join(key);

        let file = match tokio::fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if is_absent(&e) => return Ok(None),
            Err(e) => return Err(StoreError::Io(e)),
        };

        let metadata = file.metadata().await?;
        if !metadata.is_file() {
            return Ok(None);
        }

        let modified = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs())
            .unwrap_or_default();
        let etag = format!("\"{:x}-{:x}\"", modified, metadata.len());

        Ok(Some(ObjectRecord {
            body: Body::from_stream(ReaderStream::new(file)),
            etag,
        }))
    }
}

// NotADirectory: a file was used as a directory component of the key
fn is_absent(e: &std::io::Error) -> bool {
    matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory)
}

/// In-memory bundle, for embedded sites and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryObjectStore {
    objects: HashMap<String, Bytes>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object, replacing any previous one under the same key.
    pub fn with_object(mut self, key: impl Into<String>, content: impl Into<Bytes>) -> Self {
        self.objects.insert(key.into(), content.into());
        self
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn get(&self, key: &str) -> Result<Option<ObjectRecord>, StoreError> {
        Ok(self.objects.get(key).map(|content| ObjectRecord {
            body: Body::from(content.clone()),
            etag: content_etag(content),
        }))
    }
}

/// Quoted entity tag derived from content.
pub fn content_etag(content: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    format!("\"{:x}\"", hasher.finish())
}
