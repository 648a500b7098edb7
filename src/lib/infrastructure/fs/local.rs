//! Local filesystem accessor

use std::io;
use std::path::Path;
use std::time::SystemTime;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::storage::FileStore;

/// Filesystem accessor backed by the local disk
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalFileStore;

impl LocalFileStore {
    /// Create a new accessor
    pub fn new() -> Self {
        Self
    }

    async fn file_time(
        path: &Path,
        pick: fn(&std::fs::Metadata) -> io::Result<SystemTime>,
    ) -> Option<DateTime<Utc>> {
        let metadata = tokio::fs::metadata(path).await.ok()?;

        pick(&metadata).ok().map(DateTime::<Utc>::from)
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn exists(&self, path: &Path) -> bool {
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>, io::Error> {
        tokio::fs::read(path).await
    }

    async fn creation_time(&self, path: &Path) -> Option<DateTime<Utc>> {
        Self::file_time(path, std::fs::Metadata::created).await
    }

    async fn modification_time(&self, path: &Path) -> Option<DateTime<Utc>> {
        Self::file_time(path, std::fs::Metadata::modified).await
    }

    async fn access_time(&self, path: &Path) -> Option<DateTime<Utc>> {
        Self::file_time(path, std::fs::Metadata::accessed).await
    }
}
