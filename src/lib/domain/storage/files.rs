//! Filesystem accessor port

use std::io;
use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[cfg(test)]
use mockall::mock;

/// Filesystem accessor for path-based attachments.
///
/// Timestamp lookups answer [`None`] where the platform does not record the
/// time in question.
#[async_trait]
pub trait FileStore: Clone + Send + Sync + 'static {
    /// Whether a file exists at `path`
    async fn exists(&self, path: &Path) -> bool;

    /// Read the file's full content
    async fn read(&self, path: &Path) -> Result<Vec<u8>, io::Error>;

    /// The file's creation time
    async fn creation_time(&self, path: &Path) -> Option<DateTime<Utc>>;

    /// The file's last modification time
    async fn modification_time(&self, path: &Path) -> Option<DateTime<Utc>>;

    /// The file's last access time
    async fn access_time(&self, path: &Path) -> Option<DateTime<Utc>>;
}

#[cfg(test)]
mock! {
    pub FileStore {}

    impl Clone for FileStore {
        fn clone(&self) -> Self;
    }

    #[async_trait]
    impl FileStore for FileStore {
        async fn exists(&self, path: &Path) -> bool;
        async fn read(&self, path: &Path) -> Result<Vec<u8>, io::Error>;
        async fn creation_time(&self, path: &Path) -> Option<DateTime<Utc>>;
        async fn modification_time(&self, path: &Path) -> Option<DateTime<Utc>>;
        async fn access_time(&self, path: &Path) -> Option<DateTime<Utc>>;
    }
}
