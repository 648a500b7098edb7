//! Stored binary blob port

use async_trait::async_trait;

#[cfg(test)]
use mockall::mock;

/// A record in the binary blob store
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredBlob {
    /// Display filename, when one was recorded
    pub file_name: Option<String>,

    /// Filename extension, including the leading dot
    pub extension: String,

    /// Raw content; empty for URL-only records
    pub content: Vec<u8>,

    /// The record points at a remote URL instead of carrying bytes
    pub url_only: bool,
}

/// Binary blob store
#[async_trait]
pub trait BlobStore: Clone + Send + Sync + 'static {
    /// Look up a stored blob by its identifier.
    ///
    /// # Returns
    /// A [`Result`] which is [`Ok`] with [`None`] when no record carries the
    /// identifier, or an [`Err`] when the store itself failed.
    async fn get_by_id(&self, id: &str) -> Result<Option<StoredBlob>, anyhow::Error>;
}

#[cfg(test)]
mock! {
    pub BlobStore {}

    impl Clone for BlobStore {
        fn clone(&self) -> Self;
    }

    #[async_trait]
    impl BlobStore for BlobStore {
        async fn get_by_id(&self, id: &str) -> Result<Option<StoredBlob>, anyhow::Error>;
    }
}
