//! Collaborator storage ports consumed during envelope assembly.

mod blobs;
mod files;

pub use blobs::{BlobStore, StoredBlob};
pub use files::FileStore;
