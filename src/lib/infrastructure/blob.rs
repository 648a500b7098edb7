//! Blob store implementations

mod memory;

pub use memory::InMemoryBlobStore;
