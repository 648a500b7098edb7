//! Filesystem accessors

mod local;

pub use local::LocalFileStore;
