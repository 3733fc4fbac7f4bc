//! A minimal content-addressable object store and commit graph.
//!
//! Objects (blobs, trees, commits) live under `.minigit/objects`, named by
//! the SHA-256 of `"<kind> <len>\0" || body`. Branch refs and HEAD tie
//! commits into a chain; the staging index batches paths for the next
//! commit.

pub mod commands;
pub mod core;
pub mod utils;

pub use core::blob::Blob;
pub use core::commit::Commit;
pub use core::config::Config;
pub use core::error::{Error, Result};
pub use core::index::{Index, IndexEntry};
pub use core::object::{Object, ObjectId, ObjectType};
pub use core::refs::Refs;
pub use core::repository::{Repository, StoredObject};
pub use core::tree::{Tree, TreeEntry};
