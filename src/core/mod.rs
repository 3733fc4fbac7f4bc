pub mod blob;
pub mod commit;
pub mod config;
pub mod error;
pub mod history;
pub mod index;
pub mod object;
pub mod refs;
pub mod repository;
pub mod tree;

pub use blob::Blob;
pub use commit::Commit;
pub use config::Config;
pub use error::{Error, Result};
pub use history::History;
pub use index::{Index, IndexEntry};
pub use object::{Object, ObjectId, ObjectType, RawObject};
pub use refs::Refs;
pub use repository::{Repository, StoredObject};
pub use tree::{Tree, TreeEntry};

/// Name of the control directory at the top of every working root.
pub const CONTROL_DIR: &str = ".minigit";
