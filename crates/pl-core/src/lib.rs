pub mod clock;
pub mod config;
pub mod id;
pub mod model;
pub mod storage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{EditorConfig, ToolSettings};
pub use id::ObjectId;
pub use model::*;
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};

use serde::Serialize;
use serde::de::DeserializeOwned;

/// A value that can be captured into undo history and persisted in a project.
///
/// History and persistence only ever clone and (de)serialize snapshots, so any
/// renderer's scene type can be swapped in without touching either.
pub trait Snapshot: Clone + Serialize + DeserializeOwned {}

impl<T: Clone + Serialize + DeserializeOwned> Snapshot for T {}
