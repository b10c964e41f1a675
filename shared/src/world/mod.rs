mod directory;
mod error;
mod replicate;
mod replicated_object;
mod snapshot;
mod sync;
mod type_registry;
mod version_guard;

pub use directory::Directory;
pub use error::{RegistryError, SyncError};
pub use replicate::{ReplicaType, Replicate, ReplicateBuilder};
pub use replicated_object::ReplicatedObject;
pub use snapshot::SnapshotEntry;
pub use sync::{SyncProgress, SyncState, SyncStatus};
pub use type_registry::TypeRegistry;
pub use version_guard::VersionGuard;
