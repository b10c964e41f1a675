mod sync_state;

pub use sync_state::{SyncProgress, SyncState, SyncStatus};
