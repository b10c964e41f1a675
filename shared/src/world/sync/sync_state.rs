use std::collections::VecDeque;

use crate::world::error::SyncError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// Connected or retrying, waiting for the snapshot count
    AwaitingSnapshot,
    /// Applying snapshot entries
    Syncing { expected: u32, applied: u32 },
    /// Caught up; ordinary traffic applies immediately
    Idle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncProgress {
    InProgress,
    Completed,
}

/// Tracks a participant's late-join sync and holds back ordinary traffic
/// until the snapshot has been applied. Held items come back out in the
/// order they arrived.
pub struct SyncState<T> {
    status: SyncStatus,
    deferred: VecDeque<T>,
}

impl<T> SyncState<T> {
    pub fn new() -> Self {
        Self {
            status: SyncStatus::AwaitingSnapshot,
            deferred: VecDeque::new(),
        }
    }

    pub fn status(&self) -> SyncStatus {
        self.status
    }

    pub fn is_idle(&self) -> bool {
        self.status == SyncStatus::Idle
    }

    /// Returns to waiting for a snapshot count. Deferred traffic is kept.
    pub fn await_snapshot(&mut self) {
        self.status = SyncStatus::AwaitingSnapshot;
    }

    pub fn begin(&mut self, count: u32) -> Result<SyncProgress, SyncError> {
        if self.status != SyncStatus::AwaitingSnapshot {
            return Err(SyncError::UnexpectedCount { count });
        }
        if count == 0 {
            self.status = SyncStatus::Idle;
            return Ok(SyncProgress::Completed);
        }
        self.status = SyncStatus::Syncing {
            expected: count,
            applied: 0,
        };
        Ok(SyncProgress::InProgress)
    }

    pub fn entry_applied(&mut self) -> Result<SyncProgress, SyncError> {
        let SyncStatus::Syncing { expected, applied } = self.status else {
            return Err(SyncError::UnexpectedEntry);
        };
        let applied = applied + 1;
        if applied >= expected {
            self.status = SyncStatus::Idle;
            return Ok(SyncProgress::Completed);
        }
        self.status = SyncStatus::Syncing { expected, applied };
        Ok(SyncProgress::InProgress)
    }

    pub fn is_syncing(&self) -> bool {
        matches!(self.status, SyncStatus::Syncing { .. })
    }

    pub fn defer(&mut self, item: T) {
        self.deferred.push_back(item);
    }

    /// Hands back deferred traffic once idle. Empty while a sync is pending.
    pub fn take_deferred(&mut self) -> VecDeque<T> {
        if !self.is_idle() {
            return VecDeque::new();
        }
        std::mem::take(&mut self.deferred)
    }

    pub fn deferred_len(&self) -> usize {
        self.deferred.len()
    }

    /// Drops all state, as on disconnect
    pub fn reset(&mut self) {
        self.status = SyncStatus::AwaitingSnapshot;
        self.deferred.clear();
    }
}

impl<T> Default for SyncState<T> {
    fn default() -> Self {
        Self::new()
    }
}
