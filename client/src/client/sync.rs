use log::{debug, info, warn};

use replicant_shared::{EndpointId, ReplicationMessage, SnapshotEntry, SyncProgress};

use super::client::Client;

impl Client {
    /// Captures the whole Directory in one step and hands it back for the
    /// joining endpoint
    pub(super) fn on_snapshot_request(&mut self, target: EndpointId) {
        let entries = self.directory.capture_snapshot();
        info!(
            "replying with {} snapshot entries for {}",
            entries.len(),
            target
        );
        self.send(
            &ReplicationMessage::SnapshotReply { target, entries },
            self.lifecycle_delivery,
        );
    }

    pub(super) fn on_snapshot_count(&mut self, count: u32) {
        match self.sync.begin(count) {
            Ok(progress) => {
                debug!("syncing {} snapshot entries", count);
                self.incoming_events.push_sync_started(count);
                if progress == SyncProgress::Completed {
                    self.finish_sync();
                }
            }
            Err(error) => warn!("Client Error: {}", error),
        }
    }

    pub(super) fn on_snapshot_entry(&mut self, entry: SnapshotEntry) {
        if !self.sync.is_syncing() {
            warn!(
                "Client Error: dropping snapshot entry for {} outside of a sync",
                entry.identity
            );
            return;
        }

        match self.directory.apply_snapshot_entry(&self.registry, &entry) {
            Ok(true) => self
                .incoming_events
                .push_spawn(entry.identity, entry.owner),
            Ok(false) => {}
            Err(error) => error.log_dropped(EndpointId::AUTHORITY),
        }

        match self.sync.entry_applied() {
            Ok(SyncProgress::Completed) => self.finish_sync(),
            Ok(SyncProgress::InProgress) => {}
            Err(error) => warn!("Client Error: {}", error),
        }
    }

    /// The snapshot source left before replying. Objects already applied and
    /// traffic already queued are kept; the retried snapshot overwrites them.
    pub(super) fn on_snapshot_abort(&mut self) {
        if self.sync.is_idle() {
            warn!("Client Error: snapshot abort received while not joining");
            return;
        }

        if self.join_retries >= self.config.snapshot_retry_limit {
            warn!(
                "Client Error: join failed after {} retries",
                self.join_retries
            );
            self.incoming_events.push_join_failure(self.join_retries);
            self.disconnect();
            return;
        }

        self.join_retries += 1;
        info!("snapshot aborted, retrying join ({})", self.join_retries);
        self.sync.await_snapshot();
        self.send(&ReplicationMessage::JoinRetry, self.lifecycle_delivery);
        self.incoming_events.push_join_retry(self.join_retries);
    }

    /// Replays queued traffic in arrival order
    fn finish_sync(&mut self) {
        self.join_retries = 0;
        let deferred = self.sync.take_deferred();
        let replayed = deferred.len();
        for message in deferred {
            self.apply_world_message(message);
        }
        info!("sync complete, replayed {} queued messages", replayed);
        self.incoming_events.push_sync_completed(replayed);
    }
}
