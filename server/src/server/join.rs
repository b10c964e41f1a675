use log::{info, warn};

use replicant_shared::{EndpointId, ReplicationMessage, SnapshotEntry};

use super::server::Server;
use crate::{JoinError, SnapshotSource};

impl Server {
    /// Starts a join for `target`: asks the snapshot source for its
    /// directory, or serves the Server's own when there is no other source
    pub(super) fn begin_join(&mut self, target: EndpointId) {
        match self.snapshot_source_for(target) {
            Some(source) => {
                info!("asking {} for a snapshot for {}", source, target);
                self.joins.begin(target, source);
                self.send_to(
                    source,
                    &ReplicationMessage::SnapshotRequest { target },
                    self.lifecycle_delivery,
                );
            }
            None => {
                self.joins.cancel(target);
                let entries = self.directory.capture_snapshot();
                self.forward_snapshot(target, entries);
            }
        }
    }

    /// Restarts a join the endpoint still has pending or lost to its source
    pub(super) fn handle_join_retry(&mut self, endpoint: EndpointId) {
        if !self.joins.may_retry(&endpoint) {
            warn!(
                "Server Error: {} asked to retry a join it does not have",
                endpoint
            );
            return;
        }
        info!("{} is retrying its join", endpoint);
        self.begin_join(endpoint);
    }

    fn snapshot_source_for(&self, target: EndpointId) -> Option<EndpointId> {
        if self.config.snapshot_source == SnapshotSource::Authority {
            return None;
        }
        self.host
            .filter(|host| *host != target && self.is_accepted(host))
    }

    pub(super) fn handle_snapshot_reply(
        &mut self,
        from: EndpointId,
        target: EndpointId,
        entries: Vec<SnapshotEntry>,
    ) {
        if let Err(error) = self.joins.complete(target, from) {
            warn!("Server Error: dropping snapshot reply: {}", error);
            return;
        }
        if !self.is_accepted(&target) {
            info!("{} left before its snapshot arrived", target);
            return;
        }
        self.forward_snapshot(target, entries);
    }

    /// Sends the count, then every entry in order
    fn forward_snapshot(&mut self, target: EndpointId, entries: Vec<SnapshotEntry>) {
        let count = match snapshot_count(target, entries.len()) {
            Ok(count) => count,
            Err(error) => {
                warn!("Server Error: {}", error);
                self.send_to(target, &ReplicationMessage::SnapshotAbort, self.lifecycle_delivery);
                self.incoming_events.push_join_abort(target);
                self.incoming_events.push_error(error.into());
                return;
            }
        };
        info!("sending {} snapshot entries to {}", count, target);

        self.send_to(
            target,
            &ReplicationMessage::SnapshotCount { count },
            self.lifecycle_delivery,
        );
        for entry in entries {
            self.send_to(
                target,
                &ReplicationMessage::SnapshotEntry(entry),
                self.lifecycle_delivery,
            );
        }
        self.incoming_events.push_snapshot_sent(target, count);
    }
}

fn snapshot_count(target: EndpointId, entries: usize) -> Result<u32, JoinError> {
    u32::try_from(entries).map_err(|_| JoinError::SnapshotTooLarge { target, entries })
}
