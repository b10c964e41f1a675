use std::default::Default;

/// How the session host is chosen
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostPolicy {
    /// The first endpoint accepted becomes the host. If it disconnects the
    /// session ends.
    FirstConnected,
    /// No endpoint is host; the Server runs as a dedicated authority
    None,
}

/// Where late joiners get their snapshot from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SnapshotSource {
    /// Ask the host, falling back to the Server's own directory when there is
    /// no host or the host is the one joining
    Host,
    /// Always serve from the Server's own directory
    Authority,
}

/// Contains Config properties which will be used by the Server
#[derive(Clone)]
pub struct ServerConfig {
    pub host_policy: HostPolicy,
    pub snapshot_source: SnapshotSource,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host_policy: HostPolicy::FirstConnected,
            snapshot_source: SnapshotSource::Host,
        }
    }
}
