use std::default::Default;

/// Contains Config properties which will be used by a Client
#[derive(Clone)]
pub struct ClientConfig {
    /// How many times a join is retried after its snapshot source is lost
    /// before the Client gives up and disconnects
    pub snapshot_retry_limit: u8,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            snapshot_retry_limit: 3,
        }
    }
}
