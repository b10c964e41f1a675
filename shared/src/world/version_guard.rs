use std::collections::HashMap;

use crate::types::{ChannelIndex, Version};

/// Last applied version per channel of one object. A channel that has never
/// been seen starts at 0, so the first real update (version 1) applies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionGuard {
    last: HashMap<ChannelIndex, Version>,
}

impl VersionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self, channel: ChannelIndex) -> Version {
        self.last.get(&channel).copied().unwrap_or(0)
    }

    pub fn accepts(&self, channel: ChannelIndex, version: Version) -> bool {
        version > self.last(channel)
    }

    /// Records `version` if it is newer than anything applied on `channel`.
    /// Returns false, leaving the guard untouched, otherwise.
    pub fn try_apply(&mut self, channel: ChannelIndex, version: Version) -> bool {
        if !self.accepts(channel, version) {
            return false;
        }
        self.last.insert(channel, version);
        true
    }

    /// Next version for an update the owner is about to send
    pub fn next_outgoing(&mut self, channel: ChannelIndex) -> Version {
        let next = self.last(channel) + 1;
        self.last.insert(channel, next);
        next
    }

    /// Raises channels to the versions captured in a snapshot
    pub fn seed(&mut self, versions: &[(ChannelIndex, Version)]) {
        for (channel, version) in versions {
            if *version > self.last(*channel) {
                self.last.insert(*channel, *version);
            }
        }
    }

    /// Every channel with a non-zero version, ascending by channel
    pub fn versions(&self) -> Vec<(ChannelIndex, Version)> {
        let mut output: Vec<(ChannelIndex, Version)> = self
            .last
            .iter()
            .filter(|(_, version)| **version > 0)
            .map(|(channel, version)| (*channel, *version))
            .collect();
        output.sort_unstable();
        output
    }
}
