use replicant_shared::NetworkIdentity;

/// Hands out network identities in strictly increasing order, starting at 1.
/// An identity is never handed out twice, even after its object is despawned.
pub struct IdentityAllocator {
    next: u64,
}

impl IdentityAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// None once the identity space is exhausted
    pub fn generate(&mut self) -> Option<NetworkIdentity> {
        let identity = NetworkIdentity::new(self.next);
        self.next = self.next.checked_add(1)?;
        Some(identity)
    }
}

impl Default for IdentityAllocator {
    fn default() -> Self {
        Self::new()
    }
}
