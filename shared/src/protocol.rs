use crate::{
    messages::DeliveryMode,
    world::{ReplicaType, TypeRegistry},
};

pub mod error;
pub use error::ProtocolError;

/// Extends a Protocol with a bundle of types and settings
pub trait ProtocolPlugin {
    fn build(&self, protocol: &mut Protocol);
}

/// Settings every participant of a session must agree on
pub struct Protocol {
    pub type_registry: TypeRegistry,
    /// Delivery requested for channel updates
    pub update_delivery: DeliveryMode,
    /// Delivery requested for spawn, despawn and snapshot traffic
    pub lifecycle_delivery: DeliveryMode,
    locked: bool,
}

impl Default for Protocol {
    fn default() -> Self {
        Self {
            type_registry: TypeRegistry::new(),
            update_delivery: DeliveryMode::SequencedUnreliable,
            lifecycle_delivery: DeliveryMode::OrderedReliable,
            locked: false,
        }
    }
}

impl Protocol {
    pub fn builder() -> Self {
        Self::default()
    }

    pub fn add_plugin<P: ProtocolPlugin>(&mut self, plugin: P) -> &mut Self {
        self.check_lock();
        plugin.build(self);
        self
    }

    pub fn add_type<R: ReplicaType>(&mut self) -> &mut Self {
        self.check_lock();
        self.type_registry.add_type::<R>();
        self
    }

    pub fn update_delivery(&mut self, mode: DeliveryMode) -> &mut Self {
        self.check_lock();
        self.update_delivery = mode;
        self
    }

    pub fn lifecycle_delivery(&mut self, mode: DeliveryMode) -> &mut Self {
        self.check_lock();
        self.lifecycle_delivery = mode;
        self
    }

    // Non-panicking builder methods

    pub fn try_add_plugin<P: ProtocolPlugin>(&mut self, plugin: P) -> Result<&mut Self, ProtocolError> {
        self.try_check_lock()?;
        plugin.build(self);
        Ok(self)
    }

    pub fn try_add_type<R: ReplicaType>(&mut self) -> Result<&mut Self, ProtocolError> {
        self.try_check_lock()?;
        self.type_registry.try_add_type::<R>()?;
        Ok(self)
    }

    pub fn try_update_delivery(&mut self, mode: DeliveryMode) -> Result<&mut Self, ProtocolError> {
        self.try_check_lock()?;
        self.update_delivery = mode;
        Ok(self)
    }

    pub fn try_lifecycle_delivery(&mut self, mode: DeliveryMode) -> Result<&mut Self, ProtocolError> {
        self.try_check_lock()?;
        self.lifecycle_delivery = mode;
        Ok(self)
    }

    pub fn try_lock(&mut self) -> Result<(), ProtocolError> {
        self.try_check_lock()?;
        self.locked = true;
        Ok(())
    }

    pub fn lock(&mut self) {
        self.check_lock();
        self.locked = true;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Checks if protocol is locked without panicking
    pub fn try_check_lock(&self) -> Result<(), ProtocolError> {
        if self.locked {
            Err(ProtocolError::AlreadyLocked)
        } else {
            Ok(())
        }
    }

    /// Checks if protocol is locked, panics if it is
    pub fn check_lock(&self) {
        if self.locked {
            panic!("Protocol already locked!");
        }
    }

    pub fn build(&mut self) -> Self {
        std::mem::take(self)
    }
}
