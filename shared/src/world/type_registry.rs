use std::{any::TypeId, collections::HashMap};

use replicant_serde::{BitReader, SerdeErr};

use crate::{
    types::TypeCode,
    world::{
        error::RegistryError,
        replicate::{FnBuilder, ReplicaType, Replicate, ReplicateBuilder},
    },
};

/// Maps replicated types to the codes used for them on the wire.
///
/// Codes are handed out in registration order, so two participants agree on
/// them only if they register the same types in the same order.
#[derive(Default)]
pub struct TypeRegistry {
    builders: Vec<Box<dyn ReplicateBuilder>>,
    type_map: HashMap<TypeId, TypeCode>,
    name_map: HashMap<&'static str, TypeCode>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a concrete type, panicking if it is registered twice
    pub fn add_type<R: ReplicaType>(&mut self) -> TypeCode {
        self.try_add_type::<R>()
            .expect("replicated type could not be registered")
    }

    pub fn try_add_type<R: ReplicaType>(&mut self) -> Result<TypeCode, RegistryError> {
        let type_id = TypeId::of::<R>();
        if self.type_map.contains_key(&type_id) {
            return Err(RegistryError::DuplicateType { type_name: R::NAME });
        }
        let type_code = self.register(R::NAME, |reader| {
            R::read(reader).map(|replica| Box::new(replica) as Box<dyn Replicate>)
        })?;
        self.type_map.insert(type_id, type_code);
        Ok(type_code)
    }

    /// Registers a factory under a name. Types added this way can be created
    /// from the wire but have no Rust type to look their code up by.
    pub fn register<F>(&mut self, name: &'static str, factory: F) -> Result<TypeCode, RegistryError>
    where
        F: Fn(&mut BitReader) -> Result<Box<dyn Replicate>, SerdeErr> + Send + Sync + 'static,
    {
        self.register_builder(Box::new(FnBuilder::new(name, factory)))
    }

    pub fn register_builder(
        &mut self,
        builder: Box<dyn ReplicateBuilder>,
    ) -> Result<TypeCode, RegistryError> {
        let name = builder.name();
        if self.name_map.contains_key(name) {
            return Err(RegistryError::DuplicateType { type_name: name });
        }
        let type_code = TypeCode::try_from(self.builders.len()).map_err(|_| {
            RegistryError::TooManyTypes {
                max: TypeCode::MAX as usize + 1,
            }
        })?;
        self.builders.push(builder);
        self.name_map.insert(name, type_code);
        Ok(type_code)
    }

    pub fn type_code_of<R: ReplicaType>(&self) -> Result<TypeCode, RegistryError> {
        self.type_map
            .get(&TypeId::of::<R>())
            .copied()
            .ok_or(RegistryError::TypeNotRegistered { type_name: R::NAME })
    }

    /// Looks up the code of a live instance, by Rust type first and by name
    /// for factory-registered types
    pub fn type_code_of_replica(&self, replica: &dyn Replicate) -> Result<TypeCode, RegistryError> {
        let type_id = replica.as_any().type_id();
        if let Some(type_code) = self.type_map.get(&type_id) {
            return Ok(*type_code);
        }
        self.name_map
            .get(replica.type_name())
            .copied()
            .ok_or(RegistryError::TypeNotRegistered {
                type_name: replica.type_name(),
            })
    }

    /// Builds a new instance of `type_code` from its full state
    pub fn create(&self, type_code: TypeCode, state: &[u8]) -> Result<Box<dyn Replicate>, RegistryError> {
        let builder = self
            .builders
            .get(type_code as usize)
            .ok_or(RegistryError::UnknownTypeCode { type_code })?;
        let mut reader = BitReader::new(state);
        builder.build(&mut reader).map_err(|_| RegistryError::Decode {
            type_name: builder.name(),
        })
    }

    pub fn name_of(&self, type_code: TypeCode) -> Option<&'static str> {
        self.builders
            .get(type_code as usize)
            .map(|builder| builder.name())
    }

    /// Registered names in code order. Exchanged during the connect handshake.
    pub fn names(&self) -> Vec<String> {
        self.builders
            .iter()
            .map(|builder| builder.name().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.builders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builders.is_empty()
    }
}
