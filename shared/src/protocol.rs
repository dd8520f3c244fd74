use std::{collections::HashMap, sync::Arc};

use log::info;

use crate::{
    rpc::rpc_spec::{ResolvedRpc, RpcSpec},
    schema::{
        class_schema::ClassSchema,
        error::SchemaError,
        field_registry::{ClassInfo, FieldRegistry},
        serializer::FieldSerde,
    },
    types::{ClassId, RpcId},
};

pub mod error;
pub use error::ProtocolError;

/// The schema registry shared by every channel of a process.
///
/// Classes, RPCs and custom serializers are added while building; `build`
/// resolves them and returns a locked protocol meant to be wrapped in an
/// `Arc` and handed to the world and every channel.
#[derive(Default)]
pub struct Protocol {
    class_schemas: Vec<ClassSchema>,
    rpc_specs: Vec<RpcSpec>,
    serializers: Vec<(String, Arc<dyn FieldSerde>)>,
    registry: FieldRegistry,
    rpcs: HashMap<RpcId, Arc<ResolvedRpc>>,
    locked: bool,
}

impl Protocol {
    pub fn builder() -> Self {
        Self::default()
    }

    pub fn add_class(&mut self, schema: ClassSchema) -> &mut Self {
        self.check_lock();
        self.class_schemas.push(schema);
        self
    }

    pub fn add_rpc(&mut self, spec: RpcSpec) -> &mut Self {
        self.check_lock();
        self.rpc_specs.push(spec);
        self
    }

    /// Registers the serializer used for fields of `FieldType::Custom(type_name)`
    pub fn add_serializer(&mut self, type_name: impl Into<String>, serde: Arc<dyn FieldSerde>) -> &mut Self {
        self.check_lock();
        self.serializers.push((type_name.into(), serde));
        self
    }

    // Non-panicking builder methods

    pub fn try_add_class(&mut self, schema: ClassSchema) -> Result<&mut Self, ProtocolError> {
        self.try_check_lock()?;
        self.class_schemas.push(schema);
        Ok(self)
    }

    pub fn try_add_rpc(&mut self, spec: RpcSpec) -> Result<&mut Self, ProtocolError> {
        self.try_check_lock()?;
        self.rpc_specs.push(spec);
        Ok(self)
    }

    pub fn try_add_serializer(
        &mut self,
        type_name: impl Into<String>,
        serde: Arc<dyn FieldSerde>,
    ) -> Result<&mut Self, ProtocolError> {
        self.try_check_lock()?;
        self.serializers.push((type_name.into(), serde));
        Ok(self)
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

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Resolves every class and RPC, and returns the locked protocol.
    /// The builder is left empty.
    pub fn build(&mut self) -> Result<Self, ProtocolError> {
        self.try_check_lock()?;
        let mut built = std::mem::take(self);

        for (type_name, serde) in std::mem::take(&mut built.serializers) {
            built.registry.add_serializer(type_name, serde);
        }
        for schema in std::mem::take(&mut built.class_schemas) {
            built.registry.register(schema)?;
        }
        for spec in std::mem::take(&mut built.rpc_specs) {
            if built.rpcs.contains_key(&spec.rpc_id) {
                return Err(SchemaError::DuplicateRpc { rpc_id: spec.rpc_id }.into());
            }
            built.registry.class(spec.class_id)?;
            let mut params = Vec::with_capacity(spec.params.len());
            for param in &spec.params {
                params.push(built.registry.resolve_serializer(*param, &spec.name)?);
            }
            built.rpcs.insert(spec.rpc_id, Arc::new(ResolvedRpc { spec, params }));
        }

        info!(
            "Protocol built with {} classes and {} RPCs",
            built.registry.len(),
            built.rpcs.len()
        );
        built.locked = true;
        Ok(built)
    }

    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    pub fn class(&self, class_id: ClassId) -> Result<&Arc<ClassInfo>, SchemaError> {
        self.registry.class(class_id)
    }

    pub fn rpc(&self, rpc_id: RpcId) -> Option<&Arc<ResolvedRpc>> {
        self.rpcs.get(&rpc_id)
    }
}
