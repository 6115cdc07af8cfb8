//! Identity map and hydration engine.
//!
//! The [`ObjectManager`] owns the entity registry, the identity map and the
//! placeholder factory. Every hydrated `(type, id)` pair maps to exactly one
//! handle for the manager's lifetime; placeholders are upgraded in place so
//! earlier holders observe the data once it arrives.

mod hydrate;
mod identity;
mod serialize;


pub use identity::IdentityMap;

use crate::{
    config::ManagerConfig,
    entity::{AccessError, EntityRef},
    error::InternalError,
    model::{EntityDescriptor, EntityModel, SchemaError},
    obs::{HydrationEvent, HydrationMetrics, MetricsSink},
    proxy::{PlaceholderFactory, ProxyFactory},
    transform::Resolver,
    value::{EntityId, Value},
};
use serde_json::{Map, Value as JsonValue};
use std::{cell::RefCell, collections::HashMap, rc::Rc};
use thiserror::Error as ThisError;

///
/// LookupError
///

#[derive(Clone, Debug, ThisError)]
pub enum LookupError {
    #[error("entity '{entity}#{id}' not loaded")]
    NotFound { entity: String, id: EntityId },
}

///
/// SerializeError
///

#[derive(Clone, Debug, ThisError)]
pub enum SerializeError {
    #[error(
        "cannot serialize entity '{entity}' that is not fully initialized; uninitialized properties: {}",
        .properties.join(", ")
    )]
    Uninitialized {
        entity: String,
        properties: Vec<String>,
    },
}

///
/// ObjectManager
///
/// Registry, identity map and hydration policy (debug, metrics) for one
/// host session. Single-threaded; handles are not `Send`.
///

pub struct ObjectManager<F: PlaceholderFactory = ProxyFactory> {
    config: ManagerConfig,
    registry: HashMap<String, Rc<EntityModel>>,
    identity: IdentityMap,
    factory: F,
    metrics: RefCell<HydrationMetrics>,
    sink: Option<Rc<dyn MetricsSink>>,
}

impl ObjectManager {
    #[must_use]
    pub fn new() -> Self {
        Self::with_factory(ProxyFactory::new())
    }
}

impl Default for ObjectManager {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: PlaceholderFactory> ObjectManager<F> {
    #[must_use]
    pub fn with_factory(factory: F) -> Self {
        Self {
            config: ManagerConfig::default(),
            registry: HashMap::new(),
            identity: IdentityMap::new(),
            factory,
            metrics: RefCell::new(HydrationMetrics::default()),
            sink: None,
        }
    }

    /// Replace the manager policy. Affects registrations made afterwards.
    #[must_use]
    pub fn with_config(mut self, config: ManagerConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn debug(mut self) -> Self {
        self.config.debug = true;
        self
    }

    #[must_use]
    pub fn metrics_sink(mut self, sink: Rc<dyn MetricsSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    #[must_use]
    pub const fn config(&self) -> &ManagerConfig {
        &self.config
    }

    #[must_use]
    pub const fn factory(&self) -> &F {
        &self.factory
    }

    /// Snapshot of the manager's own hydration counters.
    #[must_use]
    pub fn metrics(&self) -> HydrationMetrics {
        self.metrics.borrow().clone()
    }

    pub fn reset_metrics(&self) {
        self.metrics.borrow_mut().reset();
    }

    // ---------------------------------------------------------------------
    // Registry
    // ---------------------------------------------------------------------

    /// Validate and compile an entity type. Each type registers once.
    pub fn register(
        &mut self,
        descriptor: EntityDescriptor,
    ) -> Result<Rc<EntityModel>, InternalError> {
        if self.is_registered(descriptor.name()) {
            return Err(SchemaError::AlreadyRegistered(descriptor.name().to_string()).into());
        }

        let model = Rc::new(descriptor.compile(&self.config.default_id_property)?);
        self.debug_log(format!(
            "register {} ({} properties, id '{}')",
            model.name,
            model.len(),
            model.id_property
        ));
        self.registry.insert(model.name.clone(), model.clone());

        Ok(model)
    }

    /// Compiled model of a registered type.
    pub fn model(&self, entity: &str) -> Result<&Rc<EntityModel>, InternalError> {
        self.registry
            .get(entity)
            .ok_or_else(|| SchemaError::UnknownEntity(entity.to_string()).into())
    }

    #[must_use]
    pub fn is_registered(&self, entity: &str) -> bool {
        self.registry.contains_key(entity)
    }

    // ---------------------------------------------------------------------
    // Lookup
    // ---------------------------------------------------------------------

    /// Mapped instance (real or placeholder). Never creates anything.
    pub fn get(&self, entity: &str, id: impl Into<EntityId>) -> Result<EntityRef, InternalError> {
        let id = id.into();

        self.identity
            .get(entity, &id)
            .cloned()
            .ok_or_else(|| {
                LookupError::NotFound {
                    entity: entity.to_string(),
                    id,
                }
                .into()
            })
    }

    /// Mapped instance, or a new placeholder mapped under the identity.
    pub fn get_reference(
        &mut self,
        entity: &str,
        id: impl Into<EntityId>,
    ) -> Result<EntityRef, InternalError> {
        let id = id.into();
        if let Some(existing) = self.identity.get(entity, &id) {
            return Ok(existing.clone());
        }

        let model = self.model(entity)?.clone();
        let placeholder = self.factory.create_placeholder(&model, id);
        self.identity.insert(placeholder.clone());
        self.record(
            HydrationEvent::PlaceholderCreated {
                entity: &model.name,
            },
            &placeholder,
        );

        Ok(placeholder)
    }

    /// Every mapped instance of a type in insertion order, placeholders
    /// included. Unknown types yield an empty list.
    #[must_use]
    pub fn get_all(&self, entity: &str) -> Vec<EntityRef> {
        self.identity.all(entity).to_vec()
    }

    /// Total number of mapped instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.identity.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.identity.is_empty()
    }

    // ---------------------------------------------------------------------
    // Entity access
    // ---------------------------------------------------------------------

    /// Setter path: run the property's forward transform on `raw` and write
    /// the result through the guard, marking the entity dirty.
    pub fn assign(
        &mut self,
        entity: &EntityRef,
        property: &str,
        raw: &JsonValue,
    ) -> Result<(), InternalError> {
        entity.ensure_writable(property)?;

        let model = entity.model().clone();
        let Some(slot) = model.slot(property) else {
            return Err(AccessError::UnknownProperty {
                entity: model.name.clone(),
                property: property.to_string(),
            }
            .into());
        };
        let value = self.transform_field(&model, slot, raw, entity)?;
        entity.set(property, value)?;

        Ok(())
    }

    /// Direct injection; bypasses transform, writability and dirty tracking.
    pub fn set_property_value(
        &self,
        entity: &EntityRef,
        property: &str,
        value: impl Into<Value>,
    ) -> Result<(), InternalError> {
        entity.inject(property, value.into())?;

        Ok(())
    }

    #[must_use]
    pub fn is_proxy(&self, entity: &EntityRef) -> bool {
        entity.is_proxy()
    }

    // ---------------------------------------------------------------------
    // Observability
    // ---------------------------------------------------------------------

    fn record(&self, event: HydrationEvent<'_>, subject: &EntityRef) {
        self.debug_log(format!("{} {subject:?}", event.label()));

        if self.config.metrics {
            self.metrics.borrow_mut().apply(event);
        }
        if let Some(sink) = &self.sink {
            sink.record(event);
        }
    }

    fn debug_log(&self, s: impl AsRef<str>) {
        if self.config.debug {
            println!("[debug] {}", s.as_ref());
        }
    }
}

impl<F: PlaceholderFactory> Resolver for ObjectManager<F> {
    fn create(&mut self, entity: &str, raw: &JsonValue) -> Result<EntityRef, InternalError> {
        Self::create(self, entity, raw)
    }

    fn get_reference(&mut self, entity: &str, id: EntityId) -> Result<EntityRef, InternalError> {
        Self::get_reference(self, entity, id)
    }

    fn to_array(&self, entity: &EntityRef) -> Result<Map<String, JsonValue>, InternalError> {
        Self::to_array(self, entity)
    }
}
