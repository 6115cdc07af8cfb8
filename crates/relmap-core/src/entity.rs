//! Entity handles.
//!
//! Invariants:
//! - An [`EntityRef`] is a shared handle; clones address the same instance and
//!   equality is handle identity.
//! - A handle is either a real entity or a placeholder. A placeholder holds
//!   only its identifier until the manager attaches a state to it. An
//!   attachment is removed again only when the payload that triggered it
//!   fails to hydrate.
//! - Back-references wired into an unattached placeholder are queued and
//!   seeded into the state attached to it.
//! - A field is initialized only while the most recently applied payload
//!   carried it. Reads and writes of uninitialized fields fail.
//! - No `RefCell` borrow outlives a single accessor call.
//!
//! Handles are strong `Rc`s and relation values hold handles, so a
//! one-to-many parent and its back-referencing children form reference
//! cycles. Mapped graphs live until the process ends; nothing is evicted.

use crate::{
    error::{ErrorClass, ErrorOrigin},
    model::{EntityModel, FieldModel},
    proxy::PlaceholderClass,
    value::{EntityId, Value},
};
use serde_json::Value as JsonValue;
use std::{cell::RefCell, fmt, rc::Rc};
use thiserror::Error as ThisError;

///
/// AccessError
///
/// Failures of the guarded property accessors.
///

#[derive(Clone, Debug, ThisError)]
#[remain::sorted]
pub enum AccessError {
    #[error("entity '{entity}#{id}' cannot be loaded: property '{property}' read before its data arrived")]
    NotLoaded {
        entity: String,
        id: EntityId,
        property: String,
    },

    #[error("property '{entity}.{property}' is not readable")]
    NotReadable { entity: String, property: String },

    #[error("property '{entity}.{property}' is read-only")]
    NotWritable { entity: String, property: String },

    #[error("the property '{property}' of entity '{entity}' was not initialized")]
    Uninitialized { entity: String, property: String },

    #[error("entity '{entity}' has no property '{property}'")]
    UnknownProperty { entity: String, property: String },
}

impl AccessError {
    pub(crate) const fn class(&self) -> ErrorClass {
        match self {
            Self::NotLoaded { .. } => ErrorClass::NotLoaded,
            Self::Uninitialized { .. } => ErrorClass::Uninitialized,
            Self::NotReadable { .. } | Self::NotWritable { .. } | Self::UnknownProperty { .. } => {
                ErrorClass::Access
            }
        }
    }

    pub(crate) const fn origin(&self) -> ErrorOrigin {
        match self {
            Self::NotLoaded { .. } => ErrorOrigin::Placeholder,
            _ => ErrorOrigin::Entity,
        }
    }
}

///
/// EntityState
///
/// Field storage for one loaded entity, indexed by the model's slots.
///

#[derive(Debug)]
struct EntityState {
    raw: Vec<Option<JsonValue>>,
    values: Vec<Option<Value>>,
    dirty: bool,
}

impl EntityState {
    fn new(len: usize) -> Self {
        Self {
            raw: vec![None; len],
            values: vec![None; len],
            dirty: false,
        }
    }

    fn reset(&mut self) {
        self.raw.iter_mut().for_each(|slot| *slot = None);
        self.values.iter_mut().for_each(|slot| *slot = None);
        self.dirty = false;
    }

    fn read(&self, model: &EntityModel, slot: usize) -> Result<Value, AccessError> {
        self.values[slot]
            .clone()
            .ok_or_else(|| uninitialized(model, model.field(slot)))
    }

    fn write(&mut self, model: &EntityModel, slot: usize, value: Value) -> Result<(), AccessError> {
        let field = model.field(slot);
        if !field.descriptor.writable {
            return Err(AccessError::NotWritable {
                entity: model.name.clone(),
                property: field.name.clone(),
            });
        }

        let current = self.values[slot]
            .as_mut()
            .ok_or_else(|| uninitialized(model, field))?;
        *current = value;
        self.dirty = true;

        Ok(())
    }
}

fn uninitialized(model: &EntityModel, field: &FieldModel) -> AccessError {
    AccessError::Uninitialized {
        entity: model.name.clone(),
        property: field.name.clone(),
    }
}

///
/// Slot
///
/// Tagged variant replacing runtime instance probing.
///

enum Slot {
    Real(EntityState),
    Placeholder {
        class: Rc<PlaceholderClass>,
        attached: Option<EntityState>,
        pending: Vec<(usize, Value)>,
    },
}

struct EntityCell {
    model: Rc<EntityModel>,
    key: Option<EntityId>,
    slot: RefCell<Slot>,
}

///
/// EntityRef
///
/// Shared handle to one mapped entity or placeholder.
///

#[derive(Clone)]
pub struct EntityRef(Rc<EntityCell>);

impl EntityRef {
    /// Fresh real entity with every field uninitialized.
    pub(crate) fn new_real(model: Rc<EntityModel>, key: Option<EntityId>) -> Self {
        let state = EntityState::new(model.len());

        Self(Rc::new(EntityCell {
            model,
            key,
            slot: RefCell::new(Slot::Real(state)),
        }))
    }

    /// Unattached placeholder bound to an identifier only.
    /// Used by placeholder factories; attachment is reserved to the manager.
    #[must_use]
    pub fn placeholder(model: Rc<EntityModel>, class: Rc<PlaceholderClass>, id: EntityId) -> Self {
        Self(Rc::new(EntityCell {
            model,
            key: Some(id),
            slot: RefCell::new(Slot::Placeholder {
                class,
                attached: None,
                pending: Vec::new(),
            }),
        }))
    }

    // ------------------------------------------------------------------
    // Identity
    // ------------------------------------------------------------------

    #[must_use]
    pub fn model(&self) -> &Rc<EntityModel> {
        &self.0.model
    }

    #[must_use]
    pub fn entity_name(&self) -> &str {
        &self.0.model.name
    }

    /// Identity key this handle was mapped under, if any.
    #[must_use]
    pub fn key(&self) -> Option<&EntityId> {
        self.0.key.as_ref()
    }

    /// Identifier in raw form (null for unkeyed entities).
    #[must_use]
    pub fn id_json(&self) -> JsonValue {
        self.key().map_or(JsonValue::Null, EntityId::to_json)
    }

    /// Type check that placeholders answer exactly like real entities.
    #[must_use]
    pub fn is_a(&self, entity: &str) -> bool {
        self.entity_name() == entity
    }

    /// Capability probe: true for placeholders, attached or not.
    #[must_use]
    pub fn is_proxy(&self) -> bool {
        matches!(&*self.0.slot.borrow(), Slot::Placeholder { .. })
    }

    /// False only for placeholders still waiting for their data.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        match &*self.0.slot.borrow() {
            Slot::Real(_) => true,
            Slot::Placeholder { attached, .. } => attached.is_some(),
        }
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    // ------------------------------------------------------------------
    // Guarded accessors
    // ------------------------------------------------------------------

    /// Read a property through its guard.
    pub fn get(&self, property: &str) -> Result<Value, AccessError> {
        let slot = self.slot_of(property)?;
        let model = &self.0.model;

        if let Some(id) = self.placeholder_id(property) {
            return Ok(id);
        }

        let field = model.field(slot);
        if !field.descriptor.readable {
            return Err(AccessError::NotReadable {
                entity: model.name.clone(),
                property: field.name.clone(),
            });
        }

        self.read_slot(slot)
    }

    /// Write a typed value through the property's guard, marking the entity dirty.
    pub fn set(&self, property: &str, value: impl Into<Value>) -> Result<(), AccessError> {
        let slot = self.slot_of(property)?;
        let model = &self.0.model;
        let value = value.into();

        match &mut *self.0.slot.borrow_mut() {
            Slot::Real(state) => state.write(model, slot, value),
            Slot::Placeholder {
                class, attached, ..
            } => {
                if property == class.id_property() {
                    return Err(AccessError::NotWritable {
                        entity: model.name.clone(),
                        property: property.to_string(),
                    });
                }
                match attached {
                    Some(state) => state.write(model, slot, value),
                    None => Err(self.not_loaded(property)),
                }
            }
        }
    }

    /// Check that `set` would accept a write to `property` without writing.
    pub fn ensure_writable(&self, property: &str) -> Result<(), AccessError> {
        let slot = self.slot_of(property)?;
        let model = &self.0.model;
        let field = model.field(slot);

        if !field.descriptor.writable || self.placeholder_id(property).is_some() {
            return Err(AccessError::NotWritable {
                entity: model.name.clone(),
                property: field.name.clone(),
            });
        }

        self.with_state(property, |state| {
            state.values[slot]
                .as_ref()
                .map(|_| ())
                .ok_or_else(|| uninitialized(model, field))
        })
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        match &*self.0.slot.borrow() {
            Slot::Real(state) => state.dirty,
            Slot::Placeholder { attached, .. } => attached.as_ref().is_some_and(|s| s.dirty),
        }
    }

    #[must_use]
    pub fn is_initialized(&self, property: &str) -> bool {
        let Some(slot) = self.0.model.slot(property) else {
            return false;
        };
        if self.placeholder_id(property).is_some() {
            return true;
        }

        self.with_state(property, |state| Ok(state.values[slot].is_some()))
            .unwrap_or(false)
    }

    /// Raw payload value last supplied for `property`.
    #[must_use]
    pub fn raw(&self, property: &str) -> Option<JsonValue> {
        let slot = self.0.model.slot(property)?;

        self.with_state(property, |state| Ok(state.raw[slot].clone()))
            .ok()
            .flatten()
    }

    // ------------------------------------------------------------------
    // Manager-only mutation
    // ------------------------------------------------------------------

    /// Read the stored value of a slot, ignoring the readable flag.
    pub(crate) fn read_slot(&self, slot: usize) -> Result<Value, AccessError> {
        let model = &self.0.model;
        let field = model.field(slot);

        if let Some(id) = self.placeholder_id(&field.name) {
            return Ok(id);
        }

        self.with_state(&field.name, |state| state.read(model, slot))
    }

    /// Attach fresh field storage to an unattached placeholder, seeded with
    /// any queued back-references. Returns false when there was nothing to
    /// attach to.
    pub(crate) fn attach(&self) -> bool {
        let len = self.0.model.len();

        match &mut *self.0.slot.borrow_mut() {
            Slot::Placeholder {
                attached, pending, ..
            } if attached.is_none() => {
                let mut state = EntityState::new(len);
                for (slot, value) in pending.iter() {
                    state.values[*slot] = Some(value.clone());
                }
                *attached = Some(state);
                true
            }
            _ => false,
        }
    }

    /// Undo an attachment whose payload failed. Queued values are kept.
    pub(crate) fn detach(&self) {
        if let Slot::Placeholder { attached, .. } = &mut *self.0.slot.borrow_mut() {
            *attached = None;
        }
    }

    /// Drop the queue once an attachment has been fully hydrated.
    pub(crate) fn settle(&self) {
        if let Slot::Placeholder { pending, .. } = &mut *self.0.slot.borrow_mut() {
            pending.clear();
        }
    }

    /// Forget every field and the dirty flag ahead of a full reload.
    pub(crate) fn reset(&self) {
        match &mut *self.0.slot.borrow_mut() {
            Slot::Real(state)
            | Slot::Placeholder {
                attached: Some(state),
                ..
            } => state.reset(),
            Slot::Placeholder { attached: None, .. } => {}
        }
    }

    /// Store a freshly transformed payload field.
    pub(crate) fn load(&self, slot: usize, raw: JsonValue, value: Value) -> Result<(), AccessError> {
        let name = self.0.model.field(slot).name.clone();

        self.with_state_mut(&name, |state| {
            state.raw[slot] = Some(raw);
            state.values[slot] = Some(value);
        })
    }

    /// Inject a value directly, bypassing transform, writability and dirty marking.
    pub(crate) fn inject(&self, property: &str, value: Value) -> Result<(), AccessError> {
        let slot = self.slot_of(property)?;

        self.with_state_mut(property, |state| {
            state.values[slot] = Some(value);
        })
    }

    /// Like [`Self::inject`], but an unattached placeholder queues the value
    /// until its state is attached. A later value for the same slot wins.
    pub(crate) fn inject_or_defer(&self, property: &str, value: Value) -> Result<(), AccessError> {
        let slot = self.slot_of(property)?;

        match &mut *self.0.slot.borrow_mut() {
            Slot::Real(state)
            | Slot::Placeholder {
                attached: Some(state),
                ..
            } => state.values[slot] = Some(value),
            Slot::Placeholder { pending, .. } => {
                pending.retain(|(queued, _)| *queued != slot);
                pending.push((slot, value));
            }
        }

        Ok(())
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn slot_of(&self, property: &str) -> Result<usize, AccessError> {
        self.0
            .model
            .slot(property)
            .ok_or_else(|| AccessError::UnknownProperty {
                entity: self.0.model.name.clone(),
                property: property.to_string(),
            })
    }

    // Placeholders answer their identifier without consulting any state.
    fn placeholder_id(&self, property: &str) -> Option<Value> {
        match &*self.0.slot.borrow() {
            Slot::Placeholder { class, .. } if property == class.id_property() => {
                self.0.key.as_ref().map(EntityId::to_value)
            }
            _ => None,
        }
    }

    fn not_loaded(&self, property: &str) -> AccessError {
        AccessError::NotLoaded {
            entity: self.0.model.name.clone(),
            id: self
                .0
                .key
                .clone()
                .unwrap_or_else(|| EntityId::Text(String::new())),
            property: property.to_string(),
        }
    }

    fn with_state<R>(
        &self,
        property: &str,
        f: impl FnOnce(&EntityState) -> Result<R, AccessError>,
    ) -> Result<R, AccessError> {
        match &*self.0.slot.borrow() {
            Slot::Real(state)
            | Slot::Placeholder {
                attached: Some(state),
                ..
            } => f(state),
            Slot::Placeholder { class, .. } => {
                if class.is_guarded(property) {
                    Err(self.not_loaded(property))
                } else {
                    Err(AccessError::UnknownProperty {
                        entity: self.0.model.name.clone(),
                        property: property.to_string(),
                    })
                }
            }
        }
    }

    fn with_state_mut(
        &self,
        property: &str,
        f: impl FnOnce(&mut EntityState),
    ) -> Result<(), AccessError> {
        match &mut *self.0.slot.borrow_mut() {
            Slot::Real(state)
            | Slot::Placeholder {
                attached: Some(state),
                ..
            } => {
                f(state);
                Ok(())
            }
            Slot::Placeholder { attached: None, .. } => Err(self.not_loaded(property)),
        }
    }
}

impl PartialEq for EntityRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for EntityRef {}

// Entity graphs are cyclic; Debug never descends into field values.
impl fmt::Debug for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &*self.0.slot.borrow() {
            Slot::Real(_) => "entity",
            Slot::Placeholder { attached: None, .. } => "placeholder",
            Slot::Placeholder { .. } => "placeholder(loaded)",
        };

        match &self.0.key {
            Some(key) => write!(f, "{kind} {}#{key}", self.0.model.name),
            None => write!(f, "{kind} {}#?", self.0.model.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::{EntityDescriptor, PropertyDescriptor},
        proxy::{PlaceholderFactory, ProxyFactory},
    };
    use serde_json::json;

    fn model() -> Rc<EntityModel> {
        Rc::new(
            EntityDescriptor::new("project")
                .property("id", PropertyDescriptor::identifier())
                .property("name", PropertyDescriptor::text())
                .property("secret", PropertyDescriptor::text().readable(false))
                .compile("id")
                .expect("project should compile"),
        )
    }

    fn loaded(model: &Rc<EntityModel>) -> EntityRef {
        let entity = EntityRef::new_real(model.clone(), Some(EntityId::Int(1)));
        entity
            .load(0, json!(1), Value::Int(1))
            .expect("real entity accepts loads");
        entity
            .load(1, json!("alpha"), Value::from("alpha"))
            .expect("real entity accepts loads");
        entity
    }

    #[test]
    fn loads_do_not_mark_dirty_but_writes_do() {
        let entity = loaded(&model());
        assert!(!entity.is_dirty(), "freshly loaded entity must be clean");

        entity.set("name", "alpha").expect("name is writable");
        assert!(entity.is_dirty(), "writing the same value still marks dirty");
    }

    #[test]
    fn read_only_and_unreadable_properties_are_guarded() {
        let entity = loaded(&model());

        let err = entity.set("id", 5_i64).expect_err("id is read-only");
        assert!(matches!(err, AccessError::NotWritable { .. }));
        assert_eq!(entity.get("id").expect("id is readable"), Value::Int(1));

        let err = entity.get("secret").expect_err("secret is not readable");
        assert!(matches!(err, AccessError::NotReadable { .. }));
    }

    #[test]
    fn uninitialized_properties_reject_reads_and_writes() {
        let entity = loaded(&model());
        entity.reset();

        assert!(!entity.is_initialized("name"));
        let err = entity.get("name").expect_err("reset clears fields");
        assert!(matches!(err, AccessError::Uninitialized { ref property, .. } if property == "name"));

        let err = entity.set("name", "beta").expect_err("write needs initialized field");
        assert!(matches!(err, AccessError::Uninitialized { .. }));
        assert!(!entity.is_dirty(), "rejected writes never mark dirty");
    }

    #[test]
    fn unknown_properties_are_rejected() {
        let entity = loaded(&model());
        let err = entity.get("missing").expect_err("unknown property");

        assert!(matches!(err, AccessError::UnknownProperty { .. }));
    }

    #[test]
    fn placeholder_exposes_identifier_before_and_after_attachment() {
        let model = model();
        let mut factory = ProxyFactory::default();
        let proxy = factory.create_placeholder(&model, EntityId::Int(5));

        assert!(proxy.is_proxy());
        assert!(!proxy.is_loaded());
        assert!(proxy.is_a("project"));
        assert_eq!(proxy.get("id").expect("id always readable"), Value::Int(5));

        let err = proxy.get("name").expect_err("name is guarded");
        assert!(matches!(err, AccessError::NotLoaded { .. }));
        let err = proxy.set("name", "x").expect_err("writes are guarded too");
        assert!(matches!(err, AccessError::NotLoaded { .. }));

        assert!(proxy.attach(), "first attachment succeeds");
        assert!(!proxy.attach(), "attachment happens at most once");
        proxy
            .load(1, json!("test"), Value::from("test"))
            .expect("attached placeholder accepts loads");

        assert_eq!(proxy.get("id").expect("id still readable"), Value::Int(5));
        assert_eq!(proxy.get("name").expect("forwarded"), Value::from("test"));
        assert!(proxy.is_loaded());
        assert!(proxy.is_proxy(), "upgrade never turns a placeholder into a real handle");

        let err = proxy.set("id", 6_i64).expect_err("placeholder id is immutable");
        assert!(matches!(err, AccessError::NotWritable { .. }));
    }

    #[test]
    fn queued_values_seed_every_attachment_until_settled() {
        let model = model();
        let mut factory = ProxyFactory::default();
        let proxy = factory.create_placeholder(&model, EntityId::Int(5));

        proxy
            .inject_or_defer("name", Value::from("first"))
            .expect("unattached placeholders queue values");
        proxy
            .inject_or_defer("name", Value::from("queued"))
            .expect("later values replace earlier ones");
        assert!(!proxy.is_loaded(), "queueing never attaches");

        assert!(proxy.attach());
        assert_eq!(proxy.get("name").expect("seeded"), Value::from("queued"));
        assert_eq!(proxy.raw("name"), None, "queued values carry no raw payload");

        proxy.detach();
        assert!(!proxy.is_loaded(), "detach returns to the unattached state");
        let err = proxy.get("name").expect_err("guarded again");
        assert!(matches!(err, AccessError::NotLoaded { .. }));

        assert!(proxy.attach(), "a detached placeholder can attach again");
        assert_eq!(proxy.get("name").expect("queue survives detach"), Value::from("queued"));

        proxy.settle();
        proxy.detach();
        assert!(proxy.attach());
        assert!(!proxy.is_initialized("name"), "settled queues are gone");
    }
}
