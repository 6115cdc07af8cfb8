use crate::{
    entity::EntityRef,
    error::InternalError,
    manager::ObjectManager,
    model::EntityModel,
    obs::HydrationEvent,
    proxy::PlaceholderFactory,
    transform::{Transform, TransformError, shape},
    value::{EntityId, Value},
};
use serde_json::{Map, Value as JsonValue};
use std::rc::Rc;

impl<F: PlaceholderFactory> ObjectManager<F> {
    /// Hydrate a payload into the mapped instance for its identity.
    ///
    /// - unmapped identity: a new entity is mapped first, then filled
    /// - mapped entity: updated in place
    /// - mapped placeholder: upgraded in place
    ///
    /// The returned handle is always the one held by the identity map.
    pub fn create(&mut self, entity: &str, raw: &JsonValue) -> Result<EntityRef, InternalError> {
        let model = self.model(entity)?.clone();
        let fields = as_object(raw)?;
        let id = fields.get(&model.id_property).and_then(EntityId::from_json);

        if let Some(id) = &id
            && let Some(existing) = self.identity.get(entity, id).cloned()
        {
            self.refill(&existing, fields)?;
            return Ok(existing);
        }

        let instance = EntityRef::new_real(model.clone(), id);

        // Mapped before its fields so cycles inside the payload resolve to it.
        self.identity.insert(instance.clone());
        self.record(
            HydrationEvent::EntityCreated {
                entity: &model.name,
            },
            &instance,
        );
        self.apply_payload(&instance, fields)?;

        Ok(instance)
    }

    /// Forget every field of `existing` and re-apply only what `raw` carries.
    /// An unattached placeholder is upgraded instead.
    pub fn update(&mut self, existing: &EntityRef, raw: &JsonValue) -> Result<(), InternalError> {
        let fields = as_object(raw)?;

        self.refill(existing, fields)
    }

    // A placeholder stays unattached unless its whole payload hydrates.
    fn refill(
        &mut self,
        existing: &EntityRef,
        fields: &Map<String, JsonValue>,
    ) -> Result<(), InternalError> {
        if !existing.attach() {
            existing.reset();
            self.record(
                HydrationEvent::EntityUpdated {
                    entity: existing.entity_name(),
                },
                existing,
            );

            return self.apply_payload(existing, fields);
        }

        if let Err(err) = self.apply_payload(existing, fields) {
            existing.detach();
            return Err(err);
        }
        existing.settle();
        self.record(
            HydrationEvent::PlaceholderUpgraded {
                entity: existing.entity_name(),
            },
            existing,
        );

        Ok(())
    }

    // Payload order; keys the schema does not declare are ignored.
    fn apply_payload(
        &mut self,
        entity: &EntityRef,
        fields: &Map<String, JsonValue>,
    ) -> Result<(), InternalError> {
        let model = entity.model().clone();

        for (name, raw) in fields {
            let Some(slot) = model.slot(name) else {
                continue;
            };
            let value = self.transform_field(&model, slot, raw, entity)?;
            entity.load(slot, raw.clone(), value)?;
        }

        Ok(())
    }

    pub(super) fn transform_field(
        &mut self,
        model: &Rc<EntityModel>,
        slot: usize,
        raw: &JsonValue,
        owner: &EntityRef,
    ) -> Result<Value, InternalError> {
        model.field(slot).descriptor.kind.transform(raw, self, owner)
    }
}

fn as_object(raw: &JsonValue) -> Result<&Map<String, JsonValue>, TransformError> {
    raw.as_object()
        .ok_or_else(|| TransformError::NotAnObject(shape(raw).to_string()))
}
