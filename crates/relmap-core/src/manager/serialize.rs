use crate::{
    entity::{AccessError, EntityRef},
    error::InternalError,
    manager::{ObjectManager, SerializeError},
    obs::HydrationEvent,
    proxy::PlaceholderFactory,
    transform::Transform,
};
use serde_json::{Map, Value as JsonValue};

impl<F: PlaceholderFactory> ObjectManager<F> {
    /// Serialize every persistable property through its backward transform,
    /// in declaration order. The readable flag does not apply here.
    ///
    /// Uninitialized properties are collected and reported together; any
    /// other failure aborts immediately.
    pub fn to_array(&self, entity: &EntityRef) -> Result<Map<String, JsonValue>, InternalError> {
        let model = entity.model();
        let mut out = Map::new();
        let mut uninitialized = Vec::new();

        for (slot, field) in model.fields().iter().enumerate() {
            if !field.descriptor.persistable {
                continue;
            }

            let value = match entity.read_slot(slot) {
                Ok(value) => value,
                Err(AccessError::Uninitialized { property, .. }) => {
                    uninitialized.push(property);
                    continue;
                }
                Err(err) => return Err(err.into()),
            };

            if let Some(raw) = field.descriptor.kind.reverse_transform(&value, self)? {
                out.insert(field.name.clone(), raw);
            }
        }

        if !uninitialized.is_empty() {
            return Err(SerializeError::Uninitialized {
                entity: model.name.clone(),
                properties: uninitialized,
            }
            .into());
        }

        self.record(
            HydrationEvent::EntitySerialized {
                entity: &model.name,
            },
            entity,
        );

        Ok(out)
    }
}
