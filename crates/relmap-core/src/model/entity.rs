use crate::model::{EntityNameError, PropertyDescriptor, SchemaError};
use std::collections::HashMap;

///
/// Constants
///

pub(crate) const MAX_ENTITY_NAME_LEN: usize = 64;

///
/// EntityDescriptor
///
/// Host-authored description of one entity type. Property order is kept and
/// drives serialization order.
///

#[derive(Clone, Debug)]
pub struct EntityDescriptor {
    name: String,
    id_property: Option<String>,
    properties: Vec<(String, PropertyDescriptor)>,
}

impl EntityDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id_property: None,
            properties: Vec::new(),
        }
    }

    /// Override the identifier property (defaults to the manager config).
    #[must_use]
    pub fn id_property(mut self, name: impl Into<String>) -> Self {
        self.id_property = Some(name.into());
        self
    }

    #[must_use]
    pub fn property(mut self, name: impl Into<String>, descriptor: PropertyDescriptor) -> Self {
        self.properties.push((name.into(), descriptor));
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn properties(&self) -> &[(String, PropertyDescriptor)] {
        &self.properties
    }

    /// Validate the descriptor and build the runtime field table.
    pub fn compile(self, default_id_property: &str) -> Result<EntityModel, SchemaError> {
        validate_entity_name(&self.name)?;

        let id_property = self
            .id_property
            .unwrap_or_else(|| default_id_property.to_string());

        let mut slots = HashMap::with_capacity(self.properties.len());
        let mut fields = Vec::with_capacity(self.properties.len());

        for (index, (name, descriptor)) in self.properties.into_iter().enumerate() {
            if slots.insert(name.clone(), index).is_some() {
                return Err(SchemaError::DuplicateProperty {
                    entity: self.name,
                    property: name,
                });
            }
            if !descriptor.kind.has_forward() {
                return Err(SchemaError::MissingTransform {
                    entity: self.name,
                    property: name,
                });
            }
            if let Some(relation) = descriptor.kind.relation()
                && relation.requires_target()
                && relation.target.is_none()
            {
                return Err(SchemaError::MissingTarget {
                    entity: self.name,
                    property: name,
                });
            }

            fields.push(FieldModel { name, descriptor });
        }

        let Some(&id_slot) = slots.get(&id_property) else {
            return Err(SchemaError::MissingIdProperty {
                entity: self.name,
                property: id_property,
            });
        };

        Ok(EntityModel {
            name: self.name,
            id_property,
            id_slot,
            fields,
            slots,
        })
    }
}

// Entity names key the identity map and appear in diagnostics.
fn validate_entity_name(name: &str) -> Result<(), EntityNameError> {
    let len = name.len();

    if len == 0 {
        return Err(EntityNameError::Empty);
    }
    if len > MAX_ENTITY_NAME_LEN {
        return Err(EntityNameError::TooLong {
            len,
            max: MAX_ENTITY_NAME_LEN,
        });
    }
    if !name.is_ascii() {
        return Err(EntityNameError::NonAscii);
    }

    Ok(())
}

///
/// FieldModel
///

#[derive(Debug)]
pub struct FieldModel {
    pub name: String,
    pub descriptor: PropertyDescriptor,
}

///
/// EntityModel
/// Compiled runtime model for one registered entity type.
///

#[derive(Debug)]
pub struct EntityModel {
    /// Stable external name used in the identity map.
    pub name: String,
    /// Identifier property name (points at an entry in `fields`).
    pub id_property: String,
    id_slot: usize,
    /// Ordered field list (authoritative for hydration and serialization).
    fields: Vec<FieldModel>,
    slots: HashMap<String, usize>,
}

impl EntityModel {
    #[must_use]
    pub fn slot(&self, property: &str) -> Option<usize> {
        self.slots.get(property).copied()
    }

    #[must_use]
    pub fn field(&self, slot: usize) -> &FieldModel {
        &self.fields[slot]
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldModel] {
        &self.fields
    }

    #[must_use]
    pub const fn id_slot(&self) -> usize {
        self.id_slot
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
