//! Relation kinds.
//!
//! Inline objects hydrate through [`Resolver::create`]; bare identifiers
//! resolve through [`Resolver::get_reference`]. Many-valued relations accept
//! a sequence or a keyed map (walked by value) and skip null elements.

use crate::{
    entity::EntityRef,
    error::{ErrorClass, ErrorOrigin, InternalError},
    model::{Cardinality, Relation, SchemaError},
    transform::{Resolver, TransformError, shape},
    value::{EntityId, Value},
};
use serde_json::Value as JsonValue;

/// Forward transform for any relation.
pub fn transform(
    relation: &Relation,
    raw: &JsonValue,
    resolver: &mut dyn Resolver,
    owner: &EntityRef,
) -> Result<Value, InternalError> {
    let Some(target) = relation.target() else {
        if relation.cardinality == Cardinality::OneToOne {
            return Ok(Value::Json(raw.clone()));
        }
        return Err(InternalError::new(
            ErrorClass::Schema,
            ErrorOrigin::Transform,
            format!("relation on '{}' requires a target entity", owner.entity_name()),
        ));
    };

    match &relation.cardinality {
        Cardinality::ManyToOne => {
            Ok(resolve_one(target, raw, resolver, "many-to-one")?.map_or(Value::Null, Value::Entity))
        }
        Cardinality::ManyToMany => Ok(Value::Entities(resolve_many(
            target,
            raw,
            resolver,
            "many-to-many",
            |_| Ok(()),
        )?)),
        Cardinality::OneToMany { back_reference } => Ok(Value::Entities(resolve_many(
            target,
            raw,
            resolver,
            "one-to-many",
            |child| match back_reference {
                Some(property) => wire_back_reference(child, property, owner),
                None => Ok(()),
            },
        )?)),
        Cardinality::OneToOne => match raw {
            JsonValue::Null => Ok(Value::Null),
            JsonValue::Object(_) => Ok(Value::Entity(resolver.create(target, raw)?)),
            other => Err(TransformError::unsupported("one-to-one", other).into()),
        },
    }
}

/// Backward transform for any relation.
pub fn reverse_transform(
    relation: &Relation,
    value: &Value,
    resolver: &dyn Resolver,
) -> Result<Option<JsonValue>, InternalError> {
    if relation.target.is_none() {
        return Ok(Some(value.to_json()));
    }

    match (&relation.cardinality, value) {
        (Cardinality::ManyToOne, Value::Entity(entity)) => Ok(Some(entity.id_json())),
        (Cardinality::ManyToMany, Value::Entities(list)) => Ok(Some(JsonValue::Array(
            list.iter().map(EntityRef::id_json).collect(),
        ))),
        (Cardinality::OneToMany { .. }, Value::Entities(list)) => {
            let children = list
                .iter()
                .map(|child| resolver.to_array(child).map(JsonValue::Object))
                .collect::<Result<Vec<_>, _>>()?;

            Ok(Some(JsonValue::Array(children)))
        }
        (Cardinality::OneToOne, Value::Entity(entity)) => {
            Ok(Some(JsonValue::Object(resolver.to_array(entity)?)))
        }
        (Cardinality::OneToOne, _) => Ok(None),
        (_, other) => Ok(Some(other.to_json())),
    }
}

// ManyToOne rule for a single raw value; `None` for null.
fn resolve_one(
    target: &str,
    raw: &JsonValue,
    resolver: &mut dyn Resolver,
    kind: &'static str,
) -> Result<Option<EntityRef>, InternalError> {
    match raw {
        JsonValue::Null => Ok(None),
        JsonValue::Object(_) => resolver.create(target, raw).map(Some),
        JsonValue::Array(_) => Err(TransformError::unsupported(kind, raw).into()),
        scalar => {
            let id = EntityId::from_json(scalar)
                .ok_or_else(|| TransformError::InvalidIdentifier(scalar.to_string()))?;

            resolver.get_reference(target, id).map(Some)
        }
    }
}

fn resolve_many(
    target: &str,
    raw: &JsonValue,
    resolver: &mut dyn Resolver,
    kind: &'static str,
    mut after_each: impl FnMut(&EntityRef) -> Result<(), InternalError>,
) -> Result<Vec<EntityRef>, InternalError> {
    let items: Vec<&JsonValue> = match raw {
        JsonValue::Null => return Ok(Vec::new()),
        JsonValue::Array(items) => items.iter().collect(),
        JsonValue::Object(map) => map.values().collect(),
        other => {
            return Err(TransformError::Unsupported {
                kind,
                found: shape(other).to_string(),
            }
            .into());
        }
    };

    let mut out = Vec::with_capacity(items.len());
    for item in items {
        if let Some(entity) = resolve_one(target, item, resolver, kind)? {
            after_each(&entity)?;
            out.push(entity);
        }
    }

    Ok(out)
}

// Inverse side of a one-to-many. Unattached placeholders queue the owner
// until their own payload arrives.
fn wire_back_reference(
    child: &EntityRef,
    property: &str,
    owner: &EntityRef,
) -> Result<(), InternalError> {
    if child.model().slot(property).is_none() {
        return Err(SchemaError::UnknownBackReference {
            entity: child.entity_name().to_string(),
            property: property.to_string(),
        }
        .into());
    }
    child.inject_or_defer(property, Value::Entity(owner.clone()))?;

    Ok(())
}
