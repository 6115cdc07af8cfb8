//! Transform library.
//!
//! Every property kind converts raw payload values into typed [`Value`]s
//! (forward) and back (backward). Scalar kinds are pure; relation kinds call
//! back into a [`Resolver`] to create entities, resolve references and
//! serialize owned children.

pub mod relation;
pub mod scalar;


use crate::{
    entity::EntityRef,
    error::InternalError,
    model::{PropertyKind, Relation},
    value::{EntityId, Value},
};
use serde_json::{Map, Value as JsonValue};
use thiserror::Error as ThisError;

///
/// TransformError
///

#[derive(Debug, ThisError)]
pub enum TransformError {
    #[error("{kind} property does not support {found} values")]
    Unsupported { kind: &'static str, found: String },

    #[error("'{0}' is not a valid entity identifier")]
    InvalidIdentifier(String),

    #[error("entity payload must be an object, found {0}")]
    NotAnObject(String),
}

impl TransformError {
    pub(crate) fn unsupported(kind: &'static str, raw: &JsonValue) -> Self {
        Self::Unsupported {
            kind,
            found: shape(raw).to_string(),
        }
    }
}

/// Short JSON shape label for diagnostics.
pub(crate) const fn shape(raw: &JsonValue) -> &'static str {
    match raw {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

///
/// Resolver
///
/// Callback surface relation transforms use to reach the identity map.
///

pub trait Resolver {
    /// Create (or update, or upgrade) the entity described by `raw`.
    fn create(&mut self, entity: &str, raw: &JsonValue) -> Result<EntityRef, InternalError>;

    /// Mapped instance for an identity, or a new placeholder.
    fn get_reference(&mut self, entity: &str, id: EntityId) -> Result<EntityRef, InternalError>;

    /// Full serialization of an entity.
    fn to_array(&self, entity: &EntityRef) -> Result<Map<String, JsonValue>, InternalError>;
}

///
/// Transform
///
/// Forward/backward capability shared by every property kind.
///

pub trait Transform {
    fn transform(
        &self,
        raw: &JsonValue,
        resolver: &mut dyn Resolver,
        owner: &EntityRef,
    ) -> Result<Value, InternalError>;

    /// `None` means the property contributes no key to serialized output.
    fn reverse_transform(
        &self,
        value: &Value,
        resolver: &dyn Resolver,
    ) -> Result<Option<JsonValue>, InternalError>;
}

impl Transform for PropertyKind {
    fn transform(
        &self,
        raw: &JsonValue,
        resolver: &mut dyn Resolver,
        owner: &EntityRef,
    ) -> Result<Value, InternalError> {
        match self {
            Self::Array => Ok(scalar::array(raw)?),
            Self::Bool => Ok(scalar::boolean(raw)),
            Self::Custom(custom) => match &custom.forward {
                Some(forward) => forward(raw),
                None => Err(InternalError::transform(
                    "transform is mandatory: custom property has no forward transform",
                )),
            },
            Self::Date => Ok(scalar::date(raw)),
            Self::Int => Ok(scalar::int(raw)),
            Self::Object => Ok(scalar::object(raw)),
            Self::Relation(relation) => relation.transform(raw, resolver, owner),
            Self::Text => Ok(scalar::text(raw)),
        }
    }

    fn reverse_transform(
        &self,
        value: &Value,
        resolver: &dyn Resolver,
    ) -> Result<Option<JsonValue>, InternalError> {
        match self {
            Self::Custom(custom) => match &custom.backward {
                Some(backward) => backward(value),
                None => Ok(Some(value.to_json())),
            },
            Self::Relation(relation) => relation.reverse_transform(value, resolver),
            _ => Ok(Some(scalar::reverse(value))),
        }
    }
}

impl Transform for Relation {
    fn transform(
        &self,
        raw: &JsonValue,
        resolver: &mut dyn Resolver,
        owner: &EntityRef,
    ) -> Result<Value, InternalError> {
        relation::transform(self, raw, resolver, owner)
    }

    fn reverse_transform(
        &self,
        value: &Value,
        resolver: &dyn Resolver,
    ) -> Result<Option<JsonValue>, InternalError> {
        relation::reverse_transform(self, value, resolver)
    }
}
