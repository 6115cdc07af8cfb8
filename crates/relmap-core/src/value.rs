use crate::entity::EntityRef;
use chrono::{DateTime, SecondsFormat, Utc};
use derive_more::Display;
use serde_json::Value as JsonValue;

///
/// EntityId
///
/// Identifier half of an entity identity.
/// Integral JSON numbers and strings that parse as `i64` both normalize to
/// `Int`, so `8` and `"8"` address the same identity.
///

#[derive(Clone, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum EntityId {
    #[display("{_0}")]
    Int(i64),
    #[display("{_0}")]
    Text(String),
}

impl EntityId {
    /// Read an identifier from a raw payload value.
    /// Null, booleans, arrays and objects are not identifiers.
    #[must_use]
    pub fn from_json(raw: &JsonValue) -> Option<Self> {
        match raw {
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Self::Int(i))
                } else {
                    match n.as_f64() {
                        #[allow(clippy::cast_possible_truncation)]
                        Some(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => Some(Self::Int(f as i64)),
                        _ => Some(Self::Text(n.to_string())),
                    }
                }
            }
            JsonValue::String(s) => Some(Self::parse(s)),
            _ => None,
        }
    }

    fn parse(s: &str) -> Self {
        s.parse::<i64>()
            .map_or_else(|_| Self::Text(s.to_string()), Self::Int)
    }

    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Int(i) => JsonValue::from(*i),
            Self::Text(s) => JsonValue::String(s.clone()),
        }
    }

    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Int(i) => Value::Int(*i),
            Self::Text(s) => Value::Text(s.clone()),
        }
    }
}

impl From<i64> for EntityId {
    fn from(id: i64) -> Self {
        Self::Int(id)
    }
}

impl From<i32> for EntityId {
    fn from(id: i32) -> Self {
        Self::Int(i64::from(id))
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self::parse(id)
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self::parse(&id)
    }
}

///
/// Value
///
/// Materialized (typed) field value held by an entity.
///
/// NaN     → result of a failed numeric or date coercion; serializes as null.
/// List    → sequence produced by the array kind; elements stay raw.
/// Json    → opaque blob, never interpreted.
///
/// Entity handles compare by identity, not by content.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Date(DateTime<Utc>),
    Entities(Vec<EntityRef>),
    Entity(EntityRef),
    Int(i64),
    Json(JsonValue),
    List(Vec<JsonValue>),
    NaN,
    Text(String),
}

impl Value {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_date(&self) -> Option<&DateTime<Utc>> {
        match self {
            Self::Date(d) => Some(d),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_entity(&self) -> Option<&EntityRef> {
        match self {
            Self::Entity(e) => Some(e),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_entities(&self) -> Option<&[EntityRef]> {
        match self {
            Self::Entities(list) => Some(list),
            _ => None,
        }
    }

    /// Plain pass-through conversion back to raw form.
    /// Entities collapse to their identifiers.
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Null | Self::NaN => JsonValue::Null,
            Self::Bool(b) => JsonValue::Bool(*b),
            Self::Date(d) => JsonValue::String(d.to_rfc3339_opts(SecondsFormat::Millis, true)),
            Self::Entities(list) => JsonValue::Array(list.iter().map(EntityRef::id_json).collect()),
            Self::Entity(e) => e.id_json(),
            Self::Int(i) => JsonValue::from(*i),
            Self::Json(raw) => raw.clone(),
            Self::List(list) => JsonValue::Array(list.clone()),
            Self::Text(s) => JsonValue::String(s.clone()),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<EntityRef> for Value {
    fn from(v: EntityRef) -> Self {
        Self::Entity(v)
    }
}
