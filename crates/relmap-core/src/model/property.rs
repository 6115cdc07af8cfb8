use crate::{error::InternalError, model::relation::Relation, value::Value};
use serde_json::Value as JsonValue;
use std::{fmt, rc::Rc};

/// Host-supplied forward conversion (raw → typed).
pub type ForwardFn = Rc<dyn Fn(&JsonValue) -> Result<Value, InternalError>>;

/// Host-supplied backward conversion (typed → raw). `None` omits the key.
pub type BackwardFn = Rc<dyn Fn(&Value) -> Result<Option<JsonValue>, InternalError>>;

///
/// PropertyKind
///
/// Closed set of property kinds. Each kind owns one forward and one
/// backward transform; see `transform` for the implementations.
///

#[derive(Clone, Debug)]
#[remain::sorted]
pub enum PropertyKind {
    Array,
    Bool,
    Custom(CustomTransform),
    Date,
    Int,
    Object,
    Relation(Relation),
    Text,
}

impl PropertyKind {
    /// Whether this kind can turn raw data into a value at all.
    #[must_use]
    pub const fn has_forward(&self) -> bool {
        match self {
            Self::Custom(custom) => custom.forward.is_some(),
            _ => true,
        }
    }

    #[must_use]
    pub const fn relation(&self) -> Option<&Relation> {
        match self {
            Self::Relation(relation) => Some(relation),
            _ => None,
        }
    }
}

///
/// CustomTransform
///

#[derive(Clone, Default)]
pub struct CustomTransform {
    pub forward: Option<ForwardFn>,
    pub backward: Option<BackwardFn>,
}

impl CustomTransform {
    #[must_use]
    pub fn new(forward: impl Fn(&JsonValue) -> Result<Value, InternalError> + 'static) -> Self {
        Self {
            forward: Some(Rc::new(forward)),
            backward: None,
        }
    }

    #[must_use]
    pub fn backward(
        mut self,
        backward: impl Fn(&Value) -> Result<Option<JsonValue>, InternalError> + 'static,
    ) -> Self {
        self.backward = Some(Rc::new(backward));
        self
    }
}

impl fmt::Debug for CustomTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomTransform")
            .field("forward", &self.forward.is_some())
            .field("backward", &self.backward.is_some())
            .finish()
    }
}

///
/// PropertyDescriptor
///
/// One declared property: its kind plus access flags.
/// `persistable` controls inclusion in serialized output.
///

#[derive(Clone, Debug)]
pub struct PropertyDescriptor {
    pub kind: PropertyKind,
    pub readable: bool,
    pub writable: bool,
    pub persistable: bool,
}

impl PropertyDescriptor {
    #[must_use]
    pub const fn new(kind: PropertyKind) -> Self {
        Self {
            kind,
            readable: true,
            writable: true,
            persistable: true,
        }
    }

    #[must_use]
    pub const fn int() -> Self {
        Self::new(PropertyKind::Int)
    }

    #[must_use]
    pub const fn text() -> Self {
        Self::new(PropertyKind::Text)
    }

    #[must_use]
    pub const fn boolean() -> Self {
        Self::new(PropertyKind::Bool)
    }

    #[must_use]
    pub const fn array() -> Self {
        Self::new(PropertyKind::Array)
    }

    #[must_use]
    pub const fn object() -> Self {
        Self::new(PropertyKind::Object)
    }

    #[must_use]
    pub const fn date() -> Self {
        Self::new(PropertyKind::Date)
    }

    #[must_use]
    pub const fn relation(relation: Relation) -> Self {
        Self::new(PropertyKind::Relation(relation))
    }

    #[must_use]
    pub const fn custom(custom: CustomTransform) -> Self {
        Self::new(PropertyKind::Custom(custom))
    }

    /// Identifier-style property: readable, never written, never serialized.
    #[must_use]
    pub const fn identifier() -> Self {
        Self::int().read_only().transient()
    }

    #[must_use]
    pub const fn readable(mut self, readable: bool) -> Self {
        self.readable = readable;
        self
    }

    #[must_use]
    pub const fn writable(mut self, writable: bool) -> Self {
        self.writable = writable;
        self
    }

    #[must_use]
    pub const fn persistable(mut self, persistable: bool) -> Self {
        self.persistable = persistable;
        self
    }

    #[must_use]
    pub const fn read_only(self) -> Self {
        self.writable(false)
    }

    #[must_use]
    pub const fn transient(self) -> Self {
        self.persistable(false)
    }
}
