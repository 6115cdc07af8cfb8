use crate::{
    config::ConfigError,
    entity::AccessError,
    manager::{LookupError, SerializeError},
    model::SchemaError,
    transform::TransformError,
};
use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured runtime error with a stable internal classification.
/// Every failure raised by the engine is a contract violation between the
/// registered schema and the supplied data; none of them are retryable.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,

    /// Optional structured error detail.
    pub detail: Option<ErrorDetail>,
}

impl InternalError {
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
            detail: None,
        }
    }

    /// Construct a custom-transform failure raised by host code.
    pub fn transform(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Unsupported, ErrorOrigin::Transform, message)
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.class, ErrorClass::NotFound)
    }

    #[must_use]
    pub const fn is_not_loaded(&self) -> bool {
        matches!(self.class, ErrorClass::NotLoaded)
    }

    #[must_use]
    pub const fn is_uninitialized(&self) -> bool {
        matches!(self.class, ErrorClass::Uninitialized)
    }

    /// Property names reported by an uninitialized-access or serialization failure.
    #[must_use]
    pub fn uninitialized_properties(&self) -> Vec<String> {
        match &self.detail {
            Some(ErrorDetail::Access(AccessError::Uninitialized { property, .. })) => {
                vec![property.clone()]
            }
            Some(ErrorDetail::Serialize(SerializeError::Uninitialized { properties, .. })) => {
                properties.clone()
            }
            _ => Vec::new(),
        }
    }
}

///
/// ErrorDetail
///
/// Structured, origin-specific error detail carried by [`InternalError`].
///

#[derive(Clone, Debug, ThisError)]
pub enum ErrorDetail {
    #[error("{0}")]
    Access(AccessError),
    #[error("{0}")]
    Lookup(LookupError),
    #[error("{0}")]
    Serialize(SerializeError),
}

impl From<ConfigError> for InternalError {
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorClass::Config, ErrorOrigin::Config, err.to_string())
    }
}

impl From<SchemaError> for InternalError {
    fn from(err: SchemaError) -> Self {
        Self::new(ErrorClass::Schema, err.origin(), err.to_string())
    }
}

impl From<TransformError> for InternalError {
    fn from(err: TransformError) -> Self {
        Self::new(ErrorClass::Unsupported, ErrorOrigin::Transform, err.to_string())
    }
}

impl From<AccessError> for InternalError {
    fn from(err: AccessError) -> Self {
        Self {
            class: err.class(),
            origin: err.origin(),
            message: err.to_string(),
            detail: Some(ErrorDetail::Access(err)),
        }
    }
}

impl From<LookupError> for InternalError {
    fn from(err: LookupError) -> Self {
        Self {
            class: ErrorClass::NotFound,
            origin: ErrorOrigin::Manager,
            message: err.to_string(),
            detail: Some(ErrorDetail::Lookup(err)),
        }
    }
}

impl From<SerializeError> for InternalError {
    fn from(err: SerializeError) -> Self {
        Self {
            class: ErrorClass::Uninitialized,
            origin: ErrorOrigin::Serialize,
            message: err.to_string(),
            detail: Some(ErrorDetail::Serialize(err)),
        }
    }
}

///
/// ErrorClass
/// Internal error taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[remain::sorted]
pub enum ErrorClass {
    Access,
    Config,
    NotFound,
    NotLoaded,
    Schema,
    Uninitialized,
    Unsupported,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Access => "access",
            Self::Config => "config",
            Self::NotFound => "not_found",
            Self::NotLoaded => "not_loaded",
            Self::Schema => "schema",
            Self::Uninitialized => "uninitialized",
            Self::Unsupported => "unsupported",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Internal origin taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[remain::sorted]
pub enum ErrorOrigin {
    Config,
    Entity,
    Manager,
    Placeholder,
    Registry,
    Serialize,
    Transform,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Config => "config",
            Self::Entity => "entity",
            Self::Manager => "manager",
            Self::Placeholder => "placeholder",
            Self::Registry => "registry",
            Self::Serialize => "serialize",
            Self::Transform => "transform",
        };
        write!(f, "{label}")
    }
}
