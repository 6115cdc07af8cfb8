use derive_more::Display;
use relmap_core::{
    config::ConfigError,
    error::{ErrorClass, ErrorOrigin as CoreErrorOrigin, InternalError},
};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.kind, ErrorKind::NotFound)
    }

    #[must_use]
    pub const fn is_not_loaded(&self) -> bool {
        matches!(self.kind, ErrorKind::NotLoaded)
    }
}

impl From<InternalError> for Error {
    fn from(err: InternalError) -> Self {
        Self::new(err.class.into(), err.origin.into(), err.message)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        InternalError::from(err).into()
    }
}

///
/// ErrorKind
/// Public error taxonomy for callers.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
#[remain::sorted]
pub enum ErrorKind {
    /// Guarded accessor refused a read or write.
    Access,

    /// Manager configuration could not be used.
    Config,

    /// Identity is not mapped.
    NotFound,

    /// Placeholder data has not arrived yet.
    NotLoaded,

    /// Descriptors and data disagree.
    Schema,

    /// Field accessed or serialized before it was loaded.
    Uninitialized,

    /// Raw value shape is not supported by the property kind.
    Unsupported,
}

impl From<ErrorClass> for ErrorKind {
    fn from(class: ErrorClass) -> Self {
        match class {
            ErrorClass::Access => Self::Access,
            ErrorClass::Config => Self::Config,
            ErrorClass::NotFound => Self::NotFound,
            ErrorClass::NotLoaded => Self::NotLoaded,
            ErrorClass::Schema => Self::Schema,
            ErrorClass::Uninitialized => Self::Uninitialized,
            ErrorClass::Unsupported => Self::Unsupported,
        }
    }
}

///
/// ErrorOrigin
/// Public origin taxonomy for callers.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
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

impl From<CoreErrorOrigin> for ErrorOrigin {
    fn from(origin: CoreErrorOrigin) -> Self {
        match origin {
            CoreErrorOrigin::Config => Self::Config,
            CoreErrorOrigin::Entity => Self::Entity,
            CoreErrorOrigin::Manager => Self::Manager,
            CoreErrorOrigin::Placeholder => Self::Placeholder,
            CoreErrorOrigin::Registry => Self::Registry,
            CoreErrorOrigin::Serialize => Self::Serialize,
            CoreErrorOrigin::Transform => Self::Transform,
        }
    }
}
