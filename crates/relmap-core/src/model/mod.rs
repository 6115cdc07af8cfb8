//! Schema-facing data model.
//!
//! Hosts describe entity types with descriptors; registration compiles each
//! descriptor into an [`EntityModel`] whose field table is fixed for the
//! lifetime of the manager.
//!
//! In general:
//! - descriptors define *what exists*
//! - `EntityModel` defines *what runs*

pub mod entity;
pub mod property;
pub mod relation;

pub use entity::{EntityDescriptor, EntityModel, FieldModel};
pub use property::{BackwardFn, CustomTransform, ForwardFn, PropertyDescriptor, PropertyKind};
pub use relation::{Cardinality, Relation};

use crate::error::ErrorOrigin;
use thiserror::Error as ThisError;

///
/// SchemaError
///
/// Configuration errors between the host's descriptors and the engine.
///

#[derive(Debug, ThisError)]
#[remain::sorted]
pub enum SchemaError {
    #[error("entity '{0}' already registered")]
    AlreadyRegistered(String),

    #[error("property '{property}' declared twice on entity '{entity}'")]
    DuplicateProperty { entity: String, property: String },

    #[error("invalid entity name: {0}")]
    InvalidEntityName(#[from] EntityNameError),

    #[error("identifier property '{property}' is not declared on entity '{entity}'")]
    MissingIdProperty { entity: String, property: String },

    #[error("relation '{entity}.{property}' requires a target entity")]
    MissingTarget { entity: String, property: String },

    #[error("transform is mandatory: property '{entity}.{property}' has no forward transform")]
    MissingTransform { entity: String, property: String },

    #[error("back-reference '{property}' is not declared on entity '{entity}'")]
    UnknownBackReference { entity: String, property: String },

    #[error("entity '{0}' is not registered")]
    UnknownEntity(String),
}

impl SchemaError {
    pub(crate) const fn origin(&self) -> ErrorOrigin {
        match self {
            Self::UnknownBackReference { .. } => ErrorOrigin::Transform,
            _ => ErrorOrigin::Registry,
        }
    }
}

///
/// EntityNameError
///

#[derive(Debug, ThisError)]
pub enum EntityNameError {
    #[error("entity name is empty")]
    Empty,

    #[error("entity name length {len} exceeds max {max}")]
    TooLong { len: usize, max: usize },

    #[error("entity name must be ASCII")]
    NonAscii,
}
