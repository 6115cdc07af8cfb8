//! Core runtime for relmap: entity models, the transform library, the
//! placeholder factory and the identity-mapped `ObjectManager`, plus the
//! vocabulary exported via the `prelude`.

// public exports are one module level down
pub mod config;
pub mod entity;
pub mod error;
pub mod manager;
pub mod model;
pub mod obs;
pub mod proxy;
pub mod transform;
pub mod value;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, sinks or transform internals are re-exported here.
///

pub mod prelude {
    pub use crate::{
        entity::EntityRef,
        manager::ObjectManager,
        model::{CustomTransform, EntityDescriptor, PropertyDescriptor, Relation},
        value::{EntityId, Value},
    };
}
