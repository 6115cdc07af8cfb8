//! ## Crate layout
//! - `core`: entity models, transforms, placeholders, the identity map and
//!   observability.
//! - `error`: the stable public error shape.
//!
//! The `prelude` module mirrors the surface a host needs to describe entity
//! types and hydrate payloads.

pub use relmap_core as core;

mod error;

pub use error::{Error, ErrorKind, ErrorOrigin};

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//
// Re-exports
//

pub use core::{
    config::ManagerConfig,
    entity::EntityRef,
    manager::ObjectManager,
    model::{Cardinality, CustomTransform, EntityDescriptor, PropertyDescriptor, PropertyKind, Relation},
    obs::{HydrationEvent, HydrationMetrics, MetricsSink},
    proxy::{PlaceholderClass, PlaceholderFactory, ProxyFactory},
    value::{EntityId, Value},
};

///
/// Prelude
/// using _ brings traits into scope and avoids name conflicts
///

pub mod prelude {
    pub use crate::core::{
        entity::EntityRef,
        manager::ObjectManager,
        model::{CustomTransform, EntityDescriptor, PropertyDescriptor, Relation},
        proxy::PlaceholderFactory as _,
        value::{EntityId, Value},
    };
    pub use crate::{Error, ErrorKind};
    pub use serde_json::json;
}
