//! Observability: hydration counters and the sink abstraction.
//!
//! The manager never writes counters directly; every instrumentation point
//! emits a [`HydrationEvent`] that is applied to the manager's own
//! [`HydrationMetrics`] and forwarded to an optional [`MetricsSink`].

pub mod metrics;
pub mod sink;

// re-exports
pub use metrics::{EntityCounters, HydrationMetrics};
pub use sink::{HydrationEvent, MetricsSink};
