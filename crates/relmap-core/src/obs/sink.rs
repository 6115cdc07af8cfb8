//! Metrics sink boundary.
//!
//! Hydration logic MUST NOT depend on `obs::metrics` directly.
//! All instrumentation flows through `HydrationEvent` and `MetricsSink`.

use crate::obs::metrics::HydrationMetrics;
use std::cell::RefCell;

///
/// HydrationEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[remain::sorted]
pub enum HydrationEvent<'a> {
    EntityCreated { entity: &'a str },
    EntitySerialized { entity: &'a str },
    EntityUpdated { entity: &'a str },
    PlaceholderCreated { entity: &'a str },
    PlaceholderUpgraded { entity: &'a str },
}

impl<'a> HydrationEvent<'a> {
    /// Entity type the event refers to.
    #[must_use]
    pub const fn entity(&self) -> &'a str {
        match self {
            Self::EntityCreated { entity }
            | Self::EntitySerialized { entity }
            | Self::EntityUpdated { entity }
            | Self::PlaceholderCreated { entity }
            | Self::PlaceholderUpgraded { entity } => entity,
        }
    }

    /// Stable label for debug output.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::EntityCreated { .. } => "entity_created",
            Self::EntitySerialized { .. } => "entity_serialized",
            Self::EntityUpdated { .. } => "entity_updated",
            Self::PlaceholderCreated { .. } => "placeholder_created",
            Self::PlaceholderUpgraded { .. } => "placeholder_upgraded",
        }
    }
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: HydrationEvent<'_>);
}

/// Shared counters can be installed as a sink directly.
impl MetricsSink for RefCell<HydrationMetrics> {
    fn record(&self, event: HydrationEvent<'_>) {
        self.borrow_mut().apply(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn events_expose_their_entity_and_label() {
        let event = HydrationEvent::PlaceholderUpgraded { entity: "project" };

        assert_eq!(event.entity(), "project");
        assert_eq!(event.label(), "placeholder_upgraded");
    }

    #[test]
    fn shared_counters_record_through_the_sink_trait() {
        let counters = Rc::new(RefCell::new(HydrationMetrics::default()));
        let sink: Rc<dyn MetricsSink> = counters.clone();

        sink.record(HydrationEvent::EntityCreated { entity: "project" });
        sink.record(HydrationEvent::EntityCreated { entity: "product" });

        assert_eq!(counters.borrow().totals.entities_created, 2);
        assert_eq!(counters.borrow().entities.len(), 2);
    }
}
