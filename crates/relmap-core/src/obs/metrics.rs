use crate::obs::sink::HydrationEvent;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

///
/// HydrationMetrics
/// Ephemeral, in-memory counters owned by one manager.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct HydrationMetrics {
    pub totals: EntityCounters,
    pub entities: BTreeMap<String, EntityCounters>,
}

impl HydrationMetrics {
    /// Fold one event into the totals and the per-entity breakdown.
    pub fn apply(&mut self, event: HydrationEvent<'_>) {
        self.totals.apply(event);
        self.entities
            .entry(event.entity().to_string())
            .or_default()
            .apply(event);
    }

    /// Counters for one entity type (zeroes if it was never touched).
    #[must_use]
    pub fn entity(&self, entity: &str) -> EntityCounters {
        self.entities.get(entity).cloned().unwrap_or_default()
    }

    /// Reset all counters (useful in tests).
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

///
/// EntityCounters
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EntityCounters {
    pub entities_created: u64,
    pub entities_updated: u64,
    pub entities_serialized: u64,
    pub placeholders_created: u64,
    pub placeholders_upgraded: u64,
}

impl EntityCounters {
    const fn apply(&mut self, event: HydrationEvent<'_>) {
        let counter = match event {
            HydrationEvent::EntityCreated { .. } => &mut self.entities_created,
            HydrationEvent::EntitySerialized { .. } => &mut self.entities_serialized,
            HydrationEvent::EntityUpdated { .. } => &mut self.entities_updated,
            HydrationEvent::PlaceholderCreated { .. } => &mut self.placeholders_created,
            HydrationEvent::PlaceholderUpgraded { .. } => &mut self.placeholders_upgraded,
        };
        *counter = counter.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn events_update_totals_and_per_entity_counters() {
        let mut metrics = HydrationMetrics::default();

        metrics.apply(HydrationEvent::PlaceholderCreated { entity: "project" });
        metrics.apply(HydrationEvent::PlaceholderUpgraded { entity: "project" });
        metrics.apply(HydrationEvent::EntityCreated { entity: "product" });

        assert_eq!(metrics.totals.placeholders_created, 1);
        assert_eq!(metrics.totals.placeholders_upgraded, 1);
        assert_eq!(metrics.totals.entities_created, 1);
        assert_eq!(metrics.entity("project").placeholders_upgraded, 1);
        assert_eq!(metrics.entity("product").entities_created, 1);
        assert_eq!(metrics.entity("unknown"), EntityCounters::default());

        metrics.reset();
        assert!(metrics.entities.is_empty(), "reset clears the breakdown");
    }

    #[test]
    fn metrics_serialize_with_a_stable_shape() {
        let mut metrics = HydrationMetrics::default();
        metrics.apply(HydrationEvent::EntitySerialized { entity: "project" });

        let json = serde_json::to_value(&metrics).expect("metrics should serialize");

        assert_eq!(json["totals"]["entities_serialized"], json!(1));
        assert_eq!(json["entities"]["project"]["entities_serialized"], json!(1));
    }
}
