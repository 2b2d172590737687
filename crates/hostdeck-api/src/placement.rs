//! Placement of hosts across providers and locations

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Host counts per location, keyed by location code.
pub type LocationCounts = BTreeMap<String, i64>;

/// Mapping from provider code to location code to host count.
///
/// Serialized as a plain nested JSON object, e.g. `{"aws": {"us-east": 2}}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Placement(BTreeMap<String, LocationCounts>);

impl Placement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Placement holding a single provider/location entry.
    pub fn single(provider: &str, location: &str, hosts: i64) -> Self {
        let mut placement = Self::new();
        placement.set(provider, location, hosts);
        placement
    }

    /// Set the host count for a provider/location pair.
    pub fn set(&mut self, provider: &str, location: &str, hosts: i64) {
        self.0
            .entry(provider.to_string())
            .or_default()
            .insert(location.to_string(), hosts);
    }

    /// Host count for a provider/location pair, zero when absent.
    pub fn get(&self, provider: &str, location: &str) -> i64 {
        self.0
            .get(provider)
            .and_then(|locations| locations.get(location))
            .copied()
            .unwrap_or(0)
    }

    pub fn providers(&self) -> impl Iterator<Item = (&String, &LocationCounts)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all host counts.
    pub fn total_hosts(&self) -> i64 {
        self.0
            .values()
            .flat_map(|locations| locations.values())
            .fold(0i64, |total, hosts| total.saturating_add(*hosts))
    }

    /// Whether any location carries a nonzero host count.
    pub fn has_allocation(&self) -> bool {
        self.0
            .values()
            .flat_map(|locations| locations.values())
            .any(|hosts| *hosts != 0)
    }

    /// Overlay a delta on top of this placement.
    ///
    /// Counts named by the delta are added to the existing count; every other
    /// provider and location is kept as is. A sum below zero is clamped to zero;
    /// sums saturate at `i64::MAX`.
    pub fn merge(&self, delta: &Placement) -> Placement {
        let mut merged = self.clone();
        for (provider, locations) in &delta.0 {
            let target = merged.0.entry(provider.clone()).or_default();
            for (location, hosts) in locations {
                let current = target.get(location).copied().unwrap_or(0);
                target.insert(location.clone(), current.saturating_add(*hosts).max(0));
            }
        }
        merged
    }

    /// Drop every location whose count is exactly zero, then every provider
    /// left without locations.
    pub fn prune_zero(&mut self) {
        for locations in self.0.values_mut() {
            locations.retain(|_, hosts| *hosts != 0);
        }
        self.0.retain(|_, locations| !locations.is_empty());
    }

    /// Consuming variant of [`Placement::prune_zero`].
    pub fn pruned(mut self) -> Self {
        self.prune_zero();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_get_missing_is_zero() {
        let placement = Placement::single("aws", "us-east", 3);
        assert_eq!(placement.get("aws", "us-east"), 3);
        assert_eq!(placement.get("aws", "eu-west"), 0);
        assert_eq!(placement.get("gcp", "us-east"), 0);
    }

    #[test]
    fn test_merge_adds_and_preserves() {
        let mut existing = Placement::single("aws", "us-east", 2);
        existing.set("gcp", "asia", 1);

        let merged = existing.merge(&Placement::single("aws", "us-east", 3));
        assert_eq!(merged.get("aws", "us-east"), 5);
        assert_eq!(merged.get("gcp", "asia"), 1);

        let merged = existing.merge(&Placement::single("aws", "eu-west", 4));
        assert_eq!(merged.get("aws", "us-east"), 2);
        assert_eq!(merged.get("aws", "eu-west"), 4);
    }

    #[test]
    fn test_merge_to_zero_then_prune() {
        let existing = Placement::single("A", "X", 2);
        let merged = existing.merge(&Placement::single("A", "X", -2)).pruned();
        assert!(merged.is_empty());
        assert!(!merged.has_allocation());
    }

    #[test]
    fn test_merge_clamps_negative() {
        let existing = Placement::single("A", "X", 1);
        let merged = existing.merge(&Placement::single("A", "X", -5));
        assert_eq!(merged.get("A", "X"), 0);
    }

    #[test]
    fn test_merge_saturates_instead_of_overflowing() {
        let full = Placement::single("A", "X", i64::MAX);
        let merged = full.merge(&Placement::single("A", "X", 1));
        assert_eq!(merged.get("A", "X"), i64::MAX);
        assert!(merged.pruned().has_allocation());

        let merged = Placement::single("A", "X", 3).merge(&Placement::single("A", "X", i64::MIN));
        assert_eq!(merged.get("A", "X"), 0);
    }

    #[test]
    fn test_prune_keeps_nonzero() {
        let mut placement = Placement::single("A", "X", 0);
        placement.set("A", "Y", 2);
        placement.set("B", "Z", 0);
        placement.prune_zero();

        assert_eq!(placement.providers().count(), 1);
        assert_eq!(placement.get("A", "Y"), 2);
        assert_eq!(placement.total_hosts(), 2);
    }

    #[test]
    fn test_serializes_as_nested_object() {
        let placement = Placement::single("aws", "us-east", 2);
        let json = serde_json::to_value(&placement).unwrap();
        assert_eq!(json, serde_json::json!({"aws": {"us-east": 2}}));

        let back: Placement = serde_json::from_value(json).unwrap();
        assert_eq!(back, placement);
    }

    fn placement_strategy() -> impl Strategy<Value = Placement> {
        proptest::collection::vec(("[A-C]", "[X-Z]", 0i64..10), 0..6).prop_map(|cells| {
            let mut placement = Placement::new();
            for (provider, location, hosts) in cells {
                placement.set(&provider, &location, hosts);
            }
            placement
        })
    }

    proptest! {
        #[test]
        fn merge_never_goes_negative(
            existing in placement_strategy(),
            provider in "[A-C]",
            location in "[X-Z]",
            delta in -20i64..20,
        ) {
            let merged = existing.merge(&Placement::single(&provider, &location, delta));
            for (_, locations) in merged.providers() {
                for hosts in locations.values() {
                    prop_assert!(*hosts >= 0);
                }
            }
        }

        #[test]
        fn merge_leaves_other_cells_alone(
            existing in placement_strategy(),
            delta in -20i64..20,
        ) {
            let merged = existing.merge(&Placement::single("A", "X", delta));
            for provider in ["A", "B", "C"] {
                for location in ["X", "Y", "Z"] {
                    if (provider, location) != ("A", "X") {
                        prop_assert_eq!(merged.get(provider, location), existing.get(provider, location));
                    }
                }
            }
        }

        #[test]
        fn merge_with_extreme_delta_stays_in_range(
            existing in placement_strategy(),
            delta in prop_oneof![Just(i64::MAX), Just(i64::MIN), any::<i64>()],
        ) {
            let merged = existing.merge(&Placement::single("A", "X", delta));
            let cell = merged.get("A", "X");
            prop_assert!(cell >= 0);
            if delta > 0 {
                prop_assert!(cell >= existing.get("A", "X"));
                prop_assert!(merged.clone().pruned().has_allocation());
            }
        }

        #[test]
        fn pruned_has_no_zero_cells(existing in placement_strategy()) {
            let pruned = existing.clone().pruned();
            prop_assert_eq!(pruned.total_hosts(), existing.total_hosts());
            prop_assert_eq!(pruned.has_allocation(), !pruned.is_empty());
        }
    }
}
