//! Immutable key/value metadata attached to a handler.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::collections::btree_map;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Metadata key read by [`Metadata::priority`].
pub const PRIORITY_KEY: &str = "priority";

/// Priority level a consumer may use to order handlers.
///
/// Handlers with higher priority sort first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Priority(pub i32);

impl Priority {
    /// Highest priority - runs first.
    pub const HIGHEST: Self = Self(1000);
    /// High priority.
    pub const HIGH: Self = Self(100);
    /// Normal/default priority.
    pub const NORMAL: Self = Self(0);
    /// Low priority.
    pub const LOW: Self = Self(-100);
    /// Lowest priority - runs last.
    pub const LOWEST: Self = Self(-1000);
}

impl PartialOrd for Priority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Priority {
    fn cmp(&self, other: &Self) -> Ordering {
        // Higher value = higher priority = should come first
        other.0.cmp(&self.0)
    }
}

impl From<Priority> for Value {
    fn from(priority: Priority) -> Self {
        Self::from(priority.0)
    }
}

/// String-keyed metadata, fixed once a handler is built.
///
/// No keys are required. [`PRIORITY_KEY`] is a convention read by
/// [`priority`](Self::priority), nothing more.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(BTreeMap<String, Value>);

impl Metadata {
    /// Create empty metadata.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Set the priority entry.
    #[must_use]
    pub fn with_priority(self, priority: Priority) -> Self {
        self.with(PRIORITY_KEY, priority)
    }

    /// Get a single entry.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Check if an entry exists.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Read the priority entry.
    ///
    /// Missing, non-integer or out-of-range values give [`Priority::NORMAL`].
    #[must_use]
    pub fn priority(&self) -> Priority {
        self.get(PRIORITY_KEY)
            .and_then(Value::as_i64)
            .and_then(|p| i32::try_from(p).ok())
            .map_or(Priority::NORMAL, Priority)
    }

    /// Iterate over entries in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.0.iter()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<serde_json::Map<String, Value>> for Metadata {
    fn from(map: serde_json::Map<String, Value>) -> Self {
        Self(map.into_iter().collect())
    }
}

impl From<BTreeMap<String, Value>> for Metadata {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Metadata {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a Metadata {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_priority_ordering() {
        let mut priorities = [
            Priority::LOW,
            Priority::HIGHEST,
            Priority::NORMAL,
            Priority::HIGH,
            Priority::LOWEST,
        ];
        priorities.sort();

        assert_eq!(priorities[0], Priority::HIGHEST);
        assert_eq!(priorities[1], Priority::HIGH);
        assert_eq!(priorities[2], Priority::NORMAL);
        assert_eq!(priorities[3], Priority::LOW);
        assert_eq!(priorities[4], Priority::LOWEST);
    }

    #[test]
    fn test_metadata_lookup() {
        let metadata = Metadata::new().with("priority", 10).with("name", "audit");
        assert_eq!(metadata.get("priority"), Some(&json!(10)));
        assert_eq!(metadata.get("missing"), None);
        assert!(metadata.contains_key("name"));
        assert_eq!(metadata.len(), 2);
        assert_eq!(metadata.priority(), Priority(10));
    }

    #[test]
    fn test_priority_falls_back_to_normal() {
        assert_eq!(Metadata::new().priority(), Priority::NORMAL);
        assert_eq!(Metadata::new().with("priority", "high").priority(), Priority::NORMAL);
        assert_eq!(
            Metadata::new().with("priority", i64::MAX).priority(),
            Priority::NORMAL
        );
        assert_eq!(
            Metadata::new().with_priority(Priority::LOW).priority(),
            Priority::LOW
        );
    }

    #[test]
    fn test_metadata_serde() {
        let metadata: Metadata =
            serde_json::from_value(json!({"priority": 5, "tags": ["a", "b"]})).expect("parse");
        assert_eq!(metadata.priority(), Priority(5));
        assert_eq!(
            serde_json::to_value(&metadata).expect("serialize"),
            json!({"priority": 5, "tags": ["a", "b"]})
        );

        let from_map = Metadata::from(json!({"x": 1}).as_object().cloned().unwrap_or_default());
        assert_eq!(from_map.get("x"), Some(&json!(1)));
    }

    #[test]
    fn test_metadata_from_iter() {
        let metadata: Metadata = [("a", 1), ("b", 2)].into_iter().collect();
        let keys: Vec<_> = metadata.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }
}
