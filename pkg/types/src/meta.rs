use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Metadata carried by every stored object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    /// Unique key within the object's kind. Empty until assigned when `generate_name` is used.
    #[serde(default)]
    pub name: String,
    /// Prefix for a server-generated name, used only when `name` is empty on create.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generate_name: Option<String>,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    /// Bumped by the store on every write; 0 means "never stored".
    #[serde(default)]
    pub resource_version: u64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl ObjectMeta {
    /// Metadata for an object with a fixed name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Metadata for an object whose name the store will generate from `prefix`.
    pub fn generated(prefix: impl Into<String>) -> Self {
        Self {
            generate_name: Some(prefix.into()),
            ..Default::default()
        }
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }
}

/// Access to the metadata of any stored object.
pub trait Object {
    fn meta(&self) -> &ObjectMeta;
    fn meta_mut(&mut self) -> &mut ObjectMeta;

    fn name(&self) -> &str {
        &self.meta().name
    }
}

/// Equality-based label selector: every pair must be present on the object.
/// An empty selector matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSelector {
    pairs: BTreeMap<String, String>,
}

impl LabelSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.pairs.insert(key.into(), value.into());
        self
    }

    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        self.pairs
            .iter()
            .all(|(k, v)| labels.get(k).is_some_and(|actual| actual == v))
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl fmt::Display for LabelSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (k, v) in &self.pairs {
            if !first {
                write!(f, ",")?;
            }
            write!(f, "{}={}", k, v)?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn empty_selector_matches_everything() {
        let selector = LabelSelector::new();
        assert!(selector.matches(&BTreeMap::new()));
        assert!(selector.matches(&labels(&[("a", "b")])));
    }

    #[test]
    fn selector_requires_every_pair() {
        let selector = LabelSelector::new().with("tier", "control").with("role", "admin");
        assert!(selector.matches(&labels(&[("tier", "control"), ("role", "admin"), ("x", "y")])));
        assert!(!selector.matches(&labels(&[("tier", "control")])));
        assert!(!selector.matches(&labels(&[("tier", "control"), ("role", "user")])));
    }

    #[test]
    fn selector_display_is_sorted() {
        let selector = LabelSelector::new().with("b", "2").with("a", "1");
        assert_eq!(selector.to_string(), "a=1,b=2");
    }
}
