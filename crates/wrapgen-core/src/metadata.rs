//! Ordered, deduplicated metadata sets.
//!
//! A [`MetadataSet`] is a sequence plus a membership index. Insertion order is
//! preserved for every category: for include paths it decides search-path
//! precedence, for sources and options it keeps output reproducible.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use std::hash::Hash;
use std::path::PathBuf;

/// An insertion-ordered set of opaque values.
#[derive(Debug, Clone)]
pub struct MetadataSet<T = String> {
    items: Vec<T>,
    index: HashSet<T>,
}

/// Interface files contributed to a unit's closure.
pub type SourceSet = MetadataSet<PathBuf>;

impl<T> MetadataSet<T>
where
    T: Eq + Hash + Clone,
{
    /// Creates an empty set.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            index: HashSet::new(),
        }
    }

    /// Appends `value` unless already present. Returns true if it was added.
    pub fn insert(&mut self, value: T) -> bool {
        if self.index.contains(&value) {
            return false;
        }
        self.index.insert(value.clone());
        self.items.push(value);
        true
    }

    /// Appends every value from `other` that is not yet present, in order.
    pub fn merge(&mut self, other: &MetadataSet<T>) {
        for value in &other.items {
            self.insert(value.clone());
        }
    }

    /// Membership test by value equality.
    pub fn contains(&self, value: &T) -> bool {
        self.index.contains(value)
    }

    /// Returns true if every value of `other` is also in `self`.
    pub fn is_superset(&self, other: &MetadataSet<T>) -> bool {
        other.items.iter().all(|v| self.index.contains(v))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<T> Default for MetadataSet<T>
where
    T: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

// Equality is order-sensitive: two include sets with the same members in a
// different order produce different search paths.
impl<T: PartialEq> PartialEq for MetadataSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl<T: Eq> Eq for MetadataSet<T> {}

impl<T> FromIterator<T> for MetadataSet<T>
where
    T: Eq + Hash + Clone,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        for value in iter {
            set.insert(value);
        }
        set
    }
}

impl<T> Extend<T> for MetadataSet<T>
where
    T: Eq + Hash + Clone,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<'a, T> IntoIterator for &'a MetadataSet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: Serialize> Serialize for MetadataSet<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.items.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for MetadataSet<T>
where
    T: Deserialize<'de> + Eq + Hash + Clone,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let items = Vec::<T>::deserialize(deserializer)?;
        Ok(items.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_insert_preserves_first_occurrence_order() {
        let mut set = MetadataSet::new();
        assert!(set.insert("b".to_string()));
        assert!(set.insert("a".to_string()));
        assert!(!set.insert("b".to_string()));
        assert!(set.insert("c".to_string()));

        assert_eq!(set.as_slice(), ["b", "a", "c"]);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_merge_skips_existing_values() {
        let mut local: MetadataSet = ["x", "y"].iter().map(|s| s.to_string()).collect();
        let dep: MetadataSet = ["y", "z", "x", "w"].iter().map(|s| s.to_string()).collect();

        local.merge(&dep);

        assert_eq!(local.as_slice(), ["x", "y", "z", "w"]);
        assert!(local.is_superset(&dep));
        assert!(!dep.is_superset(&MetadataSet::from_iter(["q".to_string()])));
    }

    #[test]
    fn test_equality_is_order_sensitive() {
        let a: MetadataSet = ["1", "2"].iter().map(|s| s.to_string()).collect();
        let b: MetadataSet = ["2", "1"].iter().map(|s| s.to_string()).collect();
        assert_ne!(a, b);
        assert!(a.is_superset(&b) && b.is_superset(&a));
    }

    #[test]
    fn test_serde_as_sequence() {
        let set: MetadataSet = ["inc/a", "inc/b"].iter().map(|s| s.to_string()).collect();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["inc/a","inc/b"]"#);

        let parsed: MetadataSet = serde_json::from_str(r#"["a","b","a"]"#).unwrap();
        assert_eq!(parsed.as_slice(), ["a", "b"]);
    }
}
