//! Touched flags

use std::hash::Hash;

use indexmap::IndexMap;

/// Touched flags for a subset of the form keys.
///
/// A key that was never touched or edited is absent, which reads as
/// "unknown" (`None`), distinct from an explicit `false`.
#[derive(Debug, Clone, PartialEq)]
pub struct TouchedMap<K: Hash + Eq> {
    flags: IndexMap<K, bool>,
}

impl<K: Hash + Eq> Default for TouchedMap<K> {
    fn default() -> Self {
        Self {
            flags: IndexMap::new(),
        }
    }
}

impl<K: Hash + Eq> TouchedMap<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tri-state flag: `None` when the key has no entry.
    pub fn get(&self, key: &K) -> Option<bool> {
        self.flags.get(key).copied()
    }

    pub(crate) fn mark(&mut self, key: K, touched: bool) {
        self.flags.insert(key, touched);
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, bool)> {
        self.flags.iter().map(|(key, flag)| (key, *flag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_key_is_unknown() {
        let touched: TouchedMap<&str> = TouchedMap::new();
        assert_eq!(touched.get(&"name"), None);
        assert!(touched.is_empty());
    }

    #[test]
    fn test_mark_keeps_first_insertion_position() {
        let mut touched = TouchedMap::new();
        touched.mark("b", true);
        touched.mark("a", false);
        touched.mark("b", false);
        assert_eq!(touched.iter().collect::<Vec<_>>(), vec![(&"b", false), (&"a", false)]);
        assert_eq!(touched.len(), 2);
        assert_eq!(touched.get(&"a"), Some(false));
    }
}
