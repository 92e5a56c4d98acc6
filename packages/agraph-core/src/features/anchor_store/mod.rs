//! Anchor storage
//!
//! Anchors live in insertion order in a flat arena with an id index. The
//! `start_of`/`end_of` back references are written only by the graph's
//! indexing step, never from here.

use crate::errors::{GraphError, Result};
use crate::shared::models::{Anchor, AnchorHandle, Attributes};
use ahash::AHashMap;

#[derive(Debug, Clone, Default)]
pub struct AnchorStore {
    anchors: Vec<Anchor>,
    by_id: AHashMap<String, AnchorHandle>,
}

impl AnchorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an anchor under an id that must not be in the store yet
    pub(crate) fn insert(
        &mut self,
        id: String,
        offset: Option<f64>,
        extra: Attributes,
    ) -> Result<AnchorHandle> {
        if self.by_id.contains_key(&id) {
            return Err(GraphError::malformed(format!(
                "anchor id '{}' is defined twice",
                id
            )));
        }
        let anchor = Anchor::new(id.clone(), offset, extra)?;
        let handle = AnchorHandle::new(self.anchors.len());
        self.anchors.push(anchor);
        self.by_id.insert(id, handle);
        Ok(handle)
    }

    pub fn get(&self, handle: AnchorHandle) -> Option<&Anchor> {
        self.anchors.get(handle.index())
    }

    pub(crate) fn get_mut(&mut self, handle: AnchorHandle) -> Option<&mut Anchor> {
        self.anchors.get_mut(handle.index())
    }

    pub fn by_id(&self, id: &str) -> Option<&Anchor> {
        self.handle_of(id).and_then(|h| self.get(h))
    }

    pub fn handle_of(&self, id: &str) -> Option<AnchorHandle> {
        self.by_id.get(id).copied()
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// All anchors in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (AnchorHandle, &Anchor)> + '_ {
        self.anchors
            .iter()
            .enumerate()
            .map(|(i, a)| (AnchorHandle::new(i), a))
    }

    /// Anchors with a set offset, ascending; ties keep insertion order
    pub fn ordered_by_offset(&self) -> Vec<AnchorHandle> {
        let mut set: Vec<(AnchorHandle, f64)> = self
            .iter()
            .filter_map(|(h, a)| a.offset().map(|o| (h, o)))
            .collect();
        // sort_by is stable
        set.sort_by(|a, b| a.1.total_cmp(&b.1));
        set.into_iter().map(|(h, _)| h).collect()
    }

    /// First anchor (insertion order) whose offset equals `offset` exactly
    pub fn anchor_at(&self, offset: f64) -> Option<AnchorHandle> {
        self.iter()
            .find(|(_, a)| a.offset() == Some(offset))
            .map(|(h, _)| h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    fn store(offsets: &[Option<f64>]) -> AnchorStore {
        let mut store = AnchorStore::new();
        for (i, offset) in offsets.iter().enumerate() {
            store
                .insert(format!("a{}", i), *offset, Attributes::new())
                .unwrap();
        }
        store
    }

    #[test]
    fn test_ordered_by_offset_excludes_unset() {
        let store = store(&[Some(2.0), None, Some(0.5), Some(1.0)]);
        let ids: Vec<_> = store
            .ordered_by_offset()
            .into_iter()
            .map(|h| store.get(h).unwrap().id().to_string())
            .collect();
        assert_eq!(ids, vec!["a2", "a3", "a0"]);
    }

    #[test]
    fn test_ordered_by_offset_ties_keep_insertion_order() {
        let store = store(&[Some(1.0), Some(0.0), Some(1.0), Some(1.0)]);
        let order: Vec<_> = store
            .ordered_by_offset()
            .into_iter()
            .map(|h| h.index())
            .collect();
        assert_eq!(order, vec![1, 0, 2, 3]);
    }

    #[test]
    fn test_anchor_at_exact_match() {
        let store = store(&[Some(1.0), Some(2.5), Some(2.5)]);
        assert_eq!(store.anchor_at(2.5), Some(AnchorHandle::new(1)));
        assert_eq!(store.anchor_at(2.4), None);
    }

    #[test]
    fn test_lookup_by_id() {
        let store = store(&[Some(1.0), None]);
        assert_eq!(store.handle_of("a1"), Some(AnchorHandle::new(1)));
        assert_eq!(store.by_id("a0").and_then(|a| a.offset()), Some(1.0));
        assert!(store.by_id("a9").is_none());
        assert!(store.get(AnchorHandle::new(99)).is_none());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut store = store(&[Some(1.0)]);
        let err = store
            .insert("a0".to_string(), None, Attributes::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Malformed);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_invalid_offset_leaves_store_untouched() {
        let mut store = AnchorStore::new();
        let err = store
            .insert("bad".to_string(), Some(f64::NAN), Attributes::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOffset);
        assert!(store.is_empty());
        assert!(!store.contains_id("bad"));
    }
}
