//! Anchor: a point on the offset (time) axis

use super::{AnnotationHandle, Attributes, LayerHandle};
use crate::errors::{GraphError, Result};
use std::collections::BTreeMap;

/// A point in the offset continuum that annotation boundaries refer to
///
/// `start_of`/`end_of` are back-reference indexes maintained by the graph:
/// the annotations that start or end here, per layer, in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct Anchor {
    pub(crate) id: String,
    pub(crate) offset: Option<f64>,
    pub(crate) start_of: BTreeMap<LayerHandle, Vec<AnnotationHandle>>,
    pub(crate) end_of: BTreeMap<LayerHandle, Vec<AnnotationHandle>>,
    pub(crate) extra: Attributes,
}

impl Anchor {
    /// Create an anchor; NaN and infinite offsets are rejected
    pub(crate) fn new(id: String, offset: Option<f64>, extra: Attributes) -> Result<Self> {
        check_offset(offset)?;
        Ok(Self {
            id,
            offset,
            start_of: BTreeMap::new(),
            end_of: BTreeMap::new(),
            extra,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Offset, or `None` when the anchor is not yet aligned
    pub fn offset(&self) -> Option<f64> {
        self.offset
    }

    pub fn is_set(&self) -> bool {
        self.offset.is_some()
    }

    /// Annotations on `layer` that start at this anchor
    pub fn start_of(&self, layer: LayerHandle) -> &[AnnotationHandle] {
        self.start_of.get(&layer).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Annotations on `layer` that end at this anchor
    pub fn end_of(&self, layer: LayerHandle) -> &[AnnotationHandle] {
        self.end_of.get(&layer).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All annotations starting here, ordered by layer handle
    pub fn starting(&self) -> impl Iterator<Item = AnnotationHandle> + '_ {
        self.start_of.values().flatten().copied()
    }

    /// All annotations ending here, ordered by layer handle
    pub fn ending(&self) -> impl Iterator<Item = AnnotationHandle> + '_ {
        self.end_of.values().flatten().copied()
    }

    /// Preserved attributes (e.g. `confidence`)
    pub fn extra(&self) -> &Attributes {
        &self.extra
    }
}

pub(crate) fn check_offset(offset: Option<f64>) -> Result<()> {
    match offset {
        Some(value) if !value.is_finite() => Err(GraphError::InvalidOffset(value)),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn test_anchor_rejects_non_finite_offsets() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = Anchor::new("a".to_string(), Some(bad), Attributes::new()).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidOffset);
        }
    }

    #[test]
    fn test_unset_anchor() {
        let anchor = Anchor::new("a".to_string(), None, Attributes::new()).unwrap();
        assert!(!anchor.is_set());
        assert!(anchor.start_of(LayerHandle::new(0)).is_empty());
        assert_eq!(anchor.starting().count(), 0);
    }
}
