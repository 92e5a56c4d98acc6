//! Borrowed views over graph arenas
//!
//! `AnnotationRef` and `AnchorRef` pair a handle with the graph that issued
//! it, so navigation (parent, siblings, anchors, ancestors) reads like walking
//! an object graph without any struct holding a reference to another.

use super::Graph;
use crate::shared::models::{Anchor, AnchorHandle, Annotation, AnnotationHandle, Attributes, Layer};
use std::fmt;

/// A live annotation inside its graph
#[derive(Clone, Copy)]
pub struct AnnotationRef<'g> {
    graph: &'g Graph,
    handle: AnnotationHandle,
    data: &'g Annotation,
}

impl<'g> AnnotationRef<'g> {
    pub(crate) fn new(graph: &'g Graph, handle: AnnotationHandle, data: &'g Annotation) -> Self {
        Self {
            graph,
            handle,
            data,
        }
    }

    pub fn handle(&self) -> AnnotationHandle {
        self.handle
    }

    pub fn data(&self) -> &'g Annotation {
        self.data
    }

    pub fn id(&self) -> &'g str {
        &self.data.id
    }

    pub fn label(&self) -> &'g str {
        &self.data.label
    }

    pub fn layer(&self) -> &'g Layer {
        self.graph.layer_of(self.data)
    }

    pub fn layer_id(&self) -> &'g str {
        self.layer().id()
    }

    pub fn extra(&self) -> &'g Attributes {
        &self.data.extra
    }

    pub fn start(&self) -> Option<AnchorRef<'g>> {
        self.data.start.and_then(|h| self.graph.anchor(h))
    }

    pub fn end(&self) -> Option<AnchorRef<'g>> {
        self.data.end.and_then(|h| self.graph.anchor(h))
    }

    pub fn start_offset(&self) -> Option<f64> {
        self.start().and_then(|a| a.offset())
    }

    pub fn end_offset(&self) -> Option<f64> {
        self.end().and_then(|a| a.offset())
    }

    /// Parent annotation; `None` for graph-scope annotations
    pub fn parent(&self) -> Option<AnnotationRef<'g>> {
        self.data.parent.and_then(|h| self.graph.annotation(h))
    }

    /// Same-layer siblings under the same parent, self included
    pub fn siblings(&self) -> &'g [AnnotationHandle] {
        self.graph.sibling_list(self.data)
    }

    /// 1-based position among same-layer siblings
    pub fn ordinal(&self) -> usize {
        self.siblings()
            .iter()
            .position(|h| *h == self.handle)
            .map(|i| i + 1)
            .unwrap_or(0)
    }

    pub fn previous(&self) -> Option<AnnotationRef<'g>> {
        let ordinal = self.ordinal();
        if ordinal < 2 {
            return None;
        }
        self.siblings()
            .get(ordinal - 2)
            .and_then(|h| self.graph.annotation(*h))
    }

    pub fn next(&self) -> Option<AnnotationRef<'g>> {
        let ordinal = self.ordinal();
        if ordinal == 0 {
            return None;
        }
        self.siblings()
            .get(ordinal)
            .and_then(|h| self.graph.annotation(*h))
    }

    /// Children on `layer_id`; empty when none are registered
    pub fn children(&self, layer_id: &str) -> Vec<AnnotationRef<'g>> {
        self.child_list(layer_id)
            .map(|list| self.graph.refs(list))
            .unwrap_or_default()
    }

    fn child_list(&self, layer_id: &str) -> Option<&'g [AnnotationHandle]> {
        let layer = self.graph.schema().handle_of(layer_id)?;
        self.data.child_list(layer)
    }

    /// Ancestors, parent first
    pub fn ancestors(&self) -> Vec<AnnotationRef<'g>> {
        let mut ancestors = Vec::new();
        let mut current = self.parent();
        while let Some(ancestor) = current {
            ancestors.push(ancestor);
            current = ancestor.parent();
        }
        ancestors
    }

    fn ancestor_on(&self, layer_id: &str) -> Option<AnnotationRef<'g>> {
        self.ancestors()
            .into_iter()
            .find(|a| a.layer_id() == layer_id)
    }

    /// First related annotation on `layer_id`: self, else the first registered
    /// child on that layer, else the nearest ancestor on that layer
    pub fn first(&self, layer_id: &str) -> Option<AnnotationRef<'g>> {
        if self.layer_id() == layer_id {
            return Some(*self);
        }
        if let Some(first) = self.child_list(layer_id).and_then(|list| list.first()) {
            return self.graph.annotation(*first);
        }
        self.ancestor_on(layer_id)
    }

    /// All related annotations on `layer_id`: self, else the registered child
    /// list (even when empty), else the nearest ancestor on that layer
    pub fn all(&self, layer_id: &str) -> Vec<AnnotationRef<'g>> {
        if self.layer_id() == layer_id {
            return vec![*self];
        }
        if let Some(list) = self.child_list(layer_id) {
            return self.graph.refs(list);
        }
        self.ancestor_on(layer_id).into_iter().collect()
    }

    pub fn duration(&self) -> Option<f64> {
        Some(self.end_offset()? - self.start_offset()?)
    }

    pub fn midpoint(&self) -> Option<f64> {
        Some(self.start_offset()? + self.duration()? / 2.0)
    }

    /// Start and end are the same anchor
    pub fn instantaneous(&self) -> bool {
        self.data.start.is_some() && self.data.start == self.data.end
    }

    /// `start <= offset < end`; false when either offset is unset
    pub fn includes_offset(&self, offset: f64) -> bool {
        match (self.start_offset(), self.end_offset()) {
            (Some(start), Some(end)) => start <= offset && offset < end,
            _ => false,
        }
    }

    /// Whether `other` lies within this annotation's bounds (inclusive)
    pub fn includes(&self, other: &AnnotationRef<'_>) -> bool {
        match (
            self.start_offset(),
            self.end_offset(),
            other.start_offset(),
            other.end_offset(),
        ) {
            (Some(start), Some(end), Some(other_start), Some(other_end)) => {
                start <= other_start && other_end <= end
            }
            _ => false,
        }
    }

    pub fn includes_midpoint_of(&self, other: &AnnotationRef<'_>) -> bool {
        other
            .midpoint()
            .map(|m| self.includes_offset(m))
            .unwrap_or(false)
    }

    pub fn overlaps(&self, other: &AnnotationRef<'_>) -> bool {
        match (
            self.start_offset(),
            self.end_offset(),
            other.start_offset(),
            other.end_offset(),
        ) {
            (Some(start), Some(end), Some(other_start), Some(other_end)) => {
                start < other_end && end > other_start
            }
            _ => false,
        }
    }

    pub fn starts_with(&self, other: &AnnotationRef<'_>) -> bool {
        self.data.start.is_some() && self.data.start == other.data.start
    }

    pub fn ends_with(&self, other: &AnnotationRef<'_>) -> bool {
        self.data.end.is_some() && self.data.end == other.data.end
    }

    /// Shares both anchors with `other`
    pub fn tags(&self, other: &AnnotationRef<'_>) -> bool {
        self.starts_with(other) && self.ends_with(other)
    }

    /// This annotation ends where `other` starts
    pub fn predecessor_of(&self, other: &AnnotationRef<'_>) -> bool {
        self.data.end.is_some() && self.data.end == other.data.start
    }

    /// This annotation starts where `other` ends
    pub fn successor_of(&self, other: &AnnotationRef<'_>) -> bool {
        self.data.start.is_some() && self.data.start == other.data.end
    }

    /// Annotations on `layer_id` that start at this annotation's start anchor
    pub fn shares_start(&self, layer_id: &str) -> Vec<AnnotationRef<'g>> {
        self.start()
            .map(|anchor| anchor.start_of(layer_id))
            .unwrap_or_default()
    }

    /// Annotations on `layer_id` that end at this annotation's end anchor
    pub fn shares_end(&self, layer_id: &str) -> Vec<AnnotationRef<'g>> {
        self.end()
            .map(|anchor| anchor.end_of(layer_id))
            .unwrap_or_default()
    }

    /// Annotations on `layer_id` sharing both anchors with this one
    pub fn tags_on(&self, layer_id: &str) -> Vec<AnnotationRef<'g>> {
        self.shares_start(layer_id)
            .into_iter()
            .filter(|other| other.tags(self))
            .collect()
    }
}

impl PartialEq for AnnotationRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle && std::ptr::eq(self.graph, other.graph)
    }
}

impl Eq for AnnotationRef<'_> {}

impl fmt::Debug for AnnotationRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnnotationRef")
            .field("id", &self.id())
            .field("layer", &self.layer_id())
            .field("label", &self.label())
            .finish()
    }
}

impl fmt::Display for AnnotationRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A live anchor inside its graph
#[derive(Clone, Copy)]
pub struct AnchorRef<'g> {
    graph: &'g Graph,
    handle: AnchorHandle,
    data: &'g Anchor,
}

impl<'g> AnchorRef<'g> {
    pub(crate) fn new(graph: &'g Graph, handle: AnchorHandle, data: &'g Anchor) -> Self {
        Self {
            graph,
            handle,
            data,
        }
    }

    pub fn handle(&self) -> AnchorHandle {
        self.handle
    }

    pub fn data(&self) -> &'g Anchor {
        self.data
    }

    pub fn id(&self) -> &'g str {
        self.data.id()
    }

    pub fn offset(&self) -> Option<f64> {
        self.data.offset()
    }

    /// Annotations on `layer_id` starting here
    pub fn start_of(&self, layer_id: &str) -> Vec<AnnotationRef<'g>> {
        match self.graph.schema().handle_of(layer_id) {
            Some(layer) => self.graph.refs(self.data.start_of(layer)),
            None => Vec::new(),
        }
    }

    /// Annotations on `layer_id` ending here
    pub fn end_of(&self, layer_id: &str) -> Vec<AnnotationRef<'g>> {
        match self.graph.schema().handle_of(layer_id) {
            Some(layer) => self.graph.refs(self.data.end_of(layer)),
            None => Vec::new(),
        }
    }

    /// Every annotation starting here
    pub fn starting(&self) -> Vec<AnnotationRef<'g>> {
        let graph = self.graph;
        self.data
            .starting()
            .filter_map(|h| graph.annotation(h))
            .collect()
    }

    /// Every annotation ending here
    pub fn ending(&self) -> Vec<AnnotationRef<'g>> {
        let graph = self.graph;
        self.data
            .ending()
            .filter_map(|h| graph.annotation(h))
            .collect()
    }
}

impl PartialEq for AnchorRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle && std::ptr::eq(self.graph, other.graph)
    }
}

impl Eq for AnchorRef<'_> {}

impl fmt::Debug for AnchorRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnchorRef")
            .field("id", &self.id())
            .field("offset", &self.offset())
            .finish()
    }
}
