//! Annotation graph
//!
//! The live, queryable, mutable annotation collection. Annotations sit in a
//! flat arena and are indexed four ways on insertion:
//!
//! 1. the global id map
//! 2. their layer's extent
//! 3. their parent's child list for that layer (or the graph's own list
//!    when they have no parent)
//! 4. their anchors' `start_of`/`end_of` sets
//!
//! Every mutation validates first and only then writes, so an error never
//! leaves a partially indexed annotation behind.

mod navigation;
mod shared;
mod validation;

pub use navigation::{AnchorRef, AnnotationRef};
pub use shared::SharedGraph;
pub use validation::{IssueKind, ValidationIssue};

use crate::config::GraphConfig;
use crate::errors::{GraphError, ReferenceKind, Result};
use crate::features::anchor_store::AnchorStore;
use crate::features::codec::document::is_reserved_record_key;
use crate::features::schema::Schema;
use crate::shared::models::{
    check_offset, Alignment, AnchorHandle, Annotation, AnnotationHandle, Attributes, ChildLists,
    Layer, LayerDefinition, LayerHandle, NewAnnotation,
};
use crate::shared::utils::id_generator::IdAllocator;
use ahash::AHashMap;
use tracing::{debug, trace};

/// Where an annotation boundary comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AnchorSlot {
    Existing(AnchorHandle),
    /// A new unset anchor is created on commit
    Fresh,
    /// Reuse whatever the start slot resolves to
    SameAsStart,
    /// No anchor at all
    Absent,
}

/// A fully validated insertion, ready to commit
#[derive(Debug, Clone, Copy)]
pub(crate) struct Placement {
    pub layer: LayerHandle,
    pub parent: Option<AnnotationHandle>,
    pub start: AnchorSlot,
    pub end: AnchorSlot,
}

#[derive(Debug, Clone)]
pub struct Graph {
    id: Option<String>,
    schema: Schema,
    anchors: AnchorStore,
    annotations: Vec<Annotation>,
    by_id: AHashMap<String, AnnotationHandle>,
    /// Graph-scope annotations (no parent annotation), per layer
    top_level: ChildLists,
    ids: IdAllocator,
    config: GraphConfig,
    /// Top-level document keys that are not layers, preserved verbatim
    extra: Attributes,
}

impl Graph {
    /// Empty graph with only the root layer
    pub fn new(id: impl Into<String>) -> Self {
        Self::with_config(id, GraphConfig::default())
    }

    /// Empty graph with only the configured root layer
    pub fn with_config(id: impl Into<String>, config: GraphConfig) -> Self {
        let schema = Schema::from_conventions(&config.conventions);
        Self::assemble(Some(id.into()), schema, config)
    }

    /// Empty graph over an existing layer schema
    pub fn with_schema(id: impl Into<String>, schema: Schema) -> Self {
        Self::assemble(Some(id.into()), schema, GraphConfig::default())
    }

    pub(crate) fn assemble(id: Option<String>, schema: Schema, config: GraphConfig) -> Self {
        Self {
            id,
            schema,
            anchors: AnchorStore::new(),
            annotations: Vec::new(),
            by_id: AHashMap::new(),
            top_level: ChildLists::new(),
            ids: IdAllocator::new(config.ids.prefix.clone()),
            config,
            extra: Attributes::new(),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Accessors
    // ═══════════════════════════════════════════════════════════════════════

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    pub fn anchors(&self) -> &AnchorStore {
        &self.anchors
    }

    /// Preserved top-level document keys
    pub fn extra(&self) -> &Attributes {
        &self.extra
    }

    pub fn extra_mut(&mut self) -> &mut Attributes {
        &mut self.extra
    }

    /// Number of annotations
    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    pub fn annotation(&self, handle: AnnotationHandle) -> Option<AnnotationRef<'_>> {
        self.annotations
            .get(handle.index())
            .map(|data| AnnotationRef::new(self, handle, data))
    }

    pub fn annotation_by_id(&self, id: &str) -> Option<AnnotationRef<'_>> {
        self.annotation_handle(id).and_then(|h| self.annotation(h))
    }

    pub fn annotation_handle(&self, id: &str) -> Option<AnnotationHandle> {
        self.by_id.get(id).copied()
    }

    /// All annotations in insertion order
    pub fn annotations(&self) -> impl Iterator<Item = AnnotationRef<'_>> + '_ {
        self.annotations
            .iter()
            .enumerate()
            .map(move |(i, data)| AnnotationRef::new(self, AnnotationHandle::new(i), data))
    }

    pub fn anchor(&self, handle: AnchorHandle) -> Option<AnchorRef<'_>> {
        self.anchors
            .get(handle)
            .map(|data| AnchorRef::new(self, handle, data))
    }

    pub fn anchor_by_id(&self, id: &str) -> Option<AnchorRef<'_>> {
        self.anchors.handle_of(id).and_then(|h| self.anchor(h))
    }

    /// Graph-scope annotations on `layer_id`, in insertion order
    pub fn top_level(&self, layer_id: &str) -> Vec<AnnotationRef<'_>> {
        self.schema
            .handle_of(layer_id)
            .and_then(|layer| self.top_level.get(layer))
            .map(|list| self.refs(list))
            .unwrap_or_default()
    }

    /// Layers with a registered graph-scope list, in registration order
    pub(crate) fn top_level_lists(
        &self,
    ) -> impl Iterator<Item = (LayerHandle, &[AnnotationHandle])> + '_ {
        self.top_level.iter()
    }

    pub(crate) fn refs(&self, handles: &[AnnotationHandle]) -> Vec<AnnotationRef<'_>> {
        handles.iter().filter_map(|h| self.annotation(*h)).collect()
    }

    pub(crate) fn layer_of(&self, annotation: &Annotation) -> &Layer {
        // annotations are only indexed against layers of this schema
        self.schema.get(annotation.layer).unwrap_or_else(|| self.schema.root())
    }

    pub(crate) fn sibling_list(&self, annotation: &Annotation) -> &[AnnotationHandle] {
        let list = match annotation.parent {
            Some(parent) => self
                .annotations
                .get(parent.index())
                .and_then(|p| p.children.get(annotation.layer)),
            None => self.top_level.get(annotation.layer),
        };
        list.unwrap_or(&[])
    }

    fn resolve_layer(&self, layer_id: &str, context: &str) -> Result<LayerHandle> {
        self.schema
            .handle_of(layer_id)
            .ok_or_else(|| GraphError::unresolved_layer(layer_id, context))
    }

    fn resolve_annotation(&self, handle: AnnotationHandle, context: &str) -> Result<&Annotation> {
        self.annotations
            .get(handle.index())
            .ok_or_else(|| GraphError::unresolved_annotation(handle.to_string(), context))
    }

    fn layer_id(&self, layer: LayerHandle) -> &str {
        self.schema.get(layer).map(Layer::id).unwrap_or_default()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Queries
    // ═══════════════════════════════════════════════════════════════════════

    /// Annotations with `start <= offset < end`
    ///
    /// Ordered by layer (schema pre-order) and then by position within the
    /// layer. Annotations with an unset boundary never match. An empty result
    /// is an empty `Vec`.
    pub fn annotations_at(
        &self,
        offset: f64,
        layer_id: Option<&str>,
    ) -> Result<Vec<AnnotationRef<'_>>> {
        let layers = match layer_id {
            Some(id) => vec![self.resolve_layer(id, "annotations_at")?],
            None => self.schema.layers_top_down(),
        };

        let mut found = Vec::new();
        for layer in layers {
            if let Some(def) = self.schema.get(layer) {
                found.extend(
                    self.refs(def.annotations())
                        .into_iter()
                        .filter(|a| a.includes_offset(offset)),
                );
            }
        }
        Ok(found)
    }

    /// Labels of every annotation on `layer_id`, in insertion order
    pub fn labels(&self, layer_id: &str) -> Result<Vec<&str>> {
        let layer = self.resolve_layer(layer_id, "labels")?;
        let handles = self.schema.get(layer).map(Layer::annotations).unwrap_or(&[]);
        Ok(handles
            .iter()
            .filter_map(|h| self.annotations.get(h.index()))
            .map(|a| a.label.as_str())
            .collect())
    }

    /// First annotation on `layer_id`
    pub fn first(&self, layer_id: &str) -> Option<AnnotationRef<'_>> {
        let layer = self.schema.layer(layer_id)?;
        layer.annotations().first().and_then(|h| self.annotation(*h))
    }

    /// Every annotation on `layer_id`; empty for unknown layers
    pub fn all(&self, layer_id: &str) -> Vec<AnnotationRef<'_>> {
        self.schema
            .layer(layer_id)
            .map(|layer| self.refs(layer.annotations()))
            .unwrap_or_default()
    }

    /// Anchors with a set offset, ascending
    pub fn ordered_anchors(&self) -> Vec<AnchorRef<'_>> {
        self.anchors
            .ordered_by_offset()
            .into_iter()
            .filter_map(|h| self.anchor(h))
            .collect()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Layers and anchors
    // ═══════════════════════════════════════════════════════════════════════

    pub fn add_layer(
        &mut self,
        id: impl Into<String>,
        parent_id: impl Into<String>,
        alignment: Alignment,
    ) -> Result<LayerHandle> {
        self.add_layer_with(LayerDefinition::new(id, parent_id).alignment(alignment))
    }

    /// Add a leaf layer
    ///
    /// Child arrays share their parent's record with its attributes, so the
    /// new id must not already be an attribute key on the parent layer.
    pub fn add_layer_with(&mut self, definition: LayerDefinition) -> Result<LayerHandle> {
        if let Some(parent) = self.schema.layer(&definition.parent_id) {
            let clash = parent
                .annotations()
                .iter()
                .filter_map(|h| self.annotations.get(h.index()))
                .find(|a| a.extra.contains_key(&definition.id));
            if let Some(annotation) = clash {
                return Err(GraphError::reserved(
                    definition.id,
                    format!(
                        "a layer id: annotation '{}' has an attribute of that name",
                        annotation.id
                    ),
                ));
            }
        }
        self.schema.add_layer_with(definition)
    }

    /// Next generated id, skipping every anchor and annotation id in use and
    /// any id `also_taken` reports
    pub(crate) fn allocate_id_where(&mut self, also_taken: impl Fn(&str) -> bool) -> String {
        let anchors = &self.anchors;
        let by_id = &self.by_id;
        self.ids
            .next_free(|id| anchors.contains_id(id) || by_id.contains_key(id) || also_taken(id))
    }

    /// Create an anchor with a generated id
    pub fn create_anchor(&mut self, offset: Option<f64>) -> Result<AnchorHandle> {
        self.create_anchor_avoiding(offset, None)
    }

    fn create_anchor_avoiding(
        &mut self,
        offset: Option<f64>,
        pending: Option<&str>,
    ) -> Result<AnchorHandle> {
        check_offset(offset)?;
        let id = self.allocate_id_where(|id| Some(id) == pending);
        let handle = self.anchors.insert(id, offset, Attributes::new())?;
        trace!("Created anchor {} at {:?}", handle, offset);
        Ok(handle)
    }

    /// First anchor at exactly `offset`, or a new one
    pub fn get_or_create_anchor_at(&mut self, offset: f64) -> Result<AnchorHandle> {
        check_offset(Some(offset))?;
        match self.anchors.anchor_at(offset) {
            Some(handle) => Ok(handle),
            None => self.create_anchor(Some(offset)),
        }
    }

    /// Set or clear an anchor's offset
    ///
    /// Fails with `InvalidInterval` if the new offset would put any annotation
    /// using this anchor out of order.
    pub fn set_anchor_offset(&mut self, handle: AnchorHandle, offset: Option<f64>) -> Result<()> {
        check_offset(offset)?;
        let anchor = self
            .anchors
            .get(handle)
            .ok_or_else(|| GraphError::unresolved_anchor(handle.to_string(), "set_anchor_offset"))?;

        if let Some(new) = offset {
            for a in anchor.starting().filter_map(|h| self.annotations.get(h.index())) {
                if a.end == Some(handle) {
                    continue;
                }
                if let Some(end) = a.end.and_then(|e| self.anchors.get(e)).and_then(|e| e.offset()) {
                    if new > end {
                        return Err(GraphError::InvalidInterval { start: new, end });
                    }
                }
            }
            for a in anchor.ending().filter_map(|h| self.annotations.get(h.index())) {
                if a.start == Some(handle) {
                    continue;
                }
                if let Some(start) = a
                    .start
                    .and_then(|s| self.anchors.get(s))
                    .and_then(|s| s.offset())
                {
                    if start > new {
                        return Err(GraphError::InvalidInterval { start, end: new });
                    }
                }
            }
        }

        if let Some(anchor) = self.anchors.get_mut(handle) {
            anchor.offset = offset;
        }
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Annotations
    // ═══════════════════════════════════════════════════════════════════════

    /// Add an annotation
    ///
    /// Everything is checked before anything is written: layer, anchors,
    /// parent, id uniqueness, layer structure, tag anchors, interval order.
    /// Missing boundaries are then filled in (tag layers inherit the parent's
    /// anchors, instant layers reuse the start as end, other layers get fresh
    /// unset anchors) and an id is generated if none was given.
    pub fn add_annotation(&mut self, request: NewAnnotation) -> Result<AnnotationHandle> {
        let layer = self.resolve_layer(&request.layer_id, "layer of new annotation")?;
        if let Some(id) = &request.id {
            if self.by_id.contains_key(id) {
                return Err(GraphError::DuplicateAnnotationId(id.clone()));
            }
        }
        for anchor in [request.start, request.end].into_iter().flatten() {
            if self.anchors.get(anchor).is_none() {
                return Err(GraphError::unresolved_anchor(
                    anchor.to_string(),
                    format!("boundary of new '{}' annotation", request.layer_id),
                ));
            }
        }
        if let Some(parent) = request.parent {
            if self.annotations.get(parent.index()).is_none() {
                return Err(GraphError::UnknownParent {
                    kind: ReferenceKind::Annotation,
                    id: parent.to_string(),
                });
            }
        }

        self.check_attribute_keys(layer, &request.extra)?;

        let name = request.id.as_deref().unwrap_or("(new)");
        let placement = self.place(layer, request.parent, request.start, request.end, true, name)?;
        self.commit(request.id, request.label, request.extra, placement)
    }

    /// Attribute keys must not collide with record keys or child layer ids
    fn check_attribute_keys(&self, layer: LayerHandle, extra: &Attributes) -> Result<()> {
        let child_layers = self.schema.get(layer).map(Layer::children).unwrap_or(&[]);
        for key in extra.keys() {
            if is_reserved_record_key(key) {
                return Err(GraphError::reserved(key.as_str(), "an annotation attribute"));
            }
            if child_layers.iter().any(|c| self.layer_id(*c) == key.as_str()) {
                return Err(GraphError::reserved(
                    key.as_str(),
                    format!(
                        "an attribute on layer '{}', which has a child layer of that name",
                        self.layer_id(layer)
                    ),
                ));
            }
        }
        Ok(())
    }

    /// Tag `annotation` with a new annotation on `layer_id`
    ///
    /// The tag takes the annotation's anchors. Its parent is the annotation
    /// when the tag layer is a child of the annotation's layer, or the
    /// annotation's parent when both layers share a parent layer. Any other
    /// layer relation is `IncompatibleLayer`, and so is a sibling layer with
    /// no alignment under a parent annotation: such a tag must carry the
    /// parent's anchors, not the annotation's.
    pub fn create_tag(
        &mut self,
        annotation: AnnotationHandle,
        layer_id: &str,
        label: impl Into<String>,
    ) -> Result<AnnotationHandle> {
        let source = self.resolve_annotation(annotation, "create_tag")?;
        let layer = self.resolve_layer(layer_id, "create_tag")?;
        let tag_parent_layer = self.schema.get(layer).and_then(|l| l.parent());
        let source_parent_layer = self.schema.get(source.layer).and_then(|l| l.parent());

        let parent = if tag_parent_layer == Some(source.layer) {
            Some(annotation)
        } else if tag_parent_layer.is_some() && tag_parent_layer == source_parent_layer {
            let tag_alignment = self.schema.get(layer).map(Layer::alignment);
            if source.parent.is_some() && tag_alignment == Some(Alignment::None) {
                return Err(GraphError::incompatible(
                    layer_id,
                    format!("tag of '{}' on layer '{}'", source.id, self.layer_id(source.layer)),
                    "a sibling layer without alignment takes its parent's anchors",
                ));
            }
            source.parent
        } else {
            return Err(GraphError::incompatible(
                layer_id,
                format!("tag of '{}' on layer '{}'", source.id, self.layer_id(source.layer)),
                "tag layer is neither a child nor a sibling of the annotation's layer",
            ));
        };

        trace!("Tagging '{}' on layer '{}'", source.id, layer_id);
        let mut request = NewAnnotation::new(layer_id, label);
        request.start = source.start;
        request.end = source.end;
        request.parent = parent;
        self.add_annotation(request)
    }

    /// Span from the start of `from` to the end of `to`, parent inferred
    ///
    /// Parent candidates, in order: `from`'s parent when the span layer shares
    /// `from`'s parent layer; `to`'s parent when it shares `to`'s instead;
    /// `from` itself when the span layer is a child of `from`'s layer; else the
    /// nearest ancestor of `from` (then `to`) on the span layer's parent layer.
    pub fn create_span(
        &mut self,
        from: AnnotationHandle,
        to: AnnotationHandle,
        layer_id: &str,
        label: impl Into<String>,
    ) -> Result<AnnotationHandle> {
        let layer = self.resolve_layer(layer_id, "create_span")?;
        let span_parent_layer = self.schema.get(layer).and_then(|l| l.parent());
        let parent = {
            let from_ref = self
                .annotation(from)
                .ok_or_else(|| GraphError::unresolved_annotation(from.to_string(), "create_span"))?;
            let to_ref = self
                .annotation(to)
                .ok_or_else(|| GraphError::unresolved_annotation(to.to_string(), "create_span"))?;

            match span_parent_layer {
                // a root-layer span has no parent annotation
                None => None,
                Some(parent_layer) => {
                    if from_ref.layer().parent() == Some(parent_layer) {
                        from_ref.parent().map(|p| p.handle())
                    } else if to_ref.layer().parent() == Some(parent_layer) {
                        to_ref.parent().map(|p| p.handle())
                    } else if from_ref.data().layer == parent_layer {
                        Some(from)
                    } else {
                        let parent_layer_id = self.layer_id(parent_layer);
                        let found = from_ref
                            .ancestors()
                            .into_iter()
                            .chain(to_ref.ancestors())
                            .find(|a| a.layer_id() == parent_layer_id)
                            .map(|a| a.handle());
                        match found {
                            Some(handle) => Some(handle),
                            None if parent_layer == self.schema.root_handle() => None,
                            None => {
                                return Err(GraphError::incompatible(
                                    layer_id,
                                    format!("span from '{}' to '{}'", from_ref.id(), to_ref.id()),
                                    "no annotation on the span layer's parent layer",
                                ))
                            }
                        }
                    }
                }
            }
        };
        self.create_span_with_parent(from, to, layer_id, label, parent)
    }

    /// Span from the start of `from` to the end of `to` under `parent`
    pub fn create_span_with_parent(
        &mut self,
        from: AnnotationHandle,
        to: AnnotationHandle,
        layer_id: &str,
        label: impl Into<String>,
        parent: Option<AnnotationHandle>,
    ) -> Result<AnnotationHandle> {
        let start = self.resolve_annotation(from, "create_span")?.start;
        let end = self.resolve_annotation(to, "create_span")?.end;
        let mut request = NewAnnotation::new(layer_id, label);
        request.start = start;
        request.end = end;
        request.parent = parent;
        self.add_annotation(request)
    }

    /// Check an insertion against every structural invariant
    ///
    /// With `fill_missing`, absent boundaries are planned as fresh (or shared)
    /// anchors; without it they stay absent, except that a tag with a parent
    /// and no anchors of its own always inherits the parent's.
    pub(crate) fn place(
        &self,
        layer: LayerHandle,
        parent: Option<AnnotationHandle>,
        start: Option<AnchorHandle>,
        end: Option<AnchorHandle>,
        fill_missing: bool,
        name: &str,
    ) -> Result<Placement> {
        let def = self
            .schema
            .get(layer)
            .ok_or_else(|| GraphError::unresolved_layer(layer.to_string(), name))?;
        let parent_data = match parent {
            Some(p) => Some(self.annotations.get(p.index()).ok_or_else(|| {
                GraphError::UnknownParent {
                    kind: ReferenceKind::Annotation,
                    id: p.to_string(),
                }
            })?),
            None => None,
        };

        match parent_data {
            Some(p) if def.parent() != Some(p.layer) => {
                return Err(GraphError::incompatible(
                    def.id(),
                    format!("parent '{}' on layer '{}'", p.id, self.layer_id(p.layer)),
                    "layer is not a child of the parent's layer",
                ));
            }
            None if !(def.is_root() || def.parent() == Some(self.schema.root_handle())) => {
                return Err(GraphError::incompatible(
                    def.id(),
                    format!("graph '{}'", self.id.as_deref().unwrap_or_default()),
                    "only the root layer and its children may hold annotations without a parent",
                ));
            }
            _ => {}
        }

        let (start, end) = match (def.alignment(), parent_data) {
            (Alignment::None, Some(p)) => {
                let (start, end) = if start.is_none() && end.is_none() {
                    (p.start, p.end)
                } else if fill_missing {
                    (start.or(p.start), end.or(p.end))
                } else {
                    (start, end)
                };
                if start != p.start || end != p.end {
                    return Err(GraphError::AnchorMismatch {
                        layer: def.id().to_string(),
                        annotation: name.to_string(),
                    });
                }
                (slot(start, AnchorSlot::Absent), slot(end, AnchorSlot::Absent))
            }
            (Alignment::Instant, _) if fill_missing => match (start, end) {
                (Some(s), Some(e)) if s != e => {
                    return Err(GraphError::incompatible(
                        def.id(),
                        format!("annotation '{}'", name),
                        "an instant annotation starts and ends on the same anchor",
                    ));
                }
                (Some(s), Some(_)) => (AnchorSlot::Existing(s), AnchorSlot::Existing(s)),
                (Some(s), None) | (None, Some(s)) => {
                    (AnchorSlot::Existing(s), AnchorSlot::Existing(s))
                }
                (None, None) => (AnchorSlot::Fresh, AnchorSlot::SameAsStart),
            },
            _ if fill_missing => (
                slot(start, AnchorSlot::Fresh),
                slot(end, AnchorSlot::Fresh),
            ),
            _ => (slot(start, AnchorSlot::Absent), slot(end, AnchorSlot::Absent)),
        };

        if let (AnchorSlot::Existing(s), AnchorSlot::Existing(e)) = (start, end) {
            let offsets = (
                self.anchors.get(s).and_then(|a| a.offset()),
                self.anchors.get(e).and_then(|a| a.offset()),
            );
            if let (Some(start), Some(end)) = offsets {
                if start > end {
                    return Err(GraphError::InvalidInterval { start, end });
                }
            }
        }

        Ok(Placement {
            layer,
            parent,
            start,
            end,
        })
    }

    /// Write a validated placement: create planned anchors, settle the id,
    /// then index the annotation four ways
    pub(crate) fn commit(
        &mut self,
        id: Option<String>,
        label: String,
        extra: Attributes,
        placement: Placement,
    ) -> Result<AnnotationHandle> {
        let pending = id.as_deref();
        let start = match placement.start {
            AnchorSlot::Existing(h) => Some(h),
            AnchorSlot::Fresh => Some(self.create_anchor_avoiding(None, pending)?),
            AnchorSlot::SameAsStart | AnchorSlot::Absent => None,
        };
        let end = match placement.end {
            AnchorSlot::Existing(h) => Some(h),
            AnchorSlot::Fresh => Some(self.create_anchor_avoiding(None, pending)?),
            AnchorSlot::SameAsStart => start,
            AnchorSlot::Absent => None,
        };
        let id = match id {
            Some(id) => id,
            None => self.allocate_id_where(|_| false),
        };

        let handle = AnnotationHandle::new(self.annotations.len());
        let layer = placement.layer;
        trace!("Indexing annotation '{}' on {} as {}", id, layer, handle);

        self.by_id.insert(id.clone(), handle);
        if let Some(def) = self.schema.get_mut(layer) {
            def.annotations.push(handle);
        }
        match placement.parent {
            Some(parent) => {
                if let Some(p) = self.annotations.get_mut(parent.index()) {
                    p.children.list_mut(layer).push(handle);
                }
            }
            None => self.top_level.list_mut(layer).push(handle),
        }
        if let Some(anchor) = start.and_then(|h| self.anchors.get_mut(h)) {
            anchor.start_of.entry(layer).or_default().push(handle);
        }
        if let Some(anchor) = end.and_then(|h| self.anchors.get_mut(h)) {
            anchor.end_of.entry(layer).or_default().push(handle);
        }

        self.annotations.push(Annotation {
            id,
            layer,
            label,
            start,
            end,
            parent: placement.parent,
            children: ChildLists::new(),
            extra,
        });
        Ok(handle)
    }

    /// Register an (initially empty) child list on `layer` under `parent`,
    /// or a graph-scope list when `parent` is `None`
    pub(crate) fn register_child_list(&mut self, parent: Option<AnnotationHandle>, layer: LayerHandle) {
        match parent {
            Some(p) => {
                if let Some(p) = self.annotations.get_mut(p.index()) {
                    p.children.list_mut(layer);
                }
            }
            None => {
                self.top_level.list_mut(layer);
            }
        }
    }

    pub(crate) fn anchors_mut(&mut self) -> &mut AnchorStore {
        &mut self.anchors
    }

    pub(crate) fn log_summary(&self, what: &str) {
        debug!(
            "{} graph '{}': {} layers, {} anchors, {} annotations",
            what,
            self.id.as_deref().unwrap_or_default(),
            self.schema.len(),
            self.anchors.len(),
            self.annotations.len()
        );
    }
}

fn slot(anchor: Option<AnchorHandle>, missing: AnchorSlot) -> AnchorSlot {
    anchor.map(AnchorSlot::Existing).unwrap_or(missing)
}
