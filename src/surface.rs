use crate::geometry::LonLat;
use crate::palette::Color;
use slab::Slab;
use std::collections::BTreeMap;

/// Opaque identifier for one event binding installed on the surface. The
/// overlay keeps the tokens it allocated and only ever unbinds those, never
/// touching bindings owned by other map components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerToken(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PopupId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    PointerDown,
    PointerMove,
    PointerUp,
    /// Delivered when the surface loses pointer tracking mid-gesture (window
    /// blur, pointer leaving the canvas). Never bound explicitly.
    PointerCaptureLost,
    Click,
    HoverEnter,
    HoverLeave,
    ZoomEnd,
}

/// Data payload of one drawable source.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceData {
    /// Closed polygon ring (first vertex repeated last).
    Ring(Vec<LonLat>),
    /// Single point.
    Point(LonLat),
    /// Point collection with per-feature colors.
    Points(Vec<MarkerPoint>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerPoint {
    pub position: LonLat,
    pub color: Color,
}

/// Paint rule attached to a layer exactly once, when the layer is created.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Fill {
        color: Color,
        opacity: f32,
    },
    Line {
        color: Color,
        width: f32,
        opacity: f32,
    },
    Circle {
        radius_px: f32,
        /// `None` means the per-feature color of the source is used.
        color: Option<Color>,
        stroke_color: Color,
        stroke_width: f32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayerSpec {
    pub id: String,
    pub source: String,
    pub paint: Paint,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PopupSpec {
    pub anchor: LonLat,
    pub title: String,
    /// Label/value pairs; rows for absent attributes are omitted entirely.
    pub rows: Vec<(String, String)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Default,
    Pointer,
}

/// One event delivered by the host's map event loop.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceEvent {
    pub kind: EventKind,
    pub position: LonLat,
    /// Topmost layer under the pointer, if any.
    pub hit_layer: Option<String>,
    /// Feature index within the hit layer's source, for point collections.
    pub feature_index: Option<usize>,
    /// Whether the pointer was inside the rendered region of an open popup.
    pub in_popup: bool,
}

impl SurfaceEvent {
    pub fn new(kind: EventKind, position: LonLat) -> Self {
        Self {
            kind,
            position,
            hit_layer: None,
            feature_index: None,
            in_popup: false,
        }
    }

    pub fn with_hit(mut self, layer: &str) -> Self {
        self.hit_layer = Some(layer.to_string());
        self
    }

    pub fn with_feature(mut self, index: usize) -> Self {
        self.feature_index = Some(index);
        self
    }

    pub fn inside_popup(mut self) -> Self {
        self.in_popup = true;
        self
    }
}

/// The imperative rendering surface the overlay drives: a named source/layer
/// namespace, an event dispatch table, and a camera. Implementations wrap a
/// real map widget; [`RecordingSurface`] is the in-memory reference used by
/// tests and benches.
pub trait MapSurface {
    fn add_source(&mut self, id: &str, data: SourceData);
    fn set_source_data(&mut self, id: &str, data: SourceData);
    /// Removing an absent source is a no-op, not an error.
    fn remove_source(&mut self, id: &str);
    fn has_source(&self, id: &str) -> bool;

    fn add_layer(&mut self, spec: LayerSpec);
    /// Removing an absent layer is a no-op, not an error.
    fn remove_layer(&mut self, id: &str);
    fn has_layer(&self, id: &str) -> bool;

    fn bind(&mut self, kind: EventKind, layer: Option<&str>) -> HandlerToken;
    fn unbind(&mut self, token: HandlerToken);

    fn view_center(&self) -> LonLat;
    /// Animated recenter.
    fn ease_to(&mut self, center: LonLat);

    fn set_cursor(&mut self, cursor: Cursor);
    /// Toggles map panning so a handle drag does not also drag the map.
    fn set_pan_enabled(&mut self, enabled: bool);

    fn open_popup(&mut self, spec: PopupSpec) -> PopupId;
    fn close_popup(&mut self, id: PopupId);
}

/// Operation log entry of [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    AddSource(String),
    SetSourceData(String),
    RemoveSource(String),
    AddLayer(String),
    RemoveLayer(String),
    Bind(EventKind, Option<String>),
    Unbind(EventKind, Option<String>),
    EaseTo(LonLat),
    SetCursor(Cursor),
    SetPanEnabled(bool),
    OpenPopup(String),
    ClosePopup,
}

/// In-memory [`MapSurface`] that keeps full state and an operation log so
/// tests can assert on exactly which mutations a synchronization performed.
#[derive(Debug)]
pub struct RecordingSurface {
    sources: BTreeMap<String, SourceData>,
    layers: BTreeMap<String, LayerSpec>,
    bindings: Slab<(EventKind, Option<String>)>,
    center: LonLat,
    cursor: Cursor,
    pan_enabled: bool,
    next_popup_id: u64,
    popups: BTreeMap<u64, PopupSpec>,
    ops: Vec<SurfaceOp>,
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self {
            sources: BTreeMap::new(),
            layers: BTreeMap::new(),
            bindings: Slab::new(),
            center: LonLat::default(),
            cursor: Cursor::Default,
            pan_enabled: true,
            next_popup_id: 0,
            popups: BTreeMap::new(),
            ops: Vec::new(),
        }
    }
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_view_center(&mut self, center: LonLat) {
        self.center = center;
    }

    pub fn source(&self, id: &str) -> Option<&SourceData> {
        self.sources.get(id)
    }

    pub fn layer(&self, id: &str) -> Option<&LayerSpec> {
        self.layers.get(id)
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn binding_count(&self, kind: EventKind, layer: Option<&str>) -> usize {
        self.bindings
            .iter()
            .filter(|(_, (k, l))| *k == kind && l.as_deref() == layer)
            .count()
    }

    pub fn total_bindings(&self) -> usize {
        self.bindings.len()
    }

    pub fn open_popup_count(&self) -> usize {
        self.popups.len()
    }

    pub fn open_popup_spec(&self) -> Option<&PopupSpec> {
        self.popups.values().next()
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn pan_enabled(&self) -> bool {
        self.pan_enabled
    }

    pub fn ops(&self) -> &[SurfaceOp] {
        &self.ops
    }

    /// Drains the operation log, returning everything recorded so far.
    pub fn take_ops(&mut self) -> Vec<SurfaceOp> {
        std::mem::take(&mut self.ops)
    }

    pub fn ease_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, SurfaceOp::EaseTo(_)))
            .count()
    }
}

impl MapSurface for RecordingSurface {
    fn add_source(&mut self, id: &str, data: SourceData) {
        self.ops.push(SurfaceOp::AddSource(id.to_string()));
        self.sources.insert(id.to_string(), data);
    }

    fn set_source_data(&mut self, id: &str, data: SourceData) {
        if let Some(existing) = self.sources.get_mut(id) {
            self.ops.push(SurfaceOp::SetSourceData(id.to_string()));
            *existing = data;
        }
    }

    fn remove_source(&mut self, id: &str) {
        if self.sources.remove(id).is_some() {
            self.ops.push(SurfaceOp::RemoveSource(id.to_string()));
        }
    }

    fn has_source(&self, id: &str) -> bool {
        self.sources.contains_key(id)
    }

    fn add_layer(&mut self, spec: LayerSpec) {
        self.ops.push(SurfaceOp::AddLayer(spec.id.clone()));
        self.layers.insert(spec.id.clone(), spec);
    }

    fn remove_layer(&mut self, id: &str) {
        if self.layers.remove(id).is_some() {
            self.ops.push(SurfaceOp::RemoveLayer(id.to_string()));
        }
    }

    fn has_layer(&self, id: &str) -> bool {
        self.layers.contains_key(id)
    }

    fn bind(&mut self, kind: EventKind, layer: Option<&str>) -> HandlerToken {
        self.ops
            .push(SurfaceOp::Bind(kind, layer.map(str::to_string)));
        HandlerToken(self.bindings.insert((kind, layer.map(str::to_string))))
    }

    fn unbind(&mut self, token: HandlerToken) {
        if self.bindings.contains(token.0) {
            let (kind, layer) = self.bindings.remove(token.0);
            self.ops.push(SurfaceOp::Unbind(kind, layer));
        }
    }

    fn view_center(&self) -> LonLat {
        self.center
    }

    fn ease_to(&mut self, center: LonLat) {
        self.ops.push(SurfaceOp::EaseTo(center));
        self.center = center;
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        self.ops.push(SurfaceOp::SetCursor(cursor));
        self.cursor = cursor;
    }

    fn set_pan_enabled(&mut self, enabled: bool) {
        self.ops.push(SurfaceOp::SetPanEnabled(enabled));
        self.pan_enabled = enabled;
    }

    fn open_popup(&mut self, spec: PopupSpec) -> PopupId {
        let id = self.next_popup_id;
        self.next_popup_id += 1;
        self.ops.push(SurfaceOp::OpenPopup(spec.title.clone()));
        self.popups.insert(id, spec);
        PopupId(id)
    }

    fn close_popup(&mut self, id: PopupId) {
        if self.popups.remove(&id.0).is_some() {
            self.ops.push(SurfaceOp::ClosePopup);
        }
    }
}
