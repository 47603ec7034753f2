use crate::drag::{DragController, RadiusPreview};
use crate::geometry::{circle_ring, handle_point, LonLat};
use crate::model::{ResultPoint, SearchInfo};
use crate::options::OverlayOptions;
use crate::palette::{assign_device_colors, Color};
use crate::popup::PopupController;
use crate::surface::{
    Cursor, EventKind, HandlerToken, LayerSpec, MapSurface, MarkerPoint, Paint, SourceData,
    SurfaceEvent,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SESSION: AtomicU64 = AtomicU64::new(0);

const WHITE: Color = Color::rgb(255, 255, 255);

/// The five drawable primitives the overlay owns on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    RadiusFill,
    RadiusOutline,
    CenterMarker,
    ResizeHandle,
    ResultMarkers,
}

impl Role {
    /// Draw order. The handle and result markers come last so they win
    /// hit-testing over the fill and outline.
    pub const DRAW_ORDER: [Role; 5] = [
        Role::RadiusFill,
        Role::RadiusOutline,
        Role::CenterMarker,
        Role::ResizeHandle,
        Role::ResultMarkers,
    ];

    fn suffix(self) -> &'static str {
        match self {
            Role::RadiusFill => "radius-fill",
            Role::RadiusOutline => "radius-outline",
            Role::CenterMarker => "center",
            Role::ResizeHandle => "handle",
            Role::ResultMarkers => "results",
        }
    }
}

/// Event bindings the overlay installs on the surface, tracked by token so
/// teardown releases exactly what was bound and re-synchronizations never
/// bind twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Binding {
    SurfaceClick,
    Zoom,
    MarkerClick,
    MarkerEnter,
    MarkerLeave,
    HandleDown,
    DragMove,
    DragUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OverlayState {
    Idle,
    Active,
}

/// Command returned from [`RadiusOverlay::handle_event`] for the host to act
/// on. Committing a resized radius means updating the application's search
/// state and calling [`RadiusOverlay::render`] again with the new info.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayCommand {
    CommitRadius(SearchInfo),
}

/// Synchronizes the radius-search overlay (circle, center, resize handle,
/// result markers) against a [`MapSurface`], and routes pointer events to the
/// drag and popup controllers.
///
/// All surface mutation is driven by [`RadiusOverlay::render`]: the desired
/// primitive set implied by `(search, results)` is diffed against what is
/// installed, updating data in place where possible so event bindings
/// survive, and removing primitives (layer before source) that are no longer
/// wanted.
#[derive(Debug)]
pub struct RadiusOverlay {
    session: String,
    options: OverlayOptions,
    state: OverlayState,
    search: Option<SearchInfo>,
    results: Vec<ResultPoint>,
    /// Bumped whenever the active search changes or clears; invalidates drag
    /// sessions started under an older search.
    epoch: u64,
    bindings: HashMap<Binding, HandlerToken>,
    drag: DragController,
    popup: PopupController,
    pan_disabled: bool,
}

impl RadiusOverlay {
    pub fn new() -> Self {
        Self::with_options(OverlayOptions::default())
    }

    pub fn with_options(options: OverlayOptions) -> Self {
        let session = format!(
            "radius-search-{}",
            NEXT_SESSION.fetch_add(1, Ordering::Relaxed)
        );
        Self::with_session(session, options)
    }

    /// Uses a caller-chosen session id instead of a generated one. The id
    /// prefixes every source and layer id the overlay installs.
    pub fn with_session(session: impl Into<String>, options: OverlayOptions) -> Self {
        Self {
            session: session.into(),
            options,
            state: OverlayState::Idle,
            search: None,
            results: Vec::new(),
            epoch: 0,
            bindings: HashMap::new(),
            drag: DragController::default(),
            popup: PopupController::default(),
            pan_disabled: false,
        }
    }

    pub fn session(&self) -> &str {
        &self.session
    }

    pub fn is_active(&self) -> bool {
        self.state == OverlayState::Active
    }

    pub fn source_id(&self, role: Role) -> String {
        format!("{}-{}", self.session, role.suffix())
    }

    pub fn layer_id(&self, role: Role) -> String {
        format!("{}-{}-layer", self.session, role.suffix())
    }

    /// Sole state entry point. `None` for either argument clears the overlay;
    /// otherwise the installed primitives are reconciled with the given
    /// search and results.
    pub fn render<S: MapSurface>(
        &mut self,
        surface: &mut S,
        search: Option<&SearchInfo>,
        results: Option<&[ResultPoint]>,
    ) {
        let search = search.copied().filter(SearchInfo::has_finite_coordinates);
        let search_changed = self.search != search;
        if search_changed {
            self.epoch = self.epoch.wrapping_add(1);
            self.cancel_drag(surface);
        }

        let (Some(info), Some(results)) = (search, results) else {
            self.deactivate(surface);
            return;
        };

        let results_changed = self.results.as_slice() != results;
        if (search_changed || results_changed) && self.popup.is_open() {
            // Whatever the popup was describing may no longer exist.
            self.popup.close(surface);
        }
        self.search = Some(info);
        self.results = results.to_vec();
        if self.state == OverlayState::Idle {
            tracing::debug!(session = %self.session, "activating radius overlay");
        }
        self.state = OverlayState::Active;

        self.sync(surface);

        if !self.results.is_empty() {
            self.maybe_recenter(surface, info.center());
        }
    }

    /// Event entry point; the host forwards surface events here. Returns a
    /// command when the event completed a radius drag.
    pub fn handle_event<S: MapSurface>(
        &mut self,
        surface: &mut S,
        event: &SurfaceEvent,
    ) -> Option<OverlayCommand> {
        if self.state != OverlayState::Active {
            return None;
        }
        match event.kind {
            EventKind::PointerDown => {
                self.on_pointer_down(surface, event);
                None
            }
            EventKind::PointerMove => {
                if let Some(preview) = self.drag.pointer_move(event.position) {
                    self.redraw_preview(surface, preview);
                }
                None
            }
            EventKind::PointerUp => self.on_pointer_up(surface, event),
            EventKind::PointerCaptureLost => {
                if self.drag.is_dragging() {
                    self.cancel_drag(surface);
                }
                None
            }
            EventKind::Click => {
                self.on_click(surface, event);
                None
            }
            EventKind::HoverEnter => {
                if self.hits(event, Role::ResultMarkers)
                    && self.bindings.contains_key(&Binding::MarkerEnter)
                {
                    surface.set_cursor(Cursor::Pointer);
                }
                None
            }
            EventKind::HoverLeave => {
                if self.hits(event, Role::ResultMarkers)
                    && self.bindings.contains_key(&Binding::MarkerLeave)
                {
                    surface.set_cursor(Cursor::Default);
                }
                None
            }
            EventKind::ZoomEnd => {
                // An anchored popup is misleading after a projection change.
                self.popup.close(surface);
                None
            }
        }
    }

    /// Component teardown: removes every primitive and binding the overlay
    /// installed, closes any popup, and aborts any drag session. Idempotent.
    pub fn detach<S: MapSurface>(&mut self, surface: &mut S) {
        self.deactivate(surface);
    }

    fn on_pointer_down<S: MapSurface>(&mut self, surface: &mut S, event: &SurfaceEvent) {
        if !self.hits(event, Role::ResizeHandle)
            || !self.bindings.contains_key(&Binding::HandleDown)
        {
            return;
        }
        let Some(info) = self.search else {
            return;
        };
        if self.drag.begin(info.center(), info.radius, self.epoch) {
            tracing::debug!(radius = info.radius, "drag session started");
            surface.set_pan_enabled(false);
            self.pan_disabled = true;
            self.bind_once(surface, Binding::DragMove, EventKind::PointerMove, None);
            self.bind_once(surface, Binding::DragUp, EventKind::PointerUp, None);
        }
    }

    fn on_pointer_up<S: MapSurface>(
        &mut self,
        surface: &mut S,
        event: &SurfaceEvent,
    ) -> Option<OverlayCommand> {
        if !self.drag.is_dragging() {
            return None;
        }
        let committed = self.drag.pointer_up(event.position, self.epoch);
        self.cancel_drag(surface);
        let info = self.search?;
        committed.map(|radius| {
            tracing::debug!(radius, "committing resized radius");
            OverlayCommand::CommitRadius(SearchInfo { radius, ..info })
        })
    }

    fn on_click<S: MapSurface>(&mut self, surface: &mut S, event: &SurfaceEvent) {
        if self.hits(event, Role::ResultMarkers)
            && self.bindings.contains_key(&Binding::MarkerClick)
        {
            // Marker clicks never fall through to the general handler.
            if let Some(result) = event.feature_index.and_then(|i| self.results.get(i)) {
                let result = result.clone();
                self.popup.open_for(surface, &result);
            }
        } else if self.bindings.contains_key(&Binding::SurfaceClick) && !event.in_popup {
            self.popup.close(surface);
        }
    }

    /// Reconciles the five roles against the surface in draw order.
    fn sync<S: MapSurface>(&mut self, surface: &mut S) {
        let Some(info) = self.search else {
            return;
        };
        let center = info.center();
        let ring = circle_ring(center, info.radius, self.options.circle_steps);
        let handle = handle_point(center, info.radius);
        let colors = assign_device_colors(&self.results, &self.options.palette);
        let accent = self.options.accent_color;

        self.bind_once(surface, Binding::SurfaceClick, EventKind::Click, None);
        self.bind_once(surface, Binding::Zoom, EventKind::ZoomEnd, None);

        for role in Role::DRAW_ORDER {
            let desired = match role {
                Role::RadiusFill => Some((
                    SourceData::Ring(ring.clone()),
                    Paint::Fill {
                        color: accent,
                        opacity: 0.1,
                    },
                )),
                Role::RadiusOutline => Some((
                    SourceData::Ring(ring.clone()),
                    Paint::Line {
                        color: accent,
                        width: 2.0,
                        opacity: 0.8,
                    },
                )),
                Role::CenterMarker => Some((
                    SourceData::Point(center),
                    Paint::Circle {
                        radius_px: 6.0,
                        color: Some(accent),
                        stroke_color: WHITE,
                        stroke_width: 2.0,
                    },
                )),
                Role::ResizeHandle => Some((
                    SourceData::Point(handle),
                    Paint::Circle {
                        radius_px: 7.0,
                        color: Some(WHITE),
                        stroke_color: accent,
                        stroke_width: 2.0,
                    },
                )),
                Role::ResultMarkers => {
                    if self.results.is_empty() {
                        None
                    } else {
                        let markers = self
                            .results
                            .iter()
                            .map(|r| MarkerPoint {
                                position: r.position(),
                                color: colors
                                    .get(&r.device_id)
                                    .copied()
                                    .unwrap_or(self.options.accent_color),
                            })
                            .collect();
                        Some((
                            SourceData::Points(markers),
                            Paint::Circle {
                                radius_px: self.options.marker_radius_px,
                                color: None,
                                stroke_color: WHITE,
                                stroke_width: 2.0,
                            },
                        ))
                    }
                }
            };
            match desired {
                Some((data, paint)) => self.install(surface, role, data, paint),
                None => self.remove_role(surface, role),
            }
        }
    }

    /// Updates a primitive's data in place when its container is already
    /// installed (so existing bindings survive), creating container and paint
    /// rule otherwise.
    fn install<S: MapSurface>(
        &mut self,
        surface: &mut S,
        role: Role,
        data: SourceData,
        paint: Paint,
    ) {
        let source = self.source_id(role);
        let layer = self.layer_id(role);
        if surface.has_source(&source) {
            surface.set_source_data(&source, data);
        } else {
            surface.add_source(&source, data);
        }
        if !surface.has_layer(&layer) {
            surface.add_layer(LayerSpec {
                id: layer,
                source,
                paint,
            });
            self.on_layer_installed(surface, role);
        }
    }

    fn on_layer_installed<S: MapSurface>(&mut self, surface: &mut S, role: Role) {
        let layer = self.layer_id(role);
        match role {
            Role::ResizeHandle => {
                self.bind_once(surface, Binding::HandleDown, EventKind::PointerDown, Some(&layer));
            }
            Role::ResultMarkers => {
                self.bind_once(surface, Binding::MarkerClick, EventKind::Click, Some(&layer));
                self.bind_once(surface, Binding::MarkerEnter, EventKind::HoverEnter, Some(&layer));
                self.bind_once(surface, Binding::MarkerLeave, EventKind::HoverLeave, Some(&layer));
            }
            _ => {}
        }
    }

    /// Removes one primitive: paint rule first, data container second, then
    /// any bindings attached to its layer. A primitive that is not installed
    /// is left alone.
    fn remove_role<S: MapSurface>(&mut self, surface: &mut S, role: Role) {
        let layer = self.layer_id(role);
        let source = self.source_id(role);
        if surface.has_layer(&layer) {
            surface.remove_layer(&layer);
        }
        if surface.has_source(&source) {
            surface.remove_source(&source);
        }
        match role {
            Role::ResizeHandle => {
                self.unbind_one(surface, Binding::HandleDown);
                if self.drag.is_dragging() {
                    self.cancel_drag(surface);
                }
            }
            Role::ResultMarkers => {
                self.unbind_one(surface, Binding::MarkerClick);
                self.unbind_one(surface, Binding::MarkerEnter);
                self.unbind_one(surface, Binding::MarkerLeave);
            }
            _ => {}
        }
    }

    fn deactivate<S: MapSurface>(&mut self, surface: &mut S) {
        if self.state == OverlayState::Active {
            tracing::debug!(session = %self.session, "tearing down radius overlay");
        }
        // Reverse dependency order: topmost primitives come off first.
        for role in Role::DRAW_ORDER.iter().rev() {
            self.remove_role(surface, *role);
        }
        self.unbind_one(surface, Binding::SurfaceClick);
        self.unbind_one(surface, Binding::Zoom);
        self.cancel_drag(surface);
        self.popup.close(surface);
        self.state = OverlayState::Idle;
        self.search = None;
        self.results.clear();
    }

    /// Redraws the circle and handle at the drag preview radius without
    /// touching the committed search state.
    fn redraw_preview<S: MapSurface>(&mut self, surface: &mut S, preview: RadiusPreview) {
        let ring = circle_ring(preview.center, preview.radius_m, self.options.circle_steps);
        surface.set_source_data(
            &self.source_id(Role::RadiusFill),
            SourceData::Ring(ring.clone()),
        );
        surface.set_source_data(&self.source_id(Role::RadiusOutline), SourceData::Ring(ring));
        surface.set_source_data(
            &self.source_id(Role::ResizeHandle),
            SourceData::Point(handle_point(preview.center, preview.radius_m)),
        );
    }

    /// Recenters the view on the search location when the camera has wandered
    /// more than the configured threshold away from it.
    fn maybe_recenter<S: MapSurface>(&self, surface: &mut S, center: LonLat) {
        let view = surface.view_center();
        let delta = (view.lat - center.lat)
            .abs()
            .max((view.lon - center.lon).abs());
        if delta > self.options.recenter_threshold_deg {
            tracing::debug!(delta, "recentering on search location");
            surface.ease_to(center);
        }
    }

    fn bind_once<S: MapSurface>(
        &mut self,
        surface: &mut S,
        binding: Binding,
        kind: EventKind,
        layer: Option<&str>,
    ) {
        if !self.bindings.contains_key(&binding) {
            let token = surface.bind(kind, layer);
            self.bindings.insert(binding, token);
        }
    }

    fn unbind_one<S: MapSurface>(&mut self, surface: &mut S, binding: Binding) {
        if let Some(token) = self.bindings.remove(&binding) {
            surface.unbind(token);
        }
    }

    fn cancel_drag<S: MapSurface>(&mut self, surface: &mut S) {
        if self.drag.abort() {
            tracing::debug!("drag session aborted");
        }
        self.unbind_one(surface, Binding::DragMove);
        self.unbind_one(surface, Binding::DragUp);
        if self.pan_disabled {
            surface.set_pan_enabled(true);
            self.pan_disabled = false;
        }
    }

    fn hits(&self, event: &SurfaceEvent, role: Role) -> bool {
        event.hit_layer.as_deref() == Some(self.layer_id(role).as_str())
    }
}

impl Default for RadiusOverlay {
    fn default() -> Self {
        Self::new()
    }
}
