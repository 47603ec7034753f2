mod common;

use common::{result, search};
use radius_overlay::geometry::{distance_m, handle_point, LonLat};
use radius_overlay::surface::SourceData;
use radius_overlay::{
    EventKind, OverlayCommand, OverlayOptions, RadiusOverlay, RecordingSurface, Role, SurfaceEvent,
};

const CENTER: LonLat = LonLat { lon: 0.0, lat: 0.0 };

fn active_overlay() -> (RadiusOverlay, RecordingSurface) {
    let mut overlay = RadiusOverlay::with_session("drag", OverlayOptions::default());
    let mut surface = RecordingSurface::new();
    overlay.render(&mut surface, Some(&search(0.0, 0.0, 1000.0)), Some(&[]));
    (overlay, surface)
}

fn press_handle(overlay: &mut RadiusOverlay, surface: &mut RecordingSurface) {
    let event = SurfaceEvent::new(EventKind::PointerDown, handle_point(CENTER, 1000.0))
        .with_hit(&overlay.layer_id(Role::ResizeHandle));
    assert_eq!(overlay.handle_event(surface, &event), None);
}

#[test]
fn drag_east_commits_doubled_radius() {
    let (mut overlay, mut surface) = active_overlay();

    press_handle(&mut overlay, &mut surface);
    assert!(!surface.pan_enabled());
    assert_eq!(surface.binding_count(EventKind::PointerMove, None), 1);
    assert_eq!(surface.binding_count(EventKind::PointerUp, None), 1);

    let target = handle_point(CENTER, 2000.0);
    let moved = overlay.handle_event(
        &mut surface,
        &SurfaceEvent::new(EventKind::PointerMove, target),
    );
    assert_eq!(moved, None);

    let command = overlay.handle_event(
        &mut surface,
        &SurfaceEvent::new(EventKind::PointerUp, target),
    );
    let Some(OverlayCommand::CommitRadius(info)) = command else {
        panic!("expected a commit, got {command:?}");
    };
    assert!((info.radius - 2000.0).abs() < 2.0, "radius {}", info.radius);
    assert_eq!(info.longitude, 0.0);
    assert_eq!(info.latitude, 0.0);

    assert!(surface.pan_enabled());
    assert_eq!(surface.binding_count(EventKind::PointerMove, None), 0);
    assert_eq!(surface.binding_count(EventKind::PointerUp, None), 0);
}

#[test]
fn pointer_move_previews_the_ring_without_committing() {
    let (mut overlay, mut surface) = active_overlay();
    press_handle(&mut overlay, &mut surface);

    let target = handle_point(CENTER, 3000.0);
    overlay.handle_event(
        &mut surface,
        &SurfaceEvent::new(EventKind::PointerMove, target),
    );

    let fill = surface.source(&overlay.source_id(Role::RadiusFill)).unwrap();
    let SourceData::Ring(ring) = fill else {
        panic!("fill source is not a ring");
    };
    let d = distance_m(CENTER, ring[0]);
    assert!((d - 3000.0).abs() < 30.0, "preview ring at {d} m");

    let handle = surface
        .source(&overlay.source_id(Role::ResizeHandle))
        .unwrap();
    let SourceData::Point(p) = handle else {
        panic!("handle source is not a point");
    };
    let d = distance_m(CENTER, *p);
    assert!((d - 3000.0).abs() < 30.0, "preview handle at {d} m");
}

#[test]
fn pointer_down_off_the_handle_starts_nothing() {
    let (mut overlay, mut surface) = active_overlay();

    let miss = SurfaceEvent::new(EventKind::PointerDown, CENTER);
    overlay.handle_event(&mut surface, &miss);
    let wrong_layer = SurfaceEvent::new(EventKind::PointerDown, CENTER)
        .with_hit(&overlay.layer_id(Role::CenterMarker));
    overlay.handle_event(&mut surface, &wrong_layer);

    assert!(surface.pan_enabled());
    assert_eq!(surface.binding_count(EventKind::PointerMove, None), 0);
}

#[test]
fn second_pointer_down_mid_drag_is_ignored() {
    let (mut overlay, mut surface) = active_overlay();
    press_handle(&mut overlay, &mut surface);
    press_handle(&mut overlay, &mut surface);

    assert_eq!(surface.binding_count(EventKind::PointerMove, None), 1);
    assert_eq!(surface.binding_count(EventKind::PointerUp, None), 1);
}

#[test]
fn search_change_mid_drag_drops_the_commit() {
    let (mut overlay, mut surface) = active_overlay();
    press_handle(&mut overlay, &mut surface);

    // The search parameters change underneath the active drag.
    overlay.render(&mut surface, Some(&search(0.0, 0.0, 500.0)), Some(&[]));
    assert!(surface.pan_enabled());

    let command = overlay.handle_event(
        &mut surface,
        &SurfaceEvent::new(EventKind::PointerUp, handle_point(CENTER, 2000.0)),
    );
    assert_eq!(command, None);
}

#[test]
fn clearing_the_search_mid_drag_aborts_the_session() {
    let (mut overlay, mut surface) = active_overlay();
    press_handle(&mut overlay, &mut surface);

    overlay.render(&mut surface, None, None);
    assert!(surface.pan_enabled());
    assert_eq!(surface.total_bindings(), 0);

    let command = overlay.handle_event(
        &mut surface,
        &SurfaceEvent::new(EventKind::PointerUp, handle_point(CENTER, 2000.0)),
    );
    assert_eq!(command, None);
}

#[test]
fn pointer_capture_loss_aborts_without_commit() {
    let (mut overlay, mut surface) = active_overlay();
    press_handle(&mut overlay, &mut surface);

    overlay.handle_event(
        &mut surface,
        &SurfaceEvent::new(EventKind::PointerCaptureLost, CENTER),
    );
    assert!(surface.pan_enabled());
    assert_eq!(surface.binding_count(EventKind::PointerMove, None), 0);

    let command = overlay.handle_event(
        &mut surface,
        &SurfaceEvent::new(EventKind::PointerUp, handle_point(CENTER, 2000.0)),
    );
    assert_eq!(command, None);
}

#[test]
fn results_update_keeps_the_drag_alive() {
    let (mut overlay, mut surface) = active_overlay();
    press_handle(&mut overlay, &mut surface);

    // Same search, new results: the session is still valid.
    let results = vec![result(1, 10, 0.001, 0.001)];
    overlay.render(&mut surface, Some(&search(0.0, 0.0, 1000.0)), Some(&results));

    let command = overlay.handle_event(
        &mut surface,
        &SurfaceEvent::new(EventKind::PointerUp, handle_point(CENTER, 2000.0)),
    );
    let Some(OverlayCommand::CommitRadius(info)) = command else {
        panic!("expected a commit, got {command:?}");
    };
    assert!((info.radius - 2000.0).abs() < 2.0);
}
