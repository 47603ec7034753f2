use crate::geometry::{distance_m, LonLat};

/// Smallest radius a drag may commit. A zero radius would make the committed
/// search undrawable.
const MIN_COMMIT_RADIUS_M: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        center_at_start: LonLat,
        radius_at_start: f64,
        /// Overlay epoch captured at pointer-down. A commit is only valid
        /// while the overlay is still on the same epoch.
        epoch: u64,
    },
}

/// Local, non-committing redraw request emitted while a drag is in progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiusPreview {
    pub center: LonLat,
    pub radius_m: f64,
}

/// Gesture state machine for resizing the search circle: Idle -> Dragging on
/// pointer-down over the handle, back to Idle on pointer-up (commit) or abort.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Starts a session. Returns `false` (and changes nothing) when a session
    /// is already active; only one drag may run at a time.
    pub fn begin(&mut self, center: LonLat, radius_m: f64, epoch: u64) -> bool {
        if self.is_dragging() {
            return false;
        }
        self.state = DragState::Dragging {
            center_at_start: center,
            radius_at_start: radius_m,
            epoch,
        };
        true
    }

    /// Recomputes the radius from the pointer position. `None` when idle.
    pub fn pointer_move(&self, position: LonLat) -> Option<RadiusPreview> {
        let DragState::Dragging {
            center_at_start, ..
        } = self.state
        else {
            return None;
        };
        Some(RadiusPreview {
            center: center_at_start,
            radius_m: distance_m(center_at_start, position),
        })
    }

    /// Ends the session and returns the final radius, or `None` when idle or
    /// when the overlay has moved to a newer epoch since pointer-down (the
    /// commit would be stale and is dropped).
    pub fn pointer_up(&mut self, position: LonLat, current_epoch: u64) -> Option<f64> {
        let DragState::Dragging {
            center_at_start,
            epoch,
            ..
        } = self.state
        else {
            return None;
        };
        self.state = DragState::Idle;
        if epoch != current_epoch {
            tracing::debug!(epoch, current_epoch, "dropping stale drag commit");
            return None;
        }
        Some(distance_m(center_at_start, position).max(MIN_COMMIT_RADIUS_M))
    }

    /// Cancels an active session without committing. Returns whether a
    /// session was active.
    pub fn abort(&mut self) -> bool {
        let was_dragging = self.is_dragging();
        self.state = DragState::Idle;
        was_dragging
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::handle_point;

    const CENTER: LonLat = LonLat { lon: 0.0, lat: 0.0 };

    #[test]
    fn full_session_commits_final_radius() {
        let mut drag = DragController::default();
        assert!(drag.begin(CENTER, 1000.0, 1));

        let preview = drag
            .pointer_move(handle_point(CENTER, 1500.0))
            .expect("dragging");
        assert!((preview.radius_m - 1500.0).abs() < 2.0);

        let committed = drag
            .pointer_up(handle_point(CENTER, 2000.0), 1)
            .expect("commit");
        assert!((committed - 2000.0).abs() < 2.0);
        assert!(!drag.is_dragging());
    }

    #[test]
    fn second_pointer_down_is_ignored() {
        let mut drag = DragController::default();
        assert!(drag.begin(CENTER, 1000.0, 1));
        assert!(!drag.begin(LonLat::new(5.0, 5.0), 9999.0, 1));
        match drag.state() {
            DragState::Dragging {
                radius_at_start, ..
            } => assert_eq!(radius_at_start, 1000.0),
            DragState::Idle => panic!("session lost"),
        }
    }

    #[test]
    fn stale_epoch_drops_commit() {
        let mut drag = DragController::default();
        drag.begin(CENTER, 1000.0, 1);
        assert_eq!(drag.pointer_up(handle_point(CENTER, 2000.0), 2), None);
        assert!(!drag.is_dragging());
    }

    #[test]
    fn commit_radius_never_collapses_to_zero() {
        let mut drag = DragController::default();
        drag.begin(CENTER, 1000.0, 1);
        let committed = drag.pointer_up(CENTER, 1).expect("commit");
        assert_eq!(committed, MIN_COMMIT_RADIUS_M);
    }

    #[test]
    fn move_and_up_while_idle_do_nothing() {
        let mut drag = DragController::default();
        assert_eq!(drag.pointer_move(CENTER), None);
        assert_eq!(drag.pointer_up(CENTER, 0), None);
    }

    #[test]
    fn abort_discards_the_session() {
        let mut drag = DragController::default();
        drag.begin(CENTER, 1000.0, 1);
        assert!(drag.abort());
        assert!(!drag.abort());
        assert_eq!(drag.pointer_up(handle_point(CENTER, 2000.0), 1), None);
    }
}
