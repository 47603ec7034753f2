//! Interactive radius-search overlay for a shared map rendering surface:
//! a search circle, a draggable resize handle, result markers with popups,
//! and a viewport fit heuristic, all reconciled against the surface from a
//! declarative `(search, results)` description.

pub mod drag;
pub mod geocode;
pub mod geometry;
pub mod logging;
pub mod model;
pub mod options;
pub mod overlay;
pub mod palette;
pub mod popup;
pub mod query;
pub mod surface;

pub use model::{ResultPoint, SearchInfo};
pub use options::OverlayOptions;
pub use overlay::{OverlayCommand, RadiusOverlay, Role};
pub use surface::{EventKind, MapSurface, RecordingSurface, SurfaceEvent};
