use crate::geometry::DEFAULT_CIRCLE_STEPS;
use crate::palette::Color;
use serde::{Deserialize, Serialize};

/// Tunables for the overlay. Every field has a sensible default so a partial
/// settings document deserializes cleanly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayOptions {
    /// Vertex count of the radius circle polygon.
    #[serde(default = "default_circle_steps")]
    pub circle_steps: u32,
    /// Recenter the view when it is further than this (degrees, max of the
    /// latitude and longitude deltas) from the search center.
    #[serde(default = "default_recenter_threshold_deg")]
    pub recenter_threshold_deg: f64,
    /// Screen radius of result markers in pixels.
    #[serde(default = "default_marker_radius_px")]
    pub marker_radius_px: f32,
    /// Accent color for the circle fill, outline, and center marker.
    #[serde(default = "default_accent_color")]
    pub accent_color: Color,
    /// Overrides the built-in device marker palette when non-empty.
    #[serde(default)]
    pub palette: Vec<Color>,
}

fn default_circle_steps() -> u32 {
    DEFAULT_CIRCLE_STEPS
}

fn default_recenter_threshold_deg() -> f64 {
    0.01
}

fn default_marker_radius_px() -> f32 {
    8.0
}

fn default_accent_color() -> Color {
    Color::rgb(25, 118, 210)
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            circle_steps: default_circle_steps(),
            recenter_threshold_deg: default_recenter_threshold_deg(),
            marker_radius_px: default_marker_radius_px(),
            accent_color: default_accent_color(),
            palette: Vec::new(),
        }
    }
}
