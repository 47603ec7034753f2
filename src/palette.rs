use crate::model::ResultPoint;
use hashlink::LinkedHashMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }
}

/// Marker colors handed out to devices in first-seen order. Cycles when a
/// result set contains more devices than the palette has entries.
pub const DEVICE_PALETTE: [Color; 8] = [
    Color::rgb(211, 47, 47),  // red
    Color::rgb(25, 118, 210), // blue
    Color::rgb(56, 142, 60),  // green
    Color::rgb(245, 124, 0),  // orange
    Color::rgb(123, 31, 162), // purple
    Color::rgb(0, 121, 107),  // teal
    Color::rgb(194, 24, 91),  // pink
    Color::rgb(93, 64, 55),   // brown
];

/// Assign a palette color to every device appearing in `results`, in
/// first-seen order. Recomputed from scratch for each result set, so the same
/// device may receive a different color in a later search.
pub fn assign_device_colors(results: &[ResultPoint], palette: &[Color]) -> LinkedHashMap<i64, Color> {
    let palette = if palette.is_empty() {
        &DEVICE_PALETTE[..]
    } else {
        palette
    };
    let mut colors = LinkedHashMap::new();
    for point in results {
        let next = colors.len() % palette.len();
        colors.entry(point.device_id).or_insert(palette[next]);
    }
    colors
}
