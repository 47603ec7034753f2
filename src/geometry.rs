use serde::{Deserialize, Serialize};

pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Default vertex count for the radius circle polygon.
pub const DEFAULT_CIRCLE_STEPS: u32 = 64;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    pub fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }
}

impl From<(f64, f64)> for LonLat {
    fn from(value: (f64, f64)) -> Self {
        Self {
            lon: value.0,
            lat: value.1,
        }
    }
}

/// Per-degree offsets of a circle of `radius_m` around `center` under the
/// equirectangular approximation: the latitude step is `r / R` in radians and
/// the longitude step is additionally divided by `cos(lat)` to account for
/// meridian convergence. Valid for radii up to tens of kilometers.
fn degree_offsets(center: LonLat, radius_m: f64) -> Option<(f64, f64)> {
    if !center.is_finite() || !radius_m.is_finite() || radius_m <= 0.0 {
        return None;
    }
    let dlat = (radius_m / EARTH_RADIUS_M).to_degrees();
    let dlon = dlat / center.lat.to_radians().cos();
    if !dlon.is_finite() {
        // Degenerate near the poles where cos(lat) vanishes.
        return None;
    }
    Some((dlon, dlat))
}

/// Build a closed polygonal ring approximating a circle of `radius_m` meters
/// around `center`. The ring has `steps + 1` vertices with the first repeated
/// as the last. Degenerate input (non-finite values, radius <= 0) collapses
/// the ring onto the center point so callers render "no visible circle"
/// instead of failing.
pub fn circle_ring(center: LonLat, radius_m: f64, steps: u32) -> Vec<LonLat> {
    let steps = steps.max(3);
    let mut ring = Vec::with_capacity(steps as usize + 1);
    let Some((dlon, dlat)) = degree_offsets(center, radius_m) else {
        ring.resize(steps as usize + 1, center);
        return ring;
    };
    for i in 0..steps {
        let bearing = (f64::from(i) * 360.0 / f64::from(steps)).to_radians();
        ring.push(LonLat::new(
            center.lon + dlon * bearing.sin(),
            center.lat + dlat * bearing.cos(),
        ));
    }
    // Close the ring with an exact copy of the first vertex; recomputing it
    // at bearing 360 would differ in the last bits.
    let first = ring[0];
    ring.push(first);
    ring
}

/// The single drag affordance: a point due east of `center` on the circle.
/// Falls back to the center itself for degenerate input.
pub fn handle_point(center: LonLat, radius_m: f64) -> LonLat {
    match degree_offsets(center, radius_m) {
        Some((dlon, _)) => LonLat::new(center.lon + dlon, center.lat),
        None => center,
    }
}

/// Ground distance in meters between two points, using the inverse of the
/// projection in [`circle_ring`] so a dragged handle position maps back to the
/// radius that produced it.
pub fn distance_m(a: LonLat, b: LonLat) -> f64 {
    if !a.is_finite() || !b.is_finite() {
        return 0.0;
    }
    let dx = (b.lon - a.lon).to_radians() * a.lat.to_radians().cos() * EARTH_RADIUS_M;
    let dy = (b.lat - a.lat).to_radians() * EARTH_RADIUS_M;
    (dx * dx + dy * dy).sqrt()
}
