use crate::model::ResultPoint;
use crate::surface::{MapSurface, PopupId, PopupSpec};

/// Owns the single transient info popup. At most one popup is alive at any
/// time; opening for a new marker replaces the previous popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PopupController {
    open: Option<PopupId>,
}

impl PopupController {
    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn open_for<S: MapSurface>(&mut self, surface: &mut S, result: &ResultPoint) {
        self.close(surface);
        let spec = popup_spec(result);
        tracing::debug!(device_id = result.device_id, "opening result popup");
        self.open = Some(surface.open_popup(spec));
    }

    /// Closes the popup if one is open. Safe to call unconditionally.
    pub fn close<S: MapSurface>(&mut self, surface: &mut S) {
        if let Some(id) = self.open.take() {
            surface.close_popup(id);
        }
    }
}

/// Builds the popup content for one result. Attributes without a value are
/// omitted entirely rather than rendered as placeholders.
pub fn popup_spec(result: &ResultPoint) -> PopupSpec {
    let title = result
        .device_name
        .clone()
        .unwrap_or_else(|| format!("Device {}", result.device_id));

    let mut rows = Vec::new();
    rows.push((
        "Time".to_string(),
        result.fix_time.format("%Y-%m-%d %H:%M:%S").to_string(),
    ));
    if let Some(speed) = result.speed {
        rows.push(("Speed".to_string(), format!("{speed:.1} kn")));
    }
    if let Some(altitude) = result.altitude {
        rows.push(("Altitude".to_string(), format!("{altitude:.0} m")));
    }
    if let Some(accuracy) = result.accuracy {
        rows.push(("Accuracy".to_string(), format!("{accuracy:.0} m")));
    }
    if let Some(address) = &result.address {
        rows.push(("Address".to_string(), address.clone()));
    }

    PopupSpec {
        anchor: result.position(),
        title,
        rows,
    }
}
