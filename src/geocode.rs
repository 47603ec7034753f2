use crate::geometry::LonLat;
use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde_json::Value;

const NOMINATIM_ENDPOINT: &str = "https://nominatim.openstreetmap.org/search";
const USER_AGENT: &str = concat!("radius-overlay/", env!("CARGO_PKG_VERSION"));

/// Resolve a free-text place name to coordinates via Nominatim. Returns
/// `Ok(None)` when the name is blank or yields no match; network and decode
/// failures are reported as errors.
pub fn resolve_name(name: &str) -> Result<Option<LonLat>> {
    let name = name.trim();
    if name.is_empty() {
        return Ok(None);
    }
    let client = Client::builder().user_agent(USER_AGENT).build()?;
    let url = format!(
        "{NOMINATIM_ENDPOINT}?q={}&format=json&limit=1",
        urlencoding::encode(name)
    );
    let body = client
        .get(&url)
        .send()
        .with_context(|| format!("geocoding request for {name:?} failed"))?
        .error_for_status()?
        .text()?;
    parse_response(&body).with_context(|| format!("unexpected geocoding response for {name:?}"))
}

/// Extracts the first match's coordinates from a Nominatim `format=json`
/// response. `Ok(None)` for an empty result list.
fn parse_response(body: &str) -> Result<Option<LonLat>> {
    let value: Value = serde_json::from_str(body).context("response was not valid JSON")?;
    let results = value.as_array().context("response was not a JSON array")?;
    let Some(first) = results.first() else {
        return Ok(None);
    };
    // Nominatim encodes coordinates as strings.
    let lat = first
        .get("lat")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<f64>().ok())
        .context("match had no usable latitude")?;
    let lon = first
        .get("lon")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<f64>().ok())
        .context("match had no usable longitude")?;
    Ok(Some(LonLat::new(lon, lat)))
}
