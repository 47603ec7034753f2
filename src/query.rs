use crate::geometry::LonLat;
use crate::model::ResultPoint;
use anyhow::{Context, Result};
use reqwest::blocking::Client;
use url::Url;

/// Blocking client for the backend radius position query. The surrounding
/// panel issues the query and feeds the decoded points back into the overlay
/// through `render`.
#[derive(Debug, Clone)]
pub struct PositionClient {
    base_url: Url,
    client: Client,
}

impl PositionClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("invalid base url {base_url:?}"))?;
        let client = Client::builder()
            .user_agent(concat!("radius-overlay/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { base_url, client })
    }

    /// Fetch all positions within `radius_m` meters of `center`, optionally
    /// restricted to one device.
    pub fn find_positions_near(
        &self,
        center: LonLat,
        radius_m: f64,
        device_id: Option<i64>,
    ) -> Result<Vec<ResultPoint>> {
        let mut url = self
            .base_url
            .join("api/positions/radius")
            .context("failed to build query url")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("latitude", &center.lat.to_string())
                .append_pair("longitude", &center.lon.to_string())
                .append_pair("radius", &radius_m.to_string());
            if let Some(id) = device_id {
                pairs.append_pair("deviceId", &id.to_string());
            }
        }
        let body = self
            .client
            .get(url.clone())
            .send()
            .with_context(|| format!("radius query to {url} failed"))?
            .error_for_status()?
            .text()?;
        serde_json::from_str(&body).context("radius query returned malformed positions")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_url_carries_all_parameters() {
        let client = PositionClient::new("https://tracker.example/").unwrap();
        let mut url = client.base_url.join("api/positions/radius").unwrap();
        url.query_pairs_mut()
            .append_pair("latitude", "52.5")
            .append_pair("longitude", "13.4")
            .append_pair("radius", "1000")
            .append_pair("deviceId", "7");
        assert_eq!(
            url.as_str(),
            "https://tracker.example/api/positions/radius?latitude=52.5&longitude=13.4&radius=1000&deviceId=7"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(PositionClient::new("not a url").is_err());
    }
}
