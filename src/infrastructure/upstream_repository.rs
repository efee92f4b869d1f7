// Upstream laundry service repository implementation
use crate::application::laundry_repository::LaundryRepository;
use crate::domain::machine::Machine;
use crate::domain::room::Room;
use crate::infrastructure::config::UpstreamSettings;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Tunnels such as ngrok serve an interstitial page unless this is set
const SKIP_BROWSER_WARNING: &str = "ngrok-skip-browser-warning";

#[derive(Debug, Clone)]
pub struct UpstreamRepository {
    base_url: String,
    skip_browser_warning: bool,
    client: reqwest::Client,
}

impl UpstreamRepository {
    pub fn new(settings: &UpstreamSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            skip_browser_warning: settings.skip_browser_warning,
            client,
        })
    }

    fn rooms_url(&self) -> String {
        format!("{}/rooms", self.base_url)
    }

    fn machines_url(&self, room_id: &str) -> String {
        format!("{}/laundry-data/{}", self.base_url, urlencoding::encode(room_id))
    }

    fn request(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self.client.get(url).header("Accept", "application/json");
        if self.skip_browser_warning {
            request.header(SKIP_BROWSER_WARNING, "true")
        } else {
            request
        }
    }

    async fn fetch_json(&self, url: &str) -> Result<Value> {
        let response = self
            .request(url)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", url))?;

        if !response.status().is_success() {
            let status = response.status();
            anyhow::bail!("Upstream request failed with status {}. URL: {}", status, url);
        }

        response
            .json::<Value>()
            .await
            .with_context(|| format!("Failed to parse upstream response from {}", url))
    }
}

/// A non-array body yields an empty list; records that do not fit are skipped
fn parse_records<T: DeserializeOwned>(body: Value, what: &str) -> Vec<T> {
    let Value::Array(items) = body else {
        tracing::warn!("Upstream {} payload is not an array, treating as empty", what);
        return Vec::new();
    };

    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<T>(item) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Skipping malformed {} record: {}", what, e);
                None
            }
        })
        .collect()
}

#[async_trait]
impl LaundryRepository for UpstreamRepository {
    async fn list_rooms(&self) -> Result<Vec<Room>> {
        let url = self.rooms_url();
        tracing::debug!("Fetching rooms from {}", url);
        let body = self.fetch_json(&url).await?;
        Ok(parse_records(body, "room"))
    }

    async fn list_machines(&self, room_id: &str) -> Result<Vec<Machine>> {
        let url = self.machines_url(room_id);
        tracing::debug!("Fetching machines for {} from {}", room_id, url);
        let body = self.fetch_json(&url).await?;
        Ok(parse_records(body, "machine"))
    }
}
