//! Destination configuration: the raw dashboard payload and the validated
//! settings the bridge runs on.

use std::collections::HashMap;

use rudder_core::{IntegrationError, IntegrationResult};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::video::VideoEvent;

/// Which product field identifies a product in the `&&products` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductIdentifier {
    #[default]
    Name,
    Id,
    Sku,
}

/// One `{from, to}` row of a dashboard mapping table.
#[derive(Debug, Clone, Deserialize)]
struct MappingPair {
    #[serde(default)]
    from: String,
    #[serde(default)]
    to: String,
}

/// Configuration as the host delivers it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAdobeConfig {
    #[serde(default)]
    tracking_server_url: Option<String>,
    #[serde(default)]
    heartbeat_tracking_server_url: Option<String>,
    #[serde(default)]
    context_data_prefix: String,
    #[serde(default)]
    product_identifier: ProductIdentifier,
    #[serde(default = "default_ssl", alias = "ssl")]
    ssl_heartbeat: bool,
    #[serde(default)]
    track_lifecycle_events: bool,
    #[serde(default)]
    video_debug: bool,
    #[serde(default)]
    context_data_mapping: Vec<MappingPair>,
    #[serde(default)]
    rudder_events_to_adobe_events: Vec<MappingPair>,
    #[serde(default)]
    video_events: Vec<MappingPair>,
}

fn default_ssl() -> bool {
    true
}

/// Validated destination settings. Immutable once parsed.
#[derive(Debug, Clone)]
pub struct AdobeConfig {
    pub tracking_server_url: String,
    pub heartbeat_tracking_server_url: String,
    pub context_data_prefix: String,
    pub product_identifier: ProductIdentifier,
    pub ssl: bool,
    pub track_lifecycle_events: bool,
    pub video_debug: bool,
    /// Host property key → Adobe context data key.
    pub context_data_map: HashMap<String, String>,
    /// Host event name → Adobe action name.
    pub event_name_map: HashMap<String, String>,
    /// Custom event name → canonical video event.
    pub video_event_map: HashMap<String, VideoEvent>,
}

impl AdobeConfig {
    /// Parse the raw destination payload. Fails when the tracking server URL
    /// is missing or blank, or when the payload is malformed.
    pub fn parse(raw: &serde_json::Value) -> IntegrationResult<Self> {
        let raw: RawAdobeConfig = serde_json::from_value(raw.clone())
            .map_err(|e| IntegrationError::Config(format!("malformed payload: {e}")))?;

        let tracking_server_url = raw
            .tracking_server_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .ok_or_else(|| IntegrationError::Config("trackingServerUrl is required".into()))?;

        let heartbeat_tracking_server_url = raw
            .heartbeat_tracking_server_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| tracking_server_url.clone());

        let video_event_map = into_map(raw.video_events)
            .into_iter()
            .filter_map(|(from, to)| match VideoEvent::from_name(&to) {
                Some(event) => Some((from, event)),
                None => {
                    warn!(from = %from, to = %to, "unknown video event in mapping, skipped");
                    None
                }
            })
            .collect();

        let config = Self {
            tracking_server_url,
            heartbeat_tracking_server_url,
            context_data_prefix: raw.context_data_prefix,
            product_identifier: raw.product_identifier,
            ssl: raw.ssl_heartbeat,
            track_lifecycle_events: raw.track_lifecycle_events,
            video_debug: raw.video_debug,
            context_data_map: into_map(raw.context_data_mapping),
            event_name_map: into_map(raw.rudder_events_to_adobe_events),
            video_event_map,
        };

        debug!(
            tracking_server = %config.tracking_server_url,
            events = config.event_name_map.len(),
            context_keys = config.context_data_map.len(),
            "adobe config parsed"
        );
        Ok(config)
    }

    /// Resolve a host event name to a video event, honoring custom aliases.
    pub fn video_event(&self, name: &str) -> Option<VideoEvent> {
        self.video_event_map
            .get(name)
            .copied()
            .or_else(|| VideoEvent::from_name(name))
    }
}

/// Later rows override earlier ones with the same `from`.
fn into_map(pairs: Vec<MappingPair>) -> HashMap<String, String> {
    pairs
        .into_iter()
        .filter(|p| !p.from.is_empty() && !p.to.is_empty())
        .map(|p| (p.from, p.to))
        .collect()
}
