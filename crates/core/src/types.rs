//! Generic event model produced by the host client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Free-form key/value payload carried by events (properties, traits).
pub type Properties = BTreeMap<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Identify,
    Track,
    Screen,
    Lifecycle,
}

/// Application lifecycle transitions reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    Foreground,
    Background,
}

impl LifecycleEvent {
    /// Classify a host lifecycle event name. Unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Application Opened" | "Application Installed" | "Application Updated" => {
                Some(LifecycleEvent::Foreground)
            }
            "Application Backgrounded" => Some(LifecycleEvent::Background),
            _ => None,
        }
    }
}

/// A single event delivered by the host client to its integrations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenericEvent {
    #[serde(default = "Uuid::new_v4")]
    pub message_id: Uuid,
    #[serde(rename = "type")]
    pub event_type: EventType,
    #[serde(default, alias = "event")]
    pub name: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub properties: Properties,
    #[serde(default)]
    pub traits: Option<Properties>,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl GenericEvent {
    fn new(event_type: EventType, name: Option<String>) -> Self {
        Self {
            message_id: Uuid::new_v4(),
            event_type,
            name,
            user_id: None,
            properties: Properties::new(),
            traits: None,
            timestamp: Utc::now(),
        }
    }

    pub fn track(name: impl Into<String>) -> Self {
        Self::new(EventType::Track, Some(name.into()))
    }

    pub fn screen(name: impl Into<String>) -> Self {
        Self::new(EventType::Screen, Some(name.into()))
    }

    pub fn identify(user_id: impl Into<String>) -> Self {
        let mut event = Self::new(EventType::Identify, None);
        event.user_id = Some(user_id.into());
        event
    }

    pub fn lifecycle(name: impl Into<String>) -> Self {
        Self::new(EventType::Lifecycle, Some(name.into()))
    }

    pub fn with_property(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    pub fn with_trait(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.traits
            .get_or_insert_with(Properties::new)
            .insert(key.into(), value);
        self
    }

    /// Event name, or an empty string for unnamed events.
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}
