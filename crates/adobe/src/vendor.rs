//! The slice of the Adobe Mobile and Media Heartbeat SDKs the bridge talks to.
//!
//! Native bindings implement these traits; the bridge only ever sees the
//! trait objects.

use std::collections::BTreeMap;

/// Adobe context data: flat key/value metadata attached to states and actions.
pub type ContextData = BTreeMap<String, serde_json::Value>;

/// Adobe Mobile core analytics calls.
pub trait AdobeMobile: Send {
    fn configure(&mut self, tracking_server: &str, ssl: bool);
    fn set_debug_logging(&mut self, enabled: bool);
    fn set_user_identifier(&mut self, user_id: Option<&str>);
    fn set_context_data(&mut self, data: &ContextData);
    fn track_state(&mut self, state: &str, data: &ContextData);
    fn track_action(&mut self, action: &str, data: &ContextData);
    /// Starts the lifecycle session, or resumes a paused one.
    fn collect_lifecycle_data(&mut self);
    fn pause_collecting_lifecycle_data(&mut self);
    fn send_queued_hits(&mut self);
    fn clear_current_beacon(&mut self);
}

/// A live media heartbeat session.
pub trait MediaHeartbeat: Send {
    fn track_session_start(&mut self, media: &MediaObject, data: &ContextData);
    fn track_play(&mut self);
    fn track_pause(&mut self);
    fn track_complete(&mut self);
    fn track_session_end(&mut self);
    fn track_event(&mut self, event: MediaEvent, object: Option<&MediaObject>, data: &ContextData);
    fn update_playhead(&mut self, position: i64);
}

/// Heartbeat-level events reported alongside play/pause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaEvent {
    ChapterStart,
    ChapterComplete,
    BufferStart,
    BufferComplete,
    SeekStart,
    SeekComplete,
    AdBreakStart,
    AdBreakComplete,
    AdStart,
    AdComplete,
    AdSkip,
    BitrateChange,
}

/// Which vendor object a set of properties should become.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaObjectKind {
    Playback,
    Chapter,
    AdBreak,
    Ad,
    Qos,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamType {
    Vod,
    Live,
}

/// Quality of service snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QosInfo {
    pub bitrate: f64,
    pub startup_time: f64,
    pub fps: f64,
    pub dropped_frames: f64,
}

/// Vendor media object. Which fields are meaningful depends on `kind`.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaObject {
    pub kind: MediaObjectKind,
    pub name: String,
    pub id: String,
    pub length: f64,
    pub position: i64,
    pub start_time: f64,
    pub stream_type: Option<StreamType>,
    pub qos: Option<QosInfo>,
    /// Standard video / ad metadata keyed by Adobe's metadata names.
    pub metadata: BTreeMap<String, String>,
}

impl MediaObject {
    pub fn new(kind: MediaObjectKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            id: String::new(),
            length: 0.0,
            position: 0,
            start_time: 0.0,
            stream_type: None,
            qos: None,
            metadata: BTreeMap::new(),
        }
    }
}

/// Settings used to create a heartbeat session.
#[derive(Debug, Clone, PartialEq)]
pub struct HeartbeatConfig {
    pub tracking_server: String,
    pub channel: String,
    pub ovp: String,
    pub player_name: String,
    pub app_version: String,
    pub ssl: bool,
    pub debug_logging: bool,
}
