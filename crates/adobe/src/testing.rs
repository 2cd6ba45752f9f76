//! Recording stand-ins for the Adobe SDK and a hand-driven clock, for tests
//! of the bridge and of code embedding it.

use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::factory::HeartbeatFactory;
use crate::playback::{Clock, HeartbeatDelegate, SharedPlayback};
use crate::vendor::{
    AdobeMobile, ContextData, HeartbeatConfig, MediaEvent, MediaHeartbeat, MediaObject,
    MediaObjectKind,
};

/// Clock that only moves when told to.
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(start: i64) -> Self {
        Self {
            now: AtomicI64::new(start),
        }
    }

    pub fn advance(&self, secs: i64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_secs(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// One call made on [`RecordingAdobe`].
#[derive(Debug, Clone, PartialEq)]
pub enum AdobeCall {
    Configure { tracking_server: String, ssl: bool },
    DebugLogging(bool),
    UserIdentifier(Option<String>),
    ContextData(ContextData),
    TrackState { state: String, data: ContextData },
    TrackAction { action: String, data: ContextData },
    CollectLifecycle,
    PauseLifecycle,
    SendQueuedHits,
    ClearBeacon,
}

/// Adobe Mobile stand-in. Clones share one call log.
#[derive(Clone, Default)]
pub struct RecordingAdobe {
    calls: Arc<Mutex<Vec<AdobeCall>>>,
}

impl RecordingAdobe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<AdobeCall> {
        self.calls.lock().clone()
    }

    pub fn actions(&self) -> Vec<(String, ContextData)> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                AdobeCall::TrackAction { action, data } => Some((action.clone(), data.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn states(&self) -> Vec<(String, ContextData)> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                AdobeCall::TrackState { state, data } => Some((state.clone(), data.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, call: &AdobeCall) -> usize {
        self.calls.lock().iter().filter(|c| *c == call).count()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }

    fn record(&self, call: AdobeCall) {
        self.calls.lock().push(call);
    }
}

impl AdobeMobile for RecordingAdobe {
    fn configure(&mut self, tracking_server: &str, ssl: bool) {
        self.record(AdobeCall::Configure {
            tracking_server: tracking_server.to_string(),
            ssl,
        });
    }

    fn set_debug_logging(&mut self, enabled: bool) {
        self.record(AdobeCall::DebugLogging(enabled));
    }

    fn set_user_identifier(&mut self, user_id: Option<&str>) {
        self.record(AdobeCall::UserIdentifier(user_id.map(str::to_string)));
    }

    fn set_context_data(&mut self, data: &ContextData) {
        self.record(AdobeCall::ContextData(data.clone()));
    }

    fn track_state(&mut self, state: &str, data: &ContextData) {
        self.record(AdobeCall::TrackState {
            state: state.to_string(),
            data: data.clone(),
        });
    }

    fn track_action(&mut self, action: &str, data: &ContextData) {
        self.record(AdobeCall::TrackAction {
            action: action.to_string(),
            data: data.clone(),
        });
    }

    fn collect_lifecycle_data(&mut self) {
        self.record(AdobeCall::CollectLifecycle);
    }

    fn pause_collecting_lifecycle_data(&mut self) {
        self.record(AdobeCall::PauseLifecycle);
    }

    fn send_queued_hits(&mut self) {
        self.record(AdobeCall::SendQueuedHits);
    }

    fn clear_current_beacon(&mut self) {
        self.record(AdobeCall::ClearBeacon);
    }
}

/// One call made on a recorded heartbeat.
#[derive(Debug, Clone, PartialEq)]
pub enum HeartbeatCall {
    SessionStart { name: String, kind: MediaObjectKind },
    Play,
    Pause,
    Complete,
    SessionEnd,
    Event(MediaEvent),
    Playhead(i64),
}

#[derive(Default)]
struct HeartbeatLog {
    calls: Vec<HeartbeatCall>,
    configs: Vec<HeartbeatConfig>,
    last_qos: Option<MediaObject>,
    delegate: Option<SharedPlayback>,
}

/// Heartbeat factory whose heartbeats record into one shared log.
#[derive(Clone, Default)]
pub struct RecordingHeartbeatFactory {
    log: Arc<Mutex<HeartbeatLog>>,
    created: Arc<AtomicUsize>,
}

impl RecordingHeartbeatFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of heartbeats handed out.
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<HeartbeatCall> {
        self.log.lock().calls.clone()
    }

    pub fn last_config(&self) -> Option<HeartbeatConfig> {
        self.log.lock().configs.last().cloned()
    }

    pub fn last_qos_bitrate(&self) -> Option<f64> {
        self.log
            .lock()
            .last_qos
            .as_ref()
            .and_then(|o| o.qos.as_ref())
            .map(|q| q.bitrate)
    }

    /// Playhead as the vendor heartbeat would poll it.
    pub fn polled_playback_time(&self) -> Option<i64> {
        let delegate = self.log.lock().delegate.clone();
        delegate.map(|d| d.current_playback_time())
    }
}

impl HeartbeatFactory for RecordingHeartbeatFactory {
    fn create(
        &self,
        delegate: SharedPlayback,
        config: &HeartbeatConfig,
    ) -> Option<Box<dyn MediaHeartbeat>> {
        self.created.fetch_add(1, Ordering::SeqCst);
        let mut log = self.log.lock();
        log.configs.push(config.clone());
        log.delegate = Some(delegate);
        Some(Box::new(RecordingHeartbeat {
            log: self.log.clone(),
        }))
    }
}

struct RecordingHeartbeat {
    log: Arc<Mutex<HeartbeatLog>>,
}

impl RecordingHeartbeat {
    fn record(&self, call: HeartbeatCall) {
        self.log.lock().calls.push(call);
    }
}

impl MediaHeartbeat for RecordingHeartbeat {
    fn track_session_start(&mut self, media: &MediaObject, _data: &ContextData) {
        self.record(HeartbeatCall::SessionStart {
            name: media.name.clone(),
            kind: media.kind,
        });
    }

    fn track_play(&mut self) {
        self.record(HeartbeatCall::Play);
    }

    fn track_pause(&mut self) {
        self.record(HeartbeatCall::Pause);
    }

    fn track_complete(&mut self) {
        self.record(HeartbeatCall::Complete);
    }

    fn track_session_end(&mut self) {
        self.record(HeartbeatCall::SessionEnd);
    }

    fn track_event(&mut self, event: MediaEvent, object: Option<&MediaObject>, _data: &ContextData) {
        let mut log = self.log.lock();
        if event == MediaEvent::BitrateChange {
            log.last_qos = object.cloned();
        }
        log.calls.push(HeartbeatCall::Event(event));
    }

    fn update_playhead(&mut self, position: i64) {
        self.record(HeartbeatCall::Playhead(position));
    }
}
