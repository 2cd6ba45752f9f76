//! Playhead bookkeeping for the active video session.
//!
//! The playhead position is never advanced by a timer. It is recorded
//! together with the wall-clock second it was recorded at, and the current
//! position is derived on read while playback is running.

use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use tracing::debug;

use crate::vendor::MediaObject;

/// Source of wall-clock seconds.
pub trait Clock: Send + Sync {
    fn now_secs(&self) -> i64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_secs(&self) -> i64 {
        Utc::now().timestamp()
    }
}

/// What the vendor heartbeat polls on its own timer.
pub trait HeartbeatDelegate: Send + Sync {
    fn current_playback_time(&self) -> i64;
    fn qos_object(&self) -> Option<MediaObject>;
}

/// Playback state of one video session.
pub struct PlaybackDelegate {
    clock: Arc<dyn Clock>,
    /// Quality of service object, replaced on every "Video Quality Updated".
    qos_object: Option<MediaObject>,
    /// Wall-clock second at which `playhead_position` was recorded.
    playhead_position_time: i64,
    playhead_position: i64,
    paused: bool,
}

impl PlaybackDelegate {
    pub fn new(clock: Arc<dyn Clock>, playhead_position: i64) -> Self {
        let playhead_position_time = clock.now_secs();
        Self {
            clock,
            qos_object: None,
            playhead_position_time,
            playhead_position: playhead_position.max(0),
            paused: false,
        }
    }

    pub fn current_playback_time(&self) -> i64 {
        if self.paused {
            return self.playhead_position;
        }
        let elapsed = self
            .clock
            .now_secs()
            .saturating_sub(self.playhead_position_time)
            .max(0);
        self.playhead_position.saturating_add(elapsed)
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Freeze the playhead at its current position. Pausing twice does not
    /// move it.
    pub fn pause_playhead(&mut self) {
        if self.paused {
            return;
        }
        self.playhead_position = self.current_playback_time();
        self.playhead_position_time = self.clock.now_secs();
        self.paused = true;
        debug!(position = self.playhead_position, "playhead paused");
    }

    pub fn unpause_playhead(&mut self) {
        if !self.paused {
            return;
        }
        self.playhead_position_time = self.clock.now_secs();
        self.paused = false;
        debug!(position = self.playhead_position, "playhead resumed");
    }

    /// Jump to an explicit position, keeping the pause state.
    pub fn update_playhead_position(&mut self, position: i64) {
        self.playhead_position = position.max(0);
        self.playhead_position_time = self.clock.now_secs();
    }

    pub fn set_qos_object(&mut self, qos: MediaObject) {
        self.qos_object = Some(qos);
    }

    pub fn qos_object(&self) -> Option<&MediaObject> {
        self.qos_object.as_ref()
    }
}

/// Playback state shared between the bridge and the vendor heartbeat.
#[derive(Clone)]
pub struct SharedPlayback(Arc<Mutex<PlaybackDelegate>>);

impl SharedPlayback {
    pub fn new(delegate: PlaybackDelegate) -> Self {
        Self(Arc::new(Mutex::new(delegate)))
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut PlaybackDelegate) -> R) -> R {
        f(&mut self.0.lock())
    }
}

impl HeartbeatDelegate for SharedPlayback {
    fn current_playback_time(&self) -> i64 {
        self.0.lock().current_playback_time()
    }

    fn qos_object(&self) -> Option<MediaObject> {
        self.0.lock().qos_object().cloned()
    }
}
