//! Video event vocabulary and the playback state tracker that turns host
//! video events into media heartbeat calls.
//!
//! At most one session is live at a time. A session is created by
//! `Video Playback Started` and discarded by `Video Playback Completed` or by
//! the next `Video Playback Started`. Every other video event needs a live
//! session and is dropped with a warning otherwise.

use std::sync::Arc;

use rudder_core::{IntegrationError, IntegrationResult, Properties};
use tracing::{debug, info, warn};

use crate::factory::{HeartbeatFactory, MediaObjectFactory};
use crate::playback::{Clock, PlaybackDelegate, SharedPlayback};
use crate::properties::{seconds, string};
use crate::vendor::{ContextData, HeartbeatConfig, MediaEvent, MediaHeartbeat, MediaObjectKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VideoEvent {
    PlaybackStarted,
    PlaybackPaused,
    PlaybackResumed,
    PlaybackCompleted,
    PlaybackInterrupted,
    BufferStarted,
    BufferCompleted,
    SeekStarted,
    SeekCompleted,
    ContentStarted,
    ContentPlaying,
    ContentCompleted,
    AdBreakStarted,
    AdBreakCompleted,
    AdStarted,
    AdSkipped,
    AdCompleted,
    QualityUpdated,
}

const VIDEO_EVENTS: &[(&str, VideoEvent)] = &[
    ("Video Playback Started", VideoEvent::PlaybackStarted),
    ("Video Playback Paused", VideoEvent::PlaybackPaused),
    ("Video Playback Resumed", VideoEvent::PlaybackResumed),
    ("Video Playback Completed", VideoEvent::PlaybackCompleted),
    ("Video Playback Interrupted", VideoEvent::PlaybackInterrupted),
    ("Video Playback Buffer Started", VideoEvent::BufferStarted),
    ("Video Playback Buffer Completed", VideoEvent::BufferCompleted),
    ("Video Playback Seek Started", VideoEvent::SeekStarted),
    ("Video Playback Seek Completed", VideoEvent::SeekCompleted),
    ("Video Content Started", VideoEvent::ContentStarted),
    ("Video Content Playing", VideoEvent::ContentPlaying),
    ("Video Content Completed", VideoEvent::ContentCompleted),
    ("Video Ad Break Started", VideoEvent::AdBreakStarted),
    ("Video Ad Break Completed", VideoEvent::AdBreakCompleted),
    ("Video Ad Started", VideoEvent::AdStarted),
    ("Video Ad Skipped", VideoEvent::AdSkipped),
    ("Video Ad Completed", VideoEvent::AdCompleted),
    ("Video Quality Updated", VideoEvent::QualityUpdated),
];

impl VideoEvent {
    /// Exact, case-sensitive match against the host video vocabulary.
    pub fn from_name(name: &str) -> Option<Self> {
        VIDEO_EVENTS
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, event)| *event)
    }

    pub fn name(&self) -> &'static str {
        VIDEO_EVENTS
            .iter()
            .find(|(_, event)| event == self)
            .map(|(n, _)| *n)
            .unwrap_or("Video")
    }
}

/// Destination-level settings every heartbeat is created with.
#[derive(Debug, Clone)]
pub struct HeartbeatSettings {
    pub tracking_server: String,
    pub app_version: String,
    pub ssl: bool,
    pub debug_logging: bool,
}

struct VideoSession {
    playback: SharedPlayback,
    /// `None` when the heartbeat could not be created; the session then only
    /// tracks the playhead.
    heartbeat: Option<Box<dyn MediaHeartbeat>>,
}

impl VideoSession {
    fn heartbeat(&mut self, f: impl FnOnce(&mut Box<dyn MediaHeartbeat>)) {
        match self.heartbeat.as_mut() {
            Some(heartbeat) => f(heartbeat),
            None => debug!("no heartbeat for this session, update skipped"),
        }
    }
}

/// Playback state tracker feeding the vendor heartbeat.
pub struct VideoTracker {
    heartbeat_factory: Arc<dyn HeartbeatFactory>,
    media_factory: Arc<dyn MediaObjectFactory>,
    clock: Arc<dyn Clock>,
    settings: HeartbeatSettings,
    session: Option<VideoSession>,
}

impl VideoTracker {
    pub fn new(
        heartbeat_factory: Arc<dyn HeartbeatFactory>,
        media_factory: Arc<dyn MediaObjectFactory>,
        clock: Arc<dyn Clock>,
        settings: HeartbeatSettings,
    ) -> Self {
        Self {
            heartbeat_factory,
            media_factory,
            clock,
            settings,
            session: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Current playhead position of the live session.
    pub fn current_playback_time(&self) -> Option<i64> {
        self.session
            .as_ref()
            .map(|s| s.playback.with(|p| p.current_playback_time()))
    }

    pub fn is_paused(&self) -> Option<bool> {
        self.session
            .as_ref()
            .map(|s| s.playback.with(|p| p.is_paused()))
    }

    pub fn handle(&mut self, event: VideoEvent, properties: &Properties, data: &ContextData) {
        if self.session.is_none() {
            match event {
                VideoEvent::PlaybackStarted => self.start_session(properties, data),
                _ => warn!(event = event.name(), "no active video session, event ignored"),
            }
            return;
        }

        let media_factory = self.media_factory.clone();
        let Some(session) = self.session.as_mut() else {
            return;
        };

        match event {
            VideoEvent::PlaybackStarted => {
                warn!("video session already active, replacing it");
                self.start_session(properties, data);
            }
            VideoEvent::PlaybackPaused | VideoEvent::PlaybackInterrupted => {
                session.playback.with(|p| p.pause_playhead());
                session.heartbeat(|hb| hb.track_pause());
            }
            VideoEvent::PlaybackResumed => {
                session.playback.with(|p| p.unpause_playhead());
                session.heartbeat(|hb| hb.track_play());
            }
            VideoEvent::BufferStarted => {
                session.playback.with(|p| p.pause_playhead());
                session.heartbeat(|hb| hb.track_event(MediaEvent::BufferStart, None, data));
            }
            VideoEvent::BufferCompleted => {
                session.playback.with(|p| p.unpause_playhead());
                session.heartbeat(|hb| hb.track_event(MediaEvent::BufferComplete, None, data));
            }
            VideoEvent::SeekStarted => {
                session.playback.with(|p| p.pause_playhead());
                session.heartbeat(|hb| hb.track_event(MediaEvent::SeekStart, None, data));
            }
            VideoEvent::SeekCompleted => {
                let target = seconds(properties, &["seek_position", "position"]);
                let position = session.playback.with(|p| {
                    if let Some(target) = target {
                        p.update_playhead_position(target);
                    }
                    p.unpause_playhead();
                    p.current_playback_time()
                });
                session.heartbeat(|hb| {
                    hb.track_event(MediaEvent::SeekComplete, None, data);
                    hb.update_playhead(position);
                });
            }
            VideoEvent::ContentStarted => {
                session.playback.with(|p| p.unpause_playhead());
                let chapter = media_factory.create(properties, MediaObjectKind::Chapter);
                session.heartbeat(|hb| {
                    hb.track_play();
                    if let Some(chapter) = &chapter {
                        hb.track_event(MediaEvent::ChapterStart, Some(chapter), data);
                    }
                });
            }
            VideoEvent::ContentPlaying => {
                let Some(position) = seconds(properties, &["position"]) else {
                    debug!("content playing without position");
                    return;
                };
                session.playback.with(|p| p.update_playhead_position(position));
                session.heartbeat(|hb| hb.update_playhead(position));
            }
            VideoEvent::ContentCompleted => {
                session.heartbeat(|hb| hb.track_event(MediaEvent::ChapterComplete, None, data));
            }
            VideoEvent::AdBreakStarted => {
                let ad_break = media_factory.create(properties, MediaObjectKind::AdBreak);
                if let Some(ad_break) = &ad_break {
                    session.heartbeat(|hb| {
                        hb.track_event(MediaEvent::AdBreakStart, Some(ad_break), data)
                    });
                }
            }
            VideoEvent::AdBreakCompleted => {
                session.heartbeat(|hb| hb.track_event(MediaEvent::AdBreakComplete, None, data));
            }
            VideoEvent::AdStarted => {
                let ad = media_factory.create(properties, MediaObjectKind::Ad);
                if let Some(ad) = &ad {
                    session.heartbeat(|hb| hb.track_event(MediaEvent::AdStart, Some(ad), data));
                }
            }
            VideoEvent::AdSkipped => {
                session.heartbeat(|hb| hb.track_event(MediaEvent::AdSkip, None, data));
            }
            VideoEvent::AdCompleted => {
                session.heartbeat(|hb| hb.track_event(MediaEvent::AdComplete, None, data));
            }
            VideoEvent::QualityUpdated => {
                let Some(qos) = media_factory.create(properties, MediaObjectKind::Qos) else {
                    warn!("qos object not created, quality update ignored");
                    return;
                };
                session.playback.with(|p| p.set_qos_object(qos.clone()));
                session.heartbeat(|hb| hb.track_event(MediaEvent::BitrateChange, Some(&qos), data));
            }
            VideoEvent::PlaybackCompleted => {
                session.playback.with(|p| p.pause_playhead());
                session.heartbeat(|hb| {
                    hb.track_complete();
                    hb.track_session_end();
                });
                self.session = None;
                info!("video session completed");
            }
        }
    }

    /// Tear down the live session, if any, without reporting completion.
    pub fn end_session(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.heartbeat(|hb| hb.track_session_end());
            info!("video session ended");
        }
    }

    fn start_session(&mut self, properties: &Properties, data: &ContextData) {
        self.end_session();

        let position = seconds(properties, &["position"]).unwrap_or(0);
        let playback = SharedPlayback::new(PlaybackDelegate::new(self.clock.clone(), position));

        let heartbeat = match self.open_heartbeat(playback.clone(), properties, data) {
            Ok(heartbeat) => Some(heartbeat),
            Err(e) => {
                warn!(error = %e, "video session degraded, heartbeat disabled");
                None
            }
        };

        info!(position, heartbeat = heartbeat.is_some(), "video session started");
        self.session = Some(VideoSession {
            playback,
            heartbeat,
        });
    }

    fn open_heartbeat(
        &self,
        playback: SharedPlayback,
        properties: &Properties,
        data: &ContextData,
    ) -> IntegrationResult<Box<dyn MediaHeartbeat>> {
        // No heartbeat is built for a session it could never report.
        let media = self
            .media_factory
            .create(properties, MediaObjectKind::Playback)
            .ok_or(IntegrationError::FactoryProduction("media object"))?;
        let config = self.heartbeat_config(properties);
        let mut heartbeat = self
            .heartbeat_factory
            .create(playback, &config)
            .ok_or(IntegrationError::FactoryProduction("media heartbeat"))?;

        heartbeat.track_session_start(&media, data);
        Ok(heartbeat)
    }

    fn heartbeat_config(&self, properties: &Properties) -> HeartbeatConfig {
        HeartbeatConfig {
            tracking_server: self.settings.tracking_server.clone(),
            channel: string(properties, &["channel"]).unwrap_or_default(),
            ovp: string(properties, &["ovp"]).unwrap_or_else(|| "unknown".into()),
            player_name: string(properties, &["video_player"]).unwrap_or_else(|| "unknown".into()),
            app_version: self.settings.app_version.clone(),
            ssl: self.settings.ssl,
            debug_logging: self.settings.debug_logging,
        }
    }
}
