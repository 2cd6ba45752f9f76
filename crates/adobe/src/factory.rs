//! Injectable constructors for vendor heartbeat and media objects.
//!
//! Native bindings hand the bridge a [`HeartbeatFactory`]; tests hand it a
//! recording one. Media objects are plain data, so the production
//! [`StandardMediaObjectFactory`] lives here.

use rudder_core::Properties;
use tracing::warn;

use crate::playback::SharedPlayback;
use crate::properties::{flag, number, seconds, string};
use crate::vendor::{
    HeartbeatConfig, MediaHeartbeat, MediaObject, MediaObjectKind, QosInfo, StreamType,
};

/// Creates vendor heartbeat sessions.
pub trait HeartbeatFactory: Send + Sync {
    fn create(
        &self,
        delegate: SharedPlayback,
        config: &HeartbeatConfig,
    ) -> Option<Box<dyn MediaHeartbeat>>;
}

impl<F> HeartbeatFactory for F
where
    F: Fn(SharedPlayback, &HeartbeatConfig) -> Option<Box<dyn MediaHeartbeat>> + Send + Sync,
{
    fn create(
        &self,
        delegate: SharedPlayback,
        config: &HeartbeatConfig,
    ) -> Option<Box<dyn MediaHeartbeat>> {
        self(delegate, config)
    }
}

/// Used when the embedding app wires no heartbeat binding. Video sessions
/// still track the playhead but report nothing.
pub struct DisabledHeartbeatFactory;

impl HeartbeatFactory for DisabledHeartbeatFactory {
    fn create(&self, _: SharedPlayback, _: &HeartbeatConfig) -> Option<Box<dyn MediaHeartbeat>> {
        None
    }
}

/// Builds vendor media objects from event properties.
pub trait MediaObjectFactory: Send + Sync {
    fn create(&self, properties: &Properties, kind: MediaObjectKind) -> Option<MediaObject>;
}

/// Host property → Adobe standard video metadata key.
const VIDEO_METADATA: &[(&str, &str)] = &[
    ("program", "a.media.show"),
    ("season", "a.media.season"),
    ("episode", "a.media.episode"),
    ("genre", "a.media.genre"),
    ("channel", "a.media.network"),
    ("asset_id", "a.media.asset"),
    ("publisher", "a.media.originator"),
    ("rating", "a.media.rating"),
    ("airdate", "a.media.airDate"),
];

/// Host property → Adobe standard ad metadata key.
const AD_METADATA: &[(&str, &str)] = &[
    ("publisher", "a.media.ad.advertiser"),
    ("campaign_id", "a.media.ad.campaign"),
    ("creative_id", "a.media.ad.creative"),
    ("placement_id", "a.media.ad.placement"),
    ("site_id", "a.media.ad.site"),
];

/// Translates host video properties the way the Adobe SDK's own
/// `create*Object` helpers expect them. Objects without a name are rejected.
pub struct StandardMediaObjectFactory;

impl StandardMediaObjectFactory {
    fn named(properties: &Properties, kind: MediaObjectKind, keys: &[&str]) -> Option<MediaObject> {
        match string(properties, keys) {
            Some(name) => Some(MediaObject::new(kind, name)),
            None => {
                warn!(kind = ?kind, "media object needs a name, none created");
                None
            }
        }
    }

    fn index_position(properties: &Properties) -> i64 {
        seconds(properties, &["index_position", "indexPosition"]).unwrap_or(1)
    }

    fn copy_metadata(object: &mut MediaObject, properties: &Properties, table: &[(&str, &str)]) {
        for (from, to) in table {
            if let Some(value) = string(properties, &[from]) {
                object.metadata.insert((*to).to_string(), value);
            }
        }
    }
}

impl MediaObjectFactory for StandardMediaObjectFactory {
    fn create(&self, properties: &Properties, kind: MediaObjectKind) -> Option<MediaObject> {
        match kind {
            MediaObjectKind::Playback => {
                let mut object = Self::named(properties, kind, &["title", "name"])?;
                object.id = string(properties, &["content_asset_id", "asset_id"]).unwrap_or_default();
                object.length = number(properties, &["total_length"]).unwrap_or(0.0);
                object.stream_type = Some(if flag(properties, "livestream") {
                    StreamType::Live
                } else {
                    StreamType::Vod
                });
                Self::copy_metadata(&mut object, properties, VIDEO_METADATA);
                Some(object)
            }
            MediaObjectKind::Chapter => {
                let mut object = Self::named(properties, kind, &["chapter_name", "title"])?;
                object.position = Self::index_position(properties);
                object.length = number(properties, &["total_length"]).unwrap_or(0.0);
                object.start_time = number(properties, &["start_time", "position"]).unwrap_or(0.0);
                Self::copy_metadata(&mut object, properties, VIDEO_METADATA);
                Some(object)
            }
            MediaObjectKind::AdBreak => {
                let mut object = Self::named(properties, kind, &["title", "name"])?;
                object.position = Self::index_position(properties);
                object.start_time = number(properties, &["start_time", "position"]).unwrap_or(0.0);
                Some(object)
            }
            MediaObjectKind::Ad => {
                let mut object = Self::named(properties, kind, &["title", "name"])?;
                object.id = string(properties, &["asset_id", "ad_asset_id"]).unwrap_or_default();
                object.position = Self::index_position(properties);
                object.length = number(properties, &["total_length"]).unwrap_or(0.0);
                Self::copy_metadata(&mut object, properties, AD_METADATA);
                Some(object)
            }
            MediaObjectKind::Qos => {
                let mut object = MediaObject::new(kind, "");
                object.qos = Some(QosInfo {
                    bitrate: number(properties, &["bitrate"]).unwrap_or(0.0),
                    startup_time: number(properties, &["startup_time"]).unwrap_or(0.0),
                    fps: number(properties, &["fps", "framerate"]).unwrap_or(0.0),
                    dropped_frames: number(properties, &["dropped_frames"]).unwrap_or(0.0),
                });
                Some(object)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(value: serde_json::Value) -> Properties {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_playback_object() {
        let object = StandardMediaObjectFactory
            .create(
                &props(json!({
                    "title": "Pilot",
                    "content_asset_id": "vid-7",
                    "total_length": 1800,
                    "livestream": false,
                    "program": "Space Show",
                    "season": "2",
                    "channel": "SciFi"
                })),
                MediaObjectKind::Playback,
            )
            .unwrap();

        assert_eq!(object.kind, MediaObjectKind::Playback);
        assert_eq!(object.name, "Pilot");
        assert_eq!(object.id, "vid-7");
        assert_eq!(object.length, 1800.0);
        assert_eq!(object.stream_type, Some(StreamType::Vod));
        assert_eq!(object.metadata["a.media.show"], "Space Show");
        assert_eq!(object.metadata["a.media.season"], "2");
        assert_eq!(object.metadata["a.media.network"], "SciFi");
    }

    #[test]
    fn test_live_stream_flag() {
        let object = StandardMediaObjectFactory
            .create(
                &props(json!({ "title": "Match", "livestream": true })),
                MediaObjectKind::Playback,
            )
            .unwrap();
        assert_eq!(object.stream_type, Some(StreamType::Live));
    }

    #[test]
    fn test_nameless_objects_rejected() {
        let empty = Properties::new();
        for kind in [
            MediaObjectKind::Playback,
            MediaObjectKind::Chapter,
            MediaObjectKind::AdBreak,
            MediaObjectKind::Ad,
        ] {
            assert!(StandardMediaObjectFactory.create(&empty, kind).is_none());
        }
        assert!(StandardMediaObjectFactory
            .create(&empty, MediaObjectKind::Qos)
            .is_some());
    }

    #[test]
    fn test_ad_and_chapter_objects() {
        let ad = StandardMediaObjectFactory
            .create(
                &props(json!({
                    "title": "Soda",
                    "asset_id": "ad-1",
                    "index_position": 2,
                    "total_length": "15",
                    "publisher": "Fizz Co"
                })),
                MediaObjectKind::Ad,
            )
            .unwrap();
        assert_eq!(ad.id, "ad-1");
        assert_eq!(ad.position, 2);
        assert_eq!(ad.length, 15.0);
        assert_eq!(ad.metadata["a.media.ad.advertiser"], "Fizz Co");

        let chapter = StandardMediaObjectFactory
            .create(
                &props(json!({ "chapter_name": "Intro", "position": 30 })),
                MediaObjectKind::Chapter,
            )
            .unwrap();
        assert_eq!(chapter.name, "Intro");
        assert_eq!(chapter.position, 1);
        assert_eq!(chapter.start_time, 30.0);
    }

    #[test]
    fn test_qos_object() {
        let qos = StandardMediaObjectFactory
            .create(
                &props(json!({ "bitrate": 4500, "fps": "29.97", "dropped_frames": 3 })),
                MediaObjectKind::Qos,
            )
            .unwrap();
        let info = qos.qos.unwrap();
        assert_eq!(info.bitrate, 4500.0);
        assert_eq!(info.fps, 29.97);
        assert_eq!(info.dropped_frames, 3.0);
        assert_eq!(info.startup_time, 0.0);
    }

    #[test]
    fn test_disabled_heartbeat_factory() {
        use crate::playback::{PlaybackDelegate, SystemClock};
        use std::sync::Arc;

        let delegate = SharedPlayback::new(PlaybackDelegate::new(Arc::new(SystemClock), 0));
        let config = HeartbeatConfig {
            tracking_server: "hb.example.com".into(),
            channel: String::new(),
            ovp: "unknown".into(),
            player_name: "unknown".into(),
            app_version: "1.0".into(),
            ssl: true,
            debug_logging: false,
        };
        assert!(DisabledHeartbeatFactory.create(delegate, &config).is_none());
    }
}
