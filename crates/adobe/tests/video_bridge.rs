//! End-to-end flows through the host registry: configuration, dispatch and
//! video heartbeat tracking against recording fakes.

use std::sync::Arc;

use rudder_adobe::testing::{AdobeCall, HeartbeatCall, ManualClock, RecordingAdobe, RecordingHeartbeatFactory};
use rudder_adobe::{
    AdobeIntegrationFactory, AdobeMobile, HeartbeatConfig, MediaEvent, MediaHeartbeat,
    SharedPlayback, ADOBE_KEY,
};
use rudder_core::telemetry::init_tracing;
use rudder_core::{
    AnonymousClient, GenericEvent, HostConfig, Integration, IntegrationError, IntegrationRegistry,
};
use serde_json::json;

struct Harness {
    integration: Box<dyn Integration>,
    adobe: RecordingAdobe,
    heartbeats: RecordingHeartbeatFactory,
    clock: Arc<ManualClock>,
}

fn registry(
    adobe: &RecordingAdobe,
    heartbeats: Arc<dyn rudder_adobe::HeartbeatFactory>,
    clock: Arc<ManualClock>,
) -> IntegrationRegistry {
    let handle = adobe.clone();
    let factory = AdobeIntegrationFactory::new(move || -> Box<dyn AdobeMobile> {
        Box::new(handle.clone())
    })
    .with_heartbeat_factory(heartbeats)
    .with_clock(clock);
    IntegrationRegistry::new().with_factory(Arc::new(factory))
}

fn harness(config: serde_json::Value) -> Harness {
    init_tracing(&HostConfig::default());
    let adobe = RecordingAdobe::new();
    let heartbeats = RecordingHeartbeatFactory::new();
    let clock = Arc::new(ManualClock::new(1_700_000_000));
    let integration = registry(&adobe, Arc::new(heartbeats.clone()), clock.clone())
        .create(
            ADOBE_KEY,
            &config,
            Arc::new(AnonymousClient),
            &HostConfig::default(),
        )
        .expect("adobe integration");
    Harness {
        integration,
        adobe,
        heartbeats,
        clock,
    }
}

fn video(name: &str) -> GenericEvent {
    GenericEvent::track(name)
}

#[test]
fn missing_tracking_server_constructs_nothing() {
    let adobe = RecordingAdobe::new();
    let registry = registry(
        &adobe,
        Arc::new(RecordingHeartbeatFactory::new()),
        Arc::new(ManualClock::new(0)),
    );

    for config in [json!({}), json!({ "trackingServerUrl": "" }), json!({ "videoDebug": true })] {
        let result = registry.create(
            ADOBE_KEY,
            &config,
            Arc::new(AnonymousClient),
            &HostConfig::default(),
        );
        match result {
            Err(err @ IntegrationError::Config(_)) => assert!(err.is_fatal()),
            Err(other) => panic!("unexpected error {other}"),
            Ok(_) => panic!("integration built without a tracking server"),
        }
    }
    assert!(adobe.calls().is_empty());
}

#[test]
fn playhead_follows_wall_clock_through_pause_and_resume() {
    let mut h = harness(json!({ "trackingServerUrl": "m.example.com", "videoDebug": true }));

    h.integration.dump(
        &video("Video Playback Started")
            .with_property("title", json!("Pilot"))
            .with_property("video_player", json!("exo")),
    );
    let config = h.heartbeats.last_config().unwrap();
    assert!(config.debug_logging);
    assert_eq!(config.tracking_server, "m.example.com");

    h.clock.advance(10);
    assert_eq!(h.heartbeats.polled_playback_time(), Some(10));

    h.integration.dump(&video("Video Playback Paused"));
    h.clock.advance(5);
    assert_eq!(h.heartbeats.polled_playback_time(), Some(10));

    // A second pause must not snapshot again.
    h.integration.dump(&video("Video Playback Paused"));
    assert_eq!(h.heartbeats.polled_playback_time(), Some(10));

    h.integration.dump(&video("Video Playback Resumed"));
    h.clock.advance(3);
    assert_eq!(h.heartbeats.polled_playback_time(), Some(13));

    h.integration.dump(&video("Video Playback Completed"));
    let calls = h.heartbeats.calls();
    assert_eq!(calls.last(), Some(&HeartbeatCall::SessionEnd));
    assert!(h.adobe.actions().is_empty());
}

#[test]
fn active_session_never_reports_negative_position() {
    let mut h = harness(json!({ "trackingServerUrl": "m.example.com" }));

    h.integration
        .dump(&video("Video Playback Started").with_property("title", json!("Live")));
    let sequence = [
        "Video Playback Paused",
        "Video Playback Seek Started",
        "Video Playback Seek Completed",
        "Video Playback Buffer Started",
        "Video Playback Buffer Completed",
        "Video Ad Break Started",
        "Video Ad Started",
        "Video Ad Completed",
        "Video Ad Break Completed",
        "Video Content Started",
        "Video Quality Updated",
        "Video Content Completed",
        "Video Playback Resumed",
    ];
    for name in sequence {
        h.integration.dump(&video(name));
        h.clock.advance(-1);
        let position = h.heartbeats.polled_playback_time().unwrap();
        assert!(position >= 0, "{name} left position {position}");
    }
    assert!(!h.heartbeats.calls().contains(&HeartbeatCall::SessionEnd));
}

#[test]
fn oversized_position_is_absorbed_by_dump() {
    let mut h = harness(json!({ "trackingServerUrl": "m.example.com" }));

    h.integration.dump(
        &video("Video Playback Started")
            .with_property("title", json!("Marathon"))
            .with_property("position", json!(1e30)),
    );
    h.clock.advance(5);
    h.integration.dump(&video("Video Playback Paused"));

    let frozen = h.heartbeats.polled_playback_time().unwrap();
    assert!(frozen > 0);
    h.clock.advance(5);
    assert_eq!(h.heartbeats.polled_playback_time(), Some(frozen));

    h.integration
        .dump(&video("Video Content Playing").with_property("position", json!(f64::MAX)));
    assert_eq!(h.heartbeats.polled_playback_time(), Some(frozen - 5));
}

#[test]
fn missing_heartbeat_degrades_quality_updates() {
    let adobe = RecordingAdobe::new();
    let clock = Arc::new(ManualClock::new(0));
    let no_heartbeat = |_: SharedPlayback, _: &HeartbeatConfig| -> Option<Box<dyn MediaHeartbeat>> {
        None
    };
    let mut integration = registry(&adobe, Arc::new(no_heartbeat), clock.clone())
        .create(
            ADOBE_KEY,
            &json!({ "trackingServerUrl": "m.example.com" }),
            Arc::new(AnonymousClient),
            &HostConfig::default(),
        )
        .unwrap();

    integration.dump(&video("Video Playback Started").with_property("title", json!("A")));
    integration.dump(&video("Video Quality Updated").with_property("bitrate", json!(800)));
    integration.dump(&video("Video Playback Paused"));
    integration.dump(&video("Video Playback Completed"));
    integration.dump(&video("Video Quality Updated").with_property("bitrate", json!(900)));

    assert!(adobe.actions().is_empty());
}

#[test]
fn mapped_event_is_one_action_with_merged_context() {
    let mut h = harness(json!({
        "trackingServerUrl": "m.example.com",
        "rudderEventsToAdobeEvents": [{ "from": "Product Viewed", "to": "prodView" }]
    }));

    h.integration
        .dump(&GenericEvent::identify("u-1").with_trait("color", json!("red")));
    h.integration.dump(
        &GenericEvent::track("Product Viewed")
            .with_property("color", json!("blue"))
            .with_property("sku", json!("M-1")),
    );

    let actions = h.adobe.actions();
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].0, "prodView");
    assert_eq!(actions[0].1["color"], "blue");
    assert_eq!(actions[0].1["sku"], "M-1");
    assert_eq!(h.adobe.count(&AdobeCall::UserIdentifier(Some("u-1".into()))), 1);
}

#[test]
fn custom_video_alias_drives_heartbeat() {
    let mut h = harness(json!({
        "trackingServerUrl": "m.example.com",
        "videoEvents": [{ "from": "Movie Paused", "to": "Video Playback Paused" }]
    }));

    h.integration
        .dump(&video("Video Playback Started").with_property("title", json!("A")));
    h.integration.dump(&video("Movie Paused"));
    h.integration
        .dump(&video("Video Quality Updated").with_property("bitrate", json!(2500)));

    let calls = h.heartbeats.calls();
    assert!(calls.contains(&HeartbeatCall::Pause));
    assert!(calls.contains(&HeartbeatCall::Event(MediaEvent::BitrateChange)));
    assert_eq!(h.heartbeats.last_qos_bitrate(), Some(2500.0));
}
