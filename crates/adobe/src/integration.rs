//! The Adobe destination: dispatches host events to Adobe Mobile calls and
//! routes video events through the playback tracker.

use std::sync::Arc;

use rudder_core::{
    EventType, GenericEvent, HostClient, HostConfig, Integration, IntegrationError,
    IntegrationFactory, IntegrationResult, LifecycleEvent,
};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::config::AdobeConfig;
use crate::context::{ecommerce_event, map_context_data, merge, products_string};
use crate::factory::{
    DisabledHeartbeatFactory, HeartbeatFactory, MediaObjectFactory, StandardMediaObjectFactory,
};
use crate::playback::{Clock, SystemClock};
use crate::vendor::{AdobeMobile, ContextData};
use crate::video::{HeartbeatSettings, VideoTracker};

/// Destination key under which the host enables this integration.
pub const ADOBE_KEY: &str = "Adobe Analytics";

pub struct AdobeIntegration {
    config: AdobeConfig,
    adobe: Box<dyn AdobeMobile>,
    video: VideoTracker,
    track_lifecycle: bool,
    lifecycle_active: bool,
    /// Context data accumulated from identify traits, sent with every hit.
    global_context: ContextData,
}

impl AdobeIntegration {
    pub fn new(
        config: AdobeConfig,
        mut adobe: Box<dyn AdobeMobile>,
        video: VideoTracker,
        client: &dyn HostClient,
        host_config: &HostConfig,
    ) -> Self {
        adobe.configure(&config.tracking_server_url, config.ssl);
        adobe.set_debug_logging(host_config.log_level.is_debug());

        if let Some(user_id) = client.user_id() {
            adobe.set_user_identifier(Some(&user_id));
        }

        let track_lifecycle = config.track_lifecycle_events && host_config.track_lifecycle_events;
        info!(
            tracking_server = %config.tracking_server_url,
            ssl = config.ssl,
            track_lifecycle,
            "adobe integration initialized"
        );

        Self {
            config,
            adobe,
            video,
            track_lifecycle,
            lifecycle_active: false,
            global_context: ContextData::new(),
        }
    }

    pub fn config(&self) -> &AdobeConfig {
        &self.config
    }

    pub fn video(&self) -> &VideoTracker {
        &self.video
    }

    fn process(&mut self, event: &GenericEvent) -> IntegrationResult<()> {
        match event.event_type {
            EventType::Identify => self.identify(event),
            EventType::Screen => self.screen(event),
            EventType::Track => self.track(event),
            EventType::Lifecycle => {
                match LifecycleEvent::from_name(event.name()) {
                    Some(lifecycle) => self.lifecycle(lifecycle),
                    None => debug!(event = %event.name(), "unknown lifecycle event ignored"),
                }
                Ok(())
            }
        }
    }

    fn identify(&mut self, event: &GenericEvent) -> IntegrationResult<()> {
        if event.user_id.is_none() && event.traits.is_none() {
            return Err(IntegrationError::InvalidEvent(
                "identify carries neither user id nor traits".into(),
            ));
        }

        if let Some(user_id) = event.user_id.as_deref() {
            self.adobe.set_user_identifier(Some(user_id));
        }

        if let Some(traits) = &event.traits {
            let data = map_context_data(&self.config, traits);
            if !data.is_empty() {
                self.global_context.extend(data);
                self.adobe.set_context_data(&self.global_context);
            }
        }
        Ok(())
    }

    fn screen(&mut self, event: &GenericEvent) -> IntegrationResult<()> {
        let name = event.name();
        if name.is_empty() {
            return Err(IntegrationError::InvalidEvent("screen without a name".into()));
        }
        let data = self.context_data(event);
        self.adobe.track_state(name, &data);
        debug!(screen = %name, "adobe state tracked");
        Ok(())
    }

    fn track(&mut self, event: &GenericEvent) -> IntegrationResult<()> {
        let name = event.name();
        if name.is_empty() {
            return Err(IntegrationError::InvalidEvent("track without an event name".into()));
        }

        if let Some(action) = self.config.event_name_map.get(name) {
            let data = self.context_data(event);
            self.adobe.track_action(action, &data);
            debug!(event = %name, action = %action, "adobe action tracked");
            return Ok(());
        }

        if let Some(lifecycle) = LifecycleEvent::from_name(name) {
            self.lifecycle(lifecycle);
            return Ok(());
        }

        if let Some(video_event) = self.config.video_event(name) {
            let data = self.context_data(event);
            self.video.handle(video_event, &event.properties, &data);
            return Ok(());
        }

        if let Some(commerce) = ecommerce_event(name) {
            let mut data = self.context_data(event);
            data.insert("&&events".into(), json!(commerce));
            if let Some(products) = products_string(&event.properties, self.config.product_identifier)
            {
                data.insert("&&products".into(), json!(products));
            }
            if commerce == "purchase" {
                if let Some(order_id) = event.properties.get("order_id") {
                    data.insert("purchaseid".into(), order_id.clone());
                }
            }
            self.adobe.track_action(commerce, &data);
            debug!(event = %name, action = commerce, "adobe commerce action tracked");
            return Ok(());
        }

        debug!(event = %name, "event not mapped for adobe, ignored");
        Ok(())
    }

    fn lifecycle(&mut self, lifecycle: LifecycleEvent) {
        if !self.track_lifecycle {
            debug!(lifecycle = ?lifecycle, "lifecycle tracking disabled");
            return;
        }
        match lifecycle {
            LifecycleEvent::Foreground if self.lifecycle_active => {
                debug!("lifecycle session already running");
            }
            LifecycleEvent::Foreground => {
                self.adobe.collect_lifecycle_data();
                self.lifecycle_active = true;
                info!("adobe lifecycle collection started");
            }
            LifecycleEvent::Background => {
                self.adobe.pause_collecting_lifecycle_data();
                self.lifecycle_active = false;
                info!("adobe lifecycle collection paused");
            }
        }
    }

    fn context_data(&self, event: &GenericEvent) -> ContextData {
        merge(
            &self.global_context,
            map_context_data(&self.config, &event.properties),
        )
    }
}

impl Integration for AdobeIntegration {
    fn dump(&mut self, event: &GenericEvent) {
        if let Err(e) = self.process(event) {
            warn!(
                error = %e,
                message_id = %event.message_id,
                "event not forwarded to adobe"
            );
        }
    }

    fn reset(&mut self) {
        self.adobe.set_user_identifier(None);
        self.adobe.clear_current_beacon();
        self.global_context.clear();
        self.video.end_session();
        info!("adobe integration reset");
    }

    fn flush(&mut self) {
        self.adobe.send_queued_hits();
    }
}

impl Drop for AdobeIntegration {
    fn drop(&mut self) {
        self.video.end_session();
    }
}

/// Builds [`AdobeIntegration`]s for the host registry. Carries the native
/// Adobe binding and the injectable heartbeat/media-object factories.
pub struct AdobeIntegrationFactory {
    adobe: Arc<dyn Fn() -> Box<dyn AdobeMobile> + Send + Sync>,
    heartbeat_factory: Arc<dyn HeartbeatFactory>,
    media_factory: Arc<dyn MediaObjectFactory>,
    clock: Arc<dyn Clock>,
}

impl AdobeIntegrationFactory {
    pub fn new(adobe: impl Fn() -> Box<dyn AdobeMobile> + Send + Sync + 'static) -> Self {
        Self {
            adobe: Arc::new(adobe),
            heartbeat_factory: Arc::new(DisabledHeartbeatFactory),
            media_factory: Arc::new(StandardMediaObjectFactory),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_heartbeat_factory(mut self, factory: Arc<dyn HeartbeatFactory>) -> Self {
        self.heartbeat_factory = factory;
        self
    }

    pub fn with_media_object_factory(mut self, factory: Arc<dyn MediaObjectFactory>) -> Self {
        self.media_factory = factory;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Typed construction, for hosts that hold the factory directly.
    pub fn build(
        &self,
        raw_config: &serde_json::Value,
        client: &dyn HostClient,
        host_config: &HostConfig,
    ) -> IntegrationResult<AdobeIntegration> {
        let config = AdobeConfig::parse(raw_config)?;
        let video = VideoTracker::new(
            self.heartbeat_factory.clone(),
            self.media_factory.clone(),
            self.clock.clone(),
            HeartbeatSettings {
                tracking_server: config.heartbeat_tracking_server_url.clone(),
                app_version: host_config.app_version.clone(),
                ssl: config.ssl,
                debug_logging: config.video_debug,
            },
        );
        Ok(AdobeIntegration::new(
            config,
            (self.adobe)(),
            video,
            client,
            host_config,
        ))
    }
}

impl IntegrationFactory for AdobeIntegrationFactory {
    fn key(&self) -> &str {
        ADOBE_KEY
    }

    fn create(
        &self,
        config: &serde_json::Value,
        client: Arc<dyn HostClient>,
        host_config: &HostConfig,
    ) -> IntegrationResult<Box<dyn Integration>> {
        let integration = self.build(config, client.as_ref(), host_config)?;
        Ok(Box::new(integration))
    }
}
