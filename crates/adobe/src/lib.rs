//! Adobe Analytics device-mode destination. Translates host analytics
//! events into Adobe Mobile calls and drives Adobe Media Heartbeat sessions
//! from video playback events.
//!
//! # Modules
//!
//! - [`config`]: destination settings parsed from the dashboard payload
//! - [`integration`]: event dispatcher and the registry factory
//! - [`video`]: video vocabulary and playback state tracker
//! - [`playback`]: playhead bookkeeping polled by the heartbeat
//! - [`factory`]: injectable heartbeat / media object constructors
//! - [`context`]: context data and e-commerce translation
//! - [`vendor`]: the Adobe SDK surface the bridge calls
//! - [`testing`]: recording fakes and a manual clock

pub mod config;
pub mod context;
pub mod factory;
pub mod integration;
pub mod playback;
mod properties;
pub mod testing;
pub mod vendor;
pub mod video;

pub use config::{AdobeConfig, ProductIdentifier};
pub use factory::{
    DisabledHeartbeatFactory, HeartbeatFactory, MediaObjectFactory, StandardMediaObjectFactory,
};
pub use integration::{AdobeIntegration, AdobeIntegrationFactory, ADOBE_KEY};
pub use playback::{Clock, HeartbeatDelegate, PlaybackDelegate, SharedPlayback, SystemClock};
pub use vendor::{AdobeMobile, ContextData, HeartbeatConfig, MediaEvent, MediaHeartbeat, MediaObject};
pub use video::{VideoEvent, VideoTracker};
