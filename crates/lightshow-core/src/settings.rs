//! Show settings
//!
//! Everything the show needs at start: where to listen for Art-Net, where
//! to relay it, how fixtures look and which channels they are bound to.
//! Loaded from JSON and read-only afterwards.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

use crate::binding::BindingTable;
use crate::fixture::{FixtureKind, LightLevel};
use crate::logging::LogConfig;
use crate::{CoreError, Result};

/// Default Art-Net UDP port
pub const ARTNET_PORT: u16 = 6454;

/// A network endpoint as entered by the operator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Host name or IP address
    pub ip: String,
    /// UDP port
    pub port: u16,
}

impl Endpoint {
    /// Create an endpoint
    pub fn new(ip: impl Into<String>, port: u16) -> Self {
        Self {
            ip: ip.into(),
            port,
        }
    }

    /// Parse `<ip>[:port]`, falling back to `default_port`
    pub fn parse(input: &str, default_port: u16) -> Result<Self> {
        let input = input.trim();
        let (ip, port) = match input.split_once(':') {
            None => (input, default_port),
            Some((ip, port)) => {
                if port.contains(':') {
                    return Err(CoreError::ConfigError(format!(
                        "Invalid endpoint '{}': expected <ip>[:port]",
                        input
                    )));
                }
                let port = port.parse::<u16>().map_err(|e| {
                    CoreError::ConfigError(format!("Invalid port in '{}': {}", input, e))
                })?;
                (ip, port)
            }
        };

        if ip.is_empty() {
            return Err(CoreError::ConfigError(format!(
                "Invalid endpoint '{}': missing address",
                input
            )));
        }

        Ok(Self::new(ip, port))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ip, self.port)
    }
}

/// Shared-key check on inbound frames
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectorSettings {
    /// Require the shared key on every frame
    #[serde(default)]
    pub enabled: bool,
    /// Shared key
    #[serde(default)]
    pub key: String,
}

/// Messages shown to the operator for start/stop status codes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusMessages {
    /// Start code `1`
    pub starting: String,
    /// Start code `0`
    pub already_running: String,
    /// Start code `-1`
    pub cannot_start: String,
    /// Stop code `1`
    pub stopping: String,
    /// Stop code `0`
    pub cannot_stop: String,
}

impl Default for StatusMessages {
    fn default() -> Self {
        Self {
            starting: "Art-Net receiver is starting.".to_string(),
            already_running: "Art-Net receiver is already running.".to_string(),
            cannot_start: "Art-Net receiver could not start: invalid address.".to_string(),
            stopping: "Art-Net receiver is stopping.".to_string(),
            cannot_stop: "Art-Net receiver is not running.".to_string(),
        }
    }
}

impl StatusMessages {
    /// Message for a start status code
    pub fn for_start(&self, code: i8) -> &str {
        match code {
            1 => &self.starting,
            0 => &self.already_running,
            _ => &self.cannot_start,
        }
    }

    /// Message for a stop status code
    pub fn for_stop(&self, code: i8) -> &str {
        match code {
            1 => &self.stopping,
            _ => &self.cannot_stop,
        }
    }
}

/// Art-Net receive/relay settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtNetSettings {
    /// Local endpoint to receive frames on
    #[serde(default = "default_listen")]
    pub listen: Endpoint,
    /// Downstream endpoint receiving every accepted frame
    #[serde(default)]
    pub forward: Option<Endpoint>,
    /// Shared-key check
    #[serde(default)]
    pub redirector: RedirectorSettings,
    /// How long start may take to resolve and bind, in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Operator messages
    #[serde(default)]
    pub messages: StatusMessages,
}

fn default_listen() -> Endpoint {
    Endpoint::new("0.0.0.0", ARTNET_PORT)
}

fn default_timeout_ms() -> u64 {
    5000
}

impl Default for ArtNetSettings {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            forward: None,
            redirector: RedirectorSettings::default(),
            timeout_ms: default_timeout_ms(),
            messages: StatusMessages::default(),
        }
    }
}

impl ArtNetSettings {
    /// The shared key, when the check is enabled
    pub fn shared_key(&self) -> Option<&str> {
        self.redirector
            .enabled
            .then_some(self.redirector.key.as_str())
    }

    /// Startup timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Moving-light look
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovingLightSettings {
    /// Head asset while dark
    pub off_texture: String,
    /// Head asset at low level
    pub low_texture: String,
    /// Head asset at medium level
    pub medium_texture: String,
    /// Head asset at high level
    pub high_texture: String,
    /// Beam length at distance 255, unless a fixture overrides it
    #[serde(default = "default_max_distance")]
    pub max_distance: f32,
    /// Colour changes are forwarded on every Nth tick
    #[serde(default = "default_color_change_cadence")]
    pub color_change_cadence: u32,
}

fn default_max_distance() -> f32 {
    100.0
}

fn default_color_change_cadence() -> u32 {
    4
}

impl Default for MovingLightSettings {
    fn default() -> Self {
        Self {
            off_texture: "moving_head_off".to_string(),
            low_texture: "moving_head_low".to_string(),
            medium_texture: "moving_head_medium".to_string(),
            high_texture: "moving_head_high".to_string(),
            max_distance: default_max_distance(),
            color_change_cadence: default_color_change_cadence(),
        }
    }
}

impl MovingLightSettings {
    /// Head asset for a light level
    pub fn texture_for(&self, level: LightLevel) -> &str {
        match level {
            LightLevel::High => &self.high_texture,
            LightLevel::Medium => &self.medium_texture,
            LightLevel::Low => &self.low_texture,
            LightLevel::Off => &self.off_texture,
        }
    }
}

/// Per-kind visual settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectSettings {
    /// Moving-head look
    #[serde(default)]
    pub moving_light: MovingLightSettings,
}

/// Definition of one fixture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureSpec {
    /// Fixture kind
    pub kind: FixtureKind,
    /// World-space anchor the rig hangs from
    pub location: Vec3,
    /// Overrides the kind's default maximum beam length
    #[serde(default)]
    pub max_distance: Option<f32>,
}

/// A fixture bound to a universe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DmxEntry {
    /// Universe (0-32767)
    pub universe: u16,
    /// First channel, 0-based
    #[serde(default)]
    pub offset: usize,
    /// The fixture itself
    pub fixture: FixtureSpec,
}

/// Complete show configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowSettings {
    /// Art-Net receive/relay settings
    #[serde(default)]
    pub art_net: ArtNetSettings,
    /// Visual settings per fixture kind
    #[serde(default)]
    pub effects: EffectSettings,
    /// Fixture bindings
    #[serde(default)]
    pub dmx_entries: Vec<DmxEntry>,
    /// Fixed tick rate of the fixture loop
    #[serde(default = "default_tick_rate_hz")]
    pub tick_rate_hz: u32,
    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
}

fn default_tick_rate_hz() -> u32 {
    20
}

impl Default for ShowSettings {
    fn default() -> Self {
        Self {
            art_net: ArtNetSettings::default(),
            effects: EffectSettings::default(),
            dmx_entries: Vec::new(),
            tick_rate_hz: default_tick_rate_hz(),
            log: LogConfig::default(),
        }
    }
}

impl ShowSettings {
    /// Parse settings from a JSON string and validate them
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: ShowSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read settings from a JSON file and validate them
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        tracing::info!(
            "Loaded show settings from {:?} ({} fixtures)",
            path,
            settings.dmx_entries.len()
        );
        Ok(settings)
    }

    /// Interval between two ticks
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.tick_rate_hz.max(1)))
    }

    /// Reject settings the show cannot start with
    pub fn validate(&self) -> Result<BindingTable> {
        if self.tick_rate_hz == 0 {
            return Err(CoreError::ConfigError(
                "tick_rate_hz must be greater than 0".to_string(),
            ));
        }

        if self.art_net.timeout_ms == 0 {
            return Err(CoreError::ConfigError(
                "art_net.timeout_ms must be greater than 0".to_string(),
            ));
        }

        if self.art_net.redirector.enabled && self.art_net.redirector.key.is_empty() {
            return Err(CoreError::ConfigError(
                "art_net.redirector is enabled but has no key".to_string(),
            ));
        }

        let moving_light = &self.effects.moving_light;
        if moving_light.color_change_cadence == 0 {
            return Err(CoreError::ConfigError(
                "color_change_cadence must be greater than 0".to_string(),
            ));
        }

        let distances = std::iter::once(moving_light.max_distance).chain(
            self.dmx_entries
                .iter()
                .filter_map(|entry| entry.fixture.max_distance),
        );
        for distance in distances {
            if !distance.is_finite() || distance < 0.0 {
                return Err(CoreError::ConfigError(format!(
                    "Invalid max distance: {}",
                    distance
                )));
            }
        }

        BindingTable::resolve(&self.dmx_entries)
    }
}
