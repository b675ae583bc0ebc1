//! Light-Show Core - DMX Data Model and Fixture Logic
//!
//! This crate contains the tick-side half of the DMX-to-fixture pipeline:
//! - Universe buffer holding the latest 512-channel snapshot per universe
//! - Fixture binding table (universe, offset, footprint)
//! - Fixture state machines (moving head)
//! - Beam targeting against world geometry
//! - Show settings and logging configuration
//!
//! Everything that touches the rendering host goes through the traits in
//! [`host`]; nothing here performs network I/O.

#![warn(missing_docs)]

pub use glam::Vec3;
use thiserror::Error;

pub mod beam;
pub mod binding;
pub mod engine;
pub mod fixture;
pub mod host;
pub mod logging;
pub mod settings;
pub mod universe;

// --- Re-exports grouped by category ---

// DMX data
pub use binding::{BindingTable, FixtureBinding};
pub use universe::{
    Universe, UniverseBuffer, UniverseFrame, CHANNELS_PER_UNIVERSE, MAX_UNIVERSE,
};

// Fixtures
pub use fixture::{
    Fixture, FixtureKind, FixtureState, LightLevel, MovingHead, MovingHeadState, TickContext,
};

// Rendering host
pub use host::{Appearance, BeamId, EntityId, Glow, HeadPose, ProxyKind, RenderHost, WorldGeometry};

// Show
pub use engine::{ShowEngine, TickCadence};

// Settings & Logging
pub use logging::LogConfig;
pub use settings::{
    ArtNetSettings, DmxEntry, EffectSettings, Endpoint, FixtureSpec, MovingLightSettings,
    RedirectorSettings, ShowSettings, StatusMessages,
};

/// Core error types
#[derive(Error, Debug)]
pub enum CoreError {
    /// Show configuration rejected at load time
    #[error("Config error: {0}")]
    ConfigError(String),

    /// Two fixtures claim the same channels of one universe
    #[error("Fixtures overlap in universe {universe}: channels {first:?} and {second:?}")]
    OverlappingBindings {
        /// Universe both bindings live in
        universe: u16,
        /// Channel range of the earlier binding
        first: std::ops::Range<usize>,
        /// Channel range of the conflicting binding
        second: std::ops::Range<usize>,
    },

    /// Requested channel window does not fit into a universe
    #[error("Channel window out of range: offset {offset} + length {length} > 512")]
    OutOfRange {
        /// First channel of the window (0-based)
        offset: usize,
        /// Window length in channels
        length: usize,
    },

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
