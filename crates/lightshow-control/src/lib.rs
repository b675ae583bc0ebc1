//! Light-Show Control - Art-Net input for the show
//!
//! This crate is the network side of the show:
//! - **DMX**: Art-Net OpDmx frame decoding and encoding
//! - **Redirector**: UDP listener that fills the universe buffer and relays
//!   frames to a downstream consumer
//! - **Auth**: pluggable frame verification, including a pre-shared key
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lightshow_control::{Redirector, RedirectorConfig, StartStatus};
//! use lightshow_core::{ShowSettings, UniverseBuffer};
//!
//! # async fn run(settings: ShowSettings) {
//! let redirector = Redirector::new(UniverseBuffer::new());
//! let result = redirector
//!     .start(RedirectorConfig::from_settings(&settings.art_net))
//!     .await;
//! let code = StartStatus::from(&result).code();
//! println!("{}", settings.art_net.messages.for_start(code));
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`dmx`] - Art-Net frame codec
//! - [`redirector`] - Redirector session and frame verification
//! - [`error`] - Error types

#![warn(missing_docs)]

/// DMX input (Art-Net)
pub mod dmx;
/// Error types
pub mod error;
/// Art-Net redirector
pub mod redirector;

// Re-exports
pub use dmx::ArtDmx;
pub use error::{ControlError, ProtocolError, Result, StartError, StopError};
pub use redirector::{
    stop_code, FrameVerifier, OpenAccess, Redirector, RedirectorConfig, RedirectorStats,
    RedirectorStatus, SharedKey, StartStatus,
};
