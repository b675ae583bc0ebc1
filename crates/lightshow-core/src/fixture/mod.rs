//! Fixture state machines
//!
//! A fixture consumes a fixed window of channels in one universe and turns
//! it into host side effects once per tick. Side effects are only emitted
//! when the decoded state changes.
//!
//! New fixture kinds implement [`Fixture`] and get a [`FixtureKind`]
//! variant; the universe buffer and the redirector do not change.

pub mod moving_head;

use serde::{Deserialize, Serialize};

use crate::host::RenderHost;
use crate::settings::{EffectSettings, FixtureSpec};

pub use moving_head::{LightLevel, MovingHead, MovingHeadState};

/// Supported fixture kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixtureKind {
    /// Moving-head spotlight with dimmer, 16-bit pan/tilt, beam length and colour flag
    MovingHead,
}

impl FixtureKind {
    /// Number of consecutive channels this kind consumes
    pub fn footprint(&self) -> usize {
        match self {
            FixtureKind::MovingHead => MovingHead::FOOTPRINT,
        }
    }

    /// Stable identifier used in configuration files
    pub fn identifier(&self) -> &'static str {
        match self {
            FixtureKind::MovingHead => "moving_head",
        }
    }

    /// Create a fixture of this kind and spawn its proxies on the host
    pub fn build(
        &self,
        spec: &FixtureSpec,
        effects: &EffectSettings,
        host: &mut dyn RenderHost,
    ) -> Box<dyn Fixture> {
        match self {
            FixtureKind::MovingHead => {
                let max_distance = spec
                    .max_distance
                    .unwrap_or(effects.moving_light.max_distance);
                Box::new(MovingHead::spawn(
                    spec.location,
                    max_distance,
                    effects.moving_light.clone(),
                    host,
                ))
            }
        }
    }
}

/// Per-tick inputs handed to a fixture
pub struct TickContext<'a> {
    /// Rendering host receiving side effects
    pub host: &'a mut dyn RenderHost,
    /// Monotonic tick counter, starting at 0
    pub tick_index: u64,
    /// Whether this tick is a cadence marker for throttled events
    pub is_tick: bool,
}

/// Observable state of a fixture after its last apply step
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FixtureState {
    /// Moving-head state
    MovingHead(MovingHeadState),
}

/// A fixture bound to a channel window
pub trait Fixture: Send {
    /// Kind of this fixture
    fn kind(&self) -> FixtureKind;

    /// Number of channels read by [`Fixture::apply_state`]
    fn footprint(&self) -> usize {
        self.kind().footprint()
    }

    /// Decode the channel window and emit side effects for what changed.
    ///
    /// A window shorter than the footprint leaves the fixture untouched.
    fn apply_state(&mut self, window: &[u8], ctx: &mut TickContext<'_>);

    /// Current decoded state
    fn state(&self) -> FixtureState;

    /// Remove every proxy and effect this fixture spawned
    fn despawn(&mut self, host: &mut dyn RenderHost);
}
