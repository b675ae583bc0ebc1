//! Show engine
//!
//! Body of the fixed-rate tick loop. Every tick walks the bound fixtures in
//! configuration order and lets each one decode its channel window and
//! emit side effects. Fixtures whose universe has never received a frame
//! are skipped and keep their default state; a frame that stops inside a
//! fixture's window hands it a short window, so it keeps its last state.

use std::collections::BTreeMap;

use crate::binding::{BindingTable, FixtureBinding};
use crate::fixture::{Fixture, FixtureState, TickContext};
use crate::host::RenderHost;
use crate::settings::{EffectSettings, ShowSettings};
use crate::universe::{UniverseBuffer, UniverseFrame};
use crate::Result;

/// Marks every Nth tick for throttled events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickCadence {
    every: u32,
}

impl TickCadence {
    /// Cadence firing every `every` ticks (0 is treated as 1)
    pub fn new(every: u32) -> Self {
        Self {
            every: every.max(1),
        }
    }

    /// Whether `tick_index` is a cadence marker; tick 0 always is
    pub fn is_tick(&self, tick_index: u64) -> bool {
        tick_index % u64::from(self.every) == 0
    }

    /// Ticks between two markers
    pub fn every(&self) -> u32 {
        self.every
    }
}

struct BoundFixture {
    binding: FixtureBinding,
    fixture: Box<dyn Fixture>,
}

/// Owns every fixture of a show and advances them one tick at a time
pub struct ShowEngine {
    fixtures: Vec<BoundFixture>,
    cadence: TickCadence,
    tick_index: u64,
}

impl ShowEngine {
    /// Build every bound fixture and spawn its proxies on the host
    pub fn build(
        table: &BindingTable,
        effects: &EffectSettings,
        host: &mut dyn RenderHost,
    ) -> Self {
        let mut fixtures = Vec::with_capacity(table.len());
        for binding in table.bindings() {
            fixtures.push(BoundFixture {
                fixture: binding.kind().build(&binding.fixture, effects, &mut *host),
                binding: binding.clone(),
            });
        }

        tracing::info!("Show engine built with {} fixtures", fixtures.len());

        Self {
            fixtures,
            cadence: TickCadence::new(effects.moving_light.color_change_cadence),
            tick_index: 0,
        }
    }

    /// Validate settings and build the engine from them
    pub fn from_settings(settings: &ShowSettings, host: &mut dyn RenderHost) -> Result<Self> {
        let table = settings.validate()?;
        Ok(Self::build(&table, &settings.effects, host))
    }

    /// Bind an already constructed fixture, e.g. of a custom kind.
    ///
    /// The binding is not checked against the existing ones.
    pub fn push_fixture(&mut self, binding: FixtureBinding, fixture: Box<dyn Fixture>) {
        self.fixtures.push(BoundFixture { binding, fixture });
    }

    /// Override the cadence of throttled events
    pub fn set_cadence(&mut self, cadence: TickCadence) {
        self.cadence = cadence;
    }

    /// Advance every fixture by one tick
    pub fn tick(&mut self, buffer: &UniverseBuffer, host: &mut dyn RenderHost) {
        let is_tick = self.cadence.is_tick(self.tick_index);

        // One snapshot per universe so fixtures sharing a universe see the same frame
        let mut frames: BTreeMap<u16, Option<UniverseFrame>> = BTreeMap::new();

        for bound in &mut self.fixtures {
            let universe = bound.binding.universe;
            let frame = frames
                .entry(universe)
                .or_insert_with(|| buffer.get(universe));
            let Some(frame) = frame else {
                continue;
            };

            // A frame that stops inside the window yields a short window
            let window = frame.received_window(bound.binding.channels());

            let mut ctx = TickContext {
                host: &mut *host,
                tick_index: self.tick_index,
                is_tick,
            };
            bound.fixture.apply_state(window, &mut ctx);
        }

        self.tick_index += 1;
    }

    /// Remove every proxy and effect spawned by the fixtures
    pub fn shutdown(&mut self, host: &mut dyn RenderHost) {
        for bound in &mut self.fixtures {
            bound.fixture.despawn(host);
        }
        tracing::info!(
            "Show engine shut down after {} ticks ({} fixtures)",
            self.tick_index,
            self.fixtures.len()
        );
        self.fixtures.clear();
    }

    /// Number of ticks run so far
    pub fn tick_index(&self) -> u64 {
        self.tick_index
    }

    /// Number of bound fixtures
    pub fn fixture_count(&self) -> usize {
        self.fixtures.len()
    }

    /// Binding and current state of every fixture, in tick order
    pub fn fixture_states(&self) -> Vec<(&FixtureBinding, FixtureState)> {
        self.fixtures
            .iter()
            .map(|bound| (&bound.binding, bound.fixture.state()))
            .collect()
    }
}
