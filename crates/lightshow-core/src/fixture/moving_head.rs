//! Moving-head spotlight
//!
//! Channel layout (7 channels):
//!
//! | # | channel   | meaning                               |
//! |---|-----------|---------------------------------------|
//! | 0 | dim       | light level, banded into 4 steps      |
//! | 1 | pan hi    | 16-bit pan, coarse                    |
//! | 2 | pan lo    | 16-bit pan, fine                      |
//! | 3 | tilt hi   | 16-bit tilt, coarse                   |
//! | 4 | tilt lo   | 16-bit tilt, fine                     |
//! | 5 | distance  | beam length, 0..max distance          |
//! | 6 | colour    | any non-zero value requests a change  |

use glam::Vec3;
use serde::Serialize;
use tracing::{debug, trace};

use super::{Fixture, FixtureKind, FixtureState, TickContext};
use crate::beam;
use crate::host::{Appearance, BeamId, EntityId, Glow, HeadPose, ProxyKind, RenderHost};
use crate::settings::MovingLightSettings;

/// Head proxy hangs this far below the anchor
const HEAD_OFFSET: Vec3 = Vec3::new(0.0, -1.5, 0.0);
/// Light proxy hangs this far below the anchor
const LIGHT_OFFSET: Vec3 = Vec3::new(0.0, -0.775, 0.0);
/// Beam effect starts this far below the anchor
const BEAM_OFFSET: Vec3 = Vec3::new(0.0, -0.5, 0.0);

/// Discrete light level of a moving head
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub enum LightLevel {
    /// Dark
    #[default]
    Off = 0,
    /// Up to a third
    Low = 1,
    /// Up to two thirds
    Medium = 2,
    /// Above two thirds
    High = 3,
}

impl LightLevel {
    /// Band a raw dimmer byte into four levels.
    ///
    /// The bands are the thirds of the byte range: 0, 1..=85, 86..=170,
    /// 171..=255, i.e. dimmer percentages above 0, 33⅓ and 66⅔.
    pub fn from_dim(dim: u8) -> Self {
        match dim {
            0 => LightLevel::Off,
            1..=85 => LightLevel::Low,
            86..=170 => LightLevel::Medium,
            _ => LightLevel::High,
        }
    }

    /// Numeric level 0..=3
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Whether any light is emitted
    pub fn is_lit(self) -> bool {
        self != LightLevel::Off
    }

    /// Glow rendered by the light proxy at this level
    pub fn glow(self) -> Glow {
        match self {
            LightLevel::Off => Glow::None,
            LightLevel::Low => Glow::Low,
            LightLevel::Medium => Glow::Medium,
            LightLevel::High => Glow::High,
        }
    }
}

/// Dimmer byte as a rounded percentage 0..=100
pub fn dim_percent(dim: u8) -> u8 {
    ((u32::from(dim) * 100 + 127) / 255) as u8
}

/// 16-bit angle from a coarse/fine channel pair, in `[-360, 0]` degrees.
///
/// The sign is inverted relative to the raw channel direction.
pub fn angle_from(hi: u8, lo: u8) -> f32 {
    let raw = u16::from_be_bytes([hi, lo]);
    360.0 * -(f32::from(raw) / 65535.0)
}

/// Linear scale of a byte onto `[0, max]`
pub fn proportion(value: u8, max: f32) -> f32 {
    max * f32::from(value) / 255.0
}

/// Decoded state of a moving head
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovingHeadState {
    /// Banded light level
    pub level: LightLevel,
    /// Dimmer percentage of the last window
    pub dim_percent: u8,
    /// Pan in degrees
    pub yaw: f32,
    /// Tilt in degrees
    pub pitch: f32,
    /// Beam length in world units
    pub beam_distance: f32,
    /// Colour change requested by the last window
    pub color_change_pending: bool,
    /// Whether the beam effect is live
    pub beam_active: bool,
}

/// Moving-head spotlight bound to 7 channels
pub struct MovingHead {
    anchor: Vec3,
    max_distance: f32,
    textures: MovingLightSettings,

    head: EntityId,
    light: EntityId,
    beam: Option<BeamId>,

    level: LightLevel,
    dim_percent: u8,
    yaw: f32,
    pitch: f32,
    beam_distance: f32,
    color_change_pending: bool,
}

impl MovingHead {
    /// Channels consumed by a moving head
    pub const FOOTPRINT: usize = 7;

    /// Spawn the head and light proxies below `anchor`, starting dark.
    pub fn spawn(
        anchor: Vec3,
        max_distance: f32,
        textures: MovingLightSettings,
        host: &mut dyn RenderHost,
    ) -> Self {
        let off = Appearance {
            asset: textures.texture_for(LightLevel::Off).to_string(),
            glow: Glow::None,
        };
        let head = host.spawn_proxy(anchor + HEAD_OFFSET, ProxyKind::Head, &off);
        let light = host.spawn_proxy(anchor + LIGHT_OFFSET, ProxyKind::Light { head }, &off);

        debug!(
            "Moving head spawned at {} (head {:?}, light {:?})",
            anchor, head, light
        );

        Self {
            anchor,
            max_distance,
            textures,
            head,
            light,
            beam: None,
            level: LightLevel::Off,
            dim_percent: 0,
            yaw: 0.0,
            pitch: 0.0,
            beam_distance: 0.0,
            color_change_pending: false,
        }
    }

    /// Anchor point the rig hangs from
    pub fn anchor(&self) -> Vec3 {
        self.anchor
    }

    /// Head and light proxy entities
    pub fn proxies(&self) -> (EntityId, EntityId) {
        (self.head, self.light)
    }

    fn appearance(&self, level: LightLevel) -> Appearance {
        Appearance {
            asset: self.textures.texture_for(level).to_string(),
            glow: level.glow(),
        }
    }

    fn look_at(&self, host: &mut dyn RenderHost) {
        let pose = HeadPose::new(self.yaw, self.pitch);
        host.update_pose(self.head, pose);
        host.update_pose(self.light, pose);
    }
}

impl Fixture for MovingHead {
    fn kind(&self) -> FixtureKind {
        FixtureKind::MovingHead
    }

    fn apply_state(&mut self, window: &[u8], ctx: &mut TickContext<'_>) {
        let Some(channels) = window.get(..Self::FOOTPRINT) else {
            trace!(
                "Moving head window too short ({} < {}), holding state",
                window.len(),
                Self::FOOTPRINT
            );
            return;
        };

        let dim = channels[0];
        let pan = angle_from(channels[1], channels[2]);
        let tilt = angle_from(channels[3], channels[4]);
        let distance = proportion(channels[5], self.max_distance);
        let color_change = channels[6] > 0;

        self.dim_percent = dim_percent(dim);
        self.beam_distance = distance;
        self.color_change_pending = color_change;

        let level = LightLevel::from_dim(dim);
        if level != self.level {
            debug!("Moving head {:?}: level {:?} -> {:?}", self.head, self.level, level);
            self.level = level;
            let appearance = self.appearance(level);
            ctx.host.update_appearance(self.head, &appearance);
        }

        if self.yaw != pan || self.pitch != tilt {
            self.yaw = pan;
            self.pitch = tilt;
            self.look_at(ctx.host);
        }

        if level.is_lit() && distance > 0.0 {
            let beam = match self.beam {
                Some(beam) => beam,
                None => {
                    let beam = ctx.host.spawn_beam(self.anchor + BEAM_OFFSET);
                    debug!("Moving head {:?}: beam {:?} on", self.head, beam);
                    self.beam = Some(beam);
                    beam
                }
            };

            let destination =
                beam::destination(self.yaw, self.pitch, distance, self.anchor, &*ctx.host);
            ctx.host.set_beam_destination(beam, destination);

            if color_change && ctx.is_tick {
                ctx.host.trigger_color_change(beam);
            }
        } else if let Some(beam) = self.beam.take() {
            debug!("Moving head {:?}: beam {:?} off", self.head, beam);
            ctx.host.destroy_beam(beam);
        }
    }

    fn state(&self) -> FixtureState {
        FixtureState::MovingHead(MovingHeadState {
            level: self.level,
            dim_percent: self.dim_percent,
            yaw: self.yaw,
            pitch: self.pitch,
            beam_distance: self.beam_distance,
            color_change_pending: self.color_change_pending,
            beam_active: self.beam.is_some(),
        })
    }

    fn despawn(&mut self, host: &mut dyn RenderHost) {
        if let Some(beam) = self.beam.take() {
            host.destroy_beam(beam);
        }
        host.destroy_proxy(self.light);
        host.destroy_proxy(self.head);
    }
}
