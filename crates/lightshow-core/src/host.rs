//! Rendering host interface
//!
//! Fixtures never draw anything themselves. They spawn proxy entities,
//! change their pose and appearance, and drive beam effects through
//! [`RenderHost`]. Beam targeting queries world geometry through
//! [`WorldGeometry`], which every host also provides.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Handle of a proxy entity spawned by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

/// Handle of a beam effect spawned by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BeamId(pub u64);

/// What a proxy entity represents in the fixture rig
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProxyKind {
    /// Visible fixture head, wears the level texture
    Head,
    /// Small invisible proxy that renders the glow of its head
    Light {
        /// The head whose appearance this proxy follows
        head: EntityId,
    },
}

/// Glow emitted by a light proxy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Glow {
    /// No light
    #[default]
    None,
    /// Low intensity
    Low,
    /// Medium intensity
    Medium,
    /// Full intensity
    High,
}

/// Visual state of a fixture head
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appearance {
    /// Named visual asset (texture/material) worn by the head
    pub asset: String,
    /// Glow rendered by the head's light proxies
    pub glow: Glow,
}

/// Head orientation in degrees (pitch, yaw, roll)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HeadPose {
    /// Rotation around the horizontal axis
    pub pitch: f32,
    /// Rotation around the vertical axis
    pub yaw: f32,
    /// Rotation around the facing axis
    pub roll: f32,
}

impl HeadPose {
    /// Pose for a yaw/pitch pair with no roll
    pub fn new(yaw: f32, pitch: f32) -> Self {
        Self {
            pitch,
            yaw,
            roll: 0.0,
        }
    }
}

/// World geometry queries
pub trait WorldGeometry {
    /// First solid-surface hit along `direction` from `origin`, at most
    /// `max_distance` away. `direction` is a unit vector.
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<Vec3>;
}

/// Outbound calls from fixtures to the rendering host
pub trait RenderHost: WorldGeometry {
    /// Spawn a proxy entity at `location` wearing `appearance`
    fn spawn_proxy(&mut self, location: Vec3, kind: ProxyKind, appearance: &Appearance)
        -> EntityId;

    /// Remove a proxy entity
    fn destroy_proxy(&mut self, entity: EntityId);

    /// Change the head pose of a proxy entity
    fn update_pose(&mut self, entity: EntityId, pose: HeadPose);

    /// Change the equipment/appearance of a head and its light proxies
    fn update_appearance(&mut self, entity: EntityId, appearance: &Appearance);

    /// Spawn a beam effect starting at `source`
    fn spawn_beam(&mut self, source: Vec3) -> BeamId;

    /// Move the end point of a beam
    fn set_beam_destination(&mut self, beam: BeamId, destination: Vec3);

    /// Remove a beam effect
    fn destroy_beam(&mut self, beam: BeamId);

    /// Ask the beam to cycle its colour
    fn trigger_color_change(&mut self, beam: BeamId);
}
