//! Beam targeting
//!
//! Turns a fixture's yaw/pitch/distance into the world-space end point of
//! its beam, stopping at the first solid surface in the way.

use glam::Vec3;

use crate::host::WorldGeometry;

/// The ray starts this far along the beam so it does not hit the fixture's
/// own proxy geometry.
pub const TRACE_START_OFFSET: f32 = 0.1;

/// Correction between the fixture's logical forward axis and the host's
/// world-direction convention, in degrees.
const YAW_CORRECTION: f32 = -90.0;
const PITCH_CORRECTION: f32 = 90.0;

/// Unit direction for a yaw/pitch pair in degrees.
///
/// Yaw 0 faces +Z and grows towards -X; pitch 90 faces straight down.
pub fn direction(yaw: f32, pitch: f32) -> Vec3 {
    let (yaw_sin, yaw_cos) = yaw.to_radians().sin_cos();
    let (pitch_sin, pitch_cos) = pitch.to_radians().sin_cos();
    Vec3::new(-pitch_cos * yaw_sin, -pitch_sin, pitch_cos * yaw_cos)
}

/// Direction of a fixture beam for its pan/tilt angles
pub fn beam_direction(yaw: f32, pitch: f32) -> Vec3 {
    direction(yaw + YAW_CORRECTION, pitch + PITCH_CORRECTION)
}

/// End point of a beam leaving `anchor`.
///
/// A zero distance collapses the beam onto its source. Otherwise the beam
/// ends at the first surface hit within `distance`, or at full length.
pub fn destination<W>(yaw: f32, pitch: f32, distance: f32, anchor: Vec3, world: &W) -> Vec3
where
    W: WorldGeometry + ?Sized,
{
    if distance <= 0.0 {
        return anchor;
    }

    let direction = beam_direction(yaw, pitch);
    let full_length = anchor + direction * distance;
    let trace_start = anchor + direction * TRACE_START_OFFSET;

    world
        .raycast(trace_start, direction, distance)
        .unwrap_or(full_length)
}
