//! Recording rendering host shared by the integration tests

#![allow(dead_code)]

use lightshow_core::{
    Appearance, BeamId, EntityId, HeadPose, ProxyKind, RenderHost, Vec3, WorldGeometry,
};

#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    SpawnProxy(EntityId, Vec3, ProxyKind, Appearance),
    DestroyProxy(EntityId),
    UpdatePose(EntityId, HeadPose),
    UpdateAppearance(EntityId, Appearance),
    SpawnBeam(BeamId, Vec3),
    SetBeamDestination(BeamId, Vec3),
    DestroyBeam(BeamId),
    TriggerColorChange(BeamId),
}

/// Host that records every call; optionally has a floor at `floor_height`
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub calls: Vec<HostCall>,
    pub floor_height: Option<f32>,
    next_id: u64,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_floor(height: f32) -> Self {
        Self {
            floor_height: Some(height),
            ..Self::default()
        }
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    pub fn appearance_updates(&self) -> Vec<&Appearance> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                HostCall::UpdateAppearance(_, appearance) => Some(appearance),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, predicate: impl Fn(&HostCall) -> bool) -> usize {
        self.calls.iter().filter(|call| predicate(call)).count()
    }

    pub fn poses(&self) -> usize {
        self.count(|call| matches!(call, HostCall::UpdatePose(..)))
    }

    pub fn color_changes(&self) -> usize {
        self.count(|call| matches!(call, HostCall::TriggerColorChange(_)))
    }

    pub fn beams_spawned(&self) -> usize {
        self.count(|call| matches!(call, HostCall::SpawnBeam(..)))
    }

    pub fn beams_destroyed(&self) -> usize {
        self.count(|call| matches!(call, HostCall::DestroyBeam(_)))
    }

    pub fn last_destination(&self) -> Option<Vec3> {
        self.calls.iter().rev().find_map(|call| match call {
            HostCall::SetBeamDestination(_, destination) => Some(*destination),
            _ => None,
        })
    }

    fn next(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl WorldGeometry for RecordingHost {
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<Vec3> {
        let height = self.floor_height?;
        if direction.y >= 0.0 {
            return None;
        }
        let t = (height - origin.y) / direction.y;
        (t >= 0.0 && t <= max_distance).then(|| origin + direction * t)
    }
}

impl RenderHost for RecordingHost {
    fn spawn_proxy(
        &mut self,
        location: Vec3,
        kind: ProxyKind,
        appearance: &Appearance,
    ) -> EntityId {
        let id = EntityId(self.next());
        self.calls
            .push(HostCall::SpawnProxy(id, location, kind, appearance.clone()));
        id
    }

    fn destroy_proxy(&mut self, entity: EntityId) {
        self.calls.push(HostCall::DestroyProxy(entity));
    }

    fn update_pose(&mut self, entity: EntityId, pose: HeadPose) {
        self.calls.push(HostCall::UpdatePose(entity, pose));
    }

    fn update_appearance(&mut self, entity: EntityId, appearance: &Appearance) {
        self.calls
            .push(HostCall::UpdateAppearance(entity, appearance.clone()));
    }

    fn spawn_beam(&mut self, source: Vec3) -> BeamId {
        let id = BeamId(self.next());
        self.calls.push(HostCall::SpawnBeam(id, source));
        id
    }

    fn set_beam_destination(&mut self, beam: BeamId, destination: Vec3) {
        self.calls
            .push(HostCall::SetBeamDestination(beam, destination));
    }

    fn destroy_beam(&mut self, beam: BeamId) {
        self.calls.push(HostCall::DestroyBeam(beam));
    }

    fn trigger_color_change(&mut self, beam: BeamId) {
        self.calls.push(HostCall::TriggerColorChange(beam));
    }
}

/// Moving-head channel window
pub fn moving_head_window(dim: u8, pan: u16, tilt: u16, distance: u8, color: u8) -> [u8; 7] {
    let [pan_hi, pan_lo] = pan.to_be_bytes();
    let [tilt_hi, tilt_lo] = tilt.to_be_bytes();
    [dim, pan_hi, pan_lo, tilt_hi, tilt_lo, distance, color]
}
