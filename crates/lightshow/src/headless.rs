//! Rendering host without a renderer
//!
//! Keeps track of every proxy and beam the fixtures ask for and reports
//! the calls through `tracing`. The world is empty except for an optional
//! horizontal floor plane.

use std::collections::HashMap;

use lightshow_core::{
    Appearance, BeamId, EntityId, Glow, HeadPose, ProxyKind, RenderHost, Vec3, WorldGeometry,
};

struct Proxy {
    kind: ProxyKind,
    appearance: Appearance,
}

/// Host that renders nothing
#[derive(Default)]
pub struct HeadlessHost {
    floor: Option<f32>,
    proxies: HashMap<EntityId, Proxy>,
    beams: HashMap<BeamId, Vec3>,
    next_id: u64,
}

impl HeadlessHost {
    /// Empty world, or one with a floor plane at height `floor`
    pub fn new(floor: Option<f32>) -> Self {
        Self {
            floor,
            ..Default::default()
        }
    }

    /// Live proxy entities
    pub fn proxy_count(&self) -> usize {
        self.proxies.len()
    }

    /// Live beam effects
    pub fn beam_count(&self) -> usize {
        self.beams.len()
    }

    /// Appearance a live proxy currently wears
    pub fn appearance_of(&self, entity: EntityId) -> Option<&Appearance> {
        self.proxies.get(&entity).map(|p| &p.appearance)
    }

    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl WorldGeometry for HeadlessHost {
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<Vec3> {
        let floor = self.floor?;
        if direction.y >= 0.0 || origin.y < floor {
            return None;
        }
        let t = (floor - origin.y) / direction.y;
        (t <= max_distance).then(|| origin + direction * t)
    }
}

impl RenderHost for HeadlessHost {
    fn spawn_proxy(&mut self, location: Vec3, kind: ProxyKind, appearance: &Appearance) -> EntityId {
        let id = EntityId(self.allocate());
        tracing::debug!("Spawned {:?} proxy {:?} at {}", kind, id, location);
        self.proxies.insert(
            id,
            Proxy {
                kind,
                appearance: appearance.clone(),
            },
        );
        id
    }

    fn destroy_proxy(&mut self, entity: EntityId) {
        if self.proxies.remove(&entity).is_none() {
            tracing::warn!("Destroy of unknown proxy {:?}", entity);
        }
    }

    fn update_pose(&mut self, entity: EntityId, pose: HeadPose) {
        tracing::trace!("Proxy {:?} pose {:?}", entity, pose);
    }

    fn update_appearance(&mut self, entity: EntityId, appearance: &Appearance) {
        let Some(proxy) = self.proxies.get_mut(&entity) else {
            tracing::warn!("Appearance update for unknown proxy {:?}", entity);
            return;
        };
        tracing::debug!(
            "{:?} proxy {:?} now wears {} ({:?})",
            proxy.kind,
            entity,
            appearance.asset,
            appearance.glow
        );
        proxy.appearance = appearance.clone();

        for light in self
            .proxies
            .values_mut()
            .filter(|p| matches!(p.kind, ProxyKind::Light { head } if head == entity))
        {
            light.appearance = appearance.clone();
        }
    }

    fn spawn_beam(&mut self, source: Vec3) -> BeamId {
        let id = BeamId(self.allocate());
        tracing::debug!("Beam {:?} on at {}", id, source);
        self.beams.insert(id, source);
        id
    }

    fn set_beam_destination(&mut self, beam: BeamId, destination: Vec3) {
        if let Some(end) = self.beams.get_mut(&beam) {
            *end = destination;
        }
    }

    fn destroy_beam(&mut self, beam: BeamId) {
        if self.beams.remove(&beam).is_some() {
            tracing::debug!("Beam {:?} off", beam);
        }
    }

    fn trigger_color_change(&mut self, beam: BeamId) {
        tracing::debug!("Beam {:?} colour change", beam);
    }
}
