use lightshow_core::fixture::moving_head::{angle_from, proportion};
use lightshow_core::{beam, LightLevel, UniverseBuffer, Vec3, WorldGeometry};
use proptest::prelude::*;

struct Wall;

impl WorldGeometry for Wall {
    fn raycast(&self, origin: Vec3, _direction: Vec3, _max: f32) -> Option<Vec3> {
        Some(origin)
    }
}

proptest! {
    #[test]
    fn pan_stays_in_range(raw in any::<u16>()) {
        let [hi, lo] = raw.to_be_bytes();
        let angle = angle_from(hi, lo);
        prop_assert!(angle <= 0.0);
        prop_assert!(angle >= -360.0);
    }

    #[test]
    fn light_level_is_monotonic(a in any::<u8>(), b in any::<u8>()) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(LightLevel::from_dim(low) <= LightLevel::from_dim(high));
    }

    #[test]
    fn distance_within_max(value in any::<u8>(), max in 0.0f32..1000.0) {
        let distance = proportion(value, max);
        prop_assert!(distance >= 0.0);
        prop_assert!(distance <= max + 1e-3);
    }

    #[test]
    fn zero_distance_beam_is_anchor(
        yaw in -360.0f32..0.0,
        pitch in -360.0f32..0.0,
        x in -1000.0f32..1000.0,
        y in -1000.0f32..1000.0,
        z in -1000.0f32..1000.0,
    ) {
        let anchor = Vec3::new(x, y, z);
        prop_assert_eq!(beam::destination(yaw, pitch, 0.0, anchor, &Wall), anchor);
    }

    #[test]
    fn snapshot_is_zero_padded(universe in 0u16..=32767, data in proptest::collection::vec(any::<u8>(), 0..=512)) {
        let buffer = UniverseBuffer::new();
        buffer.replace(universe, &data);
        let snapshot = buffer.snapshot(universe);
        prop_assert_eq!(&snapshot[..data.len()], &data[..]);
        prop_assert!(snapshot[data.len()..].iter().all(|&v| v == 0));
    }
}
