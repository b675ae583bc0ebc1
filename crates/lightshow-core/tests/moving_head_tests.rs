mod common;

use common::{moving_head_window, HostCall, RecordingHost};
use lightshow_core::{
    Fixture, FixtureKind, FixtureState, Glow, LightLevel, MovingHead, MovingHeadState,
    MovingLightSettings, ProxyKind, TickContext, Vec3,
};

const ANCHOR: Vec3 = Vec3::new(0.0, 20.0, 0.0);

fn spawn(host: &mut RecordingHost) -> MovingHead {
    MovingHead::spawn(ANCHOR, 100.0, MovingLightSettings::default(), host)
}

fn apply(head: &mut MovingHead, host: &mut RecordingHost, window: &[u8], is_tick: bool) {
    let mut ctx = TickContext {
        host,
        tick_index: 0,
        is_tick,
    };
    head.apply_state(window, &mut ctx);
}

fn state(head: &MovingHead) -> MovingHeadState {
    match head.state() {
        FixtureState::MovingHead(state) => state,
    }
}

#[test]
fn test_spawn_layout() {
    let mut host = RecordingHost::new();
    let head = spawn(&mut host);
    let (head_id, light_id) = head.proxies();

    assert_eq!(head.kind(), FixtureKind::MovingHead);
    assert_eq!(head.footprint(), 7);
    assert_eq!(host.calls.len(), 2);

    match &host.calls[0] {
        HostCall::SpawnProxy(id, location, ProxyKind::Head, appearance) => {
            assert_eq!(*id, head_id);
            assert_eq!(*location, Vec3::new(0.0, 18.5, 0.0));
            assert_eq!(appearance.asset, "moving_head_off");
            assert_eq!(appearance.glow, Glow::None);
        }
        other => panic!("unexpected call {:?}", other),
    }
    match &host.calls[1] {
        HostCall::SpawnProxy(id, location, ProxyKind::Light { head }, _) => {
            assert_eq!(*id, light_id);
            assert_eq!(*head, head_id);
            assert!((location.y - 19.225).abs() < 1e-5);
        }
        other => panic!("unexpected call {:?}", other),
    }

    let initial = state(&head);
    assert_eq!(initial.level, LightLevel::Off);
    assert!(!initial.beam_active);
}

#[test]
fn test_bright_frame_activates_beam() {
    let mut host = RecordingHost::new();
    let mut head = spawn(&mut host);
    host.clear();

    apply(&mut head, &mut host, &[200, 0x00, 0x00, 0x00, 0x00, 128, 1], true);

    let s = state(&head);
    assert_eq!(s.level, LightLevel::High);
    assert_eq!(s.yaw, 0.0);
    assert_eq!(s.pitch, 0.0);
    assert!((s.beam_distance - 50.2).abs() < 0.01);
    assert!(s.color_change_pending);
    assert!(s.beam_active);

    let appearances = host.appearance_updates();
    assert_eq!(appearances.len(), 1);
    assert_eq!(appearances[0].asset, "moving_head_high");
    assert_eq!(appearances[0].glow, Glow::High);

    assert_eq!(host.beams_spawned(), 1);
    assert_eq!(host.color_changes(), 1);
    assert_eq!(host.poses(), 0);

    match host.calls.iter().find(|c| matches!(c, HostCall::SpawnBeam(..))) {
        Some(HostCall::SpawnBeam(_, source)) => assert_eq!(*source, Vec3::new(0.0, 19.5, 0.0)),
        other => panic!("unexpected call {:?}", other),
    }

    // Rest position points straight down, nothing in the way
    let end = host.last_destination().unwrap();
    assert!((end - Vec3::new(0.0, 20.0 - s.beam_distance, 0.0)).length() < 1e-3);
}

#[test]
fn test_blackout_destroys_beam_once() {
    let mut host = RecordingHost::new();
    let mut head = spawn(&mut host);
    apply(&mut head, &mut host, &[200, 0, 0, 0, 0, 128, 1], true);
    host.clear();

    apply(&mut head, &mut host, &[0, 0, 0, 0, 0, 128, 1], true);

    let s = state(&head);
    assert_eq!(s.level, LightLevel::Off);
    assert!(!s.beam_active);
    assert_eq!(host.beams_destroyed(), 1);
    assert_eq!(host.color_changes(), 0);

    let appearances = host.appearance_updates();
    assert_eq!(appearances.len(), 1);
    assert_eq!(appearances[0].asset, "moving_head_off");
    assert_eq!(appearances[0].glow, Glow::None);

    // Unchanged frames produce no further host calls
    host.clear();
    for _ in 0..5 {
        apply(&mut head, &mut host, &[0, 0, 0, 0, 0, 128, 1], true);
    }
    assert!(host.calls.is_empty());
}

#[test]
fn test_level_change_only_on_delta() {
    let mut host = RecordingHost::new();
    let mut head = spawn(&mut host);
    host.clear();

    apply(&mut head, &mut host, &moving_head_window(50, 0, 0, 0, 0), true);
    apply(&mut head, &mut host, &moving_head_window(60, 0, 0, 0, 0), true);
    apply(&mut head, &mut host, &moving_head_window(100, 0, 0, 0, 0), true);

    let assets: Vec<_> = host
        .appearance_updates()
        .iter()
        .map(|a| a.asset.clone())
        .collect();
    assert_eq!(assets, vec!["moving_head_low", "moving_head_medium"]);
}

#[test]
fn test_pan_tilt_updates_both_proxies() {
    let mut host = RecordingHost::new();
    let mut head = spawn(&mut host);
    let (head_id, light_id) = head.proxies();
    host.clear();

    apply(&mut head, &mut host, &moving_head_window(0, 0x8000, 0x4000, 0, 0), true);

    let s = state(&head);
    assert!((s.yaw + 180.0).abs() < 0.01);
    assert!((s.pitch + 90.0).abs() < 0.01);

    let posed: Vec<_> = host
        .calls
        .iter()
        .filter_map(|call| match call {
            HostCall::UpdatePose(id, pose) => Some((*id, *pose)),
            _ => None,
        })
        .collect();
    assert_eq!(posed.len(), 2);
    assert_eq!(posed[0].0, head_id);
    assert_eq!(posed[1].0, light_id);
    assert_eq!(posed[0].1.yaw, s.yaw);
    assert_eq!(posed[0].1.pitch, s.pitch);
    assert_eq!(posed[0].1.roll, 0.0);

    host.clear();
    apply(&mut head, &mut host, &moving_head_window(0, 0x8000, 0x4000, 0, 0), true);
    assert_eq!(host.poses(), 0);
}

#[test]
fn test_color_change_throttled_by_cadence() {
    let mut host = RecordingHost::new();
    let mut head = spawn(&mut host);
    host.clear();

    let window = moving_head_window(255, 0, 0, 255, 1);
    apply(&mut head, &mut host, &window, false);
    apply(&mut head, &mut host, &window, false);
    assert_eq!(host.color_changes(), 0);

    apply(&mut head, &mut host, &window, true);
    assert_eq!(host.color_changes(), 1);

    // Destination is refreshed on every lit tick
    assert_eq!(
        host.count(|c| matches!(c, HostCall::SetBeamDestination(..))),
        3
    );
    assert_eq!(host.beams_spawned(), 1);
}

#[test]
fn test_zero_distance_keeps_beam_off() {
    let mut host = RecordingHost::new();
    let mut head = spawn(&mut host);
    host.clear();

    apply(&mut head, &mut host, &moving_head_window(255, 0, 0, 0, 1), true);

    assert_eq!(state(&head).level, LightLevel::High);
    assert_eq!(host.beams_spawned(), 0);
    assert_eq!(host.color_changes(), 0);
}

#[test]
fn test_beam_stops_at_floor() {
    let mut host = RecordingHost::with_floor(5.0);
    let mut head = spawn(&mut host);

    apply(&mut head, &mut host, &moving_head_window(255, 0, 0, 255, 0), true);

    let end = host.last_destination().unwrap();
    assert!((end - Vec3::new(0.0, 5.0, 0.0)).length() < 1e-3);
}

#[test]
fn test_short_window_holds_state() {
    let mut host = RecordingHost::new();
    let mut head = spawn(&mut host);
    apply(&mut head, &mut host, &moving_head_window(255, 100, 200, 10, 0), true);
    let before = state(&head);
    host.clear();

    apply(&mut head, &mut host, &[0, 0, 0], true);
    apply(&mut head, &mut host, &[], true);

    assert_eq!(state(&head), before);
    assert!(host.calls.is_empty());
}

#[test]
fn test_despawn_removes_everything() {
    let mut host = RecordingHost::new();
    let mut head = spawn(&mut host);
    apply(&mut head, &mut host, &moving_head_window(255, 0, 0, 255, 0), true);
    host.clear();

    head.despawn(&mut host);

    assert_eq!(host.beams_destroyed(), 1);
    assert_eq!(
        host.count(|c| matches!(c, HostCall::DestroyProxy(_))),
        2
    );
    assert!(!state(&head).beam_active);
}
