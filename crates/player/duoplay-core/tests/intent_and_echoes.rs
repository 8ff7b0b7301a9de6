use duoplay_core::{EngineEvent, Role, SeekPhase};
use duoplay_test_fixtures::{loaded_pair, Command, Harness};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn play_commands_both_and_echoes_do_not_touch_intent() {
    init();
    let (mut h, _, _) = loaded_pair().unwrap();

    h.engine.play();
    assert!(h.engine.is_playing());
    assert_eq!(h.primary().plays(), 1);
    assert_eq!(h.secondary().plays(), 1);

    // Both play events are echoes of our own commands.
    let delivered = h.pump().unwrap();
    assert_eq!(delivered, 2);
    assert!(h.engine.is_playing());
    assert!(h.primary().is_running());
    assert!(h.secondary().is_running());
    assert_eq!(h.primary().plays(), 1);
    assert_eq!(h.secondary().plays(), 1);

    let events = h.engine.drain_events();
    assert_eq!(events, vec![EngineEvent::PlayStateChanged { playing: true }]);
}

#[test]
fn pause_echoes_are_suppressed() {
    init();
    let (mut h, _, _) = loaded_pair().unwrap();
    h.start().unwrap();
    h.engine.drain_events();

    h.engine.pause();
    assert!(!h.engine.is_playing());
    h.pump().unwrap();
    assert!(!h.engine.is_playing());
    assert!(!h.primary().is_running());
    assert!(!h.secondary().is_running());
    // No re-issued commands from misread echoes.
    assert_eq!(h.primary().pauses(), 1);
    assert_eq!(h.secondary().pauses(), 1);
    assert_eq!(
        h.engine.drain_events(),
        vec![EngineEvent::PlayStateChanged { playing: false }]
    );
}

#[test]
fn play_and_pause_are_idempotent() {
    init();
    let (mut h, _, _) = loaded_pair().unwrap();
    h.start().unwrap();
    h.engine.play();
    h.pump().unwrap();
    assert_eq!(h.primary().plays(), 1);
    assert_eq!(h.secondary().plays(), 1);

    h.engine.pause();
    h.engine.pause();
    h.pump().unwrap();
    assert_eq!(h.primary().pauses(), 1);
    assert_eq!(h.secondary().pauses(), 1);
}

#[test]
fn external_primary_pause_propagates_once() {
    init();
    let (mut h, _, _) = loaded_pair().unwrap();
    h.start().unwrap();
    h.secondary().clear_commands();

    h.primary().external_pause();
    h.pump().unwrap();

    assert!(!h.engine.is_playing());
    assert_eq!(h.secondary().pauses(), 1);
    assert!(!h.secondary().is_running());
    // The secondary's pause echo was consumed.
    assert!(!h
        .engine
        .suppression()
        .is_armed(Role::Secondary, duoplay_core::EchoKind::Pause));
}

#[test]
fn external_primary_play_starts_secondary() {
    init();
    let (mut h, _, _) = loaded_pair().unwrap();

    h.primary().external_play();
    h.pump().unwrap();

    assert!(h.engine.is_playing());
    assert_eq!(h.secondary().plays(), 1);
    assert!(h.secondary().is_running());
    assert_eq!(h.primary().plays(), 0);
}

#[test]
fn stall_on_secondary_then_resume() {
    init();
    let (mut h, _, _) = loaded_pair().unwrap();

    h.engine.play();
    assert!(h.engine.is_playing());
    assert_eq!(h.primary().plays(), 1);
    assert_eq!(h.secondary().plays(), 1);
    h.pump().unwrap();

    // Buffering stall on the audio element.
    h.secondary().external_pause();
    h.pump().unwrap();
    assert!(!h.engine.is_playing());
    assert_eq!(h.primary().pauses(), 1);
    assert!(!h.primary().is_running());

    h.engine.play();
    h.pump().unwrap();
    assert!(h.engine.is_playing());
    assert!(h.primary().is_running());
    assert!(h.secondary().is_running());
}

#[test]
fn unrequested_pause_while_paused_is_ignored() {
    init();
    let (mut h, _, _) = loaded_pair().unwrap();
    h.start().unwrap();
    h.engine.pause();
    h.pump().unwrap();
    h.primary().clear_commands();
    h.secondary().clear_commands();

    h.secondary().external_play();
    h.secondary().external_pause();
    h.pump().unwrap();

    // By delivery the secondary is paused again: the play is stale, the pause changes nothing.
    assert!(!h.engine.is_playing());
    assert!(!h.primary().is_running());
}

#[test]
fn pause_during_seek_does_not_drop_intent() {
    init();
    let (mut h, _, _) = loaded_pair().unwrap();
    h.start().unwrap();

    h.engine.seek(30.0);
    h.pump().unwrap();
    assert!(matches!(h.engine.seek_phase(), SeekPhase::Settling { .. }));

    // The platform pausing a transport mid-seek is not a user pause.
    h.primary().external_pause();
    h.pump().unwrap();
    assert!(h.engine.is_playing());

    h.settle().unwrap();
    assert!(h.engine.is_playing());
    assert!(h.primary().is_running());
    assert!(h.secondary().is_running());
}

#[test]
fn sync_rejection_keeps_intent_and_clears_suppression() {
    init();
    let (mut h, _, _) = loaded_pair().unwrap();
    h.primary().play_policy = duoplay_test_fixtures::PlayPolicy::RejectSync;

    h.engine.play();
    h.pump().unwrap();

    assert!(h.engine.is_playing());
    assert!(!h.primary().is_running());
    assert!(!h
        .engine
        .suppression()
        .is_armed(Role::Primary, duoplay_core::EchoKind::Play));
    let events = h.engine.drain_events();
    assert!(events
        .iter()
        .any(|e| matches!(e, EngineEvent::CommandRejected { role: Role::Primary, .. })));

    // A later user gesture retries.
    h.primary().play_policy = duoplay_test_fixtures::PlayPolicy::Allow;
    h.engine.play();
    h.pump().unwrap();
    assert!(h.primary().is_running());
    assert_eq!(h.primary().plays(), 2);
}

#[test]
fn async_rejection_clears_suppression() {
    init();
    let (mut h, _, _) = loaded_pair().unwrap();
    h.secondary().play_policy = duoplay_test_fixtures::PlayPolicy::RejectAsync;

    h.engine.play();
    assert!(h
        .engine
        .suppression()
        .is_armed(Role::Secondary, duoplay_core::EchoKind::Play));
    h.pump().unwrap();
    assert!(!h
        .engine
        .suppression()
        .is_armed(Role::Secondary, duoplay_core::EchoKind::Play));
    assert!(h.engine.is_playing());

    h.secondary().play_policy = duoplay_test_fixtures::PlayPolicy::Allow;
    h.engine.play();
    h.pump().unwrap();
    assert!(h.secondary().is_running());
}

#[test]
fn play_reissued_before_its_rejection_is_not_rearmed() {
    init();
    let (mut h, _, _) = loaded_pair().unwrap();
    h.secondary().play_policy = duoplay_test_fixtures::PlayPolicy::RejectAsync;

    // Second request arrives before the rejection is delivered.
    h.engine.play();
    h.engine.play();
    assert_eq!(h.secondary().plays(), 2);
    h.pump().unwrap();

    assert!(h.engine.is_playing());
    assert!(!h
        .engine
        .suppression()
        .is_armed(Role::Secondary, duoplay_core::EchoKind::Play));
    let rejections = h
        .engine
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e, EngineEvent::CommandRejected { role: Role::Secondary, .. }))
        .count();
    assert_eq!(rejections, 2);

    h.secondary().play_policy = duoplay_test_fixtures::PlayPolicy::Allow;
    h.engine.play();
    h.pump().unwrap();
    assert!(h.primary().is_running());
    assert!(h.secondary().is_running());
}

#[test]
fn play_pause_play_before_delivery_ends_playing() {
    init();
    let (mut h, _, _) = loaded_pair().unwrap();

    h.engine.play();
    h.engine.pause();
    h.engine.play();
    assert_eq!(h.primary().plays(), 2);
    assert_eq!(h.secondary().plays(), 2);
    h.pump().unwrap();

    assert!(h.engine.is_playing());
    assert!(h.primary().is_running());
    assert!(h.secondary().is_running());
    for role in [Role::Primary, Role::Secondary] {
        assert!(!h.engine.suppression().is_armed(role, duoplay_core::EchoKind::Play));
        assert!(!h.engine.suppression().is_armed(role, duoplay_core::EchoKind::Pause));
    }
}

#[test]
fn pause_play_pause_before_delivery_ends_paused() {
    init();
    let (mut h, _, _) = loaded_pair().unwrap();
    h.start().unwrap();

    h.engine.pause();
    h.engine.play();
    h.engine.pause();
    h.pump().unwrap();

    assert!(!h.engine.is_playing());
    assert!(!h.primary().is_running());
    assert!(!h.secondary().is_running());
    for role in [Role::Primary, Role::Secondary] {
        assert!(!h.engine.suppression().is_armed(role, duoplay_core::EchoKind::Play));
        assert!(!h.engine.suppression().is_armed(role, duoplay_core::EchoKind::Pause));
    }
}

#[test]
fn stall_overtaken_by_play_is_stale() {
    init();
    let (mut h, _, _) = loaded_pair().unwrap();
    h.start().unwrap();

    // The audio stalls, and the user presses play before the pause is delivered.
    h.secondary().external_pause();
    h.engine.play();
    h.pump().unwrap();

    assert!(h.engine.is_playing());
    assert!(h.primary().is_running());
    assert!(h.secondary().is_running());
}

#[test]
fn native_play_overtaken_by_pause_is_stale() {
    init();
    let (mut h, _, _) = loaded_pair().unwrap();

    // Native controls start the video, then the UI pauses before the play is delivered.
    h.primary().external_play();
    h.engine.pause();
    h.pump().unwrap();

    assert!(!h.engine.is_playing());
    assert!(!h.primary().is_running());
    assert!(!h.secondary().is_running());
    assert_eq!(h.secondary().plays(), 0);
}

#[test]
fn every_command_is_recorded_in_order() {
    init();
    let mut h = Harness::new();
    h.engine.play();
    // Nothing bound: still commands both, as a user gesture would.
    assert_eq!(h.primary().commands().last(), Some(&Command::Play));
    assert_eq!(h.secondary().commands().last(), Some(&Command::Play));
    h.pump().unwrap();
    assert!(h.engine.is_playing());
}
