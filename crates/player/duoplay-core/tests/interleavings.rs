//! Random interleavings of UI commands, platform actions and event delivery.

use duoplay_core::{Role, Transport};
use duoplay_test_fixtures::{loaded_pair, Harness};
use proptest::prelude::*;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Clone, Debug)]
enum Step {
    Play,
    Pause,
    Seek(f64),
    ExternalPlay(Role),
    ExternalPause(Role),
    ExternalSeek(f64),
    FinishSeek(Role),
    Pump,
}

fn role() -> impl Strategy<Value = Role> {
    prop_oneof![Just(Role::Primary), Just(Role::Secondary)]
}

fn step() -> impl Strategy<Value = Step> {
    // Whole seconds keep every external seek far outside the drift tolerance.
    let time = (0u32..30).prop_map(f64::from);
    prop_oneof![
        Just(Step::Play),
        Just(Step::Pause),
        time.clone().prop_map(Step::Seek),
        role().prop_map(Step::ExternalPlay),
        role().prop_map(Step::ExternalPause),
        time.prop_map(Step::ExternalSeek),
        role().prop_map(Step::FinishSeek),
        Just(Step::Pump),
        Just(Step::Pump),
    ]
}

fn apply(h: &mut Harness, step: &Step) -> anyhow::Result<()> {
    match *step {
        Step::Play => h.engine.play(),
        Step::Pause => h.engine.pause(),
        Step::Seek(t) => h.engine.seek(t),
        Step::ExternalPlay(role) => h.transport(role).external_play(),
        Step::ExternalPause(role) => h.transport(role).external_pause(),
        Step::ExternalSeek(t) => h.primary().external_seek(t),
        Step::FinishSeek(role) => h.transport(role).finish_seek(),
        Step::Pump => {
            h.pump()?;
        }
    }
    Ok(())
}

/// Deliver everything and complete every seek until nothing is left in flight.
fn quiesce(h: &mut Harness) -> anyhow::Result<()> {
    for _ in 0..16 {
        h.pump()?;
        if !h.primary().is_seeking() && !h.secondary().is_seeking() && h.queued().is_empty() {
            return Ok(());
        }
        h.primary().finish_seek();
        h.secondary().finish_seek();
    }
    anyhow::bail!("seeks never settled")
}

fn check(started: bool, steps: &[Step]) -> Result<(), TestCaseError> {
    let (mut h, _, _) = loaded_pair().map_err(|e| TestCaseError::fail(e.to_string()))?;
    if started {
        h.start().map_err(|e| TestCaseError::fail(e.to_string()))?;
    }
    for step in steps {
        apply(&mut h, step).map_err(|e| TestCaseError::fail(e.to_string()))?;
    }
    quiesce(&mut h).map_err(|e| TestCaseError::fail(e.to_string()))?;

    let playing = h.engine.is_playing();
    prop_assert_eq!(h.primary().is_running(), playing);
    prop_assert_eq!(h.secondary().is_running(), playing);
    prop_assert_eq!(h.primary().current_time, h.secondary().current_time);
    prop_assert!(h.engine.seek_phase().is_idle());
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn transports_follow_intent_from_paused(steps in prop::collection::vec(step(), 1..24)) {
        init();
        check(false, &steps)?;
    }

    #[test]
    fn transports_follow_intent_from_playing(steps in prop::collection::vec(step(), 1..24)) {
        init();
        check(true, &steps)?;
    }
}

#[test]
fn seek_stall_pause_play_before_delivery_resumes_at_target() {
    init();
    let (mut h, _, _) = loaded_pair().unwrap();
    h.start().unwrap();

    h.engine.seek(12.0);
    h.secondary().external_pause();
    h.engine.pause();
    h.engine.play();
    h.pump().unwrap();
    h.settle().unwrap();

    assert!(h.engine.is_playing());
    assert!(h.primary().is_running());
    assert!(h.secondary().is_running());
    assert_eq!(h.primary().current_time, 12.0);
    assert_eq!(h.secondary().current_time, 12.0);
}
