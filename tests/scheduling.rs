// Copyright (c) 2024 Mike Tsao

use float_cmp::approx_eq;
use harmonic_drone::prelude::*;
use more_asserts::{assert_gt, assert_le, assert_lt};

/// Renders up to and including the frame at `when`, so that any tick due at
/// `when` has been handled.
fn render_through(performance: &mut Performance, when: Seconds) {
    let frames = performance.sample_rate().frames_in(when - performance.now()) + 1;
    let mut buffer = vec![StereoSample::SILENCE; frames];
    performance.render(&mut buffer).unwrap();
}

fn voice(performance: &Performance, slot: usize) -> VoiceNodes {
    performance
        .scheduler()
        .pool()
        .slot(slot)
        .map(|s| s.nodes())
        .unwrap()
}

#[test]
fn quartet_cycles_through_four_slots() {
    let mut p = Performance::new_with(DroneProfile::quartet(), SampleRate::new(1000)).unwrap();
    p.start().unwrap();

    // Slot 0 is armed at start, without waiting for a tick.
    let slot_0 = voice(&p, 0);
    assert_eq!(
        p.scheduler().pool().slot(0).unwrap().program().start(),
        Seconds::zero()
    );

    for (k, slot) in [(1, 1), (2, 2), (3, 3)] {
        let when = Seconds(4.0 * k as f64);
        render_through(&mut p, when);
        let program = p.scheduler().pool().slot(slot).unwrap().program();
        assert_eq!(program.start(), when, "slot {slot} should be armed at {when}");
        assert_eq!(program.end(), when + Seconds(16.0));
    }

    // Slot 0's first cycle sweeps 110Hz to 1760Hz and peaks between 11.2s
    // and 14.4s.
    let backend = p.scheduler().backend();
    let frequency = backend.frequency(slot_0.generator).unwrap();
    assert_eq!(frequency.value_at(Seconds(0.0)), 110.0);
    assert!(approx_eq!(f64, frequency.value_at(Seconds(8.0)), 440.0, epsilon = 1e-9));
    assert!(approx_eq!(f64, frequency.value_at(Seconds(16.0)), 1760.0, epsilon = 1e-9));
    let gain = backend.gain(slot_0.controller).unwrap();
    assert_lt!(gain.value_at(Seconds(11.0)), 0.5);
    assert!(approx_eq!(f64, gain.value_at(Seconds(11.2)), 0.5, epsilon = 1e-9));
    assert!(approx_eq!(f64, gain.value_at(Seconds(12.0)), 0.5, epsilon = 1e-9));
    assert!(approx_eq!(f64, gain.value_at(Seconds(14.4)), 0.5, epsilon = 1e-9));
    assert_lt!(gain.value_at(Seconds(14.6)), 0.5);

    // The fifth arm wraps around to slot 0, reusing its voice.
    render_through(&mut p, Seconds(16.0));
    assert_eq!(voice(&p, 0), slot_0);
    assert_eq!(
        p.scheduler().pool().slot(0).unwrap().program().start(),
        Seconds(16.0)
    );
    assert_eq!(p.cursor(), 1);
    assert_eq!(p.scheduler().pool().occupied(), 4);
}

#[test]
fn septet_spans_one_cycle_in_seven_ticks() {
    let mut p = Performance::new_with(DroneProfile::septet(), SampleRate::new(1000)).unwrap();
    p.start().unwrap();
    render_through(&mut p, Seconds(31.0));

    let spacing = 32.0 / 7.0;
    for slot in 0..7 {
        let start = p.scheduler().pool().slot(slot).unwrap().program().start();

        // Ticks land on the first frame at or after they fall due.
        let due = spacing * slot as f64;
        assert_le!(due, start.0 + 1e-9, "slot {slot}");
        assert_lt!(start.0, due + 0.001, "slot {slot}");
    }
    let last = p.scheduler().pool().slot(6).unwrap().program().start();
    assert!(approx_eq!(f64, last.0, 27.43, epsilon = 0.002), "{last}");
    assert_eq!(p.cursor(), 0, "the eighth arm goes back to slot 0");

    let slot_0 = voice(&p, 0);
    let frequency = p.scheduler().backend().frequency(slot_0.generator).unwrap();
    assert_eq!(frequency.value_at(Seconds(0.0)), 27.5);
    assert!(approx_eq!(f64, frequency.value_at(Seconds(32.0)), 1760.0, epsilon = 1e-9));
}

#[test]
fn cursor_before_each_tick_is_tick_count_mod_slots() {
    let backend = SoftwareBackend::new_with(SampleRate::new(1000)).unwrap();
    let mut scheduler = HarmonicScheduler::new_with(DroneProfile::septet(), backend).unwrap();
    let mut ticker = ManualTicker::default();

    assert_eq!(scheduler.cursor(), 0);
    scheduler.start(&mut ticker).unwrap();
    let handle = scheduler.tick_handle().unwrap();
    for k in 1..50 {
        assert_eq!(scheduler.cursor(), k % 7);
        scheduler.handle_tick(handle).unwrap();
    }
}

#[test]
fn rearm_replaces_future_automation() {
    let mut p = Performance::new_with(DroneProfile::quartet(), SampleRate::new(1000)).unwrap();
    p.start().unwrap();
    render_through(&mut p, Seconds(16.0));

    let slot_0 = voice(&p, 0);
    let backend = p.scheduler().backend();
    let frequency = backend.frequency(slot_0.generator).unwrap();
    let gain = backend.gain(slot_0.controller).unwrap();
    assert_eq!(frequency.points().len(), 2);
    assert_eq!(gain.points().len(), 4);
    assert!(frequency.points().iter().all(|p| p.when >= Seconds(16.0)));
    assert!(gain.points().iter().all(|p| p.when >= Seconds(16.0)));
    assert_eq!(frequency.value_at(Seconds(16.0)), 110.0);
    assert_eq!(gain.value_at(Seconds(16.0)), 0.0);
}

#[test]
fn restart_builds_new_voices() {
    let mut p = Performance::new_with(DroneProfile::quartet(), SampleRate::new(1000)).unwrap();
    p.start().unwrap();
    render_through(&mut p, Seconds(9.0));
    let old: Vec<VoiceNodes> = (0..3).map(|slot| voice(&p, slot)).collect();
    let output = p.output();

    p.stop().unwrap();
    assert!(!p.is_running());
    assert_eq!(p.scheduler().pool().occupied(), 0);
    for nodes in &old {
        assert!(!p.scheduler().backend().contains(nodes.generator));
        assert!(!p.scheduler().backend().contains(nodes.controller));
    }

    p.start().unwrap();
    let fresh = voice(&p, 0);
    assert!(old.iter().all(|nodes| *nodes != fresh));
    assert_eq!(p.output(), output);
    assert_eq!(p.scheduler().pool().occupied(), 1);
    assert_eq!(p.cursor(), 1, "the cursor restarts at 0 and slot 0 is armed");

    let backend = p.scheduler().backend();
    assert_eq!(backend.frequency(fresh.generator).unwrap().points().len(), 2);
    assert_eq!(backend.gain(fresh.controller).unwrap().points().len(), 4);
    assert_eq!(
        p.scheduler().pool().slot(0).unwrap().program().start(),
        p.now()
    );
}

#[test]
fn repeated_transitions_change_nothing() {
    let mut p = Performance::new_with(DroneProfile::quartet(), SampleRate::new(1000)).unwrap();
    p.start().unwrap();
    let handle = p.scheduler().tick_handle();
    let node_count = p.scheduler().backend().node_count();
    p.start().unwrap();
    assert_eq!(p.scheduler().tick_handle(), handle);
    assert_eq!(p.scheduler().backend().node_count(), node_count);
    assert_eq!(p.cursor(), 1);

    p.stop().unwrap();
    let node_count = p.scheduler().backend().node_count();
    p.stop().unwrap();
    assert_eq!(p.scheduler().backend().node_count(), node_count);
    assert!(p.scheduler().tick_handle().is_none());
}

#[test]
fn layers_overlap_once_warmed_up() {
    let mut p = Performance::new_with(DroneProfile::quartet(), SampleRate::new(1000)).unwrap();
    p.start().unwrap();
    render_through(&mut p, Seconds(13.0));

    let now = p.now();
    let backend = p.scheduler().backend();
    let sounding = (0..4)
        .filter(|slot| backend.gain(voice(&p, *slot).controller).unwrap().value_at(now) > 0.0)
        .count();
    assert_eq!(sounding, 4, "every voice should be somewhere in its envelope");
    assert_gt!(now, Seconds(12.0));
}
