//! End-to-end polling scenarios against scripted sensors

use std::time::Duration;

use tofkeys::calibration::{CalibrationBounds, CalibrationPhase};
use tofkeys::driver::{Driver, MemorySink, RunOptions};
use tofkeys::keyboard::{DetachedResetLine, Keyboard, KeyboardSettings, ResetSequencer};
use tofkeys::mapping::{DepthVolumeMapper, KeyAssignment, MappingPipeline};
use tofkeys::sensors::{ScriptHandle, ScriptedSensor, SensorChannel};
use tofkeys::KeyboardError;

fn bring_up(channels: usize, sentinel: CalibrationBounds) -> (Keyboard, Vec<ScriptHandle>) {
    let mut handles = Vec::new();
    let mut reset = ResetSequencer::new(DetachedResetLine::new())
        .with_pulse(Duration::from_micros(1))
        .with_settle(Duration::ZERO);
    let settings = KeyboardSettings {
        sentinel,
        ..KeyboardSettings::default()
    };

    let keyboard = Keyboard::bring_up(channels, &settings, &mut reset, |_| {
        let sensor = ScriptedSensor::new();
        handles.push(sensor.handle());
        Ok(Box::new(sensor) as Box<dyn SensorChannel>)
    })
    .unwrap();

    (keyboard, handles)
}

#[test]
fn warm_up_from_sentinels() {
    let (mut kbd, handles) = bring_up(3, CalibrationBounds::new(1000.0, 0.0));

    // Tick 1: each new value only lowers min, so no channel has spread yet
    handles[0].push_ready(50.0);
    handles[1].push_not_ready();
    handles[2].push_ready(900.0);
    let levels = kbd.poll_all().unwrap();

    assert_eq!(kbd.bounds(0).unwrap(), CalibrationBounds::new(50.0, 0.0));
    assert_eq!(kbd.bounds(2).unwrap(), CalibrationBounds::new(900.0, 0.0));
    // Degenerate range falls back to max
    assert_eq!(levels, vec![0.0, 0.0, 0.0]);

    // Tick 2: 900 on channel 0 raises max and opens the range
    handles[0].push_ready(900.0);
    let levels = kbd.poll_all().unwrap();

    assert_eq!(kbd.bounds(0).unwrap(), CalibrationBounds::new(50.0, 900.0));
    assert_eq!(levels[0], 1.0);
    assert_eq!(levels.len(), 3);
}

#[test]
fn levels_stay_in_unit_range_once_warm() {
    let (mut kbd, handles) = bring_up(1, CalibrationBounds::new(8190.0, 0.0));
    let readings = [300.0, 299.0, 310.0, 25.0, 180.0, 90.0, 305.0, 18.0, 140.0, 240.0];

    for raw in readings {
        handles[0].push_ready(raw);
        let level = kbd.poll_all().unwrap()[0];
        let bounds = kbd.bounds(0).unwrap();
        if bounds.is_spread() {
            assert!((0.0..=1.0).contains(&level), "level {level} for raw {raw}");
            assert!(bounds.contains(raw));
        }
    }
    assert_eq!(kbd.bounds(0).unwrap(), CalibrationBounds::new(18.0, 310.0));
}

#[test]
fn drop_out_is_smoothed_over() {
    let (mut kbd, handles) = bring_up(2, CalibrationBounds::new(0.0, 1000.0));

    handles[0].push_ready(800.0);
    handles[1].push_ready(600.0);
    assert_eq!(kbd.poll_all().unwrap(), vec![0.8, 0.6]);

    // Sensor 0 reports a spurious near-zero distance
    handles[0].push_ready(50.0);
    handles[1].push_ready(500.0);
    assert_eq!(kbd.poll_all().unwrap(), vec![0.8, 0.5]);
    assert_eq!(kbd.cached(0).unwrap(), 0.8);
    assert_eq!(kbd.glitches(0).unwrap(), 1);
    assert_eq!(kbd.glitches(1).unwrap(), 0);
}

#[test]
fn held_press_gets_through_after_one_pass() {
    let (kbd, handles) = bring_up(1, CalibrationBounds::new(0.0, 100.0));
    let volume = MappingPipeline::new().with(DepthVolumeMapper::new(0.1));
    let mut driver = Driver::new(kbd, volume).with_keys(vec![KeyAssignment::Single(60)]);
    let mut sink = MemorySink::new(1);

    handles[0].push_ready(80.0);
    for _ in 0..4 {
        handles[0].push_ready(5.0);
    }

    let ticks: Vec<_> = (0..5).map(|_| driver.tick(&mut sink).unwrap()).collect();
    assert_eq!(ticks[1].levels, vec![0.8]);
    assert!(ticks[1].notes.is_empty());
    for tick in &ticks[2..] {
        assert_eq!(tick.levels, vec![0.05]);
        assert_eq!(tick.notes, vec![60]);
        assert!(tick.volumes[0] > 0.0);
    }
    assert_eq!(driver.keyboard().glitches(0).unwrap(), 1);
}

#[test]
fn not_ready_channels_hold_their_level() {
    let (mut kbd, handles) = bring_up(3, CalibrationBounds::new(100.0, 200.0));
    handles[0].push_ready(150.0);
    handles[1].push_ready(175.0);
    handles[2].push_ready(125.0);
    assert_eq!(kbd.poll_all().unwrap(), vec![0.5, 0.75, 0.25]);

    // Only channel 1 has fresh data
    handles[0].push_not_ready();
    handles[1].push_ready(200.0);
    handles[2].push_not_ready();
    assert_eq!(kbd.poll_all().unwrap(), vec![0.5, 1.0, 0.25]);
}

#[test]
fn fault_mid_pass_silences_driver_outputs() {
    let (kbd, handles) = bring_up(2, CalibrationBounds::new(0.0, 100.0));
    let volume = MappingPipeline::new().with(DepthVolumeMapper::new(0.5));
    let mut driver = Driver::new(kbd, volume)
        .with_keys(vec![KeyAssignment::Single(60), KeyAssignment::Single(62)]);

    for _ in 0..3 {
        handles[0].push_ready(10.0);
        handles[1].push_ready(20.0);
    }
    handles[1].push_fault("device vanished");

    let mut sink = MemorySink::new(2);
    let mut volumes_seen = Vec::new();
    let result = driver.run(&mut sink, &RunOptions::new(Duration::ZERO), |tick| {
        volumes_seen.push(tick.volumes.clone());
    });

    match result {
        Err(KeyboardError::SensorRead { channel, .. }) => assert_eq!(channel, 1),
        other => panic!("expected a sensor read error, got {other:?}"),
    }
    assert_eq!(volumes_seen.len(), 3);
    assert!(volumes_seen.iter().all(|v| v[0] > 0.0));
    assert!(sink.is_silent());
}

#[test]
fn channels_settle_into_stable_phase() {
    let settings = KeyboardSettings {
        sentinel: CalibrationBounds::new(8190.0, 0.0),
        stable_after: 5,
        ..KeyboardSettings::default()
    };
    let sensor = ScriptedSensor::from_distances(
        [300.0, 20.0]
            .into_iter()
            .chain(std::iter::repeat(150.0).take(10)),
    );
    let sensors: Vec<Box<dyn SensorChannel>> = vec![Box::new(sensor)];
    let mut kbd = Keyboard::new(sensors, &settings).unwrap();

    kbd.poll_all().unwrap();
    assert_eq!(kbd.phase(0).unwrap(), CalibrationPhase::Warming);
    for _ in 0..11 {
        kbd.poll_all().unwrap();
    }
    assert_eq!(kbd.phase(0).unwrap(), CalibrationPhase::Stable);
}
