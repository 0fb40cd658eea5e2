//! 录制回放测试
//!
//! 录制一个手动阶段，再把录制结果经执行器回放到另一套模拟硬件上，
//! 逐 tick 比较执行器状态。

mod common;

use bytebot_control::{
    Axis, Button, ControllerFrame, DecoderProfile, Opcontrol, Recording, RobotConfig,
    ScriptedController,
};
use bytebot_driver::{Executor, LoopConfig, ManualClock, TickScheduler, TickTask};
use common::mock_hardware::*;
use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;

type Snapshot = (BTreeMap<u8, i32>, BTreeMap<char, bool>);

fn snapshot(state: &SharedState) -> Snapshot {
    let s = state.lock().unwrap();
    (s.voltages.clone(), s.pins.clone())
}

fn session_frames() -> Vec<ControllerFrame> {
    let stick = |throttle, steer| {
        ControllerFrame::NEUTRAL
            .with_axis(Axis::LeftY, throttle)
            .with_axis(Axis::LeftX, steer)
    };
    let mut frames = Vec::new();
    frames.extend(std::iter::repeat_n(stick(0, 0), 5));
    frames.extend(std::iter::repeat_n(stick(127, 0), 10));
    frames.push(stick(127, 0).with_buttons(&[Button::X]));
    frames.extend(std::iter::repeat_n(stick(90, 40).with_buttons(&[Button::R2]), 8));
    frames.extend(std::iter::repeat_n(stick(90, 40).with_buttons(&[Button::L1]), 4));
    frames.extend(std::iter::repeat_n(stick(0, 0), 12));
    frames.push(ControllerFrame::NEUTRAL.with_buttons(&[Button::X, Button::Y]));
    frames.extend(std::iter::repeat_n(stick(-60, -127).with_buttons(&[Button::R1]), 6));
    frames
}

/// 录制一个阶段，返回录制结果和每个 tick 结束时的硬件状态
fn record_session(config: &RobotConfig, frames: Vec<ControllerFrame>) -> (Recording, Vec<Snapshot>) {
    let (motors, digital, state) = mock_buses();
    let ticks = frames.len() as u64;
    let mut op = Opcontrol::from_config(
        config,
        ScriptedController::from_frames(frames),
        MockColorSensor::default(),
        motors,
        digital,
    )
    .unwrap();

    op.start_recording();
    let mut live = Vec::new();
    for tick in 0..ticks {
        op.tick(tick);
        live.push(snapshot(&state));
    }
    (op.take_recording().unwrap(), live)
}

fn replay_snapshots(config: &RobotConfig, recording: Recording, ticks: usize) -> Vec<Snapshot> {
    let (motors, digital, state) = mock_buses();
    let executor = Executor::new(config.actuators.clone(), motors, digital).unwrap();
    let mut replay = recording.replay(executor);

    let mut replayed = Vec::new();
    for tick in 0..ticks as u64 {
        replay.tick(tick);
        replayed.push(snapshot(&state));
    }
    assert!(replay.is_finished());
    replayed
}

#[test]
fn replay_reproduces_classic_session() {
    let config = RobotConfig::default();
    let frames = session_frames();
    let ticks = frames.len();
    let (recording, live) = record_session(&config, frames);

    assert_eq!(recording.ticks(), ticks as u64);
    // 每 tick 至少 4 条持续指令，录制只保留变化
    assert!(recording.instruction_count() < ticks);

    let replayed = replay_snapshots(&config, recording, ticks);
    for (tick, (live, replayed)) in live.iter().zip(&replayed).enumerate() {
        assert_eq!(live, replayed, "tick {tick}");
    }
}

#[test]
fn replay_reproduces_tower_session() {
    let config = RobotConfig {
        profile: DecoderProfile::Tower,
        ..RobotConfig::default()
    };
    let frames = session_frames();
    let ticks = frames.len();
    let (recording, live) = record_session(&config, frames);

    // 停车气缸切换被录下
    assert!(recording.to_string().contains("solenoid park 1"));

    let replayed = replay_snapshots(&config, recording, ticks);
    assert_eq!(live, replayed);
}

#[test]
fn recording_survives_listing_file() {
    let config = RobotConfig::default();
    let frames = session_frames();
    let ticks = frames.len();
    let (recording, live) = record_session(&config, frames);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.txt");
    recording.save_to_file(&path).unwrap();
    let loaded = Recording::load_from_file(&path).unwrap();
    assert_eq!(loaded, recording);

    let replayed = replay_snapshots(&config, loaded, ticks);
    assert_eq!(live, replayed);
}

#[test]
fn replay_runs_under_scheduler() {
    let config = RobotConfig::default();
    let frames = session_frames();
    let ticks = frames.len();
    let (recording, live) = record_session(&config, frames);

    let (motors, digital, state) = mock_buses();
    let executor = Executor::new(config.actuators.clone(), motors, digital).unwrap();
    let mut replay = recording.replay(executor);

    let loop_config = LoopConfig {
        max_ticks: Some(ticks as u64),
        ..LoopConfig::default()
    };
    let mut scheduler = TickScheduler::new(ManualClock::new(), loop_config).unwrap();
    let report = scheduler.run(&mut replay, &AtomicBool::new(false));

    assert_eq!(report.ticks, ticks as u64);
    assert!(replay.is_finished());
    assert_eq!(snapshot(&state), live[ticks - 1]);
}
