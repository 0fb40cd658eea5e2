//! 仿真硬件
//!
//! 执行器输出只写日志；手柄按场景回放；颜色传感器按场景中的变化点给出读数。

use bytebot_control::{
    Axis, Button, Chassis, ColorSensor, ControllerInput, MotionOptions, Pose, ScriptedController,
};
use bytebot_driver::{AdiPin, DigitalBus, MotorBus};
use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, info};

use crate::scenario::ColorEvent;

/// 场景回放手柄，同时维护当前 tick 供传感器使用
pub struct SimController {
    inner: ScriptedController,
    samples: Rc<Cell<u64>>,
    rumbles: usize,
}

impl SimController {
    pub fn new(inner: ScriptedController, samples: Rc<Cell<u64>>) -> Self {
        Self {
            inner,
            samples,
            rumbles: 0,
        }
    }

    pub fn rumbles(&self) -> usize {
        self.rumbles
    }
}

impl ControllerInput for SimController {
    fn sample(&mut self) {
        self.inner.sample();
        self.samples.set(self.samples.get() + 1);
    }

    fn analog(&self, axis: Axis) -> i8 {
        self.inner.analog(axis)
    }

    fn digital(&self, button: Button) -> bool {
        self.inner.digital(button)
    }

    fn new_press(&self, button: Button) -> bool {
        self.inner.new_press(button)
    }

    fn rumble(&mut self, pattern: &str) {
        self.rumbles += 1;
        info!(pattern, "Controller rumble");
    }
}

/// 按场景变化点给出读数的颜色传感器
pub struct TimelineColorSensor {
    events: Vec<ColorEvent>,
    samples: Rc<Cell<u64>>,
}

impl TimelineColorSensor {
    pub fn new(events: Vec<ColorEvent>, samples: Rc<Cell<u64>>) -> Self {
        Self { events, samples }
    }

    fn current(&self) -> Option<&ColorEvent> {
        let tick = self.samples.get().saturating_sub(1);
        self.events.iter().rev().find(|e| e.tick <= tick)
    }
}

impl ColorSensor for TimelineColorSensor {
    fn hue(&self) -> f64 {
        self.current().map_or(0.0, |e| e.hue)
    }

    fn proximity(&self) -> i32 {
        self.current().map_or(0, |e| e.proximity)
    }
}

/// 只记录变化的电机总线
#[derive(Debug, Default)]
pub struct LoggingMotors {
    last: BTreeMap<u8, i32>,
    writes: u64,
}

impl LoggingMotors {
    pub fn last(&self) -> &BTreeMap<u8, i32> {
        &self.last
    }

    pub fn writes(&self) -> u64 {
        self.writes
    }
}

impl MotorBus for LoggingMotors {
    fn set_voltage(&mut self, port: u8, millivolts: i32) {
        self.writes += 1;
        if self.last.insert(port, millivolts) != Some(millivolts) {
            debug!(port, millivolts, "Motor voltage");
        }
    }
}

/// 只记录变化的数字输出
#[derive(Debug, Default)]
pub struct LoggingPins {
    last: BTreeMap<char, bool>,
}

impl LoggingPins {
    pub fn last(&self) -> &BTreeMap<char, bool> {
        &self.last
    }
}

impl DigitalBus for LoggingPins {
    fn set_digital(&mut self, pin: AdiPin, level: bool) {
        if self.last.insert(pin.0, level) != Some(level) {
            info!(%pin, level, "Digital output");
        }
    }
}

/// 记录指令并直接跳到目标位姿的底盘
#[derive(Debug, Default)]
pub struct LoggingChassis {
    pose: Pose,
    motions: usize,
}

impl LoggingChassis {
    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn motions(&self) -> usize {
        self.motions
    }
}

impl Chassis for LoggingChassis {
    fn set_pose(&mut self, pose: Pose) {
        info!(x = pose.x, y = pose.y, heading = pose.heading, "Set pose");
        self.pose = pose;
    }

    fn move_to_point(&mut self, x: f64, y: f64, timeout: Duration, options: MotionOptions) {
        info!(
            x,
            y,
            ?timeout,
            forwards = options.forwards,
            asynchronous = options.asynchronous,
            "Move to point"
        );
        self.pose.x = x;
        self.pose.y = y;
        self.motions += 1;
    }

    fn turn_to_heading(&mut self, heading: f64, timeout: Duration, options: MotionOptions) {
        info!(heading, ?timeout, asynchronous = options.asynchronous, "Turn to heading");
        self.pose.heading = heading;
        self.motions += 1;
    }

    fn wait_until_done(&mut self) {
        debug!("Wait until motion done");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeline_sensor_follows_ticks() {
        let samples = Rc::new(Cell::new(0));
        let sensor = TimelineColorSensor::new(
            vec![
                ColorEvent {
                    tick: 2,
                    hue: 220.0,
                    proximity: 200,
                },
                ColorEvent {
                    tick: 4,
                    hue: 10.0,
                    proximity: 50,
                },
            ],
            samples.clone(),
        );

        samples.set(1); // tick 0
        assert_eq!(sensor.proximity(), 0);
        samples.set(3); // tick 2
        assert_eq!(sensor.hue(), 220.0);
        samples.set(10);
        assert_eq!(sensor.proximity(), 50);
    }

    #[test]
    fn test_logging_motors_track_last_value() {
        let mut motors = LoggingMotors::default();
        motors.set_voltage(12, 500);
        motors.set_voltage(12, 500);
        motors.set_voltage(10, -3);
        assert_eq!(motors.last()[&12], 500);
        assert_eq!(motors.last()[&10], -3);
        assert_eq!(motors.writes(), 3);
    }

    #[test]
    fn test_logging_chassis_tracks_pose() {
        let mut chassis = LoggingChassis::default();
        chassis.set_pose(Pose::new(1.0, 2.0, 0.0));
        chassis.move_to_point(0.0, 39.0, Duration::from_secs(2), MotionOptions::default());
        chassis.turn_to_heading(90.0, Duration::from_secs(1), MotionOptions::default());
        assert_eq!(chassis.pose(), Pose::new(0.0, 39.0, 90.0));
        assert_eq!(chassis.motions(), 2);
    }
}
