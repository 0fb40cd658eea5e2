//! 自动阶段脚本执行器
//!
//! 自动阶段的脚本是一张按顺序执行的步骤表。底盘运动交给外部的 [`Chassis`]
//! 实现（路径跟踪、PID 等由它负责），气缸和进球步骤与手动阶段一样经过 [`Executor`]。
//!
//! 步骤表可以在代码中构造，也可以从 TOML 加载：
//!
//! ```toml
//! name = "left"
//!
//! [[steps]]
//! op = "set_pose"
//! x = 0.0
//! y = 0.0
//! heading = 0.0
//!
//! [[steps]]
//! op = "move_to"
//! x = 0.0
//! y = 39.0
//! timeout_ms = 2000
//!
//! [[steps]]
//! op = "move_to"
//! x = 0.0
//! y = 0.0
//! timeout_ms = 2000
//! options = { forwards = false }
//! ```

use crate::ControlError;
use bytebot_driver::{Clock, DigitalBus, Executor, MotorBus};
use bytebot_protocol::{Instruction, SolenoidChannel};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

/// 场地坐标系下的位姿
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    /// 航向角（度）
    pub heading: f64,
}

impl Pose {
    pub const fn new(x: f64, y: f64, heading: f64) -> Self {
        Self { x, y, heading }
    }
}

fn default_forwards() -> bool {
    true
}

/// 运动选项
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotionOptions {
    /// 行进方向（false 表示倒车）
    #[serde(default = "default_forwards")]
    pub forwards: bool,
    /// 异步：调用立即返回，运动与后续步骤并行
    #[serde(default)]
    pub asynchronous: bool,
}

impl Default for MotionOptions {
    fn default() -> Self {
        Self {
            forwards: true,
            asynchronous: false,
        }
    }
}

impl MotionOptions {
    pub const fn backwards() -> Self {
        Self {
            forwards: false,
            asynchronous: false,
        }
    }

    pub const fn asynchronous(mut self) -> Self {
        self.asynchronous = true;
        self
    }
}

/// 底盘运动接口
///
/// 由外部运动控制库实现。所有方法都只是发起运动，
/// 阻塞语义由执行器通过 [`Chassis::wait_until_done`] 实现。
pub trait Chassis {
    /// 重设里程计位姿
    fn set_pose(&mut self, pose: Pose);

    /// 移动到场地上的一点
    fn move_to_point(&mut self, x: f64, y: f64, timeout: Duration, options: MotionOptions);

    /// 原地转到指定航向
    fn turn_to_heading(&mut self, heading: f64, timeout: Duration, options: MotionOptions);

    /// 阻塞直到当前运动结束（或超时）
    fn wait_until_done(&mut self);
}

/// 脚本步骤
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum AutonStep {
    SetPose {
        x: f64,
        y: f64,
        heading: f64,
    },
    MoveTo {
        x: f64,
        y: f64,
        timeout_ms: u64,
        #[serde(default)]
        options: MotionOptions,
    },
    TurnTo {
        heading: f64,
        timeout_ms: u64,
        #[serde(default)]
        options: MotionOptions,
    },
    /// 固定时长等待
    Wait {
        ms: u64,
    },
    /// 等待异步运动结束
    WaitUntilDone,
    Pneumatic {
        channel: SolenoidChannel,
        active: bool,
    },
    Intake {
        millivolts: i32,
    },
    Belt {
        millivolts: i32,
    },
}

/// 自动阶段脚本
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Routine {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub steps: Vec<AutonStep>,
}

impl Routine {
    pub fn new(name: impl Into<String>, steps: Vec<AutonStep>) -> Self {
        Self {
            name: name.into(),
            steps,
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ControlError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ControlError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// 所有固定等待的总时长
    pub fn total_wait(&self) -> Duration {
        self.steps
            .iter()
            .map(|s| match s {
                AutonStep::Wait { ms } => Duration::from_millis(*ms),
                _ => Duration::ZERO,
            })
            .sum()
    }
}

/// 按顺序执行脚本，返回完成的步骤数
///
/// 每一步之前检查停止标志；平台提前结束自动阶段时立即返回。
/// 脚本结束（或中止）后所有电机归零。
pub fn run_routine<Ch, M, D, C>(
    routine: &Routine,
    chassis: &mut Ch,
    executor: &mut Executor<M, D>,
    clock: &mut C,
    stop: &AtomicBool,
) -> usize
where
    Ch: Chassis + ?Sized,
    M: MotorBus,
    D: DigitalBus,
    C: Clock + ?Sized,
{
    info!(name = %routine.name, steps = routine.steps.len(), "Autonomous routine started");
    let mut done = 0;

    for (index, step) in routine.steps.iter().enumerate() {
        if stop.load(Ordering::Acquire) {
            warn!(index, "Autonomous routine interrupted");
            break;
        }
        debug!(index, ?step, "Autonomous step");

        match *step {
            AutonStep::SetPose { x, y, heading } => chassis.set_pose(Pose::new(x, y, heading)),
            AutonStep::MoveTo {
                x,
                y,
                timeout_ms,
                options,
            } => {
                chassis.move_to_point(x, y, Duration::from_millis(timeout_ms), options);
                if !options.asynchronous {
                    chassis.wait_until_done();
                }
            },
            AutonStep::TurnTo {
                heading,
                timeout_ms,
                options,
            } => {
                chassis.turn_to_heading(heading, Duration::from_millis(timeout_ms), options);
                if !options.asynchronous {
                    chassis.wait_until_done();
                }
            },
            AutonStep::Wait { ms } => {
                let deadline = clock.now() + Duration::from_millis(ms);
                clock.sleep_until(deadline);
            },
            AutonStep::WaitUntilDone => chassis.wait_until_done(),
            AutonStep::Pneumatic { channel, active } => {
                executor.execute(Instruction::pneumatic(channel, active))
            },
            AutonStep::Intake { millivolts } => executor.execute(Instruction::intake(millivolts)),
            AutonStep::Belt { millivolts } => executor.execute(Instruction::belt(millivolts)),
        }
        done += 1;
    }

    executor.stop_all();
    info!(name = %routine.name, done, "Autonomous routine finished");
    done
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytebot_driver::{ActuatorMap, AdiPin, ManualClock};

    #[derive(Debug, PartialEq)]
    enum Call {
        SetPose(Pose),
        Move(f64, f64, Duration, MotionOptions),
        Turn(f64, Duration, MotionOptions),
        Wait,
    }

    #[derive(Default)]
    struct RecordingChassis(Vec<Call>);

    impl Chassis for RecordingChassis {
        fn set_pose(&mut self, pose: Pose) {
            self.0.push(Call::SetPose(pose));
        }

        fn move_to_point(&mut self, x: f64, y: f64, timeout: Duration, options: MotionOptions) {
            self.0.push(Call::Move(x, y, timeout, options));
        }

        fn turn_to_heading(&mut self, heading: f64, timeout: Duration, options: MotionOptions) {
            self.0.push(Call::Turn(heading, timeout, options));
        }

        fn wait_until_done(&mut self) {
            self.0.push(Call::Wait);
        }
    }

    #[derive(Default)]
    struct Motors(Vec<(u8, i32)>);

    impl MotorBus for Motors {
        fn set_voltage(&mut self, port: u8, millivolts: i32) {
            self.0.push((port, millivolts));
        }
    }

    #[derive(Default)]
    struct Pins(Vec<(AdiPin, bool)>);

    impl DigitalBus for Pins {
        fn set_digital(&mut self, pin: AdiPin, level: bool) {
            self.0.push((pin, level));
        }
    }

    fn executor() -> Executor<Motors, Pins> {
        Executor::new(ActuatorMap::default(), Motors::default(), Pins::default()).unwrap()
    }

    #[test]
    fn test_blocking_and_async_motions() {
        let routine = Routine::new(
            "test",
            vec![
                AutonStep::SetPose {
                    x: 0.0,
                    y: 0.0,
                    heading: 0.0,
                },
                AutonStep::MoveTo {
                    x: 0.0,
                    y: 39.0,
                    timeout_ms: 2000,
                    options: MotionOptions::default(),
                },
                AutonStep::TurnTo {
                    heading: 90.0,
                    timeout_ms: 1000,
                    options: MotionOptions::default().asynchronous(),
                },
                AutonStep::WaitUntilDone,
            ],
        );

        let mut chassis = RecordingChassis::default();
        let mut exec = executor();
        let mut clock = ManualClock::new();
        let done = run_routine(&routine, &mut chassis, &mut exec, &mut clock, &AtomicBool::new(false));

        assert_eq!(done, 4);
        assert_eq!(
            chassis.0,
            vec![
                Call::SetPose(Pose::default()),
                Call::Move(0.0, 39.0, Duration::from_millis(2000), MotionOptions::default()),
                Call::Wait,
                Call::Turn(
                    90.0,
                    Duration::from_millis(1000),
                    MotionOptions::default().asynchronous()
                ),
                Call::Wait,
            ]
        );
    }

    #[test]
    fn test_actuator_steps_use_executor() {
        let routine = Routine::new(
            "actuators",
            vec![
                AutonStep::Intake { millivolts: 20_000 },
                AutonStep::Pneumatic {
                    channel: SolenoidChannel::Park,
                    active: true,
                },
                AutonStep::Wait { ms: 500 },
            ],
        );

        let mut chassis = RecordingChassis::default();
        let mut exec = executor();
        let mut clock = ManualClock::new();
        run_routine(&routine, &mut chassis, &mut exec, &mut clock, &AtomicBool::new(false));

        // 超范围电压被钳位
        assert_eq!(exec.motors().0[0], (10, 12_000));
        assert_eq!(exec.digital().0, vec![(AdiPin('H'), true)]);
        assert_eq!(clock.sleeps(), vec![Duration::from_millis(500)]);
        assert_eq!(routine.total_wait(), Duration::from_millis(500));
        // 结束时电机归零
        assert!(exec.motors().0.contains(&(10, 0)));
    }

    #[test]
    fn test_stop_flag_interrupts() {
        let routine = Routine::new("stop", vec![AutonStep::Wait { ms: 10 }; 3]);
        let mut chassis = RecordingChassis::default();
        let mut exec = executor();
        let mut clock = ManualClock::new();
        let done = run_routine(&routine, &mut chassis, &mut exec, &mut clock, &AtomicBool::new(true));
        assert_eq!(done, 0);
        assert!(clock.sleeps().is_empty());
    }

    #[test]
    fn test_routine_from_toml() {
        let routine = Routine::from_toml_str(
            r#"
            name = "left"

            [[steps]]
            op = "set_pose"
            x = 0.0
            y = 0.0
            heading = 0.0

            [[steps]]
            op = "move_to"
            x = 0.0
            y = 0.0
            timeout_ms = 2000
            options = { forwards = false }

            [[steps]]
            op = "pneumatic"
            channel = "auxiliary"
            active = true

            [[steps]]
            op = "wait_until_done"
            "#,
        )
        .unwrap();

        assert_eq!(routine.name, "left");
        assert_eq!(routine.steps.len(), 4);
        assert_eq!(
            routine.steps[1],
            AutonStep::MoveTo {
                x: 0.0,
                y: 0.0,
                timeout_ms: 2000,
                options: MotionOptions::backwards(),
            }
        );
        assert_eq!(
            routine.steps[2],
            AutonStep::Pneumatic {
                channel: SolenoidChannel::Auxiliary,
                active: true,
            }
        );
    }

    #[test]
    fn test_unknown_op_is_rejected() {
        let err = Routine::from_toml_str("[[steps]]\nop = \"fly\"\n").unwrap_err();
        assert!(matches!(err, ControlError::Parse(_)));
    }
}
