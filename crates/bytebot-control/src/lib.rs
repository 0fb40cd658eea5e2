//! # bytebot 控制层
//!
//! 把操作手输入翻译成指令，并把解码、压栈、清栈、执行串成每个 tick 的工作。
//!
//! ## 包含模块
//!
//! - `input` - 手柄输入接口、帧快照与边沿检测
//! - `curve` - 摇杆响应曲线
//! - `drive` - 底盘混控（desaturation、精确模式、反向驾驶）
//! - `belt` - 传送带 / 进球解码
//! - `solenoid` - 电磁阀边沿切换与去抖
//! - `tower` - 塔楼辅助层（模式切换、颜色分拣）
//! - `decoder` - 按配置组合以上生产者
//! - `opcontrol` - 手动控制阶段的 tick 任务
//! - `recorder` - 执行指令录制与回放
//! - `auton` - 自动阶段脚本执行器
//! - `config` - TOML 配置

pub mod auton;
pub mod belt;
pub mod config;
pub mod curve;
pub mod decoder;
pub mod drive;
mod error;
pub mod input;
pub mod opcontrol;
pub mod recorder;
pub mod solenoid;
pub mod tower;

pub use auton::{AutonStep, Chassis, MotionOptions, Pose, Routine, run_routine};
pub use config::{DecoderProfile, RobotConfig};
pub use curve::ResponseCurve;
pub use decoder::InputDecoder;
pub use error::ControlError;
pub use input::{Axis, Button, ControllerFrame, ControllerInput, EdgeTracker, ScriptedController};
pub use opcontrol::Opcontrol;
pub use recorder::{RecordEntry, Recorder, Recording, Replay};
pub use tower::{ColorSensor, NoColorSensor, TowerAction, TowerModes};
