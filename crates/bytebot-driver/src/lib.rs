//! # bytebot 驱动层
//!
//! 负责把协议层的 [`Instruction`](bytebot_protocol::Instruction) 落到执行器上，
//! 并以固定周期驱动每个 tick：
//!
//! - [`actuator`]: 执行器接口（电机电压、数字输出），硬件适配器与测试替身实现同一契约
//! - [`config`]: 静态接线表（端口号 + 反向标志）
//! - [`executor`]: 指令分发，一种指令对应一次硬件调用
//! - [`clock`]: 单调时钟抽象（系统时钟 / 手动时钟）
//! - [`scheduler`]: 绝对截止时间调度，带漂移修正与超时计数
//! - [`metrics`]: 无锁计数器

pub mod actuator;
pub mod clock;
pub mod config;
mod error;
pub mod executor;
pub mod metrics;
pub mod scheduler;

pub use actuator::{DigitalBus, MotorBus};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ActuatorMap, AdiPin, MotorConfig};
pub use error::DriverError;
pub use executor::Executor;
pub use metrics::{TickMetrics, TickMetricsSnapshot};
pub use scheduler::{LoopConfig, TickReport, TickScheduler, TickTask};
