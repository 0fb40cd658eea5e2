//! 驱动层错误类型定义

use thiserror::Error;

/// 驱动层错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    /// tick 周期必须大于零
    #[error("Invalid tick period: must be > 0")]
    InvalidPeriod,

    /// 智能端口号越界（合法范围 1..=21）
    #[error("Invalid smart port {port} (expected 1..=21)")]
    InvalidPort { port: u8 },

    /// 同一智能端口被多个电机占用
    #[error("Smart port {port} is assigned to more than one motor")]
    DuplicatePort { port: u8 },

    /// ADI 引脚越界（合法范围 'A'..='H'）
    #[error("Invalid ADI pin '{pin}' (expected 'A'..='H')")]
    InvalidPin { pin: char },

    /// 同一 ADI 引脚被多个输出占用
    #[error("ADI pin '{pin}' is assigned to more than one output")]
    DuplicatePin { pin: char },

    /// 某侧底盘没有配置任何电机
    #[error("Drive side '{side}' has no motors")]
    EmptyDriveSide { side: &'static str },
}
