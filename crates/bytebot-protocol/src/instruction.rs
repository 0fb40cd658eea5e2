//! 指令定义模块
//!
//! 一条 [`Instruction`] 表示一次硬件动作及其幅值。指令集是封闭的：
//! 新增种类必须修改本枚举，运行时无法扩展。
//!
//! # 幅值范围
//!
//! | 种类 | 幅值 |
//! |---|---|
//! | `LeftDrive` / `RightDrive` / `Belt` / `Intake` | 毫伏，`VOLTAGE_MIN..=VOLTAGE_MAX` |
//! | `Solenoid` | 布尔（0/1） |
//! | `Cycle` | 无 |
//!
//! 生产者（输入解码器）在压栈前必须完成钳位；执行器不会把越界值转发给硬件。
//!
//! # 文本形式
//!
//! 每条指令一行，种类名在前，幅值在后；电磁阀额外带通道名：
//!
//! ```text
//! left_drive 12000
//! belt -760
//! solenoid park 1
//! cycle
//! ```

use crate::ProtocolError;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::fmt;
use std::str::FromStr;

/// 电机电压下限（毫伏，12V 标称电源）
pub const VOLTAGE_MIN: i32 = -12_000;

/// 电机电压上限（毫伏，12V 标称电源）
pub const VOLTAGE_MAX: i32 = 12_000;

/// 将电压钳位到执行器的合法范围
#[inline]
pub fn clamp_voltage(millivolts: i32) -> i32 {
    millivolts.clamp(VOLTAGE_MIN, VOLTAGE_MAX)
}

/// 指令种类
///
/// 数值编码是稳定的，可用于日志和场景文件。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum InstructionKind {
    /// 空操作标记，仅占用一个 tick 的等待
    Cycle = 0,
    /// 左侧底盘电机
    LeftDrive = 1,
    /// 右侧底盘电机
    RightDrive = 2,
    /// 传送带电机
    Belt = 3,
    /// 进球电机
    Intake = 4,
    /// 气动电磁阀
    Solenoid = 5,
}

impl InstructionKind {
    /// 从数值编码转换
    pub fn from_code(code: u8) -> Result<Self, ProtocolError> {
        Self::try_from(code).map_err(|_| ProtocolError::UnknownKind { code })
    }

    /// 文本形式中的种类名
    pub const fn name(self) -> &'static str {
        match self {
            Self::Cycle => "cycle",
            Self::LeftDrive => "left_drive",
            Self::RightDrive => "right_drive",
            Self::Belt => "belt",
            Self::Intake => "intake",
            Self::Solenoid => "solenoid",
        }
    }

    /// 按种类名查找
    pub fn from_name(name: &str) -> Option<Self> {
        [
            Self::Cycle,
            Self::LeftDrive,
            Self::RightDrive,
            Self::Belt,
            Self::Intake,
            Self::Solenoid,
        ]
        .into_iter()
        .find(|kind| kind.name() == name)
    }

    /// 是否为电压类指令
    pub fn is_voltage(self) -> bool {
        matches!(
            self,
            Self::LeftDrive | Self::RightDrive | Self::Belt | Self::Intake
        )
    }
}

/// 电磁阀通道
///
/// `Primary` 是经典配置下的唯一电磁阀；`Park` 与 `Auxiliary` 由塔楼辅助层使用。
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum SolenoidChannel {
    #[default]
    Primary = 0,
    Park = 1,
    Auxiliary = 2,
}

impl SolenoidChannel {
    /// 从数值编码转换
    pub fn from_code(code: u8) -> Result<Self, ProtocolError> {
        Self::try_from(code).map_err(|_| ProtocolError::UnknownChannel { code })
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Park => "park",
            Self::Auxiliary => "auxiliary",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        [Self::Primary, Self::Park, Self::Auxiliary]
            .into_iter()
            .find(|channel| channel.name() == name)
    }
}

/// 单条硬件指令
///
/// 由输入解码器创建，由指令栈独占持有，出栈后交给执行器消费。
/// 任何指令的生命周期都不超过一个 tick。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Instruction {
    /// 等待一个 tick（调度器负责计时，执行器忽略此指令）
    Cycle,
    /// 左侧底盘电压（毫伏）
    LeftDrive(i32),
    /// 右侧底盘电压（毫伏）
    RightDrive(i32),
    /// 传送带电压（毫伏）
    Belt(i32),
    /// 进球电压（毫伏）
    Intake(i32),
    /// 电磁阀输出
    Solenoid {
        channel: SolenoidChannel,
        active: bool,
    },
}

impl Instruction {
    /// 左侧底盘指令（自动钳位）
    #[inline]
    pub fn left_drive(millivolts: i32) -> Self {
        Self::LeftDrive(clamp_voltage(millivolts))
    }

    /// 右侧底盘指令（自动钳位）
    #[inline]
    pub fn right_drive(millivolts: i32) -> Self {
        Self::RightDrive(clamp_voltage(millivolts))
    }

    /// 传送带指令（自动钳位）
    #[inline]
    pub fn belt(millivolts: i32) -> Self {
        Self::Belt(clamp_voltage(millivolts))
    }

    /// 进球指令（自动钳位）
    #[inline]
    pub fn intake(millivolts: i32) -> Self {
        Self::Intake(clamp_voltage(millivolts))
    }

    /// 主电磁阀指令
    #[inline]
    pub fn solenoid(active: bool) -> Self {
        Self::Solenoid {
            channel: SolenoidChannel::Primary,
            active,
        }
    }

    /// 指定通道的电磁阀指令
    #[inline]
    pub fn pneumatic(channel: SolenoidChannel, active: bool) -> Self {
        Self::Solenoid { channel, active }
    }

    /// 从 (kind, value) 标签对构造指令
    ///
    /// 钳位是唯一的规范化手段：电压被钳位到合法范围，
    /// `Solenoid` 的任何非零值都视为 `true`（主通道）。
    pub fn from_raw(kind: InstructionKind, value: i32) -> Self {
        match kind {
            InstructionKind::Cycle => Self::Cycle,
            InstructionKind::LeftDrive => Self::left_drive(value),
            InstructionKind::RightDrive => Self::right_drive(value),
            InstructionKind::Belt => Self::belt(value),
            InstructionKind::Intake => Self::intake(value),
            InstructionKind::Solenoid => Self::solenoid(value != 0),
        }
    }

    /// 从数值编码构造指令
    pub fn from_codes(kind: u8, value: i32) -> Result<Self, ProtocolError> {
        Ok(Self::from_raw(InstructionKind::from_code(kind)?, value))
    }

    /// 指令种类
    pub fn kind(&self) -> InstructionKind {
        match self {
            Self::Cycle => InstructionKind::Cycle,
            Self::LeftDrive(_) => InstructionKind::LeftDrive,
            Self::RightDrive(_) => InstructionKind::RightDrive,
            Self::Belt(_) => InstructionKind::Belt,
            Self::Intake(_) => InstructionKind::Intake,
            Self::Solenoid { .. } => InstructionKind::Solenoid,
        }
    }

    /// 指令幅值（电压为毫伏，电磁阀为 0/1，`Cycle` 为 0）
    pub fn value(&self) -> i32 {
        match *self {
            Self::Cycle => 0,
            Self::LeftDrive(v) | Self::RightDrive(v) | Self::Belt(v) | Self::Intake(v) => v,
            Self::Solenoid { active, .. } => active as i32,
        }
    }

    /// 幅值是否处于该种类的合法范围
    pub fn is_in_range(&self) -> bool {
        match *self {
            Self::LeftDrive(v) | Self::RightDrive(v) | Self::Belt(v) | Self::Intake(v) => {
                (VOLTAGE_MIN..=VOLTAGE_MAX).contains(&v)
            },
            Self::Cycle | Self::Solenoid { .. } => true,
        }
    }

    /// 返回钳位后的副本
    pub fn clamped(self) -> Self {
        match self {
            Self::LeftDrive(v) => Self::LeftDrive(clamp_voltage(v)),
            Self::RightDrive(v) => Self::RightDrive(clamp_voltage(v)),
            Self::Belt(v) => Self::Belt(clamp_voltage(v)),
            Self::Intake(v) => Self::Intake(clamp_voltage(v)),
            other => other,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Cycle => f.write_str("cycle"),
            Self::Solenoid { channel, active } => {
                write!(f, "solenoid {} {}", channel.name(), active as i32)
            },
            other => write!(f, "{} {}", other.kind().name(), other.value()),
        }
    }
}

impl FromStr for Instruction {
    type Err = ProtocolError;

    /// 解析文本形式；电压同样经过钳位
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fail = |reason| ProtocolError::Parse {
            input: s.trim().to_owned(),
            reason,
        };
        let mut tokens = s.split_whitespace();
        let kind = tokens
            .next()
            .ok_or_else(|| fail("empty line"))
            .and_then(|name| InstructionKind::from_name(name).ok_or_else(|| fail("unknown kind")))?;

        let inst = match kind {
            InstructionKind::Cycle => Self::Cycle,
            InstructionKind::Solenoid => {
                let channel = tokens
                    .next()
                    .and_then(SolenoidChannel::from_name)
                    .ok_or_else(|| fail("missing or unknown solenoid channel"))?;
                let active = match tokens.next() {
                    Some("1") => true,
                    Some("0") => false,
                    _ => return Err(fail("solenoid level must be 0 or 1")),
                };
                Self::pneumatic(channel, active)
            },
            _ => {
                let value = tokens
                    .next()
                    .ok_or_else(|| fail("missing value"))?
                    .parse::<i32>()
                    .map_err(|_| fail("value is not an integer"))?;
                Self::from_raw(kind, value)
            },
        };

        if tokens.next().is_some() {
            return Err(fail("trailing tokens"));
        }
        Ok(inst)
    }
}
