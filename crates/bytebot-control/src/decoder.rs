//! 输入解码器
//!
//! 每个 tick 读取一次手柄状态，按配置的组合方式调用各个生产者压栈。
//! 解码器本身不阻塞，只保留边沿检测需要的少量状态（开关状态、上次切换的 tick）。

use crate::ControlError;
use crate::belt::BeltTuning;
use crate::config::{DecoderProfile, RobotConfig};
use crate::drive::DriveDecoder;
use crate::input::ControllerInput;
use crate::solenoid::SolenoidDecoder;
use crate::tower::{ColorSensor, TowerDecoder};
use bytebot_protocol::InstructionStack;
use tracing::trace;

/// 输入解码器
#[derive(Debug, Clone)]
pub struct InputDecoder {
    profile: DecoderProfile,
    drive: DriveDecoder,
    belt: BeltTuning,
    solenoid: SolenoidDecoder,
    tower: TowerDecoder,
}

impl InputDecoder {
    pub fn new(config: &RobotConfig) -> Result<Self, ControlError> {
        config.belt.validate()?;
        Ok(Self {
            profile: config.profile,
            drive: DriveDecoder::new(config.drive.clone())?,
            belt: config.belt.clone(),
            solenoid: SolenoidDecoder::new(config.solenoid.clone())?,
            tower: TowerDecoder::new(config.tower.clone())?,
        })
    }

    pub fn profile(&self) -> DecoderProfile {
        self.profile
    }

    pub fn drive(&self) -> &DriveDecoder {
        &self.drive
    }

    pub fn solenoid(&self) -> &SolenoidDecoder {
        &self.solenoid
    }

    pub fn tower(&self) -> &TowerDecoder {
        &self.tower
    }

    /// 清空所有模式状态（每个手动阶段开始时调用）
    pub fn reset(&mut self) {
        self.solenoid.reset();
        self.tower.reset();
    }

    /// 解码一个 tick，返回压入的指令数
    ///
    /// `input.sample()` 由调用方负责，解码器只读取当前快照。
    pub fn decode<I, S>(
        &mut self,
        tick: u64,
        input: &mut I,
        sensor: &S,
        stack: &mut InstructionStack,
    ) -> usize
    where
        I: ControllerInput + ?Sized,
        S: ColorSensor + ?Sized,
    {
        let before = stack.len();

        self.drive.decode(&*input, stack);
        match self.profile {
            DecoderProfile::Classic => {
                self.belt.decode(&*input, stack);
                self.solenoid.decode(tick, input, stack);
            },
            DecoderProfile::Tower => {
                self.tower.decode(tick, input, sensor, stack);
            },
        }

        let pushed = stack.len() - before;
        trace!(tick, pushed, "Decoded controller input");
        pushed
    }
}
