//! 传送带 / 进球解码
//!
//! 正转键、反转键、都不按三种互斥状态映射为 `{+v, −v, 0}`，传送带和进球同时下发。
//! 每个 tick 都发出两条指令，松键后执行器不会保留旧命令。

use crate::ControlError;
use crate::input::{Button, ControllerInput};
use bytebot_protocol::{Instruction, InstructionStack, VOLTAGE_MAX};
use serde::{Deserialize, Serialize};

/// 传送带调参
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeltTuning {
    /// 传送带与进球电压（毫伏）
    pub voltage: i32,
    pub forward_button: Button,
    pub reverse_button: Button,
}

impl Default for BeltTuning {
    fn default() -> Self {
        Self {
            voltage: VOLTAGE_MAX,
            forward_button: Button::R2,
            reverse_button: Button::R1,
        }
    }
}

impl BeltTuning {
    pub fn validate(&self) -> Result<(), ControlError> {
        if (0..=VOLTAGE_MAX).contains(&self.voltage) {
            Ok(())
        } else {
            Err(ControlError::invalid(
                "belt.voltage",
                format!("{} must be in 0..={VOLTAGE_MAX}", self.voltage),
            ))
        }
    }

    /// 当前按键状态对应的电压，正转优先
    pub fn voltage_for(&self, forward: bool, reverse: bool) -> i32 {
        if forward {
            self.voltage
        } else if reverse {
            -self.voltage
        } else {
            0
        }
    }

    pub fn decode<I: ControllerInput + ?Sized>(&self, input: &I, stack: &mut InstructionStack) {
        let v = self.voltage_for(
            input.digital(self.forward_button),
            input.digital(self.reverse_button),
        );
        stack.push(Instruction::belt(v));
        stack.push(Instruction::intake(v));
    }
}
