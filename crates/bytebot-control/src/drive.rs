//! 底盘混控
//!
//! 单摇杆 arcade 控制：油门轴与转向轴分别过响应曲线，转向额外乘以
//! `turn_multiplier`，精确模式下两者同乘 `precise_multiplier`，再按
//!
//! ```text
//! left  = t + s·min(K − |t|, 1)
//! right = t − s·min(K − |t|, 1)
//! ```
//!
//! 混合。油门接近零时转向占主导，油门饱和时转向贡献逐渐退出。
//! 反向驾驶时 `(left, right) -> (-right, -left)`，最后换算毫伏并钳位。

use crate::ControlError;
use crate::curve::{DEFAULT_BASE, DEFAULT_GAIN, ResponseCurve, to_millivolts};
use crate::input::{Axis, Button, ControllerInput};
use bytebot_protocol::{Instruction, InstructionStack};
use serde::{Deserialize, Serialize};

/// 默认 desaturation 常数
pub const DEFAULT_DESATURATION: f64 = 1.6;

/// 底盘调参
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveTuning {
    /// 响应曲线底数
    pub base: f64,
    /// 响应曲线渐近斜率
    pub gain: f64,
    /// 转向缩放
    pub turn_multiplier: f64,
    /// 精确模式缩放
    pub precise_multiplier: f64,
    /// desaturation 常数 K（> 1）
    pub desaturation: f64,
    pub throttle_axis: Axis,
    pub steer_axis: Axis,
    pub precise_button: Button,
    pub reverse_button: Button,
}

impl Default for DriveTuning {
    fn default() -> Self {
        Self {
            base: DEFAULT_BASE,
            gain: DEFAULT_GAIN,
            turn_multiplier: 0.64,
            precise_multiplier: 0.60,
            desaturation: DEFAULT_DESATURATION,
            throttle_axis: Axis::LeftY,
            steer_axis: Axis::LeftX,
            precise_button: Button::L2,
            reverse_button: Button::L1,
        }
    }
}

impl DriveTuning {
    pub fn validate(&self) -> Result<(), ControlError> {
        ResponseCurve::new(self.base, self.gain)?;
        check_multiplier("drive.turn_multiplier", self.turn_multiplier)?;
        check_multiplier("drive.precise_multiplier", self.precise_multiplier)?;
        if !(self.desaturation.is_finite() && self.desaturation > 1.0) {
            return Err(ControlError::invalid(
                "drive.desaturation",
                format!("{} must be > 1", self.desaturation),
            ));
        }
        Ok(())
    }
}

fn check_multiplier(field: &'static str, value: f64) -> Result<(), ControlError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(ControlError::invalid(field, format!("{value} must be in (0, 1]")))
    }
}

/// 归一化单位下的 arcade 混合
#[inline]
pub fn mix(throttle: f64, steer: f64, desaturation: f64) -> (f64, f64) {
    let steer = steer * (desaturation - throttle.abs()).min(1.0);
    (throttle + steer, throttle - steer)
}

/// 反向驾驶：左右交换并取反
#[inline]
pub fn reverse(left: i32, right: i32) -> (i32, i32) {
    (right.saturating_neg(), left.saturating_neg())
}

/// 底盘指令生产者
#[derive(Debug, Clone)]
pub struct DriveDecoder {
    curve: ResponseCurve,
    tuning: DriveTuning,
}

impl DriveDecoder {
    pub fn new(tuning: DriveTuning) -> Result<Self, ControlError> {
        tuning.validate()?;
        Ok(Self {
            curve: ResponseCurve::new(tuning.base, tuning.gain)?,
            tuning,
        })
    }

    pub fn tuning(&self) -> &DriveTuning {
        &self.tuning
    }

    pub fn curve(&self) -> &ResponseCurve {
        &self.curve
    }

    /// 由原始读数和修饰键计算左右毫伏值
    pub fn compute(&self, throttle: i8, steer: i8, precise: bool, reversed: bool) -> (i32, i32) {
        let mut t = self.curve.apply(i32::from(throttle));
        let mut s = self.curve.apply(i32::from(steer)) * self.tuning.turn_multiplier;

        if precise {
            t *= self.tuning.precise_multiplier;
            s *= self.tuning.precise_multiplier;
        }

        let (left, right) = mix(t, s, self.tuning.desaturation);
        let (left, right) = (to_millivolts(left), to_millivolts(right));

        if reversed {
            reverse(left, right)
        } else {
            (left, right)
        }
    }

    /// 读取手柄并压入 LEFT_DRIVE / RIGHT_DRIVE（每个 tick 都发出）
    pub fn decode<I: ControllerInput + ?Sized>(&self, input: &I, stack: &mut InstructionStack) {
        let (left, right) = self.compute(
            input.analog(self.tuning.throttle_axis),
            input.analog(self.tuning.steer_axis),
            input.digital(self.tuning.precise_button),
            input.digital(self.tuning.reverse_button),
        );
        stack.push(Instruction::left_drive(left));
        stack.push(Instruction::right_drive(right));
    }
}

impl Default for DriveDecoder {
    fn default() -> Self {
        Self {
            curve: ResponseCurve::default(),
            tuning: DriveTuning::default(),
        }
    }
}
