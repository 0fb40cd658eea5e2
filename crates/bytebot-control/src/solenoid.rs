//! 电磁阀边沿切换
//!
//! 只在按键上升沿切换状态，并且距离上一次切换至少 `debounce_ticks` 个 tick。
//! 切换时发出一条 SOLENOID 指令，接通时附带一次短震；
//! 没有切换的 tick 不发任何指令。

use crate::ControlError;
use crate::input::{Button, ControllerInput};
use bytebot_protocol::{Instruction, InstructionStack, SolenoidChannel};
use serde::{Deserialize, Serialize};
use tracing::info;

/// 边沿触发的布尔开关（带去抖）
///
/// 上一次切换的 tick 用 `Option` 表示，首次按下总是生效。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeToggle {
    active: bool,
    last_toggle: Option<u64>,
    debounce_ticks: u32,
}

impl EdgeToggle {
    pub const fn new(debounce_ticks: u32) -> Self {
        Self {
            active: false,
            last_toggle: None,
            debounce_ticks,
        }
    }

    /// 以指定初值创建
    pub const fn with_state(active: bool, debounce_ticks: u32) -> Self {
        Self {
            active,
            last_toggle: None,
            debounce_ticks,
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn last_toggle(&self) -> Option<u64> {
        self.last_toggle
    }

    /// 强制设置状态（不计入去抖）
    pub fn set(&mut self, active: bool) {
        self.active = active;
    }

    /// 处理一个 tick 的边沿，切换时返回新状态
    pub fn update(&mut self, tick: u64, pressed: bool) -> Option<bool> {
        if !pressed {
            return None;
        }
        let settled = self
            .last_toggle
            .is_none_or(|last| tick.saturating_sub(last) >= u64::from(self.debounce_ticks));
        if !settled {
            return None;
        }
        self.active = !self.active;
        self.last_toggle = Some(tick);
        Some(self.active)
    }

    /// 回到初始状态（新的手动阶段开始）
    pub fn reset(&mut self, active: bool) {
        self.active = active;
        self.last_toggle = None;
    }
}

/// 电磁阀调参
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolenoidTuning {
    pub button: Button,
    /// 两次切换之间的最小间隔（tick）
    pub debounce_ticks: u32,
    /// 接通时的震动模式
    pub rumble: String,
}

impl Default for SolenoidTuning {
    fn default() -> Self {
        Self {
            button: Button::X,
            debounce_ticks: 10,
            rumble: ".".to_owned(),
        }
    }
}

impl SolenoidTuning {
    pub fn validate(&self) -> Result<(), ControlError> {
        if self.debounce_ticks == 0 {
            return Err(ControlError::invalid("solenoid.debounce_ticks", "must be > 0"));
        }
        Ok(())
    }
}

/// 主电磁阀指令生产者
#[derive(Debug, Clone)]
pub struct SolenoidDecoder {
    tuning: SolenoidTuning,
    toggle: EdgeToggle,
}

impl SolenoidDecoder {
    pub fn new(tuning: SolenoidTuning) -> Result<Self, ControlError> {
        tuning.validate()?;
        Ok(Self {
            toggle: EdgeToggle::new(tuning.debounce_ticks),
            tuning,
        })
    }

    pub fn is_active(&self) -> bool {
        self.toggle.is_active()
    }

    pub fn reset(&mut self) {
        self.toggle.reset(false);
    }

    pub fn decode<I: ControllerInput + ?Sized>(
        &mut self,
        tick: u64,
        input: &mut I,
        stack: &mut InstructionStack,
    ) {
        let pressed = input.new_press(self.tuning.button);
        if let Some(active) = self.toggle.update(tick, pressed) {
            if active {
                input.rumble(&self.tuning.rumble);
            }
            info!(tick, active, "Solenoid toggled");
            stack.push(Instruction::pneumatic(SolenoidChannel::Primary, active));
        }
    }
}
