//! 塔楼辅助层
//!
//! 多个独立的布尔模式，各自由一个按键的上升沿切换，并带有各自的震动模式：
//!
//! | 模式 | 默认按键 | 震动（接通时） | 输出 |
//! |------|----------|----------------|------|
//! | 进球存储 `intake` | R2 | `.` | 参与动作判定 |
//! | 停车 `park` | Y | `.-` | SOLENOID Park |
//! | 辅助气缸 `auxiliary` | B | `-` | SOLENOID Auxiliary |
//! | 颜色分拣 `color_sort` | A | `..` | 控制顶盖方向 |
//!
//! 动作按优先级判定：得分（R1+R2 按住）> 吐球（R1 按住）> 存储（`intake` 打开）> 空闲。
//! 顶盖（hood）走 BELT 指令，滚筒（rollers）走 INTAKE 指令，每个 tick 都下发。
//!
//! 颜色分拣：传感器读数满足接近度阈值且色相落在对手窗口内时，倒计时重置为
//! `hold_ticks`；倒计时非零期间存储动作的顶盖改为正转，把对手的球从顶部甩出。
//! 甩出只作用于存储动作：得分、吐球和空闲时顶盖照常跟随动作（空闲保持静止），
//! 倒计时仍逐 tick 递减。

use crate::ControlError;
use crate::input::{Button, ControllerInput};
use bytebot_protocol::{Instruction, InstructionStack, SolenoidChannel, VOLTAGE_MAX};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// 颜色传感器
pub trait ColorSensor {
    /// 色相（度，0..360）
    fn hue(&self) -> f64;

    /// 接近度读数（越大越近）
    fn proximity(&self) -> i32;
}

impl<T: ColorSensor + ?Sized> ColorSensor for &T {
    fn hue(&self) -> f64 {
        (**self).hue()
    }

    fn proximity(&self) -> i32 {
        (**self).proximity()
    }
}

/// 未安装颜色传感器（永远不触发分拣）
#[derive(Debug, Clone, Copy, Default)]
pub struct NoColorSensor;

impl ColorSensor for NoColorSensor {
    fn hue(&self) -> f64 {
        0.0
    }

    fn proximity(&self) -> i32 {
        0
    }
}

/// 颜色分拣调参
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorSortTuning {
    /// 对手色相窗口下界（度）
    pub hue_min: f64,
    /// 对手色相窗口上界（度），小于下界时窗口跨越 0°
    pub hue_max: f64,
    /// 接近度阈值
    pub proximity_threshold: i32,
    /// 最后一次命中后保持的 tick 数
    pub hold_ticks: u32,
}

impl Default for ColorSortTuning {
    fn default() -> Self {
        Self {
            hue_min: 180.0,
            hue_max: 260.0,
            proximity_threshold: 100,
            hold_ticks: 20,
        }
    }
}

impl ColorSortTuning {
    /// 单次读数是否命中
    pub fn qualifies(&self, hue: f64, proximity: i32) -> bool {
        if proximity < self.proximity_threshold {
            return false;
        }
        let hue = hue.rem_euclid(360.0);
        if self.hue_min <= self.hue_max {
            (self.hue_min..=self.hue_max).contains(&hue)
        } else {
            hue >= self.hue_min || hue <= self.hue_max
        }
    }
}

/// 颜色分拣倒计时
#[derive(Debug, Clone, Default)]
pub struct ColorSort {
    tuning: ColorSortTuning,
    countdown: u32,
}

impl ColorSort {
    pub fn new(tuning: ColorSortTuning) -> Self {
        Self {
            tuning,
            countdown: 0,
        }
    }

    /// 读取一次传感器，返回本 tick 是否处于分拣状态
    pub fn update<S: ColorSensor + ?Sized>(&mut self, sensor: &S) -> bool {
        if self.tuning.qualifies(sensor.hue(), sensor.proximity()) {
            self.countdown = self.tuning.hold_ticks;
        } else {
            self.countdown = self.countdown.saturating_sub(1);
        }
        self.countdown > 0
    }

    pub fn remaining(&self) -> u32 {
        self.countdown
    }

    pub fn clear(&mut self) {
        self.countdown = 0;
    }
}

/// 塔楼动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TowerAction {
    /// 顶盖和滚筒同时正转
    Score,
    /// 顶盖和滚筒同时反转
    Outtake,
    /// 滚筒正转，顶盖反转
    Store,
    Idle,
}

impl TowerAction {
    /// (顶盖, 滚筒) 电压
    pub fn voltages(self, forward: i32, outtake: i32) -> (i32, i32) {
        match self {
            TowerAction::Score => (forward, forward),
            TowerAction::Outtake => (-outtake, -outtake),
            TowerAction::Store => (-forward, forward),
            TowerAction::Idle => (0, 0),
        }
    }
}

/// 塔楼模式状态（每个手动阶段开始时重置）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TowerModes {
    pub intake: bool,
    pub park: bool,
    pub auxiliary: bool,
    pub color_sort: bool,
}

impl TowerModes {
    pub fn new(color_sort: bool) -> Self {
        Self {
            intake: false,
            park: false,
            auxiliary: false,
            color_sort,
        }
    }
}

/// 塔楼调参
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TowerTuning {
    /// 得分 / 存储电压（毫伏）
    pub voltage: i32,
    /// 吐球电压（毫伏）
    pub outtake_voltage: i32,
    pub intake_button: Button,
    pub outtake_button: Button,
    pub park_button: Button,
    pub auxiliary_button: Button,
    pub color_sort_button: Button,
    /// 颜色分拣初始是否打开
    pub color_sort_enabled: bool,
    pub color_sort: ColorSortTuning,
}

impl Default for TowerTuning {
    fn default() -> Self {
        Self {
            voltage: VOLTAGE_MAX,
            outtake_voltage: VOLTAGE_MAX,
            intake_button: Button::R2,
            outtake_button: Button::R1,
            park_button: Button::Y,
            auxiliary_button: Button::B,
            color_sort_button: Button::A,
            color_sort_enabled: true,
            color_sort: ColorSortTuning::default(),
        }
    }
}

impl TowerTuning {
    pub fn validate(&self) -> Result<(), ControlError> {
        for (field, v) in [
            ("tower.voltage", self.voltage),
            ("tower.outtake_voltage", self.outtake_voltage),
        ] {
            if !(0..=VOLTAGE_MAX).contains(&v) {
                return Err(ControlError::invalid(
                    field,
                    format!("{v} must be in 0..={VOLTAGE_MAX}"),
                ));
            }
        }
        let sort = &self.color_sort;
        for (field, hue) in [
            ("tower.color_sort.hue_min", sort.hue_min),
            ("tower.color_sort.hue_max", sort.hue_max),
        ] {
            if !(0.0..360.0).contains(&hue) {
                return Err(ControlError::invalid(field, format!("{hue} must be in [0, 360)")));
            }
        }
        Ok(())
    }
}

/// 塔楼指令生产者
#[derive(Debug, Clone)]
pub struct TowerDecoder {
    tuning: TowerTuning,
    modes: TowerModes,
    sort: ColorSort,
}

impl TowerDecoder {
    pub fn new(tuning: TowerTuning) -> Result<Self, ControlError> {
        tuning.validate()?;
        Ok(Self {
            modes: TowerModes::new(tuning.color_sort_enabled),
            sort: ColorSort::new(tuning.color_sort.clone()),
            tuning,
        })
    }

    pub fn modes(&self) -> &TowerModes {
        &self.modes
    }

    pub fn color_sort(&self) -> &ColorSort {
        &self.sort
    }

    pub fn reset(&mut self) {
        self.modes = TowerModes::new(self.tuning.color_sort_enabled);
        self.sort.clear();
    }

    /// 按优先级判定动作，得分和吐球会关闭存储模式
    fn decide<I: ControllerInput + ?Sized>(&mut self, input: &I) -> TowerAction {
        let score = input.digital(self.tuning.intake_button);
        let outtake = input.digital(self.tuning.outtake_button);
        match (score, outtake) {
            (true, true) => {
                self.modes.intake = false;
                TowerAction::Score
            },
            (_, true) => {
                self.modes.intake = false;
                TowerAction::Outtake
            },
            _ if self.modes.intake => TowerAction::Store,
            _ => TowerAction::Idle,
        }
    }

    pub fn decode<I, S>(&mut self, tick: u64, input: &mut I, sensor: &S, stack: &mut InstructionStack)
    where
        I: ControllerInput + ?Sized,
        S: ColorSensor + ?Sized,
    {
        if input.new_press(self.tuning.intake_button) {
            self.modes.intake = !self.modes.intake;
            if self.modes.intake {
                input.rumble(".");
            }
            info!(tick, intake = self.modes.intake, "Tower intake toggled");
        }

        if input.new_press(self.tuning.color_sort_button) {
            self.modes.color_sort = !self.modes.color_sort;
            if self.modes.color_sort {
                input.rumble("..");
            }
            info!(tick, color_sort = self.modes.color_sort, "Color sort toggled");
        }

        let action = self.decide(&*input);
        let ejecting = if self.modes.color_sort {
            self.sort.update(sensor)
        } else {
            self.sort.clear();
            false
        };

        let (mut hood, rollers) = action.voltages(self.tuning.voltage, self.tuning.outtake_voltage);
        if ejecting && action == TowerAction::Store {
            hood = self.tuning.voltage;
        }
        debug!(tick, ?action, ejecting, hood, rollers, "Tower");
        stack.push(Instruction::belt(hood));
        stack.push(Instruction::intake(rollers));

        if input.new_press(self.tuning.park_button) {
            self.modes.park = !self.modes.park;
            if self.modes.park {
                input.rumble(".-");
            }
            info!(tick, park = self.modes.park, "Park toggled");
            stack.push(Instruction::pneumatic(SolenoidChannel::Park, self.modes.park));
        }

        if input.new_press(self.tuning.auxiliary_button) {
            self.modes.auxiliary = !self.modes.auxiliary;
            if self.modes.auxiliary {
                input.rumble("-");
            }
            info!(tick, auxiliary = self.modes.auxiliary, "Auxiliary toggled");
            stack.push(Instruction::pneumatic(
                SolenoidChannel::Auxiliary,
                self.modes.auxiliary,
            ));
        }
    }
}
