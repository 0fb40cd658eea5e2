//! 手柄输入模块
//!
//! [`ControllerInput`] 是解码器读取操作手输入的唯一接口：摇杆模拟量、按键电平、
//! 按键上升沿和震动反馈。平台自带 new-press 查询时直接适配该 trait；
//! 只能拿到电平快照的平台用 [`EdgeTracker`] 由相邻两帧计算上升沿。

use serde::{Deserialize, Serialize};

/// 摇杆模拟量的最大幅值
pub const AXIS_MAX: i8 = 127;

/// 摇杆轴
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    LeftX,
    LeftY,
    RightX,
    RightY,
}

/// 手柄按键
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Button {
    A = 0,
    B = 1,
    X = 2,
    Y = 3,
    Up = 4,
    Down = 5,
    Left = 6,
    Right = 7,
    L1 = 8,
    L2 = 9,
    R1 = 10,
    R2 = 11,
}

impl Button {
    #[inline]
    const fn mask(self) -> u16 {
        1 << (self as u8)
    }
}

/// 手柄输入接口
///
/// 所有方法都是读取当前瞬间的状态。`new_press` 的语义是"本 tick 相对上一 tick 的上升沿"，
/// 同一 tick 内多次查询同一按键结果一致。
pub trait ControllerInput {
    /// 每个 tick 解码前调用一次，刷新输入快照
    fn sample(&mut self) {}

    /// 摇杆读数，范围 -127..=127
    fn analog(&self, axis: Axis) -> i8;

    /// 按键当前是否按下
    fn digital(&self, button: Button) -> bool;

    /// 按键本 tick 是否刚刚按下
    fn new_press(&self, button: Button) -> bool;

    /// 震动反馈（`.` 短震，`-` 长震）
    fn rumble(&mut self, pattern: &str);
}

impl<T: ControllerInput + ?Sized> ControllerInput for &mut T {
    fn sample(&mut self) {
        (**self).sample()
    }

    fn analog(&self, axis: Axis) -> i8 {
        (**self).analog(axis)
    }

    fn digital(&self, button: Button) -> bool {
        (**self).digital(button)
    }

    fn new_press(&self, button: Button) -> bool {
        (**self).new_press(button)
    }

    fn rumble(&mut self, pattern: &str) {
        (**self).rumble(pattern)
    }
}

/// 单个瞬间的手柄快照
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControllerFrame {
    pub left_x: i8,
    pub left_y: i8,
    pub right_x: i8,
    pub right_y: i8,
    buttons: u16,
}

impl ControllerFrame {
    /// 全部松开、摇杆居中
    pub const NEUTRAL: Self = Self {
        left_x: 0,
        left_y: 0,
        right_x: 0,
        right_y: 0,
        buttons: 0,
    };

    /// 设置一个轴的读数
    pub fn with_axis(mut self, axis: Axis, value: i8) -> Self {
        *self.axis_mut(axis) = value;
        self
    }

    /// 追加按下的按键
    pub fn with_buttons(mut self, buttons: &[Button]) -> Self {
        for &b in buttons {
            self.buttons |= b.mask();
        }
        self
    }

    /// 摇杆读数（-128 收敛到 -127，保证对称）
    pub fn axis(&self, axis: Axis) -> i8 {
        let raw = match axis {
            Axis::LeftX => self.left_x,
            Axis::LeftY => self.left_y,
            Axis::RightX => self.right_x,
            Axis::RightY => self.right_y,
        };
        raw.max(-AXIS_MAX)
    }

    fn axis_mut(&mut self, axis: Axis) -> &mut i8 {
        match axis {
            Axis::LeftX => &mut self.left_x,
            Axis::LeftY => &mut self.left_y,
            Axis::RightX => &mut self.right_x,
            Axis::RightY => &mut self.right_y,
        }
    }

    /// 按键是否按下
    #[inline]
    pub fn is_pressed(&self, button: Button) -> bool {
        self.buttons & button.mask() != 0
    }
}

/// 由相邻两帧快照计算按键上升沿
///
/// 同时记录解码器发出的震动模式，供仿真器输出和测试断言。
#[derive(Debug, Clone, Default)]
pub struct EdgeTracker {
    current: ControllerFrame,
    previous: ControllerFrame,
    rumbles: Vec<String>,
}

impl EdgeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 推入新的一帧，上一帧成为边沿比较的基准
    pub fn push_frame(&mut self, frame: ControllerFrame) {
        self.previous = self.current;
        self.current = frame;
    }

    pub fn current(&self) -> &ControllerFrame {
        &self.current
    }

    /// 迄今发出的震动模式
    pub fn rumbles(&self) -> &[String] {
        &self.rumbles
    }

    /// 取走已记录的震动模式
    pub fn take_rumbles(&mut self) -> Vec<String> {
        std::mem::take(&mut self.rumbles)
    }
}

impl ControllerInput for EdgeTracker {
    fn analog(&self, axis: Axis) -> i8 {
        self.current.axis(axis)
    }

    fn digital(&self, button: Button) -> bool {
        self.current.is_pressed(button)
    }

    fn new_press(&self, button: Button) -> bool {
        self.current.is_pressed(button) && !self.previous.is_pressed(button)
    }

    fn rumble(&mut self, pattern: &str) {
        self.rumbles.push(pattern.to_owned());
    }
}

/// 脚本中的一步：一帧快照，保持 `repeat` 个 tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptStep {
    pub left_x: i8,
    pub left_y: i8,
    pub right_x: i8,
    pub right_y: i8,
    pub buttons: Vec<Button>,
    pub repeat: u32,
}

impl Default for ScriptStep {
    fn default() -> Self {
        Self {
            left_x: 0,
            left_y: 0,
            right_x: 0,
            right_y: 0,
            buttons: Vec::new(),
            repeat: 1,
        }
    }
}

impl ScriptStep {
    pub fn frame(&self) -> ControllerFrame {
        ControllerFrame {
            left_x: self.left_x,
            left_y: self.left_y,
            right_x: self.right_x,
            right_y: self.right_y,
            buttons: 0,
        }
        .with_buttons(&self.buttons)
    }
}

/// 按脚本回放的手柄
///
/// 每次 `sample()` 前进一个 tick；脚本耗尽后保持全松开状态。
#[derive(Debug, Clone, Default)]
pub struct ScriptedController {
    steps: Vec<ScriptStep>,
    step: usize,
    held: u32,
    tracker: EdgeTracker,
}

impl ScriptedController {
    pub fn new(steps: Vec<ScriptStep>) -> Self {
        Self {
            steps,
            ..Self::default()
        }
    }

    /// 由逐 tick 的快照构造（每帧保持一个 tick）
    pub fn from_frames(frames: impl IntoIterator<Item = ControllerFrame>) -> Self {
        let steps = frames
            .into_iter()
            .map(|f| ScriptStep {
                left_x: f.left_x,
                left_y: f.left_y,
                right_x: f.right_x,
                right_y: f.right_y,
                buttons: ALL_BUTTONS
                    .iter()
                    .copied()
                    .filter(|&b| f.is_pressed(b))
                    .collect(),
                repeat: 1,
            })
            .collect();
        Self::new(steps)
    }

    /// 脚本覆盖的 tick 总数
    pub fn total_ticks(&self) -> u64 {
        self.steps.iter().map(|s| u64::from(s.repeat)).sum()
    }

    /// 脚本是否已经回放完毕
    pub fn is_finished(&self) -> bool {
        self.step >= self.steps.len()
    }

    pub fn tracker(&self) -> &EdgeTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut EdgeTracker {
        &mut self.tracker
    }

    fn next_frame(&mut self) -> ControllerFrame {
        while let Some(step) = self.steps.get(self.step) {
            if self.held < step.repeat {
                self.held += 1;
                return step.frame();
            }
            self.step += 1;
            self.held = 0;
        }
        ControllerFrame::NEUTRAL
    }
}

const ALL_BUTTONS: [Button; 12] = [
    Button::A,
    Button::B,
    Button::X,
    Button::Y,
    Button::Up,
    Button::Down,
    Button::Left,
    Button::Right,
    Button::L1,
    Button::L2,
    Button::R1,
    Button::R2,
];

impl ControllerInput for ScriptedController {
    fn sample(&mut self) {
        let frame = self.next_frame();
        self.tracker.push_frame(frame);
    }

    fn analog(&self, axis: Axis) -> i8 {
        self.tracker.analog(axis)
    }

    fn digital(&self, button: Button) -> bool {
        self.tracker.digital(button)
    }

    fn new_press(&self, button: Button) -> bool {
        self.tracker.new_press(button)
    }

    fn rumble(&mut self, pattern: &str) {
        self.tracker.rumble(pattern)
    }
}
