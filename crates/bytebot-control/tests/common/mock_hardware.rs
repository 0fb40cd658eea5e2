//! Mock 硬件接口
//!
//! 记录型电机总线 / 数字输出、可设置读数的颜色传感器，以及在模拟时钟上
//! 注入 tick 耗时的任务包装。执行器独占总线，测试侧通过共享状态观察结果。

use bytebot_control::ColorSensor;
use bytebot_driver::{AdiPin, DigitalBus, ManualClock, MotorBus, TickTask};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// 模拟硬件状态
#[derive(Debug, Default)]
pub struct MockHardwareState {
    /// 每个端口最后一次写入的电压
    pub voltages: BTreeMap<u8, i32>,
    /// 每个引脚最后一次写入的电平
    pub pins: BTreeMap<char, bool>,
    /// 按时间顺序的全部电机写入
    pub motor_log: Vec<(u8, i32)>,
    /// 按时间顺序的全部引脚写入
    pub pin_log: Vec<(char, bool)>,
}

pub type SharedState = Arc<Mutex<MockHardwareState>>;

/// 模拟电机总线
#[derive(Debug, Clone)]
pub struct MockMotors {
    state: SharedState,
}

impl MotorBus for MockMotors {
    fn set_voltage(&mut self, port: u8, millivolts: i32) {
        let mut state = self.state.lock().unwrap();
        state.voltages.insert(port, millivolts);
        state.motor_log.push((port, millivolts));
    }
}

/// 模拟数字输出
#[derive(Debug, Clone)]
pub struct MockDigital {
    state: SharedState,
}

impl DigitalBus for MockDigital {
    fn set_digital(&mut self, pin: AdiPin, level: bool) {
        let mut state = self.state.lock().unwrap();
        state.pins.insert(pin.0, level);
        state.pin_log.push((pin.0, level));
    }
}

/// 创建一对共享状态的总线
pub fn mock_buses() -> (MockMotors, MockDigital, SharedState) {
    let state = SharedState::default();
    (
        MockMotors {
            state: state.clone(),
        },
        MockDigital {
            state: state.clone(),
        },
        state,
    )
}

pub fn voltage(state: &SharedState, port: u8) -> Option<i32> {
    state.lock().unwrap().voltages.get(&port).copied()
}

pub fn pin(state: &SharedState, pin: char) -> Option<bool> {
    state.lock().unwrap().pins.get(&pin).copied()
}

/// 读数可在测试中修改的颜色传感器
#[derive(Debug, Clone, Default)]
pub struct MockColorSensor {
    reading: Arc<Mutex<(f64, i32)>>,
}

impl MockColorSensor {
    pub fn set(&self, hue: f64, proximity: i32) {
        *self.reading.lock().unwrap() = (hue, proximity);
    }
}

impl ColorSensor for MockColorSensor {
    fn hue(&self) -> f64 {
        self.reading.lock().unwrap().0
    }

    fn proximity(&self) -> i32 {
        self.reading.lock().unwrap().1
    }
}

/// 在模拟时钟上为每个 tick 注入指定耗时
pub struct TimedTask<T> {
    pub inner: T,
    clock: ManualClock,
    durations: Vec<Duration>,
}

impl<T> TimedTask<T> {
    pub fn new(inner: T, clock: ManualClock, durations: Vec<Duration>) -> Self {
        Self {
            inner,
            clock,
            durations,
        }
    }
}

impl<T: TickTask> TickTask for TimedTask<T> {
    fn tick(&mut self, tick: u64) {
        self.inner.tick(tick);
        if let Some(d) = self.durations.get(tick as usize) {
            self.clock.advance(*d);
        }
    }
}
