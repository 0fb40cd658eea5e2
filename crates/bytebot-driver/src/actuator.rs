//! 执行器接口
//!
//! 执行器调用是"发出即忘"的：不返回结果，失败在这一层不可观测。
//! 下一个 tick 会重新下发命令，这就是系统隐式的重试机制。
//!
//! 硬件适配器和测试替身实现同一套 trait，通过构造函数注入执行器，
//! 不使用进程级全局句柄。

use crate::config::AdiPin;

/// 电机电压接口
pub trait MotorBus {
    /// 设置指定智能端口电机的电压（毫伏，已处理反向）
    fn set_voltage(&mut self, port: u8, millivolts: i32);
}

/// 数字输出接口（气动电磁阀）
pub trait DigitalBus {
    /// 设置指定 ADI 引脚的电平
    fn set_digital(&mut self, pin: AdiPin, level: bool);
}

impl<T: MotorBus + ?Sized> MotorBus for &mut T {
    fn set_voltage(&mut self, port: u8, millivolts: i32) {
        (**self).set_voltage(port, millivolts);
    }
}

impl<T: DigitalBus + ?Sized> DigitalBus for &mut T {
    fn set_digital(&mut self, pin: AdiPin, level: bool) {
        (**self).set_digital(pin, level);
    }
}

impl<T: MotorBus + ?Sized> MotorBus for Box<T> {
    fn set_voltage(&mut self, port: u8, millivolts: i32) {
        (**self).set_voltage(port, millivolts);
    }
}

impl<T: DigitalBus + ?Sized> DigitalBus for Box<T> {
    fn set_digital(&mut self, pin: AdiPin, level: bool) {
        (**self).set_digital(pin, level);
    }
}
