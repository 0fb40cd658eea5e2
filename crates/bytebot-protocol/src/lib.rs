//! # bytebot 协议层
//!
//! 定义控制循环内部流转的指令（Instruction）以及单个 tick 内使用的指令栈。
//!
//! - [`Instruction`]: 一条硬件动作及其幅值（带标签的和类型）
//! - [`InstructionKind`]: 指令种类，带稳定的数值编码
//! - [`InstructionStack`]: LIFO 指令栈，每个 tick 填充并在 tick 结束前清空
//!
//! 本 crate 不依赖任何硬件，驱动层（`bytebot-driver`）负责把指令翻译成执行器调用。

mod error;
pub mod instruction;
pub mod stack;

pub use error::ProtocolError;
pub use instruction::{
    Instruction, InstructionKind, SolenoidChannel, VOLTAGE_MAX, VOLTAGE_MIN, clamp_voltage,
};
pub use stack::{Drain, InstructionStack, STACK_INLINE_CAPACITY};
