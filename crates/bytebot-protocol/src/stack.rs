//! 指令栈模块
//!
//! 单个 tick 内使用的 LIFO 指令缓冲区。解码器的各个生产者（底盘、传送带/进球、电磁阀、
//! 塔楼）独立压栈，调度器在同一 tick 内全部弹出并执行。
//!
//! **容量**：使用 `SmallVec` 在栈上预留 [`STACK_INLINE_CAPACITY`] 个位置，
//! 足以覆盖每个 tick 的全部生产者（最多 6 条指令）。超过容量时溢出到堆上，
//! `push` 依旧成功，不存在可观测的分配失败。

use crate::Instruction;
use smallvec::SmallVec;

/// 内联容量（每个 tick 的生产者上限留有余量）
pub const STACK_INLINE_CAPACITY: usize = 8;

type Slots = SmallVec<[Instruction; STACK_INLINE_CAPACITY]>;

/// LIFO 指令栈
///
/// 空栈是合法的静止状态。每个 tick 开始和结束时栈都应为空；
/// tick 结束时仍有残留指令意味着存在缺陷（泄漏），应由测试发现。
///
/// # 示例
///
/// ```
/// use bytebot_protocol::{Instruction, InstructionStack};
///
/// let mut stack = InstructionStack::new();
/// stack.push(Instruction::left_drive(1000));
/// stack.push(Instruction::right_drive(-1000));
///
/// assert_eq!(stack.pop(), Some(Instruction::RightDrive(-1000)));
/// assert_eq!(stack.pop(), Some(Instruction::LeftDrive(1000)));
/// assert_eq!(stack.pop(), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InstructionStack {
    slots: Slots,
    high_water_mark: usize,
}

impl InstructionStack {
    /// 创建空栈
    pub fn new() -> Self {
        Self::default()
    }

    /// 压入一条指令（O(1)，总是成功）
    #[inline]
    pub fn push(&mut self, inst: Instruction) {
        self.slots.push(inst);
        self.high_water_mark = self.high_water_mark.max(self.slots.len());
    }

    /// 弹出最近压入的指令
    ///
    /// 空栈返回 `None`，不是错误。
    #[inline]
    pub fn pop(&mut self) -> Option<Instruction> {
        self.slots.pop()
    }

    /// 查看栈顶指令但不弹出
    #[inline]
    pub fn peek(&self) -> Option<&Instruction> {
        self.slots.last()
    }

    /// 释放所有指令并重置为空栈
    ///
    /// 既用于正常的逐 tick 清空，也用于异常复位。
    #[inline]
    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// 当前指令数
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// 是否为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// 创建以来的最大深度
    pub fn high_water_mark(&self) -> usize {
        self.high_water_mark
    }

    /// 指令是否仍在内联缓冲区内（未溢出到堆）
    pub fn is_inline(&self) -> bool {
        !self.slots.spilled()
    }

    /// 按 LIFO 顺序弹出所有指令
    ///
    /// 迭代器被提前丢弃时，剩余指令同样会被清空。
    pub fn drain(&mut self) -> Drain<'_> {
        Drain { stack: self }
    }
}

impl Extend<Instruction> for InstructionStack {
    fn extend<I: IntoIterator<Item = Instruction>>(&mut self, iter: I) {
        for inst in iter {
            self.push(inst);
        }
    }
}

/// [`InstructionStack::drain`] 返回的迭代器
#[derive(Debug)]
pub struct Drain<'a> {
    stack: &'a mut InstructionStack,
}

impl Iterator for Drain<'_> {
    type Item = Instruction;

    #[inline]
    fn next(&mut self) -> Option<Instruction> {
        self.stack.pop()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.stack.len();
        (len, Some(len))
    }
}

impl ExactSizeIterator for Drain<'_> {}

impl Drop for Drain<'_> {
    fn drop(&mut self) {
        self.stack.clear();
    }
}
