//! 指令录制与回放
//!
//! 把手动阶段每个 tick 实际执行的指令录成一份可回放的脚本：
//!
//! - 只保留相对执行器已知状态发生变化的指令（同一执行器重复下发相同的值不录）
//! - 每个 tick 以一条 CYCLE 结束，相邻的 CYCLE 合并成 `cycle N`
//!
//! 回放时每个 tick 执行指令直到遇到 CYCLE，再消耗一个 tick 的等待。
//! 执行器在每个 tick 结束时的电压和电平与录制时一致。
//!
//! 清单是纯文本，一行一条，`#` 开头为注释：
//!
//! ```text
//! # 236 ticks, 41 instructions
//! left_drive 12000
//! right_drive 12000
//! belt 0
//! intake 0
//! cycle 12
//! solenoid primary 1
//! cycle
//! ```

use crate::ControlError;
use bytebot_driver::{DigitalBus, Executor, MotorBus, TickTask};
use bytebot_protocol::{Instruction, SolenoidChannel};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

/// 录制清单中的一项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordEntry {
    /// 执行一条指令
    Exec(Instruction),
    /// 连续 N 条 CYCLE（N 个 tick 的等待）
    Cycle(u32),
}

/// 指令作用的执行器；同一目标的后一条指令覆盖前一条
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Target {
    LeftDrive,
    RightDrive,
    Belt,
    Intake,
    Solenoid(SolenoidChannel),
}

impl Target {
    fn of(inst: &Instruction) -> Option<Self> {
        match *inst {
            Instruction::Cycle => None,
            Instruction::LeftDrive(_) => Some(Self::LeftDrive),
            Instruction::RightDrive(_) => Some(Self::RightDrive),
            Instruction::Belt(_) => Some(Self::Belt),
            Instruction::Intake(_) => Some(Self::Intake),
            Instruction::Solenoid { channel, .. } => Some(Self::Solenoid(channel)),
        }
    }
}

/// 一份录制结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Recording {
    entries: Vec<RecordEntry>,
}

impl Recording {
    pub fn entries(&self) -> &[RecordEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 覆盖的 tick 数（所有 CYCLE 之和）
    pub fn ticks(&self) -> u64 {
        self.entries
            .iter()
            .map(|e| match e {
                RecordEntry::Cycle(n) => u64::from(*n),
                RecordEntry::Exec(_) => 0,
            })
            .sum()
    }

    /// 非 CYCLE 指令条数
    pub fn instruction_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e, RecordEntry::Exec(_)))
            .count()
    }

    /// 展开成指令流，`cycle N` 展开为 N 条 [`Instruction::Cycle`]
    pub fn instructions(&self) -> impl Iterator<Item = Instruction> + '_ {
        self.entries.iter().flat_map(|e| match *e {
            RecordEntry::Exec(inst) => std::iter::repeat_n(inst, 1),
            RecordEntry::Cycle(n) => std::iter::repeat_n(Instruction::Cycle, n as usize),
        })
    }

    fn push(&mut self, entry: RecordEntry) {
        match (self.entries.last_mut(), entry) {
            (Some(RecordEntry::Cycle(last)), RecordEntry::Cycle(n)) => *last += n,
            _ => self.entries.push(entry),
        }
    }

    /// 解析文本清单
    pub fn parse(text: &str) -> Result<Self, ControlError> {
        let mut recording = Self::default();
        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let fail = |reason: String| ControlError::Listing {
                line: index + 1,
                reason,
            };

            let mut tokens = line.split_whitespace();
            if tokens.next() == Some("cycle") {
                let count = match (tokens.next(), tokens.next()) {
                    (None, _) => 1,
                    (Some(n), None) => n
                        .parse::<u32>()
                        .map_err(|_| fail(format!("invalid cycle count '{n}'")))?,
                    (Some(_), Some(_)) => return Err(fail("trailing tokens".to_owned())),
                };
                if count == 0 {
                    return Err(fail("cycle count must be > 0".to_owned()));
                }
                recording.push(RecordEntry::Cycle(count));
            } else {
                let inst = Instruction::from_str(line).map_err(|e| fail(e.to_string()))?;
                recording.push(RecordEntry::Exec(inst));
            }
        }
        Ok(recording)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ControlError> {
        let path = path.as_ref();
        let recording = Self::parse(&std::fs::read_to_string(path)?)?;
        debug!(
            ticks = recording.ticks(),
            instructions = recording.instruction_count(),
            "Loaded recording from {}",
            path.display()
        );
        Ok(recording)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ControlError> {
        std::fs::write(path, self.to_string())?;
        Ok(())
    }

    /// 以回放任务的形式驱动执行器
    pub fn replay<M: MotorBus, D: DigitalBus>(self, executor: Executor<M, D>) -> Replay<M, D> {
        Replay {
            recording: self,
            cursor: 0,
            waited: 0,
            executor,
        }
    }
}

impl fmt::Display for Recording {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "# {} ticks, {} instructions",
            self.ticks(),
            self.instruction_count()
        )?;
        for entry in &self.entries {
            match entry {
                RecordEntry::Exec(inst) => writeln!(f, "{inst}")?,
                RecordEntry::Cycle(1) => writeln!(f, "cycle")?,
                RecordEntry::Cycle(n) => writeln!(f, "cycle {n}")?,
            }
        }
        Ok(())
    }
}

/// 逐 tick 录制执行过的指令
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    known: HashMap<Target, Instruction>,
    recording: Recording,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一条已执行的指令（按执行顺序调用）
    pub fn observe(&mut self, inst: Instruction) {
        let Some(target) = Target::of(&inst) else {
            return;
        };
        if self.known.insert(target, inst) != Some(inst) {
            self.recording.push(RecordEntry::Exec(inst));
        }
    }

    /// 结束当前 tick
    pub fn end_tick(&mut self) {
        self.recording.push(RecordEntry::Cycle(1));
    }

    /// 记录一整个 tick
    pub fn record_tick(&mut self, executed: &[Instruction]) {
        for inst in executed {
            self.observe(*inst);
        }
        self.end_tick();
    }

    /// 当前已录制的内容
    pub fn recording(&self) -> &Recording {
        &self.recording
    }

    /// 取出录制结果并清空录制器
    pub fn finish(&mut self) -> Recording {
        self.known.clear();
        let recording = std::mem::take(&mut self.recording);
        info!(
            ticks = recording.ticks(),
            instructions = recording.instruction_count(),
            "Recording finished"
        );
        recording
    }
}

/// 回放任务
pub struct Replay<M, D> {
    recording: Recording,
    cursor: usize,
    waited: u32,
    executor: Executor<M, D>,
}

impl<M: MotorBus, D: DigitalBus> Replay<M, D> {
    /// 清单是否已全部回放
    pub fn is_finished(&self) -> bool {
        self.cursor >= self.recording.entries.len()
    }

    pub fn executor(&self) -> &Executor<M, D> {
        &self.executor
    }

    pub fn executor_mut(&mut self) -> &mut Executor<M, D> {
        &mut self.executor
    }

    pub fn into_executor(self) -> Executor<M, D> {
        self.executor
    }
}

impl<M: MotorBus, D: DigitalBus> TickTask for Replay<M, D> {
    fn tick(&mut self, tick: u64) {
        while let Some(entry) = self.recording.entries.get(self.cursor) {
            match *entry {
                RecordEntry::Exec(inst) => {
                    self.executor.execute(inst);
                    self.cursor += 1;
                },
                RecordEntry::Cycle(n) => {
                    self.waited += 1;
                    if self.waited >= n {
                        self.waited = 0;
                        self.cursor += 1;
                    }
                    return;
                },
            }
        }
        debug!(tick, "Replay exhausted");
    }
}
