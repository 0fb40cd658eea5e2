//! 指令执行器
//!
//! 纯分发：一种指令对应一组硬件调用，无返回值、无错误上报。
//!
//! | 指令 | 动作 |
//! |---|---|
//! | `LeftDrive` | 左侧底盘全部电机设电压，按各自反向标志取反 |
//! | `RightDrive` | 右侧底盘同上 |
//! | `Belt` | 传送带电机设电压 |
//! | `Intake` | 进球电机设电压 |
//! | `Solenoid` | 对应通道的 ADI 引脚设电平 |
//! | `Cycle` | 忽略（计时完全由调度器负责） |

use crate::actuator::{DigitalBus, MotorBus};
use crate::config::{ActuatorMap, AdiPin};
use crate::metrics::TickMetrics;
use crate::DriverError;
use bytebot_protocol::{Instruction, InstructionStack, SolenoidChannel};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tracing::{trace, warn};

/// 指令执行器
///
/// 执行器接口通过构造函数注入，测试时可替换为记录型替身。
pub struct Executor<M, D> {
    map: ActuatorMap,
    motors: M,
    digital: D,
    metrics: Arc<TickMetrics>,
}

impl<M: MotorBus, D: DigitalBus> Executor<M, D> {
    /// 创建执行器（校验接线表）
    pub fn new(map: ActuatorMap, motors: M, digital: D) -> Result<Self, DriverError> {
        map.validate()?;
        Ok(Self {
            map,
            motors,
            digital,
            metrics: Arc::new(TickMetrics::new()),
        })
    }

    /// 共享指标实例（通常与调度器共用）
    pub fn with_metrics(mut self, metrics: Arc<TickMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// 执行单条指令
    pub fn execute(&mut self, inst: Instruction) {
        // 生产者应已钳位；越界值在这里截断，不会到达硬件
        if !inst.is_in_range() {
            warn!("unclamped instruction reached executor: {:?}", inst);
        }
        let inst = inst.clamped();
        trace!("execute {:?}", inst);

        match inst {
            Instruction::Cycle => {},
            Instruction::LeftDrive(mv) => {
                for motor in &self.map.left {
                    self.motors.set_voltage(motor.port, motor.apply(mv));
                }
            },
            Instruction::RightDrive(mv) => {
                for motor in &self.map.right {
                    self.motors.set_voltage(motor.port, motor.apply(mv));
                }
            },
            Instruction::Belt(mv) => {
                let motor = self.map.belt;
                self.motors.set_voltage(motor.port, motor.apply(mv));
            },
            Instruction::Intake(mv) => {
                let motor = self.map.intake;
                self.motors.set_voltage(motor.port, motor.apply(mv));
            },
            Instruction::Solenoid { channel, active } => {
                let (pin, level) = self.resolve_pneumatic(channel, active);
                self.digital.set_digital(pin, level);
            },
        }

        self.metrics.instructions_executed.fetch_add(1, Ordering::Relaxed);
    }

    /// 弹出并执行栈内全部指令，返回执行条数
    ///
    /// 返回时栈必为空。
    pub fn execute_all(&mut self, stack: &mut InstructionStack) -> usize {
        self.execute_all_with(stack, |_| {})
    }

    /// 同 [`execute_all`](Self::execute_all)，每条指令执行后回调一次
    ///
    /// 回调看到的是钳位后实际下发的指令，按执行顺序（出栈顺序）。
    pub fn execute_all_with<F>(&mut self, stack: &mut InstructionStack, mut observe: F) -> usize
    where
        F: FnMut(Instruction),
    {
        self.metrics.record_stack_depth(stack.len());
        let mut count = 0;
        while let Some(inst) = stack.pop() {
            self.execute(inst);
            observe(inst.clamped());
            count += 1;
        }
        count
    }

    /// 所有电机电压归零（手动阶段结束时滑行停止）
    pub fn stop_all(&mut self) {
        for motor in self.map.motors() {
            self.motors.set_voltage(motor.port, 0);
        }
    }

    fn resolve_pneumatic(&self, channel: SolenoidChannel, active: bool) -> (AdiPin, bool) {
        match channel {
            SolenoidChannel::Primary => (self.map.solenoid, active != self.map.solenoid_inverted),
            SolenoidChannel::Park => (self.map.park, active),
            SolenoidChannel::Auxiliary => (self.map.auxiliary, active),
        }
    }

    /// 接线表
    pub fn map(&self) -> &ActuatorMap {
        &self.map
    }

    /// 指标实例
    pub fn metrics(&self) -> &Arc<TickMetrics> {
        &self.metrics
    }

    /// 电机接口
    pub fn motors(&self) -> &M {
        &self.motors
    }

    /// 数字输出接口
    pub fn digital(&self) -> &D {
        &self.digital
    }

    /// 拆出注入的接口
    pub fn into_parts(self) -> (M, D) {
        (self.motors, self.digital)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MotorConfig;

    #[derive(Default)]
    struct RecordingMotors {
        calls: Vec<(u8, i32)>,
    }

    impl MotorBus for RecordingMotors {
        fn set_voltage(&mut self, port: u8, millivolts: i32) {
            self.calls.push((port, millivolts));
        }
    }

    #[derive(Default)]
    struct RecordingDigital {
        calls: Vec<(AdiPin, bool)>,
    }

    impl DigitalBus for RecordingDigital {
        fn set_digital(&mut self, pin: AdiPin, level: bool) {
            self.calls.push((pin, level));
        }
    }

    fn executor() -> Executor<RecordingMotors, RecordingDigital> {
        Executor::new(
            ActuatorMap::default(),
            RecordingMotors::default(),
            RecordingDigital::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_left_drive_respects_reverse() {
        let mut exec = executor();
        exec.execute(Instruction::left_drive(6000));
        assert_eq!(exec.motors().calls, vec![(15, 6000), (18, 6000)]);
    }

    #[test]
    fn test_right_drive_respects_reverse() {
        let mut exec = executor();
        exec.execute(Instruction::right_drive(6000));
        assert_eq!(exec.motors().calls, vec![(9, -6000), (4, -6000)]);
    }

    #[test]
    fn test_belt_and_intake() {
        let mut map = ActuatorMap::default();
        map.belt = MotorConfig::reversed(12);
        let mut exec = Executor::new(map, RecordingMotors::default(), RecordingDigital::default())
            .unwrap();

        exec.execute(Instruction::belt(12_000));
        exec.execute(Instruction::intake(-12_000));
        assert_eq!(exec.motors().calls, vec![(12, -12_000), (10, -12_000)]);
    }

    #[test]
    fn test_cycle_is_ignored() {
        let mut exec = executor();
        exec.execute(Instruction::Cycle);
        assert!(exec.motors().calls.is_empty());
        assert!(exec.digital().calls.is_empty());
        assert_eq!(exec.metrics().snapshot().instructions_executed, 1);
    }

    #[test]
    fn test_solenoid_channels() {
        let mut exec = executor();
        exec.execute(Instruction::solenoid(true));
        exec.execute(Instruction::pneumatic(SolenoidChannel::Park, true));
        exec.execute(Instruction::pneumatic(SolenoidChannel::Auxiliary, false));
        assert_eq!(
            exec.digital().calls,
            vec![(AdiPin('A'), true), (AdiPin('H'), true), (AdiPin('B'), false)]
        );
    }

    #[test]
    fn test_solenoid_inverted() {
        let map = ActuatorMap {
            solenoid_inverted: true,
            ..ActuatorMap::default()
        };
        let mut exec = Executor::new(map, RecordingMotors::default(), RecordingDigital::default())
            .unwrap();
        exec.execute(Instruction::solenoid(true));
        assert_eq!(exec.digital().calls, vec![(AdiPin('A'), false)]);
    }

    #[test]
    fn test_execute_all_drains_in_lifo_order() {
        let mut exec = executor();
        let mut stack = InstructionStack::new();
        stack.push(Instruction::belt(100));
        stack.push(Instruction::belt(200));

        assert_eq!(exec.execute_all(&mut stack), 2);
        assert!(stack.is_empty());
        // 后压入的先执行，先压入的最后执行
        assert_eq!(exec.motors().calls, vec![(12, 200), (12, 100)]);
        assert_eq!(exec.metrics().snapshot().max_stack_depth, 2);
    }

    #[test]
    fn test_execute_all_with_observes_in_execution_order() {
        let mut exec = executor();
        let mut stack = InstructionStack::new();
        stack.push(Instruction::Belt(40_000));
        stack.push(Instruction::solenoid(true));

        let mut seen = Vec::new();
        assert_eq!(exec.execute_all_with(&mut stack, |inst| seen.push(inst)), 2);
        assert_eq!(seen, vec![Instruction::solenoid(true), Instruction::Belt(12_000)]);
        assert!(stack.is_empty());
    }

    #[test]
    fn test_out_of_range_is_clamped() {
        let mut exec = executor();
        exec.execute(Instruction::Belt(40_000));
        assert_eq!(exec.motors().calls, vec![(12, 12_000)]);
    }

    #[test]
    fn test_stop_all() {
        let mut exec = executor();
        exec.execute(Instruction::left_drive(6000));
        exec.motors.calls.clear();

        exec.stop_all();
        // 每个接线端口恰好一次，与反向标志无关
        assert_eq!(
            exec.motors().calls,
            vec![(15, 0), (18, 0), (9, 0), (4, 0), (12, 0), (10, 0)]
        );
    }

    #[test]
    fn test_invalid_map_rejected() {
        let mut map = ActuatorMap::default();
        map.intake = MotorConfig::new(30);
        let result = Executor::new(map, RecordingMotors::default(), RecordingDigital::default());
        assert!(matches!(result, Err(DriverError::InvalidPort { port: 30 })));
    }
}
