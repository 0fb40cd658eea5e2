//! 手动控制阶段
//!
//! 每个 tick 依次执行：刷新手柄快照 → 解码压栈 → 清栈执行。
//! 指令栈归本任务独占，tick 开始和结束时都为空。
//! 阶段由平台外部结束（停止标志），结束后所有电机归零滑行。
//! 打开录制后，每个 tick 实际执行的指令同时交给 [`Recorder`]。

use crate::ControlError;
use crate::config::RobotConfig;
use crate::decoder::InputDecoder;
use crate::input::ControllerInput;
use crate::recorder::{Recorder, Recording};
use crate::tower::ColorSensor;
use bytebot_driver::{
    Clock, DigitalBus, Executor, MotorBus, TickReport, TickScheduler, TickTask,
};
use bytebot_protocol::InstructionStack;
use std::sync::atomic::AtomicBool;
use std::time::Duration;
use tracing::{debug, info, trace};

/// 手动控制 tick 任务
pub struct Opcontrol<I, S, M, D> {
    decoder: InputDecoder,
    stack: InstructionStack,
    executor: Executor<M, D>,
    input: I,
    sensor: S,
    recorder: Option<Recorder>,
}

impl<I, S, M, D> Opcontrol<I, S, M, D>
where
    I: ControllerInput,
    S: ColorSensor,
    M: MotorBus,
    D: DigitalBus,
{
    pub fn new(decoder: InputDecoder, executor: Executor<M, D>, input: I, sensor: S) -> Self {
        Self {
            decoder,
            stack: InstructionStack::new(),
            executor,
            input,
            sensor,
            recorder: None,
        }
    }

    /// 按配置组装解码器和执行器
    pub fn from_config(
        config: &RobotConfig,
        input: I,
        sensor: S,
        motors: M,
        digital: D,
    ) -> Result<Self, ControlError> {
        config.validate()?;
        let decoder = InputDecoder::new(config)?;
        let executor = Executor::new(config.actuators.clone(), motors, digital)?;
        Ok(Self::new(decoder, executor, input, sensor))
    }

    /// 新阶段开始：清空模式状态和指令栈
    pub fn start_period(&mut self) {
        self.decoder.reset();
        self.stack.clear();
    }

    /// 运行一个完整的手动阶段，直到停止标志置位或达到 tick 上限
    pub fn run_period<C: Clock>(
        &mut self,
        scheduler: &mut TickScheduler<C>,
        stop: &AtomicBool,
    ) -> TickReport {
        self.start_period();
        info!(
            profile = ?self.decoder.profile(),
            period_ms = scheduler.config().period.as_millis() as u64,
            "Driver control period started"
        );

        let report = scheduler.run(self, stop);
        self.executor.stop_all();

        info!(
            ticks = report.ticks,
            overruns = report.overruns,
            stopped = report.stopped,
            "Driver control period ended"
        );
        report
    }

    /// 开始录制（已在录制时保留已有内容）
    pub fn start_recording(&mut self) {
        if self.recorder.is_none() {
            info!("Instruction recording started");
            self.recorder = Some(Recorder::new());
        }
    }

    /// 停止录制并取出结果；未录制时返回 `None`
    pub fn take_recording(&mut self) -> Option<Recording> {
        self.recorder.take().map(|mut recorder| recorder.finish())
    }

    pub fn recorder(&self) -> Option<&Recorder> {
        self.recorder.as_ref()
    }

    pub fn decoder(&self) -> &InputDecoder {
        &self.decoder
    }

    pub fn executor(&self) -> &Executor<M, D> {
        &self.executor
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }

    /// 指令栈（两次 tick 之间必为空）
    pub fn stack(&self) -> &InstructionStack {
        &self.stack
    }

    pub fn into_parts(self) -> (I, S, M, D) {
        let (motors, digital) = self.executor.into_parts();
        (self.input, self.sensor, motors, digital)
    }
}

impl<I, S, M, D> TickTask for Opcontrol<I, S, M, D>
where
    I: ControllerInput,
    S: ColorSensor,
    M: MotorBus,
    D: DigitalBus,
{
    fn tick(&mut self, tick: u64) {
        self.input.sample();
        let pushed = self
            .decoder
            .decode(tick, &mut self.input, &self.sensor, &mut self.stack);
        let executed = match self.recorder.as_mut() {
            Some(recorder) => {
                let executed = self
                    .executor
                    .execute_all_with(&mut self.stack, |inst| recorder.observe(inst));
                recorder.end_tick();
                executed
            },
            None => self.executor.execute_all(&mut self.stack),
        };
        trace!(tick, pushed, executed, "Tick");
    }

    fn on_overrun(&mut self, tick: u64, late_by: Duration) {
        debug!(tick, late_by_us = late_by.as_micros() as u64, "Tick overran its deadline");
    }
}
