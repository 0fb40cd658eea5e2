//! Tick 调度器 - 固定周期控制循环
//!
//! 每次迭代执行一次 解码 → 压栈 → 清栈 → 执行，然后休眠到 `anchor + period`，
//! 再把 `anchor` **精确推进一个周期**（而不是按实际耗时推进）。
//!
//! 这是绝对截止时间调度：每个 tick 的额外开销不会累积成调度漂移。
//! K 个 tick 之后 `anchor == start + K * period`，与实际耗时无关。
//!
//! # 超时
//!
//! 如果某次迭代耗时超过周期，下一个截止时间已经过去：不休眠、立即进入下一次迭代，
//! 并记录一次超时（计数器 + 限频日志），不会崩溃。
//!
//! # 终止
//!
//! 循环没有终止状态，只由外部平台结束手动阶段（`stop` 标志）或 `max_ticks` 结束。

use crate::DriverError;
use crate::clock::Clock;
use crate::metrics::TickMetrics;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

/// 单个 tick 的工作
pub trait TickTask {
    /// 执行一次 tick
    ///
    /// 不得阻塞：唯一的挂起点是调度器的休眠。
    fn tick(&mut self, tick: u64);

    /// tick 超时回调（默认什么都不做）
    fn on_overrun(&mut self, _tick: u64, _late_by: Duration) {}
}

impl<F: FnMut(u64)> TickTask for F {
    fn tick(&mut self, tick: u64) {
        self(tick)
    }
}

/// 控制循环配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopConfig {
    /// tick 周期
    pub period: Duration,

    /// 最大 tick 数（None 表示无限循环，直到外部停止）
    pub max_ticks: Option<u64>,

    /// 每发生多少次超时打印一次警告（0 表示每次都打印）
    pub overrun_warn_every: u64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_millis(10),
            max_ticks: None,
            overrun_warn_every: 50,
        }
    }
}

impl LoopConfig {
    /// 指定周期的配置
    pub fn with_period(period: Duration) -> Self {
        Self {
            period,
            ..Self::default()
        }
    }

    /// 校验配置
    pub fn validate(&self) -> Result<(), DriverError> {
        if self.period.is_zero() {
            return Err(DriverError::InvalidPeriod);
        }
        if self.period < Duration::from_millis(1) {
            warn!(
                "Very short tick period: {:?}. Actuator commands may not settle between ticks.",
                self.period
            );
        }
        Ok(())
    }
}

/// 一次运行的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// 完成的 tick 数
    pub ticks: u64,
    /// 超时次数
    pub overruns: u64,
    /// 起始时刻
    pub start: Duration,
    /// 最终的截止时间锚点（`start + ticks * period`）
    pub anchor: Duration,
    /// 是否由外部停止标志结束
    pub stopped: bool,
}

/// 固定周期调度器
pub struct TickScheduler<C> {
    clock: C,
    config: LoopConfig,
    metrics: Arc<TickMetrics>,
}

impl<C: Clock> TickScheduler<C> {
    /// 创建调度器（校验配置）
    pub fn new(clock: C, config: LoopConfig) -> Result<Self, DriverError> {
        config.validate()?;
        Ok(Self {
            clock,
            config,
            metrics: Arc::new(TickMetrics::new()),
        })
    }

    /// 共享指标实例
    pub fn with_metrics(mut self, metrics: Arc<TickMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    pub fn metrics(&self) -> &Arc<TickMetrics> {
        &self.metrics
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// 运行控制循环
    ///
    /// 阻塞直到 `stop` 被置位或达到 `max_ticks`。
    pub fn run<T: TickTask + ?Sized>(&mut self, task: &mut T, stop: &AtomicBool) -> TickReport {
        #[cfg(feature = "realtime")]
        {
            use thread_priority::*;

            match set_current_thread_priority(ThreadPriority::Max) {
                Ok(_) => info!("control loop thread priority set to MAX (realtime)"),
                Err(e) => warn!(
                    "Failed to set control loop thread priority: {:?}. \
                    On Linux, you may need to run with CAP_SYS_NICE or use rtkit.",
                    e
                ),
            }
        }

        let period = self.config.period;
        let start = self.clock.now();
        let mut anchor = start;
        let mut ticks: u64 = 0;
        let mut overruns: u64 = 0;
        let mut stopped = false;

        info!("tick loop started (period {:?})", period);

        loop {
            // Acquire: 看到 true 时必须同时看到平台侧的收尾写入
            if stop.load(Ordering::Acquire) {
                stopped = true;
                break;
            }
            if let Some(max) = self.config.max_ticks
                && ticks >= max
            {
                break;
            }

            let cycle_start = self.clock.now();
            task.tick(ticks);
            let now = self.clock.now();

            let cycle = now.saturating_sub(cycle_start);
            self.metrics.record_cycle(cycle.as_micros() as u64);

            let deadline = anchor + period;
            match deadline.checked_sub(now) {
                Some(wait) if !wait.is_zero() => self.clock.sleep_until(deadline),
                Some(_) => {},
                None => {
                    let late_by = now - deadline;
                    overruns += 1;
                    self.metrics.overruns.fetch_add(1, Ordering::Relaxed);
                    if self.config.overrun_warn_every == 0
                        || (overruns - 1) % self.config.overrun_warn_every == 0
                    {
                        warn!(
                            "tick {} overran its period by {:?} ({} overruns so far)",
                            ticks, late_by, overruns
                        );
                    }
                    task.on_overrun(ticks, late_by);
                },
            }

            anchor = deadline;
            ticks += 1;
            self.metrics.ticks_total.fetch_add(1, Ordering::Relaxed);
        }

        debug!("tick loop exited after {} ticks ({} overruns)", ticks, overruns);

        TickReport {
            ticks,
            overruns,
            start,
            anchor,
            stopped,
        }
    }
}
