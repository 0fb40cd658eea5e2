//! 控制循环性能指标
//!
//! 所有计数器都使用原子操作，可以在任何线程安全地读取，不会引入锁竞争。

use std::sync::atomic::{AtomicU64, Ordering};

/// 控制循环实时指标
///
/// # 使用示例
///
/// ```rust
/// use bytebot_driver::TickMetrics;
/// use std::sync::Arc;
/// use std::sync::atomic::Ordering;
///
/// let metrics = Arc::new(TickMetrics::default());
/// metrics.ticks_total.fetch_add(1, Ordering::Relaxed);
///
/// let snapshot = metrics.snapshot();
/// assert_eq!(snapshot.ticks_total, 1);
/// ```
#[derive(Debug, Default)]
pub struct TickMetrics {
    /// 已完成的 tick 总数
    pub ticks_total: AtomicU64,

    /// 超时（周期溢出）次数
    ///
    /// 如果这个值持续增长，说明单个 tick 的工作量超过了周期。
    pub overruns: AtomicU64,

    /// 已执行的指令总数
    pub instructions_executed: AtomicU64,

    /// 单个 tick 的最长耗时（微秒）
    pub max_cycle_us: AtomicU64,

    /// 指令栈的最大深度
    pub max_stack_depth: AtomicU64,
}

impl TickMetrics {
    /// 创建新的指标实例（所有计数器初始化为 0）
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一次 tick 耗时
    #[inline]
    pub fn record_cycle(&self, cycle_us: u64) {
        self.max_cycle_us.fetch_max(cycle_us, Ordering::Relaxed);
    }

    /// 记录一次指令栈深度
    #[inline]
    pub fn record_stack_depth(&self, depth: usize) {
        self.max_stack_depth.fetch_max(depth as u64, Ordering::Relaxed);
    }

    /// 获取指标快照
    pub fn snapshot(&self) -> TickMetricsSnapshot {
        TickMetricsSnapshot {
            ticks_total: self.ticks_total.load(Ordering::Relaxed),
            overruns: self.overruns.load(Ordering::Relaxed),
            instructions_executed: self.instructions_executed.load(Ordering::Relaxed),
            max_cycle_us: self.max_cycle_us.load(Ordering::Relaxed),
            max_stack_depth: self.max_stack_depth.load(Ordering::Relaxed),
        }
    }

    /// 重置所有计数器（新的手动控制阶段开始时调用）
    pub fn reset(&self) {
        self.ticks_total.store(0, Ordering::Relaxed);
        self.overruns.store(0, Ordering::Relaxed);
        self.instructions_executed.store(0, Ordering::Relaxed);
        self.max_cycle_us.store(0, Ordering::Relaxed);
        self.max_stack_depth.store(0, Ordering::Relaxed);
    }
}

/// 指标快照（不可变，用于读取）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickMetricsSnapshot {
    pub ticks_total: u64,
    pub overruns: u64,
    pub instructions_executed: u64,
    pub max_cycle_us: u64,
    pub max_stack_depth: u64,
}

impl TickMetricsSnapshot {
    /// 超时率（百分比）
    ///
    /// `ticks_total` 为 0 时返回 0.0。
    pub fn overrun_rate(&self) -> f64 {
        if self.ticks_total == 0 {
            return 0.0;
        }
        (self.overruns as f64 / self.ticks_total as f64) * 100.0
    }

    /// 平均每个 tick 执行的指令数
    pub fn instructions_per_tick(&self) -> f64 {
        if self.ticks_total == 0 {
            return 0.0;
        }
        self.instructions_executed as f64 / self.ticks_total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_metrics_default() {
        let snapshot = TickMetrics::new().snapshot();
        assert_eq!(snapshot, TickMetricsSnapshot::default());
    }

    #[test]
    fn test_metrics_max_tracking() {
        let metrics = TickMetrics::new();
        metrics.record_cycle(120);
        metrics.record_cycle(80);
        metrics.record_stack_depth(4);
        metrics.record_stack_depth(6);
        metrics.record_stack_depth(2);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.max_cycle_us, 120);
        assert_eq!(snapshot.max_stack_depth, 6);
    }

    #[test]
    fn test_metrics_reset() {
        let metrics = TickMetrics::new();
        metrics.ticks_total.fetch_add(100, Ordering::Relaxed);
        metrics.overruns.fetch_add(3, Ordering::Relaxed);
        metrics.reset();
        assert_eq!(metrics.snapshot(), TickMetricsSnapshot::default());
    }

    #[test]
    fn test_metrics_concurrent_reads() {
        let metrics = Arc::new(TickMetrics::new());
        let mut handles = vec![];

        for _ in 0..4 {
            let m = metrics.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..250 {
                    m.instructions_executed.fetch_add(1, Ordering::Relaxed);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(metrics.snapshot().instructions_executed, 1000);
    }

    #[test]
    fn test_snapshot_rates() {
        let snapshot = TickMetricsSnapshot {
            ticks_total: 200,
            overruns: 5,
            instructions_executed: 1000,
            max_cycle_us: 0,
            max_stack_depth: 6,
        };
        assert_eq!(snapshot.overrun_rate(), 2.5);
        assert_eq!(snapshot.instructions_per_tick(), 5.0);

        let empty = TickMetricsSnapshot::default();
        assert_eq!(empty.overrun_rate(), 0.0);
        assert_eq!(empty.instructions_per_tick(), 0.0);
    }
}
