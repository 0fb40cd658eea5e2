//! 单调时钟抽象
//!
//! 调度器只通过 [`Clock`] 读取时间和休眠，便于用 [`ManualClock`] 做确定性测试
//! 和无需真实等待的回放。

use spin_sleep::SpinSleeper;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::{Duration, Instant};

/// 单调时钟
pub trait Clock {
    /// 自任意固定起点以来的单调时间
    fn now(&self) -> Duration;

    /// 休眠到绝对截止时间
    ///
    /// 截止时间已过时立即返回，绝不休眠负时长。
    fn sleep_until(&mut self, deadline: Duration);
}

/// 系统时钟
///
/// 使用 `spin_sleep` 提供低抖动休眠（相比 `std::thread::sleep` 的 1-2ms 误差）。
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
    sleeper: SpinSleeper,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            sleeper: SpinSleeper::default(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep_until(&mut self, deadline: Duration) {
        if let Some(wait) = deadline.checked_sub(self.now()) {
            self.sleeper.sleep(wait);
        }
    }
}

/// 手动推进的时钟
///
/// 克隆体共享同一时间线：任务侧用 [`advance`](Self::advance) 模拟耗时，
/// 调度器侧的 `sleep_until` 直接把时间跳到截止点并记录休眠时长。
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
    sleeps: Rc<RefCell<Vec<Duration>>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从指定时刻开始
    pub fn starting_at(start: Duration) -> Self {
        let clock = Self::new();
        clock.now.set(start);
        clock
    }

    /// 推进时间（模拟工作耗时）
    pub fn advance(&self, elapsed: Duration) {
        self.now.set(self.now.get() + elapsed);
    }

    /// 每次 `sleep_until` 实际休眠的时长
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.borrow().clone()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }

    fn sleep_until(&mut self, deadline: Duration) {
        let now = self.now.get();
        if deadline > now {
            self.sleeps.borrow_mut().push(deadline - now);
            self.now.set(deadline);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_shared_timeline() {
        let mut clock = ManualClock::starting_at(Duration::from_millis(5));
        let handle = clock.clone();

        handle.advance(Duration::from_millis(3));
        assert_eq!(clock.now(), Duration::from_millis(8));

        clock.sleep_until(Duration::from_millis(10));
        assert_eq!(handle.now(), Duration::from_millis(10));
        assert_eq!(clock.sleeps(), vec![Duration::from_millis(2)]);
    }

    #[test]
    fn test_manual_clock_past_deadline_does_not_sleep() {
        let mut clock = ManualClock::starting_at(Duration::from_millis(20));
        clock.sleep_until(Duration::from_millis(10));
        assert_eq!(clock.now(), Duration::from_millis(20));
        assert!(clock.sleeps().is_empty());
    }

    #[test]
    fn test_system_clock_is_monotonic() {
        let mut clock = SystemClock::new();
        let a = clock.now();
        clock.sleep_until(a + Duration::from_millis(1));
        let b = clock.now();
        assert!(b >= a + Duration::from_millis(1));

        // 过去的截止时间立即返回
        clock.sleep_until(Duration::ZERO);
        assert!(clock.now() >= b);
    }
}
