//! 调度器漂移修正的属性测试

use bytebot_driver::{LoopConfig, ManualClock, TickScheduler};
use proptest::prelude::*;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

proptest! {
    /// 任意耗时序列下：anchor == start + K * period，且从不休眠负时长
    #[test]
    fn anchor_is_start_plus_k_periods(
        start_ms in 0u64..10_000,
        period_ms in 1u64..50,
        durations in prop::collection::vec(0u64..120, 1..64),
    ) {
        let period = Duration::from_millis(period_ms);
        let start = Duration::from_millis(start_ms);
        let clock = ManualClock::starting_at(start);
        let handle = clock.clone();

        let mut sched = TickScheduler::new(
            clock,
            LoopConfig { period, max_ticks: Some(durations.len() as u64), overrun_warn_every: 1000 },
        ).unwrap();

        let mut task = |tick: u64| handle.advance(Duration::from_millis(durations[tick as usize]));
        let report = sched.run(&mut task, &AtomicBool::new(false));

        prop_assert_eq!(report.ticks, durations.len() as u64);
        prop_assert_eq!(report.anchor, start + period * durations.len() as u32);
        // 每次休眠都是正时长且不超过一个周期
        prop_assert!(handle.sleeps().iter().all(|s| !s.is_zero() && *s <= period));

        let expected_overruns = {
            let mut now = start;
            let mut anchor = start;
            let mut count = 0u64;
            for d in &durations {
                now += Duration::from_millis(*d);
                let deadline = anchor + period;
                if deadline < now { count += 1; } else { now = deadline; }
                anchor = deadline;
            }
            count
        };
        prop_assert_eq!(report.overruns, expected_overruns);
    }
}
