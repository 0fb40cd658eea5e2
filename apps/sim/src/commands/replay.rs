//! replay 命令
//!
//! 把 run --record 录下的指令清单按 tick 重新执行

use anyhow::{Context, Result, bail};
use bytebot_control::Recording;
use bytebot_driver::{Executor, ManualClock, SystemClock, TickScheduler};
use clap::Args;
use std::path::PathBuf;
use tracing::info;

use super::{install_stop_flag, load_config};
use crate::hardware::{LoggingMotors, LoggingPins};

/// 录制回放命令参数
#[derive(Args, Debug)]
pub struct ReplayCommand {
    /// 录制清单文件
    #[arg(short, long)]
    pub input: PathBuf,

    /// 机器人配置文件（需与录制时一致）
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 使用模拟时钟，不实际休眠
    #[arg(long)]
    pub fast: bool,
}

impl ReplayCommand {
    pub fn execute(&self) -> Result<()> {
        let config = load_config(self.config.as_deref())?;
        let recording = Recording::load_from_file(&self.input)
            .with_context(|| format!("读取录制文件失败: {}", self.input.display()))?;
        let ticks = recording.ticks();
        if ticks == 0 {
            bail!("录制清单不含任何 tick");
        }

        println!("🔄 回放模式");
        println!(
            "📂 录制: {} ({} ticks, {} 条指令)",
            self.input.display(),
            ticks,
            recording.instruction_count()
        );

        let executor = Executor::new(
            config.actuators.clone(),
            LoggingMotors::default(),
            LoggingPins::default(),
        )?;
        let metrics = executor.metrics().clone();
        let mut replay = recording.replay(executor);

        let mut loop_config = config.tick.loop_config();
        loop_config.max_ticks = Some(ticks);
        let stop = install_stop_flag()?;

        let report = if self.fast {
            let mut scheduler =
                TickScheduler::new(ManualClock::new(), loop_config)?.with_metrics(metrics);
            scheduler.run(&mut replay, &stop)
        } else {
            let mut scheduler =
                TickScheduler::new(SystemClock::new(), loop_config)?.with_metrics(metrics);
            scheduler.run(&mut replay, &stop)
        };
        info!(ticks = report.ticks, finished = replay.is_finished(), "Replay finished");

        println!();
        println!("📊 回放 {}/{} ticks", report.ticks, ticks);
        if report.stopped {
            println!("  ⚠️ 被 Ctrl+C 中止");
        }

        let mut executor = replay.into_executor();
        println!("🔌 结束时执行器状态:");
        for (port, mv) in executor.motors().last() {
            println!("  端口 {:>2}: {:>6} mV", port, mv);
        }
        for (pin, level) in executor.digital().last() {
            println!("  引脚 {}: {}", pin, if *level { "高" } else { "低" });
        }
        executor.stop_all();
        Ok(())
    }
}
