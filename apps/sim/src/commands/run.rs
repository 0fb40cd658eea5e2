//! run 命令
//!
//! 按场景回放一个手动控制阶段

use anyhow::{Context, Result, bail};
use bytebot_control::{Opcontrol, ScriptedController};
use bytebot_driver::{ManualClock, SystemClock, TickMetricsSnapshot, TickReport, TickScheduler};
use clap::Args;
use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;
use tracing::info;

use super::{install_stop_flag, load_config};
use crate::hardware::{LoggingMotors, LoggingPins, SimController, TimelineColorSensor};
use crate::scenario::Scenario;

/// 场景回放命令参数
#[derive(Args, Debug)]
pub struct RunCommand {
    /// 机器人配置文件（缺省使用内置默认值）
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 场景文件
    #[arg(short, long)]
    pub scenario: PathBuf,

    /// 运行的 tick 数（缺省为场景长度）
    #[arg(short, long)]
    pub ticks: Option<u64>,

    /// 使用模拟时钟，不实际休眠
    #[arg(long)]
    pub fast: bool,

    /// 把执行过的指令录成清单写入文件（可用 replay 命令回放）
    #[arg(long, value_name = "PATH")]
    pub record: Option<PathBuf>,
}

impl RunCommand {
    pub fn execute(&self) -> Result<()> {
        let config = load_config(self.config.as_deref())?;
        let scenario = Scenario::load(&self.scenario)?;
        let ticks = self.ticks.unwrap_or_else(|| scenario.total_ticks());
        if ticks == 0 {
            bail!("场景为空，且未指定 --ticks");
        }

        println!("🎮 场景: {} ({} 帧, {} ticks)", scenario.name, scenario.frames.len(), ticks);

        let samples = Rc::new(Cell::new(0));
        let input = SimController::new(ScriptedController::new(scenario.frames), samples.clone());
        let sensor = TimelineColorSensor::new(scenario.color, samples);
        let mut op = Opcontrol::from_config(
            &config,
            input,
            sensor,
            LoggingMotors::default(),
            LoggingPins::default(),
        )?;

        let mut loop_config = config.tick.loop_config();
        loop_config.max_ticks = Some(ticks);
        let metrics = op.executor().metrics().clone();
        let stop = install_stop_flag()?;
        if self.record.is_some() {
            op.start_recording();
        }

        let report = if self.fast {
            let mut scheduler =
                TickScheduler::new(ManualClock::new(), loop_config)?.with_metrics(metrics.clone());
            op.run_period(&mut scheduler, &stop)
        } else {
            let mut scheduler =
                TickScheduler::new(SystemClock::new(), loop_config)?.with_metrics(metrics.clone());
            op.run_period(&mut scheduler, &stop)
        };

        info!(ticks = report.ticks, "Scenario finished");
        print_report(&report, &metrics.snapshot());

        if let (Some(path), Some(recording)) = (&self.record, op.take_recording()) {
            recording
                .save_to_file(path)
                .with_context(|| format!("写入录制文件失败: {}", path.display()))?;
            println!();
            println!(
                "💾 录制已保存: {} ({} ticks, {} 条指令)",
                path.display(),
                recording.ticks(),
                recording.instruction_count()
            );
        }

        let rumbles = op.input().rumbles();
        let (_, _, motors, pins) = op.into_parts();
        println!();
        println!("🔌 执行器写入: {} 次电机, 震动 {} 次", motors.writes(), rumbles);
        for (port, mv) in motors.last() {
            println!("  端口 {:>2}: {:>6} mV", port, mv);
        }
        for (pin, level) in pins.last() {
            println!("  引脚 {}: {}", pin, if *level { "高" } else { "低" });
        }
        Ok(())
    }
}

fn print_report(report: &TickReport, snapshot: &TickMetricsSnapshot) {
    println!();
    println!("📊 运行结果:");
    println!("  tick 数: {}", report.ticks);
    println!("  超时: {} ({:.2}%)", snapshot.overruns, snapshot.overrun_rate());
    println!("  最长 tick: {} µs", snapshot.max_cycle_us);
    println!("  最大栈深: {}", snapshot.max_stack_depth);
    println!(
        "  执行指令: {} (平均 {:.2} 条/tick)",
        snapshot.instructions_executed,
        snapshot.instructions_per_tick()
    );
    println!("  最终锚点: {:?}", report.anchor.saturating_sub(report.start));
    if report.stopped {
        println!("  ⚠️ 被 Ctrl+C 中止");
    }
}
