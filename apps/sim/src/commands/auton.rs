//! auton 命令
//!
//! 用日志底盘执行自动阶段脚本

use anyhow::Result;
use bytebot_control::{Routine, run_routine};
use bytebot_driver::{Executor, ManualClock, SystemClock};
use clap::Args;
use std::path::PathBuf;

use super::{install_stop_flag, load_config};
use crate::hardware::{LoggingChassis, LoggingMotors, LoggingPins};

/// 自动脚本命令参数
#[derive(Args, Debug)]
pub struct AutonCommand {
    /// 脚本文件
    #[arg(short, long)]
    pub routine: PathBuf,

    /// 机器人配置文件（缺省使用内置默认值）
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 使用模拟时钟，不实际等待
    #[arg(long)]
    pub fast: bool,
}

impl AutonCommand {
    pub fn execute(&self) -> Result<()> {
        let config = load_config(self.config.as_deref())?;
        let routine = Routine::load_from_file(&self.routine)?;
        println!("🤖 脚本: {} ({} 步)", routine.name, routine.steps.len());

        let mut executor = Executor::new(
            config.actuators.clone(),
            LoggingMotors::default(),
            LoggingPins::default(),
        )?;
        let mut chassis = LoggingChassis::default();
        let stop = install_stop_flag()?;

        let done = if self.fast {
            run_routine(&routine, &mut chassis, &mut executor, &mut ManualClock::new(), &stop)
        } else {
            run_routine(&routine, &mut chassis, &mut executor, &mut SystemClock::new(), &stop)
        };

        let pose = chassis.pose();
        println!();
        println!("📊 完成 {}/{} 步, {} 次运动", done, routine.steps.len(), chassis.motions());
        println!("  最终位姿: ({:.1}, {:.1}) @ {:.1}°", pose.x, pose.y, pose.heading);
        Ok(())
    }
}
