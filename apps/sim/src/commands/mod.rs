//! 命令定义和实现

pub mod auton;
pub mod config;
pub mod replay;
pub mod run;

pub use auton::AutonCommand;
pub use config::ConfigCommand;
pub use replay::ReplayCommand;
pub use run::RunCommand;

use anyhow::{Context, Result};
use bytebot_control::RobotConfig;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

/// 加载配置；未指定文件时使用编译内置的默认值
pub fn load_config(path: Option<&Path>) -> Result<RobotConfig> {
    match path {
        Some(path) => RobotConfig::load_from_file(path)
            .with_context(|| format!("加载配置失败: {}", path.display())),
        None => {
            info!("No config file given, using built-in defaults");
            Ok(RobotConfig::default())
        },
    }
}

/// Ctrl+C 置位的停止标志（相当于平台结束当前阶段）
pub fn install_stop_flag() -> Result<Arc<AtomicBool>> {
    let stop = Arc::new(AtomicBool::new(false));
    let flag = stop.clone();
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::Release);
    })
    .context("注册 Ctrl+C 处理器失败")?;
    Ok(stop)
}
