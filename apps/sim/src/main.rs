//! # bytebot-sim
//!
//! 在桌面上运行手动控制阶段：按场景文件回放手柄输入，
//! 经过完整的解码 → 指令栈 → 执行器路径，执行器输出写入日志。
//!
//! ```bash
//! # 打印默认配置
//! bytebot-sim config > robot.toml
//!
//! # 回放场景（实时节拍）
//! bytebot-sim run --config robot.toml --scenario drive.toml
//!
//! # 不等待，直接跑完
//! bytebot-sim run --scenario drive.toml --ticks 500 --fast
//!
//! # 录制执行过的指令，再回放
//! bytebot-sim run --scenario drive.toml --fast --record session.txt
//! bytebot-sim replay --input session.txt --fast
//!
//! # 自动阶段脚本
//! bytebot-sim auton --routine left.toml --fast
//! ```
//!
//! 日志级别通过 `RUST_LOG` 控制，例如 `RUST_LOG=bytebot_sim=debug`。

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod hardware;
mod scenario;

use commands::{AutonCommand, ConfigCommand, ReplayCommand, RunCommand};

/// bytebot 控制循环仿真器
#[derive(Parser, Debug)]
#[command(name = "bytebot-sim")]
#[command(about = "Replay controller scenarios through the bytebot control loop", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 回放手动控制场景
    Run {
        #[command(flatten)]
        args: RunCommand,
    },

    /// 打印生效的配置
    Config {
        #[command(flatten)]
        args: ConfigCommand,
    },

    /// 执行自动阶段脚本
    Auton {
        #[command(flatten)]
        args: AutonCommand,
    },

    /// 回放录制的指令清单
    Replay {
        #[command(flatten)]
        args: ReplayCommand,
    },
}

fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("bytebot_sim=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { args } => args.execute(),
        Commands::Config { args } => args.execute(),
        Commands::Auton { args } => args.execute(),
        Commands::Replay { args } => args.execute(),
    }
}
