//! config 命令
//!
//! 打印生效的配置（默认值叠加配置文件），或写到文件里作为起点。

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use super::load_config;

/// 配置命令参数
#[derive(Args, Debug)]
pub struct ConfigCommand {
    /// 要叠加的配置文件
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 写入文件而不是打印
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl ConfigCommand {
    pub fn execute(&self) -> Result<()> {
        let config = load_config(self.config.as_deref())?;

        match &self.output {
            Some(path) => {
                config
                    .save_to_file(path)
                    .with_context(|| format!("写入配置失败: {}", path.display()))?;
                println!("✅ 配置已写入 {}", path.display());
            },
            None => print!("{}", config.to_toml_string()?),
        }
        Ok(())
    }
}
