//! 场景文件
//!
//! ```toml
//! name = "spin then score"
//!
//! [[frames]]
//! left_y = 127
//! repeat = 100
//!
//! [[frames]]
//! left_x = 127
//! buttons = ["r2"]
//! repeat = 50
//!
//! [[color]]
//! tick = 120
//! hue = 220.0
//! proximity = 200
//! ```

use anyhow::{Context, Result};
use bytebot_control::input::ScriptStep;
use serde::Deserialize;
use std::path::Path;

/// 颜色传感器读数变化点，从 `tick` 起生效直到下一个变化点
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ColorEvent {
    pub tick: u64,
    pub hue: f64,
    pub proximity: i32,
}

/// 手动阶段场景
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub name: String,
    pub frames: Vec<ScriptStep>,
    pub color: Vec<ColorEvent>,
}

impl Scenario {
    pub fn parse(s: &str) -> Result<Self> {
        let mut scenario: Self = toml::from_str(s).context("场景文件格式错误")?;
        scenario.color.sort_by_key(|e| e.tick);
        Ok(scenario)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("读取场景文件失败: {}", path.display()))?;
        Self::parse(&content)
    }

    /// 帧覆盖的 tick 总数
    pub fn total_ticks(&self) -> u64 {
        self.frames.iter().map(|f| u64::from(f.repeat)).sum()
    }
}
