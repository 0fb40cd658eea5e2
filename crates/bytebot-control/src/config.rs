//! 机器人配置
//!
//! 所有默认值都编译在代码里，TOML 文件层可选，启动时读取一次。
//! 每个段落都带 `#[serde(default)]`，只写需要覆盖的字段即可：
//!
//! ```toml
//! profile = "tower"
//!
//! [tick]
//! period_ms = 10
//!
//! [drive]
//! turn_multiplier = 0.7
//!
//! [[actuators.left]]
//! port = 15
//! ```

use crate::ControlError;
use crate::belt::BeltTuning;
use crate::drive::DriveTuning;
use crate::solenoid::SolenoidTuning;
use crate::tower::TowerTuning;
use bytebot_driver::{ActuatorMap, LoopConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// 解码器组合方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecoderProfile {
    /// 底盘 + 传送带/进球 + 主电磁阀
    #[default]
    Classic,
    /// 底盘 + 塔楼辅助层
    Tower,
}

/// 控制循环节拍
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickSection {
    /// tick 周期（毫秒）
    pub period_ms: u64,
    /// 每多少次超时打印一次警告（0 表示每次都打印）
    pub overrun_warn_every: u64,
}

impl Default for TickSection {
    fn default() -> Self {
        Self {
            period_ms: 10,
            overrun_warn_every: 50,
        }
    }
}

impl TickSection {
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }

    /// 转换为调度器配置（不限制 tick 数）
    pub fn loop_config(&self) -> LoopConfig {
        LoopConfig {
            period: self.period(),
            max_ticks: None,
            overrun_warn_every: self.overrun_warn_every,
        }
    }
}

/// 机器人完整配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotConfig {
    pub profile: DecoderProfile,
    pub tick: TickSection,
    pub actuators: ActuatorMap,
    pub drive: DriveTuning,
    pub belt: BeltTuning,
    pub solenoid: SolenoidTuning,
    pub tower: TowerTuning,
}

impl RobotConfig {
    /// 从 TOML 文本解析并校验
    pub fn from_toml_str(s: &str) -> Result<Self, ControlError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// 从文件加载
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ControlError> {
        let path = path.as_ref();
        debug!("Loading robot config from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        info!(profile = ?config.profile, "Loaded robot config from {}", path.display());
        Ok(config)
    }

    /// 保存到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ControlError> {
        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    pub fn to_toml_string(&self) -> Result<String, ControlError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// 校验全部段落
    pub fn validate(&self) -> Result<(), ControlError> {
        if self.tick.period_ms == 0 {
            return Err(ControlError::invalid("tick.period_ms", "must be > 0"));
        }
        self.actuators.validate()?;
        self.drive.validate()?;
        self.belt.validate()?;
        self.solenoid.validate()?;
        self.tower.validate()?;
        Ok(())
    }
}
