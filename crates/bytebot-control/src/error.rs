//! 控制层错误类型定义

use bytebot_driver::DriverError;
use thiserror::Error;

/// 控制层错误类型
#[derive(Error, Debug)]
pub enum ControlError {
    /// 文件读写失败（配置、脚本、录制）
    #[error("File I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// 配置解析失败
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// 配置序列化失败
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// 配置项越界
    #[error("Invalid config value `{field}`: {reason}")]
    Config { field: &'static str, reason: String },

    /// 录制清单格式错误
    #[error("Invalid recording at line {line}: {reason}")]
    Listing { line: usize, reason: String },

    /// 驱动层错误
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),
}

impl ControlError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Config {
            field,
            reason: reason.into(),
        }
    }
}
