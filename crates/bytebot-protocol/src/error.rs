//! 协议层错误类型定义

use thiserror::Error;

/// 协议层错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// 未知的指令种类编码
    #[error("Unknown instruction kind code: {code}")]
    UnknownKind { code: u8 },

    /// 未知的电磁阀通道编码
    #[error("Unknown solenoid channel code: {code}")]
    UnknownChannel { code: u8 },

    /// 文本形式的指令无法解析
    #[error("Invalid instruction text '{input}': {reason}")]
    Parse { input: String, reason: &'static str },
}
