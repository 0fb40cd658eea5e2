//! 摇杆响应曲线
//!
//! 对归一化幅值 `u = |raw| / 127` 应用
//!
//! ```text
//! f(u) = G·u + C·(1 − b^(−u)),   C = (1 − G) / (1 − b^(−1))
//! ```
//!
//! - 原点附近斜率 `G + C·ln b` 远大于 1，小幅推杆即可越过电机死区
//! - 满杆时斜率收敛到 `G + C·ln b / b ≈ G`，保留精细操控
//! - `f(0) = 0`，`f(1) = 1`，满杆对应满电压
//!
//! 符号单独提取（-1 / 0 / +1），曲线对幅值计算，因此结果是奇函数。

use crate::ControlError;
use crate::input::AXIS_MAX;
use bytebot_protocol::VOLTAGE_MAX;
use std::cmp::Ordering;

/// 默认指数底数
pub const DEFAULT_BASE: f64 = 400.0;
/// 默认渐近斜率
pub const DEFAULT_GAIN: f64 = 0.65;

/// 响应曲线参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResponseCurve {
    base: f64,
    gain: f64,
    offset: f64,
}

impl Default for ResponseCurve {
    fn default() -> Self {
        Self {
            base: DEFAULT_BASE,
            gain: DEFAULT_GAIN,
            offset: Self::offset_for(DEFAULT_BASE, DEFAULT_GAIN),
        }
    }
}

impl ResponseCurve {
    /// 创建曲线
    ///
    /// # 参数
    ///
    /// - `base`: 指数底数，必须 > 1
    /// - `gain`: 满杆附近的目标斜率，必须在 (0, 1) 内
    pub fn new(base: f64, gain: f64) -> Result<Self, ControlError> {
        if !(base.is_finite() && base > 1.0) {
            return Err(ControlError::invalid("drive.base", format!("{base} must be > 1")));
        }
        if !(gain > 0.0 && gain < 1.0) {
            return Err(ControlError::invalid(
                "drive.gain",
                format!("{gain} must be in (0, 1)"),
            ));
        }
        Ok(Self {
            base,
            gain,
            offset: Self::offset_for(base, gain),
        })
    }

    fn offset_for(base: f64, gain: f64) -> f64 {
        (1.0 - gain) / (1.0 - base.recip())
    }

    pub fn base(&self) -> f64 {
        self.base
    }

    pub fn gain(&self) -> f64 {
        self.gain
    }

    /// 由 `f(1) = 1` 推出的偏移量 C
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// 对幅值 `u ∈ [0, 1]` 求值
    #[inline]
    pub fn shape(&self, u: f64) -> f64 {
        self.gain * u + self.offset * (1.0 - self.base.powf(-u))
    }

    /// 幅值处的解析斜率 `f'(u)`
    pub fn gradient(&self, u: f64) -> f64 {
        self.gain + self.offset * self.base.ln() * self.base.powf(-u)
    }

    /// 对原始摇杆读数求值，返回 [-1, 1] 内的带符号结果
    pub fn apply(&self, raw: i32) -> f64 {
        let magnitude = raw.unsigned_abs().min(AXIS_MAX as u32);
        let u = f64::from(magnitude) / f64::from(AXIS_MAX);
        signum(raw) * self.shape(u)
    }

    /// 对原始摇杆读数求值并换算为毫伏
    pub fn millivolts(&self, raw: i32) -> i32 {
        to_millivolts(self.apply(raw))
    }
}

/// 归一化输出换算为毫伏（就近取整，饱和到电压范围）
///
/// 取整是对称的，所以奇函数性质在毫伏层面同样成立。
#[inline]
pub fn to_millivolts(normalized: f64) -> i32 {
    let mv = (normalized * f64::from(VOLTAGE_MAX)).round() as i32;
    mv.clamp(-VOLTAGE_MAX, VOLTAGE_MAX)
}

/// 显式的三值符号函数
#[inline]
pub fn signum(raw: i32) -> f64 {
    match raw.cmp(&0) {
        Ordering::Less => -1.0,
        Ordering::Equal => 0.0,
        Ordering::Greater => 1.0,
    }
}
