//! # 静态接线表
//!
//! 每个逻辑执行器对应的端口号与反向标志。进程启动时加载一次，运行时只读。

use crate::DriverError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// 智能端口范围
const SMART_PORTS: std::ops::RangeInclusive<u8> = 1..=21;

/// 单个电机的配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotorConfig {
    /// 智能端口号（1..=21）
    pub port: u8,
    /// 是否反向（反向电机的电压取反）
    #[serde(default)]
    pub reverse: bool,
}

impl MotorConfig {
    /// 正向电机
    pub const fn new(port: u8) -> Self {
        Self {
            port,
            reverse: false,
        }
    }

    /// 反向电机
    pub const fn reversed(port: u8) -> Self {
        Self {
            port,
            reverse: true,
        }
    }

    /// 将逻辑电压换算为该电机实际下发的电压
    #[inline]
    pub fn apply(&self, millivolts: i32) -> i32 {
        if self.reverse { -millivolts } else { millivolts }
    }
}

/// ADI 三线端口引脚（'A'..='H'）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdiPin(pub char);

impl AdiPin {
    /// 创建并校验引脚（大小写不敏感）
    pub fn new(pin: char) -> Result<Self, DriverError> {
        let upper = pin.to_ascii_uppercase();
        if ('A'..='H').contains(&upper) {
            Ok(Self(upper))
        } else {
            Err(DriverError::InvalidPin { pin })
        }
    }

    /// 引脚序号（'A' = 1）
    pub fn index(&self) -> u8 {
        (self.0.to_ascii_uppercase() as u8).wrapping_sub(b'A') + 1
    }
}

impl fmt::Display for AdiPin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 执行器接线表
///
/// 默认值即比赛机器人的实际接线。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActuatorMap {
    /// 左侧底盘电机组
    pub left: Vec<MotorConfig>,
    /// 右侧底盘电机组
    pub right: Vec<MotorConfig>,
    /// 传送带电机（塔楼配置下为顶部导流电机）
    pub belt: MotorConfig,
    /// 进球电机（塔楼配置下为滚筒电机）
    pub intake: MotorConfig,
    /// 主电磁阀引脚
    pub solenoid: AdiPin,
    /// 主电磁阀电平取反（部分气路接线为常开）
    pub solenoid_inverted: bool,
    /// 停车气缸引脚
    pub park: AdiPin,
    /// 辅助气缸引脚
    pub auxiliary: AdiPin,
}

impl Default for ActuatorMap {
    fn default() -> Self {
        Self {
            left: vec![MotorConfig::new(15), MotorConfig::new(18)],
            right: vec![MotorConfig::reversed(9), MotorConfig::reversed(4)],
            belt: MotorConfig::new(12),
            intake: MotorConfig::new(10),
            solenoid: AdiPin('A'),
            solenoid_inverted: false,
            park: AdiPin('H'),
            auxiliary: AdiPin('B'),
        }
    }
}

impl ActuatorMap {
    /// 所有电机（底盘、传送带、进球）
    pub fn motors(&self) -> impl Iterator<Item = &MotorConfig> {
        self.left
            .iter()
            .chain(self.right.iter())
            .chain([&self.belt, &self.intake])
    }

    /// 校验接线表
    ///
    /// - 端口号必须在 1..=21
    /// - 同一端口不能被多个电机占用
    /// - 引脚必须在 'A'..='H' 且互不相同
    pub fn validate(&self) -> Result<(), DriverError> {
        if self.left.is_empty() {
            return Err(DriverError::EmptyDriveSide { side: "left" });
        }
        if self.right.is_empty() {
            return Err(DriverError::EmptyDriveSide { side: "right" });
        }

        let mut ports = HashSet::new();
        for motor in self.motors() {
            if !SMART_PORTS.contains(&motor.port) {
                return Err(DriverError::InvalidPort { port: motor.port });
            }
            if !ports.insert(motor.port) {
                return Err(DriverError::DuplicatePort { port: motor.port });
            }
        }

        let mut pins = HashSet::new();
        for pin in [self.solenoid, self.park, self.auxiliary] {
            let pin = AdiPin::new(pin.0)?;
            if !pins.insert(pin) {
                return Err(DriverError::DuplicatePin { pin: pin.0 });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_map_is_valid() {
        let map = ActuatorMap::default();
        assert!(map.validate().is_ok());
        assert_eq!(map.motors().count(), 6);
    }

    #[test]
    fn test_motor_apply_reverse() {
        assert_eq!(MotorConfig::new(1).apply(500), 500);
        assert_eq!(MotorConfig::reversed(1).apply(500), -500);
        assert_eq!(MotorConfig::reversed(1).apply(-12_000), 12_000);
    }

    #[test]
    fn test_invalid_port() {
        let mut map = ActuatorMap::default();
        map.belt = MotorConfig::new(0);
        assert_eq!(map.validate(), Err(DriverError::InvalidPort { port: 0 }));

        map.belt = MotorConfig::new(22);
        assert_eq!(map.validate(), Err(DriverError::InvalidPort { port: 22 }));
    }

    #[test]
    fn test_duplicate_port() {
        let mut map = ActuatorMap::default();
        map.intake = MotorConfig::reversed(15);
        assert_eq!(map.validate(), Err(DriverError::DuplicatePort { port: 15 }));
    }

    #[test]
    fn test_pins() {
        assert_eq!(AdiPin::new('c'), Ok(AdiPin('C')));
        assert_eq!(AdiPin('A').index(), 1);
        assert_eq!(AdiPin('H').index(), 8);
        assert!(AdiPin::new('I').is_err());

        let mut map = ActuatorMap::default();
        map.park = AdiPin('A');
        assert_eq!(map.validate(), Err(DriverError::DuplicatePin { pin: 'A' }));

        map.park = AdiPin('Q');
        assert_eq!(map.validate(), Err(DriverError::InvalidPin { pin: 'Q' }));
    }

    #[test]
    fn test_empty_drive_side() {
        let map = ActuatorMap {
            right: Vec::new(),
            ..ActuatorMap::default()
        };
        assert_eq!(
            map.validate(),
            Err(DriverError::EmptyDriveSide { side: "right" })
        );
    }
}
