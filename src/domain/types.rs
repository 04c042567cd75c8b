// ==========================================
// 整车厂运营台账 - 领域类型定义
// ==========================================
// 动力类型编码: 0=柴油 1=汽油 2=GPL 3=纯电
// 产线另接受编码 4（无对应车型动力类型）
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 动力类型 (Engine Type)
// ==========================================
// 车型只能取 0..=3，编码同时作为可持续性指数的乘数
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EngineType {
    Diesel,   // 柴油
    Gasoline, // 汽油
    Gpl,      // 液化石油气
    Electric, // 纯电
}

impl EngineType {
    /// 数值编码
    pub fn code(&self) -> u8 {
        match self {
            EngineType::Diesel => 0,
            EngineType::Gasoline => 1,
            EngineType::Gpl => 2,
            EngineType::Electric => 3,
        }
    }

    /// 从数值编码解析；4 及以上没有对应的车型动力类型
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(EngineType::Diesel),
            1 => Some(EngineType::Gasoline),
            2 => Some(EngineType::Gpl),
            3 => Some(EngineType::Electric),
            _ => None,
        }
    }
}

impl fmt::Display for EngineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineType::Diesel => write!(f, "DIESEL"),
            EngineType::Gasoline => write!(f, "GASOLINE"),
            EngineType::Gpl => write!(f, "GPL"),
            EngineType::Electric => write!(f, "ELECTRIC"),
        }
    }
}

impl std::str::FromStr for EngineType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(code) = trimmed.parse::<i64>() {
            return EngineType::from_code(code).ok_or_else(|| format!("未知动力类型编码: {}", code));
        }
        match trimmed.to_uppercase().as_str() {
            "DIESEL" => Ok(EngineType::Diesel),
            "GASOLINE" => Ok(EngineType::Gasoline),
            "GPL" => Ok(EngineType::Gpl),
            "ELECTRIC" => Ok(EngineType::Electric),
            other => Err(format!("未知动力类型: {}", other)),
        }
    }
}

// ==========================================
// 产线动力编码 (Line Engine Code)
// ==========================================
// 范围校验为 [0, 4]；编码 4 合法但不匹配任何车型
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineEngineCode(u8);

impl LineEngineCode {
    pub const MAX: u8 = 4;

    pub fn new(code: i64) -> Option<Self> {
        if (0..=Self::MAX as i64).contains(&code) {
            Some(LineEngineCode(code as u8))
        } else {
            None
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn matches(&self, engine_type: EngineType) -> bool {
        self.0 == engine_type.code()
    }
}

impl From<EngineType> for LineEngineCode {
    fn from(engine_type: EngineType) -> Self {
        LineEngineCode(engine_type.code())
    }
}

impl fmt::Display for LineEngineCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ==========================================
// 可持续性等级 (Sustainability Level)
// ==========================================
// 0=低 1=中 2=高
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SustainabilityLevel {
    Low,
    Medium,
    High,
}

impl SustainabilityLevel {
    pub fn from_level(level: i64) -> Option<Self> {
        match level {
            0 => Some(SustainabilityLevel::Low),
            1 => Some(SustainabilityLevel::Medium),
            2 => Some(SustainabilityLevel::High),
            _ => None,
        }
    }

    pub fn level(&self) -> u8 {
        match self {
            SustainabilityLevel::Low => 0,
            SustainabilityLevel::Medium => 1,
            SustainabilityLevel::High => 2,
        }
    }
}

impl fmt::Display for SustainabilityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SustainabilityLevel::Low => write!(f, "LOW"),
            SustainabilityLevel::Medium => write!(f, "MEDIUM"),
            SustainabilityLevel::High => write!(f, "HIGH"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_type_codes() {
        for code in 0..=3 {
            let engine = EngineType::from_code(code).unwrap();
            assert_eq!(engine.code() as i64, code);
        }
        assert_eq!(EngineType::from_code(4), None);
        assert_eq!("gpl".parse::<EngineType>(), Ok(EngineType::Gpl));
        assert_eq!("3".parse::<EngineType>(), Ok(EngineType::Electric));
        assert!("7".parse::<EngineType>().is_err());
    }

    #[test]
    fn test_line_engine_code_range() {
        assert!(LineEngineCode::new(-1).is_none());
        assert!(LineEngineCode::new(5).is_none());

        // 编码 4 合法，但不对应任何车型动力类型
        let code = LineEngineCode::new(4).unwrap();
        for engine in [
            EngineType::Diesel,
            EngineType::Gasoline,
            EngineType::Gpl,
            EngineType::Electric,
        ] {
            assert!(!code.matches(engine));
        }

        assert!(LineEngineCode::new(1).unwrap().matches(EngineType::Gasoline));
    }

    #[test]
    fn test_sustainability_level_roundtrip() {
        assert_eq!(SustainabilityLevel::from_level(2), Some(SustainabilityLevel::High));
        assert_eq!(SustainabilityLevel::from_level(3), None);
        assert_eq!(SustainabilityLevel::Medium.level(), 1);
    }
}
