// ==========================================
// 整车厂运营台账 - 车型领域模型
// ==========================================
// 车型以 code 唯一标识，创建后不可变
// 可持续性指数在创建时按参考年份计算一次
// ==========================================

use crate::domain::types::EngineType;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// Model - 车型
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub code: String,              // 车型代码（唯一）
    pub name: String,              // 车型名称
    pub introduction_year: i32,    // 上市年份
    pub displacement_cc: f32,      // 排量 (cc)
    pub engine_type: EngineType,   // 动力类型
    pub sustainability_index: f64, // 可持续性指数（创建时计算）
}

impl Model {
    /// 创建车型并计算可持续性指数
    ///
    /// # 参数
    /// - `current_year`: 参考年份（计算车龄用）
    pub fn new(
        code: &str,
        name: &str,
        introduction_year: i32,
        displacement_cc: f32,
        engine_type: EngineType,
        current_year: i32,
    ) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            introduction_year,
            displacement_cc,
            engine_type,
            sustainability_index: sustainability_index(engine_type, introduction_year, current_year),
        }
    }

    /// 是否为在售车型（上市不超过 window_years 年，边界含）
    pub fn is_active(&self, current_year: i32, window_years: i32) -> bool {
        self.introduction_year >= current_year - window_years
    }
}

/// 可持续性指数 = 动力编码 * 100 / 车龄
///
/// 当年上市（车龄 0）按 1 年计；未来年份上市的车龄为负，指数随之为负。
pub fn sustainability_index(engine_type: EngineType, introduction_year: i32, current_year: i32) -> f64 {
    let age = match current_year - introduction_year {
        0 => 1,
        age => age,
    };
    (engine_type.code() as f64 * 100.0) / age as f64
}

// 文本格式: code,name,year,displacement,engineType
impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{:?},{}",
            self.code,
            self.name,
            self.introduction_year,
            self.displacement_cc,
            self.engine_type.code()
        )
    }
}
