// ==========================================
// 整车厂运营台账 - 车型目录
// ==========================================
// 职责: 以 code 为键存放不可变车型记录
// 红线: 重复 code 返回 false，不修改已有记录
// ==========================================

use crate::domain::model::Model;
use crate::domain::types::EngineType;
use std::collections::HashMap;

/// 默认在售窗口（年）
pub const DEFAULT_ACTIVE_WINDOW_YEARS: i32 = 10;

// ==========================================
// ModelCatalog - 车型目录
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ModelCatalog {
    models: HashMap<String, Model>,
}

impl ModelCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 新增车型
    ///
    /// # 返回
    /// - `true`: 已插入
    /// - `false`: code 重复，目录不变
    pub fn add_model(
        &mut self,
        code: &str,
        name: &str,
        year: i32,
        displacement_cc: f32,
        engine_type: EngineType,
        current_year: i32,
    ) -> bool {
        if self.models.contains_key(code) {
            return false;
        }
        let model = Model::new(code, name, year, displacement_cc, engine_type, current_year);
        self.models.insert(code.to_string(), model);
        true
    }

    /// 插入已构造的车型（快照恢复用），重复时返回 false
    pub fn insert(&mut self, model: Model) -> bool {
        if self.models.contains_key(&model.code) {
            return false;
        }
        self.models.insert(model.code.clone(), model);
        true
    }

    pub fn get_model(&self, code: &str) -> Option<&Model> {
        self.models.get(code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.models.contains_key(code)
    }

    /// 解析车型动力类型
    pub fn engine_type_of(&self, code: &str) -> Option<EngineType> {
        self.models.get(code).map(|m| m.engine_type)
    }

    /// 在售车型代码（上市年份 >= current_year - window_years），按代码排序
    pub fn list_active_models(&self, current_year: i32, window_years: i32) -> Vec<String> {
        let mut codes: Vec<String> = self
            .models
            .values()
            .filter(|m| m.is_active(current_year, window_years))
            .map(|m| m.code.clone())
            .collect();
        codes.sort();
        codes
    }

    pub fn count_models(&self) -> usize {
        self.models.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Model> {
        self.models.values()
    }
}
