// ==========================================
// 整车厂运营台账 - 可持续性分级
// ==========================================
// 阈值为显式配置值，分级时传入；不修改车型
// 低: index < ismin   中: ismin <= index <= ismax   高: index > ismax
// ==========================================

use crate::domain::model::Model;
use crate::domain::types::SustainabilityLevel;
use crate::registry::{ModelCatalog, StorageLedger};
use serde::{Deserialize, Serialize};

/// 可持续性阈值
///
/// 默认 (0, 0)：与未设置阈值时的历史行为一致。
/// 不要求 ismin <= ismax；倒置时按上面的判定顺序分级。
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SustainabilityThresholds {
    pub ismin: f64,
    pub ismax: f64,
}

impl SustainabilityThresholds {
    pub fn new(ismin: f64, ismax: f64) -> Self {
        Self { ismin, ismax }
    }

    pub fn classify(&self, index: f64) -> SustainabilityLevel {
        if index < self.ismin {
            SustainabilityLevel::Low
        } else if index <= self.ismax {
            SustainabilityLevel::Medium
        } else {
            SustainabilityLevel::High
        }
    }

    pub fn classify_model(&self, model: &Model) -> SustainabilityLevel {
        self.classify(model.sustainability_index)
    }
}

/// 指定等级的车型代码（按代码排序）
pub fn models_in_level(
    catalog: &ModelCatalog,
    thresholds: &SustainabilityThresholds,
    level: SustainabilityLevel,
) -> Vec<String> {
    let mut codes: Vec<String> = catalog
        .iter()
        .filter(|m| thresholds.classify_model(m) == level)
        .map(|m| m.code.clone())
        .collect();
    codes.sort();
    codes
}

/// 整车厂可持续性 = 在库车辆指数平均值；无在库车辆时为 0.0
pub fn carmaker_sustainability(catalog: &ModelCatalog, storages: &StorageLedger) -> f64 {
    let (sum, count) = storages
        .stored_models()
        .filter_map(|code| catalog.get_model(code))
        .fold((0.0, 0usize), |(sum, count), m| (sum + m.sustainability_index, count + 1));

    if count == 0 {
        return 0.0;
    }
    sum / count as f64
}
