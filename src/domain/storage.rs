// ==========================================
// 整车厂运营台账 - 仓库领域模型
// ==========================================
// 不变式: 0 <= occupied <= capacity, occupied == stored.len()
// stored 保存车型代码（对目录的只读引用，不拥有车型）
// ==========================================

use crate::error::{LedgerError, LedgerResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// StorageUnit - 仓库
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageUnit {
    pub name: String,
    pub capacity: u32,
    stored: Vec<String>,
}

impl StorageUnit {
    pub fn new(name: &str, capacity: u32) -> Self {
        Self {
            name: name.to_string(),
            capacity,
            stored: Vec::new(),
        }
    }

    /// 从快照恢复；在库数量超过容量时报容量错误
    pub fn restore(name: &str, capacity: u32, stored: Vec<String>) -> LedgerResult<Self> {
        if stored.len() > capacity as usize {
            return Err(LedgerError::Capacity {
                storage: name.to_string(),
                message: format!("快照在库 {} 超过容量 {}", stored.len(), capacity),
            });
        }
        Ok(Self {
            name: name.to_string(),
            capacity,
            stored,
        })
    }

    pub fn occupied(&self) -> u32 {
        self.stored.len() as u32
    }

    pub fn is_full(&self) -> bool {
        self.occupied() >= self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.stored.is_empty()
    }

    /// 当前存放的车型代码（按入库顺序，可重复）
    pub fn stored(&self) -> &[String] {
        &self.stored
    }

    /// 入库一辆车；仓库已满时报容量错误且不改变占用
    pub fn store(&mut self, model_code: &str) -> LedgerResult<()> {
        if self.is_full() {
            return Err(LedgerError::Capacity {
                storage: self.name.clone(),
                message: format!("仓库已满 ({}/{})", self.occupied(), self.capacity),
            });
        }
        self.stored.push(model_code.to_string());
        Ok(())
    }

    /// 出库一辆车（移除该车型最早入库的一辆）
    pub fn remove(&mut self, model_code: &str) -> LedgerResult<()> {
        if self.is_empty() {
            return Err(LedgerError::Capacity {
                storage: self.name.clone(),
                message: "仓库为空".to_string(),
            });
        }
        let position = self
            .stored
            .iter()
            .position(|code| code == model_code)
            .ok_or_else(|| LedgerError::ModelNotStored {
                storage: self.name.clone(),
                model: model_code.to_string(),
            })?;
        self.stored.remove(position);
        Ok(())
    }

    /// 车型 → 数量
    pub fn summary(&self) -> BTreeMap<String, u32> {
        let mut summary = BTreeMap::new();
        for code in &self.stored {
            *summary.entry(code.clone()).or_insert(0) += 1;
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_until_full() {
        let mut unit = StorageUnit::new("S1", 2);
        unit.store("M1").unwrap();
        unit.store("M1").unwrap();

        let err = unit.store("M2").unwrap_err();
        assert!(err.is_capacity());
        assert_eq!(unit.occupied(), 2);
    }

    #[test]
    fn test_remove_rules() {
        let mut unit = StorageUnit::new("S1", 3);
        assert!(unit.remove("M1").unwrap_err().is_capacity());

        unit.store("M1").unwrap();
        unit.store("M2").unwrap();
        unit.store("M1").unwrap();

        let err = unit.remove("M9").unwrap_err();
        assert!(matches!(err, LedgerError::ModelNotStored { .. }));
        assert_eq!(unit.occupied(), 3);

        unit.remove("M1").unwrap();
        assert_eq!(unit.stored(), &["M2".to_string(), "M1".to_string()]);
    }

    #[test]
    fn test_summary_counts() {
        let mut unit = StorageUnit::new("S1", 5);
        for code in ["A", "B", "A", "A"] {
            unit.store(code).unwrap();
        }
        let summary = unit.summary();
        assert_eq!(summary.get("A"), Some(&3));
        assert_eq!(summary.get("B"), Some(&1));
    }
}
