// ==========================================
// 整车厂运营台账 - 库存台账
// ==========================================
// 职责: 仓库创建、入库/出库计数、库存汇总
// 说明: 分配引擎不依赖本模块；车型存在性由调用方（门面）校验
// ==========================================

use crate::domain::storage::StorageUnit;
use crate::error::{LedgerError, LedgerResult};
use std::collections::BTreeMap;

// ==========================================
// StorageLedger - 库存台账
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct StorageLedger {
    units: Vec<StorageUnit>, // 按创建顺序
}

impl StorageLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// 新建仓库
    ///
    /// # 错误
    /// - 名称重复: DuplicateName
    /// - 容量 <= 0: InvalidCapacity
    pub fn build_storage(&mut self, name: &str, capacity: i64) -> LedgerResult<()> {
        if self.units.iter().any(|u| u.name == name) {
            return Err(LedgerError::duplicate("storage", name));
        }
        if capacity <= 0 || capacity > u32::MAX as i64 {
            return Err(LedgerError::InvalidCapacity {
                entity: format!("storage {}", name),
                capacity,
            });
        }
        self.units.push(StorageUnit::new(name, capacity as u32));
        Ok(())
    }

    /// 仓库名称列表（创建顺序）
    pub fn list_storages(&self) -> Vec<String> {
        self.units.iter().map(|u| u.name.clone()).collect()
    }

    pub fn unit(&self, name: &str) -> LedgerResult<&StorageUnit> {
        self.units
            .iter()
            .find(|u| u.name == name)
            .ok_or_else(|| LedgerError::UnknownStorage(name.to_string()))
    }

    fn unit_mut(&mut self, name: &str) -> LedgerResult<&mut StorageUnit> {
        self.units
            .iter_mut()
            .find(|u| u.name == name)
            .ok_or_else(|| LedgerError::UnknownStorage(name.to_string()))
    }

    pub fn store_car(&mut self, storage_name: &str, model_code: &str) -> LedgerResult<()> {
        self.unit_mut(storage_name)?.store(model_code)
    }

    pub fn remove_car(&mut self, storage_name: &str, model_code: &str) -> LedgerResult<()> {
        self.unit_mut(storage_name)?.remove(model_code)
    }

    /// 库存汇总：车型 → 数量（空仓库返回空表）
    pub fn storage_summary(&self, storage_name: &str) -> LedgerResult<BTreeMap<String, u32>> {
        Ok(self.unit(storage_name)?.summary())
    }

    /// 所有仓库中存放的车型（多重集合）
    pub fn stored_models(&self) -> impl Iterator<Item = &str> {
        self.units.iter().flat_map(|u| u.stored().iter().map(String::as_str))
    }

    pub fn stored_count(&self) -> usize {
        self.units.iter().map(|u| u.stored().len()).sum()
    }

    pub fn units(&self) -> &[StorageUnit] {
        &self.units
    }

    /// 恢复快照中的仓库
    pub(crate) fn restore_unit(&mut self, unit: StorageUnit) -> LedgerResult<()> {
        if self.units.iter().any(|u| u.name == unit.name) {
            return Err(LedgerError::duplicate("storage", &unit.name));
        }
        self.units.push(unit);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_storage_rules() {
        let mut ledger = StorageLedger::new();
        ledger.build_storage("S1", 3).unwrap();
        assert!(matches!(
            ledger.build_storage("S1", 5),
            Err(LedgerError::DuplicateName { .. })
        ));
        assert!(matches!(
            ledger.build_storage("S2", 0),
            Err(LedgerError::InvalidCapacity { .. })
        ));
        assert_eq!(ledger.list_storages(), vec!["S1"]);
    }

    #[test]
    fn test_store_and_summary() {
        let mut ledger = StorageLedger::new();
        ledger.build_storage("S1", 3).unwrap();
        ledger.build_storage("S2", 1).unwrap();

        ledger.store_car("S1", "M1").unwrap();
        ledger.store_car("S1", "M1").unwrap();
        ledger.store_car("S2", "M2").unwrap();

        assert_eq!(ledger.stored_count(), 3);
        assert_eq!(ledger.storage_summary("S1").unwrap().get("M1"), Some(&2));
        assert!(ledger.storage_summary("S9").is_err());
        assert!(matches!(
            ledger.store_car("S9", "M1"),
            Err(LedgerError::UnknownStorage(_))
        ));

        ledger.remove_car("S1", "M1").unwrap();
        let stored: Vec<&str> = ledger.stored_models().collect();
        assert_eq!(stored, vec!["M1", "M2"]);
    }

    #[test]
    fn test_empty_storage_summary() {
        let mut ledger = StorageLedger::new();
        ledger.build_storage("S1", 3).unwrap();
        assert!(ledger.storage_summary("S1").unwrap().is_empty());
    }
}
