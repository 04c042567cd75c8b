// ==========================================
// 整车厂运营台账 - 产线注册表
// ==========================================
// 职责: 工厂与产线的拓扑、产线分配状态的唯一持有者
// 红线: allocated 只能经分配引擎修改，永不重置
// ==========================================
// 注意: 产线名全局唯一，按名查询时忽略工厂名
// ==========================================

use crate::domain::capacity::LineCapacity;
use crate::domain::production_line::{Factory, LineSpec, ProductionLine};
use crate::engine::strategy::{CommitPolicy, LineOrdering};
use crate::error::{LedgerError, LedgerResult};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

// ==========================================
// LineRegistry - 产线注册表
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct LineRegistry {
    factories: Vec<Factory>,                  // 按创建顺序
    lines: BTreeMap<String, ProductionLine>,  // 按产线名排序
}

impl LineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // ==========================================
    // 工厂
    // ==========================================

    /// 新建工厂；名称重复时报错
    pub fn build_factory(&mut self, name: &str) -> LedgerResult<()> {
        if self.has_factory(name) {
            return Err(LedgerError::duplicate("factory", name));
        }
        self.factories.push(Factory::new(name));
        Ok(())
    }

    pub fn has_factory(&self, name: &str) -> bool {
        self.factories.iter().any(|f| f.name == name)
    }

    /// 工厂名称列表（创建顺序）
    pub fn list_factories(&self) -> Vec<String> {
        self.factories.iter().map(|f| f.name.clone()).collect()
    }

    // ==========================================
    // 产线创建
    // ==========================================

    /// 按文本规格为工厂创建产线
    ///
    /// 规格逐条解析；NonAtomic 下遇到第一条错误规格即返回，之前的产线保留。
    pub fn set_production_lines_from_text(
        &mut self,
        factory_name: &str,
        specs: &[&str],
        commit: CommitPolicy,
    ) -> LedgerResult<usize> {
        self.ensure_factory(factory_name)?;

        match commit {
            CommitPolicy::NonAtomic => {
                let mut created = 0;
                for raw in specs {
                    let spec: LineSpec = raw.parse().inspect_err(|e| {
                        warn!(factory = factory_name, created, error = %e, "产线规格错误，已创建的产线保留");
                    })?;
                    self.insert_line(factory_name, &spec).inspect_err(|e| {
                        warn!(factory = factory_name, created, error = %e, "产线创建失败，已创建的产线保留");
                    })?;
                    created += 1;
                }
                Ok(created)
            }
            CommitPolicy::Atomic => {
                let parsed = specs
                    .iter()
                    .map(|raw| raw.parse::<LineSpec>())
                    .collect::<LedgerResult<Vec<_>>>()?;
                self.set_production_lines(factory_name, &parsed, CommitPolicy::Atomic)
            }
        }
    }

    /// 按已解析规格为工厂创建产线
    pub fn set_production_lines(
        &mut self,
        factory_name: &str,
        specs: &[LineSpec],
        commit: CommitPolicy,
    ) -> LedgerResult<usize> {
        self.ensure_factory(factory_name)?;

        if commit.is_atomic() {
            // 先整体校验名称冲突（含同批次重复），全部通过才提交
            let mut seen = HashSet::new();
            for spec in specs {
                if self.lines.contains_key(&spec.name) || !seen.insert(spec.name.as_str()) {
                    return Err(LedgerError::duplicate("production line", &spec.name));
                }
            }
        }

        let mut created = 0;
        for spec in specs {
            self.insert_line(factory_name, spec).inspect_err(|e| {
                warn!(factory = factory_name, created, error = %e, "产线创建失败，已创建的产线保留");
            })?;
            created += 1;
        }
        Ok(created)
    }

    fn ensure_factory(&self, factory_name: &str) -> LedgerResult<()> {
        if !self.has_factory(factory_name) {
            return Err(LedgerError::UnknownFactory(factory_name.to_string()));
        }
        Ok(())
    }

    fn insert_line(&mut self, factory_name: &str, spec: &LineSpec) -> LedgerResult<()> {
        if self.lines.contains_key(&spec.name) {
            return Err(LedgerError::duplicate("production line", &spec.name));
        }
        debug!(
            factory = factory_name,
            line = %spec.name,
            capacity = spec.capacity,
            engine_code = %spec.engine_code,
            "创建产线"
        );
        self.lines.insert(
            spec.name.clone(),
            ProductionLine::new(&spec.name, factory_name, spec.capacity, spec.engine_code),
        );
        Ok(())
    }

    /// 恢复快照中的产线（保留已分配量）
    pub(crate) fn restore_line(&mut self, line: ProductionLine) -> LedgerResult<()> {
        self.ensure_factory(&line.factory_name)?;
        if self.lines.contains_key(&line.name) {
            return Err(LedgerError::duplicate("production line", &line.name));
        }
        self.lines.insert(line.name.clone(), line);
        Ok(())
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 工厂年产能估算：动力编码 → 总产能之和（非剩余产能）
    pub fn estimate_yearly_production(&self, factory_name: &str) -> LedgerResult<BTreeMap<u8, u64>> {
        self.ensure_factory(factory_name)?;

        let mut production = BTreeMap::new();
        for line in self.lines_of(factory_name) {
            *production.entry(line.engine_code.value()).or_insert(0u64) += line.total_capacity as u64;
        }

        if production.is_empty() {
            return Err(LedgerError::UnknownFactory(factory_name.to_string()));
        }
        Ok(production)
    }

    pub fn line(&self, line_name: &str) -> Option<&ProductionLine> {
        self.lines.get(line_name)
    }

    pub(crate) fn line_mut(&mut self, line_name: &str) -> Option<&mut ProductionLine> {
        self.lines.get_mut(line_name)
    }

    /// 按产线名查询（工厂名仅用于告警）
    fn lookup(&self, factory_name: &str, line_name: &str) -> LedgerResult<&ProductionLine> {
        let line = self
            .lines
            .get(line_name)
            .ok_or_else(|| LedgerError::UnknownLine(line_name.to_string()))?;
        if line.factory_name != factory_name {
            warn!(
                requested_factory = factory_name,
                owner_factory = %line.factory_name,
                line = line_name,
                "产线不属于所给工厂，按产线名返回"
            );
        }
        Ok(line)
    }

    pub fn get_line_capacity(&self, factory_name: &str, line_name: &str) -> LedgerResult<u32> {
        Ok(self.lookup(factory_name, line_name)?.total_capacity)
    }

    pub fn get_line_allocated_capacity(&self, factory_name: &str, line_name: &str) -> LedgerResult<u32> {
        Ok(self.lookup(factory_name, line_name)?.allocated())
    }

    pub fn get_line_remaining_capacity(&self, factory_name: &str, line_name: &str) -> LedgerResult<u32> {
        Ok(self.lookup(factory_name, line_name)?.remaining_capacity())
    }

    /// 全部产线（按名升序）
    pub fn lines(&self) -> impl Iterator<Item = &ProductionLine> {
        self.lines.values()
    }

    pub fn lines_of<'a>(&'a self, factory_name: &'a str) -> impl Iterator<Item = &'a ProductionLine> + 'a {
        self.lines.values().filter(move |l| l.factory_name == factory_name)
    }

    /// 按给定顺序返回产线名（分配引擎遍历顺序）
    pub fn ordered_line_names(&self, ordering: LineOrdering) -> Vec<String> {
        let ascending = self.lines.keys().cloned();
        match ordering {
            LineOrdering::NameAscending => ascending.collect(),
            LineOrdering::NameDescending => ascending.rev().collect(),
        }
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with_factory(name: &str) -> LineRegistry {
        let mut registry = LineRegistry::new();
        registry.build_factory(name).unwrap();
        registry
    }

    #[test]
    fn test_build_factory_duplicate() {
        let mut registry = registry_with_factory("Torino");
        registry.build_factory("Melfi").unwrap();
        let err = registry.build_factory("Torino").unwrap_err();
        assert!(matches!(err, LedgerError::DuplicateName { .. }));
        assert_eq!(registry.list_factories(), vec!["Torino", "Melfi"]);
    }

    #[test]
    fn test_set_lines_unknown_factory() {
        let mut registry = LineRegistry::new();
        let err = registry
            .set_production_lines_from_text("Nowhere", &["L1:10:1"], CommitPolicy::NonAtomic)
            .unwrap_err();
        assert_eq!(err, LedgerError::UnknownFactory("Nowhere".to_string()));
    }

    #[test]
    fn test_non_atomic_partial_commit() {
        let mut registry = registry_with_factory("F");
        let result =
            registry.set_production_lines_from_text("F", &["L1:10:1", "L2:-5:1", "L3:10:1"], CommitPolicy::NonAtomic);
        assert!(matches!(result, Err(LedgerError::MalformedSpec { .. })));

        // L1 已提交，L3 未处理
        assert!(registry.line("L1").is_some());
        assert!(registry.line("L3").is_none());
    }

    #[test]
    fn test_atomic_commit_all_or_nothing() {
        let mut registry = registry_with_factory("F");
        let result =
            registry.set_production_lines_from_text("F", &["L1:10:1", "L2:10:9"], CommitPolicy::Atomic);
        assert!(result.is_err());
        assert_eq!(registry.line_count(), 0);

        let result =
            registry.set_production_lines_from_text("F", &["L1:10:1", "L1:20:1"], CommitPolicy::Atomic);
        assert!(matches!(result, Err(LedgerError::DuplicateName { .. })));
        assert_eq!(registry.line_count(), 0);
    }

    #[test]
    fn test_estimate_yearly_production() {
        let mut registry = registry_with_factory("F");
        registry.build_factory("Empty").unwrap();
        registry
            .set_production_lines_from_text("F", &["A:30:1", "B:40:1", "C:15:3"], CommitPolicy::NonAtomic)
            .unwrap();

        let production = registry.estimate_yearly_production("F").unwrap();
        assert_eq!(production.get(&1), Some(&70));
        assert_eq!(production.get(&3), Some(&15));

        assert!(matches!(
            registry.estimate_yearly_production("Empty"),
            Err(LedgerError::UnknownFactory(_))
        ));
        assert!(matches!(
            registry.estimate_yearly_production("Ghost"),
            Err(LedgerError::UnknownFactory(_))
        ));
    }

    #[test]
    fn test_line_lookup_ignores_factory_name() {
        let mut registry = registry_with_factory("F");
        registry.build_factory("G").unwrap();
        registry
            .set_production_lines_from_text("F", &["L1:10:1"], CommitPolicy::NonAtomic)
            .unwrap();

        assert_eq!(registry.get_line_capacity("G", "L1").unwrap(), 10);
        assert_eq!(registry.get_line_allocated_capacity("F", "L1").unwrap(), 0);
        assert_eq!(
            registry.get_line_capacity("F", "L9").unwrap_err(),
            LedgerError::UnknownLine("L9".to_string())
        );
    }

    #[test]
    fn test_ordered_line_names() {
        let mut registry = registry_with_factory("F");
        registry
            .set_production_lines_from_text("F", &["B:1:1", "A:1:1", "C:1:1"], CommitPolicy::NonAtomic)
            .unwrap();
        assert_eq!(registry.ordered_line_names(LineOrdering::NameAscending), vec!["A", "B", "C"]);
        assert_eq!(registry.ordered_line_names(LineOrdering::NameDescending), vec!["C", "B", "A"]);
    }
}
