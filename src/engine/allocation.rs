// ==========================================
// 整车厂运营台账 - 产能分配引擎
// ==========================================
// 红线: 产线已分配量永不超过总产能
// ==========================================
// 职责: 按动力类型把需求贪心分配到产线
// 输入: 有序请求 (modelCode, quantity) + 车型目录 + 产线注册表
// 输出: PlanOutcome + 产线 allocated 累加（跨 plan 不重置）
// ==========================================

use crate::domain::plan::{LineAllocation, PlanEntry, PlanOutcome, PlanRequest, UnsatisfiedEntry};
use crate::domain::types::EngineType;
use crate::engine::strategy::AllocationPolicy;
use crate::error::{LedgerError, LedgerResult};
use crate::registry::{LineRegistry, ModelCatalog};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument, warn};

// ==========================================
// AllocationEngine - 产能分配引擎
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct AllocationEngine {
    policy: AllocationPolicy,
}

/// 本次 plan 触及产线的原始已分配量（首次触及时记录）
#[derive(Debug, Default)]
struct AllocationJournal {
    previous: BTreeMap<String, u32>,
}

impl AllocationJournal {
    fn record(&mut self, line_name: &str, allocated_before: u32) {
        self.previous
            .entry(line_name.to_string())
            .or_insert(allocated_before);
    }

    fn restore(self, registry: &mut LineRegistry) {
        for (line_name, allocated) in self.previous {
            if let Some(line) = registry.line_mut(&line_name) {
                line.reset_allocated(allocated);
            }
        }
    }
}

impl AllocationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: AllocationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> AllocationPolicy {
        self.policy
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 执行一次分配
    ///
    /// 规则：
    /// 1) 条目按输入顺序处理，车型经目录解析为动力类型
    /// 2) 按策略顺序遍历产线，动力编码匹配者分配 min(剩余需求, 剩余产能)
    /// 3) 某条目遍历完仍有缺口，立即失败，后续条目不再处理
    /// 4) NonAtomic 下失败前的分配全部保留；Atomic 下恢复本次触及的产线
    ///
    /// # 返回
    /// - `Ok(outcome)`: outcome.success 表示是否全部满足
    /// - `Err(UnknownModel)`: 条目车型不在目录中
    #[instrument(skip(self, catalog, registry, request), fields(
        entries = request.entries.len(),
        ordering = self.policy.ordering.as_str(),
        commit = self.policy.commit.as_str(),
    ))]
    pub fn plan(
        &self,
        catalog: &ModelCatalog,
        registry: &mut LineRegistry,
        request: &PlanRequest,
    ) -> LedgerResult<PlanOutcome> {
        let mut outcome = PlanOutcome::started(request.clone());
        let mut journal = AllocationJournal::default();

        // 遍历顺序在一次 plan 内固定
        let order = registry.ordered_line_names(self.policy.ordering);

        for entry in &request.entries {
            let engine_type = match catalog.engine_type_of(&entry.model_code) {
                Some(engine_type) => engine_type,
                None => {
                    let rolled_back = self.abort(registry, journal);
                    warn!(
                        plan_id = %outcome.plan_id,
                        model = %entry.model_code,
                        rolled_back,
                        "车型不存在，分配中止"
                    );
                    return Err(LedgerError::UnknownModel(entry.model_code.clone()));
                }
            };

            let shortfall = Self::fill_entry(
                registry,
                &order,
                entry,
                engine_type,
                &mut journal,
                &mut outcome.allocations,
            );

            if shortfall > 0 {
                outcome.unsatisfied = Some(UnsatisfiedEntry {
                    model_code: entry.model_code.clone(),
                    requested: entry.quantity,
                    shortfall,
                });
                outcome.rolled_back = self.abort(registry, journal);
                warn!(
                    plan_id = %outcome.plan_id,
                    model = %entry.model_code,
                    requested = entry.quantity,
                    shortfall,
                    rolled_back = outcome.rolled_back,
                    "产能不足，分配失败"
                );
                return Ok(outcome);
            }
        }

        outcome.success = true;
        info!(
            plan_id = %outcome.plan_id,
            committed = outcome.committed_quantity(),
            "分配完成"
        );
        Ok(outcome)
    }

    /// 解析请求文本并执行分配
    pub fn plan_text(
        &self,
        catalog: &ModelCatalog,
        registry: &mut LineRegistry,
        request: &str,
    ) -> LedgerResult<PlanOutcome> {
        let request: PlanRequest = request.parse()?;
        self.plan(catalog, registry, &request)
    }

    // ==========================================
    // 辅助方法
    // ==========================================

    /// 为单个条目填充匹配产线，返回缺口（0 表示已满足）
    fn fill_entry(
        registry: &mut LineRegistry,
        order: &[String],
        entry: &PlanEntry,
        engine_type: EngineType,
        journal: &mut AllocationJournal,
        allocations: &mut Vec<LineAllocation>,
    ) -> u32 {
        let mut remaining = entry.quantity;

        for line_name in order {
            // 已满足后继续遍历只会分配 0，直接结束
            if remaining == 0 {
                break;
            }
            let Some(line) = registry.line_mut(line_name) else {
                continue;
            };
            if !line.engine_code.matches(engine_type) {
                continue;
            }

            let allocated_before = line.allocated();
            let granted = line.allocate_up_to(remaining);
            if granted == 0 {
                continue;
            }

            journal.record(line_name, allocated_before);
            remaining -= granted;
            debug!(
                line = %line_name,
                model = %entry.model_code,
                granted,
                line_allocated = line.allocated(),
                still_needed = remaining,
                "产线分配"
            );
            allocations.push(LineAllocation {
                line_name: line_name.clone(),
                model_code: entry.model_code.clone(),
                quantity: granted,
            });
        }

        remaining
    }

    /// 失败收尾；Atomic 策略下恢复，返回是否发生回滚
    fn abort(&self, registry: &mut LineRegistry, journal: AllocationJournal) -> bool {
        if !self.policy.commit.is_atomic() {
            return false;
        }
        journal.restore(registry);
        true
    }
}
