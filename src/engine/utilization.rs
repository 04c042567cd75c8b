// ==========================================
// 整车厂运营台账 - 产线利用率统计
// ==========================================
// 只读统计，基于注册表中累计的 allocated
// 无产线时比例统一返回 0.0
// ==========================================

use crate::domain::capacity::LineCapacity;
use crate::registry::LineRegistry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 单一动力编码的产能汇总
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EngineUtilization {
    pub lines: usize,
    pub total_capacity: u64,
    pub allocated: u64,
}

/// 利用率报告
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UtilizationReport {
    pub total_lines: usize,
    pub fully_allocated_lines: usize,
    pub unused_lines: usize,
    pub fully_allocated_ratio: f64,
    pub unused_ratio: f64,
    pub by_engine_code: BTreeMap<u8, EngineUtilization>,
}

fn ratio(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    count as f64 / total as f64
}

/// 已满产线占比（remaining == 0）
pub fn fully_allocated_ratio(registry: &LineRegistry) -> f64 {
    let full = registry.lines().filter(|l| l.is_fully_allocated()).count();
    ratio(full, registry.line_count())
}

/// 未使用产线占比（allocated == 0）
pub fn unused_lines_ratio(registry: &LineRegistry) -> f64 {
    let unused = registry.lines().filter(|l| l.is_unused()).count();
    ratio(unused, registry.line_count())
}

pub fn utilization_report(registry: &LineRegistry) -> UtilizationReport {
    let mut fully_allocated_lines = 0;
    let mut unused_lines = 0;
    let mut by_engine_code: BTreeMap<u8, EngineUtilization> = BTreeMap::new();

    for line in registry.lines() {
        if line.is_fully_allocated() {
            fully_allocated_lines += 1;
        }
        if line.is_unused() {
            unused_lines += 1;
        }
        let bucket = by_engine_code.entry(line.engine_code.value()).or_default();
        bucket.lines += 1;
        bucket.total_capacity += line.total_capacity as u64;
        bucket.allocated += line.allocated() as u64;
    }

    let total_lines = registry.line_count();
    UtilizationReport {
        total_lines,
        fully_allocated_lines,
        unused_lines,
        fully_allocated_ratio: ratio(fully_allocated_lines, total_lines),
        unused_ratio: ratio(unused_lines, total_lines),
        by_engine_code,
    }
}
