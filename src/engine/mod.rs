// ==========================================
// 整车厂运营台账 - 引擎层
// ==========================================
// 职责: 产能分配、利用率统计、可持续性分级
// 红线: 引擎不持有台账，只通过参数读写
// ==========================================

pub mod allocation;
pub mod strategy;
pub mod sustainability;
pub mod utilization;

// 重导出核心引擎
pub use allocation::AllocationEngine;
pub use strategy::{AllocationPolicy, CommitPolicy, LineOrdering};
pub use sustainability::SustainabilityThresholds;
pub use utilization::{EngineUtilization, UtilizationReport};
