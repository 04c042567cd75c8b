// ==========================================
// 整车厂运营台账 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、产能约束接口
// 红线: 不含存储逻辑,不含引擎逻辑
// ==========================================

pub mod capacity;
pub mod model;
pub mod plan;
pub mod production_line;
pub mod storage;
pub mod types;

// 重导出核心类型
pub use capacity::LineCapacity;
pub use model::Model;
pub use plan::{LineAllocation, PlanEntry, PlanOutcome, PlanRequest, UnsatisfiedEntry};
pub use production_line::{Factory, LineSpec, ProductionLine};
pub use storage::StorageUnit;
pub use types::{EngineType, LineEngineCode, SustainabilityLevel};
