// ==========================================
// 整车厂运营台账 - 内存台账层
// ==========================================
// 职责: 车型目录、产线注册表、库存台账的唯一持有者
// 红线: 只做单实体簿记，不含分配算法
// ==========================================

pub mod line_registry;
pub mod model_catalog;
pub mod storage_ledger;

// 重导出核心台账
pub use line_registry::LineRegistry;
pub use model_catalog::{ModelCatalog, DEFAULT_ACTIVE_WINDOW_YEARS};
pub use storage_ledger::StorageLedger;
