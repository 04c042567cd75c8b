// ==========================================
// 整车厂运营台账 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 台账快照与计划日志的 SQLite 持久化
// 约束: 所有查询使用参数化
// ==========================================

pub mod error;
pub mod ledger_repo;
pub mod plan_log_repo;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use ledger_repo::{LedgerRepository, LedgerSnapshot};
pub use plan_log_repo::PlanLogRepository;
