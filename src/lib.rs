// ==========================================
// 整车厂运营台账 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 核心: 产能分配引擎（按动力类型贪心填充产线）
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 台账错误
pub mod error;

// 领域层 - 实体与类型
pub mod domain;

// 注册表层 - 目录 / 产线 / 仓库
pub mod registry;

// 引擎层 - 分配、利用率、可持续性
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 数据仓储层 - 快照与计划日志
pub mod repository;

// 配置层
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 台账门面
pub mod api;

// 命令行
pub mod cli;

// ==========================================
// 重导出核心类型
// ==========================================

pub use error::{LedgerError, LedgerResult};

// 领域类型
pub use domain::types::{EngineType, LineEngineCode, SustainabilityLevel};

// 领域实体
pub use domain::{
    Factory, LineAllocation, LineSpec, Model, PlanEntry, PlanOutcome, PlanRequest,
    ProductionLine, StorageUnit, UnsatisfiedEntry,
};

// 注册表
pub use registry::{LineRegistry, ModelCatalog, StorageLedger};

// 引擎
pub use engine::{
    AllocationEngine, AllocationPolicy, CommitPolicy, LineOrdering, SustainabilityThresholds,
    UtilizationReport,
};

// API
pub use api::{ApiError, ApiResult, Carmaker};

// 配置
pub use config::LedgerConfig;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "整车厂运营台账";
