// ==========================================
// 整车厂运营台账 - 配置层
// ==========================================
// 职责: 台账配置加载，支持文件与环境变量覆写
// ==========================================

pub mod ledger_config;

pub use ledger_config::{
    config_keys, get_default_db_path, ConfigError, ConfigResult, LedgerConfig,
};
