// ==========================================
// 整车厂运营台账 - 台账配置
// ==========================================
// 优先级: 环境变量 > 配置文件 > 默认值
// ==========================================

use crate::engine::strategy::{AllocationPolicy, CommitPolicy};
use crate::engine::sustainability::SustainabilityThresholds;
use crate::registry::DEFAULT_ACTIVE_WINDOW_YEARS;
use chrono::{Datelike, Local};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败: {0}")]
    ReadError(String),

    #[error("配置文件解析失败: {0}")]
    ParseError(String),

    #[error("配置项无效 ({key}): {message}")]
    InvalidValue { key: String, message: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// ==========================================
// 配置键（环境变量名）
// ==========================================
pub mod config_keys {
    pub const DB_PATH: &str = "CARMAKER_DB_PATH";
    pub const REFERENCE_YEAR: &str = "CARMAKER_REFERENCE_YEAR";
    pub const ACTIVE_WINDOW_YEARS: &str = "CARMAKER_ACTIVE_WINDOW_YEARS";
    pub const LINE_ORDERING: &str = "CARMAKER_LINE_ORDERING";
    pub const PLAN_COMMIT: &str = "CARMAKER_PLAN_COMMIT";
    pub const LINE_COMMIT: &str = "CARMAKER_LINE_COMMIT";
}

// ==========================================
// LedgerConfig - 台账配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// 参考年份；None 表示取系统当前年份
    pub reference_year: Option<i32>,
    /// 在售窗口（年）
    pub active_window_years: i32,
    /// 产能分配策略（产线顺序 + 提交策略）
    pub allocation: AllocationPolicy,
    /// setProductionLines 的提交策略
    pub line_commit: CommitPolicy,
    /// 初始可持续性阈值（快照中已有阈值时以快照为准）
    pub thresholds: Option<SustainabilityThresholds>,
    /// 数据库路径；None 表示使用默认路径
    pub db_path: Option<String>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            reference_year: None,
            active_window_years: DEFAULT_ACTIVE_WINDOW_YEARS,
            allocation: AllocationPolicy::default(),
            line_commit: CommitPolicy::default(),
            thresholds: None,
            db_path: None,
        }
    }
}

impl LedgerConfig {
    /// 从 JSON 文件读取（缺失字段取默认值）
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))?;
        let config: LedgerConfig =
            serde_json::from_str(&raw).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        debug!(path = %path.display(), "已读取配置文件");
        Ok(config)
    }

    /// 读取环境变量覆写
    pub fn apply_env_overrides(&mut self) -> ConfigResult<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// 按给定的取值函数覆写（测试时可注入）
    pub fn apply_overrides<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(path) = get(config_keys::DB_PATH) {
            self.db_path = Some(path);
        }
        if let Some(year) = get(config_keys::REFERENCE_YEAR) {
            self.reference_year = Some(parse_value(config_keys::REFERENCE_YEAR, &year)?);
        }
        if let Some(window) = get(config_keys::ACTIVE_WINDOW_YEARS) {
            self.active_window_years = parse_value(config_keys::ACTIVE_WINDOW_YEARS, &window)?;
        }
        if let Some(ordering) = get(config_keys::LINE_ORDERING) {
            self.allocation.ordering = parse_value(config_keys::LINE_ORDERING, &ordering)?;
        }
        if let Some(commit) = get(config_keys::PLAN_COMMIT) {
            self.allocation.commit = parse_value(config_keys::PLAN_COMMIT, &commit)?;
        }
        if let Some(commit) = get(config_keys::LINE_COMMIT) {
            self.line_commit = parse_value(config_keys::LINE_COMMIT, &commit)?;
        }
        Ok(())
    }

    /// 计算用的当前年份
    pub fn current_year(&self) -> i32 {
        self.reference_year.unwrap_or_else(|| Local::now().year())
    }

    /// 数据库路径（未配置时取默认路径）
    pub fn resolve_db_path(&self) -> String {
        match &self.db_path {
            Some(path) => path.clone(),
            None => get_default_db_path(),
        }
    }
}

fn parse_value<T>(key: &str, raw: &str) -> ConfigResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        message: e.to_string(),
    })
}

/// 默认数据库路径
///
/// 优先级: CARMAKER_DB_PATH > 用户数据目录 > 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var(config_keys::DB_PATH) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./carmaker_ledger.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("carmaker-ledger");
        match std::fs::create_dir_all(&dir) {
            Ok(()) => path = dir.join("carmaker_ledger.db"),
            Err(e) => warn!(dir = %dir.display(), error = %e, "无法创建数据目录，使用当前目录"),
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::strategy::LineOrdering;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = LedgerConfig::default();
        assert_eq!(config.active_window_years, 10);
        assert_eq!(config.allocation.ordering, LineOrdering::NameAscending);
        assert_eq!(config.allocation.commit, CommitPolicy::NonAtomic);
        assert_eq!(config.line_commit, CommitPolicy::NonAtomic);
        assert!(config.thresholds.is_none());
    }

    #[test]
    fn test_partial_json_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"reference_year": 2026, "allocation": {{"commit": "atomic"}}, "thresholds": {{"ismin": 10.0, "ismax": 50.0}}}}"#
        )
        .unwrap();

        let config = LedgerConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.current_year(), 2026);
        assert_eq!(config.allocation.commit, CommitPolicy::Atomic);
        assert_eq!(config.allocation.ordering, LineOrdering::NameAscending);
        assert_eq!(config.active_window_years, 10);
        assert_eq!(config.thresholds, Some(SustainabilityThresholds::new(10.0, 50.0)));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            (config_keys::REFERENCE_YEAR, "2030"),
            (config_keys::LINE_ORDERING, "name_descending"),
            (config_keys::LINE_COMMIT, "atomic"),
            (config_keys::DB_PATH, "  "),
        ]
        .into_iter()
        .collect();

        let mut config = LedgerConfig::default();
        config
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.reference_year, Some(2030));
        assert_eq!(config.allocation.ordering, LineOrdering::NameDescending);
        assert_eq!(config.line_commit, CommitPolicy::Atomic);
        assert!(config.db_path.is_none());
    }

    #[test]
    fn test_invalid_override() {
        let mut config = LedgerConfig::default();
        let err = config
            .apply_overrides(|key| (key == config_keys::ACTIVE_WINDOW_YEARS).then(|| "ten".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }
}
