// ==========================================
// 整车厂运营台账 - API层错误类型
// ==========================================
// 职责: 汇总各层错误，转换仓储错误为用户可读的错误消息
// ==========================================

use crate::config::ConfigError;
use crate::error::LedgerError;
use crate::importer::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 台账规则错误
    // ==========================================
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("无效输入: {0}")]
    InvalidInput(String),

    // ==========================================
    // 导入与配置错误
    // ==========================================
    #[error("文件导入失败: {0}")]
    Import(#[from] ImportError),

    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    #[error("快照数据无效: {0}")]
    CorruptSnapshot(String),
}

impl ApiError {
    /// 台账规则错误（若是）
    pub fn as_ledger(&self) -> Option<&LedgerError> {
        match self {
            ApiError::Ledger(err) => Some(err),
            _ => None,
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::DatabaseError(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::DatabaseError(format!("外键约束违反: {}", msg))
            }
            RepositoryError::SerializationError(msg) => ApiError::CorruptSnapshot(msg),
            RepositoryError::FieldValueError { field, message } => {
                ApiError::CorruptSnapshot(format!("字段{}错误: {}", field, message))
            }
            RepositoryError::CorruptSnapshot(err) => ApiError::CorruptSnapshot(err.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
