// ==========================================
// 整车厂运营台账 - 仓储层错误类型
// ==========================================
// 约束失败按 SQLite 扩展错误码分类，不解析错误文本
// ==========================================

use crate::error::LedgerError;
use rusqlite::ffi;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== 连接与事务 =====
    #[error("台账数据库打开失败: {0}")]
    DatabaseConnectionError(String),

    #[error("台账连接锁获取失败: {0}")]
    LockError(String),

    #[error("快照事务失败: {0}")]
    DatabaseTransactionError(String),

    // ===== 语句执行 =====
    #[error("SQL 执行失败: {0}")]
    DatabaseQueryError(String),

    #[error("快照行重复: {0}")]
    UniqueConstraintViolation(String),

    #[error("快照行引用了不存在的记录: {0}")]
    ForeignKeyViolation(String),

    // ===== 快照内容 =====
    #[error("JSON 列无法读写: {0}")]
    SerializationError(String),

    #[error("列 {field} 取值无效: {message}")]
    FieldValueError { field: String, message: String },

    #[error("快照违反台账规则: {0}")]
    CorruptSnapshot(#[from] LedgerError),
}

impl RepositoryError {
    pub fn field_value(field: &str, message: impl Into<String>) -> Self {
        RepositoryError::FieldValueError {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        let extended_code = match &err {
            rusqlite::Error::SqliteFailure(ffi_err, _) => Some(ffi_err.extended_code),
            _ => None,
        };
        match extended_code {
            Some(ffi::SQLITE_CONSTRAINT_UNIQUE) | Some(ffi::SQLITE_CONSTRAINT_PRIMARYKEY) => {
                RepositoryError::UniqueConstraintViolation(err.to_string())
            }
            Some(ffi::SQLITE_CONSTRAINT_FOREIGNKEY) => {
                RepositoryError::ForeignKeyViolation(err.to_string())
            }
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::SerializationError(err.to_string())
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
