// ==========================================
// 整车厂运营台账 - 台账错误类型
// ==========================================
// 职责: 目录 / 产线 / 库存 / 分配引擎共用的错误分类
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 台账错误类型
///
/// 所有错误均为同步、调用方可见的失败；内部不重试、不恢复。
/// 失败前已提交的状态保持原样（除非显式选择原子提交策略）。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    // ===== 命名冲突 =====
    #[error("名称重复: {entity} name={name}")]
    DuplicateName { entity: String, name: String },

    // ===== 实体不存在 =====
    #[error("工厂不存在或无产线: {0}")]
    UnknownFactory(String),

    #[error("车型不存在: {0}")]
    UnknownModel(String),

    #[error("仓库不存在: {0}")]
    UnknownStorage(String),

    #[error("产线不存在: {0}")]
    UnknownLine(String),

    // ===== 输入格式错误 =====
    #[error("产线规格格式错误: spec={spec}, reason={reason}")]
    MalformedSpec { spec: String, reason: String },

    #[error("分配请求格式错误: entry={entry}, reason={reason}")]
    MalformedRequest { entry: String, reason: String },

    // ===== 容量约束 =====
    #[error("仓库容量约束违反: storage={storage}, {message}")]
    Capacity { storage: String, message: String },

    #[error("容量非法: {entity} capacity={capacity}")]
    InvalidCapacity { entity: String, capacity: i64 },

    #[error("仓库未存放该车型: storage={storage}, model={model}")]
    ModelNotStored { storage: String, model: String },

    // ===== 并发 =====
    #[error("锁获取失败: {0}")]
    LockError(String),
}

impl LedgerError {
    pub fn duplicate(entity: &str, name: &str) -> Self {
        LedgerError::DuplicateName {
            entity: entity.to_string(),
            name: name.to_string(),
        }
    }

    pub fn malformed_spec(spec: &str, reason: impl Into<String>) -> Self {
        LedgerError::MalformedSpec {
            spec: spec.to_string(),
            reason: reason.into(),
        }
    }

    pub fn malformed_request(entry: &str, reason: impl Into<String>) -> Self {
        LedgerError::MalformedRequest {
            entry: entry.to_string(),
            reason: reason.into(),
        }
    }

    /// 是否为容量类错误（仓库满/空）
    pub fn is_capacity(&self) -> bool {
        matches!(self, LedgerError::Capacity { .. })
    }
}

/// Result 类型别名
pub type LedgerResult<T> = Result<T, LedgerError>;
