// ==========================================
// 整车厂运营台账 - 分配策略定义
// ==========================================
// 用途：
// - LineOrdering: 贪心填充时遍历产线的顺序（决定结果的唯一次序来源）
// - CommitPolicy: 部分失败时是否回滚（plan 与 setProductionLines 共用）

use serde::{Deserialize, Serialize};

/// 产线遍历顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineOrdering {
    NameAscending,
    NameDescending,
}

impl LineOrdering {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineOrdering::NameAscending => "name_ascending",
            LineOrdering::NameDescending => "name_descending",
        }
    }
}

impl Default for LineOrdering {
    fn default() -> Self {
        LineOrdering::NameAscending
    }
}

impl std::str::FromStr for LineOrdering {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "name_ascending" | "name-ascending" | "asc" => Ok(LineOrdering::NameAscending),
            "name_descending" | "name-descending" | "desc" => Ok(LineOrdering::NameDescending),
            other => Err(format!("未知产线顺序: {}", other)),
        }
    }
}

/// 部分失败时的提交策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitPolicy {
    /// 失败前已完成的修改保留（默认，与历史行为一致）
    NonAtomic,
    /// 失败时恢复本次调用触及的全部状态
    Atomic,
}

impl CommitPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommitPolicy::NonAtomic => "non_atomic",
            CommitPolicy::Atomic => "atomic",
        }
    }

    pub fn is_atomic(&self) -> bool {
        matches!(self, CommitPolicy::Atomic)
    }
}

impl Default for CommitPolicy {
    fn default() -> Self {
        CommitPolicy::NonAtomic
    }
}

impl std::str::FromStr for CommitPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "non_atomic" | "non-atomic" | "partial" => Ok(CommitPolicy::NonAtomic),
            "atomic" => Ok(CommitPolicy::Atomic),
            other => Err(format!("未知提交策略: {}", other)),
        }
    }
}

/// 分配引擎策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AllocationPolicy {
    #[serde(default)]
    pub ordering: LineOrdering,
    #[serde(default)]
    pub commit: CommitPolicy,
}

impl AllocationPolicy {
    pub fn atomic() -> Self {
        Self {
            commit: CommitPolicy::Atomic,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_preserve_history() {
        let policy = AllocationPolicy::default();
        assert_eq!(policy.ordering, LineOrdering::NameAscending);
        assert_eq!(policy.commit, CommitPolicy::NonAtomic);
        assert!(AllocationPolicy::atomic().commit.is_atomic());
    }

    #[test]
    fn test_parse_policies() {
        assert_eq!("desc".parse::<LineOrdering>(), Ok(LineOrdering::NameDescending));
        assert_eq!("Atomic".parse::<CommitPolicy>(), Ok(CommitPolicy::Atomic));
        assert!("random".parse::<LineOrdering>().is_err());
    }
}
