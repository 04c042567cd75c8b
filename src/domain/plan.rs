// ==========================================
// 整车厂运营台账 - 分配方案领域模型
// ==========================================
// 请求文本: modelCode:quantity 以 ',' 分隔，不支持转义
// ==========================================

use crate::error::{LedgerError, LedgerResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

// ==========================================
// PlanEntry - 请求条目
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanEntry {
    pub model_code: String,
    pub quantity: u32, // 0 视为已满足的空条目
}

impl PlanEntry {
    pub fn new(model_code: &str, quantity: u32) -> Self {
        Self {
            model_code: model_code.to_string(),
            quantity,
        }
    }
}

// ==========================================
// PlanRequest - 分配请求（有序）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlanRequest {
    pub entries: Vec<PlanEntry>,
}

impl PlanRequest {
    pub fn new(entries: Vec<PlanEntry>) -> Self {
        Self { entries }
    }

    pub fn total_quantity(&self) -> u64 {
        self.entries.iter().map(|e| e.quantity as u64).sum()
    }
}

impl FromStr for PlanRequest {
    type Err = LedgerError;

    /// 解析请求文本；数量必须为正整数，整条请求在任何分配前完成校验
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut entries = Vec::new();
        for raw in s.split(',') {
            let raw = raw.trim();
            if raw.is_empty() {
                return Err(LedgerError::malformed_request(raw, "空条目"));
            }
            entries.push(parse_entry(raw)?);
        }
        Ok(PlanRequest { entries })
    }
}

fn parse_entry(raw: &str) -> LedgerResult<PlanEntry> {
    let fields: Vec<&str> = raw.split(':').collect();
    if fields.len() != 2 {
        return Err(LedgerError::malformed_request(raw, "应为 modelCode:quantity"));
    }

    let model_code = fields[0].trim();
    if model_code.is_empty() {
        return Err(LedgerError::malformed_request(raw, "车型代码为空"));
    }

    let quantity: i64 = fields[1]
        .trim()
        .parse()
        .map_err(|_| LedgerError::malformed_request(raw, "数量不是整数"))?;
    if quantity <= 0 {
        return Err(LedgerError::malformed_request(raw, "数量必须为正"));
    }
    let quantity =
        u32::try_from(quantity).map_err(|_| LedgerError::malformed_request(raw, "数量超出范围"))?;

    Ok(PlanEntry::new(model_code, quantity))
}

// ==========================================
// LineAllocation - 单条产线的分配增量
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineAllocation {
    pub line_name: String,
    pub model_code: String,
    pub quantity: u32,
}

// ==========================================
// UnsatisfiedEntry - 首个未满足条目
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsatisfiedEntry {
    pub model_code: String,
    pub requested: u32,
    pub shortfall: u32, // 所有匹配产线剩余产能耗尽后仍缺的数量
}

// ==========================================
// PlanOutcome - 一次 plan 的结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanOutcome {
    pub plan_id: String,
    pub executed_at: DateTime<Utc>,
    pub request: PlanRequest,
    pub success: bool,
    pub allocations: Vec<LineAllocation>,   // 本次提交（或已回滚）的增量，按发生顺序
    pub unsatisfied: Option<UnsatisfiedEntry>,
    pub rolled_back: bool,                  // 原子策略下失败时为 true
}

impl PlanOutcome {
    pub(crate) fn started(request: PlanRequest) -> Self {
        Self {
            plan_id: Uuid::new_v4().to_string(),
            executed_at: Utc::now(),
            request,
            success: false,
            allocations: Vec::new(),
            unsatisfied: None,
            rolled_back: false,
        }
    }

    /// 已提交的总分配量（回滚后为 0）
    pub fn committed_quantity(&self) -> u64 {
        if self.rolled_back {
            return 0;
        }
        self.allocations.iter().map(|a| a.quantity as u64).sum()
    }

    /// 指定产线在本次 plan 中获得的分配量
    pub fn allocated_to(&self, line_name: &str) -> u32 {
        self.allocations
            .iter()
            .filter(|a| a.line_name == line_name)
            .map(|a| a.quantity)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_request() {
        let request: PlanRequest = "M1:50, M2:10".parse().unwrap();
        assert_eq!(request.entries.len(), 2);
        assert_eq!(request.entries[0], PlanEntry::new("M1", 50));
        assert_eq!(request.entries[1], PlanEntry::new("M2", 10));
        assert_eq!(request.total_quantity(), 60);
    }

    #[test]
    fn test_parse_request_rejects_bad_entries() {
        for bad in ["M1", "M1:0", "M1:-3", "M1:x", ":5", "M1:5,", "M1:5:6"] {
            let err = bad.parse::<PlanRequest>().unwrap_err();
            assert!(
                matches!(err, LedgerError::MalformedRequest { .. }),
                "{} 应判定为格式错误",
                bad
            );
        }
    }

    #[test]
    fn test_outcome_helpers() {
        let mut outcome = PlanOutcome::started(PlanRequest::default());
        outcome.allocations.push(LineAllocation {
            line_name: "A".to_string(),
            model_code: "M1".to_string(),
            quantity: 30,
        });
        outcome.allocations.push(LineAllocation {
            line_name: "B".to_string(),
            model_code: "M1".to_string(),
            quantity: 20,
        });
        assert_eq!(outcome.allocated_to("A"), 30);
        assert_eq!(outcome.committed_quantity(), 50);

        outcome.rolled_back = true;
        assert_eq!(outcome.committed_quantity(), 0);
    }
}
