// ==========================================
// 整车厂运营台账 - 产线与工厂领域模型
// ==========================================
// 产线以 name 全局排序（分配引擎的遍历顺序）
// 不变式: 0 <= allocated <= total_capacity
// ==========================================

use crate::domain::types::LineEngineCode;
use crate::error::{LedgerError, LedgerResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ==========================================
// Factory - 工厂
// ==========================================
// 自身无产能，产能为所属产线之和
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Factory {
    pub name: String,
}

impl Factory {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

// ==========================================
// ProductionLine - 产线
// ==========================================
// 只序列化不反序列化: 恢复必须走 restore() 以保证不变式
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductionLine {
    pub name: String,                // 产线名称（全局唯一）
    pub factory_name: String,        // 所属工厂
    pub total_capacity: u32,         // 总产能（创建后不可变）
    pub engine_code: LineEngineCode, // 可生产的动力类型编码
    allocated: u32,                  // 累计已分配（跨多次 plan 累加，不重置）
}

impl ProductionLine {
    pub fn new(name: &str, factory_name: &str, total_capacity: u32, engine_code: LineEngineCode) -> Self {
        Self {
            name: name.to_string(),
            factory_name: factory_name.to_string(),
            total_capacity,
            engine_code,
            allocated: 0,
        }
    }

    /// 从快照恢复（已分配量超出总产能时截断到总产能）
    pub fn restore(
        name: &str,
        factory_name: &str,
        total_capacity: u32,
        engine_code: LineEngineCode,
        allocated: u32,
    ) -> Self {
        let mut line = Self::new(name, factory_name, total_capacity, engine_code);
        line.allocated = allocated.min(total_capacity);
        line
    }

    pub fn allocated(&self) -> u32 {
        self.allocated
    }

    /// 在剩余产能内分配，返回实际分配量 min(quantity, remaining)
    pub(crate) fn allocate_up_to(&mut self, quantity: u32) -> u32 {
        let remaining = self.total_capacity - self.allocated;
        let granted = quantity.min(remaining);
        self.allocated += granted;
        granted
    }

    /// 回滚到之前记录的已分配量（原子提交策略使用）
    pub(crate) fn reset_allocated(&mut self, allocated: u32) {
        self.allocated = allocated.min(self.total_capacity);
    }
}

// ==========================================
// LineSpec - 产线规格
// ==========================================
// 文本格式: lineName:capacity:engineTypeCode（恰好 3 段）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSpec {
    pub name: String,
    pub capacity: u32,
    pub engine_code: LineEngineCode,
}

impl LineSpec {
    /// 由数值构造，执行与文本解析相同的范围校验
    pub fn new(name: &str, capacity: i64, engine_code: i64) -> LedgerResult<Self> {
        let spec = format!("{}:{}:{}", name, capacity, engine_code);
        Self::validated(&spec, name, capacity, engine_code)
    }

    fn validated(spec: &str, name: &str, capacity: i64, engine_code: i64) -> LedgerResult<Self> {
        if name.is_empty() {
            return Err(LedgerError::malformed_spec(spec, "产线名称为空"));
        }
        if capacity < 0 {
            return Err(LedgerError::malformed_spec(spec, "产能不能为负"));
        }
        let capacity = u32::try_from(capacity)
            .map_err(|_| LedgerError::malformed_spec(spec, "产能超出范围"))?;
        let engine_code = LineEngineCode::new(engine_code).ok_or_else(|| {
            LedgerError::malformed_spec(spec, format!("动力编码超出范围 [0, {}]", LineEngineCode::MAX))
        })?;

        Ok(Self {
            name: name.to_string(),
            capacity,
            engine_code,
        })
    }
}

impl FromStr for LineSpec {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split(':').collect();
        if fields.len() != 3 {
            return Err(LedgerError::malformed_spec(
                s,
                format!("字段数应为 3，实际 {}", fields.len()),
            ));
        }

        let capacity: i64 = fields[1]
            .trim()
            .parse()
            .map_err(|_| LedgerError::malformed_spec(s, "产能不是整数"))?;
        let engine_code: i64 = fields[2]
            .trim()
            .parse()
            .map_err(|_| LedgerError::malformed_spec(s, "动力编码不是整数"))?;

        Self::validated(s, fields[0].trim(), capacity, engine_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line_spec() {
        let spec: LineSpec = "L1:10:1".parse().unwrap();
        assert_eq!(spec.name, "L1");
        assert_eq!(spec.capacity, 10);
        assert_eq!(spec.engine_code.value(), 1);

        // 编码 4 合法
        assert!("L4:5:4".parse::<LineSpec>().is_ok());
    }

    #[test]
    fn test_parse_line_spec_malformed() {
        for bad in ["L1:10", "L1:10:1:9", "L1:-1:1", "L1:10:5", "L1:10:-1", "L1:ten:1", ":10:1"] {
            let err = bad.parse::<LineSpec>().unwrap_err();
            assert!(
                matches!(err, LedgerError::MalformedSpec { .. }),
                "{} 应判定为格式错误",
                bad
            );
        }
    }

    #[test]
    fn test_allocate_up_to_clamps_to_remaining() {
        let mut line = ProductionLine::new("A", "F", 30, LineEngineCode::new(1).unwrap());
        assert_eq!(line.allocate_up_to(20), 20);
        assert_eq!(line.allocate_up_to(20), 10);
        assert_eq!(line.allocate_up_to(5), 0);
        assert_eq!(line.allocated(), 30);

        line.reset_allocated(12);
        assert_eq!(line.allocated(), 12);
    }

    #[test]
    fn test_restore_clamps_allocated() {
        let line = ProductionLine::restore("A", "F", 10, LineEngineCode::new(0).unwrap(), 99);
        assert_eq!(line.allocated(), 10);
    }
}
