// ==========================================
// 整车厂运营台账 - 产线产能约束
// ==========================================
// 红线: 已分配量永远不超过总产能
// 用途: 分配引擎与利用率统计的统一读口
// ==========================================

use crate::domain::production_line::ProductionLine;

// ==========================================
// Trait: LineCapacity
// ==========================================
pub trait LineCapacity {
    /// 剩余产能 = 总产能 - 已分配
    fn remaining_capacity(&self) -> u32;

    /// 是否已满（剩余为 0）
    fn is_fully_allocated(&self) -> bool;

    /// 是否未使用（已分配为 0）
    fn is_unused(&self) -> bool;
}

// ==========================================
// LineCapacity trait 实现
// ==========================================
impl LineCapacity for ProductionLine {
    fn remaining_capacity(&self) -> u32 {
        self.total_capacity - self.allocated()
    }

    /// 总产能为 0 的产线同时视为已满和未使用
    fn is_fully_allocated(&self) -> bool {
        self.remaining_capacity() == 0
    }

    fn is_unused(&self) -> bool {
        self.remaining_capacity() == self.total_capacity
    }
}
