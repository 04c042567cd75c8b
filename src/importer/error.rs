// ==========================================
// 整车厂运营台账 - 车型导入错误
// ==========================================
// 文件级错误中断导入；行级错误只记入 RejectedRow
// ==========================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件级 =====
    #[error("车型文件不存在: {0}")]
    FileNotFound(String),

    #[error("车型文件读取失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("制表符记录无法切分: {0}")]
    Tsv(#[from] csv::Error),

    // ===== 行级 =====
    #[error("第 {row} 行字段数应为 {expected}，实际 {found}")]
    ColumnCount {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("第 {row} 行不是合法的 UTF-8 文本")]
    InvalidEncoding { row: usize },

    #[error("第 {row} 行车型代码为空")]
    EmptyCode { row: usize },

    #[error("第 {row} 行字段 {field} 无法解析: '{value}'")]
    InvalidField {
        row: usize,
        field: &'static str,
        value: String,
    },
}

impl ImportError {
    /// 是否为行级错误（可跳过该行继续导入）
    pub fn is_row_level(&self) -> bool {
        matches!(
            self,
            ImportError::ColumnCount { .. }
                | ImportError::InvalidEncoding { .. }
                | ImportError::EmptyCode { .. }
                | ImportError::InvalidField { .. }
        )
    }
}

pub type ImportResult<T> = Result<T, ImportError>;
