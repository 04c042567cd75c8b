// ==========================================
// 整车厂运营台账 - 导入层
// ==========================================
// 职责: 外部文件 → 车型目录
// ==========================================

pub mod error;
pub mod model_loader;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use model_loader::{ImportSummary, ModelLoader, RejectedRow};
