// ==========================================
// 整车厂运营台账 - API 层
// ==========================================
// 职责: 提供台账门面，供命令行与嵌入方调用
// ==========================================

pub mod carmaker_api;
pub mod error;

// 重导出核心类型
pub use carmaker_api::Carmaker;
pub use error::{ApiError, ApiResult};
