// ==========================================
// 产线驾驶舱 - API 层
// ==========================================
// 职责: 提供看板业务接口,供边界层（HTTP/命令行）调用
// ==========================================

pub mod dashboard_api;
pub mod error;

// 重导出核心类型
pub use dashboard_api::DashboardApi;
pub use error::{ApiError, ApiResult};
