// ==========================================
// 产线驾驶舱 - 领域模型层
// ==========================================
// 职责: 定义扫码聚合行、班次、产线状态等数据类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod line;
pub mod scan;
pub mod shift;

// 重导出核心类型
pub use line::{HourlySeries, LineMeta, LineStatus};
pub use scan::{ScanAggregateRow, StationAggregateRow};
pub use shift::{ActiveShift, ShiftDateRange, ShiftWindow};
