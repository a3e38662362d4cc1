// ==========================================
// 产线驾驶舱 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 产线看板后端的产量对账核心
// 数据流: 数据访问层(扫码聚合) → 班次时间窗 → 产能分摊 → 产线聚合 → 边界层
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 数据类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 对账计算
pub mod engine;

// 配置层 - 看板配置
pub mod config;

// 数据库基础设施（连接初始化/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 看板接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    ActiveShift, HourlySeries, LineMeta, LineStatus, ScanAggregateRow, ShiftDateRange,
    ShiftWindow, StationAggregateRow,
};

// 引擎
pub use engine::{
    capped_compliance_rate, compute_compliance_rate, compute_goal, compute_shift_goal,
    EngineError, LineAggregator, RateApportionmentEngine,
};

// 数据访问
pub use repository::{ProductionDataSource, RepositoryError, SqliteProductionRepository};

// API
pub use api::{ApiError, DashboardApi};

// 配置
pub use config::{ConfigManager, DashboardConfig};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "产线驾驶舱";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
