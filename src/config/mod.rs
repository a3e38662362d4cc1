// ==========================================
// 产线驾驶舱 - 配置层
// ==========================================
// 职责: 看板配置加载与覆写
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod dashboard_config;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use dashboard_config::{get_default_db_path, DashboardConfig};
