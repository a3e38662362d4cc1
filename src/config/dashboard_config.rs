// ==========================================
// 产线驾驶舱 - 看板配置
// ==========================================
// 存储: config_kv 表 (scope_id='global')
// 缺失的键使用默认值；格式错误的值记录告警后使用默认值
// ==========================================

use serde::{Deserialize, Serialize};

use crate::engine::time_window::DEFAULT_PLANT_UTC_OFFSET_MINUTES;

/// 看板配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// 工厂时区相对 UTC 的分钟偏移（默认 America/Mexico_City: -360）
    pub plant_utc_offset_minutes: i32,
    /// 产线状态是否附带小时图表序列
    pub include_chart_data: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            plant_utc_offset_minutes: DEFAULT_PLANT_UTC_OFFSET_MINUTES,
            include_chart_data: true,
        }
    }
}

/// 获取默认数据库路径
///
/// 优先级: 环境变量 PRODUCTION_DASHBOARD_DB_PATH > 用户数据目录 > 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("PRODUCTION_DASHBOARD_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./production_dashboard.db");
    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("production-dashboard");
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("dashboard.db");
        }
    }

    path.to_string_lossy().to_string()
}
