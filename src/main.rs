// Manual inspection utility: print the line statuses of one customer as JSON.
//
// Usage:
//   production-dashboard <customer_id> [db_path] ["YYYY-MM-DD HH:MM:SS"]
//
// The reference instant defaults to the current plant-local time.
// A missing database file is created with an empty schema.

use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context};
use chrono::NaiveDateTime;
use production_dashboard::config::{get_default_db_path, ConfigManager};
use production_dashboard::db::open_initialized_connection;
use production_dashboard::engine::time_window::{plant_now, plant_timezone};
use production_dashboard::{logging, DashboardApi, SqliteProductionRepository};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let raw_customer = args
        .next()
        .ok_or_else(|| anyhow!("usage: production-dashboard <customer_id> [db_path] [reference_at]"))?;
    let customer_id: i64 = raw_customer
        .trim()
        .parse()
        .with_context(|| format!("customer_id 无效: {}", raw_customer))?;
    let db_path = args
        .next()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(get_default_db_path);

    tracing::info!("==================================================");
    tracing::info!("{} v{}", production_dashboard::APP_NAME, production_dashboard::VERSION);
    tracing::info!("使用数据库: {}", db_path);
    tracing::info!("==================================================");

    let conn = open_initialized_connection(&db_path)
        .with_context(|| format!("无法打开数据库: {}", db_path))?;
    let conn = Arc::new(Mutex::new(conn));

    let config = ConfigManager::from_connection(conn.clone())
        .and_then(|manager| manager.load_dashboard_config())
        .map_err(|e| anyhow!("看板配置加载失败: {}", e))?;

    let reference_at = match args.next() {
        Some(raw) => NaiveDateTime::parse_from_str(raw.trim(), "%Y-%m-%d %H:%M:%S")
            .with_context(|| format!("参考时刻格式应为 YYYY-MM-DD HH:MM:SS: {}", raw))?,
        None => plant_now(plant_timezone(config.plant_utc_offset_minutes)),
    };

    let repo = SqliteProductionRepository::from_connection(conn, config.plant_utc_offset_minutes);
    let api = DashboardApi::new(Arc::new(repo), config);

    let statuses = api
        .list_line_statuses(customer_id, reference_at, None)
        .await
        .with_context(|| format!("客户(id={})产线状态计算失败", customer_id))?;
    println!("{}", serde_json::to_string_pretty(&statuses)?);
    Ok(())
}
