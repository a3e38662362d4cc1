// ==========================================
// 产线驾驶舱 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为（外键/busy_timeout）
// - 提供只读对账所需表结构的建表语句（开发库/测试库使用）
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要"每个连接"单独开启
/// - busy_timeout 需要"每个连接"单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 打开 SQLite 连接并确保表结构存在
///
/// 新建的空库（如默认数据目录下首次运行）也能直接读取配置
pub fn open_initialized_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = open_sqlite_connection(db_path)?;
    init_schema(&conn)?;
    Ok(conn)
}

/// 建表（幂等）
///
/// 扫码时间 scanned_at 以 UTC 文本 "YYYY-MM-DD HH:MM:SS" 存储
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS customer (
            customer_id INTEGER PRIMARY KEY,
            customer_name TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS line (
            line_id INTEGER PRIMARY KEY,
            customer_id INTEGER NOT NULL REFERENCES customer(customer_id),
            line_name TEXT NOT NULL,
            active INTEGER NOT NULL DEFAULT 1
        );

        CREATE TABLE IF NOT EXISTS station (
            station_id INTEGER PRIMARY KEY,
            line_id INTEGER NOT NULL REFERENCES line(line_id),
            station_name TEXT NOT NULL,
            operating INTEGER NOT NULL DEFAULT 1
        );

        CREATE TABLE IF NOT EXISTS shift (
            shift_id INTEGER PRIMARY KEY,
            line_id INTEGER NOT NULL REFERENCES line(line_id),
            shift_name TEXT NOT NULL,
            start_time TEXT NOT NULL,
            end_time TEXT NOT NULL,
            active INTEGER NOT NULL DEFAULT 1
        );

        CREATE TABLE IF NOT EXISTS material (
            material_id INTEGER PRIMARY KEY,
            customer_id INTEGER NOT NULL REFERENCES customer(customer_id),
            part_number TEXT NOT NULL,
            production_rate INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS production_order (
            order_id INTEGER PRIMARY KEY,
            order_identifier TEXT NOT NULL,
            line_id INTEGER NOT NULL REFERENCES line(line_id),
            material_id INTEGER NOT NULL REFERENCES material(material_id),
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS validation_result (
            validation_id INTEGER PRIMARY KEY,
            station_id INTEGER NOT NULL REFERENCES station(station_id),
            order_id INTEGER NOT NULL REFERENCES production_order(order_id),
            shift_id INTEGER NOT NULL REFERENCES shift(shift_id),
            scanned_at TEXT NOT NULL,
            is_valid INTEGER NOT NULL DEFAULT 1
        );

        CREATE INDEX IF NOT EXISTS idx_validation_result_shift_time
            ON validation_result(shift_id, scanned_at);

        CREATE TABLE IF NOT EXISTS stop_cause_log (
            stop_cause_log_id INTEGER PRIMARY KEY,
            station_id INTEGER NOT NULL REFERENCES station(station_id),
            cause TEXT NOT NULL,
            status TEXT NOT NULL CHECK (status IN ('OPEN', 'CLOSED')),
            opened_at TEXT NOT NULL,
            closed_at TEXT
        );
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}
