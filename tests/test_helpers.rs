// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 创建临时测试数据库、建表并写入看板测试数据
// 时区: 工厂时区 UTC-6，scanned_at 以 UTC 存储
// ==========================================

#![allow(dead_code)]

use chrono::NaiveDateTime;
use production_dashboard::db::{configure_sqlite_connection, init_schema};
use production_dashboard::engine::time_window::{plant_timezone, to_utc_string};
use rusqlite::{params, Connection};
use std::error::Error;
use tempfile::NamedTempFile;

/// 测试使用的工厂时区偏移（分钟）
pub const PLANT_OFFSET_MINUTES: i32 = -360;

pub const CUSTOMER_ID: i64 = 1;
pub const OTHER_CUSTOMER_ID: i64 = 2;

pub const LINE_ASSEMBLY_1: i64 = 10;
pub const LINE_ASSEMBLY_2: i64 = 20;
pub const LINE_OTHER_CUSTOMER: i64 = 30;

pub const SHIFT_MORNING_L1: i64 = 1;
pub const SHIFT_NIGHT_L1: i64 = 2;
pub const SHIFT_MORNING_L2: i64 = 3;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().unwrap().to_string();

    let conn = Connection::open(&db_path)?;
    configure_sqlite_connection(&conn)?;
    init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 解析工厂本地时间 "YYYY-MM-DD HH:MM:SS"
pub fn local(raw: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").unwrap()
}

/// 写入一次扫码（本地时间换算为 UTC 存储）
pub fn insert_scan(
    conn: &Connection,
    station_id: i64,
    order_id: i64,
    shift_id: i64,
    local_time: &str,
    is_valid: bool,
) -> Result<(), Box<dyn Error>> {
    let scanned_at = to_utc_string(local(local_time), plant_timezone(PLANT_OFFSET_MINUTES));
    conn.execute(
        "INSERT INTO validation_result (station_id, order_id, shift_id, scanned_at, is_valid)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![station_id, order_id, shift_id, scanned_at, is_valid],
    )?;
    Ok(())
}

/// 按原样写入扫码时间文本（用于非规范格式/无效时间戳）
pub fn insert_raw_scan(
    conn: &Connection,
    station_id: i64,
    order_id: i64,
    shift_id: i64,
    scanned_at: &str,
) -> Result<(), Box<dyn Error>> {
    conn.execute(
        "INSERT INTO validation_result (station_id, order_id, shift_id, scanned_at, is_valid)
         VALUES (?1, ?2, ?3, ?4, 1)",
        params![station_id, order_id, shift_id, scanned_at],
    )?;
    Ok(())
}

/// 写入主数据: 客户/产线/工位/班次/物料/订单/停机记录
///
/// - 产线 10: 工位 101(有未关闭停机) + 102(停机已关闭) → 未阻断
/// - 产线 20: 工位 201(有未关闭停机) + 202(未运行) → 阻断
/// - 产线 30: 属于客户 2，无班次
pub fn seed_master_data(conn: &Connection) -> Result<(), Box<dyn Error>> {
    conn.execute_batch(
        r#"
        INSERT INTO customer (customer_id, customer_name) VALUES
            (1, 'ACME Automotive'),
            (2, 'Nordic Parts');

        INSERT INTO line (line_id, customer_id, line_name, active) VALUES
            (10, 1, 'Línea Ensamble 1', 1),
            (20, 1, 'Línea Ensamble 2', 1),
            (30, 2, 'Línea Nordic', 1);

        INSERT INTO station (station_id, line_id, station_name, operating) VALUES
            (101, 10, 'Estación 101', 1),
            (102, 10, 'Estación 102', 1),
            (201, 20, 'Estación 201', 1),
            (202, 20, 'Estación 202', 0),
            (301, 30, 'Estación 301', 1);

        INSERT INTO shift (shift_id, line_id, shift_name, start_time, end_time, active) VALUES
            (1, 10, 'Matutino', '06:00', '14:00', 1),
            (2, 10, 'Nocturno', '22:00', '06:00', 1),
            (3, 20, 'Matutino', '06:00:00', '14:00:00', 1),
            (4, 20, 'Vespertino', '14:00', '22:00', 0);

        INSERT INTO material (material_id, customer_id, part_number, production_rate) VALUES
            (1, 1, 'PN-AX100', 60),
            (2, 1, 'PN-BX200', 30);

        INSERT INTO production_order (order_id, order_identifier, line_id, material_id, created_at) VALUES
            (1, 'OP-1001', 10, 1, '2026-03-01 10:00:00'),
            (2, 'OP-1002', 10, 2, '2026-03-02 12:00:00');

        INSERT INTO stop_cause_log (station_id, cause, status, opened_at, closed_at) VALUES
            (101, 'Falta de material', 'OPEN', '2026-03-02 14:00:00', NULL),
            (102, 'Cambio de herramental', 'CLOSED', '2026-03-02 12:00:00', '2026-03-02 12:30:00'),
            (201, 'Falla eléctrica', 'OPEN', '2026-03-02 13:00:00', NULL);
        "#,
    )?;
    Ok(())
}

/// 写入早班（2026-03-02 06:00-14:00）扫码数据
///
/// - 06 点: OP-1001 工位101 ×3、工位102 ×2
/// - 07 点: OP-1001 ×2（07:05-07:25），换型后 OP-1002 ×3（07:30-07:55）
/// - 08 点: OP-1002 ×1
/// - 无效扫码与前一天的扫码不计入
pub fn seed_morning_scans(conn: &Connection) -> Result<(), Box<dyn Error>> {
    for t in ["06:10:00", "06:20:00", "06:50:00", "07:05:00", "07:25:00"] {
        insert_scan(conn, 101, 1, SHIFT_MORNING_L1, &format!("2026-03-02 {}", t), true)?;
    }
    for t in ["07:30:00", "07:40:00", "07:55:00", "08:15:00"] {
        insert_scan(conn, 101, 2, SHIFT_MORNING_L1, &format!("2026-03-02 {}", t), true)?;
    }
    for t in ["06:30:00", "06:45:00"] {
        insert_scan(conn, 102, 1, SHIFT_MORNING_L1, &format!("2026-03-02 {}", t), true)?;
    }
    insert_scan(conn, 101, 1, SHIFT_MORNING_L1, "2026-03-02 06:40:00", false)?;
    insert_scan(conn, 101, 1, SHIFT_MORNING_L1, "2026-03-01 07:00:00", true)?;
    Ok(())
}

/// 写入夜班（2026-03-02 22:00 - 2026-03-03 06:00）扫码数据
pub fn seed_night_scans(conn: &Connection) -> Result<(), Box<dyn Error>> {
    for t in ["2026-03-02 23:10:00", "2026-03-02 23:20:00", "2026-03-03 01:05:00"] {
        insert_scan(conn, 101, 2, SHIFT_NIGHT_L1, t, true)?;
    }
    Ok(())
}

/// 创建包含全部测试数据的数据库
pub fn create_seeded_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let (temp_file, db_path) = create_test_db()?;
    let conn = Connection::open(&db_path)?;
    seed_master_data(&conn)?;
    seed_morning_scans(&conn)?;
    seed_night_scans(&conn)?;
    Ok((temp_file, db_path))
}
