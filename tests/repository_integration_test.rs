// ==========================================
// SqliteProductionRepository 集成测试
// ==========================================
// 测试范围:
// 1. 扫码小时聚合: 本地小时换算、排序、过滤（无效扫码/班次外）
// 2. 工位当班聚合: 剩余分钟、排序、未知班次
// 3. 启用班次: 阻断标志推导、停用班次排除、客户隔离
// ==========================================

mod test_helpers;

use production_dashboard::domain::ShiftDateRange;
use rusqlite::Connection;
use production_dashboard::repository::{
    ProductionDataSource, RepositoryError, SqliteProductionRepository,
};
use test_helpers::*;

fn morning_range() -> ShiftDateRange {
    ShiftDateRange {
        start: local("2026-03-02 06:00:00"),
        end: local("2026-03-02 14:00:00"),
    }
}

// ==========================================
// 扫码小时聚合
// ==========================================

#[tokio::test]
async fn test_scan_aggregates_grouped_by_local_hour_and_order() {
    let (_tmp, db_path) = create_seeded_db().expect("无法创建测试数据库");
    let repo = SqliteProductionRepository::new(&db_path, PLANT_OFFSET_MINUTES).unwrap();

    let rows = repo
        .fetch_scan_aggregates_for_line_and_shift(
            LINE_ASSEMBLY_1,
            SHIFT_MORNING_L1,
            CUSTOMER_ID,
            morning_range(),
        )
        .await
        .unwrap();

    let summary: Vec<(u32, &str, i64, i64)> = rows
        .iter()
        .map(|r| {
            (
                r.hour,
                r.order_identifier.as_str(),
                r.validation_count,
                r.production_rate,
            )
        })
        .collect();

    // 同一小时内按订单创建时间降序
    assert_eq!(
        summary,
        vec![
            (6, "OP-1001", 5, 60),
            (7, "OP-1002", 3, 30),
            (7, "OP-1001", 2, 60),
            (8, "OP-1002", 1, 30),
        ]
    );

    // 时间戳已换算回工厂本地时间
    assert_eq!(rows[0].min_scan_at, Some(local("2026-03-02 06:10:00")));
    assert_eq!(rows[0].max_scan_at, Some(local("2026-03-02 06:50:00")));
    assert_eq!(rows[2].min_scan_at, Some(local("2026-03-02 07:05:00")));
}

#[tokio::test]
async fn test_scan_aggregates_respect_customer_scope() {
    let (_tmp, db_path) = create_seeded_db().expect("无法创建测试数据库");
    let repo = SqliteProductionRepository::new(&db_path, PLANT_OFFSET_MINUTES).unwrap();

    let rows = repo
        .fetch_scan_aggregates_for_line_and_shift(
            LINE_ASSEMBLY_1,
            SHIFT_MORNING_L1,
            OTHER_CUSTOMER_ID,
            morning_range(),
        )
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_scan_aggregates_overnight_range() {
    let (_tmp, db_path) = create_seeded_db().expect("无法创建测试数据库");
    let repo = SqliteProductionRepository::new(&db_path, PLANT_OFFSET_MINUTES).unwrap();

    let range = ShiftDateRange {
        start: local("2026-03-02 22:00:00"),
        end: local("2026-03-03 06:00:00"),
    };
    let rows = repo
        .fetch_scan_aggregates_for_line_and_shift(LINE_ASSEMBLY_1, SHIFT_NIGHT_L1, CUSTOMER_ID, range)
        .await
        .unwrap();

    let hours: Vec<(u32, i64)> = rows.iter().map(|r| (r.hour, r.validation_count)).collect();
    assert_eq!(hours, vec![(1, 1), (23, 2)]);
}

#[tokio::test]
async fn test_scan_aggregates_normalize_stored_timestamp_formats() {
    let (_tmp, db_path) = create_seeded_db().expect("无法创建测试数据库");
    {
        let conn = Connection::open(&db_path).unwrap();
        // UTC: 15:10 → 本地 09:10；16:20 / 16:30 → 本地 10:20 / 10:30
        insert_raw_scan(&conn, 101, 2, SHIFT_MORNING_L1, "2026-03-02 15:10").unwrap();
        insert_raw_scan(&conn, 101, 2, SHIFT_MORNING_L1, "2026-03-02T16:20:00").unwrap();
        insert_raw_scan(&conn, 101, 2, SHIFT_MORNING_L1, "2026-03-02 16:30:00.500").unwrap();
        // SQLite 无法识别，不计入任何小时
        insert_raw_scan(&conn, 101, 2, SHIFT_MORNING_L1, "not-a-time").unwrap();
    }
    let repo = SqliteProductionRepository::new(&db_path, PLANT_OFFSET_MINUTES).unwrap();

    let rows = repo
        .fetch_scan_aggregates_for_line_and_shift(
            LINE_ASSEMBLY_1,
            SHIFT_MORNING_L1,
            CUSTOMER_ID,
            morning_range(),
        )
        .await
        .unwrap();

    let hour_9 = rows.iter().find(|r| r.hour == 9).expect("缺少 09 点聚合行");
    assert_eq!(hour_9.order_identifier, "OP-1002");
    assert_eq!(hour_9.validation_count, 1);
    assert_eq!(hour_9.min_scan_at, Some(local("2026-03-02 09:10:00")));
    assert_eq!(hour_9.max_scan_at, Some(local("2026-03-02 09:10:00")));

    let hour_10 = rows.iter().find(|r| r.hour == 10).expect("缺少 10 点聚合行");
    assert_eq!(hour_10.validation_count, 2);
    assert_eq!(hour_10.min_scan_at, Some(local("2026-03-02 10:20:00")));
    assert_eq!(hour_10.max_scan_at, Some(local("2026-03-02 10:30:00")));

    // 原有 11 次有效扫码 + 3 次可识别的非规范格式
    assert_eq!(rows.iter().map(|r| r.validation_count).sum::<i64>(), 14);
    assert!(rows.iter().all(|r| r.min_scan_at.is_some() && r.max_scan_at.is_some()));

    // 工位聚合使用同一口径: 最新订单末次扫码为 10:30
    let station_rows = repo
        .fetch_station_aggregates_for_line_and_shift(
            LINE_ASSEMBLY_1,
            SHIFT_MORNING_L1,
            CUSTOMER_ID,
            local("2026-03-02 11:00:00"),
        )
        .await
        .unwrap();
    assert_eq!(station_rows[0].order_identifier, "OP-1002");
    assert_eq!(station_rows[0].validation_count, 7);
    assert_eq!(station_rows[0].max_scan_at, Some(local("2026-03-02 10:30:00")));
}

// ==========================================
// 工位当班聚合
// ==========================================

#[tokio::test]
async fn test_station_aggregates_with_remaining_minutes() {
    let (_tmp, db_path) = create_seeded_db().expect("无法创建测试数据库");
    let repo = SqliteProductionRepository::new(&db_path, PLANT_OFFSET_MINUTES).unwrap();

    let rows = repo
        .fetch_station_aggregates_for_line_and_shift(
            LINE_ASSEMBLY_1,
            SHIFT_MORNING_L1,
            CUSTOMER_ID,
            local("2026-03-02 09:00:00"),
        )
        .await
        .unwrap();

    let summary: Vec<(i64, &str, i64)> = rows
        .iter()
        .map(|r| (r.station_id, r.order_identifier.as_str(), r.validation_count))
        .collect();
    assert_eq!(
        summary,
        vec![(101, "OP-1002", 4), (101, "OP-1001", 5), (102, "OP-1001", 2)]
    );
    assert!(rows.iter().all(|r| r.remaining_minutes == 300));
    assert_eq!(rows[0].max_scan_at, Some(local("2026-03-02 08:15:00")));
}

#[tokio::test]
async fn test_station_aggregates_after_shift_end_has_no_remaining_time() {
    let (_tmp, db_path) = create_seeded_db().expect("无法创建测试数据库");
    let repo = SqliteProductionRepository::new(&db_path, PLANT_OFFSET_MINUTES).unwrap();

    // 夜班 02:00 观察: 班次始于前一日 22:00，剩余 4 小时
    let rows = repo
        .fetch_station_aggregates_for_line_and_shift(
            LINE_ASSEMBLY_1,
            SHIFT_NIGHT_L1,
            CUSTOMER_ID,
            local("2026-03-03 02:00:00"),
        )
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].validation_count, 3);
    assert_eq!(rows[0].remaining_minutes, 240);
}

#[tokio::test]
async fn test_station_aggregates_unknown_shift() {
    let (_tmp, db_path) = create_seeded_db().expect("无法创建测试数据库");
    let repo = SqliteProductionRepository::new(&db_path, PLANT_OFFSET_MINUTES).unwrap();

    let err = repo
        .fetch_station_aggregates_for_line_and_shift(
            LINE_ASSEMBLY_1,
            99,
            CUSTOMER_ID,
            local("2026-03-02 09:00:00"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { .. }));
}

// ==========================================
// 启用班次
// ==========================================

#[tokio::test]
async fn test_active_shifts_and_blocked_flag() {
    let (_tmp, db_path) = create_seeded_db().expect("无法创建测试数据库");
    let repo = SqliteProductionRepository::new(&db_path, PLANT_OFFSET_MINUTES).unwrap();

    let shifts = repo.fetch_active_shifts_for_customer(CUSTOMER_ID).await.unwrap();

    let ids: Vec<(i64, i64)> = shifts.iter().map(|s| (s.line.line_id, s.shift_id)).collect();
    // 停用的班次 4 不返回
    assert_eq!(
        ids,
        vec![
            (LINE_ASSEMBLY_1, SHIFT_MORNING_L1),
            (LINE_ASSEMBLY_1, SHIFT_NIGHT_L1),
            (LINE_ASSEMBLY_2, SHIFT_MORNING_L2),
        ]
    );

    // 产线 10: 工位102 停机已关闭 → 未阻断
    assert!(!shifts[0].line.blocked);
    // 产线 20: 唯一运行工位存在未关闭停机 → 阻断
    assert!(shifts[2].line.blocked);
    assert_eq!(shifts[2].start_time_of_day, "06:00:00");
    assert_eq!(shifts[0].line.customer_name, "ACME Automotive");
}

#[tokio::test]
async fn test_active_shifts_customer_without_shifts() {
    let (_tmp, db_path) = create_seeded_db().expect("无法创建测试数据库");
    let repo = SqliteProductionRepository::new(&db_path, PLANT_OFFSET_MINUTES).unwrap();

    let shifts = repo
        .fetch_active_shifts_for_customer(OTHER_CUSTOMER_ID)
        .await
        .unwrap();
    assert!(shifts.is_empty());
}
