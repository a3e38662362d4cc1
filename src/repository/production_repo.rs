// ==========================================
// 产线驾驶舱 - 生产数据仓储（SQLite 实现）
// ==========================================
// 职责: 实现 ProductionDataSource，返回扫码聚合快照
// 红线: Repository 不含业务规则，只做聚合查询
// 说明: scanned_at 以 UTC 存储，查询前经 datetime() 规范化，按工厂时区偏移换算小时与时间戳
// ==========================================

use async_trait::async_trait;
use chrono::{FixedOffset, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};
use tracing::{debug, instrument, warn};

use crate::db::open_sqlite_connection;
use crate::domain::{
    ActiveShift, LineMeta, ScanAggregateRow, ShiftDateRange, StationAggregateRow,
};
use crate::engine::time_window::{
    plant_timezone, resolve_shift_date_range, shift_window_at, to_plant_local, to_utc_string,
};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::production_source::ProductionDataSource;

// ==========================================
// SqliteProductionRepository
// ==========================================
pub struct SqliteProductionRepository {
    conn: Arc<Mutex<Connection>>,
    plant_tz: FixedOffset,
}

impl SqliteProductionRepository {
    /// 创建新的仓储实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    /// - plant_utc_offset_minutes: 工厂时区相对 UTC 的分钟偏移
    pub fn new(db_path: &str, plant_utc_offset_minutes: i32) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self::from_connection(
            Arc::new(Mutex::new(conn)),
            plant_utc_offset_minutes,
        ))
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>, plant_utc_offset_minutes: i32) -> Self {
        Self {
            conn,
            plant_tz: plant_timezone(plant_utc_offset_minutes),
        }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// SQLite datetime() 修饰符，将 UTC 换算为工厂本地时间
    fn local_modifier(&self) -> String {
        format!("{:+} minutes", self.plant_tz.local_minus_utc() / 60)
    }

    /// UTC 文本时间戳 → 工厂本地时间；无效时记录告警并返回 None
    fn parse_scan_time(&self, raw: Option<String>) -> Option<NaiveDateTime> {
        let raw = raw?;
        match to_plant_local(&raw, self.plant_tz) {
            Ok(ts) => Some(ts),
            Err(e) => {
                warn!(error = %e, "扫码时间戳无效，分钟按 0 处理");
                None
            }
        }
    }

    // ==========================================
    // 同步查询实现
    // ==========================================

    fn query_scan_aggregates(
        &self,
        line_id: i64,
        shift_id: i64,
        customer_id: i64,
        range: ShiftDateRange,
    ) -> RepositoryResult<Vec<ScanAggregateRow>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT
                CAST(strftime('%H', datetime(v.scanned_at, ?6)) AS INTEGER) AS scan_hour,
                o.order_identifier,
                m.production_rate,
                COUNT(v.validation_id) AS validation_count,
                MIN(datetime(v.scanned_at)),
                MAX(datetime(v.scanned_at))
            FROM validation_result v
            JOIN station s ON s.station_id = v.station_id
            JOIN line l ON l.line_id = s.line_id
            JOIN production_order o ON o.order_id = v.order_id
            JOIN material m ON m.material_id = o.material_id
            WHERE s.line_id = ?1
              AND v.shift_id = ?2
              AND l.customer_id = ?3
              AND v.is_valid = 1
              AND datetime(v.scanned_at) >= ?4
              AND datetime(v.scanned_at) < ?5
            GROUP BY scan_hour, o.order_id
            ORDER BY scan_hour, o.created_at DESC, o.order_id DESC
            "#,
        )?;

        let raw_rows = stmt
            .query_map(
                params![
                    line_id,
                    shift_id,
                    customer_id,
                    to_utc_string(range.start, self.plant_tz),
                    to_utc_string(range.end, self.plant_tz),
                    self.local_modifier(),
                ],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, i64>(3)?,
                        row.get::<_, Option<String>>(4)?,
                        row.get::<_, Option<String>>(5)?,
                    ))
                },
            )?
            .collect::<Result<Vec<_>, _>>()?;

        let rows = raw_rows
            .into_iter()
            .map(|(hour, order_identifier, rate, count, min, max)| {
                let hour = u32::try_from(hour).map_err(|_| RepositoryError::FieldValueError {
                    field: "scan_hour".to_string(),
                    message: format!("小时越界: {}", hour),
                })?;
                Ok(ScanAggregateRow {
                    hour,
                    order_identifier,
                    production_rate: rate,
                    validation_count: count,
                    min_scan_at: self.parse_scan_time(min),
                    max_scan_at: self.parse_scan_time(max),
                })
            })
            .collect::<RepositoryResult<Vec<_>>>()?;

        let unparseable = count_unparseable_scans(&conn, line_id, shift_id, customer_id)?;
        if unparseable > 0 {
            warn!(
                line_id,
                shift_id,
                unparseable,
                "存在无法识别的扫码时间戳，已排除在班次统计之外"
            );
        }

        debug!(line_id, shift_id, rows = rows.len(), "扫码小时聚合查询完成");
        Ok(rows)
    }

    fn query_station_aggregates(
        &self,
        line_id: i64,
        shift_id: i64,
        customer_id: i64,
        reference_at: NaiveDateTime,
    ) -> RepositoryResult<Vec<StationAggregateRow>> {
        let conn = self.get_conn()?;

        let shift_times: Option<(String, String)> = conn
            .query_row(
                "SELECT start_time, end_time FROM shift WHERE shift_id = ?1 AND line_id = ?2",
                params![shift_id, line_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        let (start, end) = shift_times.ok_or_else(|| RepositoryError::NotFound {
            entity: "shift".to_string(),
            id: shift_id.to_string(),
        })?;

        let range = resolve_shift_date_range(&shift_window_at(&start, &end, reference_at));
        let remaining_minutes = (range.end - reference_at).num_minutes().max(0);

        let mut stmt = conn.prepare(
            r#"
            SELECT
                s.station_id,
                o.order_identifier,
                COUNT(v.validation_id) AS validation_count,
                MIN(datetime(v.scanned_at)),
                MAX(datetime(v.scanned_at)) AS last_scan,
                m.production_rate
            FROM validation_result v
            JOIN station s ON s.station_id = v.station_id
            JOIN line l ON l.line_id = s.line_id
            JOIN production_order o ON o.order_id = v.order_id
            JOIN material m ON m.material_id = o.material_id
            WHERE s.line_id = ?1
              AND v.shift_id = ?2
              AND l.customer_id = ?3
              AND v.is_valid = 1
              AND datetime(v.scanned_at) >= ?4
              AND datetime(v.scanned_at) < ?5
            GROUP BY s.station_id, o.order_id
            ORDER BY s.station_id, last_scan DESC
            "#,
        )?;

        let raw_rows = stmt
            .query_map(
                params![
                    line_id,
                    shift_id,
                    customer_id,
                    to_utc_string(range.start, self.plant_tz),
                    to_utc_string(range.end, self.plant_tz),
                ],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, Option<String>>(3)?,
                        row.get::<_, Option<String>>(4)?,
                        row.get::<_, i64>(5)?,
                    ))
                },
            )?
            .collect::<Result<Vec<_>, _>>()?;

        let rows: Vec<StationAggregateRow> = raw_rows
            .into_iter()
            .map(
                |(station_id, order_identifier, count, min, max, rate)| StationAggregateRow {
                    station_id,
                    order_identifier,
                    validation_count: count,
                    min_scan_at: self.parse_scan_time(min),
                    max_scan_at: self.parse_scan_time(max),
                    remaining_minutes,
                    production_rate: rate,
                },
            )
            .collect();

        debug!(
            line_id,
            shift_id,
            rows = rows.len(),
            remaining_minutes,
            "工位当班聚合查询完成"
        );
        Ok(rows)
    }

    fn query_active_shifts(&self, customer_id: i64) -> RepositoryResult<Vec<ActiveShift>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT
                sh.shift_id,
                sh.shift_name,
                sh.start_time,
                sh.end_time,
                l.line_id,
                l.line_name,
                l.active,
                c.customer_id,
                c.customer_name,
                (SELECT COUNT(*) FROM station st
                  WHERE st.line_id = l.line_id AND st.operating = 1) AS operating_stations,
                (SELECT COUNT(*) FROM station st
                  WHERE st.line_id = l.line_id AND st.operating = 1
                    AND EXISTS (
                        SELECT 1 FROM stop_cause_log sc
                        WHERE sc.station_id = st.station_id AND sc.status = 'OPEN'
                    )) AS stopped_stations
            FROM shift sh
            JOIN line l ON l.line_id = sh.line_id
            JOIN customer c ON c.customer_id = l.customer_id
            WHERE c.customer_id = ?1
              AND sh.active = 1
            ORDER BY l.line_id, sh.start_time, sh.shift_id
            "#,
        )?;

        let shifts = stmt
            .query_map(params![customer_id], |row| {
                let operating: i64 = row.get(9)?;
                let stopped: i64 = row.get(10)?;
                Ok(ActiveShift {
                    shift_id: row.get(0)?,
                    shift_name: row.get(1)?,
                    start_time_of_day: row.get(2)?,
                    end_time_of_day: row.get(3)?,
                    line: LineMeta {
                        line_id: row.get(4)?,
                        line_name: row.get(5)?,
                        active: row.get(6)?,
                        blocked: operating > 0 && stopped == operating,
                        customer_id: row.get(7)?,
                        customer_name: row.get(8)?,
                    },
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        debug!(customer_id, shifts = shifts.len(), "启用班次查询完成");
        Ok(shifts)
    }
}

/// 统计 SQLite 无法识别的扫码时间戳（datetime() 返回 NULL）
fn count_unparseable_scans(
    conn: &Connection,
    line_id: i64,
    shift_id: i64,
    customer_id: i64,
) -> RepositoryResult<i64> {
    let count = conn.query_row(
        r#"
        SELECT COUNT(*)
        FROM validation_result v
        JOIN station s ON s.station_id = v.station_id
        JOIN line l ON l.line_id = s.line_id
        WHERE s.line_id = ?1
          AND v.shift_id = ?2
          AND l.customer_id = ?3
          AND v.is_valid = 1
          AND datetime(v.scanned_at) IS NULL
        "#,
        params![line_id, shift_id, customer_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

#[async_trait]
impl ProductionDataSource for SqliteProductionRepository {
    #[instrument(skip(self))]
    async fn fetch_scan_aggregates_for_line_and_shift(
        &self,
        line_id: i64,
        shift_id: i64,
        customer_id: i64,
        range: ShiftDateRange,
    ) -> RepositoryResult<Vec<ScanAggregateRow>> {
        self.query_scan_aggregates(line_id, shift_id, customer_id, range)
    }

    #[instrument(skip(self))]
    async fn fetch_station_aggregates_for_line_and_shift(
        &self,
        line_id: i64,
        shift_id: i64,
        customer_id: i64,
        reference_at: NaiveDateTime,
    ) -> RepositoryResult<Vec<StationAggregateRow>> {
        self.query_station_aggregates(line_id, shift_id, customer_id, reference_at)
    }

    #[instrument(skip(self))]
    async fn fetch_active_shifts_for_customer(
        &self,
        customer_id: i64,
    ) -> RepositoryResult<Vec<ActiveShift>> {
        self.query_active_shifts(customer_id)
    }
}
