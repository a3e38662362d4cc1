// ==========================================
// 产线驾驶舱 - 生产数据访问 Trait
// ==========================================
// 职责: 定义对账引擎所需的只读数据访问接口（不包含实现）
// 红线: Repository 不含业务规则，只返回查询快照
// ==========================================

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::domain::{ActiveShift, ScanAggregateRow, ShiftDateRange, StationAggregateRow};
use crate::repository::error::RepositoryResult;

// ==========================================
// ProductionDataSource Trait
// ==========================================
// 用途: 对账引擎的外部协作者
// 实现者: SqliteProductionRepository（使用 rusqlite）
#[async_trait]
pub trait ProductionDataSource: Send + Sync {
    /// 查询班次时间范围内按 (小时, 订单) 聚合的扫码行
    ///
    /// # 返回
    /// - 同一小时内按订单新旧降序（最新订单在前）
    /// - 时间戳为工厂本地时间
    async fn fetch_scan_aggregates_for_line_and_shift(
        &self,
        line_id: i64,
        shift_id: i64,
        customer_id: i64,
        range: ShiftDateRange,
    ) -> RepositoryResult<Vec<ScanAggregateRow>>;

    /// 查询参考时刻所属班次实例内按 (工位, 订单) 聚合的扫码行
    ///
    /// # 参数
    /// - reference_at: 参考时刻（工厂本地时间），其日期即参考日期，
    ///   同时用于计算距班次结束的剩余分钟
    async fn fetch_station_aggregates_for_line_and_shift(
        &self,
        line_id: i64,
        shift_id: i64,
        customer_id: i64,
        reference_at: NaiveDateTime,
    ) -> RepositoryResult<Vec<StationAggregateRow>>;

    /// 查询客户下所有启用的班次（附带产线元数据与阻断标志）
    async fn fetch_active_shifts_for_customer(
        &self,
        customer_id: i64,
    ) -> RepositoryResult<Vec<ActiveShift>>;
}
