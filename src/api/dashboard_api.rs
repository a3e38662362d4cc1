// ==========================================
// 产线驾驶舱 - 看板 API
// ==========================================
// 职责: 组合数据访问层与对账引擎，输出产线状态与小时图表序列
// 架构: API 层 → ProductionDataSource (查询快照) → Engine (纯计算)
// 说明: 不同产线的计算相互独立，列表接口并发发起、统一等待
// ==========================================

use std::sync::Arc;

use chrono::NaiveDateTime;
use futures::future::try_join_all;
use tracing::{debug, info, instrument};

use crate::api::error::{ApiError, ApiResult};
use crate::config::DashboardConfig;
use crate::domain::{ActiveShift, HourlySeries, LineMeta, LineStatus, StationAggregateRow};
use crate::engine::line_aggregator::LineAggregator;
use crate::engine::time_window::{is_in_progress, resolve_shift_date_range, shift_window_at};
use crate::engine::RateApportionmentEngine;
use crate::repository::ProductionDataSource;

// ==========================================
// DashboardApi - 看板 API
// ==========================================
pub struct DashboardApi {
    /// 数据访问协作者
    data_source: Arc<dyn ProductionDataSource>,
    /// 产能分摊引擎（持有工厂时区）
    engine: RateApportionmentEngine,
    /// 看板配置
    config: DashboardConfig,
}

impl DashboardApi {
    /// 创建新的 DashboardApi 实例
    pub fn new(data_source: Arc<dyn ProductionDataSource>, config: DashboardConfig) -> Self {
        Self {
            data_source,
            engine: RateApportionmentEngine::new(config.plant_utc_offset_minutes),
            config,
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    // ==========================================
    // 纯计算接口
    // ==========================================

    /// 由产线元数据与工位聚合行计算产线状态（不访问数据源）
    pub fn compute_line_status(station_rows: &[StationAggregateRow], meta: &LineMeta) -> LineStatus {
        LineAggregator::compute_line_status(station_rows, meta)
    }

    // ==========================================
    // 查询接口
    // ==========================================

    /// 查询班次的小时图表序列
    ///
    /// # 参数
    /// - customer_id / line_id / shift_id: 查询范围
    /// - reference_at: 参考时刻（工厂本地时间），决定班次实例
    ///
    /// # 返回
    /// - Ok(HourlySeries): 小时序列
    /// - Err(ApiError::NotFound): 班次不属于该客户/产线或未启用
    /// - Err(ApiError::ComputationFailed): 数据访问失败
    #[instrument(skip(self))]
    pub async fn get_hourly_series(
        &self,
        customer_id: i64,
        line_id: i64,
        shift_id: i64,
        reference_at: NaiveDateTime,
    ) -> ApiResult<HourlySeries> {
        validate_id("customer_id", customer_id)?;
        validate_id("line_id", line_id)?;

        let shifts = self
            .data_source
            .fetch_active_shifts_for_customer(customer_id)
            .await?;
        let shift = shifts
            .iter()
            .find(|s| s.shift_id == shift_id && s.line.line_id == line_id)
            .ok_or_else(|| {
                ApiError::NotFound(format!(
                    "班次(id={})不属于产线(id={})或未启用",
                    shift_id, line_id
                ))
            })?;

        self.hourly_series_for_shift(customer_id, shift, reference_at)
            .await
    }

    /// 查询单条产线的状态
    ///
    /// # 参数
    /// - include_chart: 是否附带小时图表；None 时按配置
    #[instrument(skip(self))]
    pub async fn get_line_status(
        &self,
        customer_id: i64,
        line_id: i64,
        reference_at: NaiveDateTime,
        include_chart: Option<bool>,
    ) -> ApiResult<LineStatus> {
        validate_id("customer_id", customer_id)?;
        validate_id("line_id", line_id)?;

        let shifts: Vec<ActiveShift> = self
            .data_source
            .fetch_active_shifts_for_customer(customer_id)
            .await?
            .into_iter()
            .filter(|s| s.line.line_id == line_id)
            .collect();

        if shifts.is_empty() {
            return Err(ApiError::NotFound(format!(
                "产线(id={})不属于客户(id={})或无启用班次",
                line_id, customer_id
            )));
        }

        let include_chart = include_chart.unwrap_or(self.config.include_chart_data);
        self.status_for_line(customer_id, &shifts, reference_at, include_chart)
            .await
    }

    /// 查询客户下所有产线的状态
    ///
    /// 各产线并发计算；任一产线的数据访问失败时整体失败
    #[instrument(skip(self))]
    pub async fn list_line_statuses(
        &self,
        customer_id: i64,
        reference_at: NaiveDateTime,
        include_chart: Option<bool>,
    ) -> ApiResult<Vec<LineStatus>> {
        validate_id("customer_id", customer_id)?;

        let shifts = self
            .data_source
            .fetch_active_shifts_for_customer(customer_id)
            .await?;
        let lines = group_shifts_by_line(shifts);
        let include_chart = include_chart.unwrap_or(self.config.include_chart_data);

        let statuses = try_join_all(lines.iter().map(|line_shifts| {
            self.status_for_line(customer_id, line_shifts, reference_at, include_chart)
        }))
        .await?;

        info!(customer_id, lines = statuses.len(), "产线状态列表计算完成");
        Ok(statuses)
    }

    // ==========================================
    // 内部实现
    // ==========================================

    async fn hourly_series_for_shift(
        &self,
        customer_id: i64,
        shift: &ActiveShift,
        reference_at: NaiveDateTime,
    ) -> ApiResult<HourlySeries> {
        let window = shift_window_at(&shift.start_time_of_day, &shift.end_time_of_day, reference_at);
        let range = resolve_shift_date_range(&window);

        let rows = self
            .data_source
            .fetch_scan_aggregates_for_line_and_shift(
                shift.line.line_id,
                shift.shift_id,
                customer_id,
                range,
            )
            .await?;

        Ok(self.engine.compute_for_window(&rows, &window))
    }

    /// 计算单条产线状态
    ///
    /// `shifts` 为同一产线的启用班次；参考时刻不在任何班次内时走默认路径
    async fn status_for_line(
        &self,
        customer_id: i64,
        shifts: &[ActiveShift],
        reference_at: NaiveDateTime,
        include_chart: bool,
    ) -> ApiResult<LineStatus> {
        let meta = match shifts.first() {
            Some(s) => &s.line,
            None => return Err(ApiError::InternalError("产线班次列表为空".to_string())),
        };

        let current = shifts
            .iter()
            .find(|s| is_in_progress(&s.start_time_of_day, &s.end_time_of_day, reference_at));

        let shift = match current {
            Some(shift) => shift,
            None => {
                debug!(line_id = meta.line_id, "参考时刻不在任何班次内，使用默认产线状态");
                return Ok(LineStatus::empty(meta));
            }
        };

        let station_rows = self.data_source.fetch_station_aggregates_for_line_and_shift(
            shift.line.line_id,
            shift.shift_id,
            customer_id,
            reference_at,
        );

        if !include_chart {
            let station_rows = station_rows.await?;
            return Ok(LineAggregator::compute_line_status(&station_rows, &shift.line));
        }

        let (station_rows, chart_data) = futures::try_join!(
            async { station_rows.await.map_err(ApiError::from) },
            self.hourly_series_for_shift(customer_id, shift, reference_at),
        )?;

        Ok(LineAggregator::compute_line_status_with_chart(
            &station_rows,
            &shift.line,
            chart_data,
        ))
    }
}

/// 按产线分组启用班次，保持产线首次出现的顺序
fn group_shifts_by_line(shifts: Vec<ActiveShift>) -> Vec<Vec<ActiveShift>> {
    let mut lines: Vec<Vec<ActiveShift>> = Vec::new();
    for shift in shifts {
        match lines
            .iter_mut()
            .find(|group| group[0].line.line_id == shift.line.line_id)
        {
            Some(group) => group.push(shift),
            None => lines.push(vec![shift]),
        }
    }
    lines
}

fn validate_id(field: &str, id: i64) -> ApiResult<()> {
    if id <= 0 {
        return Err(ApiError::InvalidInput(format!("{}必须为正整数: {}", field, id)));
    }
    Ok(())
}
