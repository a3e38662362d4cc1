// ==========================================
// 产线驾驶舱 - 产能分摊引擎
// ==========================================
// 职责: 将 (小时, 订单) 扫码聚合行转换为班次内逐小时的
//       (验证数, 分摊目标) 序列，供看板图表使用
// 输入: ScanAggregateRow 列表 + 班次起止时刻
// 输出: HourlySeries
// ==========================================
// 分摊口径（取整方式不可改动）:
// - 一小时被拆分为若干分段，每段贡献一个目标值，小时目标 = 分段之和
// - 0/1 个订单: 整小时分段，产能取"参考订单"的产能
// - ≥2 个订单: 首段 + 中间段 + 尾段
//   首段 = ceil(产能 × 末次扫码分钟 / 60)
//   尾段 = ceil(产能 × (60 - 首次扫码分钟) / 60)
//   中间段 = floor(活跃分钟 × 产能 / 60)
// - ≥3 个订单且产能全部相同: 整小时分段，产能取该共同产能
// ==========================================

use chrono::{FixedOffset, NaiveDate};
use tracing::{debug, instrument, trace};

use crate::domain::{HourlySeries, ScanAggregateRow, ShiftWindow};
use crate::engine::time_window::{plant_timezone, resolve_shift_hour, shift_hours};

// ==========================================
// HourSegment - 小时内的产能分段
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HourSegment {
    /// 整小时按同一产能计
    WholeHour { rate: i64 },
    /// 从整点到换型点（末次扫码分钟）
    Head { rate: i64, until_minute: u32 },
    /// 两次换型之间，按首末扫码的活跃分钟计
    Interior { rate: i64, active_minutes: i64 },
    /// 从换型点（首次扫码分钟）到整点结束
    Tail { rate: i64, from_minute: u32 },
}

impl HourSegment {
    /// 分段的目标贡献
    pub fn contribution(&self) -> f64 {
        match *self {
            HourSegment::WholeHour { rate } => rate as f64,
            HourSegment::Head { rate, until_minute } => {
                (rate as f64 * f64::from(until_minute) / 60.0).ceil()
            }
            HourSegment::Interior {
                rate,
                active_minutes,
            } => (active_minutes as f64 * rate as f64 / 60.0).floor(),
            HourSegment::Tail { rate, from_minute } => {
                (rate as f64 * f64::from(60 - from_minute.min(60)) / 60.0).ceil()
            }
        }
    }
}

// ==========================================
// HourReconciliation - 单小时对账结果
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct HourReconciliation {
    pub hour: u32,
    pub order_count: usize,
    pub validation_count: i64,
    pub production_rate: f64,
    pub segments: Vec<HourSegment>,
}

// ==========================================
// 纯函数
// ==========================================

/// 参考订单: 整个结果集中首次扫码时间最早的行
///
/// 缺少时间戳的行不参与比较；全部缺失时取结果集最后一行
pub fn reference_order(rows: &[ScanAggregateRow]) -> Option<&ScanAggregateRow> {
    rows.iter()
        .filter(|r| r.min_scan_at.is_some())
        .min_by_key(|r| r.min_scan_at)
        .or_else(|| rows.last())
}

/// 将一个小时的订单行划分为产能分段
///
/// `rows` 须已按末次扫码时间降序排列（最近的订单在前）
pub fn partition_hour(rows: &[&ScanAggregateRow], reference_rate: i64) -> Vec<HourSegment> {
    match rows {
        [] | [_] => vec![HourSegment::WholeHour {
            rate: reference_rate,
        }],
        [first, interior @ .., last] => {
            if !interior.is_empty()
                && rows
                    .iter()
                    .all(|r| r.production_rate == first.production_rate)
            {
                return vec![HourSegment::WholeHour {
                    rate: first.production_rate,
                }];
            }

            let mut segments = Vec::with_capacity(rows.len());
            segments.push(HourSegment::Head {
                rate: first.production_rate,
                until_minute: first.max_minute(),
            });
            segments.extend(interior.iter().map(|r| HourSegment::Interior {
                rate: r.production_rate,
                active_minutes: r.active_minutes(),
            }));
            segments.push(HourSegment::Tail {
                rate: last.production_rate,
                from_minute: last.min_minute(),
            });
            segments
        }
    }
}

/// 对账单个小时
pub fn reconcile_hour(
    hour: u32,
    rows: &[ScanAggregateRow],
    reference_rate: i64,
) -> HourReconciliation {
    let mut in_hour: Vec<&ScanAggregateRow> = rows.iter().filter(|r| r.hour == hour).collect();
    // 稳定排序: 末次扫码相同的行保持原有顺序
    in_hour.sort_by(|a, b| b.max_scan_at.cmp(&a.max_scan_at));

    let segments = partition_hour(&in_hour, reference_rate);
    let production_rate: f64 = segments.iter().map(HourSegment::contribution).sum();
    let validation_count: i64 = in_hour.iter().map(|r| r.validation_count).sum();

    trace!(
        hour,
        order_count = in_hour.len(),
        validation_count,
        production_rate,
        "小时对账完成"
    );

    HourReconciliation {
        hour,
        order_count: in_hour.len(),
        validation_count,
        production_rate,
        segments,
    }
}

/// 按给定小时范围生成小时序列
pub fn compute_series_for_hours(
    rows: &[ScanAggregateRow],
    start_hour: u32,
    end_hour: u32,
) -> HourlySeries {
    let reference_rate = reference_order(rows)
        .map(|r| r.production_rate)
        .unwrap_or(0);
    let hours = shift_hours(start_hour, end_hour);

    let mut series = HourlySeries::with_capacity(hours.len());
    for hour in hours {
        let result = reconcile_hour(hour, rows, reference_rate);
        series.push(result.hour, result.validation_count, result.production_rate);
    }
    series
}

// ==========================================
// RateApportionmentEngine - 产能分摊引擎
// ==========================================
pub struct RateApportionmentEngine {
    plant_tz: FixedOffset,
}

impl RateApportionmentEngine {
    /// 创建新的产能分摊引擎
    ///
    /// # 参数
    /// - plant_utc_offset_minutes: 工厂时区相对 UTC 的分钟偏移
    pub fn new(plant_utc_offset_minutes: i32) -> Self {
        Self {
            plant_tz: plant_timezone(plant_utc_offset_minutes),
        }
    }

    pub fn plant_tz(&self) -> FixedOffset {
        self.plant_tz
    }

    /// 计算班次的小时序列
    ///
    /// # 参数
    /// - rows: 扫码聚合行
    /// - shift_start / shift_end: 班次起止时刻 "HH:mm[:ss]"
    /// - reference_date: 班次开始日（用于时区换算）
    ///
    /// # 返回
    /// 覆盖 [开始小时, 结束小时]（含首尾）的序列；时刻格式错误的一端按 0 点处理
    #[instrument(skip(self, rows), fields(row_count = rows.len()))]
    pub fn compute_hourly_series(
        &self,
        rows: &[ScanAggregateRow],
        shift_start: &str,
        shift_end: &str,
        reference_date: NaiveDate,
    ) -> HourlySeries {
        let start_hour = resolve_shift_hour(shift_start, reference_date, self.plant_tz);
        let end_hour = resolve_shift_hour(shift_end, reference_date, self.plant_tz);

        if rows.is_empty() {
            debug!(start_hour, end_hour, "班次内无扫码数据，按零值输出");
        }

        compute_series_for_hours(rows, start_hour, end_hour)
    }

    /// 按班次时间窗计算小时序列
    pub fn compute_for_window(&self, rows: &[ScanAggregateRow], window: &ShiftWindow) -> HourlySeries {
        self.compute_hourly_series(
            rows,
            &window.start_time_of_day,
            &window.end_time_of_day,
            window.reference_date,
        )
    }
}
