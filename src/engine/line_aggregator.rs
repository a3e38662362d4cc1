// ==========================================
// 产线驾驶舱 - 产线状态聚合
// ==========================================
// 职责: 将各工位当班扫码聚合行合并为产线状态
//       （验证总数、目标、达成率、阻断/启用标志、可选图表序列）
// 口径:
// - 无当班数据: 数量/目标/达成率均为 0，元数据原样透传
// - 工位目标 = floor(剩余小时 × 参考行产能) + 除参考行外各行验证数之和
// - 工位达成率 = 封顶达成率(工位验证总数, 工位目标)
// - 产线数值 = 各工位数值之和（达成率同样求和，不按总量重算）
// ==========================================

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::{HourlySeries, LineMeta, LineStatus, StationAggregateRow};
use crate::engine::compliance::{capped_compliance_rate, compute_goal};

// ==========================================
// StationSummary - 单工位汇总
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationSummary {
    pub station_id: i64,
    pub validation_count: i64,
    pub goal: f64,
    pub rate: i64,
}

/// 按工位分组，保持工位首次出现的顺序
pub fn group_by_station(rows: &[StationAggregateRow]) -> Vec<(i64, Vec<&StationAggregateRow>)> {
    let mut index: HashMap<i64, usize> = HashMap::new();
    let mut groups: Vec<(i64, Vec<&StationAggregateRow>)> = Vec::new();

    for row in rows {
        match index.get(&row.station_id) {
            Some(&i) => groups[i].1.push(row),
            None => {
                index.insert(row.station_id, groups.len());
                groups.push((row.station_id, vec![row]));
            }
        }
    }

    groups
}

/// 汇总单个工位
///
/// 组内按末次扫码时间降序（稳定）排序后，第一行为参考行
pub fn summarize_station(
    station_id: i64,
    mut rows: Vec<&StationAggregateRow>,
) -> Option<StationSummary> {
    rows.sort_by(|a, b| b.max_scan_at.cmp(&a.max_scan_at));
    let (reference, earlier) = rows.split_first()?;

    let shift_hours_remaining = reference.remaining_minutes as f64 / 60.0;
    let carried: i64 = earlier.iter().map(|r| r.validation_count).sum();
    let goal = compute_goal(shift_hours_remaining, reference.production_rate as f64).floor()
        + carried as f64;
    let validation_count = reference.validation_count + carried;

    Some(StationSummary {
        station_id,
        validation_count,
        goal,
        rate: capped_compliance_rate(validation_count, goal),
    })
}

// ==========================================
// LineAggregator - 产线状态聚合器
// ==========================================
pub struct LineAggregator;

impl LineAggregator {
    /// 计算产线状态
    ///
    /// # 参数
    /// - station_rows: 各工位当班扫码聚合行
    /// - meta: 产线/客户元数据（含阻断标志）
    #[instrument(skip(station_rows, meta), fields(line_id = meta.line_id, row_count = station_rows.len()))]
    pub fn compute_line_status(station_rows: &[StationAggregateRow], meta: &LineMeta) -> LineStatus {
        if station_rows.is_empty() {
            debug!("当班无扫码数据，使用默认产线状态");
            return LineStatus::empty(meta);
        }

        let summaries: Vec<StationSummary> = group_by_station(station_rows)
            .into_iter()
            .filter_map(|(station_id, rows)| summarize_station(station_id, rows))
            .collect();

        let mut status = LineStatus::empty(meta);
        for summary in &summaries {
            status.validation_result_count += summary.validation_count;
            status.goal += summary.goal;
            status.rate += summary.rate;
        }

        debug!(
            stations = summaries.len(),
            validation_result_count = status.validation_result_count,
            goal = status.goal,
            rate = status.rate,
            "产线状态聚合完成"
        );

        status
    }

    /// 计算产线状态并附带小时图表序列
    pub fn compute_line_status_with_chart(
        station_rows: &[StationAggregateRow],
        meta: &LineMeta,
        chart_data: HourlySeries,
    ) -> LineStatus {
        let mut status = Self::compute_line_status(station_rows, meta);
        status.chart_data = Some(chart_data);
        status
    }
}
