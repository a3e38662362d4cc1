// ==========================================
// 产线驾驶舱 - 引擎层
// ==========================================
// 职责: 产量对账计算（班次时间窗、产能分摊、产线聚合、达成率）
// 红线: Engine 不拼 SQL, 不读系统时钟, 不持有跨调用的可变状态
// ==========================================

pub mod apportionment;
pub mod compliance;
pub mod error;
pub mod line_aggregator;
pub mod time_window;

// 重导出核心引擎
pub use apportionment::{
    compute_series_for_hours, reconcile_hour, reference_order, HourReconciliation, HourSegment,
    RateApportionmentEngine,
};
pub use compliance::{
    capped_compliance_rate, compute_compliance_rate, compute_goal, compute_shift_goal,
};
pub use error::{EngineError, EngineResult};
pub use line_aggregator::{LineAggregator, StationSummary};
pub use time_window::{
    crosses_midnight, is_in_progress, parse_scan_timestamp, parse_time_of_day, plant_timezone,
    resolve_shift_date_range, resolve_shift_end_datetime, resolve_shift_hour,
    resolve_shift_start_date, resolve_shift_start_datetime, shift_hours, shift_window_at,
};
