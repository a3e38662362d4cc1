// ==========================================
// 产线驾驶舱 - 班次领域模型
// ==========================================
// 职责: 班次时间窗与当班产线元数据
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::line::LineMeta;

// ==========================================
// ShiftWindow - 班次时间窗
// ==========================================
// 约束: 若开始时刻(秒) > 结束时刻(秒)，班次跨越午夜，结束日期 = 参考日期 + 1 天
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftWindow {
    pub start_time_of_day: String, // "HH:mm[:ss]"
    pub end_time_of_day: String,   // "HH:mm[:ss]"
    pub reference_date: NaiveDate, // 班次开始的日历日
}

impl ShiftWindow {
    pub fn new(start: &str, end: &str, reference_date: NaiveDate) -> Self {
        Self {
            start_time_of_day: start.to_string(),
            end_time_of_day: end.to_string(),
            reference_date,
        }
    }
}

// ==========================================
// ShiftDateRange - 班次实例的具体起止时间（工厂本地时间）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftDateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

// ==========================================
// ActiveShift - 客户下启用的班次及其产线
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveShift {
    pub shift_id: i64,
    pub shift_name: String,
    pub start_time_of_day: String,
    pub end_time_of_day: String,
    pub line: LineMeta,
}

impl ActiveShift {
    /// 以给定日期作为参考日期构造时间窗
    pub fn window_on(&self, reference_date: NaiveDate) -> ShiftWindow {
        ShiftWindow::new(&self.start_time_of_day, &self.end_time_of_day, reference_date)
    }
}
