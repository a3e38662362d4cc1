// ==========================================
// 产线驾驶舱 - 扫码聚合行领域模型
// ==========================================
// 职责: 描述数据访问层返回的扫码聚合结果（只读快照）
// 红线: 本层不做任何计算，计算全部在 engine 层完成
// ==========================================

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

// ==========================================
// ScanAggregateRow - 按 (小时, 订单) 聚合的扫码行
// ==========================================
// 同一小时内可能有多行（每个活跃订单/物料一行）
// 时间戳为工厂本地时间；None 表示时间戳无法解析/换算
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanAggregateRow {
    pub hour: u32,                          // 时钟小时 (0-23)
    pub order_identifier: String,           // 订单标识
    pub production_rate: i64,               // 物料产能 (件/小时)
    pub validation_count: i64,              // 该小时该订单验证通过的数量
    pub min_scan_at: Option<NaiveDateTime>, // 该小时内首次扫码时间
    pub max_scan_at: Option<NaiveDateTime>, // 该小时内末次扫码时间
}

impl ScanAggregateRow {
    /// 首次扫码所在分钟（无效时间戳按 0 处理）
    pub fn min_minute(&self) -> u32 {
        minute_of_hour(self.min_scan_at)
    }

    /// 末次扫码所在分钟（无效时间戳按 0 处理）
    pub fn max_minute(&self) -> u32 {
        minute_of_hour(self.max_scan_at)
    }

    /// 首末扫码之间的活跃分钟数（不足一分钟向上取整）
    ///
    /// 任一时间戳缺失、或末次早于首次时返回 0
    pub fn active_minutes(&self) -> i64 {
        match (self.min_scan_at, self.max_scan_at) {
            (Some(min), Some(max)) if max > min => {
                let seconds = (max - min).num_seconds();
                (seconds + 59) / 60
            }
            _ => 0,
        }
    }
}

// ==========================================
// StationAggregateRow - 按 (工位, 订单) 聚合的当班扫码行
// ==========================================
// 同一工位的多行按末次扫码时间降序排列时，第一行为最新订单
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationAggregateRow {
    pub station_id: i64,                    // 工位ID
    pub order_identifier: String,           // 订单标识
    pub validation_count: i64,              // 验证通过数量
    pub min_scan_at: Option<NaiveDateTime>, // 首次扫码时间
    pub max_scan_at: Option<NaiveDateTime>, // 末次扫码时间
    pub remaining_minutes: i64,             // 距离班次结束的剩余分钟
    pub production_rate: i64,               // 物料产能 (件/小时)
}

/// 提取时间戳的分钟数；缺失时返回 0
pub fn minute_of_hour(ts: Option<NaiveDateTime>) -> u32 {
    ts.map(|t| t.minute()).unwrap_or(0)
}
