// ==========================================
// 产线驾驶舱 - 产线状态领域模型
// ==========================================
// 职责: 产线元数据、产线状态与小时图表序列（输出对象）
// 生命周期: 每次请求临时计算，不持久化
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// LineMeta - 产线/客户元数据
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineMeta {
    pub line_id: i64,
    pub line_name: String,
    pub active: bool,
    pub blocked: bool, // 所有运行中工位均有未关闭的停机原因记录
    pub customer_id: i64,
    pub customer_name: String,
}

// ==========================================
// HourlySeries - 按小时的图表序列
// ==========================================
// 约束: 三个序列长度一致，等于班次覆盖的小时数（含首尾）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlySeries {
    pub hours: Vec<u32>,
    pub validation_counts: Vec<i64>,
    pub production_rates: Vec<f64>,
}

impl HourlySeries {
    pub fn with_capacity(len: usize) -> Self {
        Self {
            hours: Vec::with_capacity(len),
            validation_counts: Vec::with_capacity(len),
            production_rates: Vec::with_capacity(len),
        }
    }

    /// 追加一个小时的数据点
    pub fn push(&mut self, hour: u32, validation_count: i64, production_rate: f64) {
        self.hours.push(hour);
        self.validation_counts.push(validation_count);
        self.production_rates.push(production_rate);
    }

    pub fn len(&self) -> usize {
        self.hours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hours.is_empty()
    }

    /// 查询某个小时的 (数量, 目标) 数据点
    pub fn point(&self, hour: u32) -> Option<(i64, f64)> {
        let idx = self.hours.iter().position(|h| *h == hour)?;
        Some((self.validation_counts[idx], self.production_rates[idx]))
    }
}

// ==========================================
// LineStatus - 产线状态
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineStatus {
    pub line_id: i64,
    pub line_name: String,
    pub active: bool,
    pub blocked: bool,
    pub customer_id: i64,
    pub customer_name: String,
    pub validation_result_count: i64,
    pub goal: f64,
    pub rate: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_data: Option<HourlySeries>,
}

impl LineStatus {
    /// 无当班数据时的默认状态（数量/目标/达成率均为 0）
    pub fn empty(meta: &LineMeta) -> Self {
        Self {
            line_id: meta.line_id,
            line_name: meta.line_name.clone(),
            active: meta.active,
            blocked: meta.blocked,
            customer_id: meta.customer_id,
            customer_name: meta.customer_name.clone(),
            validation_result_count: 0,
            goal: 0.0,
            rate: 0,
            chart_data: None,
        }
    }
}
