// ==========================================
// 产线驾驶舱 - 目标与达成率计算
// ==========================================
// 职责: 目标 = 剩余班次小时 × 物料产能；达成率 = 验证数 / 目标 × 100
// 红线: 达成率有两种口径，调用点不可混用
//   - compute_compliance_rate: 不封顶（可超过 100）
//   - capped_compliance_rate:  产线聚合口径，封顶 100
// ==========================================

/// 目标数量
pub fn compute_goal(shift_hours_remaining: f64, production_rate: f64) -> f64 {
    shift_hours_remaining * production_rate
}

/// 产线当班目标: 所有活跃订单目标之和
///
/// 每个元素为 (剩余班次小时, 物料产能)
pub fn compute_shift_goal<I>(orders: I) -> f64
where
    I: IntoIterator<Item = (f64, f64)>,
{
    orders
        .into_iter()
        .map(|(hours, rate)| compute_goal(hours, rate))
        .sum()
}

/// 达成率（不封顶）
///
/// 目标为 0 时返回 0
pub fn compute_compliance_rate(validation_count: i64, goal: f64) -> i64 {
    if goal == 0.0 {
        return 0;
    }
    (validation_count as f64 / goal * 100.0).ceil() as i64
}

/// 达成率（封顶 100，产线聚合使用）
pub fn capped_compliance_rate(validation_count: i64, goal: f64) -> i64 {
    compute_compliance_rate(validation_count, goal).min(100)
}
