// ==========================================
// 产线驾驶舱 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 引擎层错误均可本地恢复（小时按 0、分钟按 0 处理），
//       仅在需要区分原因时向调用方暴露
// ==========================================

use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// 班次时刻字符串不符合 H|HH[:mm[:ss]]
    #[error("班次时刻格式错误: input={input}")]
    MalformedTimeString { input: String },

    /// 扫码时间戳无法解析或换算到工厂时区
    #[error("扫码时间戳无效: raw={raw}")]
    InvalidTimestamp { raw: String },
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
