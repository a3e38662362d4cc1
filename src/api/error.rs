// ==========================================
// 产线驾驶舱 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，将数据访问层的失败统一转换为计算失败
// 说明: 对账引擎内的可恢复情况（时刻格式错误/无数据/时间戳无效）不会出现在这里
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 请求错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    /// 数据访问协作者失败，本层不重试
    #[error("产线状态计算失败: {0}")]
    ComputationFailed(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),
}

impl ApiError {
    /// 边界层映射的 HTTP 状态码
    pub fn http_status(&self) -> u16 {
        match self {
            ApiError::InvalidInput(_) => 400,
            ApiError::NotFound(_) => 404,
            ApiError::ComputationFailed(_) | ApiError::InternalError(_) => 500,
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// 目的: 数据访问层的任何失败都作为一次计算失败上抛
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        ApiError::ComputationFailed(err.to_string())
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
