//! Refiner Port - 译文润色服务抽象
//!
//! 把机翻原文交给外部语言模型润色，具体实现在 infrastructure/adapters/refiner

use async_trait::async_trait;
use thiserror::Error;

/// 润色错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefineError {
    /// 服务返回了空内容，可以原样重试
    #[error("Refinement returned empty output")]
    EmptyOutput,

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: {0}")]
    Service(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("No API key configured")]
    NoApiKey,
}

impl RefineError {
    /// 是否可以由用户原样重试且不中断批处理
    pub fn is_retryable(&self) -> bool {
        matches!(self, RefineError::EmptyOutput)
    }
}

/// 空白输出视为失败
pub fn ensure_refined(output: String) -> Result<String, RefineError> {
    if output.trim().is_empty() {
        Err(RefineError::EmptyOutput)
    } else {
        Ok(output)
    }
}

/// Refiner Port
#[async_trait]
pub trait RefinerPort: Send + Sync {
    /// 润色一段原文，空输出返回 `RefineError::EmptyOutput`
    async fn refine(&self, raw_text: &str) -> Result<String, RefineError>;

    /// 检查服务是否可用
    async fn health_check(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str;
}
