//! Echo Refiner - 开发模式下的润色器
//!
//! 不调用任何外部服务，把原文包上标记后原样返回

use std::time::Duration;

use async_trait::async_trait;

use crate::application::ports::{ensure_refined, RefineError, RefinerPort};

/// 标记头
pub const DEV_MODE_BANNER: &str = "[DEV MODE]";

#[derive(Debug, Clone, Default)]
pub struct EchoRefiner {
    /// 模拟的服务延迟
    latency: Duration,
}

impl EchoRefiner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self { latency }
    }
}

#[async_trait]
impl RefinerPort for EchoRefiner {
    async fn refine(&self, raw_text: &str) -> Result<String, RefineError> {
        tracing::debug!(text_len = raw_text.len(), "EchoRefiner: returning mock output");

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if raw_text.trim().is_empty() {
            return Err(RefineError::EmptyOutput);
        }

        ensure_refined(format!(
            "{DEV_MODE_BANNER}\n--- BEGIN ORIGINAL ---\n{}\n--- END ORIGINAL ---",
            raw_text.trim()
        ))
    }

    fn name(&self) -> &'static str {
        "echo"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_echo_wraps_input() {
        let output = EchoRefiner::new().refine("  hello \n").await.unwrap();
        assert!(output.starts_with(DEV_MODE_BANNER));
        assert!(output.contains("\nhello\n"));
    }

    #[tokio::test]
    async fn test_blank_input_is_empty_output() {
        let result = EchoRefiner::new().refine(" \n ").await;
        assert_eq!(result, Err(RefineError::EmptyOutput));
    }
}
