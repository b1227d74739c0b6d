//! Gemini Refiner - 调用 Gemini generateContent 接口润色译文
//!
//! 外部 API:
//! POST {base_url}/v1beta/models/{model}:generateContent
//! Header: x-goog-api-key
//! Request: {"systemInstruction": {...}, "contents": [...], "generationConfig": {...}}
//! Response: {"candidates": [{"content": {"parts": [{"text": "..."}]}}]}

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::application::ports::{RefineError, RefinerPort};

/// 默认的系统指令
pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "Bạn là một biên dịch viên chuyên nghiệp. \
Hãy biên tập lại đoạn văn bản tiếng Việt được dịch máy dưới đây thành văn phong tự nhiên, mượt mà. \
Giữ nguyên toàn bộ ý nghĩa, không thêm hoặc bớt tình tiết, nhân vật. \
Chỉ trả về nội dung đã biên tập, không kèm giải thích.";

#[derive(Debug, Clone)]
pub struct GeminiRefinerConfig {
    pub base_url: String,
    pub model: String,
    pub api_keys: Vec<String>,
    pub temperature: f32,
    pub top_p: f32,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
    pub system_instruction: String,
}

impl Default for GeminiRefinerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-2.5-flash".to_string(),
            api_keys: Vec::new(),
            temperature: 0.3,
            top_p: 0.9,
            timeout_secs: 300,
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateResponse {
    /// 拼接第一个候选的全部文本片段
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| {
                c.parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

/// 包装原文的提示词
fn build_prompt(raw_text: &str) -> String {
    format!("Đây là đoạn văn bản cần bạn xử lý:\n---\n{raw_text}\n---")
}

/// Gemini 润色客户端
///
/// 多个 API key 轮换使用：从上次成功的下一个 key 开始，失败则依次尝试其余 key。
pub struct GeminiRefiner {
    client: Client,
    config: GeminiRefinerConfig,
    next_key: AtomicUsize,
}

impl GeminiRefiner {
    pub fn new(config: GeminiRefinerConfig) -> Result<Self, RefineError> {
        let api_keys: Vec<String> = config
            .api_keys
            .iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        if api_keys.is_empty() {
            return Err(RefineError::NoApiKey);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RefineError::Network(e.to_string()))?;

        tracing::info!(
            model = %config.model,
            keys = api_keys.len(),
            "GeminiRefiner initialized"
        );

        Ok(Self {
            client,
            config: GeminiRefinerConfig { api_keys, ..config },
            next_key: AtomicUsize::new(0),
        })
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    async fn call(&self, api_key: &str, prompt: &str) -> Result<String, RefineError> {
        let body = GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: &self.config.system_instruction,
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                top_p: self.config.top_p,
            },
        };

        let response = self
            .client
            .post(self.generate_url())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RefineError::Timeout
                } else {
                    RefineError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, error_text));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| RefineError::InvalidResponse(e.to_string()))?;

        Ok(parsed.text().trim().to_string())
    }
}

fn classify_failure(status: StatusCode, body: String) -> RefineError {
    if body.contains("API key not valid")
        || status == StatusCode::UNAUTHORIZED
        || status == StatusCode::FORBIDDEN
    {
        RefineError::Auth(format!("HTTP {}: {}", status, body))
    } else {
        RefineError::Service(format!("HTTP {}: {}", status, body))
    }
}

#[async_trait]
impl RefinerPort for GeminiRefiner {
    async fn refine(&self, raw_text: &str) -> Result<String, RefineError> {
        let keys = &self.config.api_keys;
        let start = self.next_key.load(Ordering::Relaxed) % keys.len();
        let prompt = build_prompt(raw_text);
        let mut last_error = RefineError::NoApiKey;

        for attempt in 0..keys.len() {
            let index = (start + attempt) % keys.len();
            tracing::debug!(key_index = index, text_len = raw_text.len(), "Sending refine request");

            match self.call(&keys[index], &prompt).await {
                Ok(text) => {
                    self.next_key.store((index + 1) % keys.len(), Ordering::Relaxed);
                    if text.is_empty() {
                        tracing::warn!(key_index = index, "Refiner returned empty output");
                        return Err(RefineError::EmptyOutput);
                    }
                    tracing::info!(key_index = index, output_len = text.len(), "Refinement completed");
                    return Ok(text);
                }
                Err(e) => {
                    tracing::warn!(key_index = index, error = %e, "Refine request failed, trying next key");
                    last_error = e;
                }
            }
        }

        tracing::error!(keys = keys.len(), error = %last_error, "All API keys failed");
        Err(last_error)
    }

    async fn health_check(&self) -> bool {
        !self.config.api_keys.is_empty()
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}
