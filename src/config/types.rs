//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::application::{GatewayConfig, ReaderConfig};
use crate::infrastructure::adapters::{GeminiRefinerConfig, DEFAULT_SYSTEM_INSTRUCTION};

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// 书库文档存储
    #[serde(default)]
    pub store: StoreConfig,

    /// 润色服务
    #[serde(default)]
    pub refiner: RefinerConfig,

    /// 同步与阅读器时序
    #[serde(default)]
    pub sync: SyncConfig,

    #[serde(default)]
    pub batch: BatchConfig,

    /// 后台润色队列
    #[serde(default)]
    pub queue: QueueConfig,

    #[serde(default)]
    pub preferences: PreferencesConfig,

    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,

    /// 请求体上限（字节）
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5070
}

fn default_max_body_bytes() -> usize {
    32 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 书库存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Sled 数据库路径
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

fn default_store_path() -> PathBuf {
    PathBuf::from("data/library.sled")
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

/// 润色服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct RefinerConfig {
    #[serde(default = "default_refiner_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// 多个 key 轮流使用
    #[serde(default)]
    pub api_keys: Vec<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// 请求超时时间（秒）
    #[serde(default = "default_refiner_timeout")]
    pub timeout_secs: u64,

    /// 开发模式：不调用外部服务，原样返回带标记的输入
    #[serde(default)]
    pub dev_mode: bool,

    /// 覆盖默认的系统提示词
    #[serde(default)]
    pub system_instruction: Option<String>,
}

fn default_refiner_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_top_p() -> f32 {
    0.9
}

fn default_refiner_timeout() -> u64 {
    300
}

impl Default for RefinerConfig {
    fn default() -> Self {
        Self {
            base_url: default_refiner_url(),
            model: default_model(),
            api_keys: Vec::new(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            timeout_secs: default_refiner_timeout(),
            dev_mode: false,
            system_instruction: None,
        }
    }
}

impl RefinerConfig {
    pub fn gemini_config(&self) -> GeminiRefinerConfig {
        GeminiRefinerConfig {
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            api_keys: self.api_keys.clone(),
            temperature: self.temperature,
            top_p: self.top_p,
            timeout_secs: self.timeout_secs,
            system_instruction: self
                .system_instruction
                .clone()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SYSTEM_INSTRUCTION.to_string()),
        }
    }

    /// 非空 key 的数量
    pub fn usable_keys(&self) -> usize {
        self.api_keys.iter().filter(|k| !k.trim().is_empty()).count()
    }
}

/// 同步时序配置
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// 滚动停止多久后保存位置（毫秒）
    #[serde(default = "default_scroll_debounce_ms")]
    pub scroll_debounce_ms: u64,

    /// 打开章节后等待多久恢复滚动位置（毫秒）
    #[serde(default = "default_restore_delay_ms")]
    pub restore_delay_ms: u64,

    /// 写入失败状态保留多久（毫秒）
    #[serde(default = "default_error_clear_ms")]
    pub error_clear_ms: u64,
}

fn default_scroll_debounce_ms() -> u64 {
    500
}

fn default_restore_delay_ms() -> u64 {
    100
}

fn default_error_clear_ms() -> u64 {
    3000
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            scroll_debounce_ms: default_scroll_debounce_ms(),
            restore_delay_ms: default_restore_delay_ms(),
            error_clear_ms: default_error_clear_ms(),
        }
    }
}

impl SyncConfig {
    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            error_clear_after: Duration::from_millis(self.error_clear_ms),
        }
    }

    pub fn reader_config(&self) -> ReaderConfig {
        ReaderConfig {
            scroll_debounce: Duration::from_millis(self.scroll_debounce_ms),
            restore_delay: Duration::from_millis(self.restore_delay_ms),
        }
    }
}

/// 批量润色配置
#[derive(Debug, Clone, Deserialize)]
pub struct BatchConfig {
    /// 两项之间的间隔（秒）
    #[serde(default = "default_inter_item_delay")]
    pub inter_item_delay_secs: u64,
}

fn default_inter_item_delay() -> u64 {
    30
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            inter_item_delay_secs: default_inter_item_delay(),
        }
    }
}

impl BatchConfig {
    pub fn inter_item_delay(&self) -> Duration {
        Duration::from_secs(self.inter_item_delay_secs)
    }
}

/// 后台队列配置
#[derive(Debug, Clone, Deserialize)]
pub struct QueueConfig {
    /// 最多排队的任务数
    #[serde(default = "default_queue_capacity")]
    pub capacity: usize,

    /// 最大并发润色数
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

fn default_queue_capacity() -> usize {
    256
}

fn default_max_concurrent() -> usize {
    1
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            capacity: default_queue_capacity(),
            max_concurrent: default_max_concurrent(),
        }
    }
}

/// 偏好设置文件
#[derive(Debug, Clone, Deserialize)]
pub struct PreferencesConfig {
    #[serde(default = "default_preferences_path")]
    pub path: PathBuf,
}

fn default_preferences_path() -> PathBuf {
    PathBuf::from("data/preferences.toml")
}

impl Default for PreferencesConfig {
    fn default() -> Self {
        Self {
            path: default_preferences_path(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.addr(), "0.0.0.0:5070");
        assert_eq!(config.store.path, PathBuf::from("data/library.sled"));
        assert_eq!(config.refiner.model, "gemini-2.5-flash");
        assert_eq!(config.batch.inter_item_delay(), Duration::from_secs(30));
        assert!(!config.refiner.dev_mode);
    }

    #[test]
    fn test_sync_durations() {
        let sync = SyncConfig::default();
        assert_eq!(sync.gateway_config().error_clear_after, Duration::from_secs(3));
        let reader = sync.reader_config();
        assert_eq!(reader.scroll_debounce, Duration::from_millis(500));
        assert_eq!(reader.restore_delay, Duration::from_millis(100));
    }

    #[test]
    fn test_blank_system_instruction_uses_default() {
        let refiner = RefinerConfig {
            system_instruction: Some("  ".into()),
            api_keys: vec!["k1".into(), " ".into()],
            ..RefinerConfig::default()
        };
        let gemini = refiner.gemini_config();
        assert_eq!(gemini.system_instruction, DEFAULT_SYSTEM_INSTRUCTION);
        assert_eq!(refiner.usable_keys(), 1);
    }
}
