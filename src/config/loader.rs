//! Configuration Loader
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml / config.local.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

const ENV_PREFIX: &str = "STORYSHELF";

/// 加载应用配置
///
/// # 环境变量示例
/// - `STORYSHELF_SERVER__PORT=8080`
/// - `STORYSHELF_STORE__PATH=/data/library.sled`
/// - `STORYSHELF_REFINER__API_KEYS=key1,key2`
/// - `STORYSHELF_REFINER__DEV_MODE=true`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置，`None` 时搜索默认文件名
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 5070)?
        .set_default("store.path", "data/library.sled")?
        .set_default("refiner.model", "gemini-2.5-flash")?
        .set_default("refiner.timeout_secs", 300)?
        .set_default("refiner.dev_mode", false)?
        .set_default("sync.scroll_debounce_ms", 500)?
        .set_default("sync.restore_delay_ms", 100)?
        .set_default("sync.error_clear_ms", 3000)?
        .set_default("batch.inter_item_delay_secs", 30)?
        .set_default("queue.capacity", 256)?
        .set_default("queue.max_concurrent", 1)?
        .set_default("preferences.path", "data/preferences.toml")?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 环境变量名会被转换为小写；api_keys 以逗号分隔
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("refiner.api_keys")
            .try_parsing(true),
    );

    let app_config: AppConfig = builder.build()?.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;
    Ok(app_config)
}

fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    let invalid = |msg: &str| Err(ConfigError::ValidationError(msg.to_string()));

    if config.server.port == 0 {
        return invalid("Server port cannot be 0");
    }
    if config.store.path.as_os_str().is_empty() {
        return invalid("Store path cannot be empty");
    }
    if config.preferences.path.as_os_str().is_empty() {
        return invalid("Preferences path cannot be empty");
    }
    if !config.refiner.dev_mode {
        if config.refiner.base_url.trim().is_empty() {
            return invalid("Refiner base URL cannot be empty");
        }
        if config.refiner.usable_keys() == 0 {
            return invalid("At least one refiner API key is required unless dev_mode is enabled");
        }
    }
    if !(0.0..=2.0).contains(&config.refiner.temperature) {
        return invalid("Refiner temperature must be within 0..=2");
    }
    if !(0.0..=1.0).contains(&config.refiner.top_p) {
        return invalid("Refiner top_p must be within 0..=1");
    }
    if config.refiner.timeout_secs == 0 {
        return invalid("Refiner timeout cannot be 0");
    }
    if config.queue.capacity == 0 || config.queue.max_concurrent == 0 {
        return invalid("Queue capacity and concurrency must be positive");
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志），不输出 API key
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}", config.server.addr());
    tracing::info!("Store: {}", config.store.path.display());
    tracing::info!("Preferences: {}", config.preferences.path.display());
    if config.refiner.dev_mode {
        tracing::info!("Refiner: dev mode (echo)");
    } else {
        tracing::info!(
            "Refiner: {} ({} keys, timeout {}s)",
            config.refiner.model,
            config.refiner.usable_keys(),
            config.refiner.timeout_secs
        );
    }
    tracing::info!(
        "Sync: scroll debounce {}ms, restore delay {}ms, error clear {}ms",
        config.sync.scroll_debounce_ms,
        config.sync.restore_delay_ms,
        config.sync.error_clear_ms
    );
    tracing::info!("Batch delay: {}s", config.batch.inter_item_delay_secs);
    tracing::info!(
        "Queue: capacity {}, max concurrent {}",
        config.queue.capacity,
        config.queue.max_concurrent
    );
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}
