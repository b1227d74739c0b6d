//! Storyshelf - 书库同步服务
//!
//! 启动顺序：配置 → 日志 → 存储 → 同步网关 → 润色服务与队列 → HTTP

use std::sync::Arc;

use storyshelf::application::{BatchRefineHandler, RefinerPort, SyncGateway};
use storyshelf::config::{load_config, print_config, LogConfig};
use storyshelf::infrastructure::adapters::{EchoRefiner, GeminiRefiner};
use storyshelf::infrastructure::http::{AppState, HttpServer, ServerConfig};
use storyshelf::infrastructure::memory::InMemoryTranslationQueue;
use storyshelf::infrastructure::persistence::{SledLibraryStore, TomlPreferencesStore};
use storyshelf::infrastructure::worker::{TranslationWorker, TranslationWorkerConfig};

fn init_tracing(log: &LogConfig) {
    let log_filter = format!(
        "{},storyshelf={},tower_http=debug",
        log.level, log.level
    );
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if log.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config.log);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Storyshelf starting");
    print_config(&config);

    // 确保数据目录存在
    for path in [&config.store.path, &config.preferences.path] {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    // 书库文档与偏好设置
    let store = SledLibraryStore::open(&config.store.path)?.arc();
    let preferences = Arc::new(TomlPreferencesStore::new(&config.preferences.path));

    // 同步网关：先拿到首份快照再接受请求
    let gateway = SyncGateway::new(store.clone(), config.sync.gateway_config());
    let subscription = gateway.start().await?;

    // 润色服务
    let refiner: Arc<dyn RefinerPort> = if config.refiner.dev_mode {
        tracing::warn!("Refiner running in dev mode, no external calls will be made");
        Arc::new(EchoRefiner::new())
    } else {
        Arc::new(GeminiRefiner::new(config.refiner.gemini_config())?)
    };
    if !refiner.health_check().await {
        tracing::warn!(refiner = refiner.name(), "Refiner health check failed");
    }

    // 后台润色队列
    let (queue, queue_rx) = InMemoryTranslationQueue::new(config.queue.capacity);
    let queue = queue.arc();
    let worker = TranslationWorker::new(
        TranslationWorkerConfig {
            max_concurrent: config.queue.max_concurrent,
        },
        queue_rx,
        queue.clone(),
        refiner.clone(),
        gateway.clone(),
    );
    tokio::spawn(worker.run());

    let batch = BatchRefineHandler::new(
        refiner,
        gateway.clone(),
        preferences.clone(),
        config.batch.inter_item_delay(),
    );

    // 创建 HTTP 服务器
    let server_config = ServerConfig::new(&config.server.host, config.server.port)
        .with_max_body_bytes(config.server.max_body_bytes);
    let state = AppState::new(store, queue, preferences, gateway).with_batch_refiner(batch);
    let server = HttpServer::new(server_config, state);

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    subscription.shutdown().await;
    tracing::info!("Server shutdown complete");

    Ok(())
}
