//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping                 GET   健康检查
//! - /api/library              GET   读取整份书库文档
//! - /api/library              PUT   整份替换
//! - /api/library/stories      GET   书目列表（?tag= 过滤）
//! - /api/library/chapter      GET   章节视图（?story=&chapter=）
//! - /api/library/chapters     GET   目录（?story=）
//! - /api/story/add            POST  新建书
//! - /api/story/rename         POST  重命名书
//! - /api/story/delete         POST  删除书
//! - /api/story/tags           POST  设置标签
//! - /api/chapter/save         POST  保存章节
//! - /api/chapter/rename       POST  重命名章节
//! - /api/chapter/delete       POST  删除章节
//! - /api/settings             GET   读取显示设置
//! - /api/settings             POST  更新显示设置
//! - /api/queue/submit         POST  提交润色任务
//! - /api/queue/list           GET   列出剩余任务
//! - /api/batch/run            POST  顺序润色一批章节
//! - /api/batch/retry          POST  原样重试一项
//! - /ws/library               WS    书库文档推送

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/api", api_routes())
        .route("/ws/library", get(handlers::library_websocket_handler))
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .nest("/library", library_routes())
        .nest("/story", story_routes())
        .nest("/chapter", chapter_routes())
        .route(
            "/settings",
            get(handlers::get_settings).post(handlers::update_settings),
        )
        .nest("/queue", queue_routes())
        .nest("/batch", batch_routes())
}

/// Library 路由
fn library_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::get_library).put(handlers::put_library))
        .route("/stories", get(handlers::list_stories))
        .route("/chapter", get(handlers::get_chapter))
        .route("/chapters", get(handlers::list_chapters))
}

/// Story 路由
fn story_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/add", post(handlers::add_story))
        .route("/rename", post(handlers::rename_story))
        .route("/delete", post(handlers::delete_story))
        .route("/tags", post(handlers::set_story_tags))
}

/// Chapter 路由
fn chapter_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/save", post(handlers::save_chapter))
        .route("/rename", post(handlers::rename_chapter))
        .route("/delete", post(handlers::delete_chapter))
}

/// Queue 路由
fn queue_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/submit", post(handlers::submit_translation))
        .route("/list", get(handlers::list_translation_tasks))
}

/// Batch 路由
fn batch_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/run", post(handlers::run_batch))
        .route("/retry", post(handlers::retry_batch_item))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{
        BatchRefineHandler, GatewayConfig, RemoteStorePort, SubscriptionHandle, SyncGateway,
    };
    use crate::infrastructure::adapters::EchoRefiner;
    use std::time::Duration;
    use crate::domain::library::{Library, Story};
    use crate::infrastructure::memory::{
        InMemoryLibraryStore, InMemoryPreferences, InMemoryTranslationQueue,
    };
    use axum::{
        body::{to_bytes, Body},
        http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tokio::sync::mpsc;
    use tower::util::ServiceExt;

    struct TestApp {
        router: Router,
        store: Arc<InMemoryLibraryStore>,
        _subscription: SubscriptionHandle,
        _queue_rx: mpsc::Receiver<String>,
    }

    async fn test_app(library: Library) -> TestApp {
        let store = InMemoryLibraryStore::with_library(library).arc();
        let gateway = SyncGateway::new(store.clone(), GatewayConfig::default());
        let subscription = gateway.start().await.unwrap();
        let (queue, queue_rx) = InMemoryTranslationQueue::new(4);
        let state = AppState::new(
            store.clone(),
            queue.arc(),
            Arc::new(InMemoryPreferences::default()),
            gateway,
        );
        TestApp {
            router: create_routes().with_state(Arc::new(state)),
            store,
            _subscription: subscription,
            _queue_rx: queue_rx,
        }
    }

    fn sample() -> Library {
        let mut library = Library::new();
        library.insert(
            "Old",
            Story::new(1)
                .with_tags(vec!["Tiên Hiệp".into()])
                .with_chapter("1", "a\n\nb"),
        );
        library.insert(
            "New",
            Story::new(9)
                .with_chapter("2", "two")
                .with_chapter("10", "ten")
                .with_chapter("1", "one"),
        );
        library
    }

    async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> Value {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_ping() {
        let t = test_app(Library::new()).await;
        let app = t.router.clone();
        let body: Value = send(app, Method::GET, "/api/ping", None).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["sync"], "idle");
    }

    #[tokio::test]
    async fn test_story_listing_orders_by_last_modified() {
        let t = test_app(sample()).await;
        let app = t.router.clone();
        let body = send(app, Method::GET, "/api/library/stories", None).await;
        assert_eq!(body["errno"], 0);
        let names: Vec<&str> = body["data"]["stories"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["New", "Old"]);
    }

    #[tokio::test]
    async fn test_chapter_view_has_numeric_neighbours() {
        let t = test_app(sample()).await;
        let app = t.router.clone();
        let body = send(
            app,
            Method::GET,
            "/api/library/chapter?story=New&chapter=2",
            None,
        )
        .await;
        let data = &body["data"];
        assert_eq!(data["prev"], "1");
        assert_eq!(data["next"], "10");
        assert_eq!(data["found"], true);
    }

    #[tokio::test]
    async fn test_missing_story_is_errno_404() {
        let t = test_app(sample()).await;
        let app = t.router.clone();
        let body = send(
            app,
            Method::GET,
            "/api/library/chapter?story=Nope&chapter=1",
            None,
        )
        .await;
        assert_eq!(body["errno"], 404);
    }

    #[tokio::test]
    async fn test_put_library_replaces_document() {
        let t = test_app(sample()).await;
        let (app, store) = (t.router.clone(), t.store.clone());
        let doc = json!({ "Only": { "chapters": { "1": "x" }, "lastModified": 3 } });
        let body = send(app, Method::PUT, "/api/library", Some(doc)).await;
        assert_eq!(body["errno"], 0);

        let library = store.load().await.unwrap();
        assert_eq!(library.len(), 1);
        assert!(library.contains("Only"));
    }

    #[tokio::test]
    async fn test_save_chapter_reaches_store() {
        let t = test_app(sample()).await;
        let (app, store) = (t.router.clone(), t.store.clone());
        let body = send(
            app,
            Method::POST,
            "/api/chapter/save",
            Some(json!({ "story": "Old", "chapter": "2", "text": "next", "tags": "A, B" })),
        )
        .await;
        assert_eq!(body["errno"], 0);

        let library = store.load().await.unwrap();
        let story = library.story("Old").unwrap();
        assert_eq!(story.chapter("2"), Some("next"));
        assert_eq!(story.tags, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_queue_submit_and_list() {
        let t = test_app(Library::new()).await;
        let app = t.router.clone();
        let body = send(
            app.clone(),
            Method::POST,
            "/api/queue/submit",
            Some(json!({
                "storyName": "S",
                "chapterNumber": "3",
                "rawText": "raw",
                "tags": "x, y"
            })),
        )
        .await;
        let task_id = body["data"]["taskId"].as_str().unwrap().to_string();

        let body = send(app, Method::GET, "/api/queue/list", None).await;
        let tasks = body["data"].as_array().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0]["id"], task_id.as_str());
        assert_eq!(tasks[0]["status"], "pending");
        assert_eq!(tasks[0]["tags"], json!(["x", "y"]));
    }

    #[tokio::test]
    async fn test_blank_submission_is_bad_request() {
        let t = test_app(Library::new()).await;
        let app = t.router.clone();
        let body = send(
            app,
            Method::POST,
            "/api/queue/submit",
            Some(json!({ "storyName": " ", "chapterNumber": "1", "rawText": "x" })),
        )
        .await;
        assert_eq!(body["errno"], 400);
    }

    #[tokio::test]
    async fn test_batch_without_refiner_is_unavailable() {
        let t = test_app(Library::new()).await;
        let body = send(
            t.router.clone(),
            Method::POST,
            "/api/batch/run",
            Some(json!({ "items": [{ "story": "S", "chapter": "1", "rawText": "x" }] })),
        )
        .await;
        assert_eq!(body["errno"], 503);
    }

    #[tokio::test]
    async fn test_batch_run_saves_and_suggests_next_item() {
        let store = InMemoryLibraryStore::default().arc();
        let gateway = SyncGateway::new(store.clone(), GatewayConfig::default());
        let _subscription = gateway.start().await.unwrap();
        let (queue, _rx) = InMemoryTranslationQueue::new(4);
        let preferences = Arc::new(InMemoryPreferences::default());
        let batch = BatchRefineHandler::new(
            Arc::new(EchoRefiner::new()),
            gateway.clone(),
            preferences.clone(),
            Duration::ZERO,
        );
        let state = AppState::new(store.clone(), queue.arc(), preferences, gateway)
            .with_batch_refiner(batch);
        let router = create_routes().with_state(Arc::new(state));

        let body = send(
            router,
            Method::POST,
            "/api/batch/run",
            Some(json!({ "items": [
                { "id": "a", "story": "S", "chapter": "1", "rawText": "one", "tags": "x" },
                { "id": "b", "story": "S", "chapter": "2", "rawText": "two", "tags": "x" }
            ] })),
        )
        .await;

        let data = &body["data"];
        assert_eq!(data["halted"], false);
        assert_eq!(data["outcomes"][0]["status"], "saved");
        assert_eq!(data["firstOpened"]["chapter"], "1");
        assert_eq!(data["nextItem"]["chapter"], "3");
        assert_eq!(data["nextItem"]["tags"], "x");

        let library = store.load().await.unwrap();
        assert_eq!(library.story("S").unwrap().chapters.len(), 2);
    }

    #[tokio::test]
    async fn test_settings_update_clamps_font_size() {
        let t = test_app(Library::new()).await;
        let app = t.router.clone();
        let body = send(
            app.clone(),
            Method::POST,
            "/api/settings",
            Some(json!({ "fontSize": 99, "theme": "light" })),
        )
        .await;
        assert_eq!(body["data"]["fontSize"], 32);

        let body = send(app, Method::GET, "/api/settings", None).await;
        assert_eq!(body["data"]["theme"], "light");
    }
}
