//! HTTP Middleware

use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};

/// 4xx/5xx 响应日志
///
/// 业务错误（errno != 0）走 200，由 `ApiError::into_response` 记录
pub async fn error_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let started = Instant::now();

    let response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            uri = %uri,
            status = status.as_u16(),
            elapsed_ms,
            "HTTP server error"
        );
    } else if status.is_client_error() {
        tracing::warn!(
            method = %method,
            uri = %uri,
            status = status.as_u16(),
            elapsed_ms,
            "HTTP client error"
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        routing::put,
        Router,
    };
    use tower::util::ServiceExt;

    fn router() -> Router {
        Router::new()
            .route("/library", put(|| async { StatusCode::UNPROCESSABLE_ENTITY }))
            .route("/broken", put(|| async { StatusCode::BAD_GATEWAY }))
            .layer(axum::middleware::from_fn(error_logging_middleware))
    }

    async fn status_of(uri: &str) -> StatusCode {
        let request = HttpRequest::builder()
            .method("PUT")
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        router().oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn test_status_passes_through_unchanged() {
        assert_eq!(status_of("/library").await, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(status_of("/broken").await, StatusCode::BAD_GATEWAY);
        assert_eq!(status_of("/missing").await, StatusCode::NOT_FOUND);
    }
}
