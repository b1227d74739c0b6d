//! HTTP Layer - RESTful API + WebSocket
//!
//! 书库服务：文档读写、阅读视图、润色队列与变更推送

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use routes::create_routes;
pub use server::{HttpServer, ServerConfig};
pub use state::AppState;
