//! Storyshelf - 机翻小说阅读进度与书签同步
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Library: 书库文档、书签与编辑操作
//! - 章节排序、段落切分、阅读进度规则
//!
//! 应用层 (application/):
//! - Ports: 端口定义（RemoteStore, Refiner, Preferences, TranslationQueue）
//! - Sync: 同步网关（乐观覆盖层 + 订阅）与防抖
//! - Reader: 阅读视图控制器
//! - Commands / Queries: CQRS 处理器
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API + WebSocket
//! - Memory: 内存存储、队列与偏好设置
//! - Worker: TranslationWorker 后台润色
//! - Persistence: Sled 书库文档 + TOML 偏好设置
//! - Adapters: Gemini / Echo 润色服务

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
