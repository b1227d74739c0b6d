//! Infrastructure Layer - 基础设施层
//!
//! 提供所有端口的具体实现

pub mod adapters;
pub mod http;
pub mod memory;
pub mod persistence;
pub mod worker;

pub use adapters::{EchoRefiner, GeminiRefiner};
pub use memory::{InMemoryLibraryStore, InMemoryPreferences, InMemoryTranslationQueue};
pub use persistence::{SledLibraryStore, TomlPreferencesStore};
pub use worker::{TranslationWorker, TranslationWorkerConfig};
