//! Memory Layer - In-Memory State Management
//!
//! 书库文档、润色队列和偏好设置的内存实现

mod library_store;
mod preferences;
mod translation_queue;

pub use library_store::InMemoryLibraryStore;
pub use preferences::InMemoryPreferences;
pub use translation_queue::InMemoryTranslationQueue;
