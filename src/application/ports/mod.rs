//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod preferences;
mod refiner;
mod remote_store;
mod translation_queue;

pub use preferences::{
    Font, PreferencesError, PreferencesPort, Settings, SettingsPatch, Theme, DEFAULT_FONT_SIZE,
    MAX_FONT_SIZE, MIN_FONT_SIZE,
};
pub use refiner::{ensure_refined, RefineError, RefinerPort};
pub use remote_store::{LibrarySubscription, RemoteStorePort, StoreError};
pub use translation_queue::{QueueError, TaskStatus, TranslationQueuePort, TranslationTask};
