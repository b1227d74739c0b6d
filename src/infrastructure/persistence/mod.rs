//! Persistence Layer - 数据持久化
//!
//! Sled 书库文档与 TOML 偏好设置文件

pub mod sled;
mod toml_preferences;

pub use self::sled::{SledLibraryConfig, SledLibraryStore};
pub use toml_preferences::TomlPreferencesStore;
