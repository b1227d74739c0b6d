//! In-Memory Preferences

use std::sync::RwLock;

use async_trait::async_trait;

use crate::application::ports::{PreferencesError, PreferencesPort, Settings};

/// 内存偏好设置（测试与无持久化运行）
#[derive(Debug, Default)]
pub struct InMemoryPreferences {
    settings: RwLock<Settings>,
    last_story: RwLock<Option<String>>,
}

#[async_trait]
impl PreferencesPort for InMemoryPreferences {
    async fn load_settings(&self) -> Settings {
        self.settings
            .read()
            .map(|s| *s)
            .unwrap_or_default()
    }

    async fn save_settings(&self, settings: &Settings) -> Result<(), PreferencesError> {
        let mut guard = self
            .settings
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = settings.normalized();
        Ok(())
    }

    async fn load_last_story(&self) -> Option<String> {
        self.last_story.read().ok().and_then(|s| s.clone())
    }

    async fn save_last_story(&self, name: &str) -> Result<(), PreferencesError> {
        let mut guard = self
            .last_story
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Some(name.to_string());
        Ok(())
    }
}
