//! TOML 偏好设置文件
//!
//! ```toml
//! last_story = "Story X"
//!
//! [settings]
//! theme = "dark"
//! font = "serif"
//! fontSize = 20
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::application::ports::{PreferencesError, PreferencesPort, Settings};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct PreferencesFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    last_story: Option<String>,
    settings: Settings,
}

/// 基于 TOML 文件的偏好设置
pub struct TomlPreferencesStore {
    path: PathBuf,
    /// 串行化读改写
    lock: Mutex<()>,
}

impl TomlPreferencesStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 读取文件；不存在或无法解析时返回默认值
    async fn read(&self) -> PreferencesFile {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return PreferencesFile::default(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to read preferences");
                return PreferencesFile::default();
            }
        };

        toml::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!(path = %self.path.display(), error = %e, "Invalid preferences file, using defaults");
            PreferencesFile::default()
        })
    }

    async fn write(&self, file: &PreferencesFile) -> Result<(), PreferencesError> {
        let content =
            toml::to_string_pretty(file).map_err(|e| PreferencesError::Serialization(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| PreferencesError::Io(e.to_string()))?;
        }
        tokio::fs::write(&self.path, content)
            .await
            .map_err(|e| PreferencesError::Io(e.to_string()))
    }

    async fn modify<F>(&self, f: F) -> Result<(), PreferencesError>
    where
        F: FnOnce(&mut PreferencesFile) + Send,
    {
        let _guard = self.lock.lock().await;
        let mut file = self.read().await;
        f(&mut file);
        self.write(&file).await
    }
}

#[async_trait]
impl PreferencesPort for TomlPreferencesStore {
    async fn load_settings(&self) -> Settings {
        self.read().await.settings.normalized()
    }

    async fn save_settings(&self, settings: &Settings) -> Result<(), PreferencesError> {
        let settings = settings.normalized();
        self.modify(|file| file.settings = settings).await?;
        tracing::debug!(path = %self.path.display(), "Settings saved");
        Ok(())
    }

    async fn load_last_story(&self) -> Option<String> {
        self.read().await.last_story.filter(|s| !s.trim().is_empty())
    }

    async fn save_last_story(&self, name: &str) -> Result<(), PreferencesError> {
        let name = name.to_string();
        self.modify(|file| file.last_story = Some(name)).await
    }
}
