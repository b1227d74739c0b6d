//! Preferences Port - 本地偏好设置
//!
//! 保存最近使用的书名与阅读显示设置，读取失败时静默回退默认值

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MIN_FONT_SIZE: u32 = 12;
pub const MAX_FONT_SIZE: u32 = 32;
pub const DEFAULT_FONT_SIZE: u32 = 18;

#[derive(Debug, Error)]
pub enum PreferencesError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
    Night,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Font {
    #[default]
    Sans,
    Serif,
    Mono,
}

/// 阅读显示设置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub theme: Theme,
    pub font: Font,
    pub font_size: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            font: Font::default(),
            font_size: DEFAULT_FONT_SIZE,
        }
    }
}

impl Settings {
    /// 把字号夹到允许范围
    pub fn normalized(mut self) -> Self {
        self.font_size = self.font_size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
        self
    }

    pub fn apply(self, patch: SettingsPatch) -> Self {
        Self {
            theme: patch.theme.unwrap_or(self.theme),
            font: patch.font.unwrap_or(self.font),
            font_size: patch.font_size.unwrap_or(self.font_size),
        }
        .normalized()
    }
}

/// 部分更新
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub theme: Option<Theme>,
    pub font: Option<Font>,
    pub font_size: Option<u32>,
}

/// Preferences Port
#[async_trait]
pub trait PreferencesPort: Send + Sync {
    /// 读取设置，失败时返回默认值
    async fn load_settings(&self) -> Settings;

    async fn save_settings(&self, settings: &Settings) -> Result<(), PreferencesError>;

    /// 最近使用的书名
    async fn load_last_story(&self) -> Option<String>;

    async fn save_last_story(&self, name: &str) -> Result<(), PreferencesError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.theme, Theme::Dark);
        assert_eq!(settings.font, Font::Sans);
        assert_eq!(settings.font_size, 18);
    }

    #[test]
    fn test_patch_clamps_font_size() {
        let settings = Settings::default().apply(SettingsPatch {
            theme: Some(Theme::Night),
            font_size: Some(64),
            ..Default::default()
        });
        assert_eq!(settings.theme, Theme::Night);
        assert_eq!(settings.font, Font::Sans);
        assert_eq!(settings.font_size, MAX_FONT_SIZE);

        let settings = settings.apply(SettingsPatch {
            font_size: Some(4),
            ..Default::default()
        });
        assert_eq!(settings.font_size, MIN_FONT_SIZE);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"font":"serif"}"#).unwrap();
        assert_eq!(settings.font, Font::Serif);
        assert_eq!(settings.theme, Theme::Dark);
        assert_eq!(settings.font_size, DEFAULT_FONT_SIZE);
    }
}
