//! Library Command Handlers
//!
//! 先对当前快照做校验，再交给同步网关推送整文档变换

use std::sync::Arc;

use crate::application::commands::{
    AddStory, DeleteChapter, DeleteStory, RememberStory, RenameChapter, RenameStory, SaveChapter,
    SetStoryTags, UpdateSettings,
};
use crate::application::error::ApplicationError;
use crate::application::ports::{PreferencesPort, Settings};
use crate::application::sync::SyncGateway;
use crate::domain::library::{normalize_tags, LibraryEdit, LibraryError};

fn required(value: &str, err: impl FnOnce() -> LibraryError) -> Result<String, ApplicationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(err().into());
    }
    Ok(trimmed.to_string())
}

// ============================================================================
// AddStory
// ============================================================================

pub struct AddStoryHandler {
    gateway: SyncGateway,
}

impl AddStoryHandler {
    pub fn new(gateway: SyncGateway) -> Self {
        Self { gateway }
    }

    pub async fn handle(&self, command: AddStory) -> Result<String, ApplicationError> {
        let name = required(&command.name, || LibraryError::InvalidStoryName(command.name.clone()))?;
        if self.gateway.snapshot().contains(&name) {
            return Err(LibraryError::StoryAlreadyExists(name).into());
        }

        self.gateway
            .apply(&LibraryEdit::AddStory {
                name: name.clone(),
                tags: normalize_tags(&command.tags),
            })
            .await?;

        tracing::info!(story = %name, "Story added");
        Ok(name)
    }
}

// ============================================================================
// RenameStory
// ============================================================================

pub struct RenameStoryHandler {
    gateway: SyncGateway,
}

impl RenameStoryHandler {
    pub fn new(gateway: SyncGateway) -> Self {
        Self { gateway }
    }

    /// 返回是否真的改了名
    pub async fn handle(&self, command: RenameStory) -> Result<bool, ApplicationError> {
        let to = command.to.trim().to_string();
        if to.is_empty() || to == command.from {
            return Ok(false);
        }

        let library = self.gateway.snapshot();
        if !library.contains(&command.from) {
            return Err(LibraryError::StoryNotFound(command.from).into());
        }
        if library.contains(&to) {
            return Err(LibraryError::StoryAlreadyExists(to).into());
        }

        self.gateway
            .apply(&LibraryEdit::RenameStory {
                from: command.from.clone(),
                to: to.clone(),
            })
            .await?;

        tracing::info!(from = %command.from, to = %to, "Story renamed");
        Ok(true)
    }
}

// ============================================================================
// DeleteStory
// ============================================================================

pub struct DeleteStoryHandler {
    gateway: SyncGateway,
}

impl DeleteStoryHandler {
    pub fn new(gateway: SyncGateway) -> Self {
        Self { gateway }
    }

    pub async fn handle(&self, command: DeleteStory) -> Result<(), ApplicationError> {
        if !self.gateway.snapshot().contains(&command.name) {
            return Err(LibraryError::StoryNotFound(command.name).into());
        }

        self.gateway
            .apply(&LibraryEdit::DeleteStory {
                name: command.name.clone(),
            })
            .await?;

        tracing::info!(story = %command.name, "Story deleted");
        Ok(())
    }
}

// ============================================================================
// SaveChapter
// ============================================================================

pub struct SaveChapterHandler {
    gateway: SyncGateway,
}

impl SaveChapterHandler {
    pub fn new(gateway: SyncGateway) -> Self {
        Self { gateway }
    }

    pub async fn handle(&self, command: SaveChapter) -> Result<(), ApplicationError> {
        let story = required(&command.story, || LibraryError::InvalidStoryName(command.story.clone()))?;
        let chapter =
            required(&command.chapter, || LibraryError::InvalidChapterId(command.chapter.clone()))?;
        if command.text.trim().is_empty() {
            return Err(LibraryError::EmptyContent.into());
        }

        let chars = command.text.chars().count();
        self.gateway
            .apply(&LibraryEdit::SaveChapter {
                story: story.clone(),
                chapter: chapter.clone(),
                text: command.text,
                tags: command.tags,
            })
            .await?;

        tracing::info!(story = %story, chapter = %chapter, chars, "Chapter saved");
        Ok(())
    }
}

// ============================================================================
// RenameChapter
// ============================================================================

pub struct RenameChapterHandler {
    gateway: SyncGateway,
}

impl RenameChapterHandler {
    pub fn new(gateway: SyncGateway) -> Self {
        Self { gateway }
    }

    pub async fn handle(&self, command: RenameChapter) -> Result<bool, ApplicationError> {
        let to = command.to.trim().to_string();
        if to.is_empty() {
            return Err(LibraryError::InvalidChapterId(command.to).into());
        }
        if to == command.from {
            return Ok(false);
        }

        let library = self.gateway.snapshot();
        let story = library
            .story(&command.story)
            .ok_or_else(|| LibraryError::StoryNotFound(command.story.clone()))?;
        if !story.has_chapter(&command.from) {
            return Err(LibraryError::chapter_not_found(&command.story, &command.from).into());
        }
        if story.has_chapter(&to) {
            return Err(LibraryError::chapter_exists(&command.story, &to).into());
        }

        self.gateway
            .apply(&LibraryEdit::RenameChapter {
                story: command.story.clone(),
                from: command.from.clone(),
                to: to.clone(),
            })
            .await?;

        tracing::info!(story = %command.story, from = %command.from, to = %to, "Chapter renamed");
        Ok(true)
    }
}

// ============================================================================
// DeleteChapter
// ============================================================================

pub struct DeleteChapterHandler {
    gateway: SyncGateway,
}

impl DeleteChapterHandler {
    pub fn new(gateway: SyncGateway) -> Self {
        Self { gateway }
    }

    pub async fn handle(&self, command: DeleteChapter) -> Result<(), ApplicationError> {
        let library = self.gateway.snapshot();
        let story = library
            .story(&command.story)
            .ok_or_else(|| LibraryError::StoryNotFound(command.story.clone()))?;
        if !story.has_chapter(&command.chapter) {
            return Err(LibraryError::chapter_not_found(&command.story, &command.chapter).into());
        }

        self.gateway
            .apply(&LibraryEdit::DeleteChapter {
                story: command.story.clone(),
                chapter: command.chapter.clone(),
            })
            .await?;

        tracing::info!(story = %command.story, chapter = %command.chapter, "Chapter deleted");
        Ok(())
    }
}

// ============================================================================
// SetStoryTags
// ============================================================================

pub struct SetStoryTagsHandler {
    gateway: SyncGateway,
}

impl SetStoryTagsHandler {
    pub fn new(gateway: SyncGateway) -> Self {
        Self { gateway }
    }

    pub async fn handle(&self, command: SetStoryTags) -> Result<Vec<String>, ApplicationError> {
        if !self.gateway.snapshot().contains(&command.story) {
            return Err(LibraryError::StoryNotFound(command.story).into());
        }

        let tags = normalize_tags(&command.tags);
        self.gateway
            .apply(&LibraryEdit::SetTags {
                story: command.story.clone(),
                tags: tags.clone(),
            })
            .await?;

        tracing::debug!(story = %command.story, tags = ?tags, "Story tags updated");
        Ok(tags)
    }
}

// ============================================================================
// Preferences
// ============================================================================

pub struct UpdateSettingsHandler {
    preferences: Arc<dyn PreferencesPort>,
}

impl UpdateSettingsHandler {
    pub fn new(preferences: Arc<dyn PreferencesPort>) -> Self {
        Self { preferences }
    }

    pub async fn handle(&self, command: UpdateSettings) -> Result<Settings, ApplicationError> {
        let settings = self.preferences.load_settings().await.apply(command.patch);
        self.preferences.save_settings(&settings).await?;
        tracing::debug!(settings = ?settings, "Settings updated");
        Ok(settings)
    }
}

pub struct RememberStoryHandler {
    preferences: Arc<dyn PreferencesPort>,
}

impl RememberStoryHandler {
    pub fn new(preferences: Arc<dyn PreferencesPort>) -> Self {
        Self { preferences }
    }

    pub async fn handle(&self, command: RememberStory) -> Result<(), ApplicationError> {
        let name = required(&command.name, || LibraryError::InvalidStoryName(command.name.clone()))?;
        self.preferences.save_last_story(&name).await?;
        Ok(())
    }
}
