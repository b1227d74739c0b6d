//! Library Commands - 书库编辑

use crate::application::ports::SettingsPatch;
use crate::domain::library::TagUpdate;

/// 新建一本空书
#[derive(Debug, Clone)]
pub struct AddStory {
    pub name: String,
    pub tags: Vec<String>,
}

/// 重命名书（空名或未改名视为无操作）
#[derive(Debug, Clone)]
pub struct RenameStory {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone)]
pub struct DeleteStory {
    pub name: String,
}

/// 保存（新建或覆盖）一章
#[derive(Debug, Clone)]
pub struct SaveChapter {
    pub story: String,
    pub chapter: String,
    pub text: String,
    pub tags: TagUpdate,
}

#[derive(Debug, Clone)]
pub struct RenameChapter {
    pub story: String,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone)]
pub struct DeleteChapter {
    pub story: String,
    pub chapter: String,
}

#[derive(Debug, Clone)]
pub struct SetStoryTags {
    pub story: String,
    pub tags: Vec<String>,
}

/// 更新显示设置
#[derive(Debug, Clone, Default)]
pub struct UpdateSettings {
    pub patch: SettingsPatch,
}

/// 记录最近使用的书
#[derive(Debug, Clone)]
pub struct RememberStory {
    pub name: String,
}
