//! Application State
//!
//! 包含所有 Command/Query Handlers 的应用状态

use std::sync::Arc;

use crate::application::{
    // Command handlers
    AddStoryHandler, BatchRefineHandler, DeleteChapterHandler, DeleteStoryHandler, ListTranslationTasksHandler,
    RenameChapterHandler, RenameStoryHandler, SaveChapterHandler, SetStoryTagsHandler,
    SubmitTranslationHandler, UpdateSettingsHandler,
    // Query handlers
    GetChapterHandler, ListChaptersHandler, ListStoriesHandler,
    // Ports
    PreferencesPort, RemoteStorePort, TranslationQueuePort,
    // Sync
    SyncGateway,
};

/// 应用状态
pub struct AppState {
    // ========== Ports ==========
    pub store: Arc<dyn RemoteStorePort>,
    pub queue: Arc<dyn TranslationQueuePort>,
    pub preferences: Arc<dyn PreferencesPort>,
    pub gateway: SyncGateway,

    // ========== Command Handlers ==========
    pub add_story_handler: AddStoryHandler,
    pub rename_story_handler: RenameStoryHandler,
    pub delete_story_handler: DeleteStoryHandler,
    pub set_story_tags_handler: SetStoryTagsHandler,
    pub save_chapter_handler: SaveChapterHandler,
    pub rename_chapter_handler: RenameChapterHandler,
    pub delete_chapter_handler: DeleteChapterHandler,
    pub update_settings_handler: UpdateSettingsHandler,
    pub submit_translation_handler: SubmitTranslationHandler,
    pub list_translation_tasks_handler: ListTranslationTasksHandler,
    /// 未配置润色服务时为 None
    pub batch_refine_handler: Option<BatchRefineHandler>,

    // ========== Query Handlers ==========
    pub list_stories_handler: ListStoriesHandler,
    pub get_chapter_handler: GetChapterHandler,
    pub list_chapters_handler: ListChaptersHandler,
}

impl AppState {
    /// 创建应用状态
    ///
    /// 命令经由同步网关写入；查询直接读取存储中已确认的文档
    pub fn new(
        store: Arc<dyn RemoteStorePort>,
        queue: Arc<dyn TranslationQueuePort>,
        preferences: Arc<dyn PreferencesPort>,
        gateway: SyncGateway,
    ) -> Self {
        Self {
            // Command handlers
            add_story_handler: AddStoryHandler::new(gateway.clone()),
            rename_story_handler: RenameStoryHandler::new(gateway.clone()),
            delete_story_handler: DeleteStoryHandler::new(gateway.clone()),
            set_story_tags_handler: SetStoryTagsHandler::new(gateway.clone()),
            save_chapter_handler: SaveChapterHandler::new(gateway.clone()),
            rename_chapter_handler: RenameChapterHandler::new(gateway.clone()),
            delete_chapter_handler: DeleteChapterHandler::new(gateway.clone()),
            update_settings_handler: UpdateSettingsHandler::new(preferences.clone()),
            submit_translation_handler: SubmitTranslationHandler::new(queue.clone()),
            list_translation_tasks_handler: ListTranslationTasksHandler::new(queue.clone()),
            batch_refine_handler: None,

            // Query handlers
            list_stories_handler: ListStoriesHandler::new(store.clone()),
            get_chapter_handler: GetChapterHandler::new(store.clone()),
            list_chapters_handler: ListChaptersHandler::new(store.clone()),

            // Ports
            store,
            queue,
            preferences,
            gateway,
        }
    }

    /// 启用批量润色
    pub fn with_batch_refiner(mut self, handler: BatchRefineHandler) -> Self {
        self.batch_refine_handler = Some(handler);
        self
    }
}
