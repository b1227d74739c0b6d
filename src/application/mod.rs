//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（RemoteStore、Refiner、Preferences、TranslationQueue）
//! - sync: 同步网关与防抖
//! - reader: 阅读视图控制器
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;
pub mod queries;
pub mod reader;
pub mod sync;

// Re-exports
pub use commands::{
    // Library commands
    AddStory,
    DeleteChapter,
    DeleteStory,
    RememberStory,
    RenameChapter,
    RenameStory,
    SaveChapter,
    SetStoryTags,
    UpdateSettings,
    // Refine commands
    BatchProgress,
    BatchReport,
    ItemOutcome,
    RefineItem,
    SubmitTranslation,
    // Handlers
    handlers::{
        AddStoryHandler, BatchRefineHandler, DeleteChapterHandler, DeleteStoryHandler,
        ListTranslationTasksHandler, RememberStoryHandler, RenameChapterHandler,
        RenameStoryHandler, SaveChapterHandler, SetStoryTagsHandler, SubmitTranslationHandler,
        UpdateSettingsHandler,
    },
};

pub use error::ApplicationError;

pub use ports::{
    // Preferences
    Font,
    PreferencesError,
    PreferencesPort,
    Settings,
    SettingsPatch,
    Theme,
    // Refiner
    RefineError,
    RefinerPort,
    // Remote store
    LibrarySubscription,
    RemoteStorePort,
    StoreError,
    // Translation queue
    QueueError,
    TaskStatus,
    TranslationQueuePort,
    TranslationTask,
};

pub use queries::{
    ChapterListView, ChapterView, GetChapter, ListChapters, ListStories, StoryListing,
    StorySummary, CHAPTER_NOT_FOUND,
    // Handlers
    handlers::{GetChapterHandler, ListChaptersHandler, ListStoriesHandler},
};

pub use reader::{ReaderConfig, ReaderController, ScrollInstruction};
pub use sync::{GatewayConfig, SubscriptionHandle, SyncGateway, SyncStatus, WriteState};
