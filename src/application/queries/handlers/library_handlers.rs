//! Library Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::RemoteStorePort;
use crate::application::queries::{
    ChapterListView, ChapterView, GetChapter, ListChapters, ListStories, StoryListing,
};
use crate::domain::ChapterIndex;

/// ListStories Handler
pub struct ListStoriesHandler {
    store: Arc<dyn RemoteStorePort>,
}

impl ListStoriesHandler {
    pub fn new(store: Arc<dyn RemoteStorePort>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, query: ListStories) -> Result<StoryListing, ApplicationError> {
        let library = self.store.load().await?;
        Ok(StoryListing::build(&library, query.tag.as_deref()))
    }
}

/// GetChapter Handler
///
/// 书不存在返回 NotFound；章节不存在返回占位视图
pub struct GetChapterHandler {
    store: Arc<dyn RemoteStorePort>,
}

impl GetChapterHandler {
    pub fn new(store: Arc<dyn RemoteStorePort>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, query: GetChapter) -> Result<ChapterView, ApplicationError> {
        let library = self.store.load().await?;
        let story = library
            .story(&query.story)
            .ok_or_else(|| ApplicationError::not_found("Story", &query.story))?;

        let index = ChapterIndex::build(&story.chapters, &query.chapter);
        Ok(ChapterView::build(&query.story, Some(story), &query.chapter, &index))
    }
}

/// ListChapters Handler
pub struct ListChaptersHandler {
    store: Arc<dyn RemoteStorePort>,
}

impl ListChaptersHandler {
    pub fn new(store: Arc<dyn RemoteStorePort>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, query: ListChapters) -> Result<ChapterListView, ApplicationError> {
        let library = self.store.load().await?;
        let story = library
            .story(&query.story)
            .ok_or_else(|| ApplicationError::not_found("Story", &query.story))?;

        Ok(ChapterListView::build(&query.story, story))
    }
}
