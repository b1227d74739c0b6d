//! Translation Queue Handlers

use std::sync::Arc;

use crate::application::commands::SubmitTranslation;
use crate::application::error::ApplicationError;
use crate::application::ports::{TranslationQueuePort, TranslationTask};
use crate::domain::library::normalize_tags;

/// SubmitTranslation Handler - 入队后立即返回任务 ID
pub struct SubmitTranslationHandler {
    queue: Arc<dyn TranslationQueuePort>,
}

impl SubmitTranslationHandler {
    pub fn new(queue: Arc<dyn TranslationQueuePort>) -> Self {
        Self { queue }
    }

    pub async fn handle(&self, command: SubmitTranslation) -> Result<String, ApplicationError> {
        let story = command.story_name.trim();
        let chapter = command.chapter_number.trim();
        if story.is_empty() || chapter.is_empty() || command.raw_text.trim().is_empty() {
            return Err(ApplicationError::validation(
                "storyName, chapterNumber and rawText are required",
            ));
        }

        let task = TranslationTask::new(
            story.to_string(),
            chapter.to_string(),
            command.raw_text,
            normalize_tags(&command.tags),
        );
        let task_id = self.queue.submit(task)?;

        tracing::info!(task_id = %task_id, story = %story, chapter = %chapter, "Translation task submitted");
        Ok(task_id)
    }
}

/// 列出队列中剩余的任务
pub struct ListTranslationTasksHandler {
    queue: Arc<dyn TranslationQueuePort>,
}

impl ListTranslationTasksHandler {
    pub fn new(queue: Arc<dyn TranslationQueuePort>) -> Self {
        Self { queue }
    }

    pub async fn handle(&self) -> Result<Vec<TranslationTask>, ApplicationError> {
        Ok(self.queue.list())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::TaskStatus;
    use crate::infrastructure::memory::InMemoryTranslationQueue;

    #[tokio::test]
    async fn test_submit_and_list() {
        let (queue, mut rx) = InMemoryTranslationQueue::new(8);
        let queue: Arc<dyn TranslationQueuePort> = Arc::new(queue);

        let task_id = SubmitTranslationHandler::new(queue.clone())
            .handle(SubmitTranslation {
                story_name: " Story X ".into(),
                chapter_number: "3".into(),
                raw_text: "raw".into(),
                tags: vec!["a".into(), "a".into()],
            })
            .await
            .unwrap();
        assert_eq!(rx.recv().await.as_deref(), Some(task_id.as_str()));

        let tasks = ListTranslationTasksHandler::new(queue).handle().await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].story_name, "Story X");
        assert_eq!(tasks[0].tags, vec!["a"]);
        assert_eq!(tasks[0].status, TaskStatus::Pending);
    }

    #[tokio::test]
    async fn test_submit_rejects_blank_fields() {
        let (queue, _rx) = InMemoryTranslationQueue::new(8);
        let err = SubmitTranslationHandler::new(Arc::new(queue))
            .handle(SubmitTranslation {
                story_name: "A".into(),
                chapter_number: "".into(),
                raw_text: "raw".into(),
                tags: vec![],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::ValidationError(_)));
    }
}
