//! In-Memory Translation Queue

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc;

use crate::application::ports::{QueueError, TaskStatus, TranslationQueuePort, TranslationTask};

/// 内存润色队列
pub struct InMemoryTranslationQueue {
    /// task_id -> TranslationTask
    tasks: DashMap<String, TranslationTask>,
    /// 任务队列发送端
    queue_sender: mpsc::Sender<String>,
}

impl InMemoryTranslationQueue {
    /// 创建队列，返回 Worker 使用的接收端
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<String>) {
        let (queue_sender, queue_receiver) = mpsc::channel(capacity.max(1));
        (
            Self {
                tasks: DashMap::new(),
                queue_sender,
            },
            queue_receiver,
        )
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    fn update<F>(&self, task_id: &str, f: F) -> Result<(), QueueError>
    where
        F: FnOnce(&mut TranslationTask),
    {
        let mut task = self
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| QueueError::NotFound(task_id.to_string()))?;
        f(&mut task);
        Ok(())
    }
}

impl TranslationQueuePort for InMemoryTranslationQueue {
    fn submit(&self, task: TranslationTask) -> Result<String, QueueError> {
        let task_id = task.id.clone();
        self.tasks.insert(task_id.clone(), task);

        if let Err(e) = self.queue_sender.try_send(task_id.clone()) {
            self.tasks.remove(&task_id);
            tracing::warn!(task_id = %task_id, error = %e, "Failed to enqueue task");
            return Err(match e {
                mpsc::error::TrySendError::Full(_) => QueueError::Full,
                mpsc::error::TrySendError::Closed(_) => QueueError::Closed,
            });
        }

        tracing::debug!(task_id = %task_id, pending = self.tasks.len(), "Task enqueued");
        Ok(task_id)
    }

    fn get(&self, task_id: &str) -> Option<TranslationTask> {
        self.tasks.get(task_id).map(|t| t.clone())
    }

    fn list(&self) -> Vec<TranslationTask> {
        let mut tasks: Vec<TranslationTask> = self.tasks.iter().map(|t| t.clone()).collect();
        tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        tasks
    }

    fn mark_processing(&self, task_id: &str) -> Result<(), QueueError> {
        self.update(task_id, |task| {
            task.status = TaskStatus::Processing;
            task.error_message = None;
        })
    }

    fn mark_failed(&self, task_id: &str, message: String) -> Result<(), QueueError> {
        self.update(task_id, |task| {
            task.status = TaskStatus::Error;
            task.error_message = Some(message);
        })
    }

    fn remove(&self, task_id: &str) -> Option<TranslationTask> {
        self.tasks.remove(task_id).map(|(_, task)| task)
    }
}
