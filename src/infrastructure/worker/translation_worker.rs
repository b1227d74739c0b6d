//! Translation Worker - 后台润色任务处理

use std::sync::Arc;

use tokio::sync::{mpsc, Semaphore};

use crate::application::ports::{ensure_refined, RefinerPort, TranslationQueuePort};
use crate::application::sync::SyncGateway;
use crate::domain::library::{LibraryEdit, TagUpdate};

/// Worker 配置
#[derive(Debug, Clone)]
pub struct TranslationWorkerConfig {
    /// 最大并发润色数
    pub max_concurrent: usize,
}

impl Default for TranslationWorkerConfig {
    fn default() -> Self {
        Self { max_concurrent: 1 }
    }
}

/// 润色 Worker
///
/// 从队列消费任务：润色后合并进书库，成功即移除任务，失败保留并记录原因
pub struct TranslationWorker {
    config: TranslationWorkerConfig,
    queue_receiver: mpsc::Receiver<String>,
    queue: Arc<dyn TranslationQueuePort>,
    refiner: Arc<dyn RefinerPort>,
    gateway: SyncGateway,
}

impl TranslationWorker {
    pub fn new(
        config: TranslationWorkerConfig,
        queue_receiver: mpsc::Receiver<String>,
        queue: Arc<dyn TranslationQueuePort>,
        refiner: Arc<dyn RefinerPort>,
        gateway: SyncGateway,
    ) -> Self {
        Self {
            config,
            queue_receiver,
            queue,
            refiner,
            gateway,
        }
    }

    /// 运行直到队列发送端全部关闭
    pub async fn run(mut self) {
        let max_concurrent = self.config.max_concurrent.max(1);
        tracing::info!(
            max_concurrent,
            refiner = self.refiner.name(),
            "TranslationWorker started"
        );

        let semaphore = Arc::new(Semaphore::new(max_concurrent));

        while let Some(task_id) = self.queue_receiver.recv().await {
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to acquire semaphore permit");
                    break;
                }
            };

            let queue = self.queue.clone();
            let refiner = self.refiner.clone();
            let gateway = self.gateway.clone();

            tokio::spawn(async move {
                let _permit = permit;
                Self::process_task(&task_id, queue, refiner, gateway).await;
            });
        }

        // 等待在途任务结束
        let _ = semaphore.acquire_many(max_concurrent as u32).await;
        tracing::info!("TranslationWorker stopped");
    }

    async fn process_task(
        task_id: &str,
        queue: Arc<dyn TranslationQueuePort>,
        refiner: Arc<dyn RefinerPort>,
        gateway: SyncGateway,
    ) {
        let task = match queue.get(task_id) {
            Some(t) => t,
            None => {
                tracing::warn!(task_id = %task_id, "Task not found, skipping");
                return;
            }
        };

        if let Err(e) = queue.mark_processing(task_id) {
            tracing::error!(task_id = %task_id, error = %e, "Failed to update task state");
            return;
        }

        let refined = match refiner
            .refine(&task.raw_text)
            .await
            .and_then(ensure_refined)
        {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(task_id = %task_id, error = %e, "Refinement failed");
                let _ = queue.mark_failed(task_id, e.to_string());
                return;
            }
        };

        let edit = LibraryEdit::SaveChapter {
            story: task.story_name.clone(),
            chapter: task.chapter_number.clone(),
            text: refined,
            tags: TagUpdate::Merge(task.tags.clone()),
        };
        if let Err(e) = gateway.apply(&edit).await {
            tracing::error!(task_id = %task_id, error = %e, "Failed to store refined chapter");
            let _ = queue.mark_failed(task_id, e.to_string());
            return;
        }

        queue.remove(task_id);
        tracing::info!(
            task_id = %task_id,
            story = %task.story_name,
            chapter = %task.chapter_number,
            "Task completed"
        );
    }
}
