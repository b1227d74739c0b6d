//! Batch Refine Handler
//!
//! 按顺序润色多章：空输出记为可重试并继续，其它失败中止剩余项，
//! 两项之间固定等待以避免触发服务限流。

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::application::commands::{BatchProgress, BatchReport, ItemOutcome, RefineItem};
use crate::application::error::ApplicationError;
use crate::application::ports::{ensure_refined, PreferencesPort, RefineError, RefinerPort};
use crate::application::sync::SyncGateway;
use crate::domain::library::{LibraryEdit, TagUpdate};

pub struct BatchRefineHandler {
    refiner: Arc<dyn RefinerPort>,
    gateway: SyncGateway,
    preferences: Arc<dyn PreferencesPort>,
    inter_item_delay: Duration,
}

impl BatchRefineHandler {
    pub fn new(
        refiner: Arc<dyn RefinerPort>,
        gateway: SyncGateway,
        preferences: Arc<dyn PreferencesPort>,
        inter_item_delay: Duration,
    ) -> Self {
        Self {
            refiner,
            gateway,
            preferences,
            inter_item_delay,
        }
    }

    /// 运行一批；任何一项校验失败则整批不启动
    pub async fn run(
        &self,
        items: Vec<RefineItem>,
        progress: Option<mpsc::UnboundedSender<BatchProgress>>,
    ) -> Result<BatchReport, ApplicationError> {
        if items.is_empty() {
            return Err(ApplicationError::validation("batch is empty"));
        }
        for item in &items {
            item.validate()?;
        }

        let emit = |event: BatchProgress| {
            if let Some(tx) = &progress {
                let _ = tx.send(event);
            }
        };

        let total = items.len();
        let mut outcomes = Vec::with_capacity(total);
        let mut first_opened = None;
        let mut halted = false;

        tracing::info!(total, refiner = self.refiner.name(), "Batch refinement started");

        for (position, item) in items.iter().enumerate() {
            if halted {
                outcomes.push((item.id.clone(), ItemOutcome::Pending));
                continue;
            }

            emit(BatchProgress::Started {
                item_id: item.id.clone(),
                position: position + 1,
                total,
            });

            match self.process(item).await {
                Ok((story, chapter)) => {
                    emit(BatchProgress::Saved {
                        item_id: item.id.clone(),
                        story: story.clone(),
                        chapter: chapter.clone(),
                    });
                    first_opened.get_or_insert((story, chapter));
                    outcomes.push((item.id.clone(), ItemOutcome::Saved));
                }
                Err(error) => {
                    emit(BatchProgress::Failed {
                        item_id: item.id.clone(),
                        error: error.clone(),
                    });
                    let retryable = error.is_retryable();
                    outcomes.push((item.id.clone(), ItemOutcome::Failed { error }));
                    if !retryable {
                        tracing::warn!(item_id = %item.id, position = position + 1, "Batch halted");
                        emit(BatchProgress::Halted {
                            item_id: item.id.clone(),
                        });
                        halted = true;
                        continue;
                    }
                }
            }

            if position + 1 < total {
                emit(BatchProgress::Waiting {
                    delay: self.inter_item_delay,
                });
                tokio::time::sleep(self.inter_item_delay).await;
            }
        }

        emit(BatchProgress::Finished);

        let next_item = if halted {
            None
        } else {
            items.last().map(RefineItem::follow_up)
        };
        let report = BatchReport {
            outcomes,
            halted,
            first_opened,
            next_item,
        };

        tracing::info!(
            total,
            saved = report.saved_count(),
            halted = report.halted,
            "Batch refinement finished"
        );
        Ok(report)
    }

    /// 用相同原文重跑一项
    pub async fn retry(&self, item: &RefineItem) -> Result<ItemOutcome, ApplicationError> {
        item.validate()?;
        tracing::info!(item_id = %item.id, story = %item.story, chapter = %item.chapter, "Retrying item");

        Ok(match self.process(item).await {
            Ok(_) => ItemOutcome::Saved,
            Err(error) => ItemOutcome::Failed { error },
        })
    }

    async fn process(&self, item: &RefineItem) -> Result<(String, String), RefineError> {
        let story = item.story.trim().to_string();
        let chapter = item.chapter.trim().to_string();

        if let Err(e) = self.preferences.save_last_story(&story).await {
            tracing::warn!(error = %e, "Failed to remember last story");
        }

        let refined = match self.refiner.refine(&item.raw_text).await.and_then(ensure_refined) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(item_id = %item.id, story = %story, chapter = %chapter, error = %e, "Refinement failed");
                return Err(e);
            }
        };

        let edit = LibraryEdit::SaveChapter {
            story: story.clone(),
            chapter: chapter.clone(),
            text: refined,
            tags: TagUpdate::Replace(item.tag_list()),
        };
        // 写入失败不影响本项结果，覆盖层保留到下一次远端快照
        if let Err(e) = self.gateway.apply(&edit).await {
            tracing::warn!(story = %story, chapter = %chapter, error = %e, "Refined chapter not pushed");
        }

        tracing::info!(story = %story, chapter = %chapter, "Chapter refined and saved");
        Ok((story, chapter))
    }
}
