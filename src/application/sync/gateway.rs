//! Sync Gateway - 书库同步网关
//!
//! 持有唯一的书库单元：最近一次确认的远端快照 + 可选的本地乐观覆盖层。
//! 写入时先更新覆盖层再整体推送；远端订阅是最终的事实来源。

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{RemoteStorePort, StoreError};
use crate::domain::library::{Library, LibraryEdit};

/// 对外展示的同步状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Idle,
    Syncing,
    Synced,
    Error,
}

/// 书库单元的写入状态机
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteState {
    Idle,
    PendingWrite,
    Confirmed,
    Error,
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// 写入失败后多久把状态恢复为 idle
    pub error_clear_after: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            error_clear_after: Duration::from_secs(3),
        }
    }
}

struct LibraryCell {
    confirmed: Arc<Library>,
    overlay: Option<Arc<Library>>,
    in_flight: usize,
    write_state: WriteState,
    error_epoch: u64,
}

impl LibraryCell {
    fn current(&self) -> Arc<Library> {
        self.overlay
            .as_ref()
            .unwrap_or(&self.confirmed)
            .clone()
    }
}

struct Inner {
    store: Arc<dyn RemoteStorePort>,
    config: GatewayConfig,
    cell: Mutex<LibraryCell>,
    /// 推送串行化：同一时刻只有一个 replace 在途
    push_lock: tokio::sync::Mutex<()>,
    library_tx: watch::Sender<Arc<Library>>,
    status_tx: watch::Sender<SyncStatus>,
}

/// 同步网关（可克隆，克隆共享同一个单元）
#[derive(Clone)]
pub struct SyncGateway {
    inner: Arc<Inner>,
}

/// 订阅句柄，Drop 或 `cancel()` 即退订
pub struct SubscriptionHandle {
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl SubscriptionHandle {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// 取消并等待订阅泵退出
    pub async fn shutdown(mut self) {
        self.token.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

impl SyncGateway {
    pub fn new(store: Arc<dyn RemoteStorePort>, config: GatewayConfig) -> Self {
        let empty = Arc::new(Library::new());
        let (library_tx, _) = watch::channel(empty.clone());
        let (status_tx, _) = watch::channel(SyncStatus::Idle);

        Self {
            inner: Arc::new(Inner {
                store,
                config,
                cell: Mutex::new(LibraryCell {
                    confirmed: empty,
                    overlay: None,
                    in_flight: 0,
                    write_state: WriteState::Idle,
                    error_epoch: 0,
                }),
                push_lock: tokio::sync::Mutex::new(()),
                library_tx,
                status_tx,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LibraryCell> {
        self.inner
            .cell
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// 当前视图（覆盖层优先）
    pub fn snapshot(&self) -> Arc<Library> {
        self.lock().current()
    }

    pub fn write_state(&self) -> WriteState {
        self.lock().write_state
    }

    pub fn status(&self) -> SyncStatus {
        *self.inner.status_tx.borrow()
    }

    pub fn watch_library(&self) -> watch::Receiver<Arc<Library>> {
        self.inner.library_tx.subscribe()
    }

    pub fn watch_status(&self) -> watch::Receiver<SyncStatus> {
        self.inner.status_tx.subscribe()
    }

    /// 订阅远端文档
    ///
    /// 返回前已经收到第一份快照；之后由后台任务持续接收变更。
    pub async fn start(&self) -> Result<SubscriptionHandle, StoreError> {
        let mut subscription = self.inner.store.subscribe().await?;
        if let Some(initial) = subscription.next().await {
            self.receive_remote(initial);
        }

        let token = CancellationToken::new();
        let cancelled = token.clone();
        let gateway = self.clone();

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => {
                        tracing::debug!("Library subscription cancelled");
                        break;
                    }
                    next = subscription.next() => match next {
                        Some(library) => gateway.receive_remote(library),
                        None => {
                            tracing::warn!("Library subscription closed by store");
                            break;
                        }
                    }
                }
            }
        });

        tracing::info!(stories = self.snapshot().len(), "Library subscription started");
        Ok(SubscriptionHandle {
            token,
            task: Some(task),
        })
    }

    /// 处理一份远端快照
    ///
    /// 没有写入在途时丢弃覆盖层；有写入在途时只有快照等于覆盖层才丢弃。
    pub fn receive_remote(&self, remote: Arc<Library>) {
        let current = {
            let mut cell = self.lock();
            cell.confirmed = remote.clone();
            let discard = match &cell.overlay {
                Some(overlay) => cell.in_flight == 0 || **overlay == *remote,
                None => false,
            };
            if discard {
                cell.overlay = None;
            }
            cell.current()
        };

        tracing::trace!(stories = current.len(), "Remote snapshot received");
        self.publish_library(current);
    }

    /// 应用一个编辑并推送整个文档
    pub async fn apply(&self, edit: &LibraryEdit) -> Result<(), StoreError> {
        tracing::debug!(kind = edit.kind(), story = %edit.story(), "Applying library edit");
        self.transform(|library| edit.apply(library)).await
    }

    /// 以任意变换更新文档并推送
    ///
    /// 覆盖层在网络调用前生效；失败不回滚，等待下一份远端快照纠正。
    /// 推送按顺序排队，轮到时推送当时的最新文档，最后落地的一份总包含全部已应用的编辑。
    pub async fn transform<F>(&self, f: F) -> Result<(), StoreError>
    where
        F: FnOnce(Library) -> Library + Send,
    {
        let next = {
            let mut cell = self.lock();
            let next = Arc::new(f((*cell.current()).clone()));
            cell.overlay = Some(next.clone());
            cell.in_flight += 1;
            cell.write_state = WriteState::PendingWrite;
            next
        };
        self.publish_library(next);
        self.inner.status_tx.send_replace(SyncStatus::Syncing);

        let _push = self.inner.push_lock.lock().await;
        let pushed = self.lock().current();

        match self.inner.store.replace(&pushed).await {
            Ok(()) => {
                let settled = {
                    let mut cell = self.lock();
                    cell.in_flight = cell.in_flight.saturating_sub(1);
                    let settled = cell.in_flight == 0;
                    if settled {
                        cell.write_state = WriteState::Confirmed;
                        if cell.overlay.as_ref().is_some_and(|o| Arc::ptr_eq(o, &pushed)) {
                            cell.overlay = None;
                            cell.confirmed = pushed;
                        }
                    }
                    settled
                };
                if settled {
                    self.inner.status_tx.send_replace(SyncStatus::Synced);
                }
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to push library document");
                let epoch = {
                    let mut cell = self.lock();
                    cell.in_flight = cell.in_flight.saturating_sub(1);
                    cell.write_state = WriteState::Error;
                    cell.error_epoch += 1;
                    cell.error_epoch
                };
                self.inner.status_tx.send_replace(SyncStatus::Error);
                self.schedule_error_clear(epoch);
                Err(e)
            }
        }
    }

    fn schedule_error_clear(&self, epoch: u64) {
        let gateway = self.clone();
        let delay = self.inner.config.error_clear_after;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let cleared = {
                let mut cell = gateway.lock();
                let cleared = cell.error_epoch == epoch && cell.write_state == WriteState::Error;
                if cleared {
                    cell.write_state = WriteState::Idle;
                }
                cleared
            };
            if cleared {
                gateway.inner.status_tx.send_replace(SyncStatus::Idle);
            }
        });
    }

    fn publish_library(&self, library: Arc<Library>) {
        self.inner.library_tx.send_if_modified(|current| {
            if Arc::ptr_eq(current, &library) || **current == *library {
                false
            } else {
                *current = library;
                true
            }
        });
    }
}
