//! Remote Store Port - 远端书库文档
//!
//! 整个书库是一个文档：整体读取、整体覆盖、订阅变更。
//! 具体实现在 infrastructure/memory（测试/开发）与 infrastructure/persistence/sled。

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::watch;

use crate::domain::library::Library;

/// 远端存储错误
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// 书库订阅
///
/// 第一次 `next()` 立即返回当前文档，之后每次远端变更（包括自己写入的回显）返回一次。
/// 变更之间来不及消费时只保留最新的文档。Drop 即取消订阅。
#[derive(Debug)]
pub struct LibrarySubscription {
    rx: watch::Receiver<Arc<Library>>,
    primed: bool,
}

impl LibrarySubscription {
    pub fn new(rx: watch::Receiver<Arc<Library>>) -> Self {
        Self { rx, primed: false }
    }

    /// 等待下一份文档；发布端关闭后返回 `None`
    pub async fn next(&mut self) -> Option<Arc<Library>> {
        if !self.primed {
            self.primed = true;
            return Some(self.rx.borrow_and_update().clone());
        }
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}

/// Remote Store Port
#[async_trait]
pub trait RemoteStorePort: Send + Sync {
    /// 读取当前文档（不存在时为空书库）
    async fn load(&self) -> Result<Library, StoreError>;

    /// 订阅文档变更
    async fn subscribe(&self) -> Result<LibrarySubscription, StoreError>;

    /// 整体覆盖文档
    async fn replace(&self, library: &Library) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::library::Story;

    #[tokio::test]
    async fn test_subscription_yields_current_then_changes() {
        let (tx, rx) = watch::channel(Arc::new(Library::new()));
        let mut sub = LibrarySubscription::new(rx);

        assert!(sub.next().await.unwrap().is_empty());

        let mut library = Library::new();
        library.insert("A", Story::new(1));
        tx.send_replace(Arc::new(library));
        assert!(sub.next().await.unwrap().contains("A"));

        drop(tx);
        assert!(sub.next().await.is_none());
    }
}
