//! In-Memory Library Store

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::application::ports::{LibrarySubscription, RemoteStorePort, StoreError};
use crate::domain::library::Library;

/// 内存书库文档
///
/// 文档保存在 watch 通道里：replace 即广播给所有订阅者
pub struct InMemoryLibraryStore {
    tx: watch::Sender<Arc<Library>>,
}

impl Default for InMemoryLibraryStore {
    fn default() -> Self {
        Self::with_library(Library::new())
    }
}

impl InMemoryLibraryStore {
    pub fn with_library(library: Library) -> Self {
        let (tx, _) = watch::channel(Arc::new(library));
        Self { tx }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[async_trait]
impl RemoteStorePort for InMemoryLibraryStore {
    async fn load(&self) -> Result<Library, StoreError> {
        Ok((**self.tx.borrow()).clone())
    }

    async fn subscribe(&self) -> Result<LibrarySubscription, StoreError> {
        Ok(LibrarySubscription::new(self.tx.subscribe()))
    }

    async fn replace(&self, library: &Library) -> Result<(), StoreError> {
        self.tx.send_replace(Arc::new(library.clone()));
        tracing::trace!(stories = library.len(), "In-memory library replaced");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::library::Story;

    #[tokio::test]
    async fn test_replace_reaches_subscribers() {
        let store = InMemoryLibraryStore::default();
        let mut sub = store.subscribe().await.unwrap();
        assert!(sub.next().await.unwrap().is_empty());
        assert_eq!(store.subscriber_count(), 1);

        let mut library = Library::new();
        library.insert("A", Story::new(1));
        store.replace(&library).await.unwrap();

        assert!(sub.next().await.unwrap().contains("A"));
        assert_eq!(store.load().await.unwrap(), library);

        drop(sub);
        assert_eq!(store.subscriber_count(), 0);
    }
}
