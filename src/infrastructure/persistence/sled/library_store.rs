//! Sled-based Library Store
//!
//! 书库文档以 JSON 字节保存在单个键下，进程重启后仍然存在；
//! 写入落盘后广播给订阅者。

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use sled::Db;
use tokio::sync::{watch, Mutex};

use crate::application::ports::{LibrarySubscription, RemoteStorePort, StoreError};
use crate::domain::library::Library;

const LIBRARY_KEY: &[u8] = b"library";

/// Sled 书库存储配置
#[derive(Debug, Clone)]
pub struct SledLibraryConfig {
    /// 数据库路径
    pub db_path: String,
}

impl Default for SledLibraryConfig {
    fn default() -> Self {
        Self {
            db_path: "data/library.sled".to_string(),
        }
    }
}

/// Sled 书库存储
pub struct SledLibraryStore {
    db: Db,
    tx: watch::Sender<Arc<Library>>,
    /// 串行化写入，保证落盘顺序与广播顺序一致
    write_lock: Mutex<()>,
}

impl SledLibraryStore {
    pub fn new(config: &SledLibraryConfig) -> Result<Self, StoreError> {
        let db = sled::open(&config.db_path).map_err(|e| StoreError::Storage(e.to_string()))?;
        let library = Self::read(&db)?;

        tracing::info!(
            db_path = %config.db_path,
            stories = library.len(),
            "SledLibraryStore initialized"
        );

        let (tx, _) = watch::channel(Arc::new(library));
        Ok(Self {
            db,
            tx,
            write_lock: Mutex::new(()),
        })
    }

    /// 打开现有存储
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        Self::new(&SledLibraryConfig {
            db_path: path.as_ref().to_string_lossy().to_string(),
        })
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    fn read(db: &Db) -> Result<Library, StoreError> {
        match db
            .get(LIBRARY_KEY)
            .map_err(|e| StoreError::Storage(e.to_string()))?
        {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| StoreError::Serialization(e.to_string())),
            None => Ok(Library::new()),
        }
    }
}

#[async_trait]
impl RemoteStorePort for SledLibraryStore {
    async fn load(&self) -> Result<Library, StoreError> {
        Ok((**self.tx.borrow()).clone())
    }

    async fn subscribe(&self) -> Result<LibrarySubscription, StoreError> {
        Ok(LibrarySubscription::new(self.tx.subscribe()))
    }

    async fn replace(&self, library: &Library) -> Result<(), StoreError> {
        let bytes =
            serde_json::to_vec(library).map_err(|e| StoreError::Serialization(e.to_string()))?;

        let _guard = self.write_lock.lock().await;
        self.db
            .insert(LIBRARY_KEY, bytes.as_slice())
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        self.db
            .flush_async()
            .await
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        self.tx.send_replace(Arc::new(library.clone()));
        tracing::debug!(stories = library.len(), bytes = bytes.len(), "Library document persisted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::library::{LibraryEdit, Story};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_document_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("library.sled");

        {
            let store = SledLibraryStore::open(&path).unwrap();
            assert!(store.load().await.unwrap().is_empty());

            let mut library = Library::new();
            library.insert("A", Story::new(5).with_chapter("1", "one"));
            let library = LibraryEdit::set_read_to_index("A", "1", 2).apply_at(library, 5);
            store.replace(&library).await.unwrap();
        }

        let store = SledLibraryStore::open(&path).unwrap();
        let library = store.load().await.unwrap();
        let story = library.story("A").unwrap();
        assert_eq!(story.chapter("1"), Some("one"));
        assert_eq!(story.bookmark.as_ref().unwrap().read_to_index, Some(2));
    }

    #[tokio::test]
    async fn test_replace_notifies_subscribers() {
        let dir = TempDir::new().unwrap();
        let store = SledLibraryStore::open(dir.path().join("db")).unwrap();
        let mut sub = store.subscribe().await.unwrap();
        assert!(sub.next().await.unwrap().is_empty());

        let mut library = Library::new();
        library.insert("B", Story::new(1));
        store.replace(&library).await.unwrap();
        assert!(sub.next().await.unwrap().contains("B"));
    }

    #[tokio::test]
    async fn test_reads_document_written_by_other_clients() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db");
        {
            let db = sled::open(&path).unwrap();
            db.insert(
                LIBRARY_KEY,
                br#"{"X":{"chapters":{"2":"b","1":"a"},"lastModified":9,"tags":{"0":"t"}}}"#.as_slice(),
            )
            .unwrap();
            db.flush().unwrap();
        }

        let library = SledLibraryStore::open(&path).unwrap().load().await.unwrap();
        let story = library.story("X").unwrap();
        assert_eq!(story.tags, vec!["t"]);
        assert_eq!(story.chapters.keys().collect::<Vec<_>>(), vec!["2", "1"]);
    }
}
