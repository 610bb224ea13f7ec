//! Audit storage backends.

use crate::error::AuditError;
use crate::event::AuditEvent;
use crate::logger::AuditFilter;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use taskward_core::config::DEFAULT_RETAINED_EVENTS;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

/// Trait for audit storage backends.
#[async_trait]
pub trait AuditStorage: Send + Sync {
    /// Store an audit event.
    async fn store(&self, event: AuditEvent) -> Result<(), AuditError>;

    /// Query audit events, newest first.
    async fn query(&self, filter: AuditFilter) -> Result<Vec<AuditEvent>, AuditError>;

    /// Get an audit event by ID.
    async fn get(&self, event_id: Uuid) -> Result<Option<AuditEvent>, AuditError>;
}

/// The newest `capacity` events, oldest at the front.
struct Retained {
    capacity: usize,
    events: VecDeque<AuditEvent>,
}

impl Retained {
    fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            events: VecDeque::new(),
        }
    }

    fn push(&mut self, event: AuditEvent) {
        if self.events.len() == self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    fn find(&self, event_id: Uuid) -> Option<AuditEvent> {
        self.events.iter().find(|e| e.event_id == event_id).cloned()
    }
}

/// Match, sort newest first, page.
fn select(events: &VecDeque<AuditEvent>, filter: &AuditFilter) -> Vec<AuditEvent> {
    // Reverse insertion order first so equal timestamps stay newest-first.
    let mut results: Vec<AuditEvent> = events
        .iter()
        .rev()
        .filter(|event| filter.matches(event))
        .cloned()
        .collect();

    results.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));

    results
        .into_iter()
        .skip(filter.offset.unwrap_or(0))
        .take(filter.limit.unwrap_or(usize::MAX))
        .collect()
}

/// Process-local storage holding the newest events only.
pub struct MemoryStorage {
    events: RwLock<Retained>,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::with_retention(DEFAULT_RETAINED_EVENTS)
    }
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `retained` events; the oldest are dropped first.
    pub fn with_retention(retained: usize) -> Self {
        Self {
            events: RwLock::new(Retained::new(retained)),
        }
    }

    pub async fn len(&self) -> usize {
        self.events.read().await.events.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.events.read().await.events.is_empty()
    }
}

#[async_trait]
impl AuditStorage for MemoryStorage {
    async fn store(&self, event: AuditEvent) -> Result<(), AuditError> {
        self.events.write().await.push(event);
        Ok(())
    }

    async fn query(&self, filter: AuditFilter) -> Result<Vec<AuditEvent>, AuditError> {
        Ok(select(&self.events.read().await.events, &filter))
    }

    async fn get(&self, event_id: Uuid) -> Result<Option<AuditEvent>, AuditError> {
        Ok(self.events.read().await.find(event_id))
    }
}

/// Console storage (human-readable lines on stdout). Not queryable.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleStorage;

impl ConsoleStorage {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AuditStorage for ConsoleStorage {
    async fn store(&self, event: AuditEvent) -> Result<(), AuditError> {
        println!("{}", event.to_log_line());
        Ok(())
    }

    async fn query(&self, _filter: AuditFilter) -> Result<Vec<AuditEvent>, AuditError> {
        Ok(vec![])
    }

    async fn get(&self, _event_id: Uuid) -> Result<Option<AuditEvent>, AuditError> {
        Ok(None)
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullStorage;

impl NullStorage {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AuditStorage for NullStorage {
    async fn store(&self, _event: AuditEvent) -> Result<(), AuditError> {
        Ok(())
    }

    async fn query(&self, _filter: AuditFilter) -> Result<Vec<AuditEvent>, AuditError> {
        Ok(vec![])
    }

    async fn get(&self, _event_id: Uuid) -> Result<Option<AuditEvent>, AuditError> {
        Ok(None)
    }
}

/// JSON Lines file storage.
///
/// Every event is appended to the file. Queries see the newest retained
/// events, including the tail of previous runs loaded on open.
pub struct FileStorage {
    path: PathBuf,
    writer: Mutex<std::fs::File>,
    events: RwLock<Retained>,
}

impl FileStorage {
    /// Open (or create) the log at `path` with the default retention.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AuditError> {
        Self::open_with_retention(path, DEFAULT_RETAINED_EVENTS)
    }

    /// Open (or create) the log at `path`, keeping `retained` events in memory.
    pub fn open_with_retention(
        path: impl AsRef<Path>,
        retained: usize,
    ) -> Result<Self, AuditError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let mut events = Retained::new(retained);
        if path.exists() {
            Self::load(&path, &mut events)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;

        tracing::debug!(path = %path.display(), loaded = events.events.len(), "Opened audit log");

        Ok(Self {
            path,
            writer: Mutex::new(file),
            events: RwLock::new(events),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(path: &Path, events: &mut Retained) -> Result<(), AuditError> {
        let reader = std::io::BufReader::new(std::fs::File::open(path)?);
        for (number, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<AuditEvent>(&line) {
                Ok(event) => events.push(event),
                Err(e) => tracing::warn!(
                    path = %path.display(),
                    line = number + 1,
                    error = %e,
                    "Skipping unreadable audit line"
                ),
            }
        }
        Ok(())
    }
}

#[async_trait]
impl AuditStorage for FileStorage {
    async fn store(&self, event: AuditEvent) -> Result<(), AuditError> {
        let json = serde_json::to_string(&event)?;
        {
            let mut file = self.writer.lock().await;
            writeln!(file, "{json}")?;
            file.flush()?;
        }
        self.events.write().await.push(event);
        Ok(())
    }

    async fn query(&self, filter: AuditFilter) -> Result<Vec<AuditEvent>, AuditError> {
        Ok(select(&self.events.read().await.events, &filter))
    }

    async fn get(&self, event_id: Uuid) -> Result<Option<AuditEvent>, AuditError> {
        Ok(self.events.read().await.find(event_id))
    }
}

/// Stores into a primary backend and echoes each event to the console.
pub struct DualStorage {
    primary: Arc<dyn AuditStorage>,
    console: ConsoleStorage,
}

impl DualStorage {
    pub fn new(primary: Arc<dyn AuditStorage>) -> Self {
        Self {
            primary,
            console: ConsoleStorage,
        }
    }
}

#[async_trait]
impl AuditStorage for DualStorage {
    async fn store(&self, event: AuditEvent) -> Result<(), AuditError> {
        self.console.store(event.clone()).await?;
        self.primary.store(event).await
    }

    async fn query(&self, filter: AuditFilter) -> Result<Vec<AuditEvent>, AuditError> {
        self.primary.query(filter).await
    }

    async fn get(&self, event_id: Uuid) -> Result<Option<AuditEvent>, AuditError> {
        self.primary.get(event_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::AuditAction;
    use chrono::{Duration, Utc};
    use taskward_core::UserId;

    fn event(action: AuditAction, user: i64, minutes_ago: i64) -> AuditEvent {
        AuditEvent::builder(action, "task")
            .user_id(UserId(user))
            .occurred_at(Utc::now() - Duration::minutes(minutes_ago))
            .build()
    }

    #[tokio::test]
    async fn test_memory_storage_newest_first() {
        let storage = MemoryStorage::new();
        storage.store(event(AuditAction::CreateTask, 1, 10)).await.unwrap();
        storage.store(event(AuditAction::ViewTask, 1, 1)).await.unwrap();
        storage.store(event(AuditAction::DeleteTask, 1, 5)).await.unwrap();

        let results = storage.query(AuditFilter::default()).await.unwrap();
        let actions: Vec<_> = results.iter().map(|e| e.action).collect();
        assert_eq!(
            actions,
            vec![AuditAction::ViewTask, AuditAction::DeleteTask, AuditAction::CreateTask]
        );
    }

    #[tokio::test]
    async fn test_memory_storage_filters_and_pages() {
        let storage = MemoryStorage::new();
        for minutes in 0..5 {
            storage.store(event(AuditAction::ViewTasks, 1, minutes)).await.unwrap();
        }
        storage.store(event(AuditAction::ViewTasks, 2, 0)).await.unwrap();

        let filter = AuditFilter {
            user_id: Some(UserId(1)),
            offset: Some(1),
            limit: Some(2),
            ..Default::default()
        };
        let results = storage.query(filter).await.unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|e| e.user_id == Some(UserId(1))));
        assert_eq!(storage.len().await, 6);
    }

    #[tokio::test]
    async fn test_memory_storage_drops_oldest_beyond_retention() {
        let storage = MemoryStorage::with_retention(3);
        let mut ids = Vec::new();
        for minutes in (0..5).rev() {
            let e = event(AuditAction::ViewTasks, 1, minutes);
            ids.push(e.event_id);
            storage.store(e).await.unwrap();
        }

        assert_eq!(storage.len().await, 3);
        assert!(storage.get(ids[0]).await.unwrap().is_none());
        assert!(storage.get(ids[1]).await.unwrap().is_none());
        let kept: Vec<_> = storage
            .query(AuditFilter::default())
            .await
            .unwrap()
            .iter()
            .map(|e| e.event_id)
            .collect();
        assert_eq!(kept, vec![ids[4], ids[3], ids[2]]);
    }

    #[tokio::test]
    async fn test_console_and_null_are_not_queryable() {
        let console = ConsoleStorage::new();
        console.store(event(AuditAction::Login, 1, 0)).await.unwrap();
        assert!(console.query(AuditFilter::default()).await.unwrap().is_empty());

        let null = NullStorage::new();
        let e = event(AuditAction::Login, 1, 0);
        let id = e.event_id;
        null.store(e).await.unwrap();
        assert!(null.get(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_dual_storage_queries_primary() {
        let primary = Arc::new(MemoryStorage::new());
        let dual = DualStorage::new(primary.clone());
        let e = event(AuditAction::Logout, 4, 0);
        let id = e.event_id;
        dual.store(e).await.unwrap();

        assert_eq!(primary.len().await, 1);
        assert!(dual.get(id).await.unwrap().is_some());
    }
}
