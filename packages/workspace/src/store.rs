//! # Page Store
//!
//! Boundary to the backend content store. The editor treats every call as a
//! black box with a binary outcome.
//!
//! Two implementations ship here:
//! - **Memory**: for tests and embedding, with injectable failures
//! - **File**: one JSON document per page in a directory

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagecraft_editor::{Block, FabSettings, FooterSettings, Page, SeoSettings, TypographySettings};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Page not found: {0}")]
    PageNotFound(String),

    #[error("Invalid page id: {0}")]
    InvalidPageId(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed page data: {0}")]
    Json(#[from] serde_json::Error),
}

/// Outcome of a remote save call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveResult {
    pub success: bool,
    pub message: String,
}

impl SaveResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

impl From<Result<(), StoreError>> for SaveResult {
    fn from(result: Result<(), StoreError>) -> Self {
        match result {
            Ok(()) => SaveResult::ok("Saved"),
            Err(e) => SaveResult::failed(e.to_string()),
        }
    }
}

/// Persistence operations the editor depends on
#[async_trait]
pub trait PageStore: Send + Sync {
    async fn load_page(&self, page_id: &str) -> Result<Page, StoreError>;

    async fn update_page_content(&self, page_id: &str, blocks: &[Block]) -> SaveResult;

    async fn update_page_seo(&self, page_id: &str, seo: &SeoSettings) -> SaveResult;

    async fn update_page_fab(&self, page_id: &str, fab: &FabSettings) -> SaveResult;

    async fn update_page_footer(&self, page_id: &str, footer: &FooterSettings) -> SaveResult;

    async fn update_page_typography(&self, page_id: &str, typography: &TypographySettings) -> SaveResult;
}

// =============================================================================
// Memory store
// =============================================================================

/// In-memory store. Content saves can be made to fail or stall on demand.
#[derive(Debug, Default)]
pub struct MemoryPageStore {
    pages: Mutex<HashMap<String, Page>>,

    /// Number of upcoming content saves that fail
    fail_next: AtomicUsize,

    /// Every content save fails while set
    offline: AtomicBool,

    /// Latency of the next content save
    delay_next: Mutex<Option<Duration>>,

    content_saves: AtomicUsize,
}

impl MemoryPageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(page: Page) -> Self {
        let store = Self::new();
        store.insert_page(page);
        store
    }

    pub fn insert_page(&self, page: Page) {
        self.lock().insert(page.id.clone(), page);
    }

    pub fn page(&self, page_id: &str) -> Option<Page> {
        self.lock().get(page_id).cloned()
    }

    pub fn fail_next(&self, count: usize) {
        self.fail_next.store(count, Ordering::SeqCst);
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Stall the next content save for `delay` before it lands
    pub fn delay_next(&self, delay: Duration) {
        *self.delay_next.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(delay);
    }

    /// Number of content save attempts, including failed ones
    pub fn content_saves(&self) -> usize {
        self.content_saves.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Page>> {
        self.pages.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn should_fail(&self) -> bool {
        if self.offline.load(Ordering::SeqCst) {
            return true;
        }
        self.fail_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    fn take_delay(&self) -> Option<Duration> {
        self.delay_next
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
    }

    fn update(&self, page_id: &str, f: impl FnOnce(&mut Page)) -> SaveResult {
        match self.lock().get_mut(page_id) {
            Some(page) => {
                f(page);
                SaveResult::ok("Saved")
            }
            None => SaveResult::failed(StoreError::PageNotFound(page_id.to_string()).to_string()),
        }
    }
}

#[async_trait]
impl PageStore for MemoryPageStore {
    async fn load_page(&self, page_id: &str) -> Result<Page, StoreError> {
        self.page(page_id)
            .ok_or_else(|| StoreError::PageNotFound(page_id.to_string()))
    }

    async fn update_page_content(&self, page_id: &str, blocks: &[Block]) -> SaveResult {
        self.content_saves.fetch_add(1, Ordering::SeqCst);
        // The outcome is decided when the request goes out, the write lands after the delay
        let fail = self.should_fail();
        if let Some(delay) = self.take_delay() {
            tokio::time::sleep(delay).await;
        }
        if fail {
            return SaveResult::failed("Network error");
        }
        self.update(page_id, |page| page.blocks = blocks.to_vec())
    }

    async fn update_page_seo(&self, page_id: &str, seo: &SeoSettings) -> SaveResult {
        self.update(page_id, |page| page.seo = seo.clone())
    }

    async fn update_page_fab(&self, page_id: &str, fab: &FabSettings) -> SaveResult {
        self.update(page_id, |page| page.fab = fab.clone())
    }

    async fn update_page_footer(&self, page_id: &str, footer: &FooterSettings) -> SaveResult {
        self.update(page_id, |page| page.footer = footer.clone())
    }

    async fn update_page_typography(&self, page_id: &str, typography: &TypographySettings) -> SaveResult {
        self.update(page_id, |page| page.typography = typography.clone())
    }
}

// =============================================================================
// File store
// =============================================================================

/// On-disk representation of a page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredPage {
    #[serde(flatten)]
    pub page: Page,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Directory of `<page-id>.json` files
#[derive(Debug, Clone)]
pub struct FilePageStore {
    root: PathBuf,
}

impl FilePageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write a new page, replacing any existing one with the same id
    pub async fn create_page(&self, page: &Page) -> Result<PathBuf, StoreError> {
        tokio::fs::create_dir_all(&self.root).await?;
        let path = self.page_path(&page.id)?;
        self.write(&path, page.clone()).await?;
        Ok(path)
    }

    /// Ids of all pages in the directory
    pub async fn list_pages(&self) -> Result<Vec<String>, StoreError> {
        let mut ids = Vec::new();
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(ids),
            Err(e) => return Err(e.into()),
        };
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    ids.push(stem.to_string());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }

    pub fn page_path(&self, page_id: &str) -> Result<PathBuf, StoreError> {
        let valid = !page_id.is_empty()
            && page_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::InvalidPageId(page_id.to_string()));
        }
        Ok(self.root.join(format!("{}.json", page_id)))
    }

    async fn read(&self, path: &Path, page_id: &str) -> Result<StoredPage, StoreError> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::PageNotFound(page_id.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&content)?)
    }

    async fn write(&self, path: &Path, page: Page) -> Result<(), StoreError> {
        let stored = StoredPage {
            page,
            updated_at: Some(Utc::now()),
        };
        let json = serde_json::to_string_pretty(&stored)?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    async fn modify(&self, page_id: &str, f: impl FnOnce(&mut Page) + Send) -> Result<(), StoreError> {
        let path = self.page_path(page_id)?;
        let mut stored = self.read(&path, page_id).await?;
        f(&mut stored.page);
        self.write(&path, stored.page).await?;
        tracing::debug!(page = page_id, path = %path.display(), "page written");
        Ok(())
    }
}

#[async_trait]
impl PageStore for FilePageStore {
    async fn load_page(&self, page_id: &str) -> Result<Page, StoreError> {
        let path = self.page_path(page_id)?;
        Ok(self.read(&path, page_id).await?.page)
    }

    async fn update_page_content(&self, page_id: &str, blocks: &[Block]) -> SaveResult {
        let blocks = blocks.to_vec();
        self.modify(page_id, move |page| page.blocks = blocks).await.into()
    }

    async fn update_page_seo(&self, page_id: &str, seo: &SeoSettings) -> SaveResult {
        let seo = seo.clone();
        self.modify(page_id, move |page| page.seo = seo).await.into()
    }

    async fn update_page_fab(&self, page_id: &str, fab: &FabSettings) -> SaveResult {
        let fab = fab.clone();
        self.modify(page_id, move |page| page.fab = fab).await.into()
    }

    async fn update_page_footer(&self, page_id: &str, footer: &FooterSettings) -> SaveResult {
        let footer = footer.clone();
        self.modify(page_id, move |page| page.footer = footer).await.into()
    }

    async fn update_page_typography(&self, page_id: &str, typography: &TypographySettings) -> SaveResult {
        let typography = typography.clone();
        self.modify(page_id, move |page| page.typography = typography).await.into()
    }
}
