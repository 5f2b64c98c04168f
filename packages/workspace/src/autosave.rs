//! # Auto-save
//!
//! Debounced background saves of the block list.
//!
//! Every edit reschedules a single timer. When the timer fires the current
//! snapshot is sent to the store without any user-facing feedback. Repeated
//! failures raise one persistent warning that offers a manual retry; a
//! manual save always reports its outcome and resets the failure count.
//!
//! Content writes go through a single gate, so they reach the store in the
//! order they were issued. A manual save supersedes any silent save still
//! talking to the store: that save's outcome no longer touches the failure
//! count or the saved version.
//!
//! The editor is optimistic: a failed save never rolls the tree back.

use crate::notifications::{Notification, NotificationAction, Notifier};
use crate::store::{PageStore, SaveResult};
use pagecraft_editor::Block;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;

pub const DEFAULT_DELAY_MS: u64 = 3000;
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoSaveConfig {
    /// Quiet period after the last edit before saving
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Consecutive silent failures before the user is warned
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,
}

fn default_delay_ms() -> u64 {
    DEFAULT_DELAY_MS
}

fn default_failure_threshold() -> u32 {
    DEFAULT_FAILURE_THRESHOLD
}

impl Default for AutoSaveConfig {
    fn default() -> Self {
        Self {
            delay_ms: DEFAULT_DELAY_MS,
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
        }
    }
}

impl AutoSaveConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

#[derive(Debug, Default)]
struct SaveState {
    consecutive_failures: u32,

    /// Threshold warning already shown for the current failure streak
    warned: bool,

    last_saved_version: Option<u64>,

    /// Debounce timer; aborting it cancels the save
    timer: Option<JoinHandle<()>>,

    /// Timer that fired and is now talking to the store
    in_flight: Option<JoinHandle<()>>,

    /// Bumped on every schedule so a superseded timer never saves
    generation: u64,

    /// Bumped on every manual save; silent saves started under an older
    /// epoch have their outcome ignored
    epoch: u64,
}

struct Shared {
    store: Arc<dyn PageStore>,
    notifier: Notifier,
    config: AutoSaveConfig,
    state: Mutex<SaveState>,

    /// Held for the duration of every content write
    write_gate: tokio::sync::Mutex<()>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, SaveState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Called when a timer fires. Returns the current epoch, or `None`
    /// if a newer schedule won.
    fn begin_silent_save(&self, generation: u64) -> Option<u64> {
        let mut state = self.lock();
        if state.generation != generation {
            return None;
        }
        state.in_flight = state.timer.take();
        Some(state.epoch)
    }

    async fn silent_save(&self, page_id: &str, blocks: &[Block], version: u64, generation: u64, epoch: u64) {
        let _gate = self.write_gate.lock().await;
        let superseded = self.lock().generation != generation;
        if superseded {
            tracing::debug!(page = page_id, version, "superseded auto-save skipped");
            return;
        }

        let result = self.store.update_page_content(page_id, blocks).await;
        let mut state = self.lock();

        if state.epoch != epoch {
            tracing::debug!(page = page_id, version, success = result.success, "auto-save overtaken by manual save");
            return;
        }

        if result.success {
            state.consecutive_failures = 0;
            state.warned = false;
            state.record_saved(version);
            tracing::info!(page = page_id, version, "auto-saved");
            return;
        }

        state.consecutive_failures += 1;
        tracing::warn!(
            page = page_id,
            failures = state.consecutive_failures,
            message = %result.message,
            "auto-save failed"
        );

        if state.consecutive_failures >= self.config.failure_threshold && !state.warned {
            state.warned = true;
            self.notifier.notify(
                Notification::warning("Auto-save is failing. Your changes are not being saved.")
                    .persistent()
                    .with_action(NotificationAction::RetrySave),
            );
        }
    }
}

impl SaveState {
    fn record_saved(&mut self, version: u64) {
        self.last_saved_version = Some(self.last_saved_version.map_or(version, |v| v.max(version)));
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

/// Debounced saver for one page
pub struct AutoSaver {
    shared: Arc<Shared>,
}

impl AutoSaver {
    pub fn new(store: Arc<dyn PageStore>, notifier: Notifier, config: AutoSaveConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                store,
                notifier,
                config,
                state: Mutex::new(SaveState::default()),
                write_gate: tokio::sync::Mutex::new(()),
            }),
        }
    }

    pub fn config(&self) -> &AutoSaveConfig {
        &self.shared.config
    }

    /// Restart the debounce timer with the latest snapshot.
    /// Must be called from within a tokio runtime.
    pub fn schedule(&self, page_id: &str, blocks: Vec<Block>, version: u64) {
        let mut state = self.shared.lock();
        state.cancel_timer();
        state.generation += 1;

        let generation = state.generation;
        let shared = Arc::clone(&self.shared);
        let page_id = page_id.to_string();
        let delay = self.shared.config.delay();

        // The lock is held until the handle is stored, so the task
        // cannot observe its own generation before the timer is registered.
        state.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(epoch) = shared.begin_silent_save(generation) {
                shared.silent_save(&page_id, &blocks, version, generation, epoch).await;
            }
        }));
        tracing::trace!(version, delay_ms = delay.as_millis() as u64, "auto-save scheduled");
    }

    /// Manual save: cancels the pending timer, saves as soon as any silent
    /// write already in the store has landed, and always reports the result.
    /// The failure count is reset either way.
    pub async fn save_now(&self, page_id: &str, blocks: &[Block], version: u64) -> SaveResult {
        {
            let mut state = self.shared.lock();
            state.cancel_timer();
            state.generation += 1;
            state.epoch += 1;
        }

        let _gate = self.shared.write_gate.lock().await;
        let result = self.shared.store.update_page_content(page_id, blocks).await;

        let mut state = self.shared.lock();
        state.consecutive_failures = 0;
        state.warned = false;

        if result.success {
            state.record_saved(version);
            tracing::info!(page = page_id, version, "saved");
            self.shared.notifier.notify(Notification::success("Page saved"));
        } else {
            tracing::warn!(page = page_id, message = %result.message, "save failed");
            self.shared
                .notifier
                .notify(Notification::error(format!("Failed to save page: {}", result.message)));
        }
        result
    }

    /// Drop the pending timer without saving
    pub fn cancel(&self) {
        self.shared.lock().cancel_timer();
    }

    /// Wait for a silent save that has already started
    pub async fn settle(&self) {
        let in_flight = self.shared.lock().in_flight.take();
        if let Some(handle) = in_flight {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    tracing::error!(error = %e, "auto-save task panicked");
                }
            }
        }
    }

    pub fn is_pending(&self) -> bool {
        self.shared
            .lock()
            .timer
            .as_ref()
            .map(|t| !t.is_finished())
            .unwrap_or(false)
    }

    pub fn failure_count(&self) -> u32 {
        self.shared.lock().consecutive_failures
    }

    pub fn last_saved_version(&self) -> Option<u64> {
        self.shared.lock().last_saved_version
    }
}

impl Drop for AutoSaver {
    fn drop(&mut self) {
        self.shared.lock().cancel_timer();
    }
}

impl std::fmt::Debug for AutoSaver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.lock();
        f.debug_struct("AutoSaver")
            .field("config", &self.shared.config)
            .field("failures", &state.consecutive_failures)
            .field("last_saved_version", &state.last_saved_version)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::NotificationLevel;
    use crate::store::MemoryPageStore;
    use pagecraft_editor::Page;

    fn setup() -> (Arc<MemoryPageStore>, AutoSaver, tokio::sync::mpsc::UnboundedReceiver<Notification>) {
        let store = Arc::new(MemoryPageStore::with_page(Page::new("home", "Home", "home")));
        let (notifier, rx) = Notifier::channel();
        let saver = AutoSaver::new(store.clone(), notifier, AutoSaveConfig::default());
        (store, saver, rx)
    }

    async fn wait_for_timer() {
        tokio::time::sleep(Duration::from_millis(DEFAULT_DELAY_MS + 1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_silent_save_after_delay() {
        let (store, saver, mut rx) = setup();
        saver.schedule("home", vec![Block::new("Hero").with_id("h")], 1);
        assert!(saver.is_pending());

        tokio::time::sleep(Duration::from_millis(DEFAULT_DELAY_MS - 1)).await;
        assert_eq!(store.content_saves(), 0);

        tokio::time::sleep(Duration::from_millis(2)).await;
        saver.settle().await;
        assert_eq!(store.content_saves(), 1);
        assert_eq!(saver.last_saved_version(), Some(1));
        assert!(rx.try_recv().is_err(), "silent saves emit nothing");
    }

    #[tokio::test(start_paused = true)]
    async fn test_threshold_warning_once() {
        let (store, saver, mut rx) = setup();
        store.set_offline(true);

        for version in 1..=4 {
            saver.schedule("home", Vec::new(), version);
            wait_for_timer().await;
            saver.settle().await;
        }

        assert_eq!(saver.failure_count(), 4);
        let warning = rx.try_recv().unwrap();
        assert_eq!(warning.level, NotificationLevel::Warning);
        assert_eq!(warning.action, Some(NotificationAction::RetrySave));
        assert!(rx.try_recv().is_err());
    }

    fn ids(store: &MemoryPageStore) -> Vec<String> {
        store
            .page("home")
            .unwrap()
            .blocks
            .iter()
            .map(|b| b.id.to_string())
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_save_lands_after_in_flight_silent_save() {
        let (store, saver, mut rx) = setup();
        store.delay_next(Duration::from_secs(5));

        saver.schedule("home", vec![Block::new("Hero").with_id("old")], 1);
        wait_for_timer().await;
        assert_eq!(store.content_saves(), 1, "silent save is talking to the store");

        let result = saver.save_now("home", &[Block::new("Hero").with_id("new")], 2).await;
        saver.settle().await;

        assert!(result.success);
        assert_eq!(ids(&store), vec!["new"]);
        assert_eq!(saver.last_saved_version(), Some(2));
        assert_eq!(rx.try_recv().unwrap().level, NotificationLevel::Success);
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_silent_failure_does_not_count_after_manual_save() {
        let (store, saver, mut rx) = setup();
        store.fail_next(1);
        store.delay_next(Duration::from_secs(5));

        saver.schedule("home", Vec::new(), 1);
        wait_for_timer().await;

        let result = saver.save_now("home", &[Block::new("Text").with_id("t")], 2).await;
        saver.settle().await;

        assert!(result.success);
        assert_eq!(saver.failure_count(), 0);
        assert_eq!(rx.try_recv().unwrap().level, NotificationLevel::Success);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_save() {
        let (store, saver, _rx) = setup();
        saver.schedule("home", Vec::new(), 1);
        saver.cancel();
        wait_for_timer().await;

        assert_eq!(store.content_saves(), 0);
        assert!(!saver.is_pending());
    }

    #[test]
    fn test_config_defaults_from_partial_json() {
        let config: AutoSaveConfig = serde_json::from_str(r#"{"delayMs": 500}"#).unwrap();
        assert_eq!(config.delay_ms, 500);
        assert_eq!(config.failure_threshold, DEFAULT_FAILURE_THRESHOLD);
    }
}
