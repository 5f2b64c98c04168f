//! # Editor Session
//!
//! One open page: the [`Editor`] context bound to a page store, an
//! auto-saver and the notification channel.
//!
//! Every successful edit reschedules the auto-save. Rejected edits are
//! reported as transient warnings and leave the page untouched.

use crate::autosave::AutoSaver;
use crate::config::SessionConfig;
use crate::notifications::{Notification, NotificationAction, Notifier};
use crate::store::{PageStore, SaveResult, StoreError};
use pagecraft_editor::{
    BlockId, ComponentRegistry, DragEnd, Editor, EditorError, FabSettings, FooterSettings, Mutation,
    MutationOutcome, Page, SeoSettings, TypographySettings,
};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Failed to load page: {0}")]
    Store(#[from] StoreError),

    #[error("Stored page is invalid: {0}")]
    Editor(#[from] EditorError),
}

pub struct EditorSession {
    /// Page metadata; `blocks` is kept empty while the editor owns them
    page: Page,
    editor: Editor,
    store: Arc<dyn PageStore>,
    saver: AutoSaver,
    notifier: Notifier,
}

impl EditorSession {
    /// Load `page_id` from the store and open it
    pub async fn open(
        page_id: &str,
        store: Arc<dyn PageStore>,
        registry: Arc<dyn ComponentRegistry>,
        notifier: Notifier,
        config: &SessionConfig,
    ) -> Result<Self, SessionError> {
        let page = store.load_page(page_id).await?;
        Self::new(page, store, registry, notifier, config)
    }

    /// Open an already loaded page
    pub fn new(
        mut page: Page,
        store: Arc<dyn PageStore>,
        registry: Arc<dyn ComponentRegistry>,
        notifier: Notifier,
        config: &SessionConfig,
    ) -> Result<Self, SessionError> {
        let blocks = std::mem::take(&mut page.blocks);
        let mut editor = Editor::with_max_history(registry, config.history.max_levels);
        editor.replace_blocks(blocks)?;

        let saver = AutoSaver::new(Arc::clone(&store), notifier.clone(), config.autosave.clone());
        tracing::info!(page = %page.id, blocks = editor.blocks().len(), "page opened");

        Ok(Self {
            page,
            editor,
            store,
            saver,
            notifier,
        })
    }

    pub fn page_id(&self) -> &str {
        &self.page.id
    }

    /// Page metadata (without blocks)
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// The full page including the current blocks
    pub fn to_page(&self) -> Page {
        Page {
            blocks: self.editor.snapshot(),
            ..self.page.clone()
        }
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn saver(&self) -> &AutoSaver {
        &self.saver
    }

    /// Unsaved edits exist. Follows auto-saves that already landed.
    pub fn is_dirty(&self) -> bool {
        let landed = self
            .saver
            .last_saved_version()
            .map_or(false, |saved| saved >= self.editor.version());
        self.editor.is_dirty() && !landed
    }

    /// Run an edit against the editor. Any change schedules an auto-save;
    /// an error becomes a transient warning and is returned.
    pub fn edit<T, F>(&mut self, f: F) -> Result<T, EditorError>
    where
        F: FnOnce(&mut Editor) -> Result<T, EditorError>,
    {
        self.sync_saved();
        let version = self.editor.version();
        match f(&mut self.editor) {
            Ok(value) => {
                if self.editor.version() != version {
                    self.schedule_save();
                }
                Ok(value)
            }
            Err(err) => {
                self.notifier.notify(Notification::warning(err.user_message()));
                Err(err)
            }
        }
    }

    pub fn apply(&mut self, mutation: Mutation) -> Result<MutationOutcome, EditorError> {
        self.edit(|editor| editor.apply(mutation))
    }

    pub fn handle_drag_end(&mut self, drag: &DragEnd) -> Result<Option<BlockId>, EditorError> {
        self.edit(|editor| editor.handle_drag_end(drag))
    }

    pub fn undo(&mut self) -> bool {
        self.sync_saved();
        let undone = self.editor.undo();
        if undone {
            self.schedule_save();
        }
        undone
    }

    pub fn redo(&mut self) -> bool {
        self.sync_saved();
        let redone = self.editor.redo();
        if redone {
            self.schedule_save();
        }
        redone
    }

    /// Manual save of the block list
    pub async fn save(&mut self) -> SaveResult {
        let version = self.editor.version();
        let blocks = self.editor.snapshot();
        let result = self.saver.save_now(&self.page.id, &blocks, version).await;
        if result.success {
            self.editor.mark_saved(version);
        }
        result
    }

    /// Respond to a notification action
    pub async fn handle_action(&mut self, action: &NotificationAction) -> SaveResult {
        match action {
            NotificationAction::RetrySave => self.save().await,
        }
    }

    pub async fn save_seo(&mut self, seo: SeoSettings) -> SaveResult {
        let result = self.store.update_page_seo(&self.page.id, &seo).await;
        self.report("SEO settings", &result);
        if result.success {
            self.page.seo = seo;
        }
        result
    }

    pub async fn save_fab(&mut self, fab: FabSettings) -> SaveResult {
        let result = self.store.update_page_fab(&self.page.id, &fab).await;
        self.report("Floating button", &result);
        if result.success {
            self.page.fab = fab;
        }
        result
    }

    pub async fn save_footer(&mut self, footer: FooterSettings) -> SaveResult {
        let result = self.store.update_page_footer(&self.page.id, &footer).await;
        self.report("Footer", &result);
        if result.success {
            self.page.footer = footer;
        }
        result
    }

    pub async fn save_typography(&mut self, typography: TypographySettings) -> SaveResult {
        let result = self.store.update_page_typography(&self.page.id, &typography).await;
        self.report("Typography", &result);
        if result.success {
            self.page.typography = typography;
        }
        result
    }

    /// Wait for an in-flight auto-save and sync the dirty flag with it
    pub async fn settle(&mut self) {
        self.saver.settle().await;
        self.sync_saved();
    }

    /// Stop pending timers. Unsaved changes are not flushed.
    pub fn close(self) {
        self.saver.cancel();
        tracing::info!(page = %self.page.id, dirty = self.editor.is_dirty(), "page closed");
    }

    fn sync_saved(&mut self) {
        if let Some(version) = self.saver.last_saved_version() {
            self.editor.mark_saved(version);
        }
    }

    fn schedule_save(&self) {
        self.saver
            .schedule(&self.page.id, self.editor.snapshot(), self.editor.version());
    }

    fn report(&self, what: &str, result: &SaveResult) {
        if result.success {
            tracing::info!(page = %self.page.id, what, "settings saved");
            self.notifier.notify(Notification::success(format!("{} saved", what)));
        } else {
            tracing::warn!(page = %self.page.id, what, message = %result.message, "settings save failed");
            self.notifier
                .notify(Notification::error(format!("Failed to save {}: {}", what.to_lowercase(), result.message)));
        }
    }
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("page", &self.page.id)
            .field("editor", &self.editor)
            .field("saver", &self.saver)
            .finish()
    }
}
