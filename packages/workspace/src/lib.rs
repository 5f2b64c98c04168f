//! # Pagecraft Workspace
//!
//! Everything around the editor core that talks to the outside world:
//! the page store boundary, debounced auto-save, notifications and the
//! [`EditorSession`] that ties them to one open page.

pub mod autosave;
pub mod config;
pub mod notifications;
pub mod session;
pub mod store;

pub use autosave::{AutoSaveConfig, AutoSaver};
pub use config::{HistoryConfig, SessionConfig};
pub use notifications::{Notification, NotificationAction, NotificationLevel, Notifier};
pub use session::{EditorSession, SessionError};
pub use store::{FilePageStore, MemoryPageStore, PageStore, SaveResult, StoreError, StoredPage};
