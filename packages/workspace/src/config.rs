//! Session configuration

use crate::autosave::AutoSaveConfig;
use pagecraft_editor::DEFAULT_MAX_LEVELS;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryConfig {
    /// Undo depth (0 = unlimited)
    #[serde(default = "default_max_levels")]
    pub max_levels: usize,
}

fn default_max_levels() -> usize {
    DEFAULT_MAX_LEVELS
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_levels: DEFAULT_MAX_LEVELS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    #[serde(default)]
    pub autosave: AutoSaveConfig,

    #[serde(default)]
    pub history: HistoryConfig,
}
