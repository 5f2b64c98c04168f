//! Error types for the editor

use crate::drag::DropRejection;
use crate::mutations::MutationError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditorError {
    #[error("{0}")]
    Mutation(#[from] MutationError),

    #[error("{0}")]
    Rejected(#[from] DropRejection),

    #[error("Clipboard is empty")]
    ClipboardEmpty,
}

impl EditorError {
    /// Validation errors are reported to the user and leave state unchanged
    pub fn is_validation(&self) -> bool {
        !matches!(self, EditorError::Mutation(MutationError::InvalidTree(_)))
    }

    /// Text for the transient warning shown to the user
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}
