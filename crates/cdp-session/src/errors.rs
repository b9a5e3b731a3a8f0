use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// High-level failure categories surfaced by the session.
#[derive(Clone, Debug, Error, Serialize, Deserialize)]
pub enum SessionErrorKind {
    #[error("cdp i/o failure")]
    CdpIo,
    #[error("command timed out")]
    Timeout,
    #[error("target node not found")]
    TargetNotFound,
    #[error("script threw an exception")]
    JsException,
    #[error("internal error")]
    Internal,
}

/// Enriched error metadata passed back to the engine layers.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionError {
    pub kind: SessionErrorKind,
    pub hint: Option<String>,
    pub retriable: bool,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(hint) = &self.hint {
            write!(f, ": {}", hint)?;
        }
        Ok(())
    }
}

impl std::error::Error for SessionError {}

impl SessionError {
    pub fn new(kind: SessionErrorKind) -> Self {
        Self {
            kind,
            hint: None,
            retriable: false,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn retriable(mut self, flag: bool) -> Self {
        self.retriable = flag;
        self
    }
}
