use thiserror::Error;

use cdp_session::SessionError;
use element_finder::FinderError;
use viewdriver_core_types::{DriverError, ErrorKind};

use crate::model::InteractionKind;

#[derive(Debug, Error)]
pub enum InteractError {
    #[error("element is disabled")]
    Disabled,
    #[error("target went stale before dispatch")]
    Stale,
    #[error("focus failed: {0}")]
    Focus(String),
    #[error("no resolvable target: {0}")]
    NoTarget(String),
    #[error("{} dispatch failed: {hint}", .kind.as_str())]
    Dispatch {
        kind: InteractionKind,
        hint: String,
    },
    #[error(transparent)]
    Finder(#[from] FinderError),
    #[error("session failure: {0}")]
    Session(#[from] SessionError),
    /// Every available tier was attempted; carries the ladder so callers can
    /// decide whether to retry with different parameters or give up.
    #[error("{source} (tiers tried: {})", .tiers.join(", "))]
    Exhausted {
        tiers: Vec<&'static str>,
        #[source]
        source: Box<InteractError>,
    },
}

impl InteractError {
    pub fn dispatch(kind: InteractionKind, hint: impl Into<String>) -> Self {
        InteractError::Dispatch {
            kind,
            hint: hint.into(),
        }
    }

    pub fn exhausted(tiers: Vec<&'static str>, source: InteractError) -> Self {
        InteractError::Exhausted {
            tiers,
            source: Box::new(source),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            InteractError::Disabled => ErrorKind::ElementDisabled,
            InteractError::Stale => ErrorKind::StaleElement,
            InteractError::Focus(_) => ErrorKind::FocusFailed,
            InteractError::NoTarget(_) => ErrorKind::NoCandidates,
            InteractError::Dispatch { kind, .. } => match kind {
                InteractionKind::Click => ErrorKind::ClickFailed,
                InteractionKind::Type | InteractionKind::PressKey => ErrorKind::TypeFailed,
                InteractionKind::Select => ErrorKind::SelectFailed,
                InteractionKind::Checkbox => ErrorKind::ToggleFailed,
                InteractionKind::Submit => ErrorKind::SubmitFailed,
                InteractionKind::Scroll => ErrorKind::Protocol,
            },
            InteractError::Finder(err) => err.kind(),
            InteractError::Session(_) => ErrorKind::Protocol,
            InteractError::Exhausted { source, .. } => source.kind(),
        }
    }
}

impl From<InteractError> for DriverError {
    fn from(err: InteractError) -> Self {
        DriverError::new(err.kind(), err.to_string())
    }
}
