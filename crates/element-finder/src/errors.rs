use thiserror::Error;

use cdp_session::SessionError;
use viewdriver_core_types::{DriverError, ErrorKind};

#[derive(Debug, Error)]
pub enum FinderError {
    #[error("candidate search returned no elements")]
    NoCandidates,
    #[error("scoring eliminated every candidate")]
    NoScoredMatch,
    #[error("session failure: {0}")]
    Session(#[from] SessionError),
}

impl FinderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FinderError::NoCandidates => ErrorKind::NoCandidates,
            FinderError::NoScoredMatch => ErrorKind::NoScoredMatch,
            FinderError::Session(_) => ErrorKind::Protocol,
        }
    }
}

impl From<FinderError> for DriverError {
    fn from(err: FinderError) -> Self {
        DriverError::new(err.kind(), err.to_string())
    }
}
