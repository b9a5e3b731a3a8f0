use thiserror::Error;

use cdp_session::SessionError;
use viewdriver_core_types::{DriverError, ErrorKind};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("accessibility tree is empty")]
    NoNodesFound,
    #[error("session failure: {0}")]
    Session(#[from] SessionError),
}

impl SnapshotError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SnapshotError::NoNodesFound => ErrorKind::NoNodesFound,
            SnapshotError::Session(_) => ErrorKind::Protocol,
        }
    }
}

impl From<SnapshotError> for DriverError {
    fn from(err: SnapshotError) -> Self {
        DriverError::new(err.kind(), err.to_string())
    }
}
