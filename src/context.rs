use std::sync::Arc;

use cdp_session::PageSession;
use viewdriver_core_types::{PageId, SessionId};

/// Shared immutable bundle injected into every component: the protocol
/// session handle and the identifiers of the page it is bound to. No other
/// state is shared between operations.
#[derive(Clone)]
pub struct HandlerContext {
    pub session: Arc<dyn PageSession>,
    pub session_id: SessionId,
    pub page: PageId,
}

impl HandlerContext {
    pub fn new(session: Arc<dyn PageSession>) -> Self {
        Self {
            session,
            session_id: SessionId::new(),
            page: PageId::new(),
        }
    }
}
