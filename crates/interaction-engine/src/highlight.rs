//! Scoped visual highlight around the active target.
//!
//! The outline is a debugging aid, not part of the interaction; it must be
//! restored on every exit path, success or failure, so no page is left with
//! stray styling. Application and release are both best-effort.

use serde_json::json;
use tracing::warn;

use cdp_session::{PageSession, ScriptCall};
use element_finder::NodeHandle;

use crate::scripts;

pub struct HighlightGuard<'a> {
    session: &'a dyn PageSession,
    handle: NodeHandle,
    active: bool,
}

impl<'a> HighlightGuard<'a> {
    pub async fn apply(session: &'a dyn PageSession, handle: NodeHandle, enabled: bool) -> Self {
        let mut active = false;
        if enabled {
            let call = ScriptCall::new(scripts::HIGHLIGHT_ON_NAME, scripts::HIGHLIGHT_ON)
                .arg(json!(handle.0));
            match session.evaluate(call).await {
                Ok(value) => active = value.as_bool().unwrap_or(false),
                Err(err) => warn!(%err, "highlight apply failed"),
            }
        }
        Self {
            session,
            handle,
            active,
        }
    }

    /// Restore the element's previous styling. Consumes the guard; callers
    /// invoke this on every path out of the dispatch block.
    pub async fn release(self) {
        if !self.active {
            return;
        }
        let call = ScriptCall::new(scripts::HIGHLIGHT_OFF_NAME, scripts::HIGHLIGHT_OFF)
            .arg(json!(self.handle.0));
        if let Err(err) = self.session.evaluate(call).await {
            warn!(%err, "highlight release failed");
        }
    }
}
