//! Shared pipeline steps: target acquisition, geometry reads, settling.

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;
use viewdriver_core_types::Rect;

use cdp_session::{PageSession, ScriptCall};
use element_finder::NodeHandle;

use crate::errors::InteractError;
use crate::model::{TargetRequest, Tier};
use crate::policy::InteractPolicy;
use crate::ports::FinderPort;
use crate::scripts;

pub struct Deps<'a> {
    pub session: &'a dyn PageSession,
    pub finder: &'a dyn FinderPort,
    pub policy: &'a InteractPolicy,
}

/// A target the ladder has pinned down for this attempt.
#[derive(Clone, Debug)]
pub enum Acquired {
    /// A live in-page node reference; interactions run as synthetic page
    /// events against it.
    Node { handle: NodeHandle },
    /// Raw screen coordinates; interactions fall back to native protocol
    /// input events.
    Point { x: f64, y: f64 },
}

/// Pin down the target for one tier. Geometry for node targets is read
/// later, immediately before dispatch, because it may shift in between.
pub async fn acquire(
    deps: &Deps<'_>,
    tier: Tier,
    target: &TargetRequest,
) -> Result<Acquired, InteractError> {
    match tier {
        Tier::Handle => {
            let handle = target
                .handle
                .ok_or_else(|| InteractError::NoTarget("no node handle supplied".into()))?;
            Ok(Acquired::Node { handle })
        }
        Tier::Descriptor => {
            let descriptor = target
                .descriptor
                .as_ref()
                .ok_or_else(|| InteractError::NoTarget("no descriptor supplied".into()))?;
            let resolution = deps.finder.resolve(descriptor).await?;
            debug!(
                score = resolution.score,
                candidates = resolution.candidate_count,
                "descriptor resolved"
            );
            Ok(Acquired::Node {
                handle: resolution.target.handle,
            })
        }
        Tier::Position => {
            let (x, y) = target
                .position
                .ok_or_else(|| InteractError::NoTarget("no screen position supplied".into()))?;
            Ok(Acquired::Point { x, y })
        }
    }
}

/// Live state of a node-handle target, read fresh from the page.
#[derive(Clone, Debug, Deserialize)]
pub struct TargetState {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub focusable: bool,
    #[serde(default)]
    pub editable: bool,
    #[serde(default)]
    pub visible: bool,
}

impl TargetState {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn center(&self) -> (f64, f64) {
        self.rect().center()
    }
}

/// Read the target's current geometry and flags; `null` means the registry
/// entry is gone or detached, i.e. the DOM re-rendered underneath us.
pub async fn read_state(
    session: &dyn PageSession,
    handle: NodeHandle,
) -> Result<TargetState, InteractError> {
    let call = ScriptCall::new(scripts::TARGET_STATE_NAME, scripts::TARGET_STATE)
        .arg(json!(handle.0));
    let value = session.evaluate(call).await?;
    if value.is_null() {
        return Err(InteractError::Stale);
    }
    serde_json::from_value(value).map_err(|_| InteractError::Stale)
}

/// Scroll the node to viewport center, wait for layout to settle, then
/// re-read geometry (coordinates may have shifted during the scroll).
pub async fn prepare_node(
    deps: &Deps<'_>,
    handle: NodeHandle,
) -> Result<TargetState, InteractError> {
    let call = ScriptCall::new(scripts::SCROLL_INTO_VIEW_NAME, scripts::SCROLL_INTO_VIEW)
        .arg(json!(handle.0));
    let scrolled = deps.session.evaluate(call).await?;
    if scrolled == Value::Bool(false) {
        return Err(InteractError::Stale);
    }
    tokio::time::sleep(deps.policy.settle()).await;
    read_state(deps.session, handle).await
}
