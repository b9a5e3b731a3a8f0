//! Checkbox/switch toggling. Idempotent by contract: when the current state
//! already matches the requested one, no events are dispatched.

use serde::Deserialize;
use serde_json::json;

use cdp_session::ScriptCall;
use element_finder::NodeHandle;

use crate::errors::InteractError;
use crate::pipeline::{prepare_node, Deps};
use crate::scripts;

#[derive(Debug, Deserialize)]
struct ToggleOutcome {
    changed: bool,
    checked: bool,
}

pub(crate) async fn toggle_node(
    deps: &Deps<'_>,
    handle: NodeHandle,
    desired: bool,
) -> Result<(bool, bool), InteractError> {
    let state = prepare_node(deps, handle).await?;
    if state.disabled {
        return Err(InteractError::Disabled);
    }

    let call = ScriptCall::new(scripts::TOGGLE_CHECKBOX_NAME, scripts::TOGGLE_CHECKBOX)
        .arg(json!(handle.0))
        .arg(json!(desired));
    let value = deps.session.evaluate(call).await?;
    if value.is_null() {
        return Err(InteractError::Stale);
    }
    let outcome: ToggleOutcome =
        serde_json::from_value(value).map_err(|_| InteractError::Stale)?;
    Ok((outcome.checked, outcome.changed))
}
