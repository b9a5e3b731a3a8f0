//! Typing: focus, optional clear, then one keystroke per character.

use serde_json::json;

use cdp_session::ScriptCall;
use element_finder::NodeHandle;

use crate::click::click_point;
use crate::errors::InteractError;
use crate::keys::{clear_field, press_chord, type_characters};
use crate::model::{KeyMod, TypeParams};
use crate::pipeline::{prepare_node, Deps};
use crate::scripts;

pub(crate) async fn type_into_node(
    deps: &Deps<'_>,
    handle: NodeHandle,
    params: &TypeParams,
) -> Result<(), InteractError> {
    let state = prepare_node(deps, handle).await?;
    if state.disabled {
        return Err(InteractError::Disabled);
    }

    let call = ScriptCall::new(scripts::FOCUS_TARGET_NAME, scripts::FOCUS_TARGET)
        .arg(json!(handle.0));
    let focused = deps.session.evaluate(call).await?;
    if !focused.as_bool().unwrap_or(false) {
        return Err(InteractError::Focus(
            "element did not take focus".to_string(),
        ));
    }
    tokio::time::sleep(deps.policy.phase_delay()).await;

    run_keys(deps, params).await
}

/// Coordinate fallback: click-to-focus at the supplied point, then the same
/// key sequence.
pub(crate) async fn type_at_point(
    deps: &Deps<'_>,
    x: f64,
    y: f64,
    params: &TypeParams,
) -> Result<(), InteractError> {
    click_point(deps, x, y, 1).await?;
    tokio::time::sleep(deps.policy.phase_delay()).await;
    run_keys(deps, params).await
}

async fn run_keys(deps: &Deps<'_>, params: &TypeParams) -> Result<(), InteractError> {
    if params.clear_first {
        clear_field(deps.session, deps.policy).await?;
    }
    // A failure mid-sequence is surfaced as-is: part of the text may already
    // be in the field, and retrying here would double-type it.
    type_characters(deps.session, deps.policy, &params.text).await?;
    if params.press_enter {
        press_chord(deps.session, "Enter", KeyMod::empty()).await?;
    }
    Ok(())
}
