//! Option selection on `<select>` controls.

use serde::Deserialize;
use serde_json::json;

use cdp_session::{evaluate_typed, ScriptCall};
use element_finder::NodeHandle;

use crate::errors::InteractError;
use crate::model::{InteractionKind, SelectChoice};
use crate::pipeline::{prepare_node, Deps};
use crate::scripts;

#[derive(Debug, Deserialize)]
struct SelectOutcome {
    ok: bool,
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    reason: Option<String>,
}

pub(crate) async fn select_on_node(
    deps: &Deps<'_>,
    handle: NodeHandle,
    choice: &SelectChoice,
) -> Result<(String, String), InteractError> {
    let state = prepare_node(deps, handle).await?;
    if state.disabled {
        return Err(InteractError::Disabled);
    }

    let call = ScriptCall::new(scripts::SELECT_OPTION_NAME, scripts::SELECT_OPTION)
        .arg(json!(handle.0))
        .arg(json!(choice.value))
        .arg(json!(choice.label))
        .arg(json!(choice.index));
    let outcome: SelectOutcome = evaluate_typed(deps.session, call).await?;

    if !outcome.ok {
        return match outcome.reason.as_deref() {
            Some("stale") => Err(InteractError::Stale),
            Some(reason) => Err(InteractError::dispatch(InteractionKind::Select, reason)),
            None => Err(InteractError::dispatch(
                InteractionKind::Select,
                "selection rejected",
            )),
        };
    }
    Ok((
        outcome.value.unwrap_or_default(),
        outcome.label.unwrap_or_default(),
    ))
}
