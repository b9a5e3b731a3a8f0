//! Click dispatch: synthetic page events for node targets, native protocol
//! input for raw coordinates.

use serde_json::{json, Value};

use cdp_session::{MouseButton, MouseEventSpec, ScriptCall};
use element_finder::NodeHandle;

use crate::errors::InteractError;
use crate::highlight::HighlightGuard;
use crate::model::InteractionKind;
use crate::pipeline::{prepare_node, Deps};
use crate::scripts;

pub(crate) async fn click_node(
    deps: &Deps<'_>,
    handle: NodeHandle,
    click_count: u8,
) -> Result<(), InteractError> {
    let state = prepare_node(deps, handle).await?;
    if state.disabled {
        return Err(InteractError::Disabled);
    }
    let (x, y) = state.center();

    let guard = HighlightGuard::apply(deps.session, handle, deps.policy.highlight).await;
    let outcome = dispatch_phases(deps, handle, x, y, state.focusable, click_count).await;
    guard.release().await;
    outcome
}

/// Hover, focus, press, release, click — in order, with small gaps so
/// framework listeners settle between phases.
async fn dispatch_phases(
    deps: &Deps<'_>,
    handle: NodeHandle,
    x: f64,
    y: f64,
    focusable: bool,
    click_count: u8,
) -> Result<(), InteractError> {
    run_phase(deps, handle, "hover", x, y).await?;
    if focusable {
        run_phase(deps, handle, "focus", x, y).await?;
    }
    for _ in 0..click_count.max(1) {
        run_phase(deps, handle, "press", x, y).await?;
        run_phase(deps, handle, "release", x, y).await?;
        run_phase(deps, handle, "click", x, y).await?;
    }
    Ok(())
}

async fn run_phase(
    deps: &Deps<'_>,
    handle: NodeHandle,
    phase: &str,
    x: f64,
    y: f64,
) -> Result<(), InteractError> {
    let call = ScriptCall::new(scripts::DISPATCH_PHASE_NAME, scripts::DISPATCH_PHASE)
        .arg(json!(handle.0))
        .arg(json!(phase))
        .arg(json!(x))
        .arg(json!(y));
    let value = deps.session.evaluate(call).await?;
    if value == Value::Bool(false) || value.is_null() {
        return Err(InteractError::dispatch(
            InteractionKind::Click,
            format!("{phase} phase rejected; target likely detached"),
        ));
    }
    tokio::time::sleep(deps.policy.phase_delay()).await;
    Ok(())
}

/// Coordinate fallback: the same press gesture, dispatched as trusted
/// protocol-level input instead of synthetic page events.
pub(crate) async fn click_point(
    deps: &Deps<'_>,
    x: f64,
    y: f64,
    click_count: u8,
) -> Result<(), InteractError> {
    let clicks = i64::from(click_count.max(1));
    deps.session
        .dispatch_mouse(MouseEventSpec::moved(x, y))
        .await?;
    tokio::time::sleep(deps.policy.phase_delay()).await;
    deps.session
        .dispatch_mouse(MouseEventSpec::pressed(x, y, MouseButton::Left, clicks))
        .await?;
    tokio::time::sleep(deps.policy.phase_delay()).await;
    deps.session
        .dispatch_mouse(MouseEventSpec::released(x, y, MouseButton::Left, clicks))
        .await?;
    Ok(())
}
