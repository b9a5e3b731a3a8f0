//! Form submission without a designated button.

use serde::Deserialize;
use serde_json::json;

use cdp_session::evaluate_typed;
use cdp_session::ScriptCall;
use element_finder::ElementDescriptor;

use crate::errors::InteractError;
use crate::model::InteractionKind;
use crate::pipeline::Deps;
use crate::scripts;

#[derive(Debug, Deserialize)]
struct SubmitOutcome {
    ok: bool,
    #[serde(default)]
    reason: Option<String>,
}

/// Locate the form (by descriptor attributes, else first on the page) and
/// invoke its native submission, preferring `requestSubmit` so HTML5
/// validation still runs.
pub(crate) async fn submit_form(
    deps: &Deps<'_>,
    form: Option<&ElementDescriptor>,
) -> Result<(), InteractError> {
    let attrs = form.map(|descriptor| json!(descriptor.attributes));
    let call = ScriptCall::new(scripts::SUBMIT_FORM_NAME, scripts::SUBMIT_FORM)
        .arg(attrs.unwrap_or(serde_json::Value::Null));
    let outcome: SubmitOutcome = evaluate_typed(deps.session, call).await?;

    if !outcome.ok {
        return match outcome.reason.as_deref() {
            Some("form-not-found") => Err(InteractError::NoTarget(
                "no form matched the descriptor".to_string(),
            )),
            Some(reason) => Err(InteractError::dispatch(InteractionKind::Submit, reason)),
            None => Err(InteractError::dispatch(
                InteractionKind::Submit,
                "submission rejected",
            )),
        };
    }
    Ok(())
}
