//! Public interaction runners and the target-acquisition ladder.

use std::sync::Arc;
use std::time::Instant;

use tracing::{instrument, warn};

use cdp_session::{PageSession, ScriptCall};
use serde_json::json;

use crate::checkbox::toggle_node;
use crate::click::{click_node, click_point};
use crate::errors::InteractError;
use crate::keys::press_chord;
use crate::model::{
    ActionReport, CheckboxParams, ClickParams, ExecCtx, InteractionKind, PostSignals,
    PressKeyParams, ScrollParams, SelectParams, SelectReport, SubmitParams, TargetRequest, Tier,
    ToggleReport, TypeParams,
};
use crate::pipeline::{acquire, Acquired, Deps};
use crate::policy::InteractPolicy;
use crate::ports::FinderPort;
use crate::redact;
use crate::scripts;
use crate::select::select_on_node;
use crate::submit::submit_form;
use crate::type_text::{type_at_point, type_into_node};

pub struct InteractionEngine {
    session: Arc<dyn PageSession>,
    finder: Arc<dyn FinderPort>,
    policy: InteractPolicy,
}

impl InteractionEngine {
    pub fn new(session: Arc<dyn PageSession>, finder: Arc<dyn FinderPort>) -> Self {
        Self::with_policy(session, finder, InteractPolicy::default())
    }

    pub fn with_policy(
        session: Arc<dyn PageSession>,
        finder: Arc<dyn FinderPort>,
        policy: InteractPolicy,
    ) -> Self {
        Self {
            session,
            finder,
            policy,
        }
    }

    fn deps(&self) -> Deps<'_> {
        Deps {
            session: self.session.as_ref(),
            finder: self.finder.as_ref(),
            policy: &self.policy,
        }
    }

    async fn collect_post(&self) -> PostSignals {
        let url = self
            .session
            .page_url()
            .await
            .ok()
            .map(|url| redact::url(&url));
        let title = self
            .session
            .page_title()
            .await
            .ok()
            .map(|title| redact::title(&title, 128));
        PostSignals { url, title }
    }

    async fn finish(&self, mut report: ActionReport) -> ActionReport {
        tokio::time::sleep(self.policy.after_action()).await;
        report.post = self.collect_post().await;
        report.ok = true;
        report.finish(Instant::now())
    }

    #[instrument(skip_all, fields(action = %ctx.action_id))]
    pub async fn click(
        &self,
        ctx: &ExecCtx,
        params: ClickParams,
    ) -> Result<ActionReport, InteractError> {
        let deps = self.deps();
        let mut report = ActionReport::new(Instant::now());
        let tiers = params.target.tiers();
        if tiers.is_empty() {
            return Err(InteractError::NoTarget(
                "click needs a handle, descriptor, or position".to_string(),
            ));
        }

        let mut last_err = None;
        for tier in tiers {
            report.tiers_tried.push(tier.as_str());
            let outcome = match acquire(&deps, tier, &params.target).await {
                Ok(Acquired::Node { handle }) => {
                    click_node(&deps, handle, params.click_count).await
                }
                Ok(Acquired::Point { x, y }) => {
                    click_point(&deps, x, y, params.click_count).await
                }
                Err(err) => Err(err),
            };
            match outcome {
                Ok(()) => return Ok(self.finish(report).await),
                // Disabled is terminal: dispatching elsewhere would not help
                // and the page would silently swallow the events anyway.
                Err(InteractError::Disabled) => return Err(InteractError::Disabled),
                Err(err) => {
                    warn!(tier = tier.as_str(), %err, "click tier failed");
                    last_err = Some(err);
                }
            }
        }
        let source = last_err.unwrap_or_else(|| {
            InteractError::dispatch(InteractionKind::Click, "all tiers failed")
        });
        Err(InteractError::exhausted(report.tiers_tried, source))
    }

    #[instrument(skip_all, fields(action = %ctx.action_id, chars = params.text.chars().count()))]
    pub async fn type_text(
        &self,
        ctx: &ExecCtx,
        params: TypeParams,
    ) -> Result<ActionReport, InteractError> {
        if params.text.len() > self.policy.max_text_len {
            return Err(InteractError::dispatch(
                InteractionKind::Type,
                format!("text exceeds {} bytes", self.policy.max_text_len),
            ));
        }
        let deps = self.deps();
        let mut report = ActionReport::new(Instant::now());
        let tiers = params.target.tiers();
        if tiers.is_empty() {
            return Err(InteractError::NoTarget(
                "type needs a handle, descriptor, or position".to_string(),
            ));
        }

        let mut last_err = None;
        for tier in tiers {
            report.tiers_tried.push(tier.as_str());
            let outcome = match acquire(&deps, tier, &params.target).await {
                Ok(Acquired::Node { handle }) => type_into_node(&deps, handle, &params).await,
                Ok(Acquired::Point { x, y }) => type_at_point(&deps, x, y, &params).await,
                Err(err) => Err(err),
            };
            match outcome {
                Ok(()) => return Ok(self.finish(report).await),
                Err(InteractError::Disabled) => return Err(InteractError::Disabled),
                Err(err) => {
                    warn!(tier = tier.as_str(), %err, "type tier failed");
                    last_err = Some(err);
                }
            }
        }
        let source = last_err.unwrap_or_else(|| {
            InteractError::dispatch(InteractionKind::Type, "all tiers failed")
        });
        Err(InteractError::exhausted(report.tiers_tried, source))
    }

    #[instrument(skip_all, fields(action = %ctx.action_id))]
    pub async fn select_option(
        &self,
        ctx: &ExecCtx,
        params: SelectParams,
    ) -> Result<SelectReport, InteractError> {
        let deps = self.deps();
        let mut report = ActionReport::new(Instant::now());
        // Option matching needs a live node; raw coordinates cannot carry
        // select semantics, so the position tier is skipped.
        let tiers: Vec<Tier> = params
            .target
            .tiers()
            .into_iter()
            .filter(|tier| *tier != Tier::Position)
            .collect();
        if tiers.is_empty() {
            return Err(InteractError::NoTarget(
                "select needs a handle or descriptor".to_string(),
            ));
        }

        let mut last_err = None;
        for tier in tiers {
            report.tiers_tried.push(tier.as_str());
            let outcome = match acquire(&deps, tier, &params.target).await {
                Ok(Acquired::Node { handle }) => {
                    select_on_node(&deps, handle, &params.choice).await
                }
                Ok(Acquired::Point { .. }) => unreachable!("position tier filtered out"),
                Err(err) => Err(err),
            };
            match outcome {
                Ok((value, label)) => {
                    return Ok(SelectReport {
                        report: self.finish(report).await,
                        selected_value: value,
                        selected_label: label,
                    })
                }
                Err(InteractError::Disabled) => return Err(InteractError::Disabled),
                Err(err) => {
                    warn!(tier = tier.as_str(), %err, "select tier failed");
                    last_err = Some(err);
                }
            }
        }
        let source = last_err.unwrap_or_else(|| {
            InteractError::dispatch(InteractionKind::Select, "all tiers failed")
        });
        Err(InteractError::exhausted(report.tiers_tried, source))
    }

    #[instrument(skip_all, fields(action = %ctx.action_id, desired = params.checked))]
    pub async fn toggle_checkbox(
        &self,
        ctx: &ExecCtx,
        params: CheckboxParams,
    ) -> Result<ToggleReport, InteractError> {
        let deps = self.deps();
        let mut report = ActionReport::new(Instant::now());
        // Idempotence requires reading the current checked state, which only
        // a node reference allows.
        let tiers: Vec<Tier> = params
            .target
            .tiers()
            .into_iter()
            .filter(|tier| *tier != Tier::Position)
            .collect();
        if tiers.is_empty() {
            return Err(InteractError::NoTarget(
                "checkbox toggle needs a handle or descriptor".to_string(),
            ));
        }

        let mut last_err = None;
        for tier in tiers {
            report.tiers_tried.push(tier.as_str());
            let outcome = match acquire(&deps, tier, &params.target).await {
                Ok(Acquired::Node { handle }) => toggle_node(&deps, handle, params.checked).await,
                Ok(Acquired::Point { .. }) => unreachable!("position tier filtered out"),
                Err(err) => Err(err),
            };
            match outcome {
                Ok((checked, changed)) => {
                    return Ok(ToggleReport {
                        report: self.finish(report).await,
                        checked,
                        changed,
                    })
                }
                Err(InteractError::Disabled) => return Err(InteractError::Disabled),
                Err(err) => {
                    warn!(tier = tier.as_str(), %err, "toggle tier failed");
                    last_err = Some(err);
                }
            }
        }
        let source = last_err.unwrap_or_else(|| {
            InteractError::dispatch(InteractionKind::Checkbox, "all tiers failed")
        });
        Err(InteractError::exhausted(report.tiers_tried, source))
    }

    /// Submit either delegates to click (specific submit control supplied)
    /// or invokes the form's native submission. There is no coordinate tier
    /// here: a blind click at a point cannot carry submission semantics.
    #[instrument(skip_all, fields(action = %ctx.action_id))]
    pub async fn submit(
        &self,
        ctx: &ExecCtx,
        params: SubmitParams,
    ) -> Result<ActionReport, InteractError> {
        if let Some(button) = params.button {
            let button = TargetRequest {
                position: None,
                ..button
            };
            return self.click(ctx, ClickParams::new(button)).await.map_err(
                |err| match err {
                    InteractError::Dispatch { hint, .. } => {
                        InteractError::dispatch(InteractionKind::Submit, hint)
                    }
                    other => other,
                },
            );
        }

        let deps = self.deps();
        let mut report = ActionReport::new(Instant::now());
        report.tiers_tried.push("form");
        submit_form(&deps, params.form.as_ref()).await?;
        Ok(self.finish(report).await)
    }

    #[instrument(skip_all, fields(action = %ctx.action_id, key = %params.key))]
    pub async fn press_key(
        &self,
        ctx: &ExecCtx,
        params: PressKeyParams,
    ) -> Result<ActionReport, InteractError> {
        let report = ActionReport::new(Instant::now());
        press_chord(self.session.as_ref(), &params.key, params.modifiers).await?;
        Ok(self.finish(report).await)
    }

    #[instrument(skip_all, fields(action = %ctx.action_id))]
    pub async fn scroll(
        &self,
        ctx: &ExecCtx,
        params: ScrollParams,
    ) -> Result<ActionReport, InteractError> {
        let report = ActionReport::new(Instant::now());
        let call = ScriptCall::new(scripts::SCROLL_BY_NAME, scripts::SCROLL_BY)
            .arg(json!(params.dx))
            .arg(json!(params.dy));
        self.session.evaluate(call).await?;
        Ok(self.finish(report).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cdp_session::mock::MockSession;
    use cdp_session::KeyPhase;
    use element_finder::{
        ElementDescriptor, FinderError, NodeHandle, Resolution, ResolvedTarget,
    };
    use serde_json::json;
    use viewdriver_core_types::Rect;

    struct MockFinder {
        resolution: Option<Resolution>,
    }

    #[async_trait]
    impl FinderPort for MockFinder {
        async fn resolve(
            &self,
            _descriptor: &ElementDescriptor,
        ) -> Result<Resolution, FinderError> {
            self.resolution
                .clone()
                .ok_or(FinderError::NoCandidates)
        }
    }

    fn fast_policy() -> InteractPolicy {
        InteractPolicy {
            settle_ms: 0,
            phase_delay_ms: 0,
            key_delay_ms: 0,
            after_action_ms: 0,
            highlight: false,
            max_text_len: 4096,
        }
    }

    fn engine_with(session: Arc<MockSession>, resolution: Option<Resolution>) -> InteractionEngine {
        InteractionEngine::with_policy(
            session,
            Arc::new(MockFinder { resolution }),
            fast_policy(),
        )
    }

    fn state_json(disabled: bool) -> serde_json::Value {
        json!({
            "x": 100.0, "y": 200.0, "width": 80.0, "height": 40.0,
            "disabled": disabled, "focusable": true, "editable": false, "visible": true
        })
    }

    fn resolution_for(handle: u32) -> Resolution {
        Resolution {
            target: ResolvedTarget {
                center_x: 140.0,
                center_y: 220.0,
                handle: NodeHandle(handle),
                bounding_box: Rect::new(100.0, 200.0, 80.0, 40.0),
            },
            candidate_count: 1,
            ambiguous: false,
            score: 65.0,
            matched_by: vec!["tag"],
        }
    }

    #[tokio::test]
    async fn click_runs_all_phases_in_order() {
        let session = Arc::new(MockSession::new());
        session.push_eval(scripts::SCROLL_INTO_VIEW_NAME, json!(true));
        session.push_eval(scripts::TARGET_STATE_NAME, state_json(false));
        for _ in 0..5 {
            session.push_eval(scripts::DISPATCH_PHASE_NAME, json!(true));
        }

        let engine = engine_with(session.clone(), None);
        let params = ClickParams::new(TargetRequest::from_handle(NodeHandle(0)));
        let report = engine.click(&ExecCtx::new(), params).await.unwrap();

        assert!(report.ok);
        assert_eq!(report.tiers_tried, vec!["handle"]);
        let log = session.eval_log.lock().unwrap();
        let phases: Vec<&str> = log
            .iter()
            .filter(|(name, _)| name == scripts::DISPATCH_PHASE_NAME)
            .map(|(_, rendered)| {
                ["hover", "focus", "press", "release", "click"]
                    .into_iter()
                    .find(|phase| rendered.contains(&format!("\"{phase}\"")))
                    .unwrap_or("?")
            })
            .collect();
        assert_eq!(phases, vec!["hover", "focus", "press", "release", "click"]);
    }

    #[tokio::test]
    async fn click_on_disabled_element_dispatches_nothing() {
        let session = Arc::new(MockSession::new());
        session.push_eval(scripts::SCROLL_INTO_VIEW_NAME, json!(true));
        session.push_eval(scripts::TARGET_STATE_NAME, state_json(true));

        let engine = engine_with(session.clone(), None);
        let params = ClickParams::new(TargetRequest::from_handle(NodeHandle(0)));
        let err = engine.click(&ExecCtx::new(), params).await.unwrap_err();

        assert!(matches!(err, InteractError::Disabled));
        assert_eq!(session.eval_count(scripts::DISPATCH_PHASE_NAME), 0);
        assert!(session.mouse_log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn stale_handle_falls_back_to_coordinates() {
        let session = Arc::new(MockSession::new());
        // Handle tier dies immediately: registry entry is gone.
        session.push_eval(scripts::SCROLL_INTO_VIEW_NAME, json!(false));

        let engine = engine_with(session.clone(), None);
        let target = TargetRequest {
            handle: Some(NodeHandle(7)),
            descriptor: None,
            position: Some((50.0, 60.0)),
        };
        let report = engine
            .click(&ExecCtx::new(), ClickParams::new(target))
            .await
            .unwrap();

        assert_eq!(report.tiers_tried, vec!["handle", "position"]);
        let mouse = session.mouse_log.lock().unwrap();
        assert_eq!(mouse.len(), 3);
        assert_eq!(mouse[0].x, 50.0);
    }

    #[tokio::test]
    async fn descriptor_tier_uses_resolved_handle() {
        let session = Arc::new(MockSession::new());
        session.push_eval(scripts::SCROLL_INTO_VIEW_NAME, json!(true));
        session.push_eval(scripts::TARGET_STATE_NAME, state_json(false));
        for _ in 0..5 {
            session.push_eval(scripts::DISPATCH_PHASE_NAME, json!(true));
        }

        let engine = engine_with(session.clone(), Some(resolution_for(3)));
        let target = TargetRequest::from_descriptor(
            ElementDescriptor::for_tag("button").with_text("Save"),
        );
        let report = engine
            .click(&ExecCtx::new(), ClickParams::new(target))
            .await
            .unwrap();

        assert_eq!(report.tiers_tried, vec!["descriptor"]);
        let log = session.eval_log.lock().unwrap();
        let scroll = log
            .iter()
            .find(|(name, _)| name == scripts::SCROLL_INTO_VIEW_NAME)
            .unwrap();
        assert!(scroll.1.ends_with("(3)"));
    }

    #[tokio::test]
    async fn typing_clears_then_types_per_character() {
        let session = Arc::new(MockSession::new());
        session.push_eval(scripts::SCROLL_INTO_VIEW_NAME, json!(true));
        session.push_eval(scripts::TARGET_STATE_NAME, state_json(false));
        session.push_eval(scripts::FOCUS_TARGET_NAME, json!(true));

        let engine = engine_with(session.clone(), None);
        let params = TypeParams::new(TargetRequest::from_handle(NodeHandle(0)), "hi");
        engine.type_text(&ExecCtx::new(), params).await.unwrap();

        let keys = session.key_log.lock().unwrap();
        // select-all chord (2) + delete chord (2) + 2 chars x (down/char/up).
        assert_eq!(keys.len(), 10);
        assert_eq!(keys[0].key.as_deref(), Some("a"));
        assert!(keys[0].modifiers > 0);
        assert_eq!(keys[2].key.as_deref(), Some("Backspace"));
        let chars: Vec<_> = keys
            .iter()
            .filter(|key| key.phase == KeyPhase::Char)
            .filter_map(|key| key.text.clone())
            .collect();
        assert_eq!(chars, vec!["h", "i"]);
    }

    #[tokio::test]
    async fn focus_failure_surfaces_as_focus_failed() {
        let session = Arc::new(MockSession::new());
        session.push_eval(scripts::SCROLL_INTO_VIEW_NAME, json!(true));
        session.push_eval(scripts::TARGET_STATE_NAME, state_json(false));
        session.push_eval(scripts::FOCUS_TARGET_NAME, json!(false));

        let engine = engine_with(session, None);
        let params = TypeParams::new(TargetRequest::from_handle(NodeHandle(0)), "hi");
        let err = engine.type_text(&ExecCtx::new(), params).await.unwrap_err();
        assert_eq!(err.kind(), viewdriver_core_types::ErrorKind::FocusFailed);
        // The exhausted wrapper records the ladder for the caller.
        assert!(err.to_string().contains("tiers tried: handle"));
    }

    #[tokio::test]
    async fn toggle_is_idempotent() {
        let session = Arc::new(MockSession::new());
        for _ in 0..2 {
            session.push_eval(scripts::SCROLL_INTO_VIEW_NAME, json!(true));
            session.push_eval(scripts::TARGET_STATE_NAME, state_json(false));
        }
        session.push_eval(
            scripts::TOGGLE_CHECKBOX_NAME,
            json!({"changed": true, "checked": true}),
        );
        session.push_eval(
            scripts::TOGGLE_CHECKBOX_NAME,
            json!({"changed": false, "checked": true}),
        );

        let engine = engine_with(session, None);
        let params = CheckboxParams {
            target: TargetRequest::from_handle(NodeHandle(0)),
            checked: true,
        };
        let first = engine
            .toggle_checkbox(&ExecCtx::new(), params.clone())
            .await
            .unwrap();
        let second = engine
            .toggle_checkbox(&ExecCtx::new(), params)
            .await
            .unwrap();

        assert!(first.checked && first.changed);
        assert!(second.checked && !second.changed);
    }

    #[tokio::test]
    async fn select_matches_and_reports_the_option() {
        let session = Arc::new(MockSession::new());
        session.push_eval(scripts::SCROLL_INTO_VIEW_NAME, json!(true));
        session.push_eval(scripts::TARGET_STATE_NAME, state_json(false));
        session.push_eval(
            scripts::SELECT_OPTION_NAME,
            json!({"ok": true, "value": "us", "label": "United States"}),
        );

        let engine = engine_with(session, None);
        let params = SelectParams {
            target: TargetRequest::from_handle(NodeHandle(0)),
            choice: crate::model::SelectChoice {
                value: None,
                label: Some("United".to_string()),
                index: None,
            },
        };
        let outcome = engine.select_option(&ExecCtx::new(), params).await.unwrap();
        assert_eq!(outcome.selected_value, "us");
        assert_eq!(outcome.selected_label, "United States");
    }

    #[tokio::test]
    async fn submit_without_button_uses_the_form_path() {
        let session = Arc::new(MockSession::new());
        session.push_eval(scripts::SUBMIT_FORM_NAME, json!({"ok": true}));

        let engine = engine_with(session.clone(), None);
        let report = engine
            .submit(&ExecCtx::new(), SubmitParams::default())
            .await
            .unwrap();
        assert!(report.ok);
        assert_eq!(session.eval_count(scripts::SUBMIT_FORM_NAME), 1);
    }

    #[tokio::test]
    async fn missing_form_is_reported_as_no_target() {
        let session = Arc::new(MockSession::new());
        session.push_eval(
            scripts::SUBMIT_FORM_NAME,
            json!({"ok": false, "reason": "form-not-found"}),
        );

        let engine = engine_with(session, None);
        let err = engine
            .submit(&ExecCtx::new(), SubmitParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, InteractError::NoTarget(_)));
    }
}
