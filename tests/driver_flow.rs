//! End-to-end flows through the public driver surface against a scripted
//! protocol session.

use std::sync::Arc;

use serde_json::json;

use cdp_session::mock::MockSession;
use element_finder::candidates::FIND_CANDIDATES_NAME;
use interaction_engine::scripts;
use viewdriver::{
    CheckboxParams, ClickParams, Driver, DriverConfig, ElementDescriptor, ErrorKind,
    HandlerContext, NodeHandle, SelectChoice, SelectParams, TargetRequest, TypeParams,
};

fn fast_config() -> DriverConfig {
    DriverConfig {
        settle_ms: 0,
        phase_delay_ms: 0,
        key_delay_ms: 0,
        after_action_ms: 0,
        highlight: false,
        max_text_len: 4096,
    }
}

fn driver_for(session: Arc<MockSession>) -> Driver {
    Driver::with_config(HandlerContext::new(session), fast_config())
}

fn button_candidate(text: &str, handle: u32) -> serde_json::Value {
    json!({
        "tagName": "button",
        "text": text,
        "attributes": {"type": "submit"},
        "boundingBox": {"x": 100.0, "y": 200.0, "width": 80.0, "height": 40.0},
        "visible": true,
        "inViewport": true,
        "inModal": false,
        "siblingIndex": 0,
        "handle": handle
    })
}

fn target_state(disabled: bool) -> serde_json::Value {
    json!({
        "x": 100.0, "y": 200.0, "width": 80.0, "height": 40.0,
        "disabled": disabled, "focusable": true, "editable": false, "visible": true
    })
}

#[tokio::test]
async fn resolve_then_click_via_the_returned_handle() {
    let session = Arc::new(MockSession::new());
    session.push_eval(
        FIND_CANDIDATES_NAME,
        json!([
            button_candidate("Submit your application", 0),
            button_candidate("Submit", 1),
        ]),
    );
    session.set_url("https://example.com/apply?step=2");
    session.set_title("Apply");

    let driver = driver_for(session.clone());

    let descriptor = ElementDescriptor::for_tag("button")
        .with_text("Submit")
        .with_attribute("type", "submit");
    let resolved = driver.resolve_element(&descriptor).await;
    assert!(resolved.found);
    assert_eq!(resolved.candidate_count, 2);
    let target = resolved.target.unwrap();
    assert_eq!(target.handle, 1);

    session.push_eval(scripts::SCROLL_INTO_VIEW_NAME, json!(true));
    session.push_eval(scripts::TARGET_STATE_NAME, target_state(false));
    for _ in 0..5 {
        session.push_eval(scripts::DISPATCH_PHASE_NAME, json!(true));
    }

    let outcome = driver
        .click(ClickParams::new(TargetRequest::from_handle(NodeHandle(
            target.handle,
        ))))
        .await;
    assert!(outcome.success);
    assert_eq!(outcome.tiers_tried, vec!["handle"]);
    // Post signals are redacted: no query string survives.
    assert_eq!(outcome.url.as_deref(), Some("https://example.com/apply"));
}

#[tokio::test]
async fn clicking_a_disabled_button_fails_without_pointer_events() {
    let session = Arc::new(MockSession::new());
    session.push_eval(FIND_CANDIDATES_NAME, json!([button_candidate("Save", 0)]));
    session.push_eval(scripts::SCROLL_INTO_VIEW_NAME, json!(true));
    session.push_eval(scripts::TARGET_STATE_NAME, target_state(true));

    let driver = driver_for(session.clone());
    let descriptor = ElementDescriptor::for_tag("button").with_text("Save");
    let outcome = driver
        .click(ClickParams::new(TargetRequest::from_descriptor(descriptor)))
        .await;

    assert!(!outcome.success);
    assert_eq!(outcome.error.unwrap().kind, ErrorKind::ElementDisabled);
    assert_eq!(session.eval_count(scripts::DISPATCH_PHASE_NAME), 0);
    assert!(session.mouse_log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn typing_goes_through_focus_clear_and_per_character_keys() {
    let session = Arc::new(MockSession::new());
    session.push_eval(FIND_CANDIDATES_NAME, json!([button_candidate("", 0)]));
    session.push_eval(scripts::SCROLL_INTO_VIEW_NAME, json!(true));
    session.push_eval(scripts::TARGET_STATE_NAME, target_state(false));
    session.push_eval(scripts::FOCUS_TARGET_NAME, json!(true));

    let driver = driver_for(session.clone());
    let descriptor = ElementDescriptor::for_tag("input");
    let outcome = driver
        .type_text(TypeParams::new(
            TargetRequest::from_descriptor(descriptor),
            "ok",
        ))
        .await;

    assert!(outcome.success);
    let keys = session.key_log.lock().unwrap();
    // select-all + delete chords, then down/char/up per character.
    assert_eq!(keys.len(), 10);
}

#[tokio::test]
async fn select_failure_carries_the_select_failed_kind() {
    let session = Arc::new(MockSession::new());
    session.push_eval(scripts::SCROLL_INTO_VIEW_NAME, json!(true));
    session.push_eval(scripts::TARGET_STATE_NAME, target_state(false));
    session.push_eval(
        scripts::SELECT_OPTION_NAME,
        json!({"ok": false, "reason": "option-not-found"}),
    );

    let driver = driver_for(session);
    let outcome = driver
        .select_option(SelectParams {
            target: TargetRequest::from_handle(NodeHandle(0)),
            choice: SelectChoice {
                value: Some("missing".to_string()),
                label: None,
                index: None,
            },
        })
        .await;

    assert!(!outcome.success);
    assert_eq!(outcome.error.unwrap().kind, ErrorKind::SelectFailed);
}

#[tokio::test]
async fn toggling_twice_only_changes_state_once() {
    let session = Arc::new(MockSession::new());
    for _ in 0..2 {
        session.push_eval(scripts::SCROLL_INTO_VIEW_NAME, json!(true));
        session.push_eval(scripts::TARGET_STATE_NAME, target_state(false));
    }
    session.push_eval(
        scripts::TOGGLE_CHECKBOX_NAME,
        json!({"changed": true, "checked": true}),
    );
    session.push_eval(
        scripts::TOGGLE_CHECKBOX_NAME,
        json!({"changed": false, "checked": true}),
    );

    let driver = driver_for(session);
    let params = CheckboxParams {
        target: TargetRequest::from_handle(NodeHandle(0)),
        checked: true,
    };
    let first = driver.toggle_checkbox(params.clone()).await;
    let second = driver.toggle_checkbox(params).await;

    assert_eq!(first.checked, Some(true));
    assert_eq!(first.changed, Some(true));
    assert_eq!(second.checked, Some(true));
    assert_eq!(second.changed, Some(false));
}

#[tokio::test]
async fn unresolvable_descriptor_reports_no_candidates() {
    let session = Arc::new(MockSession::new());
    session.push_eval(FIND_CANDIDATES_NAME, json!([]));

    let driver = driver_for(session);
    let outcome = driver
        .resolve_element(&ElementDescriptor::for_tag("video"))
        .await;

    assert!(!outcome.found);
    assert_eq!(outcome.error.unwrap().kind, ErrorKind::NoCandidates);
}

#[tokio::test]
async fn empty_accessibility_tree_maps_to_no_nodes_found() {
    let session = Arc::new(MockSession::new());
    let driver = driver_for(session.clone());

    let outcome = driver.ax_snapshot().await;
    assert!(outcome.tree.is_none());
    assert_eq!(outcome.error.unwrap().kind, ErrorKind::NoNodesFound);
    // The accessibility domain was still enabled and disabled in pairs.
    assert_eq!(*session.ax_toggle_log.lock().unwrap(), vec![true, false]);
}
