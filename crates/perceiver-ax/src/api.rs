//! Extraction orchestration.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, instrument, warn};

use cdp_session::{PageSession, ScriptCall};

use crate::errors::SnapshotError;
use crate::filter::{collect_aria_hidden, filter_nodes};
use crate::modal::detect_modal;
use crate::model::{AxTree, Viewport, VisibilityContext};
use crate::render::render;

const VIEWPORT_NAME: &str = "viewport-geometry";

const VIEWPORT: &str = r#"() => ({
    width: window.innerWidth,
    height: window.innerHeight,
    scrollX: window.scrollX,
    scrollY: window.scrollY,
})"#;

#[derive(Clone, Debug)]
pub struct SnapshotPolicy {
    /// Placeholder viewport when the geometry script fails.
    pub fallback_viewport: Viewport,
}

impl Default for SnapshotPolicy {
    fn default() -> Self {
        Self {
            fallback_viewport: Viewport::fallback(),
        }
    }
}

pub struct AxSnapshotBuilder {
    session: Arc<dyn PageSession>,
    policy: SnapshotPolicy,
}

impl AxSnapshotBuilder {
    pub fn new(session: Arc<dyn PageSession>) -> Self {
        Self {
            session,
            policy: SnapshotPolicy::default(),
        }
    }

    pub fn with_policy(session: Arc<dyn PageSession>, policy: SnapshotPolicy) -> Self {
        Self { session, policy }
    }

    /// Fetch, filter and render one snapshot.
    ///
    /// The accessibility domain is enabled only for the duration of this
    /// call and disabled again on every exit path, so no protocol-side
    /// instrumentation leaks onto later calls.
    #[instrument(skip_all)]
    pub async fn extract(&self) -> Result<String, SnapshotError> {
        self.session.ax_enable().await?;
        let outcome = self.extract_inner().await;
        if let Err(err) = self.session.ax_disable().await {
            warn!(%err, "accessibility disable failed");
        }
        outcome
    }

    async fn extract_inner(&self) -> Result<String, SnapshotError> {
        let nodes = self.session.ax_full_tree().await?;
        if nodes.is_empty() {
            return Err(SnapshotError::NoNodesFound);
        }
        let tree = AxTree::new(nodes);

        let viewport = self.fetch_viewport().await;
        let modal = detect_modal(self.session.as_ref(), &tree).await;
        let ctx = VisibilityContext {
            has_active_modal: modal.is_some(),
            modal_node_ids: modal.map(|found| found.subtree).unwrap_or_default(),
            aria_hidden_ids: collect_aria_hidden(&tree),
            viewport: viewport.rect(),
        };
        debug!(
            modal = ctx.has_active_modal,
            hidden = ctx.aria_hidden_ids.len(),
            "filtering accessibility nodes"
        );

        let kept = filter_nodes(self.session.as_ref(), &tree, &ctx).await;

        let url = self.session.page_url().await.unwrap_or_default();
        let title = self.session.page_title().await.unwrap_or_default();
        Ok(render(&tree, &kept, &url, &title))
    }

    async fn fetch_viewport(&self) -> Viewport {
        let call = ScriptCall::new(VIEWPORT_NAME, VIEWPORT);
        match self.session.evaluate(call).await {
            Ok(value) if value != Value::Null => {
                serde_json::from_value(value).unwrap_or_else(|err| {
                    warn!(%err, "viewport payload malformed; using fallback");
                    self.policy.fallback_viewport
                })
            }
            Ok(_) | Err(_) => {
                warn!("viewport geometry unavailable; using fallback");
                self.policy.fallback_viewport
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdp_session::mock::MockSession;
    use cdp_session::{AxNodeRecord, AxPropertyRecord};
    use serde_json::json;
    use viewdriver_core_types::Rect;

    fn node(
        id: &str,
        parent: Option<&str>,
        children: &[&str],
        role: &str,
        name: &str,
        backend: Option<i64>,
    ) -> AxNodeRecord {
        AxNodeRecord {
            node_id: id.to_string(),
            parent_id: parent.map(|p| p.to_string()),
            child_ids: children.iter().map(|c| c.to_string()).collect(),
            role: role.to_string(),
            name: name.to_string(),
            backend_dom_node_id: backend,
            ..Default::default()
        }
    }

    fn viewport_json() -> serde_json::Value {
        json!({"width": 1920.0, "height": 1080.0, "scrollX": 0.0, "scrollY": 0.0})
    }

    #[tokio::test]
    async fn active_modal_suppresses_background_content() {
        let session = Arc::new(MockSession::new());
        session.push_eval(VIEWPORT_NAME, viewport_json());
        session.set_ax_nodes(vec![
            node("1", None, &["2", "4"], "WebArea", "Page", Some(1)),
            node("2", Some("1"), &["3"], "dialog", "Confirm order", Some(10)),
            node("3", Some("2"), &[], "button", "Place order", Some(11)),
            node("4", Some("1"), &[], "button", "Background action", Some(20)),
        ]);
        // Dialog: 400x300 at z-index 1000. Background button intersects the
        // viewport but must be suppressed anyway.
        session.set_box_model(1, Rect::new(0.0, 0.0, 1920.0, 1080.0));
        session.set_box_model(10, Rect::new(700.0, 300.0, 400.0, 300.0));
        session.set_box_model(11, Rect::new(750.0, 500.0, 120.0, 40.0));
        session.set_box_model(20, Rect::new(100.0, 100.0, 200.0, 40.0));
        session.set_node_result(10, json!(1000));

        let builder = AxSnapshotBuilder::new(session.clone());
        let tree = builder.extract().await.unwrap();

        assert!(tree.contains("Confirm order"));
        assert!(tree.contains("Place order"));
        assert!(!tree.contains("Background action"));
        // Scoped acquisition: enabled then disabled exactly once.
        assert_eq!(*session.ax_toggle_log.lock().unwrap(), vec![true, false]);
    }

    #[tokio::test]
    async fn viewport_buffer_keeps_near_offscreen_content_only() {
        let session = Arc::new(MockSession::new());
        session.push_eval(VIEWPORT_NAME, viewport_json());
        session.set_ax_nodes(vec![
            node("1", None, &["2", "3"], "WebArea", "Page", Some(1)),
            node("2", Some("1"), &[], "button", "Just above the fold", Some(10)),
            node("3", Some("1"), &[], "button", "Far above the fold", Some(11)),
        ]);
        session.set_box_model(1, Rect::new(0.0, 0.0, 1920.0, 2000.0));
        // 150px above the viewport top: inside the 200px buffer.
        session.set_box_model(10, Rect::new(100.0, -180.0, 200.0, 30.0));
        // 250px above: outside.
        session.set_box_model(11, Rect::new(100.0, -280.0, 200.0, 30.0));

        let builder = AxSnapshotBuilder::new(session);
        let tree = builder.extract().await.unwrap();

        assert!(tree.contains("Just above the fold"));
        assert!(!tree.contains("Far above the fold"));
    }

    #[tokio::test]
    async fn empty_tree_fails_but_still_disables_the_domain() {
        let session = Arc::new(MockSession::new());
        session.set_ax_nodes(Vec::new());

        let builder = AxSnapshotBuilder::new(session.clone());
        let err = builder.extract().await.unwrap_err();

        assert!(matches!(err, SnapshotError::NoNodesFound));
        assert_eq!(*session.ax_toggle_log.lock().unwrap(), vec![true, false]);
    }

    #[tokio::test]
    async fn aria_hidden_nodes_are_excluded() {
        let session = Arc::new(MockSession::new());
        session.push_eval(VIEWPORT_NAME, viewport_json());
        let mut hidden = node("3", Some("1"), &[], "button", "Hidden control", Some(11));
        hidden.properties = vec![AxPropertyRecord {
            name: "hidden".to_string(),
            value: json!(true),
        }];
        session.set_ax_nodes(vec![
            node("1", None, &["2", "3"], "WebArea", "Page", Some(1)),
            node("2", Some("1"), &[], "button", "Visible control", Some(10)),
            hidden,
        ]);
        session.set_box_model(1, Rect::new(0.0, 0.0, 1920.0, 1080.0));
        session.set_box_model(10, Rect::new(10.0, 10.0, 100.0, 30.0));
        session.set_box_model(11, Rect::new(10.0, 60.0, 100.0, 30.0));

        let builder = AxSnapshotBuilder::new(session);
        let tree = builder.extract().await.unwrap();

        assert!(tree.contains("Visible control"));
        assert!(!tree.contains("Hidden control"));
    }
}
