//! Occluding-modal detection.
//!
//! Candidates are nodes with an overlay role and a real on-screen size; the
//! winner is the one with the highest ancestor-chain z-index, ties broken by
//! later DOM order (a same-z overlay inserted later is typically the active
//! one, e.g. a toast opened on top of a dialog).

use std::collections::HashSet;

use tracing::debug;

use cdp_session::PageSession;

use crate::model::AxTree;

const MODAL_ROLES: &[&str] = &["dialog", "alertdialog", "menu", "listbox"];

/// Zero-size and near-zero-size overlays are parked dialogs, not occluders.
const MIN_MODAL_EDGE: f64 = 50.0;

/// Runs with `this` bound to the candidate element.
const MAX_ANCESTOR_Z: &str = r#"function () {
    let max = 0;
    let el = this;
    for (let depth = 0; depth < 10 && el; depth++) {
        const z = parseInt(window.getComputedStyle(el).zIndex, 10);
        if (!isNaN(z) && z > max) max = z;
        el = el.parentElement;
    }
    return max;
}"#;

pub struct DetectedModal {
    pub root_id: String,
    pub subtree: HashSet<String>,
}

pub async fn detect_modal(session: &dyn PageSession, tree: &AxTree) -> Option<DetectedModal> {
    let mut best: Option<(i64, usize, String)> = None;

    for (order, node) in tree.nodes().iter().enumerate() {
        if !MODAL_ROLES.contains(&node.role.as_str()) {
            continue;
        }
        let Some(backend_id) = node.backend_dom_node_id else {
            continue;
        };
        let Ok(rect) = session.box_model(backend_id).await else {
            continue;
        };
        if rect.width <= MIN_MODAL_EDGE || rect.height <= MIN_MODAL_EDGE {
            continue;
        }
        let z_index = session
            .call_on_node(backend_id, MAX_ANCESTOR_Z)
            .await
            .ok()
            .and_then(|value| value.as_i64())
            .unwrap_or(0);

        let wins = match &best {
            // `>=` so a later same-z candidate replaces an earlier one.
            Some((best_z, _, _)) => z_index >= *best_z,
            None => true,
        };
        if wins {
            best = Some((z_index, order, node.node_id.clone()));
        }
    }

    let (z_index, _, root_id) = best?;
    debug!(%root_id, z_index, "active modal detected");
    Some(DetectedModal {
        subtree: tree.subtree_ids(&root_id),
        root_id,
    })
}
