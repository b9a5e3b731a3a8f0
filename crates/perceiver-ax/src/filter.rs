//! Node filtering: modal membership or buffered-viewport intersection.

use std::collections::HashSet;

use tracing::trace;

use cdp_session::PageSession;

use crate::model::{AxTree, VisibilityContext};

/// Core interactive roles kept even when their geometry cannot be read.
const INTERACTIVE_FALLBACK_ROLES: &[&str] =
    &["button", "link", "textbox", "searchbox", "combobox"];

/// Off-screen slack: content this close to the viewport edge is usually one
/// small scroll away and worth describing.
pub const VIEWPORT_BUFFER_PX: f64 = 200.0;

/// Nodes whose `hidden` property is explicitly true, excluded regardless of
/// modal state.
pub fn collect_aria_hidden(tree: &AxTree) -> HashSet<String> {
    tree.nodes()
        .iter()
        .filter(|node| node.bool_property("hidden") == Some(true))
        .map(|node| node.node_id.clone())
        .collect()
}

/// The set of node ids the rendering pass may emit.
///
/// With an active modal the output is exactly the modal subtree: background
/// content is suppressed entirely, mirroring a screen reader's focus trap.
/// Otherwise nodes are kept by intersection with the buffered viewport, and
/// every kept node drags its ancestor chain in so leaves keep their context.
pub async fn filter_nodes(
    session: &dyn PageSession,
    tree: &AxTree,
    ctx: &VisibilityContext,
) -> HashSet<String> {
    if ctx.has_active_modal {
        return ctx
            .modal_node_ids
            .iter()
            .filter(|id| !ctx.aria_hidden_ids.contains(*id))
            .cloned()
            .collect();
    }

    let buffered = ctx.viewport.expanded(VIEWPORT_BUFFER_PX);
    let mut kept = HashSet::new();
    for node in tree.nodes() {
        if ctx.aria_hidden_ids.contains(&node.node_id) {
            continue;
        }
        let keep = match node.backend_dom_node_id {
            Some(backend_id) => match session.box_model(backend_id).await {
                Ok(rect) => buffered.intersects(&rect),
                // Geometry unavailable: keep only the roles a caller would
                // miss most if dropped.
                Err(_) => INTERACTIVE_FALLBACK_ROLES.contains(&node.role.as_str()),
            },
            None => INTERACTIVE_FALLBACK_ROLES.contains(&node.role.as_str()),
        };
        if keep {
            trace!(node = %node.node_id, role = %node.role, "kept");
            kept.insert(node.node_id.clone());
        }
    }

    // Ancestor closure: a kept leaf never loses its structural context.
    // Hidden ancestors stay excluded.
    let mut with_ancestors = kept.clone();
    for node_id in &kept {
        for ancestor in tree.ancestor_ids(node_id) {
            if !ctx.aria_hidden_ids.contains(&ancestor) {
                with_ancestors.insert(ancestor);
            }
        }
    }
    with_ancestors
}
