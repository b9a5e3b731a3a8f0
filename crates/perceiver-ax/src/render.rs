//! Indented text rendering of the filtered tree.

use std::collections::HashSet;

use cdp_session::AxNodeRecord;

use crate::model::AxTree;

/// Roles that carry no information of their own. Their children pass
/// through at the same depth.
const NOISE_ROLES: &[&str] = &["none", "generic", "InlineTextBox", "StaticText", "LineBreak"];

const INTERACTIVE_ROLES: &[&str] = &[
    "button",
    "link",
    "textbox",
    "searchbox",
    "combobox",
    "checkbox",
    "radio",
    "switch",
    "slider",
    "tab",
    "menuitem",
    "option",
    "listbox",
];

/// Flag-style properties worth echoing on a line.
const ECHOED_PROPERTIES: &[&str] = &[
    "disabled",
    "expanded",
    "selected",
    "focused",
    "required",
    "checked",
];

const TEXT_LIMIT: usize = 120;

fn truncate(text: &str) -> String {
    if text.chars().count() > TEXT_LIMIT {
        let mut out: String = text.chars().take(TEXT_LIMIT).collect();
        out.push('…');
        out
    } else {
        text.to_string()
    }
}

fn is_noise(role: &str) -> bool {
    NOISE_ROLES.contains(&role) || role.starts_with("LayoutTable")
}

fn is_interactive(role: &str) -> bool {
    INTERACTIVE_ROLES.contains(&role)
}

fn should_emit(node: &AxNodeRecord) -> bool {
    if node.ignored {
        return false;
    }
    if node.role == "generic" {
        // Plain wrappers surface only when they behave like controls.
        return node.bool_property("focusable") == Some(true)
            || node
                .properties
                .iter()
                .any(|prop| prop.name == "editable" && !prop.value.is_null());
    }
    if is_noise(&node.role) {
        return false;
    }
    !node.name.trim().is_empty() || is_interactive(&node.role)
}

fn format_line(node: &AxNodeRecord) -> String {
    let mut parts = vec![format!("[{}]", node.role)];
    if !node.name.trim().is_empty() {
        parts.push(format!("\"{}\"", truncate(node.name.trim())));
    }
    if let Some(value) = node.value.as_ref().filter(|value| !value.is_empty()) {
        parts.push(format!("value=\"{}\"", truncate(value)));
    }
    for prop in &node.properties {
        if !ECHOED_PROPERTIES.contains(&prop.name.as_str()) {
            continue;
        }
        match prop.value.as_bool() {
            Some(true) => parts.push(prop.name.clone()),
            Some(false) | None => {
                if let Some(text) = prop.value.as_str() {
                    parts.push(format!("{}={}", prop.name, text));
                }
            }
        }
    }
    parts.join(" ")
}

/// Depth-first rendering. Nodes outside `kept` and suppressed nodes both
/// pass their children through without consuming an indentation level, so
/// filtered-out wrappers never distort the tree shape.
pub fn render(tree: &AxTree, kept: &HashSet<String>, url: &str, title: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("URL: {url}\n"));
    out.push_str(&format!("Title: {title}\n"));

    if let Some(root) = tree.root() {
        walk(tree, kept, &root.node_id, 0, &mut out);
    }
    out
}

fn walk(tree: &AxTree, kept: &HashSet<String>, node_id: &str, depth: usize, out: &mut String) {
    let Some(node) = tree.get(node_id) else {
        return;
    };
    let emit = kept.contains(node_id) && should_emit(node);
    let child_depth = if emit {
        out.push_str(&"  ".repeat(depth));
        out.push_str(&format_line(node));
        out.push('\n');
        depth + 1
    } else {
        depth
    };
    for child in &node.child_ids {
        walk(tree, kept, child, child_depth, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdp_session::AxPropertyRecord;
    use serde_json::json;

    fn node(
        id: &str,
        parent: Option<&str>,
        children: &[&str],
        role: &str,
        name: &str,
    ) -> AxNodeRecord {
        AxNodeRecord {
            node_id: id.to_string(),
            parent_id: parent.map(|p| p.to_string()),
            child_ids: children.iter().map(|c| c.to_string()).collect(),
            role: role.to_string(),
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn keep_all(tree: &AxTree) -> HashSet<String> {
        tree.nodes()
            .iter()
            .map(|node| node.node_id.clone())
            .collect()
    }

    #[test]
    fn suppressed_wrappers_do_not_consume_indentation() {
        let tree = AxTree::new(vec![
            node("1", None, &["2"], "WebArea", "Page"),
            // Unnamed generic wrapper between the root and the button.
            node("2", Some("1"), &["3"], "generic", ""),
            node("3", Some("2"), &[], "button", "Save"),
        ]);
        let rendered = render(&tree, &keep_all(&tree), "https://example.com/", "Example");
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "URL: https://example.com/");
        assert_eq!(lines[1], "Title: Example");
        assert_eq!(lines[2], "[WebArea] \"Page\"");
        // One level deep, not two: the generic wrapper was passed through.
        assert_eq!(lines[3], "  [button] \"Save\"");
    }

    #[test]
    fn noise_roles_are_dropped_and_long_names_truncated() {
        let long_name = "n".repeat(200);
        let mut text_node = node("2", Some("1"), &[], "StaticText", "decoration");
        text_node.ignored = false;
        let tree = AxTree::new(vec![
            node("1", None, &["2", "3"], "WebArea", ""),
            text_node,
            node("3", Some("1"), &[], "link", &long_name),
        ]);
        let rendered = render(&tree, &keep_all(&tree), "", "");
        assert!(!rendered.contains("decoration"));
        assert!(rendered.contains("[link]"));
        assert!(rendered.contains('…'));
    }

    #[test]
    fn focusable_generic_nodes_are_emitted() {
        let mut editable = node("2", Some("1"), &[], "generic", "");
        editable.properties = vec![AxPropertyRecord {
            name: "focusable".to_string(),
            value: json!(true),
        }];
        let tree = AxTree::new(vec![node("1", None, &["2"], "WebArea", "p"), editable]);
        let rendered = render(&tree, &keep_all(&tree), "", "");
        assert!(rendered.contains("[generic]"));
    }

    #[test]
    fn checked_state_is_echoed() {
        let mut checkbox = node("2", Some("1"), &[], "checkbox", "Subscribe");
        checkbox.properties = vec![AxPropertyRecord {
            name: "checked".to_string(),
            value: json!("true"),
        }];
        let tree = AxTree::new(vec![node("1", None, &["2"], "WebArea", "p"), checkbox]);
        let rendered = render(&tree, &keep_all(&tree), "", "");
        assert!(rendered.contains("[checkbox] \"Subscribe\" checked=true"));
    }
}
