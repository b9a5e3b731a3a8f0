//! Candidate generation: one in-page script call per resolution.
//!
//! Candidates are produced fresh on every call and never cached; the DOM may
//! have mutated between any two resolutions. Matched elements are parked in
//! an in-page registry (`window.__vd_targets`) so later interaction scripts
//! can address the chosen one by index without a second search.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use viewdriver_core_types::Rect;

/// Per-resolution record for one surviving element.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub tag_name: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub bounding_box: Rect,
    #[serde(default)]
    pub visible: bool,
    #[serde(default)]
    pub in_viewport: bool,
    #[serde(default)]
    pub in_modal: bool,
    #[serde(default)]
    pub sibling_index: i64,
    /// Index into the in-page target registry.
    pub handle: u32,
}

pub const FIND_CANDIDATES_NAME: &str = "find-candidates";

/// `(tag, text, stableAttrs) -> Candidate[]`.
///
/// Filtering here uses only the stable attribute subset; dynamic attributes
/// reflect transient UI state and are left to host-side scoring.
pub const FIND_CANDIDATES: &str = r#"(tag, text, stableAttrs) => {
    const BROAD = 'button, a, input, textarea, label, span, div, [role=button], [role=link]';
    let els = Array.from(document.getElementsByTagName(tag));
    if (els.length === 0 && text) {
        els = Array.from(document.querySelectorAll(BROAD));
    }
    if (text) {
        const needle = text.trim().toLowerCase();
        els = els.filter((el) => {
            const sources = [
                el.innerText,
                el.getAttribute('aria-label'),
                el.getAttribute('placeholder'),
                el.getAttribute('title'),
                el.value,
            ];
            return sources.some((s) => typeof s === 'string' && s.toLowerCase().includes(needle));
        });
    }
    const stableKeys = Object.keys(stableAttrs || {});
    if (stableKeys.length > 0) {
        els = els.filter((el) => stableKeys.some((key) => {
            const wanted = stableAttrs[key];
            const actual = el.getAttribute(key);
            if (actual === null) return false;
            return actual === wanted || actual.includes(wanted) || wanted.includes(actual);
        }));
    }
    const classText = (node) => {
        const cls = node.className && node.className.baseVal !== undefined
            ? node.className.baseVal
            : node.className;
        return ((cls || '') + ' ' + (node.id || ''));
    };
    const insideModal = (el) => {
        let node = el;
        for (let depth = 0; depth < 10 && node && node.getAttribute; depth++) {
            const role = node.getAttribute('role');
            if (role === 'dialog' || role === 'alertdialog') return true;
            if (node.getAttribute('aria-modal') === 'true') return true;
            if (/modal|dialog|overlay|popup/i.test(classText(node))) {
                const z = parseInt(window.getComputedStyle(node).zIndex, 10);
                if (!isNaN(z) && z > 50) return true;
            }
            node = node.parentElement;
        }
        return false;
    };
    window.__vd_targets = els;
    return els.map((el, index) => {
        const rect = el.getBoundingClientRect();
        const style = window.getComputedStyle(el);
        const attrs = {};
        for (const attr of el.attributes) attrs[attr.name] = attr.value;
        const parent = el.parentElement;
        return {
            tagName: el.tagName.toLowerCase(),
            text: (el.innerText || '').slice(0, 200),
            attributes: attrs,
            boundingBox: { x: rect.x, y: rect.y, width: rect.width, height: rect.height },
            visible: rect.width > 0 && rect.height > 0
                && style.display !== 'none'
                && style.visibility !== 'hidden'
                && style.opacity !== '0',
            inViewport: rect.bottom > 0 && rect.right > 0
                && rect.top < window.innerHeight && rect.left < window.innerWidth,
            inModal: insideModal(el),
            siblingIndex: parent ? Array.prototype.indexOf.call(parent.children, el) : 0,
            handle: index,
        };
    });
}"#;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn candidate_decodes_from_script_payload() {
        let payload = json!({
            "tagName": "button",
            "text": "Submit",
            "attributes": {"type": "submit", "class": "btn primary"},
            "boundingBox": {"x": 10.0, "y": 20.0, "width": 80.0, "height": 30.0},
            "visible": true,
            "inViewport": true,
            "inModal": false,
            "siblingIndex": 2,
            "handle": 0
        });
        let candidate: Candidate = serde_json::from_value(payload).unwrap();
        assert_eq!(candidate.tag_name, "button");
        assert_eq!(candidate.attributes["type"], "submit");
        assert_eq!(candidate.sibling_index, 2);
    }

    #[test]
    fn missing_optional_fields_default() {
        let payload = json!({"tagName": "div", "handle": 3});
        let candidate: Candidate = serde_json::from_value(payload).unwrap();
        assert!(!candidate.visible);
        assert!(candidate.text.is_empty());
        assert_eq!(candidate.handle, 3);
    }
}
