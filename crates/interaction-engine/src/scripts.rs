//! Script templates for node-handle interactions.
//!
//! Every template addresses its element through the in-page registry the
//! candidate query populated (`window.__vd_targets`); a missing or detached
//! entry signals staleness rather than throwing.

pub const TARGET_STATE_NAME: &str = "target-state";

/// `(handle) -> {rect, disabled, focusable, editable, visible} | null`.
pub const TARGET_STATE: &str = r#"(handle) => {
    const el = window.__vd_targets && window.__vd_targets[handle];
    if (!el || !el.isConnected) return null;
    const rect = el.getBoundingClientRect();
    const style = window.getComputedStyle(el);
    return {
        x: rect.x,
        y: rect.y,
        width: rect.width,
        height: rect.height,
        disabled: el.disabled === true || el.getAttribute('aria-disabled') === 'true',
        focusable: el.tabIndex >= 0 || /^(input|textarea|select|button|a)$/i.test(el.tagName),
        editable: el.isContentEditable === true,
        visible: rect.width > 0 && rect.height > 0
            && style.display !== 'none' && style.visibility !== 'hidden',
    };
}"#;

pub const SCROLL_INTO_VIEW_NAME: &str = "scroll-into-view";

pub const SCROLL_INTO_VIEW: &str = r#"(handle) => {
    const el = window.__vd_targets && window.__vd_targets[handle];
    if (!el || !el.isConnected) return false;
    el.scrollIntoView({ block: 'center', inline: 'center' });
    return true;
}"#;

pub const HIGHLIGHT_ON_NAME: &str = "highlight-on";

pub const HIGHLIGHT_ON: &str = r#"(handle) => {
    const el = window.__vd_targets && window.__vd_targets[handle];
    if (!el || !el.isConnected) return false;
    el.__vdOutline = el.style.outline;
    el.__vdOutlineOffset = el.style.outlineOffset;
    el.style.outline = '2px solid #4f8ef7';
    el.style.outlineOffset = '1px';
    return true;
}"#;

pub const HIGHLIGHT_OFF_NAME: &str = "highlight-off";

pub const HIGHLIGHT_OFF: &str = r#"(handle) => {
    const el = window.__vd_targets && window.__vd_targets[handle];
    if (!el) return false;
    el.style.outline = el.__vdOutline || '';
    el.style.outlineOffset = el.__vdOutlineOffset || '';
    delete el.__vdOutline;
    delete el.__vdOutlineOffset;
    return true;
}"#;

pub const DISPATCH_PHASE_NAME: &str = "dispatch-phase";

/// `(handle, phase, x, y) -> bool`. Phases mirror a real pointer gesture:
/// hover, focus, press, release, click. The final phase also invokes the
/// native `click()` activation for maximum framework compatibility.
pub const DISPATCH_PHASE: &str = r#"(handle, phase, x, y) => {
    const el = window.__vd_targets && window.__vd_targets[handle];
    if (!el || !el.isConnected) return false;
    const base = {
        bubbles: true, cancelable: true, composed: true,
        clientX: x, clientY: y, button: 0, view: window,
    };
    const fire = (Ctor, type, opts) => el.dispatchEvent(new Ctor(type, opts || base));
    switch (phase) {
        case 'hover':
            fire(PointerEvent, 'pointerover');
            fire(PointerEvent, 'pointerenter', { ...base, bubbles: false });
            fire(MouseEvent, 'mouseover');
            fire(MouseEvent, 'mouseenter', { ...base, bubbles: false });
            break;
        case 'focus':
            if (typeof el.focus === 'function') el.focus();
            break;
        case 'press':
            fire(PointerEvent, 'pointerdown');
            fire(MouseEvent, 'mousedown');
            break;
        case 'release':
            fire(PointerEvent, 'pointerup');
            fire(MouseEvent, 'mouseup');
            break;
        case 'click':
            fire(MouseEvent, 'click');
            if (typeof el.click === 'function') el.click();
            break;
        default:
            return false;
    }
    return true;
}"#;

pub const FOCUS_TARGET_NAME: &str = "focus-target";

pub const FOCUS_TARGET: &str = r#"(handle) => {
    const el = window.__vd_targets && window.__vd_targets[handle];
    if (!el || !el.isConnected) return false;
    el.focus();
    return document.activeElement === el
        || (el.contains && el.contains(document.activeElement));
}"#;

pub const SELECT_OPTION_NAME: &str = "select-option";

/// `(handle, value, label, index) -> {ok, value?, label?, reason?}`.
/// Match priority: exact value, exact label, label substring, numeric index.
pub const SELECT_OPTION: &str = r#"(handle, value, label, index) => {
    const el = window.__vd_targets && window.__vd_targets[handle];
    if (!el || !el.isConnected) return { ok: false, reason: 'stale' };
    if (!el.options) return { ok: false, reason: 'not-a-select' };
    const options = Array.from(el.options);
    const labelOf = (o) => o.label || o.text || '';
    let pick = -1;
    if (value !== null) pick = options.findIndex((o) => o.value === value);
    if (pick < 0 && label !== null) pick = options.findIndex((o) => labelOf(o) === label);
    if (pick < 0 && label !== null) {
        const needle = label.toLowerCase();
        pick = options.findIndex((o) => labelOf(o).toLowerCase().includes(needle));
    }
    if (pick < 0 && index !== null && index >= 0 && index < options.length) pick = index;
    if (pick < 0) return { ok: false, reason: 'option-not-found' };
    el.selectedIndex = pick;
    el.dispatchEvent(new Event('change', { bubbles: true }));
    el.dispatchEvent(new Event('input', { bubbles: true }));
    return { ok: true, value: options[pick].value, label: labelOf(options[pick]) };
}"#;

pub const TOGGLE_CHECKBOX_NAME: &str = "toggle-checkbox";

/// `(handle, desired) -> {changed, checked} | null`.
///
/// Idempotent: when the current state already matches, nothing is dispatched.
/// Native checkboxes toggle through `click()` so the activation behavior
/// fires its own click/input/change; ARIA widgets get the synthetic trio.
pub const TOGGLE_CHECKBOX: &str = r#"(handle, desired) => {
    const el = window.__vd_targets && window.__vd_targets[handle];
    if (!el || !el.isConnected) return null;
    const native = typeof el.checked === 'boolean';
    const current = native ? el.checked : el.getAttribute('aria-checked') === 'true';
    if (current === desired) return { changed: false, checked: current };
    if (native) {
        el.click();
    } else {
        el.setAttribute('aria-checked', desired ? 'true' : 'false');
        el.dispatchEvent(new MouseEvent('click', { bubbles: true, cancelable: true }));
        el.dispatchEvent(new Event('change', { bubbles: true }));
        el.dispatchEvent(new Event('input', { bubbles: true }));
    }
    const now = native ? el.checked : el.getAttribute('aria-checked') === 'true';
    return { changed: true, checked: now };
}"#;

pub const SUBMIT_FORM_NAME: &str = "submit-form";

/// `(attrs | null) -> {ok, reason?}`. `requestSubmit()` is preferred so
/// HTML5 validation still runs; `submit()` is the fallback.
pub const SUBMIT_FORM: &str = r#"(attrs) => {
    const forms = Array.from(document.forms);
    let form = null;
    if (attrs && Object.keys(attrs).length > 0) {
        form = forms.find((f) =>
            Object.keys(attrs).every((key) => f.getAttribute(key) === attrs[key])) || null;
    } else {
        form = forms[0] || null;
    }
    if (!form) return { ok: false, reason: 'form-not-found' };
    if (typeof form.requestSubmit === 'function') {
        form.requestSubmit();
    } else {
        form.submit();
    }
    return { ok: true };
}"#;

pub const SCROLL_BY_NAME: &str = "scroll-by";

pub const SCROLL_BY: &str = r#"(dx, dy) => {
    window.scrollBy(dx, dy);
    return true;
}"#;
