//! The capability surface the engine layers program against.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use viewdriver_core_types::Rect;

use crate::errors::{SessionError, SessionErrorKind};
use crate::script::ScriptCall;

/// Mouse button for native input dispatch.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

impl Default for MouseButton {
    fn default() -> Self {
        MouseButton::Left
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum MousePhase {
    Moved,
    Pressed,
    Released,
}

/// One native protocol-level mouse event.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MouseEventSpec {
    pub phase: MousePhase,
    pub x: f64,
    pub y: f64,
    pub button: Option<MouseButton>,
    pub click_count: i64,
    pub modifiers: i64,
}

impl MouseEventSpec {
    pub fn moved(x: f64, y: f64) -> Self {
        Self {
            phase: MousePhase::Moved,
            x,
            y,
            button: None,
            click_count: 0,
            modifiers: 0,
        }
    }

    pub fn pressed(x: f64, y: f64, button: MouseButton, click_count: i64) -> Self {
        Self {
            phase: MousePhase::Pressed,
            x,
            y,
            button: Some(button),
            click_count,
            modifiers: 0,
        }
    }

    pub fn released(x: f64, y: f64, button: MouseButton, click_count: i64) -> Self {
        Self {
            phase: MousePhase::Released,
            x,
            y,
            button: Some(button),
            click_count,
            modifiers: 0,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum KeyPhase {
    Down,
    Up,
    Char,
}

/// One native protocol-level key event.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KeyEventSpec {
    pub phase: KeyPhase,
    pub key: Option<String>,
    pub text: Option<String>,
    pub modifiers: i64,
}

impl KeyEventSpec {
    pub fn down(key: impl Into<String>, modifiers: i64) -> Self {
        Self {
            phase: KeyPhase::Down,
            key: Some(key.into()),
            text: None,
            modifiers,
        }
    }

    pub fn up(key: impl Into<String>, modifiers: i64) -> Self {
        Self {
            phase: KeyPhase::Up,
            key: Some(key.into()),
            text: None,
            modifiers,
        }
    }

    pub fn char(text: impl Into<String>) -> Self {
        Self {
            phase: KeyPhase::Char,
            key: None,
            text: Some(text.into()),
            modifiers: 0,
        }
    }
}

/// One node of the full accessibility tree, as fetched from the protocol.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxNodeRecord {
    pub node_id: String,
    #[serde(default)]
    pub backend_dom_node_id: Option<i64>,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub ignored: bool,
    #[serde(default)]
    pub properties: Vec<AxPropertyRecord>,
    #[serde(default)]
    pub child_ids: Vec<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxPropertyRecord {
    pub name: String,
    pub value: Value,
}

impl AxNodeRecord {
    /// Boolean property lookup (`hidden`, `focusable`, ...).
    pub fn bool_property(&self, name: &str) -> Option<bool> {
        self.properties
            .iter()
            .find(|prop| prop.name == name)
            .and_then(|prop| prop.value.as_bool())
    }
}

/// Command/response surface of the remote-debugging session for one page.
///
/// Implementations are cheap to clone behind an `Arc`; the page itself is the
/// only shared resource and callers serialize their own access to it.
#[async_trait]
pub trait PageSession: Send + Sync {
    /// Run a script template in the page and return its JSON result.
    async fn evaluate(&self, call: ScriptCall) -> Result<Value, SessionError>;

    /// Content-box rect for a backend node, in CSS pixels.
    async fn box_model(&self, backend_node_id: i64) -> Result<Rect, SessionError>;

    async fn focus_node(&self, backend_node_id: i64) -> Result<(), SessionError>;

    async fn scroll_node_into_view(&self, backend_node_id: i64) -> Result<(), SessionError>;

    async fn dispatch_mouse(&self, event: MouseEventSpec) -> Result<(), SessionError>;

    async fn dispatch_key(&self, event: KeyEventSpec) -> Result<(), SessionError>;

    /// Resolve the node to a script object and invoke `function_decl` on it
    /// (`this` bound to the element), returning the JSON result.
    async fn call_on_node(
        &self,
        backend_node_id: i64,
        function_decl: &str,
    ) -> Result<Value, SessionError>;

    async fn ax_enable(&self) -> Result<(), SessionError>;

    async fn ax_disable(&self) -> Result<(), SessionError>;

    async fn ax_full_tree(&self) -> Result<Vec<AxNodeRecord>, SessionError>;

    async fn page_url(&self) -> Result<String, SessionError>;

    async fn page_title(&self) -> Result<String, SessionError>;
}

/// Decode a script result into a typed value.
pub async fn evaluate_typed<T: DeserializeOwned>(
    session: &dyn PageSession,
    call: ScriptCall,
) -> Result<T, SessionError> {
    let name = call.name();
    let value = session.evaluate(call).await?;
    serde_json::from_value(value).map_err(|err| {
        SessionError::new(SessionErrorKind::Internal)
            .with_hint(format!("script '{name}' returned unexpected payload: {err}"))
    })
}
