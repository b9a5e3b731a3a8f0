//! `PageSession` backed by an already-attached `chromiumoxide` page.

use std::sync::Arc;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::accessibility::{
    AxNode, DisableParams as AxDisableParams, EnableParams as AxEnableParams, GetFullAxTreeParams,
};
use chromiumoxide::cdp::browser_protocol::dom::{
    BackendNodeId, FocusParams, GetBoxModelParams, ResolveNodeParams,
    ScrollIntoViewIfNeededParams,
};
use chromiumoxide::cdp::browser_protocol::input::{
    DispatchKeyEventParams, DispatchKeyEventType, DispatchMouseEventParams,
    DispatchMouseEventType, MouseButton as CdpMouseButton,
};
use chromiumoxide::cdp::js_protocol::runtime::CallFunctionOnParams;
use chromiumoxide::error::CdpError;
use chromiumoxide::Page;
use serde_json::Value;
use tracing::debug;
use viewdriver_core_types::Rect;

use crate::errors::{SessionError, SessionErrorKind};
use crate::script::ScriptCall;
use crate::session::{
    AxNodeRecord, AxPropertyRecord, KeyEventSpec, KeyPhase, MouseButton, MouseEventSpec,
    MousePhase, PageSession,
};

/// Session over one page of a Chromium-based view the caller already opened.
#[derive(Clone)]
pub struct ChromiumSession {
    page: Arc<Page>,
}

impl ChromiumSession {
    pub fn new(page: Arc<Page>) -> Self {
        Self { page }
    }
}

fn map_cdp_error(err: CdpError) -> SessionError {
    let hint = err.to_string();
    match err {
        CdpError::Timeout => SessionError::new(SessionErrorKind::Timeout)
            .with_hint(hint)
            .retriable(true),
        CdpError::JavascriptException(_) => {
            SessionError::new(SessionErrorKind::JsException).with_hint(hint)
        }
        CdpError::NotFound => SessionError::new(SessionErrorKind::TargetNotFound).with_hint(hint),
        _ => SessionError::new(SessionErrorKind::CdpIo)
            .with_hint(hint)
            .retriable(true),
    }
}

fn rect_from_quad(quad: &[f64]) -> Result<Rect, SessionError> {
    if quad.len() < 8 {
        return Err(SessionError::new(SessionErrorKind::Internal)
            .with_hint(format!("box model quad has {} points", quad.len())));
    }
    let xs = [quad[0], quad[2], quad[4], quad[6]];
    let ys = [quad[1], quad[3], quad[5], quad[7]];
    let min_x = xs.iter().cloned().fold(f64::INFINITY, f64::min);
    let max_x = xs.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let min_y = ys.iter().cloned().fold(f64::INFINITY, f64::min);
    let max_y = ys.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    Ok(Rect::new(min_x, min_y, max_x - min_x, max_y - min_y))
}

fn map_ax_node(node: AxNode) -> AxNodeRecord {
    let role = node
        .role
        .as_ref()
        .and_then(|value| value.value.as_ref())
        .and_then(|value| value.as_str())
        .unwrap_or_default()
        .to_string();
    let name = node
        .name
        .as_ref()
        .and_then(|value| value.value.as_ref())
        .and_then(|value| value.as_str())
        .unwrap_or_default()
        .to_string();
    let value = node
        .value
        .as_ref()
        .and_then(|value| value.value.as_ref())
        .and_then(|value| value.as_str())
        .map(|text| text.to_string());
    let properties = node
        .properties
        .unwrap_or_default()
        .into_iter()
        .map(|prop| AxPropertyRecord {
            name: serde_json::to_value(&prop.name)
                .ok()
                .and_then(|raw| raw.as_str().map(|name| name.to_string()))
                .unwrap_or_default(),
            value: prop.value.value.unwrap_or(Value::Null),
        })
        .collect();
    AxNodeRecord {
        node_id: node.node_id.inner().to_string(),
        backend_dom_node_id: node.backend_dom_node_id.map(|id| *id.inner()),
        role,
        name,
        value,
        ignored: node.ignored,
        properties,
        child_ids: node
            .child_ids
            .unwrap_or_default()
            .iter()
            .map(|id| id.inner().to_string())
            .collect(),
        parent_id: node.parent_id.map(|id| id.inner().to_string()),
    }
}

#[async_trait]
impl PageSession for ChromiumSession {
    async fn evaluate(&self, call: ScriptCall) -> Result<Value, SessionError> {
        debug!(target: "cdp-session", script = call.name(), "evaluate");
        let result = self
            .page
            .evaluate(call.render())
            .await
            .map_err(map_cdp_error)?;
        Ok(result.value().cloned().unwrap_or(Value::Null))
    }

    async fn box_model(&self, backend_node_id: i64) -> Result<Rect, SessionError> {
        let params = GetBoxModelParams::builder()
            .backend_node_id(BackendNodeId::new(backend_node_id))
            .build();
        let response = self.page.execute(params).await.map_err(map_cdp_error)?;
        rect_from_quad(response.result.model.content.inner())
    }

    async fn focus_node(&self, backend_node_id: i64) -> Result<(), SessionError> {
        let params = FocusParams::builder()
            .backend_node_id(BackendNodeId::new(backend_node_id))
            .build();
        self.page.execute(params).await.map_err(map_cdp_error)?;
        Ok(())
    }

    async fn scroll_node_into_view(&self, backend_node_id: i64) -> Result<(), SessionError> {
        let params = ScrollIntoViewIfNeededParams::builder()
            .backend_node_id(BackendNodeId::new(backend_node_id))
            .build();
        self.page.execute(params).await.map_err(map_cdp_error)?;
        Ok(())
    }

    async fn dispatch_mouse(&self, event: MouseEventSpec) -> Result<(), SessionError> {
        let phase = match event.phase {
            MousePhase::Moved => DispatchMouseEventType::MouseMoved,
            MousePhase::Pressed => DispatchMouseEventType::MousePressed,
            MousePhase::Released => DispatchMouseEventType::MouseReleased,
        };
        let mut builder = DispatchMouseEventParams::builder()
            .r#type(phase)
            .x(event.x)
            .y(event.y)
            .modifiers(event.modifiers);
        if let Some(button) = event.button {
            builder = builder.button(match button {
                MouseButton::Left => CdpMouseButton::Left,
                MouseButton::Middle => CdpMouseButton::Middle,
                MouseButton::Right => CdpMouseButton::Right,
            });
        }
        if event.click_count > 0 {
            builder = builder.click_count(event.click_count);
        }
        let params = builder.build().map_err(|err| {
            SessionError::new(SessionErrorKind::Internal)
                .with_hint(format!("mouse event build: {err}"))
        })?;
        self.page.execute(params).await.map_err(map_cdp_error)?;
        Ok(())
    }

    async fn dispatch_key(&self, event: KeyEventSpec) -> Result<(), SessionError> {
        let phase = match event.phase {
            KeyPhase::Down => DispatchKeyEventType::KeyDown,
            KeyPhase::Up => DispatchKeyEventType::KeyUp,
            KeyPhase::Char => DispatchKeyEventType::Char,
        };
        let mut builder = DispatchKeyEventParams::builder()
            .r#type(phase)
            .modifiers(event.modifiers);
        if let Some(key) = &event.key {
            builder = builder.key(key.clone());
        }
        if let Some(text) = &event.text {
            builder = builder.text(text.clone());
        }
        let params = builder.build().map_err(|err| {
            SessionError::new(SessionErrorKind::Internal)
                .with_hint(format!("key event build: {err}"))
        })?;
        self.page.execute(params).await.map_err(map_cdp_error)?;
        Ok(())
    }

    async fn call_on_node(
        &self,
        backend_node_id: i64,
        function_decl: &str,
    ) -> Result<Value, SessionError> {
        let resolve = ResolveNodeParams::builder()
            .backend_node_id(BackendNodeId::new(backend_node_id))
            .build();
        let resolved = self.page.execute(resolve).await.map_err(map_cdp_error)?;
        let object_id = resolved.result.object.object_id.ok_or_else(|| {
            SessionError::new(SessionErrorKind::TargetNotFound)
                .with_hint(format!("node {backend_node_id} has no script object"))
        })?;

        let call = CallFunctionOnParams::builder()
            .function_declaration(function_decl)
            .object_id(object_id)
            .return_by_value(true)
            .build()
            .map_err(|err| {
                SessionError::new(SessionErrorKind::Internal)
                    .with_hint(format!("call build: {err}"))
            })?;
        let response = self.page.execute(call).await.map_err(map_cdp_error)?;
        if let Some(details) = response.result.exception_details {
            return Err(SessionError::new(SessionErrorKind::JsException)
                .with_hint(details.text.to_string()));
        }
        Ok(response.result.result.value.unwrap_or(Value::Null))
    }

    async fn ax_enable(&self) -> Result<(), SessionError> {
        self.page
            .execute(AxEnableParams::default())
            .await
            .map_err(map_cdp_error)?;
        Ok(())
    }

    async fn ax_disable(&self) -> Result<(), SessionError> {
        self.page
            .execute(AxDisableParams::default())
            .await
            .map_err(map_cdp_error)?;
        Ok(())
    }

    async fn ax_full_tree(&self) -> Result<Vec<AxNodeRecord>, SessionError> {
        let response = self
            .page
            .execute(GetFullAxTreeParams::builder().build())
            .await
            .map_err(map_cdp_error)?;
        Ok(response.result.nodes.into_iter().map(map_ax_node).collect())
    }

    async fn page_url(&self) -> Result<String, SessionError> {
        Ok(self
            .page
            .url()
            .await
            .map_err(map_cdp_error)?
            .unwrap_or_default())
    }

    async fn page_title(&self) -> Result<String, SessionError> {
        Ok(self
            .page
            .get_title()
            .await
            .map_err(map_cdp_error)?
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_to_rect_uses_extremes() {
        let quad = [10.0, 20.0, 110.0, 20.0, 110.0, 60.0, 10.0, 60.0];
        let rect = rect_from_quad(&quad).unwrap();
        assert_eq!(rect, Rect::new(10.0, 20.0, 100.0, 40.0));
    }

    #[test]
    fn short_quad_is_rejected() {
        assert!(rect_from_quad(&[1.0, 2.0]).is_err());
    }
}
