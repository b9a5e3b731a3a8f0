//! Scripted in-memory session for tests.
//!
//! Behaviors are keyed by script-template name or backend node id; every
//! dispatched input event is recorded so tests can assert on the exact
//! sequence the engine produced.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use viewdriver_core_types::Rect;

use crate::errors::{SessionError, SessionErrorKind};
use crate::script::ScriptCall;
use crate::session::{AxNodeRecord, KeyEventSpec, MouseEventSpec, PageSession};

#[derive(Default)]
pub struct MockSession {
    eval_queues: Mutex<HashMap<&'static str, VecDeque<Value>>>,
    eval_errors: Mutex<HashMap<&'static str, SessionError>>,
    box_models: Mutex<HashMap<i64, Rect>>,
    node_results: Mutex<HashMap<i64, Value>>,
    ax_nodes: Mutex<Vec<AxNodeRecord>>,
    url: Mutex<String>,
    title: Mutex<String>,

    /// (name, rendered source) of every evaluate call, in order.
    pub eval_log: Mutex<Vec<(String, String)>>,
    pub mouse_log: Mutex<Vec<MouseEventSpec>>,
    pub key_log: Mutex<Vec<KeyEventSpec>>,
    /// `true` per enable, `false` per disable, in call order.
    pub ax_toggle_log: Mutex<Vec<bool>>,
    pub focus_log: Mutex<Vec<i64>>,
    pub scroll_log: Mutex<Vec<i64>>,
}

impl MockSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a result for the next invocation of the named script template.
    pub fn push_eval(&self, name: &'static str, value: Value) {
        self.eval_queues
            .lock()
            .unwrap()
            .entry(name)
            .or_default()
            .push_back(value);
    }

    /// Make every invocation of the named template fail.
    pub fn fail_eval(&self, name: &'static str, error: SessionError) {
        self.eval_errors.lock().unwrap().insert(name, error);
    }

    pub fn set_box_model(&self, backend_node_id: i64, rect: Rect) {
        self.box_models
            .lock()
            .unwrap()
            .insert(backend_node_id, rect);
    }

    pub fn set_node_result(&self, backend_node_id: i64, value: Value) {
        self.node_results
            .lock()
            .unwrap()
            .insert(backend_node_id, value);
    }

    pub fn set_ax_nodes(&self, nodes: Vec<AxNodeRecord>) {
        *self.ax_nodes.lock().unwrap() = nodes;
    }

    pub fn set_url(&self, url: impl Into<String>) {
        *self.url.lock().unwrap() = url.into();
    }

    pub fn set_title(&self, title: impl Into<String>) {
        *self.title.lock().unwrap() = title.into();
    }

    pub fn eval_count(&self, name: &str) -> usize {
        self.eval_log
            .lock()
            .unwrap()
            .iter()
            .filter(|(called, _)| called == name)
            .count()
    }
}

#[async_trait]
impl PageSession for MockSession {
    async fn evaluate(&self, call: ScriptCall) -> Result<Value, SessionError> {
        let name = call.name();
        self.eval_log
            .lock()
            .unwrap()
            .push((name.to_string(), call.render()));
        if let Some(error) = self.eval_errors.lock().unwrap().get(name) {
            return Err(error.clone());
        }
        let queued = self
            .eval_queues
            .lock()
            .unwrap()
            .get_mut(name)
            .and_then(|queue| queue.pop_front());
        Ok(queued.unwrap_or(Value::Null))
    }

    async fn box_model(&self, backend_node_id: i64) -> Result<Rect, SessionError> {
        self.box_models
            .lock()
            .unwrap()
            .get(&backend_node_id)
            .copied()
            .ok_or_else(|| {
                SessionError::new(SessionErrorKind::TargetNotFound)
                    .with_hint(format!("no box model for node {backend_node_id}"))
            })
    }

    async fn focus_node(&self, backend_node_id: i64) -> Result<(), SessionError> {
        self.focus_log.lock().unwrap().push(backend_node_id);
        Ok(())
    }

    async fn scroll_node_into_view(&self, backend_node_id: i64) -> Result<(), SessionError> {
        self.scroll_log.lock().unwrap().push(backend_node_id);
        Ok(())
    }

    async fn dispatch_mouse(&self, event: MouseEventSpec) -> Result<(), SessionError> {
        self.mouse_log.lock().unwrap().push(event);
        Ok(())
    }

    async fn dispatch_key(&self, event: KeyEventSpec) -> Result<(), SessionError> {
        self.key_log.lock().unwrap().push(event);
        Ok(())
    }

    async fn call_on_node(
        &self,
        backend_node_id: i64,
        _function_decl: &str,
    ) -> Result<Value, SessionError> {
        self.node_results
            .lock()
            .unwrap()
            .get(&backend_node_id)
            .cloned()
            .ok_or_else(|| {
                SessionError::new(SessionErrorKind::TargetNotFound)
                    .with_hint(format!("no scripted result for node {backend_node_id}"))
            })
    }

    async fn ax_enable(&self) -> Result<(), SessionError> {
        self.ax_toggle_log.lock().unwrap().push(true);
        Ok(())
    }

    async fn ax_disable(&self) -> Result<(), SessionError> {
        self.ax_toggle_log.lock().unwrap().push(false);
        Ok(())
    }

    async fn ax_full_tree(&self) -> Result<Vec<AxNodeRecord>, SessionError> {
        Ok(self.ax_nodes.lock().unwrap().clone())
    }

    async fn page_url(&self) -> Result<String, SessionError> {
        Ok(self.url.lock().unwrap().clone())
    }

    async fn page_title(&self) -> Result<String, SessionError> {
        Ok(self.title.lock().unwrap().clone())
    }
}
