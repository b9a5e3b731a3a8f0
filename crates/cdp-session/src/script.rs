//! Typed script-injection calls.
//!
//! In-page scripts are the escape hatch for work that is cheaper as one
//! round trip than as many protocol commands. Each injection point is a
//! named template: a JS function literal applied to JSON-encoded arguments,
//! so the set of scripts the engine can run is a closed, auditable list and
//! the rendered source is reproducible in tests.

use serde_json::Value;

/// One invocation of a named script template.
#[derive(Clone, Debug)]
pub struct ScriptCall {
    name: &'static str,
    source: &'static str,
    args: Vec<Value>,
}

impl ScriptCall {
    /// `source` must be a JS function literal (arrow or `function`).
    pub fn new(name: &'static str, source: &'static str) -> Self {
        Self {
            name,
            source,
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, value: Value) -> Self {
        self.args.push(value);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Render the template applied to its arguments as one expression.
    pub fn render(&self) -> String {
        let args = self
            .args
            .iter()
            .map(|value| value.to_string())
            .collect::<Vec<_>>()
            .join(",");
        format!("({})({})", self.source, args)
    }
}
