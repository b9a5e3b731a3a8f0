//! Shared primitives for the viewdriver engine.
//!
//! Every sibling crate speaks in terms of the ids, geometry and error
//! taxonomy defined here; nothing in this crate touches the protocol.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Identifier for one driver session (one attached page).
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Identifier for the page/tab the session is bound to.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct PageId(pub String);

impl PageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for PageId {
    fn default() -> Self {
        Self::new()
    }
}

/// Identifier minted per public operation, threaded through logs and reports.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ActionId(pub String);

impl ActionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for ActionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Axis-aligned rectangle in CSS pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Grow the rect by `margin` on every side.
    pub fn expanded(&self, margin: f64) -> Self {
        Self {
            x: self.x - margin,
            y: self.y - margin,
            width: self.width + margin * 2.0,
            height: self.height + margin * 2.0,
        }
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }

    /// Manhattan distance between the top-left corners.
    pub fn corner_distance(&self, other: &Rect) -> f64 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

/// Machine-readable failure categories surfaced on every public operation.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The in-page candidate query returned nothing.
    NoCandidates,
    /// Scoring eliminated every candidate; callers treat this as NoCandidates.
    NoScoredMatch,
    /// Diagnostic only: the top two scores were within 10 points.
    AmbiguousMatch,
    /// The target carries `disabled`/`aria-disabled`; no events were dispatched.
    ElementDisabled,
    FocusFailed,
    ClickFailed,
    TypeFailed,
    SelectFailed,
    ToggleFailed,
    SubmitFailed,
    /// Geometry re-read failed after a successful resolution; the DOM moved.
    StaleElement,
    /// The accessibility tree came back empty.
    NoNodesFound,
    /// Transport/session failure underneath any operation.
    Protocol,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NoCandidates => "no_candidates",
            ErrorKind::NoScoredMatch => "no_scored_match",
            ErrorKind::AmbiguousMatch => "ambiguous_match",
            ErrorKind::ElementDisabled => "element_disabled",
            ErrorKind::FocusFailed => "focus_failed",
            ErrorKind::ClickFailed => "click_failed",
            ErrorKind::TypeFailed => "type_failed",
            ErrorKind::SelectFailed => "select_failed",
            ErrorKind::ToggleFailed => "toggle_failed",
            ErrorKind::SubmitFailed => "submit_failed",
            ErrorKind::StaleElement => "stale_element",
            ErrorKind::NoNodesFound => "no_nodes_found",
            ErrorKind::Protocol => "protocol",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The error value every outward interface returns: a taxonomy kind plus a
/// human-readable message. Raw protocol payloads never cross this boundary.
#[derive(Clone, Debug, Error, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct DriverError {
    pub kind: ErrorKind,
    pub message: String,
}

impl DriverError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Protocol, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_center_and_expansion() {
        let rect = Rect::new(10.0, 20.0, 100.0, 50.0);
        assert_eq!(rect.center(), (60.0, 45.0));

        let grown = rect.expanded(200.0);
        assert_eq!(grown.x, -190.0);
        assert_eq!(grown.width, 500.0);
    }

    #[test]
    fn rect_intersection() {
        let viewport = Rect::new(0.0, 0.0, 1920.0, 1080.0).expanded(200.0);
        // 150px above the top edge: still inside the buffered viewport.
        let near = Rect::new(100.0, -150.0, 80.0, 30.0);
        // 250px above: outside.
        let far = Rect::new(100.0, -280.0, 80.0, 30.0);
        assert!(viewport.intersects(&near));
        assert!(!viewport.intersects(&far));
    }

    #[test]
    fn error_kind_round_trips_through_serde() {
        let err = DriverError::new(ErrorKind::ElementDisabled, "button is disabled");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "element_disabled");
        let back: DriverError = serde_json::from_value(json).unwrap();
        assert_eq!(back.kind, ErrorKind::ElementDisabled);
    }
}
