//! viewdriver
//!
//! Element resolution and interaction execution for an already-open page in
//! an embedded Chromium view. A caller describes a target fuzzily (tag,
//! approximate text, attributes, rough geometry, sibling index); this crate
//! resolves it to one concrete DOM node and operates on it with the layered
//! robustness of a human using a mouse and keyboard, or renders a filtered
//! accessibility snapshot of what is currently visible.
//!
//! The crate does not render UI, manage the browser process, or dispatch
//! tool calls; it consumes one protocol session for one page and exposes
//! typed operations on top of it.

pub mod api;
pub mod config;
pub mod context;
pub mod telemetry;

pub use api::{
    ActionOutcome, CheckboxOutcome, Driver, ResolveOutcome, SelectOutcome, SnapshotOutcome,
    TargetInfo,
};
pub use config::DriverConfig;
pub use context::HandlerContext;

pub use cdp_session::{ChromiumSession, PageSession};
pub use element_finder::{ElementDescriptor, NodeHandle};
pub use interaction_engine::{
    CheckboxParams, ClickParams, KeyMod, PressKeyParams, ScrollParams, SelectChoice, SelectParams,
    SubmitParams, TargetRequest, TypeParams,
};
pub use viewdriver_core_types::{DriverError, ErrorKind, PageId, Rect, SessionId};
