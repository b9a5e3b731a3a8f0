//! Protocol session for one attached page.
//!
//! Everything the engine says to the browser goes through the [`PageSession`]
//! trait: typed script injection plus the handful of CDP commands the upper
//! layers need (box model, input dispatch, accessibility tree, scoped node
//! invocation). The concrete [`ChromiumSession`] wraps an already-attached
//! `chromiumoxide` page; it does not launch or own the browser process.

pub mod errors;
pub mod script;
pub mod session;

mod chromium;

#[cfg(feature = "mock")]
pub mod mock;

pub use chromium::ChromiumSession;
pub use errors::{SessionError, SessionErrorKind};
pub use script::ScriptCall;
pub use session::{
    evaluate_typed, AxNodeRecord, AxPropertyRecord, KeyEventSpec, KeyPhase, MouseButton,
    MouseEventSpec, MousePhase, PageSession,
};
