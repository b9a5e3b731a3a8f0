//! Interaction engine: operate on one resolved target the way a human with a
//! mouse and keyboard would.
//!
//! Every interaction family (click, type, select, checkbox toggle, submit,
//! plus key-chord and scroll helpers) runs the same pipeline skeleton —
//! resolve, scroll into view, focus, dispatch, settle — and differs only in
//! its dispatch-phase event sequence. Target acquisition walks a three-tier
//! ladder: a node handle the caller already holds, then fuzzy descriptor
//! resolution, then raw screen coordinates; each tier is tried at most once.

pub mod engine;
pub mod errors;
pub mod highlight;
pub mod model;
pub mod pipeline;
pub mod policy;
pub mod ports;
pub mod redact;
pub mod scripts;

mod checkbox;
mod click;
mod keys;
mod select;
mod submit;
mod type_text;

pub use engine::InteractionEngine;
pub use errors::InteractError;
pub use model::{
    ActionReport, CheckboxParams, ClickParams, ExecCtx, InteractionKind, KeyMod, PostSignals,
    PressKeyParams, ScrollParams, SelectChoice, SelectParams, SelectReport, SubmitParams,
    TargetRequest, Tier, ToggleReport, TypeParams,
};
pub use policy::InteractPolicy;
pub use ports::FinderPort;
