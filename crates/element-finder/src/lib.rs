//! Element finder: fuzzy descriptor in, one concrete DOM node out.
//!
//! Callers cannot supply stable CSS selectors against framework-rendered
//! pages, so resolution works from a descriptor (tag + approximate text +
//! attributes + rough geometry + sibling index) instead:
//! - one in-page query generates every candidate in a single round trip
//! - candidates are scored host-side with an additive, capped model that
//!   favours structural signals over volatile ones
//! - a sibling index may break near-ties, never a clear winner

pub mod candidates;
pub mod descriptor;
pub mod errors;
pub mod resolver;
pub mod scoring;

pub use candidates::Candidate;
pub use descriptor::ElementDescriptor;
pub use errors::FinderError;
pub use resolver::{ElementFinder, NodeHandle, ResolvedTarget, Resolution};
pub use scoring::{is_dynamic_attribute, score_candidate, ScoredCandidate};
