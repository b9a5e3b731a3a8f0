use std::time::{Duration, Instant};

use bitflags::bitflags;
use element_finder::{ElementDescriptor, NodeHandle};
use serde::{Deserialize, Serialize};
use viewdriver_core_types::ActionId;

/// Execution context minted per public operation.
///
/// Operations are not cancellable mid-flight; callers wanting cancellation
/// impose an external timeout and treat a cancelled call's side effects as
/// already committed.
#[derive(Clone, Debug)]
pub struct ExecCtx {
    pub action_id: ActionId,
    pub deadline: Instant,
}

impl ExecCtx {
    pub fn new() -> Self {
        Self::with_deadline(Instant::now() + Duration::from_secs(30))
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            action_id: ActionId::new(),
            deadline,
        }
    }
}

impl Default for ExecCtx {
    fn default() -> Self {
        Self::new()
    }
}

bitflags! {
    /// Keyboard modifiers, numbered the way the input protocol expects.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct KeyMod: u8 {
        const ALT = 0b0001;
        const CTRL = 0b0010;
        const META = 0b0100;
        const SHIFT = 0b1000;
    }
}

impl Default for KeyMod {
    fn default() -> Self {
        KeyMod::empty()
    }
}

impl KeyMod {
    pub fn protocol_bits(&self) -> i64 {
        self.bits() as i64
    }

    /// The platform's primary shortcut modifier (select-all and friends).
    #[cfg(target_os = "macos")]
    pub fn primary() -> Self {
        KeyMod::META
    }

    #[cfg(not(target_os = "macos"))]
    pub fn primary() -> Self {
        KeyMod::CTRL
    }
}

/// What the caller knows about the target, in ladder order: a node handle
/// from an earlier resolution, a fuzzy descriptor, raw screen coordinates.
#[derive(Clone, Debug, Default)]
pub struct TargetRequest {
    pub handle: Option<NodeHandle>,
    pub descriptor: Option<ElementDescriptor>,
    pub position: Option<(f64, f64)>,
}

impl TargetRequest {
    pub fn from_handle(handle: NodeHandle) -> Self {
        Self {
            handle: Some(handle),
            ..Default::default()
        }
    }

    pub fn from_descriptor(descriptor: ElementDescriptor) -> Self {
        Self {
            descriptor: Some(descriptor),
            ..Default::default()
        }
    }

    pub fn from_position(x: f64, y: f64) -> Self {
        Self {
            position: Some((x, y)),
            ..Default::default()
        }
    }

    /// Tiers available for this request, in attempt order.
    pub fn tiers(&self) -> Vec<Tier> {
        let mut tiers = Vec::new();
        if self.handle.is_some() {
            tiers.push(Tier::Handle);
        }
        if self.descriptor.is_some() {
            tiers.push(Tier::Descriptor);
        }
        if self.position.is_some() {
            tiers.push(Tier::Position);
        }
        tiers
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Tier {
    Handle,
    Descriptor,
    Position,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Handle => "handle",
            Tier::Descriptor => "descriptor",
            Tier::Position => "position",
        }
    }
}

/// Interaction families, used for error attribution and logging.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InteractionKind {
    Click,
    Type,
    Select,
    Checkbox,
    Submit,
    PressKey,
    Scroll,
}

impl InteractionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionKind::Click => "click",
            InteractionKind::Type => "type",
            InteractionKind::Select => "select",
            InteractionKind::Checkbox => "checkbox",
            InteractionKind::Submit => "submit",
            InteractionKind::PressKey => "press-key",
            InteractionKind::Scroll => "scroll",
        }
    }
}

#[derive(Clone, Debug)]
pub struct ClickParams {
    pub target: TargetRequest,
    pub click_count: u8,
}

impl ClickParams {
    pub fn new(target: TargetRequest) -> Self {
        Self {
            target,
            click_count: 1,
        }
    }
}

#[derive(Clone, Debug)]
pub struct TypeParams {
    pub target: TargetRequest,
    pub text: String,
    pub clear_first: bool,
    pub press_enter: bool,
}

impl TypeParams {
    pub fn new(target: TargetRequest, text: impl Into<String>) -> Self {
        Self {
            target,
            text: text.into(),
            clear_first: true,
            press_enter: false,
        }
    }
}

/// Option choice, tried value → label (exact, then substring) → index.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SelectChoice {
    pub value: Option<String>,
    pub label: Option<String>,
    pub index: Option<i64>,
}

#[derive(Clone, Debug)]
pub struct SelectParams {
    pub target: TargetRequest,
    pub choice: SelectChoice,
}

#[derive(Clone, Debug)]
pub struct CheckboxParams {
    pub target: TargetRequest,
    pub checked: bool,
}

#[derive(Clone, Debug, Default)]
pub struct SubmitParams {
    /// A specific submit control; when present, submit delegates to click.
    pub button: Option<TargetRequest>,
    /// Form descriptor; absent means the first form on the page.
    pub form: Option<ElementDescriptor>,
}

#[derive(Clone, Debug)]
pub struct PressKeyParams {
    pub key: String,
    pub modifiers: KeyMod,
}

#[derive(Clone, Debug)]
pub struct ScrollParams {
    pub dx: f64,
    pub dy: f64,
}

/// Page state observed after an action settled. Urls are stripped to
/// scheme/host/path and titles truncated before leaving the engine.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PostSignals {
    pub url: Option<String>,
    pub title: Option<String>,
}

/// Outcome of one interaction.
#[derive(Clone, Debug)]
pub struct ActionReport {
    pub ok: bool,
    pub started_at: Instant,
    pub finished_at: Instant,
    pub latency_ms: u128,
    /// Ladder tiers attempted, in order.
    pub tiers_tried: Vec<&'static str>,
    pub post: PostSignals,
}

impl ActionReport {
    pub fn new(started_at: Instant) -> Self {
        Self {
            ok: false,
            started_at,
            finished_at: started_at,
            latency_ms: 0,
            tiers_tried: Vec::new(),
            post: PostSignals::default(),
        }
    }

    pub fn finish(mut self, finished_at: Instant) -> Self {
        self.finished_at = finished_at;
        self.latency_ms = finished_at
            .saturating_duration_since(self.started_at)
            .as_millis();
        self
    }
}

/// Select outcome: the option that actually got selected.
#[derive(Clone, Debug)]
pub struct SelectReport {
    pub report: ActionReport,
    pub selected_value: String,
    pub selected_label: String,
}

/// Checkbox outcome: final state plus whether any events were dispatched.
#[derive(Clone, Debug)]
pub struct ToggleReport {
    pub report: ActionReport,
    pub checked: bool,
    pub changed: bool,
}
