//! The outward operation surface.
//!
//! Every method returns an outcome struct carrying `success`/payload plus a
//! typed [`DriverError`]; raw protocol payloads never reach callers. The
//! driver holds no mutable state: concurrent calls against the same page
//! race on the page itself and must be serialized by the caller.

use std::sync::Arc;

use serde::Serialize;
use tracing::instrument;

use element_finder::{ElementDescriptor, ElementFinder, Resolution};
use interaction_engine::{
    ActionReport, CheckboxParams, ClickParams, ExecCtx, InteractionEngine, PressKeyParams,
    ScrollParams, SelectParams, SubmitParams, TypeParams,
};
use perceiver_ax::AxSnapshotBuilder;
use viewdriver_core_types::DriverError;

use crate::config::DriverConfig;
use crate::context::HandlerContext;

/// Resolved-target details handed back to the caller; the handle can be fed
/// into later interactions as the fastest acquisition tier.
#[derive(Clone, Debug, Serialize)]
pub struct TargetInfo {
    pub center_x: f64,
    pub center_y: f64,
    pub handle: u32,
    pub score: f64,
    pub matched_by: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ResolveOutcome {
    pub found: bool,
    pub target: Option<TargetInfo>,
    pub candidate_count: usize,
    /// Top two scores within 10 points; diagnostic, not a failure.
    pub ambiguous: bool,
    pub error: Option<DriverError>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ActionOutcome {
    pub success: bool,
    pub tiers_tried: Vec<String>,
    pub url: Option<String>,
    pub title: Option<String>,
    pub error: Option<DriverError>,
}

impl ActionOutcome {
    fn from_report(report: ActionReport) -> Self {
        Self {
            success: report.ok,
            tiers_tried: report
                .tiers_tried
                .iter()
                .map(|tier| tier.to_string())
                .collect(),
            url: report.post.url,
            title: report.post.title,
            error: None,
        }
    }

    fn from_error(error: DriverError) -> Self {
        Self {
            success: false,
            tiers_tried: Vec::new(),
            url: None,
            title: None,
            error: Some(error),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct SelectOutcome {
    pub success: bool,
    pub selected_value: Option<String>,
    pub selected_label: Option<String>,
    pub error: Option<DriverError>,
}

#[derive(Clone, Debug, Serialize)]
pub struct CheckboxOutcome {
    pub success: bool,
    pub checked: Option<bool>,
    pub changed: Option<bool>,
    pub error: Option<DriverError>,
}

#[derive(Clone, Debug, Serialize)]
pub struct SnapshotOutcome {
    pub tree: Option<String>,
    pub error: Option<DriverError>,
}

pub struct Driver {
    finder: Arc<ElementFinder>,
    engine: InteractionEngine,
    snapshots: AxSnapshotBuilder,
}

impl Driver {
    pub fn new(ctx: HandlerContext) -> Self {
        Self::with_config(ctx, DriverConfig::default())
    }

    pub fn with_config(ctx: HandlerContext, config: DriverConfig) -> Self {
        let finder = Arc::new(ElementFinder::new(ctx.session.clone()));
        let engine = InteractionEngine::with_policy(
            ctx.session.clone(),
            finder.clone(),
            config.interact_policy(),
        );
        let snapshots = AxSnapshotBuilder::new(ctx.session.clone());
        Self {
            finder,
            engine,
            snapshots,
        }
    }

    #[instrument(skip_all, fields(tag = %descriptor.tag))]
    pub async fn resolve_element(&self, descriptor: &ElementDescriptor) -> ResolveOutcome {
        match self.finder.resolve(descriptor).await {
            Ok(resolution) => resolve_outcome(resolution),
            Err(err) => ResolveOutcome {
                found: false,
                target: None,
                candidate_count: 0,
                ambiguous: false,
                error: Some(err.into()),
            },
        }
    }

    pub async fn click(&self, params: ClickParams) -> ActionOutcome {
        let ctx = ExecCtx::new();
        match self.engine.click(&ctx, params).await {
            Ok(report) => ActionOutcome::from_report(report),
            Err(err) => ActionOutcome::from_error(err.into()),
        }
    }

    pub async fn type_text(&self, params: TypeParams) -> ActionOutcome {
        let ctx = ExecCtx::new();
        match self.engine.type_text(&ctx, params).await {
            Ok(report) => ActionOutcome::from_report(report),
            Err(err) => ActionOutcome::from_error(err.into()),
        }
    }

    pub async fn select_option(&self, params: SelectParams) -> SelectOutcome {
        let ctx = ExecCtx::new();
        match self.engine.select_option(&ctx, params).await {
            Ok(outcome) => SelectOutcome {
                success: true,
                selected_value: Some(outcome.selected_value),
                selected_label: Some(outcome.selected_label),
                error: None,
            },
            Err(err) => SelectOutcome {
                success: false,
                selected_value: None,
                selected_label: None,
                error: Some(err.into()),
            },
        }
    }

    pub async fn toggle_checkbox(&self, params: CheckboxParams) -> CheckboxOutcome {
        let ctx = ExecCtx::new();
        match self.engine.toggle_checkbox(&ctx, params).await {
            Ok(outcome) => CheckboxOutcome {
                success: true,
                checked: Some(outcome.checked),
                changed: Some(outcome.changed),
                error: None,
            },
            Err(err) => CheckboxOutcome {
                success: false,
                checked: None,
                changed: None,
                error: Some(err.into()),
            },
        }
    }

    pub async fn submit(&self, params: SubmitParams) -> ActionOutcome {
        let ctx = ExecCtx::new();
        match self.engine.submit(&ctx, params).await {
            Ok(report) => ActionOutcome::from_report(report),
            Err(err) => ActionOutcome::from_error(err.into()),
        }
    }

    pub async fn press_key(&self, params: PressKeyParams) -> ActionOutcome {
        let ctx = ExecCtx::new();
        match self.engine.press_key(&ctx, params).await {
            Ok(report) => ActionOutcome::from_report(report),
            Err(err) => ActionOutcome::from_error(err.into()),
        }
    }

    pub async fn scroll(&self, params: ScrollParams) -> ActionOutcome {
        let ctx = ExecCtx::new();
        match self.engine.scroll(&ctx, params).await {
            Ok(report) => ActionOutcome::from_report(report),
            Err(err) => ActionOutcome::from_error(err.into()),
        }
    }

    pub async fn ax_snapshot(&self) -> SnapshotOutcome {
        match self.snapshots.extract().await {
            Ok(tree) => SnapshotOutcome {
                tree: Some(tree),
                error: None,
            },
            Err(err) => SnapshotOutcome {
                tree: None,
                error: Some(err.into()),
            },
        }
    }
}

fn resolve_outcome(resolution: Resolution) -> ResolveOutcome {
    ResolveOutcome {
        found: true,
        target: Some(TargetInfo {
            center_x: resolution.target.center_x,
            center_y: resolution.target.center_y,
            handle: resolution.target.handle.0,
            score: resolution.score,
            matched_by: resolution
                .matched_by
                .iter()
                .map(|signal| signal.to_string())
                .collect(),
        }),
        candidate_count: resolution.candidate_count,
        ambiguous: resolution.ambiguous,
        error: None,
    }
}
