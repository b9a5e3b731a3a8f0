//! Resolution: query, score, disambiguate, pick one.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::json;
use tracing::{debug, instrument, warn};
use viewdriver_core_types::Rect;

use cdp_session::{evaluate_typed, PageSession, ScriptCall};

use crate::candidates::{Candidate, FIND_CANDIDATES, FIND_CANDIDATES_NAME};
use crate::descriptor::ElementDescriptor;
use crate::errors::FinderError;
use crate::scoring::{
    apply_sibling_disambiguation, is_dynamic_attribute, score_candidate, sort_descending,
};

/// Index into the in-page target registry populated by the candidate query.
///
/// Handles go stale whenever the page re-renders or a newer resolution
/// overwrites the registry; interactions re-read geometry right before
/// dispatching input to shrink that window.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct NodeHandle(pub u32);

/// Where to aim: screen-space center plus the page-side node reference.
#[derive(Clone, Debug)]
pub struct ResolvedTarget {
    pub center_x: f64,
    pub center_y: f64,
    pub handle: NodeHandle,
    pub bounding_box: Rect,
}

/// Outcome of one resolution call, including ambiguity diagnostics.
#[derive(Clone, Debug)]
pub struct Resolution {
    pub target: ResolvedTarget,
    pub candidate_count: usize,
    /// Top two scores within 10 points: the caller should treat the match
    /// with suspicion but the call itself does not fail.
    pub ambiguous: bool,
    pub score: f64,
    pub matched_by: Vec<&'static str>,
}

pub struct ElementFinder {
    session: Arc<dyn PageSession>,
}

impl ElementFinder {
    pub fn new(session: Arc<dyn PageSession>) -> Self {
        Self { session }
    }

    #[instrument(skip_all, fields(tag = %descriptor.tag))]
    pub async fn resolve(&self, descriptor: &ElementDescriptor) -> Result<Resolution, FinderError> {
        let stable_attributes: BTreeMap<&str, &str> = descriptor
            .attributes
            .iter()
            .filter(|(name, _)| !is_dynamic_attribute(name))
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .collect();

        let call = ScriptCall::new(FIND_CANDIDATES_NAME, FIND_CANDIDATES)
            .arg(json!(descriptor.tag))
            .arg(json!(descriptor.text))
            .arg(json!(stable_attributes));
        let candidates: Vec<Candidate> = evaluate_typed(self.session.as_ref(), call).await?;

        if candidates.is_empty() {
            return Err(FinderError::NoCandidates);
        }
        let candidate_count = candidates.len();
        debug!(candidate_count, "scoring candidates");

        let mut scored: Vec<_> = candidates
            .into_iter()
            .map(|candidate| score_candidate(descriptor, candidate))
            .collect();
        sort_descending(&mut scored);

        if let Some(sibling_index) = descriptor.sibling_index {
            apply_sibling_disambiguation(&mut scored, sibling_index);
        }

        let ambiguous = scored.len() >= 2 && scored[0].score - scored[1].score < 10.0;
        if ambiguous {
            warn!(
                top = scored[0].score,
                runner_up = scored[1].score,
                candidate_count,
                "ambiguous match; top two scores within 10 points"
            );
        }

        let best = match scored.into_iter().next() {
            Some(best) if best.score > 0.0 => best,
            _ => return Err(FinderError::NoScoredMatch),
        };

        let (center_x, center_y) = best.candidate.bounding_box.center();
        Ok(Resolution {
            target: ResolvedTarget {
                center_x,
                center_y,
                handle: NodeHandle(best.candidate.handle),
                bounding_box: best.candidate.bounding_box,
            },
            candidate_count,
            ambiguous,
            score: best.score,
            matched_by: best.matched_by,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdp_session::mock::MockSession;
    use serde_json::json;

    fn candidate_json(text: &str, handle: u32, x: f64) -> serde_json::Value {
        json!({
            "tagName": "button",
            "text": text,
            "attributes": {"type": "submit"},
            "boundingBox": {"x": x, "y": 50.0, "width": 80.0, "height": 30.0},
            "visible": true,
            "inViewport": true,
            "inModal": false,
            "siblingIndex": 0,
            "handle": handle
        })
    }

    #[tokio::test]
    async fn resolves_the_exact_text_button() {
        let session = Arc::new(MockSession::new());
        session.push_eval(
            FIND_CANDIDATES_NAME,
            json!([
                candidate_json("Submit your application", 0, 10.0),
                candidate_json("Submit", 1, 200.0),
            ]),
        );

        let finder = ElementFinder::new(session);
        let descriptor = ElementDescriptor::for_tag("button")
            .with_text("Submit")
            .with_attribute("type", "submit");
        let resolution = finder.resolve(&descriptor).await.unwrap();

        assert_eq!(resolution.target.handle, NodeHandle(1));
        assert_eq!(resolution.candidate_count, 2);
        assert_eq!(resolution.target.center_x, 240.0);
        assert!(resolution.matched_by.contains(&"text-exact"));
    }

    #[tokio::test]
    async fn empty_candidate_list_is_no_candidates() {
        let session = Arc::new(MockSession::new());
        session.push_eval(FIND_CANDIDATES_NAME, json!([]));

        let finder = ElementFinder::new(session);
        let err = finder
            .resolve(&ElementDescriptor::for_tag("canvas"))
            .await
            .unwrap_err();
        assert!(matches!(err, FinderError::NoCandidates));
    }

    #[tokio::test]
    async fn dynamic_only_attributes_are_not_sent_as_filters() {
        let session = Arc::new(MockSession::new());
        session.push_eval(FIND_CANDIDATES_NAME, json!([candidate_json("Ok", 0, 0.0)]));

        let finder = ElementFinder::new(session.clone());
        let descriptor = ElementDescriptor::for_tag("button")
            .with_attribute("class", "btn active")
            .with_attribute("aria-expanded", "true");
        finder.resolve(&descriptor).await.unwrap();

        let log = session.eval_log.lock().unwrap();
        let rendered = &log[0].1;
        // The third script argument (stable filter set) must be empty.
        assert!(rendered.ends_with("(\"button\",null,{})"));
    }
}
