//! Additive, capped candidate scoring.
//!
//! Structural and semantic signals (tag, stable attributes, text) dominate
//! because they survive re-renders; geometry is weighted low because
//! responsive layouts shift coordinates; dynamic attributes only ever add
//! score, they never eliminate a candidate.

use std::cmp::Ordering;

use crate::candidates::Candidate;
use crate::descriptor::ElementDescriptor;

/// Attributes that reflect transient UI state. Everything else is treated as
/// stable for both filtering and scoring.
const DYNAMIC_ATTRIBUTES: &[&str] = &[
    "class",
    "style",
    "tabindex",
    "value",
    "checked",
    "selected",
    "disabled",
    "readonly",
    "aria-expanded",
    "aria-selected",
    "aria-checked",
    "aria-pressed",
    "aria-hidden",
    "aria-current",
    "data-state",
    "data-active",
    "data-selected",
    "data-focus",
    "data-hover",
];

const STABLE_ATTRIBUTE_CAP: f64 = 60.0;
const WORD_OVERLAP_CAP: f64 = 10.0;
const CLASS_OVERLAP_CAP: f64 = 4.0;

pub fn is_dynamic_attribute(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    DYNAMIC_ATTRIBUTES.contains(&lower.as_str())
}

fn stable_weight(name: &str) -> f64 {
    let lower = name.to_ascii_lowercase();
    match lower.as_str() {
        "id" => 20.0,
        "name" | "type" | "role" => 10.0,
        _ if lower.starts_with("data-") => 15.0,
        _ if lower.starts_with("aria-") => 12.0,
        _ => 5.0,
    }
}

/// A candidate together with its score and the signals that produced it.
#[derive(Clone, Debug)]
pub struct ScoredCandidate {
    pub candidate: Candidate,
    pub score: f64,
    pub matched_by: Vec<&'static str>,
}

fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Whether exact text is the dominant signal for this candidate (click
/// targets get the stronger exact-text weight).
fn is_click_target(candidate: &Candidate) -> bool {
    if matches!(candidate.tag_name.as_str(), "button" | "a") {
        return true;
    }
    matches!(
        candidate.attributes.get("role").map(String::as_str),
        Some("button") | Some("link")
    )
}

pub fn score_candidate(descriptor: &ElementDescriptor, candidate: Candidate) -> ScoredCandidate {
    let mut score = 0.0;
    let mut matched_by = Vec::new();

    if candidate.tag_name.eq_ignore_ascii_case(&descriptor.tag) {
        score += 20.0;
        matched_by.push("tag");
    }

    let mut stable_total = 0.0;
    let mut dynamic_total = 0.0;
    for (name, wanted) in &descriptor.attributes {
        let Some(actual) = candidate.attributes.get(&name.to_ascii_lowercase()) else {
            continue;
        };
        if is_dynamic_attribute(name) {
            dynamic_total += dynamic_credit(name, wanted, actual);
        } else if actual == wanted {
            stable_total += stable_weight(name);
        } else if actual.contains(wanted.as_str()) || wanted.contains(actual.as_str()) {
            stable_total += 3.0;
        }
    }
    stable_total = stable_total.min(STABLE_ATTRIBUTE_CAP);
    if stable_total > 0.0 {
        matched_by.push("stable-attributes");
    }
    if dynamic_total > 0.0 {
        matched_by.push("dynamic-attributes");
    }
    score += stable_total + dynamic_total;

    if let Some(wanted_text) = &descriptor.text {
        let wanted = normalize_text(wanted_text);
        let actual = normalize_text(&candidate.text);
        if !wanted.is_empty() {
            if actual == wanted {
                score += if is_click_target(&candidate) { 50.0 } else { 30.0 };
                matched_by.push("text-exact");
            } else if actual.contains(&wanted) {
                score += 20.0;
                matched_by.push("text-contains");
            } else if !actual.is_empty() && wanted.contains(&actual) {
                score += 15.0;
                matched_by.push("text-reverse");
            } else {
                let overlap = word_overlap(&wanted, &actual);
                if overlap > 0 {
                    score += (overlap as f64 * 3.0).min(WORD_OVERLAP_CAP);
                    matched_by.push("text-words");
                }
            }
        }
    }

    if let Some(wanted_box) = &descriptor.bounding_box {
        let distance = wanted_box.corner_distance(&candidate.bounding_box);
        let bonus = match distance {
            d if d < 5.0 => 40.0,
            d if d < 20.0 => 30.0,
            d if d < 50.0 => 20.0,
            d if d < 100.0 => 10.0,
            d if d < 200.0 => 5.0,
            _ => 0.0,
        };
        if bonus > 0.0 {
            matched_by.push("position");
        }
        score += bonus;
    }

    if candidate.visible {
        score += 10.0;
    }
    if candidate.in_viewport {
        score += 5.0;
    }
    if candidate.in_modal {
        score += 20.0;
        matched_by.push("modal");
    }

    ScoredCandidate {
        candidate,
        score,
        matched_by,
    }
}

fn dynamic_credit(name: &str, wanted: &str, actual: &str) -> f64 {
    let lower = name.to_ascii_lowercase();
    match lower.as_str() {
        "class" => {
            let wanted_classes: Vec<&str> = wanted.split_whitespace().collect();
            let shared = actual
                .split_whitespace()
                .filter(|class| wanted_classes.contains(class))
                .count();
            (shared as f64).min(CLASS_OVERLAP_CAP)
        }
        "style" => 1.0,
        _ if lower.starts_with("aria-") => {
            if actual == wanted {
                3.0
            } else {
                0.0
            }
        }
        _ if lower.starts_with("data-") => {
            if actual == wanted {
                2.0
            } else {
                0.0
            }
        }
        _ => {
            if actual == wanted {
                2.0
            } else {
                0.0
            }
        }
    }
}

fn word_overlap(wanted: &str, actual: &str) -> usize {
    let actual_words: Vec<&str> = actual.split_whitespace().collect();
    wanted
        .split_whitespace()
        .filter(|word| actual_words.contains(word))
        .count()
}

pub fn sort_descending(scored: &mut [ScoredCandidate]) {
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
}

/// Sibling-index disambiguation: only near-ties (top two within 15 points)
/// are eligible, so an index hint can never override a clearly dominant
/// match. The matching candidate in the close cluster gets +50, then the
/// ordering is recomputed.
pub fn apply_sibling_disambiguation(scored: &mut [ScoredCandidate], sibling_index: i64) {
    if scored.len() < 2 {
        return;
    }
    let top = scored[0].score;
    if top - scored[1].score >= 15.0 {
        return;
    }
    let mut boosted = false;
    for entry in scored
        .iter_mut()
        .filter(|entry| top - entry.score < 15.0)
    {
        if entry.candidate.sibling_index == sibling_index {
            entry.score += 50.0;
            entry.matched_by.push("sibling-index");
            boosted = true;
        }
    }
    if boosted {
        sort_descending(scored);
    }
}
