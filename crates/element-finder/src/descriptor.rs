use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use viewdriver_core_types::Rect;

/// Caller-supplied fuzzy description of one element.
///
/// Tag is required; everything else is optional. With tag alone the search
/// degrades to a broadened candidate query rather than failing.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementDescriptor {
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<Rect>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sibling_index: Option<i64>,
}

impl ElementDescriptor {
    pub fn for_tag(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_bounding_box(mut self, rect: Rect) -> Self {
        self.bounding_box = Some(rect);
        self
    }

    pub fn with_sibling_index(mut self, index: i64) -> Self {
        self.sibling_index = Some(index);
        self
    }
}
