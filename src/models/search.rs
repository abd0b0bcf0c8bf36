//! Search result pages.

use serde::{Deserialize, Serialize};

use super::track::Track;

/// One page of track results from the catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchPage {
    /// Tracks on this page, in catalog order.
    pub tracks: Vec<Track>,

    /// Token for the next page; `None` on the last page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continuation: Option<String>,
}

impl SearchPage {
    /// Whether the catalog has more pages after this one.
    pub fn has_more(&self) -> bool {
        self.continuation.is_some()
    }
}
