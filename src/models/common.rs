//! Common types shared across all models.

use serde::{Deserialize, Serialize};

/// Thumbnail image with URL and dimensions.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Thumbnail {
    /// URL to the image.
    pub url: String,

    /// Width in pixels.
    pub width: u32,

    /// Height in pixels.
    pub height: u32,
}

impl Thumbnail {
    /// Create a new thumbnail.
    pub fn new<S: Into<String>>(url: S, width: u32, height: u32) -> Self {
        Self {
            url: url.into(),
            width,
            height,
        }
    }
}

