//! Data models for catalog search results.
//!
//! Tracks returned by the search endpoint, together with their nested
//! artist and album references.

pub mod common;
pub mod search;
pub mod track;

// Re-exports for convenience
pub use common::Thumbnail;
pub use search::SearchPage;
pub use track::{AlbumTrack, ArtistTrack, Track};
