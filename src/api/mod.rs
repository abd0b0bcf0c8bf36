//! API client for the YouTube Music catalog.
//!
//! [`MusicApi`] issues search requests; [`TrackSearch`] walks the result
//! pages and is the production [`TrackSource`].

pub mod music;

pub use music::{MusicApi, TrackSearch, TrackSource};
