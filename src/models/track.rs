//! Track-related models.
//!
//! This module contains the track record built from a search result entry
//! and its nested artist/album references.

use serde::{Deserialize, Serialize};

use super::common::Thumbnail;

/// Watch URL prefix handed to yt-dlp.
const WATCH_URL_PREFIX: &str = "https://www.youtube.com/watch?v=";

/// Shown (and used as a directory name) when a track has no artist.
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// Shown (and used as a directory name) when a track has no album.
pub const UNKNOWN_ALBUM: &str = "Unknown Album";

/// Artist when nested inside a track context.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ArtistTrack {
    /// Artist name.
    pub name: String,

    /// Browse ID of the artist channel, if the entry links to one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl ArtistTrack {
    /// Create a new artist with name and browse ID.
    pub fn new<S1: Into<String>, S2: Into<String>>(name: S1, id: S2) -> Self {
        Self {
            name: name.into(),
            id: Some(id.into()),
        }
    }
}

/// Album when nested inside a track context.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AlbumTrack {
    /// Album name.
    pub name: String,

    /// Browse ID of the album page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl AlbumTrack {
    /// Create a new album with name and browse ID.
    pub fn new<S1: Into<String>, S2: Into<String>>(name: S1, id: S2) -> Self {
        Self {
            name: name.into(),
            id: Some(id.into()),
        }
    }
}

/// A track as returned by the catalog search.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Track {
    /// Video ID of the playable item.
    pub video_id: String,

    /// Track title.
    pub title: String,

    /// Artists in the order the catalog lists them.
    #[serde(default)]
    pub artists: Vec<ArtistTrack>,

    /// Album containing this track, when the catalog links one.
    #[serde(default)]
    pub album: Option<AlbumTrack>,

    /// Duration in seconds.
    #[serde(default)]
    pub duration_secs: u32,

    /// Whether the track carries the explicit badge.
    #[serde(default)]
    pub explicit: bool,

    /// Thumbnails in the order the catalog lists them.
    #[serde(default)]
    pub thumbnails: Vec<Thumbnail>,
}

impl Track {
    /// Get the primary artist name.
    pub fn primary_artist(&self) -> &str {
        self.artists
            .first()
            .map(|a| a.name.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or(UNKNOWN_ARTIST)
    }

    /// Get the album name.
    pub fn album_name(&self) -> &str {
        self.album
            .as_ref()
            .map(|a| a.name.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or(UNKNOWN_ALBUM)
    }

    /// Get all artist names joined by a separator.
    pub fn artists_string(&self, separator: &str) -> String {
        self.artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(separator)
    }

    /// Get duration formatted as M:SS (or H:MM:SS for long tracks).
    pub fn duration_formatted(&self) -> String {
        let hours = self.duration_secs / 3600;
        let minutes = (self.duration_secs % 3600) / 60;
        let seconds = self.duration_secs % 60;
        if hours > 0 {
            format!("{}:{:02}:{:02}", hours, minutes, seconds)
        } else {
            format!("{}:{:02}", minutes, seconds)
        }
    }

    /// URL yt-dlp is pointed at.
    pub fn watch_url(&self) -> String {
        format!("{}{}", WATCH_URL_PREFIX, self.video_id)
    }
}
