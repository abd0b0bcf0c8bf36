//! Stand-ins for the catalog and yt-dlp used across unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::TrackSource;
use crate::error::{Error, Result};
use crate::fetcher::{FetchReport, FetchRequest, MediaFetcher};
use crate::models::{AlbumTrack, ArtistTrack, Track};

/// A track with one artist and an album.
pub fn track(id: &str, artist: &str, album: &str) -> Track {
    Track {
        video_id: id.to_string(),
        title: format!("Title {}", id),
        artists: vec![ArtistTrack::new(artist, "UC")],
        album: Some(AlbumTrack::new(album, "MPRE")),
        ..Default::default()
    }
}

/// One scripted page: tracks, or an error.
pub enum Page {
    Tracks(Vec<Track>),
    Fail,
}

/// A track source replaying scripted pages.
#[derive(Default)]
pub struct FakeSource {
    pages: VecDeque<Page>,
    /// How many pages were requested.
    pub requests: usize,
}

impl FakeSource {
    pub fn new(pages: Vec<Page>) -> Self {
        Self {
            pages: pages.into(),
            requests: 0,
        }
    }

    /// `pages` pages of `per_page` tracks each, with IDs `p<page>t<n>`.
    pub fn uniform(pages: usize, per_page: usize) -> Self {
        Self::new(
            (0..pages)
                .map(|p| {
                    Page::Tracks(
                        (0..per_page)
                            .map(|n| track(&format!("p{}t{}", p, n), "Artist", "Album"))
                            .collect(),
                    )
                })
                .collect(),
        )
    }
}

#[async_trait]
impl TrackSource for FakeSource {
    async fn next_page(&mut self) -> Result<Option<Vec<Track>>> {
        self.requests += 1;
        match self.pages.pop_front() {
            None => Ok(None),
            Some(Page::Tracks(tracks)) => Ok(Some(tracks)),
            Some(Page::Fail) => Err(Error::ApiError("scripted failure".to_string())),
        }
    }
}

/// Records requests and fails the ones whose URL ends with a given ID.
#[derive(Default)]
pub struct FakeFetcher {
    pub requests: Mutex<Vec<FetchRequest>>,
    pub fail_on: Option<String>,
    /// File name put into successful reports.
    pub saved_as: Option<String>,
}

impl FakeFetcher {
    pub fn failing_on(id: &str) -> Self {
        Self {
            fail_on: Some(id.to_string()),
            ..Default::default()
        }
    }

    pub fn saving_as(path: &str) -> Self {
        Self {
            saved_as: Some(path.to_string()),
            ..Default::default()
        }
    }

    /// URLs requested so far.
    pub fn urls(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.url.clone())
            .collect()
    }
}

#[async_trait]
impl MediaFetcher for FakeFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchReport> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.fail_on {
            Some(id) if request.url.ends_with(id.as_str()) => Err(Error::FetchFailed {
                url: request.url.clone(),
                status: "exit status: 1".to_string(),
                stderr: "ERROR: Video unavailable".to_string(),
            }),
            _ => Ok(FetchReport {
                filename: self.saved_as.clone(),
                ..Default::default()
            }),
        }
    }
}
