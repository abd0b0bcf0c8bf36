//! Batch downloading of selected tracks.
//!
//! Each track goes to `<output>/<artist>/<album>/`, named by yt-dlp after
//! the video title. A failing track is recorded and the batch moves on.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::Result;
use crate::fetcher::{FetchReport, FetchRequest, MediaFetcher};
use crate::models::Track;
use crate::style::{Painter, Tone};

/// Default base directory for downloads.
pub const DEFAULT_OUTPUT_DIR: &str = "downloads";

/// Result of a single track download.
#[derive(Debug)]
pub struct DownloadResult {
    /// Directory the track was written into.
    pub directory: PathBuf,
    /// What yt-dlp reported.
    pub report: FetchReport,
    /// Track title.
    pub title: String,
    /// Artist name.
    pub artist: String,
}

/// Result of a batch download.
#[derive(Debug, Default)]
pub struct BatchDownloadResult {
    /// Successfully downloaded tracks.
    pub successful: Vec<DownloadResult>,
    /// Failed track labels with error messages.
    pub failed: Vec<(String, String)>,
}

impl BatchDownloadResult {
    /// Total number of tracks attempted.
    pub fn total(&self) -> usize {
        self.successful.len() + self.failed.len()
    }

    /// Check if all tracks were downloaded successfully.
    pub fn all_successful(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Downloads tracks one after another through a [`MediaFetcher`].
#[derive(Debug)]
pub struct Downloader<F> {
    fetcher: F,
    output_dir: PathBuf,
    painter: Painter,
}

impl<F: MediaFetcher> Downloader<F> {
    /// Create a downloader writing under [`DEFAULT_OUTPUT_DIR`].
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            painter: Painter::plain(),
        }
    }

    /// Set the output directory for downloads.
    pub fn set_output_dir<P: AsRef<Path>>(&mut self, path: P) {
        self.output_dir = path.as_ref().to_path_buf();
    }

    /// Get the current output directory.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// The fetcher in use.
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Set how status lines are colored.
    pub fn set_painter(&mut self, painter: Painter) {
        self.painter = painter;
    }

    /// Directory a track belongs in.
    pub fn album_dir(&self, track: &Track) -> PathBuf {
        self.output_dir
            .join(sanitize_segment(track.primary_artist()))
            .join(sanitize_segment(track.album_name()))
    }

    /// Download a single track.
    pub async fn download_track(&self, track: &Track) -> Result<DownloadResult> {
        let directory = self.album_dir(track);
        let report = self
            .fetcher
            .fetch(&FetchRequest::new(track.watch_url(), &directory))
            .await?;

        Ok(DownloadResult {
            directory,
            report,
            title: track.title.clone(),
            artist: track.primary_artist().to_string(),
        })
    }

    /// Download tracks in order, printing a status line for each.
    ///
    /// Failures are collected instead of stopping the batch.
    pub async fn download_batch<W: Write>(
        &self,
        tracks: &[&Track],
        out: &mut W,
    ) -> Result<BatchDownloadResult> {
        let mut result = BatchDownloadResult::default();

        for track in tracks {
            let label = format!(
                "{}/{}: {}",
                track.primary_artist(),
                track.album_name(),
                track.title
            );

            // The fetch reports its own error if the directory is missing.
            let directory = self.album_dir(track);
            if let Err(e) = fs::create_dir_all(&directory) {
                warn!("Could not create {}: {}", directory.display(), e);
                writeln!(
                    out,
                    "{}",
                    self.painter.paint(
                        Tone::Failure,
                        format!("Error creating directory {}: {}", directory.display(), e)
                    )
                )?;
            }

            let status = if track.duration_secs > 0 {
                format!("{} ({})", label, track.duration_formatted())
            } else {
                label.clone()
            };
            writeln!(
                out,
                "{} {}",
                self.painter.paint(Tone::Success, "Downloading"),
                self.painter.paint(Tone::Title, status)
            )?;

            match self.download_track(track).await {
                Ok(download) => {
                    info!(
                        "Downloaded {} by {} into {}",
                        track.title,
                        track.artists_string(", "),
                        download.directory.display()
                    );
                    if let Some(path) = download.report.path() {
                        writeln!(
                            out,
                            "{} {}",
                            self.painter.paint(Tone::Success, "Saved"),
                            path.display()
                        )?;
                    }
                    result.successful.push(download);
                }
                Err(e) => {
                    warn!("Download of {} failed: {}", label, e);
                    writeln!(
                        out,
                        "{}",
                        self.painter
                            .paint(Tone::Failure, format!("Failed {}: {}", label, e))
                    )?;
                    result.failed.push((label, e.to_string()));
                }
            }
        }

        Ok(result)
    }
}

/// Sanitize a string for use as a single path segment.
pub fn sanitize_segment(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim().trim_end_matches('.').trim_end();

    match cleaned {
        "" | "." | ".." => "_".to_string(),
        other => other.to_string(),
    }
}
