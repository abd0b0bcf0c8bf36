//! Audio acquisition through the yt-dlp binary.
//!
//! [`YtDlp`] runs one yt-dlp process per track and reads back the JSON
//! info it prints for the item. [`MediaFetcher`] is the seam the batch
//! downloader uses, so tests can stand in for the real binary.

use std::path::{Path, PathBuf, MAIN_SEPARATOR};
use std::process::Stdio;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// File name part of the output template, filled in by yt-dlp.
const FILE_TEMPLATE: &str = "%(title)s.%(ext)s";

/// How many stderr lines to keep in a failure message.
const STDERR_TAIL_LINES: usize = 5;

/// One track to fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    /// Watch URL of the track.
    pub url: String,
    /// Directory the audio file goes into.
    pub directory: PathBuf,
}

impl FetchRequest {
    /// Create a request for a URL and target directory.
    pub fn new<S: Into<String>, P: AsRef<Path>>(url: S, directory: P) -> Self {
        Self {
            url: url.into(),
            directory: directory.as_ref().to_path_buf(),
        }
    }

    /// yt-dlp output template: `<directory>/%(title)s.%(ext)s`.
    ///
    /// `%` in the directory is doubled so yt-dlp keeps it literal.
    pub fn output_template(&self) -> String {
        let directory = self.directory.to_string_lossy().replace('%', "%%");
        format!("{}{}{}", directory, MAIN_SEPARATOR, FILE_TEMPLATE)
    }
}

/// A download reported by yt-dlp.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct RequestedDownload {
    /// Final path of the file.
    #[serde(default)]
    pub filepath: Option<String>,
}

/// Per-item result info printed by yt-dlp.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct FetchReport {
    /// Video ID.
    #[serde(default)]
    pub id: String,
    /// Title as yt-dlp saw it.
    #[serde(default)]
    pub title: String,
    /// Extension of the downloaded media.
    #[serde(default)]
    pub ext: String,
    /// Expected output file name.
    #[serde(default, rename = "_filename")]
    pub filename: Option<String>,
    /// Downloads performed for this item.
    #[serde(default)]
    pub requested_downloads: Vec<RequestedDownload>,
}

impl FetchReport {
    /// Best known location of the written file.
    pub fn path(&self) -> Option<PathBuf> {
        self.requested_downloads
            .iter()
            .find_map(|d| d.filepath.as_deref())
            .or(self.filename.as_deref())
            .map(PathBuf::from)
    }

    /// Parse the last JSON line of yt-dlp's stdout.
    pub fn from_stdout(stdout: &str) -> Result<Self> {
        let line = stdout
            .lines()
            .rev()
            .map(str::trim)
            .find(|l| l.starts_with('{'))
            .ok_or_else(|| Error::UnexpectedResponse("yt-dlp printed no JSON".to_string()))?;
        Ok(serde_json::from_str(line)?)
    }
}

/// Something that can fetch a track's audio to disk.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Fetch one track.
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchReport>;
}

/// yt-dlp invoked as a subprocess.
#[derive(Debug, Clone)]
pub struct YtDlp {
    binary: PathBuf,
}

impl YtDlp {
    /// Use the binary at the given path.
    pub fn new<P: Into<PathBuf>>(binary: P) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Path of the binary in use.
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Command-line arguments for a request.
    pub fn args(request: &FetchRequest) -> Vec<String> {
        vec![
            "--dump-json".to_string(),
            "--no-simulate".to_string(),
            "--no-progress".to_string(),
            "--format-sort".to_string(),
            "res,ext:m4a".to_string(),
            "--extract-audio".to_string(),
            "--no-playlist".to_string(),
            "--no-overwrites".to_string(),
            "--continue".to_string(),
            "--output".to_string(),
            request.output_template(),
            request.url.clone(),
        ]
    }
}

#[async_trait]
impl MediaFetcher for YtDlp {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchReport> {
        let args = Self::args(request);
        debug!("Running {} {:?}", self.binary.display(), args);

        let output = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let lines: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
            let tail = lines[lines.len().saturating_sub(STDERR_TAIL_LINES)..].join("\n");
            return Err(Error::FetchFailed {
                url: request.url.clone(),
                status: output.status.to_string(),
                stderr: tail,
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        match FetchReport::from_stdout(&stdout) {
            Ok(report) => Ok(report),
            Err(e) => {
                warn!("Could not read yt-dlp report for {}: {}", request.url, e);
                Ok(FetchReport::default())
            }
        }
    }
}
