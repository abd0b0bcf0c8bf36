//! # ytm-dl
//!
//! Search YouTube Music for tracks and download the ones you pick as audio
//! files, sorted into `<output>/<artist>/<album>/` directories.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::io;
//! use ytm_dl::{Downloader, Installer, MusicApi, Painter, Session, YtDlp};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ytdlp = YtDlp::new(Installer::new().resolve().await?);
//!     let downloader = Downloader::new(ytdlp);
//!     let api = MusicApi::new()?;
//!
//!     let stdin = io::stdin();
//!     let mut session = Session::new(stdin.lock(), io::stdout(), Painter::from_env());
//!     session.run(|query| api.search_tracks(query), &downloader).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Pieces
//!
//! - [`MusicApi`] / [`TrackSearch`] - paginated song search
//! - [`selection`] - parsing "all", "none" or `1,3,5`
//! - [`Downloader`] - per-track directories and yt-dlp invocations
//! - [`Installer`] - finds yt-dlp, downloading it on first run

pub mod api;
pub mod converters;
pub mod downloader;
pub mod error;
pub mod fetcher;
pub mod installer;
pub mod models;
pub mod selection;
pub mod session;
pub mod style;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use api::{MusicApi, TrackSearch, TrackSource};
pub use downloader::{BatchDownloadResult, DownloadResult, Downloader};
pub use error::{Error, Result};
pub use fetcher::{FetchReport, FetchRequest, MediaFetcher, YtDlp};
pub use installer::Installer;
pub use models::{AlbumTrack, ArtistTrack, SearchPage, Thumbnail, Track};
pub use session::{Session, SessionOutcome};
pub use style::{Painter, Tone};
