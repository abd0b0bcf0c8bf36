//! The interactive search, select and download flow.
//!
//! ```text
//! query -> limit -> numbered listing -> selection -> batch download
//! ```
//!
//! Input and output are generic so the whole flow runs against in-memory
//! buffers in tests.

use std::io::{self, BufRead, Write};

use tracing::{debug, warn};

use crate::api::TrackSource;
use crate::downloader::{BatchDownloadResult, Downloader};
use crate::error::Result;
use crate::fetcher::MediaFetcher;
use crate::models::Track;
use crate::selection::{parse_selection, Selection};
use crate::style::{Painter, Tone};

const QUERY_PROMPT: &str = "Enter an artist name or track: ";
const LIMIT_PROMPT: &str = "Maximum number of tracks to list: ";
const SELECTION_PROMPT: &str = "\nDownload [A]ll, [N]one, [1,2,3,...]: ";

/// How a session ended.
#[derive(Debug)]
pub enum SessionOutcome {
    /// The search listed nothing.
    NoResults,
    /// The user chose not to download anything.
    NothingSelected,
    /// A batch ran.
    Downloaded(BatchDownloadResult),
}

impl SessionOutcome {
    /// Whether any download in the batch failed.
    pub fn has_failures(&self) -> bool {
        matches!(self, SessionOutcome::Downloaded(result) if !result.all_successful())
    }
}

/// Parse the limit answer. `None` if it is not a non-negative integer.
pub fn parse_limit(input: &str) -> Option<usize> {
    input.trim().parse().ok()
}

/// Format one listing line: `[index] artist: album: title`.
pub fn listing_line(painter: Painter, index: usize, track: &Track) -> String {
    format!(
        "{} {}: {}: {}",
        painter.paint(Tone::Index, format!("[{}]", index)),
        painter.paint(Tone::Artist, track.primary_artist()),
        painter.paint(Tone::Album, track.album_name()),
        painter.paint(Tone::Title, &track.title)
    )
}

/// Pull pages from `source` until it runs dry or `limit` tracks are listed.
///
/// Each track is printed as it is numbered. An empty page or a page error
/// ends the listing quietly.
pub async fn aggregate<S, W>(
    source: &mut S,
    limit: usize,
    painter: Painter,
    out: &mut W,
) -> Result<Vec<Track>>
where
    S: TrackSource + ?Sized,
    W: Write,
{
    let mut tracks: Vec<Track> = Vec::new();

    while tracks.len() < limit {
        let page = match source.next_page().await {
            Ok(Some(page)) => page,
            Ok(None) => break,
            Err(e) => {
                warn!("Search stopped early: {}", e);
                break;
            }
        };
        debug!("Received page of {} tracks", page.len());
        if page.is_empty() {
            break;
        }

        for track in page.into_iter().take(limit - tracks.len()) {
            writeln!(out, "{}", listing_line(painter, tracks.len() + 1, &track))?;
            tracks.push(track);
        }
    }

    Ok(tracks)
}

/// One interactive run over an input and an output stream.
pub struct Session<R, W> {
    input: R,
    output: W,
    painter: Painter,
}

impl<R: BufRead, W: Write> Session<R, W> {
    /// Create a session.
    pub fn new(input: R, output: W, painter: Painter) -> Self {
        Self {
            input,
            output,
            painter,
        }
    }

    /// Give back the output stream.
    pub fn into_output(self) -> W {
        self.output
    }

    fn prompt(&mut self, text: &str) -> Result<String> {
        write!(self.output, "{}", self.painter.paint(Tone::Prompt, text))?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed").into());
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn notice(&mut self, tone: Tone, text: &str) -> Result<()> {
        writeln!(self.output, "{}", self.painter.paint(tone, text))?;
        Ok(())
    }

    /// Ask for the search query.
    pub fn read_query(&mut self) -> Result<String> {
        Ok(self.prompt(QUERY_PROMPT)?.trim().to_string())
    }

    /// Ask for the listing limit. Anything unparsable counts as zero.
    pub fn read_limit(&mut self) -> Result<usize> {
        let answer = self.prompt(LIMIT_PROMPT)?;
        match parse_limit(&answer) {
            Some(limit) => Ok(limit),
            None => {
                warn!("Rejected limit {:?}", answer);
                self.notice(
                    Tone::Failure,
                    &format!("'{}' is not a number, listing nothing", answer.trim()),
                )?;
                Ok(0)
            }
        }
    }

    /// Ask which of the listed tracks to download.
    pub fn read_selection(&mut self, tracks: &[Track]) -> Result<Selection> {
        let answer = self.prompt(SELECTION_PROMPT)?;
        let parsed = parse_selection(&answer, tracks.len());

        for rejected in &parsed.rejected {
            warn!("Ignoring selection token: {}", rejected);
            self.notice(Tone::Failure, &format!("Ignoring {}", rejected))?;
        }

        Ok(parsed.selection)
    }

    /// Run the whole flow.
    ///
    /// `search` starts a search for the query; it is not called when the
    /// query is blank.
    pub async fn run<S, Q, F>(
        &mut self,
        search: Q,
        downloader: &Downloader<F>,
    ) -> Result<SessionOutcome>
    where
        S: TrackSource,
        Q: FnOnce(&str) -> S,
        F: MediaFetcher,
    {
        let query = self.read_query()?;
        let limit = self.read_limit()?;

        let tracks = if query.is_empty() || limit == 0 {
            Vec::new()
        } else {
            let mut source = search(&query);
            aggregate(&mut source, limit, self.painter, &mut self.output).await?
        };

        if tracks.is_empty() {
            self.notice(Tone::Failure, "No tracks found.")?;
            return Ok(SessionOutcome::NoResults);
        }

        let selection = self.read_selection(&tracks)?;
        if selection.is_empty() {
            return Ok(SessionOutcome::NothingSelected);
        }
        debug!("Selected {} of {} tracks", selection.len(), tracks.len());

        let selected = selection.resolve(&tracks);
        let result = downloader.download_batch(&selected, &mut self.output).await?;

        self.notice(
            Tone::Success,
            &format!(
                "Done! {}/{} downloaded",
                result.successful.len(),
                result.total()
            ),
        )?;
        for (label, error) in &result.failed {
            self.notice(Tone::Failure, &format!("  {}: {}", label, error))?;
        }

        Ok(SessionOutcome::Downloaded(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{track, FakeFetcher, FakeSource, Page};
    use std::io::Cursor;

    async fn collect(source: &mut FakeSource, limit: usize) -> Vec<Track> {
        aggregate(source, limit, Painter::plain(), &mut io::sink())
            .await
            .unwrap()
    }

    #[test]
    fn test_parse_limit() {
        assert_eq!(parse_limit(" 25 "), Some(25));
        assert_eq!(parse_limit("0"), Some(0));
        assert_eq!(parse_limit("-1"), None);
        assert_eq!(parse_limit("ten"), None);
    }

    #[test]
    fn test_listing_line() {
        let line = listing_line(Painter::plain(), 3, &track("a", "Daft Punk", "Discovery"));
        assert_eq!(line, "[3] Daft Punk: Discovery: Title a");
    }

    #[tokio::test]
    async fn test_zero_limit_never_searches() {
        let mut source = FakeSource::uniform(2, 5);
        assert!(collect(&mut source, 0).await.is_empty());
        assert_eq!(source.requests, 0);
    }

    #[tokio::test]
    async fn test_limit_is_exact_track_ceiling() {
        for limit in [1, 4, 5, 7, 10] {
            let mut source = FakeSource::uniform(2, 5);
            let tracks = collect(&mut source, limit).await;
            assert_eq!(tracks.len(), limit);
        }

        let mut source = FakeSource::uniform(2, 5);
        let tracks = collect(&mut source, 7).await;
        assert_eq!(tracks[5].video_id, "p1t0");
        assert_eq!(source.requests, 2);
    }

    #[tokio::test]
    async fn test_limit_beyond_results_returns_everything() {
        let mut source = FakeSource::uniform(3, 2);
        let tracks = collect(&mut source, 100).await;
        assert_eq!(tracks.len(), 6);
        assert_eq!(source.requests, 4);
    }

    #[tokio::test]
    async fn test_page_error_ends_listing() {
        let mut source = FakeSource::new(vec![
            Page::Tracks(vec![track("a", "X", "Y")]),
            Page::Fail,
            Page::Tracks(vec![track("b", "X", "Y")]),
        ]);
        let tracks = collect(&mut source, 10).await;
        assert_eq!(tracks.len(), 1);
        assert_eq!(source.requests, 2);
    }

    #[tokio::test]
    async fn test_empty_page_ends_listing() {
        let mut source = FakeSource::new(vec![
            Page::Tracks(Vec::new()),
            Page::Tracks(vec![track("a", "X", "Y")]),
        ]);
        let tracks = collect(&mut source, 10).await;
        assert!(tracks.is_empty());
        assert_eq!(source.requests, 1);
    }

    #[tokio::test]
    async fn test_listing_numbers_from_one() {
        let mut source = FakeSource::uniform(2, 2);
        let mut out = Vec::new();
        aggregate(&mut source, 3, Painter::plain(), &mut out)
            .await
            .unwrap();

        let printed = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = printed.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("[1] Artist: Album: Title p0t0"));
        assert!(lines[2].starts_with("[3] Artist: Album: Title p1t0"));
    }

    fn session(input: &str) -> Session<Cursor<Vec<u8>>, Vec<u8>> {
        Session::new(
            Cursor::new(input.as_bytes().to_vec()),
            Vec::new(),
            Painter::plain(),
        )
    }

    fn downloader(dir: &std::path::Path, fetcher: FakeFetcher) -> Downloader<FakeFetcher> {
        let mut downloader = Downloader::new(fetcher);
        downloader.set_output_dir(dir);
        downloader
    }

    #[tokio::test]
    async fn test_select_first_printed_entry() {
        let tmp = tempfile::tempdir().unwrap();
        let downloader = downloader(tmp.path(), FakeFetcher::default());
        let mut session = session("Daft Punk\n1\n1\n");

        let mut searched = String::new();
        let outcome = session
            .run(
                |query| {
                    searched = query.to_string();
                    FakeSource::new(vec![Page::Tracks(vec![
                        track("first", "Daft Punk", "Discovery"),
                        track("second", "Daft Punk", "Homework"),
                    ])])
                },
                &downloader,
            )
            .await
            .unwrap();

        assert_eq!(searched, "Daft Punk");
        assert!(matches!(outcome, SessionOutcome::Downloaded(ref r) if r.total() == 1));
        assert!(!outcome.has_failures());
        assert_eq!(
            downloader.fetcher().urls(),
            vec!["https://www.youtube.com/watch?v=first".to_string()]
        );
        assert!(tmp.path().join("Daft Punk").join("Discovery").is_dir());

        let printed = String::from_utf8(session.into_output()).unwrap();
        assert!(printed.contains("[1] Daft Punk: Discovery: Title first"));
        assert!(printed.contains("Done! 1/1 downloaded"));
    }

    #[tokio::test]
    async fn test_select_all_in_order() {
        let tmp = tempfile::tempdir().unwrap();
        let downloader = downloader(tmp.path(), FakeFetcher::default());
        let mut session = session("q\n10\nA\n");

        session
            .run(|_| FakeSource::uniform(1, 3), &downloader)
            .await
            .unwrap();

        let urls = downloader.fetcher().urls();
        assert_eq!(urls.len(), 3);
        assert!(urls[0].ends_with("p0t0"));
        assert!(urls[2].ends_with("p0t2"));
    }

    #[tokio::test]
    async fn test_select_none_touches_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let downloader = downloader(tmp.path(), FakeFetcher::default());
        let mut session = session("q\n10\nn\n");

        let outcome = session
            .run(|_| FakeSource::uniform(1, 3), &downloader)
            .await
            .unwrap();

        assert!(matches!(outcome, SessionOutcome::NothingSelected));
        assert!(downloader.fetcher().urls().is_empty());
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_bad_limit_lists_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let downloader = downloader(tmp.path(), FakeFetcher::default());
        let mut session = session("q\nlots\n");

        let outcome = session
            .run(|_| FakeSource::uniform(1, 3), &downloader)
            .await
            .unwrap();

        assert!(matches!(outcome, SessionOutcome::NoResults));
        let printed = String::from_utf8(session.into_output()).unwrap();
        assert!(printed.contains("'lots' is not a number"));
    }

    #[tokio::test]
    async fn test_failed_download_does_not_stop_batch() {
        let tmp = tempfile::tempdir().unwrap();
        let downloader = downloader(tmp.path(), FakeFetcher::failing_on("p0t1"));
        let mut session = session("q\n3\n1,2,3\n");

        let outcome = session
            .run(|_| FakeSource::uniform(1, 3), &downloader)
            .await
            .unwrap();

        assert!(outcome.has_failures());
        assert_eq!(downloader.fetcher().urls().len(), 3);

        let printed = String::from_utf8(session.into_output()).unwrap();
        assert!(printed.contains("Done! 2/3 downloaded"));
        assert!(printed.contains("Artist/Album: Title p0t1"));
    }

    #[tokio::test]
    async fn test_closed_input_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let downloader = downloader(tmp.path(), FakeFetcher::default());
        let mut session = session("");

        let result = session
            .run(|_| FakeSource::uniform(1, 1), &downloader)
            .await;
        assert!(result.is_err());
    }
}
