//! JSON to model converters.
//!
//! The search endpoint answers with deeply nested renderer objects. This
//! module walks them as [`serde_json::Value`] and builds typed models.

use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{AlbumTrack, ArtistTrack, SearchPage, Thumbnail, Track};

/// Location of the section list on the first results page.
const FIRST_PAGE_SECTIONS: &str =
    "/contents/tabbedSearchResultsRenderer/tabs/0/tabRenderer/content/sectionListRenderer/contents";

/// Location of the shelf on a continuation page.
const CONTINUATION_SHELF: &str = "/continuationContents/musicShelfContinuation";

/// Separator run between the artist, album and duration groups.
const GROUP_SEPARATOR: &str = " • ";

/// Page types the catalog attaches to browse links.
const PAGE_TYPE_ARTIST: &str = "MUSIC_PAGE_TYPE_ARTIST";
const PAGE_TYPE_ALBUM: &str = "MUSIC_PAGE_TYPE_ALBUM";

/// Badge marking explicit content.
const EXPLICIT_BADGE: &str = "MUSIC_EXPLICIT_BADGE";

/// Get string from JSON, returning empty string if not found.
fn get_str(json: &Value, pointer: &str) -> String {
    json.pointer(pointer)
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string()
}

/// Get a non-empty string from JSON.
fn get_opt_str(json: &Value, pointer: &str) -> Option<String> {
    json.pointer(pointer)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

/// Parse a "M:SS" or "H:MM:SS" duration into seconds.
pub fn parse_duration(text: &str) -> Option<u32> {
    let parts: Vec<&str> = text.trim().split(':').collect();
    if !(2..=3).contains(&parts.len()) {
        return None;
    }

    let mut total: u32 = 0;
    for part in parts {
        if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        total = total.checked_mul(60)?.checked_add(part.parse().ok()?)?;
    }
    Some(total)
}

/// Extract the thumbnail list of a list item.
fn extract_thumbnails(item: &Value) -> Vec<Thumbnail> {
    item.pointer("/thumbnail/musicThumbnailRenderer/thumbnail/thumbnails")
        .and_then(|t| t.as_array())
        .map(|arr| {
            arr.iter()
                .map(|t| {
                    Thumbnail::new(
                        get_str(t, "/url"),
                        t.get("width").and_then(|w| w.as_u64()).unwrap_or(0) as u32,
                        t.get("height").and_then(|h| h.as_u64()).unwrap_or(0) as u32,
                    )
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Whether a list item carries the explicit badge.
fn is_explicit(item: &Value) -> bool {
    item.get("badges")
        .and_then(|b| b.as_array())
        .map(|badges| {
            badges.iter().any(|b| {
                b.pointer("/musicInlineBadgeRenderer/icon/iconType")
                    .and_then(|t| t.as_str())
                    == Some(EXPLICIT_BADGE)
            })
        })
        .unwrap_or(false)
}

/// Find the video ID, trying every place the catalog puts it.
fn extract_video_id(item: &Value) -> Option<String> {
    get_opt_str(item, "/playlistItemData/videoId")
        .or_else(|| {
            get_opt_str(
                item,
                "/overlay/musicItemThumbnailOverlayRenderer/content/musicPlayButtonRenderer/playNavigationEndpoint/watchEndpoint/videoId",
            )
        })
        .or_else(|| {
            get_opt_str(
                item,
                "/flexColumns/0/musicResponsiveListItemFlexColumnRenderer/text/runs/0/navigationEndpoint/watchEndpoint/videoId",
            )
        })
}

/// Text runs of the given flex column.
fn column_runs(item: &Value, column: usize) -> &[Value] {
    item.pointer(&format!(
        "/flexColumns/{}/musicResponsiveListItemFlexColumnRenderer/text/runs",
        column
    ))
    .and_then(|r| r.as_array())
    .map(|v| v.as_slice())
    .unwrap_or(&[])
}

/// Browse ID and page type of a run, if it links anywhere.
fn run_link(run: &Value) -> Option<(String, String)> {
    let endpoint = run.pointer("/navigationEndpoint/browseEndpoint")?;
    let browse_id = get_opt_str(endpoint, "/browseId")?;
    let page_type = get_str(
        endpoint,
        "/browseEndpointContextSupportedConfigs/browseEndpointContextMusicConfig/pageType",
    );
    Some((browse_id, page_type))
}

fn is_artist_link(browse_id: &str, page_type: &str) -> bool {
    page_type == PAGE_TYPE_ARTIST || (page_type.is_empty() && browse_id.starts_with("UC"))
}

fn is_album_link(browse_id: &str, page_type: &str) -> bool {
    page_type == PAGE_TYPE_ALBUM || (page_type.is_empty() && browse_id.starts_with("MPRE"))
}

/// Whether a run is only glue between artist names.
fn is_joiner(text: &str) -> bool {
    matches!(text.trim(), "" | "&" | "," | "and" | "x")
}

/// Parse a single `musicResponsiveListItemRenderer` into a track.
///
/// Returns `None` for entries without a playable video ID.
pub fn parse_track(item: &Value) -> Option<Track> {
    let video_id = extract_video_id(item)?;
    let title = column_runs(item, 0)
        .iter()
        .filter_map(|r| r.get("text").and_then(|t| t.as_str()))
        .collect::<String>();

    // Second column: "<artists> • <album> • <duration>", with the groups
    // split by separator runs. Unfiltered searches prefix a type label.
    let mut groups: Vec<Vec<&Value>> = vec![Vec::new()];
    for run in column_runs(item, 1) {
        if run.get("text").and_then(|t| t.as_str()) == Some(GROUP_SEPARATOR) {
            groups.push(Vec::new());
        } else if let Some(group) = groups.last_mut() {
            group.push(run);
        }
    }
    let leading_label = match groups[0].as_slice() {
        [only] => {
            run_link(only).is_none()
                && matches!(get_str(only, "/text").as_str(), "Song" | "Video")
        }
        _ => false,
    };
    if leading_label {
        groups.remove(0);
    }

    let mut artists = Vec::new();
    let mut album = None;
    let mut duration_secs = 0;

    for (index, group) in groups.iter().enumerate() {
        for run in group {
            let text = get_str(run, "/text");
            match run_link(run) {
                Some((id, page_type)) if is_album_link(&id, &page_type) => {
                    if album.is_none() {
                        album = Some(AlbumTrack::new(text, id));
                    }
                }
                Some((id, page_type)) if is_artist_link(&id, &page_type) => {
                    artists.push(ArtistTrack::new(text, id));
                }
                _ if index == 0 && !is_joiner(&text) => {
                    artists.push(ArtistTrack {
                        name: text.trim().to_string(),
                        id: None,
                    });
                }
                _ => {
                    if let Some(secs) = parse_duration(&text) {
                        duration_secs = secs;
                    }
                }
            }
        }
    }

    Some(Track {
        video_id,
        title,
        artists,
        album,
        duration_secs,
        explicit: is_explicit(item),
        thumbnails: extract_thumbnails(item),
    })
}

/// Parse a shelf (`musicShelfRenderer` or `musicShelfContinuation`).
fn parse_shelf(shelf: &Value) -> SearchPage {
    let items = shelf
        .get("contents")
        .and_then(|c| c.as_array())
        .map(|v| v.as_slice())
        .unwrap_or(&[]);

    let tracks: Vec<Track> = items
        .iter()
        .filter_map(|entry| entry.get("musicResponsiveListItemRenderer"))
        .filter_map(|item| {
            let track = parse_track(item);
            if track.is_none() {
                debug!("Skipping search entry without a video ID");
            }
            track
        })
        .collect();

    SearchPage {
        tracks,
        continuation: get_opt_str(shelf, "/continuations/0/nextContinuationData/continuation"),
    }
}

/// Parse the response to an initial search request.
///
/// A response with no shelf at all (the catalog's "no results" layout)
/// is an empty last page.
pub fn parse_search_page(json: &Value) -> Result<SearchPage> {
    let sections = json
        .pointer(FIRST_PAGE_SECTIONS)
        .and_then(|s| s.as_array())
        .ok_or_else(|| Error::UnexpectedResponse("missing search sections".to_string()))?;

    Ok(sections
        .iter()
        .find_map(|section| section.get("musicShelfRenderer"))
        .map(parse_shelf)
        .unwrap_or_default())
}

/// Parse the response to a continuation request.
///
/// The catalog omits `continuationContents` once the results run out.
pub fn parse_continuation_page(json: &Value) -> SearchPage {
    json.pointer(CONTINUATION_SHELF)
        .map(parse_shelf)
        .unwrap_or_default()
}
