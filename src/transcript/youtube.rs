//! YouTube caption fetching
//!
//! The watch page carries the innertube API key; the player endpoint lists
//! the caption tracks; each track's `baseUrl` serves timed-text XML.

use crate::transcript::TranscriptSnippet;
use crate::types::{AppError, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use serde::Deserialize;
use serde_json::json;
use url::Url;

pub const YOUTUBE_BASE: &str = "https://www.youtube.com";

const INNERTUBE_CLIENT_NAME: &str = "ANDROID";
const INNERTUBE_CLIENT_VERSION: &str = "20.10.38";

/// Pull the video id out of a YouTube URL, or accept a bare 11-character id.
pub fn extract_video_id(input: &str) -> Option<String> {
    let input = input.trim();

    let Ok(url) = Url::parse(input) else {
        return is_bare_id(input).then(|| input.to_string());
    };

    let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());

    match url.host_str() {
        Some("www.youtube.com") | Some("youtube.com") => {
            if let Some(id) = url.path().strip_prefix("/embed/") {
                return id.split('/').next().and_then(non_empty);
            }
            url.query_pairs()
                .find(|(k, _)| k == "v")
                .and_then(|(_, v)| non_empty(v.as_ref()))
        }
        Some("youtu.be") => non_empty(url.path().trim_start_matches('/')),
        _ => url
            .path()
            .strip_prefix("/embed/")
            .and_then(|rest| rest.split('/').next())
            .and_then(non_empty),
    }
}

fn is_bare_id(s: &str) -> bool {
    s.len() == 11
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

// ============= Player Response =============

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerResponse {
    playability_status: Option<PlayabilityStatus>,
    captions: Option<Captions>,
}

#[derive(Debug, Deserialize)]
struct PlayabilityStatus {
    status: Option<String>,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Captions {
    player_captions_tracklist_renderer: Option<TrackList>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrackList {
    #[serde(default)]
    caption_tracks: Vec<RawTrack>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTrack {
    base_url: String,
    language_code: String,
    kind: Option<String>,
}

/// One available caption track.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionTrack {
    pub base_url: String,
    pub language_code: String,
    pub is_generated: bool,
}

impl From<RawTrack> for CaptionTrack {
    fn from(raw: RawTrack) -> Self {
        Self {
            base_url: raw.base_url.replace("&fmt=srv3", ""),
            language_code: raw.language_code,
            is_generated: raw.kind.as_deref() == Some("asr"),
        }
    }
}

/// Pick a track: languages in preference order, manual captions before
/// auto-generated ones within a language.
pub fn select_track<'a>(tracks: &'a [CaptionTrack], languages: &[String]) -> Option<&'a CaptionTrack> {
    languages.iter().find_map(|lang| {
        tracks
            .iter()
            .find(|t| !t.is_generated && &t.language_code == lang)
            .or_else(|| tracks.iter().find(|t| t.is_generated && &t.language_code == lang))
    })
}

fn describe_tracks(tracks: &[CaptionTrack]) -> String {
    tracks
        .iter()
        .map(|t| {
            if t.is_generated {
                format!("{} (auto-generated)", t.language_code)
            } else {
                t.language_code.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

// ============= Timed Text =============

/// Parse timed-text XML (`<transcript><text start dur>..</text></transcript>`).
pub fn parse_timed_text(xml: &str) -> Result<Vec<TranscriptSnippet>> {
    let markup = Regex::new(r"<[^>]*>")
        .map_err(|e| AppError::Internal(format!("Invalid markup pattern: {}", e)))?;

    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut snippets = Vec::new();
    let mut buf = Vec::new();
    let mut current: Option<(f64, f64, String)> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"text" => {
                let mut start = 0.0;
                let mut duration = 0.0;
                for attr in e.attributes().flatten() {
                    let value = attr.unescape_value().unwrap_or_default();
                    match attr.key.as_ref() {
                        b"start" => start = value.parse().unwrap_or(0.0),
                        b"dur" => duration = value.parse().unwrap_or(0.0),
                        _ => {}
                    }
                }
                current = Some((start, duration, String::new()));
            }
            Ok(Event::Text(e)) => {
                if let Some((_, _, text)) = current.as_mut() {
                    let raw = match e.unescape() {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => String::from_utf8_lossy(&e).into_owned(),
                    };
                    text.push_str(&raw);
                }
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"text" => {
                if let Some((start, duration, raw)) = current.take() {
                    let decoded = html_escape::decode_html_entities(&raw);
                    let text = markup.replace_all(&decoded, "").trim().to_string();
                    if !text.is_empty() {
                        snippets.push(TranscriptSnippet {
                            text,
                            start,
                            duration,
                        });
                    }
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(AppError::Transcript(format!(
                    "Malformed transcript XML at position {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
        }
        buf.clear();
    }

    Ok(snippets)
}

// ============= Fetcher =============

pub struct TranscriptFetcher {
    http: reqwest::Client,
    base_url: String,
}

impl TranscriptFetcher {
    pub fn new(http: reqwest::Client) -> Self {
        Self::with_base_url(http, YOUTUBE_BASE)
    }

    pub fn with_base_url(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn innertube_api_key(&self, video_id: &str) -> Result<String> {
        let html = self
            .http
            .get(format!("{}/watch", self.base_url))
            .query(&[("v", video_id)])
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US")
            .send()
            .await
            .map_err(|e| AppError::Transcript(format!("Failed to load video page: {}", e)))?
            .text()
            .await
            .map_err(|e| AppError::Transcript(format!("Failed to read video page: {}", e)))?;

        if html.contains("class=\"g-recaptcha\"") {
            return Err(AppError::Transcript(
                "YouTube is rate limiting requests from this IP (captcha page returned)".to_string(),
            ));
        }

        let pattern = Regex::new(r#""INNERTUBE_API_KEY":\s*"([a-zA-Z0-9_-]+)""#)
            .map_err(|e| AppError::Internal(format!("Invalid key pattern: {}", e)))?;

        pattern
            .captures(&html)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| {
                AppError::Transcript(format!(
                    "Could not find the innertube API key on the page for video {}",
                    video_id
                ))
            })
    }

    /// List the caption tracks of a video.
    pub async fn list_tracks(&self, video_id: &str) -> Result<Vec<CaptionTrack>> {
        let api_key = self.innertube_api_key(video_id).await?;

        let body = json!({
            "context": {
                "client": {
                    "clientName": INNERTUBE_CLIENT_NAME,
                    "clientVersion": INNERTUBE_CLIENT_VERSION
                }
            },
            "videoId": video_id
        });

        let response = self
            .http
            .post(format!("{}/youtubei/v1/player", self.base_url))
            .query(&[("key", api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Transcript(format!("Player request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Transcript(format!(
                "Player request for video {} failed with HTTP {}",
                video_id, status
            )));
        }

        let player: PlayerResponse = response
            .json()
            .await
            .map_err(|e| AppError::Transcript(format!("Invalid player response: {}", e)))?;

        if let Some(playability) = &player.playability_status {
            if playability.status.as_deref().is_some_and(|s| s != "OK") {
                let reason = playability
                    .reason
                    .clone()
                    .unwrap_or_else(|| "no reason given".to_string());
                return Err(AppError::Transcript(format!(
                    "Video {} is unplayable: {}",
                    video_id, reason
                )));
            }
        }

        let tracks: Vec<CaptionTrack> = player
            .captions
            .and_then(|c| c.player_captions_tracklist_renderer)
            .map(|list| list.caption_tracks.into_iter().map(CaptionTrack::from).collect())
            .unwrap_or_default();

        if tracks.is_empty() {
            return Err(AppError::Transcript(format!(
                "Transcripts are disabled for video {}",
                video_id
            )));
        }

        Ok(tracks)
    }

    /// Fetch the transcript in the first available preferred language.
    pub async fn fetch(&self, video_id: &str, languages: &[String]) -> Result<Vec<TranscriptSnippet>> {
        let tracks = self.list_tracks(video_id).await?;

        let track = select_track(&tracks, languages).ok_or_else(|| {
            AppError::Transcript(format!(
                "No transcript for video {} in [{}]. Available: {}",
                video_id,
                languages.join(", "),
                describe_tracks(&tracks)
            ))
        })?;

        tracing::info!(
            video_id,
            language = %track.language_code,
            generated = track.is_generated,
            "Fetching transcript"
        );

        let xml = self
            .http
            .get(&track.base_url)
            .send()
            .await
            .map_err(|e| AppError::Transcript(format!("Transcript request failed: {}", e)))?
            .text()
            .await
            .map_err(|e| AppError::Transcript(format!("Failed to read transcript: {}", e)))?;

        let snippets = parse_timed_text(&xml)?;
        tracing::debug!(snippets = snippets.len(), "Parsed transcript");
        Ok(snippets)
    }
}
