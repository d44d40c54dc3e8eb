//! Read-only playlist loaded from a TOML file.
//!
//! A playlist is a list of `[[track]]` tables. Every field is optional: an
//! entry without `src` is still listed but cannot be played, and missing
//! metadata simply leaves the corresponding display field untouched.

use serde::Deserialize;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use crate::accent::{AccentPair, resolve_accent};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Track {
    pub src: Option<String>,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub cover: Option<String>,
    /// Comma-separated accent colors, primary first.
    pub color: Option<String>,
}

impl Track {
    pub fn accent(&self, fallback: &str) -> AccentPair {
        resolve_accent(self.color.as_deref(), fallback)
    }

    /// Title for list display, falling back to the source file name.
    pub fn display_name(&self) -> String {
        if let Some(title) = self.title.as_deref().filter(|t| !t.trim().is_empty()) {
            return title.to_string();
        }
        self.src
            .as_deref()
            .and_then(|src| Path::new(src).file_name())
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| "(untitled)".to_string())
    }
}

#[derive(Debug, Deserialize)]
struct PlaylistFile {
    #[serde(default, rename = "track")]
    tracks: Vec<Track>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Playlist {
    pub tracks: Vec<Track>,
}

impl Playlist {
    pub fn new(tracks: Vec<Track>) -> Self {
        Self { tracks }
    }

    pub fn parse(contents: &str) -> Result<Self, Box<dyn Error>> {
        let file: PlaylistFile = toml::from_str(contents)?;
        Ok(Self::new(file.tracks))
    }

    /// Load a playlist and resolve every source against the playlist's directory.
    pub fn load(path: &Path) -> Result<Self, Box<dyn Error>> {
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Cannot read playlist {}: {e}", path.display()))?;
        let mut playlist = Self::parse(&contents)?;

        let base = path.parent().unwrap_or(Path::new("."));
        for track in &mut playlist.tracks {
            if let Some(src) = track.src.take() {
                track.src = Some(resolve_source(&src, base).to_string_lossy().to_string());
            }
        }

        log::info!(
            "Loaded playlist {} with {} tracks",
            path.display(),
            playlist.len()
        );
        Ok(playlist)
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

/// Expand `~` and environment variables, then anchor relative paths at `base`.
pub fn resolve_source(src: &str, base: &Path) -> PathBuf {
    let expanded = shellexpand::full(src)
        .map(|s| s.to_string())
        .unwrap_or_else(|_| src.to_string());
    let path = PathBuf::from(expanded);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"
[[track]]
src = "one.wav"
title = "One"
artist = "First"
cover = "one.png"
color = "#ff0000"

[[track]]
src = "two.flac"
color = "#00ff00,#0000ff"

[[track]]
title = "No Source"
"##;

    #[test]
    fn test_parse_tracks() {
        let playlist = Playlist::parse(SAMPLE).unwrap();
        assert_eq!(playlist.len(), 3);

        let first = playlist.get(0).unwrap();
        assert_eq!(first.src.as_deref(), Some("one.wav"));
        assert_eq!(first.artist.as_deref(), Some("First"));
        assert_eq!(first.cover.as_deref(), Some("one.png"));

        assert!(playlist.get(2).unwrap().src.is_none());
        assert!(playlist.get(3).is_none());
    }

    #[test]
    fn test_empty_playlist() {
        let playlist = Playlist::parse("").unwrap();
        assert!(playlist.is_empty());
    }

    #[test]
    fn test_display_name() {
        let playlist = Playlist::parse(SAMPLE).unwrap();
        assert_eq!(playlist.tracks[0].display_name(), "One");
        assert_eq!(playlist.tracks[1].display_name(), "two.flac");
        assert_eq!(playlist.tracks[2].display_name(), "No Source");
        assert_eq!(Track::default().display_name(), "(untitled)");
    }

    #[test]
    fn test_track_accent() {
        let playlist = Playlist::parse(SAMPLE).unwrap();
        let fallback = "#bca8e2";
        assert_eq!(playlist.tracks[0].accent(fallback), AccentPair::uniform("#ff0000"));
        assert_eq!(playlist.tracks[1].accent(fallback).secondary, "#0000ff");
        assert_eq!(playlist.tracks[2].accent(fallback), AccentPair::uniform(fallback));
    }

    #[test]
    fn test_resolve_source() {
        let base = Path::new("/music/lists");
        assert_eq!(
            resolve_source("song.wav", base),
            PathBuf::from("/music/lists/song.wav")
        );
        assert_eq!(
            resolve_source("/abs/song.wav", base),
            PathBuf::from("/abs/song.wav")
        );
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(Playlist::parse("[[track]\nsrc = ").is_err());
    }
}
