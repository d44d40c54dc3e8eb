use owo_colors::OwoColorize;
use std::error::Error;
use std::path::Path;

use halo_player::accent::Rgb;
use halo_player::config::Config;
use halo_player::constants::AUDIO_EXTENSIONS;
use halo_player::playlist::{Playlist, Track};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub severity: Severity,
    pub message: String,
}

impl Finding {
    fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

pub fn handle_check(playlist_path: &Path) -> Result<(), Box<dyn Error>> {
    let playlist = Playlist::load(playlist_path)?;

    println!("Checking playlist: {}", playlist_path.display());
    println!();

    let mut errors = 0;
    let mut warnings = 0;

    let fallback = Config::load()?.fallback_accent;

    for (index, track) in playlist.tracks.iter().enumerate() {
        let findings = check_track(track);
        let accent = track.accent(&fallback);
        let mark = if findings.is_empty() {
            "✓".green().to_string()
        } else {
            "✗".red().to_string()
        };
        println!(
            "  {mark} {:>2}. {}  {}",
            index + 1,
            track.display_name(),
            format!("{} / {}", accent.primary, accent.secondary).dimmed()
        );

        for finding in findings {
            match finding.severity {
                Severity::Error => {
                    errors += 1;
                    println!("       {} {}", "error:".red(), finding.message);
                }
                Severity::Warning => {
                    warnings += 1;
                    println!("       {} {}", "warning:".yellow(), finding.message);
                }
            }
        }
    }

    println!();
    println!("Summary:");
    println!("  Tracks: {}", playlist.len());
    if warnings > 0 {
        println!("  {} {warnings}", "Warnings:".yellow());
    }
    if errors > 0 {
        println!("  {} {errors}", "Errors:".red());
        return Err("Playlist check failed".into());
    }

    println!("\n{} Playlist is playable!", "✓".green());
    Ok(())
}

/// Problems that would keep a track from playing or displaying as declared.
pub fn check_track(track: &Track) -> Vec<Finding> {
    let mut findings = Vec::new();

    match track.src.as_deref() {
        None => findings.push(Finding::warning("no src, the entry cannot be played")),
        Some(src) => {
            let path = Path::new(src);
            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.to_lowercase())
                .unwrap_or_default();
            if !AUDIO_EXTENSIONS.contains(&ext.as_str()) {
                findings.push(Finding::error(format!(
                    "unsupported format '{ext}' (expected one of: {})",
                    AUDIO_EXTENSIONS.join(", ")
                )));
            }
            if !path.exists() {
                findings.push(Finding::error(format!("file not found: {src}")));
            }
        }
    }

    if let Some(colors) = track.color.as_deref() {
        for color in colors.split(',').map(str::trim).filter(|c| !c.is_empty()) {
            if Rgb::parse(color).is_none() {
                findings.push(Finding::warning(format!(
                    "color '{color}' is not a hex color and will render with the fallback"
                )));
            }
        }
    }

    if track.title.as_deref().is_none_or(|t| t.trim().is_empty()) {
        findings.push(Finding::warning("no title, the file name is shown instead"));
    }

    findings
}
