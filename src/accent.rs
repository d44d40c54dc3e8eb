//! Per-track accent colors.
//!
//! Each playlist entry may declare a comma-separated color list. The first two
//! usable entries become the primary and secondary accent of the track; the
//! primary colors the glow, the ring markers and the background circles, and
//! both feed the radial gradient.

use crate::constants::FALLBACK_ACCENT;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccentPair {
    pub primary: String,
    pub secondary: String,
}

impl AccentPair {
    pub fn uniform(color: &str) -> Self {
        Self {
            primary: color.to_string(),
            secondary: color.to_string(),
        }
    }
}

impl Default for AccentPair {
    fn default() -> Self {
        Self::uniform(FALLBACK_ACCENT)
    }
}

/// Resolve the accent pair for a declared color list.
///
/// Whitespace is trimmed and empty entries are dropped. With no usable entry
/// both colors are `fallback`; with one, the secondary repeats the primary.
pub fn resolve_accent(colors: Option<&str>, fallback: &str) -> AccentPair {
    let mut declared = colors
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty());

    match (declared.next(), declared.next()) {
        (Some(primary), Some(secondary)) => AccentPair {
            primary: primary.to_string(),
            secondary: secondary.to_string(),
        },
        (Some(primary), None) => AccentPair::uniform(primary),
        _ => AccentPair::uniform(fallback),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);

    /// Parse `#rgb` or `#rrggbb`.
    pub fn parse(color: &str) -> Option<Self> {
        let hex = color.trim().strip_prefix('#')?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }

        match hex.len() {
            3 => {
                let mut channels = hex.chars().map(|c| {
                    let v = c.to_digit(16).unwrap_or(0) as u8;
                    v * 17
                });
                Some(Rgb(channels.next()?, channels.next()?, channels.next()?))
            }
            6 => {
                let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
                Some(Rgb(channel(0)?, channel(2)?, channel(4)?))
            }
            _ => None,
        }
    }

    pub fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb(mix(self.0, other.0), mix(self.1, other.1), mix(self.2, other.2))
    }

    /// Scale towards black, `factor` in [0, 1].
    pub fn dim(self, factor: f64) -> Rgb {
        Rgb(0, 0, 0).lerp(self, factor)
    }
}

/// Parse a declared color, falling back for anything that is not hex.
pub fn rgb_or(color: &str, fallback: &str) -> Rgb {
    Rgb::parse(color)
        .or_else(|| Rgb::parse(fallback))
        .unwrap_or(Rgb::WHITE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_colors_keep_declared_order() {
        let pair = resolve_accent(Some("#00ff00,#0000ff"), FALLBACK_ACCENT);
        assert_eq!(pair.primary, "#00ff00");
        assert_eq!(pair.secondary, "#0000ff");
    }

    #[test]
    fn test_extra_colors_are_ignored() {
        let pair = resolve_accent(Some(" #111 , #222,#333 "), FALLBACK_ACCENT);
        assert_eq!(pair, AccentPair {
            primary: "#111".to_string(),
            secondary: "#222".to_string(),
        });
    }

    #[test]
    fn test_single_color_repeats() {
        let pair = resolve_accent(Some("#ff0000"), FALLBACK_ACCENT);
        assert_eq!(pair, AccentPair::uniform("#ff0000"));
    }

    #[test]
    fn test_absent_and_empty_use_fallback() {
        assert_eq!(resolve_accent(None, "#abcdef"), AccentPair::uniform("#abcdef"));
        assert_eq!(resolve_accent(Some(""), "#abcdef"), AccentPair::uniform("#abcdef"));
        assert_eq!(resolve_accent(Some(" , ,"), "#abcdef"), AccentPair::uniform("#abcdef"));
    }

    #[test]
    fn test_empty_entries_are_dropped_before_picking() {
        let pair = resolve_accent(Some(",#ff0000,, #00ff00"), FALLBACK_ACCENT);
        assert_eq!(pair.primary, "#ff0000");
        assert_eq!(pair.secondary, "#00ff00");
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(Rgb::parse("#ff8000"), Some(Rgb(255, 128, 0)));
        assert_eq!(Rgb::parse("#fff"), Some(Rgb::WHITE));
        assert_eq!(Rgb::parse("#bca8e2"), Some(Rgb(0xbc, 0xa8, 0xe2)));
        assert_eq!(Rgb::parse("red"), None);
        assert_eq!(Rgb::parse("#ggg"), None);
        assert_eq!(Rgb::parse("#12345"), None);
    }

    #[test]
    fn test_rgb_or_falls_back() {
        assert_eq!(rgb_or("teal", "#000000"), Rgb(0, 0, 0));
        assert_eq!(rgb_or("teal", "nope"), Rgb::WHITE);
    }

    #[test]
    fn test_lerp_endpoints() {
        let a = Rgb(0, 0, 0);
        let b = Rgb(200, 100, 50);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5), Rgb(100, 50, 25));
    }
}
