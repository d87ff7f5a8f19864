//! Color palette for the question graph
//!
//! Colors are configured as `#rrggbb` strings and resolved once into a
//! [`Palette`] when settings are applied.

use egui::Color32;

use crate::config::ColorSettings;

/// Used for any configured color that fails to parse
const FALLBACK: Color32 = Color32::from_rgb(156, 163, 175); // Gray-400

/// Parse `#rrggbb` (leading `#` optional)
pub fn parse_hex(hex: &str) -> Option<Color32> {
    let digits = hex.trim().trim_start_matches('#');
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some(Color32::from_rgb(channel(0)?, channel(2)?, channel(4)?))
}

fn resolve(hex: &str) -> Color32 {
    parse_hex(hex).unwrap_or_else(|| {
        tracing::warn!(color = hex, "invalid graph color; using fallback");
        FALLBACK
    })
}

/// Resolved graph colors
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    depth: Vec<Color32>,
    pub path_fill: Color32,
    pub path_stroke: Color32,
    pub stroke: Color32,
    pub link: Color32,
    pub link_width: f32,
    pub badge_fill: Color32,
    pub badge_text: Color32,
    pub label: Color32,
    pub background: Color32,
}

impl Default for Palette {
    fn default() -> Self {
        Self::from_settings(&ColorSettings::default())
    }
}

impl Palette {
    pub fn from_settings(colors: &ColorSettings) -> Self {
        let mut depth: Vec<Color32> = colors.depth_palette.iter().map(|c| resolve(c)).collect();
        if depth.is_empty() {
            depth.push(FALLBACK);
        }
        let link = resolve(&colors.link);
        let alpha = (colors.link_opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self {
            depth,
            path_fill: resolve(&colors.path_fill),
            path_stroke: resolve(&colors.path_stroke),
            stroke: resolve(&colors.stroke),
            link: Color32::from_rgba_unmultiplied(link.r(), link.g(), link.b(), alpha),
            link_width: colors.link_width,
            badge_fill: resolve(&colors.badge_fill),
            badge_text: resolve(&colors.badge_text),
            label: resolve(&colors.label),
            background: resolve(&colors.background),
        }
    }

    /// Palette color for a tree depth, cycling past the end
    pub fn depth_color(&self, depth: usize) -> Color32 {
        self.depth[depth % self.depth.len()]
    }

    pub fn node_fill(&self, depth: usize, on_path: bool) -> Color32 {
        if on_path {
            self.path_fill
        } else {
            self.depth_color(depth)
        }
    }

    pub fn node_stroke(&self, on_path: bool) -> Color32 {
        if on_path {
            self.path_stroke
        } else {
            self.stroke
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("#1d4ed8"), Some(Color32::from_rgb(0x1d, 0x4e, 0xd8)));
        assert_eq!(parse_hex("ef4444"), Some(Color32::from_rgb(0xef, 0x44, 0x44)));
        assert_eq!(parse_hex("#fff"), None);
        assert_eq!(parse_hex("#zzzzzz"), None);
    }

    #[test]
    fn test_depth_palette_cycles() {
        let palette = Palette::default();
        assert_eq!(palette.depth_color(0), palette.depth_color(6));
        assert_ne!(palette.depth_color(0), palette.depth_color(1));
    }

    #[test]
    fn test_path_overrides_depth() {
        let palette = Palette::default();
        assert_eq!(palette.node_fill(3, true), Color32::from_rgb(0x1d, 0x4e, 0xd8));
        assert_eq!(palette.node_stroke(true), Color32::from_rgb(0x1e, 0x40, 0xaf));
        assert_eq!(palette.node_stroke(false), Color32::WHITE);
    }

    #[test]
    fn test_bad_color_falls_back() {
        let colors = ColorSettings {
            depth_palette: vec![],
            path_fill: "blue".into(),
            ..ColorSettings::default()
        };
        let palette = Palette::from_settings(&colors);
        assert_eq!(palette.path_fill, FALLBACK);
        assert_eq!(palette.depth_color(4), FALLBACK);
    }
}
