//! Level of Detail for node rendering
//!
//! Node size grows with question length. Labels are only drawn once the
//! camera is zoomed in past the label threshold.

use crate::config::NodeSettings;

/// Level of detail for a node at the current zoom
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailLevel {
    /// < 4px on screen: filled dot, no stroke
    Dot,
    /// Circle, stroke and badge
    Shape,
    /// Everything including the label
    Labeled,
}

impl DetailLevel {
    pub fn new(screen_radius: f32, zoom: f32, label_threshold: f32) -> Self {
        if screen_radius < 4.0 {
            DetailLevel::Dot
        } else if labels_visible(zoom, label_threshold) {
            DetailLevel::Labeled
        } else {
            DetailLevel::Shape
        }
    }

    pub fn shows_label(self) -> bool {
        self == DetailLevel::Labeled
    }

    pub fn shows_badge(self) -> bool {
        self != DetailLevel::Dot
    }
}

/// World-space radius of a node
pub fn node_radius(label: &str, is_root: bool, hovered: bool, nodes: &NodeSettings) -> f32 {
    let base = if is_root {
        nodes.root_radius
    } else {
        let len = label.chars().count() as f32;
        (nodes.min_radius + len / nodes.chars_per_pixel).clamp(nodes.min_radius, nodes.max_radius)
    };
    if hovered {
        base + nodes.hover_grow
    } else {
        base
    }
}

/// Labels are hidden at or below the threshold zoom
pub fn labels_visible(zoom: f32, threshold: f32) -> bool {
    zoom > threshold
}

/// First `max_chars` characters, with an ellipsis when cut
pub fn truncate_label(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte, _)) => format!("{}…", &text[..byte]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radius_scales_with_text() {
        let nodes = NodeSettings::default();
        assert_eq!(node_radius("", false, false, &nodes), 25.0);
        assert_eq!(node_radius(&"x".repeat(100), false, false, &nodes), 35.0);
        assert_eq!(node_radius(&"x".repeat(1000), false, false, &nodes), 45.0);
    }

    #[test]
    fn test_root_and_hover() {
        let nodes = NodeSettings::default();
        assert_eq!(node_radius("anything", true, false, &nodes), 50.0);
        assert_eq!(node_radius("anything", true, true, &nodes), 55.0);
        assert_eq!(node_radius("", false, true, &nodes), 30.0);
    }

    #[test]
    fn test_truncate_label() {
        assert_eq!(truncate_label("short", 20), "short");
        assert_eq!(truncate_label(&"a".repeat(20), 20), "a".repeat(20));
        assert_eq!(
            truncate_label("What is database normalization?", 20),
            "What is database nor…"
        );
        // multibyte safe
        assert_eq!(truncate_label("ééééé", 2), "éé…");
    }

    #[test]
    fn test_label_threshold() {
        assert!(!labels_visible(0.6, 0.6));
        assert!(labels_visible(0.61, 0.6));
        assert_eq!(DetailLevel::new(20.0, 0.5, 0.6), DetailLevel::Shape);
        assert_eq!(DetailLevel::new(20.0, 1.0, 0.6), DetailLevel::Labeled);
        assert_eq!(DetailLevel::new(2.5, 1.0, 0.6), DetailLevel::Dot);
    }
}
