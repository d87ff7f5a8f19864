//! Graph settings loaded from YAML
//!
//! All physics, styling and interaction constants of the graph view live in
//! [`GraphSettings`]. The defaults are embedded from
//! `config/graph_settings.yaml`; `QTREE_GRAPH_SETTINGS` can point at an
//! override file. Every section and key is optional.

use std::path::Path;
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};

/// Embedded copy of the shipped settings file
pub const DEFAULT_SETTINGS_YAML: &str = include_str!("../config/graph_settings.yaml");

/// Env var naming an override settings file
pub const SETTINGS_ENV_VAR: &str = "QTREE_GRAPH_SETTINGS";

static GRAPH_SETTINGS: OnceLock<Arc<GraphSettings>> = OnceLock::new();

pub type SettingsResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

// =============================================================================
// SECTIONS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsSettings {
    pub link_distance: f32,
    pub link_strength: f32,
    /// Negative repels
    pub charge_strength: f32,
    pub charge_distance_min: f32,
    pub collision_radius: f32,
    pub collision_strength: f32,
    pub center_strength: f32,
    pub alpha_min: f32,
    pub alpha_decay: f32,
    pub velocity_decay: f32,
    /// Alpha target held while a node is being dragged
    pub drag_alpha_target: f32,
    /// Alpha after a proximity rewire
    pub rewire_alpha: f32,
    /// Alpha after the tree changes under an existing layout
    pub resync_alpha: f32,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            link_distance: 120.0,
            link_strength: 0.8,
            charge_strength: -400.0,
            charge_distance_min: 1.0,
            collision_radius: 50.0,
            collision_strength: 1.0,
            center_strength: 1.0,
            alpha_min: 0.001,
            alpha_decay: 0.0228,
            velocity_decay: 0.4,
            drag_alpha_target: 0.3,
            rewire_alpha: 1.0,
            resync_alpha: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeSettings {
    pub min_radius: f32,
    pub max_radius: f32,
    pub root_radius: f32,
    pub chars_per_pixel: f32,
    pub hover_grow: f32,
    pub stroke_width: f32,
    pub path_stroke_width: f32,
    pub label_max_chars: usize,
    pub label_offset: f32,
    pub label_font_size: f32,
    pub badge_radius: f32,
    pub badge_offset: [f32; 2],
    pub badge_font_size: f32,
}

impl Default for NodeSettings {
    fn default() -> Self {
        Self {
            min_radius: 25.0,
            max_radius: 45.0,
            root_radius: 50.0,
            chars_per_pixel: 10.0,
            hover_grow: 5.0,
            stroke_width: 2.0,
            path_stroke_width: 4.0,
            label_max_chars: 20,
            label_offset: 37.0,
            label_font_size: 11.0,
            badge_radius: 10.0,
            badge_offset: [20.0, -20.0],
            badge_font_size: 10.0,
        }
    }
}

/// Colors as `#rrggbb` strings; see [`crate::graph::colors`] for parsing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorSettings {
    pub depth_palette: Vec<String>,
    pub path_fill: String,
    pub path_stroke: String,
    pub stroke: String,
    pub link: String,
    pub link_opacity: f32,
    pub link_width: f32,
    pub badge_fill: String,
    pub badge_text: String,
    pub label: String,
    pub background: String,
}

impl Default for ColorSettings {
    fn default() -> Self {
        Self {
            depth_palette: ["#3b82f6", "#10b981", "#f59e0b", "#ef4444", "#8b5cf6", "#06b6d4"]
                .into_iter()
                .map(String::from)
                .collect(),
            path_fill: "#1d4ed8".into(),
            path_stroke: "#1e40af".into(),
            stroke: "#ffffff".into(),
            link: "#999999".into(),
            link_opacity: 0.6,
            link_width: 2.0,
            badge_fill: "#ef4444".into(),
            badge_text: "#ffffff".into(),
            label: "#000000".into(),
            background: "#f9fafb".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomSettings {
    pub min: f32,
    pub max: f32,
    pub label_threshold: f32,
    pub wheel_sensitivity: f32,
    pub fit_padding: f32,
}

impl Default for ZoomSettings {
    fn default() -> Self {
        Self {
            min: 0.1,
            max: 3.0,
            label_threshold: 0.6,
            wheel_sensitivity: 0.0015,
            fit_padding: 50.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionSettings {
    /// World-space distance within which a dropped node rewires
    pub proximity_radius: f32,
    pub hit_tolerance: f32,
}

impl Default for InteractionSettings {
    fn default() -> Self {
        Self {
            proximity_radius: 60.0,
            hit_tolerance: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpringConfigYaml {
    pub stiffness: f32,
    pub damping: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationSettings {
    pub springs: std::collections::BTreeMap<String, SpringConfigYaml>,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        let springs = [("fast", 300.0), ("medium", 170.0), ("slow", 80.0)]
            .into_iter()
            .map(|(name, stiffness)| {
                (
                    name.to_string(),
                    SpringConfigYaml {
                        stiffness,
                        damping: 1.0,
                    },
                )
            })
            .collect();
        Self { springs }
    }
}

impl AnimationSettings {
    /// Named spring preset; unknown names fall back to `medium`, then to a
    /// critically damped 170.
    pub fn spring(&self, name: &str) -> SpringConfigYaml {
        self.springs
            .get(name)
            .or_else(|| self.springs.get("medium"))
            .copied()
            .unwrap_or(SpringConfigYaml {
                stiffness: 170.0,
                damping: 1.0,
            })
    }
}

// =============================================================================
// GRAPH SETTINGS
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphSettings {
    pub physics: PhysicsSettings,
    pub nodes: NodeSettings,
    pub colors: ColorSettings,
    pub zoom: ZoomSettings,
    pub interaction: InteractionSettings,
    pub animation: AnimationSettings,
}

impl GraphSettings {
    pub fn from_yaml_str(yaml: &str) -> SettingsResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content)
    }

    /// Override file from the environment, else the embedded defaults
    pub fn load() -> SettingsResult<Self> {
        match std::env::var(SETTINGS_ENV_VAR) {
            Ok(path) => Self::load_from(path),
            Err(_) => Self::from_yaml_str(DEFAULT_SETTINGS_YAML),
        }
    }
}

/// Process-wide settings, loaded on first use.
///
/// A settings file that fails to load is logged and replaced by the
/// built-in defaults.
pub fn global_config() -> &'static Arc<GraphSettings> {
    GRAPH_SETTINGS.get_or_init(|| {
        let settings = GraphSettings::load().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "graph settings failed to load; using defaults");
            GraphSettings::default()
        });
        Arc::new(settings)
    })
}

/// Install settings before first use. Returns the settings back if the
/// global was already initialised.
pub fn init_global(settings: GraphSettings) -> Result<(), GraphSettings> {
    GRAPH_SETTINGS
        .set(Arc::new(settings))
        .map_err(Arc::unwrap_or_clone)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_embedded_file_matches_defaults() {
        let parsed = GraphSettings::from_yaml_str(DEFAULT_SETTINGS_YAML).unwrap();
        assert_eq!(parsed, GraphSettings::default());
    }

    #[test]
    fn test_partial_override() {
        let settings = GraphSettings::from_yaml_str(
            "physics:\n  link_distance: 200\ninteraction:\n  proximity_radius: 10\n",
        )
        .unwrap();
        assert_eq!(settings.physics.link_distance, 200.0);
        assert_eq!(settings.physics.charge_strength, -400.0);
        assert_eq!(settings.interaction.proximity_radius, 10.0);
        assert_eq!(settings.zoom, ZoomSettings::default());
    }

    #[test]
    fn test_unknown_spring_falls_back_to_medium() {
        let animation = AnimationSettings::default();
        assert_eq!(animation.spring("nope"), animation.spring("medium"));
    }

    #[test]
    fn test_bad_yaml_is_an_error() {
        assert!(GraphSettings::from_yaml_str("physics: [1, 2").is_err());
    }
}
