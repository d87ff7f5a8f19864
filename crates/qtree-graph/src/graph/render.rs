//! Rendering - draws links, nodes, badges and labels with egui::Painter
//!
//! Everything is positioned in world space and mapped through the camera, so
//! radii, stroke widths and font sizes all scale with zoom.

use egui::{Align2, FontId, Rect, Stroke, Vec2};

use super::camera::Camera2D;
use super::colors::Palette;
use super::force_sim::ForceSimulation;
use super::lod::{node_radius, truncate_label, DetailLevel};
use super::projection::GraphProjection;
use crate::config::GraphSettings;

/// Everything one frame needs to draw
pub struct RenderScene<'a> {
    pub projection: &'a GraphProjection,
    pub sim: &'a ForceSimulation,
    pub camera: &'a Camera2D,
    pub screen_rect: Rect,
    /// Per node index: is it on the current path?
    pub on_path: &'a [bool],
    pub hovered: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct GraphRenderer {
    pub palette: Palette,
}

impl GraphRenderer {
    pub fn new(settings: &GraphSettings) -> Self {
        Self {
            palette: Palette::from_settings(&settings.colors),
        }
    }

    pub fn render(
        &self,
        painter: &egui::Painter,
        scene: &RenderScene<'_>,
        settings: &GraphSettings,
    ) {
        painter.rect_filled(scene.screen_rect, 0.0, self.palette.background);
        self.render_links(painter, scene);

        // hovered node last so it sits on top
        let order = (0..scene.sim.len())
            .filter(|&i| Some(i) != scene.hovered)
            .chain(scene.hovered);
        for idx in order {
            self.render_node(painter, scene, settings, idx);
        }
    }

    fn render_links(&self, painter: &egui::Painter, scene: &RenderScene<'_>) {
        let zoom = scene.camera.zoom();
        let stroke = Stroke::new(self.palette.link_width * zoom, self.palette.link);
        let nodes = scene.sim.nodes();
        for link in scene.sim.links() {
            let (Some(source), Some(target)) = (nodes.get(link.source), nodes.get(link.target))
            else {
                continue;
            };
            let a = scene.camera.world_to_screen(source.position, scene.screen_rect);
            let b = scene.camera.world_to_screen(target.position, scene.screen_rect);
            painter.line_segment([a, b], stroke);
        }
    }

    fn render_node(
        &self,
        painter: &egui::Painter,
        scene: &RenderScene<'_>,
        settings: &GraphSettings,
        idx: usize,
    ) {
        let (Some(sim_node), Some(node)) = (scene.sim.node(idx), scene.projection.nodes.get(idx))
        else {
            return;
        };
        let zoom = scene.camera.zoom();
        let nodes = &settings.nodes;
        let on_path = scene.on_path.get(idx).copied().unwrap_or(false);
        let hovered = scene.hovered == Some(idx);

        let center = scene.camera.world_to_screen(sim_node.position, scene.screen_rect);
        let radius = node_radius(&node.label, node.is_root(), hovered, nodes) * zoom;
        if !scene.screen_rect.expand(radius).contains(center) {
            return;
        }

        let lod = DetailLevel::new(radius, zoom, settings.zoom.label_threshold);
        let fill = self.palette.node_fill(node.depth, on_path);
        painter.circle_filled(center, radius, fill);
        if lod == DetailLevel::Dot {
            return;
        }

        let stroke_width = if on_path {
            nodes.path_stroke_width
        } else {
            nodes.stroke_width
        };
        painter.circle_stroke(
            center,
            radius,
            Stroke::new(stroke_width * zoom, self.palette.node_stroke(on_path)),
        );

        if lod.shows_badge() && node.child_count > 0 {
            let offset = Vec2::new(nodes.badge_offset[0], nodes.badge_offset[1]) * zoom;
            let badge_center = center + offset;
            painter.circle_filled(badge_center, nodes.badge_radius * zoom, self.palette.badge_fill);
            painter.text(
                badge_center,
                Align2::CENTER_CENTER,
                node.child_count.to_string(),
                FontId::proportional(nodes.badge_font_size * zoom),
                self.palette.badge_text,
            );
        }

        if lod.shows_label() {
            painter.text(
                center + Vec2::new(0.0, nodes.label_offset * zoom),
                Align2::CENTER_TOP,
                truncate_label(&node.label, nodes.label_max_chars),
                FontId::proportional(nodes.label_font_size * zoom),
                self.palette.label,
            );
        }
    }

    /// Node/link counts top-left, zoom level bottom-right
    pub fn render_chrome(&self, painter: &egui::Painter, scene: &RenderScene<'_>) {
        let rect = scene.screen_rect;
        let font = FontId::monospace(11.0);
        let color = self.palette.label.gamma_multiply(0.7);

        painter.text(
            rect.left_top() + Vec2::new(8.0, 8.0),
            Align2::LEFT_TOP,
            format!(
                "{} nodes · {} links",
                scene.sim.len(),
                scene.sim.links().len()
            ),
            font.clone(),
            color,
        );
        painter.text(
            rect.right_bottom() - Vec2::new(8.0, 8.0),
            Align2::RIGHT_BOTTOM,
            format!("{:.0}%", scene.camera.zoom() * 100.0),
            font,
            color,
        );
    }
}

