//! Camera2D - pan/zoom over the graph with spring smoothing
//!
//! World space is the simulation's coordinate system. Screen space is the
//! widget rect. Call `update(dt)` at the start of a frame, then use the
//! transforms for rendering and hit testing.

use egui::{Pos2, Rect, Vec2};

use super::animation::{SpringConfig, SpringF32, SpringVec2};
use crate::config::GraphSettings;

#[derive(Debug, Clone)]
pub struct Camera2D {
    /// Center of the view in world coordinates
    position: SpringVec2,
    /// 1.0 = 100%
    zoom: SpringF32,
    pub min_zoom: f32,
    pub max_zoom: f32,
}

impl Camera2D {
    pub fn new(settings: &GraphSettings) -> Self {
        let spring = SpringConfig::from_settings(&settings.animation, "medium");
        Self {
            position: SpringVec2::new(Vec2::ZERO, spring),
            zoom: SpringF32::new(1.0, spring),
            min_zoom: settings.zoom.min,
            max_zoom: settings.zoom.max,
        }
    }

    // =========================================================================
    // CURRENT VALUES
    // =========================================================================

    pub fn center(&self) -> Pos2 {
        self.position.get().to_pos2()
    }

    pub fn zoom(&self) -> f32 {
        self.zoom.get()
    }

    pub fn target_zoom(&self) -> f32 {
        self.zoom.target()
    }

    // =========================================================================
    // ANIMATION
    // =========================================================================

    pub fn update(&mut self, dt: f32) {
        self.position.tick(dt);
        self.zoom.tick(dt);
    }

    pub fn snap_to_target(&mut self) {
        self.position.set_immediate(self.position.target());
        self.zoom.set_immediate(self.zoom.target());
    }

    pub fn is_animating(&self) -> bool {
        self.position.is_animating() || self.zoom.is_animating()
    }

    // =========================================================================
    // CONTROLS
    // =========================================================================

    /// Pan by a screen-space delta (drag on empty canvas)
    pub fn pan(&mut self, screen_delta: Vec2) {
        let world_delta = screen_delta / self.zoom.get();
        // follows the pointer exactly; cancels any fly-in in progress
        self.position.set_immediate(self.position.get() - world_delta);
    }

    /// Zoom by `factor`, keeping the world point under `screen_pos` fixed
    pub fn zoom_at(&mut self, factor: f32, screen_pos: Pos2, screen_rect: Rect) {
        let old_zoom = self.zoom.target();
        let new_zoom = (old_zoom * factor).clamp(self.min_zoom, self.max_zoom);
        if (new_zoom - old_zoom).abs() <= f32::EPSILON {
            return;
        }

        let offset_from_center = screen_pos - screen_rect.center();
        let world_offset_old = offset_from_center / old_zoom;
        let world_offset_new = offset_from_center / new_zoom;

        self.position
            .set_target(self.position.target() + (world_offset_old - world_offset_new));
        self.zoom.set_target(new_zoom);
    }

    /// Center on `bounds` and zoom so they fit inside `screen_rect`
    pub fn fit_to_bounds(&mut self, bounds: Rect, screen_rect: Rect, padding: f32) {
        if bounds.is_negative() {
            return;
        }
        self.position.set_target(bounds.center().to_vec2());

        let padded = screen_rect.shrink(padding);
        let width = bounds.width().max(1.0);
        let height = bounds.height().max(1.0);
        let zoom = (padded.width() / width)
            .min(padded.height() / height)
            .clamp(self.min_zoom, self.max_zoom);
        self.zoom.set_target(zoom);
    }

    pub fn reset(&mut self) {
        self.position.set_target(Vec2::ZERO);
        self.zoom.set_target(1.0);
    }

    // =========================================================================
    // COORDINATE TRANSFORMS
    // =========================================================================

    pub fn world_to_screen(&self, world_pos: Pos2, screen_rect: Rect) -> Pos2 {
        screen_rect.center() + (world_pos - self.center()) * self.zoom()
    }

    pub fn screen_to_world(&self, screen_pos: Pos2, screen_rect: Rect) -> Pos2 {
        self.center() + (screen_pos - screen_rect.center()) / self.zoom()
    }

    /// World-space rect currently on screen
    pub fn visible_bounds(&self, screen_rect: Rect) -> Rect {
        Rect::from_center_size(self.center(), screen_rect.size() / self.zoom())
    }
}
