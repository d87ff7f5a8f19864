//! Input handling - mouse interaction with the graph
//!
//! Click selects a node, dragging a node pins it under the pointer, dragging
//! empty canvas pans, and the wheel zooms around the cursor. Double-click is
//! deliberately inert.
//!
//! The drag state machine ([`InputState`]) works purely in world space so it
//! can be driven without an egui frame; [`InputHandler`] maps a `Response`
//! onto it.

use egui::{Pos2, Rect, Response, Vec2};

use super::camera::Camera2D;
use super::force_sim::ForceSimulation;
use super::spatial::SpatialIndex;
use crate::config::GraphSettings;

// =============================================================================
// INPUT STATE
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    /// Dragging a node (simulation index)
    Node(usize),
    /// Dragging empty canvas
    Pan,
}

/// Result of dropping a node next to another
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewire {
    pub node: usize,
    pub attached_to: usize,
    pub detached_from: Vec<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Node under the pointer (simulation index)
    pub hovered: Option<usize>,
    drag: DragState,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drag(&self) -> DragState {
        self.drag
    }

    pub fn dragged_node(&self) -> Option<usize> {
        match self.drag {
            DragState::Node(idx) => Some(idx),
            _ => None,
        }
    }

    /// Drag begins on `hit` (a node) or on empty canvas
    pub fn begin_drag(
        &mut self,
        hit: Option<usize>,
        sim: &mut ForceSimulation,
        settings: &GraphSettings,
    ) {
        self.drag = match hit {
            Some(idx) if idx < sim.len() => {
                sim.pin(idx);
                sim.set_alpha_target(settings.physics.drag_alpha_target);
                if sim.alpha() < settings.physics.drag_alpha_target {
                    sim.restart(settings.physics.drag_alpha_target);
                }
                DragState::Node(idx)
            }
            _ => DragState::Pan,
        };
    }

    /// Pointer moved to `world_pos` while dragging a node
    pub fn drag_node_to(&mut self, world_pos: Pos2, sim: &mut ForceSimulation) {
        if let DragState::Node(idx) = self.drag {
            sim.move_pinned(idx, world_pos);
        }
    }

    /// Drag released. A node dropped within `proximity_radius` of a node it
    /// is not already linked to is rewired onto the nearest such node.
    ///
    /// `spatial` must reflect current positions.
    pub fn end_drag(
        &mut self,
        sim: &mut ForceSimulation,
        spatial: &SpatialIndex,
        settings: &GraphSettings,
    ) -> Option<Rewire> {
        let drag = std::mem::take(&mut self.drag);
        let DragState::Node(idx) = drag else {
            return None;
        };

        let dropped_at = sim.node(idx)?.position;
        sim.unpin(idx);
        sim.set_alpha_target(0.0);

        let nearest = spatial.nearest_within(
            [dropped_at.x, dropped_at.y],
            settings.interaction.proximity_radius,
            |other| other != idx && !sim.is_linked(other, idx),
        )?;

        let detached_from = sim.rewire(idx, nearest);
        sim.restart(settings.physics.rewire_alpha);
        tracing::debug!(node = idx, attached_to = nearest, "node rewired on drop");
        Some(Rewire {
            node: idx,
            attached_to: nearest,
            detached_from,
        })
    }

    /// Abandon any drag (the graph was rebuilt underneath it)
    pub fn cancel(&mut self, sim: &mut ForceSimulation) {
        if let DragState::Node(idx) = std::mem::take(&mut self.drag) {
            sim.unpin(idx);
            sim.set_alpha_target(0.0);
        }
        self.hovered = None;
    }
}

// =============================================================================
// INPUT HANDLER
// =============================================================================

#[derive(Debug, Default)]
pub struct InputOutcome {
    pub clicked: Option<usize>,
    pub rewire: Option<Rewire>,
    pub fit_requested: bool,
    pub needs_repaint: bool,
}

/// Maps egui responses onto [`InputState`] and the camera
pub struct InputHandler;

impl InputHandler {
    pub fn handle_input(
        response: &Response,
        camera: &mut Camera2D,
        state: &mut InputState,
        sim: &mut ForceSimulation,
        spatial: &SpatialIndex,
        settings: &GraphSettings,
        screen_rect: Rect,
    ) -> InputOutcome {
        let mut outcome = InputOutcome::default();
        let tolerance = settings.interaction.hit_tolerance / camera.zoom();
        let hit_at = |screen: Pos2, camera: &Camera2D| {
            let world = camera.screen_to_world(screen, screen_rect);
            spatial.hit_test([world.x, world.y], tolerance)
        };

        // Hover (suppressed while dragging so the dragged node keeps it)
        if state.drag() == DragState::Idle {
            let hovered = response.hover_pos().and_then(|pos| hit_at(pos, camera));
            if hovered != state.hovered {
                state.hovered = hovered;
                outcome.needs_repaint = true;
            }
        }

        // Click (double-clicks are not zoom gestures here)
        if response.clicked() && !response.double_clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                outcome.clicked = hit_at(pos, camera);
            }
        }

        // Drag
        if response.drag_started() {
            let origin = response
                .ctx
                .input(|i| i.pointer.press_origin())
                .or_else(|| response.interact_pointer_pos());
            let hit = origin.and_then(|pos| hit_at(pos, camera));
            state.begin_drag(hit, sim, settings);
            outcome.needs_repaint = true;
        }
        if response.dragged() {
            match state.drag() {
                DragState::Node(_) => {
                    if let Some(pos) = response.interact_pointer_pos() {
                        state.drag_node_to(camera.screen_to_world(pos, screen_rect), sim);
                    }
                }
                DragState::Pan => {
                    let delta = response.drag_delta();
                    if delta != Vec2::ZERO {
                        camera.pan(delta);
                    }
                }
                DragState::Idle => {}
            }
            outcome.needs_repaint = true;
        }
        if response.drag_stopped() {
            outcome.rewire = state.end_drag(sim, spatial, settings);
            outcome.needs_repaint = true;
        }

        // Wheel zoom around the cursor
        if response.hovered() {
            let scroll = response.ctx.input(|i| i.raw_scroll_delta);
            if scroll.y != 0.0 {
                if let Some(pos) = response.hover_pos() {
                    let factor = (scroll.y * settings.zoom.wheel_sensitivity).exp();
                    camera.zoom_at(factor, pos, screen_rect);
                    outcome.needs_repaint = true;
                }
            }
        }

        if response.has_focus() || response.hovered() {
            response.ctx.input(|i| {
                if i.key_pressed(egui::Key::F) {
                    outcome.fit_requested = true;
                }
            });
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::force_sim::SimNode;
    use crate::graph::spatial::SpatialNode;

    fn setup() -> (ForceSimulation, GraphSettings) {
        let mut sim = ForceSimulation::default();
        sim.add_node(SimNode::new("root", Pos2::new(0.0, 0.0)));
        sim.add_node(SimNode::new("a", Pos2::new(200.0, 0.0)));
        sim.add_node(SimNode::new("b", Pos2::new(-200.0, 0.0)));
        sim.add_link(0, 1);
        sim.add_link(0, 2);
        (sim, GraphSettings::default())
    }

    fn spatial_of(sim: &ForceSimulation) -> SpatialIndex {
        let mut index = SpatialIndex::new();
        index.rebuild(
            sim.nodes()
                .iter()
                .enumerate()
                .map(|(i, n)| SpatialNode::new(i, [n.position.x, n.position.y], 25.0)),
        );
        index
    }

    #[test]
    fn test_drag_pins_and_warms_simulation() {
        let (mut sim, settings) = setup();
        sim.restart(0.0);
        let mut state = InputState::new();
        state.begin_drag(Some(1), &mut sim, &settings);
        assert_eq!(state.dragged_node(), Some(1));
        assert!(sim.nodes()[1].is_fixed());
        assert_eq!(sim.alpha_target(), 0.3);
        assert!(sim.is_running());

        state.drag_node_to(Pos2::new(50.0, 50.0), &mut sim);
        sim.tick();
        assert_eq!(sim.nodes()[1].position, Pos2::new(50.0, 50.0));
    }

    #[test]
    fn test_drop_far_away_does_not_rewire() {
        let (mut sim, settings) = setup();
        let mut state = InputState::new();
        state.begin_drag(Some(1), &mut sim, &settings);
        state.drag_node_to(Pos2::new(600.0, 600.0), &mut sim);
        let spatial = spatial_of(&sim);
        assert_eq!(state.end_drag(&mut sim, &spatial, &settings), None);
        assert!(!sim.nodes()[1].is_fixed());
        assert_eq!(sim.alpha_target(), 0.0);
        assert!(sim.is_linked(0, 1));
    }

    #[test]
    fn test_drop_next_to_unlinked_node_rewires() {
        let (mut sim, settings) = setup();
        let mut state = InputState::new();
        state.begin_drag(Some(1), &mut sim, &settings);
        state.drag_node_to(Pos2::new(-170.0, 10.0), &mut sim);
        let spatial = spatial_of(&sim);

        let rewire = state.end_drag(&mut sim, &spatial, &settings).unwrap();
        assert_eq!(
            rewire,
            Rewire {
                node: 1,
                attached_to: 2,
                detached_from: vec![0],
            }
        );
        assert!(sim.is_linked(2, 1));
        assert!(!sim.is_linked(0, 1));
        assert_eq!(sim.alpha(), 1.0);
    }

    #[test]
    fn test_drop_next_to_linked_node_is_ignored() {
        let (mut sim, settings) = setup();
        let mut state = InputState::new();
        state.begin_drag(Some(1), &mut sim, &settings);
        state.drag_node_to(Pos2::new(30.0, 0.0), &mut sim);
        let spatial = spatial_of(&sim);
        assert_eq!(state.end_drag(&mut sim, &spatial, &settings), None);
        assert!(sim.is_linked(0, 1));
    }

    #[test]
    fn test_canvas_drag_is_pan() {
        let (mut sim, settings) = setup();
        let mut state = InputState::new();
        state.begin_drag(None, &mut sim, &settings);
        assert_eq!(state.drag(), DragState::Pan);
        let spatial = spatial_of(&sim);
        assert_eq!(state.end_drag(&mut sim, &spatial, &settings), None);
        assert_eq!(state.drag(), DragState::Idle);
    }

    #[test]
    fn test_cancel_releases_pin() {
        let (mut sim, settings) = setup();
        let mut state = InputState::new();
        state.begin_drag(Some(2), &mut sim, &settings);
        state.cancel(&mut sim);
        assert_eq!(state.drag(), DragState::Idle);
        assert!(!sim.nodes()[2].is_fixed());
    }
}
