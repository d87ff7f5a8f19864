//! Question Graph Visualization Module
//!
//! Draws the question tree as a force-directed graph.
//!
//! # Architecture
//!
//! ```text
//! ViewData (from the store, read-only)
//!        │
//!        ▼
//! GraphProjection (flat nodes + parent→child links)
//!        │
//!        ▼
//! ForceSimulation (positions, ticks every frame while warm)
//!        │
//!        ├──► GraphRenderer (draws to egui::Painter)
//!        │         └──► LOD (radius, labels, badges)
//!        │
//!        └──► InputHandler (click, drag, pan, wheel zoom)
//!                    │
//!                    ├──► Camera2D (pan/zoom transform)
//!                    └──► SpatialIndex (hit testing, drop proximity)
//! ```
//!
//! The widget never mutates the tree. User intents come back out of
//! [`QuestionGraphWidget::ui`] as [`GraphAction`]s.
//!
//! # Usage
//!
//! ```ignore
//! let mut graph = QuestionGraphWidget::new();
//! graph.sync(store.tree(), store.revision());
//! graph.set_path(&store.path_ids());
//! for action in graph.ui(ui) {
//!     if let GraphAction::NodeClicked(id) = action {
//!         store.focus_node(&id)?;
//!     }
//! }
//! ```

pub mod animation;
pub mod camera;
pub mod colors;
pub mod force_sim;
pub mod input;
pub mod lod;
pub mod projection;
pub mod render;
pub mod spatial;

use std::collections::HashSet;
use std::sync::Arc;

use egui::{Pos2, Sense};
use qtree_types::{NodeId, ViewData};
use serde::Serialize;

pub use animation::{SpringConfig, SpringF32, SpringVec2};
pub use camera::Camera2D;
pub use force_sim::{ForceConfig, ForceSimulation, SimLink, SimNode};
pub use input::{DragState, InputHandler, InputState, Rewire};
pub use projection::{GraphProjection, ProjectedLink, ProjectedNode};
pub use render::{GraphRenderer, RenderScene};
pub use spatial::{SpatialIndex, SpatialNode};

use crate::config::{global_config, GraphSettings};

/// User intent reported by the widget
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphAction {
    NodeClicked(NodeId),
    /// A dropped node was re-linked in the layout only
    LinkRewired {
        node: NodeId,
        attached_to: NodeId,
        detached_from: Vec<NodeId>,
    },
}

/// Layout output for one node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodePosition {
    pub id: NodeId,
    pub label: String,
    pub depth: usize,
    pub x: f32,
    pub y: f32,
}

// =============================================================================
// WIDGET
// =============================================================================

pub struct QuestionGraphWidget {
    settings: Arc<GraphSettings>,
    sim: ForceSimulation,
    camera: Camera2D,
    input_state: InputState,
    projection: GraphProjection,
    renderer: GraphRenderer,
    spatial: SpatialIndex,
    /// Tree revision the projection was built from
    revision: Option<u64>,
    path: HashSet<NodeId>,
    on_path: Vec<bool>,
    needs_initial_fit: bool,
}

impl Default for QuestionGraphWidget {
    fn default() -> Self {
        Self::new()
    }
}

impl QuestionGraphWidget {
    pub fn new() -> Self {
        Self::with_settings(Arc::clone(global_config()))
    }

    pub fn with_settings(settings: Arc<GraphSettings>) -> Self {
        Self {
            sim: ForceSimulation::new(ForceConfig::from(&settings.physics)),
            camera: Camera2D::new(&settings),
            input_state: InputState::new(),
            projection: GraphProjection::default(),
            renderer: GraphRenderer::new(&settings),
            spatial: SpatialIndex::new(),
            revision: None,
            path: HashSet::new(),
            on_path: Vec::new(),
            needs_initial_fit: true,
            settings,
        }
    }

    pub fn settings(&self) -> &GraphSettings {
        &self.settings
    }

    // =========================================================================
    // DATA
    // =========================================================================

    /// Rebuild the projection when the tree revision changes.
    ///
    /// Known nodes keep their positions. The first build of a topic starts
    /// hot and re-centres; later builds reheat gently so the layout adjusts
    /// rather than explodes.
    pub fn sync(&mut self, tree: Option<&ViewData>, revision: u64) {
        let Some(tree) = tree else {
            self.clear();
            return;
        };
        if self.revision == Some(revision) {
            return;
        }

        let previous_root = self.projection.nodes.first().map(|n| n.id.as_str());
        if previous_root.is_some_and(|id| id != tree.id) {
            tracing::debug!(topic = %tree.id, "topic changed, dropping old layout");
            self.input_state.cancel(&mut self.sim);
            self.sim.clear();
            self.spatial.clear();
        }

        let first = self.sim.is_empty();
        self.input_state.cancel(&mut self.sim);
        self.projection = GraphProjection::from_tree(tree);
        self.sim.set_graph(&self.projection);
        if first {
            self.sim.restart(1.0);
            self.needs_initial_fit = true;
        } else {
            let alpha = self.sim.alpha().max(self.settings.physics.resync_alpha);
            self.sim.restart(alpha);
        }
        self.revision = Some(revision);
        self.refresh_path_flags();
        tracing::debug!(
            nodes = self.projection.len(),
            revision,
            "graph projection rebuilt"
        );
    }

    /// Highlight the store's current path
    pub fn set_path(&mut self, ids: &[NodeId]) {
        self.path = ids.iter().cloned().collect();
        self.refresh_path_flags();
    }

    fn refresh_path_flags(&mut self) {
        self.on_path = self
            .projection
            .nodes
            .iter()
            .map(|n| self.path.contains(&n.id))
            .collect();
    }

    pub fn clear(&mut self) {
        self.input_state.cancel(&mut self.sim);
        self.sim.clear();
        self.spatial.clear();
        self.projection = GraphProjection::default();
        self.revision = None;
        self.on_path.clear();
        self.needs_initial_fit = true;
    }

    pub fn has_graph(&self) -> bool {
        !self.projection.is_empty()
    }

    pub fn projection(&self) -> &GraphProjection {
        &self.projection
    }

    pub fn simulation(&self) -> &ForceSimulation {
        &self.sim
    }

    // =========================================================================
    // SIMULATION
    // =========================================================================

    /// One tick if still warm; returns whether it ticked
    pub fn step(&mut self) -> bool {
        if self.sim.is_running() {
            self.sim.tick();
            true
        } else {
            false
        }
    }

    /// Tick until settled without rendering; returns ticks run
    pub fn run_headless(&mut self, max_ticks: usize) -> usize {
        self.sim.run_until_settled(max_ticks)
    }

    pub fn positions(&self) -> Vec<NodePosition> {
        self.projection
            .nodes
            .iter()
            .zip(self.sim.nodes())
            .map(|(node, sim_node)| NodePosition {
                id: node.id.clone(),
                label: node.label.clone(),
                depth: node.depth,
                x: sim_node.position.x,
                y: sim_node.position.y,
            })
            .collect()
    }

    fn rebuild_spatial(&mut self) {
        let nodes = &self.settings.nodes;
        let projection = &self.projection;
        self.spatial
            .rebuild(self.sim.nodes().iter().enumerate().map(|(i, n)| {
                let radius = projection
                    .nodes
                    .get(i)
                    .map(|p| lod::node_radius(&p.label, p.is_root(), false, nodes))
                    .unwrap_or(nodes.min_radius);
                SpatialNode::new(i, [n.position.x, n.position.y], radius)
            }));
    }

    fn id_at(&self, idx: usize) -> Option<NodeId> {
        self.projection.nodes.get(idx).map(|n| n.id.clone())
    }

    fn rewire_action(&self, rewire: &Rewire) -> Option<GraphAction> {
        Some(GraphAction::LinkRewired {
            node: self.id_at(rewire.node)?,
            attached_to: self.id_at(rewire.attached_to)?,
            detached_from: rewire
                .detached_from
                .iter()
                .filter_map(|&i| self.id_at(i))
                .collect(),
        })
    }

    // =========================================================================
    // UI
    // =========================================================================

    pub fn ui(&mut self, ui: &mut egui::Ui) -> Vec<GraphAction> {
        let mut actions = Vec::new();
        if !self.has_graph() {
            ui.centered_and_justified(|ui| {
                ui.label("No topic loaded");
            });
            return actions;
        }

        let available = ui.available_size();
        let (response, painter) = ui.allocate_painter(available, Sense::click_and_drag());
        let screen_rect = response.rect;

        // World origin maps to the widget center until the user pans
        if self.needs_initial_fit {
            self.sim.center = Pos2::ZERO;
            self.camera.reset();
            self.camera.snap_to_target();
            self.needs_initial_fit = false;
        }

        let dt = ui.input(|i| i.stable_dt);
        self.camera.update(dt);
        let ticked = self.step();
        self.rebuild_spatial();

        let outcome = InputHandler::handle_input(
            &response,
            &mut self.camera,
            &mut self.input_state,
            &mut self.sim,
            &self.spatial,
            &self.settings,
            screen_rect,
        );

        if let Some(id) = outcome.clicked.and_then(|idx| self.id_at(idx)) {
            actions.push(GraphAction::NodeClicked(id));
        }
        if let Some(action) = outcome
            .rewire
            .as_ref()
            .and_then(|rewire| self.rewire_action(rewire))
        {
            actions.push(action);
        }
        if outcome.fit_requested {
            let padding = self.settings.nodes.root_radius + self.settings.zoom.fit_padding;
            self.camera
                .fit_to_bounds(self.sim.bounds().expand(padding), screen_rect, 0.0);
        }

        if self.input_state.dragged_node().is_some() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::Grabbing);
        } else if self.input_state.hovered.is_some() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
        }

        let scene = RenderScene {
            projection: &self.projection,
            sim: &self.sim,
            camera: &self.camera,
            screen_rect,
            on_path: &self.on_path,
            hovered: self.input_state.hovered,
        };
        self.renderer.render(&painter, &scene, &self.settings);
        self.renderer.render_chrome(&painter, &scene);

        if ticked || outcome.needs_repaint || self.camera.is_animating() {
            ui.ctx().request_repaint();
        }
        actions
    }
}
