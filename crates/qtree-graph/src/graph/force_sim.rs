//! Force Simulation for the question graph
//!
//! Velocity-Verlet style layout with an "alpha" temperature that cools toward
//! `alpha_target` every tick. Forces, in application order:
//! - link: springs pulling each parent/child pair toward `link_distance`
//! - charge: pairwise repulsion (exact O(n²); trees here stay in the hundreds)
//! - center: shifts the whole layout so its centroid sits on `center`
//! - collision: keeps node discs of `collision_radius` from overlapping
//!
//! The simulation stops moving once alpha drops below `alpha_min`. Dragging
//! holds alpha up via `alpha_target`; any disturbance can reheat it.
//!
//! # Usage
//! ```ignore
//! let mut sim = ForceSimulation::new(ForceConfig::from(&settings.physics));
//! sim.set_graph(&GraphProjection::from_tree(&tree));
//!
//! // Each frame:
//! if sim.is_running() {
//!     sim.tick();
//! }
//! for node in sim.nodes() {
//!     draw_circle(node.position);
//! }
//! ```

use std::collections::HashMap;

use egui::{Pos2, Rect, Vec2};
use qtree_types::NodeId;

use super::projection::GraphProjection;
use crate::config::PhysicsSettings;

/// Golden angle, used for the initial phyllotaxis placement
const INITIAL_ANGLE: f32 = 2.399_963;
const INITIAL_RADIUS: f32 = 10.0;

// =============================================================================
// SIMULATION NODE / LINK
// =============================================================================

#[derive(Debug, Clone)]
pub struct SimNode {
    pub id: NodeId,
    /// Current position (updated by the simulation)
    pub position: Pos2,
    velocity: Vec2,
    /// While set, the node is held at this point
    pub fixed: Option<Pos2>,
}

impl SimNode {
    pub fn new(id: impl Into<NodeId>, position: Pos2) -> Self {
        Self {
            id: id.into(),
            position,
            velocity: Vec2::ZERO,
            fixed: None,
        }
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn is_fixed(&self) -> bool {
        self.fixed.is_some()
    }
}

/// Link between two node indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SimLink {
    pub source: usize,
    pub target: usize,
}

impl SimLink {
    pub fn touches(&self, idx: usize) -> bool {
        self.source == idx || self.target == idx
    }

    pub fn other(&self, idx: usize) -> Option<usize> {
        if self.source == idx {
            Some(self.target)
        } else if self.target == idx {
            Some(self.source)
        } else {
            None
        }
    }
}

// =============================================================================
// SIMULATION CONFIG
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ForceConfig {
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
    /// Fraction of velocity lost per tick
    pub velocity_decay: f32,
}

impl Default for ForceConfig {
    fn default() -> Self {
        Self::from(&PhysicsSettings::default())
    }
}

impl From<&PhysicsSettings> for ForceConfig {
    fn from(physics: &PhysicsSettings) -> Self {
        Self {
            link_distance: physics.link_distance,
            link_strength: physics.link_strength,
            charge_strength: physics.charge_strength,
            charge_distance_min: physics.charge_distance_min,
            collision_radius: physics.collision_radius,
            collision_strength: physics.collision_strength,
            center_strength: physics.center_strength,
            alpha_min: physics.alpha_min,
            alpha_decay: physics.alpha_decay,
            velocity_decay: physics.velocity_decay,
        }
    }
}

// =============================================================================
// FORCE SIMULATION
// =============================================================================

#[derive(Debug, Clone)]
pub struct ForceSimulation {
    nodes: Vec<SimNode>,
    links: Vec<SimLink>,
    /// First index of each id
    node_index: HashMap<NodeId, usize>,

    pub config: ForceConfig,

    /// Layout centroid target
    pub center: Pos2,

    alpha: f32,
    alpha_target: f32,

    jiggle: Jiggle,
}

impl Default for ForceSimulation {
    fn default() -> Self {
        Self::new(ForceConfig::default())
    }
}

impl ForceSimulation {
    pub fn new(config: ForceConfig) -> Self {
        Self {
            nodes: Vec::new(),
            links: Vec::new(),
            node_index: HashMap::new(),
            config,
            center: Pos2::ZERO,
            alpha: 1.0,
            alpha_target: 0.0,
            jiggle: Jiggle::default(),
        }
    }

    // =========================================================================
    // GRAPH MANAGEMENT
    // =========================================================================

    /// Replace nodes and links with a new projection.
    ///
    /// Nodes whose id was already simulated keep their position and
    /// velocity. New nodes start next to their parent (or around the center
    /// for the root). Pins are dropped.
    pub fn set_graph(&mut self, projection: &GraphProjection) {
        let previous: HashMap<NodeId, (Pos2, Vec2)> = self
            .nodes
            .drain(..)
            .map(|n| (n.id, (n.position, n.velocity)))
            .collect();

        let mut nodes: Vec<SimNode> = Vec::with_capacity(projection.len());
        for (i, projected) in projection.nodes.iter().enumerate() {
            let node = match previous.get(&projected.id) {
                Some(&(position, velocity)) => SimNode {
                    id: projected.id.clone(),
                    position,
                    velocity,
                    fixed: None,
                },
                None => {
                    let anchor = projected
                        .parent
                        .map(|p| nodes[p].position)
                        .unwrap_or(self.center);
                    SimNode::new(projected.id.clone(), anchor + phyllotaxis(i))
                }
            };
            nodes.push(node);
        }

        self.nodes = nodes;
        self.links = projection
            .links
            .iter()
            .map(|l| SimLink {
                source: l.source,
                target: l.target,
            })
            .collect();
        self.reindex();
    }

    /// Add a free-standing node (tests and headless use)
    pub fn add_node(&mut self, mut node: SimNode) -> usize {
        if node.position == Pos2::ZERO {
            node.position = self.center + phyllotaxis(self.nodes.len());
        }
        let idx = self.nodes.len();
        self.node_index.entry(node.id.clone()).or_insert(idx);
        self.nodes.push(node);
        idx
    }

    pub fn add_link(&mut self, source: usize, target: usize) {
        if source != target && source < self.nodes.len() && target < self.nodes.len() {
            self.links.push(SimLink { source, target });
        }
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.links.clear();
        self.node_index.clear();
    }

    fn reindex(&mut self) {
        self.node_index.clear();
        for (i, node) in self.nodes.iter().enumerate() {
            self.node_index.entry(node.id.clone()).or_insert(i);
        }
    }

    pub fn nodes(&self) -> &[SimNode] {
        &self.nodes
    }

    pub fn links(&self) -> &[SimLink] {
        &self.links
    }

    pub fn node(&self, idx: usize) -> Option<&SimNode> {
        self.nodes.get(idx)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.node_index.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn is_linked(&self, a: usize, b: usize) -> bool {
        self.links
            .iter()
            .any(|l| (l.source == a && l.target == b) || (l.source == b && l.target == a))
    }

    pub fn neighbors(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
        self.links.iter().filter_map(move |l| l.other(idx))
    }

    /// Remove every link touching `idx` and link it to `to` instead.
    /// Returns the indices it was detached from.
    pub fn rewire(&mut self, idx: usize, to: usize) -> Vec<usize> {
        let detached: Vec<usize> = self.neighbors(idx).collect();
        self.links.retain(|l| !l.touches(idx));
        self.add_link(to, idx);
        detached
    }

    /// World-space bounding box of all node centers
    pub fn bounds(&self) -> Rect {
        let mut bounds = Rect::NOTHING;
        for node in &self.nodes {
            bounds.extend_with(node.position);
        }
        bounds
    }

    // =========================================================================
    // TEMPERATURE
    // =========================================================================

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn alpha_target(&self) -> f32 {
        self.alpha_target
    }

    /// Set alpha directly (reheat)
    pub fn restart(&mut self, alpha: f32) {
        self.alpha = alpha.clamp(0.0, 1.0);
    }

    pub fn set_alpha_target(&mut self, target: f32) {
        self.alpha_target = target.clamp(0.0, 1.0);
    }

    /// Still moving?
    pub fn is_running(&self) -> bool {
        !self.nodes.is_empty() && self.alpha >= self.config.alpha_min
    }

    // =========================================================================
    // SIMULATION
    // =========================================================================

    /// One simulation step
    pub fn tick(&mut self) {
        if self.nodes.is_empty() {
            return;
        }
        self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;

        self.apply_link_force();
        self.apply_charge_force();
        self.apply_center_force();
        self.apply_collision_force();

        let keep = 1.0 - self.config.velocity_decay;
        for node in &mut self.nodes {
            match node.fixed {
                Some(pos) => {
                    node.position = pos;
                    node.velocity = Vec2::ZERO;
                }
                None => {
                    node.velocity *= keep;
                    node.position += node.velocity;
                }
            }
        }
    }

    /// Tick until cool or `max_ticks`; returns ticks run
    pub fn run_until_settled(&mut self, max_ticks: usize) -> usize {
        let mut ticks = 0;
        while ticks < max_ticks && self.is_running() {
            self.tick();
            ticks += 1;
        }
        ticks
    }

    fn apply_link_force(&mut self) {
        if self.links.is_empty() {
            return;
        }
        let mut degree = vec![0usize; self.nodes.len()];
        for link in &self.links {
            degree[link.source] += 1;
            degree[link.target] += 1;
        }

        let scale = self.alpha * self.config.link_strength;
        for link in &self.links {
            let (s, t) = (link.source, link.target);
            let bias = degree[s] as f32 / (degree[s] + degree[t]) as f32;

            let source = &self.nodes[s];
            let target = &self.nodes[t];
            let mut delta = (target.position + target.velocity) - (source.position + source.velocity);
            if delta.x == 0.0 {
                delta.x = self.jiggle.next();
            }
            if delta.y == 0.0 {
                delta.y = self.jiggle.next();
            }
            let len = delta.length();
            let pull = delta * ((len - self.config.link_distance) / len * scale);

            self.nodes[t].velocity -= pull * bias;
            self.nodes[s].velocity += pull * (1.0 - bias);
        }
    }

    fn apply_charge_force(&mut self) {
        let n = self.nodes.len();
        let min2 = self.config.charge_distance_min * self.config.charge_distance_min;
        let scale = self.config.charge_strength * self.alpha;

        let mut impulses = vec![Vec2::ZERO; n];
        for i in 0..n {
            for j in (i + 1)..n {
                let mut delta = self.nodes[j].position - self.nodes[i].position;
                if delta.x == 0.0 {
                    delta.x = self.jiggle.next();
                }
                if delta.y == 0.0 {
                    delta.y = self.jiggle.next();
                }
                let mut dist2 = delta.length_sq();
                if dist2 < min2 {
                    dist2 = (min2 * dist2).sqrt();
                }
                let push = delta * (scale / dist2);
                impulses[i] += push;
                impulses[j] -= push;
            }
        }
        for (node, impulse) in self.nodes.iter_mut().zip(impulses) {
            node.velocity += impulse;
        }
    }

    fn apply_center_force(&mut self) {
        let n = self.nodes.len() as f32;
        let sum = self
            .nodes
            .iter()
            .fold(Vec2::ZERO, |acc, node| acc + node.position.to_vec2());
        let shift = (sum / n - self.center.to_vec2()) * self.config.center_strength;
        for node in &mut self.nodes {
            node.position -= shift;
        }
    }

    fn apply_collision_force(&mut self) {
        let n = self.nodes.len();
        let radius = self.config.collision_radius;
        let min_sep = radius * 2.0;
        // equal radii: each side takes half the correction
        let share = 0.5;

        for i in 0..n {
            let predicted = self.nodes[i].position + self.nodes[i].velocity;
            for j in (i + 1)..n {
                let other = self.nodes[j].position + self.nodes[j].velocity;
                let mut delta = predicted - other;
                let dist2 = delta.length_sq();
                if dist2 >= min_sep * min_sep {
                    continue;
                }
                if delta.x == 0.0 {
                    delta.x = self.jiggle.next();
                }
                if delta.y == 0.0 {
                    delta.y = self.jiggle.next();
                }
                let len = delta.length();
                let push = delta * ((min_sep - len) / len * self.config.collision_strength);
                self.nodes[i].velocity += push * share;
                self.nodes[j].velocity -= push * (1.0 - share);
            }
        }
    }

    // =========================================================================
    // HIT TESTING
    // =========================================================================

    /// Topmost node whose disc (radius from `radius_of`) contains `pos`
    pub fn node_at(&self, pos: Pos2, radius_of: impl Fn(usize) -> f32) -> Option<usize> {
        (0..self.nodes.len())
            .rev()
            .find(|&i| (pos - self.nodes[i].position).length() <= radius_of(i))
    }

    // =========================================================================
    // PINNING (for drag)
    // =========================================================================

    /// Hold a node where it is
    pub fn pin(&mut self, idx: usize) {
        if let Some(node) = self.nodes.get_mut(idx) {
            node.fixed = Some(node.position);
            node.velocity = Vec2::ZERO;
        }
    }

    /// Move a pinned node
    pub fn move_pinned(&mut self, idx: usize, pos: Pos2) {
        if let Some(node) = self.nodes.get_mut(idx) {
            node.fixed = Some(pos);
            node.position = pos;
        }
    }

    pub fn unpin(&mut self, idx: usize) {
        if let Some(node) = self.nodes.get_mut(idx) {
            node.fixed = None;
        }
    }
}

/// Offset of the `i`th node on a sunflower spiral
fn phyllotaxis(i: usize) -> Vec2 {
    let radius = INITIAL_RADIUS * (0.5 + i as f32).sqrt();
    Vec2::angled(i as f32 * INITIAL_ANGLE) * radius
}

/// Deterministic sub-pixel noise to break exact coincidences
#[derive(Debug, Clone)]
struct Jiggle(u32);

impl Default for Jiggle {
    fn default() -> Self {
        Self(0x9E37_79B9)
    }
}

impl Jiggle {
    fn next(&mut self) -> f32 {
        // xorshift32
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.0 = x;
        (x as f32 / u32::MAX as f32 - 0.5) * 1e-6
    }
}

// =============================================================================
// TESTS
// =============================================================================
