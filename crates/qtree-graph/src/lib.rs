//! qtree Graph Widget
//!
//! This crate contains ONLY the graph widget and its layout engine - no API,
//! no store. The widget reads a `ViewData` tree and reports user intents
//! back as [`GraphAction`]s.

pub mod config;
pub mod graph;

pub use config::{global_config, init_global, GraphSettings};
pub use graph::{
    // Core widget
    GraphAction,
    NodePosition,
    QuestionGraphWidget,
    // Layout engine
    ForceConfig,
    ForceSimulation,
    GraphProjection,
    // Camera and animation
    Camera2D,
    SpringConfig,
    SpringF32,
    SpringVec2,
};
