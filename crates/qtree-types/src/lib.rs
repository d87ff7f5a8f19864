//! Shared API Types for qtree
//!
//! This crate is the SINGLE SOURCE OF TRUTH for all types crossing the HTTP
//! boundary, plus the recursive view model every client surface reads.
//!
//! ## Representations
//!
//! ```text
//! ┌──────────────────────┐  transform   ┌──────────────┐  project   ┌──────────────┐
//! │ TopicTreeResponse    │ ───────────► │ ViewData     │ ─────────► │ graph nodes  │
//! │ (flat node map)      │              │ (recursive)  │            │ + links      │
//! └──────────────────────┘              └──────────────┘            └──────────────┘
//! ```
//!
//! ## Rules
//!
//! 1. All wire types live here - no inline struct definitions in clients
//! 2. camelCase on the wire, snake_case in Rust
//! 3. Node variants are an explicit enum; field presence is only consulted
//!    while decoding, never by consumers

pub mod api;
pub mod tree;
pub mod view;

pub use api::*;
pub use tree::*;
pub use view::*;

/// Server-assigned node identifier (topic or question).
pub type NodeId = String;
