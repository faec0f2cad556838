//! Layout engine for automatic node placement
//!
//! Nodes are grouped into lanes by how deep a traversal along their links
//! first reaches them, then placed lane by lane along the chosen axis.

pub mod config;
mod engine;
mod lanes;

pub use config::LayoutConfig;
pub use engine::auto_layout;
pub use lanes::{assign_lanes, LaneAssignment, RevisitEdge};
