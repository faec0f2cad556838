//! Configuration for the layout engine

use serde::Deserialize;

/// Tuning knobs for [`auto_layout`](super::auto_layout)
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    /// Gap between lanes, as a fraction of the default node extent
    pub lane_gap: f64,

    /// How often a node is nudged off a crossing connector before giving up
    pub dodge_attempts: usize,

    /// Fraction of each connector's fragments skipped before sampling
    pub sample_skip: f64,

    /// Fraction of each connector's fragments sampled for overlap checks
    pub sample_take: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            lane_gap: 0.5,
            dodge_attempts: 5,
            sample_skip: 0.25,
            sample_take: 0.5,
        }
    }
}

impl LayoutConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the gap between lanes
    pub fn with_lane_gap(mut self, gap: f64) -> Self {
        self.lane_gap = gap;
        self
    }

    /// Set the number of overlap-dodge attempts per node
    pub fn with_dodge_attempts(mut self, attempts: usize) -> Self {
        self.dodge_attempts = attempts;
        self
    }

    /// Set the sampled window of each connector
    pub fn with_sample_window(mut self, skip: f64, take: f64) -> Self {
        self.sample_skip = skip;
        self.sample_take = take;
        self
    }
}
