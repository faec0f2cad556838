//! Diagram configuration loaded from TOML
//!
//! Every field is optional; missing values fall back to the defaults in
//! [`DEFAULT_CONFIG`].

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::geometry::Size;
use crate::layout::LayoutConfig;
use crate::renderer::SvgConfig;
use crate::routing::{LineType, DEFAULT_BEZIER_FRAGMENTS};

/// The built-in configuration, spelled out
pub const DEFAULT_CONFIG: &str = r#"
# Positions and sizes snap to multiples of this cell
grid_size = [8, 8]

# Default node size before grid snapping
node_size = [100, 50]

# "bezier", "four-way" or "straight"
line_type = "bezier"

zoom = 1.0
bezier_fragments = 100

[layout]
lane_gap = 0.5
dodge_attempts = 5
sample_skip = 0.25
sample_take = 0.5

[svg]
margin = 0.0
xml_declaration = true
pretty_print = true
class_prefix = "nd-"
embed_styles = true
"#;

/// Settings a [`Diagram`](crate::Diagram) is created with
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiagramConfig {
    pub grid_size: [i32; 2],
    pub node_size: [i32; 2],
    pub line_type: LineType,
    pub zoom: f32,
    pub bezier_fragments: usize,
    pub layout: LayoutConfig,
    pub svg: SvgConfig,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            grid_size: [8, 8],
            node_size: [100, 50],
            line_type: LineType::default(),
            zoom: 1.0,
            bezier_fragments: DEFAULT_BEZIER_FRAGMENTS,
            layout: LayoutConfig::default(),
            svg: SvgConfig::default(),
        }
    }
}

impl DiagramConfig {
    /// Load a configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse a configuration from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn grid_size(&self) -> Size {
        Size::new(self.grid_size[0], self.grid_size[1])
    }

    /// Default node size as configured, before grid snapping
    pub fn node_size(&self) -> Size {
        Size::new(self.node_size[0], self.node_size[1])
    }

    pub fn with_grid_size(mut self, width: i32, height: i32) -> Self {
        self.grid_size = [width, height];
        self
    }

    pub fn with_node_size(mut self, width: i32, height: i32) -> Self {
        self.node_size = [width, height];
        self
    }

    pub fn with_line_type(mut self, line_type: LineType) -> Self {
        self.line_type = line_type;
        self
    }

    pub fn with_zoom(mut self, zoom: f32) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_svg(mut self, svg: SvgConfig) -> Self {
        self.svg = svg;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config_text_matches_default() {
        let parsed = DiagramConfig::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(parsed, DiagramConfig::default());
    }

    #[test]
    fn test_partial_config() {
        let config = DiagramConfig::from_str(
            r#"
            line_type = "four-way"
            [layout]
            dodge_attempts = 2
            "#,
        )
        .unwrap();
        assert_eq!(config.line_type, LineType::FourWay);
        assert_eq!(config.layout.dodge_attempts, 2);
        assert_eq!(config.layout.sample_skip, 0.25);
        assert_eq!(config.grid_size(), Size::new(8, 8));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let result = DiagramConfig::from_str("colour = 'red'");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = DiagramConfig::from_file("/nonexistent/diagram.toml");
        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }
}
