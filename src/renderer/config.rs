//! Output settings for the SVG renderer, read from the `[svg]` table

use serde::Deserialize;

/// How a diagram is written out as SVG
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SvgConfig {
    /// Extra space around the exported area, in model units. The export
    /// area already leaves one default node size on every side.
    pub margin: f64,

    /// Emit `<?xml ...?>` before the root element
    pub xml_declaration: bool,

    /// One element per line, indented by group depth
    pub pretty_print: bool,

    /// Prepended to every class the renderer emits, and to the arrowhead
    /// marker id. `None` leaves classes bare.
    pub class_prefix: Option<String>,

    /// Embed the built-in node and connector styles in a `<style>` block
    pub embed_styles: bool,
}

impl Default for SvgConfig {
    fn default() -> Self {
        Self {
            margin: 0.0,
            xml_declaration: true,
            pretty_print: true,
            class_prefix: Some("nd-".to_string()),
            embed_styles: true,
        }
    }
}

impl SvgConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    pub fn with_xml_declaration(mut self, declare: bool) -> Self {
        self.xml_declaration = declare;
        self
    }

    pub fn with_pretty_print(mut self, pretty: bool) -> Self {
        self.pretty_print = pretty;
        self
    }

    pub fn with_class_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.class_prefix = Some(prefix.into());
        self
    }

    /// Emit bare class names such as `node` and `link`
    pub fn without_class_prefix(mut self) -> Self {
        self.class_prefix = None;
        self
    }

    /// Leave styling to an external stylesheet
    pub fn with_embedded_styles(mut self, embed: bool) -> Self {
        self.embed_styles = embed;
        self
    }
}
