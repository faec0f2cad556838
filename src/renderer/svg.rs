//! SVG output for diagrams

use crate::geometry::{PointF, Rect, RectF};
use crate::model::{Diagram, NodeKind};
use crate::routing::Fragment;
use crate::tools::{Guideline, Overlay};

use super::{export_bounds, render_diagram, LinkView, NodeView, Renderer, SvgConfig};

/// Radius of the dot drawn at a connector's source anchor
const SOURCE_DOT_RADIUS: f64 = 2.0;

/// Inset of an end node's filled core
const END_CORE_INSET: i32 = 5;

/// Build SVG elements incrementally
pub struct SvgBuilder {
    config: SvgConfig,
    defs: Vec<String>,
    styles: Vec<String>,
    elements: Vec<String>,
    indent: usize,
}

impl SvgBuilder {
    /// Create a new SVG builder
    pub fn new(config: SvgConfig) -> Self {
        Self {
            config,
            defs: vec![],
            styles: vec![],
            elements: vec![],
            indent: 1,
        }
    }

    pub fn prefix(&self) -> String {
        self.config.class_prefix.clone().unwrap_or_default()
    }

    /// Prefixed class name
    pub fn class(&self, name: &str) -> String {
        format!("{}{}", self.prefix(), name)
    }

    fn indent_str(&self) -> String {
        if self.config.pretty_print {
            "  ".repeat(self.indent)
        } else {
            String::new()
        }
    }

    fn newline(&self) -> &str {
        if self.config.pretty_print {
            "\n"
        } else {
            ""
        }
    }

    /// Add the built-in stylesheet for the prefixed classes
    pub fn add_default_styles(&mut self) {
        let p = self.prefix();
        let rules = [
            format!(".{p}node {{ fill: #f2f2f2; stroke: #000; stroke-width: 1; }}"),
            format!(".{p}container {{ fill: #dcdcdc; }}"),
            format!(".{p}start, .{p}end-core {{ fill: #000; }}"),
            format!(".{p}end, .{p}branch {{ fill: none; }}"),
            format!(".{p}selected, .{p}selected .{p}end-core {{ stroke: #f00; }}"),
            format!(".{p}selected.{p}start, .{p}selected .{p}end-core {{ fill: #f00; }}"),
            format!(".{p}link path, .{p}link ellipse {{ fill: none; stroke: #000; stroke-width: 1; }}"),
            format!(".{p}link.{p}selected path, .{p}link.{p}selected ellipse {{ stroke: #f00; }}"),
            format!(".{p}label {{ font: 12px sans-serif; fill: #000; stroke: none; }}"),
            format!(".{p}branch-label {{ font-size: 6px; }}"),
            format!(".{p}rubber-band {{ fill: none; stroke: #008000; }}"),
            format!(".{p}pending-link {{ stroke: #f00; }}"),
            format!(".{p}guideline {{ stroke: #32cd32; }}"),
        ];
        self.styles.extend(rules);
    }

    /// Add the arrow marker definition for connector ends
    pub fn add_arrow_marker(&mut self) {
        let prefix = self.prefix();
        // orient="auto" turns the arrow along the last segment of the path;
        // context-stroke makes it follow the selection colour
        self.defs.push(format!(
            r#"<marker id="{prefix}arrow" viewBox="0 0 10 10" refX="8" refY="5" markerWidth="6" markerHeight="6" markerUnits="strokeWidth" orient="auto"><path d="M0,0 L10,5 L0,10 Z" fill="context-stroke"/></marker>"#
        ));
    }

    fn class_attr(classes: &[String]) -> String {
        if classes.is_empty() {
            String::new()
        } else {
            format!(r#" class="{}""#, classes.join(" "))
        }
    }

    /// Add a rectangle element
    pub fn add_rect(&mut self, rect: RectF, classes: &[String]) {
        self.elements.push(format!(
            r#"{}<rect{} x="{}" y="{}" width="{}" height="{}"/>"#,
            self.indent_str(),
            Self::class_attr(classes),
            num(rect.x),
            num(rect.y),
            num(rect.width),
            num(rect.height),
        ));
    }

    /// Add an ellipse inscribed in `rect`
    pub fn add_ellipse(&mut self, rect: RectF, classes: &[String]) {
        let rx = rect.width / 2.0;
        let ry = rect.height / 2.0;
        self.elements.push(format!(
            r#"{}<ellipse{} cx="{}" cy="{}" rx="{}" ry="{}"/>"#,
            self.indent_str(),
            Self::class_attr(classes),
            num(rect.x + rx),
            num(rect.y + ry),
            num(rx),
            num(ry),
        ));
    }

    /// Add a line element
    pub fn add_line(&mut self, a: PointF, b: PointF, classes: &[String]) {
        self.elements.push(format!(
            r#"{}<line{} x1="{}" y1="{}" x2="{}" y2="{}"/>"#,
            self.indent_str(),
            Self::class_attr(classes),
            num(a.x),
            num(a.y),
            num(b.x),
            num(b.y),
        ));
    }

    /// Add text centred in `rect`
    pub fn add_text(&mut self, text: &str, rect: RectF, classes: &[String]) {
        if text.is_empty() {
            return;
        }
        self.elements.push(format!(
            r#"{}<text{} x="{}" y="{}" text-anchor="middle" dominant-baseline="middle">{}</text>"#,
            self.indent_str(),
            Self::class_attr(classes),
            num(rect.x + rect.width / 2.0),
            num(rect.y + rect.height / 2.0),
            escape_xml(text)
        ));
    }

    /// Add a polyline path, optionally ending in the arrow marker
    pub fn add_path(&mut self, path: &[PointF], marker_end: bool) {
        if path.is_empty() {
            return;
        }
        let marker = if marker_end {
            format!(r#" marker-end="url(#{}arrow)""#, self.prefix())
        } else {
            String::new()
        };
        self.elements.push(format!(
            r#"{}<path d="{}"{}/>"#,
            self.indent_str(),
            path_to_d(path),
            marker
        ));
    }

    /// Add a group element with optional ID and classes
    pub fn start_group(&mut self, id: Option<&str>, classes: &[String]) {
        let id_attr = id.map(|i| format!(r#" id="{}""#, i)).unwrap_or_default();
        self.elements.push(format!(
            "{}<g{}{}>",
            self.indent_str(),
            id_attr,
            Self::class_attr(classes)
        ));
        self.indent += 1;
    }

    /// Close a group element
    pub fn end_group(&mut self) {
        self.indent = self.indent.saturating_sub(1);
        self.elements.push(format!("{}</g>", self.indent_str()));
    }

    /// Build the final SVG string
    pub fn build(self, viewbox: Rect) -> String {
        let padding = self.config.margin;
        let vb_x = viewbox.x as f64 - padding;
        let vb_y = viewbox.y as f64 - padding;
        let vb_w = viewbox.width as f64 + 2.0 * padding;
        let vb_h = viewbox.height as f64 + 2.0 * padding;

        let nl = self.newline();
        let (pad, inner) = if self.config.pretty_print {
            ("  ", "    ")
        } else {
            ("", "")
        };

        let mut svg = String::new();

        if self.config.xml_declaration {
            svg.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
            svg.push_str(nl);
        }

        svg.push_str(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{} {} {} {}" width="{}" height="{}">"#,
            num(vb_x),
            num(vb_y),
            num(vb_w),
            num(vb_h),
            num(vb_w),
            num(vb_h)
        ));
        svg.push_str(nl);

        if !self.styles.is_empty() {
            svg.push_str(pad);
            svg.push_str("<style>");
            svg.push_str(nl);
            for style in &self.styles {
                svg.push_str(inner);
                svg.push_str(style);
                svg.push_str(nl);
            }
            svg.push_str(pad);
            svg.push_str("</style>");
            svg.push_str(nl);
        }

        if !self.defs.is_empty() {
            svg.push_str(pad);
            svg.push_str("<defs>");
            svg.push_str(nl);
            for def in &self.defs {
                svg.push_str(inner);
                svg.push_str(def);
                svg.push_str(nl);
            }
            svg.push_str(pad);
            svg.push_str("</defs>");
            svg.push_str(nl);
        }

        for elem in &self.elements {
            svg.push_str(elem);
            svg.push_str(nl);
        }

        svg.push_str("</svg>");

        svg
    }
}

/// A [`Renderer`] that writes SVG
pub struct SvgRenderer {
    builder: SvgBuilder,
    viewport: Rect,
}

impl SvgRenderer {
    pub fn new(config: SvgConfig, viewport: Rect) -> Self {
        let embed = config.embed_styles;
        let mut builder = SvgBuilder::new(config);
        if embed {
            builder.add_default_styles();
        }
        builder.add_arrow_marker();
        Self { builder, viewport }
    }

    pub fn finish(self) -> String {
        self.builder.build(self.viewport)
    }

    fn node_classes(&self, view: &NodeView<'_>) -> Vec<String> {
        let mut classes = vec![
            self.builder.class("node"),
            self.builder.class(&view.node.variant().to_string()),
        ];
        if view.selected {
            classes.push(self.builder.class("selected"));
        }
        classes
    }
}

/// Split fragments into runs of connected pieces. Each run is a polyline
/// plus whether it ends in the terminal fragment.
fn fragment_runs(fragments: &[Fragment]) -> Vec<(Vec<PointF>, bool)> {
    let mut runs: Vec<(Vec<PointF>, bool)> = Vec::new();
    for fragment in fragments {
        let continues = runs
            .last()
            .is_some_and(|(points, _)| points.last() == Some(&fragment.start));
        match runs.last_mut() {
            Some((points, terminal)) if continues => {
                points.push(fragment.end);
                *terminal = fragment.is_terminal();
            }
            _ => runs.push((vec![fragment.start, fragment.end], fragment.is_terminal())),
        }
    }
    runs
}

impl Renderer for SvgRenderer {
    fn draw_link(&mut self, link: &LinkView) {
        let mut classes = vec![self.builder.class("link")];
        if link.selected {
            classes.push(self.builder.class("selected"));
        }
        self.builder.start_group(None, &classes);
        let source = link.source.to_f();
        self.builder.add_ellipse(
            RectF::new(
                source.x - SOURCE_DOT_RADIUS,
                source.y - SOURCE_DOT_RADIUS,
                2.0 * SOURCE_DOT_RADIUS,
                2.0 * SOURCE_DOT_RADIUS,
            ),
            &[],
        );
        for (points, terminal) in fragment_runs(&link.fragments) {
            self.builder.add_path(&points, terminal);
        }
        self.builder.end_group();
    }

    fn draw_node(&mut self, view: &NodeView<'_>) {
        let id = format!("node-{}", view.id.index());
        let classes = self.node_classes(view);
        let label = [self.builder.class("label")];
        let area = super::to_rect_f(view.area);

        self.builder.start_group(Some(&id), &classes);
        match view.node.kind() {
            NodeKind::Start { .. } => self.builder.add_ellipse(area, &[]),
            NodeKind::End => {
                let core = view.area.inflate(-END_CORE_INSET, -END_CORE_INSET);
                self.builder.add_ellipse(area, &[]);
                self.builder
                    .add_ellipse(super::to_rect_f(core), &[self.builder.class("end-core")]);
            }
            NodeKind::Text { .. } => {
                self.builder.add_rect(area, &[]);
                self.builder.add_text(view.node.text(), view.text_area, &label);
            }
            NodeKind::Condition { branches } => {
                self.builder.add_rect(area, &[]);
                self.builder.add_text(view.node.text(), view.text_area, &label);
                let branch_label = [self.builder.class("label"), self.builder.class("branch-label")];
                for (branch, cell) in branches.iter().zip(&view.branch_cells) {
                    let inset = RectF::new(cell.x, cell.y + 1.0, cell.width, cell.height - 2.0);
                    self.builder.add_rect(inset, &[self.builder.class("branch")]);
                    self.builder.add_text(&branch.text, *cell, &branch_label);
                }
            }
            NodeKind::Container(_) => {
                self.builder.add_rect(area, &[]);
                self.builder.add_text(view.node.text(), view.text_area, &label);
                let y = view.text_area.y + view.text_area.height;
                self.builder.add_line(
                    PointF::new(area.x, y),
                    PointF::new(area.x + area.width, y),
                    &[],
                );
            }
        }
        self.builder.end_group();
    }

    fn draw_overlay(&mut self, overlay: &Overlay) {
        if let Some(band) = overlay.rubber_band {
            self.builder
                .add_rect(super::to_rect_f(band), &[self.builder.class("rubber-band")]);
        }
        if let Some((from, to)) = overlay.pending_link {
            self.builder
                .add_line(from.to_f(), to.to_f(), &[self.builder.class("pending-link")]);
        }
        let view = self.viewport;
        for guideline in &overlay.guidelines {
            let (a, b) = match *guideline {
                Guideline::Vertical(x) => (
                    PointF::new(x as f64, view.top() as f64),
                    PointF::new(x as f64, view.bottom() as f64),
                ),
                Guideline::Horizontal(y) => (
                    PointF::new(view.left() as f64, y as f64),
                    PointF::new(view.right() as f64, y as f64),
                ),
            };
            self.builder.add_line(a, b, &[self.builder.class("guideline")]);
        }
    }
}

/// Render the whole diagram to an SVG string
pub fn render_svg(diagram: &Diagram, config: &SvgConfig) -> String {
    render_svg_with_overlay(diagram, &Overlay::default(), config)
}

/// Render the whole diagram plus a tool overlay to an SVG string
pub fn render_svg_with_overlay(diagram: &Diagram, overlay: &Overlay, config: &SvgConfig) -> String {
    let viewport = export_bounds(diagram);
    let mut renderer = SvgRenderer::new(config.clone(), viewport);
    render_diagram(diagram, viewport, &mut renderer);
    if !overlay.is_empty() {
        renderer.draw_overlay(overlay);
    }
    renderer.finish()
}

/// Format a coordinate with at most two decimals
fn num(value: f64) -> String {
    let text = format!("{:.2}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

/// Convert a path of points to an SVG path d attribute
fn path_to_d(path: &[PointF]) -> String {
    let Some((first, rest)) = path.split_first() else {
        return String::new();
    };
    let mut d = format!("M{} {}", num(first.x), num(first.y));
    for point in rest {
        d.push_str(&format!(" L{} {}", num(point.x), num(point.y)));
    }
    d
}

/// Escape special XML characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
