//! Bakes every transform of a resolved [`Document`] into its path data.

use indexmap::IndexMap;
use serde::Serialize;
use svgflat_geom::{
    AffineTransform, Bounds, PathCommand, PathFormatter, TransformKind, arcs_to_cubics,
    has_rel_move_after_close, parse_path, path_bounds, transform_path,
};
use tracing::debug;

use crate::config::ConvertConfig;
use crate::diagnostics::Diagnostics;
use crate::gradient::{GradientTarget, place_gradient};
use crate::paint::{Paint, normalize_color, url_reference};
use crate::shapes;
use crate::tree::{Document, Node, NodeId, NodeKind, Viewport};

/// Presentation attributes passed through to the output untouched.
const PASSTHROUGH_ATTRIBUTES: &[&str] = &[
    "fill-rule",
    "stroke-linecap",
    "stroke-linejoin",
    "stroke-miterlimit",
];

const DEFAULT_FILL: &str = "#000000";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FillRule {
    NonZero,
    EvenOdd,
}

impl FillRule {
    /// Reads a normalized `clip-rule`/`fill-rule` value; anything but `evenOdd` is non-zero.
    pub fn from_attribute(value: Option<&str>) -> Self {
        match value {
            Some("evenOdd") => Self::EvenOdd,
            _ => Self::NonZero,
        }
    }
}

/// Clip geometry in flattened coordinates. Paths list the clips they are drawn through.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlatClipPath {
    /// Id of the `<clipPath>` element.
    pub id: Option<String>,
    /// Every clip child with this rule, joined. Empty data clips everything away.
    pub path_data: String,
    pub fill_rule: FillRule,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlatPath {
    pub id: Option<String>,
    pub path_data: String,
    pub fill: Paint,
    pub stroke: Paint,
    /// Present when the path is stroked.
    pub stroke_width: Option<f64>,
    pub fill_opacity: f64,
    pub stroke_opacity: f64,
    pub attrs: IndexMap<String, String>,
    /// Indices into [`Drawable::clip_paths`], outermost first. The path shows only where all of
    /// them overlap.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub clips: Vec<usize>,
}

/// The flattened drawing: a list of paths in view box coordinates translated to the origin.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Drawable {
    pub width: f64,
    pub height: f64,
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub paths: Vec<FlatPath>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub clip_paths: Vec<FlatClipPath>,
}

pub fn flatten(doc: &Document, config: &ConvertConfig, diagnostics: &mut Diagnostics) -> Drawable {
    let viewport = doc.viewport;
    let mut drawable = Drawable {
        width: viewport.width,
        height: viewport.height,
        ..Drawable::default()
    };

    let mut leaves = 0usize;
    if let Some(vb) = viewport.view_box {
        drawable.viewport_width = vb.width;
        drawable.viewport_height = vb.height;
        let formatter = match config.fraction_digits() {
            Some(digits) => PathFormatter::with_fraction_digits(digits),
            None => PathFormatter::for_viewport(vb.width, vb.height),
        };
        let mut pass = FlattenPass {
            doc,
            config,
            diagnostics: &mut *diagnostics,
            formatter,
            root_transform: AffineTransform::from_translation(-vb.x, -vb.y),
            viewport,
            paths: Vec::new(),
            clip_paths: Vec::new(),
        };
        leaves = pass.run();
        drawable.paths = pass.paths;
        drawable.clip_paths = pass.clip_paths;
    }

    if leaves == 0 {
        diagnostics.error(0, "No vector content found");
    }
    debug!(leaves, paths = drawable.paths.len(), "document flattened");
    drawable
}

struct FlattenPass<'a> {
    doc: &'a Document,
    config: &'a ConvertConfig,
    diagnostics: &'a mut Diagnostics,
    formatter: PathFormatter,
    root_transform: AffineTransform,
    viewport: Viewport,
    paths: Vec<FlatPath>,
    clip_paths: Vec<FlatClipPath>,
}

impl FlattenPass<'_> {
    /// Walks the rendered tree and returns how many leaves it reached.
    fn run(&mut self) -> usize {
        let doc = self.doc;
        let mut leaves = 0;
        let mut stack: Vec<(NodeId, AffineTransform, Vec<usize>)> =
            vec![(doc.root(), AffineTransform::identity(), Vec::new())];
        while let Some((id, parent, mut clips)) = stack.pop() {
            let node = doc.node(id);
            if node.is_definition() {
                continue;
            }
            let mut stacked = parent;
            stacked.concatenate(&node.local_transform);
            if let Some(reference) = node.clip_path.as_deref() {
                self.apply_clip(node, reference, &stacked, &mut clips);
            }
            match node.kind {
                NodeKind::Group | NodeKind::Use => {
                    for &child in node.children.iter().rev() {
                        stack.push((child, stacked.clone(), clips.clone()));
                    }
                }
                NodeKind::Leaf => {
                    leaves += 1;
                    self.flatten_leaf(node, stacked, clips);
                }
                NodeKind::Gradient(_) | NodeKind::ClipPath => {}
            }
        }
        leaves
    }

    /// Flattens the referenced clip path in the user space of `node` and records its entries in
    /// `clips`. Identical clip geometry is shared between paths.
    fn apply_clip(
        &mut self,
        node: &Node,
        reference: &str,
        stacked: &AffineTransform,
        clips: &mut Vec<usize>,
    ) {
        let doc = self.doc;
        let Some(clip_id) = doc.get_by_id(reference) else {
            if !doc.is_ignored_id(reference) {
                self.diagnostics.error(
                    node.line,
                    format!("Referenced id not found: \"{reference}\""),
                );
            }
            return;
        };
        let clip = doc.node(clip_id);
        if clip.kind != NodeKind::ClipPath {
            self.diagnostics
                .error(node.line, "Referenced element is not a clip path");
            return;
        }

        let mut transform = stacked.clone();
        transform.concatenate(&clip.local_transform);
        for entry in self.clip_geometry(clip, transform) {
            let index = match self.clip_paths.iter().position(|c| *c == entry) {
                Some(index) => index,
                None => {
                    self.clip_paths.push(entry);
                    self.clip_paths.len() - 1
                }
            };
            if !clips.contains(&index) {
                clips.push(index);
            }
        }
    }

    /// One entry per clip rule, in order of first use.
    fn clip_geometry(&mut self, clip: &Node, transform: AffineTransform) -> Vec<FlatClipPath> {
        let doc = self.doc;
        let mut pieces: IndexMap<FillRule, Vec<String>> = IndexMap::new();
        let mut stack: Vec<(NodeId, AffineTransform)> = clip
            .children
            .iter()
            .rev()
            .map(|&child| (child, transform.clone()))
            .collect();
        while let Some((id, parent)) = stack.pop() {
            let node = doc.node(id);
            if node.is_definition() {
                continue;
            }
            if node.clip_path.is_some() {
                debug!(line = node.line, "ignoring clip-path inside a clip path");
            }
            let mut stacked = parent;
            stacked.concatenate(&node.local_transform);
            match node.kind {
                NodeKind::Group | NodeKind::Use => {
                    for &child in node.children.iter().rev() {
                        stack.push((child, stacked.clone()));
                    }
                }
                NodeKind::Leaf => {
                    let Some(data) = node.path_data.as_deref() else {
                        continue;
                    };
                    stacked.pre_concatenate(&self.root_transform);
                    let Some((_, path_data)) = self.formatted_path(node, data, &stacked) else {
                        continue;
                    };
                    let rule = node.attrs.get("clip-rule").map(String::as_str);
                    pieces
                        .entry(FillRule::from_attribute(rule))
                        .or_default()
                        .push(path_data);
                }
                NodeKind::Gradient(_) | NodeKind::ClipPath => {}
            }
        }
        if pieces.is_empty() {
            pieces.insert(FillRule::NonZero, Vec::new());
        }
        pieces
            .into_iter()
            .map(|(fill_rule, data)| FlatClipPath {
                id: clip.id.clone(),
                path_data: join_clip_pieces(&data),
                fill_rule,
            })
            .collect()
    }

    fn flatten_leaf(&mut self, node: &Node, stacked: AffineTransform, clips: Vec<usize>) {
        let Some(data) = node.path_data.as_deref() else {
            return;
        };
        let mut total = stacked;
        total.pre_concatenate(&self.root_transform);

        let Some((commands, path_data)) = self.formatted_path(node, data, &total) else {
            return;
        };

        let mut bounds: Option<Bounds> = None;
        let fill = self.paint(node, "fill", &commands, &total, &mut bounds);
        let stroke = self.paint(node, "stroke", &commands, &total, &mut bounds);
        if fill.is_none() && stroke.is_none() {
            debug!(line = node.line, "skipping path with neither fill nor stroke");
            return;
        }
        let stroke_width = if stroke.is_none() {
            None
        } else {
            Some(self.stroke_width(node, &total))
        };

        let opacity = opacity_value(node, "opacity");
        let attrs: IndexMap<String, String> = PASSTHROUGH_ATTRIBUTES
            .iter()
            .filter_map(|&name| Some((name.to_string(), node.attrs.get(name)?.clone())))
            .collect();
        let path = FlatPath {
            id: node.id.clone(),
            path_data,
            fill,
            stroke,
            stroke_width,
            fill_opacity: opacity_value(node, "fill-opacity") * opacity,
            stroke_opacity: opacity_value(node, "stroke-opacity") * opacity,
            attrs,
            clips,
        };

        if stroke_before_fill(node) && !path.fill.is_none() && !path.stroke.is_none() {
            // Drawn as two paths so the fill lands on top of the stroke.
            let stroke_only = FlatPath {
                fill: Paint::None,
                ..path.clone()
            };
            let fill_only = FlatPath {
                stroke: Paint::None,
                stroke_width: None,
                ..path
            };
            self.paths.push(stroke_only);
            self.paths.push(fill_only);
        } else {
            self.paths.push(path);
        }
    }

    /// Transformed commands and their formatted data. Failures are reported against `node`.
    fn formatted_path(
        &mut self,
        node: &Node,
        data: &str,
        total: &AffineTransform,
    ) -> Option<(Vec<PathCommand>, String)> {
        let flattened = parse_path(data).and_then(|mut commands| {
            if !total.is_identity() || has_rel_move_after_close(&commands) {
                transform_path(total, &mut commands)?;
            }
            if self.config.arcs_to_cubics() {
                commands = arcs_to_cubics(&commands)?;
            }
            let path_data = self.formatter.format(&commands)?;
            Ok((commands, path_data))
        });
        match flattened {
            Ok(flattened) => Some(flattened),
            Err(err) => {
                self.diagnostics.error(node.line, err.to_string());
                None
            }
        }
    }

    fn paint(
        &mut self,
        node: &Node,
        name: &str,
        commands: &[PathCommand],
        total: &AffineTransform,
        bounds: &mut Option<Bounds>,
    ) -> Paint {
        let value = match node.attrs.get(name).map(|v| v.trim()) {
            Some(value) => value,
            None if name == "fill" => DEFAULT_FILL,
            None => return Paint::None,
        };
        if value == "none" {
            return Paint::None;
        }
        if value.starts_with("url(") {
            return self.gradient_paint(node, value, commands, total, bounds);
        }
        match normalize_color(value) {
            Some(color) => Paint::Color(color),
            None => {
                self.diagnostics
                    .error(node.line, format!("Unsupported color format \"{value}\""));
                Paint::None
            }
        }
    }

    fn gradient_paint(
        &mut self,
        node: &Node,
        value: &str,
        commands: &[PathCommand],
        total: &AffineTransform,
        bounds: &mut Option<Bounds>,
    ) -> Paint {
        let doc = self.doc;
        let Some(reference) = url_reference(value) else {
            self.diagnostics.error(
                node.line,
                format!("Invalid attribute value: paint=\"{value}\""),
            );
            return Paint::None;
        };
        let Some(gradient_id) = doc.get_by_id(reference) else {
            if !doc.is_ignored_id(reference) {
                self.diagnostics.error(
                    node.line,
                    format!("Referenced id not found: \"{reference}\""),
                );
            }
            return Paint::None;
        };
        let gradient = doc.node(gradient_id);
        if !gradient.is_gradient() {
            self.diagnostics
                .error(node.line, "Referenced element is not a gradient");
            return Paint::None;
        }

        let bounds = *bounds.get_or_insert_with(|| path_bounds(commands));
        let (user_width, user_height) = match self.viewport.view_box {
            Some(vb) => (vb.width, vb.height),
            None => (self.viewport.width, self.viewport.height),
        };
        let target = GradientTarget {
            bounds,
            transform: total,
            user_width,
            user_height,
            line: node.line,
        };
        match place_gradient(gradient, &target, self.diagnostics) {
            Some(placement) => Paint::Gradient(placement),
            None => Paint::None,
        }
    }

    /// Stroke width in flattened units. Scaling transforms widen or narrow it by the square root
    /// of the determinant, which is exact only for uniform scales.
    fn stroke_width(&mut self, node: &Node, total: &AffineTransform) -> f64 {
        let (width, height) = (self.viewport_width(), self.viewport_height());
        let diagonal = ((width * width + height * height) / 2.0).sqrt();
        let mut stroke_width = match node.attrs.get("stroke-width") {
            Some(value) => shapes::parse_length(value, diagonal).unwrap_or_else(|| {
                self.diagnostics.error(
                    node.line,
                    format!("Invalid attribute value: stroke-width=\"{value}\""),
                );
                1.0
            }),
            None => 1.0,
        };

        let non_scaling = node
            .attrs
            .get("vector-effect")
            .is_some_and(|v| v.trim() == "non-scaling-stroke");
        let kind = total.kind();
        if self.config.scale_stroke_width()
            && !non_scaling
            && kind.intersects(TransformKind::MASK_SCALE)
        {
            let determinant = total.determinant();
            if determinant != 0.0 {
                stroke_width *= determinant.abs().sqrt();
            }
            if kind.contains(TransformKind::GENERAL_SCALE) {
                self.diagnostics
                    .warning(node.line, "Scaling of the stroke width is approximate");
            }
        }
        stroke_width
    }

    fn viewport_width(&self) -> f64 {
        self.viewport.view_box.map_or(self.viewport.width, |vb| vb.width)
    }

    fn viewport_height(&self) -> f64 {
        self.viewport
            .view_box
            .map_or(self.viewport.height, |vb| vb.height)
    }
}

/// Joins clip pieces into one path. A piece that does not start with an absolute moveto is
/// anchored at the origin first.
fn join_clip_pieces(pieces: &[String]) -> String {
    let mut joined = String::new();
    for (i, piece) in pieces.iter().enumerate() {
        if i > 0 && !piece.starts_with('M') {
            joined.push_str("M0,0");
        }
        joined.push_str(piece);
    }
    joined
}

/// An opacity attribute as a number or percentage, clamped to [0, 1]. Missing or invalid values
/// count as fully opaque.
fn opacity_value(node: &Node, name: &str) -> f64 {
    let Some(value) = node.attrs.get(name).map(|v| v.trim()) else {
        return 1.0;
    };
    let parsed = match value.strip_suffix('%') {
        Some(percent) => percent.trim().parse::<f64>().map(|v| v / 100.0),
        None => value.parse::<f64>(),
    };
    match parsed {
        Ok(v) if v.is_finite() => v.clamp(0.0, 1.0),
        _ => 1.0,
    }
}

/// Whether `paint-order` puts the stroke below the fill. Keywords left out keep their default
/// relative order after the listed ones.
fn stroke_before_fill(node: &Node) -> bool {
    let Some(order) = node.attrs.get("paint-order") else {
        return false;
    };
    let mut effective: Vec<&str> = order
        .split_whitespace()
        .filter(|k| matches!(*k, "fill" | "stroke" | "markers"))
        .collect();
    for keyword in ["fill", "stroke", "markers"] {
        if !effective.contains(&keyword) {
            effective.push(keyword);
        }
    }
    let position = |keyword: &str| effective.iter().position(|k| *k == keyword);
    position("stroke") < position("fill")
}
