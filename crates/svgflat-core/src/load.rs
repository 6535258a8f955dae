//! Builds a [`Document`] from SVG text.

use std::str::FromStr;

use roxmltree::ParsingOptions;
use rustc_hash::FxHashMap;
use svgflat_geom::parse_transform_list;
use tracing::debug;

use crate::diagnostics::Diagnostics;
use crate::error::{Error, Result};
use crate::paint::url_reference;
use crate::shapes::{self, LengthContext};
use crate::style::{Stylesheet, is_display_none, style_declarations};
use crate::tree::{
    Document, GradientKind, GradientStop, Node, NodeId, NodeKind, ViewBox, Viewport,
    is_presentation_attribute,
};

/// Elements reported as unsupported. Their content is skipped.
const UNSUPPORTED_TAGS: &[&str] = &[
    "animate",
    "animateColor",
    "animateMotion",
    "animateTransform",
    "mpath",
    "set",
    "a",
    "marker",
    "mask",
    "missing-glyph",
    "pattern",
    "switch",
    "symbol",
    "filter",
    "feBlend",
    "feColorMatrix",
    "feComponentTransfer",
    "feComposite",
    "feConvolveMatrix",
    "feDiffuseLighting",
    "feDisplacementMap",
    "feDistantLight",
    "feFlood",
    "feFuncA",
    "feFuncB",
    "feFuncG",
    "feFuncR",
    "feGaussianBlur",
    "feImage",
    "feMerge",
    "feMergeNode",
    "feMorphology",
    "feOffset",
    "fePointLight",
    "feSpecularLighting",
    "feSpotLight",
    "feTile",
    "feTurbulence",
    "font",
    "font-face",
    "font-face-format",
    "font-face-name",
    "font-face-src",
    "font-face-uri",
    "hkern",
    "vkern",
    "image",
    "altGlyph",
    "altGlyphDef",
    "altGlyphItem",
    "glyph",
    "glyphRef",
    "text",
    "textPath",
    "tref",
    "tspan",
    "color-profile",
    "cursor",
    "foreignObject",
    "script",
    "view",
];

/// Unsupported containers whose children are still drawn.
const TRANSPARENT_UNSUPPORTED_TAGS: &[&str] = &["a", "switch"];

/// Elements without drawable content.
const SILENT_TAGS: &[&str] = &["style", "title", "desc", "metadata"];

const GRADIENT_ATTRIBUTES: &[&str] = &[
    "x1",
    "y1",
    "x2",
    "y2",
    "cx",
    "cy",
    "r",
    "fx",
    "fy",
    "spreadMethod",
    "gradientUnits",
    "gradientTransform",
];

const DEFAULT_STOP_COLOR: &str = "#000000";

type XmlNode<'a, 'input> = roxmltree::Node<'a, 'input>;

/// Parses SVG text into an unresolved [`Document`].
///
/// XML errors and a missing or ambiguous `<svg>` root are hard errors. Everything else is
/// recorded in `diagnostics` and the offending element is skipped.
pub fn parse_document(text: &str, diagnostics: &mut Diagnostics) -> Result<Document> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let xml = roxmltree::Document::parse_with_options(text, options)?;
    let svg = find_svg_root(&xml)?;

    let mut loader = Loader {
        xml: &xml,
        doc: Document::new(),
        diagnostics,
        styles: collect_stylesheet(&xml),
        lengths: LengthContext {
            width: 0.0,
            height: 0.0,
        },
    };

    let Some(viewport) = loader.read_viewport(svg) else {
        return Ok(loader.doc);
    };
    loader.doc.viewport = viewport;
    if let Some(vb) = viewport.view_box {
        loader.lengths = LengthContext {
            width: vb.width,
            height: vb.height,
        };
    }

    loader.load_root(svg);
    loader.walk(svg);
    debug!(
        nodes = loader.doc.len(),
        pending_uses = loader.doc.pending_uses.len(),
        pending_gradients = loader.doc.pending_gradients.len(),
        "svg document loaded"
    );
    Ok(loader.doc)
}

fn find_svg_root<'a, 'input>(xml: &'a roxmltree::Document<'input>) -> Result<XmlNode<'a, 'input>> {
    let root = xml.root_element();
    if root.tag_name().name() == "svg" {
        return Ok(root);
    }
    let mut outermost = root.descendants().filter(|n| {
        n.is_element()
            && n.tag_name().name() == "svg"
            && !n.ancestors().skip(1).any(|a| a.tag_name().name() == "svg")
    });
    let first = outermost.next().ok_or(Error::MissingSvgRoot)?;
    if outermost.next().is_some() {
        return Err(Error::MultipleSvgRoots);
    }
    Ok(first)
}

fn collect_stylesheet(xml: &roxmltree::Document<'_>) -> Stylesheet {
    let mut sheet = Stylesheet::default();
    for node in xml
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "style")
    {
        let css: String = node.children().filter_map(|c| c.text()).collect();
        sheet.extend(&css);
    }
    sheet
}

/// Fragment id of the element's `href` (plain or `xlink:`).
fn href_fragment(el: XmlNode<'_, '_>) -> Option<String> {
    let raw = el.attributes().find(|a| a.name() == "href")?.value().trim();
    let id = raw.strip_prefix('#').unwrap_or(raw);
    (!id.is_empty()).then(|| id.to_string())
}

fn is_hidden(el: XmlNode<'_, '_>) -> bool {
    el.attribute("display").is_some_and(|v| v.trim() == "none")
        || el.attribute("style").is_some_and(is_display_none)
}

fn element_children<'a, 'input>(el: XmlNode<'a, 'input>) -> Vec<XmlNode<'a, 'input>> {
    el.children().filter(|n| n.is_element()).collect()
}

struct Loader<'a, 'input, 'd> {
    xml: &'a roxmltree::Document<'input>,
    doc: Document,
    diagnostics: &'d mut Diagnostics,
    styles: Stylesheet,
    lengths: LengthContext,
}

impl<'a, 'input> Loader<'a, 'input, '_> {
    fn line(&self, el: XmlNode<'_, '_>) -> u32 {
        self.xml.text_pos_at(el.range().start).row
    }

    fn invalid_attribute(&mut self, line: u32, name: &str, value: &str) {
        self.diagnostics
            .error(line, format!("Invalid attribute value: {name}=\"{value}\""));
    }

    fn read_viewport(&mut self, svg: XmlNode<'_, '_>) -> Option<Viewport> {
        let line = self.line(svg);
        let mut view_box = None;
        if let Some(value) = svg.attribute("viewBox") {
            match svgtypes::ViewBox::from_str(value) {
                Ok(vb) => {
                    view_box = Some(ViewBox {
                        x: vb.x,
                        y: vb.y,
                        width: vb.w,
                        height: vb.h,
                    })
                }
                Err(err) => {
                    debug!(%err, "unusable viewBox");
                    self.invalid_attribute(line, "viewBox", value);
                }
            }
        }

        let mut dimension = |name: &str, base: Option<f64>| -> Option<f64> {
            let value = svg.attribute(name)?;
            let length = match svgtypes::Length::from_str(value.trim()) {
                Ok(length) => length,
                Err(_) => {
                    self.invalid_attribute(line, name, value);
                    return None;
                }
            };
            if length.unit == svgtypes::LengthUnit::Percent {
                return base.map(|b| length.number / 100.0 * b);
            }
            Some(shapes::resolve_length(length, 0.0)).filter(|v| *v > 0.0)
        };
        let width = dimension("width", view_box.map(|vb| vb.width));
        let height = dimension("height", view_box.map(|vb| vb.height));

        let view_box = match (view_box, width, height) {
            (Some(vb), _, _) => vb,
            (None, Some(width), Some(height)) => ViewBox {
                x: 0.0,
                y: 0.0,
                width,
                height,
            },
            _ => {
                self.diagnostics
                    .error(line, "Missing \"viewBox\" in <svg> element");
                return None;
            }
        };
        Some(Viewport {
            width: width.unwrap_or(view_box.width),
            height: height.unwrap_or(view_box.height),
            view_box: Some(view_box),
        })
    }

    fn load_root(&mut self, svg: XmlNode<'_, '_>) {
        let root = self.doc.root();
        let line = self.line(svg);
        let id = svg.attribute("id").map(str::to_string);
        {
            let node = self.doc.node_mut(root);
            node.line = line;
            node.id = id.clone();
        }
        if let Some(id) = id {
            self.doc.ids.insert(id, root);
        }
        self.apply_attributes(root, svg);
    }

    fn walk(&mut self, svg: XmlNode<'a, 'input>) {
        let root = self.doc.root();
        let mut stack: Vec<(XmlNode<'a, 'input>, NodeId)> = element_children(svg)
            .into_iter()
            .rev()
            .map(|el| (el, root))
            .collect();
        while let Some((el, parent)) = stack.pop() {
            if let Some(container) = self.visit(el, parent) {
                for child in element_children(el).into_iter().rev() {
                    stack.push((child, container));
                }
            }
        }
    }

    /// Loads one element. Returns the node its children attach to, or `None` when its content is
    /// not traversed.
    fn visit(&mut self, el: XmlNode<'_, '_>, parent: NodeId) -> Option<NodeId> {
        let tag = el.tag_name().name();
        if is_hidden(el) {
            debug!(tag, "skipping hidden element");
            return None;
        }
        match tag {
            "path" => {
                self.load_leaf(el, parent);
                None
            }
            _ if shapes::is_shape(tag) => {
                self.load_leaf(el, parent);
                None
            }
            "g" | "svg" => {
                let id = self.push_element(NodeKind::Group, el);
                self.apply_attributes(id, el);
                self.doc.add_child(parent, id);
                Some(id)
            }
            "defs" => {
                let id = self.push_element(NodeKind::Group, el);
                Some(id)
            }
            "use" => {
                self.load_use(el, parent);
                None
            }
            "clipPath" => self.load_clip_path(el),
            "linearGradient" => {
                self.load_gradient(el, GradientKind::Linear);
                None
            }
            "radialGradient" => {
                self.load_gradient(el, GradientKind::Radial);
                None
            }
            _ if SILENT_TAGS.contains(&tag) => None,
            _ => {
                if let Some(id) = el.attribute("id") {
                    self.doc.ignore_id(id);
                }
                if UNSUPPORTED_TAGS.contains(&tag) {
                    let line = self.line(el);
                    self.diagnostics
                        .error(line, format!("<{tag}> is not supported"));
                    if !TRANSPARENT_UNSUPPORTED_TAGS.contains(&tag) {
                        return None;
                    }
                } else {
                    debug!(tag, "traversing unknown element");
                }
                Some(parent)
            }
        }
    }

    fn push_element(&mut self, kind: NodeKind, el: XmlNode<'_, '_>) -> NodeId {
        let mut node = Node::new(kind, el.tag_name().name(), self.line(el));
        node.id = el.attribute("id").map(str::to_string);
        self.doc.push(node)
    }

    /// Applies `transform`, presentation attributes, matching class rules and inline style,
    /// in that order.
    fn apply_attributes(&mut self, id: NodeId, el: XmlNode<'_, '_>) {
        for attr in el.attributes() {
            let (name, value) = (attr.name(), attr.value());
            if name == "transform" {
                match parse_transform_list(value) {
                    Ok(transform) => self.doc.node_mut(id).local_transform = transform,
                    Err(err) => {
                        debug!(%err, "ignoring transform");
                        let line = self.line(el);
                        self.invalid_attribute(line, name, value);
                    }
                }
            } else if name == "clip-path" {
                self.set_clip_reference(id, el, value);
            } else if is_presentation_attribute(name) {
                self.doc.fill_presentation_attribute(id, name, value);
            }
        }

        if let Some(classes) = el.attribute("class") {
            let tag = el.tag_name().name();
            let declarations: Vec<(String, String)> = self
                .styles
                .declarations_for(tag, classes)
                .map(|(n, v)| (n.to_string(), v.to_string()))
                .collect();
            for (name, value) in declarations {
                if name == "clip-path" {
                    self.set_clip_reference(id, el, &value);
                } else if is_presentation_attribute(&name) {
                    self.doc.fill_presentation_attribute(id, &name, &value);
                }
            }
        }

        if let Some(style) = el.attribute("style") {
            for (name, value) in style_declarations(style) {
                if name == "clip-path" {
                    self.set_clip_reference(id, el, value);
                } else if is_presentation_attribute(name) {
                    self.doc.fill_presentation_attribute(id, name, value);
                }
            }
        }
    }

    fn set_clip_reference(&mut self, id: NodeId, el: XmlNode<'_, '_>, value: &str) {
        let reference = match url_reference(value) {
            Some(reference) => Some(reference.to_string()),
            None if value.trim() == "none" => None,
            None => {
                let line = self.line(el);
                self.invalid_attribute(line, "clip-path", value);
                return;
            }
        };
        self.doc.node_mut(id).clip_path = reference;
    }

    /// Loads a `<clipPath>` as a detached container for its geometry. Only user-space clip
    /// units are supported; other clips are reported and their references ignored.
    fn load_clip_path(&mut self, el: XmlNode<'_, '_>) -> Option<NodeId> {
        let unsupported_units = el
            .attribute("clipPathUnits")
            .map(str::trim)
            .filter(|units| *units != "userSpaceOnUse");
        if let Some(units) = unsupported_units {
            let line = self.line(el);
            self.diagnostics
                .error(line, format!("Unsupported clipPathUnits \"{units}\""));
            if let Some(id) = el.attribute("id") {
                self.doc.ignore_id(id);
            }
            return None;
        }
        let id = self.push_element(NodeKind::ClipPath, el);
        self.apply_attributes(id, el);
        // A clip path is never clipped itself.
        self.doc.node_mut(id).clip_path = None;
        Some(id)
    }

    fn load_leaf(&mut self, el: XmlNode<'_, '_>, parent: NodeId) {
        let tag = el.tag_name().name();
        let line = self.line(el);
        let path_data = if tag == "path" {
            el.attribute("d")
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string)
        } else {
            let attrs: FxHashMap<&str, &str> =
                el.attributes().map(|a| (a.name(), a.value())).collect();
            match shapes::shape_path_data(tag, &attrs, self.lengths) {
                Ok(data) => data,
                Err(invalid) => {
                    self.invalid_attribute(line, &invalid.name, &invalid.value);
                    None
                }
            }
        };

        let id = self.push_element(NodeKind::Leaf, el);
        self.doc.node_mut(id).path_data = path_data;
        self.apply_attributes(id, el);
        self.doc.add_child(parent, id);
    }

    fn load_use(&mut self, el: XmlNode<'_, '_>, parent: NodeId) {
        let line = self.line(el);
        let id = self.push_element(NodeKind::Use, el);
        self.apply_attributes(id, el);

        let mut offset = [0.0; 2];
        for (slot, (name, base)) in offset
            .iter_mut()
            .zip([("x", self.lengths.width), ("y", self.lengths.height)])
        {
            let Some(value) = el.attribute(name) else {
                continue;
            };
            match shapes::parse_length(value, base) {
                Some(v) => *slot = v,
                None => self.invalid_attribute(line, name, value),
            }
        }
        if offset != [0.0, 0.0] {
            // x/y apply inside the element's own transform.
            self.doc
                .node_mut(id)
                .local_transform
                .translate(offset[0], offset[1]);
        }

        let href = href_fragment(el);
        let has_href = href.is_some();
        self.doc.node_mut(id).href = href;
        self.doc.add_child(parent, id);
        if has_href {
            self.doc.pending_uses.push(id);
        } else {
            self.diagnostics.warning(line, "<use> element has no href");
        }
    }

    fn load_gradient(&mut self, el: XmlNode<'_, '_>, kind: GradientKind) {
        let stops = self.read_stops(el);
        let id = self.push_element(NodeKind::Gradient(kind), el);
        let href = href_fragment(el);
        let node = self.doc.node_mut(id);
        for attr in el.attributes() {
            if GRADIENT_ATTRIBUTES.contains(&attr.name()) {
                node.attrs
                    .insert(attr.name().to_string(), attr.value().trim().to_string());
            }
        }
        node.stops = stops;
        if href.is_some() {
            node.href = href;
            self.doc.pending_gradients.push(id);
        }
    }

    /// Stops in document order. Offsets are clamped to [0, 1] and never decrease.
    fn read_stops(&mut self, el: XmlNode<'_, '_>) -> Vec<GradientStop> {
        let mut stops = Vec::new();
        let mut greatest_offset = 0.0_f64;
        for stop in element_children(el)
            .into_iter()
            .filter(|n| n.tag_name().name() == "stop")
        {
            let line = self.line(stop);
            let mut color = stop.attribute("stop-color");
            let mut opacity = stop.attribute("stop-opacity");
            if let Some(style) = stop.attribute("style") {
                for (name, value) in style_declarations(style) {
                    match name {
                        "stop-color" => color = Some(value),
                        "stop-opacity" => opacity = Some(value),
                        _ => {}
                    }
                }
            }

            if let Some(value) = stop.attribute("offset") {
                match parse_offset(value) {
                    Some(offset) => greatest_offset = greatest_offset.max(offset),
                    None => self.invalid_attribute(line, "offset", value),
                }
            }
            let opacity = match opacity {
                Some(value) => value.trim().parse::<f64>().unwrap_or_else(|_| {
                    self.invalid_attribute(line, "stop-opacity", value);
                    1.0
                }),
                None => 1.0,
            };
            stops.push(GradientStop {
                color: color
                    .map(str::trim)
                    .unwrap_or(DEFAULT_STOP_COLOR)
                    .to_string(),
                offset: greatest_offset,
                opacity: opacity.clamp(0.0, 1.0),
            });
        }
        stops
    }
}

/// A number or percentage, clamped to [0, 1].
fn parse_offset(value: &str) -> Option<f64> {
    let value = value.trim();
    let offset = match value.strip_suffix('%') {
        Some(percent) => percent.trim().parse::<f64>().ok()? / 100.0,
        None => value.parse::<f64>().ok()?,
    };
    offset.is_finite().then(|| offset.clamp(0.0, 1.0))
}

