//! Arena-backed element tree produced by [`crate::load`].
//!
//! Nodes refer to each other by [`NodeId`]. Subtrees that are referenced but not rendered
//! (`<defs>` content, gradients and clip paths) live in the arena detached from the root.

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use svgflat_geom::AffineTransform;

/// Attributes inherited from groups and `<use>` elements onto their content.
pub const PRESENTATION_ATTRIBUTES: &[&str] = &[
    "clip",
    "clip-rule",
    "fill",
    "fill-opacity",
    "fill-rule",
    "opacity",
    "paint-order",
    "stroke",
    "stroke-linecap",
    "stroke-linejoin",
    "stroke-miterlimit",
    "stroke-opacity",
    "stroke-width",
    "vector-effect",
];

pub fn is_presentation_attribute(name: &str) -> bool {
    PRESENTATION_ATTRIBUTES.contains(&name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GradientKind {
    Linear,
    Radial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Group,
    Use,
    Leaf,
    Gradient(GradientKind),
    /// A `<clipPath>` whose children hold the clip geometry.
    ClipPath,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradientStop {
    pub color: String,
    pub offset: f64,
    pub opacity: f64,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub tag: String,
    pub id: Option<String>,
    /// 1-based source line, 0 for synthesized nodes.
    pub line: u32,
    pub attrs: IndexMap<String, String>,
    pub local_transform: AffineTransform,
    pub children: Vec<NodeId>,
    /// Fragment id of an `href="#id"` reference, without the `#`.
    pub href: Option<String>,
    pub path_data: Option<String>,
    pub stops: Vec<GradientStop>,
    /// Fragment id from `clip-path="url(#id)"`. Not inherited.
    pub clip_path: Option<String>,
}

impl Node {
    pub fn new(kind: NodeKind, tag: impl Into<String>, line: u32) -> Self {
        Self {
            kind,
            tag: tag.into(),
            id: None,
            line,
            attrs: IndexMap::new(),
            local_transform: AffineTransform::identity(),
            children: Vec::new(),
            href: None,
            path_data: None,
            stops: Vec::new(),
            clip_path: None,
        }
    }

    pub fn is_gradient(&self) -> bool {
        matches!(self.kind, NodeKind::Gradient(_))
    }

    /// Definitions that are only drawn through a reference.
    pub fn is_definition(&self) -> bool {
        matches!(self.kind, NodeKind::Gradient(_) | NodeKind::ClipPath)
    }

    /// `id` when present, otherwise the source line.
    pub fn label(&self) -> String {
        match &self.id {
            Some(id) => id.clone(),
            None => format!("(line {})", self.line),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub view_box: Option<ViewBox>,
}

#[derive(Debug, Clone)]
pub struct Document {
    pub(crate) nodes: Vec<Node>,
    pub(crate) root: NodeId,
    pub(crate) ids: FxHashMap<String, NodeId>,
    pub(crate) ignored_ids: FxHashSet<String>,
    pub(crate) pending_uses: Vec<NodeId>,
    pub(crate) pending_gradients: Vec<NodeId>,
    pub viewport: Viewport,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty document holding only a root group.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeKind::Group, "svg", 0)],
            root: NodeId(0),
            ids: FxHashMap::default(),
            ignored_ids: FxHashSet::default(),
            pending_uses: Vec::new(),
            pending_gradients: Vec::new(),
            viewport: Viewport::default(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Adds a detached node. Its id, if any, is registered unless already taken.
    pub fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        if let Some(key) = &node.id {
            self.ids.entry(key.clone()).or_insert(id);
        }
        self.nodes.push(node);
        id
    }

    pub fn get_by_id(&self, id: &str) -> Option<NodeId> {
        self.ids.get(id).copied()
    }

    pub fn is_ignored_id(&self, id: &str) -> bool {
        self.ignored_ids.contains(id)
    }

    pub fn ignore_id(&mut self, id: impl Into<String>) {
        self.ignored_ids.insert(id.into());
    }

    pub fn href_target(&self, id: NodeId) -> Option<NodeId> {
        let href = self.node(id).href.as_deref()?;
        self.get_by_id(href)
    }

    pub fn pending_uses(&self) -> &[NodeId] {
        &self.pending_uses
    }

    pub fn pending_gradients(&self) -> &[NodeId] {
        &self.pending_gradients
    }

    /// Appends `child` under `parent`, filling attributes the child does not define.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        let inherited = self.node(parent).attrs.clone();
        self.fill_empty_attributes(child, &inherited);
        self.node_mut(parent).children.push(child);
    }

    pub fn fill_empty_attributes(&mut self, id: NodeId, parent_attrs: &IndexMap<String, String>) {
        let attrs = &mut self.node_mut(id).attrs;
        for (name, value) in parent_attrs {
            if !attrs.contains_key(name) {
                attrs.insert(name.clone(), value.clone());
            }
        }
    }

    /// Sets a presentation attribute, normalizing its value. On groups the value also flows to
    /// every descendant that does not define it.
    pub fn fill_presentation_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            let node = self.node_mut(cur);
            set_presentation_attribute(&mut node.attrs, name, value);
            if node.kind != NodeKind::Group {
                continue;
            }
            let children = node.children.clone();
            for &child in children.iter().rev() {
                if !self.node(child).attrs.contains_key(name) {
                    stack.push(child);
                }
            }
        }
    }

    /// Clones the subtree rooted at `id`. Copies are detached and their ids are not registered.
    pub fn deep_copy(&mut self, id: NodeId) -> NodeId {
        let copy_root = NodeId(self.nodes.len());
        let mut stack = vec![(id, None::<NodeId>)];
        while let Some((source, parent)) = stack.pop() {
            let mut node = self.node(source).clone();
            let children = std::mem::take(&mut node.children);
            let copy = NodeId(self.nodes.len());
            self.nodes.push(node);
            if let Some(parent) = parent {
                self.node_mut(parent).children.push(copy);
            }
            for &child in children.iter().rev() {
                stack.push((child, Some(copy)));
            }
        }
        copy_root
    }

    /// Nodes reachable from the root, parents before children, in document order.
    pub fn descendants(&self, from: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![from];
        while let Some(cur) = stack.pop() {
            out.push(cur);
            for &child in self.node(cur).children.iter().rev() {
                stack.push(child);
            }
        }
        out
    }
}

fn set_presentation_attribute(attrs: &mut IndexMap<String, String>, name: &str, value: &str) {
    let value = match (name, value) {
        ("fill-rule" | "clip-rule", "nonzero") => "nonZero",
        ("fill-rule" | "clip-rule", "evenodd") => "evenOdd",
        _ => value,
    };
    if name == "stroke-width" && value.trim() == "0" {
        attrs.shift_remove("stroke");
    }
    if value.starts_with("url(") && name != "fill" && name != "stroke" {
        tracing::debug!(name, value, "ignoring url() value");
        return;
    }
    if !value.is_empty() {
        attrs.insert(name.to_string(), value.to_string());
    }
}
