//! `<use>` expansion and gradient `href` inheritance.
//!
//! Uses are expanded in a topological order over a reverse dependency graph: every node points
//! at its parent (a subtree is ready once its content is) and every referenced node points at
//! the uses that copy it. Uses caught in a cycle never become ready and are reported instead.

use std::collections::VecDeque;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use tracing::debug;

use crate::diagnostics::Diagnostics;
use crate::tree::{Document, NodeId, NodeKind};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolveReport {
    /// Expanded uses, each after everything it copies.
    pub use_order: Vec<NodeId>,
    /// Uses left unexpanded because they take part in, or depend on, a cycle.
    pub unresolved: Vec<NodeId>,
    /// One chain per reported cycle, uses and gradients alike.
    pub cycles: Vec<String>,
}

pub fn resolve_references(doc: &mut Document, diagnostics: &mut Diagnostics) -> ResolveReport {
    let mut report = ResolveReport::default();
    resolve_uses(doc, diagnostics, &mut report);
    resolve_gradients(doc, diagnostics, &mut report);
    debug!(
        expanded = report.use_order.len(),
        unresolved = report.unresolved.len(),
        cycles = report.cycles.len(),
        "references resolved"
    );
    report
}

fn lookup_target(
    doc: &Document,
    id: NodeId,
    diagnostics: &mut Diagnostics,
) -> Option<NodeId> {
    let node = doc.node(id);
    let href = node.href.as_deref()?;
    match doc.get_by_id(href) {
        Some(target) => Some(target),
        None => {
            if doc.is_ignored_id(href) {
                debug!(href, "reference to an ignored element");
            } else {
                diagnostics.error(node.line, format!("Referenced id not found: \"{href}\""));
            }
            None
        }
    }
}

fn resolve_uses(doc: &mut Document, diagnostics: &mut Diagnostics, report: &mut ResolveReport) {
    let pending = std::mem::take(&mut doc.pending_uses);
    let mut targets: FxHashMap<NodeId, NodeId> = FxHashMap::default();
    for &use_id in &pending {
        if let Some(target) = lookup_target(doc, use_id, diagnostics) {
            targets.insert(use_id, target);
        }
    }
    if targets.is_empty() {
        return;
    }

    let order = topological_use_order(doc, &pending, &targets);
    let ordered: FxHashSet<NodeId> = order.iter().copied().collect();
    let unresolved: Vec<NodeId> = pending
        .iter()
        .copied()
        .filter(|id| targets.contains_key(id) && !ordered.contains(id))
        .collect();

    for &use_id in &order {
        expand_use(doc, use_id, targets[&use_id]);
    }

    if !unresolved.is_empty() {
        let unresolved_set: FxHashSet<NodeId> = unresolved.iter().copied().collect();
        let dependency = |id: NodeId| first_blocking_use(doc, targets[&id], &targets, &unresolved_set);
        report.cycles.extend(report_cycles(
            doc,
            &unresolved,
            dependency,
            "<use> nodes",
            diagnostics,
        ));
    }
    report.use_order = order;
    report.unresolved = unresolved;
}

/// Kahn's algorithm over the reverse dependency graph, seeded in arena order.
fn topological_use_order(
    doc: &Document,
    pending: &[NodeId],
    targets: &FxHashMap<NodeId, NodeId>,
) -> Vec<NodeId> {
    let mut reverse: FxHashMap<NodeId, Vec<NodeId>> = FxHashMap::default();
    let mut in_degree: FxHashMap<NodeId, usize> = FxHashMap::default();
    let mut queue: VecDeque<NodeId> = VecDeque::new();

    for seed in std::iter::once(doc.root()).chain(pending.iter().copied()) {
        if !in_degree.contains_key(&seed) {
            in_degree.insert(seed, 0);
            queue.push_back(seed);
        }
    }
    while let Some(cur) = queue.pop_front() {
        let node = doc.node(cur);
        let target = match node.kind {
            NodeKind::Use => targets.get(&cur).copied(),
            _ => None,
        };
        for dependency in node.children.iter().copied().chain(target) {
            reverse.entry(dependency).or_default().push(cur);
            if !in_degree.contains_key(&dependency) {
                in_degree.insert(dependency, 0);
                queue.push_back(dependency);
            }
        }
    }
    for dependents in reverse.values() {
        for dependent in dependents {
            if let Some(degree) = in_degree.get_mut(dependent) {
                *degree += 1;
            }
        }
    }

    let mut ready: Vec<NodeId> = in_degree
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(id, _)| *id)
        .collect();
    ready.sort_unstable();
    queue.extend(ready);

    let mut order = Vec::new();
    while let Some(cur) = queue.pop_front() {
        if targets.contains_key(&cur) {
            order.push(cur);
        }
        let Some(dependents) = reverse.get(&cur) else {
            continue;
        };
        for dependent in dependents {
            if let Some(degree) = in_degree.get_mut(dependent) {
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(*dependent);
                }
            }
        }
    }
    order
}

/// Appends a copy of `target` under the use. The use's presentation attributes fill whatever
/// the copied content leaves unset.
fn expand_use(doc: &mut Document, use_id: NodeId, target: NodeId) {
    let copy = doc.deep_copy(target);
    let attrs = doc.node(use_id).attrs.clone();
    for node in doc.descendants(copy) {
        doc.fill_empty_attributes(node, &attrs);
    }
    doc.node_mut(use_id).children.push(copy);
}

/// The first unresolved use reachable from `from` through children and use references.
fn first_blocking_use(
    doc: &Document,
    from: NodeId,
    targets: &FxHashMap<NodeId, NodeId>,
    unresolved: &FxHashSet<NodeId>,
) -> Option<NodeId> {
    let mut seen: FxHashSet<NodeId> = FxHashSet::default();
    let mut stack = vec![from];
    while let Some(cur) = stack.pop() {
        if !seen.insert(cur) {
            continue;
        }
        if unresolved.contains(&cur) {
            return Some(cur);
        }
        if let Some(&target) = targets.get(&cur) {
            stack.push(target);
        }
        stack.extend(doc.node(cur).children.iter().rev().copied());
    }
    None
}

/// Follows `dependency` from each unresolved node until a node repeats and reports every cycle
/// found once.
fn report_cycles(
    doc: &Document,
    unresolved: &[NodeId],
    dependency: impl Fn(NodeId) -> Option<NodeId>,
    what: &str,
    diagnostics: &mut Diagnostics,
) -> Vec<String> {
    let mut cycles = Vec::new();
    let mut visited: FxHashSet<NodeId> = FxHashSet::default();
    for &start in unresolved {
        if visited.contains(&start) {
            continue;
        }
        let mut chain: Vec<NodeId> = Vec::new();
        let mut position: FxHashMap<NodeId, usize> = FxHashMap::default();
        let mut cur = Some(start);
        while let Some(id) = cur {
            if let Some(&at) = position.get(&id) {
                let cycle = &chain[at..];
                let mut labels: Vec<String> = cycle.iter().map(|&n| doc.node(n).label()).collect();
                labels.push(doc.node(id).label());
                let text = labels.join(" -> ");
                diagnostics.error(
                    doc.node(id).line,
                    format!("Circular dependency of {what}: {text}"),
                );
                cycles.push(text);
                break;
            }
            if visited.contains(&id) {
                break;
            }
            position.insert(id, chain.len());
            chain.push(id);
            cur = dependency(id);
        }
        visited.extend(chain);
    }
    cycles
}

/// Gradients inherit attributes and stops from the gradient they reference, once that one is
/// itself resolved.
fn resolve_gradients(
    doc: &mut Document,
    diagnostics: &mut Diagnostics,
    report: &mut ResolveReport,
) {
    let mut pending = std::mem::take(&mut doc.pending_gradients);
    let mut targets: FxHashMap<NodeId, NodeId> = FxHashMap::default();
    pending.retain(|&id| {
        let Some(target) = lookup_target(doc, id, diagnostics) else {
            return false;
        };
        if !doc.node(target).is_gradient() {
            diagnostics.error(doc.node(id).line, "Referenced element is not a gradient");
            return false;
        }
        targets.insert(id, target);
        true
    });

    loop {
        let waiting: FxHashSet<NodeId> = pending.iter().copied().collect();
        let before = pending.len();
        pending.retain(|&id| {
            let target = targets[&id];
            if waiting.contains(&target) {
                return true;
            }
            inherit_gradient(doc, id, target);
            false
        });
        if pending.is_empty() || pending.len() == before {
            break;
        }
    }

    if !pending.is_empty() {
        let waiting: FxHashSet<NodeId> = pending.iter().copied().collect();
        let dependency = |id: NodeId| Some(targets[&id]).filter(|t| waiting.contains(t));
        report.cycles.extend(report_cycles(
            doc,
            &pending,
            dependency,
            "gradient references",
            diagnostics,
        ));
    }
}

fn inherit_gradient(doc: &mut Document, id: NodeId, target: NodeId) {
    let source = doc.node(target);
    let attrs = source.attrs.clone();
    let stops = source.stops.clone();
    let node = doc.node_mut(id);
    for (name, value) in attrs {
        node.attrs.entry(name).or_insert(value);
    }
    if node.stops.is_empty() {
        node.stops = stops;
    }
}
