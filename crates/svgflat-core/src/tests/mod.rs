mod config;
mod flatten;
mod gradient;
mod style;

use crate::*;

pub(crate) fn assert_close(actual: f64, expected: f64, tol: f64) {
    assert!(
        (actual - expected).abs() <= tol,
        "expected {expected}, got {actual} (tolerance {tol})"
    );
}

/// Loads and resolves `svg`, returning everything the flattening pass needs.
pub(crate) fn resolved(svg: &str) -> (Document, ResolveReport, Diagnostics) {
    let mut diagnostics = Diagnostics::new();
    let mut doc = parse_document(svg, &mut diagnostics).unwrap();
    let report = resolve_references(&mut doc, &mut diagnostics);
    (doc, report, diagnostics)
}

pub(crate) fn convert(svg: &str) -> Conversion {
    Converter::default().convert(svg).unwrap()
}

pub(crate) fn messages(diagnostics: &Diagnostics) -> Vec<String> {
    diagnostics.iter().map(|d| d.message.clone()).collect()
}

pub(crate) fn labels(doc: &Document, ids: &[NodeId]) -> Vec<String> {
    ids.iter().map(|&id| doc.node(id).label()).collect()
}
