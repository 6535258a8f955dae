use std::borrow::Cow;

use svgtypes::{PathParser, PathSegment};

use super::{PathCommand, PathKind};
use crate::error::{Result, malformed_path};

fn kind_for(abs: bool, absolute: PathKind) -> PathKind {
    if abs { absolute } else { absolute.to_relative() }
}

/// Splits a segment into its command kind and parameters in path-data order.
fn segment_parts(segment: PathSegment) -> (PathKind, Vec<f64>) {
    match segment {
        PathSegment::MoveTo { abs, x, y } => (kind_for(abs, PathKind::MoveTo), vec![x, y]),
        PathSegment::LineTo { abs, x, y } => (kind_for(abs, PathKind::LineTo), vec![x, y]),
        PathSegment::HorizontalLineTo { abs, x } => {
            (kind_for(abs, PathKind::HorizontalTo), vec![x])
        }
        PathSegment::VerticalLineTo { abs, y } => (kind_for(abs, PathKind::VerticalTo), vec![y]),
        PathSegment::CurveTo {
            abs,
            x1,
            y1,
            x2,
            y2,
            x,
            y,
        } => (kind_for(abs, PathKind::CubicTo), vec![x1, y1, x2, y2, x, y]),
        PathSegment::SmoothCurveTo { abs, x2, y2, x, y } => {
            (kind_for(abs, PathKind::SmoothCubicTo), vec![x2, y2, x, y])
        }
        PathSegment::Quadratic { abs, x1, y1, x, y } => {
            (kind_for(abs, PathKind::QuadTo), vec![x1, y1, x, y])
        }
        PathSegment::SmoothQuadratic { abs, x, y } => {
            (kind_for(abs, PathKind::SmoothQuadTo), vec![x, y])
        }
        PathSegment::EllipticalArc {
            abs,
            rx,
            ry,
            x_axis_rotation,
            large_arc,
            sweep,
            x,
            y,
        } => (
            kind_for(abs, PathKind::ArcTo),
            vec![
                rx.abs(),
                ry.abs(),
                x_axis_rotation,
                f64::from(u8::from(large_arc)),
                f64::from(u8::from(sweep)),
                x,
                y,
            ],
        ),
        PathSegment::ClosePath { abs } => (kind_for(abs, PathKind::Close), Vec::new()),
    }
}

/// Parses SVG path data into commands.
///
/// Consecutive segments of the same kind, movetos aside, are grouped into one command
/// (`L1 2 L3 4` and `L1 2 3 4` both give one `L` with two repetitions). Implicit repetitions of a
/// moveto come back as line commands. Empty or whitespace-only data yields no commands. Data that does not start
/// with a moveto gets an `M0,0` in front, so consumers always see a defined current point.
pub fn parse_path(data: &str) -> Result<Vec<PathCommand>> {
    let trimmed = data.trim_start();
    let source: Cow<'_, str> = match trimmed.chars().next() {
        Some(c) if !matches!(c, 'M' | 'm') && PathKind::from_letter(c).is_some() => {
            Cow::Owned(format!("M0 0 {trimmed}"))
        }
        _ => Cow::Borrowed(data),
    };

    let mut commands: Vec<PathCommand> = Vec::new();
    for segment in PathParser::from(source.as_ref()) {
        let segment = segment.map_err(|err| malformed_path(err.to_string()))?;
        let (kind, params) = segment_parts(segment);
        match commands.last_mut() {
            Some(last) if last.kind == kind && kind.arity() > 0 && !kind.is_move() => {
                last.params.extend(params)
            }
            _ => commands.push(PathCommand { kind, params }),
        }
    }
    Ok(commands)
}
