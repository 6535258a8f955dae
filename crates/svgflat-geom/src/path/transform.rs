use tracing::debug;

use super::{PathCommand, PathFormatter, PathKind, parse_path};
use crate::affine::AffineTransform;
use crate::ellipse::{ArcParams, EllipseSolver};
use crate::error::Result;
use crate::geom::{Point, point};

/// Running position in untransformed coordinates.
#[derive(Debug, Clone, Copy)]
struct Cursor {
    current: Point,
    segment_start: Point,
}

/// True when a relative moveto directly follows a close.
///
/// Such paths are always rewritten (the `m` becomes an absolute `M`) because some consumers
/// resolve `m` after `z` against the wrong point.
pub fn has_rel_move_after_close(commands: &[PathCommand]) -> bool {
    commands
        .windows(2)
        .any(|w| w[0].kind.is_close() && w[1].kind == PathKind::RelMoveTo)
}

/// Applies `transform` to every command in place.
///
/// Absolute coordinates are mapped through the full transform and relative ones through its
/// linear part. `H`/`V` (and `h`/`v` under non-translations) become line commands, since axis
/// alignment does not survive rotation. Arcs are re-solved with [`EllipseSolver`].
///
/// Every command is checked for a whole number of repetitions before anything is rewritten, so
/// on error the commands are left untouched.
pub fn transform_path(transform: &AffineTransform, commands: &mut [PathCommand]) -> Result<()> {
    for command in commands.iter() {
        command.check_arity()?;
    }
    let translation_only = transform.is_translation_only();
    let mut cursor = Cursor {
        current: point(0.0, 0.0),
        segment_start: point(0.0, 0.0),
    };
    let mut previous: Option<PathKind> = None;
    for command in commands.iter_mut() {
        let kind = command.kind;
        transform_command(transform, translation_only, command, &mut cursor, previous);
        previous = Some(kind);
    }
    Ok(())
}

fn last_pair(params: &[f64]) -> Point {
    let n = params.len();
    point(params[n - 2], params[n - 1])
}

fn transform_command(
    transform: &AffineTransform,
    translation_only: bool,
    command: &mut PathCommand,
    cursor: &mut Cursor,
    previous: Option<PathKind>,
) {
    let params = &mut command.params;
    let len = params.len();
    let step = command.kind.arity();
    match command.kind {
        PathKind::Close | PathKind::RelClose => {
            cursor.current = cursor.segment_start;
        }
        PathKind::MoveTo => {
            cursor.segment_start = point(params[0], params[1]);
            cursor.current = last_pair(params);
            transform.transform_in_place(params, 0, 0, len / 2);
        }
        PathKind::LineTo
        | PathKind::SmoothQuadTo
        | PathKind::CubicTo
        | PathKind::SmoothCubicTo
        | PathKind::QuadTo => {
            cursor.current = last_pair(params);
            transform.transform_in_place(params, 0, 0, len / 2);
        }
        PathKind::RelMoveTo if previous.is_some_and(PathKind::is_close) => {
            command.kind = PathKind::MoveTo;
            params[0] += cursor.segment_start.x;
            params[1] += cursor.segment_start.y;
            cursor.segment_start = point(params[0], params[1]);
            for i in (step..len).step_by(step) {
                params[i] += params[i - step];
                params[i + 1] += params[i + 1 - step];
            }
            cursor.current = last_pair(params);
            transform.transform_in_place(params, 0, 0, len / 2);
        }
        PathKind::RelMoveTo => {
            cursor.current.x += params[0];
            cursor.current.y += params[1];
            cursor.segment_start = cursor.current;
            if previous.is_none() {
                // A leading `m` is absolute.
                transform.transform_in_place(params, 0, 0, 1);
            } else if !translation_only {
                transform.delta_transform_in_place(params, 0, 0, 1);
            }
            for pair in params[2..].chunks_exact(2) {
                cursor.current.x += pair[0];
                cursor.current.y += pair[1];
            }
            if !translation_only {
                transform.delta_transform_in_place(params, 2, 2, (len - 2) / 2);
            }
        }
        PathKind::RelLineTo
        | PathKind::RelSmoothQuadTo
        | PathKind::RelCubicTo
        | PathKind::RelSmoothCubicTo
        | PathKind::RelQuadTo => {
            for repetition in params.chunks_exact(step) {
                cursor.current.x += repetition[step - 2];
                cursor.current.y += repetition[step - 1];
            }
            if !translation_only {
                transform.delta_transform_in_place(params, 0, 0, len / 2);
            }
        }
        PathKind::HorizontalTo => {
            let mut pairs = Vec::with_capacity(len * 2);
            for &x in params.iter() {
                pairs.extend([x, cursor.current.y]);
                cursor.current.x = x;
            }
            transform.transform_in_place(&mut pairs, 0, 0, len);
            command.kind = PathKind::LineTo;
            *params = pairs;
        }
        PathKind::VerticalTo => {
            let mut pairs = Vec::with_capacity(len * 2);
            for &y in params.iter() {
                pairs.extend([cursor.current.x, y]);
                cursor.current.y = y;
            }
            transform.transform_in_place(&mut pairs, 0, 0, len);
            command.kind = PathKind::LineTo;
            *params = pairs;
        }
        PathKind::RelHorizontalTo | PathKind::RelVerticalTo => {
            let horizontal = command.kind == PathKind::RelHorizontalTo;
            for &d in params.iter() {
                if horizontal {
                    cursor.current.x += d;
                } else {
                    cursor.current.y += d;
                }
            }
            if translation_only {
                debug!(kind = %command.kind, "keeping axis-aligned relative line under translation");
            } else {
                let mut pairs = Vec::with_capacity(len * 2);
                for &d in params.iter() {
                    pairs.extend(if horizontal { [d, 0.0] } else { [0.0, d] });
                }
                transform.delta_transform_in_place(&mut pairs, 0, 0, len);
                command.kind = PathKind::RelLineTo;
                *params = pairs;
            }
        }
        PathKind::ArcTo => {
            for i in (0..len).step_by(step) {
                let end = point(params[i + 5], params[i + 6]);
                if !translation_only {
                    resolve_arc(transform, cursor.current, &mut params[i..i + 5], end);
                }
                cursor.current = end;
                transform.transform_in_place(params, i + 5, i + 5, 1);
            }
        }
        PathKind::RelArcTo => {
            for i in (0..len).step_by(step) {
                let start = cursor.current;
                cursor.current.x += params[i + 5];
                cursor.current.y += params[i + 6];
                if !translation_only {
                    let end = cursor.current;
                    resolve_arc(transform, start, &mut params[i..i + 5], end);
                    transform.delta_transform_in_place(params, i + 5, i + 5, 1);
                }
            }
        }
    }
}

/// Rewrites `rx ry rotation large-arc sweep` for the transformed arc. On a degenerate solve the
/// parameters are left as they are.
fn resolve_arc(transform: &AffineTransform, start: Point, shape: &mut [f64], end: Point) {
    let arc = ArcParams {
        rx: shape[0],
        ry: shape[1],
        x_axis_rotation_deg: shape[2],
        large_arc: shape[3] != 0.0,
        sweep: shape[4] != 0.0,
    };
    match EllipseSolver::solve(transform, start, arc, end) {
        Ok(solved) => {
            shape[0] = solved.rx;
            shape[1] = solved.ry;
            shape[2] = solved.rotation_deg;
            if solved.direction_changed {
                shape[4] = 1.0 - shape[4];
            }
        }
        Err(err) => {
            debug!(%err, "keeping original arc parameters");
        }
    }
}

/// Parses, transforms and re-formats path data.
///
/// Data is returned unchanged when the transform is the identity and no relative moveto follows a
/// close.
pub fn transform_path_data(
    transform: &AffineTransform,
    data: &str,
    formatter: &PathFormatter,
) -> Result<String> {
    let mut commands = parse_path(data)?;
    if transform.is_identity() && !has_rel_move_after_close(&commands) {
        return Ok(data.to_string());
    }
    transform_path(transform, &mut commands)?;
    formatter.format(&commands)
}
