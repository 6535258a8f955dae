//! Elliptical arc to cubic Bezier approximation.
//!
//! Each emitted cubic spans at most an eighth of a turn (π/4), using the tangent-length construction from
//! L. Maisonobe, "Drawing an elliptical arc using polylines, quadratic or cubic Bezier curves".

use std::f64::consts::{PI, TAU};

use tracing::debug;

use crate::error::Result;
use crate::geom::{Point, point};
use crate::path::{PathCommand, PathKind};

/// Receives cubic segments; the start point is implied by the previous segment.
pub trait CubicSink {
    fn cubic_to(&mut self, ctrl1: Point, ctrl2: Point, to: Point);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicSegment {
    pub ctrl1: Point,
    pub ctrl2: Point,
    pub to: Point,
}

impl CubicSink for Vec<CubicSegment> {
    fn cubic_to(&mut self, ctrl1: Point, ctrl2: Point, to: Point) {
        self.push(CubicSegment { ctrl1, ctrl2, to });
    }
}

/// Appends cubics approximating the SVG arc from `start` to `end`.
///
/// Coincident endpoints emit nothing. A zero radius emits a single straight cubic. Radii too
/// small to connect the endpoints are scaled up until they fit.
#[allow(clippy::too_many_arguments)]
pub fn arc_to_cubics(
    start: Point,
    end: Point,
    rx: f64,
    ry: f64,
    x_axis_rotation_deg: f64,
    large_arc: bool,
    sweep: bool,
    sink: &mut impl CubicSink,
) {
    if start == end {
        return;
    }
    let (mut a, mut b) = (rx.abs(), ry.abs());
    if a == 0.0 || b == 0.0 {
        let d = end - start;
        sink.cubic_to(start + d / 3.0, start + d * (2.0 / 3.0), end);
        return;
    }

    let theta = x_axis_rotation_deg.to_radians();
    let (sin_theta, cos_theta) = theta.sin_cos();

    loop {
        // Unit circle frame.
        let x0p = (start.x * cos_theta + start.y * sin_theta) / a;
        let y0p = (-start.x * sin_theta + start.y * cos_theta) / b;
        let x1p = (end.x * cos_theta + end.y * sin_theta) / a;
        let y1p = (-end.x * sin_theta + end.y * cos_theta) / b;

        let dx = x0p - x1p;
        let dy = y0p - y1p;
        let xm = (x0p + x1p) / 2.0;
        let ym = (y0p + y1p) / 2.0;
        let dsq = dx * dx + dy * dy;
        if dsq == 0.0 {
            return;
        }
        let disc = 1.0 / dsq - 0.25;
        if disc < 0.0 {
            let adjust = dsq.sqrt() / 1.99999;
            debug!(adjust, "scaling arc radii to reach the end point");
            a *= adjust;
            b *= adjust;
            continue;
        }

        let s = disc.sqrt();
        let (sdx, sdy) = (s * dx, s * dy);
        let (mut cx, mut cy) = if large_arc == sweep {
            (xm - sdy, ym + sdx)
        } else {
            (xm + sdy, ym - sdx)
        };

        let eta0 = (y0p - cy).atan2(x0p - cx);
        let eta1 = (y1p - cy).atan2(x1p - cx);
        let mut sweep_angle = eta1 - eta0;
        if sweep != (sweep_angle >= 0.0) {
            if sweep_angle > 0.0 {
                sweep_angle -= TAU;
            } else {
                sweep_angle += TAU;
            }
        }

        cx *= a;
        cy *= b;
        let center = point(cx * cos_theta - cy * sin_theta, cx * sin_theta + cy * cos_theta);
        emit_segments(center, a, b, theta, start, end, eta0, sweep_angle, sink);
        return;
    }
}

#[allow(clippy::too_many_arguments)]
fn emit_segments(
    center: Point,
    a: f64,
    b: f64,
    theta: f64,
    start: Point,
    end: Point,
    eta_start: f64,
    sweep: f64,
    sink: &mut impl CubicSink,
) {
    let segments = (sweep * 4.0 / PI).abs().ceil().max(1.0) as usize;
    let per_segment = sweep / segments as f64;
    let (sin_theta, cos_theta) = theta.sin_cos();

    let tangent = |eta: f64| {
        let (sin_eta, cos_eta) = eta.sin_cos();
        point(
            -a * cos_theta * sin_eta - b * sin_theta * cos_eta,
            -a * sin_theta * sin_eta + b * cos_theta * cos_eta,
        )
    };

    let mut eta1 = eta_start;
    let mut e1 = start;
    let mut ep1 = tangent(eta1);
    for i in 0..segments {
        let eta2 = eta1 + per_segment;
        let (sin_eta2, cos_eta2) = eta2.sin_cos();
        let e2 = if i + 1 == segments {
            end
        } else {
            point(
                center.x + a * cos_theta * cos_eta2 - b * sin_theta * sin_eta2,
                center.y + a * sin_theta * cos_eta2 + b * cos_theta * sin_eta2,
            )
        };
        let ep2 = tangent(eta2);
        let tan_half = ((eta2 - eta1) / 2.0).tan();
        let alpha = (eta2 - eta1).sin() * ((4.0 + 3.0 * tan_half * tan_half).sqrt() - 1.0) / 3.0;
        sink.cubic_to(
            point(e1.x + alpha * ep1.x, e1.y + alpha * ep1.y),
            point(e2.x - alpha * ep2.x, e2.y - alpha * ep2.y),
            e2,
        );
        eta1 = eta2;
        e1 = e2;
        ep1 = ep2;
    }
}

/// Rewrites every arc command as absolute cubic commands; other commands pass through.
pub fn arcs_to_cubics(commands: &[PathCommand]) -> Result<Vec<PathCommand>> {
    let mut out = Vec::with_capacity(commands.len());
    let mut current = point(0.0, 0.0);
    let mut start = point(0.0, 0.0);
    for command in commands {
        if !command.kind.is_arc() {
            advance(command, &mut current, &mut start);
            out.push(command.clone());
            continue;
        }
        let relative = command.kind.is_relative();
        let mut cubics: Vec<CubicSegment> = Vec::new();
        for p in command.params.chunks_exact(7) {
            let to = if relative {
                point(current.x + p[5], current.y + p[6])
            } else {
                point(p[5], p[6])
            };
            arc_to_cubics(current, to, p[0], p[1], p[2], p[3] != 0.0, p[4] != 0.0, &mut cubics);
            current = to;
        }
        if cubics.is_empty() {
            // Every repetition collapsed onto its start point.
            continue;
        }
        let params = cubics
            .iter()
            .flat_map(|c| [c.ctrl1.x, c.ctrl1.y, c.ctrl2.x, c.ctrl2.y, c.to.x, c.to.y])
            .collect();
        out.push(PathCommand::new(PathKind::CubicTo, params)?);
    }
    Ok(out)
}

/// Moves the pen over one command in untransformed absolute terms.
fn advance(command: &PathCommand, current: &mut Point, start: &mut Point) {
    let relative = command.kind.is_relative();
    let step = command.kind.arity();
    if step == 0 {
        *current = *start;
        return;
    }
    for (rep, p) in command.params.chunks_exact(step).enumerate() {
        let (x, y) = match command.kind.to_absolute() {
            PathKind::HorizontalTo => (p[0], if relative { 0.0 } else { current.y }),
            PathKind::VerticalTo => (if relative { 0.0 } else { current.x }, p[0]),
            _ => (p[step - 2], p[step - 1]),
        };
        *current = if relative {
            point(current.x + x, current.y + y)
        } else {
            point(x, y)
        };
        if command.kind.is_move() && rep == 0 {
            *start = *current;
        }
    }
}
