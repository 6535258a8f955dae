//! Tight bounding boxes for line/quad/cubic paths.
//!
//! End points always extend the bounds. Curve extrema are only solved for when a control point
//! lies outside the bounds seen so far, because a Bezier segment stays inside the hull of its
//! control points.

use crate::arc::{CubicSink, arc_to_cubics};
use crate::geom::{Point, Rect, point, rect};
use crate::path::{PathCommand, PathKind};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Default for Bounds {
    fn default() -> Self {
        Self::empty()
    }
}

impl Bounds {
    pub fn empty() -> Self {
        Self {
            min_x: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            min_y: f64::INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    pub fn include_point(&mut self, p: Point) {
        self.min_x = self.min_x.min(p.x);
        self.max_x = self.max_x.max(p.x);
        self.min_y = self.min_y.min(p.y);
        self.max_y = self.max_y.max(p.y);
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            min_x: self.min_x.min(other.min_x),
            max_x: self.max_x.max(other.max_x),
            min_y: self.min_y.min(other.min_y),
            max_y: self.max_y.max(other.max_y),
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn to_rect(&self) -> Option<Rect> {
        if self.is_empty() {
            return None;
        }
        Some(rect(self.min_x, self.min_y, self.width(), self.height()))
    }
}

/// Real roots of `a·t² + b·t + c = 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Roots {
    /// `a == b == 0`: every `t` or none, depending on `c`.
    Degenerate,
    None,
    One(f64),
    Two(f64, f64),
}

impl Roots {
    pub fn iter(&self) -> impl Iterator<Item = f64> {
        let (first, second) = match *self {
            Roots::Degenerate | Roots::None => (None, None),
            Roots::One(t) => (Some(t), None),
            Roots::Two(t0, t1) => (Some(t0), Some(t1)),
        };
        first.into_iter().chain(second)
    }
}

/// Solves with the cancellation-free form `q = -(b + sign(b)·√d) / 2`, roots `q/a` and `c/q`.
pub fn solve_quadratic(a: f64, b: f64, c: f64) -> Roots {
    if a == 0.0 {
        if b == 0.0 {
            return Roots::Degenerate;
        }
        return Roots::One(-c / b);
    }
    let d = b * b - 4.0 * a * c;
    if d < 0.0 {
        return Roots::None;
    }
    let mut d = d.sqrt();
    if b < 0.0 {
        d = -d;
    }
    let q = (b + d) / -2.0;
    if q != 0.0 {
        Roots::Two(q / a, c / q)
    } else {
        Roots::One(q / a)
    }
}

/// Distance to the next representable value above `|value|`.
fn ulp(value: f64) -> f64 {
    let v = value.abs();
    v.next_up() - v
}

fn extend_axis(min: &mut f64, max: &mut f64, v: f64, margin: f64) {
    if v - margin < *min {
        *min = v - margin;
    }
    if v + margin > *max {
        *max = v + margin;
    }
}

/// Extends one axis of the bounds with the interior extremum of a quadratic Bezier.
pub fn accumulate_quad_extrema(min: &mut f64, max: &mut f64, p0: f64, ctrl: f64, p2: f64) {
    if !(ctrl < *min || ctrl > *max) {
        return;
    }
    let d10 = ctrl - p0;
    let c2 = (p2 - ctrl) - d10;
    let c1 = 2.0 * d10;
    let c0 = p0;
    let t = -c1 / (2.0 * c2);
    if t > 0.0 && t < 1.0 {
        let v = c0 + t * (c1 + t * c2);
        let margin = ulp(c0.abs() + c1.abs() + c2.abs());
        extend_axis(min, max, v, margin);
    }
}

/// Extends one axis of the bounds with the interior extrema of a cubic Bezier.
pub fn accumulate_cubic_extrema(
    min: &mut f64,
    max: &mut f64,
    p0: f64,
    ctrl1: f64,
    ctrl2: f64,
    p3: f64,
) {
    let outside = |v: f64| v < *min || v > *max;
    if !(outside(ctrl1) || outside(ctrl2)) {
        return;
    }
    let d21 = 3.0 * (ctrl2 - ctrl1);
    let d10 = 3.0 * (ctrl1 - p0);
    let c3 = (p3 - p0) - d21;
    let c2 = d21 - d10;
    let c1 = d10;
    let c0 = p0;

    let roots = solve_quadratic(3.0 * c3, 2.0 * c2, c1);
    let margin = ulp(c0.abs() + c1.abs() + c2.abs() + c3.abs());
    for t in roots.iter() {
        if t > 0.0 && t < 1.0 {
            let v = c0 + t * (c1 + t * (c2 + t * c3));
            extend_axis(min, max, v, margin);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    MoveTo(Point),
    LineTo(Point),
    QuadTo(Point, Point),
    CubicTo(Point, Point, Point),
    Close,
}

/// An absolute line/quad/cubic path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentPath {
    segments: Vec<Segment>,
}

impl SegmentPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn move_to(&mut self, to: Point) {
        self.segments.push(Segment::MoveTo(to));
    }

    pub fn line_to(&mut self, to: Point) {
        self.segments.push(Segment::LineTo(to));
    }

    pub fn quad_to(&mut self, ctrl: Point, to: Point) {
        self.segments.push(Segment::QuadTo(ctrl, to));
    }

    pub fn cubic_to(&mut self, ctrl1: Point, ctrl2: Point, to: Point) {
        self.segments.push(Segment::CubicTo(ctrl1, ctrl2, to));
    }

    pub fn close(&mut self) {
        self.segments.push(Segment::Close);
    }

    /// Bounds of the geometry, empty until the first moveto.
    pub fn bounds(&self) -> Bounds {
        let mut bounds = Bounds::empty();
        let mut seeded = false;
        let mut last = point(0.0, 0.0);
        let mut start = point(0.0, 0.0);
        for segment in &self.segments {
            let end = match *segment {
                Segment::MoveTo(p) => {
                    seeded = true;
                    start = p;
                    p
                }
                Segment::LineTo(p) | Segment::QuadTo(_, p) | Segment::CubicTo(_, _, p) => p,
                Segment::Close => start,
            };
            if !seeded {
                continue;
            }
            bounds.include_point(end);
            match *segment {
                Segment::QuadTo(c, p) => {
                    accumulate_quad_extrema(&mut bounds.min_x, &mut bounds.max_x, last.x, c.x, p.x);
                    accumulate_quad_extrema(&mut bounds.min_y, &mut bounds.max_y, last.y, c.y, p.y);
                }
                Segment::CubicTo(c1, c2, p) => {
                    accumulate_cubic_extrema(
                        &mut bounds.min_x,
                        &mut bounds.max_x,
                        last.x,
                        c1.x,
                        c2.x,
                        p.x,
                    );
                    accumulate_cubic_extrema(
                        &mut bounds.min_y,
                        &mut bounds.max_y,
                        last.y,
                        c1.y,
                        c2.y,
                        p.y,
                    );
                }
                _ => {}
            }
            last = end;
        }
        bounds
    }

    /// Replays SVG path commands as absolute segments.
    pub fn from_commands(commands: &[PathCommand]) -> Self {
        let mut path = SegmentPath::new();
        let mut current = point(0.0, 0.0);
        let mut start = point(0.0, 0.0);
        // Reflection sources for S/s and T/t.
        let mut last_cubic_ctrl: Option<Point> = None;
        let mut last_quad_ctrl: Option<Point> = None;

        for command in commands {
            let relative = command.kind.is_relative();
            let abs = |base: Point, x: f64, y: f64| {
                if relative {
                    point(base.x + x, base.y + y)
                } else {
                    point(x, y)
                }
            };
            let step = command.kind.arity();
            if step == 0 {
                path.close();
                current = start;
                last_cubic_ctrl = None;
                last_quad_ctrl = None;
                continue;
            }
            for (rep, p) in command.params.chunks_exact(step).enumerate() {
                let (mut cubic_ctrl, mut quad_ctrl) = (None, None);
                match command.kind.to_absolute() {
                    PathKind::MoveTo => {
                        let to = abs(current, p[0], p[1]);
                        if rep == 0 {
                            path.move_to(to);
                            start = to;
                        } else {
                            path.line_to(to);
                        }
                        current = to;
                    }
                    PathKind::LineTo => {
                        current = abs(current, p[0], p[1]);
                        path.line_to(current);
                    }
                    PathKind::HorizontalTo => {
                        current = point(if relative { current.x + p[0] } else { p[0] }, current.y);
                        path.line_to(current);
                    }
                    PathKind::VerticalTo => {
                        current = point(current.x, if relative { current.y + p[0] } else { p[0] });
                        path.line_to(current);
                    }
                    PathKind::CubicTo => {
                        let c1 = abs(current, p[0], p[1]);
                        let c2 = abs(current, p[2], p[3]);
                        let to = abs(current, p[4], p[5]);
                        path.cubic_to(c1, c2, to);
                        cubic_ctrl = Some(c2);
                        current = to;
                    }
                    PathKind::SmoothCubicTo => {
                        let c1 = reflect(last_cubic_ctrl, current);
                        let c2 = abs(current, p[0], p[1]);
                        let to = abs(current, p[2], p[3]);
                        path.cubic_to(c1, c2, to);
                        cubic_ctrl = Some(c2);
                        current = to;
                    }
                    PathKind::QuadTo => {
                        let c = abs(current, p[0], p[1]);
                        let to = abs(current, p[2], p[3]);
                        path.quad_to(c, to);
                        quad_ctrl = Some(c);
                        current = to;
                    }
                    PathKind::SmoothQuadTo => {
                        let c = reflect(last_quad_ctrl, current);
                        let to = abs(current, p[0], p[1]);
                        path.quad_to(c, to);
                        quad_ctrl = Some(c);
                        current = to;
                    }
                    PathKind::ArcTo => {
                        let to = abs(current, p[5], p[6]);
                        arc_to_cubics(current, to, p[0], p[1], p[2], p[3] != 0.0, p[4] != 0.0, &mut path);
                        current = to;
                    }
                    _ => {}
                }
                last_cubic_ctrl = cubic_ctrl;
                last_quad_ctrl = quad_ctrl;
            }
        }
        path
    }
}

fn reflect(ctrl: Option<Point>, current: Point) -> Point {
    match ctrl {
        Some(c) => point(2.0 * current.x - c.x, 2.0 * current.y - c.y),
        None => current,
    }
}

impl CubicSink for SegmentPath {
    fn cubic_to(&mut self, ctrl1: Point, ctrl2: Point, to: Point) {
        SegmentPath::cubic_to(self, ctrl1, ctrl2, to);
    }
}

/// Bounds of SVG path commands, with arcs flattened to cubics.
pub fn path_bounds(commands: &[PathCommand]) -> Bounds {
    SegmentPath::from_commands(commands).bounds()
}
