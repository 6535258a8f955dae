//! Re-solving elliptical arc parameters under an affine transform.
//!
//! An SVG arc is described by radii and an axis rotation, which do not transform linearly. The
//! solver samples three points of the source ellipse, maps them through the transform, and fits
//! the centred conic `A·x² + B·xy + C·y² = 1` through them to recover the new radii and rotation.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use crate::affine::AffineTransform;
use crate::error::{Error, Result};
use crate::geom::{Point, Vector, point};

const RELATIVE_EPSILON: f64 = 1e-12;

/// Arc shape parameters as written in path data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcParams {
    pub rx: f64,
    pub ry: f64,
    pub x_axis_rotation_deg: f64,
    pub large_arc: bool,
    pub sweep: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolvedArc {
    pub rx: f64,
    pub ry: f64,
    pub rotation_deg: f64,
    /// The transform reverses orientation, so the sweep flag must be inverted.
    pub direction_changed: bool,
}

pub struct EllipseSolver;

impl EllipseSolver {
    /// Computes the arc parameters that describe the image of the arc from `start` to `end`.
    ///
    /// `start` and `end` are absolute and untransformed. The result may be an equivalent
    /// parameterization of the same ellipse (radii swapped with the rotation shifted by 90°).
    pub fn solve(
        transform: &AffineTransform,
        start: Point,
        arc: ArcParams,
        end: Point,
    ) -> Result<SolvedArc> {
        if arc.rx == 0.0 || arc.ry == 0.0 {
            return Err(degenerate("zero radius, the arc is a straight line"));
        }
        let phi = arc.x_axis_rotation_deg.to_radians();
        let center = original_center(start, end, arc.rx, arc.ry, phi, arc.large_arc, arc.sweep)?;

        let major = rotate(point(arc.rx, 0.0), phi) + center.to_vector();
        let minor = rotate(point(0.0, arc.ry), phi) + center.to_vector();
        let middle_r = arc.rx * arc.ry
            / (arc.ry * FRAC_PI_4.cos()).hypot(arc.rx * FRAC_PI_4.sin());
        let middle = rotate(
            point(middle_r * FRAC_PI_4.cos(), middle_r * FRAC_PI_4.sin()),
            phi,
        ) + center.to_vector();

        let dst_middle = transform.transform_point(middle);
        let dst_major = transform.transform_point(major);
        let dst_minor = transform.transform_point(minor);
        let dst_center = transform.transform_point(center);

        let direction_changed = cross(middle, major, minor) * cross(dst_middle, dst_major, dst_minor)
            < 0.0;

        let (rx, ry, rotation_deg) = fit_centered_conic(
            dst_middle - dst_center,
            dst_major - dst_center,
            dst_minor - dst_center,
        )?;
        Ok(SolvedArc {
            rx,
            ry,
            rotation_deg,
            direction_changed,
        })
    }
}

fn degenerate(reason: &'static str) -> Error {
    Error::DegenerateEllipseSolve { reason }
}

fn rotate(p: Point, radians: f64) -> Point {
    let (sin, cos) = radians.sin_cos();
    point(p.x * cos - p.y * sin, p.x * sin + p.y * cos)
}

/// Orientation of the triangle (middle, major, minor).
fn cross(middle: Point, major: Point, minor: Point) -> f64 {
    (major - middle).cross(minor - middle)
}

/// Endpoint-to-centre conversion (SVG implementation notes, F.6.5).
fn original_center(
    p1: Point,
    p2: Point,
    rx: f64,
    ry: f64,
    phi: f64,
    large_arc: bool,
    sweep: bool,
) -> Result<Point> {
    let (sin_phi, cos_phi) = phi.sin_cos();
    let dx = (p1.x - p2.x) / 2.0;
    let dy = (p1.y - p2.y) / 2.0;
    let x1 = cos_phi * dx + sin_phi * dy;
    let y1 = -sin_phi * dx + cos_phi * dy;

    let (rx_sq, ry_sq) = (rx * rx, ry * ry);
    let (x1_sq, y1_sq) = (x1 * x1, y1 * y1);
    let denominator = rx_sq * y1_sq + ry_sq * x1_sq;
    if denominator == 0.0 {
        return Err(degenerate("arc endpoints coincide"));
    }
    let mut factor = ((rx_sq * ry_sq - rx_sq * y1_sq - ry_sq * x1_sq) / denominator)
        .max(0.0)
        .sqrt();
    if large_arc == sweep {
        factor = -factor;
    }
    let cx = factor * rx * y1 / ry;
    let cy = -factor * ry * x1 / rx;
    Ok(point(
        cos_phi * cx - sin_phi * cy + (p1.x + p2.x) / 2.0,
        sin_phi * cx + cos_phi * cy + (p1.y + p2.y) / 2.0,
    ))
}

/// Fits `A·x² + B·xy + C·y² = 1` through three centre-relative points and returns
/// `(rx, ry, rotation_deg)`.
fn fit_centered_conic(middle: Vector, major: Vector, minor: Vector) -> Result<(f64, f64, f64)> {
    let (m11, m12, m13) = (middle.x * middle.x, middle.x * middle.y, middle.y * middle.y);
    let (m21, m22, m23) = (major.x * major.x, major.x * major.y, major.y * major.y);
    let (m31, m32, m33) = (minor.x * minor.x, minor.x * minor.y, minor.y * minor.y);

    let det = -(m13 * m22 * m31 - m12 * m23 * m31 - m13 * m21 * m32 + m11 * m23 * m32
        + m12 * m21 * m33
        - m11 * m22 * m33);
    if det == 0.0 || !det.is_finite() {
        return Err(degenerate("sample points do not determine a conic"));
    }
    let a = (-m13 * m22 + m12 * m23 + m13 * m32 - m23 * m32 - m12 * m33 + m22 * m33) / det;
    let b = (m13 * m21 - m11 * m23 - m13 * m31 + m23 * m31 + m11 * m33 - m21 * m33) / det;
    let c = (m12 * m21 - m11 * m22 - m12 * m31 + m22 * m31 + m11 * m32 - m21 * m32) / -det;

    // A = cos²t/a² + sin²t/b², B = 2·cos t·sin t·(1/a² - 1/b²), C = sin²t/a² + cos²t/b²
    // A circle needs A = C and B = 0; at 45° A = C holds on its own and B carries the tilt.
    let scale = a.abs().max(c.abs());
    if (a - c).abs() <= RELATIVE_EPSILON * scale && b.abs() <= RELATIVE_EPSILON * scale {
        let radius = major.length();
        return Ok((radius, radius, 0.0));
    }
    // Division by an exact zero gives ±inf, so `atan` still lands on ±90°.
    let double_theta = (b / (a - c)).atan();
    let sin_double_theta = double_theta.sin();
    if sin_double_theta.abs() <= RELATIVE_EPSILON {
        return Ok((checked_sqrt_inv(a)?, checked_sqrt_inv(c)?, 0.0));
    }
    let b_sq_inv = (a + c + b / sin_double_theta) / 2.0;
    let a_sq_inv = a + c - b_sq_inv;
    let rx = checked_sqrt_inv(a_sq_inv)?;
    let ry = checked_sqrt_inv(b_sq_inv)?;
    Ok((rx, ry, (FRAC_PI_2 + double_theta / 2.0).to_degrees()))
}

fn checked_sqrt_inv(value: f64) -> Result<f64> {
    if value > 0.0 && value.is_finite() {
        Ok((1.0 / value).sqrt())
    } else {
        Err(degenerate("recovered axis length is not positive"))
    }
}
