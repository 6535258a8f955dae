//! Places gradients in the flattened coordinate space of the path they paint.

use serde::Serialize;
use svgflat_geom::geom::point;
use svgflat_geom::{AffineTransform, Bounds, parse_transform_list};
use tracing::debug;

use crate::diagnostics::Diagnostics;
use crate::paint::normalize_color;
use crate::tree::{GradientKind, Node, NodeKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TileMode {
    Clamp,
    Mirror,
    Repeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GradientGeometry {
    Linear {
        start_x: f64,
        start_y: f64,
        end_x: f64,
        end_y: f64,
    },
    Radial {
        center_x: f64,
        center_y: f64,
        radius: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedStop {
    pub offset: f64,
    /// `#AARRGGBB` with the stop opacity folded in.
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradientPlacement {
    pub geometry: GradientGeometry,
    pub tile_mode: TileMode,
    pub stops: Vec<PlacedStop>,
}

/// Where a gradient is drawn: the painted path and the transform that flattened it.
pub struct GradientTarget<'a> {
    /// Bounds of the path after flattening.
    pub bounds: Bounds,
    /// Full transform applied to the path.
    pub transform: &'a AffineTransform,
    /// User space size used by `userSpaceOnUse`.
    pub user_width: f64,
    pub user_height: f64,
    /// Line of the painted element, for diagnostics.
    pub line: u32,
}

struct Coordinate {
    value: f64,
    is_percentage: bool,
}

pub fn place_gradient(
    gradient: &Node,
    target: &GradientTarget<'_>,
    diagnostics: &mut Diagnostics,
) -> Option<GradientPlacement> {
    let NodeKind::Gradient(kind) = gradient.kind else {
        return None;
    };
    if gradient.stops.is_empty() {
        diagnostics.error(gradient.line, "Gradient has no stop info");
        return None;
    }

    let user_space = gradient
        .attrs
        .get("gradientUnits")
        .is_some_and(|units| units == "userSpaceOnUse");
    let (start_x, start_y, width, height) = if user_space {
        (0.0, 0.0, target.user_width, target.user_height)
    } else {
        let b = &target.bounds;
        if b.is_empty() {
            return None;
        }
        (b.min_x, b.min_y, b.width(), b.height())
    };
    if width == 0.0 || height == 0.0 {
        debug!(line = target.line, "gradient covers no area");
        return None;
    }

    let mut local = match gradient.attrs.get("gradientTransform") {
        Some(value) => parse_transform_list(value).unwrap_or_else(|err| {
            debug!(%err, "ignoring gradientTransform");
            diagnostics.error(
                gradient.line,
                format!("Invalid attribute value: gradientTransform=\"{value}\""),
            );
            AffineTransform::identity()
        }),
        None => AffineTransform::identity(),
    };
    if user_space {
        local.pre_concatenate(target.transform);
    } else if !local.is_identity() {
        // Conjugate by the unit-square to bounding-box map so the transform acts in unit space.
        let mut bbox = AffineTransform::from_translation(start_x, start_y);
        bbox.scale(width, height);
        match bbox.create_inverse() {
            Ok(inverse) => {
                local.pre_concatenate(&bbox);
                local.concatenate(&inverse);
            }
            Err(err) => {
                debug!(%err, "degenerate bounding box");
                return None;
            }
        }
    }

    let mut coordinate = |name: &str, default: f64| -> Coordinate {
        let Some(raw) = gradient.attrs.get(name).map(|v| v.trim()) else {
            return Coordinate {
                value: default,
                is_percentage: false,
            };
        };
        if name == "r" && raw.starts_with('-') {
            return Coordinate {
                value: default,
                is_percentage: false,
            };
        }
        let parsed = match raw.strip_suffix('%') {
            Some(percent) => percent.trim().parse::<f64>().map(|v| (v / 100.0, true)),
            None => raw.parse::<f64>().map(|v| (v, false)),
        };
        match parsed {
            Ok((value, is_percentage)) => Coordinate {
                value,
                is_percentage,
            },
            Err(_) => {
                diagnostics.error(
                    gradient.line,
                    format!("Unsupported coordinate value: {name}=\"{raw}\""),
                );
                Coordinate {
                    value: default,
                    is_percentage: false,
                }
            }
        }
    };
    let mut place = |name: &str, default: f64, origin: f64, extent: f64| -> f64 {
        let c = coordinate(name, default);
        if !user_space || c.is_percentage {
            c.value * extent + origin
        } else {
            c.value
        }
    };

    let geometry = match kind {
        GradientKind::Linear => {
            let x1 = place("x1", 0.0, start_x, width);
            let y1 = place("y1", 0.0, start_y, height);
            let x2 = place("x2", 1.0, start_x, width);
            let y2 = place("y2", 0.0, start_y, height);
            let start = local.transform_point(point(x1, y1));
            let end = local.transform_point(point(x2, y2));
            GradientGeometry::Linear {
                start_x: start.x,
                start_y: start.y,
                end_x: end.x,
                end_y: end.y,
            }
        }
        GradientKind::Radial => {
            let cx = place("cx", 0.5, start_x, width);
            let cy = place("cy", 0.5, start_y, height);
            let r = place("r", 0.5, 0.0, width.max(height));
            let center = local.transform_point(point(cx, cy));
            let radius = local.delta_transform_point(point(r, 0.0));
            GradientGeometry::Radial {
                center_x: center.x,
                center_y: center.y,
                radius: radius.x.hypot(radius.y),
            }
        }
    };

    let tile_mode = match gradient.attrs.get("spreadMethod").map(|s| s.trim()) {
        None | Some("pad") => TileMode::Clamp,
        Some("reflect") => TileMode::Mirror,
        Some("repeat") => TileMode::Repeat,
        Some(other) => {
            diagnostics.error(gradient.line, format!("Unsupported spreadMethod {other}"));
            TileMode::Clamp
        }
    };

    let mut stops: Vec<PlacedStop> = gradient
        .stops
        .iter()
        .map(|stop| PlacedStop {
            offset: stop.offset,
            color: stop_color(&stop.color, stop.opacity, gradient.line, diagnostics),
        })
        .collect();
    if let [only] = stops.as_slice() {
        diagnostics.warning(gradient.line, "Gradient has only one color stop");
        let color = only.color.clone();
        stops.push(PlacedStop { offset: 1.0, color });
    }

    Some(GradientPlacement {
        geometry,
        tile_mode,
        stops,
    })
}

fn stop_color(color: &str, opacity: f64, line: u32, diagnostics: &mut Diagnostics) -> String {
    let hex = normalize_color(color).unwrap_or_else(|| {
        diagnostics.error(line, format!("Unsupported color format \"{color}\""));
        "#000000".to_string()
    });
    apply_alpha(&hex, opacity)
}

/// Multiplies the alpha of a `#RRGGBB`/`#AARRGGBB` color by `opacity`, returning `#AARRGGBB`.
pub fn apply_alpha(hex: &str, opacity: f64) -> String {
    let digits = hex.trim_start_matches('#');
    let (alpha, rgb) = match digits.len() {
        8 => (u8::from_str_radix(&digits[..2], 16).unwrap_or(u8::MAX), &digits[2..]),
        _ => (u8::MAX, digits),
    };
    let alpha = (f64::from(alpha) * opacity.clamp(0.0, 1.0)).round() as u8;
    format!("#{alpha:02X}{rgb}")
}
