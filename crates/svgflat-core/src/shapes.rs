//! Basic shapes rewritten as path data.

use std::fmt::Write as _;
use std::str::FromStr;

use rustc_hash::FxHashMap;
use svgtypes::{Length, LengthUnit, PointsParser};

pub const SHAPE_TAGS: &[&str] = &["rect", "circle", "ellipse", "line", "polygon", "polyline"];

pub fn is_shape(tag: &str) -> bool {
    SHAPE_TAGS.contains(&tag)
}

/// An attribute whose value could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidAttribute {
    pub name: String,
    pub value: String,
}

impl InvalidAttribute {
    fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

/// Reference sizes for percentage lengths.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LengthContext {
    pub width: f64,
    pub height: f64,
}

impl LengthContext {
    fn diagonal(&self) -> f64 {
        ((self.width * self.width + self.height * self.height) / 2.0).sqrt()
    }
}

#[derive(Debug, Clone, Copy)]
enum Axis {
    X,
    Y,
    Diagonal,
}

/// Resolves a length to user units. Percentages are taken of `base`.
pub fn resolve_length(length: Length, base: f64) -> f64 {
    let n = length.number;
    match length.unit {
        LengthUnit::None | LengthUnit::Px => n,
        LengthUnit::Percent => n / 100.0 * base,
        LengthUnit::In => n * 96.0,
        LengthUnit::Cm => n * 96.0 / 2.54,
        LengthUnit::Mm => n * 96.0 / 25.4,
        LengthUnit::Pt => n * 4.0 / 3.0,
        LengthUnit::Pc => n * 16.0,
        LengthUnit::Em => n * 16.0,
        LengthUnit::Ex => n * 8.0,
    }
}

/// Parses a coordinate or length attribute value into user units.
pub fn parse_length(value: &str, base: f64) -> Option<f64> {
    let length = Length::from_str(value.trim()).ok()?;
    Some(resolve_length(length, base))
}

struct ShapeAttrs<'a, 'b> {
    attrs: &'b FxHashMap<&'a str, &'a str>,
    ctx: LengthContext,
}

impl ShapeAttrs<'_, '_> {
    fn length(&self, name: &str, axis: Axis) -> Result<Option<f64>, InvalidAttribute> {
        let Some(&value) = self.attrs.get(name) else {
            return Ok(None);
        };
        let base = match axis {
            Axis::X => self.ctx.width,
            Axis::Y => self.ctx.height,
            Axis::Diagonal => self.ctx.diagonal(),
        };
        parse_length(value, base)
            .map(Some)
            .ok_or_else(|| InvalidAttribute::new(name, value))
    }

    fn length_or_zero(&self, name: &str, axis: Axis) -> Result<f64, InvalidAttribute> {
        Ok(self.length(name, axis)?.unwrap_or(0.0))
    }

    /// Sizes may be absent or zero (nothing is drawn) but never negative.
    fn size(&self, name: &str, axis: Axis) -> Result<Option<f64>, InvalidAttribute> {
        match self.length(name, axis)? {
            Some(v) if v < 0.0 => Err(InvalidAttribute::new(name, self.attrs[name])),
            other => Ok(other),
        }
    }
}

#[derive(Default)]
struct PathData(String);

impl PathData {
    fn cmd(&mut self, letter: char, args: &[f64]) {
        if !self.0.is_empty() {
            self.0.push(' ');
        }
        self.0.push(letter);
        for (i, arg) in args.iter().enumerate() {
            let sep = if i == 0 { "" } else { "," };
            let _ = write!(self.0, "{sep}{arg}");
        }
    }

    fn arc(&mut self, letter: char, rx: f64, ry: f64, large_arc: bool, sweep: bool, x: f64, y: f64) {
        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        self.cmd(letter, &[rx, ry, 0.0, flag(large_arc), flag(sweep), x, y]);
    }

    fn finish(self) -> String {
        self.0
    }
}

/// Path data equivalent to a basic shape element, or `None` when the shape draws nothing.
pub fn shape_path_data(
    tag: &str,
    attrs: &FxHashMap<&str, &str>,
    ctx: LengthContext,
) -> Result<Option<String>, InvalidAttribute> {
    let shape = ShapeAttrs { attrs, ctx };
    match tag {
        "rect" => rect(&shape),
        "circle" => circle(&shape),
        "ellipse" => ellipse(&shape),
        "line" => line(&shape),
        "polygon" => poly(&shape, true),
        "polyline" => poly(&shape, false),
        _ => Ok(None),
    }
}

fn rect(shape: &ShapeAttrs<'_, '_>) -> Result<Option<String>, InvalidAttribute> {
    let x = shape.length_or_zero("x", Axis::X)?;
    let y = shape.length_or_zero("y", Axis::Y)?;
    let width = shape.size("width", Axis::X)?;
    let height = shape.size("height", Axis::Y)?;
    let mut rx = shape.size("rx", Axis::X)?.unwrap_or(0.0);
    let mut ry = shape.size("ry", Axis::Y)?.unwrap_or(0.0);
    let (Some(w), Some(h)) = (width, height) else {
        return Ok(None);
    };
    if w <= 0.0 || h <= 0.0 {
        return Ok(None);
    }

    let mut path = PathData::default();
    if rx <= 0.0 && ry <= 0.0 {
        path.cmd('M', &[x, y]);
        path.cmd('h', &[w]);
        path.cmd('v', &[h]);
        path.cmd('h', &[-w]);
    } else {
        if ry == 0.0 {
            ry = rx;
        } else if rx == 0.0 {
            rx = ry;
        }
        rx = rx.min(w / 2.0);
        ry = ry.min(h / 2.0);
        path.cmd('M', &[x + rx, y]);
        path.cmd('L', &[x + w - rx, y]);
        path.arc('A', rx, ry, false, true, x + w, y + ry);
        path.cmd('L', &[x + w, y + h - ry]);
        path.arc('A', rx, ry, false, true, x + w - rx, y + h);
        path.cmd('L', &[x + rx, y + h]);
        path.arc('A', rx, ry, false, true, x, y + h - ry);
        path.cmd('L', &[x, y + ry]);
        path.arc('A', rx, ry, false, true, x + rx, y);
    }
    path.cmd('z', &[]);
    Ok(Some(path.finish()))
}

fn circle(shape: &ShapeAttrs<'_, '_>) -> Result<Option<String>, InvalidAttribute> {
    let cx = shape.length_or_zero("cx", Axis::X)?;
    let cy = shape.length_or_zero("cy", Axis::Y)?;
    let r = shape.size("r", Axis::Diagonal)?.unwrap_or(0.0);
    if r <= 0.0 {
        return Ok(None);
    }
    let mut path = PathData::default();
    path.cmd('M', &[cx - r, cy]);
    path.arc('a', r, r, true, true, 2.0 * r, 0.0);
    path.arc('a', r, r, true, true, -2.0 * r, 0.0);
    path.cmd('z', &[]);
    Ok(Some(path.finish()))
}

fn ellipse(shape: &ShapeAttrs<'_, '_>) -> Result<Option<String>, InvalidAttribute> {
    let cx = shape.length_or_zero("cx", Axis::X)?;
    let cy = shape.length_or_zero("cy", Axis::Y)?;
    let rx = shape.size("rx", Axis::X)?.unwrap_or(0.0);
    let ry = shape.size("ry", Axis::Y)?.unwrap_or(0.0);
    if rx <= 0.0 || ry <= 0.0 {
        return Ok(None);
    }
    let mut path = PathData::default();
    path.cmd('M', &[cx - rx, cy]);
    path.arc('a', rx, ry, true, false, 2.0 * rx, 0.0);
    path.arc('a', rx, ry, true, false, -2.0 * rx, 0.0);
    path.cmd('z', &[]);
    Ok(Some(path.finish()))
}

fn line(shape: &ShapeAttrs<'_, '_>) -> Result<Option<String>, InvalidAttribute> {
    let x1 = shape.length_or_zero("x1", Axis::X)?;
    let y1 = shape.length_or_zero("y1", Axis::Y)?;
    let x2 = shape.length_or_zero("x2", Axis::X)?;
    let y2 = shape.length_or_zero("y2", Axis::Y)?;
    let mut path = PathData::default();
    path.cmd('M', &[x1, y1]);
    path.cmd('L', &[x2, y2]);
    Ok(Some(path.finish()))
}

fn poly(shape: &ShapeAttrs<'_, '_>, close: bool) -> Result<Option<String>, InvalidAttribute> {
    let Some(&value) = shape.attrs.get("points") else {
        return Ok(None);
    };
    let points: Vec<(f64, f64)> = PointsParser::from(value).collect();
    let Some(&(base_x, base_y)) = points.first() else {
        return Err(InvalidAttribute::new("points", value));
    };
    let mut path = PathData::default();
    path.cmd('M', &[base_x, base_y]);
    let (mut last_x, mut last_y) = (base_x, base_y);
    for &(x, y) in &points[1..] {
        path.cmd('l', &[x - last_x, y - last_y]);
        last_x = x;
        last_y = y;
    }
    if close {
        path.cmd('z', &[]);
    }
    Ok(Some(path.finish()))
}
