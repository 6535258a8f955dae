use crate::affine::AffineTransform;
use crate::error::{Result, invalid_transform};

/// Parses an SVG `transform` attribute value.
///
/// Entries compose left to right, so `translate(10) scale(2)` scales first and then translates.
/// An empty list is the identity.
pub fn parse_transform_list(value: &str) -> Result<AffineTransform> {
    let mut result = AffineTransform::identity();
    let mut rest = value.trim_start_matches(|c: char| c.is_whitespace() || c == ',');
    while !rest.is_empty() {
        let Some(open) = rest.find('(') else {
            return Err(invalid_transform(format!("expected '(' after '{}'", rest.trim())));
        };
        let name = rest[..open].trim();
        let after = &rest[open + 1..];
        let Some(close) = after.find(')') else {
            return Err(invalid_transform(format!("unterminated '{name}('")));
        };
        let args = parse_args(name, &after[..close])?;
        result.concatenate(&entry(name, &args)?);
        rest = after[close + 1..].trim_start_matches(|c: char| c.is_whitespace() || c == ',');
    }
    Ok(result)
}

fn parse_args(name: &str, inner: &str) -> Result<Vec<f64>> {
    inner
        .replace(',', " ")
        .split_whitespace()
        .map(|token| {
            token
                .parse::<f64>()
                .map_err(|_| invalid_transform(format!("bad number '{token}' in '{name}'")))
        })
        .collect()
}

fn entry(name: &str, args: &[f64]) -> Result<AffineTransform> {
    let arity_error = || {
        invalid_transform(format!(
            "'{name}' does not take {} argument{}",
            args.len(),
            if args.len() == 1 { "" } else { "s" }
        ))
    };
    let t = match (name.to_ascii_lowercase().as_str(), args) {
        ("matrix", &[a, b, c, d, e, f]) => AffineTransform::new(a, b, c, d, e, f),
        ("translate", &[tx]) => AffineTransform::from_translation(tx, 0.0),
        ("translate", &[tx, ty]) => AffineTransform::from_translation(tx, ty),
        ("scale", &[s]) => AffineTransform::from_scale(s, s),
        ("scale", &[sx, sy]) => AffineTransform::from_scale(sx, sy),
        ("rotate", &[deg]) => AffineTransform::from_rotation(deg.to_radians()),
        ("rotate", &[deg, cx, cy]) => AffineTransform::from_rotation_about(deg.to_radians(), cx, cy),
        ("skewx", &[deg]) => AffineTransform::from_shear(deg.to_radians().tan(), 0.0),
        ("skewy", &[deg]) => AffineTransform::from_shear(0.0, deg.to_radians().tan()),
        ("matrix" | "translate" | "scale" | "rotate" | "skewx" | "skewy", _) => {
            return Err(arity_error());
        }
        _ => return Err(invalid_transform(format!("unknown transform '{name}'"))),
    };
    Ok(t)
}
