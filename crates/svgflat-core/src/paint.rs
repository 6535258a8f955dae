use std::str::FromStr;

use serde::Serialize;

use crate::gradient::GradientPlacement;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Paint {
    None,
    /// `#RRGGBB`, or `#AARRGGBB` when not opaque.
    Color(String),
    Gradient(GradientPlacement),
}

impl Paint {
    pub fn is_none(&self) -> bool {
        matches!(self, Paint::None)
    }
}

/// Normalizes any CSS color to hex. `currentColor` resolves to the initial `color`, black.
pub fn normalize_color(value: &str) -> Option<String> {
    let value = value.trim();
    if value == "currentColor" {
        return Some("#000000".to_string());
    }
    let color = svgtypes::Color::from_str(value).ok()?;
    Some(if color.alpha == u8::MAX {
        format!("#{:02X}{:02X}{:02X}", color.red, color.green, color.blue)
    } else {
        format!(
            "#{:02X}{:02X}{:02X}{:02X}",
            color.alpha, color.red, color.green, color.blue
        )
    })
}

/// Fragment id of a `url(#id)` paint reference.
pub fn url_reference(value: &str) -> Option<&str> {
    let rest = value.trim().strip_prefix("url(")?;
    let inner = rest[..rest.find(')')?].trim();
    let inner = inner.trim_matches(|c| c == '"' || c == '\'');
    let id = inner.strip_prefix('#')?;
    (!id.is_empty()).then_some(id)
}
