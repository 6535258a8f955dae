#![forbid(unsafe_code)]

//! `svgflat` turns SVG documents into flat lists of paths with every transform, `<use>` and
//! gradient reference already applied, the shape a VectorDrawable-style target needs.
//!
//! ```
//! let svg = r#"<svg viewBox="0 0 10 10"><g transform="scale(2)"><rect width="2" height="1"/></g></svg>"#;
//! let conversion = svgflat::convert_str(svg).unwrap();
//! assert_eq!(conversion.drawable.paths[0].path_data, "M0,0l4,0l0,2l-4,0z");
//! ```
//!
//! # Features
//!
//! - `json`: serialize conversions to JSON (`svgflat::json`)

pub use svgflat_core::*;
pub use svgflat_geom as geom;

/// Converts with the default config. Error-level diagnostics do not fail the conversion.
pub fn convert_str(svg: &str) -> Result<Conversion> {
    Converter::default().convert(svg)
}

#[cfg(feature = "json")]
pub mod json {
    use serde_json::{Map, Value};

    use crate::{Conversion, Converter};

    #[derive(Debug, thiserror::Error)]
    pub enum JsonError {
        #[error(transparent)]
        Convert(#[from] svgflat_core::Error),
        #[error(transparent)]
        Json(#[from] serde_json::Error),
    }

    pub type Result<T> = std::result::Result<T, JsonError>;

    /// `{"drawable": ..., "diagnostics": [...]}`
    pub fn to_value(conversion: &Conversion) -> Result<Value> {
        let mut out = Map::new();
        out.insert(
            "drawable".to_string(),
            serde_json::to_value(&conversion.drawable)?,
        );
        out.insert(
            "diagnostics".to_string(),
            serde_json::to_value(&conversion.diagnostics)?,
        );
        Ok(Value::Object(out))
    }

    pub fn to_string_pretty(conversion: &Conversion) -> Result<String> {
        Ok(serde_json::to_string_pretty(&to_value(conversion)?)?)
    }

    /// Converts `svg` and renders the result as pretty JSON.
    pub fn convert_to_json(converter: &Converter, svg: &str) -> Result<String> {
        let conversion = converter.convert(svg)?;
        to_string_pretty(&conversion)
    }
}
