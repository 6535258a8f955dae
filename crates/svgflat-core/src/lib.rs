#![forbid(unsafe_code)]

//! SVG document layer (headless).
//!
//! Design goals:
//! - every transform baked into path data, so the output needs no transform stack
//! - best-effort conversion: problems become [`Diagnostic`]s instead of aborting
//! - deterministic output for a given input and config

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod flatten;
pub mod gradient;
pub mod load;
pub mod paint;
pub mod resolve;
pub mod shapes;
pub mod style;
pub mod tree;

pub use config::ConvertConfig;
pub use diagnostics::{Diagnostic, Diagnostics, Level};
pub use error::{Error, Result};
pub use flatten::{Drawable, FillRule, FlatClipPath, FlatPath, flatten};
pub use gradient::{GradientGeometry, GradientPlacement, PlacedStop, TileMode};
pub use load::parse_document;
pub use paint::Paint;
pub use resolve::{ResolveReport, resolve_references};
pub use tree::{Document, GradientKind, Node, NodeId, NodeKind, ViewBox, Viewport};

#[derive(Debug, Clone, Copy, Default)]
pub struct ConvertOptions {
    pub strict: bool,
}

impl ConvertOptions {
    /// Error-level diagnostics fail the conversion.
    pub fn strict() -> Self {
        Self { strict: true }
    }

    /// Diagnostics are returned alongside whatever could be converted.
    pub fn lenient() -> Self {
        Self { strict: false }
    }
}

#[derive(Debug, Clone)]
pub struct Conversion {
    pub drawable: Drawable,
    pub diagnostics: Diagnostics,
}

#[derive(Debug, Clone, Default)]
pub struct Converter {
    config: ConvertConfig,
}

impl Converter {
    pub fn new(config: ConvertConfig) -> Self {
        Self { config }
    }

    /// Merges `overrides` onto the current config.
    pub fn with_config(mut self, overrides: ConvertConfig) -> Self {
        self.config.deep_merge(overrides.as_value());
        self
    }

    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    fn timing_enabled() -> bool {
        static ENABLED: std::sync::OnceLock<bool> = std::sync::OnceLock::new();
        *ENABLED.get_or_init(|| {
            matches!(
                std::env::var("SVGFLAT_CONVERT_TIMING").as_deref(),
                Ok("1") | Ok("true")
            )
        })
    }

    /// Converts with the strictness taken from `diagnostics.strict` in the config.
    pub fn convert(&self, svg: &str) -> Result<Conversion> {
        self.convert_with(svg, ConvertOptions::lenient())
    }

    /// Strict options fail on error-level diagnostics even when the config does not ask to.
    pub fn convert_with(&self, svg: &str, options: ConvertOptions) -> Result<Conversion> {
        self.config.validate()?;
        let timing = Self::timing_enabled();
        let start = timing.then(std::time::Instant::now);

        let mut diagnostics = Diagnostics::new();
        let mut doc = parse_document(svg, &mut diagnostics)?;
        let loaded = start.map(|s| s.elapsed());
        let report = resolve_references(&mut doc, &mut diagnostics);
        let resolved = start.map(|s| s.elapsed());
        let drawable = flatten(&doc, &self.config, &mut diagnostics);

        if let (Some(start), Some(loaded), Some(resolved)) = (start, loaded, resolved) {
            tracing::debug!(
                ?loaded,
                ?resolved,
                total = ?start.elapsed(),
                uses = report.use_order.len(),
                paths = drawable.paths.len(),
                "conversion timing"
            );
        }

        if (options.strict || self.config.strict()) && diagnostics.has_errors() {
            return Err(Error::Conversion {
                message: diagnostics.combined_message(),
            });
        }
        Ok(Conversion {
            drawable,
            diagnostics,
        })
    }
}

#[cfg(test)]
mod tests;
