use super::{PathCommand, PathKind};
use crate::error::{Result, malformed_path};

const MAX_FRACTION_DIGITS: i32 = 6;

/// Writes path commands back to compact path data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathFormatter {
    fraction_digits: usize,
}

impl Default for PathFormatter {
    fn default() -> Self {
        Self { fraction_digits: 4 }
    }
}

impl PathFormatter {
    /// Precision that keeps about five significant digits across the viewport.
    pub fn for_viewport(width: f64, height: f64) -> Self {
        let max = width.max(height);
        if !(max.is_finite() && max > 0.0) {
            return Self::default();
        }
        let exponent = max.log10().floor() as i32;
        let digits = (4 - exponent).clamp(0, MAX_FRACTION_DIGITS);
        Self {
            fraction_digits: digits as usize,
        }
    }

    pub fn with_fraction_digits(fraction_digits: usize) -> Self {
        Self { fraction_digits }
    }

    pub fn fraction_digits(&self) -> usize {
        self.fraction_digits
    }

    /// Rounds half-up to the configured precision and trims insignificant zeros.
    pub fn format_number(&self, value: f64) -> Result<String> {
        if !value.is_finite() {
            return Err(malformed_path(format!("invalid number: {value}")));
        }
        let scale = 10f64.powi(self.fraction_digits as i32);
        let mut rounded = (value * scale + 0.5).floor() / scale;
        if !rounded.is_finite() {
            // Scaling overflowed; the value is far beyond any useful precision anyway.
            rounded = value;
        }
        let text = format!("{:.*}", self.fraction_digits, rounded);
        let text = trim_insignificant_zeros(&text);
        Ok(if text == "-0" {
            "0".to_string()
        } else {
            text.to_string()
        })
    }

    pub fn format(&self, commands: &[PathCommand]) -> Result<String> {
        let mut out = String::new();
        for command in commands {
            out.push(command.kind.letter());
            let implicit_line_to = match command.kind {
                PathKind::MoveTo if command.params.len() > 2 => Some('L'),
                PathKind::RelMoveTo if command.params.len() > 2 => Some('l'),
                _ => None,
            };
            for (j, &param) in command.params.iter().enumerate() {
                if j > 0 {
                    out.push(if j % 2 == 1 { ',' } else { ' ' });
                }
                if j == 2 {
                    if let Some(letter) = implicit_line_to {
                        out.push(letter);
                    }
                }
                out.push_str(&self.format_number(param)?);
            }
        }
        Ok(out)
    }
}

fn trim_insignificant_zeros(text: &str) -> &str {
    if !text.contains('.') {
        return text;
    }
    let trimmed = text.trim_end_matches('0');
    trimmed.strip_suffix('.').unwrap_or(trimmed)
}
