//! Conversion settings as a dotted-path JSON object.
//!
//! | key | type | default |
//! |---|---|---|
//! | `output.fractionDigits` | non-negative integer | derived from the viewport |
//! | `stroke.scaleWidth` | bool | `true` |
//! | `arcs.toCubics` | bool | `false` |
//! | `diagnostics.strict` | bool | `false` |

use serde_json::{Map, Value};

use crate::error::{Error, Result};

pub const FRACTION_DIGITS: &str = "output.fractionDigits";
pub const SCALE_STROKE_WIDTH: &str = "stroke.scaleWidth";
pub const ARCS_TO_CUBICS: &str = "arcs.toCubics";
pub const STRICT: &str = "diagnostics.strict";

const MAX_FRACTION_DIGITS: u64 = 12;

#[derive(Debug, Clone, PartialEq)]
pub struct ConvertConfig(Value);

impl Default for ConvertConfig {
    fn default() -> Self {
        Self::empty_object()
    }
}

impl ConvertConfig {
    pub fn empty_object() -> Self {
        Self(Value::Object(Map::new()))
    }

    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn as_value_mut(&mut self) -> &mut Value {
        &mut self.0
    }

    fn lookup(&self, dotted_path: &str) -> Option<&Value> {
        dotted_path
            .split('.')
            .try_fold(&self.0, |node, key| node.as_object()?.get(key))
    }

    pub fn get_str(&self, dotted_path: &str) -> Option<&str> {
        self.lookup(dotted_path)?.as_str()
    }

    pub fn get_bool(&self, dotted_path: &str) -> Option<bool> {
        self.lookup(dotted_path)?.as_bool()
    }

    pub fn get_f64(&self, dotted_path: &str) -> Option<f64> {
        self.lookup(dotted_path)?.as_f64()
    }

    pub fn get_u64(&self, dotted_path: &str) -> Option<u64> {
        self.lookup(dotted_path)?.as_u64()
    }

    /// Writes `value` at `dotted_path`, creating objects along the way. Non-object values in
    /// the way (including a non-object root) are replaced.
    pub fn set_value(&mut self, dotted_path: &str, value: Value) {
        let (parents, leaf) = match dotted_path.rsplit_once('.') {
            Some((parents, leaf)) => (Some(parents), leaf),
            None => (None, dotted_path),
        };
        let mut node = &mut self.0;
        for key in parents.into_iter().flat_map(|p| p.split('.')) {
            node = object_mut(node)
                .entry(key.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
        }
        object_mut(node).insert(leaf.to_string(), value);
    }

    pub fn deep_merge(&mut self, other: &Value) {
        deep_merge_value(&mut self.0, other);
    }

    /// Fixed coordinate precision, when configured.
    pub fn fraction_digits(&self) -> Option<usize> {
        self.get_u64(FRACTION_DIGITS)
            .filter(|digits| *digits <= MAX_FRACTION_DIGITS)
            .map(|digits| digits as usize)
    }

    pub fn scale_stroke_width(&self) -> bool {
        self.get_bool(SCALE_STROKE_WIDTH).unwrap_or(true)
    }

    pub fn arcs_to_cubics(&self) -> bool {
        self.get_bool(ARCS_TO_CUBICS).unwrap_or(false)
    }

    pub fn strict(&self) -> bool {
        self.get_bool(STRICT).unwrap_or(false)
    }

    /// Checks that every recognized key present has the expected type.
    pub fn validate(&self) -> Result<()> {
        if !self.0.is_object() {
            return Err(invalid("config root must be a JSON object"));
        }
        if let Some(value) = self.lookup(FRACTION_DIGITS) {
            match value.as_u64() {
                Some(digits) if digits <= MAX_FRACTION_DIGITS => {}
                _ => {
                    return Err(invalid(format!(
                        "`{FRACTION_DIGITS}` must be an integer in 0..={MAX_FRACTION_DIGITS}, got {value}"
                    )));
                }
            }
        }
        for key in [SCALE_STROKE_WIDTH, ARCS_TO_CUBICS, STRICT] {
            if let Some(value) = self.lookup(key) {
                if !value.is_boolean() {
                    return Err(invalid(format!("`{key}` must be a boolean, got {value}")));
                }
            }
        }
        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> Error {
    Error::InvalidConfig {
        message: message.into(),
    }
}

/// Coerces `node` into an object and returns its map.
fn object_mut(node: &mut Value) -> &mut Map<String, Value> {
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Object(map) => map,
        _ => unreachable!("value was just made an object"),
    }
}

/// Objects merge key by key; anything else in `overlay` replaces what is in `target`.
fn deep_merge_value(target: &mut Value, overlay: &Value) {
    let Value::Object(overlay_map) = overlay else {
        *target = overlay.clone();
        return;
    };
    let Value::Object(target_map) = target else {
        *target = overlay.clone();
        return;
    };
    for (key, value) in overlay_map {
        match target_map.get_mut(key) {
            Some(existing) => deep_merge_value(existing, value),
            None => {
                target_map.insert(key.clone(), value.clone());
            }
        }
    }
}
