use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

/// Which structural components of a transform are non-trivial.
///
/// Exactly 8 combinations of `TRANSLATE`, `SCALE` and `SHEAR` exist; `IDENTITY` is the empty
/// set. The transform keeps this value valid after every mutation and dispatches its fast paths
/// on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TransformState(u8);

impl TransformState {
    pub const IDENTITY: Self = Self(0);
    pub const TRANSLATE: Self = Self(1);
    pub const SCALE: Self = Self(2);
    pub const SHEAR: Self = Self(4);

    pub(crate) const fn from_bits(bits: u8) -> Self {
        Self(bits & 0b111)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_identity(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for TransformState {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Display for TransformState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_identity() {
            return f.write_str("identity");
        }
        let mut parts = Vec::new();
        if self.contains(Self::TRANSLATE) {
            parts.push("translate");
        }
        if self.contains(Self::SCALE) {
            parts.push("scale");
        }
        if self.contains(Self::SHEAR) {
            parts.push("shear");
        }
        f.write_str(&parts.join("|"))
    }
}

/// Geometric classification of a transform.
///
/// Callers use it for policy decisions: whether relative path deltas can pass through
/// untouched, whether arcs must be re-solved, and whether stroke widths need scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TransformKind(u32);

impl TransformKind {
    pub const IDENTITY: Self = Self(0);
    pub const TRANSLATION: Self = Self(1);
    pub const UNIFORM_SCALE: Self = Self(2);
    pub const GENERAL_SCALE: Self = Self(4);
    pub const QUADRANT_ROTATION: Self = Self(8);
    pub const GENERAL_ROTATION: Self = Self(16);
    pub const GENERAL_TRANSFORM: Self = Self(32);
    pub const FLIP: Self = Self(64);

    pub const MASK_SCALE: Self = Self(Self::UNIFORM_SCALE.0 | Self::GENERAL_SCALE.0);
    pub const MASK_ROTATION: Self = Self(Self::QUADRANT_ROTATION.0 | Self::GENERAL_ROTATION.0);

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// True when any bit of `other` is set in `self`.
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn is_identity(self) -> bool {
        self.0 == 0
    }

    pub(crate) const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }
}

impl BitOr for TransformKind {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for TransformKind {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for TransformKind {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(TransformKind, &str); 7] = [
            (TransformKind::TRANSLATION, "translation"),
            (TransformKind::UNIFORM_SCALE, "uniform-scale"),
            (TransformKind::GENERAL_SCALE, "general-scale"),
            (TransformKind::QUADRANT_ROTATION, "quadrant-rotation"),
            (TransformKind::GENERAL_ROTATION, "general-rotation"),
            (TransformKind::GENERAL_TRANSFORM, "general-transform"),
            (TransformKind::FLIP, "flip"),
        ];
        if self.is_identity() {
            return f.write_str("identity");
        }
        let names: Vec<&str> = NAMES
            .iter()
            .filter(|(bit, _)| self.contains(*bit))
            .map(|(_, name)| *name)
            .collect();
        f.write_str(&names.join("|"))
    }
}
