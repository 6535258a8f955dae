//! 2D affine transform with cached structural and geometric classification.
//!
//! The six coefficients encode
//!
//! ```text
//! [ x' ]   [ m00 m01 m02 ] [ x ]
//! [ y' ] = [ m10 m11 m12 ] [ y ]
//! [ 1  ]   [  0   0   1  ] [ 1 ]
//! ```
//!
//! Every operation dispatches on a small state bitmask (which of translate/scale/shear are
//! non-trivial) so that the common degenerate matrices never pay for a full multiply.

use std::cell::Cell;
use std::fmt;

use crate::error::{Error, Result};
use crate::geom::{Point, point};

mod compose;
mod kind;
mod ops;

pub use kind::{TransformKind, TransformState};

pub(crate) const APPLY_IDENTITY: u8 = 0;
pub(crate) const APPLY_TRANSLATE: u8 = 1;
pub(crate) const APPLY_SCALE: u8 = 2;
pub(crate) const APPLY_SHEAR: u8 = 4;

pub(crate) const HI_SHIFT: u8 = 3;
pub(crate) const HI_TRANSLATE: u8 = APPLY_TRANSLATE << HI_SHIFT;
pub(crate) const HI_SHEAR: u8 = APPLY_SHEAR << HI_SHIFT;

const SH_SC_TR: u8 = APPLY_SHEAR | APPLY_SCALE | APPLY_TRANSLATE;
const SH_SC: u8 = APPLY_SHEAR | APPLY_SCALE;
const SH_TR: u8 = APPLY_SHEAR | APPLY_TRANSLATE;
const SC_TR: u8 = APPLY_SCALE | APPLY_TRANSLATE;

/// Smallest determinant magnitude `invert` accepts: the smallest positive subnormal.
const MIN_INVERTIBLE_DETERMINANT: f64 = f64::from_bits(1);

#[derive(Debug, Clone)]
pub struct AffineTransform {
    pub(crate) m00: f64,
    pub(crate) m10: f64,
    pub(crate) m01: f64,
    pub(crate) m11: f64,
    pub(crate) m02: f64,
    pub(crate) m12: f64,
    /// Always valid. May over-approximate (a bit can be set while its component is trivial),
    /// never under-approximate.
    pub(crate) state: u8,
    /// `None` until the next `kind()` read after a mutation.
    kind: Cell<Option<TransformKind>>,
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl PartialEq for AffineTransform {
    fn eq(&self, other: &Self) -> bool {
        self.to_array() == other.to_array()
    }
}

impl fmt::Display for AffineTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "matrix({} {} {} {} {} {})",
            self.m00, self.m10, self.m01, self.m11, self.m02, self.m12
        )
    }
}

#[track_caller]
pub(crate) fn state_error(state: u8) -> ! {
    unreachable!("missing case for transform state {state:#05b}")
}

impl AffineTransform {
    pub fn identity() -> Self {
        Self {
            m00: 1.0,
            m10: 0.0,
            m01: 0.0,
            m11: 1.0,
            m02: 0.0,
            m12: 0.0,
            state: APPLY_IDENTITY,
            kind: Cell::new(Some(TransformKind::IDENTITY)),
        }
    }

    /// Coefficients in `matrix(a b c d e f)` order.
    pub fn new(m00: f64, m10: f64, m01: f64, m11: f64, m02: f64, m12: f64) -> Self {
        let mut t = Self::identity();
        t.set_transform(m00, m10, m01, m11, m02, m12);
        t
    }

    pub fn from_translation(tx: f64, ty: f64) -> Self {
        let mut t = Self::identity();
        t.translate(tx, ty);
        t
    }

    pub fn from_scale(sx: f64, sy: f64) -> Self {
        let mut t = Self::identity();
        t.scale(sx, sy);
        t
    }

    pub fn from_shear(shx: f64, shy: f64) -> Self {
        let mut t = Self::identity();
        t.shear(shx, shy);
        t
    }

    /// Rotation by `theta` radians; positive angles turn the +x axis towards +y.
    pub fn from_rotation(theta: f64) -> Self {
        let mut t = Self::identity();
        t.rotate(theta);
        t
    }

    pub fn from_rotation_about(theta: f64, anchor_x: f64, anchor_y: f64) -> Self {
        let mut t = Self::identity();
        t.rotate_about(theta, anchor_x, anchor_y);
        t
    }

    pub fn set_transform(&mut self, m00: f64, m10: f64, m01: f64, m11: f64, m02: f64, m12: f64) {
        self.m00 = m00;
        self.m10 = m10;
        self.m01 = m01;
        self.m11 = m11;
        self.m02 = m02;
        self.m12 = m12;
        self.update_state();
    }

    /// Copies coefficients and cached classification from `other`.
    pub fn set_from(&mut self, other: &AffineTransform) {
        self.m00 = other.m00;
        self.m10 = other.m10;
        self.m01 = other.m01;
        self.m11 = other.m11;
        self.m02 = other.m02;
        self.m12 = other.m12;
        self.state = other.state;
        self.kind.set(other.kind.get());
    }

    pub fn set_to_identity(&mut self) {
        *self = Self::identity();
    }

    pub fn scale_x(&self) -> f64 {
        self.m00
    }

    pub fn scale_y(&self) -> f64 {
        self.m11
    }

    pub fn shear_x(&self) -> f64 {
        self.m01
    }

    pub fn shear_y(&self) -> f64 {
        self.m10
    }

    pub fn translate_x(&self) -> f64 {
        self.m02
    }

    pub fn translate_y(&self) -> f64 {
        self.m12
    }

    /// `[m00, m10, m01, m11, m02, m12]`, the `matrix(a b c d e f)` order.
    pub fn to_array(&self) -> [f64; 6] {
        [self.m00, self.m10, self.m01, self.m11, self.m02, self.m12]
    }

    pub fn state(&self) -> TransformState {
        TransformState::from_bits(self.state)
    }

    /// Geometric classification, computed on first read after a mutation and cached.
    pub fn kind(&self) -> TransformKind {
        if let Some(kind) = self.kind.get() {
            return kind;
        }
        let kind = self.calculate_kind();
        self.kind.set(Some(kind));
        kind
    }

    pub fn is_identity(&self) -> bool {
        self.state == APPLY_IDENTITY || self.kind().is_identity()
    }

    /// True when the transform moves every point by the same offset, so relative path deltas
    /// and arc shapes pass through unchanged.
    pub fn is_translation_only(&self) -> bool {
        let kind = self.kind();
        kind == TransformKind::IDENTITY || kind == TransformKind::TRANSLATION
    }

    pub fn has_scale(&self) -> bool {
        self.kind().intersects(TransformKind::MASK_SCALE)
    }

    pub(crate) fn invalidate_kind(&self) {
        self.kind.set(None);
    }

    pub(crate) fn set_kind(&self, kind: TransformKind) {
        self.kind.set(Some(kind));
    }

    pub(crate) fn mark_translated(&self) {
        if let Some(kind) = self.kind.get() {
            self.kind.set(Some(kind | TransformKind::TRANSLATION));
        }
    }

    pub(crate) fn mark_untranslated(&self) {
        if let Some(kind) = self.kind.get() {
            self.kind.set(Some(kind.without(TransformKind::TRANSLATION)));
        }
    }

    /// State bits implied by the coefficients alone.
    fn exact_state(&self) -> u8 {
        let translate = if self.m02 == 0.0 && self.m12 == 0.0 {
            APPLY_IDENTITY
        } else {
            APPLY_TRANSLATE
        };
        if self.m01 == 0.0 && self.m10 == 0.0 {
            if self.m00 == 1.0 && self.m11 == 1.0 {
                translate
            } else {
                APPLY_SCALE | translate
            }
        } else if self.m00 == 0.0 && self.m11 == 0.0 {
            APPLY_SHEAR | translate
        } else {
            APPLY_SHEAR | APPLY_SCALE | translate
        }
    }

    /// Recomputes the state from the six coefficients.
    pub(crate) fn update_state(&mut self) {
        self.state = self.exact_state();
        match self.state {
            APPLY_IDENTITY => self.set_kind(TransformKind::IDENTITY),
            APPLY_TRANSLATE => self.set_kind(TransformKind::TRANSLATION),
            _ => self.invalidate_kind(),
        }
    }

    fn calculate_kind(&self) -> TransformKind {
        let state = self.exact_state();
        let mut ret = if state & APPLY_TRANSLATE != 0 {
            TransformKind::TRANSLATION
        } else {
            TransformKind::IDENTITY
        };
        match state & !APPLY_TRANSLATE {
            SH_SC => {
                let (m0, m1, m2, m3) = (self.m00, self.m11, self.m01, self.m10);
                if m0 * m2 + m3 * m1 != 0.0 {
                    // Columns are not orthogonal.
                    return TransformKind::GENERAL_TRANSFORM;
                }
                let det = m0 * m1 - m2 * m3;
                if (m0 >= 0.0) == (m1 >= 0.0) {
                    if m0 != m1 || m2 != -m3 {
                        ret |= TransformKind::GENERAL_ROTATION | TransformKind::GENERAL_SCALE;
                    } else if det != 1.0 {
                        ret |= TransformKind::GENERAL_ROTATION | TransformKind::UNIFORM_SCALE;
                    } else {
                        ret |= TransformKind::GENERAL_ROTATION;
                    }
                } else if m0 != -m1 || m2 != m3 {
                    ret |= TransformKind::GENERAL_ROTATION
                        | TransformKind::FLIP
                        | TransformKind::GENERAL_SCALE;
                } else if det != -1.0 {
                    ret |= TransformKind::GENERAL_ROTATION
                        | TransformKind::FLIP
                        | TransformKind::UNIFORM_SCALE;
                } else {
                    ret |= TransformKind::GENERAL_ROTATION | TransformKind::FLIP;
                }
            }
            APPLY_SHEAR => {
                let (m0, m1) = (self.m01, self.m10);
                if (m0 >= 0.0) != (m1 >= 0.0) {
                    // Quarter turn.
                    if m0 != -m1 {
                        ret |= TransformKind::QUADRANT_ROTATION | TransformKind::GENERAL_SCALE;
                    } else if m0 != 1.0 && m0 != -1.0 {
                        ret |= TransformKind::QUADRANT_ROTATION | TransformKind::UNIFORM_SCALE;
                    } else {
                        ret |= TransformKind::QUADRANT_ROTATION;
                    }
                } else if m0 == m1 {
                    // Quarter turn plus an axis flip.
                    ret |= TransformKind::QUADRANT_ROTATION
                        | TransformKind::FLIP
                        | TransformKind::UNIFORM_SCALE;
                } else {
                    ret |= TransformKind::QUADRANT_ROTATION
                        | TransformKind::FLIP
                        | TransformKind::GENERAL_SCALE;
                }
            }
            APPLY_SCALE => {
                let (m0, m1) = (self.m00, self.m11);
                let (sgn0, sgn1) = (m0 >= 0.0, m1 >= 0.0);
                if sgn0 == sgn1 {
                    if sgn0 {
                        ret |= if m0 == m1 {
                            TransformKind::UNIFORM_SCALE
                        } else {
                            TransformKind::GENERAL_SCALE
                        };
                    } else if m0 != m1 {
                        // Both negative: half turn.
                        ret |= TransformKind::QUADRANT_ROTATION | TransformKind::GENERAL_SCALE;
                    } else if m0 != -1.0 {
                        ret |= TransformKind::QUADRANT_ROTATION | TransformKind::UNIFORM_SCALE;
                    } else {
                        ret |= TransformKind::QUADRANT_ROTATION;
                    }
                } else if m0 == -m1 {
                    ret |= if m0 == 1.0 || m0 == -1.0 {
                        TransformKind::FLIP
                    } else {
                        TransformKind::FLIP | TransformKind::UNIFORM_SCALE
                    };
                } else {
                    ret |= TransformKind::FLIP | TransformKind::GENERAL_SCALE;
                }
            }
            APPLY_IDENTITY => {}
            other => state_error(other),
        }
        ret
    }

    pub fn determinant(&self) -> f64 {
        match self.state {
            SH_SC_TR | SH_SC => self.m00 * self.m11 - self.m01 * self.m10,
            SH_TR | APPLY_SHEAR => -(self.m01 * self.m10),
            SC_TR | APPLY_SCALE => self.m00 * self.m11,
            APPLY_TRANSLATE | APPLY_IDENTITY => 1.0,
            other => state_error(other),
        }
    }

    /// Replaces this transform by its inverse.
    ///
    /// Fails with [`Error::SingularTransform`] and leaves the coefficients untouched when the
    /// matrix has no inverse.
    pub fn invert(&mut self) -> Result<()> {
        let (m00, m01, m02) = (self.m00, self.m01, self.m02);
        let (m10, m11, m12) = (self.m10, self.m11, self.m12);
        match self.state {
            SH_SC_TR => {
                let det = m00 * m11 - m01 * m10;
                if det.abs() <= MIN_INVERTIBLE_DETERMINANT {
                    return Err(Error::SingularTransform { determinant: det });
                }
                self.m00 = m11 / det;
                self.m10 = -m10 / det;
                self.m01 = -m01 / det;
                self.m11 = m00 / det;
                self.m02 = (m01 * m12 - m11 * m02) / det;
                self.m12 = (m10 * m02 - m00 * m12) / det;
            }
            SH_SC => {
                let det = m00 * m11 - m01 * m10;
                if det.abs() <= MIN_INVERTIBLE_DETERMINANT {
                    return Err(Error::SingularTransform { determinant: det });
                }
                self.m00 = m11 / det;
                self.m10 = -m10 / det;
                self.m01 = -m01 / det;
                self.m11 = m00 / det;
            }
            SH_TR => {
                if m01 == 0.0 || m10 == 0.0 {
                    return Err(Error::SingularTransform {
                        determinant: -(m01 * m10),
                    });
                }
                self.m10 = 1.0 / m01;
                self.m01 = 1.0 / m10;
                self.m02 = -m12 / m10;
                self.m12 = -m02 / m01;
            }
            APPLY_SHEAR => {
                if m01 == 0.0 || m10 == 0.0 {
                    return Err(Error::SingularTransform {
                        determinant: -(m01 * m10),
                    });
                }
                self.m10 = 1.0 / m01;
                self.m01 = 1.0 / m10;
            }
            SC_TR => {
                if m00 == 0.0 || m11 == 0.0 {
                    return Err(Error::SingularTransform {
                        determinant: m00 * m11,
                    });
                }
                self.m00 = 1.0 / m00;
                self.m11 = 1.0 / m11;
                self.m02 = -m02 / m00;
                self.m12 = -m12 / m11;
            }
            APPLY_SCALE => {
                if m00 == 0.0 || m11 == 0.0 {
                    return Err(Error::SingularTransform {
                        determinant: m00 * m11,
                    });
                }
                self.m00 = 1.0 / m00;
                self.m11 = 1.0 / m11;
            }
            APPLY_TRANSLATE => {
                self.m02 = -m02;
                self.m12 = -m12;
            }
            APPLY_IDENTITY => {}
            other => state_error(other),
        }
        Ok(())
    }

    pub fn create_inverse(&self) -> Result<AffineTransform> {
        let mut inverse = self.clone();
        inverse.invert()?;
        Ok(inverse)
    }

    #[inline]
    fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        match self.state {
            SH_SC_TR => (
                x * self.m00 + y * self.m01 + self.m02,
                x * self.m10 + y * self.m11 + self.m12,
            ),
            SH_SC => (x * self.m00 + y * self.m01, x * self.m10 + y * self.m11),
            SH_TR => (y * self.m01 + self.m02, x * self.m10 + self.m12),
            APPLY_SHEAR => (y * self.m01, x * self.m10),
            SC_TR => (x * self.m00 + self.m02, y * self.m11 + self.m12),
            APPLY_SCALE => (x * self.m00, y * self.m11),
            APPLY_TRANSLATE => (x + self.m02, y + self.m12),
            APPLY_IDENTITY => (x, y),
            other => state_error(other),
        }
    }

    #[inline]
    fn apply_delta(&self, x: f64, y: f64) -> (f64, f64) {
        match self.state {
            SH_SC_TR | SH_SC => (x * self.m00 + y * self.m01, x * self.m10 + y * self.m11),
            SH_TR | APPLY_SHEAR => (y * self.m01, x * self.m10),
            SC_TR | APPLY_SCALE => (x * self.m00, y * self.m11),
            APPLY_TRANSLATE | APPLY_IDENTITY => (x, y),
            other => state_error(other),
        }
    }

    pub fn transform_point(&self, p: Point) -> Point {
        let (x, y) = self.apply(p.x, p.y);
        point(x, y)
    }

    /// Applies only the linear part; use for direction vectors and relative offsets.
    pub fn delta_transform_point(&self, p: Point) -> Point {
        let (x, y) = self.apply_delta(p.x, p.y);
        point(x, y)
    }

    /// Transforms `count` interleaved `x, y` pairs from `src` into `dst`.
    pub fn transform_slice(
        &self,
        src: &[f64],
        src_offset: usize,
        dst: &mut [f64],
        dst_offset: usize,
        count: usize,
    ) {
        let src = &src[src_offset..src_offset + count * 2];
        let dst = &mut dst[dst_offset..dst_offset + count * 2];
        for (s, d) in src.chunks_exact(2).zip(dst.chunks_exact_mut(2)) {
            let (x, y) = self.apply(s[0], s[1]);
            d[0] = x;
            d[1] = y;
        }
    }

    /// Transforms `count` pairs read at `src_offset` and written at `dst_offset` of the same
    /// buffer. Overlapping ranges produce the same output as a disjoint destination would.
    pub fn transform_in_place(
        &self,
        buf: &mut [f64],
        src_offset: usize,
        dst_offset: usize,
        count: usize,
    ) {
        self.map_in_place(buf, src_offset, dst_offset, count, Self::apply);
    }

    /// [`Self::transform_in_place`] without the translation component.
    pub fn delta_transform_in_place(
        &self,
        buf: &mut [f64],
        src_offset: usize,
        dst_offset: usize,
        count: usize,
    ) {
        self.map_in_place(buf, src_offset, dst_offset, count, Self::apply_delta);
    }

    fn map_in_place(
        &self,
        buf: &mut [f64],
        mut src_offset: usize,
        dst_offset: usize,
        count: usize,
        f: fn(&Self, f64, f64) -> (f64, f64),
    ) {
        let len = count * 2;
        if dst_offset > src_offset && dst_offset < src_offset + len {
            // Forward processing would read pairs it already overwrote.
            buf.copy_within(src_offset..src_offset + len, dst_offset);
            src_offset = dst_offset;
        }
        for i in (0..len).step_by(2) {
            let (x, y) = f(self, buf[src_offset + i], buf[src_offset + i + 1]);
            buf[dst_offset + i] = x;
            buf[dst_offset + i + 1] = y;
        }
    }
}
