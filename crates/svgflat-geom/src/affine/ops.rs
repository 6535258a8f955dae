use super::{
    APPLY_IDENTITY, APPLY_SCALE, APPLY_SHEAR, APPLY_TRANSLATE, AffineTransform, TransformKind,
    state_error,
};

const SH_SC_TR: u8 = APPLY_SHEAR | APPLY_SCALE | APPLY_TRANSLATE;
const SH_SC: u8 = APPLY_SHEAR | APPLY_SCALE;
const SH_TR: u8 = APPLY_SHEAR | APPLY_TRANSLATE;
const SC_TR: u8 = APPLY_SCALE | APPLY_TRANSLATE;

/// State after a quarter turn, indexed by the state before it.
const ROT90_CONVERSION: [u8; 8] = [
    APPLY_SHEAR,                                   // identity
    APPLY_SHEAR | APPLY_TRANSLATE,                 // translate
    APPLY_SHEAR,                                   // scale
    APPLY_SHEAR | APPLY_TRANSLATE,                 // scale|translate
    APPLY_SCALE,                                   // shear
    APPLY_SCALE | APPLY_TRANSLATE,                 // shear|translate
    APPLY_SHEAR | APPLY_SCALE,                     // shear|scale
    APPLY_SHEAR | APPLY_SCALE | APPLY_TRANSLATE,   // shear|scale|translate
];

impl AffineTransform {
    /// Appends a translation: `self = self ∘ translate(tx, ty)`.
    pub fn translate(&mut self, tx: f64, ty: f64) {
        match self.state {
            SH_SC_TR => {
                self.m02 += tx * self.m00 + ty * self.m01;
                self.m12 += tx * self.m10 + ty * self.m11;
                if self.m02 == 0.0 && self.m12 == 0.0 {
                    self.state = SH_SC;
                    self.mark_untranslated();
                }
            }
            SH_SC => {
                self.m02 = tx * self.m00 + ty * self.m01;
                self.m12 = tx * self.m10 + ty * self.m11;
                if self.m02 != 0.0 || self.m12 != 0.0 {
                    self.state = SH_SC_TR;
                    self.mark_translated();
                }
            }
            SH_TR => {
                self.m02 += ty * self.m01;
                self.m12 += tx * self.m10;
                if self.m02 == 0.0 && self.m12 == 0.0 {
                    self.state = APPLY_SHEAR;
                    self.mark_untranslated();
                }
            }
            APPLY_SHEAR => {
                self.m02 = ty * self.m01;
                self.m12 = tx * self.m10;
                if self.m02 != 0.0 || self.m12 != 0.0 {
                    self.state = SH_TR;
                    self.mark_translated();
                }
            }
            SC_TR => {
                self.m02 += tx * self.m00;
                self.m12 += ty * self.m11;
                if self.m02 == 0.0 && self.m12 == 0.0 {
                    self.state = APPLY_SCALE;
                    self.mark_untranslated();
                }
            }
            APPLY_SCALE => {
                self.m02 = tx * self.m00;
                self.m12 = ty * self.m11;
                if self.m02 != 0.0 || self.m12 != 0.0 {
                    self.state = SC_TR;
                    self.mark_translated();
                }
            }
            APPLY_TRANSLATE => {
                self.m02 += tx;
                self.m12 += ty;
                if self.m02 == 0.0 && self.m12 == 0.0 {
                    self.state = APPLY_IDENTITY;
                    self.set_kind(TransformKind::IDENTITY);
                }
            }
            APPLY_IDENTITY => {
                self.m02 = tx;
                self.m12 = ty;
                if tx != 0.0 || ty != 0.0 {
                    self.state = APPLY_TRANSLATE;
                    self.set_kind(TransformKind::TRANSLATION);
                }
            }
            other => state_error(other),
        }
    }

    /// Appends a scale: `self = self ∘ scale(sx, sy)`.
    pub fn scale(&mut self, sx: f64, sy: f64) {
        let mut state = self.state;
        match state {
            SH_SC_TR | SH_SC | SH_TR | APPLY_SHEAR => {
                if state & APPLY_SCALE != 0 {
                    self.m00 *= sx;
                    self.m11 *= sy;
                }
                self.m01 *= sy;
                self.m10 *= sx;
                if self.m01 == 0.0 && self.m10 == 0.0 {
                    state &= APPLY_TRANSLATE;
                    if self.m00 == 1.0 && self.m11 == 1.0 {
                        self.set_kind(if state == APPLY_IDENTITY {
                            TransformKind::IDENTITY
                        } else {
                            TransformKind::TRANSLATION
                        });
                    } else {
                        state |= APPLY_SCALE;
                        self.invalidate_kind();
                    }
                    self.state = state;
                } else {
                    self.invalidate_kind();
                }
            }
            SC_TR | APPLY_SCALE => {
                self.m00 *= sx;
                self.m11 *= sy;
                if self.m00 == 1.0 && self.m11 == 1.0 {
                    state &= APPLY_TRANSLATE;
                    self.state = state;
                    self.set_kind(if state == APPLY_IDENTITY {
                        TransformKind::IDENTITY
                    } else {
                        TransformKind::TRANSLATION
                    });
                } else {
                    self.invalidate_kind();
                }
            }
            APPLY_TRANSLATE | APPLY_IDENTITY => {
                self.m00 = sx;
                self.m11 = sy;
                if sx != 1.0 || sy != 1.0 {
                    self.state = state | APPLY_SCALE;
                    self.invalidate_kind();
                }
            }
            other => state_error(other),
        }
    }

    /// Appends a shear: `x' = x + shx * y`, `y' = shy * x + y`.
    pub fn shear(&mut self, shx: f64, shy: f64) {
        let state = self.state;
        match state {
            SH_SC_TR | SH_SC => {
                let (m0, m1) = (self.m00, self.m01);
                self.m00 = m0 + m1 * shy;
                self.m01 = m0 * shx + m1;

                let (m0, m1) = (self.m10, self.m11);
                self.m10 = m0 + m1 * shy;
                self.m11 = m0 * shx + m1;
                self.update_state();
            }
            SH_TR | APPLY_SHEAR => {
                self.m00 = self.m01 * shy;
                self.m11 = self.m10 * shx;
                if self.m00 != 0.0 || self.m11 != 0.0 {
                    self.state = state | APPLY_SCALE;
                }
                self.invalidate_kind();
            }
            SC_TR | APPLY_SCALE => {
                self.m01 = self.m00 * shx;
                self.m10 = self.m11 * shy;
                if self.m01 != 0.0 || self.m10 != 0.0 {
                    self.state = state | APPLY_SHEAR;
                }
                self.invalidate_kind();
            }
            APPLY_TRANSLATE | APPLY_IDENTITY => {
                self.m01 = shx;
                self.m10 = shy;
                if self.m01 != 0.0 || self.m10 != 0.0 {
                    self.state = state | APPLY_SCALE | APPLY_SHEAR;
                    self.invalidate_kind();
                }
            }
            other => state_error(other),
        }
    }

    /// Appends a rotation by `theta` radians.
    ///
    /// Exact quarter turns take a coefficient-swapping path, so `rotate(FRAC_PI_2)` stays free of
    /// rounding noise in the zero entries.
    pub fn rotate(&mut self, theta: f64) {
        let sin = theta.sin();
        if sin == 1.0 {
            self.rotate90();
        } else if sin == -1.0 {
            self.rotate270();
        } else {
            let cos = theta.cos();
            if cos == -1.0 {
                self.rotate180();
            } else if cos != 1.0 {
                let (m0, m1) = (self.m00, self.m01);
                self.m00 = cos * m0 + sin * m1;
                self.m01 = -sin * m0 + cos * m1;

                let (m0, m1) = (self.m10, self.m11);
                self.m10 = cos * m0 + sin * m1;
                self.m11 = -sin * m0 + cos * m1;
                self.update_state();
            }
        }
    }

    /// Rotation by `theta` radians around `(anchor_x, anchor_y)`.
    pub fn rotate_about(&mut self, theta: f64, anchor_x: f64, anchor_y: f64) {
        self.translate(anchor_x, anchor_y);
        self.rotate(theta);
        self.translate(-anchor_x, -anchor_y);
    }

    /// Rotation by `quadrants` quarter turns; negative values turn the other way.
    pub fn quadrant_rotate(&mut self, quadrants: i32) {
        match quadrants.rem_euclid(4) {
            1 => self.rotate90(),
            2 => self.rotate180(),
            3 => self.rotate270(),
            _ => {}
        }
    }

    fn rotate90(&mut self) {
        let m0 = self.m00;
        self.m00 = self.m01;
        self.m01 = -m0;
        let m0 = self.m10;
        self.m10 = self.m11;
        self.m11 = -m0;
        self.state = self.quarter_turn_state();
        self.invalidate_kind();
    }

    fn rotate180(&mut self) {
        self.m00 = -self.m00;
        self.m11 = -self.m11;
        let state = self.state;
        if state & APPLY_SHEAR != 0 {
            self.m01 = -self.m01;
            self.m10 = -self.m10;
        } else if self.m00 == 1.0 && self.m11 == 1.0 {
            self.state = state & !APPLY_SCALE;
        } else {
            self.state = state | APPLY_SCALE;
        }
        self.invalidate_kind();
    }

    fn rotate270(&mut self) {
        let m0 = self.m00;
        self.m00 = -self.m01;
        self.m01 = m0;
        let m0 = self.m10;
        self.m10 = -self.m11;
        self.m11 = m0;
        self.state = self.quarter_turn_state();
        self.invalidate_kind();
    }

    /// State after a quarter turn has already swapped the coefficients.
    fn quarter_turn_state(&self) -> u8 {
        let mut state = ROT90_CONVERSION[usize::from(self.state)];
        if state & (APPLY_SHEAR | APPLY_SCALE) == APPLY_SCALE && self.m00 == 1.0 && self.m11 == 1.0
        {
            state -= APPLY_SCALE;
        }
        state
    }
}
