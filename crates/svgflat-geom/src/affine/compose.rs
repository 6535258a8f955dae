use super::{
    APPLY_IDENTITY, APPLY_SCALE, APPLY_SHEAR, APPLY_TRANSLATE, AffineTransform, HI_SHEAR,
    HI_SHIFT, HI_TRANSLATE, state_error,
};

const SH_SC_TR: u8 = APPLY_SHEAR | APPLY_SCALE | APPLY_TRANSLATE;
const SH_SC: u8 = APPLY_SHEAR | APPLY_SCALE;
const SH_TR: u8 = APPLY_SHEAR | APPLY_TRANSLATE;
const SC_TR: u8 = APPLY_SCALE | APPLY_TRANSLATE;

impl AffineTransform {
    /// `self = self ∘ tx`: `tx` is applied to points first, then the old `self`.
    pub fn concatenate(&mut self, tx: &AffineTransform) {
        let mystate = self.state;
        let txstate = tx.state;
        match (txstate << HI_SHIFT) | mystate {
            s if s >> HI_SHIFT == APPLY_IDENTITY => {}

            // `self` is the identity: adopt `tx`.
            s if s & 0b111 == APPLY_IDENTITY => {
                self.set_from(tx);
            }

            s if s >> HI_SHIFT == APPLY_TRANSLATE => self.translate(tx.m02, tx.m12),
            s if s >> HI_SHIFT == APPLY_SCALE => self.scale(tx.m00, tx.m11),

            s if s == HI_SHEAR | SH_SC_TR || s == HI_SHEAR | SH_SC => {
                let (t01, t10) = (tx.m01, tx.m10);
                let m0 = self.m00;
                self.m00 = self.m01 * t10;
                self.m01 = m0 * t01;
                let m0 = self.m10;
                self.m10 = self.m11 * t10;
                self.m11 = m0 * t01;
                self.invalidate_kind();
            }
            s if s == HI_SHEAR | SH_TR || s == HI_SHEAR | APPLY_SHEAR => {
                self.m00 = self.m01 * tx.m10;
                self.m01 = 0.0;
                self.m11 = self.m10 * tx.m01;
                self.m10 = 0.0;
                self.state = mystate ^ (APPLY_SHEAR | APPLY_SCALE);
                self.invalidate_kind();
            }
            s if s == HI_SHEAR | SC_TR || s == HI_SHEAR | APPLY_SCALE => {
                self.m01 = self.m00 * tx.m01;
                self.m00 = 0.0;
                self.m10 = self.m11 * tx.m10;
                self.m11 = 0.0;
                self.state = mystate ^ (APPLY_SHEAR | APPLY_SCALE);
                self.invalidate_kind();
            }
            s if s == HI_SHEAR | APPLY_TRANSLATE => {
                self.m00 = 0.0;
                self.m01 = tx.m01;
                self.m10 = tx.m10;
                self.m11 = 0.0;
                self.state = APPLY_TRANSLATE | APPLY_SHEAR;
                self.invalidate_kind();
            }

            _ => self.concatenate_general(tx),
        }
    }

    /// `tx` carries more than one component and `self` is not the identity.
    fn concatenate_general(&mut self, tx: &AffineTransform) {
        let (t00, t01, t02) = (tx.m00, tx.m01, tx.m02);
        let (t10, t11, t12) = (tx.m10, tx.m11, tx.m12);
        match self.state {
            SH_SC | SH_SC_TR => {
                if self.state == SH_SC {
                    self.state |= tx.state;
                }
                let (m0, m1) = (self.m00, self.m01);
                self.m00 = t00 * m0 + t10 * m1;
                self.m01 = t01 * m0 + t11 * m1;
                self.m02 += t02 * m0 + t12 * m1;

                let (m0, m1) = (self.m10, self.m11);
                self.m10 = t00 * m0 + t10 * m1;
                self.m11 = t01 * m0 + t11 * m1;
                self.m12 += t02 * m0 + t12 * m1;
                self.invalidate_kind();
            }
            SH_TR | APPLY_SHEAR => {
                let m0 = self.m01;
                self.m00 = t10 * m0;
                self.m01 = t11 * m0;
                self.m02 += t12 * m0;

                let m0 = self.m10;
                self.m10 = t00 * m0;
                self.m11 = t01 * m0;
                self.m12 += t02 * m0;
                self.update_state();
            }
            SC_TR | APPLY_SCALE => {
                let m0 = self.m00;
                self.m00 = t00 * m0;
                self.m01 = t01 * m0;
                self.m02 += t02 * m0;

                let m0 = self.m11;
                self.m10 = t10 * m0;
                self.m11 = t11 * m0;
                self.m12 += t12 * m0;
                self.update_state();
            }
            APPLY_TRANSLATE => {
                self.m00 = t00;
                self.m01 = t01;
                self.m02 += t02;

                self.m10 = t10;
                self.m11 = t11;
                self.m12 += t12;
                self.state = tx.state | APPLY_TRANSLATE;
                self.invalidate_kind();
            }
            other => state_error(other),
        }
    }

    /// `self = tx ∘ self`: the old `self` is applied to points first, then `tx`.
    pub fn pre_concatenate(&mut self, tx: &AffineTransform) {
        let mut mystate = self.state;
        let txstate = tx.state;
        match (txstate << HI_SHIFT) | mystate {
            s if s >> HI_SHIFT == APPLY_IDENTITY => {}

            s if s == HI_TRANSLATE | APPLY_IDENTITY
                || s == HI_TRANSLATE | APPLY_SCALE
                || s == HI_TRANSLATE | APPLY_SHEAR
                || s == HI_TRANSLATE | SH_SC =>
            {
                self.m02 = tx.m02;
                self.m12 = tx.m12;
                self.state = mystate | APPLY_TRANSLATE;
                self.mark_translated();
            }
            s if s >> HI_SHIFT == APPLY_TRANSLATE => {
                self.m02 += tx.m02;
                self.m12 += tx.m12;
            }

            s if s >> HI_SHIFT == APPLY_SCALE => {
                if mystate == APPLY_TRANSLATE || mystate == APPLY_IDENTITY {
                    self.state = mystate | APPLY_SCALE;
                }
                let (t00, t11) = (tx.m00, tx.m11);
                if mystate & APPLY_SHEAR != 0 {
                    self.m01 *= t00;
                    self.m10 *= t11;
                    if mystate & APPLY_SCALE != 0 {
                        self.m00 *= t00;
                        self.m11 *= t11;
                    }
                } else {
                    self.m00 *= t00;
                    self.m11 *= t11;
                }
                if mystate & APPLY_TRANSLATE != 0 {
                    self.m02 *= t00;
                    self.m12 *= t11;
                }
                self.invalidate_kind();
            }

            s if s >> HI_SHIFT == APPLY_SHEAR => {
                match mystate {
                    SH_TR | APPLY_SHEAR => {
                        // shear ∘ shear is a scale
                        mystate |= APPLY_SCALE;
                        self.state = mystate ^ APPLY_SHEAR;
                    }
                    APPLY_TRANSLATE | APPLY_IDENTITY | SC_TR | APPLY_SCALE => {
                        self.state = mystate ^ APPLY_SHEAR;
                    }
                    _ => {}
                }
                let (t01, t10) = (tx.m01, tx.m10);

                let m0 = self.m00;
                self.m00 = self.m10 * t01;
                self.m10 = m0 * t10;

                let m0 = self.m01;
                self.m01 = self.m11 * t01;
                self.m11 = m0 * t10;

                let m0 = self.m02;
                self.m02 = self.m12 * t01;
                self.m12 = m0 * t10;
                self.invalidate_kind();
            }

            _ => self.pre_concatenate_general(tx),
        }
    }

    fn pre_concatenate_general(&mut self, tx: &AffineTransform) {
        let (t00, t01, mut t02) = (tx.m00, tx.m01, tx.m02);
        let (t10, t11, mut t12) = (tx.m10, tx.m11, tx.m12);
        let mystate = self.state;
        if mystate & APPLY_TRANSLATE != 0 {
            let (m0, m1) = (self.m02, self.m12);
            t02 += m0 * t00 + m1 * t01;
            t12 += m0 * t10 + m1 * t11;
        }
        self.m02 = t02;
        self.m12 = t12;
        match mystate & !APPLY_TRANSLATE {
            SH_SC => {
                let (m0, m1) = (self.m00, self.m10);
                self.m00 = m0 * t00 + m1 * t01;
                self.m10 = m0 * t10 + m1 * t11;

                let (m0, m1) = (self.m01, self.m11);
                self.m01 = m0 * t00 + m1 * t01;
                self.m11 = m0 * t10 + m1 * t11;
                self.update_state();
            }
            APPLY_SHEAR => {
                let m0 = self.m10;
                self.m00 = m0 * t01;
                self.m10 = m0 * t11;

                let m0 = self.m01;
                self.m01 = m0 * t00;
                self.m11 = m0 * t10;
                self.update_state();
            }
            APPLY_SCALE => {
                let m0 = self.m00;
                self.m00 = m0 * t00;
                self.m10 = m0 * t10;

                let m0 = self.m11;
                self.m01 = m0 * t01;
                self.m11 = m0 * t11;
                self.update_state();
            }
            APPLY_IDENTITY => {
                self.m00 = t00;
                self.m10 = t10;
                self.m01 = t01;
                self.m11 = t11;
                self.state = mystate | tx.state;
                self.invalidate_kind();
            }
            other => state_error(other),
        }
    }
}
