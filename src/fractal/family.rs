use num_complex::Complex64;

use crate::fractal::polynomial::Polynomial;
use crate::fractal::types::{FamilyKind, ParamInterval, PlaneRect};

#[inline]
fn min2(a: f64, b: f64) -> f64 {
    if a < b {
        a
    } else {
        b
    }
}

#[inline]
fn max2(a: f64, b: f64) -> f64 {
    if a > b {
        a
    } else {
        b
    }
}

#[inline]
fn min4(a: f64, b: f64, c: f64, d: f64) -> f64 {
    let mut m = a;
    if b < m {
        m = b;
    }
    if c < m {
        m = c;
    }
    if d < m {
        m = d;
    }
    m
}

#[inline]
fn max4(a: f64, b: f64, c: f64, d: f64) -> f64 {
    let mut m = a;
    if b > m {
        m = b;
    }
    if c > m {
        m = c;
    }
    if d > m {
        m = d;
    }
    m
}

/// Produit d'un intervalle de paramètre [p0, p1] par un intervalle [t0, t1] :
/// min et max sur les quatre combinaisons de coins. Les bornes de paramètre
/// étant semées dégénérées (p0 == p1), ceci coïncide avec l'énumération
/// scalaire à deux termes.
#[inline]
fn ival_mul(p0: f64, p1: f64, t0: f64, t1: f64) -> (f64, f64) {
    (
        min4(p0 * t0, p0 * t1, p1 * t0, p1 * t1),
        max4(p0 * t0, p0 * t1, p1 * t0, p1 * t1),
    )
}

/// Une famille instanciée : la forme, les deux paramètres d'intervalle et le
/// polynôme scalaire correspondant (pour Newton et les orbites critiques).
///
/// La boîte englobante `bbox` est la seule opération d'intervalle : pour
/// chaque monôme, min et max sont énumérés sur les combinaisons de coins du
/// rectangle d'entrée, puis les contributions sont sommées — min vers la
/// borne inférieure, max vers la borne supérieure ; les paramètres
/// contribuent leur borne basse en bas et leur borne haute en haut.
/// L'énumération par coins est exacte tant que le rectangle ne chevauche pas
/// un axe, ce que la grille dyadique garantit (0 tombe sur une frontière de
/// cellule).
#[derive(Clone, Debug)]
pub struct Family {
    pub kind: FamilyKind,
    pub c: ParamInterval,
    pub a: ParamInterval,
    poly: Polynomial,
}

impl Family {
    pub fn new(kind: FamilyKind, c: ParamInterval, a: ParamInterval) -> Self {
        let cz = Complex64::new(c.re0, c.im0);
        let az = Complex64::new(a.re0, a.im0);
        let mut poly = Polynomial::new();
        match kind {
            FamilyKind::Z2C => {
                poly.set_coeff_re(2, 1.0);
                poly.set_coeff(0, cz);
            }
            FamilyKind::Z2AZC => {
                poly.set_coeff_re(2, 1.0);
                poly.set_coeff(1, az);
                poly.set_coeff(0, cz);
            }
            FamilyKind::Z3AZC => {
                poly.set_coeff_re(3, 1.0);
                poly.set_coeff(1, az);
                poly.set_coeff(0, cz);
            }
            FamilyKind::Z4AZC => {
                poly.set_coeff_re(4, 1.0);
                poly.set_coeff(1, az);
                poly.set_coeff(0, cz);
            }
            FamilyKind::Z5AZC => {
                poly.set_coeff_re(5, 1.0);
                poly.set_coeff(1, az);
                poly.set_coeff(0, cz);
            }
            FamilyKind::Z6AZC => {
                poly.set_coeff_re(6, 1.0);
                poly.set_coeff(1, az);
                poly.set_coeff(0, cz);
            }
            FamilyKind::Z5CZA => {
                // z^5 + C·z + A : les rôles des deux paramètres sont échangés.
                poly.set_coeff_re(5, 1.0);
                poly.set_coeff(1, cz);
                poly.set_coeff(0, az);
            }
        }
        Family { kind, c, a, poly }
    }

    #[inline]
    pub fn poly(&self) -> &Polynomial {
        &self.poly
    }

    /// Boîte englobante arrondie vers l'extérieur de f(r).
    #[inline]
    pub fn bbox(&self, r: &PlaneRect) -> PlaneRect {
        match self.kind {
            FamilyKind::Z2C => bbox_z2c(&self.c, r),
            FamilyKind::Z2AZC => bbox_z2azc(&self.c, &self.a, r),
            FamilyKind::Z3AZC => bbox_z3azc(&self.c, &self.a, r),
            FamilyKind::Z4AZC => bbox_z4azc(&self.c, &self.a, r),
            FamilyKind::Z5AZC => bbox_z5azc(&self.c, &self.a, r),
            FamilyKind::Z6AZC => bbox_z6azc(&self.c, &self.a, r),
            FamilyKind::Z5CZA => bbox_z5cza(&self.c, &self.a, r),
        }
    }

    /// Ligne de commande reconstruite pour le moteur de rendu aval.
    pub fn core_command_line(&self) -> String {
        match self.kind {
            FamilyKind::Z2C => format!(
                "func=z2c c={},{} cmd=period,-1",
                self.c.re0, self.c.im0
            ),
            _ => format!(
                "func={} c={},{} A={},{} cmd=period,-1",
                self.kind.cli_name(),
                self.c.re0,
                self.c.im0,
                self.a.re0,
                self.a.im0
            ),
        }
    }
}

// z^2 + C
fn bbox_z2c(c: &ParamInterval, r: &PlaneRect) -> PlaneRect {
    let (x0, x1, y0, y1) = (r.x0, r.x1, r.y0, r.y1);
    PlaneRect {
        x0: min2(x0 * x0, x1 * x1) - max2(y0 * y0, y1 * y1) + c.re0,
        x1: max2(x0 * x0, x1 * x1) - min2(y0 * y0, y1 * y1) + c.re1,
        y0: 2.0 * min4(x0 * y0, x0 * y1, x1 * y0, x1 * y1) + c.im0,
        y1: 2.0 * max4(x0 * y0, x0 * y1, x1 * y0, x1 * y1) + c.im1,
    }
}

// z^2 + A·z + C
fn bbox_z2azc(c: &ParamInterval, a: &ParamInterval, r: &PlaneRect) -> PlaneRect {
    let (x0, x1, y0, y1) = (r.x0, r.x1, r.y0, r.y1);
    let (are_x_lo, are_x_hi) = ival_mul(a.re0, a.re1, x0, x1);
    let (are_y_lo, are_y_hi) = ival_mul(a.re0, a.re1, y0, y1);
    let (aim_x_lo, aim_x_hi) = ival_mul(a.im0, a.im1, x0, x1);
    let (aim_y_lo, aim_y_hi) = ival_mul(a.im0, a.im1, y0, y1);
    PlaneRect {
        x0: c.re0 + are_x_lo + min2(x0 * x0, x1 * x1)
            - aim_y_hi
            - max2(y0 * y0, y1 * y1),
        x1: c.re1 + are_x_hi + max2(x0 * x0, x1 * x1)
            - aim_y_lo
            - min2(y0 * y0, y1 * y1),
        y0: c.im0
            + aim_x_lo
            + are_y_lo
            + 2.0 * min4(x0 * y0, x0 * y1, x1 * y0, x1 * y1),
        y1: c.im1
            + aim_x_hi
            + are_y_hi
            + 2.0 * max4(x0 * y0, x0 * y1, x1 * y0, x1 * y1),
    }
}

// z^3 + A·z + C
fn bbox_z3azc(c: &ParamInterval, a: &ParamInterval, r: &PlaneRect) -> PlaneRect {
    let (x0, x1, y0, y1) = (r.x0, r.x1, r.y0, r.y1);
    let (x0_2, x1_2, y0_2, y1_2) = (x0 * x0, x1 * x1, y0 * y0, y1 * y1);
    let min_x2 = min2(x0_2, x1_2);
    let max_x2 = max2(x0_2, x1_2);
    let min_y2 = min2(y0_2, y1_2);
    let max_y2 = max2(y0_2, y1_2);
    let (are_x_lo, are_x_hi) = ival_mul(a.re0, a.re1, x0, x1);
    let (are_y_lo, are_y_hi) = ival_mul(a.re0, a.re1, y0, y1);
    let (aim_x_lo, aim_x_hi) = ival_mul(a.im0, a.im1, x0, x1);
    let (aim_y_lo, aim_y_hi) = ival_mul(a.im0, a.im1, y0, y1);
    PlaneRect {
        // re(z³) = x³ - 3·x·y²
        x0: are_x_lo - aim_y_hi + x0_2 * x0
            - 3.0 * max4(x0 * min_y2, x0 * max_y2, x1 * min_y2, x1 * max_y2)
            + c.re0,
        x1: are_x_hi - aim_y_lo + x1_2 * x1
            - 3.0 * min4(x0 * min_y2, x0 * max_y2, x1 * min_y2, x1 * max_y2)
            + c.re1,
        // im(z³) = 3·x²·y - y³
        y0: are_y_lo
            + aim_x_lo
            + 3.0 * min4(min_x2 * y0, min_x2 * y1, max_x2 * y0, max_x2 * y1)
            - y1_2 * y1
            + c.im0,
        y1: are_y_hi
            + aim_x_hi
            + 3.0 * max4(min_x2 * y0, min_x2 * y1, max_x2 * y0, max_x2 * y1)
            - y0_2 * y0
            + c.im1,
    }
}

// z^4 + A·z + C
fn bbox_z4azc(c: &ParamInterval, a: &ParamInterval, r: &PlaneRect) -> PlaneRect {
    let (x0, x1, y0, y1) = (r.x0, r.x1, r.y0, r.y1);
    let (x0_2, x1_2, y0_2, y1_2) = (x0 * x0, x1 * x1, y0 * y0, y1 * y1);
    let (x0_3, x1_3, y0_3, y1_3) = (x0_2 * x0, x1_2 * x1, y0_2 * y0, y1_2 * y1);
    let (x0_4, x1_4, y0_4, y1_4) = (x0_3 * x0, x1_3 * x1, y0_3 * y0, y1_3 * y1);
    let min_x2 = min2(x0_2, x1_2);
    let max_x2 = max2(x0_2, x1_2);
    let min_y2 = min2(y0_2, y1_2);
    let max_y2 = max2(y0_2, y1_2);
    let (are_x_lo, are_x_hi) = ival_mul(a.re0, a.re1, x0, x1);
    let (are_y_lo, are_y_hi) = ival_mul(a.re0, a.re1, y0, y1);
    let (aim_x_lo, aim_x_hi) = ival_mul(a.im0, a.im1, x0, x1);
    let (aim_y_lo, aim_y_hi) = ival_mul(a.im0, a.im1, y0, y1);
    PlaneRect {
        // re(z⁴) = x⁴ - 6·x²·y² + y⁴
        x0: are_x_lo - aim_y_hi + min2(x0_4, x1_4)
            - 6.0
                * max4(
                    min_x2 * min_y2,
                    min_x2 * max_y2,
                    max_x2 * min_y2,
                    max_x2 * max_y2,
                )
            + min2(y0_4, y1_4)
            + c.re0,
        x1: are_x_hi - aim_y_lo + max2(x0_4, x1_4)
            - 6.0
                * min4(
                    min_x2 * min_y2,
                    min_x2 * max_y2,
                    max_x2 * min_y2,
                    max_x2 * max_y2,
                )
            + max2(y0_4, y1_4)
            + c.re1,
        // im(z⁴) = 4·x³·y - 4·x·y³
        y0: are_y_lo
            + aim_x_lo
            + 4.0 * min4(x0_3 * y0, x0_3 * y1, x1_3 * y0, x1_3 * y1)
            - 4.0 * max4(x0 * y0_3, x0 * y1_3, x1 * y0_3, x1 * y1_3)
            + c.im0,
        y1: are_y_hi
            + aim_x_hi
            + 4.0 * max4(x0_3 * y0, x0_3 * y1, x1_3 * y0, x1_3 * y1)
            - 4.0 * min4(x0 * y0_3, x0 * y1_3, x1 * y0_3, x1 * y1_3)
            + c.im1,
    }
}

// Corps commun de z^5 + L·z + K : L est le paramètre du terme linéaire,
// K le terme constant. z5azc y instancie (L=A, K=C), z5cza (L=C, K=A).
fn bbox_z5_linear(k: &ParamInterval, l: &ParamInterval, r: &PlaneRect) -> PlaneRect {
    let (x0, x1, y0, y1) = (r.x0, r.x1, r.y0, r.y1);
    let (x0_2, x1_2, y0_2, y1_2) = (x0 * x0, x1 * x1, y0 * y0, y1 * y1);
    let (x0_3, x1_3, y0_3, y1_3) = (x0_2 * x0, x1_2 * x1, y0_2 * y0, y1_2 * y1);
    let (x0_4, x1_4, y0_4, y1_4) = (x0_3 * x0, x1_3 * x1, y0_3 * y0, y1_3 * y1);
    let (x0_5, x1_5, y0_5, y1_5) = (x0_4 * x0, x1_4 * x1, y0_4 * y0, y1_4 * y1);
    let min_x2 = min2(x0_2, x1_2);
    let max_x2 = max2(x0_2, x1_2);
    let min_y2 = min2(y0_2, y1_2);
    let max_y2 = max2(y0_2, y1_2);
    let min_x4 = min2(x0_4, x1_4);
    let max_x4 = max2(x0_4, x1_4);
    let min_y4 = min2(y0_4, y1_4);
    let max_y4 = max2(y0_4, y1_4);
    let (lre_x_lo, lre_x_hi) = ival_mul(l.re0, l.re1, x0, x1);
    let (lre_y_lo, lre_y_hi) = ival_mul(l.re0, l.re1, y0, y1);
    let (lim_x_lo, lim_x_hi) = ival_mul(l.im0, l.im1, x0, x1);
    let (lim_y_lo, lim_y_hi) = ival_mul(l.im0, l.im1, y0, y1);
    PlaneRect {
        // re(z⁵) = x⁵ - 10·x³·y² + 5·x·y⁴
        x0: lre_x_lo - lim_y_hi + x0_5
            - 10.0 * max4(x0_3 * min_y2, x0_3 * max_y2, x1_3 * min_y2, x1_3 * max_y2)
            + 5.0 * min4(x0 * min_y4, x0 * max_y4, x1 * min_y4, x1 * max_y4)
            + k.re0,
        x1: lre_x_hi - lim_y_lo + x1_5
            - 10.0 * min4(x0_3 * min_y2, x0_3 * max_y2, x1_3 * min_y2, x1_3 * max_y2)
            + 5.0 * max4(x0 * min_y4, x0 * max_y4, x1 * min_y4, x1 * max_y4)
            + k.re1,
        // im(z⁵) = 5·x⁴·y - 10·x²·y³ + y⁵
        y0: lre_y_lo
            + lim_x_lo
            + 5.0 * min4(min_x4 * y0, min_x4 * y1, max_x4 * y0, max_x4 * y1)
            - 10.0 * max4(min_x2 * y0_3, min_x2 * y1_3, max_x2 * y0_3, max_x2 * y1_3)
            + y0_5
            + k.im0,
        y1: lre_y_hi
            + lim_x_hi
            + 5.0 * max4(min_x4 * y0, min_x4 * y1, max_x4 * y0, max_x4 * y1)
            - 10.0 * min4(min_x2 * y0_3, min_x2 * y1_3, max_x2 * y0_3, max_x2 * y1_3)
            + y1_5
            + k.im1,
    }
}

// z^5 + A·z + C
fn bbox_z5azc(c: &ParamInterval, a: &ParamInterval, r: &PlaneRect) -> PlaneRect {
    bbox_z5_linear(c, a, r)
}

// z^5 + C·z + A
fn bbox_z5cza(c: &ParamInterval, a: &ParamInterval, r: &PlaneRect) -> PlaneRect {
    bbox_z5_linear(a, c, r)
}

// z^6 + A·z + C
fn bbox_z6azc(c: &ParamInterval, a: &ParamInterval, r: &PlaneRect) -> PlaneRect {
    let (x0, x1, y0, y1) = (r.x0, r.x1, r.y0, r.y1);
    let (x0_2, x1_2, y0_2, y1_2) = (x0 * x0, x1 * x1, y0 * y0, y1 * y1);
    let (x0_3, x1_3, y0_3, y1_3) = (x0_2 * x0, x1_2 * x1, y0_2 * y0, y1_2 * y1);
    let (x0_4, x1_4, y0_4, y1_4) = (x0_3 * x0, x1_3 * x1, y0_3 * y0, y1_3 * y1);
    let (x0_5, x1_5, y0_5, y1_5) = (x0_4 * x0, x1_4 * x1, y0_4 * y0, y1_4 * y1);
    let (x0_6, x1_6, y0_6, y1_6) = (x0_5 * x0, x1_5 * x1, y0_5 * y0, y1_5 * y1);
    let min_x2 = min2(x0_2, x1_2);
    let max_x2 = max2(x0_2, x1_2);
    let min_y2 = min2(y0_2, y1_2);
    let max_y2 = max2(y0_2, y1_2);
    let min_x4 = min2(x0_4, x1_4);
    let max_x4 = max2(x0_4, x1_4);
    let min_y4 = min2(y0_4, y1_4);
    let max_y4 = max2(y0_4, y1_4);
    let (are_x_lo, are_x_hi) = ival_mul(a.re0, a.re1, x0, x1);
    let (are_y_lo, are_y_hi) = ival_mul(a.re0, a.re1, y0, y1);
    let (aim_x_lo, aim_x_hi) = ival_mul(a.im0, a.im1, x0, x1);
    let (aim_y_lo, aim_y_hi) = ival_mul(a.im0, a.im1, y0, y1);
    PlaneRect {
        // re(z⁶) = x⁶ - 15·x⁴·y² + 15·x²·y⁴ - y⁶
        x0: c.re0 + are_x_lo - aim_y_hi + min2(x0_6, x1_6)
            - 15.0
                * max4(
                    min_x4 * min_y2,
                    min_x4 * max_y2,
                    max_x4 * min_y2,
                    max_x4 * max_y2,
                )
            + 15.0
                * min4(
                    min_x2 * min_y4,
                    min_x2 * max_y4,
                    max_x2 * min_y4,
                    max_x2 * max_y4,
                )
            - max2(y0_6, y1_6),
        x1: c.re1 + are_x_hi - aim_y_lo + max2(x0_6, x1_6)
            - 15.0
                * min4(
                    min_x4 * min_y2,
                    min_x4 * max_y2,
                    max_x4 * min_y2,
                    max_x4 * max_y2,
                )
            + 15.0
                * max4(
                    min_x2 * min_y4,
                    min_x2 * max_y4,
                    max_x2 * min_y4,
                    max_x2 * max_y4,
                )
            - min2(y0_6, y1_6),
        // im(z⁶) = 6·x⁵·y - 20·x³·y³ + 6·x·y⁵
        y0: are_y_lo
            + aim_x_lo
            + 6.0 * min4(x0_5 * y0, x0_5 * y1, x1_5 * y0, x1_5 * y1)
            - 20.0 * max4(x0_3 * y0_3, x0_3 * y1_3, x1_3 * y0_3, x1_3 * y1_3)
            + 6.0 * min4(x0 * y0_5, x0 * y1_5, x1 * y0_5, x1 * y1_5)
            + c.im0,
        y1: are_y_hi
            + aim_x_hi
            + 6.0 * max4(x0_5 * y0, x0_5 * y1, x1_5 * y0, x1_5 * y1)
            - 20.0 * min4(x0_3 * y0_3, x0_3 * y1_3, x1_3 * y0_3, x1_3 * y1_3)
            + 6.0 * max4(x0 * y0_5, x0 * y1_5, x1 * y0_5, x1 * y1_5)
            + c.im1,
    }
}
