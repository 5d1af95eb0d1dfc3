use std::fmt;

use num_complex::Complex64;

use crate::fractal::types::{COEFFZEROLIMIT, MAXDEGREE};

/// Polynôme complexe dense de degré ≤ MAXDEGREE.
///
/// Chaque coefficient porte un indicateur « nul » (module au carré sous
/// COEFFZEROLIMIT) ; la dérivation symbolique saute les coefficients ainsi
/// marqués. Invariant : une fois le degré enregistré, le coefficient de tête
/// n'est jamais marqué nul.
#[derive(Clone, Debug)]
pub struct Polynomial {
    degree: usize,
    coeff: Vec<Complex64>,
    coeff_zero: Vec<bool>,
}

impl Polynomial {
    pub fn new() -> Self {
        Polynomial {
            degree: 0,
            coeff: vec![Complex64::new(0.0, 0.0); MAXDEGREE],
            coeff_zero: vec![true; MAXDEGREE],
        }
    }

    #[inline]
    pub fn degree(&self) -> usize {
        self.degree
    }

    #[inline]
    pub fn coeff(&self, idx: usize) -> Complex64 {
        self.coeff[idx]
    }

    #[inline]
    #[allow(dead_code)]
    pub fn coeff_is_zero(&self, idx: usize) -> bool {
        self.coeff_zero[idx]
    }

    /// Pose le coefficient d'indice `idx`. Un coefficient de module au carré
    /// sous COEFFZEROLIMIT est marqué nul et ne relève pas le degré.
    pub fn set_coeff(&mut self, idx: usize, value: Complex64) {
        self.coeff[idx] = value;
        if value.norm_sqr() < COEFFZEROLIMIT {
            self.coeff_zero[idx] = true;
        } else {
            self.coeff_zero[idx] = false;
            if idx > self.degree {
                self.degree = idx;
            }
        }
    }

    pub fn set_coeff_re(&mut self, idx: usize, re: f64) {
        self.set_coeff(idx, Complex64::new(re, 0.0));
    }

    /// Évaluation par Horner, du coefficient de tête vers le terme constant.
    #[inline]
    pub fn eval(&self, z: Complex64) -> Complex64 {
        let mut acc = self.coeff[self.degree];
        for i in (1..=self.degree).rev() {
            acc = acc * z + self.coeff[i - 1];
        }
        acc
    }

    /// Dérivée symbolique. Les coefficients marqués nuls sont ignorés.
    pub fn derivative(&self) -> Polynomial {
        let mut d = Polynomial::new();
        for i in 1..=self.degree {
            if !self.coeff_zero[i] {
                d.set_coeff(i - 1, Complex64::new(i as f64, 0.0) * self.coeff[i]);
            }
        }
        d
    }

    /// Borne de Lagrange arrondie à la puissance de deux supérieure :
    /// R = 2^⌈log2⌈(1 + Σ|cᵢ|)/|c_d|⌉⌉. Toutes les racines et toute la
    /// dynamique bornée du polynôme tiennent dans le carré [-R, R]².
    pub fn lagrange_radius(&self) -> f64 {
        let mut res = 1.0f64;
        for i in 0..=self.degree {
            res += self.coeff[i].norm();
        }
        res /= self.coeff[self.degree].norm();
        let expo = res.ceil().log2().ceil() as i32;
        2.0f64.powi(expo)
    }
}

impl fmt::Display for Polynomial {
    /// Forme lisible « p(z)=(re+imi)*z^k+... », coefficients nuls omis.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p(z)=")?;
        let mut first = true;
        for i in (0..=self.degree).rev() {
            if self.coeff_zero[i] {
                continue;
            }
            if !first {
                write!(f, "+")?;
            }
            first = false;
            let c = self.coeff[i];
            match i {
                0 => write!(f, "({}{:+}i)", c.re, c.im)?,
                1 => write!(f, "({}{:+}i)*z", c.re, c.im)?,
                _ => write!(f, "({}{:+}i)*z^{}", c.re, c.im, i)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn z2c(c: Complex64) -> Polynomial {
        let mut p = Polynomial::new();
        p.set_coeff_re(2, 1.0);
        p.set_coeff(0, c);
        p
    }

    #[test]
    fn horner_matches_direct_evaluation() {
        let p = z2c(Complex64::new(-1.0, 0.25));
        let z = Complex64::new(0.5, -0.75);
        let direct = z * z + Complex64::new(-1.0, 0.25);
        let diff = p.eval(z) - direct;
        assert!(diff.norm_sqr() < 1e-28);
    }

    #[test]
    fn degree_ignores_null_coefficients() {
        let mut p = Polynomial::new();
        p.set_coeff_re(3, 1.0);
        p.set_coeff(5, Complex64::new(1e-21, 0.0)); // sous COEFFZEROLIMIT
        assert_eq!(p.degree(), 3);
        assert!(p.coeff_is_zero(5));
        assert!(!p.coeff_is_zero(3));
    }

    #[test]
    fn derivative_of_z2c() {
        let p = z2c(Complex64::new(-1.0, 0.0));
        let d = p.derivative();
        // p'(z) = 2z
        assert_eq!(d.degree(), 1);
        let v = d.eval(Complex64::new(3.0, 0.0));
        assert!((v.re - 6.0).abs() < 1e-12);
        assert!(v.im.abs() < 1e-12);
    }

    #[test]
    fn derivative_skips_flagged_coefficients() {
        let mut p = Polynomial::new();
        p.set_coeff_re(4, 1.0);
        p.set_coeff(2, Complex64::new(0.0, 1e-25)); // marqué nul
        p.set_coeff_re(1, -1.0);
        let d = p.derivative();
        // d(z) = 4z^3 - 1, le terme en z n'apparaît pas
        assert_eq!(d.degree(), 3);
        assert!(d.coeff_is_zero(1));
    }

    #[test]
    fn lagrange_radius_basilica() {
        // z² - 1 : (1 + 1 + 1)/1 = 3, ⌈log2 3⌉ = 2, R = 4
        let p = z2c(Complex64::new(-1.0, 0.0));
        assert_eq!(p.lagrange_radius(), 4.0);
        // z² : (1 + 1)/1 = 2, R = 2
        let q = z2c(Complex64::new(0.0, 0.0));
        assert_eq!(q.lagrange_radius(), 2.0);
    }

    #[test]
    fn display_skips_null_terms() {
        let p = z2c(Complex64::new(-1.0, 0.0));
        let s = format!("{}", p);
        assert!(s.starts_with("p(z)="));
        assert!(s.contains("z^2"));
        assert!(!s.contains("z^1"));
    }
}
