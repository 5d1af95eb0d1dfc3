use num_complex::Complex64;
use rug::{Complex, Float};

use crate::fractal::polynomial::Polynomial;

/// Nombre de pas de Newton en précision MPC ; la convergence est
/// quadratique depuis un départ f64 déjà convergé, la marge est large.
const POLISH_STEPS: usize = 64;

pub fn complex_from_f64(z: Complex64, prec: u32) -> Complex {
    Complex::with_val(
        prec,
        (Float::with_val(prec, z.re), Float::with_val(prec, z.im)),
    )
}

pub fn complex_to_complex64(z: &Complex) -> Complex64 {
    Complex64::new(z.real().to_f64(), z.imag().to_f64())
}

/// Polynôme à coefficients MPC, évalué par Horner. Conversion exacte depuis
/// le polynôme f64 (les coefficients sont dyadiques par construction).
pub struct MpcPolynomial {
    degree: usize,
    coeff: Vec<Complex>,
}

impl MpcPolynomial {
    pub fn from_polynomial(p: &Polynomial, prec: u32) -> Self {
        let coeff = (0..=p.degree())
            .map(|i| complex_from_f64(p.coeff(i), prec))
            .collect();
        MpcPolynomial { degree: p.degree(), coeff }
    }

    pub fn eval(&self, z: &Complex) -> Complex {
        let mut acc = self.coeff[self.degree].clone();
        for i in (1..=self.degree).rev() {
            acc *= z;
            acc += &self.coeff[i - 1];
        }
        acc
    }
}

/// Module au carré, sans passer par f64.
fn norm_sqr(z: &Complex) -> Float {
    let mut n = z.real().clone();
    n *= z.real();
    let mut im_sq = z.imag().clone();
    im_sq *= z.imag();
    n += &im_sq;
    n
}

/// Itération de Newton en précision MPC depuis un départ f64.
/// Convergence : |Δ|² sous 2^-(2·prec-16). Sans convergence, le dernier
/// itéré est rendu tel quel.
pub fn newton_mpc(f: &MpcPolynomial, fd: &MpcPolynomial, start: Complex64, prec: u32) -> Complex64 {
    let mut eps = Float::with_val(prec, 1.0);
    eps >>= 2 * prec - 16;

    let mut z = complex_from_f64(start, prec);
    for _ in 0..POLISH_STEPS {
        let fz = f.eval(&z);
        let fdz = fd.eval(&z);
        let step = Complex::with_val(prec, &fz / &fdz);
        let next = Complex::with_val(prec, &z - &step);
        let d = Complex::with_val(prec, &next - &z);
        z = next;
        if norm_sqr(&d) < eps {
            break;
        }
    }
    complex_to_complex64(&z)
}

/// Polit chaque point critique (zéro de f') par Newton MPC avant la
/// construction des orbites. Les départs viennent de la recherche f64 ;
/// le résultat est reprojeté en f64 pour le reste du pipeline.
pub fn polish_critical_points(f: &Polynomial, points: &[Complex64], prec: u32) -> Vec<Complex64> {
    let prec = prec.max(24);
    let fd = f.derivative();
    let fdd = fd.derivative();
    let mp_fd = MpcPolynomial::from_polynomial(&fd, prec);
    let mp_fdd = MpcPolynomial::from_polynomial(&fdd, prec);
    points
        .iter()
        .map(|&z| newton_mpc(&mp_fd, &mp_fdd, z, prec))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mpc_eval_matches_f64_eval() {
        let mut p = Polynomial::new();
        p.set_coeff_re(3, 1.0);
        p.set_coeff(0, Complex64::new(-0.5, 0.25));
        let mp = MpcPolynomial::from_polynomial(&p, 128);
        let z = Complex64::new(0.375, -0.125);
        let got = complex_to_complex64(&mp.eval(&complex_from_f64(z, 128)));
        let want = p.eval(z);
        assert!((got - want).norm_sqr() < 1e-28);
    }

    #[test]
    fn polish_recenters_a_perturbed_critical_point() {
        // f = z² - 1 : point critique exact en 0 ; un départ perturbé est
        // ramené dessus bien au-delà de la précision f64 du départ.
        let mut f = Polynomial::new();
        f.set_coeff_re(2, 1.0);
        f.set_coeff_re(0, -1.0);
        let polished = polish_critical_points(&f, &[Complex64::new(1e-3, -1e-4)], 128);
        assert!(polished[0].norm_sqr() < 1e-24);
    }
}
