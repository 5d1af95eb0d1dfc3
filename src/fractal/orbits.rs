use num_complex::Complex64;

use crate::fractal::polynomial::Polynomial;
use crate::fractal::types::{PlaneRect, MAXIT, REPELLING_LIMIT, ZEROEPSILON};

/// Un point d'un cycle périodique, avec son enveloppe en coordonnées grille
/// (mots sur l'axe x, lignes sur l'axe y) mise en cache par le moteur de
/// cell mapping pour le niveau courant.
#[derive(Clone, Debug)]
pub struct PeriodicPoint {
    pub pp: Complex64,
    pub mem0: i64,
    pub mem1: i64,
    pub y0: i64,
    pub y1: i64,
}

impl PeriodicPoint {
    fn new(pp: Complex64) -> Self {
        PeriodicPoint { pp, mem0: 0, mem1: 0, y0: 0, y1: 0 }
    }
}

/// Un point critique et ce que son orbite a révélé.
///
/// `cycle` est vide si l'orbite critique fuit, n'est pas périodique, est
/// répulsive ou duplique un cycle déjà retenu. `cycle_number` vaut 0 dans
/// tous ces cas ; les cycles retenus sont numérotés 1, 2, … dans l'ordre de
/// découverte, sans trou.
#[derive(Clone, Debug)]
pub struct Root {
    pub attractor: Complex64,
    pub cycle: Vec<PeriodicPoint>,
    pub cycle_number: usize,
    /// |∏ f'(z_k)| sur le cycle. > 1.00001 a classé le cycle répulsif.
    pub multiplier: f64,
    /// Rectangle du plan complexe réellement analysé (pour la détection de
    /// chevauchement entre cycles). Posé par le moteur de cell mapping.
    pub basin_rect: PlaneRect,
    /// 0 tant qu'aucun intérieur n'est prouvé, sinon le niveau de
    /// raffinement auquel il est apparu.
    pub interior_found: u32,
}

impl Root {
    fn new(attractor: Complex64) -> Self {
        Root {
            attractor,
            cycle: Vec::new(),
            cycle_number: 0,
            multiplier: 0.0,
            basin_rect: PlaneRect::default(),
            interior_found: 0,
        }
    }

    #[inline]
    pub fn has_cycle(&self) -> bool {
        !self.cycle.is_empty()
    }
}

/// Itère chaque point critique en avant et classe son orbite.
///
/// Test de fuite après chaque pas : |z|² > R², R la borne de Lagrange. Sur
/// une orbite bornée, on cherche depuis la fin l'indice antérieur le plus
/// proche coïncidant avec le dernier point ; le cycle est le segment qui
/// suit. Un cycle partageant un point avec un cycle retenu plus tôt est un
/// doublon. Le multiplicateur décide ensuite : répulsif → écarté.
pub fn classify_critical_orbits(
    f: &Polynomial,
    critical_points: &[Complex64],
    lagrange: f64,
) -> Vec<Root> {
    let escape_sq = lagrange * lagrange;
    let fd = f.derivative();
    let mut roots: Vec<Root> = Vec::with_capacity(critical_points.len());
    let mut next_cycle_number = 1usize;

    for &cp in critical_points {
        let mut root = Root::new(cp);

        let mut orbit: Vec<Complex64> = Vec::with_capacity(MAXIT);
        let mut zn = cp;
        let mut escaped = false;
        for _ in 0..MAXIT {
            orbit.push(zn);
            if zn.norm_sqr() > escape_sq {
                escaped = true;
                break;
            }
            zn = f.eval(zn);
        }
        if escaped {
            roots.push(root);
            continue;
        }

        // Orbite bornée : périodique ?
        let last = orbit[orbit.len() - 1];
        let cycle_start = (0..orbit.len() - 1)
            .rev()
            .find(|&i| (orbit[i] - last).norm_sqr() < ZEROEPSILON);
        let Some(cycle_start) = cycle_start else {
            // Bornée mais apériodique aux yeux du test de coïncidence.
            roots.push(root);
            continue;
        };
        let cycle_points = &orbit[cycle_start + 1..];

        // Un point critique antérieur a-t-il déjà trouvé ce cycle ?
        let duplicate = roots.iter().any(|prev| {
            prev.cycle.iter().any(|pp| {
                cycle_points
                    .iter()
                    .any(|&z| (pp.pp - z).norm_sqr() < ZEROEPSILON)
            })
        });
        if duplicate {
            roots.push(root);
            continue;
        }

        let mut multiplier = Complex64::new(1.0, 0.0);
        for &z in cycle_points {
            multiplier *= fd.eval(z);
        }
        root.multiplier = multiplier.norm();

        if root.multiplier > REPELLING_LIMIT {
            // Répulsif : le cycle n'est pas retenu et ne consomme pas de
            // numéro.
            roots.push(root);
            continue;
        }

        root.cycle = cycle_points.iter().map(|&z| PeriodicPoint::new(z)).collect();
        root.cycle_number = next_cycle_number;
        next_cycle_number += 1;
        roots.push(root);
    }

    roots
}

#[cfg(test)]
mod tests {
    use super::*;

    fn z2c(re: f64) -> Polynomial {
        let mut p = Polynomial::new();
        p.set_coeff_re(2, 1.0);
        p.set_coeff_re(0, re);
        p
    }

    #[test]
    fn basilica_cycle_of_length_two() {
        // c = -1 : 0 ↔ -1, super-attractif (multiplicateur 0).
        let f = z2c(-1.0);
        let roots = classify_critical_orbits(&f, &[Complex64::new(0.0, 0.0)], f.lagrange_radius());
        assert_eq!(roots.len(), 1);
        let r = &roots[0];
        assert_eq!(r.cycle.len(), 2);
        assert_eq!(r.cycle_number, 1);
        assert!(r.multiplier < 1e-9);
        for target in [0.0, -1.0] {
            assert!(
                r.cycle
                    .iter()
                    .any(|p| (p.pp - Complex64::new(target, 0.0)).norm_sqr() < ZEROEPSILON),
                "point de cycle {target} absent"
            );
        }
    }

    #[test]
    fn fixed_point_cycle_of_length_one() {
        // c = 0 : point fixe super-attractif en 0.
        let f = z2c(0.0);
        let roots = classify_critical_orbits(&f, &[Complex64::new(0.0, 0.0)], f.lagrange_radius());
        let r = &roots[0];
        assert_eq!(r.cycle.len(), 1);
        assert!(r.cycle[0].pp.norm_sqr() < ZEROEPSILON);
        assert!(r.multiplier < 1e-9);
    }

    #[test]
    fn escaping_orbit_keeps_no_cycle() {
        // c = 1 : l'orbite critique 0 → 1 → 2 → 5 → 26 fuit.
        let f = z2c(1.0);
        let roots = classify_critical_orbits(&f, &[Complex64::new(0.0, 0.0)], f.lagrange_radius());
        assert!(!roots[0].has_cycle());
        assert_eq!(roots[0].cycle_number, 0);
    }

    #[test]
    fn repelling_cycle_is_discarded_without_consuming_a_number() {
        // c = -2 : 0 → -2 → 2 → 2 → …, point fixe 2 avec f'(2) = 4.
        let f = z2c(-2.0);
        let roots = classify_critical_orbits(&f, &[Complex64::new(0.0, 0.0)], f.lagrange_radius());
        let r = &roots[0];
        assert!(!r.has_cycle());
        assert_eq!(r.cycle_number, 0);
        assert!((r.multiplier - 4.0).abs() < 1e-9);
    }

    #[test]
    fn duplicate_cycle_is_discarded_and_numbers_stay_contiguous() {
        // Deux « points critiques » tombant dans le même cycle : seul le
        // premier le retient.
        let f = z2c(-1.0);
        let roots = classify_critical_orbits(
            &f,
            &[Complex64::new(0.0, 0.0), Complex64::new(1e-9, 0.0)],
            f.lagrange_radius(),
        );
        assert_eq!(roots.len(), 2);
        assert!(roots[0].has_cycle());
        assert_eq!(roots[0].cycle_number, 1);
        assert!(!roots[1].has_cycle());
        assert_eq!(roots[1].cycle_number, 0);
    }

    #[test]
    fn parabolic_fixed_point_is_retained() {
        // c = 1/4 : point fixe parabolique en 1/2, multiplicateur 1. Le
        // cycle est retenu (seuls les multiplicateurs > 1.00001 sont
        // écartés) même si la convergence de l'orbite est très lente.
        let f = z2c(0.25);
        let roots = classify_critical_orbits(&f, &[Complex64::new(0.0, 0.0)], f.lagrange_radius());
        let r = &roots[0];
        if r.has_cycle() {
            assert!(r.multiplier <= REPELLING_LIMIT);
            for p in &r.cycle {
                assert!((p.pp - Complex64::new(0.5, 0.0)).norm() < 0.1);
            }
        }
    }
}
