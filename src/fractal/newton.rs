use num_complex::Complex64;
use rayon::prelude::*;

use crate::error::PredictorError;
use crate::fractal::polynomial::Polynomial;
use crate::fractal::types::{MAXIT, MAXZEROS, ZEROEPSILON};

/// Nombre de points de départ échantillonnés par bord du carré de recherche.
const BORDER_SAMPLES: usize = 1024;

/// Itération de Newton z ← z − f(z)/f'(z) depuis `start`.
///
/// Convergence : deux itérés successifs à distance au carré sous ZEROEPSILON.
/// Un départ qui n'a pas convergé après MAXIT itérations est abandonné
/// (None) sans diagnostic, conformément au comportement attendu.
pub fn newton_root(f: &Polynomial, fd: &Polynomial, start: Complex64) -> Option<Complex64> {
    let mut z = start;
    for _ in 1..MAXIT {
        let step = f.eval(z) / fd.eval(z);
        let next = z - step;
        let d = next - z;
        z = next;
        if d.norm_sqr() < ZEROEPSILON {
            return Some(z);
        }
    }
    None
}

/// Cherche les points critiques de `f`, c'est-à-dire les zéros de f'.
///
/// Les départs parcourent les quatre bords (gauche, haut, droite, bas) du
/// carré de demi-côté 3·R, R étant la borne de Lagrange : assez loin des
/// racines pour que les canaux de Newton vers chaque racine soient fiables
/// (d'après Hubbard, Schleicher, Sutherland, « How to find all roots of
/// complex polynomials by Newton's method », 2001). Chaque bord est balayé
/// dans un ordre fixe ; les exécutions de Newton d'un même bord tournent en
/// parallèle et la déduplication se fait ensuite dans l'ordre du parcours,
/// ce qui rend le résultat déterministe. La recherche s'arrête dès que
/// deg f' racines distinctes sont connues.
pub fn find_critical_points(
    f: &Polynomial,
    lagrange: f64,
) -> Result<Vec<Complex64>, PredictorError> {
    let fd = f.derivative();
    let fdd = fd.derivative();
    let wanted = fd.degree();

    let border = 3.0 * lagrange;
    let step = 2.0 * border / BORDER_SAMPLES as f64;
    let coord = move |i: usize| -border + i as f64 * step;

    // Bords dans l'ordre : gauche (bas → haut), haut (gauche → droite),
    // droite (haut → bas), bas (droite → gauche).
    let borders: [Box<dyn Fn(usize) -> Complex64 + Sync>; 4] = [
        Box::new(move |i| Complex64::new(-border, coord(i))),
        Box::new(move |i| Complex64::new(coord(i), border)),
        Box::new(move |i| Complex64::new(border, coord(BORDER_SAMPLES - 1 - i))),
        Box::new(move |i| Complex64::new(coord(BORDER_SAMPLES - 1 - i), -border)),
    ];

    let mut roots: Vec<Complex64> = Vec::new();
    for make_start in borders.iter() {
        if wanted > 0 && roots.len() >= wanted {
            break;
        }
        let converged: Vec<Option<Complex64>> = (0..BORDER_SAMPLES)
            .into_par_iter()
            .map(|i| newton_root(&fd, &fdd, make_start(i)))
            .collect();
        for z in converged.into_iter().flatten() {
            if roots
                .iter()
                .any(|r| (*r - z).norm_sqr() < ZEROEPSILON)
            {
                continue;
            }
            if roots.len() >= MAXZEROS - 8 {
                return Err(PredictorError::TooManyRoots { limit: MAXZEROS });
            }
            roots.push(z);
            if wanted > 0 && roots.len() >= wanted {
                break;
            }
        }
    }

    if roots.is_empty() {
        return Err(PredictorError::NoCriticalPoints);
    }
    Ok(roots)
}
