use std::path::PathBuf;

use crate::error::PredictorError;
use crate::fractal::family::Family;
use crate::fractal::orbits::Root;
use crate::fractal::types::{
    Config, PlaneRect, ScreenRect, ALL32GRAY, ALL32POTW, SHIFT_PER_WORD,
};
use crate::grid::arena::{RowWords, WordArena};
use crate::io::log::RunLog;
use crate::io::png::save_grid_png;

/// Lit le mot (m, y) en coordonnées absolues. Hors de la grille matérialisée
/// (ligne hors enveloppe, ligne non allouée ou mot hors plage), la valeur
/// conventionnelle est ALL32POTW : l'extérieur compte comme blanc.
#[inline]
fn get_word(
    arena: &WordArena,
    rows: &[Option<RowWords>],
    encl: &ScreenRect,
    mem0: i64,
    mem1: i64,
    m: i64,
    y: i64,
) -> u32 {
    if y < encl.y0 || y > encl.y1 {
        return ALL32POTW;
    }
    match rows[(y - encl.y0) as usize] {
        Some(hdl) if m >= mem0 && m <= mem1 => arena.words(hdl)[(m - mem0) as usize],
        _ => ALL32POTW,
    }
}

/// Écrit le mot (m, y). Contrairement à la lecture, une écriture hors de la
/// grille allouée trahit une erreur de traduction de coordonnées : fatale.
#[inline]
fn set_word(
    arena: &mut WordArena,
    rows: &[Option<RowWords>],
    encl: &ScreenRect,
    mem0: i64,
    mem1: i64,
    m: i64,
    y: i64,
    value: u32,
) -> Result<(), PredictorError> {
    if m < mem0 || m > mem1 || y < encl.y0 || y > encl.y1 {
        return Err(PredictorError::GridBounds { m, y });
    }
    match rows[(y - encl.y0) as usize] {
        Some(hdl) => {
            arena.words_mut(hdl)[(m - mem0) as usize] = value;
            Ok(())
        }
        None => Err(PredictorError::GridBounds { m, y }),
    }
}

/// Couleur de la cellule (x, y) en pixels absolus : vrai si POTW. Toute
/// cellule hors de l'enveloppe est POTW par convention.
#[inline]
fn cell_is_potw(
    arena: &WordArena,
    rows: &[Option<RowWords>],
    encl: &ScreenRect,
    mem0: i64,
    mem1: i64,
    x: i64,
    y: i64,
) -> bool {
    if x < encl.x0 || x > encl.x1 || y < encl.y0 || y > encl.y1 {
        return true;
    }
    let w = get_word(arena, rows, encl, mem0, mem1, x >> SHIFT_PER_WORD, y);
    (w >> (x & 31)) & 1 == 1
}

/// Pour un cycle attractif, cherche le plus petit niveau de raffinement de
/// [level0, level1] auquel une cellule d'un voisinage du cycle est prouvée
/// piégée, par itération au point fixe de la propagation « potentiellement
/// blanc ».
///
/// Le marqueur ne va que dans un sens (GRIS → POTW) et la grille est finie,
/// donc la boucle termine ; en pratique quelques passes suffisent. Toute
/// cellule encore grise après le point fixe certifie qu'à ce niveau le
/// moteur complet fera apparaître de l'intérieur.
///
/// Retourne le niveau détecté, ou 0 si aucun niveau de la plage ne produit
/// de cellule piégée. `root.interior_found` et `root.basin_rect` sont mis à
/// jour en chemin.
pub fn predict_interior_level(
    family: &Family,
    cfg: &Config,
    complete1: f64,
    root: &mut Root,
    log: &mut RunLog,
) -> Result<u32, PredictorError> {
    let complete0 = -complete1;
    let complete_rect = PlaneRect {
        x0: complete0,
        x1: complete1,
        y0: complete0,
        y1: complete1,
    };
    let start_word = cfg.start_mode.start_word();
    let mut arena = WordArena::new();
    let mut found = 0u32;

    'levels: for level in cfg.level0..=cfg.level1 {
        log.console(&format!("\nchecking level {level} "));
        let width: i64 = 1i64 << level;
        let maxmem: i64 = width >> SHIFT_PER_WORD;
        let h = (complete1 - complete0) / width as f64;
        let px_per_range = width as f64 / (complete1 - complete0);
        let to_screen = |a: f64| ((a - complete0) * px_per_range).floor() as i64;

        // Enveloppes par point périodique, puis leur rectangle englobant.
        let mut encl = ScreenRect { x0: width, x1: 0, y0: width, y1: 0 };
        for pt in root.cycle.iter_mut() {
            let xx = to_screen(pt.pp.re);
            let yy = to_screen(pt.pp.im);
            let sx0 = (xx - cfg.enclosure_width).clamp(0, width - 1);
            let sx1 = (xx + cfg.enclosure_width).clamp(0, width - 1);
            let sy0 = (yy - cfg.enclosure_width).clamp(0, width - 1);
            let sy1 = (yy + cfg.enclosure_width).clamp(0, width - 1);
            encl.x0 = encl.x0.min(sx0);
            encl.x1 = encl.x1.max(sx1);
            encl.y0 = encl.y0.min(sy0);
            encl.y1 = encl.y1.max(sy1);
            pt.mem0 = sx0 >> SHIFT_PER_WORD;
            pt.mem1 = sx1 >> SHIFT_PER_WORD;
            if pt.mem1 >= maxmem {
                return Err(PredictorError::MemOverflow { mem: pt.mem1, maxmem });
            }
            pt.y0 = sy0;
            pt.y1 = sy1;
        }
        let mem0 = encl.x0 >> SHIFT_PER_WORD;
        let mem1 = encl.x1 >> SHIFT_PER_WORD;
        if mem1 >= maxmem {
            return Err(PredictorError::MemOverflow { mem: mem1, maxmem });
        }

        // L'enveloppe en coordonnées du plan, bords hauts élargis d'une
        // cellule : c'est le test de confinement de la propagation.
        let local = PlaneRect {
            x0: encl.x0 as f64 * h + complete0,
            x1: (encl.x1 + 1) as f64 * h + complete0,
            y0: encl.y0 as f64 * h + complete0,
            y1: (encl.y1 + 1) as f64 * h + complete0,
        };
        root.basin_rect = local;

        let len_y = (encl.y1 - encl.y0 + 1) as usize;
        let len_x = (mem1 - mem0 + 1) as usize;

        // Seules les lignes traversées par une enveloppe de point
        // périodique reçoivent de la mémoire.
        let mut row_has_gray = vec![false; len_y];
        for pt in &root.cycle {
            for y in pt.y0..=pt.y1 {
                row_has_gray[(y - encl.y0) as usize] = true;
            }
        }

        if level == cfg.level0 {
            log.console("allocating ");
        }
        arena.free_all();
        let mut rows: Vec<Option<RowWords>> = Vec::with_capacity(len_y);
        for &flagged in &row_has_gray {
            if flagged {
                let hdl = arena.alloc(len_x)?;
                arena.words_mut(hdl).fill(start_word);
                rows.push(Some(hdl));
            } else {
                rows.push(None);
            }
        }

        // Les boîtes autour des points périodiques démarrent grises
        // (granularité d'un mot entier sur l'axe x).
        for k in 0..root.cycle.len() {
            let (m0k, m1k, y0k, y1k) = {
                let pt = &root.cycle[k];
                (pt.mem0, pt.mem1, pt.y0, pt.y1)
            };
            for y in y0k..=y1k {
                for m in m0k..=m1k {
                    set_word(&mut arena, &rows, &encl, mem0, mem1, m, y, ALL32GRAY)?;
                }
            }
        }

        if level == cfg.level0 {
            log.console(" analyzing ");
        } else {
            log.console(" ");
        }

        let tick0 = (256 * (24 - level as i64)).max(1);
        let mut tick = 1i64;
        let mut changed = true;
        while changed {
            changed = false;
            tick -= 1;
            if tick <= 0 {
                log.dot();
                tick = tick0;
            }

            for y in encl.y0..=encl.y1 {
                let yi = (y - encl.y0) as usize;
                if !row_has_gray[yi] {
                    continue;
                }
                let mut gray_there = false;
                let ay0 = y as f64 * h + complete0;
                let ay1 = ay0 + h;

                for m in mem0..=mem1 {
                    let ff = get_word(&arena, &rows, &encl, mem0, mem1, m, y);
                    if ff == ALL32POTW {
                        continue;
                    }
                    let mut fnew = ff;
                    let mut fchanged = false;
                    let x_base = m << SHIFT_PER_WORD;
                    let mut bits = ff;

                    for bit in 0..32u32 {
                        let potw = bits & 1 == 1;
                        bits >>= 1;
                        if potw {
                            continue;
                        }
                        gray_there = true;

                        let ax0 = (x_base + bit as i64) as f64 * h + complete0;
                        let cell = PlaneRect { x0: ax0, x1: ax0 + h, y0: ay0, y1: ay1 };
                        let bbx = family.bbox(&cell);

                        // Sort du voisinage ou du carré de sûreté (un
                        // résultat non fini échoue aussi ici) : POTW.
                        if !local.encloses(&bbx) || !complete_rect.encloses(&bbx) {
                            fnew |= 1u32 << bit;
                            fchanged = true;
                            continue;
                        }

                        let s = ScreenRect {
                            x0: to_screen(bbx.x0),
                            x1: to_screen(bbx.x1),
                            y0: to_screen(bbx.y0),
                            y1: to_screen(bbx.y1),
                        };
                        let mut hits_potw = false;
                        'scan: for by in s.y0..=s.y1 {
                            for bx in s.x0..=s.x1 {
                                if cell_is_potw(&arena, &rows, &encl, mem0, mem1, bx, by) {
                                    hits_potw = true;
                                    break 'scan;
                                }
                            }
                        }
                        if hits_potw {
                            fnew |= 1u32 << bit;
                            fchanged = true;
                        }
                    }

                    if fchanged {
                        changed = true;
                        set_word(&mut arena, &rows, &encl, mem0, mem1, m, y, fnew)?;
                    }
                }

                if !gray_there {
                    row_has_gray[yi] = false;
                }
            }
        }

        // Toute cellule restée grise est un certificat de cellule piégée.
        let mut interior = false;
        'sweep: for hdl in rows.iter().flatten() {
            for &w in arena.words(*hdl) {
                if w != ALL32POTW {
                    interior = true;
                    break 'sweep;
                }
            }
        }

        if let Some(prefix) = &cfg.dump_grid {
            if interior || level == cfg.level1 {
                let path = PathBuf::from(format!(
                    "{}_cycle{}_level{}.png",
                    prefix.display(),
                    root.cycle_number,
                    level
                ));
                if let Err(e) = save_grid_png(&path, &arena, &rows, len_x) {
                    log.line(&format!("  (grid snapshot failed: {e})"));
                }
            }
        }

        if interior {
            found = level;
            break 'levels;
        }
    }

    arena.free_all();
    root.interior_found = found;
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fractal::newton::find_critical_points;
    use crate::fractal::orbits::classify_critical_orbits;
    use crate::fractal::types::{FamilyKind, ParamInterval, StartMode};
    use num_complex::Complex64;

    fn test_log(tag: &str) -> RunLog {
        let path = std::env::temp_dir().join(format!(
            "tsapredictor-test-{}-{}.log",
            tag,
            std::process::id()
        ));
        RunLog::open(&path).unwrap()
    }

    fn config(level0: u32, level1: u32, encw: i64) -> Config {
        Config {
            family: FamilyKind::Z2C,
            c: ParamInterval::snap(-1.0, 0.0),
            a: ParamInterval::snap(0.0, 0.0),
            enclosure_width: encw,
            start_mode: StartMode::Neighborhood,
            level0,
            level1,
            periods: None,
            use_gmp: false,
            precision_bits: 256,
            dump_grid: None,
        }
    }

    fn attracting_root(family: &Family, lagrange: f64) -> Root {
        let cps = find_critical_points(family.poly(), lagrange).unwrap();
        let roots = classify_critical_orbits(family.poly(), &cps, lagrange);
        roots.into_iter().find(|r| r.has_cycle()).expect("cycle attractif attendu")
    }

    #[test]
    fn basilica_interior_is_detected_at_a_low_level() {
        // c = -1 : cycle super-attractif 0 ↔ -1, intérieur attendu au plus
        // tard au niveau 10.
        let cfg = config(8, 10, 16);
        let family = Family::new(cfg.family, cfg.c, cfg.a);
        let lagrange = family.poly().lagrange_radius();
        let mut root = attracting_root(&family, lagrange);
        let mut log = test_log("basilica");
        let found = predict_interior_level(&family, &cfg, lagrange, &mut root, &mut log).unwrap();
        assert!((8..=10).contains(&found), "niveau détecté {found}");
        assert_eq!(root.interior_found, found);
        // Le rectangle analysé reste dans le carré de Lagrange.
        let complete = PlaneRect { x0: -lagrange, x1: lagrange, y0: -lagrange, y1: lagrange };
        assert!(complete.encloses(&root.basin_rect));
    }

    #[test]
    fn superattracting_fixed_point_is_detected() {
        // c = 0 : point fixe super-attractif en 0.
        let mut cfg = config(8, 10, 16);
        cfg.c = ParamInterval::snap(0.0, 0.0);
        let family = Family::new(cfg.family, cfg.c, cfg.a);
        let lagrange = family.poly().lagrange_radius();
        let mut root = attracting_root(&family, lagrange);
        let mut log = test_log("disc");
        let found = predict_interior_level(&family, &cfg, lagrange, &mut root, &mut log).unwrap();
        assert!((8..=10).contains(&found), "niveau détecté {found}");
    }

    #[test]
    fn single_level_run_matches_multi_level_result() {
        // Relancer uniquement au niveau détecté doit redonner ce niveau.
        let cfg = config(8, 10, 16);
        let family = Family::new(cfg.family, cfg.c, cfg.a);
        let lagrange = family.poly().lagrange_radius();
        let mut root = attracting_root(&family, lagrange);
        let mut log = test_log("idem");
        let found = predict_interior_level(&family, &cfg, lagrange, &mut root, &mut log).unwrap();
        assert!(found > 0);

        let cfg_single = config(found, found, 16);
        let mut root2 = attracting_root(&family, lagrange);
        let found2 =
            predict_interior_level(&family, &cfg_single, lagrange, &mut root2, &mut log).unwrap();
        assert_eq!(found2, found);
    }

    #[test]
    fn full_rect_start_mode_agrees_on_detection() {
        // Le mode « tout gris » examine plus de cellules mais ne peut pas
        // manquer un intérieur que le mode voisinage trouve.
        let mut cfg = config(8, 10, 16);
        cfg.start_mode = StartMode::FullRect;
        let family = Family::new(cfg.family, cfg.c, cfg.a);
        let lagrange = family.poly().lagrange_radius();
        let mut root = attracting_root(&family, lagrange);
        let mut log = test_log("fullrect");
        let found = predict_interior_level(&family, &cfg, lagrange, &mut root, &mut log).unwrap();
        assert!((8..=10).contains(&found), "niveau détecté {found}");
    }

    #[test]
    fn grid_accessors_follow_the_outside_is_potw_convention() {
        let mut arena = WordArena::with_chunk_words(64);
        let encl = ScreenRect { x0: 64, x1: 127, y0: 10, y1: 12 };
        let mem0 = 2i64;
        let mem1 = 3i64;
        // Ligne médiane non allouée.
        let r0 = arena.alloc(2).unwrap();
        let r2 = arena.alloc(2).unwrap();
        let rows = vec![Some(r0), None, Some(r2)];

        // Hors enveloppe : POTW.
        assert_eq!(get_word(&arena, &rows, &encl, mem0, mem1, 2, 9), ALL32POTW);
        assert_eq!(get_word(&arena, &rows, &encl, mem0, mem1, 1, 10), ALL32POTW);
        // Ligne non allouée : POTW en lecture, erreur en écriture.
        assert_eq!(get_word(&arena, &rows, &encl, mem0, mem1, 2, 11), ALL32POTW);
        assert!(set_word(&mut arena, &rows, &encl, mem0, mem1, 2, 11, 0).is_err());
        assert!(set_word(&mut arena, &rows, &encl, mem0, mem1, 4, 10, 0).is_err());

        // Écriture puis relecture bit à bit.
        set_word(&mut arena, &rows, &encl, mem0, mem1, 2, 10, 0b101).unwrap();
        assert!(cell_is_potw(&arena, &rows, &encl, mem0, mem1, 64, 10));
        assert!(!cell_is_potw(&arena, &rows, &encl, mem0, mem1, 65, 10));
        assert!(cell_is_potw(&arena, &rows, &encl, mem0, mem1, 66, 10));
        // Hors de l'enveloppe en x : POTW même si le mot existerait.
        assert!(cell_is_potw(&arena, &rows, &encl, mem0, mem1, 63, 10));
    }

    #[test]
    fn no_interior_reported_when_everything_whitens() {
        // Un « cycle » artificiel posé près du bord du carré de Lagrange :
        // toutes les cellules s'échappent et aucun niveau n'aboutit.
        let cfg = config(8, 8, 4);
        let family = Family::new(cfg.family, cfg.c, cfg.a);
        let lagrange = family.poly().lagrange_radius();
        let mut root = attracting_root(&family, lagrange);
        // Déplace les points du cycle dans la zone fuyante près du bord.
        for pt in root.cycle.iter_mut() {
            pt.pp = Complex64::new(lagrange * 0.9, lagrange * 0.9);
        }
        let mut log = test_log("nointerior");
        let found = predict_interior_level(&family, &cfg, lagrange, &mut root, &mut log).unwrap();
        assert_eq!(found, 0);
        assert_eq!(root.interior_found, 0);
    }
}
