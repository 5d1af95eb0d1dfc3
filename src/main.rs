use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use num_complex::Complex64;

mod error;
mod fractal;
mod grid;
mod io;

use error::PredictorError;
use fractal::newton::find_critical_points;
use fractal::types::NUMERIC_TAG;
use fractal::{classify_critical_orbits, Config, Family, FamilyKind, ParamInterval, Root, StartMode};
use grid::predict_interior_level;
use io::log::RunLog;

/// Prédicteur du niveau de raffinement auquel le moteur de cell mapping
/// complet fera apparaître des cellules intérieures certifiées pour un
/// ensemble de Julia rempli.
///
/// Exemple :
///   tsapredictor --func z2c --c -1,0 --level 10,24
#[derive(Parser, Debug)]
#[command(
    name = "tsapredictor",
    about = "Prédit le niveau de raffinement auquel des cellules intérieures certifiées apparaissent (cell mapping / arithmétique d'intervalles)",
    version
)]
struct Cli {
    /// Famille de polynômes : z2c, z2azc, z3azc, z4azc, z5azc, z6azc, z5cza
    #[arg(long, default_value = "z2c")]
    func: String,

    /// Paramètre C au format re,im (projeté sur le réseau 2^-25)
    #[arg(long, default_value = "-1,0", allow_hyphen_values = true)]
    c: String,

    /// Paramètre A au format re,im (ignoré par z2c), même projection
    #[arg(long, default_value = "0,0", allow_hyphen_values = true)]
    a: String,

    /// Demi-côté en pixels des boîtes par point périodique ; une valeur
    /// négative bascule en mode « tout gris » (valeur absolue utilisée)
    #[arg(long, default_value_t = 128, allow_hyphen_values = true)]
    encw: i64,

    /// Plage de raffinement a,b ; serrée à [8, 31]
    #[arg(long, default_value = "10,24")]
    level: String,

    /// Si présent, seuls les cycles de longueur dans a,b sont analysés
    #[arg(long)]
    periods: Option<String>,

    /// Polit les points critiques en précision MPC avant la classification
    #[arg(long)]
    gmp: bool,

    /// Précision MPC en bits
    #[arg(long, default_value_t = 256)]
    precision_bits: u32,

    /// Préfixe pour l'export PNG de la grille finale de chaque cycle
    #[arg(long)]
    dump_grid: Option<PathBuf>,

    /// Fichier journal (mode append)
    #[arg(long, default_value = "tsapredictor.log")]
    log_file: PathBuf,
}

fn parse_pair(s: &str) -> Option<(f64, f64)> {
    let (a, b) = s.split_once(',')?;
    Some((a.trim().parse().ok()?, b.trim().parse().ok()?))
}

fn parse_int_pair(s: &str) -> Option<(i64, i64)> {
    let (a, b) = s.split_once(',')?;
    Some((a.trim().parse().ok()?, b.trim().parse().ok()?))
}

fn build_config(cli: &Cli) -> Result<Config, String> {
    let family = FamilyKind::from_cli_name(&cli.func)
        .ok_or_else(|| format!("famille inconnue: {}", cli.func))?;
    let (cre, cim) =
        parse_pair(&cli.c).ok_or_else(|| format!("paramètre C illisible: {}", cli.c))?;
    let (are, aim) =
        parse_pair(&cli.a).ok_or_else(|| format!("paramètre A illisible: {}", cli.a))?;
    let (l0, l1) =
        parse_int_pair(&cli.level).ok_or_else(|| format!("plage LEVEL illisible: {}", cli.level))?;

    let (enclosure_width, start_mode) = if cli.encw < 0 {
        (-cli.encw, StartMode::FullRect)
    } else {
        (cli.encw, StartMode::Neighborhood)
    };

    // Comme pour le moteur complet : un minorant non positif désactive le
    // filtre de périodes.
    let periods = match &cli.periods {
        None => None,
        Some(s) => {
            let (p0, p1) =
                parse_int_pair(s).ok_or_else(|| format!("plage PERIODS illisible: {s}"))?;
            if p0 > 0 && p1 >= p0 {
                Some((p0 as usize, p1 as usize))
            } else {
                None
            }
        }
    };

    Ok(Config {
        family,
        c: ParamInterval::snap(cre, cim),
        a: ParamInterval::snap(are, aim),
        enclosure_width,
        start_mode,
        level0: l0.clamp(8, 31) as u32,
        level1: l1.clamp(8, 31) as u32,
        periods,
        use_gmp: cli.gmp,
        precision_bits: cli.precision_bits,
        dump_grid: cli.dump_grid.clone(),
    })
}

fn cplx_str(z: Complex64) -> String {
    format!("{}{:+}i", z.re, z.im)
}

fn run(cfg: &Config, log: &mut RunLog) -> Result<(), PredictorError> {
    let started = Instant::now();

    let family = Family::new(cfg.family, cfg.c, cfg.a);
    log.line(&format!("{}", family.poly()));
    log.line(&format!("ENCW={} pixels", cfg.enclosure_width));
    log.line(cfg.start_mode.describe());

    let lagrange = family.poly().lagrange_radius();
    log.line(&format!(
        "Filled-in set is contained in {:.0}-square",
        lagrange
    ));
    log.line(&format!("numerical type: {}", NUMERIC_TAG));
    log.line(&format!(
        "parameter lattice: {} {}",
        cfg.c.fingerprint("c_ia"),
        cfg.a.fingerprint("A")
    ));

    let mut critical = find_critical_points(family.poly(), lagrange)?;
    if cfg.use_gmp {
        log.line(&format!(
            "polishing {} critical points at {} bits",
            critical.len(),
            cfg.precision_bits
        ));
        critical = fractal::gmp::polish_critical_points(family.poly(), &critical, cfg.precision_bits);
    }
    for z in &critical {
        log.put("critical point: ");
        log.line(&cplx_str(*z));
    }
    log.line("");

    let mut roots = classify_critical_orbits(family.poly(), &critical, lagrange);
    if !roots.iter().any(Root::has_cycle) {
        return Err(PredictorError::NoBoundedOrbit);
    }

    // Plusieurs points critiques peuvent tomber dans le même cycle ; seul
    // le premier le porte.
    for r in roots.iter().filter(|r| r.has_cycle()) {
        log.put(&format!(
            "cycle #{} |multiplier|={:.5} len={}: ",
            r.cycle_number,
            r.multiplier,
            r.cycle.len()
        ));
        for p in &r.cycle {
            log.put(&cplx_str(p.pp));
            log.put(" -> ");
        }
        let reenter = family.poly().eval(r.cycle[r.cycle.len() - 1].pp);
        log.line(&format!("(reentering {})", cplx_str(reenter)));
    }

    for r in roots.iter_mut().filter(|r| r.has_cycle()) {
        if let Some((p0, p1)) = cfg.periods {
            if r.cycle.len() < p0 || r.cycle.len() > p1 {
                continue;
            }
        }

        log.line(&format!(
            "\nanalyzing cycle #{} (period {}) ...",
            r.cycle_number,
            r.cycle.len()
        ));
        let found = predict_interior_level(&family, cfg, lagrange, r, log)?;

        if found > 0 {
            log.line(&format!("\n  black present at refinement level {found}"));
            log.line("  computing this and at latest here emerging cycles from scratch in command-line:");
            log.line(&format!(
                "    juliatsacore_{} range={:.0} len={} {}",
                NUMERIC_TAG,
                lagrange.ceil(),
                found,
                family.core_command_line()
            ));
            if found > 12 {
                log.line("  (but level-by-level computation using already calculated data is recommended for speed reasons)");
            }
        } else {
            log.line(&format!(
                "\n  NO black found in levels {}..{} at current parameters",
                cfg.level0, cfg.level1
            ));
        }
    }

    // Si les rectangles analysés de deux cycles se chevauchent, un
    // intérieur détecté pour l'un peut en réalité appartenir à l'autre.
    let analyzed: Vec<&Root> = roots
        .iter()
        .filter(|r| r.has_cycle() && r.interior_found > 0)
        .collect();
    let overlapping = analyzed.iter().enumerate().any(|(i, a)| {
        analyzed
            .iter()
            .skip(i + 1)
            .any(|b| a.basin_rect.overlaps(&b.basin_rect))
    });
    if overlapping {
        log.line("\n\n!!!!! CAVE !!!!!\n  Enclosements of periodic points of different cycles overlap.");
        log.line("  Black when detected for a specific cycle might have actually detected a different one.");
    }

    log.line(&format!(
        "{:.0} sec duration",
        started.elapsed().as_secs_f64()
    ));
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let cfg = match build_config(&cli) {
        Ok(cfg) => cfg,
        Err(msg) => {
            eprintln!("{msg}");
            std::process::exit(99);
        }
    };

    let mut log = match RunLog::open(&cli.log_file) {
        Ok(log) => log,
        Err(e) => {
            eprintln!("impossible d'ouvrir le journal {}: {e}", cli.log_file.display());
            std::process::exit(99);
        }
    };

    if let Err(e) = run(&cfg, &mut log) {
        log.line(&format!("{e}"));
        std::process::exit(99);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli_defaults() -> Cli {
        Cli {
            func: "z2c".into(),
            c: "-1,0".into(),
            a: "0,0".into(),
            encw: 128,
            level: "10,24".into(),
            periods: None,
            gmp: false,
            precision_bits: 256,
            dump_grid: None,
            log_file: PathBuf::from("tsapredictor.log"),
        }
    }

    #[test]
    fn pair_parsing() {
        assert_eq!(parse_pair("-1,0"), Some((-1.0, 0.0)));
        assert_eq!(parse_pair(" 0.25 , -0.5 "), Some((0.25, -0.5)));
        assert_eq!(parse_pair("1"), None);
        assert_eq!(parse_pair("a,b"), None);
        assert_eq!(parse_int_pair("10,24"), Some((10, 24)));
    }

    #[test]
    fn config_snaps_and_clamps() {
        let mut cli = cli_defaults();
        cli.level = "2,99".into();
        let cfg = build_config(&cli).unwrap();
        assert_eq!(cfg.level0, 8);
        assert_eq!(cfg.level1, 31);
        assert_eq!(cfg.c.re0, -1.0);
        assert_eq!(cfg.start_mode, StartMode::Neighborhood);
    }

    #[test]
    fn negative_encw_switches_start_mode() {
        let mut cli = cli_defaults();
        cli.encw = -64;
        let cfg = build_config(&cli).unwrap();
        assert_eq!(cfg.enclosure_width, 64);
        assert_eq!(cfg.start_mode, StartMode::FullRect);
    }

    #[test]
    fn unknown_family_is_rejected() {
        let mut cli = cli_defaults();
        cli.func = "z9c".into();
        assert!(build_config(&cli).is_err());
    }

    #[test]
    fn non_positive_periods_disable_the_filter() {
        let mut cli = cli_defaults();
        cli.periods = Some("3,3".into());
        assert_eq!(build_config(&cli).unwrap().periods, Some((3, 3)));
        cli.periods = Some("-1,-1".into());
        assert_eq!(build_config(&cli).unwrap().periods, None);
    }
}
