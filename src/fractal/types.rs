use std::path::PathBuf;

/// Dénominateur du réseau dyadique 2^25 sur lequel les paramètres utilisateur
/// sont projetés (floor). Garantit une représentation exacte en f64 et des
/// empreintes reproductibles d'une exécution à l'autre.
pub const DENOM225: f64 = (1i64 << 25) as f64;

/// Nombre maximal de racines (points critiques) retenues.
pub const MAXZEROS: usize = 1024;

/// log2 du nombre de cellules par mot : 32 cellules par mot de 32 bits.
pub const SHIFT_PER_WORD: i64 = 5;

/// Mot entièrement « potentiellement blanc » (tous les bits à 1).
pub const ALL32POTW: u32 = 0xffff_ffff;
/// Mot entièrement gris (tous les bits à 0).
pub const ALL32GRAY: u32 = 0;

/// Deux points d'orbite sont considérés identiques si leur distance au carré
/// est inférieure à cette valeur.
pub const ZEROEPSILON: f64 = 1e-15;
/// Un coefficient est considéré nul si son module au carré est inférieur
/// à cette valeur.
pub const COEFFZEROLIMIT: f64 = 1e-40;
/// Degré maximal pour `Polynomial`.
pub const MAXDEGREE: usize = 32;

/// Plafond d'itérations partagé : Newton, orbites critiques.
pub const MAXIT: usize = 25_000;

/// Marge au-dessus de 1 pour classer un multiplicateur comme répulsif.
pub const REPELLING_LIMIT: f64 = 1.00001;

/// Étiquette du type numérique utilisé par la grille (f64).
pub const NUMERIC_TAG: &str = "d";

/// Rectangle aligné sur les axes dans le plan complexe. Représente un point
/// à valeur d'intervalle : [x0, x1] × [y0, y1] avec x0 ≤ x1 et y0 ≤ y1.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlaneRect {
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
}

impl PlaneRect {
    /// Vrai si `other` est entièrement contenu dans `self`.
    ///
    /// Les comparaisons avec NaN échouent, donc un rectangle non fini n'est
    /// jamais considéré comme contenu.
    #[inline]
    pub fn encloses(&self, other: &PlaneRect) -> bool {
        self.x0 <= other.x0
            && other.x1 <= self.x1
            && self.y0 <= other.y0
            && other.y1 <= self.y1
    }

    /// Vrai si les deux rectangles se chevauchent (intersection non vide).
    #[inline]
    pub fn overlaps(&self, other: &PlaneRect) -> bool {
        !(self.x1 < other.x0
            || self.x0 > other.x1
            || self.y1 < other.y0
            || self.y0 > other.y1)
    }
}

/// Rectangle entier en coordonnées écran (pixels), bornes incluses.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScreenRect {
    pub x0: i64,
    pub x1: i64,
    pub y0: i64,
    pub y1: i64,
}

/// Paramètre complexe à valeur d'intervalle : bornes inférieure et supérieure
/// indépendantes pour les parties réelle et imaginaire. Les deux paramètres
/// utilisateur C et A sont stockés sous cette forme, semés depuis des
/// scalaires projetés sur le réseau 2^-25 (bornes dégénérées re0 == re1).
#[derive(Clone, Copy, Debug, Default)]
pub struct ParamInterval {
    pub re0: f64,
    pub re1: f64,
    pub im0: f64,
    pub im1: f64,
}

impl ParamInterval {
    /// Projette un scalaire (re, im) sur le réseau de dénominateur 2^25 par
    /// floor, et sème les deux bornes avec la valeur projetée.
    pub fn snap(re: f64, im: f64) -> Self {
        let r = (re * DENOM225).floor() / DENOM225;
        let i = (im * DENOM225).floor() / DENOM225;
        ParamInterval {
            re0: r,
            re1: r,
            im0: i,
            im1: i,
        }
    }

    /// Empreinte entière exacte sur le réseau 2^25, pour le journal :
    /// les quatre numérateurs re0, re1, im0, im1.
    pub fn fingerprint(&self, prefix: &str) -> String {
        format!(
            "{}_{}_{}_x_{}_{}",
            prefix,
            (self.re0 * DENOM225).floor() as i64,
            (self.re1 * DENOM225).floor() as i64,
            (self.im0 * DENOM225).floor() as i64,
            (self.im1 * DENOM225).floor() as i64
        )
    }
}

/// Famille fermée de polynômes z^k + A·z + C (Z2C omet A ; Z5CZA échange
/// les rôles de C et A : z^5 + C·z + A).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FamilyKind {
    Z2C,
    Z2AZC,
    Z3AZC,
    Z4AZC,
    Z5AZC,
    Z6AZC,
    Z5CZA,
}

impl FamilyKind {
    /// Analyse un nom de famille insensible à la casse.
    pub fn from_cli_name(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "z2c" => Some(FamilyKind::Z2C),
            "z2azc" => Some(FamilyKind::Z2AZC),
            "z3azc" => Some(FamilyKind::Z3AZC),
            "z4azc" => Some(FamilyKind::Z4AZC),
            "z5azc" => Some(FamilyKind::Z5AZC),
            "z6azc" => Some(FamilyKind::Z6AZC),
            "z5cza" => Some(FamilyKind::Z5CZA),
            _ => None,
        }
    }

    #[allow(dead_code)]
    pub fn name(self) -> &'static str {
        match self {
            FamilyKind::Z2C => "Z2C",
            FamilyKind::Z2AZC => "Z2AZC",
            FamilyKind::Z3AZC => "Z3AZC",
            FamilyKind::Z4AZC => "Z4AZC",
            FamilyKind::Z5AZC => "Z5AZC",
            FamilyKind::Z6AZC => "Z6AZC",
            FamilyKind::Z5CZA => "Z5CZA",
        }
    }

    /// Nom en minuscules pour la ligne de commande reconstruite du
    /// moteur de rendu aval.
    pub fn cli_name(self) -> &'static str {
        match self {
            FamilyKind::Z2C => "z2c",
            FamilyKind::Z2AZC => "z2azc",
            FamilyKind::Z3AZC => "z3azc",
            FamilyKind::Z4AZC => "z4azc",
            FamilyKind::Z5AZC => "z5azc",
            FamilyKind::Z6AZC => "z6azc",
            FamilyKind::Z5CZA => "z5cza",
        }
    }
}

/// Valeur initiale des cellules allouées avant le marquage gris des boîtes
/// autour des points périodiques.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartMode {
    /// Seuls les petits voisinages autour des points périodiques sont
    /// examinés : tout le reste démarre POTW.
    Neighborhood,
    /// Tout le rectangle englobant démarre gris et est analysé.
    FullRect,
}

impl StartMode {
    #[inline]
    pub fn start_word(self) -> u32 {
        match self {
            StartMode::Neighborhood => ALL32POTW,
            StartMode::FullRect => ALL32GRAY,
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            StartMode::Neighborhood => {
                "  per cycle: analyzing small neighbourhoods around periodic points"
            }
            StartMode::FullRect => {
                "  per cycle: analyzing whole rectangle around all periodic points"
            }
        }
    }
}

/// Configuration immuable d'une exécution, construite une fois par le
/// pilote et passée en lecture seule à travers tout le pipeline.
#[derive(Clone, Debug)]
pub struct Config {
    pub family: FamilyKind,
    pub c: ParamInterval,
    pub a: ParamInterval,
    /// Demi-côté en pixels de la boîte autour de chaque point périodique.
    pub enclosure_width: i64,
    pub start_mode: StartMode,
    /// Plage de raffinement analysée, bornes incluses, déjà serrée à [8, 31].
    pub level0: u32,
    pub level1: u32,
    /// Si présent, seuls les cycles de longueur dans [a, b] sont analysés.
    pub periods: Option<(usize, usize)>,
    /// Polissage haute précision (MPC) des points critiques.
    pub use_gmp: bool,
    pub precision_bits: u32,
    /// Préfixe de fichier pour l'export PNG de la grille finale par cycle.
    pub dump_grid: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snap_exact_lattice_values() {
        // -1 et 0 sont déjà sur le réseau : la projection est l'identité.
        let p = ParamInterval::snap(-1.0, 0.0);
        assert_eq!(p.re0, -1.0);
        assert_eq!(p.re1, -1.0);
        assert_eq!(p.im0, 0.0);
        // 0.25 également (dénominateur 4 divise 2^25).
        let q = ParamInterval::snap(0.25, 0.0);
        assert_eq!(q.re0, 0.25);
    }

    #[test]
    fn snap_floors_towards_minus_infinity() {
        let p = ParamInterval::snap(0.1, -0.1);
        assert!(p.re0 <= 0.1);
        assert!(0.1 - p.re0 < 1.0 / DENOM225);
        // floor, pas troncature : la partie imaginaire négative descend.
        assert!(p.im0 <= -0.1);
        // Le résultat est exactement représentable sur le réseau.
        assert_eq!((p.re0 * DENOM225).fract(), 0.0);
        assert_eq!((p.im0 * DENOM225).fract(), 0.0);
    }

    #[test]
    fn plane_rect_encloses() {
        let outer = PlaneRect { x0: -2.0, x1: 2.0, y0: -2.0, y1: 2.0 };
        let inner = PlaneRect { x0: -1.0, x1: 1.0, y0: 0.0, y1: 0.5 };
        assert!(outer.encloses(&inner));
        assert!(!inner.encloses(&outer));
        // Un rectangle non fini n'est jamais contenu.
        let bad = PlaneRect { x0: f64::NAN, x1: 0.0, y0: 0.0, y1: 0.0 };
        assert!(!outer.encloses(&bad));
    }

    #[test]
    fn plane_rect_overlap() {
        let a = PlaneRect { x0: 0.0, x1: 1.0, y0: 0.0, y1: 1.0 };
        let b = PlaneRect { x0: 0.5, x1: 2.0, y0: 0.5, y1: 2.0 };
        let c = PlaneRect { x0: 3.0, x1: 4.0, y0: 0.0, y1: 1.0 };
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn family_names_round_trip() {
        for kind in [
            FamilyKind::Z2C,
            FamilyKind::Z2AZC,
            FamilyKind::Z3AZC,
            FamilyKind::Z4AZC,
            FamilyKind::Z5AZC,
            FamilyKind::Z6AZC,
            FamilyKind::Z5CZA,
        ] {
            assert_eq!(FamilyKind::from_cli_name(kind.name()), Some(kind));
            assert_eq!(FamilyKind::from_cli_name(kind.cli_name()), Some(kind));
        }
        assert_eq!(FamilyKind::from_cli_name("z7azc"), None);
    }
}
