use thiserror::Error;

/// Conditions fatales du prédicteur. Toutes conduisent au code de sortie 99
/// après écriture dans le journal ; les échecs locaux (Newton divergent,
/// orbite fuyante, cycle répulsif ou dupliqué) ne passent pas par ici.
#[derive(Debug, Error)]
pub enum PredictorError {
    #[error("no critical points found")]
    NoCriticalPoints,

    #[error("no attracting critical orbit found (does an attractor exist at all?)")]
    NoBoundedOrbit,

    #[error("too many distinct roots (limit {limit})")]
    TooManyRoots { limit: usize },

    #[error("bit-grid arena exhausted: {chunks} chunks in use")]
    OutOfChunks { chunks: usize },

    #[error("cell write outside the allocated grid (word {m}, row {y})")]
    GridBounds { m: i64, y: i64 },

    #[error("word index {mem} reaches past the screen width ({maxmem} words)")]
    MemOverflow { mem: i64, maxmem: i64 },
}
