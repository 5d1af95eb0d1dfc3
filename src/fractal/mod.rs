pub mod family;
pub mod gmp;
pub mod newton;
pub mod orbits;
pub mod polynomial;
pub mod types;

pub use family::Family;
pub use orbits::{classify_critical_orbits, Root};
pub use types::{Config, FamilyKind, ParamInterval, StartMode};
