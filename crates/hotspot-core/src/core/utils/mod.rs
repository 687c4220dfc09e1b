//! Small, stateless helpers shared by the core layer: atom/residue name
//! classification and backbone geometry.

pub mod geometry;
pub mod identifiers;
