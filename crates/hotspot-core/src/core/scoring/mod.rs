//! Scoring of structures.
//!
//! [`contact::ContactScorer`] combines a hydropathy/burial environment term
//! with a heavy-atom clash term built from the pure functions in
//! [`potentials`]. Results are reported as an [`term::EnergyTerm`].

pub mod contact;
pub mod potentials;
pub mod term;
