//! Seams between the design loop and the engine that drives it.
//!
//! The loop only sees these traits, so any scorer, packer or refinement mover
//! can be swapped in, including scripted fakes in tests.

use super::error::EngineError;
use super::task::PackerTask;
use crate::core::models::system::MolecularSystem;
use crate::core::scoring::contact::ContactScorer;
use crate::core::scoring::term::EnergyTerm;

pub trait ScoreFunction {
    fn score(&self, system: &MolecularSystem) -> Result<EnergyTerm, EngineError>;
}

/// Summary of one packing pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PackOutcome {
    /// Residues whose identity the packer was allowed to change.
    pub designable: usize,
    /// Residues whose identity actually changed.
    pub mutated: usize,
}

/// Chooses residue identities in place, honouring the per-residue
/// restrictions of a [`PackerTask`].
pub trait SequencePacker {
    fn pack(
        &mut self,
        system: &mut MolecularSystem,
        task: &PackerTask,
    ) -> Result<PackOutcome, EngineError>;
}

/// Transforms a structure in place.
pub trait Mover {
    fn apply(&mut self, system: &mut MolecularSystem) -> Result<(), EngineError>;
}

impl ScoreFunction for ContactScorer {
    fn score(&self, system: &MolecularSystem) -> Result<EnergyTerm, EngineError> {
        Ok(ContactScorer::score(self, system))
    }
}

impl<T: ScoreFunction + ?Sized> ScoreFunction for &T {
    fn score(&self, system: &MolecularSystem) -> Result<EnergyTerm, EngineError> {
        (**self).score(system)
    }
}
