use thiserror::Error;

use super::config::ConfigError;
use super::utils::sampling::SamplingError;
use crate::core::io::pdb::PdbError;
use crate::core::models::system::ModelError;
use std::path::PathBuf;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Residue index {index} is out of range (structure has {total} residues)")]
    ResidueIndexOutOfRange { index: usize, total: usize },

    #[error(
        "Cannot compare sequences of different length (reference {reference}, candidate {candidate})"
    )]
    SequenceMismatch { reference: usize, candidate: usize },

    #[error("Decoy '{decoy}' exhausted {attempts} attempts without producing a mutation")]
    AttemptsExhausted { decoy: String, attempts: usize },

    #[error("Failed to write decoy '{}': {source}", path.display())]
    JobOutput { path: PathBuf, source: PdbError },

    #[error("Failed to write score table '{}': {source}", path.display())]
    ScoreTable { path: PathBuf, source: csv::Error },

    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Structure edit failed: {0}")]
    Model(#[from] ModelError),

    #[error("Sequence sampling failed: {0}")]
    Sampling(#[from] SamplingError),

    #[error("Internal logic error: {0}")]
    Internal(String),
}

impl EngineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EngineError::Io {
            path: path.into(),
            source,
        }
    }
}
