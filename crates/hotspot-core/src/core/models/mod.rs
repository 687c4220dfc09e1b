//! In-memory representation of a protein structure.
//!
//! - [`atom`] - atoms with coordinates and a backbone/side-chain/hetero role
//! - [`residue`] - residues, their source numbering and the canonical amino acids
//! - [`chain`] - ordered residue lists per chain identifier
//! - [`system`] - the owning [`system::MolecularSystem`] with pose-index access
//!   and residue mutation
//! - [`mutation`] - point substitutions labelled by source numbering
//! - [`ids`] - slot-map handles for atoms, residues and chains

pub mod atom;
pub mod chain;
pub mod ids;
pub mod mutation;
pub mod residue;
pub mod system;
