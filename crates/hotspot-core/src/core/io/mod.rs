//! Reading and writing structures and the plain-text run logs.
//!
//! Structures go through the [`traits::MolecularFile`] interface, implemented
//! here for PDB. The mutation and radius logs are append-only text files
//! written once per design attempt.

pub mod mutation_log;
pub mod pdb;
pub mod radius_log;
pub mod traits;
