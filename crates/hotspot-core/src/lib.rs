//! # Hotspot Core Library
//!
//! Neighbourhood-driven protein redesign around a single target residue: pick a random design
//! shell, let a packer choose new identities inside it, refine the result, and keep a record of
//! every mutation so the designs can be inspected in PyMOL afterwards.
//!
//! ## Architecture
//!
//! - **[`core`]: The Foundation.** Data models (`MolecularSystem`, `Mutation`), PDB and log file
//!   I/O, and the contact-based scoring terms.
//!
//! - **[`engine`]: The Logic Core.** Residue selectors and packer tasks, the capability traits
//!   (`ScoreFunction`, `SequencePacker`, `Mover`, `JobTracker`) with their built-in
//!   implementations, configuration and progress reporting.
//!
//! - **[`workflows`]: The Public API.** The design loop and the visualization script generator.

pub mod core;
pub mod engine;
pub mod workflows;
