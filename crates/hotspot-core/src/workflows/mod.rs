//! # Workflows Module
//!
//! End-to-end procedures built on the [`engine`](crate::engine) layer.
//!
//! - **Design** ([`design`]) - repeatedly redesigns the neighbourhood of a target residue,
//!   refines every attempt that changed the sequence and hands the result to a job tracker,
//!   logging mutations and shell radii along the way.
//! - **Visualization** ([`visualize`]) - writes a PyMOL script that aligns a directory of
//!   designs onto the reference and highlights each design's mutated residues.

pub mod design;
pub mod visualize;
