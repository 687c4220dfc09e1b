//! The design engine: configuration, the capability traits the design loop
//! is written against, and the built-in implementations of them.
//!
//! - [`config`] - validated run configuration and its builder
//! - [`capabilities`] - `ScoreFunction`, `SequencePacker` and `Mover`
//! - [`selection`] and [`task`] - residue selectors and the task factory
//!   deciding which residues may be designed, repacked or neither
//! - [`packer`], [`minimizer`], [`monte_carlo`] - the built-in engine
//! - [`mutations`] - sequence diffs between structures
//! - [`jobs`] - decoy naming, resumption and output
//! - [`progress`] and [`error`]

pub mod capabilities;
pub mod config;
pub mod error;
pub mod jobs;
pub mod minimizer;
pub mod monte_carlo;
pub mod mutations;
pub mod packer;
pub mod progress;
pub mod selection;
pub mod task;
pub(crate) mod utils;
