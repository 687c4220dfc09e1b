//! Stateless building blocks: the structure model, file I/O, geometry
//! helpers and scoring.

pub mod io;
pub mod models;
pub mod scoring;
pub mod utils;
