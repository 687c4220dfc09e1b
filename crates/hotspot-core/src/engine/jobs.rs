use super::error::EngineError;
use crate::core::io::pdb::PdbFile;
use crate::core::io::traits::MolecularFile;
use crate::core::models::mutation::Mutation;
use crate::core::models::system::MolecularSystem;
use crate::core::scoring::term::EnergyTerm;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Decides which decoy is produced next and persists finished decoys.
pub trait JobTracker {
    fn is_complete(&self) -> bool;

    /// File name of the decoy currently being produced.
    fn current_decoy_name(&self) -> Option<String>;

    /// Decoys still to be produced, including the current one.
    fn remaining(&self) -> usize;

    /// Persists the current decoy and advances to the next one.
    fn output_decoy(
        &mut self,
        system: &MolecularSystem,
        score: &EnergyTerm,
        mutations: &[Mutation],
    ) -> Result<PathBuf, EngineError>;
}

#[derive(Debug, Serialize)]
struct ScoreRow<'a> {
    decoy: &'a str,
    total_score: f64,
    environment: f64,
    clash: f64,
    mutations: String,
}

/// Writes `<prefix>_<i>.pdb` for `i` in `0..num_decoys` into one directory.
///
/// Runs are resumable: an index is skipped when its decoy already exists or
/// when another run holds its `<prefix>_<i>.in_progress` marker.
#[derive(Debug)]
pub struct JobDistributor {
    prefix: String,
    num_decoys: usize,
    output_dir: PathBuf,
    current: Option<usize>,
}

impl JobDistributor {
    pub fn new(
        prefix: impl Into<String>,
        num_decoys: usize,
        output_dir: impl Into<PathBuf>,
    ) -> Result<Self, EngineError> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir).map_err(|e| EngineError::io(&output_dir, e))?;
        let mut distributor = Self {
            prefix: prefix.into(),
            num_decoys,
            output_dir,
            current: None,
        };
        for index in distributor.held_markers() {
            warn!(
                decoy = %distributor.decoy_file_name(index),
                marker = %distributor.marker_path(index).display(),
                "Decoy is held by an in-progress marker and will be skipped"
            );
        }
        distributor.claim_next()?;
        if let Some(index) = distributor.current.filter(|&i| i > 0) {
            info!(index, "Resuming job distribution");
        }
        Ok(distributor)
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn decoy_file_name(&self, index: usize) -> String {
        format!("{}_{}.pdb", self.prefix, index)
    }

    fn marker_path(&self, index: usize) -> PathBuf {
        self.output_dir
            .join(format!("{}_{}.in_progress", self.prefix, index))
    }

    pub fn score_table_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.scores.csv", self.prefix))
    }

    /// Indices without a finished decoy whose marker exists, including the
    /// one this distributor holds. A marker left by a killed run stays here
    /// until it is deleted by hand.
    pub fn held_markers(&self) -> Vec<usize> {
        (0..self.num_decoys)
            .filter(|&i| {
                !self.output_dir.join(self.decoy_file_name(i)).exists()
                    && self.marker_path(i).exists()
            })
            .collect()
    }

    fn claim_next(&mut self) -> Result<(), EngineError> {
        self.current = (0..self.num_decoys).find(|&i| {
            !self.output_dir.join(self.decoy_file_name(i)).exists()
                && !self.marker_path(i).exists()
        });
        if let Some(index) = self.current {
            let marker = self.marker_path(index);
            fs::write(&marker, b"").map_err(|e| EngineError::io(&marker, e))?;
            debug!(decoy = %self.decoy_file_name(index), "Claimed job");
        }
        Ok(())
    }

    fn append_score_row(&self, row: &ScoreRow) -> Result<(), EngineError> {
        let path = self.score_table_path();
        let is_new = !path.exists();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| EngineError::io(&path, e))?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(is_new)
            .from_writer(file);
        writer
            .serialize(row)
            .and_then(|_| writer.flush().map_err(csv::Error::from))
            .map_err(|source| EngineError::ScoreTable {
                path: path.clone(),
                source,
            })
    }
}

impl JobTracker for JobDistributor {
    fn is_complete(&self) -> bool {
        self.current.is_none()
    }

    fn current_decoy_name(&self) -> Option<String> {
        self.current.map(|i| self.decoy_file_name(i))
    }

    fn remaining(&self) -> usize {
        let Some(current) = self.current else {
            return 0;
        };
        (current..self.num_decoys)
            .filter(|&i| !self.output_dir.join(self.decoy_file_name(i)).exists())
            .count()
    }

    fn output_decoy(
        &mut self,
        system: &MolecularSystem,
        score: &EnergyTerm,
        mutations: &[Mutation],
    ) -> Result<PathBuf, EngineError> {
        let index = self
            .current
            .ok_or_else(|| EngineError::Internal("no decoy left to output".into()))?;
        let name = self.decoy_file_name(index);
        let path = self.output_dir.join(&name);

        PdbFile::write_system_to_path(system, &path).map_err(|source| EngineError::JobOutput {
            path: path.clone(),
            source,
        })?;
        self.append_score_row(&ScoreRow {
            decoy: &name,
            total_score: score.total(),
            environment: score.environment,
            clash: score.clash,
            mutations: mutations
                .iter()
                .map(Mutation::to_string)
                .collect::<Vec<_>>()
                .join(" "),
        })?;

        let marker = self.marker_path(index);
        fs::remove_file(&marker).map_err(|e| EngineError::io(&marker, e))?;
        info!(decoy = %name, total_score = score.total(), "Decoy written");

        self.claim_next()?;
        Ok(path)
    }
}

impl Drop for JobDistributor {
    fn drop(&mut self) {
        if let Some(index) = self.current.take() {
            let marker = self.marker_path(index);
            if let Err(err) = fs::remove_file(&marker) {
                warn!(path = %marker.display(), error = %err, "Could not release job marker");
            }
        }
    }
}
