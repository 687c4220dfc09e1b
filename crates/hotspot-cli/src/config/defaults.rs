use hotspot::engine::config::JobConfig;
use std::path::PathBuf;

/// Built-in values for settings the core configuration leaves to the caller.
pub struct DefaultsConfig {
    pub structure: PathBuf,
    pub relaxed: PathBuf,
    pub output_root: PathBuf,
    pub prefix: String,
    pub num_decoys: usize,
    pub max_attempts_per_decoy: usize,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        let jobs = JobConfig::default();
        Self {
            structure: PathBuf::from("1BTL.clean.pdb"),
            relaxed: PathBuf::from("relaxed_1BTL.pdb"),
            output_root: PathBuf::from("Outputs"),
            prefix: jobs.prefix,
            num_decoys: jobs.num_decoys,
            max_attempts_per_decoy: 100,
        }
    }
}
