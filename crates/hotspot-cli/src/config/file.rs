use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileInputsConfig {
    pub structure: Option<PathBuf>,
    pub relaxed: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileOutputConfig {
    pub root: Option<PathBuf>,
    pub prefix: Option<String>,
    pub num_decoys: Option<usize>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileDesignConfig {
    pub radius_min: Option<u32>,
    pub radius_max: Option<u32>,
    pub repack_margin: Option<f64>,
    pub include_target: Option<bool>,
    pub protected_residues: Option<Vec<usize>>,
    pub max_attempts_per_decoy: Option<usize>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FilePackerConfig {
    pub temperature: Option<f64>,
    pub include_current: Option<bool>,
    pub no_repack_disulfides: Option<bool>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileMinimizerConfig {
    pub tolerance: Option<f64>,
    pub max_iterations: Option<usize>,
    pub coordinate_stdev: Option<f64>,
    pub backbone: Option<bool>,
    pub side_chains: Option<bool>,
    pub jump: Option<bool>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileMonteCarloConfig {
    pub max_trials: Option<usize>,
    pub max_accepted_trials: Option<usize>,
    pub temperature: Option<f64>,
    pub recover_low: Option<bool>,
    pub preapply: Option<bool>,
}

/// Every key of the TOML configuration file; absent keys fall back to the
/// command line and then to the built-in defaults.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    pub seed: Option<u64>,
    pub inputs: Option<FileInputsConfig>,
    pub output: Option<FileOutputConfig>,
    pub design: Option<FileDesignConfig>,
    pub packer: Option<FilePackerConfig>,
    pub minimizer: Option<FileMinimizerConfig>,
    pub monte_carlo: Option<FileMonteCarloConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "Loading configuration file");
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_sections() {
        let config: FileConfig = toml::from_str(
            r#"
            seed = 11

            [inputs]
            structure = "ref.clean.pdb"

            [output]
            num-decoys = 4

            [design]
            radius-min = 6
            protected-residues = [2, 19]

            [packer]
            include-current = false

            [minimizer]
            side-chains = false

            [monte-carlo]
            max-accepted-trials = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.seed, Some(11));
        assert_eq!(
            config.inputs.unwrap().structure,
            Some(PathBuf::from("ref.clean.pdb"))
        );
        assert_eq!(config.output.unwrap().num_decoys, Some(4));
        let design = config.design.unwrap();
        assert_eq!(design.radius_min, Some(6));
        assert_eq!(design.protected_residues, Some(vec![2, 19]));
        assert_eq!(config.packer.unwrap().include_current, Some(false));
        assert_eq!(config.minimizer.unwrap().side_chains, Some(false));
        assert_eq!(config.monte_carlo.unwrap().max_accepted_trials, Some(3));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<FileConfig>("[design]\nradius = 5\n").is_err());
        assert!(toml::from_str::<FileConfig>("[scoring]\n").is_err());
    }

    #[test]
    fn unreadable_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "seed = \"not a number\"").unwrap();
        assert!(matches!(
            FileConfig::from_file(&path),
            Err(CliError::FileParsing { .. })
        ));
        assert!(matches!(
            FileConfig::from_file(&dir.path().join("missing.toml")),
            Err(CliError::Io(_))
        ));
    }
}
