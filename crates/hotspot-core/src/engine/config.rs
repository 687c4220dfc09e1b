use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Residues that must never change identity in the default protocol
/// (pose indices of catalytic and structural positions of TEM-1).
pub const DEFAULT_PROTECTED_RESIDUES: [usize; 24] = [
    2, 19, 20, 37, 42, 45, 48, 51, 82, 97, 105, 107, 120, 141, 142, 149, 158, 194, 201, 209, 218,
    226, 230, 235,
];

/// Geometry of the design and repack shells around the target residue.
#[derive(Debug, Clone, PartialEq)]
pub struct ShellConfig {
    /// Inclusive bounds of the design radius, in Å, drawn uniformly per attempt.
    pub radius_min: u32,
    pub radius_max: u32,
    /// The repack shell radius is the design radius plus this margin.
    pub repack_margin: f64,
    /// Whether the target itself belongs to the design shell.
    pub include_target: bool,
    /// Pose indices restricted to repacking regardless of distance.
    pub protected_residues: Vec<usize>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            radius_min: 8,
            radius_max: 12,
            repack_margin: 4.0,
            include_target: true,
            protected_residues: DEFAULT_PROTECTED_RESIDUES.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PackerConfig {
    /// Sampling temperature (energy units) for sequence choices.
    pub temperature: f64,
    /// Keep each residue's current identity among the candidates.
    pub include_current: bool,
    /// Keep disulfide-bonded cysteines fixed.
    pub no_repack_disulfides: bool,
}

impl Default for PackerConfig {
    fn default() -> Self {
        Self {
            temperature: 0.5,
            include_current: true,
            no_repack_disulfides: true,
        }
    }
}

/// Degrees of freedom the minimizer may change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveMap {
    pub backbone: bool,
    pub side_chains: bool,
    /// Rigid-body freedom of everything that is not protein.
    pub jump: bool,
}

impl Default for MoveMap {
    fn default() -> Self {
        Self {
            backbone: true,
            side_chains: true,
            jump: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MinimizerConfig {
    pub movemap: MoveMap,
    /// Relative energy change below which minimization stops.
    pub tolerance: f64,
    pub max_iterations: usize,
    /// Standard deviation (Å) of the harmonic restraint to start coordinates.
    pub coordinate_stdev: f64,
}

impl Default for MinimizerConfig {
    fn default() -> Self {
        Self {
            movemap: MoveMap::default(),
            tolerance: 0.001,
            max_iterations: 1000,
            coordinate_stdev: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonteCarloConfig {
    pub max_trials: usize,
    pub max_accepted_trials: usize,
    pub temperature: f64,
    /// Return the lowest-scoring structure seen rather than the last accepted.
    pub recover_low: bool,
    /// Apply the inner mover once, unconditionally, before the trials.
    pub preapply: bool,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            max_trials: 10,
            max_accepted_trials: 10,
            temperature: 0.6,
            recover_low: true,
            preapply: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobConfig {
    /// Decoys are named `<prefix>_<i>.pdb`.
    pub prefix: String,
    pub num_decoys: usize,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            prefix: "1BTL_design".to_string(),
            num_decoys: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DesignConfig {
    /// 1-based pose index of the residue to design around.
    pub target: usize,
    pub shells: ShellConfig,
    pub packer: PackerConfig,
    pub minimizer: MinimizerConfig,
    pub monte_carlo: MonteCarloConfig,
    pub jobs: JobConfig,
    /// Failed attempts allowed for one decoy before the run is aborted.
    pub max_attempts_per_decoy: usize,
    pub output_dir: PathBuf,
    pub seed: Option<u64>,
}

#[derive(Default)]
pub struct DesignConfigBuilder {
    target: Option<usize>,
    shells: Option<ShellConfig>,
    packer: Option<PackerConfig>,
    minimizer: Option<MinimizerConfig>,
    monte_carlo: Option<MonteCarloConfig>,
    jobs: Option<JobConfig>,
    max_attempts_per_decoy: Option<usize>,
    output_dir: Option<PathBuf>,
    seed: Option<u64>,
}

impl DesignConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target(mut self, target: usize) -> Self {
        self.target = Some(target);
        self
    }
    pub fn shells(mut self, shells: ShellConfig) -> Self {
        self.shells = Some(shells);
        self
    }
    pub fn packer(mut self, packer: PackerConfig) -> Self {
        self.packer = Some(packer);
        self
    }
    pub fn minimizer(mut self, minimizer: MinimizerConfig) -> Self {
        self.minimizer = Some(minimizer);
        self
    }
    pub fn monte_carlo(mut self, monte_carlo: MonteCarloConfig) -> Self {
        self.monte_carlo = Some(monte_carlo);
        self
    }
    pub fn jobs(mut self, jobs: JobConfig) -> Self {
        self.jobs = Some(jobs);
        self
    }
    pub fn max_attempts_per_decoy(mut self, attempts: usize) -> Self {
        self.max_attempts_per_decoy = Some(attempts);
        self
    }
    pub fn output_dir(mut self, dir: PathBuf) -> Self {
        self.output_dir = Some(dir);
        self
    }
    pub fn seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn build(self) -> Result<DesignConfig, ConfigError> {
        let config = DesignConfig {
            target: self.target.ok_or(ConfigError::MissingParameter("target"))?,
            shells: self.shells.unwrap_or_default(),
            packer: self.packer.unwrap_or_default(),
            minimizer: self.minimizer.unwrap_or_default(),
            monte_carlo: self.monte_carlo.unwrap_or_default(),
            jobs: self.jobs.unwrap_or_default(),
            max_attempts_per_decoy: self.max_attempts_per_decoy.unwrap_or(100),
            output_dir: self
                .output_dir
                .ok_or(ConfigError::MissingParameter("output_dir"))?,
            seed: self.seed,
        };
        config.validate()?;
        Ok(config)
    }
}

fn invalid(name: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidParameter {
        name,
        reason: reason.into(),
    }
}

impl DesignConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.target == 0 {
            return Err(invalid("target", "pose indices start at 1"));
        }
        let shells = &self.shells;
        if shells.radius_min == 0 || shells.radius_min > shells.radius_max {
            return Err(invalid(
                "radius",
                format!(
                    "expected 0 < min <= max, got {}..={}",
                    shells.radius_min, shells.radius_max
                ),
            ));
        }
        if !(shells.repack_margin >= 0.0) {
            return Err(invalid("repack_margin", "must be non-negative"));
        }
        if shells.protected_residues.contains(&0) {
            return Err(invalid("protected_residues", "pose indices start at 1"));
        }
        if !(self.packer.temperature > 0.0) {
            return Err(invalid("packer.temperature", "must be positive"));
        }
        if !(self.minimizer.tolerance > 0.0) {
            return Err(invalid("minimizer.tolerance", "must be positive"));
        }
        if !(self.minimizer.coordinate_stdev > 0.0) {
            return Err(invalid("minimizer.coordinate_stdev", "must be positive"));
        }
        if !(self.monte_carlo.temperature > 0.0) {
            return Err(invalid("monte_carlo.temperature", "must be positive"));
        }
        if self.jobs.num_decoys == 0 {
            return Err(invalid("num_decoys", "at least one decoy is required"));
        }
        if self.jobs.prefix.trim().is_empty() {
            return Err(invalid("prefix", "must not be empty"));
        }
        if self.max_attempts_per_decoy == 0 {
            return Err(invalid("max_attempts_per_decoy", "must be at least 1"));
        }
        Ok(())
    }

    /// Repack radius for a given design radius.
    pub fn repack_radius(&self, design_radius: u32) -> f64 {
        f64::from(design_radius) + self.shells.repack_margin
    }
}
