use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Hotspot CLI - redesign the neighbourhood of a target residue and inspect the resulting mutations in PyMOL.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Design decoys around a target residue of a relaxed structure.
    Design(DesignArgs),
    /// Write a PyMOL script aligning a directory of designs onto the reference.
    Visualize(VisualizeArgs),
}

/// Arguments for the `design` subcommand.
#[derive(Args, Debug, Clone)]
pub struct DesignArgs {
    // --- Core Arguments ---
    /// Pose index (1-based) of the residue to design around.
    #[arg(short, long, required = true, value_name = "INT")]
    pub target: usize,

    /// Reference structure mutations are reported against [default: 1BTL.clean.pdb].
    #[arg(long, value_name = "PATH")]
    pub structure: Option<PathBuf>,

    /// Relaxed structure every design attempt starts from [default: relaxed_1BTL.pdb].
    #[arg(long, value_name = "PATH")]
    pub relaxed: Option<PathBuf>,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory under which `mutating_res<TARGET>` is created [default: Outputs].
    #[arg(short, long, value_name = "PATH")]
    pub output_root: Option<PathBuf>,

    // --- Job Overrides ---
    /// Override the number of decoys to produce.
    #[arg(short, long, value_name = "INT")]
    pub num_decoys: Option<usize>,

    /// Override the decoy file name prefix.
    #[arg(long, value_name = "NAME")]
    pub prefix: Option<String>,

    /// Seed the random number generators for a reproducible run.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,

    /// Override `packer.include-current` from the config file.
    #[command(flatten)]
    pub include_current: IncludeCurrent,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S design.radius-max=10
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Mutually exclusive flags for keeping the current identity as a packer candidate.
#[derive(Args, Debug, Clone, Copy, Default)]
#[group(required = false, multiple = false)]
pub struct IncludeCurrent {
    /// Keep the current identity among the packer's candidates.
    #[arg(long)]
    pub with_current: bool,
    /// Force every designable residue to change identity.
    #[arg(long)]
    pub no_current: bool,
}

/// Arguments for the `visualize` subcommand.
#[derive(Args, Debug, Clone)]
pub struct VisualizeArgs {
    /// Directory holding the reference and the designed structures.
    #[arg(short, long, default_value = ".", value_name = "PATH")]
    pub dir: PathBuf,

    /// Mutation log, relative to the directory unless absolute.
    #[arg(short, long, default_value = "mutations.txt", value_name = "FILE")]
    pub log: PathBuf,

    /// Script to write, relative to the directory unless absolute.
    #[arg(
        short,
        long,
        default_value = "align_and_show_all_mutations.pml",
        value_name = "FILE"
    )]
    pub output: PathBuf,

    /// Substring identifying the reference structure's file name.
    #[arg(long, default_value = "clean", value_name = "STR")]
    pub reference_marker: String,
}
