use crate::cli::DesignArgs;
use crate::config;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use hotspot::{
    core::{
        io::{pdb::PdbFile, traits::MolecularFile},
        models::system::MolecularSystem,
        scoring::contact::ContactScorer,
    },
    engine::{
        jobs::JobDistributor, minimizer::GradientMinimizer, monte_carlo::GenericMonteCarlo,
        packer::StochasticPacker, progress::ProgressReporter,
    },
    workflows::{self, design::DesignCollaborators},
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::Path;
use tracing::{info, warn};

/// Independent generator per stochastic component, derived from the run seed.
fn component_rng(seed: Option<u64>, stream: u64) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(stream)),
        None => StdRng::from_entropy(),
    }
}

fn load_structure(path: &Path) -> Result<MolecularSystem> {
    info!(path = %path.display(), "Loading structure");
    let (system, _) = PdbFile::read_from_path(path).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    Ok(system)
}

pub fn run(args: DesignArgs) -> Result<()> {
    info!("Merging configuration from file and CLI arguments...");
    let app = config::build_config(&args)?;
    let core_config = &app.core_config;

    let reference = load_structure(&app.structure)?;
    let relaxed = load_structure(&app.relaxed)?;
    if reference.total_residue() != relaxed.total_residue() {
        warn!(
            reference = reference.total_residue(),
            relaxed = relaxed.total_residue(),
            "Reference and relaxed structures differ in length"
        );
    }

    let scorer = ContactScorer::default();
    let mut packer = StochasticPacker::new(
        scorer.clone(),
        &core_config.packer,
        component_rng(core_config.seed, 1),
    );
    let mut refiner = GenericMonteCarlo::new(
        GradientMinimizer::new(scorer.clone(), core_config.minimizer.clone()),
        scorer.clone(),
        core_config.monte_carlo.clone(),
        component_rng(core_config.seed, 2),
    );
    let mut jobs = JobDistributor::new(
        core_config.jobs.prefix.clone(),
        core_config.jobs.num_decoys,
        core_config.output_dir.clone(),
    )?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Designing around residue {} into {}...",
        core_config.target,
        core_config.output_dir.display()
    );
    let summary = workflows::design::run(
        &reference,
        &relaxed,
        core_config,
        DesignCollaborators {
            scorer: &scorer,
            packer: &mut packer,
            refiner: &mut refiner,
            jobs: &mut jobs,
        },
        &reporter,
    )?;

    println!(
        "Original score: {:.3}    Relaxed score: {:.3}",
        summary.reference_score.total(),
        summary.relaxed_score.total()
    );
    if summary.decoys.is_empty() {
        println!("All decoys were already present; nothing to do.");
    }
    for decoy in &summary.decoys {
        let mutations = decoy
            .mutations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "✓ {} (score {:.3}) - Mutations: {}",
            decoy.path.display(),
            decoy.score.total(),
            mutations
        );
    }
    println!(
        "{} attempt(s), {} discarded without mutations.",
        summary.attempts, summary.discarded
    );
    Ok(())
}
