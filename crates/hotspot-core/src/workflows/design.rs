use crate::core::io::mutation_log;
use crate::core::io::radius_log;
use crate::core::models::mutation::Mutation;
use crate::core::models::system::MolecularSystem;
use crate::core::scoring::term::EnergyTerm;
use crate::engine::capabilities::{Mover, PackOutcome, ScoreFunction, SequencePacker};
use crate::engine::config::DesignConfig;
use crate::engine::error::EngineError;
use crate::engine::jobs::JobTracker;
use crate::engine::mutations::diff_structures;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::selection::ResidueSelector;
use crate::engine::task::{BehaviorCounts, TaskFactory, TaskOperation};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

pub const MUTATION_LOG_FILE: &str = "mutations.txt";
pub const RADIUS_LOG_FILE: &str = "radius.txt";

/// The pluggable parts of the design loop.
pub struct DesignCollaborators<'a> {
    pub scorer: &'a dyn ScoreFunction,
    pub packer: &'a mut dyn SequencePacker,
    /// Applied to every structure that carries at least one mutation.
    pub refiner: &'a mut dyn Mover,
    pub jobs: &'a mut dyn JobTracker,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DesignStepOutcome {
    pub design_radius: u32,
    pub repack_radius: f64,
    pub counts: BehaviorCounts,
    pub pack: PackOutcome,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecoyReport {
    pub name: String,
    pub path: PathBuf,
    pub score: EnergyTerm,
    pub mutations: Vec<Mutation>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DesignSummary {
    pub reference_score: EnergyTerm,
    pub relaxed_score: EnergyTerm,
    pub decoys: Vec<DecoyReport>,
    /// Design attempts made, successful or not.
    pub attempts: usize,
    /// Attempts discarded because they produced no mutation.
    pub discarded: usize,
}

/// Task factory for one design attempt around `config.target`.
pub fn build_task_factory(config: &DesignConfig, design_radius: u32) -> TaskFactory {
    let target = ResidueSelector::index([config.target]);
    let design_shell = ResidueSelector::neighborhood(
        target.clone(),
        f64::from(design_radius),
        config.shells.include_target,
    );
    let repack_shell =
        ResidueSelector::neighborhood(target, config.repack_radius(design_radius), true);

    let mut factory = TaskFactory::new();
    factory.push_back(TaskOperation::InitializeFromDefaults);
    if config.packer.include_current {
        factory.push_back(TaskOperation::IncludeCurrent);
    }
    if config.packer.no_repack_disulfides {
        factory.push_back(TaskOperation::NoRepackDisulfides);
    }
    if !config.shells.protected_residues.is_empty() {
        factory.push_back(TaskOperation::RestrictToRepacking {
            selector: ResidueSelector::Index(config.shells.protected_residues.clone()),
            flip: false,
        });
    }
    factory
        .push_back(TaskOperation::RestrictToRepacking {
            selector: design_shell,
            flip: true,
        })
        .push_back(TaskOperation::PreventRepacking {
            selector: repack_shell,
            flip: true,
        });
    factory
}

/// Redesigns the shell around the target in place and records the radii
/// used in `radius_log`.
pub fn design_around(
    system: &mut MolecularSystem,
    config: &DesignConfig,
    rng: &mut impl Rng,
    packer: &mut dyn SequencePacker,
    radius_log: &Path,
) -> Result<DesignStepOutcome, EngineError> {
    let design_radius = rng.gen_range(config.shells.radius_min..=config.shells.radius_max);
    let repack_radius = config.repack_radius(design_radius);

    let task = build_task_factory(config, design_radius).create_task(system)?;
    let counts = task.counts();
    let pack = packer.pack(system, &task)?;

    radius_log::append_radii(radius_log, design_radius, repack_radius)
        .map_err(|e| EngineError::io(radius_log, e))?;
    debug!(
        design_radius,
        repack_radius,
        design = counts.design,
        repack = counts.repack,
        fixed = counts.fixed,
        mutated = pack.mutated,
        "Design step finished"
    );

    Ok(DesignStepOutcome {
        design_radius,
        repack_radius,
        counts,
        pack,
    })
}

#[instrument(skip_all, name = "design_workflow", fields(target = config.target))]
pub fn run(
    reference: &MolecularSystem,
    relaxed: &MolecularSystem,
    config: &DesignConfig,
    collaborators: DesignCollaborators<'_>,
    reporter: &ProgressReporter,
) -> Result<DesignSummary, EngineError> {
    let DesignCollaborators {
        scorer,
        packer,
        refiner,
        jobs,
    } = collaborators;

    let total = relaxed.total_residue();
    if config.target == 0 || config.target > total {
        return Err(EngineError::ResidueIndexOutOfRange {
            index: config.target,
            total,
        });
    }

    // === Phase 1: Baseline scores ===
    reporter.report(Progress::PhaseStart {
        name: "Baseline Scoring",
    });
    let reference_score = scorer.score(reference)?;
    let relaxed_score = scorer.score(relaxed)?;
    info!(
        reference = reference_score.total(),
        relaxed = relaxed_score.total(),
        "Baseline scores"
    );
    reporter.report(Progress::Message(format!(
        "Reference {:.3}, relaxed {:.3}",
        reference_score.total(),
        relaxed_score.total()
    )));
    reporter.report(Progress::PhaseFinish);

    fs::create_dir_all(&config.output_dir)
        .map_err(|e| EngineError::io(&config.output_dir, e))?;
    let mutation_log_path = config.output_dir.join(MUTATION_LOG_FILE);
    let radius_log_path = config.output_dir.join(RADIUS_LOG_FILE);
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    // === Phase 2: Design loop ===
    reporter.report(Progress::PhaseStart {
        name: "Designing Decoys",
    });
    reporter.report(Progress::TaskStart {
        total_steps: jobs.remaining() as u64,
    });
    if let Some(label) = relaxed.pdb_label(config.target) {
        info!(target_label = %label, output_dir = %config.output_dir.display(), "Designing around target");
    }

    let mut summary = DesignSummary {
        reference_score,
        relaxed_score,
        decoys: Vec::new(),
        attempts: 0,
        discarded: 0,
    };
    let mut failed_for_decoy = 0;

    while !jobs.is_complete() {
        let decoy = jobs
            .current_decoy_name()
            .ok_or_else(|| EngineError::Internal("job tracker has no current decoy".into()))?;
        summary.attempts += 1;
        reporter.report(Progress::StatusUpdate {
            text: format!("{decoy}: attempt {}", failed_for_decoy + 1),
        });

        let mut working = relaxed.clone();
        let step = design_around(&mut working, config, &mut rng, packer, &radius_log_path)?;
        let mutations = diff_structures(reference, &working)?;
        mutation_log::append_record(&mutation_log_path, &decoy, &mutations)
            .map_err(|e| EngineError::io(&mutation_log_path, e))?;

        if mutations.is_empty() {
            summary.discarded += 1;
            failed_for_decoy += 1;
            debug!(decoy = %decoy, radius = step.design_radius, "Attempt produced no mutation");
            if failed_for_decoy >= config.max_attempts_per_decoy {
                warn!(decoy = %decoy, attempts = failed_for_decoy, "Giving up on decoy");
                return Err(EngineError::AttemptsExhausted {
                    decoy,
                    attempts: failed_for_decoy,
                });
            }
            continue;
        }

        refiner.apply(&mut working)?;
        let score = scorer.score(&working)?;
        let path = jobs.output_decoy(&working, &score, &mutations)?;
        info!(
            decoy = %decoy,
            total_score = score.total(),
            mutations = mutations.len(),
            radius = step.design_radius,
            "Decoy accepted"
        );
        summary.decoys.push(DecoyReport {
            name: decoy,
            path,
            score,
            mutations,
        });
        failed_for_decoy = 0;
        reporter.report(Progress::TaskIncrement);
    }

    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);
    info!(
        decoys = summary.decoys.len(),
        attempts = summary.attempts,
        discarded = summary.discarded,
        "Design workflow complete"
    );
    Ok(summary)
}
