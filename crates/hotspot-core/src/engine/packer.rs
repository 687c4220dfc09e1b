use super::capabilities::{PackOutcome, SequencePacker};
use super::config::PackerConfig;
use super::error::EngineError;
use super::task::{PackerTask, ResidueBehavior};
use super::utils::sampling::boltzmann_sample;
use crate::core::models::residue::AminoAcid;
use crate::core::models::system::MolecularSystem;
use crate::core::scoring::contact::{ContactScorer, HeavyAtomIndex};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{debug, trace};

/// Designs residues one at a time in random order, drawing each new
/// identity from a Boltzmann distribution over the environment energies of
/// the canonical amino acids at the residue's burial.
///
/// Repack-only and fixed residues are left exactly as they are.
pub struct StochasticPacker {
    scorer: ContactScorer,
    temperature: f64,
    rng: StdRng,
}

impl StochasticPacker {
    pub fn new(scorer: ContactScorer, config: &PackerConfig, rng: StdRng) -> Self {
        Self {
            scorer,
            temperature: config.temperature,
            rng,
        }
    }
}

impl SequencePacker for StochasticPacker {
    fn pack(
        &mut self,
        system: &mut MolecularSystem,
        task: &PackerTask,
    ) -> Result<PackOutcome, EngineError> {
        if task.len() != system.total_residue() {
            return Err(EngineError::Internal(format!(
                "packer task covers {} residues but the structure has {}",
                task.len(),
                system.total_residue()
            )));
        }

        let order = system.residue_ids_in_order();
        let index = HeavyAtomIndex::build(system);
        let burial = self.scorer.burial_with_index(system, &index);
        let beta = 1.0 / self.temperature;

        let mut positions = task.positions_with(ResidueBehavior::Design);
        positions.shuffle(&mut self.rng);

        let mut outcome = PackOutcome {
            designable: positions.len(),
            mutated: 0,
        };

        for pose_index in positions {
            let residue_id = order[pose_index - 1];
            let Some(current) = system.residue(residue_id).and_then(|r| r.amino_acid) else {
                continue;
            };
            let include_current = task
                .residue(pose_index)
                .is_some_and(|residue_task| residue_task.include_current);

            let candidates: Vec<AminoAcid> = AminoAcid::ALL
                .iter()
                .copied()
                .filter(|&aa| include_current || aa != current)
                .collect();
            let count = burial.get(&residue_id).copied().unwrap_or(0);
            let energies: Vec<f64> = candidates
                .iter()
                .map(|&aa| self.scorer.residue_environment(aa, count))
                .collect();

            let choice = candidates[boltzmann_sample(&energies, beta, &mut self.rng)?];
            trace!(pose_index, from = %current, to = %choice, burial = count, "Sampled identity");
            if choice != current {
                system.mutate_residue(residue_id, choice)?;
                outcome.mutated += 1;
            }
        }

        debug!(
            designable = outcome.designable,
            mutated = outcome.mutated,
            "Packing pass finished"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::system::test_support::linear_system;
    use crate::engine::selection::ResidueSelector;
    use crate::engine::task::{TaskFactory, TaskOperation};
    use rand::SeedableRng;

    fn packer(seed: u64, include_current: bool) -> StochasticPacker {
        let config = PackerConfig {
            include_current,
            ..PackerConfig::default()
        };
        StochasticPacker::new(ContactScorer::default(), &config, StdRng::seed_from_u64(seed))
    }

    #[test]
    fn only_designable_residues_change() {
        let mut system = linear_system("AKTLEAKTLE");
        let mut factory = TaskFactory::new();
        factory.push_back(TaskOperation::RestrictToRepacking {
            selector: ResidueSelector::index([3, 4]),
            flip: true,
        });
        let task = factory.create_task(&system).unwrap();

        let outcome = packer(5, false).pack(&mut system, &task).unwrap();
        let sequence: Vec<char> = system.sequence().chars().collect();
        let original: Vec<char> = "AKTLEAKTLE".chars().collect();

        assert_eq!(outcome.designable, 2);
        assert_eq!(outcome.mutated, 2);
        for (i, (&now, &before)) in sequence.iter().zip(&original).enumerate() {
            if i == 2 || i == 3 {
                assert_ne!(now, before);
            } else {
                assert_eq!(now, before);
            }
        }
    }

    #[test]
    fn fully_restricted_task_changes_nothing() {
        let mut system = linear_system("AKT");
        let mut factory = TaskFactory::new();
        factory.push_back(TaskOperation::PreventRepacking {
            selector: ResidueSelector::index([1, 2, 3]),
            flip: false,
        });
        let task = factory.create_task(&system).unwrap();
        let outcome = packer(1, true).pack(&mut system, &task).unwrap();
        assert_eq!(outcome, PackOutcome::default());
        assert_eq!(system.sequence(), "AKT");
    }

    #[test]
    fn same_seed_gives_same_design() {
        let build = || {
            let mut system = linear_system("AKTLEAKTLE");
            let task = TaskFactory::new().create_task(&system).unwrap();
            packer(42, true).pack(&mut system, &task).unwrap();
            system.sequence()
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn mismatched_task_is_rejected() {
        let mut small = linear_system("AK");
        let task = TaskFactory::new()
            .create_task(&linear_system("AKT"))
            .unwrap();
        assert!(packer(0, true).pack(&mut small, &task).is_err());
    }
}
