use super::capabilities::Mover;
use super::config::MinimizerConfig;
use super::error::EngineError;
use crate::core::models::atom::AtomRole;
use crate::core::models::ids::AtomId;
use crate::core::models::system::MolecularSystem;
use crate::core::scoring::contact::{
    ContactScorer, HeavyAtomIndex, residues_in_contact_range, sequence_positions,
};
use crate::core::scoring::potentials::{
    coordinate_restraint, harmonic_wall, harmonic_wall_derivative,
};
use nalgebra::{Point3, Vector3};
use tracing::{debug, instrument};

/// Extra distance beyond the clash cutoff within which atom pairs are
/// tracked, since the neighbour list is built once per minimization.
const PAIR_LIST_BUFFER: f64 = 2.0;
const INITIAL_STEP: f64 = 0.05;
const MIN_STEP: f64 = 1e-8;
const ARMIJO_C: f64 = 1e-4;

/// Restrained steepest-descent minimizer with Armijo backtracking.
///
/// Minimizes the clash term plus harmonic restraints tying each movable heavy
/// atom to its starting position. Which atoms move is decided by the move map
/// from their role.
pub struct GradientMinimizer {
    scorer: ContactScorer,
    config: MinimizerConfig,
    last_energy: Option<f64>,
}

/// Energy model of one minimization: pair list and restraint anchors.
struct RestrainedClashModel {
    movable: Vec<usize>,
    is_movable: Vec<bool>,
    anchors: Vec<Point3<f64>>,
    pairs: Vec<(usize, usize)>,
    clash_distance: f64,
    clash_weight: f64,
    stdev: f64,
}

impl RestrainedClashModel {
    fn energy(&self, positions: &[Point3<f64>]) -> f64 {
        let clash: f64 = self
            .pairs
            .iter()
            .map(|&(i, j)| {
                let dist = (positions[i] - positions[j]).norm();
                harmonic_wall(dist, self.clash_distance, self.clash_weight)
            })
            .sum();
        let restraint: f64 = self
            .movable
            .iter()
            .map(|&i| coordinate_restraint((positions[i] - self.anchors[i]).norm_squared(), self.stdev))
            .sum();
        clash + restraint
    }

    fn gradient(&self, positions: &[Point3<f64>]) -> Vec<Vector3<f64>> {
        let mut gradient = vec![Vector3::zeros(); positions.len()];
        for &(i, j) in &self.pairs {
            let delta = positions[i] - positions[j];
            let dist = delta.norm();
            if dist < 1e-9 {
                continue;
            }
            let de_dr = harmonic_wall_derivative(dist, self.clash_distance, self.clash_weight);
            if de_dr == 0.0 {
                continue;
            }
            let direction = delta / dist;
            gradient[i] += direction * de_dr;
            gradient[j] -= direction * de_dr;
        }
        let restraint_scale = 2.0 / (self.stdev * self.stdev);
        for &i in &self.movable {
            gradient[i] += (positions[i] - self.anchors[i]) * restraint_scale;
        }
        for (g, &movable) in gradient.iter_mut().zip(&self.is_movable) {
            if !movable {
                *g = Vector3::zeros();
            }
        }
        gradient
    }
}

impl GradientMinimizer {
    pub fn new(scorer: ContactScorer, config: MinimizerConfig) -> Self {
        Self {
            scorer,
            config,
            last_energy: None,
        }
    }

    /// Restrained energy at the end of the last minimization.
    pub fn last_energy(&self) -> Option<f64> {
        self.last_energy
    }

    fn is_movable(&self, role: AtomRole) -> bool {
        let movemap = &self.config.movemap;
        match role {
            AtomRole::Backbone => movemap.backbone,
            AtomRole::Sidechain => movemap.side_chains,
            AtomRole::Hetero => movemap.jump,
        }
    }

    fn build_model(
        &self,
        system: &MolecularSystem,
        index: &HeavyAtomIndex,
    ) -> RestrainedClashModel {
        let is_movable: Vec<bool> = index
            .atom_ids
            .iter()
            .map(|&id| system.atom(id).is_some_and(|atom| self.is_movable(atom.role)))
            .collect();
        let movable = (0..is_movable.len()).filter(|&i| is_movable[i]).collect();
        let anchors = index
            .positions
            .iter()
            .map(|p| Point3::new(p[0], p[1], p[2]))
            .collect();

        let sequence = sequence_positions(system);
        let cutoff = self.scorer.clash_distance + PAIR_LIST_BUFFER;
        let mut pairs = Vec::new();
        for (i, query) in index.positions.iter().enumerate() {
            for (j, _) in index.within(query, cutoff) {
                if j <= i
                    || !(is_movable[i] || is_movable[j])
                    || !residues_in_contact_range(index.owners[i], index.owners[j], &sequence)
                {
                    continue;
                }
                pairs.push((i, j));
            }
        }

        RestrainedClashModel {
            movable,
            is_movable,
            anchors,
            pairs,
            clash_distance: self.scorer.clash_distance,
            clash_weight: self.scorer.clash_weight,
            stdev: self.config.coordinate_stdev,
        }
    }
}

impl Mover for GradientMinimizer {
    #[instrument(skip_all, name = "minimize")]
    fn apply(&mut self, system: &mut MolecularSystem) -> Result<(), EngineError> {
        let index = HeavyAtomIndex::build(system);
        let model = self.build_model(system, &index);
        if model.movable.is_empty() {
            self.last_energy = Some(model.energy(&model.anchors));
            return Ok(());
        }

        let mut positions = model.anchors.clone();
        let mut energy = model.energy(&positions);
        let start_energy = energy;
        let mut step = INITIAL_STEP;
        let mut iterations = 0;

        while iterations < self.config.max_iterations {
            iterations += 1;
            let gradient = model.gradient(&positions);
            let grad_sq: f64 = gradient.iter().map(|g| g.norm_squared()).sum();
            if grad_sq < 1e-12 {
                break;
            }

            let mut accepted = None;
            while step >= MIN_STEP {
                let trial: Vec<Point3<f64>> = positions
                    .iter()
                    .zip(&gradient)
                    .map(|(p, g)| p - g * step)
                    .collect();
                let trial_energy = model.energy(&trial);
                if trial_energy <= energy - ARMIJO_C * step * grad_sq {
                    accepted = Some((trial, trial_energy));
                    break;
                }
                step *= 0.5;
            }
            let Some((trial, trial_energy)) = accepted else {
                break;
            };

            let change = energy - trial_energy;
            positions = trial;
            energy = trial_energy;
            step = (step * 2.0).min(INITIAL_STEP);

            let scale = 0.5 * (energy.abs() + (energy + change).abs()) + 1e-10;
            if change <= self.config.tolerance * scale {
                break;
            }
        }

        write_positions(system, &index.atom_ids, &model.is_movable, &positions);
        self.last_energy = Some(energy);
        debug!(
            iterations,
            start_energy,
            final_energy = energy,
            pairs = model.pairs.len(),
            "Minimization finished"
        );
        Ok(())
    }
}

fn write_positions(
    system: &mut MolecularSystem,
    atom_ids: &[AtomId],
    is_movable: &[bool],
    positions: &[Point3<f64>],
) {
    for ((&id, &movable), position) in atom_ids.iter().zip(is_movable).zip(positions) {
        if !movable {
            continue;
        }
        if let Some(atom) = system.atom_mut(id) {
            atom.position = *position;
        }
    }
}
