use super::capabilities::{Mover, ScoreFunction};
use super::config::MonteCarloConfig;
use super::error::EngineError;
use crate::core::models::system::MolecularSystem;
use rand::Rng;
use rand::rngs::StdRng;
use tracing::{debug, instrument};

/// Statistics of the last [`GenericMonteCarlo::apply`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MonteCarloStats {
    pub trials: usize,
    pub accepted: usize,
    pub start_score: f64,
    pub final_score: f64,
}

/// Repeatedly applies an inner mover, accepting each result with the
/// Metropolis criterion on the total score.
pub struct GenericMonteCarlo<M, S> {
    mover: M,
    scorer: S,
    config: MonteCarloConfig,
    rng: StdRng,
    last_stats: MonteCarloStats,
}

impl<M: Mover, S: ScoreFunction> GenericMonteCarlo<M, S> {
    pub fn new(mover: M, scorer: S, config: MonteCarloConfig, rng: StdRng) -> Self {
        Self {
            mover,
            scorer,
            config,
            rng,
            last_stats: MonteCarloStats::default(),
        }
    }

    pub fn last_stats(&self) -> MonteCarloStats {
        self.last_stats
    }

    fn accept(&mut self, delta: f64) -> bool {
        delta <= 0.0 || self.rng.r#gen::<f64>() < (-delta / self.config.temperature).exp()
    }
}

impl<M: Mover, S: ScoreFunction> Mover for GenericMonteCarlo<M, S> {
    #[instrument(skip_all, name = "monte_carlo")]
    fn apply(&mut self, system: &mut MolecularSystem) -> Result<(), EngineError> {
        if self.config.preapply {
            self.mover.apply(system)?;
        }

        let mut current_score = self.scorer.score(system)?.total();
        let start_score = current_score;
        let mut lowest = (system.clone(), current_score);
        let mut stats = MonteCarloStats {
            start_score,
            ..MonteCarloStats::default()
        };

        while stats.trials < self.config.max_trials
            && stats.accepted < self.config.max_accepted_trials
        {
            stats.trials += 1;
            let mut candidate = system.clone();
            self.mover.apply(&mut candidate)?;
            let score = self.scorer.score(&candidate)?.total();

            if self.accept(score - current_score) {
                stats.accepted += 1;
                current_score = score;
                if score < lowest.1 {
                    lowest = (candidate.clone(), score);
                }
                *system = candidate;
            }
        }

        if self.config.recover_low && lowest.1 < current_score {
            *system = lowest.0;
            current_score = lowest.1;
        }

        stats.final_score = current_score;
        self.last_stats = stats;
        debug!(
            trials = stats.trials,
            accepted = stats.accepted,
            start_score,
            final_score = current_score,
            "Monte Carlo refinement finished"
        );
        Ok(())
    }
}
