use rand::{distributions::WeightedIndex, prelude::*};
use thiserror::Error;
use tracing::instrument;

#[derive(Debug, Error)]
pub enum SamplingError {
    #[error("Input energies list is empty, cannot perform sampling")]
    EmptyEnergies,
    #[error(
        "All energies are too high or beta is zero, resulting in zero total weight for sampling"
    )]
    ZeroTotalWeight,
    #[error("Invalid beta value: {0}. Beta must be positive for Boltzmann sampling")]
    InvalidBeta(f64),
    #[error("Failed to create weighted distribution: {source}")]
    DistributionError {
        #[from]
        source: rand::distributions::WeightedError,
    },
}

/// Draws an index with probability proportional to `exp(-beta * E)`.
///
/// Energies are shifted by their minimum first, so the lowest-energy option
/// always has weight one and large absolute energies cannot underflow.
#[instrument(level = "trace", skip_all, fields(beta))]
pub fn boltzmann_sample(
    energies: &[f64],
    beta: f64,
    rng: &mut impl Rng,
) -> Result<usize, SamplingError> {
    if energies.is_empty() {
        return Err(SamplingError::EmptyEnergies);
    }
    if !(beta > 0.0) {
        return Err(SamplingError::InvalidBeta(beta));
    }

    let min_energy = energies.iter().copied().fold(f64::INFINITY, f64::min);

    let weights: Vec<f64> = energies
        .iter()
        .map(|&e| (-(e - min_energy) * beta).exp())
        .collect();

    let total_weight: f64 = weights.iter().sum();
    if !(total_weight > f64::EPSILON) {
        tracing::warn!(
            total_weight,
            "Total Boltzmann weight is near zero; falling back to the lowest-energy option"
        );
        return energies
            .iter()
            .position(|&e| (e - min_energy).abs() < f64::EPSILON)
            .ok_or(SamplingError::ZeroTotalWeight);
    }

    let dist = WeightedIndex::new(&weights)?;
    Ok(dist.sample(rng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;

    #[test]
    fn rejects_empty_input_and_non_positive_beta() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            boltzmann_sample(&[], 1.0, &mut rng),
            Err(SamplingError::EmptyEnergies)
        ));
        assert!(matches!(
            boltzmann_sample(&[1.0], 0.0, &mut rng),
            Err(SamplingError::InvalidBeta(_))
        ));
        assert!(matches!(
            boltzmann_sample(&[1.0], f64::NAN, &mut rng),
            Err(SamplingError::InvalidBeta(_))
        ));
    }

    #[test]
    fn single_option_is_always_chosen() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..10 {
            assert_eq!(boltzmann_sample(&[42.0], 1.0, &mut rng).unwrap(), 0);
        }
    }

    #[test]
    fn low_temperature_prefers_lowest_energy() {
        let mut rng = StdRng::seed_from_u64(3);
        let energies = [5.0, -1.0, 3.0];
        for _ in 0..50 {
            assert_eq!(boltzmann_sample(&energies, 100.0, &mut rng).unwrap(), 1);
        }
    }

    #[test]
    fn high_temperature_visits_every_option() {
        let mut rng = StdRng::seed_from_u64(11);
        let energies = [0.0, 0.1, 0.2];
        let mut seen = [false; 3];
        for _ in 0..300 {
            seen[boltzmann_sample(&energies, 0.01, &mut rng).unwrap()] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }
}
