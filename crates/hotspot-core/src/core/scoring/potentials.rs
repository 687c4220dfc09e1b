/// Largest magnitude of the Kyte-Doolittle scale (isoleucine).
pub const MAX_HYDROPATHY: f64 = 4.5;

/// One-sided harmonic wall: zero beyond `d0`, `k (d0 - d)^2` inside it.
#[inline]
pub fn harmonic_wall(dist: f64, d0: f64, k: f64) -> f64 {
    if dist >= d0 {
        0.0
    } else {
        let overlap = d0 - dist;
        k * overlap * overlap
    }
}

/// Derivative of [`harmonic_wall`] with respect to `dist`.
#[inline]
pub fn harmonic_wall_derivative(dist: f64, d0: f64, k: f64) -> f64 {
    if dist >= d0 {
        0.0
    } else {
        -2.0 * k * (d0 - dist)
    }
}

/// Coordinate restraint `(dev / stdev)^2` from a squared deviation.
#[inline]
pub fn coordinate_restraint(deviation_sq: f64, stdev: f64) -> f64 {
    deviation_sq / (stdev * stdev)
}

/// Environment energy of a residue with the given hydropathy at a burial
/// fraction in `[0, 1]`. Hydrophobic residues are rewarded above `midpoint`
/// and penalised below it; hydrophilic residues the other way round.
#[inline]
pub fn environment_energy(hydropathy: f64, burial_fraction: f64, midpoint: f64) -> f64 {
    -(hydropathy / MAX_HYDROPATHY) * (burial_fraction.clamp(0.0, 1.0) - midpoint)
}
