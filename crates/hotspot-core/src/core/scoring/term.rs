use std::ops::{Add, AddAssign};

/// Score components reported for a structure. Lower is better.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EnergyTerm {
    /// Hydropathy against burial, summed over amino-acid residues.
    pub environment: f64,
    /// Harmonic penalty for heavy atoms of non-adjacent residues that overlap.
    pub clash: f64,
    /// Coordinate restraint penalty, only non-zero while minimizing.
    pub restraint: f64,
}

impl EnergyTerm {
    pub fn new(environment: f64, clash: f64, restraint: f64) -> Self {
        Self {
            environment,
            clash,
            restraint,
        }
    }

    #[inline]
    pub fn total(&self) -> f64 {
        self.environment + self.clash + self.restraint
    }
}

impl Add for EnergyTerm {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            environment: self.environment + rhs.environment,
            clash: self.clash + rhs.clash,
            restraint: self.restraint + rhs.restraint,
        }
    }
}

impl AddAssign for EnergyTerm {
    fn add_assign(&mut self, rhs: Self) {
        self.environment += rhs.environment;
        self.clash += rhs.clash;
        self.restraint += rhs.restraint;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_returns_sum_of_all_terms() {
        let term = EnergyTerm::new(1.5, -2.0, 0.5);
        assert_eq!(term.total(), 0.0);
    }

    #[test]
    fn add_sums_each_field_correctly() {
        let a = EnergyTerm::new(1.0, 2.0, 3.0);
        let b = EnergyTerm::new(4.0, 5.0, 6.0);
        assert_eq!(a + b, EnergyTerm::new(5.0, 7.0, 9.0));
    }

    #[test]
    fn add_assign_accumulates_each_field_correctly() {
        let mut a = EnergyTerm::new(-1.0, 2.0, -3.0);
        a += EnergyTerm::new(4.0, -5.0, 6.0);
        assert_eq!(a, EnergyTerm::new(3.0, -3.0, 3.0));
    }

    #[test]
    fn default_initializes_all_fields_to_zero() {
        assert_eq!(EnergyTerm::default().total(), 0.0);
    }
}
