use nalgebra::Point3;

/// Coefficients placing an ideal L-amino-acid CB from the N, CA and C atoms
/// (CA-CB 1.52 Å, tetrahedral geometry).
const CB_CROSS_WEIGHT: f64 = -0.58273431;
const CB_N_WEIGHT: f64 = 0.56802827;
const CB_C_WEIGHT: f64 = -0.54067466;

/// Places a virtual CB atom on a backbone.
///
/// Used when a glycine is redesigned to a residue that carries a side chain:
/// the new residue keeps its backbone and gets an ideal CB so neighbourhood
/// and burial measures see it like any other residue.
pub fn calculate_cb_position(
    n_pos: &Point3<f64>,
    ca_pos: &Point3<f64>,
    c_pos: &Point3<f64>,
) -> Point3<f64> {
    let b = ca_pos - n_pos;
    let c = c_pos - ca_pos;
    let a = b.cross(&c);
    ca_pos + a * CB_CROSS_WEIGHT + b * CB_N_WEIGHT + c * CB_C_WEIGHT
}

pub fn calculate_rmsd(coords1: &[Point3<f64>], coords2: &[Point3<f64>]) -> Option<f64> {
    if coords1.len() != coords2.len() || coords1.is_empty() {
        return None;
    }
    let n = coords1.len() as f64;
    let squared_dist_sum: f64 = coords1
        .iter()
        .zip(coords2.iter())
        .map(|(p1, p2)| (p1 - p2).norm_squared())
        .sum();
    Some((squared_dist_sum / n).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-2;

    #[test]
    fn cb_is_placed_at_ideal_bond_length() {
        // Ideal backbone: N-CA 1.458 Å, CA-C 1.525 Å, N-CA-C 111°.
        let n = Point3::new(-0.5225, 1.3612, 0.0);
        let ca = Point3::new(0.0, 0.0, 0.0);
        let c = Point3::new(1.525, 0.0, 0.0);

        let cb = calculate_cb_position(&n, &ca, &c);
        let ca_cb = (cb - ca).norm();
        assert!((ca_cb - 1.52).abs() < 0.05, "CA-CB was {}", ca_cb);
    }

    #[test]
    fn cb_lies_out_of_the_backbone_plane() {
        let n = Point3::new(-0.5225, 1.3612, 0.0);
        let ca = Point3::new(0.0, 0.0, 0.0);
        let c = Point3::new(1.525, 0.0, 0.0);

        let cb = calculate_cb_position(&n, &ca, &c);
        assert!(cb.z.abs() > 0.5);
    }

    #[test]
    fn rmsd_of_identical_sets_is_zero() {
        let coords = vec![Point3::new(1.0, 2.0, 3.0), Point3::new(-1.0, 0.0, 4.0)];
        assert!(calculate_rmsd(&coords, &coords).unwrap().abs() < EPS);
    }

    #[test]
    fn rmsd_of_uniform_shift_equals_shift() {
        let a = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)];
        let b = vec![Point3::new(0.0, 2.0, 0.0), Point3::new(1.0, 2.0, 0.0)];
        assert!((calculate_rmsd(&a, &b).unwrap() - 2.0).abs() < EPS);
    }

    #[test]
    fn rmsd_rejects_mismatched_or_empty_input() {
        let a = vec![Point3::new(0.0, 0.0, 0.0)];
        assert!(calculate_rmsd(&a, &[]).is_none());
        assert!(calculate_rmsd(&[], &[]).is_none());
    }
}
