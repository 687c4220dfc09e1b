use super::potentials::{environment_energy, harmonic_wall};
use super::term::EnergyTerm;
use crate::core::models::ids::{AtomId, ResidueId};
use crate::core::models::residue::AminoAcid;
use crate::core::models::system::MolecularSystem;
use kiddo::{KdTree, SquaredEuclidean};
use std::collections::HashMap;

/// Heavy atoms of a structure with a spatial index over their positions.
pub struct HeavyAtomIndex {
    pub atom_ids: Vec<AtomId>,
    pub owners: Vec<ResidueId>,
    pub positions: Vec<[f64; 3]>,
    tree: KdTree<f64, 3>,
}

impl HeavyAtomIndex {
    pub fn build(system: &MolecularSystem) -> Self {
        let mut atom_ids = Vec::new();
        let mut owners = Vec::new();
        let mut positions = Vec::new();
        for (id, atom) in system.atoms_iter().filter(|(_, atom)| atom.is_heavy()) {
            atom_ids.push(id);
            owners.push(atom.residue_id);
            positions.push([atom.position.x, atom.position.y, atom.position.z]);
        }
        let tree: KdTree<f64, 3> = (&positions).into();
        Self {
            atom_ids,
            owners,
            positions,
            tree,
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Indices and distances of indexed atoms within `radius` of `query`.
    pub fn within(&self, query: &[f64; 3], radius: f64) -> Vec<(usize, f64)> {
        if self.is_empty() {
            return Vec::new();
        }
        self.tree
            .within_unsorted::<SquaredEuclidean>(query, radius * radius)
            .into_iter()
            .map(|neighbour| (neighbour.item as usize, neighbour.distance.sqrt()))
            .collect()
    }
}

/// Chain index and position within the chain for every residue, used to
/// exclude covalently adjacent residues from contact terms.
pub fn sequence_positions(system: &MolecularSystem) -> HashMap<ResidueId, (usize, usize)> {
    system
        .chains_in_order()
        .enumerate()
        .flat_map(|(chain_index, (_, chain))| {
            chain
                .residues()
                .iter()
                .enumerate()
                .map(move |(position, &residue_id)| (residue_id, (chain_index, position)))
        })
        .collect()
}

pub fn residues_in_contact_range(
    a: ResidueId,
    b: ResidueId,
    positions: &HashMap<ResidueId, (usize, usize)>,
) -> bool {
    if a == b {
        return false;
    }
    match (positions.get(&a), positions.get(&b)) {
        (Some(&(chain_a, pos_a)), Some(&(chain_b, pos_b))) => {
            chain_a != chain_b || pos_a.abs_diff(pos_b) > 1
        }
        _ => true,
    }
}

/// Knowledge-free contact score: a hydropathy/burial environment term and a
/// heavy-atom clash term.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactScorer {
    /// Radius around a residue's neighbour atom used to count burying atoms.
    pub burial_radius: f64,
    /// Atom count at which a residue is considered fully buried.
    pub burial_saturation: f64,
    /// Burial fraction separating favourable from unfavourable environments.
    pub burial_midpoint: f64,
    /// Heavy atoms of non-adjacent residues closer than this clash.
    pub clash_distance: f64,
    pub clash_weight: f64,
}

impl Default for ContactScorer {
    fn default() -> Self {
        Self {
            burial_radius: 10.0,
            burial_saturation: 120.0,
            burial_midpoint: 0.5,
            clash_distance: 3.0,
            clash_weight: 1.0,
        }
    }
}

impl ContactScorer {
    /// Number of heavy atoms of other residues around each amino-acid
    /// residue's neighbour atom.
    pub fn burial(&self, system: &MolecularSystem) -> HashMap<ResidueId, usize> {
        let index = HeavyAtomIndex::build(system);
        self.burial_with_index(system, &index)
    }

    pub fn burial_with_index(
        &self,
        system: &MolecularSystem,
        index: &HeavyAtomIndex,
    ) -> HashMap<ResidueId, usize> {
        system
            .residue_ids_in_order()
            .into_iter()
            .filter(|&id| system.residue(id).is_some_and(|r| r.amino_acid.is_some()))
            .filter_map(|id| {
                let center = system.neighbor_atom_position(id)?;
                let count = index
                    .within(&[center.x, center.y, center.z], self.burial_radius)
                    .into_iter()
                    .filter(|&(i, _)| index.owners[i] != id)
                    .count();
                Some((id, count))
            })
            .collect()
    }

    pub fn burial_fraction(&self, count: usize) -> f64 {
        (count as f64 / self.burial_saturation).min(1.0)
    }

    /// Environment energy `amino_acid` would have with `burial_count`
    /// surrounding atoms.
    pub fn residue_environment(&self, amino_acid: AminoAcid, burial_count: usize) -> f64 {
        environment_energy(
            amino_acid.hydropathy(),
            self.burial_fraction(burial_count),
            self.burial_midpoint,
        )
    }

    pub fn environment_energy(&self, system: &MolecularSystem) -> f64 {
        self.burial(system)
            .into_iter()
            .filter_map(|(id, count)| {
                let amino_acid = system.residue(id)?.amino_acid?;
                Some(self.residue_environment(amino_acid, count))
            })
            .sum()
    }

    pub fn clash_energy(&self, system: &MolecularSystem) -> f64 {
        let index = HeavyAtomIndex::build(system);
        let positions = sequence_positions(system);
        let mut energy = 0.0;
        for (i, query) in index.positions.iter().enumerate() {
            for (j, dist) in index.within(query, self.clash_distance) {
                if j <= i
                    || !residues_in_contact_range(index.owners[i], index.owners[j], &positions)
                {
                    continue;
                }
                energy += harmonic_wall(dist, self.clash_distance, self.clash_weight);
            }
        }
        energy
    }

    pub fn score(&self, system: &MolecularSystem) -> EnergyTerm {
        EnergyTerm::new(
            self.environment_energy(system),
            self.clash_energy(system),
            0.0,
        )
    }
}
