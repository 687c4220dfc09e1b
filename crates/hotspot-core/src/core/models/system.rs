use super::atom::{Atom, AtomRole};
use super::chain::Chain;
use super::ids::{AtomId, ChainId, ResidueId};
use super::residue::{AminoAcid, Residue};
use crate::core::utils::geometry::calculate_cb_position;
use crate::core::utils::identifiers::is_backbone_atom;
use nalgebra::Point3;
use slotmap::SlotMap;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

const CYSTEINE_SULFUR_GAMMA_ATOM_NAME: &str = "SG";
const DISULFIDE_MAX_SG_DISTANCE: f64 = 2.5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("Residue {label} is missing backbone atom '{atom}'")]
    MissingBackboneAtom { label: String, atom: &'static str },
    #[error("Residue handle does not belong to this system")]
    UnknownResidue,
}

/// Represents a complete molecular system with atoms, residues and chains.
///
/// Residues have two identities: their source numbering (chain, number,
/// insertion code) and their 1-based *pose index*, which counts residues in
/// chain order and then residue order within each chain. Selectors and the
/// design loop address residues by pose index; reports use source labels.
#[derive(Debug, Clone, Default)]
pub struct MolecularSystem {
    /// Primary storage for atoms using a slot map for efficient ID management.
    atoms: SlotMap<AtomId, Atom>,
    /// Primary storage for residues using a slot map for efficient ID management.
    residues: SlotMap<ResidueId, Residue>,
    /// Primary storage for chains using a slot map for efficient ID management.
    chains: SlotMap<ChainId, Chain>,
    /// Chains in the order they were first seen.
    chain_order: Vec<ChainId>,
    /// Lookup map for finding residues by chain, residue number and insertion code.
    residue_id_map: HashMap<(ChainId, isize, Option<char>), ResidueId>,
    /// Lookup map for finding chains by their single-character identifier.
    chain_id_map: HashMap<char, ChainId>,
}

impl MolecularSystem {
    /// Creates a new, empty molecular system.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn atom(&self, id: AtomId) -> Option<&Atom> {
        self.atoms.get(id)
    }

    pub fn atom_mut(&mut self, id: AtomId) -> Option<&mut Atom> {
        self.atoms.get_mut(id)
    }

    pub fn atoms_iter(&self) -> impl Iterator<Item = (AtomId, &Atom)> {
        self.atoms.iter()
    }

    pub fn atoms_iter_mut(&mut self) -> impl Iterator<Item = (AtomId, &mut Atom)> {
        self.atoms.iter_mut()
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn residue(&self, id: ResidueId) -> Option<&Residue> {
        self.residues.get(id)
    }

    pub fn residue_mut(&mut self, id: ResidueId) -> Option<&mut Residue> {
        self.residues.get_mut(id)
    }

    pub fn chain(&self, id: ChainId) -> Option<&Chain> {
        self.chains.get(id)
    }

    /// Returns chains in file order.
    pub fn chains_in_order(&self) -> impl Iterator<Item = (ChainId, &Chain)> {
        self.chain_order
            .iter()
            .filter_map(|&id| self.chains.get(id).map(|chain| (id, chain)))
    }

    pub fn find_chain_by_id(&self, id: char) -> Option<ChainId> {
        self.chain_id_map.get(&id).copied()
    }

    /// Finds a residue by its source numbering.
    pub fn find_residue(
        &self,
        chain_id: ChainId,
        residue_number: isize,
        insertion_code: Option<char>,
    ) -> Option<ResidueId> {
        self.residue_id_map
            .get(&(chain_id, residue_number, insertion_code))
            .copied()
    }

    /// Adds a new chain to the system or returns the existing one.
    ///
    /// This method is idempotent; if a chain with the given ID already exists,
    /// it returns the existing chain ID without creating a duplicate.
    pub fn add_chain(&mut self, id: char) -> ChainId {
        if let Some(&existing) = self.chain_id_map.get(&id) {
            return existing;
        }
        let chain_id = self.chains.insert(Chain::new(id));
        self.chain_id_map.insert(id, chain_id);
        self.chain_order.push(chain_id);
        chain_id
    }

    /// Adds a new residue to a chain or returns the existing one with the same
    /// numbering.
    ///
    /// # Return
    ///
    /// Returns `None` if the chain does not exist.
    pub fn add_residue(
        &mut self,
        chain_id: ChainId,
        residue_number: isize,
        insertion_code: Option<char>,
        name: &str,
    ) -> Option<ResidueId> {
        let chain = self.chains.get_mut(chain_id)?;
        let key = (chain_id, residue_number, insertion_code);

        let residue_id = *self.residue_id_map.entry(key).or_insert_with(|| {
            let residue = Residue::new(residue_number, insertion_code, name, chain_id);
            self.residues.insert(residue)
        });

        if !chain.residues.contains(&residue_id) {
            chain.residues.push(residue_id);
        }

        Some(residue_id)
    }

    /// Adds an atom to a specific residue.
    ///
    /// Atoms of amino-acid residues are classified as backbone or side chain
    /// from their name; atoms of any other residue are hetero atoms.
    ///
    /// # Return
    ///
    /// Returns `None` if the residue does not exist.
    pub fn add_atom_to_residue(
        &mut self,
        residue_id: ResidueId,
        mut atom: Atom,
    ) -> Option<AtomId> {
        let residue = self.residues.get_mut(residue_id)?;
        atom.residue_id = residue_id;
        atom.role = match residue.amino_acid {
            Some(_) if is_backbone_atom(&atom.name) => AtomRole::Backbone,
            Some(_) => AtomRole::Sidechain,
            None => AtomRole::Hetero,
        };
        let name = atom.name.clone();
        let atom_id = self.atoms.insert(atom);
        residue.add_atom(&name, atom_id);
        Some(atom_id)
    }

    /// Removes an atom from the system and from its parent residue.
    pub fn remove_atom(&mut self, atom_id: AtomId) -> Option<Atom> {
        let atom = self.atoms.remove(atom_id)?;
        if let Some(residue) = self.residues.get_mut(atom.residue_id) {
            residue.remove_atom(&atom.name, atom_id);
        }
        Some(atom)
    }

    /// Residue handles in pose order (chain order, then residue order).
    pub fn residue_ids_in_order(&self) -> Vec<ResidueId> {
        self.chains_in_order()
            .flat_map(|(_, chain)| chain.residues.iter().copied())
            .collect()
    }

    /// Number of residues, the largest valid pose index.
    pub fn total_residue(&self) -> usize {
        self.residues.len()
    }

    /// Resolves a 1-based pose index to a residue handle.
    pub fn residue_at(&self, pose_index: usize) -> Option<ResidueId> {
        if pose_index == 0 {
            return None;
        }
        self.chains_in_order()
            .flat_map(|(_, chain)| chain.residues.iter().copied())
            .nth(pose_index - 1)
    }

    /// One-letter sequence in pose order; non-amino-acid residues read `X`.
    pub fn sequence(&self) -> String {
        self.chains_in_order()
            .flat_map(|(_, chain)| chain.residues.iter())
            .filter_map(|&id| self.residues.get(id))
            .map(Residue::one_letter_code)
            .collect()
    }

    /// Source-numbering label of the residue at a pose index.
    pub fn pdb_label(&self, pose_index: usize) -> Option<String> {
        self.residue_at(pose_index)
            .and_then(|id| self.residues.get(id))
            .map(Residue::label)
    }

    fn atom_position_by_name(&self, residue: &Residue, name: &str) -> Option<Point3<f64>> {
        residue
            .get_atom_id_by_name(name)
            .and_then(|id| self.atoms.get(id))
            .map(|atom| atom.position)
    }

    /// Position representing a residue in neighbourhood calculations: CB,
    /// CA for glycine, and the first heavy atom for anything else.
    pub fn neighbor_atom_position(&self, residue_id: ResidueId) -> Option<Point3<f64>> {
        let residue = self.residues.get(residue_id)?;
        let preferred = match residue.amino_acid {
            Some(AminoAcid::Glycine) => self.atom_position_by_name(residue, "CA"),
            Some(_) => self
                .atom_position_by_name(residue, "CB")
                .or_else(|| self.atom_position_by_name(residue, "CA")),
            None => None,
        };
        preferred.or_else(|| {
            residue
                .atoms()
                .iter()
                .filter_map(|&id| self.atoms.get(id))
                .find(|atom| atom.is_heavy())
                .map(|atom| atom.position)
        })
    }

    /// Changes the identity of an amino-acid residue, keeping its backbone.
    ///
    /// Side-chain atoms beyond CB are removed. Mutating to glycine removes CB;
    /// mutating away from glycine places an ideal CB on the backbone.
    pub fn mutate_residue(
        &mut self,
        residue_id: ResidueId,
        new_type: AminoAcid,
    ) -> Result<(), ModelError> {
        let residue = self
            .residues
            .get(residue_id)
            .ok_or(ModelError::UnknownResidue)?;
        if residue.amino_acid == Some(new_type) {
            return Ok(());
        }

        let to_remove: Vec<AtomId> = residue
            .atoms()
            .iter()
            .copied()
            .filter(|&id| {
                self.atoms.get(id).is_some_and(|atom| {
                    atom.role == AtomRole::Sidechain
                        && (atom.name != "CB" || new_type == AminoAcid::Glycine)
                })
            })
            .collect();

        let needs_cb =
            new_type != AminoAcid::Glycine && residue.get_atom_id_by_name("CB").is_none();
        let cb_position = if needs_cb {
            let backbone = |name: &'static str| {
                self.atom_position_by_name(residue, name)
                    .ok_or_else(|| ModelError::MissingBackboneAtom {
                        label: residue.label(),
                        atom: name,
                    })
            };
            Some(calculate_cb_position(
                &backbone("N")?,
                &backbone("CA")?,
                &backbone("C")?,
            ))
        } else {
            None
        };

        for atom_id in to_remove {
            self.remove_atom(atom_id);
        }

        if let Some(position) = cb_position {
            let mut cb = Atom::new("CB", residue_id, position);
            cb.element = "C".to_string();
            let residue = self
                .residues
                .get_mut(residue_id)
                .ok_or(ModelError::UnknownResidue)?;
            residue.amino_acid = Some(new_type);
            self.add_atom_to_residue(residue_id, cb);
        }

        let residue = self
            .residues
            .get_mut(residue_id)
            .ok_or(ModelError::UnknownResidue)?;
        residue.name = new_type.three_letter().to_string();
        residue.amino_acid = Some(new_type);
        Ok(())
    }

    /// Detects cysteines whose SG atoms lie within disulfide bonding distance
    /// of another cysteine's SG.
    pub fn find_disulfide_bonded_residues(&self) -> HashSet<ResidueId> {
        let sulfur_atoms: Vec<(ResidueId, Point3<f64>)> = self
            .residues
            .iter()
            .filter(|(_, residue)| residue.amino_acid == Some(AminoAcid::Cysteine))
            .filter_map(|(id, residue)| {
                self.atom_position_by_name(residue, CYSTEINE_SULFUR_GAMMA_ATOM_NAME)
                    .map(|pos| (id, pos))
            })
            .collect();

        let mut bonded = HashSet::new();
        for (i, (res_a, pos_a)) in sulfur_atoms.iter().enumerate() {
            for (res_b, pos_b) in &sulfur_atoms[i + 1..] {
                if (pos_a - pos_b).norm() <= DISULFIDE_MAX_SG_DISTANCE {
                    bonded.insert(*res_a);
                    bonded.insert(*res_b);
                }
            }
        }
        bonded
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::linear_system;
    use super::*;

    #[test]
    fn system_creation_and_pose_order() {
        let system = linear_system("AKT");
        assert_eq!(system.total_residue(), 3);
        assert_eq!(system.sequence(), "AKT");
        assert_eq!(system.pdb_label(3).as_deref(), Some("3"));
        assert!(system.residue_at(0).is_none());
        assert!(system.residue_at(4).is_none());
    }

    #[test]
    fn add_chain_and_residue_are_idempotent() {
        let mut system = MolecularSystem::new();
        let a = system.add_chain('A');
        assert_eq!(system.add_chain('A'), a);
        let r1 = system.add_residue(a, 5, None, "ALA").unwrap();
        let r2 = system.add_residue(a, 5, None, "ALA").unwrap();
        assert_eq!(r1, r2);
        assert_eq!(system.chain(a).unwrap().residues().len(), 1);

        let inserted = system.add_residue(a, 5, Some('A'), "GLY").unwrap();
        assert_ne!(inserted, r1);
        assert_eq!(system.find_residue(a, 5, Some('A')), Some(inserted));
    }

    #[test]
    fn pose_order_follows_chain_order() {
        let mut system = MolecularSystem::new();
        let b = system.add_chain('B');
        let a = system.add_chain('A');
        system.add_residue(b, 10, None, "TRP").unwrap();
        system.add_residue(a, 1, None, "GLY").unwrap();
        assert_eq!(system.sequence(), "WG");
        assert_eq!(system.pdb_label(1).as_deref(), Some("10"));
        assert_eq!(system.pdb_label(2).as_deref(), Some("1"));
    }

    #[test]
    fn atoms_are_classified_by_residue_and_name() {
        let mut system = MolecularSystem::new();
        let a = system.add_chain('A');
        let ser = system.add_residue(a, 1, None, "SER").unwrap();
        let hoh = system.add_residue(a, 2, None, "HOH").unwrap();
        let ca = system
            .add_atom_to_residue(ser, Atom::new("CA", ser, Point3::origin()))
            .unwrap();
        let og = system
            .add_atom_to_residue(ser, Atom::new("OG", ser, Point3::origin()))
            .unwrap();
        let o = system
            .add_atom_to_residue(hoh, Atom::new("O", hoh, Point3::origin()))
            .unwrap();
        assert_eq!(system.atom(ca).unwrap().role, AtomRole::Backbone);
        assert_eq!(system.atom(og).unwrap().role, AtomRole::Sidechain);
        assert_eq!(system.atom(o).unwrap().role, AtomRole::Hetero);
        assert_eq!(system.sequence(), "SX");
    }

    #[test]
    fn mutate_residue_trims_side_chain_and_renames() {
        let mut system = linear_system("AKT");
        let lys = system.residue_at(2).unwrap();
        system.mutate_residue(lys, AminoAcid::Valine).unwrap();

        let residue = system.residue(lys).unwrap();
        assert_eq!(residue.name, "VAL");
        assert_eq!(system.sequence(), "AVT");
        assert!(residue.get_atom_id_by_name("CB").is_some());
        assert!(residue.get_atom_id_by_name("CG").is_none());
        assert_eq!(residue.atoms().len(), 5);
    }

    #[test]
    fn mutate_to_glycine_removes_cb_and_back_places_ideal_cb() {
        let mut system = linear_system("A");
        let ala = system.residue_at(1).unwrap();

        system.mutate_residue(ala, AminoAcid::Glycine).unwrap();
        assert!(system.residue(ala).unwrap().get_atom_id_by_name("CB").is_none());
        assert_eq!(system.residue(ala).unwrap().atoms().len(), 4);

        system.mutate_residue(ala, AminoAcid::Leucine).unwrap();
        let residue = system.residue(ala).unwrap();
        let cb_id = residue.get_atom_id_by_name("CB").unwrap();
        let ca_id = residue.get_atom_id_by_name("CA").unwrap();
        let ca_cb = (system.atom(cb_id).unwrap().position - system.atom(ca_id).unwrap().position)
            .norm();
        assert!((ca_cb - 1.52).abs() < 0.05);
        assert_eq!(system.atom(cb_id).unwrap().role, AtomRole::Sidechain);
    }

    #[test]
    fn mutate_from_glycine_without_backbone_fails() {
        let mut system = MolecularSystem::new();
        let a = system.add_chain('A');
        let gly = system.add_residue(a, 7, None, "GLY").unwrap();
        system.add_atom_to_residue(gly, Atom::new("CA", gly, Point3::origin()));

        let err = system.mutate_residue(gly, AminoAcid::Alanine).unwrap_err();
        assert_eq!(
            err,
            ModelError::MissingBackboneAtom {
                label: "7".to_string(),
                atom: "N"
            }
        );
        assert_eq!(system.sequence(), "G");
    }

    #[test]
    fn neighbor_atom_prefers_cb_then_ca() {
        let system = linear_system("GA");
        let gly = system.residue_at(1).unwrap();
        let ala = system.residue_at(2).unwrap();
        assert_eq!(
            system.neighbor_atom_position(gly),
            Some(Point3::new(0.0, 0.0, 0.0))
        );
        let cb = system.neighbor_atom_position(ala).unwrap();
        assert!((cb.z + 1.21).abs() < 1e-9);
    }

    #[test]
    fn disulfides_are_detected_by_sulfur_distance() {
        let mut system = MolecularSystem::new();
        let a = system.add_chain('A');
        let cys1 = system.add_residue(a, 1, None, "CYS").unwrap();
        let cys2 = system.add_residue(a, 2, None, "CYS").unwrap();
        let cys3 = system.add_residue(a, 3, None, "CYS").unwrap();
        system.add_atom_to_residue(cys1, Atom::new("SG", cys1, Point3::new(0.0, 0.0, 0.0)));
        system.add_atom_to_residue(cys2, Atom::new("SG", cys2, Point3::new(2.05, 0.0, 0.0)));
        system.add_atom_to_residue(cys3, Atom::new("SG", cys3, Point3::new(20.0, 0.0, 0.0)));

        let bonded = system.find_disulfide_bonded_residues();
        assert_eq!(bonded.len(), 2);
        assert!(bonded.contains(&cys1));
        assert!(bonded.contains(&cys2));
        assert!(!bonded.contains(&cys3));
    }
}
