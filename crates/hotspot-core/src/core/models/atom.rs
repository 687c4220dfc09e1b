use super::ids::ResidueId;
use nalgebra::Point3;
use std::str::FromStr;

/// Represents the role or classification of an atom within a molecular structure.
///
/// The role decides which degrees of freedom a minimizer may move and which
/// atoms survive an identity change of their residue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum AtomRole {
    /// Main-chain atom of an amino acid (N, CA, C, O, OXT and their hydrogens).
    Backbone,
    /// Side-chain atom of an amino acid.
    Sidechain,
    /// Atom of a non-amino-acid residue (ligand, water, ion).
    #[default]
    Hetero,
}

/// Represents an atom in a molecular structure with its coordinates and the
/// bookkeeping needed to write it back to a PDB file.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// Serial number as read from the source file (renumbered on write).
    pub serial: usize,
    /// The name of the atom (e.g., "CA", "N", "OG1").
    pub name: String,
    /// The ID of the parent residue this atom belongs to.
    pub residue_id: ResidueId,
    /// The role or classification of the atom in the molecular structure.
    pub role: AtomRole,
    /// Element symbol, upper case (e.g., "C", "FE").
    pub element: String,
    /// The 3D coordinates of the atom in Angstroms.
    pub position: Point3<f64>,
    pub occupancy: f64,
    pub b_factor: f64,
}

impl Atom {
    /// Creates a new `Atom` with default bookkeeping fields.
    ///
    /// The element is guessed from the atom name; callers that know better
    /// (the PDB reader, for instance) overwrite it.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the atom.
    /// * `residue_id` - The ID of the residue this atom belongs to.
    /// * `position` - The 3D coordinates of the atom.
    pub fn new(name: &str, residue_id: ResidueId, position: Point3<f64>) -> Self {
        Self {
            serial: 0,
            name: name.to_string(),
            residue_id,
            role: AtomRole::default(),
            element: guess_element(name),
            position,
            occupancy: 1.0,
            b_factor: 0.0,
        }
    }

    #[inline]
    pub fn is_hydrogen(&self) -> bool {
        self.element == "H" || self.element == "D"
    }

    #[inline]
    pub fn is_heavy(&self) -> bool {
        !self.is_hydrogen()
    }
}

/// Guesses an element symbol from a PDB atom name.
///
/// Leading digits are skipped ("1HB" is a hydrogen), and the first letter is
/// taken as the element, which is right for every atom of the canonical
/// amino acids.
pub fn guess_element(atom_name: &str) -> String {
    atom_name
        .trim()
        .chars()
        .find(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase().to_string())
        .unwrap_or_default()
}

impl FromStr for AtomRole {
    type Err = ();

    /// Parses a string into an `AtomRole`, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "backbone" => Ok(AtomRole::Backbone),
            "sidechain" | "side-chain" | "side_chain" => Ok(AtomRole::Sidechain),
            "hetero" | "hetatm" | "ligand" => Ok(AtomRole::Hetero),
            _ => Err(()),
        }
    }
}
