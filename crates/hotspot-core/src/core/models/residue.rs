use super::ids::{AtomId, ChainId};
use crate::core::utils::identifiers::amino_acid_from_residue_name;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One of the twenty canonical amino acids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AminoAcid {
    Alanine,
    Arginine,
    Asparagine,
    AsparticAcid,
    Cysteine,
    Glutamine,
    GlutamicAcid,
    Glycine,
    Histidine,
    Isoleucine,
    Leucine,
    Lysine,
    Methionine,
    Phenylalanine,
    Proline,
    Serine,
    Threonine,
    Tryptophan,
    Tyrosine,
    Valine,
}

impl AminoAcid {
    /// All canonical amino acids, in alphabetical order of their full names.
    pub const ALL: [AminoAcid; 20] = [
        AminoAcid::Alanine,
        AminoAcid::Arginine,
        AminoAcid::Asparagine,
        AminoAcid::AsparticAcid,
        AminoAcid::Cysteine,
        AminoAcid::Glutamine,
        AminoAcid::GlutamicAcid,
        AminoAcid::Glycine,
        AminoAcid::Histidine,
        AminoAcid::Isoleucine,
        AminoAcid::Leucine,
        AminoAcid::Lysine,
        AminoAcid::Methionine,
        AminoAcid::Phenylalanine,
        AminoAcid::Proline,
        AminoAcid::Serine,
        AminoAcid::Threonine,
        AminoAcid::Tryptophan,
        AminoAcid::Tyrosine,
        AminoAcid::Valine,
    ];

    pub fn one_letter(self) -> char {
        match self {
            AminoAcid::Alanine => 'A',
            AminoAcid::Arginine => 'R',
            AminoAcid::Asparagine => 'N',
            AminoAcid::AsparticAcid => 'D',
            AminoAcid::Cysteine => 'C',
            AminoAcid::Glutamine => 'Q',
            AminoAcid::GlutamicAcid => 'E',
            AminoAcid::Glycine => 'G',
            AminoAcid::Histidine => 'H',
            AminoAcid::Isoleucine => 'I',
            AminoAcid::Leucine => 'L',
            AminoAcid::Lysine => 'K',
            AminoAcid::Methionine => 'M',
            AminoAcid::Phenylalanine => 'F',
            AminoAcid::Proline => 'P',
            AminoAcid::Serine => 'S',
            AminoAcid::Threonine => 'T',
            AminoAcid::Tryptophan => 'W',
            AminoAcid::Tyrosine => 'Y',
            AminoAcid::Valine => 'V',
        }
    }

    pub fn three_letter(self) -> &'static str {
        match self {
            AminoAcid::Alanine => "ALA",
            AminoAcid::Arginine => "ARG",
            AminoAcid::Asparagine => "ASN",
            AminoAcid::AsparticAcid => "ASP",
            AminoAcid::Cysteine => "CYS",
            AminoAcid::Glutamine => "GLN",
            AminoAcid::GlutamicAcid => "GLU",
            AminoAcid::Glycine => "GLY",
            AminoAcid::Histidine => "HIS",
            AminoAcid::Isoleucine => "ILE",
            AminoAcid::Leucine => "LEU",
            AminoAcid::Lysine => "LYS",
            AminoAcid::Methionine => "MET",
            AminoAcid::Phenylalanine => "PHE",
            AminoAcid::Proline => "PRO",
            AminoAcid::Serine => "SER",
            AminoAcid::Threonine => "THR",
            AminoAcid::Tryptophan => "TRP",
            AminoAcid::Tyrosine => "TYR",
            AminoAcid::Valine => "VAL",
        }
    }

    pub fn from_one_letter(code: char) -> Option<Self> {
        let code = code.to_ascii_uppercase();
        Self::ALL.into_iter().find(|aa| aa.one_letter() == code)
    }

    /// Kyte-Doolittle hydropathy index.
    pub fn hydropathy(self) -> f64 {
        match self {
            AminoAcid::Alanine => 1.8,
            AminoAcid::Arginine => -4.5,
            AminoAcid::Asparagine => -3.5,
            AminoAcid::AsparticAcid => -3.5,
            AminoAcid::Cysteine => 2.5,
            AminoAcid::Glutamine => -3.5,
            AminoAcid::GlutamicAcid => -3.5,
            AminoAcid::Glycine => -0.4,
            AminoAcid::Histidine => -3.2,
            AminoAcid::Isoleucine => 4.5,
            AminoAcid::Leucine => 3.8,
            AminoAcid::Lysine => -3.9,
            AminoAcid::Methionine => 1.9,
            AminoAcid::Phenylalanine => 2.8,
            AminoAcid::Proline => -1.6,
            AminoAcid::Serine => -0.8,
            AminoAcid::Threonine => -0.7,
            AminoAcid::Tryptophan => -0.9,
            AminoAcid::Tyrosine => -1.3,
            AminoAcid::Valine => 4.2,
        }
    }
}

impl fmt::Display for AminoAcid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.three_letter())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unrecognized amino acid name: '{0}'")]
pub struct ParseAminoAcidError(pub String);

impl FromStr for AminoAcid {
    type Err = ParseAminoAcidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        match (chars.next(), chars.next()) {
            (Some(code), None) => AminoAcid::from_one_letter(code),
            _ => amino_acid_from_residue_name(trimmed),
        }
        .ok_or_else(|| ParseAminoAcidError(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Residue {
    pub residue_number: isize,             // Residue sequence number from source file
    pub insertion_code: Option<char>,      // PDB insertion code, if any
    pub name: String,                      // Name of the residue (e.g., "ALA", "HOH")
    pub amino_acid: Option<AminoAcid>,     // Canonical identity, None for hetero residues
    pub chain_id: ChainId,                 // ID of the parent chain
    pub(crate) atoms: Vec<AtomId>,         // Atoms belonging to this residue, in file order
    atom_name_map: HashMap<String, AtomId>, // Map from atom name to its stable ID
}

impl Residue {
    pub(crate) fn new(
        residue_number: isize,
        insertion_code: Option<char>,
        name: &str,
        chain_id: ChainId,
    ) -> Self {
        Self {
            residue_number,
            insertion_code,
            name: name.to_string(),
            amino_acid: amino_acid_from_residue_name(name),
            chain_id,
            atoms: Vec::new(),
            atom_name_map: HashMap::new(),
        }
    }

    pub(crate) fn add_atom(&mut self, atom_name: &str, atom_id: AtomId) {
        self.atoms.push(atom_id);
        self.atom_name_map.insert(atom_name.to_string(), atom_id);
    }

    pub(crate) fn remove_atom(&mut self, atom_name: &str, atom_id: AtomId) {
        self.atoms.retain(|&id| id != atom_id);
        if self.atom_name_map.get(atom_name) == Some(&atom_id) {
            self.atom_name_map.remove(atom_name);
        }
    }

    pub fn atoms(&self) -> &[AtomId] {
        &self.atoms
    }

    pub fn get_atom_id_by_name(&self, name: &str) -> Option<AtomId> {
        self.atom_name_map.get(name).copied()
    }

    /// Source-file numbering label: the residue number followed by the
    /// insertion code when one is present (`52`, `52A`).
    pub fn label(&self) -> String {
        match self.insertion_code {
            Some(code) => format!("{}{}", self.residue_number, code),
            None => self.residue_number.to_string(),
        }
    }

    /// One-letter code, `X` for anything that is not a canonical amino acid.
    pub fn one_letter_code(&self) -> char {
        self.amino_acid.map_or('X', AminoAcid::one_letter)
    }
}
