use crate::core::models::residue::AminoAcid;
use phf::{Map, Set, phf_map, phf_set};

static BACKBONE_ATOM_NAMES: Set<&'static str> = phf_set! {
    "N", "H", "HN", "CA", "HA", "C", "O", "OXT", "H1", "H2", "H3",
    "1H", "2H", "3H", "HA2", "HA3", "1HA", "2HA", "OT1", "OT2",
};

static RESIDUE_NAME_CODES: Map<&'static str, AminoAcid> = phf_map! {
    "ALA" => AminoAcid::Alanine,
    "ARG" => AminoAcid::Arginine,
    "ASN" => AminoAcid::Asparagine,
    "ASP" => AminoAcid::AsparticAcid,
    "CYS" => AminoAcid::Cysteine,
    "CYX" => AminoAcid::Cysteine,
    "CYD" => AminoAcid::Cysteine,
    "GLN" => AminoAcid::Glutamine,
    "GLU" => AminoAcid::GlutamicAcid,
    "GLY" => AminoAcid::Glycine,
    "HIS" => AminoAcid::Histidine,
    "HSD" => AminoAcid::Histidine,
    "HSE" => AminoAcid::Histidine,
    "HSP" => AminoAcid::Histidine,
    "HID" => AminoAcid::Histidine,
    "HIE" => AminoAcid::Histidine,
    "HIP" => AminoAcid::Histidine,
    "ILE" => AminoAcid::Isoleucine,
    "LEU" => AminoAcid::Leucine,
    "LYS" => AminoAcid::Lysine,
    "MET" => AminoAcid::Methionine,
    "PHE" => AminoAcid::Phenylalanine,
    "PRO" => AminoAcid::Proline,
    "SER" => AminoAcid::Serine,
    "THR" => AminoAcid::Threonine,
    "TRP" => AminoAcid::Tryptophan,
    "TYR" => AminoAcid::Tyrosine,
    "VAL" => AminoAcid::Valine,
};

pub fn is_backbone_atom(atom_name: &str) -> bool {
    BACKBONE_ATOM_NAMES.contains(atom_name.trim())
}

/// Maps a PDB residue name, including common protonation-state aliases
/// (`HSD`, `HIP`, `CYX`, ...), to its canonical amino acid.
pub fn amino_acid_from_residue_name(name: &str) -> Option<AminoAcid> {
    RESIDUE_NAME_CODES
        .get(name.trim().to_ascii_uppercase().as_str())
        .copied()
}
