use super::error::EngineError;
use crate::core::models::mutation::Mutation;
use crate::core::models::system::MolecularSystem;

/// Position-by-position difference between two sequences.
///
/// `label` maps a 1-based pose index to the residue label reported in the
/// mutation. Sequences of different length cannot be compared.
pub fn diff_sequences(
    reference: &str,
    candidate: &str,
    label: impl Fn(usize) -> String,
) -> Result<Vec<Mutation>, EngineError> {
    let reference: Vec<char> = reference.chars().collect();
    let candidate: Vec<char> = candidate.chars().collect();
    if reference.len() != candidate.len() {
        return Err(EngineError::SequenceMismatch {
            reference: reference.len(),
            candidate: candidate.len(),
        });
    }
    Ok(reference
        .iter()
        .zip(&candidate)
        .enumerate()
        .filter(|(_, (before, after))| before != after)
        .map(|(i, (&before, &after))| Mutation::new(before, label(i + 1), after))
        .collect())
}

/// Mutations turning `reference` into `candidate`, labelled with the
/// reference's source residue numbering.
pub fn diff_structures(
    reference: &MolecularSystem,
    candidate: &MolecularSystem,
) -> Result<Vec<Mutation>, EngineError> {
    diff_sequences(&reference.sequence(), &candidate.sequence(), |pose_index| {
        reference
            .pdb_label(pose_index)
            .unwrap_or_else(|| pose_index.to_string())
    })
}
