use super::error::EngineError;
use crate::core::models::system::MolecularSystem;

/// Rule computing a subset of residues, as a mask over pose indices
/// (`mask[i]` is residue `i + 1`).
#[derive(Debug, Clone, PartialEq)]
pub enum ResidueSelector {
    /// Explicit 1-based pose indices.
    Index(Vec<usize>),
    /// Residues whose neighbour atom lies within `radius` of the neighbour
    /// atom of any focus residue.
    Neighborhood {
        focus: Box<ResidueSelector>,
        radius: f64,
        include_focus: bool,
    },
}

impl ResidueSelector {
    pub fn index(indices: impl IntoIterator<Item = usize>) -> Self {
        ResidueSelector::Index(indices.into_iter().collect())
    }

    pub fn neighborhood(focus: ResidueSelector, radius: f64, include_focus: bool) -> Self {
        ResidueSelector::Neighborhood {
            focus: Box::new(focus),
            radius,
            include_focus,
        }
    }

    pub fn apply(&self, system: &MolecularSystem) -> Result<Vec<bool>, EngineError> {
        let total = system.total_residue();
        match self {
            ResidueSelector::Index(indices) => {
                let mut mask = vec![false; total];
                for &index in indices {
                    if index == 0 || index > total {
                        return Err(EngineError::ResidueIndexOutOfRange { index, total });
                    }
                    mask[index - 1] = true;
                }
                Ok(mask)
            }
            ResidueSelector::Neighborhood {
                focus,
                radius,
                include_focus,
            } => {
                let focus_mask = focus.apply(system)?;
                let order = system.residue_ids_in_order();
                let centers: Vec<_> = order
                    .iter()
                    .map(|&id| system.neighbor_atom_position(id))
                    .collect();
                let focus_centers: Vec<_> = centers
                    .iter()
                    .zip(&focus_mask)
                    .filter(|&(_, &selected)| selected)
                    .filter_map(|(center, _)| *center)
                    .collect();

                let mask = centers
                    .iter()
                    .zip(&focus_mask)
                    .map(|(center, &is_focus)| {
                        if is_focus {
                            return *include_focus;
                        }
                        center.is_some_and(|c| {
                            focus_centers.iter().any(|f| (c - f).norm() <= *radius)
                        })
                    })
                    .collect();
                Ok(mask)
            }
        }
    }
}
