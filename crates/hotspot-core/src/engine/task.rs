use super::error::EngineError;
use super::selection::ResidueSelector;
use crate::core::models::system::MolecularSystem;

/// What the packer may do with a residue. Ordered from most to least
/// restrictive, so restricting is taking the minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResidueBehavior {
    /// Neither identity nor conformation may change.
    Fixed,
    /// Conformation may change, identity may not.
    Repack,
    /// Identity may change.
    Design,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResidueTask {
    pub behavior: ResidueBehavior,
    /// Keep the current identity among the candidates.
    pub include_current: bool,
}

impl ResidueTask {
    fn restrict(&mut self, limit: ResidueBehavior) {
        self.behavior = self.behavior.min(limit);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BehaviorCounts {
    pub design: usize,
    pub repack: usize,
    pub fixed: usize,
}

/// Per-residue packing instructions, indexed by pose index.
#[derive(Debug, Clone, PartialEq)]
pub struct PackerTask {
    residues: Vec<ResidueTask>,
}

impl PackerTask {
    /// Every residue designable, nothing else decided yet.
    fn unrestricted(total: usize) -> Self {
        Self {
            residues: vec![
                ResidueTask {
                    behavior: ResidueBehavior::Design,
                    include_current: false,
                };
                total
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.residues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }

    /// Task of the residue at a 1-based pose index.
    pub fn residue(&self, pose_index: usize) -> Option<&ResidueTask> {
        pose_index
            .checked_sub(1)
            .and_then(|i| self.residues.get(i))
    }

    pub fn behavior(&self, pose_index: usize) -> Option<ResidueBehavior> {
        self.residue(pose_index).map(|task| task.behavior)
    }

    /// Pose indices with the given behaviour, ascending.
    pub fn positions_with(&self, behavior: ResidueBehavior) -> Vec<usize> {
        self.residues
            .iter()
            .enumerate()
            .filter(|(_, task)| task.behavior == behavior)
            .map(|(i, _)| i + 1)
            .collect()
    }

    pub fn counts(&self) -> BehaviorCounts {
        let mut counts = BehaviorCounts::default();
        for task in &self.residues {
            match task.behavior {
                ResidueBehavior::Design => counts.design += 1,
                ResidueBehavior::Repack => counts.repack += 1,
                ResidueBehavior::Fixed => counts.fixed += 1,
            }
        }
        counts
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TaskOperation {
    /// Restricts every residue that is not an amino acid to `Fixed`.
    InitializeFromDefaults,
    IncludeCurrent,
    NoRepackDisulfides,
    /// Restricts the selected residues (or, with `flip`, all others) to
    /// repacking.
    RestrictToRepacking {
        selector: ResidueSelector,
        flip: bool,
    },
    /// Fixes the selected residues (or, with `flip`, all others).
    PreventRepacking {
        selector: ResidueSelector,
        flip: bool,
    },
}

impl TaskOperation {
    fn apply(&self, system: &MolecularSystem, task: &mut PackerTask) -> Result<(), EngineError> {
        match self {
            TaskOperation::InitializeFromDefaults => {
                let order = system.residue_ids_in_order();
                for (slot, id) in task.residues.iter_mut().zip(order) {
                    let is_amino_acid = system
                        .residue(id)
                        .is_some_and(|residue| residue.amino_acid.is_some());
                    if !is_amino_acid {
                        slot.restrict(ResidueBehavior::Fixed);
                    }
                }
            }
            TaskOperation::IncludeCurrent => {
                for slot in &mut task.residues {
                    slot.include_current = true;
                }
            }
            TaskOperation::NoRepackDisulfides => {
                let bonded = system.find_disulfide_bonded_residues();
                let order = system.residue_ids_in_order();
                for (slot, id) in task.residues.iter_mut().zip(order) {
                    if bonded.contains(&id) {
                        slot.restrict(ResidueBehavior::Fixed);
                    }
                }
            }
            TaskOperation::RestrictToRepacking { selector, flip } => {
                restrict_subset(system, task, selector, *flip, ResidueBehavior::Repack)?;
            }
            TaskOperation::PreventRepacking { selector, flip } => {
                restrict_subset(system, task, selector, *flip, ResidueBehavior::Fixed)?;
            }
        }
        Ok(())
    }
}

fn restrict_subset(
    system: &MolecularSystem,
    task: &mut PackerTask,
    selector: &ResidueSelector,
    flip: bool,
    limit: ResidueBehavior,
) -> Result<(), EngineError> {
    let mask = selector.apply(system)?;
    for (slot, selected) in task.residues.iter_mut().zip(mask) {
        if selected != flip {
            slot.restrict(limit);
        }
    }
    Ok(())
}

/// Ordered list of task operations turned into a fresh [`PackerTask`] for a
/// given structure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskFactory {
    operations: Vec<TaskOperation>,
}

impl TaskFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_back(&mut self, operation: TaskOperation) -> &mut Self {
        self.operations.push(operation);
        self
    }

    pub fn operations(&self) -> &[TaskOperation] {
        &self.operations
    }

    pub fn create_task(&self, system: &MolecularSystem) -> Result<PackerTask, EngineError> {
        let mut task = PackerTask::unrestricted(system.total_residue());
        for operation in &self.operations {
            operation.apply(system, &mut task)?;
        }
        Ok(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use crate::core::models::system::test_support::linear_system;
    use nalgebra::Point3;

    #[test]
    fn unrestricted_task_designs_everything() {
        let system = linear_system("AKT");
        let task = TaskFactory::new().create_task(&system).unwrap();
        assert_eq!(task.len(), 3);
        assert_eq!(task.positions_with(ResidueBehavior::Design), vec![1, 2, 3]);
        assert!(!task.residue(1).unwrap().include_current);
        assert!(task.residue(0).is_none());
    }

    #[test]
    fn defaults_fix_non_amino_acid_residues() {
        let mut system = linear_system("AK");
        let chain = system.find_chain_by_id('A').unwrap();
        let water = system.add_residue(chain, 100, None, "HOH").unwrap();
        system.add_atom_to_residue(water, Atom::new("O", water, Point3::new(50.0, 0.0, 0.0)));

        let mut factory = TaskFactory::new();
        factory
            .push_back(TaskOperation::InitializeFromDefaults)
            .push_back(TaskOperation::IncludeCurrent);
        let task = factory.create_task(&system).unwrap();
        assert_eq!(task.behavior(3), Some(ResidueBehavior::Fixed));
        assert_eq!(task.behavior(1), Some(ResidueBehavior::Design));
        assert!(task.residue(2).unwrap().include_current);
    }

    #[test]
    fn restrictions_never_loosen() {
        let system = linear_system("AKTLE");
        let mut factory = TaskFactory::new();
        factory
            .push_back(TaskOperation::PreventRepacking {
                selector: ResidueSelector::index([2]),
                flip: false,
            })
            .push_back(TaskOperation::RestrictToRepacking {
                selector: ResidueSelector::index([2, 3]),
                flip: false,
            });
        let task = factory.create_task(&system).unwrap();
        assert_eq!(task.behavior(2), Some(ResidueBehavior::Fixed));
        assert_eq!(task.behavior(3), Some(ResidueBehavior::Repack));
        assert_eq!(
            task.counts(),
            BehaviorCounts {
                design: 3,
                repack: 1,
                fixed: 1
            }
        );
    }

    #[test]
    fn flip_applies_operation_outside_selection() {
        let system = linear_system("AKTLE");
        let mut factory = TaskFactory::new();
        factory.push_back(TaskOperation::RestrictToRepacking {
            selector: ResidueSelector::index([3]),
            flip: true,
        });
        let task = factory.create_task(&system).unwrap();
        assert_eq!(task.positions_with(ResidueBehavior::Design), vec![3]);
        assert_eq!(
            task.positions_with(ResidueBehavior::Repack),
            vec![1, 2, 4, 5]
        );
    }

    #[test]
    fn disulfide_cysteines_are_fixed() {
        let mut system = linear_system("CAC");
        let first = system.residue_at(1).unwrap();
        let third = system.residue_at(3).unwrap();
        system.add_atom_to_residue(first, Atom::new("SG", first, Point3::new(0.0, 0.0, 5.0)));
        system.add_atom_to_residue(third, Atom::new("SG", third, Point3::new(2.0, 0.0, 5.0)));

        let mut factory = TaskFactory::new();
        factory.push_back(TaskOperation::NoRepackDisulfides);
        let task = factory.create_task(&system).unwrap();
        assert_eq!(task.positions_with(ResidueBehavior::Fixed), vec![1, 3]);
        assert_eq!(task.behavior(2), Some(ResidueBehavior::Design));
    }
}
