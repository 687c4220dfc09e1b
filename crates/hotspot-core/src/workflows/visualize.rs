//! PyMOL script generation for a directory of designed structures.
//!
//! The script loads the reference structure as `clean`, aligns every other
//! structure onto it and shows the mutated residues of each design as sticks.

use crate::core::io::mutation_log::{MutationLog, MutationLogError};
use crate::workflows::design::MUTATION_LOG_FILE;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, instrument, warn};

pub const DEFAULT_SCRIPT_FILE: &str = "align_and_show_all_mutations.pml";
pub const DEFAULT_REFERENCE_MARKER: &str = "clean";

/// Object name the reference structure is loaded under.
const REFERENCE_OBJECT: &str = "clean";

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("No reference structure containing '{marker}' found in {}", dir.display())]
    NoReference { dir: PathBuf, marker: String },
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to read mutation log {}: {source}", path.display())]
    Log {
        path: PathBuf,
        #[source]
        source: MutationLogError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisualizeOptions {
    pub dir: PathBuf,
    /// Relative paths are resolved against `dir`.
    pub log_file: PathBuf,
    /// Relative paths are resolved against `dir`.
    pub output: PathBuf,
    pub reference_marker: String,
}

impl Default for VisualizeOptions {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            log_file: PathBuf::from(MUTATION_LOG_FILE),
            output: PathBuf::from(DEFAULT_SCRIPT_FILE),
            reference_marker: DEFAULT_REFERENCE_MARKER.to_string(),
        }
    }
}

impl VisualizeOptions {
    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.dir.join(path)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct MutationSelection {
    design: String,
    residues: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PymolScript {
    reference: String,
    designs: Vec<(String, String)>,
    selections: Vec<MutationSelection>,
}

/// PyMOL `resi` token for a source residue label: the insertion code is kept
/// and a minus sign is escaped so it is not read as a range.
fn resi_token(label: &str) -> String {
    match label.strip_prefix('-') {
        Some(rest) => format!("\\-{rest}"),
        None => label.to_string(),
    }
}

fn design_name(file_name: &str) -> &str {
    file_name.strip_suffix(".pdb").unwrap_or(file_name)
}

impl PymolScript {
    /// Builds the script from lexically sorted structure file names and the
    /// parsed mutation log.
    pub fn build(
        pdb_files: &[String],
        reference_marker: &str,
        log: &MutationLog,
    ) -> Option<Self> {
        let mut candidates = pdb_files.iter().filter(|f| f.contains(reference_marker));
        let reference = candidates.next()?.clone();
        let extra: Vec<&String> = candidates.collect();
        if !extra.is_empty() {
            warn!(reference = %reference, ignored = ?extra, "Several reference candidates found");
        }

        let designs = pdb_files
            .iter()
            .filter(|f| **f != reference)
            .map(|f| (f.clone(), design_name(f).to_string()))
            .collect();

        let selections = log
            .records()
            .iter()
            .filter(|record| {
                !record.mutations.is_empty()
                    && record.decoy != reference
                    && pdb_files.contains(&record.decoy)
            })
            .map(|record| MutationSelection {
                design: design_name(&record.decoy).to_string(),
                residues: record
                    .mutations
                    .iter()
                    .map(|m| resi_token(&m.label))
                    .collect(),
            })
            .collect();

        Some(Self {
            reference,
            designs,
            selections,
        })
    }

    pub fn commands(&self) -> Vec<String> {
        let mut commands = vec![
            "# Load and align structures".to_string(),
            format!("load {}, {REFERENCE_OBJECT}", self.reference),
            "hide everything, all".to_string(),
            "show cartoon, all".to_string(),
            "set cartoon_transparency, 0.5".to_string(),
        ];
        for (file, name) in &self.designs {
            commands.push(format!("load {file}, {name}"));
            commands.push(format!("align {name}, {REFERENCE_OBJECT}"));
        }

        commands.push(String::new());
        commands.push("# Show mutations".to_string());
        for selection in &self.selections {
            let name = &selection.design;
            commands.push(format!(
                "select mut_{name}, {name} and resi {}",
                selection.residues.join("+")
            ));
            commands.push(format!("show sticks, mut_{name}"));
            commands.push(format!("set cartoon_transparency, 0, mut_{name}"));
        }

        commands.extend(
            [
                "",
                "# Set up view",
                "center clean",
                "zoom all",
                "set ray_shadows, 0",
                "set depth_cue, 0",
            ]
            .map(String::from),
        );
        commands
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }
}

impl fmt::Display for PymolScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.commands().join("\n"))
    }
}

/// File names of the `*.pdb` files directly inside `dir`, sorted.
pub fn discover_structures(dir: &Path) -> Result<Vec<String>, ScriptError> {
    let io_err = |source| ScriptError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        if !entry.file_type().map_err(io_err)?.is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if name.ends_with(".pdb") {
                files.push(name.to_string());
            }
        }
    }
    files.sort();
    Ok(files)
}

/// Writes the alignment script and returns its path.
#[instrument(skip_all, name = "visualize_workflow")]
pub fn run(options: &VisualizeOptions) -> Result<PathBuf, ScriptError> {
    let pdb_files = discover_structures(&options.dir)?;
    let log_path = options.resolve(&options.log_file);
    let log = MutationLog::read_from_path(&log_path).map_err(|source| ScriptError::Log {
        path: log_path.clone(),
        source,
    })?;

    let script = PymolScript::build(&pdb_files, &options.reference_marker, &log).ok_or_else(
        || ScriptError::NoReference {
            dir: options.dir.clone(),
            marker: options.reference_marker.clone(),
        },
    )?;

    let output = options.resolve(&options.output);
    fs::write(&output, script.to_string()).map_err(|source| ScriptError::Io {
        path: output.clone(),
        source,
    })?;
    info!(
        output = %output.display(),
        reference = script.reference(),
        structures = pdb_files.len(),
        "PyMOL script generated"
    );
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn log(text: &str) -> MutationLog {
        MutationLog::read_from(&mut Cursor::new(text)).unwrap()
    }

    fn files(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn selection_keeps_sign_and_insertion_code_of_labels() {
        let script = PymolScript::build(
            &files(&["ref.clean.pdb", "d_0.pdb"]),
            "clean",
            &log("d_0.pdb - Mutations: A-3G, K27AE, T52V\n"),
        )
        .unwrap();
        assert!(
            script
                .commands()
                .contains(&"select mut_d_0, d_0 and resi \\-3+27A+52".to_string())
        );
    }

    #[test]
    fn script_matches_expected_layout() {
        let script = PymolScript::build(
            &files(&["1BTL.clean.pdb", "d_0.pdb", "d_1.pdb"]),
            "clean",
            &log("d_0.pdb - Mutations: T52V, K55E\nd_1.pdb - Mutations: none\n"),
        )
        .unwrap();

        let expected = [
            "# Load and align structures",
            "load 1BTL.clean.pdb, clean",
            "hide everything, all",
            "show cartoon, all",
            "set cartoon_transparency, 0.5",
            "load d_0.pdb, d_0",
            "align d_0, clean",
            "load d_1.pdb, d_1",
            "align d_1, clean",
            "",
            "# Show mutations",
            "select mut_d_0, d_0 and resi 52+55",
            "show sticks, mut_d_0",
            "set cartoon_transparency, 0, mut_d_0",
            "",
            "# Set up view",
            "center clean",
            "zoom all",
            "set ray_shadows, 0",
            "set depth_cue, 0",
        ]
        .join("\n");
        assert_eq!(script.to_string(), expected);
    }

    #[test]
    fn designs_missing_from_directory_are_not_selected() {
        let script = PymolScript::build(
            &files(&["ref_clean.pdb", "a.pdb"]),
            "clean",
            &log("a.pdb - Mutations: A1G\ngone.pdb - Mutations: K2E\n"),
        )
        .unwrap();
        let commands = script.commands();
        assert_eq!(commands.iter().filter(|c| c.starts_with("select ")).count(), 1);
        assert!(!commands.iter().any(|c| c.contains("gone")));
    }

    #[test]
    fn first_sorted_candidate_is_the_reference() {
        let script = PymolScript::build(
            &files(&["a_clean.pdb", "b_clean.pdb", "c.pdb"]),
            "clean",
            &MutationLog::default(),
        )
        .unwrap();
        assert_eq!(script.reference(), "a_clean.pdb");
        assert!(script.commands().contains(&"align b_clean, clean".to_string()));
    }

    #[test]
    fn missing_reference_is_reported() {
        assert!(PymolScript::build(&files(&["a.pdb"]), "clean", &MutationLog::default()).is_none());

        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.pdb"), "END\n").unwrap();
        fs::write(dir.path().join(MUTATION_LOG_FILE), "").unwrap();
        let options = VisualizeOptions {
            dir: dir.path().to_path_buf(),
            ..VisualizeOptions::default()
        };
        assert!(matches!(run(&options), Err(ScriptError::NoReference { .. })));
    }

    #[test]
    fn run_writes_script_into_directory() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["x_0.pdb", "1BTL.clean.pdb", "x_1.pdb"] {
            fs::write(dir.path().join(name), "END\n").unwrap();
        }
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        fs::write(
            dir.path().join(MUTATION_LOG_FILE),
            "x_0.pdb - Mutations: none\nx_0.pdb - Mutations: L4E\nx_1.pdb - Mutations: A9G, T12S\n",
        )
        .unwrap();

        let options = VisualizeOptions {
            dir: dir.path().to_path_buf(),
            ..VisualizeOptions::default()
        };
        let output = run(&options).unwrap();
        assert_eq!(output, dir.path().join(DEFAULT_SCRIPT_FILE));

        let text = fs::read_to_string(&output).unwrap();
        assert!(text.starts_with("# Load and align structures\nload 1BTL.clean.pdb, clean\n"));
        assert!(text.contains("select mut_x_0, x_0 and resi 4\n"));
        assert!(text.contains("select mut_x_1, x_1 and resi 9+12\n"));
        assert_eq!(text.lines().filter(|l| l.starts_with("load ")).count(), 3);
        assert_eq!(text.lines().filter(|l| l.starts_with("align ")).count(), 2);
        assert!(!text.ends_with('\n'));
    }

    #[test]
    fn missing_log_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a_clean.pdb"), "END\n").unwrap();
        let options = VisualizeOptions {
            dir: dir.path().to_path_buf(),
            ..VisualizeOptions::default()
        };
        assert!(matches!(run(&options), Err(ScriptError::Log { .. })));
    }
}
