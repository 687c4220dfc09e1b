//! Append-only log of the mutations produced by each design attempt.
//!
//! Every line has the form `<decoy> - Mutations: <m1>, <m2>, ...`; an attempt
//! that changed nothing is written as `<decoy> - Mutations: none`, so an
//! empty result can always be told apart from a damaged line.

use crate::core::models::mutation::{Mutation, ParseMutationError};
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use thiserror::Error;
use tracing::warn;

pub const RECORD_SEPARATOR: &str = " - Mutations: ";
pub const NO_MUTATIONS: &str = "none";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub decoy: String,
    pub mutations: Vec<Mutation>,
}

#[derive(Debug, Error)]
pub enum MutationLogError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Missing '- Mutations:' separator")]
    MissingSeparator,
    #[error("Record has an empty decoy name")]
    EmptyDecoyName,
    #[error("Record has an empty mutation list (expected 'none')")]
    EmptyMutationList,
    #[error(transparent)]
    InvalidMutation(#[from] ParseMutationError),
}

pub fn format_record(decoy: &str, mutations: &[Mutation]) -> String {
    let list = if mutations.is_empty() {
        NO_MUTATIONS.to_string()
    } else {
        mutations
            .iter()
            .map(Mutation::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!("{decoy}{RECORD_SEPARATOR}{list}")
}

/// Appends one record, creating the log if needed.
pub fn append_record(path: &Path, decoy: &str, mutations: &[Mutation]) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}", format_record(decoy, mutations))
}

/// Parses one log line. Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<MutationRecord>, MutationLogError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (decoy, list) = line
        .split_once(RECORD_SEPARATOR.trim())
        .ok_or(MutationLogError::MissingSeparator)?;
    let decoy = decoy.trim();
    if decoy.is_empty() {
        return Err(MutationLogError::EmptyDecoyName);
    }
    let list = list.trim();
    let mutations = match list {
        NO_MUTATIONS => Vec::new(),
        "" => return Err(MutationLogError::EmptyMutationList),
        _ => list
            .split(',')
            .map(str::parse)
            .collect::<Result<Vec<Mutation>, _>>()?,
    };
    Ok(Some(MutationRecord {
        decoy: decoy.to_string(),
        mutations,
    }))
}

/// A parsed log: one record per decoy, later lines superseding earlier ones,
/// plus every line that could not be parsed.
#[derive(Debug, Default)]
pub struct MutationLog {
    records: Vec<MutationRecord>,
    pub malformed: Vec<(usize, MutationLogError)>,
}

impl MutationLog {
    pub fn read_from(reader: &mut impl BufRead) -> Result<Self, MutationLogError> {
        let mut log = MutationLog::default();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let line_num = index + 1;
            match parse_line(&line) {
                Ok(Some(record)) => log.insert(record),
                Ok(None) => {}
                Err(err) => {
                    warn!(line = line_num, error = %err, "Skipping malformed mutation log line");
                    log.malformed.push((line_num, err));
                }
            }
        }
        Ok(log)
    }

    pub fn read_from_path(path: &Path) -> Result<Self, MutationLogError> {
        let file = File::open(path)?;
        Self::read_from(&mut BufReader::new(file))
    }

    fn insert(&mut self, record: MutationRecord) {
        match self.records.iter_mut().find(|r| r.decoy == record.decoy) {
            Some(existing) => *existing = record,
            None => self.records.push(record),
        }
    }

    /// Records in order of first appearance.
    pub fn records(&self) -> &[MutationRecord] {
        &self.records
    }

    pub fn get(&self, decoy: &str) -> Option<&MutationRecord> {
        self.records.iter().find(|r| r.decoy == decoy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn m(s: &str) -> Mutation {
        s.parse().unwrap()
    }

    #[test]
    fn formats_mutation_lists_and_empty_attempts() {
        assert_eq!(
            format_record("1BTL_design_0.pdb", &[m("A52V"), m("K55E")]),
            "1BTL_design_0.pdb - Mutations: A52V, K55E"
        );
        assert_eq!(
            format_record("1BTL_design_0.pdb", &[]),
            "1BTL_design_0.pdb - Mutations: none"
        );
    }

    #[test]
    fn parse_distinguishes_none_from_malformed() {
        let empty = parse_line("d.pdb - Mutations: none").unwrap().unwrap();
        assert!(empty.mutations.is_empty());

        assert!(parse_line("   ").unwrap().is_none());
        assert!(matches!(
            parse_line("Mutations: A52V"),
            Err(MutationLogError::MissingSeparator)
        ));
        assert!(matches!(
            parse_line("d.pdb - Mutations: "),
            Err(MutationLogError::EmptyMutationList)
        ));
        assert!(matches!(
            parse_line("d.pdb - Mutations: A52V, 55"),
            Err(MutationLogError::InvalidMutation(_))
        ));
        assert!(matches!(
            parse_line(" - Mutations: A52V"),
            Err(MutationLogError::EmptyDecoyName)
        ));
    }

    #[test]
    fn formatted_records_parse_back() {
        let mutations = vec![m("T52V"), m("K27AE")];
        let line = format_record("x_1.pdb", &mutations);
        let record = parse_line(&line).unwrap().unwrap();
        assert_eq!(record.decoy, "x_1.pdb");
        assert_eq!(record.mutations, mutations);
    }

    #[test]
    fn reader_reports_malformed_lines_and_keeps_latest_record() {
        let input = "\
a_0.pdb - Mutations: none
garbage line

a_0.pdb - Mutations: A52V
a_1.pdb - Mutations: K55E, T60S
";
        let log = MutationLog::read_from(&mut Cursor::new(input)).unwrap();
        assert_eq!(log.records().len(), 2);
        assert_eq!(log.get("a_0.pdb").unwrap().mutations, vec![m("A52V")]);
        assert_eq!(log.get("a_1.pdb").unwrap().mutations.len(), 2);
        assert_eq!(log.malformed.len(), 1);
        assert_eq!(log.malformed[0].0, 2);
    }

    #[test]
    fn append_creates_and_extends_the_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mutations.txt");
        append_record(&path, "a_0.pdb", &[]).unwrap();
        append_record(&path, "a_0.pdb", &[m("G10A")]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "a_0.pdb - Mutations: none\na_0.pdb - Mutations: G10A\n"
        );
        let log = MutationLog::read_from_path(&path).unwrap();
        assert_eq!(log.get("a_0.pdb").unwrap().mutations, vec![m("G10A")]);
    }
}
