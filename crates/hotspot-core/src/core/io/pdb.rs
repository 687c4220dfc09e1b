use crate::core::io::traits::MolecularFile;
use crate::core::models::atom::Atom;
use crate::core::models::ids::ResidueId;
use crate::core::models::system::MolecularSystem;
use nalgebra::Point3;
use std::io::{self, BufRead, Write};
use thiserror::Error;

/// Records that are regenerated by the writer and therefore never kept as
/// header lines.
const REGENERATED_RECORDS: &[&str] = &[
    "ATOM", "HETATM", "TER", "END", "MODEL", "ENDMDL", "ANISOU", "CONECT", "MASTER",
];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PdbMetadata {
    /// Non-coordinate records (HEADER, REMARK, CRYST1, ...) in file order.
    pub header_lines: Vec<String>,
}

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: PdbParseErrorKind,
    },
    #[error("Missing required record: {0}")]
    MissingRecord(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PdbParseErrorKind {
    #[error("Invalid integer format in columns {columns} (value: '{value}')")]
    InvalidInt { columns: String, value: String },
    #[error("Invalid float format in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: String, value: String },
    #[error("Required field in columns {columns} is empty")]
    MissingRequiredField { columns: String },
    #[error("Line is too short for ATOM/HETATM record (must reach column 54)")]
    LineTooShort,
}

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end).unwrap_or("").trim()
}

fn column_char(line: &str, index: usize) -> Option<char> {
    line.get(index..index + 1)
        .and_then(|s| s.chars().next())
        .filter(|c| !c.is_whitespace())
}

fn parse_float(line: &str, line_num: usize, start: usize, end: usize) -> Result<f64, PdbError> {
    let value = slice_and_trim(line, start, end);
    value.parse().map_err(|_| PdbError::Parse {
        line: line_num,
        kind: PdbParseErrorKind::InvalidFloat {
            columns: format!("{}-{}", start + 1, end),
            value: value.into(),
        },
    })
}

fn parse_optional_float(
    line: &str,
    line_num: usize,
    start: usize,
    end: usize,
    default: f64,
) -> Result<f64, PdbError> {
    if slice_and_trim(line, start, end).is_empty() {
        Ok(default)
    } else {
        parse_float(line, line_num, start, end)
    }
}

/// Protein Data Bank format, fixed-column ATOM/HETATM records.
///
/// Only the first model is read, and for atoms with alternate locations only
/// the first location encountered is kept.
pub struct PdbFile;

impl MolecularFile for PdbFile {
    type Metadata = PdbMetadata;
    type Error = PdbError;

    fn read_from(
        reader: &mut impl BufRead,
    ) -> Result<(MolecularSystem, Self::Metadata), Self::Error> {
        let mut system = MolecularSystem::new();
        let mut metadata = PdbMetadata::default();
        let mut atom_count = 0usize;

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;
            let record_type = slice_and_trim(&line, 0, 6);

            match record_type {
                "ATOM" | "HETATM" => {
                    if line.len() < 54 {
                        return Err(PdbError::Parse {
                            line: line_num,
                            kind: PdbParseErrorKind::LineTooShort,
                        });
                    }

                    let serial_str = slice_and_trim(&line, 6, 11);
                    let name = slice_and_trim(&line, 12, 16);
                    let alt_loc = column_char(&line, 16);
                    let res_name = slice_and_trim(&line, 17, 20);
                    let chain_char = line.get(21..22).and_then(|s| s.chars().next()).unwrap_or(' ');
                    let res_seq_str = slice_and_trim(&line, 22, 26);
                    let insertion_code = column_char(&line, 26);

                    if name.is_empty() {
                        return Err(PdbError::Parse {
                            line: line_num,
                            kind: PdbParseErrorKind::MissingRequiredField {
                                columns: "13-16".into(),
                            },
                        });
                    }
                    let serial: usize = serial_str.parse().map_err(|_| PdbError::Parse {
                        line: line_num,
                        kind: PdbParseErrorKind::InvalidInt {
                            columns: "7-11".into(),
                            value: serial_str.into(),
                        },
                    })?;
                    let res_seq: isize = res_seq_str.parse().map_err(|_| PdbError::Parse {
                        line: line_num,
                        kind: PdbParseErrorKind::InvalidInt {
                            columns: "23-26".into(),
                            value: res_seq_str.into(),
                        },
                    })?;
                    let x = parse_float(&line, line_num, 30, 38)?;
                    let y = parse_float(&line, line_num, 38, 46)?;
                    let z = parse_float(&line, line_num, 46, 54)?;
                    let occupancy = parse_optional_float(&line, line_num, 54, 60, 1.0)?;
                    let b_factor = parse_optional_float(&line, line_num, 60, 66, 0.0)?;
                    let element = slice_and_trim(&line, 76, 78).to_ascii_uppercase();

                    let chain_id = system.add_chain(chain_char);
                    let residue_id = system
                        .add_residue(chain_id, res_seq, insertion_code, res_name)
                        .ok_or_else(|| {
                            PdbError::MissingRecord(format!("chain '{}'", chain_char))
                        })?;

                    if alt_loc.is_some() && residue_has_atom(&system, residue_id, name) {
                        continue;
                    }

                    let mut atom = Atom::new(name, residue_id, Point3::new(x, y, z));
                    atom.serial = serial;
                    atom.occupancy = occupancy;
                    atom.b_factor = b_factor;
                    if !element.is_empty() {
                        atom.element = element;
                    }
                    system.add_atom_to_residue(residue_id, atom);
                    atom_count += 1;
                }
                "ENDMDL" | "END" => break,
                "" => continue,
                other if REGENERATED_RECORDS.contains(&other) => continue,
                _ => {
                    if atom_count == 0 {
                        metadata.header_lines.push(line.trim_end().to_string());
                    }
                }
            }
        }

        if atom_count == 0 {
            return Err(PdbError::MissingRecord("ATOM/HETATM records".into()));
        }
        Ok((system, metadata))
    }

    fn write_to(
        system: &MolecularSystem,
        metadata: &Self::Metadata,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        for line in &metadata.header_lines {
            writeln!(writer, "{}", line)?;
        }

        let mut serial = 0usize;
        for (_, chain) in system.chains_in_order() {
            let mut last_polymer_residue = None;
            for &residue_id in chain.residues() {
                let Some(residue) = system.residue(residue_id) else {
                    continue;
                };
                let record_type = if residue.amino_acid.is_some() {
                    last_polymer_residue = Some(residue);
                    "ATOM"
                } else {
                    "HETATM"
                };
                for &atom_id in residue.atoms() {
                    let Some(atom) = system.atom(atom_id) else {
                        continue;
                    };
                    serial += 1;
                    writeln!(
                        writer,
                        "{:<6}{:>5} {:<4} {:>3} {}{:>4}{}   {:>8.3}{:>8.3}{:>8.3}{:>6.2}{:>6.2}          {:>2}",
                        record_type,
                        serial,
                        format_atom_name(&atom.name, &atom.element),
                        residue.name,
                        chain.id,
                        residue.residue_number,
                        residue.insertion_code.unwrap_or(' '),
                        atom.position.x,
                        atom.position.y,
                        atom.position.z,
                        atom.occupancy,
                        atom.b_factor,
                        atom.element,
                    )?;
                }
            }
            if let Some(residue) = last_polymer_residue {
                serial += 1;
                writeln!(
                    writer,
                    "TER   {:>5}      {:>3} {}{:>4}{}",
                    serial,
                    residue.name,
                    chain.id,
                    residue.residue_number,
                    residue.insertion_code.unwrap_or(' '),
                )?;
            }
        }

        writeln!(writer, "END")?;
        Ok(())
    }

    fn write_system_to(
        system: &MolecularSystem,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        let default_metadata = PdbMetadata {
            header_lines: vec!["REMARK Generated by hotspot".to_string()],
        };
        Self::write_to(system, &default_metadata, writer)
    }
}

fn residue_has_atom(system: &MolecularSystem, residue_id: ResidueId, name: &str) -> bool {
    system
        .residue(residue_id)
        .is_some_and(|residue| residue.get_atom_id_by_name(name).is_some())
}

/// Atom names of one-letter elements start in column 14 unless they fill all
/// four columns.
fn format_atom_name(name: &str, element: &str) -> String {
    if name.len() < 4 && element.len() <= 1 {
        format!(" {:<3}", name)
    } else {
        format!("{:<4}", name)
    }
}
