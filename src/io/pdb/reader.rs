use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, ErrorKind, Seek, SeekFrom};
use std::path::Path;

use crate::io::{Format, error::Error};

const MODEL: &str = "MODEL";
const ENDMDL: &str = "ENDMDL";
const ATOM: &str = "ATOM";

/// Chain identifier column (22, 1-based).
const CHAIN_COLUMN: std::ops::Range<usize> = 21..22;
/// Residue sequence number columns (23-26, 1-based). Insertion code (27) is not read.
const RESSEQ_COLUMNS: std::ops::Range<usize> = 22..26;

/// How the residues of a file were collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelScope {
    /// Atoms between the first `MODEL` record and its `ENDMDL`.
    FirstModel,
    /// No `MODEL` record anywhere: the whole file is one implicit model.
    WholeFile,
}

/// A chain identifier and residue sequence number pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResidueId {
    pub chain: String,
    pub seq: String,
}

#[derive(Debug, Clone)]
pub struct ResidueScan {
    pub scope: ModelScope,
    pub residues: HashSet<ResidueId>,
}

impl ResidueScan {
    #[inline]
    pub fn residue_count(&self) -> usize {
        self.residues.len()
    }
}

/// Size and first-model length of one structure file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructureSummary {
    pub size_bytes: u64,
    pub residue_count: usize,
    pub scope: ModelScope,
}

pub fn extract_record(path: &Path) -> Result<StructureSummary, Error> {
    let size_bytes = fs::metadata(path)?.len();
    let mut reader = BufReader::new(File::open(path)?);
    let scan = scan_residues(&mut reader)?;

    Ok(StructureSummary {
        size_bytes,
        residue_count: scan.residue_count(),
        scope: scan.scope,
    })
}

/// Collects the residues of the first model, falling back to the whole file
/// when it carries no `MODEL` records.
pub fn scan_residues<R: BufRead + Seek>(reader: &mut R) -> Result<ResidueScan, Error> {
    if let Some(residues) = scan_first_model(reader)? {
        return Ok(ResidueScan {
            scope: ModelScope::FirstModel,
            residues,
        });
    }

    reader.seek(SeekFrom::Start(0))?;
    let residues = scan_whole_file(reader)?;
    Ok(ResidueScan {
        scope: ModelScope::WholeFile,
        residues,
    })
}

/// Returns `None` if the stream ends without a `MODEL` record.
fn scan_first_model<R: BufRead>(reader: &mut R) -> Result<Option<HashSet<ResidueId>>, Error> {
    let mut lines = Lines::new(reader);

    loop {
        match lines.next_line()? {
            None => return Ok(None),
            Some((_, line)) if line.starts_with(MODEL) => break,
            Some(_) => {}
        }
    }

    let mut residues = HashSet::new();
    while let Some((line_no, line)) = lines.next_line()? {
        if line.starts_with(ENDMDL) || line.starts_with(MODEL) {
            break;
        }
        if line.starts_with(ATOM) {
            residues.insert(residue_id(line, line_no)?);
        }
    }
    Ok(Some(residues))
}

fn scan_whole_file<R: BufRead>(reader: &mut R) -> Result<HashSet<ResidueId>, Error> {
    let mut lines = Lines::new(reader);
    let mut residues = HashSet::new();
    while let Some((line_no, line)) = lines.next_line()? {
        if line.starts_with(ATOM) {
            residues.insert(residue_id(line, line_no)?);
        }
    }
    Ok(residues)
}

fn residue_id(line: &str, line_no: usize) -> Result<ResidueId, Error> {
    let chain = line.get(CHAIN_COLUMN);
    let seq = line.get(RESSEQ_COLUMNS);
    match (chain, seq) {
        (Some(chain), Some(seq)) => Ok(ResidueId {
            chain: chain.trim().to_string(),
            seq: seq.trim().to_string(),
        }),
        _ => Err(Error::parse(
            Format::Pdb,
            line_no,
            "ATOM record ends before the residue sequence number (columns 23-26)",
        )),
    }
}

/// Line reader that reuses one buffer and tracks 1-based line numbers.
struct Lines<'a, R: BufRead> {
    reader: &'a mut R,
    buf: String,
    line_no: usize,
}

impl<'a, R: BufRead> Lines<'a, R> {
    fn new(reader: &'a mut R) -> Self {
        Self {
            reader,
            buf: String::new(),
            line_no: 0,
        }
    }

    fn next_line(&mut self) -> Result<Option<(usize, &str)>, Error> {
        self.buf.clear();
        self.line_no += 1;
        match self.reader.read_line(&mut self.buf) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some((
                self.line_no,
                self.buf.trim_end_matches(['\n', '\r']),
            ))),
            Err(e) if e.kind() == ErrorKind::InvalidData => Err(Error::parse(
                Format::Pdb,
                self.line_no,
                "line is not valid UTF-8",
            )),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    fn atom(serial: usize, chain: char, resseq: i32, icode: char) -> String {
        format!(
            "ATOM  {serial:>5}  CA  ALA {chain}{resseq:>4}{icode}   0.000   0.000   0.000  1.00  0.00           C"
        )
    }

    fn scan(text: &str) -> ResidueScan {
        scan_residues(&mut Cursor::new(text.as_bytes().to_vec())).expect("scan")
    }

    #[test]
    fn counts_only_first_model() {
        let text = [
            "MODEL        1".to_string(),
            atom(1, 'A', 1, ' '),
            atom(2, 'A', 2, ' '),
            atom(3, 'A', 2, ' '),
            "ENDMDL".to_string(),
            "MODEL        2".to_string(),
            atom(1, 'A', 1, ' '),
            atom(2, 'A', 2, ' '),
            atom(3, 'A', 3, ' '),
            atom(4, 'A', 4, ' '),
            "ENDMDL".to_string(),
            "END".to_string(),
        ]
        .join("\n");

        let result = scan(&text);
        assert_eq!(result.scope, ModelScope::FirstModel);
        assert_eq!(result.residue_count(), 2);
    }

    #[test]
    fn falls_back_to_whole_file_without_model_records() {
        let text = [
            "HEADER    TEST".to_string(),
            atom(1, 'A', 1, ' '),
            atom(2, 'A', 2, ' '),
            atom(3, 'B', 1, ' '),
            "END".to_string(),
        ]
        .join("\n");

        let result = scan(&text);
        assert_eq!(result.scope, ModelScope::WholeFile);
        assert_eq!(result.residue_count(), 3);
    }

    #[test]
    fn atoms_before_first_model_are_ignored() {
        let text = [
            atom(1, 'Z', 99, ' '),
            "MODEL        1".to_string(),
            atom(1, 'A', 1, ' '),
            "ENDMDL".to_string(),
        ]
        .join("\n");

        assert_eq!(scan(&text).residue_count(), 1);
    }

    #[test]
    fn unterminated_model_stops_at_next_model() {
        let text = [
            "MODEL        1".to_string(),
            atom(1, 'A', 1, ' '),
            "MODEL        2".to_string(),
            atom(1, 'A', 2, ' '),
        ]
        .join("\n");

        assert_eq!(scan(&text).residue_count(), 1);
    }

    #[test]
    fn unterminated_last_model_reads_to_eof() {
        let text = [
            "MODEL        1".to_string(),
            atom(1, 'A', 1, ' '),
            atom(2, 'A', 2, ' '),
        ]
        .join("\n");

        let result = scan(&text);
        assert_eq!(result.scope, ModelScope::FirstModel);
        assert_eq!(result.residue_count(), 2);
    }

    #[test]
    fn insertion_codes_are_ignored_and_chains_distinguish() {
        let text = [
            "MODEL        1".to_string(),
            atom(1, 'A', 52, ' '),
            atom(2, 'A', 52, 'A'),
            atom(3, 'A', 52, 'B'),
            atom(4, 'B', 52, ' '),
            "ENDMDL".to_string(),
        ]
        .join("\n");

        assert_eq!(scan(&text).residue_count(), 2);
    }

    #[test]
    fn hetatm_records_do_not_count() {
        let text = [
            atom(1, 'A', 1, ' '),
            "HETATM    2  O   HOH A 101       0.000   0.000   0.000  1.00  0.00           O"
                .to_string(),
        ]
        .join("\n");

        assert_eq!(scan(&text).residue_count(), 1);
    }

    #[test]
    fn model_without_atoms_counts_zero() {
        let result = scan("MODEL        1\nENDMDL\n");
        assert_eq!(result.scope, ModelScope::FirstModel);
        assert_eq!(result.residue_count(), 0);
    }

    #[test]
    fn truncated_atom_record_is_a_parse_error() {
        let text = format!("MODEL        1\n{}\nATOM      2  CA  ALA A\n", atom(1, 'A', 1, ' '));
        let err = scan_residues(&mut Cursor::new(text.into_bytes())).unwrap_err();
        match err {
            Error::Parse { format, line, .. } => {
                assert_eq!(format, Format::Pdb);
                assert_eq!(line, 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn invalid_utf8_is_a_parse_error() {
        let mut bytes = format!("{}\n", atom(1, 'A', 1, ' ')).into_bytes();
        bytes.extend_from_slice(&[0xff, 0xfe, b'\n']);
        let err = scan_residues(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, Error::Parse { line: 2, .. }));
    }

    #[test]
    fn crlf_line_endings_are_accepted() {
        let text = format!(
            "MODEL        1\r\n{}\r\n{}\r\nENDMDL\r\n",
            atom(1, 'A', 1, ' '),
            atom(2, 'A', 2, ' ')
        );
        assert_eq!(scan(&text).residue_count(), 2);
    }

    #[test]
    fn extract_record_reports_size_and_length() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("ens.pdb");
        let text = format!(
            "MODEL        1\n{}\n{}\nENDMDL\n",
            atom(1, 'A', 1, ' '),
            atom(2, 'A', 2, ' ')
        );
        let mut f = File::create(&path).unwrap();
        f.write_all(text.as_bytes()).unwrap();
        drop(f);

        let summary = extract_record(&path).expect("extract");
        assert_eq!(summary.size_bytes, text.len() as u64);
        assert_eq!(summary.residue_count, 2);
        assert_eq!(summary.scope, ModelScope::FirstModel);
    }

    #[test]
    fn extract_record_missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = extract_record(&dir.path().join("absent.pdb")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
