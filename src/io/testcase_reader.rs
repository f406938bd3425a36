//! Testcase file parser
//!
//! One whitespace-delimited record per line:
//!
//! ```text
//! <haplotype_bases> <read_bases> <quals> <ins_opens> <del_opens> <gap_conts>
//! ```
//!
//! The four quality fields are ASCII strings of the same length as the read,
//! encoding quality q as the byte q+33. Decoding clamps the base-call
//! quality to ≥ 6; the three gap tracks pass through unclamped. Anything
//! malformed is rejected with a diagnostic naming the offending line —
//! parse errors never reach the kernels.
//!
//! Files ending in `.gz` are decompressed transparently; `-` reads stdin.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;

use crate::hmm::Testcase;

/// Floor applied to decoded base-call qualities (only; gap qualities are
/// taken as-is).
pub const MIN_BASE_QUALITY: u8 = 6;

const QUAL_OFFSET: u8 = 33;

/// Streaming reader over a testcase file.
pub struct TestcaseReader<R> {
    inner: R,
    line_no: usize,
    buf: String,
}

impl<R: BufRead> TestcaseReader<R> {
    pub fn new(inner: R) -> Self {
        TestcaseReader {
            inner,
            line_no: 0,
            buf: String::new(),
        }
    }

    /// Read the next record, skipping blank lines. `Ok(None)` at EOF.
    pub fn read_record(&mut self) -> io::Result<Option<Testcase>> {
        loop {
            self.buf.clear();
            self.line_no += 1;
            if self.inner.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            if self.buf.trim().is_empty() {
                continue;
            }
            return parse_record(&self.buf, self.line_no).map(Some);
        }
    }

    /// Read up to `limit` records into a vector; fewer at EOF.
    pub fn read_batch(&mut self, limit: usize) -> io::Result<Vec<Testcase>> {
        let mut batch = Vec::with_capacity(limit.min(1024));
        while batch.len() < limit {
            match self.read_record()? {
                Some(tc) => batch.push(tc),
                None => break,
            }
        }
        Ok(batch)
    }
}

impl<R: BufRead> Iterator for TestcaseReader<R> {
    type Item = io::Result<Testcase>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_record().transpose()
    }
}

fn invalid<T>(line_no: usize, msg: String) -> io::Result<T> {
    Err(io::Error::new(
        io::ErrorKind::InvalidData,
        format!("testcase record {line_no}: {msg}"),
    ))
}

fn decode_quals(field: &str, line_no: usize, name: &str) -> io::Result<Vec<u8>> {
    let mut quals = Vec::with_capacity(field.len());
    for &b in field.as_bytes() {
        if b < QUAL_OFFSET {
            return invalid(line_no, format!("{name} byte 0x{b:02x} below quality offset"));
        }
        let q = b - QUAL_OFFSET;
        if q > 127 {
            return invalid(line_no, format!("{name} quality {q} outside [0, 127]"));
        }
        quals.push(q);
    }
    Ok(quals)
}

fn parse_record(line: &str, line_no: usize) -> io::Result<Testcase> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 6 {
        return invalid(
            line_no,
            format!("expected 6 whitespace-delimited fields, found {}", fields.len()),
        );
    }

    let hap = fields[0].as_bytes().to_vec();
    let read = fields[1].as_bytes().to_vec();
    for (name, field) in [
        ("base quality", fields[2]),
        ("insertion gap-open", fields[3]),
        ("deletion gap-open", fields[4]),
        ("gap continuation", fields[5]),
    ] {
        if field.len() != read.len() {
            return invalid(
                line_no,
                format!(
                    "{} field length {} does not match read length {}",
                    name,
                    field.len(),
                    read.len()
                ),
            );
        }
    }

    let mut quals = decode_quals(fields[2], line_no, "base quality")?;
    for q in quals.iter_mut() {
        *q = (*q).max(MIN_BASE_QUALITY);
    }
    let ins_open = decode_quals(fields[3], line_no, "insertion gap-open")?;
    let del_open = decode_quals(fields[4], line_no, "deletion gap-open")?;
    let gap_cont = decode_quals(fields[5], line_no, "gap continuation")?;

    Testcase::new(hap, read, quals, ins_open, del_open, gap_cont)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("testcase record {line_no}: {e}")))
}

/// Open a testcase file, decompressing `.gz` transparently; `-` is stdin.
pub fn open_testcase_file(path: &Path) -> io::Result<TestcaseReader<Box<dyn BufRead>>> {
    let raw: Box<dyn Read> = if path.to_str() == Some("-") {
        Box::new(io::stdin())
    } else {
        Box::new(File::open(path)?)
    };
    let buffered: Box<dyn BufRead> = if path.extension().and_then(|s| s.to_str()) == Some("gz") {
        Box::new(BufReader::new(GzDecoder::new(raw)))
    } else {
        Box::new(BufReader::new(raw))
    };
    Ok(TestcaseReader::new(buffered))
}

/// Read every record of a testcase file into memory.
pub fn read_all(path: &Path) -> io::Result<Vec<Testcase>> {
    open_testcase_file(path)?.collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn reader(s: &str) -> TestcaseReader<Cursor<&str>> {
        TestcaseReader::new(Cursor::new(s))
    }

    #[test]
    fn test_parse_basic_record() {
        // 'I' encodes q40, '+' encodes q10.
        let mut r = reader("ACGT ACGT IIII ++++ ++++ ++++\n");
        let tc = r.read_record().unwrap().unwrap();
        assert_eq!(tc.haplotype(), b"ACGT");
        assert_eq!(tc.read(), b"ACGT");
        assert_eq!(tc.base_quals(), &[40; 4]);
        assert_eq!(tc.ins_open_quals(), &[10; 4]);
        assert!(r.read_record().unwrap().is_none());
    }

    #[test]
    fn test_base_quality_clamped_to_six() {
        // '!' encodes q0; base-call track clamps to 6, gap tracks do not.
        let mut r = reader("ACGT ACGT !!!! !!!! !!!! !!!!\n");
        let tc = r.read_record().unwrap().unwrap();
        assert_eq!(tc.base_quals(), &[6; 4]);
        assert_eq!(tc.ins_open_quals(), &[0; 4]);
        assert_eq!(tc.del_open_quals(), &[0; 4]);
        assert_eq!(tc.gap_cont_quals(), &[0; 4]);
    }

    #[test]
    fn test_blank_lines_skipped() {
        let mut r = reader("\n\nACGT AC II ++ ++ ++\n\n");
        assert!(r.read_record().unwrap().is_some());
        assert!(r.read_record().unwrap().is_none());
    }

    #[test]
    fn test_field_count_error_names_line() {
        let mut r = reader("ACGT ACGT IIII ++++ ++++\n");
        let err = r.read_record().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(err.to_string().contains("record 1"));
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let mut r = reader("ACGT ACGT III ++++ ++++ ++++\n");
        assert!(r.read_record().is_err());
    }

    #[test]
    fn test_quality_below_offset_rejected() {
        let mut r = reader("ACGT ACGT II\x1fI ++++ ++++ ++++\n");
        assert!(r.read_record().is_err());
    }

    #[test]
    fn test_unknown_base_rejected_with_line_number() {
        let mut r = reader("ACGT AXGT IIII ++++ ++++ ++++\n");
        let err = r.read_record().unwrap_err();
        assert!(err.to_string().contains("record 1"));
        assert!(err.to_string().contains("unknown"));
    }

    #[test]
    fn test_read_batch_respects_limit() {
        let mut r = reader("A A I + + +\nC C I + + +\nG G I + + +\n");
        let first = r.read_batch(2).unwrap();
        assert_eq!(first.len(), 2);
        let rest = r.read_batch(2).unwrap();
        assert_eq!(rest.len(), 1);
    }

    #[test]
    fn test_gz_roundtrip() {
        use flate2::write::GzEncoder;
        use flate2::Compression;
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cases.txt.gz");
        let mut enc = GzEncoder::new(std::fs::File::create(&path).unwrap(), Compression::fast());
        enc.write_all(b"ACGT ACGT IIII ++++ ++++ ++++\n").unwrap();
        enc.finish().unwrap();

        let cases = read_all(&path).unwrap();
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].read(), b"ACGT");
    }
}
