//! Testcase record
//!
//! One (read, haplotype) scoring job: the two base sequences plus the four
//! per-read-position quality tracks. Construction is the strict input
//! boundary — shapes and byte ranges are validated here so the kernels can
//! run without a single error branch. Memory is caller-owned and immutable
//! for the duration of a kernel call.

use std::io;

use crate::compute::encoding::is_recognized_base;

/// A single PairHMM scoring job.
#[derive(Debug, Clone)]
pub struct Testcase {
    hap: Vec<u8>,
    read: Vec<u8>,
    quals: Vec<u8>,
    ins_open: Vec<u8>,
    del_open: Vec<u8>,
    gap_cont: Vec<u8>,
}

fn invalid<T>(msg: String) -> io::Result<T> {
    Err(io::Error::new(io::ErrorKind::InvalidData, msg))
}

impl Testcase {
    /// Build a testcase, validating every input-shape invariant:
    /// non-empty read and haplotype, quality tracks the same length as the
    /// read, quality bytes in [0, 127], and bases drawn from the encoder's
    /// domain (ACGTN, either case).
    pub fn new(
        hap: Vec<u8>,
        read: Vec<u8>,
        quals: Vec<u8>,
        ins_open: Vec<u8>,
        del_open: Vec<u8>,
        gap_cont: Vec<u8>,
    ) -> io::Result<Self> {
        if read.is_empty() {
            return invalid("read must contain at least one base".to_string());
        }
        if hap.is_empty() {
            return invalid("haplotype must contain at least one base".to_string());
        }
        for (name, track) in [
            ("base quality", &quals),
            ("insertion gap-open", &ins_open),
            ("deletion gap-open", &del_open),
            ("gap continuation", &gap_cont),
        ] {
            if track.len() != read.len() {
                return invalid(format!(
                    "{} track length {} does not match read length {}",
                    name,
                    track.len(),
                    read.len()
                ));
            }
            if let Some(&q) = track.iter().find(|&&q| q > 127) {
                return invalid(format!("{name} quality {q} outside [0, 127]"));
            }
        }
        for (label, seq) in [("read", &read), ("haplotype", &hap)] {
            if let Some(&b) = seq.iter().find(|&&b| !is_recognized_base(b)) {
                return invalid(format!("unknown {label} base byte 0x{b:02x}"));
            }
        }
        Ok(Testcase {
            hap,
            read,
            quals,
            ins_open,
            del_open,
            gap_cont,
        })
    }

    #[inline(always)]
    pub fn haplotype(&self) -> &[u8] {
        &self.hap
    }

    #[inline(always)]
    pub fn read(&self) -> &[u8] {
        &self.read
    }

    /// Base-call qualities (clamped to ≥ 6 when they came from a testcase
    /// file; see `io::testcase_reader`).
    #[inline(always)]
    pub fn base_quals(&self) -> &[u8] {
        &self.quals
    }

    #[inline(always)]
    pub fn ins_open_quals(&self) -> &[u8] {
        &self.ins_open
    }

    #[inline(always)]
    pub fn del_open_quals(&self) -> &[u8] {
        &self.del_open
    }

    #[inline(always)]
    pub fn gap_cont_quals(&self) -> &[u8] {
        &self.gap_cont
    }

    #[inline(always)]
    pub fn read_len(&self) -> usize {
        self.read.len()
    }

    #[inline(always)]
    pub fn hap_len(&self) -> usize {
        self.hap.len()
    }
}
