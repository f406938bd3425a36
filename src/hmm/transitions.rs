//! Per-testcase transition and prior builder
//!
//! Derives the six per-row transition probabilities and the per-row mismatch
//! prior from the read's quality tracks, laid out flat for L-wide SIMD
//! consumption: element r-1 holds row r, and every vector is zero-padded to
//! `padded_len` (stripe count × lane count) so short final stripes load
//! all-zero lanes. Runs once per testcase, before the recurrence.
//!
//! The `& 127` truncation on every quality byte is part of the numeric
//! contract and must not be removed; it keeps results bit-identical even for
//! callers that bypass boundary validation.

use super::context::{Context, HmmFloat};
use super::testcase::Testcase;

/// Flat, padded transition and prior vectors for one testcase.
pub struct TransitionVectors<T> {
    /// match → match
    pub mm: Vec<T>,
    /// gap → match (shared by insert and delete)
    pub gap_m: Vec<T>,
    /// match → insert-open
    pub mx: Vec<T>,
    /// insert → insert
    pub xx: Vec<T>,
    /// match → delete-open
    pub my: Vec<T>,
    /// delete → delete
    pub yy: Vec<T>,
    /// raw mismatch prior `ph2pr[q]`
    pub prior: Vec<T>,
}

impl<T: HmmFloat> TransitionVectors<T> {
    /// Build the vectors for `tc`, padding every track with zeros out to
    /// `padded_len` (≥ read length).
    ///
    /// The delete transitions of the last row use the same formula as every
    /// other row; no special-casing of r = R.
    pub fn build(tc: &Testcase, ctx: &Context<T>, padded_len: usize) -> Self {
        debug_assert!(padded_len >= tc.read_len());
        let mut mm = vec![T::ZERO; padded_len];
        let mut gap_m = vec![T::ZERO; padded_len];
        let mut mx = vec![T::ZERO; padded_len];
        let mut xx = vec![T::ZERO; padded_len];
        let mut my = vec![T::ZERO; padded_len];
        let mut yy = vec![T::ZERO; padded_len];
        let mut prior = vec![T::ZERO; padded_len];

        let quals = tc.base_quals();
        let ins = tc.ins_open_quals();
        let del = tc.del_open_quals();
        let gcp = tc.gap_cont_quals();

        for r in 0..tc.read_len() {
            let i = (ins[r] & 127) as usize;
            let d = (del[r] & 127) as usize;
            let c = (gcp[r] & 127) as usize;
            let q = (quals[r] & 127) as usize;

            mm[r] = T::ONE - ctx.ph2pr[(i + d) & 127];
            gap_m[r] = T::ONE - ctx.ph2pr[c];
            mx[r] = ctx.ph2pr[i];
            xx[r] = ctx.ph2pr[c];
            my[r] = ctx.ph2pr[d];
            yy[r] = ctx.ph2pr[c];
            prior[r] = ctx.ph2pr[q];
        }

        TransitionVectors {
            mm,
            gap_m,
            mx,
            xx,
            my,
            yy,
            prior,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hmm::context::CONTEXT_F64;

    fn testcase(quals: [Vec<u8>; 4]) -> Testcase {
        let [q, i, d, c] = quals;
        let n = q.len();
        Testcase::new(b"ACGT".to_vec(), vec![b'A'; n], q, i, d, c).unwrap()
    }

    #[test]
    fn test_row_formulas() {
        let tc = testcase([vec![40, 30], vec![45, 20], vec![45, 25], vec![10, 10]]);
        let tv = TransitionVectors::build(&tc, &CONTEXT_F64, 4);
        let ctx = &*CONTEXT_F64;

        // Row 1 (flat index 0)
        assert_eq!(tv.mm[0], 1.0 - ctx.ph2pr[90]);
        assert_eq!(tv.gap_m[0], 1.0 - ctx.ph2pr[10]);
        assert_eq!(tv.mx[0], ctx.ph2pr[45]);
        assert_eq!(tv.xx[0], ctx.ph2pr[10]);
        assert_eq!(tv.my[0], ctx.ph2pr[45]);
        assert_eq!(tv.yy[0], ctx.ph2pr[10]);
        assert_eq!(tv.prior[0], ctx.ph2pr[40]);
    }

    #[test]
    fn test_last_row_uses_general_formula() {
        // The delete transitions of the final row must come from the same
        // formula as interior rows, not be forced to 1.0.
        let tc = testcase([vec![40, 40], vec![45, 45], vec![45, 33], vec![10, 12]]);
        let tv = TransitionVectors::build(&tc, &CONTEXT_F64, 2);
        let ctx = &*CONTEXT_F64;
        assert_eq!(tv.my[1], ctx.ph2pr[33]);
        assert_eq!(tv.yy[1], ctx.ph2pr[12]);
        assert_ne!(tv.my[1], 1.0);
        assert_ne!(tv.yy[1], 1.0);
    }

    #[test]
    fn test_quality_sum_wraps_at_128() {
        // ins + del can exceed 127; the table index wraps exactly as the
        // reference implementation's `& 127` does.
        let tc = testcase([vec![40], vec![100], vec![100], vec![10]]);
        let tv = TransitionVectors::build(&tc, &CONTEXT_F64, 1);
        assert_eq!(tv.mm[0], 1.0 - CONTEXT_F64.ph2pr[200 & 127]);
    }

    #[test]
    fn test_padding_is_zero() {
        let tc = testcase([vec![40], vec![45], vec![45], vec![10]]);
        let tv = TransitionVectors::build(&tc, &CONTEXT_F64, 8);
        for r in 1..8 {
            assert_eq!(tv.mm[r], 0.0);
            assert_eq!(tv.gap_m[r], 0.0);
            assert_eq!(tv.mx[r], 0.0);
            assert_eq!(tv.xx[r], 0.0);
            assert_eq!(tv.my[r], 0.0);
            assert_eq!(tv.yy[r], 0.0);
            assert_eq!(tv.prior[r], 0.0);
        }
    }
}
