//! Scalar reference kernel
//!
//! A direct, un-vectorized implementation of the forward recurrence, generic
//! over precision. This is the oracle the SIMD kernels are verified against
//! and the portable level installed by runtime dispatch when no vector
//! engine is available (or the caller's feature mask excludes them all).
//!
//! The implementation deliberately re-derives its per-row transitions
//! instead of sharing `transitions.rs`, so the oracle stays decoupled from
//! the code it checks. Operation ordering matches the vector kernel
//! cell-for-cell; only two rolling rows of the lattice are materialized.

use crate::compute::encoding::{encode_base, AMBIGUOUS_CLASS};

use super::context::{Context, HmmFloat};
use super::testcase::Testcase;

/// Compute the pre-log sum Σ_c (M[R][c] + X[R][c]) for one testcase.
pub fn compute_full_prob<T: HmmFloat>(tc: &Testcase, ctx: &Context<T>) -> T {
    let read_len = tc.read_len();
    let hap_len = tc.hap_len();
    let rows = read_len + 1;
    let cols = hap_len + 1;

    // Per-row transitions, index r in 1..rows (row 0 unused).
    let mut mm = vec![T::ZERO; rows];
    let mut gap_m = vec![T::ZERO; rows];
    let mut mx = vec![T::ZERO; rows];
    let mut xx = vec![T::ZERO; rows];
    let mut my = vec![T::ZERO; rows];
    let mut yy = vec![T::ZERO; rows];
    let mut prior = vec![T::ZERO; rows];

    let quals = tc.base_quals();
    let ins = tc.ins_open_quals();
    let del = tc.del_open_quals();
    let gcp = tc.gap_cont_quals();
    for r in 1..rows {
        let i = (ins[r - 1] & 127) as usize;
        let d = (del[r - 1] & 127) as usize;
        let c = (gcp[r - 1] & 127) as usize;
        let q = (quals[r - 1] & 127) as usize;
        mm[r] = T::ONE - ctx.ph2pr[(i + d) & 127];
        gap_m[r] = T::ONE - ctx.ph2pr[c];
        mx[r] = ctx.ph2pr[i];
        xx[r] = ctx.ph2pr[c];
        my[r] = ctx.ph2pr[d];
        yy[r] = ctx.ph2pr[c];
        prior[r] = ctx.ph2pr[q];
    }

    let init_y = ctx.initial_constant() / T::from_f64(hap_len as f64);
    let three = T::from_f64(3.0);

    // Row 0 boundary.
    let mut m_prev = vec![T::ZERO; cols];
    let mut x_prev = vec![T::ZERO; cols];
    let mut y_prev = vec![init_y; cols];
    let mut m_curr = vec![T::ZERO; cols];
    let mut x_curr = vec![T::ZERO; cols];
    let mut y_curr = vec![T::ZERO; cols];

    let read = tc.read();
    let hap = tc.haplotype();

    for r in 1..rows {
        let read_class = encode_base(read[r - 1]);
        let one_minus_prior = T::ONE - prior[r];
        let prior_third = prior[r] / three;

        m_curr[0] = T::ZERO;
        x_curr[0] = x_prev[0] * xx[r];
        y_curr[0] = T::ZERO;

        for c in 1..cols {
            let hap_class = encode_base(hap[c - 1]);
            let distm = if read_class == hap_class
                || read_class == AMBIGUOUS_CLASS
                || hap_class == AMBIGUOUS_CLASS
            {
                one_minus_prior
            } else {
                prior_third
            };

            m_curr[c] = distm
                * ((m_prev[c - 1] * mm[r] + x_prev[c - 1] * gap_m[r]) + y_prev[c - 1] * gap_m[r]);
            x_curr[c] = m_prev[c] * mx[r] + x_prev[c] * xx[r];
            y_curr[c] = m_curr[c - 1] * my[r] + y_curr[c - 1] * yy[r];
        }

        std::mem::swap(&mut m_prev, &mut m_curr);
        std::mem::swap(&mut x_prev, &mut x_curr);
        std::mem::swap(&mut y_prev, &mut y_curr);
    }

    // Separate M and X accumulators, summed column-major like the vector
    // kernel's final stripe.
    let mut sum_m = T::ZERO;
    let mut sum_x = T::ZERO;
    for c in 0..cols {
        sum_m = sum_m + m_prev[c];
        sum_x = sum_x + x_prev[c];
    }
    sum_m + sum_x
}

/// Scalar result on the log₁₀ scale, with the pre-scaling constant removed.
pub fn compute_log_likelihood<T: HmmFloat>(tc: &Testcase, ctx: &Context<T>) -> T {
    compute_full_prob(tc, ctx).log10() - ctx.log10_initial_constant()
}

/// Entry points shaped like the SIMD kernels, installed by runtime dispatch
/// at the portable scalar level.
pub mod entry {
    use super::*;
    use crate::hmm::context::{CONTEXT_F32, CONTEXT_F64};

    pub fn compute_full_prob_f32(tc: &Testcase) -> f32 {
        compute_full_prob::<f32>(tc, &CONTEXT_F32)
    }

    pub fn compute_full_prob_f64(tc: &Testcase) -> f64 {
        compute_full_prob::<f64>(tc, &CONTEXT_F64)
    }
}
