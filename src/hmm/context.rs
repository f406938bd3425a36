//! Quality→probability tables
//!
//! `Context<T>` holds the process-lifetime numeric tables shared by every
//! kernel invocation: the Phred→probability table `ph2pr`, the pre-scaling
//! constant for the precision, a Jacobian-log table for approximate
//! log-space summation, and the symmetric match-to-match probability table
//! derived from it. Removing per-cell `pow` calls from the hot loop is a
//! primary source of speedup, so everything here is computed exactly once
//! and never mutated afterwards.
//!
//! Two global instances exist (`CONTEXT_F32`, `CONTEXT_F64`), constructed on
//! first access; construction happens-before any kernel call.

use lazy_static::lazy_static;

/// Highest representable Phred quality; table indices are masked to this
/// range wherever a raw quality byte is consumed.
pub const MAX_QUAL: usize = 127;

/// Step of the Jacobian-log table.
pub const JACOBIAN_LOG_TABLE_STEP: f64 = 0.0001;
const JACOBIAN_LOG_TABLE_INV_STEP: f64 = 1.0 / JACOBIAN_LOG_TABLE_STEP;
/// Differences at or above this tolerance contribute nothing to the
/// approximate log-sum.
pub const MAX_JACOBIAN_TOLERANCE: f64 = 8.0;
const JACOBIAN_LOG_TABLE_SIZE: usize =
    (MAX_JACOBIAN_TOLERANCE / JACOBIAN_LOG_TABLE_STEP) as usize + 1;

const INV_LN10: f64 = std::f64::consts::LOG10_E;

/// Floating-point element type used by the PairHMM kernels.
///
/// The two implementors are `f32` and `f64`; the associated pre-scaling
/// exponent is what distinguishes the single- and double-precision numeric
/// policies (2^120 vs 2^1020).
pub trait HmmFloat:
    Copy
    + PartialOrd
    + Send
    + Sync
    + std::fmt::Debug
    + std::ops::Add<Output = Self>
    + std::ops::Sub<Output = Self>
    + std::ops::Mul<Output = Self>
    + std::ops::Div<Output = Self>
    + 'static
{
    const ZERO: Self;
    const ONE: Self;
    /// log2 of the pre-scaling constant applied to the Y boundary row.
    const INITIAL_CONSTANT_LOG2: i32;

    fn from_f64(x: f64) -> Self;
    fn to_f64(self) -> f64;
    /// 10^exp in this precision.
    fn pow10(exp: Self) -> Self;
    fn log10(self) -> Self;
    fn ln_1p(self) -> Self;
    fn is_infinite(self) -> bool;
}

impl HmmFloat for f32 {
    const ZERO: Self = 0.0;
    const ONE: Self = 1.0;
    const INITIAL_CONSTANT_LOG2: i32 = 120;

    #[inline(always)]
    fn from_f64(x: f64) -> Self {
        x as f32
    }
    #[inline(always)]
    fn to_f64(self) -> f64 {
        self as f64
    }
    #[inline]
    fn pow10(exp: Self) -> Self {
        10.0f32.powf(exp)
    }
    #[inline]
    fn log10(self) -> Self {
        f32::log10(self)
    }
    #[inline]
    fn ln_1p(self) -> Self {
        f32::ln_1p(self)
    }
    #[inline]
    fn is_infinite(self) -> bool {
        f32::is_infinite(self)
    }
}

impl HmmFloat for f64 {
    const ZERO: Self = 0.0;
    const ONE: Self = 1.0;
    const INITIAL_CONSTANT_LOG2: i32 = 1020;

    #[inline(always)]
    fn from_f64(x: f64) -> Self {
        x
    }
    #[inline(always)]
    fn to_f64(self) -> f64 {
        self
    }
    #[inline]
    fn pow10(exp: Self) -> Self {
        10.0f64.powf(exp)
    }
    #[inline]
    fn log10(self) -> Self {
        f64::log10(self)
    }
    #[inline]
    fn ln_1p(self) -> Self {
        f64::ln_1p(self)
    }
    #[inline]
    fn is_infinite(self) -> bool {
        f64::is_infinite(self)
    }
}

/// Immutable numeric tables for one floating-point precision.
pub struct Context<T: HmmFloat> {
    /// `ph2pr[q] = 10^(-q/10)` for q in [0, 127].
    pub ph2pr: [T; MAX_QUAL + 1],
    initial_constant: T,
    log10_initial_constant: T,
    jacobian_log_table: Vec<T>,
    match_to_match: Vec<T>,
}

impl<T: HmmFloat> Context<T> {
    pub fn new() -> Self {
        let mut ph2pr = [T::ZERO; MAX_QUAL + 1];
        for (q, slot) in ph2pr.iter_mut().enumerate() {
            *slot = T::pow10(T::ZERO - T::from_f64(q as f64) / T::from_f64(10.0));
        }

        let initial_constant = T::from_f64((T::INITIAL_CONSTANT_LOG2 as f64).exp2());
        let log10_initial_constant = initial_constant.log10();

        let mut jacobian_log_table = Vec::with_capacity(JACOBIAN_LOG_TABLE_SIZE);
        for k in 0..JACOBIAN_LOG_TABLE_SIZE {
            let exp = T::from_f64(-(k as f64) * JACOBIAN_LOG_TABLE_STEP);
            jacobian_log_table.push((T::ONE + T::pow10(exp)).log10());
        }

        let mut ctx = Context {
            ph2pr,
            initial_constant,
            log10_initial_constant,
            jacobian_log_table,
            match_to_match: Vec::new(),
        };
        ctx.initialize_match_to_match();
        ctx
    }

    // Triangular table over quality pairs: entry (max, min) sits at
    // max*(max+1)/2 + min.
    fn initialize_match_to_match(&mut self) {
        let len = ((MAX_QUAL + 1) * (MAX_QUAL + 2)) >> 1;
        let mut table = Vec::with_capacity(len);
        for i in 0..=MAX_QUAL {
            for j in 0..=i {
                let log10_sum = self.approximate_log10_sum_log10(
                    T::from_f64(-0.1 * i as f64),
                    T::from_f64(-0.1 * j as f64),
                );
                let mut p = T::pow10(log10_sum);
                if p > T::ONE {
                    p = T::ONE;
                }
                let match_to_match_log10 = (T::ZERO - p).ln_1p() * T::from_f64(INV_LN10);
                table.push(T::pow10(match_to_match_log10));
            }
        }
        debug_assert_eq!(table.len(), len);
        self.match_to_match = table;
    }

    /// Pre-scaling constant for this precision (2^120 single, 2^1020 double).
    #[inline(always)]
    pub fn initial_constant(&self) -> T {
        self.initial_constant
    }

    /// log₁₀ of the pre-scaling constant; subtracted from every result.
    #[inline(always)]
    pub fn log10_initial_constant(&self) -> T {
        self.log10_initial_constant
    }

    /// Table-driven approximation of `log10(10^a + 10^b)`.
    pub fn approximate_log10_sum_log10(&self, a: T, b: T) -> T {
        let (small, big) = if a > b { (b, a) } else { (a, b) };
        if small.is_infinite() || big.is_infinite() {
            return big;
        }
        let diff = big - small;
        if diff.to_f64() >= MAX_JACOBIAN_TOLERANCE {
            return big;
        }
        let idx = (diff.to_f64() * JACOBIAN_LOG_TABLE_INV_STEP) as usize;
        big + self.jacobian_log_table[idx]
    }

    /// Probability that a match state transitions to another match, given
    /// the insertion and deletion gap-open qualities. Symmetric in its
    /// arguments; the high-precision alternative to `1 - ph2pr[i + d]`.
    pub fn match_to_match_prob(&self, ins_qual: u8, del_qual: u8) -> T {
        let ins = (ins_qual & 127) as usize;
        let del = (del_qual & 127) as usize;
        let (min_q, max_q) = if ins <= del { (ins, del) } else { (del, ins) };
        self.match_to_match[((max_q * (max_q + 1)) >> 1) + min_q]
    }
}

impl<T: HmmFloat> Default for Context<T> {
    fn default() -> Self {
        Self::new()
    }
}

lazy_static! {
    /// Single-precision tables; shared by every f32 kernel call.
    pub static ref CONTEXT_F32: Context<f32> = Context::new();
    /// Double-precision tables; shared by every f64 kernel call.
    pub static ref CONTEXT_F64: Context<f64> = Context::new();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ph2pr_values() {
        let ctx = &*CONTEXT_F64;
        assert!((ctx.ph2pr[0] - 1.0).abs() < 1e-12);
        assert!((ctx.ph2pr[10] - 0.1).abs() < 1e-12);
        assert!((ctx.ph2pr[40] - 1e-4).abs() < 1e-16);
        // Strictly decreasing across the whole range.
        for q in 1..=MAX_QUAL {
            assert!(ctx.ph2pr[q] < ctx.ph2pr[q - 1]);
        }
    }

    #[test]
    fn test_initial_constants() {
        assert_eq!(CONTEXT_F32.initial_constant(), 2.0f32.powi(120));
        assert_eq!(CONTEXT_F64.initial_constant(), 2.0f64.powi(1020));
        let expected = (2.0f64.powi(1020)).log10();
        assert!((CONTEXT_F64.log10_initial_constant() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_approximate_log10_sum() {
        let ctx = &*CONTEXT_F64;
        // log10(10^-1 + 10^-1) = log10(0.2)
        let got = ctx.approximate_log10_sum_log10(-1.0, -1.0);
        assert!((got - 0.2f64.log10()).abs() < 1e-4);
        // Past the tolerance the larger term wins outright.
        assert_eq!(ctx.approximate_log10_sum_log10(-20.0, -1.0), -1.0);
        assert_eq!(
            ctx.approximate_log10_sum_log10(f64::NEG_INFINITY, -3.0),
            -3.0
        );
    }

    #[test]
    fn test_match_to_match_symmetry_and_range() {
        let ctx = &*CONTEXT_F64;
        for (i, d) in [(10u8, 40u8), (0, 0), (127, 3), (45, 45)] {
            let a = ctx.match_to_match_prob(i, d);
            let b = ctx.match_to_match_prob(d, i);
            assert_eq!(a, b, "table must be symmetric");
            assert!((0.0..=1.0).contains(&a));
        }
        // Equal qualities: 1 - (10^-q/10 + 10^-q/10) up to table quantization.
        let m2m = ctx.match_to_match_prob(45, 45);
        assert!((m2m - (1.0 - 2.0 * 10f64.powf(-4.5))).abs() < 1e-9);
        // Better qualities push the probability toward 1.
        assert!(ctx.match_to_match_prob(60, 60) > ctx.match_to_match_prob(20, 20));
    }

    #[test]
    fn test_match_to_match_masks_high_bit() {
        let ctx = &*CONTEXT_F64;
        assert_eq!(
            ctx.match_to_match_prob(40 | 0x80, 30),
            ctx.match_to_match_prob(40, 30)
        );
    }
}
