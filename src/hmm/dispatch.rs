//! Kernel selection and hybrid single/double dispatch
//!
//! At initialization the best available (or explicitly allowed) SIMD level
//! is resolved once and a pair of kernel function pointers — one per
//! precision — is installed in an immutable dispatch record. The hot path
//! reads the record without synchronization.
//!
//! Every likelihood goes through the hybrid policy: run the cheap
//! single-precision kernel first and accept its result unless it falls
//! below `MIN_ACCEPTED`, the calibrated lower bound of single-precision
//! reliability under the 2^120 pre-scaling. Below the threshold the
//! double-precision kernel recomputes the testcase. For the large majority
//! of read/haplotype pairs the single-precision result stands, at roughly
//! twice the per-cell throughput.

use std::sync::OnceLock;

use crate::compute::{
    select_simd_engine, simd_engine_description, SimdEngineType, ENABLE_ALL_FEATURES,
};

use super::context::{CONTEXT_F32, CONTEXT_F64};
#[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
use super::isa_sse_neon;
use super::scalar;
use super::testcase::Testcase;

#[cfg(target_arch = "x86_64")]
use super::isa_avx2;

/// Reliability floor for the single-precision kernel. Results below this
/// are recomputed in double precision; the exact value is part of the
/// numeric contract and must not be tuned.
pub const MIN_ACCEPTED: f32 = 1e-28;

/// Single-precision kernel entry: raw pre-log probability.
pub type SingleKernelFn = unsafe fn(&Testcase) -> f32;
/// Double-precision kernel entry: raw pre-log probability.
pub type DoubleKernelFn = unsafe fn(&Testcase) -> f64;

/// Immutable record of the installed kernels. Constructed once per process
/// (or explicitly per test), then only read.
pub struct KernelDispatch {
    engine: SimdEngineType,
    single: SingleKernelFn,
    double: DoubleKernelFn,
}

/// Error returned by [`init`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitError {
    /// `init` was called after the dispatch record had already been
    /// installed (by an earlier `init` or by first use).
    AlreadyInitialized,
}

impl std::fmt::Display for InitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InitError::AlreadyInitialized => {
                write!(f, "PairHMM kernel dispatch is already initialized")
            }
        }
    }
}

impl std::error::Error for InitError {}

impl KernelDispatch {
    /// Build the dispatch record for a specific engine level.
    pub fn for_engine(engine: SimdEngineType) -> Self {
        match engine {
            #[cfg(target_arch = "x86_64")]
            SimdEngineType::Engine256 => KernelDispatch {
                engine,
                single: isa_avx2::compute_full_prob_f32,
                double: isa_avx2::compute_full_prob_f64,
            },
            #[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
            SimdEngineType::Engine128 => KernelDispatch {
                engine,
                single: isa_sse_neon::compute_full_prob_f32,
                double: isa_sse_neon::compute_full_prob_f64,
            },
            _ => KernelDispatch {
                engine: SimdEngineType::Scalar,
                single: scalar::entry::compute_full_prob_f32,
                double: scalar::entry::compute_full_prob_f64,
            },
        }
    }

    /// Resolve the engine from a feature mask and build the record.
    pub fn from_feature_mask(feature_mask: u64) -> Self {
        Self::for_engine(select_simd_engine(feature_mask))
    }

    /// The engine level this record runs on.
    #[inline]
    pub fn engine(&self) -> SimdEngineType {
        self.engine
    }

    /// Raw single-precision result for one testcase.
    #[inline]
    pub fn single_raw(&self, tc: &Testcase) -> f32 {
        // Safety: `engine` was validated against CPU features at selection.
        unsafe { (self.single)(tc) }
    }

    /// Raw double-precision result for one testcase.
    #[inline]
    pub fn double_raw(&self, tc: &Testcase) -> f64 {
        // Safety: as above.
        unsafe { (self.double)(tc) }
    }

    /// Hybrid log₁₀ likelihood plus whether the double-precision kernel had
    /// to run.
    pub fn run_hybrid_outcome(&self, tc: &Testcase) -> (f64, bool) {
        let single = self.single_raw(tc);
        if single < MIN_ACCEPTED {
            let double = self.double_raw(tc);
            (
                double.log10() - CONTEXT_F64.log10_initial_constant(),
                true,
            )
        } else {
            (
                f64::from(single.log10() - CONTEXT_F32.log10_initial_constant()),
                false,
            )
        }
    }

    /// Hybrid log₁₀ likelihood for one testcase.
    #[inline]
    pub fn run_hybrid(&self, tc: &Testcase) -> f64 {
        self.run_hybrid_outcome(tc).0
    }
}

static DISPATCH: OnceLock<KernelDispatch> = OnceLock::new();

/// One-shot initialization with an explicit feature mask (bit 0 = SSE4.1,
/// bit 1 = SSE4.2, bit 2 = AVX2; all-ones = best available). Must complete
/// before any likelihood call; fails if the record is already installed.
/// The scalar level always matches, so a restrictive mask degrades rather
/// than fails.
pub fn init(feature_mask: u64) -> Result<(), InitError> {
    let dispatch = KernelDispatch::from_feature_mask(feature_mask);
    log::info!(
        "PairHMM kernels: {}",
        simd_engine_description(dispatch.engine())
    );
    DISPATCH
        .set(dispatch)
        .map_err(|_| InitError::AlreadyInitialized)
}

/// The installed dispatch record, auto-initializing to the best available
/// engine on first use.
pub fn installed() -> &'static KernelDispatch {
    DISPATCH.get_or_init(|| {
        let dispatch = KernelDispatch::from_feature_mask(ENABLE_ALL_FEATURES);
        log::info!(
            "PairHMM kernels: {}",
            simd_engine_description(dispatch.engine())
        );
        dispatch
    })
}

/// Convenience single-shot entry: hybrid log₁₀ likelihood for one testcase.
pub fn run_one(tc: &Testcase) -> f64 {
    installed().run_hybrid(tc)
}
