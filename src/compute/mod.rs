//! Runtime SIMD engine detection and selection
//!
//! Probes CPU capabilities once and picks the widest vector engine the
//! hardware (and the caller's feature mask) allows. The result feeds the
//! kernel dispatch in `hmm::dispatch`, which installs the matching function
//! pointers; performance-critical code never re-checks CPU features.
//!
//! Callers can pass an explicit feature mask to force a lower level — for
//! parity testing, or when running under an emulator that advertises
//! features it executes poorly.

pub mod encoding;
pub mod simd_abstraction;

/// Feature-mask bit: allow the narrow (128-bit) engine via SSE4.1.
pub const FEATURE_NARROW_SIMD_A: u64 = 1 << 0;
/// Feature-mask bit: allow the narrow (128-bit) engine via SSE4.2.
pub const FEATURE_NARROW_SIMD_B: u64 = 1 << 1;
/// Feature-mask bit: allow the wide (256-bit) engine.
pub const FEATURE_WIDE_SIMD: u64 = 1 << 2;

/// Feature mask selecting the best engine the hardware supports.
pub const ENABLE_ALL_FEATURES: u64 = u64::MAX;

/// Available SIMD engine levels based on CPU capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimdEngineType {
    /// Portable scalar kernels - always available.
    Scalar,
    /// 128-bit SIMD (SSE4.1/NEON) - 4 single / 2 double lanes.
    Engine128,
    /// 256-bit SIMD (AVX2) - 8 single / 4 double lanes; x86_64 only.
    #[cfg(target_arch = "x86_64")]
    Engine256,
}

/// Detects the optimal SIMD engine based on CPU features alone.
pub fn detect_optimal_simd_engine() -> SimdEngineType {
    select_simd_engine(ENABLE_ALL_FEATURES)
}

/// Selects the widest SIMD engine allowed by `feature_mask` and supported by
/// the CPU. Probe order is widest-first; the scalar level is the
/// unconditional fallback, so selection never fails.
pub fn select_simd_engine(feature_mask: u64) -> SimdEngineType {
    #[cfg(target_arch = "x86_64")]
    {
        if feature_mask & FEATURE_WIDE_SIMD != 0 && is_x86_feature_detected!("avx2") {
            return SimdEngineType::Engine256;
        }
        if feature_mask & (FEATURE_NARROW_SIMD_A | FEATURE_NARROW_SIMD_B) != 0
            && is_x86_feature_detected!("sse4.1")
        {
            return SimdEngineType::Engine128;
        }
        SimdEngineType::Scalar
    }

    #[cfg(target_arch = "aarch64")]
    {
        // NEON is baseline on aarch64 and counts as the narrow level.
        if feature_mask & (FEATURE_NARROW_SIMD_A | FEATURE_NARROW_SIMD_B | FEATURE_WIDE_SIMD) != 0 {
            SimdEngineType::Engine128
        } else {
            SimdEngineType::Scalar
        }
    }

    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    {
        let _ = feature_mask;
        SimdEngineType::Scalar
    }
}

/// Returns a human-readable description of the SIMD engine.
pub fn simd_engine_description(engine: SimdEngineType) -> &'static str {
    match engine {
        SimdEngineType::Scalar => "scalar (un-vectorized)",
        SimdEngineType::Engine128 => {
            #[cfg(target_arch = "x86_64")]
            {
                "SSE4.1 (128-bit, 4 single / 2 double lanes)"
            }
            #[cfg(not(target_arch = "x86_64"))]
            {
                "NEON (128-bit, 4 single / 2 double lanes)"
            }
        }
        #[cfg(target_arch = "x86_64")]
        SimdEngineType::Engine256 => "AVX2 (256-bit, 8 single / 4 double lanes)",
    }
}

/// Returns the (single-precision, double-precision) lane counts for an engine.
pub fn simd_lane_counts(engine: SimdEngineType) -> (usize, usize) {
    match engine {
        SimdEngineType::Scalar => (1, 1),
        SimdEngineType::Engine128 => (4, 2),
        #[cfg(target_arch = "x86_64")]
        SimdEngineType::Engine256 => (8, 4),
    }
}
