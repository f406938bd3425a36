//! 128-bit kernel entry points (SSE4.1 on x86_64, NEON on aarch64)
//!
//! Baseline vectorized kernels: 4 single-precision or 2 double-precision
//! rows per stripe. These are the narrow-SIMD level of runtime dispatch and
//! the partners of the 256-bit kernels in stripe-size-independence tests.

use crate::compute::simd_abstraction::{SimdEngine128D, SimdEngine128F};
use crate::generate_hmm_entry;

generate_hmm_entry!(
    name = compute_full_prob_f32,
    lanes = 4,
    engine = SimdEngine128F,
    elem = f32,
    context = CONTEXT_F32,
    cfg = cfg(target_arch = "x86_64"),
    target_feature = "sse4.1",
);

generate_hmm_entry!(
    name = compute_full_prob_f64,
    lanes = 2,
    engine = SimdEngine128D,
    elem = f64,
    context = CONTEXT_F64,
    cfg = cfg(target_arch = "x86_64"),
    target_feature = "sse4.1",
);

generate_hmm_entry!(
    name = compute_full_prob_f32,
    lanes = 4,
    engine = SimdEngine128F,
    elem = f32,
    context = CONTEXT_F32,
    cfg = cfg(target_arch = "aarch64"),
    target_feature = "neon",
);

generate_hmm_entry!(
    name = compute_full_prob_f64,
    lanes = 2,
    engine = SimdEngine128D,
    elem = f64,
    context = CONTEXT_F64,
    cfg = cfg(target_arch = "aarch64"),
    target_feature = "neon",
);

#[cfg(test)]
mod tests {
    use crate::hmm::context::CONTEXT_F64;
    use crate::hmm::scalar::compute_full_prob;
    use crate::hmm::testcase::Testcase;

    fn perfect_match() -> Testcase {
        Testcase::new(
            b"ACGTACGTAC".to_vec(),
            b"ACGTACGTAC".to_vec(),
            vec![40; 10],
            vec![45; 10],
            vec![45; 10],
            vec![10; 10],
        )
        .unwrap()
    }

    #[test]
    #[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
    fn test_narrow_f64_matches_scalar() {
        #[cfg(target_arch = "x86_64")]
        if !std::is_x86_feature_detected!("sse4.1") {
            return;
        }
        let tc = perfect_match();
        let simd = unsafe { super::compute_full_prob_f64(&tc) };
        let scalar = compute_full_prob::<f64>(&tc, &CONTEXT_F64);
        let rel = ((simd - scalar) / scalar).abs();
        assert!(rel < 1e-12, "simd={simd} scalar={scalar}");
    }
}
