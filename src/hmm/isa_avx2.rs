//! 256-bit kernel entry points (AVX2, x86_64 only)
//!
//! Wide-SIMD level of runtime dispatch: 8 single-precision or 4
//! double-precision rows per stripe, roughly doubling cell throughput over
//! the 128-bit kernels on compute-bound inputs.

#![cfg(target_arch = "x86_64")]

use crate::compute::simd_abstraction::{SimdEngine256D, SimdEngine256F};
use crate::generate_hmm_entry;

generate_hmm_entry!(
    name = compute_full_prob_f32,
    lanes = 8,
    engine = SimdEngine256F,
    elem = f32,
    context = CONTEXT_F32,
    cfg = cfg(target_arch = "x86_64"),
    target_feature = "avx2",
);

generate_hmm_entry!(
    name = compute_full_prob_f64,
    lanes = 4,
    engine = SimdEngine256D,
    elem = f64,
    context = CONTEXT_F64,
    cfg = cfg(target_arch = "x86_64"),
    target_feature = "avx2",
);

#[cfg(test)]
mod tests {
    use crate::hmm::context::CONTEXT_F64;
    use crate::hmm::scalar::compute_full_prob;
    use crate::hmm::testcase::Testcase;

    #[test]
    fn test_wide_f64_matches_scalar() {
        if !std::is_x86_feature_detected!("avx2") {
            return;
        }
        let tc = Testcase::new(
            b"ACGTACGTACGTACGTACGT".to_vec(),
            b"ACGTACGTACGTACG".to_vec(),
            vec![35; 15],
            vec![45; 15],
            vec![45; 15],
            vec![10; 15],
        )
        .unwrap();
        let simd = unsafe { super::compute_full_prob_f64(&tc) };
        let scalar = compute_full_prob::<f64>(&tc, &CONTEXT_F64);
        let rel = ((simd - scalar) / scalar).abs();
        assert!(rel < 1e-12, "simd={simd} scalar={scalar}");
    }
}
