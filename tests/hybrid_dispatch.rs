// Hybrid precision policy: pre-scaling cancellation (P5), threshold
// behavior, and engine forcing through feature masks.

use ferrous_pairhmm::compute::SimdEngineType;
use ferrous_pairhmm::hmm::context::{CONTEXT_F32, CONTEXT_F64};
use ferrous_pairhmm::hmm::dispatch::{KernelDispatch, MIN_ACCEPTED};
use ferrous_pairhmm::hmm::Testcase;

fn testcase(hap: &[u8], read: &[u8], q: u8) -> Testcase {
    let n = read.len();
    Testcase::new(
        hap.to_vec(),
        read.to_vec(),
        vec![q; n],
        vec![45; n],
        vec![45; n],
        vec![10; n],
    )
    .unwrap()
}

// P5: result + log10(C_init) is invariant to the precision that ran; the
// two pre-scaling constants must cancel exactly, never leak the
// log10(2^900) gap between them.
#[test]
fn p5_prescaling_cancellation() {
    let dispatch = KernelDispatch::from_feature_mask(u64::MAX);
    let tc = testcase(b"ACGTACGTACGTACGTACGT", b"ACGTACGTACGTACGTACGT", 35);

    let single_raw = dispatch.single_raw(&tc);
    assert!(single_raw >= MIN_ACCEPTED, "case must not underflow");
    let single = f64::from(single_raw.log10() - CONTEXT_F32.log10_initial_constant());
    let double = dispatch.double_raw(&tc).log10() - CONTEXT_F64.log10_initial_constant();

    let diff = (single - double).abs();
    assert!(diff < 1e-5, "precision leak: {single} vs {double}");

    // The constant gap between the two scalings, for contrast.
    let gap = 900.0 * 2f64.log10();
    assert!(diff < gap / 1e6);
}

#[test]
fn hybrid_uses_single_above_threshold() {
    let dispatch = KernelDispatch::from_feature_mask(u64::MAX);
    let tc = testcase(b"ACGTACGT", b"ACGTACGT", 40);
    let (value, fell_back) = dispatch.run_hybrid_outcome(&tc);
    assert!(!fell_back);
    let expected =
        f64::from(dispatch.single_raw(&tc).log10() - CONTEXT_F32.log10_initial_constant());
    assert_eq!(value, expected);
}

#[test]
fn hybrid_threshold_is_exact() {
    assert_eq!(MIN_ACCEPTED, 1e-28_f32);
}

#[test]
fn forced_scalar_and_auto_agree() {
    let auto = KernelDispatch::from_feature_mask(u64::MAX);
    let scalar = KernelDispatch::from_feature_mask(0);
    assert_eq!(scalar.engine(), SimdEngineType::Scalar);

    for (hap, read) in [
        (&b"ACGTACGTACGTACGT"[..], &b"ACGTACGTACGTACGT"[..]),
        (b"AAAACCCCGGGGTTTTAAAA", b"AACCCCGGGGTTTT"),
        (b"ACGT", b"AGGT"),
    ] {
        let tc = testcase(hap, read, 30);
        let a = auto.run_hybrid(&tc);
        let b = scalar.run_hybrid(&tc);
        let close = (a - b).abs() <= 1e-5 || ((a - b) / b).abs() <= 1e-5;
        assert!(close, "{a} vs {b}");
    }
}

// Results on the two sides of the threshold stay continuous: a family of
// testcases with growing mismatch load crosses from the single path to the
// double path without a jump.
#[test]
fn hybrid_is_continuous_across_threshold() {
    let dispatch = KernelDispatch::from_feature_mask(u64::MAX);
    let mut previous: Option<f64> = None;
    let mut crossed = false;

    for mismatches in (0..=120).step_by(10) {
        let hap = vec![b'A'; 160];
        let mut read = vec![b'A'; 120];
        for slot in read.iter_mut().take(mismatches) {
            *slot = b'C';
        }
        let tc = Testcase::new(
            hap,
            read,
            vec![20; 120],
            vec![45; 120],
            vec![45; 120],
            vec![10; 120],
        )
        .unwrap();
        let (value, fell_back) = dispatch.run_hybrid_outcome(&tc);
        crossed |= fell_back;
        assert!(value.is_finite());
        if let Some(prev) = previous {
            assert!(value < prev, "more mismatches must score lower");
            // Steps are bounded by the per-mismatch cost; a 2^900 leak
            // would show up as a ~271 log10 cliff.
            assert!(prev - value < 60.0, "discontinuity: {prev} -> {value}");
        }
        previous = Some(value);
    }
    assert!(crossed, "corpus never reached the double-precision range");
}
