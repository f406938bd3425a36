// End-to-end scenarios: perfect match, mismatch penalty, ambiguity,
// indel alignment, underflow fallback, and the prior/quality direction
// properties (P2-P4).

use ferrous_pairhmm::hmm::context::CONTEXT_F64;
use ferrous_pairhmm::hmm::dispatch::KernelDispatch;
use ferrous_pairhmm::hmm::scalar::compute_log_likelihood;
use ferrous_pairhmm::hmm::{run_one, Testcase};

fn uniform_case(hap: &[u8], read: &[u8], q: u8) -> Testcase {
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

// S1: identical read and haplotype at q40 scores near the top of the scale.
#[test]
fn s1_perfect_match_near_zero() {
    let tc = uniform_case(b"ACGT", b"ACGT", 40);
    let log10 = run_one(&tc);
    assert!(log10 < 0.0, "log10 = {log10}");
    assert!(log10 > -1.5, "log10 = {log10}");
}

// S2: one substitution costs roughly log10(ph2pr[40]/3).
#[test]
fn s2_single_mismatch_penalty() {
    let l_match = run_one(&uniform_case(b"ACGT", b"ACGT", 40));
    let l_mis = run_one(&uniform_case(b"ACGT", b"ACCT", 40));
    let drop = l_mis - l_match;
    assert!(drop < -3.5, "drop = {drop}");
    assert!(drop > -6.0, "drop = {drop}");
}

// S3: N matches anything. Where the replaced column already matched every
// read base, the result is unchanged; in mixed contexts it stays close to
// the all-match analog.
#[test]
fn s3_ambiguity_matches_anything() {
    // Uniform context: replacing a hap A with N flips no cell.
    let plain = run_one(&uniform_case(b"AAAA", b"AAAA", 40));
    let hap_n = run_one(&uniform_case(b"AANA", b"AAAA", 40));
    assert!((plain - hap_n).abs() < 1e-9, "{plain} vs {hap_n}");

    let read_n = run_one(&uniform_case(b"AAAA", b"AANA", 40));
    assert!((plain - read_n).abs() < 1e-9, "{plain} vs {read_n}");

    // Mixed context: the diagonal cell sees the full match prior, so the
    // likelihood lands near the exact-match analog.
    let exact = run_one(&uniform_case(b"ACGTA", b"ACGTA", 40));
    let with_n = run_one(&uniform_case(b"ACGTN", b"ACGTA", 40));
    assert!((exact - with_n).abs() < 0.1, "{exact} vs {with_n}");
    // And far above the mismatching analog.
    let mismatched = run_one(&uniform_case(b"ACGTG", b"ACGTA", 40));
    assert!(with_n - mismatched > 3.0);
}

// P3: a single N, read- or haplotype-side, yields the match prior at that
// cell regardless of the partner base.
#[test]
fn p3_n_equalizes_partner_bases() {
    let with_a = run_one(&uniform_case(b"AANAA", b"AAAAA", 30));
    let with_c = run_one(&uniform_case(b"AANAA", b"AACAA", 30));
    // Both reads align the N column against different bases; every other
    // column matches identically, so only off-diagonal cells differ.
    assert!(
        (with_a - with_c).abs() < 0.2,
        "N column should not distinguish partner bases strongly: {with_a} vs {with_c}"
    );
    // The mismatch without N is far lower.
    let no_n = run_one(&uniform_case(b"AAGAA", b"AACAA", 30));
    assert!(with_c - no_n > 1.0);
}

// P2: turning a matching base into a mismatching one strictly lowers the
// likelihood.
#[test]
fn p2_mismatch_strictly_lowers() {
    let hap = b"ACGTACGTACGTACGT";
    let matched = uniform_case(hap, hap, 30);
    let mut read = hap.to_vec();
    read[7] = b'A'; // was T
    let mismatched = uniform_case(hap, &read, 30);
    let l_match = run_one(&matched);
    let l_mis = run_one(&mismatched);
    assert!(l_mis < l_match, "{l_mis} !< {l_match}");
}

// P4: direction of the quality effect. Higher base quality (smaller error
// probability) raises the likelihood at matches and lowers it at
// mismatches.
#[test]
fn p4_quality_direction() {
    let hap = b"ACGTACGTAC";

    // All-match read: better quality -> weakly higher likelihood.
    let mut prev = f64::NEG_INFINITY;
    for q in [10u8, 20, 30, 40] {
        let l = run_one(&uniform_case(hap, hap, q));
        assert!(l >= prev, "q={q}: {l} < {prev}");
        prev = l;
    }

    // One mismatch: better quality -> weakly lower likelihood.
    let mut read = hap.to_vec();
    read[4] = b'T'; // was A
    let mut prev = f64::INFINITY;
    for q in [10u8, 20, 30, 40] {
        let l = run_one(&uniform_case(hap, &read, q));
        assert!(l <= prev, "q={q}: {l} > {prev}");
        prev = l;
    }
}

// S4: a read with one deletion relative to a 100-base haplotype scores
// finite and identically across engines.
#[test]
fn s4_indel_alignment_across_engines() {
    let hap: Vec<u8> = (0..100)
        .map(|i| [b'A', b'C', b'G', b'T'][(i * 7 + i / 4) % 4])
        .collect();
    // Read: haplotype with base 50 deleted.
    let mut read = hap.clone();
    read.remove(50);
    let n = read.len();
    let tc = Testcase::new(
        hap,
        read,
        vec![30; n],
        vec![40; n],
        vec![40; n],
        vec![10; n],
    )
    .unwrap();

    let log10 = run_one(&tc);
    assert!(log10.is_finite());
    let reference = compute_log_likelihood::<f64>(&tc, &CONTEXT_F64);
    assert!((log10 - reference).abs() < 1e-5, "{log10} vs {reference}");

    #[cfg(target_arch = "x86_64")]
    {
        use ferrous_pairhmm::hmm::{isa_avx2, isa_sse_neon};
        if std::is_x86_feature_detected!("avx2") && std::is_x86_feature_detected!("sse4.1") {
            let narrow = unsafe { isa_sse_neon::compute_full_prob_f64(&tc) };
            let wide = unsafe { isa_avx2::compute_full_prob_f64(&tc) };
            let rel = ((narrow - wide) / wide).abs();
            assert!(rel < 1e-10, "{narrow:e} vs {wide:e}");
        }
    }
}

// S5: extreme mismatch load underflows single precision; the hybrid result
// is finite and matches the double reference.
#[test]
fn s5_underflow_falls_back_and_matches_reference() {
    let hap = vec![b'A'; 400];
    let read = vec![b'C'; 250];
    let n = read.len();
    let tc = Testcase::new(
        hap,
        read,
        vec![10; n],
        vec![45; n],
        vec![45; n],
        vec![10; n],
    )
    .unwrap();

    let dispatch = KernelDispatch::from_feature_mask(u64::MAX);
    let (value, fell_back) = dispatch.run_hybrid_outcome(&tc);
    assert!(fell_back, "single precision should have underflowed");
    assert!(value.is_finite());
    let reference = compute_log_likelihood::<f64>(&tc, &CONTEXT_F64);
    let close = (value - reference).abs() <= 1e-5
        || ((value - reference) / reference).abs() <= 1e-5;
    assert!(close, "{value} vs {reference}");
}
