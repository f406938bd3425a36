//! Batch driver and parallel loop
//!
//! Fans a contiguous array of independent testcases out over up to
//! `max_concurrency` rayon workers and writes one log₁₀ likelihood per
//! slot. Workers share nothing but the immutable dispatch record and table
//! statics; each pins to one testcase at a time, so scheduling is dynamic
//! (work stealing) with a chunk floor that keeps per-task overhead
//! negligible at typical read lengths.

use rayon::prelude::*;

use super::dispatch::{installed, KernelDispatch};
use super::testcase::Testcase;

/// Minimum number of testcases a worker claims at once.
pub const BATCH_CHUNK_SIZE: usize = 10_000;

/// Compute log₁₀ likelihoods for `testcases` into `out` using up to
/// `max_concurrency` worker threads.
///
/// Both slices must have the same length (programmer error otherwise, so
/// this panics rather than returning an error). `out` slots are written
/// independently and in no particular order; the contents on entry are
/// ignored. The call returns only after every slot is written.
pub fn compute_batch(testcases: &[Testcase], out: &mut [f64], max_concurrency: usize) {
    assert_eq!(
        testcases.len(),
        out.len(),
        "output array length must match testcase count"
    );
    let dispatch = installed();

    if max_concurrency <= 1 || testcases.len() <= 1 {
        for (slot, tc) in out.iter_mut().zip(testcases) {
            *slot = dispatch.run_hybrid(tc);
        }
        return;
    }

    match rayon::ThreadPoolBuilder::new()
        .num_threads(max_concurrency)
        .build()
    {
        Ok(pool) => pool.install(|| par_compute(dispatch, testcases, out)),
        Err(e) => {
            log::warn!("failed to build batch thread pool ({e}); using global pool");
            par_compute(dispatch, testcases, out)
        }
    }
}

fn par_compute(dispatch: &KernelDispatch, testcases: &[Testcase], out: &mut [f64]) {
    out.par_iter_mut()
        .zip(testcases.par_iter())
        .with_min_len(BATCH_CHUNK_SIZE)
        .for_each(|(slot, tc)| *slot = dispatch.run_hybrid(tc));
}
