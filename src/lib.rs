//! ferrous-pairhmm: vectorized PairHMM read-likelihoods for variant calling
//!
//! Given a candidate haplotype and a sequencing read with per-base and
//! per-position gap qualities, the engine computes log₁₀ P(read | haplotype)
//! under a three-state (Match/Insert/Delete) pair hidden Markov model. The
//! forward recurrence runs in product space, SIMD-vectorized along
//! anti-diagonal stripes, with a hybrid precision policy: single precision
//! first, double precision when the result falls into the unreliable range.
//!
//! Typical use:
//!
//! ```no_run
//! use ferrous_pairhmm::hmm::{self, Testcase};
//!
//! let tc = Testcase::new(
//!     b"ACGTACGT".to_vec(),
//!     b"ACGT".to_vec(),
//!     vec![40; 4],
//!     vec![45; 4],
//!     vec![45; 4],
//!     vec![10; 4],
//! )?;
//! let log10_likelihood = hmm::run_one(&tc);
//!
//! let batch = vec![tc; 128];
//! let mut out = vec![0.0; batch.len()];
//! hmm::compute_batch(&batch, &mut out, 8);
//! # Ok::<(), std::io::Error>(())
//! ```
//!
//! Kernel selection happens once per process: either implicitly (best
//! available engine) on first use, or explicitly via [`hmm::init`] with a
//! feature mask. After that the dispatch record is immutable.
//!
//! Floating-point environment: the kernels pre-scale the recurrence by a
//! large power of two precisely so that denormals only arise in inputs that
//! the hybrid threshold reroutes to double precision anyway. For full
//! throughput the host process should enable flush-to-zero/denormals-are-
//! zero before the first kernel call; the engine itself never touches the
//! FP control state, and correctness does not depend on it.

pub mod compute;
pub mod hmm;
pub mod io;
