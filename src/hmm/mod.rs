//! PairHMM read-likelihood engine
//!
//! The module tree mirrors the data flow: a [`testcase::Testcase`] enters,
//! [`transitions`] and [`masks`] precompute its row/column tables, the
//! striped [`kernel`] (through a per-ISA entry point chosen by [`dispatch`])
//! produces a raw probability, and the hybrid dispatcher converts it to a
//! log₁₀ likelihood — falling back from single to double precision when the
//! result is unreliable. [`batch`] parallelizes independent testcases;
//! [`scalar`] is the reference oracle.

pub mod batch;
pub mod context;
pub mod dispatch;
pub mod kernel;
pub mod masks;
pub mod scalar;
pub mod shared;
pub mod testcase;
pub mod transitions;

#[cfg(target_arch = "x86_64")]
pub mod isa_avx2;
#[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
pub mod isa_sse_neon;

pub use batch::{compute_batch, BATCH_CHUNK_SIZE};
pub use dispatch::{init, run_one, InitError, KernelDispatch, MIN_ACCEPTED};
pub use testcase::Testcase;
