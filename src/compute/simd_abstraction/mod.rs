//! SIMD abstraction layer
//!
//! This module exposes a single, portable surface area for the handful of hot
//! SIMD operations used by the PairHMM forward-recurrence kernels. It hides
//! ISA differences between x86_64 (SSE4.1/AVX2) and aarch64 (NEON) behind the
//! `HmmSimd` trait, while preserving zero-cost calls to architecture
//! intrinsics.
//!
//! The abstraction is intentionally small and opinionated: all functions are
//! unsafe and operate on architecture-specific vector types, but with a
//! uniform API and identical semantics across widths. The generic kernel in
//! `hmm::kernel` is written once against this trait and compiled per engine.
//!
//! ## Engines and widths
//!
//! Each engine pairs one floating-point precision with one vector width:
//! - `SimdEngine128F` — 128-bit, 4 lanes of f32 (SSE4.1 on x86_64; NEON on aarch64)
//! - `SimdEngine128D` — 128-bit, 2 lanes of f64
//! - `SimdEngine256F` — 256-bit, 8 lanes of f32 (AVX2, x86_64 only)
//! - `SimdEngine256D` — 256-bit, 4 lanes of f64 (AVX2, x86_64 only)
//!
//! Alongside the float vector type, every engine carries an integer mask
//! vector with one mask word (u32 for f32 engines, u64 for f64 engines) per
//! float lane. The kernel streams the haplotype match/mismatch bitmaps
//! through these mask vectors one bit per column; the per-lane MSB drives the
//! prior selection blend.
//!
//! ## Safety model
//!
//! All trait functions are `unsafe` because they may require specific CPU
//! features (SSE4.1, AVX2) and dereference raw pointers for loads/stores.
//! Callers must ensure the chosen engine matches the CPU's supported features
//! (handled by runtime detection in `compute`) and that pointer arguments are
//! valid for the accessed size. The unaligned load/store forms are used
//! throughout, so no alignment obligations exist.

pub mod engine128;
#[cfg(target_arch = "x86_64")]
pub mod engine256;
pub mod types;

pub use engine128::{SimdEngine128D, SimdEngine128F};
#[cfg(target_arch = "x86_64")]
pub use engine256::{SimdEngine256D, SimdEngine256F};

/// Machine word holding one lane's slice of a haplotype class bitmap.
///
/// u32 for the single-precision engines, u64 for the double-precision ones;
/// the word width fixes how many columns a single mask refill covers.
pub trait MaskWord:
    Copy
    + Eq
    + std::ops::BitOr<Output = Self>
    + std::ops::BitAnd<Output = Self>
    + std::ops::Not<Output = Self>
    + std::ops::Shl<u32, Output = Self>
    + std::ops::Shr<u32, Output = Self>
{
    /// Bit width of the word (32 or 64).
    const BITS: u32;
    const ZERO: Self;
    const ONE: Self;
    const ONES: Self;
}

impl MaskWord for u32 {
    const BITS: u32 = 32;
    const ZERO: Self = 0;
    const ONE: Self = 1;
    const ONES: Self = u32::MAX;
}

impl MaskWord for u64 {
    const BITS: u32 = 64;
    const ZERO: Self = 0;
    const ONE: Self = 1;
    const ONES: Self = u64::MAX;
}

/// Minimal SIMD engine contract for the striped PairHMM kernel.
///
/// The trait deliberately contains only the operations the forward recurrence
/// needs: lane-wise float arithmetic, the single-lane shift that threads
/// anti-diagonal dependences between iterations, and the mask-vector
/// plumbing for prior selection. Concrete engines map each operation to one
/// or two native intrinsics.
pub trait HmmSimd: Copy {
    /// Scalar element type (f32 or f64).
    type Elem: Copy;
    /// Per-lane mask word type (u32 or u64).
    type Mask: MaskWord;
    /// Native float vector with `LANES` lanes.
    type Vf: Copy;
    /// Native integer vector with `LANES` mask-word lanes.
    type Vm: Copy;

    /// Number of float lanes processed in parallel.
    const LANES: usize;

    // ===== Creation =====
    /// All lanes zero.
    unsafe fn zero() -> Self::Vf;
    /// Broadcast `x` into all lanes.
    unsafe fn splat(x: Self::Elem) -> Self::Vf;
    /// Lane 0 = `x`, all other lanes zero.
    unsafe fn set_low(x: Self::Elem) -> Self::Vf;

    // ===== Arithmetic =====
    unsafe fn add(a: Self::Vf, b: Self::Vf) -> Self::Vf;
    unsafe fn sub(a: Self::Vf, b: Self::Vf) -> Self::Vf;
    unsafe fn mul(a: Self::Vf, b: Self::Vf) -> Self::Vf;
    unsafe fn div(a: Self::Vf, b: Self::Vf) -> Self::Vf;

    // ===== Memory =====
    /// Load `LANES` elements from an unaligned pointer.
    unsafe fn loadu(p: *const Self::Elem) -> Self::Vf;
    /// Store `LANES` elements to an unaligned pointer.
    unsafe fn storeu(p: *mut Self::Elem, v: Self::Vf);

    // ===== Lane shifts =====
    /// Shift lanes up by one (lane ℓ moves to lane ℓ+1), inserting
    /// `shift_in` at lane 0. Returns the shifted vector and the element
    /// shifted out of lane `LANES-1`.
    unsafe fn shift_lanes_up(v: Self::Vf, shift_in: Self::Elem) -> (Self::Vf, Self::Elem);
    /// Same shift without materializing the shifted-out element; used in the
    /// final stripe where no successor consumes it.
    unsafe fn shift_lanes_up_discard(v: Self::Vf, shift_in: Self::Elem) -> Self::Vf;

    // ===== Mask plumbing =====
    /// All mask lanes zero.
    unsafe fn mask_zero() -> Self::Vm;
    /// Load one mask word per lane from `words` (`words.len() == LANES`).
    unsafe fn mask_from_lanes(words: &[Self::Mask]) -> Self::Vm;
    /// Shift every mask lane left by one bit.
    unsafe fn mask_shl1(m: Self::Vm) -> Self::Vm;
    /// Per-lane select: take the lane from `on_set` where the mask lane's
    /// most significant bit is 1, else from `on_clear`.
    unsafe fn blend_by_mask(on_clear: Self::Vf, on_set: Self::Vf, m: Self::Vm) -> Self::Vf;
}
