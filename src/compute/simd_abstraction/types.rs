//! SIMD type aliases and architecture bindings
//!
//! A tiny portability layer so the rest of `simd_abstraction` can refer to
//! `simd_arch` and the vector types uniformly on x86_64 and aarch64.
//!
//! - On x86_64 the 128-bit engines use the native `__m128`/`__m128d`/`__m128i`
//!   types and the 256-bit engines use `__m256`/`__m256d`/`__m256i`.
//! - On aarch64 the 128-bit engines use the NEON `float32x4_t`/`float64x2_t`
//!   and `uint32x4_t`/`uint64x2_t` types directly; no wrapper is needed since
//!   the probability kernels never reinterpret between element widths.

#[cfg(target_arch = "x86_64")]
pub use std::arch::x86_64 as simd_arch;

#[cfg(target_arch = "aarch64")]
pub use std::arch::aarch64 as simd_arch;

/// 128-bit vector of 4 × f32.
#[cfg(target_arch = "x86_64")]
pub type F32Vec128 = simd_arch::__m128;
#[cfg(target_arch = "aarch64")]
pub type F32Vec128 = simd_arch::float32x4_t;

/// 128-bit vector of 2 × f64.
#[cfg(target_arch = "x86_64")]
pub type F64Vec128 = simd_arch::__m128d;
#[cfg(target_arch = "aarch64")]
pub type F64Vec128 = simd_arch::float64x2_t;

/// 128-bit vector of 4 × u32 mask words.
#[cfg(target_arch = "x86_64")]
pub type M32Vec128 = simd_arch::__m128i;
#[cfg(target_arch = "aarch64")]
pub type M32Vec128 = simd_arch::uint32x4_t;

/// 128-bit vector of 2 × u64 mask words.
#[cfg(target_arch = "x86_64")]
pub type M64Vec128 = simd_arch::__m128i;
#[cfg(target_arch = "aarch64")]
pub type M64Vec128 = simd_arch::uint64x2_t;
