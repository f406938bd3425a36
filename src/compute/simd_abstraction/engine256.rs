//! 256-bit SIMD engines (AVX2)
//!
//! AVX2 implementations of the `HmmSimd` trait on x86_64: 8 lanes of f32 or
//! 4 lanes of f64, mapping directly to `_mm256_*` intrinsics.
//!
//! Highlights
//! - The cross-lane single-element shift (the anti-diagonal carry) uses one
//!   `permutevar8x32`/`permute4x64` rotate plus a lane-0 blend; the rotate
//!   conveniently places the shifted-out element in lane 0 for extraction.
//! - Mask vectors use 256-bit integer shifts (`slli_epi32`/`slli_epi64`),
//!   which is what raises the requirement from AVX to AVX2.
//! - All functions are additionally annotated with
//!   `#[target_feature(enable = "avx2")]`; callers must ensure AVX2 is
//!   available (the crate's runtime dispatch does this for you).

#![cfg(target_arch = "x86_64")]

use super::types::simd_arch;
use super::HmmSimd;

/// 256-bit single-precision engine (8 × f32).
#[derive(Clone, Copy)]
pub struct SimdEngine256F;

#[allow(unsafe_op_in_unsafe_fn)]
impl HmmSimd for SimdEngine256F {
    type Elem = f32;
    type Mask = u32;
    type Vf = simd_arch::__m256;
    type Vm = simd_arch::__m256i;

    const LANES: usize = 8;

    #[inline]
    #[target_feature(enable = "avx2")]
    unsafe fn zero() -> Self::Vf {
        simd_arch::_mm256_setzero_ps()
    }

    #[inline]
    #[target_feature(enable = "avx2")]
    unsafe fn splat(x: f32) -> Self::Vf {
        simd_arch::_mm256_set1_ps(x)
    }

    #[inline]
    #[target_feature(enable = "avx2")]
    unsafe fn set_low(x: f32) -> Self::Vf {
        simd_arch::_mm256_blend_ps::<0x01>(
            simd_arch::_mm256_setzero_ps(),
            simd_arch::_mm256_set1_ps(x),
        )
    }

    #[inline]
    #[target_feature(enable = "avx2")]
    unsafe fn add(a: Self::Vf, b: Self::Vf) -> Self::Vf {
        simd_arch::_mm256_add_ps(a, b)
    }

    #[inline]
    #[target_feature(enable = "avx2")]
    unsafe fn sub(a: Self::Vf, b: Self::Vf) -> Self::Vf {
        simd_arch::_mm256_sub_ps(a, b)
    }

    #[inline]
    #[target_feature(enable = "avx2")]
    unsafe fn mul(a: Self::Vf, b: Self::Vf) -> Self::Vf {
        simd_arch::_mm256_mul_ps(a, b)
    }

    #[inline]
    #[target_feature(enable = "avx2")]
    unsafe fn div(a: Self::Vf, b: Self::Vf) -> Self::Vf {
        simd_arch::_mm256_div_ps(a, b)
    }

    #[inline]
    #[target_feature(enable = "avx2")]
    unsafe fn loadu(p: *const f32) -> Self::Vf {
        simd_arch::_mm256_loadu_ps(p)
    }

    #[inline]
    #[target_feature(enable = "avx2")]
    unsafe fn storeu(p: *mut f32, v: Self::Vf) {
        simd_arch::_mm256_storeu_ps(p, v)
    }

    #[inline]
    #[target_feature(enable = "avx2")]
    unsafe fn shift_lanes_up(v: Self::Vf, shift_in: f32) -> (Self::Vf, f32) {
        let idx = simd_arch::_mm256_setr_epi32(7, 0, 1, 2, 3, 4, 5, 6);
        let rot = simd_arch::_mm256_permutevar8x32_ps(v, idx);
        let out = simd_arch::_mm_cvtss_f32(simd_arch::_mm256_castps256_ps128(rot));
        (
            simd_arch::_mm256_blend_ps::<0x01>(rot, simd_arch::_mm256_set1_ps(shift_in)),
            out,
        )
    }

    #[inline]
    #[target_feature(enable = "avx2")]
    unsafe fn shift_lanes_up_discard(v: Self::Vf, shift_in: f32) -> Self::Vf {
        let idx = simd_arch::_mm256_setr_epi32(7, 0, 1, 2, 3, 4, 5, 6);
        let rot = simd_arch::_mm256_permutevar8x32_ps(v, idx);
        simd_arch::_mm256_blend_ps::<0x01>(rot, simd_arch::_mm256_set1_ps(shift_in))
    }

    #[inline]
    #[target_feature(enable = "avx2")]
    unsafe fn mask_zero() -> Self::Vm {
        simd_arch::_mm256_setzero_si256()
    }

    #[inline]
    #[target_feature(enable = "avx2")]
    unsafe fn mask_from_lanes(words: &[u32]) -> Self::Vm {
        debug_assert!(words.len() >= Self::LANES);
        simd_arch::_mm256_loadu_si256(words.as_ptr() as *const simd_arch::__m256i)
    }

    #[inline]
    #[target_feature(enable = "avx2")]
    unsafe fn mask_shl1(m: Self::Vm) -> Self::Vm {
        simd_arch::_mm256_slli_epi32::<1>(m)
    }

    #[inline]
    #[target_feature(enable = "avx2")]
    unsafe fn blend_by_mask(on_clear: Self::Vf, on_set: Self::Vf, m: Self::Vm) -> Self::Vf {
        simd_arch::_mm256_blendv_ps(on_clear, on_set, simd_arch::_mm256_castsi256_ps(m))
    }
}

/// 256-bit double-precision engine (4 × f64).
#[derive(Clone, Copy)]
pub struct SimdEngine256D;

#[allow(unsafe_op_in_unsafe_fn)]
impl HmmSimd for SimdEngine256D {
    type Elem = f64;
    type Mask = u64;
    type Vf = simd_arch::__m256d;
    type Vm = simd_arch::__m256i;

    const LANES: usize = 4;

    #[inline]
    #[target_feature(enable = "avx2")]
    unsafe fn zero() -> Self::Vf {
        simd_arch::_mm256_setzero_pd()
    }

    #[inline]
    #[target_feature(enable = "avx2")]
    unsafe fn splat(x: f64) -> Self::Vf {
        simd_arch::_mm256_set1_pd(x)
    }

    #[inline]
    #[target_feature(enable = "avx2")]
    unsafe fn set_low(x: f64) -> Self::Vf {
        simd_arch::_mm256_blend_pd::<0x1>(
            simd_arch::_mm256_setzero_pd(),
            simd_arch::_mm256_set1_pd(x),
        )
    }

    #[inline]
    #[target_feature(enable = "avx2")]
    unsafe fn add(a: Self::Vf, b: Self::Vf) -> Self::Vf {
        simd_arch::_mm256_add_pd(a, b)
    }

    #[inline]
    #[target_feature(enable = "avx2")]
    unsafe fn sub(a: Self::Vf, b: Self::Vf) -> Self::Vf {
        simd_arch::_mm256_sub_pd(a, b)
    }

    #[inline]
    #[target_feature(enable = "avx2")]
    unsafe fn mul(a: Self::Vf, b: Self::Vf) -> Self::Vf {
        simd_arch::_mm256_mul_pd(a, b)
    }

    #[inline]
    #[target_feature(enable = "avx2")]
    unsafe fn div(a: Self::Vf, b: Self::Vf) -> Self::Vf {
        simd_arch::_mm256_div_pd(a, b)
    }

    #[inline]
    #[target_feature(enable = "avx2")]
    unsafe fn loadu(p: *const f64) -> Self::Vf {
        simd_arch::_mm256_loadu_pd(p)
    }

    #[inline]
    #[target_feature(enable = "avx2")]
    unsafe fn storeu(p: *mut f64, v: Self::Vf) {
        simd_arch::_mm256_storeu_pd(p, v)
    }

    #[inline]
    #[target_feature(enable = "avx2")]
    unsafe fn shift_lanes_up(v: Self::Vf, shift_in: f64) -> (Self::Vf, f64) {
        let rot = simd_arch::_mm256_permute4x64_pd::<0x93>(v);
        let out = simd_arch::_mm_cvtsd_f64(simd_arch::_mm256_castpd256_pd128(rot));
        (
            simd_arch::_mm256_blend_pd::<0x1>(rot, simd_arch::_mm256_set1_pd(shift_in)),
            out,
        )
    }

    #[inline]
    #[target_feature(enable = "avx2")]
    unsafe fn shift_lanes_up_discard(v: Self::Vf, shift_in: f64) -> Self::Vf {
        let rot = simd_arch::_mm256_permute4x64_pd::<0x93>(v);
        simd_arch::_mm256_blend_pd::<0x1>(rot, simd_arch::_mm256_set1_pd(shift_in))
    }

    #[inline]
    #[target_feature(enable = "avx2")]
    unsafe fn mask_zero() -> Self::Vm {
        simd_arch::_mm256_setzero_si256()
    }

    #[inline]
    #[target_feature(enable = "avx2")]
    unsafe fn mask_from_lanes(words: &[u64]) -> Self::Vm {
        debug_assert!(words.len() >= Self::LANES);
        simd_arch::_mm256_loadu_si256(words.as_ptr() as *const simd_arch::__m256i)
    }

    #[inline]
    #[target_feature(enable = "avx2")]
    unsafe fn mask_shl1(m: Self::Vm) -> Self::Vm {
        simd_arch::_mm256_slli_epi64::<1>(m)
    }

    #[inline]
    #[target_feature(enable = "avx2")]
    unsafe fn blend_by_mask(on_clear: Self::Vf, on_set: Self::Vf, m: Self::Vm) -> Self::Vf {
        simd_arch::_mm256_blendv_pd(on_clear, on_set, simd_arch::_mm256_castsi256_pd(m))
    }
}
