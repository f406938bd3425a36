//! 128-bit SIMD engines (SSE4.1 on x86_64; NEON on aarch64)
//!
//! Baseline vector width available on every supported CPU: 4 lanes of f32 or
//! 2 lanes of f64. On x86_64 the blend operation maps to `_mm_blendv_*`
//! (SSE4.1); everything else is plain SSE/SSE2. On aarch64 all operations are
//! baseline NEON, with the sign-bit blend synthesized from an arithmetic
//! shift plus `vbsl`.
//!
//! Safety: callers must run these engines only on CPUs offering the
//! underlying ISA; the crate's runtime dispatch ensures this in normal use.

use super::types::{simd_arch, F32Vec128, F64Vec128, M32Vec128, M64Vec128};
use super::HmmSimd;

/// 128-bit single-precision engine (4 × f32).
#[derive(Clone, Copy)]
pub struct SimdEngine128F;

#[allow(unsafe_op_in_unsafe_fn)]
impl HmmSimd for SimdEngine128F {
    type Elem = f32;
    type Mask = u32;
    type Vf = F32Vec128;
    type Vm = M32Vec128;

    const LANES: usize = 4;

    #[inline]
    unsafe fn zero() -> Self::Vf {
        #[cfg(target_arch = "x86_64")]
        {
            simd_arch::_mm_setzero_ps()
        }
        #[cfg(target_arch = "aarch64")]
        {
            simd_arch::vdupq_n_f32(0.0)
        }
    }

    #[inline]
    unsafe fn splat(x: f32) -> Self::Vf {
        #[cfg(target_arch = "x86_64")]
        {
            simd_arch::_mm_set1_ps(x)
        }
        #[cfg(target_arch = "aarch64")]
        {
            simd_arch::vdupq_n_f32(x)
        }
    }

    #[inline]
    unsafe fn set_low(x: f32) -> Self::Vf {
        #[cfg(target_arch = "x86_64")]
        {
            simd_arch::_mm_set_ss(x)
        }
        #[cfg(target_arch = "aarch64")]
        {
            simd_arch::vsetq_lane_f32::<0>(x, simd_arch::vdupq_n_f32(0.0))
        }
    }

    #[inline]
    unsafe fn add(a: Self::Vf, b: Self::Vf) -> Self::Vf {
        #[cfg(target_arch = "x86_64")]
        {
            simd_arch::_mm_add_ps(a, b)
        }
        #[cfg(target_arch = "aarch64")]
        {
            simd_arch::vaddq_f32(a, b)
        }
    }

    #[inline]
    unsafe fn sub(a: Self::Vf, b: Self::Vf) -> Self::Vf {
        #[cfg(target_arch = "x86_64")]
        {
            simd_arch::_mm_sub_ps(a, b)
        }
        #[cfg(target_arch = "aarch64")]
        {
            simd_arch::vsubq_f32(a, b)
        }
    }

    #[inline]
    unsafe fn mul(a: Self::Vf, b: Self::Vf) -> Self::Vf {
        #[cfg(target_arch = "x86_64")]
        {
            simd_arch::_mm_mul_ps(a, b)
        }
        #[cfg(target_arch = "aarch64")]
        {
            simd_arch::vmulq_f32(a, b)
        }
    }

    #[inline]
    unsafe fn div(a: Self::Vf, b: Self::Vf) -> Self::Vf {
        #[cfg(target_arch = "x86_64")]
        {
            simd_arch::_mm_div_ps(a, b)
        }
        #[cfg(target_arch = "aarch64")]
        {
            simd_arch::vdivq_f32(a, b)
        }
    }

    #[inline]
    unsafe fn loadu(p: *const f32) -> Self::Vf {
        #[cfg(target_arch = "x86_64")]
        {
            simd_arch::_mm_loadu_ps(p)
        }
        #[cfg(target_arch = "aarch64")]
        {
            simd_arch::vld1q_f32(p)
        }
    }

    #[inline]
    unsafe fn storeu(p: *mut f32, v: Self::Vf) {
        #[cfg(target_arch = "x86_64")]
        {
            simd_arch::_mm_storeu_ps(p, v)
        }
        #[cfg(target_arch = "aarch64")]
        {
            simd_arch::vst1q_f32(p, v)
        }
    }

    #[inline]
    unsafe fn shift_lanes_up(v: Self::Vf, shift_in: f32) -> (Self::Vf, f32) {
        #[cfg(target_arch = "x86_64")]
        {
            let out = simd_arch::_mm_cvtss_f32(simd_arch::_mm_shuffle_ps::<0b11_11_11_11>(v, v));
            let up = simd_arch::_mm_castsi128_ps(simd_arch::_mm_slli_si128::<4>(
                simd_arch::_mm_castps_si128(v),
            ));
            (simd_arch::_mm_move_ss(up, simd_arch::_mm_set_ss(shift_in)), out)
        }
        #[cfg(target_arch = "aarch64")]
        {
            let out = simd_arch::vgetq_lane_f32::<3>(v);
            (
                simd_arch::vextq_f32::<3>(simd_arch::vdupq_n_f32(shift_in), v),
                out,
            )
        }
    }

    #[inline]
    unsafe fn shift_lanes_up_discard(v: Self::Vf, shift_in: f32) -> Self::Vf {
        #[cfg(target_arch = "x86_64")]
        {
            let up = simd_arch::_mm_castsi128_ps(simd_arch::_mm_slli_si128::<4>(
                simd_arch::_mm_castps_si128(v),
            ));
            simd_arch::_mm_move_ss(up, simd_arch::_mm_set_ss(shift_in))
        }
        #[cfg(target_arch = "aarch64")]
        {
            simd_arch::vextq_f32::<3>(simd_arch::vdupq_n_f32(shift_in), v)
        }
    }

    #[inline]
    unsafe fn mask_zero() -> Self::Vm {
        #[cfg(target_arch = "x86_64")]
        {
            simd_arch::_mm_setzero_si128()
        }
        #[cfg(target_arch = "aarch64")]
        {
            simd_arch::vdupq_n_u32(0)
        }
    }

    #[inline]
    unsafe fn mask_from_lanes(words: &[u32]) -> Self::Vm {
        debug_assert!(words.len() >= Self::LANES);
        #[cfg(target_arch = "x86_64")]
        {
            simd_arch::_mm_loadu_si128(words.as_ptr() as *const simd_arch::__m128i)
        }
        #[cfg(target_arch = "aarch64")]
        {
            simd_arch::vld1q_u32(words.as_ptr())
        }
    }

    #[inline]
    unsafe fn mask_shl1(m: Self::Vm) -> Self::Vm {
        #[cfg(target_arch = "x86_64")]
        {
            simd_arch::_mm_slli_epi32::<1>(m)
        }
        #[cfg(target_arch = "aarch64")]
        {
            simd_arch::vshlq_n_u32::<1>(m)
        }
    }

    #[inline]
    #[cfg_attr(target_arch = "x86_64", target_feature(enable = "sse4.1"))]
    unsafe fn blend_by_mask(on_clear: Self::Vf, on_set: Self::Vf, m: Self::Vm) -> Self::Vf {
        #[cfg(target_arch = "x86_64")]
        {
            simd_arch::_mm_blendv_ps(on_clear, on_set, simd_arch::_mm_castsi128_ps(m))
        }
        #[cfg(target_arch = "aarch64")]
        {
            let sel = simd_arch::vreinterpretq_u32_s32(simd_arch::vshrq_n_s32::<31>(
                simd_arch::vreinterpretq_s32_u32(m),
            ));
            simd_arch::vbslq_f32(sel, on_set, on_clear)
        }
    }
}

/// 128-bit double-precision engine (2 × f64).
#[derive(Clone, Copy)]
pub struct SimdEngine128D;

#[allow(unsafe_op_in_unsafe_fn)]
impl HmmSimd for SimdEngine128D {
    type Elem = f64;
    type Mask = u64;
    type Vf = F64Vec128;
    type Vm = M64Vec128;

    const LANES: usize = 2;

    #[inline]
    unsafe fn zero() -> Self::Vf {
        #[cfg(target_arch = "x86_64")]
        {
            simd_arch::_mm_setzero_pd()
        }
        #[cfg(target_arch = "aarch64")]
        {
            simd_arch::vdupq_n_f64(0.0)
        }
    }

    #[inline]
    unsafe fn splat(x: f64) -> Self::Vf {
        #[cfg(target_arch = "x86_64")]
        {
            simd_arch::_mm_set1_pd(x)
        }
        #[cfg(target_arch = "aarch64")]
        {
            simd_arch::vdupq_n_f64(x)
        }
    }

    #[inline]
    unsafe fn set_low(x: f64) -> Self::Vf {
        #[cfg(target_arch = "x86_64")]
        {
            simd_arch::_mm_set_sd(x)
        }
        #[cfg(target_arch = "aarch64")]
        {
            simd_arch::vsetq_lane_f64::<0>(x, simd_arch::vdupq_n_f64(0.0))
        }
    }

    #[inline]
    unsafe fn add(a: Self::Vf, b: Self::Vf) -> Self::Vf {
        #[cfg(target_arch = "x86_64")]
        {
            simd_arch::_mm_add_pd(a, b)
        }
        #[cfg(target_arch = "aarch64")]
        {
            simd_arch::vaddq_f64(a, b)
        }
    }

    #[inline]
    unsafe fn sub(a: Self::Vf, b: Self::Vf) -> Self::Vf {
        #[cfg(target_arch = "x86_64")]
        {
            simd_arch::_mm_sub_pd(a, b)
        }
        #[cfg(target_arch = "aarch64")]
        {
            simd_arch::vsubq_f64(a, b)
        }
    }

    #[inline]
    unsafe fn mul(a: Self::Vf, b: Self::Vf) -> Self::Vf {
        #[cfg(target_arch = "x86_64")]
        {
            simd_arch::_mm_mul_pd(a, b)
        }
        #[cfg(target_arch = "aarch64")]
        {
            simd_arch::vmulq_f64(a, b)
        }
    }

    #[inline]
    unsafe fn div(a: Self::Vf, b: Self::Vf) -> Self::Vf {
        #[cfg(target_arch = "x86_64")]
        {
            simd_arch::_mm_div_pd(a, b)
        }
        #[cfg(target_arch = "aarch64")]
        {
            simd_arch::vdivq_f64(a, b)
        }
    }

    #[inline]
    unsafe fn loadu(p: *const f64) -> Self::Vf {
        #[cfg(target_arch = "x86_64")]
        {
            simd_arch::_mm_loadu_pd(p)
        }
        #[cfg(target_arch = "aarch64")]
        {
            simd_arch::vld1q_f64(p)
        }
    }

    #[inline]
    unsafe fn storeu(p: *mut f64, v: Self::Vf) {
        #[cfg(target_arch = "x86_64")]
        {
            simd_arch::_mm_storeu_pd(p, v)
        }
        #[cfg(target_arch = "aarch64")]
        {
            simd_arch::vst1q_f64(p, v)
        }
    }

    #[inline]
    unsafe fn shift_lanes_up(v: Self::Vf, shift_in: f64) -> (Self::Vf, f64) {
        #[cfg(target_arch = "x86_64")]
        {
            let out = simd_arch::_mm_cvtsd_f64(simd_arch::_mm_unpackhi_pd(v, v));
            let up = simd_arch::_mm_castsi128_pd(simd_arch::_mm_slli_si128::<8>(
                simd_arch::_mm_castpd_si128(v),
            ));
            (simd_arch::_mm_move_sd(up, simd_arch::_mm_set_sd(shift_in)), out)
        }
        #[cfg(target_arch = "aarch64")]
        {
            let out = simd_arch::vgetq_lane_f64::<1>(v);
            (
                simd_arch::vextq_f64::<1>(simd_arch::vdupq_n_f64(shift_in), v),
                out,
            )
        }
    }

    #[inline]
    unsafe fn shift_lanes_up_discard(v: Self::Vf, shift_in: f64) -> Self::Vf {
        #[cfg(target_arch = "x86_64")]
        {
            let up = simd_arch::_mm_castsi128_pd(simd_arch::_mm_slli_si128::<8>(
                simd_arch::_mm_castpd_si128(v),
            ));
            simd_arch::_mm_move_sd(up, simd_arch::_mm_set_sd(shift_in))
        }
        #[cfg(target_arch = "aarch64")]
        {
            simd_arch::vextq_f64::<1>(simd_arch::vdupq_n_f64(shift_in), v)
        }
    }

    #[inline]
    unsafe fn mask_zero() -> Self::Vm {
        #[cfg(target_arch = "x86_64")]
        {
            simd_arch::_mm_setzero_si128()
        }
        #[cfg(target_arch = "aarch64")]
        {
            simd_arch::vdupq_n_u64(0)
        }
    }

    #[inline]
    unsafe fn mask_from_lanes(words: &[u64]) -> Self::Vm {
        debug_assert!(words.len() >= Self::LANES);
        #[cfg(target_arch = "x86_64")]
        {
            simd_arch::_mm_loadu_si128(words.as_ptr() as *const simd_arch::__m128i)
        }
        #[cfg(target_arch = "aarch64")]
        {
            simd_arch::vld1q_u64(words.as_ptr())
        }
    }

    #[inline]
    unsafe fn mask_shl1(m: Self::Vm) -> Self::Vm {
        #[cfg(target_arch = "x86_64")]
        {
            simd_arch::_mm_slli_epi64::<1>(m)
        }
        #[cfg(target_arch = "aarch64")]
        {
            simd_arch::vshlq_n_u64::<1>(m)
        }
    }

    #[inline]
    #[cfg_attr(target_arch = "x86_64", target_feature(enable = "sse4.1"))]
    unsafe fn blend_by_mask(on_clear: Self::Vf, on_set: Self::Vf, m: Self::Vm) -> Self::Vf {
        #[cfg(target_arch = "x86_64")]
        {
            simd_arch::_mm_blendv_pd(on_clear, on_set, simd_arch::_mm_castsi128_pd(m))
        }
        #[cfg(target_arch = "aarch64")]
        {
            let sel = simd_arch::vreinterpretq_u64_s64(simd_arch::vshrq_n_s64::<63>(
                simd_arch::vreinterpretq_s64_u64(m),
            ));
            simd_arch::vbslq_f64(sel, on_set, on_clear)
        }
    }
}
