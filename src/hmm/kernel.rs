//! Striped PairHMM forward-recurrence kernel
//!
//! One generic implementation of the anti-diagonal traversal, compiled per
//! SIMD engine through the `HmmSimd` capability set. Rows 1..R are processed
//! in stripes of `L` contiguous rows; within a stripe, lane ℓ owns row
//! `stripe·L + ℓ + 1` and the kernel advances one haplotype column per
//! iteration. The anti-diagonal dependence M[r][c] ← M[r-1][c-1] is honored
//! by shifting one vector element between iterations: when lane ℓ sits at
//! column d-ℓ, lane ℓ-1 finished column d-ℓ-1 one iteration earlier.
//!
//! Cross-stripe continuity flows through three rolling shift-out arrays of
//! length R+H+L: the value leaving lane L-1 at step d is stored at index d
//! and re-enters the next stripe's lane 0 at its step d-L. The delete array
//! is primed with C_init/H so stripe 0 sees the Y boundary row.
//!
//! Match/mismatch priors are selected without byte comparisons: two
//! accumulators of per-lane bitmap words (lane ℓ's word lagged by ℓ bits)
//! are refilled every `BITS` columns and shifted left one bit per column;
//! the per-lane MSB blends `1-prior` against `prior/3`. The tri-state
//! division by 3 happens once per stripe, on the vector.
//!
//! All arithmetic stays in product space — no logarithms inside the loop.
//! The caller applies `log10` and subtracts `log10(C_init)` afterwards.

use crate::compute::encoding::{encode_base, AMBIGUOUS_CLASS};
use crate::compute::simd_abstraction::{HmmSimd, MaskWord};

use super::context::{Context, HmmFloat};
use super::masks::{lagged_mask_word, HaplotypeMasks};
use super::testcase::Testcase;
use super::transitions::TransitionVectors;

/// Run the striped forward recurrence for one testcase and return the
/// pre-log sum Σ_c (M[R][c] + X[R][c]) in the engine's precision.
///
/// `L` must equal `E::LANES`; the macro-generated entry points in
/// `isa_sse_neon`/`isa_avx2` enforce this pairing and carry the
/// `#[target_feature]` attributes that license the engine's intrinsics.
///
/// Safety: the caller must ensure the CPU supports the instruction set
/// behind `E`. Inputs are assumed validated (`Testcase` guarantees R ≥ 1,
/// H ≥ 1 and in-range quality bytes).
#[inline]
#[allow(unsafe_op_in_unsafe_fn)]
pub unsafe fn forward_kernel<const L: usize, E>(tc: &Testcase, ctx: &Context<E::Elem>) -> E::Elem
where
    E: HmmSimd,
    E::Elem: HmmFloat,
{
    debug_assert_eq!(L, E::LANES, "L generic must match engine lanes");

    let read_len = tc.read_len();
    let hap_len = tc.hap_len();
    let rows = read_len + 1;
    let cols = hap_len + 1;
    let bits = <E::Mask as MaskWord>::BITS as usize;

    let stripe_cnt = read_len.div_ceil(L);
    // Rows handled by the final stripe, in 1..=L.
    let remaining = read_len - (stripe_cnt - 1) * L;

    let init_y = ctx.initial_constant() / E::Elem::from_f64(hap_len as f64);

    let trans = TransitionVectors::build(tc, ctx, stripe_cnt * L);
    let masks = HaplotypeMasks::<E::Mask>::build(tc.haplotype(), rows);

    let shift_len = rows + cols + L;
    let mut shift_m = vec![E::Elem::ZERO; shift_len];
    let mut shift_x = vec![E::Elem::ZERO; shift_len];
    let mut shift_y = vec![init_y; shift_len];

    let one = E::splat(E::Elem::ONE);
    let three = E::splat(E::Elem::from_f64(3.0));
    let read = tc.read();

    for stripe in 0..stripe_cnt - 1 {
        let base = stripe * L;

        let p_mm = E::loadu(trans.mm.as_ptr().add(base));
        let p_gapm = E::loadu(trans.gap_m.as_ptr().add(base));
        let p_mx = E::loadu(trans.mx.as_ptr().add(base));
        let p_xx = E::loadu(trans.xx.as_ptr().add(base));
        let p_my = E::loadu(trans.my.as_ptr().add(base));
        let p_yy = E::loadu(trans.yy.as_ptr().add(base));

        let distm_raw = E::loadu(trans.prior.as_ptr().add(base));
        let one_minus_distm = E::sub(one, distm_raw);
        let distm = E::div(distm_raw, three);

        let mut m_t_2 = E::zero();
        let mut x_t_2 = E::zero();
        let (mut m_t_1, mut x_t_1, mut y_t_2, mut y_t_1) = if stripe == 0 {
            (E::zero(), E::zero(), E::set_low(init_y), E::zero())
        } else {
            (
                E::set_low(shift_m[L]),
                E::set_low(shift_x[L]),
                E::zero(),
                E::zero(),
            )
        };
        let mut m_t_1_y = m_t_1;

        let mut rs_classes = [AMBIGUOUS_CLASS; L];
        for (lane, class) in rs_classes.iter_mut().enumerate() {
            *class = encode_base(read[base + lane]);
        }
        let mut mask_carry = [<E::Mask as MaskWord>::ZERO; L];
        let mut mask_words = [<E::Mask as MaskWord>::ZERO; L];
        let mut cur_mask = E::mask_zero();

        for d in 1..cols + L {
            if (d - 1) % bits == 0 {
                let wi = (d - 1) / bits;
                for lane in 0..L {
                    mask_words[lane] = lagged_mask_word(
                        masks.word(wi, rs_classes[lane]),
                        &mut mask_carry[lane],
                        lane as u32,
                    );
                }
                cur_mask = E::mask_from_lanes(&mask_words);
            }
            let distm_sel = E::blend_by_mask(distm, one_minus_distm, cur_mask);
            cur_mask = E::mask_shl1(cur_mask);

            let m_t = E::mul(
                E::add(
                    E::add(E::mul(m_t_2, p_mm), E::mul(x_t_2, p_gapm)),
                    E::mul(y_t_2, p_gapm),
                ),
                distm_sel,
            );
            let m_t_y = m_t;
            let x_t = E::add(E::mul(m_t_1, p_mx), E::mul(x_t_1, p_xx));
            let y_t = E::add(E::mul(m_t_1_y, p_my), E::mul(y_t_1, p_yy));

            let shift_idx = d + L;
            let (m_shifted, m_out) = E::shift_lanes_up(m_t, shift_m[shift_idx]);
            shift_m[d] = m_out;
            let (x_shifted, x_out) = E::shift_lanes_up(x_t, shift_x[shift_idx]);
            shift_x[d] = x_out;
            let (y_shifted, y_out) = E::shift_lanes_up(y_t_1, shift_y[shift_idx]);
            shift_y[d] = y_out;

            m_t_2 = m_t_1;
            m_t_1 = m_shifted;
            x_t_2 = x_t_1;
            x_t_1 = x_shifted;
            y_t_2 = y_shifted;
            y_t_1 = y_t;
            m_t_1_y = m_t_y;
        }
    }

    // Final stripe: lanes >= `remaining` carry zero transitions and stay
    // zero; the M and X accumulators gather the last row's totals.
    let stripe = stripe_cnt - 1;
    let base = stripe * L;

    let p_mm = E::loadu(trans.mm.as_ptr().add(base));
    let p_gapm = E::loadu(trans.gap_m.as_ptr().add(base));
    let p_mx = E::loadu(trans.mx.as_ptr().add(base));
    let p_xx = E::loadu(trans.xx.as_ptr().add(base));
    let p_my = E::loadu(trans.my.as_ptr().add(base));
    let p_yy = E::loadu(trans.yy.as_ptr().add(base));

    let distm_raw = E::loadu(trans.prior.as_ptr().add(base));
    let one_minus_distm = E::sub(one, distm_raw);
    let distm = E::div(distm_raw, three);

    let mut m_t_2 = E::zero();
    let mut x_t_2 = E::zero();
    let (mut m_t_1, mut x_t_1, mut y_t_2, mut y_t_1) = if stripe == 0 {
        (E::zero(), E::zero(), E::set_low(init_y), E::zero())
    } else {
        (
            E::set_low(shift_m[L]),
            E::set_low(shift_x[L]),
            E::zero(),
            E::zero(),
        )
    };
    let mut m_t_1_y = m_t_1;

    let mut rs_classes = [AMBIGUOUS_CLASS; L];
    for lane in 0..remaining {
        rs_classes[lane] = encode_base(read[base + lane]);
    }
    let mut mask_carry = [<E::Mask as MaskWord>::ZERO; L];
    let mut mask_words = [<E::Mask as MaskWord>::ZERO; L];
    let mut cur_mask = E::mask_zero();

    let mut sum_m = E::zero();
    let mut sum_x = E::zero();

    for d in 1..cols + remaining - 1 {
        if (d - 1) % bits == 0 {
            let wi = (d - 1) / bits;
            for lane in 0..L {
                mask_words[lane] = lagged_mask_word(
                    masks.word(wi, rs_classes[lane]),
                    &mut mask_carry[lane],
                    lane as u32,
                );
            }
            cur_mask = E::mask_from_lanes(&mask_words);
        }
        let distm_sel = E::blend_by_mask(distm, one_minus_distm, cur_mask);
        cur_mask = E::mask_shl1(cur_mask);

        let m_t = E::mul(
            E::add(
                E::add(E::mul(m_t_2, p_mm), E::mul(x_t_2, p_gapm)),
                E::mul(y_t_2, p_gapm),
            ),
            distm_sel,
        );
        let m_t_y = m_t;
        let x_t = E::add(E::mul(m_t_1, p_mx), E::mul(x_t_1, p_xx));
        let y_t = E::add(E::mul(m_t_1_y, p_my), E::mul(y_t_1, p_yy));

        let shift_idx = d + L;
        sum_m = E::add(sum_m, m_t);
        let m_shifted = E::shift_lanes_up_discard(m_t, shift_m[shift_idx]);
        sum_x = E::add(sum_x, x_t);
        let x_shifted = E::shift_lanes_up_discard(x_t, shift_x[shift_idx]);
        let y_shifted = E::shift_lanes_up_discard(y_t_1, shift_y[shift_idx]);

        m_t_2 = m_t_1;
        m_t_1 = m_shifted;
        x_t_2 = x_t_1;
        x_t_1 = x_shifted;
        y_t_2 = y_shifted;
        y_t_1 = y_t;
        m_t_1_y = m_t_y;
    }

    // Lane `remaining-1` walked row R across every column; its accumulated
    // M+X is the result.
    let total = E::add(sum_m, sum_x);
    let mut lanes_out = [E::Elem::ZERO; L];
    E::storeu(lanes_out.as_mut_ptr(), total);
    lanes_out[remaining - 1]
}
