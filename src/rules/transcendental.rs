//! Exponentials, logarithms, roots, powers, erf.
//!
//! Recurrences follow the logarithmic-derivative technique (Griewank &
//! Walther, Ch. 13): for `z = f(x)` with `z' = g(x) x'`, matching the `t^{q-1}`
//! terms gives `q z_q` as a convolution of `k x_k` against lower orders of `g`.

use super::arith::{forward_mulpv_dir, forward_mulvv_dir, forward_subpv_dir};
use super::order_f;
use crate::float::Float;
use crate::layout::TaylorView;

/// `z_q` of `exp(x)` from rows `x`, `z`.
///
/// `z_q = (1/q) Σ_{k=1}^{q} k x_k z_{q-k}`
#[inline]
pub(crate) fn exp_dir<F: Float>(q: usize, x: usize, z: usize, t: &mut TaylorView<'_, F>) {
    let inv_q = F::one() / order_f::<F>(q);
    for ell in 0..t.directions() {
        let mut sum = F::zero();
        for k in 1..=q {
            sum = sum + order_f::<F>(k) * t.get(x, k, ell) * t.get(z, q - k, ell);
        }
        t.set(z, q, ell, sum * inv_q);
    }
}

/// `z_q` of `ln(x + c)`; `c` shifts the order-0 denominator only.
///
/// `z_q = (x_q - (1/q) Σ_{k=1}^{q-1} k z_k x_{q-k}) / (x_0 + c)`
#[inline]
fn log_shifted_dir<F: Float>(q: usize, x: usize, z: usize, c: F, t: &mut TaylorView<'_, F>) {
    let inv_q = F::one() / order_f::<F>(q);
    let x0 = t.get(x, 0, 0) + c;
    for ell in 0..t.directions() {
        let mut sum = F::zero();
        for k in 1..q {
            sum = sum + order_f::<F>(k) * t.get(z, k, ell) * t.get(x, q - k, ell);
        }
        let v = (t.get(x, q, ell) - sum * inv_q) / x0;
        t.set(z, q, ell, v);
    }
}

/// `z = exp(x)`
pub fn forward_exp_dir<F: Float>(
    q: usize,
    i_z: usize,
    arg: &[u32],
    _parameter: &[F],
    t: &mut TaylorView<'_, F>,
) {
    exp_dir(q, arg[0] as usize, i_z, t);
}

/// `z = exp(x) - 1`
///
/// `z_q = x_q + (1/q) Σ_{k=1}^{q} k x_k z_{q-k}`
pub fn forward_expm1_dir<F: Float>(
    q: usize,
    i_z: usize,
    arg: &[u32],
    _parameter: &[F],
    t: &mut TaylorView<'_, F>,
) {
    let x = arg[0] as usize;
    let inv_q = F::one() / order_f::<F>(q);
    for ell in 0..t.directions() {
        let mut sum = F::zero();
        for k in 1..=q {
            sum = sum + order_f::<F>(k) * t.get(x, k, ell) * t.get(i_z, q - k, ell);
        }
        let v = t.get(x, q, ell) + sum * inv_q;
        t.set(i_z, q, ell, v);
    }
}

/// `z = ln(x)`
pub fn forward_log_dir<F: Float>(
    q: usize,
    i_z: usize,
    arg: &[u32],
    _parameter: &[F],
    t: &mut TaylorView<'_, F>,
) {
    log_shifted_dir(q, arg[0] as usize, i_z, F::zero(), t);
}

/// `z = ln(1 + x)`
pub fn forward_log1p_dir<F: Float>(
    q: usize,
    i_z: usize,
    arg: &[u32],
    _parameter: &[F],
    t: &mut TaylorView<'_, F>,
) {
    log_shifted_dir(q, arg[0] as usize, i_z, F::one(), t);
}

/// `z = sqrt(x)`
///
/// `z_q = (x_q - Σ_{k=1}^{q-1} z_k z_{q-k}) / (2 z_0)`
pub fn forward_sqrt_dir<F: Float>(
    q: usize,
    i_z: usize,
    arg: &[u32],
    _parameter: &[F],
    t: &mut TaylorView<'_, F>,
) {
    let x = arg[0] as usize;
    let two_z0 = order_f::<F>(2) * t.get(i_z, 0, 0);
    for ell in 0..t.directions() {
        let mut sum = t.get(x, q, ell);
        for k in 1..q {
            sum = sum - t.get(i_z, k, ell) * t.get(i_z, q - k, ell);
        }
        t.set(i_z, q, ell, sum / two_z0);
    }
}

// ══════════════════════════════════════════════
//  Powers: rows i_z-2 = ln(x), i_z-1 = y ln(x), i_z = exp(y ln(x))
// ══════════════════════════════════════════════

/// `z = x ^ y`
pub fn forward_powvv_dir<F: Float>(
    q: usize,
    i_z: usize,
    arg: &[u32],
    parameter: &[F],
    t: &mut TaylorView<'_, F>,
) {
    let (ln_x, prod) = (i_z - 2, i_z - 1);
    log_shifted_dir(q, arg[0] as usize, ln_x, F::zero(), t);
    forward_mulvv_dir(q, prod, &[ln_x as u32, arg[1]], parameter, t);
    exp_dir(q, prod, i_z, t);
}

/// `z = p ^ y`
pub fn forward_powpv_dir<F: Float>(
    q: usize,
    i_z: usize,
    arg: &[u32],
    _parameter: &[F],
    t: &mut TaylorView<'_, F>,
) {
    let (ln_p, prod) = (i_z - 2, i_z - 1);
    let y = arg[1] as usize;
    t.zero_order(ln_p, q);
    let ln_p0 = t.get(ln_p, 0, 0);
    for ell in 0..t.directions() {
        let v = ln_p0 * t.get(y, q, ell);
        t.set(prod, q, ell, v);
    }
    exp_dir(q, prod, i_z, t);
}

/// `z = x ^ p`
pub fn forward_powvp_dir<F: Float>(
    q: usize,
    i_z: usize,
    arg: &[u32],
    parameter: &[F],
    t: &mut TaylorView<'_, F>,
) {
    let (ln_x, prod) = (i_z - 2, i_z - 1);
    let p = parameter[arg[1] as usize];
    log_shifted_dir(q, arg[0] as usize, ln_x, F::zero(), t);
    for ell in 0..t.directions() {
        let v = t.get(ln_x, q, ell) * p;
        t.set(prod, q, ell, v);
    }
    exp_dir(q, prod, i_z, t);
}

// ══════════════════════════════════════════════
//  Error function
// ══════════════════════════════════════════════

/// `z = erf(x)`, args `[x, index of 0, index of 2/sqrt(pi)]`.
///
/// Rows `i_z-4 ..= i_z` hold `x*x`, `-x*x`, `exp(-x*x)`,
/// `2/sqrt(pi) exp(-x*x)` and `erf(x)`; the last follows
/// `z_q = (1/q) Σ_{k=1}^{q} k x_k g_{q-k}` with `g` the scaled Gaussian.
pub fn forward_erf_dir<F: Float>(
    q: usize,
    i_z: usize,
    arg: &[u32],
    parameter: &[F],
    t: &mut TaylorView<'_, F>,
) {
    let x = arg[0];
    let sq = i_z - 4;
    let neg_sq = i_z - 3;
    let gauss = i_z - 2;
    let scaled = i_z - 1;

    forward_mulvv_dir(q, sq, &[x, x], parameter, t);
    forward_subpv_dir(q, neg_sq, &[arg[1], sq as u32], parameter, t);
    exp_dir(q, neg_sq, gauss, t);
    forward_mulpv_dir(q, scaled, &[arg[2], gauss as u32], parameter, t);

    let x = x as usize;
    let inv_q = F::one() / order_f::<F>(q);
    for ell in 0..t.directions() {
        let mut sum = F::zero();
        for k in 1..=q {
            sum = sum + order_f::<F>(k) * t.get(x, k, ell) * t.get(scaled, q - k, ell);
        }
        t.set(i_z, q, ell, sum * inv_q);
    }
}
