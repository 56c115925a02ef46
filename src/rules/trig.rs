//! Trigonometric and hyperbolic operators and their inverses.
//!
//! Every operator here owns an auxiliary row at `i_z - 1` that the recording
//! fills alongside the primary result (cos for sin, `1 + x²` for atan, ...),
//! so each order only needs lower orders of its companion.

use super::order_f;
use crate::float::Float;
use crate::layout::TaylorView;

// ══════════════════════════════════════════════
//  Coupled pairs
// ══════════════════════════════════════════════

/// `s = sin(x)`, `c = cos(x)` (or sinh/cosh when `hyperbolic`).
///
/// `s_q = (1/q) Σ k x_k c_{q-k}`, `c_q = ∓(1/q) Σ k x_k s_{q-k}`
#[inline]
fn sin_cos_dir<F: Float>(
    q: usize,
    x: usize,
    s: usize,
    c: usize,
    hyperbolic: bool,
    t: &mut TaylorView<'_, F>,
) {
    let inv_q = F::one() / order_f::<F>(q);
    for ell in 0..t.directions() {
        let mut sum_s = F::zero();
        let mut sum_c = F::zero();
        for k in 1..=q {
            let kx = order_f::<F>(k) * t.get(x, k, ell);
            sum_s = sum_s + kx * t.get(c, q - k, ell);
            sum_c = sum_c + kx * t.get(s, q - k, ell);
        }
        t.set(s, q, ell, sum_s * inv_q);
        let c_q = if hyperbolic { sum_c } else { -sum_c };
        t.set(c, q, ell, c_q * inv_q);
    }
}

/// `z = sin(x)`, auxiliary `cos(x)` at `i_z - 1`.
pub fn forward_sin_dir<F: Float>(
    q: usize,
    i_z: usize,
    arg: &[u32],
    _parameter: &[F],
    t: &mut TaylorView<'_, F>,
) {
    sin_cos_dir(q, arg[0] as usize, i_z, i_z - 1, false, t);
}

/// `z = cos(x)`, auxiliary `sin(x)` at `i_z - 1`.
pub fn forward_cos_dir<F: Float>(
    q: usize,
    i_z: usize,
    arg: &[u32],
    _parameter: &[F],
    t: &mut TaylorView<'_, F>,
) {
    sin_cos_dir(q, arg[0] as usize, i_z - 1, i_z, false, t);
}

/// `z = sinh(x)`, auxiliary `cosh(x)` at `i_z - 1`.
pub fn forward_sinh_dir<F: Float>(
    q: usize,
    i_z: usize,
    arg: &[u32],
    _parameter: &[F],
    t: &mut TaylorView<'_, F>,
) {
    sin_cos_dir(q, arg[0] as usize, i_z, i_z - 1, true, t);
}

/// `z = cosh(x)`, auxiliary `sinh(x)` at `i_z - 1`.
pub fn forward_cosh_dir<F: Float>(
    q: usize,
    i_z: usize,
    arg: &[u32],
    _parameter: &[F],
    t: &mut TaylorView<'_, F>,
) {
    sin_cos_dir(q, arg[0] as usize, i_z - 1, i_z, true, t);
}

// ══════════════════════════════════════════════
//  tan / tanh: auxiliary y = z²
// ══════════════════════════════════════════════

/// `z' = (1 ± y) x'`, then `y_q = Σ_{k=0}^{q} z_k z_{q-k}`.
#[inline]
fn tan_dir<F: Float>(q: usize, x: usize, z: usize, y: usize, sign: F, t: &mut TaylorView<'_, F>) {
    let inv_q = F::one() / order_f::<F>(q);
    for ell in 0..t.directions() {
        let mut sum = F::zero();
        for k in 1..=q {
            sum = sum + order_f::<F>(k) * t.get(x, k, ell) * t.get(y, q - k, ell);
        }
        let z_q = t.get(x, q, ell) + sign * sum * inv_q;
        t.set(z, q, ell, z_q);

        let mut y_q = F::zero();
        for k in 0..=q {
            y_q = y_q + t.get(z, k, ell) * t.get(z, q - k, ell);
        }
        t.set(y, q, ell, y_q);
    }
}

/// `z = tan(x)`, auxiliary `tan(x)²` at `i_z - 1`.
pub fn forward_tan_dir<F: Float>(
    q: usize,
    i_z: usize,
    arg: &[u32],
    _parameter: &[F],
    t: &mut TaylorView<'_, F>,
) {
    tan_dir(q, arg[0] as usize, i_z, i_z - 1, F::one(), t);
}

/// `z = tanh(x)`, auxiliary `tanh(x)²` at `i_z - 1`.
pub fn forward_tanh_dir<F: Float>(
    q: usize,
    i_z: usize,
    arg: &[u32],
    _parameter: &[F],
    t: &mut TaylorView<'_, F>,
) {
    tan_dir(q, arg[0] as usize, i_z, i_z - 1, -F::one(), t);
}

// ══════════════════════════════════════════════
//  Inverse functions: auxiliary b with b z' = ±x'
// ══════════════════════════════════════════════

/// Auxiliary `b` of the form `c ± x²` (`root == false`) or `sqrt(c ± x²)`.
///
/// The constant `c` only affects order 0, which the recording supplies.
#[inline]
fn aux_dir<F: Float>(
    q: usize,
    x: usize,
    b: usize,
    sign: F,
    root: bool,
    t: &mut TaylorView<'_, F>,
) {
    let two_b0 = order_f::<F>(2) * t.get(b, 0, 0);
    for ell in 0..t.directions() {
        let mut sq = F::zero();
        for k in 0..=q {
            sq = sq + t.get(x, k, ell) * t.get(x, q - k, ell);
        }
        let v = if root {
            let mut sum = sign * sq;
            for k in 1..q {
                sum = sum - t.get(b, k, ell) * t.get(b, q - k, ell);
            }
            sum / two_b0
        } else {
            sign * sq
        };
        t.set(b, q, ell, v);
    }
}

/// Solve `b z' = sign x'` for `z_q`:
///
/// `z_q = (sign q x_q - Σ_{k=1}^{q-1} k z_k b_{q-k}) / (q b_0)`
#[inline]
fn inverse_dir<F: Float>(q: usize, x: usize, z: usize, b: usize, sign: F, t: &mut TaylorView<'_, F>) {
    let qf = order_f::<F>(q);
    let q_b0 = qf * t.get(b, 0, 0);
    for ell in 0..t.directions() {
        let mut sum = sign * qf * t.get(x, q, ell);
        for k in 1..q {
            sum = sum - order_f::<F>(k) * t.get(z, k, ell) * t.get(b, q - k, ell);
        }
        t.set(z, q, ell, sum / q_b0);
    }
}

/// `z = asin(x)`, auxiliary `sqrt(1 - x²)`.
pub fn forward_asin_dir<F: Float>(
    q: usize,
    i_z: usize,
    arg: &[u32],
    _parameter: &[F],
    t: &mut TaylorView<'_, F>,
) {
    let x = arg[0] as usize;
    aux_dir(q, x, i_z - 1, -F::one(), true, t);
    inverse_dir(q, x, i_z, i_z - 1, F::one(), t);
}

/// `z = acos(x)`, auxiliary `sqrt(1 - x²)`.
pub fn forward_acos_dir<F: Float>(
    q: usize,
    i_z: usize,
    arg: &[u32],
    _parameter: &[F],
    t: &mut TaylorView<'_, F>,
) {
    let x = arg[0] as usize;
    aux_dir(q, x, i_z - 1, -F::one(), true, t);
    inverse_dir(q, x, i_z, i_z - 1, -F::one(), t);
}

/// `z = atan(x)`, auxiliary `1 + x²`.
pub fn forward_atan_dir<F: Float>(
    q: usize,
    i_z: usize,
    arg: &[u32],
    _parameter: &[F],
    t: &mut TaylorView<'_, F>,
) {
    let x = arg[0] as usize;
    aux_dir(q, x, i_z - 1, F::one(), false, t);
    inverse_dir(q, x, i_z, i_z - 1, F::one(), t);
}

/// `z = asinh(x)`, auxiliary `sqrt(1 + x²)`.
pub fn forward_asinh_dir<F: Float>(
    q: usize,
    i_z: usize,
    arg: &[u32],
    _parameter: &[F],
    t: &mut TaylorView<'_, F>,
) {
    let x = arg[0] as usize;
    aux_dir(q, x, i_z - 1, F::one(), true, t);
    inverse_dir(q, x, i_z, i_z - 1, F::one(), t);
}

/// `z = acosh(x)`, auxiliary `sqrt(x² - 1)`.
pub fn forward_acosh_dir<F: Float>(
    q: usize,
    i_z: usize,
    arg: &[u32],
    _parameter: &[F],
    t: &mut TaylorView<'_, F>,
) {
    let x = arg[0] as usize;
    aux_dir(q, x, i_z - 1, F::one(), true, t);
    inverse_dir(q, x, i_z, i_z - 1, F::one(), t);
}

/// `z = atanh(x)`, auxiliary `1 - x²`.
pub fn forward_atanh_dir<F: Float>(
    q: usize,
    i_z: usize,
    arg: &[u32],
    _parameter: &[F],
    t: &mut TaylorView<'_, F>,
) {
    let x = arg[0] as usize;
    aux_dir(q, x, i_z - 1, -F::one(), false, t);
    inverse_dir(q, x, i_z, i_z - 1, F::one(), t);
}
