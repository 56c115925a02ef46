//! Binary arithmetic: sums, products, quotients, absolute-zero products.
//!
//! Order-0 coefficients are shared by all directions, so a Cauchy product
//! reads `x_0` and `y_0` once and pairs every other order within a single
//! direction `ell`.

use crate::float::{azmul, Float};
use crate::layout::TaylorView;

// ══════════════════════════════════════════════
//  Sums
// ══════════════════════════════════════════════

/// `z = x + y`
pub fn forward_addvv_dir<F: Float>(
    q: usize,
    i_z: usize,
    arg: &[u32],
    _parameter: &[F],
    t: &mut TaylorView<'_, F>,
) {
    let (x, y) = (arg[0] as usize, arg[1] as usize);
    for ell in 0..t.directions() {
        let v = t.get(x, q, ell) + t.get(y, q, ell);
        t.set(i_z, q, ell, v);
    }
}

/// `z = p + y`
pub fn forward_addpv_dir<F: Float>(
    q: usize,
    i_z: usize,
    arg: &[u32],
    _parameter: &[F],
    t: &mut TaylorView<'_, F>,
) {
    t.copy_order(i_z, arg[1] as usize, q);
}

/// `z = x - y`
pub fn forward_subvv_dir<F: Float>(
    q: usize,
    i_z: usize,
    arg: &[u32],
    _parameter: &[F],
    t: &mut TaylorView<'_, F>,
) {
    let (x, y) = (arg[0] as usize, arg[1] as usize);
    for ell in 0..t.directions() {
        let v = t.get(x, q, ell) - t.get(y, q, ell);
        t.set(i_z, q, ell, v);
    }
}

/// `z = p - y`
pub fn forward_subpv_dir<F: Float>(
    q: usize,
    i_z: usize,
    arg: &[u32],
    _parameter: &[F],
    t: &mut TaylorView<'_, F>,
) {
    let y = arg[1] as usize;
    for ell in 0..t.directions() {
        let v = -t.get(y, q, ell);
        t.set(i_z, q, ell, v);
    }
}

/// `z = x - p`
pub fn forward_subvp_dir<F: Float>(
    q: usize,
    i_z: usize,
    arg: &[u32],
    _parameter: &[F],
    t: &mut TaylorView<'_, F>,
) {
    t.copy_order(i_z, arg[0] as usize, q);
}

// ══════════════════════════════════════════════
//  Products
// ══════════════════════════════════════════════

/// `z = x * y`, a Cauchy product per direction.
///
/// `z_q = Σ_{k=0}^{q} x_k * y_{q-k}`
pub fn forward_mulvv_dir<F: Float>(
    q: usize,
    i_z: usize,
    arg: &[u32],
    _parameter: &[F],
    t: &mut TaylorView<'_, F>,
) {
    let (x, y) = (arg[0] as usize, arg[1] as usize);
    for ell in 0..t.directions() {
        let mut sum = F::zero();
        for k in 0..=q {
            sum = sum + t.get(x, k, ell) * t.get(y, q - k, ell);
        }
        t.set(i_z, q, ell, sum);
    }
}

/// `z = p * y`
pub fn forward_mulpv_dir<F: Float>(
    q: usize,
    i_z: usize,
    arg: &[u32],
    parameter: &[F],
    t: &mut TaylorView<'_, F>,
) {
    let p = parameter[arg[0] as usize];
    let y = arg[1] as usize;
    for ell in 0..t.directions() {
        let v = p * t.get(y, q, ell);
        t.set(i_z, q, ell, v);
    }
}

/// `z = azmul(x, y)`
pub fn forward_zmulvv_dir<F: Float>(
    q: usize,
    i_z: usize,
    arg: &[u32],
    _parameter: &[F],
    t: &mut TaylorView<'_, F>,
) {
    let (x, y) = (arg[0] as usize, arg[1] as usize);
    for ell in 0..t.directions() {
        let mut sum = F::zero();
        for k in 0..=q {
            sum = sum + azmul(t.get(x, k, ell), t.get(y, q - k, ell));
        }
        t.set(i_z, q, ell, sum);
    }
}

/// `z = azmul(p, y)`
pub fn forward_zmulpv_dir<F: Float>(
    q: usize,
    i_z: usize,
    arg: &[u32],
    parameter: &[F],
    t: &mut TaylorView<'_, F>,
) {
    let p = parameter[arg[0] as usize];
    let y = arg[1] as usize;
    for ell in 0..t.directions() {
        let v = azmul(p, t.get(y, q, ell));
        t.set(i_z, q, ell, v);
    }
}

/// `z = azmul(x, p)`
pub fn forward_zmulvp_dir<F: Float>(
    q: usize,
    i_z: usize,
    arg: &[u32],
    parameter: &[F],
    t: &mut TaylorView<'_, F>,
) {
    let x = arg[0] as usize;
    let p = parameter[arg[1] as usize];
    for ell in 0..t.directions() {
        let v = azmul(t.get(x, q, ell), p);
        t.set(i_z, q, ell, v);
    }
}

// ══════════════════════════════════════════════
//  Quotients
// ══════════════════════════════════════════════

/// `z = x / y`
///
/// `z_q = (x_q - Σ_{k=1}^{q} z_{q-k} * y_k) / y_0`
pub fn forward_divvv_dir<F: Float>(
    q: usize,
    i_z: usize,
    arg: &[u32],
    _parameter: &[F],
    t: &mut TaylorView<'_, F>,
) {
    let (x, y) = (arg[0] as usize, arg[1] as usize);
    let y0 = t.get(y, 0, 0);
    for ell in 0..t.directions() {
        let mut sum = t.get(x, q, ell);
        for k in 1..=q {
            sum = sum - t.get(i_z, q - k, ell) * t.get(y, k, ell);
        }
        t.set(i_z, q, ell, sum / y0);
    }
}

/// `z = p / y`
///
/// `z_q = -(Σ_{k=1}^{q} z_{q-k} * y_k) / y_0`
pub fn forward_divpv_dir<F: Float>(
    q: usize,
    i_z: usize,
    arg: &[u32],
    _parameter: &[F],
    t: &mut TaylorView<'_, F>,
) {
    let y = arg[1] as usize;
    let y0 = t.get(y, 0, 0);
    for ell in 0..t.directions() {
        let mut sum = F::zero();
        for k in 1..=q {
            sum = sum - t.get(i_z, q - k, ell) * t.get(y, k, ell);
        }
        t.set(i_z, q, ell, sum / y0);
    }
}

/// `z = x / p`
pub fn forward_divvp_dir<F: Float>(
    q: usize,
    i_z: usize,
    arg: &[u32],
    parameter: &[F],
    t: &mut TaylorView<'_, F>,
) {
    let x = arg[0] as usize;
    let p = parameter[arg[1] as usize];
    for ell in 0..t.directions() {
        let v = t.get(x, q, ell) / p;
        t.set(i_z, q, ell, v);
    }
}
