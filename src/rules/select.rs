//! Gating and selection: piecewise operators, conditional expressions,
//! cumulative sums, parameter results and indirect loads.
//!
//! None of these convolve. Each either passes selected order-`q` slots
//! through, scales them by an order-0 quantity, or writes zeros.

use crate::float::{sign, Float};
use crate::layout::TaylorView;
use crate::opcode::{cond_flags, CompareOp};

/// `z = |x|`: `z_q = sign(x_0) x_q`, zero at the kink.
pub fn forward_abs_dir<F: Float>(
    q: usize,
    i_z: usize,
    arg: &[u32],
    _parameter: &[F],
    t: &mut TaylorView<'_, F>,
) {
    let x = arg[0] as usize;
    let s = sign(t.get(x, 0, 0));
    for ell in 0..t.directions() {
        let v = s * t.get(x, q, ell);
        t.set(i_z, q, ell, v);
    }
}

/// Operators whose derivative vanishes above order 0: `Sign`, `Dis`, `Par`.
pub fn forward_zero_dir<F: Float>(
    q: usize,
    i_z: usize,
    _arg: &[u32],
    _parameter: &[F],
    t: &mut TaylorView<'_, F>,
) {
    t.zero_order(i_z, q);
}

/// `z = (left cop right) ? if_true : if_false`.
///
/// The comparison uses order-0 values only; the selected operand's order-`q`
/// slots are copied, or zeroed when it is a parameter.
pub fn forward_cexp_dir<F: Float>(
    q: usize,
    i_z: usize,
    arg: &[u32],
    parameter: &[F],
    t: &mut TaylorView<'_, F>,
) {
    debug_assert_eq!(arg.len(), 6);
    let cop = CompareOp::from_arg(arg[0]);
    let flags = arg[1];

    let left = cond_operand(flags & cond_flags::LEFT_VAR != 0, arg[2], parameter, t);
    let right = cond_operand(flags & cond_flags::RIGHT_VAR != 0, arg[3], parameter, t);

    let (bit, chosen) = if cop.holds(left, right) {
        (cond_flags::TRUE_VAR, arg[4])
    } else {
        (cond_flags::FALSE_VAR, arg[5])
    };
    if flags & bit != 0 {
        t.copy_order(i_z, chosen as usize, q);
    } else {
        t.zero_order(i_z, q);
    }
}

/// Order-0 value of a condition operand.
#[inline]
fn cond_operand<F: Float>(is_var: bool, idx: u32, parameter: &[F], t: &TaylorView<'_, F>) -> F {
    if is_var {
        t.get(idx as usize, 0, 0)
    } else {
        parameter[idx as usize]
    }
}

/// `z = p + Σ add - Σ sub`, args `[n_add, n_sub, p, add.., sub.., n_add + n_sub]`.
pub fn forward_csum_dir<F: Float>(
    q: usize,
    i_z: usize,
    arg: &[u32],
    _parameter: &[F],
    t: &mut TaylorView<'_, F>,
) {
    let n_add = arg[0] as usize;
    let n_sub = arg[1] as usize;
    debug_assert_eq!(arg.len(), 4 + n_add + n_sub);
    debug_assert_eq!(arg[3 + n_add + n_sub] as usize, n_add + n_sub);
    let add = &arg[3..3 + n_add];
    let sub = &arg[3 + n_add..3 + n_add + n_sub];

    for ell in 0..t.directions() {
        let mut sum = F::zero();
        for &x in add {
            sum = sum + t.get(x as usize, q, ell);
        }
        for &x in sub {
            sum = sum - t.get(x as usize, q, ell);
        }
        t.set(i_z, q, ell, sum);
    }
}

/// Indirect load, args `[offset, index, load slot]`.
///
/// `var_by_load_op[slot]` is the variable the load resolved to during the
/// order-0 sweep, or 0 when it resolved to a parameter.
pub fn forward_load_dir<F: Float>(
    q: usize,
    i_z: usize,
    arg: &[u32],
    var_by_load_op: &[u32],
    t: &mut TaylorView<'_, F>,
) {
    let slot = arg[2] as usize;
    debug_assert!(slot < var_by_load_op.len(), "load slot {} out of range", slot);
    let i_y = var_by_load_op[slot] as usize;
    debug_assert!(i_y < i_z, "load resolved to a later variable");
    if i_y > 0 {
        t.copy_order(i_z, i_y, q);
    } else {
        t.zero_order(i_z, q);
    }
}
