//! Forward-direction derivative rules, one per operator.
//!
//! Every rule has the shape [`DirRule`]: given order `q > 0`, the primary
//! result row `i_z`, the instruction arguments and the parameter table, it
//! writes the `r` order-`q` coefficients of its result rows (auxiliary rows
//! included) from coefficients already present in the buffer. Rules never
//! touch orders above `q` and never write rows other than their own.
//!
//! [`dir_rule`] is the dispatch table used by the sweep driver.

mod arith;
mod select;
mod transcendental;
mod trig;

pub use arith::{
    forward_addpv_dir, forward_addvv_dir, forward_divpv_dir, forward_divvp_dir, forward_divvv_dir,
    forward_mulpv_dir, forward_mulvv_dir, forward_subpv_dir, forward_subvp_dir, forward_subvv_dir,
    forward_zmulpv_dir, forward_zmulvp_dir, forward_zmulvv_dir,
};
pub use select::{
    forward_abs_dir, forward_cexp_dir, forward_csum_dir, forward_load_dir, forward_zero_dir,
};
pub use transcendental::{
    forward_erf_dir, forward_exp_dir, forward_expm1_dir, forward_log1p_dir, forward_log_dir,
    forward_powpv_dir, forward_powvp_dir, forward_powvv_dir, forward_sqrt_dir,
};
pub use trig::{
    forward_acos_dir, forward_acosh_dir, forward_asin_dir, forward_asinh_dir, forward_atan_dir,
    forward_atanh_dir, forward_cos_dir, forward_cosh_dir, forward_sin_dir, forward_sinh_dir,
    forward_tan_dir, forward_tanh_dir,
};

use crate::float::Float;
use crate::layout::TaylorView;
use crate::opcode::OpCode;

/// Signature shared by all derivative rules:
/// `(q, i_z, args, parameters, coefficients)`.
pub type DirRule<F> = fn(usize, usize, &[u32], &[F], &mut TaylorView<'_, F>);

/// Rule for `op`, or `None` for operators the driver handles itself
/// (structural markers, atomic bracketing, indirect loads, no-ops).
pub fn dir_rule<F: Float>(op: OpCode) -> Option<DirRule<F>> {
    use OpCode::*;
    let rule: DirRule<F> = match op {
        Addvv => forward_addvv_dir,
        Addpv => forward_addpv_dir,
        Subvv => forward_subvv_dir,
        Subpv => forward_subpv_dir,
        Subvp => forward_subvp_dir,
        Mulvv => forward_mulvv_dir,
        Mulpv => forward_mulpv_dir,
        Divvv => forward_divvv_dir,
        Divpv => forward_divpv_dir,
        Divvp => forward_divvp_dir,
        Zmulvv => forward_zmulvv_dir,
        Zmulpv => forward_zmulpv_dir,
        Zmulvp => forward_zmulvp_dir,

        Powvv => forward_powvv_dir,
        Powpv => forward_powpv_dir,
        Powvp => forward_powvp_dir,

        Exp => forward_exp_dir,
        Expm1 => forward_expm1_dir,
        Log => forward_log_dir,
        Log1p => forward_log1p_dir,
        Sqrt => forward_sqrt_dir,
        Erf => forward_erf_dir,

        Sin => forward_sin_dir,
        Cos => forward_cos_dir,
        Tan => forward_tan_dir,
        Asin => forward_asin_dir,
        Acos => forward_acos_dir,
        Atan => forward_atan_dir,
        Sinh => forward_sinh_dir,
        Cosh => forward_cosh_dir,
        Tanh => forward_tanh_dir,
        Asinh => forward_asinh_dir,
        Acosh => forward_acosh_dir,
        Atanh => forward_atanh_dir,

        Abs => forward_abs_dir,
        Sign | Dis | Par => forward_zero_dir,
        CExp => forward_cexp_dir,
        CSum => forward_csum_dir,

        Begin | End | Inv | CSkip | Ldp | Ldv | Stpp | Stpv | Stvp | Stvv | Eqpv | Eqvv | Ltpv
        | Ltvp | Ltvv | Lepv | Levp | Levv | Nepv | Nevv | Pri | User | Usrap | Usrav | Usrrp
        | Usrrv => return None,
    };
    Some(rule)
}

/// `k` as a coefficient-type scalar.
#[inline]
pub(crate) fn order_f<F: Float>(k: usize) -> F {
    F::from_usize(k).unwrap_or_else(F::nan)
}
