//! Order-`q` forward sweep over `r` directions.
//!
//! The driver walks a [`Player`] once from the instruction after the
//! independents to `End`, steps over instructions marked in the skip mask, and
//! dispatches each remaining instruction to its derivative rule or to the
//! atomic call state machine.
//!
//! Preconditions on the coefficient buffer: orders `0..q` of every variable
//! and order `q` of the independents are already present. The sweep writes
//! order `q` of every other variable and nothing else.

use crate::atomic::{AtomicCall, AtomicState};
use crate::error::Result;
use crate::float::Float;
use crate::layout::{TaylorLayout, TaylorView};
use crate::opcode::OpCode;
use crate::player::{OpInfo, Player};
use crate::rules;
use crate::skip::next_active;

/// Sweep options.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SweepConfig {
    /// Emit a `trace!` record with the new coefficients of every instruction.
    pub trace: bool,
}

/// Compute order `q` of every non-independent variable in `taylor`.
///
/// `cskip_op` has one entry per instruction; `var_by_load_op` maps each load
/// slot to the variable it resolved to during the order-0 sweep (0 for a
/// parameter).
///
/// # Errors
///
/// [`SweepError::AtomicForward`](crate::SweepError::AtomicForward) when an
/// atomic operator refuses the request. Instructions after the failing call
/// are not evaluated.
///
/// # Panics
///
/// Panics if the buffer or skip mask does not match the tape, or if the tape
/// is structurally corrupt.
pub fn forward_dir<F: Float, P: Player<F> + ?Sized>(
    play: &P,
    q: usize,
    layout: TaylorLayout,
    taylor: &mut [F],
    cskip_op: &[bool],
    var_by_load_op: &[u32],
) -> Result<()> {
    forward_dir_with(
        play,
        q,
        layout,
        taylor,
        cskip_op,
        var_by_load_op,
        &SweepConfig::default(),
    )
}

/// [`forward_dir`] with explicit options.
pub fn forward_dir_with<F: Float, P: Player<F> + ?Sized>(
    play: &P,
    q: usize,
    layout: TaylorLayout,
    taylor: &mut [F],
    cskip_op: &[bool],
    var_by_load_op: &[u32],
    config: &SweepConfig,
) -> Result<()> {
    let num_ops = play.num_ops();
    let n = play.num_independent();
    let r = layout.directions();

    debug_assert!(q > 0, "forward_dir requires order > 0");
    debug_assert!(
        q < layout.cap_order(),
        "order {} does not fit cap_order {}",
        q,
        layout.cap_order()
    );
    assert_eq!(
        taylor.len(),
        layout.len_for(play.num_vars()),
        "coefficient buffer does not match tape variable count"
    );
    assert_eq!(cskip_op.len(), num_ops, "skip mask length does not match tape");
    debug_assert_eq!(var_by_load_op.len(), play.num_load_ops());

    assert!(
        play.op_info(0).op == OpCode::Begin,
        "tape does not start with Begin"
    );
    for i_op in 1..=n {
        assert!(
            play.op_info(i_op).op == OpCode::Inv,
            "instruction {} is not an independent declaration",
            i_op
        );
    }

    log::debug!(
        "forward sweep: order {}, {} directions, {} ops, {} vars",
        q,
        r,
        num_ops,
        play.num_vars()
    );

    let parameter = play.parameters();
    let mut t = TaylorView::new(taylor, layout);
    let mut call = AtomicCall::new(q, r);

    let mut i_op = n + 1;
    loop {
        i_op = next_active(play, cskip_op, i_op);
        let OpInfo { op, args, i_var } = play.op_info(i_op);

        match op {
            OpCode::End => break,
            OpCode::Begin => panic!("Begin at instruction {}", i_op),

            OpCode::User => call.marker(play.atomic_info(args), &mut t)?,
            OpCode::Usrap => call.param_arg(parameter[args[0] as usize]),
            OpCode::Usrav => call.var_arg(&t, args[0] as usize),
            OpCode::Usrrp => call.param_result(parameter[args[0] as usize]),
            OpCode::Usrrv => call.var_result(&t, i_var),

            OpCode::Ldp | OpCode::Ldv => {
                rules::forward_load_dir(q, i_var, args, var_by_load_op, &mut t)
            }

            OpCode::Inv => debug_assert!(i_op <= n, "Inv at instruction {}", i_op),
            _ if op.is_structural_noop() => {}

            _ => match rules::dir_rule::<F>(op) {
                Some(rule) => rule(q, i_var, args, parameter, &mut t),
                None => panic!("no forward rule for {:?} at instruction {}", op, i_op),
            },
        }

        if config.trace {
            trace_op(i_op, op, i_var, q, &t);
        }
        i_op += 1;
    }

    assert!(
        call.state() == AtomicState::Start,
        "atomic call left open at End (state {:?})",
        call.state()
    );
    Ok(())
}

/// Log the new order-`q` coefficients of an instruction's primary result.
fn trace_op<F: Float>(i_op: usize, op: OpCode, i_var: usize, q: usize, t: &TaylorView<'_, F>) {
    if !log::log_enabled!(log::Level::Trace) {
        return;
    }
    if op.num_results() == 0 || matches!(op, OpCode::Usrrv) {
        log::trace!("{:>6} {:?}", i_op, op);
        return;
    }
    let coeffs: Vec<Vec<F>> = (0..t.directions())
        .map(|ell| (1..=q).map(|k| t.get(i_var, k, ell)).collect())
        .collect();
    log::trace!(
        "{:>6} {:?} v{} = {} {:?}",
        i_op,
        op,
        i_var,
        t.get(i_var, 0, 0),
        coeffs
    );
}
