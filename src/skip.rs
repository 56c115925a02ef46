//! Conditional-skip cursor advance.
//!
//! The order-0 sweep marks instructions whose results cannot reach a
//! dependent under the current independent values. Higher-order sweeps step
//! over them, jumping whole atomic call blocks at once so the call bracket is
//! never entered half way.

use crate::float::Float;
use crate::opcode::OpCode;
use crate::player::Player;

/// First instruction at or after `i_op` that is not marked in `cskip_op`.
///
/// A skipped opening [`OpCode::User`] marker skips its `n + m` argument and
/// result instructions and the closing marker in one step.
pub fn next_active<F: Float, P: Player<F> + ?Sized>(
    play: &P,
    cskip_op: &[bool],
    mut i_op: usize,
) -> usize {
    let start = i_op;
    loop {
        assert!(
            i_op < cskip_op.len(),
            "skip ran past the end of the tape at instruction {}",
            i_op
        );
        if !cskip_op[i_op] {
            break;
        }
        let info = play.op_info(i_op);
        if info.op == OpCode::User {
            let call = play.atomic_info(info.args);
            i_op += call.n + call.m + 1;
            assert!(
                i_op < cskip_op.len() && play.op_info(i_op).op == OpCode::User,
                "skipped atomic call for {} is not closed at instruction {}",
                call.atom.name(),
                i_op
            );
        }
        i_op += 1;
    }
    if i_op > start {
        log::trace!("skipped instructions {}..{}", start, i_op);
    }
    i_op
}
