//! Read-only access to a recorded operation sequence.
//!
//! A sweep never builds or mutates a tape; it only walks one through this
//! trait. [`Tape`](crate::Tape) is the in-crate implementation, but any
//! recording that can answer these queries can be replayed.

use crate::atomic::AtomicInfo;
use crate::float::Float;
use crate::opcode::OpCode;

/// One decoded instruction.
#[derive(Clone, Copy, Debug)]
pub struct OpInfo<'a> {
    pub op: OpCode,
    /// Argument indices; meaning depends on `op`.
    pub args: &'a [u32],
    /// Primary result variable. For operators without a result this is the
    /// most recently created variable.
    pub i_var: usize,
}

/// Instruction source for a sweep.
pub trait Player<F: Float> {
    /// Number of recorded instructions, including `Begin` and `End`.
    fn num_ops(&self) -> usize;

    /// Number of variables, including the phantom variable 0.
    fn num_vars(&self) -> usize;

    /// Number of independent variables.
    fn num_independent(&self) -> usize;

    /// Number of indirect load instructions (length of the load side table).
    fn num_load_ops(&self) -> usize;

    /// Instruction `i_op`.
    fn op_info(&self, i_op: usize) -> OpInfo<'_>;

    /// Parameter table.
    fn parameters(&self) -> &[F];

    /// Decode the arguments of a [`OpCode::User`] marker.
    fn atomic_info(&self, args: &[u32]) -> AtomicInfo<'_, F>;
}
