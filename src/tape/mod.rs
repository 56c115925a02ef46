//! Recorded operation sequence.
//!
//! A [`Tape`] stores instructions as parallel arrays (opcode, argument range,
//! primary result variable) plus a parameter table and the registry of atomic
//! operators it calls. It records structure only: values live in the
//! coefficient buffer, and order-0 evaluation belongs to the caller.
//!
//! Variable 0 is the phantom result of `Begin`. Independents occupy variables
//! `1..=n` and must be declared before any other instruction.

use std::sync::Arc;

use crate::atomic::{AtomicHandle, AtomicInfo, AtomicOp};
use crate::error::Result;
use crate::float::Float;
use crate::layout::TaylorBuffer;
use crate::opcode::{cond_flags, CompareOp, OpCode};
use crate::player::{OpInfo, Player};
use crate::sweep::{self, SweepConfig};

#[cfg(feature = "parallel")]
mod parallel;
#[cfg(feature = "serde")]
mod serde_support;

/// Operand of a conditional, store, print or atomic argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operand {
    /// Variable index.
    Var(u32),
    /// Parameter index.
    Par(u32),
}

impl Operand {
    #[inline]
    fn is_var(self) -> bool {
        matches!(self, Operand::Var(_))
    }

    #[inline]
    fn index(self) -> u32 {
        match self {
            Operand::Var(i) | Operand::Par(i) => i,
        }
    }
}

/// Kind of an atomic call result.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AtomicResult<F> {
    /// Result depends on a variable argument and gets its own variable.
    Var,
    /// Result is the given constant.
    Par(F),
}

/// A recorded function, replayable by the sweeps in this crate.
pub struct Tape<F: Float> {
    pub(crate) ops: Vec<OpCode>,
    /// `args[arg_start[i]..arg_start[i + 1]]` are the arguments of instruction `i`.
    pub(crate) arg_start: Vec<u32>,
    pub(crate) args: Vec<u32>,
    /// Primary result variable of each instruction.
    pub(crate) result_vars: Vec<u32>,
    pub(crate) parameters: Vec<F>,
    pub(crate) num_independent: u32,
    pub(crate) num_variables: u32,
    pub(crate) num_load_ops: u32,
    /// Registered atomic operators (callback table).
    pub(crate) atomics: Vec<Arc<dyn AtomicOp<F>>>,
}

impl<F: Float> Tape<F> {
    /// Create a tape holding only its `Begin` instruction.
    pub fn new() -> Self {
        let mut tape = Tape {
            ops: Vec::new(),
            arg_start: vec![0],
            args: Vec::new(),
            result_vars: Vec::new(),
            parameters: Vec::new(),
            num_independent: 0,
            num_variables: 0,
            num_load_ops: 0,
            atomics: Vec::new(),
        };
        tape.record(OpCode::Begin, &[0]);
        tape
    }

    /// Create a tape with pre-allocated capacity.
    pub fn with_capacity(est_ops: usize) -> Self {
        let mut tape = Self::new();
        tape.ops.reserve(est_ops);
        tape.result_vars.reserve(est_ops);
        tape.arg_start.reserve(est_ops);
        tape.args.reserve(2 * est_ops);
        tape
    }

    /// Append an instruction and its results. Returns the primary result
    /// variable, or the most recent variable for operators without results.
    fn record(&mut self, op: OpCode, args: &[u32]) -> u32 {
        assert!(!self.is_finished(), "tape already ended");
        self.num_variables += op.num_results() as u32;
        let i_var = self.num_variables.saturating_sub(1);
        self.ops.push(op);
        self.args.extend_from_slice(args);
        self.arg_start.push(self.args.len() as u32);
        self.result_vars.push(i_var);
        i_var
    }

    #[inline]
    fn check_var(&self, x: u32) {
        assert!(
            x > 0 && x < self.num_variables,
            "variable index {} out of range (tape has {} variables)",
            x,
            self.num_variables
        );
    }

    #[inline]
    fn check_par(&self, p: u32) {
        assert!(
            (p as usize) < self.parameters.len(),
            "parameter index {} out of range",
            p
        );
    }

    fn check_operand(&self, a: Operand) {
        match a {
            Operand::Var(x) => self.check_var(x),
            Operand::Par(p) => self.check_par(p),
        }
    }

    #[inline]
    fn is_finished(&self) -> bool {
        self.ops.last() == Some(&OpCode::End)
    }

    /// Declare `n` independent variables. Returns their indices.
    ///
    /// # Panics
    ///
    /// Panics if any other instruction has already been recorded.
    pub fn independent(&mut self, n: usize) -> Vec<u32> {
        assert_eq!(
            self.ops.len(),
            1 + self.num_independent as usize,
            "independents must be declared before any other instruction"
        );
        (0..n)
            .map(|_| {
                self.num_independent += 1;
                self.record(OpCode::Inv, &[])
            })
            .collect()
    }

    /// Add a constant to the parameter table. Returns its index.
    pub fn add_parameter(&mut self, value: F) -> u32 {
        let idx = self.parameters.len();
        assert!(idx < u32::MAX as usize, "too many parameters");
        self.parameters.push(value);
        idx as u32
    }

    /// Record an arithmetic, power, elementary or piecewise operator.
    ///
    /// Arguments follow the operand kinds of the opcode suffix (`pv` takes a
    /// parameter index then a variable index); unary operators take one
    /// variable. Returns the primary result variable.
    ///
    /// # Panics
    ///
    /// Panics on opcodes that have a dedicated recording method, on a wrong
    /// argument count, or on an index out of range.
    pub fn push_op(&mut self, op: OpCode, args: &[u32]) -> u32 {
        use OpCode::*;
        let kinds: &[bool] = match op {
            Addvv | Subvv | Mulvv | Divvv | Zmulvv | Powvv => &[true, true],
            Addpv | Subpv | Mulpv | Divpv | Zmulpv | Powpv => &[false, true],
            Subvp | Divvp | Zmulvp | Powvp => &[true, false],
            Exp | Expm1 | Log | Log1p | Sqrt | Sin | Cos | Tan | Asin | Acos | Atan | Sinh
            | Cosh | Tanh | Asinh | Acosh | Atanh | Abs | Sign => &[true],
            _ => panic!("{:?} must be recorded with its dedicated method", op),
        };
        assert_eq!(args.len(), kinds.len(), "wrong number of arguments for {:?}", op);
        for (&a, &is_var) in args.iter().zip(kinds) {
            if is_var {
                self.check_var(a);
            } else {
                self.check_par(a);
            }
        }
        self.record(op, args)
    }

    /// Record a variable holding parameter `p`.
    pub fn push_par(&mut self, p: u32) -> u32 {
        self.check_par(p);
        self.record(OpCode::Par, &[p])
    }

    /// Record `erf(x)`. Adds the two constants the operator needs.
    pub fn push_erf(&mut self, x: u32) -> u32 {
        self.check_var(x);
        let zero = self.add_parameter(F::zero());
        let scale = self.add_parameter(F::FRAC_2_SQRT_PI());
        self.record(OpCode::Erf, &[x, zero, scale])
    }

    /// Record a discrete function `fn_index` applied to `x`.
    pub fn push_dis(&mut self, fn_index: u32, x: u32) -> u32 {
        self.check_var(x);
        self.record(OpCode::Dis, &[fn_index, x])
    }

    /// Record `(left cop right) ? if_true : if_false`.
    pub fn push_cexp(
        &mut self,
        cop: CompareOp,
        left: Operand,
        right: Operand,
        if_true: Operand,
        if_false: Operand,
    ) -> u32 {
        let mut flags = 0;
        for (a, bit) in [
            (left, cond_flags::LEFT_VAR),
            (right, cond_flags::RIGHT_VAR),
            (if_true, cond_flags::TRUE_VAR),
            (if_false, cond_flags::FALSE_VAR),
        ] {
            self.check_operand(a);
            if a.is_var() {
                flags |= bit;
            }
        }
        self.record(
            OpCode::CExp,
            &[
                cop.as_arg(),
                flags,
                left.index(),
                right.index(),
                if_true.index(),
                if_false.index(),
            ],
        )
    }

    /// Record `p + Σ add - Σ sub` with `p` a parameter index.
    pub fn push_csum(&mut self, p: u32, add: &[u32], sub: &[u32]) -> u32 {
        self.check_par(p);
        for &x in add.iter().chain(sub) {
            self.check_var(x);
        }
        let mut args = Vec::with_capacity(4 + add.len() + sub.len());
        args.push(add.len() as u32);
        args.push(sub.len() as u32);
        args.push(p);
        args.extend_from_slice(add);
        args.extend_from_slice(sub);
        args.push((add.len() + sub.len()) as u32);
        self.record(OpCode::CSum, &args)
    }

    /// Record a conditional skip: when `left cop right` holds at order zero
    /// the instructions `skip_if_true` may be skipped, otherwise `skip_if_false`.
    ///
    /// The mask itself is produced by the order-0 evaluator; higher-order
    /// sweeps treat this instruction as a no-op.
    pub fn push_cskip(
        &mut self,
        cop: CompareOp,
        left: Operand,
        right: Operand,
        skip_if_true: &[u32],
        skip_if_false: &[u32],
    ) {
        self.check_operand(left);
        self.check_operand(right);
        let mut flags = 0;
        if left.is_var() {
            flags |= cond_flags::LEFT_VAR;
        }
        if right.is_var() {
            flags |= cond_flags::RIGHT_VAR;
        }
        let mut args = Vec::with_capacity(7 + skip_if_true.len() + skip_if_false.len());
        args.extend_from_slice(&[
            cop.as_arg(),
            flags,
            left.index(),
            right.index(),
            skip_if_true.len() as u32,
            skip_if_false.len() as u32,
        ]);
        args.extend_from_slice(skip_if_true);
        args.extend_from_slice(skip_if_false);
        args.push((skip_if_true.len() + skip_if_false.len()) as u32);
        self.record(OpCode::CSkip, &args);
    }

    /// Record an indirect load from vector `offset` at `index`.
    ///
    /// Each load gets its own slot in the load side table passed to the
    /// sweeps. Returns the result variable.
    pub fn push_load(&mut self, offset: u32, index: Operand) -> u32 {
        self.check_operand(index);
        let op = if index.is_var() { OpCode::Ldv } else { OpCode::Ldp };
        let slot = self.num_load_ops;
        self.num_load_ops += 1;
        self.record(op, &[offset, index.index(), slot])
    }

    /// Record an indirect store of `value` into vector `offset` at `index`.
    pub fn push_store(&mut self, offset: u32, index: Operand, value: Operand) {
        self.check_operand(index);
        self.check_operand(value);
        let op = match (index.is_var(), value.is_var()) {
            (false, false) => OpCode::Stpp,
            (false, true) => OpCode::Stpv,
            (true, false) => OpCode::Stvp,
            (true, true) => OpCode::Stvv,
        };
        self.record(op, &[offset, index.index(), value.index()]);
    }

    /// Record a comparison for later change detection.
    ///
    /// `op` is one of the comparison opcodes; its suffix gives the operand
    /// kinds.
    pub fn push_compare(&mut self, op: OpCode, left: u32, right: u32) {
        use OpCode::*;
        let (left_var, right_var) = match op {
            Eqpv | Ltpv | Lepv | Nepv => (false, true),
            Ltvp | Levp => (true, false),
            Eqvv | Ltvv | Levv | Nevv => (true, true),
            _ => panic!("{:?} is not a comparison", op),
        };
        for (a, is_var) in [(left, left_var), (right, right_var)] {
            if is_var {
                self.check_var(a);
            } else {
                self.check_par(a);
            }
        }
        self.record(op, &[left, right]);
    }

    /// Record a print instruction. `before` and `after` are caller-defined
    /// text identifiers.
    pub fn push_print(&mut self, pos: Operand, before: u32, value: Operand, after: u32) {
        self.check_operand(pos);
        self.check_operand(value);
        let flags = u32::from(pos.is_var()) | (u32::from(value.is_var()) << 1);
        self.record(
            OpCode::Pri,
            &[pos.index(), before, value.index(), after, flags],
        );
    }

    /// Register an atomic operator. Returns a handle for [`push_atomic`](Self::push_atomic).
    pub fn register_atomic(&mut self, atom: Arc<dyn AtomicOp<F>>) -> AtomicHandle {
        let idx = self.atomics.len();
        assert!(idx < u32::MAX as usize, "too many atomic operators");
        self.atomics.push(atom);
        AtomicHandle(idx as u32)
    }

    /// Record one call of a registered atomic operator.
    ///
    /// Emits the opening marker, one instruction per argument and result, and
    /// the closing marker. Returns one entry per result: the new variable for
    /// variable results, `None` for constant ones.
    pub fn push_atomic(
        &mut self,
        handle: AtomicHandle,
        call_id: usize,
        args: &[Operand],
        results: &[AtomicResult<F>],
    ) -> Vec<Option<u32>> {
        assert!(
            handle.index() < self.atomics.len(),
            "unregistered atomic operator {}",
            handle.index()
        );
        let header = [
            handle.0,
            u32::try_from(call_id).unwrap_or_else(|_| panic!("call id {} too large", call_id)),
            args.len() as u32,
            results.len() as u32,
        ];

        self.record(OpCode::User, &header);
        for &a in args {
            self.check_operand(a);
            match a {
                Operand::Var(x) => self.record(OpCode::Usrav, &[x]),
                Operand::Par(p) => self.record(OpCode::Usrap, &[p]),
            };
        }
        let vars = results
            .iter()
            .map(|res| match *res {
                AtomicResult::Var => Some(self.record(OpCode::Usrrv, &[])),
                AtomicResult::Par(value) => {
                    let p = self.add_parameter(value);
                    self.record(OpCode::Usrrp, &[p]);
                    None
                }
            })
            .collect();
        self.record(OpCode::User, &header);
        vars
    }

    /// Record the terminal instruction. No instruction may follow.
    pub fn end(&mut self) {
        self.record(OpCode::End, &[]);
    }

    /// Opcode of instruction `i_op`.
    #[inline]
    pub fn op_code(&self, i_op: usize) -> OpCode {
        self.ops[i_op]
    }

    /// Parameter table.
    #[inline]
    pub fn parameters_slice(&self) -> &[F] {
        &self.parameters
    }

    /// Registered atomic operator behind `handle`.
    #[inline]
    pub fn atomic(&self, handle: AtomicHandle) -> &Arc<dyn AtomicOp<F>> {
        &self.atomics[handle.index()]
    }

    /// Returns `true` if the tape calls atomic operators.
    #[inline]
    pub fn has_atomics(&self) -> bool {
        !self.atomics.is_empty()
    }

    /// All-false skip mask sized to this tape.
    pub fn no_skip(&self) -> Vec<bool> {
        vec![false; self.ops.len()]
    }

    /// Coefficient buffer sized to this tape.
    pub fn taylor_buffer(&self, cap_order: usize, directions: usize) -> TaylorBuffer<F> {
        TaylorBuffer::new(self.num_variables as usize, cap_order, directions)
    }

    /// Order-`q` sweep over an owned buffer. See [`sweep::forward_dir`].
    ///
    /// # Panics
    ///
    /// Panics if the tape has not been ended or `buf` was sized for a
    /// different tape.
    pub fn forward_dir(
        &self,
        q: usize,
        buf: &mut TaylorBuffer<F>,
        cskip_op: &[bool],
        var_by_load_op: &[u32],
    ) -> Result<()> {
        self.forward_dir_with(q, buf, cskip_op, var_by_load_op, &SweepConfig::default())
    }

    /// [`forward_dir`](Self::forward_dir) with explicit options.
    pub fn forward_dir_with(
        &self,
        q: usize,
        buf: &mut TaylorBuffer<F>,
        cskip_op: &[bool],
        var_by_load_op: &[u32],
        config: &SweepConfig,
    ) -> Result<()> {
        assert!(self.is_finished(), "tape has not been ended");
        assert_eq!(
            buf.num_vars(),
            self.num_variables as usize,
            "buffer sized for a different tape"
        );
        let layout = buf.layout();
        sweep::forward_dir_with(
            self,
            q,
            layout,
            buf.as_mut_slice(),
            cskip_op,
            var_by_load_op,
            config,
        )
    }

    /// Run the order sweeps `1..=q_max` in turn.
    ///
    /// Independents must be seeded at every order up to `q_max`, and order 0
    /// of every variable must already be present.
    pub fn forward_orders(
        &self,
        q_max: usize,
        buf: &mut TaylorBuffer<F>,
        cskip_op: &[bool],
        var_by_load_op: &[u32],
    ) -> Result<()> {
        assert!(
            q_max < buf.layout().cap_order(),
            "order {} does not fit the buffer",
            q_max
        );
        for q in 1..=q_max {
            self.forward_dir(q, buf, cskip_op, var_by_load_op)?;
        }
        Ok(())
    }
}

impl<F: Float> Default for Tape<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Float> Player<F> for Tape<F> {
    #[inline]
    fn num_ops(&self) -> usize {
        self.ops.len()
    }

    #[inline]
    fn num_vars(&self) -> usize {
        self.num_variables as usize
    }

    #[inline]
    fn num_independent(&self) -> usize {
        self.num_independent as usize
    }

    #[inline]
    fn num_load_ops(&self) -> usize {
        self.num_load_ops as usize
    }

    #[inline]
    fn op_info(&self, i_op: usize) -> OpInfo<'_> {
        let start = self.arg_start[i_op] as usize;
        let end = self.arg_start[i_op + 1] as usize;
        OpInfo {
            op: self.ops[i_op],
            args: &self.args[start..end],
            i_var: self.result_vars[i_op] as usize,
        }
    }

    #[inline]
    fn parameters(&self) -> &[F] {
        &self.parameters
    }

    fn atomic_info(&self, args: &[u32]) -> AtomicInfo<'_, F> {
        let atom = self
            .atomics
            .get(args[0] as usize)
            .unwrap_or_else(|| panic!("atomic operator {} is not registered", args[0]));
        AtomicInfo {
            atom: atom.as_ref(),
            call_id: args[1] as usize,
            n: args[2] as usize,
            m: args[3] as usize,
        }
    }
}
