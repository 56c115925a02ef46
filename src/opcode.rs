//! Operator codes for recorded tapes.
//!
//! Each opcode names one elementary operation. Argument semantics depend on
//! the opcode: a variable index, a parameter index, or a literal (comparison
//! kind, flag bits, counts). Operators with more than one result place their
//! auxiliary rows immediately before the primary result, so an operator with
//! primary result `i_z` and [`num_results`](OpCode::num_results) `= 3` owns
//! rows `i_z - 2`, `i_z - 1` and `i_z`.
//!
//! Suffix letters on binary operators give the operand kinds in argument
//! order: `v` for a variable index, `p` for a parameter index.

/// Elementary operation codes.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OpCode {
    // ── Structural ──
    /// First instruction of every tape. Produces the phantom variable 0.
    Begin,
    /// Last instruction of every tape.
    End,
    /// Independent variable declaration.
    Inv,
    /// Variable whose value is a parameter: `z = p`.
    Par,

    // ── Binary arithmetic ──
    Addvv,
    Addpv,
    Subvv,
    Subpv,
    Subvp,
    Mulvv,
    Mulpv,
    Divvv,
    Divpv,
    Divvp,
    /// Absolute-zero multiply, `0 * y = 0` for every `y`.
    Zmulvv,
    Zmulpv,
    Zmulvp,

    // ── Power (results: log(x), y * log(x), exp(y * log(x))) ──
    Powvv,
    Powpv,
    Powvp,

    // ── Exp / Log ──
    Exp,
    Expm1,
    Log,
    Log1p,
    Sqrt,
    /// Error function. Five results: `x*x`, `-x*x`, `exp(-x*x)`,
    /// `2/sqrt(pi) * exp(-x*x)`, `erf(x)`.
    Erf,

    // ── Trig (auxiliary row at i_z - 1) ──
    /// Auxiliary: `cos(x)`.
    Sin,
    /// Auxiliary: `sin(x)`.
    Cos,
    /// Auxiliary: `tan(x)^2`.
    Tan,
    /// Auxiliary: `sqrt(1 - x*x)`.
    Asin,
    /// Auxiliary: `sqrt(1 - x*x)`.
    Acos,
    /// Auxiliary: `1 + x*x`.
    Atan,

    // ── Hyperbolic (auxiliary row at i_z - 1) ──
    /// Auxiliary: `cosh(x)`.
    Sinh,
    /// Auxiliary: `sinh(x)`.
    Cosh,
    /// Auxiliary: `tanh(x)^2`.
    Tanh,
    /// Auxiliary: `sqrt(1 + x*x)`.
    Asinh,
    /// Auxiliary: `sqrt(x*x - 1)`.
    Acosh,
    /// Auxiliary: `1 - x*x`.
    Atanh,

    // ── Piecewise ──
    Abs,
    /// Zero derivative but needed for re-evaluation.
    Sign,
    /// User discrete function `z = f(x)`; args `[function index, x]`.
    Dis,

    // ── Conditional ──
    /// `z = (left cop right) ? if_true : if_false`;
    /// args `[cop, flags, left, right, if_true, if_false]`.
    CExp,
    /// Conditional skip. Only acts at order zero.
    CSkip,
    /// `z = p + Σ add - Σ sub`;
    /// args `[n_add, n_sub, p, add.., sub.., n_add + n_sub]`.
    CSum,

    // ── Indirect load / store ──
    /// Load with a parameter index; args `[offset, index, load slot]`.
    Ldp,
    /// Load with a variable index; args `[offset, index, load slot]`.
    Ldv,
    Stpp,
    Stpv,
    Stvp,
    Stvv,

    // ── Comparison records (no result) ──
    Eqpv,
    Eqvv,
    Ltpv,
    Ltvp,
    Ltvv,
    Lepv,
    Levp,
    Levv,
    Nepv,
    Nevv,
    /// Print record; args `[pos, before, value, after, flags]`.
    Pri,

    // ── Atomic call bracketing ──
    /// Start or end of an atomic call; args `[atomic index, call id, n, m]`.
    User,
    /// Parameter argument of an atomic call.
    Usrap,
    /// Variable argument of an atomic call.
    Usrav,
    /// Parameter result of an atomic call.
    Usrrp,
    /// Variable result of an atomic call.
    Usrrv,
}

impl OpCode {
    /// Number of variables this operator creates.
    pub fn num_results(self) -> usize {
        use OpCode::*;
        match self {
            End | CSkip | Stpp | Stpv | Stvp | Stvv | Eqpv | Eqvv | Ltpv | Ltvp | Ltvv | Lepv
            | Levp | Levv | Nepv | Nevv | Pri | User | Usrap | Usrav | Usrrp => 0,

            Sin | Cos | Tan | Asin | Acos | Atan | Sinh | Cosh | Tanh | Asinh | Acosh | Atanh => 2,

            Powvv | Powpv | Powvp => 3,

            Erf => 5,

            _ => 1,
        }
    }

    /// Fixed argument count, or `None` for variable-length operators.
    pub fn num_args(self) -> Option<usize> {
        use OpCode::*;
        let n = match self {
            CSum | CSkip => return None,
            End | Inv | Usrrv => 0,
            Begin | Par | Usrap | Usrav | Usrrp => 1,
            Exp | Expm1 | Log | Log1p | Sqrt | Sin | Cos | Tan | Asin | Acos | Atan | Sinh
            | Cosh | Tanh | Asinh | Acosh | Atanh | Abs | Sign => 1,
            Addvv | Addpv | Subvv | Subpv | Subvp | Mulvv | Mulpv | Divvv | Divpv | Divvp
            | Zmulvv | Zmulpv | Zmulvp | Powvv | Powpv | Powvp | Dis => 2,
            Eqpv | Eqvv | Ltpv | Ltvp | Ltvv | Lepv | Levp | Levv | Nepv | Nevv => 2,
            Erf | Ldp | Ldv | Stpp | Stpv | Stvp | Stvv => 3,
            User => 4,
            Pri => 5,
            CExp => 6,
        };
        Some(n)
    }

    /// True for operators that carry no order > 0 computation at all.
    #[inline]
    pub fn is_structural_noop(self) -> bool {
        use OpCode::*;
        matches!(
            self,
            Inv | CSkip
                | Stpp
                | Stpv
                | Stvp
                | Stvv
                | Eqpv
                | Eqvv
                | Ltpv
                | Ltvp
                | Ltvv
                | Lepv
                | Levp
                | Levv
                | Nepv
                | Nevv
                | Pri
        )
    }
}

/// Comparison kind stored in argument 0 of [`OpCode::CExp`] and [`OpCode::CSkip`].
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CompareOp {
    Lt,
    Le,
    Eq,
    Ge,
    Gt,
    Ne,
}

impl CompareOp {
    /// Decode from the literal stored in the tape.
    ///
    /// # Panics
    ///
    /// Panics on a literal outside `0..6`; the tape is corrupt.
    pub fn from_arg(arg: u32) -> Self {
        match arg {
            0 => CompareOp::Lt,
            1 => CompareOp::Le,
            2 => CompareOp::Eq,
            3 => CompareOp::Ge,
            4 => CompareOp::Gt,
            5 => CompareOp::Ne,
            _ => panic!("invalid comparison literal {} in tape", arg),
        }
    }

    #[inline]
    pub fn as_arg(self) -> u32 {
        self as u32
    }

    /// Evaluate `left cop right`.
    #[inline]
    pub fn holds<F: PartialOrd>(self, left: F, right: F) -> bool {
        match self {
            CompareOp::Lt => left < right,
            CompareOp::Le => left <= right,
            CompareOp::Eq => left == right,
            CompareOp::Ge => left >= right,
            CompareOp::Gt => left > right,
            CompareOp::Ne => left != right,
        }
    }
}

/// Flag bits in argument 1 of [`OpCode::CExp`] and [`OpCode::CSkip`]:
/// a set bit marks the corresponding operand as a variable index rather than
/// a parameter index.
pub mod cond_flags {
    pub const LEFT_VAR: u32 = 1;
    pub const RIGHT_VAR: u32 = 2;
    pub const TRUE_VAR: u32 = 4;
    pub const FALSE_VAR: u32 = 8;
}
