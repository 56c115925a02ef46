//! Atomic operators and the call-bracketing protocol.
//!
//! An atomic operator is an opaque differentiable function recorded as one
//! call block:
//!
//! ```text
//! User  Usra{p,v} x n  Usrr{p,v} x m  User
//! ```
//!
//! During a direction sweep the block is replayed by [`AtomicCall`], a small
//! state machine that gathers argument coefficients for all directions,
//! invokes the operator once per direction at the closing marker, and scatters
//! the order-`q` results back into the coefficient buffer.

use crate::error::{Result, SweepError};
use crate::float::Float;
use crate::layout::TaylorView;

/// User-supplied differentiable operator embedded in a tape.
///
/// Coefficient vectors are laid out per argument (or result): entry `j` owns
/// `tx[j * (q + 1) .. (j + 1) * (q + 1)]`, order `k` at offset `k`.
///
/// The call-site identifier recorded on the tape is passed to every call, so
/// implementations hold no per-call mutable state and may be shared between
/// threads.
///
/// # Example
///
/// ```ignore
/// struct Square;
///
/// impl AtomicOp<f64> for Square {
///     fn name(&self) -> &str {
///         "square"
///     }
///     fn forward(&self, _call_id: usize, p: usize, q: usize, _vx: &[bool],
///                _vy: &mut [bool], tx: &[f64], ty: &mut [f64]) -> bool {
///         for k in p..=q {
///             ty[k] = (0..=k).map(|j| tx[j] * tx[k - j]).sum();
///         }
///         true
///     }
/// }
/// ```
pub trait AtomicOp<F: Float>: Send + Sync {
    /// Name used in error reports.
    fn name(&self) -> &str;

    /// Compute orders `p..=q` of every result given orders `0..=q` of every
    /// argument and orders `0..p` of every result.
    ///
    /// `vx` / `vy` carry variable flags for order zero and are empty when
    /// `p > 0`. Returns `false` when the operator cannot supply the request.
    #[allow(clippy::too_many_arguments)]
    fn forward(
        &self,
        call_id: usize,
        p: usize,
        q: usize,
        vx: &[bool],
        vy: &mut [bool],
        tx: &[F],
        ty: &mut [F],
    ) -> bool;
}

/// Handle returned by [`Tape::register_atomic`](crate::Tape::register_atomic).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AtomicHandle(pub(crate) u32);

impl AtomicHandle {
    /// Index of the operator in the tape's registry.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Call-block information decoded from a [`OpCode::User`](crate::OpCode::User) marker.
#[derive(Clone, Copy)]
pub struct AtomicInfo<'a, F: Float> {
    pub atom: &'a dyn AtomicOp<F>,
    pub call_id: usize,
    /// Number of arguments.
    pub n: usize,
    /// Number of results.
    pub m: usize,
}

/// Position within a call block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AtomicState {
    /// Outside any call; the next marker opens one.
    Start,
    /// Gathering argument instructions.
    Args,
    /// Gathering result instructions.
    Results,
    /// All results seen; the next marker closes the call.
    End,
}

/// Replay state for one atomic call block.
///
/// Staging buffers are kept between calls so a sweep allocates at most once
/// per distinct call shape.
pub(crate) struct AtomicCall<F: Float> {
    state: AtomicState,
    q: usize,
    r: usize,
    call_id: usize,
    n: usize,
    m: usize,
    /// Arguments seen.
    j: usize,
    /// Results seen.
    i: usize,
    tx_one: Vec<F>,
    tx_all: Vec<F>,
    ty_one: Vec<F>,
    ty_all: Vec<F>,
    /// Result rows, 0 for parameter results.
    iy: Vec<usize>,
}

impl<F: Float> AtomicCall<F> {
    pub(crate) fn new(q: usize, r: usize) -> Self {
        AtomicCall {
            state: AtomicState::Start,
            q,
            r,
            call_id: 0,
            n: 0,
            m: 0,
            j: 0,
            i: 0,
            tx_one: Vec::new(),
            tx_all: Vec::new(),
            ty_one: Vec::new(),
            ty_all: Vec::new(),
            iy: Vec::new(),
        }
    }

    #[inline]
    pub(crate) fn state(&self) -> AtomicState {
        self.state
    }

    /// Slots per argument / result in the all-direction staging buffers.
    #[inline]
    fn all_stride(&self) -> usize {
        self.q * self.r + 1
    }

    /// Handle a `User` marker: opens a call in `Start`, closes it in `End`.
    pub(crate) fn marker(
        &mut self,
        info: AtomicInfo<'_, F>,
        taylor: &mut TaylorView<'_, F>,
    ) -> Result<()> {
        match self.state {
            AtomicState::Start => {
                self.open(info);
                Ok(())
            }
            AtomicState::End => self.close(info, taylor),
            state => panic!(
                "atomic call marker for {} reached in state {:?} ({} of {} args, {} of {} results)",
                info.atom.name(),
                state,
                self.j,
                self.n,
                self.i,
                self.m
            ),
        }
    }

    fn open(&mut self, info: AtomicInfo<'_, F>) {
        let q1 = self.q + 1;
        let all = self.all_stride();

        self.call_id = info.call_id;
        self.n = info.n;
        self.m = info.m;
        self.j = 0;
        self.i = 0;

        self.tx_one.clear();
        self.tx_one.resize(info.n * q1, F::zero());
        self.tx_all.clear();
        self.tx_all.resize(info.n * all, F::zero());
        self.ty_one.clear();
        self.ty_one.resize(info.m * q1, F::zero());
        self.ty_all.clear();
        self.ty_all.resize(info.m * all, F::zero());
        self.iy.clear();
        self.iy.resize(info.m, 0);

        self.state = if info.n > 0 {
            AtomicState::Args
        } else {
            self.after_args()
        };
    }

    #[inline]
    fn after_args(&self) -> AtomicState {
        if self.m > 0 {
            AtomicState::Results
        } else {
            AtomicState::End
        }
    }

    fn close(&mut self, info: AtomicInfo<'_, F>, taylor: &mut TaylorView<'_, F>) -> Result<()> {
        debug_assert_eq!(self.call_id, info.call_id, "closing marker call id mismatch");
        debug_assert_eq!((self.n, self.m), (info.n, info.m), "closing marker count mismatch");
        debug_assert_eq!(self.j, self.n);
        debug_assert_eq!(self.i, self.m);

        let atom = info.atom;
        let (q, r, n, m) = (self.q, self.r, self.n, self.m);
        let q1 = q + 1;
        let all = self.all_stride();
        self.state = AtomicState::Start;

        for ell in 0..r {
            for j in 0..n {
                let j_all = j * all;
                let j_one = j * q1;
                self.tx_one[j_one] = self.tx_all[j_all];
                for k in 1..q1 {
                    self.tx_one[j_one + k] = self.tx_all[j_all + (k - 1) * r + 1 + ell];
                }
            }
            for i in 0..m {
                let i_all = i * all;
                let i_one = i * q1;
                self.ty_one[i_one] = self.ty_all[i_all];
                for k in 1..q {
                    self.ty_one[i_one + k] = self.ty_all[i_all + (k - 1) * r + 1 + ell];
                }
                self.ty_one[i_one + q] = F::zero();
            }

            let ok = atom.forward(self.call_id, q, q, &[], &mut [], &self.tx_one, &mut self.ty_one);
            if !ok {
                log::debug!(
                    "atomic {} (call {}) refused order {} direction {}",
                    atom.name(),
                    self.call_id,
                    q,
                    ell
                );
                return Err(SweepError::AtomicForward {
                    name: atom.name().to_string(),
                    order: q,
                    direction: ell,
                });
            }

            for i in 0..m {
                self.ty_all[i * all + (q - 1) * r + 1 + ell] = self.ty_one[i * q1 + q];
            }
        }

        // Scatter only once every direction has succeeded.
        for i in 0..m {
            let row = self.iy[i];
            if row > 0 {
                for ell in 0..r {
                    taylor.set(row, q, ell, self.ty_all[i * all + (q - 1) * r + 1 + ell]);
                }
            }
        }
        Ok(())
    }

    fn advance_arg(&mut self) {
        self.j += 1;
        if self.j == self.n {
            self.state = self.after_args();
        }
    }

    fn advance_result(&mut self) {
        self.i += 1;
        if self.i == self.m {
            self.state = AtomicState::End;
        }
    }

    /// Parameter argument: value at order 0, zero above.
    pub(crate) fn param_arg(&mut self, value: F) {
        debug_assert_eq!(self.state, AtomicState::Args, "argument outside argument stage");
        debug_assert!(self.j < self.n);
        let all = self.all_stride();
        let base = self.j * all;
        self.tx_all[base] = value;
        for slot in &mut self.tx_all[base + 1..base + all] {
            *slot = F::zero();
        }
        self.advance_arg();
    }

    /// Variable argument: orders `0..=q` of row `x` in all directions.
    pub(crate) fn var_arg(&mut self, taylor: &TaylorView<'_, F>, x: usize) {
        debug_assert_eq!(self.state, AtomicState::Args, "argument outside argument stage");
        debug_assert!(self.j < self.n);
        let (q, r) = (self.q, self.r);
        let base = self.j * self.all_stride();
        self.tx_all[base] = taylor.get(x, 0, 0);
        for ell in 0..r {
            for k in 1..=q {
                self.tx_all[base + (k - 1) * r + 1 + ell] = taylor.get(x, k, ell);
            }
        }
        self.advance_arg();
    }

    /// Parameter result: contributes no row; order 0 is the parameter value.
    pub(crate) fn param_result(&mut self, value: F) {
        debug_assert_eq!(self.state, AtomicState::Results, "result outside result stage");
        debug_assert!(self.i < self.m);
        let all = self.all_stride();
        let base = self.i * all;
        self.iy[self.i] = 0;
        self.ty_all[base] = value;
        for slot in &mut self.ty_all[base + 1..base + all] {
            *slot = F::zero();
        }
        self.advance_result();
    }

    /// Variable result stored in row `i_var`; its lower orders are staged for
    /// the call and order `q` is written when the call closes.
    pub(crate) fn var_result(&mut self, taylor: &TaylorView<'_, F>, i_var: usize) {
        debug_assert_eq!(self.state, AtomicState::Results, "result outside result stage");
        debug_assert!(self.i < self.m);
        let (q, r) = (self.q, self.r);
        let base = self.i * self.all_stride();
        self.iy[self.i] = i_var;
        self.ty_all[base] = taylor.get(i_var, 0, 0);
        for ell in 0..r {
            for k in 1..=q {
                self.ty_all[base + (k - 1) * r + 1 + ell] = taylor.get(i_var, k, ell);
            }
        }
        self.advance_result();
    }
}
