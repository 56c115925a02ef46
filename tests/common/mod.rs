#![allow(dead_code)]

use std::f64::consts::FRAC_2_SQRT_PI;
use std::sync::atomic::{AtomicUsize, Ordering};

use taylor_sweep::float::{azmul, sign};
use taylor_sweep::opcode::cond_flags;
use taylor_sweep::{AtomicOp, CompareOp, OpCode, Player, Tape, TaylorBuffer};

// ══════════════════════════════════════════════
//  Order-0 evaluation
// ══════════════════════════════════════════════

/// `erf(x)` from its Maclaurin series; accurate to ~1e-14 for `|x| <= 3`.
pub fn erf(x: f64) -> f64 {
    let x2 = x * x;
    let mut term = x;
    let mut sum = x;
    for n in 1..120 {
        term *= -x2 / n as f64;
        sum += term / (2 * n + 1) as f64;
    }
    sum * FRAC_2_SQRT_PI
}

/// Buffer for `tape` with order 0 of every variable filled in at `x`.
///
/// Auxiliary rows of multi-result operators get the values the derivative
/// rules expect. Loads resolve through `var_by_load_op` (0 yields 0.0).
pub fn zero_order(
    tape: &Tape<f64>,
    x: &[f64],
    cap_order: usize,
    directions: usize,
    var_by_load_op: &[u32],
) -> TaylorBuffer<f64> {
    assert_eq!(x.len(), tape.num_independent(), "wrong number of inputs");
    let mut buf = tape.taylor_buffer(cap_order, directions);
    let par = tape.parameters();

    let mut i_op = 1;
    while i_op < tape.num_ops() {
        let info = tape.op_info(i_op);
        let args = info.args;
        let z = info.i_var;
        let get = |buf: &TaylorBuffer<f64>, k: usize| buf.value(args[k] as usize);
        let p = |k: usize| par[args[k] as usize];

        match info.op {
            OpCode::Inv => buf.set_value(z, x[z - 1]),
            OpCode::Par => buf.set_value(z, p(0)),

            OpCode::Addvv => buf.set_value(z, get(&buf, 0) + get(&buf, 1)),
            OpCode::Addpv => buf.set_value(z, p(0) + get(&buf, 1)),
            OpCode::Subvv => buf.set_value(z, get(&buf, 0) - get(&buf, 1)),
            OpCode::Subpv => buf.set_value(z, p(0) - get(&buf, 1)),
            OpCode::Subvp => buf.set_value(z, get(&buf, 0) - p(1)),
            OpCode::Mulvv => buf.set_value(z, get(&buf, 0) * get(&buf, 1)),
            OpCode::Mulpv => buf.set_value(z, p(0) * get(&buf, 1)),
            OpCode::Divvv => buf.set_value(z, get(&buf, 0) / get(&buf, 1)),
            OpCode::Divpv => buf.set_value(z, p(0) / get(&buf, 1)),
            OpCode::Divvp => buf.set_value(z, get(&buf, 0) / p(1)),
            OpCode::Zmulvv => buf.set_value(z, azmul(get(&buf, 0), get(&buf, 1))),
            OpCode::Zmulpv => buf.set_value(z, azmul(p(0), get(&buf, 1))),
            OpCode::Zmulvp => buf.set_value(z, azmul(get(&buf, 0), p(1))),

            OpCode::Powvv | OpCode::Powpv | OpCode::Powvp => {
                let (base, expo) = match info.op {
                    OpCode::Powvv => (get(&buf, 0), get(&buf, 1)),
                    OpCode::Powpv => (p(0), get(&buf, 1)),
                    _ => (get(&buf, 0), p(1)),
                };
                let ln = base.ln();
                buf.set_value(z - 2, ln);
                buf.set_value(z - 1, expo * ln);
                buf.set_value(z, (expo * ln).exp());
            }

            OpCode::Exp => buf.set_value(z, get(&buf, 0).exp()),
            OpCode::Expm1 => buf.set_value(z, get(&buf, 0).exp_m1()),
            OpCode::Log => buf.set_value(z, get(&buf, 0).ln()),
            OpCode::Log1p => buf.set_value(z, get(&buf, 0).ln_1p()),
            OpCode::Sqrt => buf.set_value(z, get(&buf, 0).sqrt()),
            OpCode::Erf => {
                let v = get(&buf, 0);
                buf.set_value(z - 4, v * v);
                buf.set_value(z - 3, p(1) - v * v);
                buf.set_value(z - 2, (p(1) - v * v).exp());
                buf.set_value(z - 1, p(2) * (p(1) - v * v).exp());
                buf.set_value(z, erf(v));
            }

            OpCode::Sin | OpCode::Cos | OpCode::Sinh | OpCode::Cosh | OpCode::Tan
            | OpCode::Tanh | OpCode::Asin | OpCode::Acos | OpCode::Atan | OpCode::Asinh
            | OpCode::Acosh | OpCode::Atanh => {
                let v = get(&buf, 0);
                let (aux, main) = match info.op {
                    OpCode::Sin => (v.cos(), v.sin()),
                    OpCode::Cos => (v.sin(), v.cos()),
                    OpCode::Sinh => (v.cosh(), v.sinh()),
                    OpCode::Cosh => (v.sinh(), v.cosh()),
                    OpCode::Tan => (v.tan() * v.tan(), v.tan()),
                    OpCode::Tanh => (v.tanh() * v.tanh(), v.tanh()),
                    OpCode::Asin => ((1.0 - v * v).sqrt(), v.asin()),
                    OpCode::Acos => ((1.0 - v * v).sqrt(), v.acos()),
                    OpCode::Atan => (1.0 + v * v, v.atan()),
                    OpCode::Asinh => ((1.0 + v * v).sqrt(), v.asinh()),
                    OpCode::Acosh => ((v * v - 1.0).sqrt(), v.acosh()),
                    _ => (1.0 - v * v, v.atanh()),
                };
                buf.set_value(z - 1, aux);
                buf.set_value(z, main);
            }

            OpCode::Abs => buf.set_value(z, get(&buf, 0).abs()),
            OpCode::Sign => buf.set_value(z, sign(get(&buf, 0))),
            // Discrete functions in test tapes are the identity.
            OpCode::Dis => buf.set_value(z, get(&buf, 1)),

            OpCode::CExp => {
                let flags = args[1];
                let operand = |buf: &TaylorBuffer<f64>, k: usize, bit: u32| {
                    if flags & bit != 0 {
                        get(buf, k)
                    } else {
                        p(k)
                    }
                };
                let left = operand(&buf, 2, cond_flags::LEFT_VAR);
                let right = operand(&buf, 3, cond_flags::RIGHT_VAR);
                let v = if CompareOp::from_arg(args[0]).holds(left, right) {
                    operand(&buf, 4, cond_flags::TRUE_VAR)
                } else {
                    operand(&buf, 5, cond_flags::FALSE_VAR)
                };
                buf.set_value(z, v);
            }

            OpCode::CSum => {
                let n_add = args[0] as usize;
                let n_sub = args[1] as usize;
                let mut v = p(2);
                for k in 3..3 + n_add {
                    v += get(&buf, k);
                }
                for k in 3 + n_add..3 + n_add + n_sub {
                    v -= get(&buf, k);
                }
                buf.set_value(z, v);
            }

            OpCode::Ldp | OpCode::Ldv => {
                let y = var_by_load_op[args[2] as usize] as usize;
                let v = if y > 0 { buf.value(y) } else { 0.0 };
                buf.set_value(z, v);
            }

            OpCode::User => {
                i_op = atomic_zero_order(tape, &mut buf, i_op);
            }

            _ => {}
        }
        i_op += 1;
    }
    buf
}

/// Evaluate the atomic call opening at `i_op`; returns its closing marker.
fn atomic_zero_order(tape: &Tape<f64>, buf: &mut TaylorBuffer<f64>, i_op: usize) -> usize {
    let call = tape.atomic_info(tape.op_info(i_op).args);
    let par = tape.parameters();
    let (n, m) = (call.n, call.m);

    let mut tx = vec![0.0; n];
    let mut vx = vec![false; n];
    for j in 0..n {
        let info = tape.op_info(i_op + 1 + j);
        let idx = info.args[0] as usize;
        match info.op {
            OpCode::Usrav => {
                tx[j] = buf.value(idx);
                vx[j] = true;
            }
            _ => tx[j] = par[idx],
        }
    }

    let mut ty = vec![0.0; m];
    let mut vy = vec![false; m];
    assert!(call.atom.forward(call.call_id, 0, 0, &vx, &mut vy, &tx, &mut ty));

    for i in 0..m {
        let info = tape.op_info(i_op + 1 + n + i);
        if info.op == OpCode::Usrrv {
            buf.set_value(info.i_var, ty[i]);
        }
    }
    i_op + n + m + 1
}

// ══════════════════════════════════════════════
//  Seeding and sweeping
// ══════════════════════════════════════════════

/// Seed independent `j` along direction `ell` with the line `x_j + dirs[ell][j] t`.
pub fn seed_line(buf: &mut TaylorBuffer<f64>, dirs: &[Vec<f64>]) {
    for (ell, d) in dirs.iter().enumerate() {
        for (j, &v) in d.iter().enumerate() {
            buf.set(j + 1, 1, ell, v);
        }
    }
}

/// Seed independent `j` along direction `ell` with `series[ell][j][k - 1]` at order `k`.
pub fn seed_series(buf: &mut TaylorBuffer<f64>, series: &[Vec<Vec<f64>>]) {
    for (ell, per_var) in series.iter().enumerate() {
        for (j, coeffs) in per_var.iter().enumerate() {
            for (k, &c) in coeffs.iter().enumerate() {
                buf.set(j + 1, k + 1, ell, c);
            }
        }
    }
}

/// Run orders `1..=q_max` with no skipping and no loads.
pub fn sweep_to(tape: &Tape<f64>, buf: &mut TaylorBuffer<f64>, q_max: usize) {
    let loads = vec![0; tape.num_load_ops()];
    tape.forward_orders(q_max, buf, &tape.no_skip(), &loads).unwrap();
}

/// Taylor buffer of a one-input tape along lines with the given slopes.
pub fn along_lines(tape: &Tape<f64>, x0: f64, slopes: &[f64], q_max: usize) -> TaylorBuffer<f64> {
    let mut buf = zero_order(tape, &[x0], q_max + 1, slopes.len(), &[]);
    let dirs: Vec<Vec<f64>> = slopes.iter().map(|&v| vec![v]).collect();
    seed_line(&mut buf, &dirs);
    sweep_to(tape, &mut buf, q_max);
    buf
}

pub fn factorial(k: usize) -> f64 {
    (1..=k).map(|i| i as f64).product()
}

/// Generalized binomial coefficient `C(a, k)`.
pub fn binomial(a: f64, k: usize) -> f64 {
    (0..k).fold(1.0, |acc, i| acc * (a - i as f64) / (i + 1) as f64)
}

// ══════════════════════════════════════════════
//  Atomic operators
// ══════════════════════════════════════════════

/// `y = x^2` with an explicit Taylor rule. Counts its calls.
#[derive(Default)]
pub struct Square {
    pub calls: AtomicUsize,
}

impl Square {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl AtomicOp<f64> for Square {
    fn name(&self) -> &str {
        "square"
    }

    fn forward(
        &self,
        _call_id: usize,
        p: usize,
        q: usize,
        vx: &[bool],
        vy: &mut [bool],
        tx: &[f64],
        ty: &mut [f64],
    ) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(tx.len(), q + 1);
        assert_eq!(ty.len(), q + 1);
        if p == 0 && !vy.is_empty() {
            vy[0] = vx[0];
        }
        for k in p..=q {
            ty[k] = (0..=k).map(|j| tx[j] * tx[k - j]).sum();
        }
        true
    }
}
