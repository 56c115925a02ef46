use std::f64::consts::{FRAC_2_SQRT_PI, FRAC_PI_2};

use approx::assert_relative_eq;
use taylor_sweep::{OpCode, Tape, TaylorBuffer};

mod common;
use common::*;

const SLOPES: [f64; 3] = [1.0, -0.5, 2.0];

/// `op(x)` along three lines through `x0`; returns the buffer and result row.
fn unary(op: OpCode, x0: f64, q_max: usize) -> (TaylorBuffer<f64>, usize) {
    let mut tape = Tape::new();
    let x = tape.independent(1)[0];
    let z = tape.push_op(op, &[x]) as usize;
    tape.end();
    (along_lines(&tape, x0, &SLOPES, q_max), z)
}

/// Check `z_k = d_k * v^k` for every slope `v`, with `d_k` the `k`-th
/// Taylor coefficient of the function at `x0` along a unit line.
fn assert_series(buf: &TaylorBuffer<f64>, z: usize, q_max: usize, d: impl Fn(usize) -> f64) {
    for (ell, &v) in SLOPES.iter().enumerate() {
        for k in 1..=q_max {
            assert_relative_eq!(
                buf.get(z, k, ell),
                d(k) * v.powi(k as i32),
                epsilon = 1e-12,
                max_relative = 1e-10
            );
        }
    }
}

// ══════════════════════════════════════════════
//  Exponentials and logarithms
// ══════════════════════════════════════════════

#[test]
fn exp_series() {
    let x0 = 0.3;
    let (buf, z) = unary(OpCode::Exp, x0, 5);
    assert_series(&buf, z, 5, |k| x0.exp() / factorial(k));
}

#[test]
fn expm1_matches_exp_above_order_zero() {
    let x0 = -0.7;
    let (buf, z) = unary(OpCode::Expm1, x0, 4);
    assert_relative_eq!(buf.value(z), x0.exp_m1());
    assert_series(&buf, z, 4, |k| x0.exp() / factorial(k));
}

#[test]
fn log_series() {
    let x0 = 1.5;
    let (buf, z) = unary(OpCode::Log, x0, 5);
    assert_series(&buf, z, 5, |k| {
        let s = if k % 2 == 1 { 1.0 } else { -1.0 };
        s / (k as f64 * x0.powi(k as i32))
    });
}

#[test]
fn log1p_series() {
    let x0 = 0.25;
    let (buf, z) = unary(OpCode::Log1p, x0, 4);
    let c = 1.0 + x0;
    assert_series(&buf, z, 4, |k| {
        let s = if k % 2 == 1 { 1.0 } else { -1.0 };
        s / (k as f64 * c.powi(k as i32))
    });
}

#[test]
fn sqrt_series() {
    let x0 = 2.0f64;
    let (buf, z) = unary(OpCode::Sqrt, x0, 5);
    assert_series(&buf, z, 5, |k| {
        x0.sqrt() * binomial(0.5, k) / x0.powi(k as i32)
    });
}

// ══════════════════════════════════════════════
//  Powers
// ══════════════════════════════════════════════

#[test]
fn variable_to_parameter_power() {
    let x0 = 1.7f64;
    let e = 2.5;
    let mut tape = Tape::new();
    let x = tape.independent(1)[0];
    let p = tape.add_parameter(e);
    let z = tape.push_op(OpCode::Powvp, &[x, p]) as usize;
    tape.end();

    let buf = along_lines(&tape, x0, &SLOPES, 4);
    assert_relative_eq!(buf.value(z), x0.powf(e), epsilon = 1e-12);
    assert_series(&buf, z, 4, |k| {
        x0.powf(e) * binomial(e, k) / x0.powi(k as i32)
    });
}

#[test]
fn parameter_to_variable_power() {
    let y0 = 0.4f64;
    let base = 3.0f64;
    let mut tape = Tape::new();
    let y = tape.independent(1)[0];
    let p = tape.add_parameter(base);
    let z = tape.push_op(OpCode::Powpv, &[p, y]) as usize;
    tape.end();

    let buf = along_lines(&tape, y0, &SLOPES, 4);
    assert_series(&buf, z, 4, |k| {
        base.powf(y0) * base.ln().powi(k as i32) / factorial(k)
    });
    // log row of a parameter base is constant
    for ell in 0..SLOPES.len() {
        for k in 1..=4 {
            assert_eq!(buf.get(z - 2, k, ell), 0.0);
        }
    }
}

#[test]
fn variable_power_matches_exp_of_product_of_log() {
    let mut tape = Tape::new();
    let v = tape.independent(2);
    let pow = tape.push_op(OpCode::Powvv, &[v[0], v[1]]) as usize;
    let ln = tape.push_op(OpCode::Log, &[v[0]]);
    let prod = tape.push_op(OpCode::Mulvv, &[v[1], ln]);
    let via_exp = tape.push_op(OpCode::Exp, &[prod]) as usize;
    tape.end();

    let mut buf = zero_order(&tape, &[1.3, 0.8], 5, 2, &[]);
    seed_line(&mut buf, &[vec![1.0, 0.0], vec![0.5, -1.5]]);
    sweep_to(&tape, &mut buf, 4);

    for ell in 0..2 {
        for k in 0..=4 {
            assert_relative_eq!(
                buf.get(pow, k, ell),
                buf.get(via_exp, k, ell),
                epsilon = 1e-12
            );
        }
    }
}

// ══════════════════════════════════════════════
//  Trigonometric and hyperbolic
// ══════════════════════════════════════════════

#[test]
fn sin_and_cos_series() {
    let x0 = 0.6f64;
    let (buf, z) = unary(OpCode::Sin, x0, 5);
    assert_series(&buf, z, 5, |k| (x0 + k as f64 * FRAC_PI_2).sin() / factorial(k));
    // auxiliary row carries cos
    assert_series(&buf, z - 1, 5, |k| (x0 + k as f64 * FRAC_PI_2).cos() / factorial(k));

    let (buf, z) = unary(OpCode::Cos, x0, 5);
    assert_series(&buf, z, 5, |k| (x0 + k as f64 * FRAC_PI_2).cos() / factorial(k));
    assert_series(&buf, z - 1, 5, |k| (x0 + k as f64 * FRAC_PI_2).sin() / factorial(k));
}

#[test]
fn sinh_and_cosh_series() {
    let x0 = -0.4f64;
    let (buf, z) = unary(OpCode::Sinh, x0, 4);
    assert_series(&buf, z, 4, |k| {
        let d = if k % 2 == 0 { x0.sinh() } else { x0.cosh() };
        d / factorial(k)
    });

    let (buf, z) = unary(OpCode::Cosh, x0, 4);
    assert_series(&buf, z, 4, |k| {
        let d = if k % 2 == 0 { x0.cosh() } else { x0.sinh() };
        d / factorial(k)
    });
}

#[test]
fn hyperbolic_identity_holds_at_every_order() {
    // cosh² - sinh² = 1
    let mut tape = Tape::new();
    let x = tape.independent(1)[0];
    let c = tape.push_op(OpCode::Cosh, &[x]);
    let s = tape.push_op(OpCode::Sinh, &[x]);
    let cc = tape.push_op(OpCode::Mulvv, &[c, c]);
    let ss = tape.push_op(OpCode::Mulvv, &[s, s]);
    let d = tape.push_op(OpCode::Subvv, &[cc, ss]) as usize;
    tape.end();

    let buf = along_lines(&tape, 0.8, &SLOPES, 5);
    assert_relative_eq!(buf.value(d), 1.0, epsilon = 1e-12);
    assert_series(&buf, d, 5, |_| 0.0);
}

#[test]
fn tan_and_tanh_low_orders() {
    let x0 = 0.5f64;
    let t0 = x0.tan();
    let (buf, z) = unary(OpCode::Tan, x0, 2);
    assert_series(&buf, z, 2, |k| match k {
        1 => 1.0 + t0 * t0,
        _ => t0 * (1.0 + t0 * t0),
    });

    let h0 = x0.tanh();
    let (buf, z) = unary(OpCode::Tanh, x0, 2);
    assert_series(&buf, z, 2, |k| match k {
        1 => 1.0 - h0 * h0,
        _ => -h0 * (1.0 - h0 * h0),
    });
}

#[test]
fn tan_matches_sin_over_cos() {
    let mut tape = Tape::new();
    let x = tape.independent(1)[0];
    let tan = tape.push_op(OpCode::Tan, &[x]) as usize;
    let s = tape.push_op(OpCode::Sin, &[x]);
    let c = tape.push_op(OpCode::Cos, &[x]);
    let q = tape.push_op(OpCode::Divvv, &[s, c]) as usize;
    tape.end();

    let buf = along_lines(&tape, 0.9, &SLOPES, 5);
    for ell in 0..SLOPES.len() {
        for k in 1..=5 {
            assert_relative_eq!(buf.get(tan, k, ell), buf.get(q, k, ell), epsilon = 1e-9);
        }
    }
}

#[test]
fn inverse_functions_low_orders() {
    let x0 = 0.3f64;
    let cases: [(OpCode, f64, f64); 5] = [
        (OpCode::Asin, 1.0 / (1.0 - x0 * x0).sqrt(), x0 / (1.0 - x0 * x0).powf(1.5)),
        (OpCode::Acos, -1.0 / (1.0 - x0 * x0).sqrt(), -x0 / (1.0 - x0 * x0).powf(1.5)),
        (OpCode::Atan, 1.0 / (1.0 + x0 * x0), -2.0 * x0 / (1.0 + x0 * x0).powi(2)),
        (OpCode::Asinh, 1.0 / (1.0 + x0 * x0).sqrt(), -x0 / (1.0 + x0 * x0).powf(1.5)),
        (OpCode::Atanh, 1.0 / (1.0 - x0 * x0), 2.0 * x0 / (1.0 - x0 * x0).powi(2)),
    ];
    for (op, d1, d2) in cases {
        let (buf, z) = unary(op, x0, 2);
        assert_series(&buf, z, 2, |k| if k == 1 { d1 } else { d2 / 2.0 });
    }

    let x0 = 1.8f64;
    let (buf, z) = unary(OpCode::Acosh, x0, 2);
    let d1 = 1.0 / (x0 * x0 - 1.0).sqrt();
    let d2 = -x0 / (x0 * x0 - 1.0).powf(1.5);
    assert_series(&buf, z, 2, |k| if k == 1 { d1 } else { d2 / 2.0 });
}

#[test]
fn inverse_of_forward_is_identity() {
    let cases = [
        (OpCode::Sin, OpCode::Asin, 0.3),
        (OpCode::Cos, OpCode::Acos, 1.1),
        (OpCode::Tan, OpCode::Atan, 0.4),
        (OpCode::Sinh, OpCode::Asinh, 0.7),
        (OpCode::Cosh, OpCode::Acosh, 0.9),
        (OpCode::Tanh, OpCode::Atanh, 0.2),
        (OpCode::Exp, OpCode::Log, -0.3),
    ];
    for (fwd, inv, x0) in cases {
        let mut tape = Tape::new();
        let x = tape.independent(1)[0];
        let y = tape.push_op(fwd, &[x]);
        let z = tape.push_op(inv, &[y]) as usize;
        tape.end();

        let buf = along_lines(&tape, x0, &SLOPES, 4);
        assert_relative_eq!(buf.value(z), x0, epsilon = 1e-12);
        assert_series(&buf, z, 4, |k| if k == 1 { 1.0 } else { 0.0 });
    }
}

// ══════════════════════════════════════════════
//  Error function
// ══════════════════════════════════════════════

#[test]
fn erf_low_orders() {
    let x0 = 0.45f64;
    let mut tape = Tape::new();
    let x = tape.independent(1)[0];
    let z = tape.push_erf(x) as usize;
    tape.end();

    let buf = along_lines(&tape, x0, &SLOPES, 3);
    let g = FRAC_2_SQRT_PI * (-x0 * x0).exp();
    assert_relative_eq!(buf.value(z), erf(x0), epsilon = 1e-12);
    assert_series(&buf, z, 3, |k| match k {
        1 => g,
        2 => -x0 * g,
        _ => (4.0 * x0 * x0 - 2.0) * g / 6.0,
    });
    // the Gaussian row is exp(-x²)
    assert_series(&buf, z - 2, 1, |_| -2.0 * x0 * (-x0 * x0).exp());
}
