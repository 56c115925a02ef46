use std::fmt::{Debug, Display};

use num_traits::{Float as NumFloat, FloatConst, FromPrimitive};

/// Marker trait for the coefficient type of a sweep (`f32`, `f64`).
///
/// Bundles the numeric and utility traits the derivative rules need.
pub trait Float:
    NumFloat + FloatConst + FromPrimitive + Copy + Send + Sync + Default + Debug + Display + 'static
{
}

impl Float for f32 {}
impl Float for f64 {}

/// Sign of `x` with `sign(0) = 0`.
///
/// `num_traits::Float::signum` maps `+0.0` to `1.0`, which would leak a
/// derivative through `abs` at the kink.
#[inline]
pub fn sign<F: Float>(x: F) -> F {
    if x > F::zero() {
        F::one()
    } else if x < F::zero() {
        -F::one()
    } else {
        F::zero()
    }
}

/// Absolute-zero multiply: `0 * y = 0` even when `y` is infinite or NaN.
#[inline]
pub fn azmul<F: Float>(x: F, y: F) -> F {
    if x == F::zero() {
        F::zero()
    } else {
        x * y
    }
}
