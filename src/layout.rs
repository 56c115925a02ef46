//! Flat multi-direction Taylor coefficient storage.
//!
//! One row per tape variable. Order 0 is shared by all directions and stored
//! once; each order `k = 1..cap_order` stores one coefficient per direction.
//! Row stride is therefore `(cap_order - 1) * r + 1`, and the coefficient of
//! variable `i`, order `k > 0`, direction `ell` lives at
//!
//! ```text
//! i * stride + (k - 1) * r + 1 + ell
//! ```

use crate::float::Float;

/// Offset arithmetic for the coefficient arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TaylorLayout {
    cap_order: usize,
    directions: usize,
}

impl TaylorLayout {
    /// Layout holding orders `0..cap_order` for `directions` directions.
    ///
    /// # Panics
    ///
    /// Panics if either count is zero.
    pub fn new(cap_order: usize, directions: usize) -> Self {
        assert!(cap_order >= 1, "cap_order must be >= 1");
        assert!(directions >= 1, "directions must be >= 1");
        TaylorLayout {
            cap_order,
            directions,
        }
    }

    /// Number of order slots per row (`J`).
    #[inline]
    pub fn cap_order(&self) -> usize {
        self.cap_order
    }

    /// Number of directions (`r`).
    #[inline]
    pub fn directions(&self) -> usize {
        self.directions
    }

    /// Coefficients per variable row.
    #[inline]
    pub fn stride(&self) -> usize {
        (self.cap_order - 1) * self.directions + 1
    }

    /// Offset of variable `var`, order `order`, direction `dir`.
    ///
    /// The direction is ignored for order 0.
    #[inline]
    pub fn offset(&self, var: usize, order: usize, dir: usize) -> usize {
        debug_assert!(order < self.cap_order, "order {} >= cap_order {}", order, self.cap_order);
        debug_assert!(dir < self.directions, "direction {} >= {}", dir, self.directions);
        let base = var * self.stride();
        if order == 0 {
            base
        } else {
            base + (order - 1) * self.directions + 1 + dir
        }
    }

    /// Length of a buffer holding `num_vars` rows.
    #[inline]
    pub fn len_for(&self, num_vars: usize) -> usize {
        num_vars * self.stride()
    }
}

/// Mutable view over a caller-owned coefficient slice.
///
/// All derivative rules go through this accessor. Bounds are checked with
/// `debug_assert!` only; release builds trust the tape.
pub struct TaylorView<'a, F: Float> {
    data: &'a mut [F],
    layout: TaylorLayout,
}

impl<'a, F: Float> TaylorView<'a, F> {
    pub fn new(data: &'a mut [F], layout: TaylorLayout) -> Self {
        debug_assert_eq!(
            data.len() % layout.stride(),
            0,
            "buffer length is not a multiple of the row stride"
        );
        TaylorView { data, layout }
    }

    #[inline]
    pub fn layout(&self) -> TaylorLayout {
        self.layout
    }

    #[inline]
    pub fn directions(&self) -> usize {
        self.layout.directions
    }

    /// Number of variable rows covered by the view.
    #[inline]
    pub fn num_vars(&self) -> usize {
        self.data.len() / self.layout.stride()
    }

    #[inline]
    pub fn get(&self, var: usize, order: usize, dir: usize) -> F {
        let idx = self.layout.offset(var, order, dir);
        debug_assert!(idx < self.data.len(), "variable {} out of range", var);
        self.data[idx]
    }

    #[inline]
    pub fn set(&mut self, var: usize, order: usize, dir: usize, value: F) {
        let idx = self.layout.offset(var, order, dir);
        debug_assert!(idx < self.data.len(), "variable {} out of range", var);
        self.data[idx] = value;
    }

    /// Zero the order-`q` slots of `var` in every direction.
    #[inline]
    pub fn zero_order(&mut self, var: usize, q: usize) {
        for ell in 0..self.layout.directions {
            self.set(var, q, ell, F::zero());
        }
    }

    /// Copy the order-`q` slots of `src` into `dst` in every direction.
    #[inline]
    pub fn copy_order(&mut self, dst: usize, src: usize, q: usize) {
        for ell in 0..self.layout.directions {
            let v = self.get(src, q, ell);
            self.set(dst, q, ell, v);
        }
    }

    /// The whole row of `var` in storage order.
    #[inline]
    pub fn row(&self, var: usize) -> &[F] {
        let stride = self.layout.stride();
        &self.data[var * stride..(var + 1) * stride]
    }
}

/// Owned coefficient buffer for a tape with a fixed number of variables.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TaylorBuffer<F> {
    data: Vec<F>,
    layout: TaylorLayout,
    num_vars: usize,
}

impl<F: Float> TaylorBuffer<F> {
    /// Zeroed buffer for `num_vars` variables.
    pub fn new(num_vars: usize, cap_order: usize, directions: usize) -> Self {
        let layout = TaylorLayout::new(cap_order, directions);
        TaylorBuffer {
            data: vec![F::zero(); layout.len_for(num_vars)],
            layout,
            num_vars,
        }
    }

    #[inline]
    pub fn layout(&self) -> TaylorLayout {
        self.layout
    }

    #[inline]
    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    #[inline]
    pub fn get(&self, var: usize, order: usize, dir: usize) -> F {
        self.data[self.layout.offset(var, order, dir)]
    }

    #[inline]
    pub fn set(&mut self, var: usize, order: usize, dir: usize, value: F) {
        let idx = self.layout.offset(var, order, dir);
        self.data[idx] = value;
    }

    /// Order-0 value of `var` (shared by all directions).
    #[inline]
    pub fn value(&self, var: usize) -> F {
        self.get(var, 0, 0)
    }

    #[inline]
    pub fn set_value(&mut self, var: usize, value: F) {
        self.set(var, 0, 0, value);
    }

    /// Coefficients `0..=q` of `var` along direction `dir`.
    pub fn series(&self, var: usize, q: usize, dir: usize) -> Vec<F> {
        (0..=q).map(|k| self.get(var, k, dir)).collect()
    }

    #[inline]
    pub fn as_slice(&self) -> &[F] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [F] {
        &mut self.data
    }

    /// Borrow the buffer as a [`TaylorView`].
    #[inline]
    pub fn view(&mut self) -> TaylorView<'_, F> {
        TaylorView::new(&mut self.data, self.layout)
    }
}
