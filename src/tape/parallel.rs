use rayon::prelude::*;

use crate::error::Result;
use crate::float::Float;
use crate::layout::TaylorBuffer;

impl<F: Float> super::Tape<F> {
    /// Parallel order-`q` sweep over independent buffers.
    ///
    /// Each buffer is swept by one worker. The buffers share the skip mask and
    /// load table, so they must hold the same order-0 point (typically one
    /// batch of directions each). Returns the first error encountered; other
    /// buffers may or may not have been swept.
    pub fn forward_dir_par(
        &self,
        q: usize,
        bufs: &mut [TaylorBuffer<F>],
        cskip_op: &[bool],
        var_by_load_op: &[u32],
    ) -> Result<()> {
        bufs.par_iter_mut()
            .try_for_each(|buf| self.forward_dir(q, buf, cskip_op, var_by_load_op))
    }

    /// Parallel [`forward_orders`](Self::forward_orders): each buffer runs
    /// orders `1..=q_max` on its own worker.
    pub fn forward_orders_par(
        &self,
        q_max: usize,
        bufs: &mut [TaylorBuffer<F>],
        cskip_op: &[bool],
        var_by_load_op: &[u32],
    ) -> Result<()> {
        bufs.par_iter_mut()
            .try_for_each(|buf| self.forward_orders(q_max, buf, cskip_op, var_by_load_op))
    }
}
