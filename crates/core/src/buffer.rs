//! Fallible allocation of working buffers
//!
//! Scratch memory is sized from caller parameters, so allocation goes through
//! `try_reserve_exact` and a failure is reported instead of aborting.

use crate::error::{PowError, Result};

/// Allocate a zero-filled vector of `len` elements.
pub(crate) fn zeroed<T: Copy + Default>(len: usize, what: &'static str) -> Result<Vec<T>> {
    let bytes = len.saturating_mul(size_of::<T>());
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| PowError::Allocation { what, bytes })?;
    buf.resize(len, T::default());
    Ok(buf)
}
