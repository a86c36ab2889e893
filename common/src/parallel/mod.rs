//! Row-parallel iteration helpers on top of rayon.
//!
//! Image kernels split their output into chunks of whole rows and hand each
//! chunk to a rayon worker together with the index of its first row.

use rayon::prelude::*;


/// Multiplier for number of chunks relative to CPU threads.
/// Using 3x threads keeps workers busy when some chunks finish faster.
const CHUNKS_PER_THREAD: usize = 3;

/// Rows per chunk so that `height` splits into about `threads * 3` chunks.
/// Minimum of 1 row per chunk.
#[inline]
pub fn rows_per_chunk(height: usize) -> usize {
    let num_chunks = rayon::current_num_threads() * CHUNKS_PER_THREAD;
    (height / num_chunks).max(1)
}

/// Split row-major mutable data into parallel chunks of whole rows.
pub trait ParRowsMutAuto<T: Send> {
    /// Yields `(chunk_start_row, chunk)` pairs; every chunk holds complete rows.
    ///
    /// # Panics
    ///
    /// Panics if `width` is zero.
    fn par_rows_mut_auto<'a>(
        &'a mut self,
        width: usize,
    ) -> impl IndexedParallelIterator<Item = (usize, &'a mut [T])>
    where
        T: 'a;
}

impl<T: Send> ParRowsMutAuto<T> for [T] {
    fn par_rows_mut_auto<'a>(
        &'a mut self,
        width: usize,
    ) -> impl IndexedParallelIterator<Item = (usize, &'a mut [T])>
    where
        T: 'a,
    {
        assert!(width > 0, "width must be > 0");
        debug_assert_eq!(self.len() % width, 0, "data is not row-aligned");
        let chunk_rows = rows_per_chunk(self.len() / width);
        self.par_chunks_mut(width * chunk_rows)
            .enumerate()
            .map(move |(chunk_idx, chunk)| (chunk_idx * chunk_rows, chunk))
    }
}

/// Split two equally sized row-major buffers into matching row chunks.
///
/// Yields `(chunk_start_row, (chunk_a, chunk_b))`.
///
/// # Panics
///
/// Panics if `width` is zero or the slices differ in length.
pub fn par_rows2_mut_auto<'a, A: Send, B: Send>(
    a: &'a mut [A],
    b: &'a mut [B],
    width: usize,
) -> impl IndexedParallelIterator<Item = (usize, (&'a mut [A], &'a mut [B]))> {
    assert!(width > 0, "width must be > 0");
    assert_eq!(a.len(), b.len(), "Zipped slices must have equal length");
    let chunk_rows = rows_per_chunk(a.len() / width);
    let chunk_size = width * chunk_rows;
    a.par_chunks_mut(chunk_size)
        .zip(b.par_chunks_mut(chunk_size))
        .enumerate()
        .map(move |(chunk_idx, pair)| (chunk_idx * chunk_rows, pair))
}
