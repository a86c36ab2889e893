//! Bit-packed 2D buffer for boolean masks.
//!
//! Uses 1 bit per element instead of 1 byte. A stack of N rejection planes
//! for a 4096x4096 sensor costs 2 MiB per frame instead of 16 MiB.

/// Number of bits per storage word.
const BITS_PER_WORD: usize = 64;

/// A 2D buffer storing boolean values packed as bits, LSB first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitBuffer2 {
    words: Vec<u64>,
    width: usize,
    height: usize,
    /// Total number of bits (width * height).
    len: usize,
}

impl BitBuffer2 {
    /// Create a new bit buffer filled with the given value.
    pub fn new_filled(width: usize, height: usize, value: bool) -> Self {
        let len = width * height;
        let num_words = len.div_ceil(BITS_PER_WORD);
        let fill = if value { !0u64 } else { 0u64 };
        let mut buf = Self {
            words: vec![fill; num_words],
            width,
            height,
            len,
        };
        buf.clear_tail();
        buf
    }

    /// Create a new bit buffer with all bits cleared.
    #[inline]
    pub fn new_default(width: usize, height: usize) -> Self {
        Self::new_filled(width, height, false)
    }

    /// Create a bit buffer from a row-major slice of booleans.
    pub fn from_slice(width: usize, height: usize, data: &[bool]) -> Self {
        let len = width * height;
        assert_eq!(
            data.len(),
            len,
            "data length {} does not match dimensions {}x{}={}",
            data.len(),
            width,
            height,
            len
        );

        let mut buf = Self::new_default(width, height);
        for (i, &value) in data.iter().enumerate() {
            if value {
                buf.set(i, true);
            }
        }
        buf
    }

    // Bits past `len` in the last word stay zero so `count_ones` is exact.
    fn clear_tail(&mut self) {
        let used = self.len % BITS_PER_WORD;
        if used != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= (1u64 << used) - 1;
            }
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn get(&self, idx: usize) -> bool {
        debug_assert!(idx < self.len);
        (self.words[idx / BITS_PER_WORD] >> (idx % BITS_PER_WORD)) & 1 != 0
    }

    #[inline]
    pub fn set(&mut self, idx: usize, value: bool) {
        debug_assert!(idx < self.len);
        let mask = 1u64 << (idx % BITS_PER_WORD);
        let word = &mut self.words[idx / BITS_PER_WORD];
        if value {
            *word |= mask;
        } else {
            *word &= !mask;
        }
    }

    #[inline]
    pub fn get_xy(&self, x: usize, y: usize) -> bool {
        debug_assert!(x < self.width && y < self.height);
        self.get(y * self.width + x)
    }

    #[inline]
    pub fn set_xy(&mut self, x: usize, y: usize, value: bool) {
        debug_assert!(x < self.width && y < self.height);
        self.set(y * self.width + x, value);
    }

    /// Count the number of set bits.
    #[inline]
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Whether every bit set in `self` is also set in `other`.
    pub fn is_subset_of(&self, other: &Self) -> bool {
        assert_eq!(self.width, other.width, "width mismatch");
        assert_eq!(self.height, other.height, "height mismatch");
        self.words
            .iter()
            .zip(&other.words)
            .all(|(&a, &b)| a & !b == 0)
    }

    /// Linear indices of the set bits, ascending.
    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.words
            .iter()
            .enumerate()
            .flat_map(|(word_idx, &word)| {
                let mut remaining = word;
                std::iter::from_fn(move || {
                    if remaining == 0 {
                        return None;
                    }
                    let bit = remaining.trailing_zeros() as usize;
                    remaining &= remaining - 1;
                    Some(word_idx * BITS_PER_WORD + bit)
                })
            })
    }

    /// Iterate over all bit values.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = bool> + '_ {
        (0..self.len).map(|idx| self.get(idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_default_is_clear() {
        let buf = BitBuffer2::new_default(100, 100);
        assert_eq!(buf.len(), 10000);
        assert_eq!(buf.count_ones(), 0);
    }

    #[test]
    fn test_new_filled_true_counts_exactly() {
        // 7x9 = 63 bits, one partial word
        let buf = BitBuffer2::new_filled(7, 9, true);
        assert_eq!(buf.count_ones(), 63);
        assert!(buf.iter().all(|b| b));
    }

    #[test]
    fn test_set_get_across_word_boundary() {
        let mut buf = BitBuffer2::new_default(64, 64);
        for idx in [0, 63, 64, 127] {
            buf.set(idx, true);
        }
        assert!(buf.get(63));
        assert!(buf.get(64));
        assert!(!buf.get(62));
        assert!(!buf.get(65));

        buf.set(64, false);
        assert!(!buf.get(64));
        assert_eq!(buf.count_ones(), 3);
    }

    #[test]
    fn test_set_get_xy() {
        let mut buf = BitBuffer2::new_default(10, 5);
        buf.set_xy(3, 4, true);
        assert!(buf.get_xy(3, 4));
        assert!(buf.get(43));
        assert!(!buf.get_xy(4, 3));
    }

    #[test]
    fn test_iter_ones_ascending() {
        let mut buf = BitBuffer2::new_default(20, 10);
        for idx in [199, 5, 64, 70] {
            buf.set(idx, true);
        }
        let ones: Vec<usize> = buf.iter_ones().collect();
        assert_eq!(ones, vec![5, 64, 70, 199]);
    }

    #[test]
    fn test_is_subset_of() {
        let small = BitBuffer2::from_slice(3, 1, &[true, false, false]);
        let large = BitBuffer2::from_slice(3, 1, &[true, false, true]);
        assert!(small.is_subset_of(&large));
        assert!(!large.is_subset_of(&small));
    }

    #[test]
    fn test_from_slice_roundtrip() {
        let data = vec![true, false, true, false, false, true];
        let buf = BitBuffer2::from_slice(3, 2, &data);
        let back: Vec<bool> = buf.iter().collect();
        assert_eq!(back, data);
    }
}
