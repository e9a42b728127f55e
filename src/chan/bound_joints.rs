//! Per-joint inclusion bitmask.

/// One bit per moving joint, indexed in hierarchy walk order.
///
/// Bits beyond the stored words all read as `highest_bits`, so an
/// "everything on" mask needs no storage.
#[derive(Debug, Clone, Default)]
pub struct BoundJoints {
    words: Vec<u64>,
    highest_bits: bool,
}

impl BoundJoints {
    /// All bits off.
    pub fn new() -> Self {
        Self::default()
    }

    /// All bits on.
    pub fn all_on() -> Self {
        Self {
            words: Vec::new(),
            highest_bits: true,
        }
    }

    fn fill_word(&self) -> u64 {
        if self.highest_bits {
            u64::MAX
        } else {
            0
        }
    }

    fn ensure_word(&mut self, word: usize) {
        if self.words.len() <= word {
            let fill = self.fill_word();
            self.words.resize(word + 1, fill);
        }
    }

    pub fn get_bit(&self, index: usize) -> bool {
        match self.words.get(index / 64) {
            Some(word) => word & (1 << (index % 64)) != 0,
            None => self.highest_bits,
        }
    }

    pub fn set_bit(&mut self, index: usize) {
        self.ensure_word(index / 64);
        self.words[index / 64] |= 1 << (index % 64);
    }

    pub fn clear_bit(&mut self, index: usize) {
        self.ensure_word(index / 64);
        self.words[index / 64] &= !(1 << (index % 64));
    }

    pub fn set_bit_to(&mut self, index: usize, value: bool) {
        if value {
            self.set_bit(index);
        } else {
            self.clear_bit(index);
        }
    }

    /// True if no bit is on, including the implicit high bits.
    pub fn is_zero(&self) -> bool {
        !self.highest_bits && self.words.iter().all(|&word| word == 0)
    }

    /// Number of bits on, or `None` when infinitely many are.
    pub fn num_on_bits(&self) -> Option<usize> {
        if self.highest_bits {
            return None;
        }
        Some(self.words.iter().map(|word| word.count_ones() as usize).sum())
    }

    /// Whether the implicit bits past the stored words are on.
    pub fn highest_bits(&self) -> bool {
        self.highest_bits
    }
}

/// Masks are equal when every bit reads the same, however many words
/// each one stores.
impl PartialEq for BoundJoints {
    fn eq(&self, other: &Self) -> bool {
        if self.highest_bits != other.highest_bits {
            return false;
        }
        let len = self.words.len().max(other.words.len());
        (0..len).all(|i| {
            let ours = self.words.get(i).copied().unwrap_or(self.fill_word());
            let theirs = other.words.get(i).copied().unwrap_or(other.fill_word());
            ours == theirs
        })
    }
}

impl Eq for BoundJoints {}
