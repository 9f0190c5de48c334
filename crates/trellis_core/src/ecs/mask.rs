//! # Presence Masks
//!
//! One bit per registered component type. Worlds configured for at most 64
//! component types use a single machine word; wider configurations use an
//! array of words addressed by `(word, bit-within-word)`.

/// Bits per mask word.
pub const WORD_BITS: usize = u64::BITS as usize;

/// Width of every mask in a world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MaskLayout {
    words: usize,
}

impl MaskLayout {
    /// Layout able to hold `max_components` distinct bits.
    ///
    /// A `max_components` of zero is treated as one.
    #[inline]
    #[must_use]
    pub const fn for_components(max_components: usize) -> Self {
        let max = if max_components == 0 { 1 } else { max_components };
        Self {
            words: (max - 1) / WORD_BITS + 1,
        }
    }

    /// Number of words per mask.
    #[inline]
    #[must_use]
    pub const fn words(self) -> usize {
        self.words
    }

    /// Number of distinct bits before indices wrap around.
    #[inline]
    #[must_use]
    pub const fn bit_capacity(self) -> usize {
        self.words * WORD_BITS
    }

    /// True when masks fit one machine word.
    #[inline]
    #[must_use]
    pub const fn is_single(self) -> bool {
        self.words == 1
    }
}

/// Location of one component type's presence bit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ComponentBit {
    word: usize,
    mask: u64,
}

impl ComponentBit {
    /// Derives the bit for a component index.
    ///
    /// Indices past the layout's width wrap around and alias the bits of
    /// lower indices. Registering more types than the layout holds is a
    /// contract violation; this is how it shows up.
    #[inline]
    #[must_use]
    pub const fn from_index(index: usize, layout: MaskLayout) -> Self {
        Self {
            word: (index / WORD_BITS) % layout.words,
            mask: 1 << (index % WORD_BITS),
        }
    }

    /// Word this bit lives in.
    #[inline]
    #[must_use]
    pub const fn word(self) -> usize {
        self.word
    }

    /// Single-bit mask within the word.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u64 {
        self.mask
    }
}

/// Bit-vector of component presence.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Mask {
    /// Up to 64 component types.
    Single(u64),
    /// More than 64 component types.
    Multi(Box<[u64]>),
}

impl Default for Mask {
    fn default() -> Self {
        Self::Single(0)
    }
}

impl Mask {
    /// Creates an all-clear mask of the given width.
    #[must_use]
    pub fn empty(layout: MaskLayout) -> Self {
        if layout.is_single() {
            Self::Single(0)
        } else {
            Self::Multi(vec![0; layout.words()].into_boxed_slice())
        }
    }

    /// Returns the raw words.
    #[inline]
    #[must_use]
    pub fn words(&self) -> &[u64] {
        match self {
            Self::Single(word) => std::slice::from_ref(word),
            Self::Multi(words) => words,
        }
    }

    #[inline]
    fn words_mut(&mut self) -> &mut [u64] {
        match self {
            Self::Single(word) => std::slice::from_mut(word),
            Self::Multi(words) => words,
        }
    }

    /// Sets one bit.
    ///
    /// # Panics
    ///
    /// Panics if the bit belongs to a wider layout than this mask.
    #[inline]
    pub fn set(&mut self, bit: ComponentBit) {
        self.words_mut()[bit.word] |= bit.mask;
    }

    /// Clears one bit.
    ///
    /// # Panics
    ///
    /// Panics if the bit belongs to a wider layout than this mask.
    #[inline]
    pub fn clear_bit(&mut self, bit: ComponentBit) {
        self.words_mut()[bit.word] &= !bit.mask;
    }

    /// Clears every bit.
    #[inline]
    pub fn clear(&mut self) {
        self.words_mut().fill(0);
    }

    /// Tests one bit.
    #[inline]
    #[must_use]
    pub fn has(&self, bit: ComponentBit) -> bool {
        self.words()
            .get(bit.word)
            .is_some_and(|word| word & bit.mask != 0)
    }

    /// True if every bit set in `required` is also set in `self`.
    ///
    /// Words missing on either side count as zero. Stops at the first word
    /// that fails.
    #[must_use]
    pub fn contains(&self, required: &Self) -> bool {
        let ours = self.words();
        required.words().iter().enumerate().all(|(i, &want)| {
            let have = ours.get(i).copied().unwrap_or(0);
            have & want == want
        })
    }

    /// True if no bit is set.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words().iter().all(|&word| word == 0)
    }

    /// Number of set bits.
    #[inline]
    #[must_use]
    pub fn count(&self) -> u32 {
        self.words().iter().map(|word| word.count_ones()).sum()
    }
}
