// Copyright 2016 Hroi Sigurdsson
//
// Licensed under the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>.
// This file may not be copied, modified, or distributed except according to those terms.

const WORDS: usize = 4;

/// One bit per non-zero prefix length. Length `L` lives at bit `(L - 1) % 32`
/// of word `(L - 1) / 32`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TierMask {
    words: [u32; WORDS],
}

impl TierMask {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn locate(len: u32) -> (usize, u32) {
        debug_assert!(len >= 1 && len as usize <= WORDS * 32);
        let bit = len - 1;
        ((bit >> 5) as usize, bit & 31)
    }

    pub fn set(&mut self, len: u32) {
        let (word, bit) = Self::locate(len);
        self.words[word] |= 1 << bit;
    }

    pub fn unset(&mut self, len: u32) {
        let (word, bit) = Self::locate(len);
        self.words[word] &= !(1 << bit);
    }

    pub fn contains(&self, len: u32) -> bool {
        let (word, bit) = Self::locate(len);
        self.words[word] & (1 << bit) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    pub fn clear(&mut self) {
        self.words = [0; WORDS];
    }

    /// Populated lengths, longest first.
    pub fn iter_longest_first(&self) -> LongestFirst {
        LongestFirst {
            words: self.words,
            word: WORDS,
        }
    }
}

/// Walks a snapshot of the mask from the highest word down, taking the most
/// significant set bit of each word first.
pub struct LongestFirst {
    words: [u32; WORDS],
    word: usize,
}

impl Iterator for LongestFirst {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        while self.word > 0 {
            let current = &mut self.words[self.word - 1];
            if *current == 0 {
                self.word -= 1;
                continue;
            }
            let bit = 31 - current.leading_zeros();
            *current &= !(1 << bit);
            return Some((self.word as u32 - 1) * 32 + bit + 1);
        }
        None
    }
}
