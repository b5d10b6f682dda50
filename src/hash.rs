// Copyright 2016 Hroi Sigurdsson
//
// Licensed under the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>.
// This file may not be copied, modified, or distributed except according to those terms.

const FNV_OFFSET: u32 = 2_166_136_261;
const FNV_PRIME: u32 = 16_777_619;

/// Fowler-Noll-Vo hash, FNV-1a variant, with a 32-bit accumulator.
#[inline]
pub fn fnv1a(buf: &[u8]) -> u32 {
    let mut h = FNV_OFFSET;
    for &b in buf {
        h ^= u32::from(b);
        h = h.wrapping_mul(FNV_PRIME);
    }
    h
}
