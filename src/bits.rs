//! Conversion between byte strings and bit sequences, and prefix comparison on bit sequences.
//!
//! Bits are always ordered most significant first: the first bit of `[0b1000_0000]` is `true`.

use crate::error::{Result, TrieError};

/// Unpack the first `bit_count` bits of `data` into `buf`, most significant bit first.
///
/// The buffer is cleared before writing and ends up with exactly `bit_count` entries. If its
/// capacity already covers `bit_count`, no allocation happens. Requesting more bits than `data`
/// holds is an error, in which case `buf` is left empty.
///
/// ```
/// # use tag_trie::bits::unpack_bits;
/// let mut bits = Vec::with_capacity(32);
/// unpack_bits(&mut bits, &[0b1011_0101], 3).unwrap();
/// assert_eq!(bits, vec![true, false, true]);
/// ```
pub fn unpack_bits(buf: &mut Vec<bool>, data: &[u8], bit_count: usize) -> Result<()> {
    buf.clear();
    let available = data.len() * 8;
    if bit_count > available {
        return Err(TrieError::AddressTooShort {
            prefix_len: bit_count,
            available,
        });
    }
    buf.reserve(bit_count);
    let full_bytes = bit_count / 8;
    for byte in &data[..full_bytes] {
        buf.extend((0..8).map(|i| byte & (0x80u8 >> i) != 0));
    }
    if let Some(byte) = data.get(full_bytes) {
        buf.extend((0..bit_count % 8).map(|i| byte & (0x80u8 >> i) != 0));
    }
    Ok(())
}

/// Pack a bit sequence into bytes, most significant bit first. The unused bits of the last byte
/// are zero.
///
/// ```
/// # use tag_trie::bits::pack_bits;
/// assert_eq!(pack_bits(&[true, false, true]), vec![0b1010_0000]);
/// assert_eq!(pack_bits(&[]), Vec::<u8>::new());
/// ```
pub fn pack_bits(bits: &[bool]) -> Vec<u8> {
    bits.chunks(8)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .filter(|(_, bit)| **bit)
                .fold(0u8, |byte, (i, _)| byte | (0x80 >> i))
        })
        .collect()
}

/// Number of leading bits on which `a` and `b` agree. Scanning stops at the first mismatch or
/// at the end of the shorter sequence.
///
/// ```
/// # use tag_trie::bits::count_matches;
/// assert_eq!(count_matches(&[true, true, false], &[true, true, true, false]), 2);
/// ```
#[inline(always)]
pub fn count_matches(a: &[bool], b: &[bool]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}
