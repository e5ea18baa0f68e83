//! Permissive UTF-8 decoding shared by the normalizer, decoder and tiny
//! regex engine.
//!
//! Rust's `str` guarantees validity, but this engine tolerates malformed
//! lead bytes in raw input rather than rejecting it outright, so it
//! works over `&[u8]` and decodes by hand wherever it needs to reason
//! about codepoint boundaries.

/// Decode one codepoint starting at `bytes[0]`.
///
/// Returns `(codepoint, byte_len)`. A malformed or truncated lead byte
/// decodes to `(0, 1)`, matching the reference decoder: bad input is
/// swallowed one byte at a time rather than aborting the scan.
#[inline]
pub fn decode(bytes: &[u8]) -> (u32, usize) {
    let Some(&b0) = bytes.first() else {
        return (0, 0);
    };

    if b0 < 0x80 {
        return (b0 as u32, 1);
    }
    if b0 & 0xE0 == 0xC0 {
        if let Some(&b1) = bytes.get(1) {
            return (((b0 as u32 & 0x1F) << 6) | (b1 as u32 & 0x3F), 2);
        }
        return (0, 1);
    }
    if b0 & 0xF0 == 0xE0 {
        if let (Some(&b1), Some(&b2)) = (bytes.get(1), bytes.get(2)) {
            return (
                ((b0 as u32 & 0x0F) << 12) | ((b1 as u32 & 0x3F) << 6) | (b2 as u32 & 0x3F),
                3,
            );
        }
        return (0, 1);
    }
    if b0 & 0xF8 == 0xF0 {
        if let (Some(&b1), Some(&b2), Some(&b3)) = (bytes.get(1), bytes.get(2), bytes.get(3)) {
            return (
                ((b0 as u32 & 0x07) << 18)
                    | ((b1 as u32 & 0x3F) << 12)
                    | ((b2 as u32 & 0x3F) << 6)
                    | (b3 as u32 & 0x3F),
                4,
            );
        }
        return (0, 1);
    }

    (0, 1)
}

/// Byte length a codepoint occupies in well-formed UTF-8. Used to compute
/// `utf8_len(i)` as called for in the decoder's edge proposals.
#[inline]
pub fn len_at(bytes: &[u8]) -> usize {
    decode(bytes).1.max(1)
}

/// Turn a codepoint into a `char`, falling back to the replacement
/// character for values that round-tripped through [`decode`]'s malformed
/// path or otherwise aren't valid scalar values.
#[inline]
pub fn to_char(cp: u32) -> char {
    char::from_u32(cp).unwrap_or('\u{FFFD}')
}
