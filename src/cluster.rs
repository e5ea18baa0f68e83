//! Cluster/classifier utilities: pure scans over a byte slice with a
//! byte index, generalized from the codepoint-indexed versions
//! (`get_khmer_cluster_length_cps` et al. in `segmenter.rs`) to the
//! byte-offset world the decoder operates in.

use crate::constants::{is_base, is_coeng, is_consonant, is_dependent_vowel, is_digit, is_sign};
use crate::utf8;

/// Length, in bytes, of the Khmer cluster starting at `start`. Non-base
/// codepoints report their own UTF-8 length (a single "cluster" of one
/// codepoint).
pub fn cluster_length(bytes: &[u8], start: usize) -> usize {
    if start >= bytes.len() {
        return 0;
    }
    let (cp, len) = utf8::decode(&bytes[start..]);
    let len = len.max(1);

    if !is_base(cp) {
        return len;
    }

    let mut total = len;
    let mut i = start + len;

    while i < bytes.len() {
        let (c, clen) = utf8::decode(&bytes[i..]);
        let clen = clen.max(1);

        if is_coeng(c) {
            let (next_cp, next_len) = utf8::decode(&bytes[i + clen..]);
            if next_len > 0 && is_consonant(next_cp) {
                total += clen + next_len;
                i += clen + next_len;
                continue;
            }
            break;
        }

        if is_dependent_vowel(c) || is_sign(c) {
            total += clen;
            i += clen;
            continue;
        }

        break;
    }

    total
}

/// Length, in bytes, of a digit/currency run starting at `start`.
/// Returns 0 if `start` is not a digit.
pub fn number_run(bytes: &[u8], start: usize) -> usize {
    if start >= bytes.len() {
        return 0;
    }
    let (cp, len) = utf8::decode(&bytes[start..]);
    if !is_digit(cp) {
        return 0;
    }

    let mut last_valid = len.max(1);
    let mut i = start + last_valid;

    while i < bytes.len() {
        let (c, clen) = utf8::decode(&bytes[i..]);
        let clen = clen.max(1);

        if is_digit(c) {
            last_valid = i + clen - start;
            i += clen;
            continue;
        }

        if c == ',' as u32 || c == '.' as u32 || c == ' ' as u32 {
            let (next_cp, next_len) = utf8::decode(&bytes[i + clen..]);
            if next_len > 0 && is_digit(next_cp) {
                last_valid = i + clen + next_len - start;
                i += clen + next_len;
                continue;
            }
        }
        break;
    }

    last_valid
}

/// True iff the Khmer cluster starting at `i` is immediately followed by
/// an ASCII `.`, i.e. `i` could begin an acronym run.
pub fn is_acronym_start(bytes: &[u8], i: usize) -> bool {
    if i >= bytes.len() {
        return false;
    }
    let clen = cluster_length(bytes, i);
    if clen == 0 {
        return false;
    }
    bytes.get(i + clen) == Some(&b'.')
}

/// Length, in bytes, of the longest run of `(cluster '.')+` starting at
/// `start`.
pub fn acronym_length(bytes: &[u8], start: usize) -> usize {
    let mut current = start;
    loop {
        let clen = cluster_length(bytes, current);
        if clen == 0 {
            break;
        }
        let dot = current + clen;
        if bytes.get(dot) == Some(&b'.') {
            current = dot + 1;
            if current >= bytes.len() {
                break;
            }
            continue;
        }
        break;
    }
    current - start
}
