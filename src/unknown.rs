//! Unknown-segment merging, the final pass after the rule engine,
//! ported from `post_process_unknowns`/`post_process_unknowns_string`
//! and generalized from owned `String` segments to byte-slice segments.

use bumpalo::collections::Vec as BumpVec;
use bumpalo::Bump;

use crate::constants::{is_digit, is_separator, is_valid_single_word};
use crate::dictionary::DictionaryStore;
use crate::utf8;

/// A segment is known iff: it is a single separator codepoint; it begins
/// with a digit; it hits the dictionary; it is a single valid base
/// codepoint; or it has length >= 2 codepoints and contains an ASCII `.`
/// (acronym). Otherwise it is unknown.
fn is_known(seg: &[u8], dictionary: &DictionaryStore) -> bool {
    let (first_cp, _) = utf8::decode(seg);

    if is_digit(first_cp) {
        return true;
    }
    if dictionary.contains(seg) {
        return true;
    }

    let count = seg_char_count(seg);
    if count == 1 {
        if is_valid_single_word(first_cp) {
            return true;
        }
        if is_separator(first_cp) {
            return true;
        }
        return false;
    }

    count >= 2 && seg.contains(&b'.')
}

fn seg_char_count(seg: &[u8]) -> usize {
    let mut i = 0;
    let mut n = 0;
    while i < seg.len() {
        let len = utf8::len_at(&seg[i..]);
        i += len;
        n += 1;
    }
    n
}

/// Coalesce consecutive unknown segments into a single byte-wise
/// concatenated segment, leaving known segments untouched. The output
/// list lives in `bump` until collected into an owned `Vec` on return.
pub fn merge_unknowns<'a>(
    segments: Vec<&'a [u8]>,
    dictionary: &DictionaryStore,
    bump: &Bump,
) -> Vec<Vec<u8>> {
    let mut out: BumpVec<Vec<u8>> = BumpVec::with_capacity_in(segments.len(), bump);
    let mut buffer: Vec<u8> = Vec::new();

    for seg in segments {
        if is_known(seg, dictionary) {
            if !buffer.is_empty() {
                out.push(std::mem::take(&mut buffer));
            }
            out.push(seg.to_vec());
        } else {
            buffer.extend_from_slice(seg);
        }
    }

    if !buffer.is_empty() {
        out.push(buffer);
    }

    out.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::{BuilderConfig, DictionaryBuilder};

    fn empty_store() -> DictionaryStore {
        DictionaryBuilder::new(Vec::<(String, Option<f64>)>::new(), BuilderConfig::default())
            .into_store()
    }

    #[test]
    fn merges_consecutive_unknown_singles() {
        let store = empty_store();
        // ឥ (independent vowel I, not in the valid-single-word set) is
        // unknown; two in a row with no separator should concatenate.
        let a = "ឥ".as_bytes();
        let segs = vec![a, a];
        let merged = merge_unknowns(segs, &store, &Bump::new());
        let mut expected = a.to_vec();
        expected.extend_from_slice(a);
        assert_eq!(merged, vec![expected]);
    }

    #[test]
    fn valid_single_word_is_known_on_its_own() {
        let store = empty_store();
        let b = "ឦ".as_bytes(); // independent vowel, valid single word
        let merged = merge_unknowns(vec![b], &store, &Bump::new());
        assert_eq!(merged, vec![b.to_vec()]);
    }

    #[test]
    fn separator_breaks_unknown_run() {
        let store = empty_store();
        let unk = "ឥ".as_bytes();
        let sep = " ".as_bytes();
        let segs = vec![unk, sep, unk];
        let merged = merge_unknowns(segs, &store, &Bump::new());
        assert_eq!(merged, vec![unk.to_vec(), sep.to_vec(), unk.to_vec()]);
    }

    #[test]
    fn acronym_like_segment_is_known() {
        let store = empty_store();
        let acro = "ក.ស.".as_bytes();
        let merged = merge_unknowns(vec![acro], &store, &Bump::new());
        assert_eq!(merged, vec![acro.to_vec()]);
    }
}
