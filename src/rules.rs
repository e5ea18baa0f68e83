//! Fixed, ordered rule engine: walks a segment list applying
//! the first matching rule at each position. Ported from the reference
//! `khmer_rule_engine.c`'s `rule_engine_apply`, generalized from its
//! arena-allocated `SegmentList`/`char*` splicing to a `Vec<Vec<u8>>`
//! with ordinary in-place `remove`/assignment.

use bumpalo::collections::Vec as BumpVec;
use bumpalo::Bump;

use crate::constants::is_separator;
use crate::regex_tiny::TinyRegex;
use crate::utf8;

const KA: u32 = 0x1780;
const DA: u32 = 0x178A;
const AHSDA: u32 = 0x17CF;
const I_VOWEL: u32 = 0x17B7;
const TOANDAKHIAT: u32 = 0x17CD;

struct Rules {
    rule0_keep: TinyRegex,
    rule2_signs: TinyRegex,
    rule3_samyok: TinyRegex,
    rule4_pii_koul: TinyRegex,
}

impl Rules {
    fn compiled() -> Self {
        Rules {
            rule0_keep: TinyRegex::compile("^(\u{1780}\u{17CF}|\u{178A}\u{17CF})$"),
            rule2_signs: TinyRegex::compile("^[\\u1780-\\u17A2][\\u17CB\\u17CE\\u17CF]$"),
            rule3_samyok: TinyRegex::compile("^[\\u1780-\\u17A2]\\u17D0$"),
            rule4_pii_koul: TinyRegex::compile("^[\\u1780-\\u17A2]\\u17CC$"),
        }
    }
}

/// Exactly one Khmer-block codepoint, not a valid base, not a digit,
/// not a separator.
fn is_invalid_single(seg: &[u8]) -> bool {
    let (cp, len) = utf8::decode(seg);
    if len == 0 || len != seg.len() {
        return false;
    }
    if !crate::constants::is_khmer_block(cp) {
        return false;
    }
    if crate::constants::is_base(cp) {
        return false;
    }
    if crate::constants::is_digit(cp) {
        return false;
    }
    if is_separator(cp) {
        return false;
    }
    true
}

fn is_ahsda_exception(seg: &[u8]) -> bool {
    let mut it = SegCps::new(seg);
    match (it.next(), it.next(), it.next()) {
        (Some(c0), Some(c1), None) => (c0 == KA || c0 == DA) && c1 == AHSDA,
        _ => false,
    }
}

/// Extra carve-out: consonant + I(U+17B7) + Toandakhiat
/// (U+17CD), merged with the previous segment as a 3-codepoint suffix.
fn is_i_toandakhiat_suffix(seg: &[u8]) -> bool {
    let mut it = SegCps::new(seg);
    match (it.next(), it.next(), it.next(), it.next()) {
        (Some(c0), Some(c1), Some(c2), None) => {
            crate::constants::is_consonant(c0) && c1 == I_VOWEL && c2 == TOANDAKHIAT
        }
        _ => false,
    }
}

struct SegCps<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> SegCps<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        SegCps { bytes, pos: 0 }
    }
}

impl<'a> Iterator for SegCps<'a> {
    type Item = u32;
    fn next(&mut self) -> Option<u32> {
        if self.pos >= self.bytes.len() {
            return None;
        }
        let (cp, len) = utf8::decode(&self.bytes[self.pos..]);
        self.pos += len.max(1);
        Some(cp)
    }
}

/// Run the ordered rule set to fixpoint-by-construction (a single forward
/// pass with step-back on merge, as the reference implementation does).
/// The working segment list lives in `bump` for the duration of the pass.
pub fn apply(segments: Vec<Vec<u8>>, bump: &Bump) -> Vec<Vec<u8>> {
    let rules = Rules::compiled();
    let mut segs = BumpVec::from_iter_in(segments, bump);
    let mut i = 0usize;

    while i < segs.len() {
        let seg = segs[i].clone();

        // Rule 0 / Ahsda exception: KEEP, never merge.
        if rules.rule0_keep.is_match(&seg) || is_ahsda_exception(&seg) {
            i += 1;
            continue;
        }

        // Rule 1: S == U+17A2 (GNOGARM consonant "A"), merge next.
        if seg_is_single(&seg, 0x17A2) {
            if i + 1 < segs.len() && !seg_is_separator(&segs[i + 1]) {
                merge_next(&mut segs, i);
                continue;
            }
        }

        // Rule 2 (+ Toandakhiat-suffix carve-out): merge prev.
        if rules.rule2_signs.is_match(&seg) || is_i_toandakhiat_suffix(&seg) {
            if i > 0 {
                merge_prev(&mut segs, i);
                i -= 1;
                continue;
            }
        }

        // Rule 3: merge next.
        if rules.rule3_samyok.is_match(&seg) {
            if i + 1 < segs.len() {
                merge_next(&mut segs, i);
                continue;
            }
        }

        // Rule 4: merge prev.
        if rules.rule4_pii_koul.is_match(&seg) {
            if i > 0 {
                merge_prev(&mut segs, i);
                i -= 1;
                continue;
            }
        }

        // Rule 5: invalid single consonant cleanup.
        if is_invalid_single(&seg) {
            let prev_is_sep = if i > 0 { seg_is_separator(&segs[i - 1]) } else { true };
            if !prev_is_sep {
                merge_prev(&mut segs, i);
                i -= 1;
                continue;
            }
        }

        i += 1;
    }

    segs.into_iter().collect()
}

fn seg_is_single(seg: &[u8], cp: u32) -> bool {
    let (c, len) = utf8::decode(seg);
    len == seg.len() && c == cp
}

fn seg_is_separator(seg: &[u8]) -> bool {
    let (c, len) = utf8::decode(seg);
    len == seg.len() && is_separator(c)
}

fn merge_next(segs: &mut BumpVec<Vec<u8>>, i: usize) {
    let next = segs.remove(i + 1);
    segs[i].extend_from_slice(&next);
}

fn merge_prev(segs: &mut BumpVec<Vec<u8>>, i: usize) {
    let curr = segs.remove(i);
    segs[i - 1].extend_from_slice(&curr);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segs(strs: &[&str]) -> Vec<Vec<u8>> {
        strs.iter().map(|s| s.as_bytes().to_vec()).collect()
    }

    fn to_strs(v: &[Vec<u8>]) -> Vec<&str> {
        v.iter().map(|b| std::str::from_utf8(b).unwrap()).collect()
    }

    #[test]
    fn ahsda_exception_is_kept_unmerged() {
        // KA + Ahsda (U+17CF) as a single 2-codepoint segment must stay
        // put rather than falling into rule 2's generic sign-merge.
        let input = segs(&["x", "ក៏", "y"]);
        let out = apply(input, &Bump::new());
        assert_eq!(to_strs(&out), vec!["x", "ក៏", "y"]);
    }

    #[test]
    fn consonant_plus_bantoc_merges_with_previous() {
        // Rule 2 matches a 2-codepoint *segment*; the decoder would have
        // already produced "NO+Bantoc" as one unknown-cluster segment.
        let word = "\u{1793}"; // NO
        let bantoc = "\u{17CB}";
        let merged_target = format!("{word}{bantoc}");
        let input = vec!["prefix".as_bytes().to_vec(), merged_target.as_bytes().to_vec()];
        let out = apply(input, &Bump::new());
        assert_eq!(to_strs(&out), vec!["prefix", &merged_target]);
    }

    #[test]
    fn consonant_plus_samyok_sannya_merges_with_next() {
        let word = "\u{1793}\u{17D0}"; // NO + Samyok Sannya
        let input = vec![word.as_bytes().to_vec(), "next".as_bytes().to_vec()];
        let out = apply(input, &Bump::new());
        assert_eq!(out.len(), 1);
        assert_eq!(std::str::from_utf8(&out[0]).unwrap(), format!("{word}next"));
    }

    #[test]
    fn a_consonant_merges_with_non_separator_next() {
        let a = "\u{17A2}"; // U+17A2
        let input = vec![a.as_bytes().to_vec(), "word".as_bytes().to_vec()];
        let out = apply(input, &Bump::new());
        assert_eq!(out.len(), 1);
        assert_eq!(std::str::from_utf8(&out[0]).unwrap(), format!("{a}word"));
    }

    #[test]
    fn a_consonant_does_not_merge_with_separator_next() {
        let a = "\u{17A2}";
        let input = vec![a.as_bytes().to_vec(), " ".as_bytes().to_vec()];
        let out = apply(input, &Bump::new());
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn invalid_single_merges_into_previous_when_not_isolated() {
        // A Khmer-block codepoint outside the base range, not digit, not
        // separator: pick an independent-vowel-adjacent sign as a stand-in.
        let invalid = "\u{17DD}"; // Khmer sign Atthacan, not a base codepoint
        let input = vec!["word".as_bytes().to_vec(), invalid.as_bytes().to_vec()];
        let out = apply(input, &Bump::new());
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn invalid_single_isolated_between_separators_is_untouched() {
        let invalid = "\u{17DD}";
        let input = vec![" ".as_bytes().to_vec(), invalid.as_bytes().to_vec(), " ".as_bytes().to_vec()];
        let out = apply(input, &Bump::new());
        // prev is a separator, so rule 5's "prev is not a separator" check fails -> no merge.
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn i_toandakhiat_suffix_merges_with_previous() {
        let consonant = "\u{1780}";
        let suffix = format!("{consonant}\u{17B7}\u{17CD}");
        let input = vec!["prefix".as_bytes().to_vec(), suffix.as_bytes().to_vec()];
        let out = apply(input, &Bump::new());
        assert_eq!(out.len(), 1);
    }
}
