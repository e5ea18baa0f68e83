//! Input normalizer: codepoint substitutions followed by cluster
//! reordering. Ported from the reference `khmer_normalize` (C), rewritten
//! over owned byte buffers instead of hand-rolled `StrBuf`/`realloc`.

use crate::constants::{is_coeng, is_consonant, is_ro, CharClass};
use crate::utf8;

const ZWS: u32 = 0x200B;
const E: u32 = 0x17C1;
const I: u32 = 0x17B8;
const AA: u32 = 0x17B6;
const OE: u32 = 0x17BE;
const AU: u32 = 0x17C4;

/// Normalize raw bytes to the canonical cluster form.
/// Never fails; malformed lead bytes fall through as themselves (a single
/// 0xNN byte, since [`utf8::decode`] reports length 1 for them).
pub fn normalize(text: &[u8]) -> Vec<u8> {
    let phase1 = substitute(text);
    reorder_clusters(&phase1)
}

/// Phase 1: drop ZWS, compose `e+i -> oe` and `e+aa -> au`.
fn substitute(text: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    let mut i = 0;
    while i < text.len() {
        let (cp, len) = utf8::decode(&text[i..]);

        if cp == ZWS {
            i += len;
            continue;
        }

        if cp == E {
            let (next_cp, next_len) = utf8::decode(&text[i + len..]);
            if next_len > 0 && next_cp == I {
                push_char(&mut out, OE);
                i += len + next_len;
                continue;
            }
            if next_len > 0 && next_cp == AA {
                push_char(&mut out, AU);
                i += len + next_len;
                continue;
            }
        }

        out.extend_from_slice(&text[i..i + len.max(1)]);
        i += len.max(1);
    }
    out
}

fn push_char(out: &mut Vec<u8>, cp: u32) {
    let mut buf = [0u8; 4];
    out.extend_from_slice(utf8::to_char(cp).encode_utf8(&mut buf).as_bytes());
}

#[derive(Clone)]
struct ClusterPart {
    bytes: Vec<u8>,
    class: CharClass,
    cp: u32,
    /// secondary sort key: the order this part appeared in the input
    order: usize,
}

/// Sort priority for cluster reordering. COENG parts additionally need
/// their captured consonant to tell a Ro-subscript from any other.
fn priority(part: &ClusterPart) -> u32 {
    match part.class {
        CharClass::Coeng => {
            // part.bytes holds COENG + consonant; decode the consonant.
            let coeng_len = utf8::len_at(&part.bytes);
            let (cons_cp, cons_len) = utf8::decode(&part.bytes[coeng_len..]);
            if cons_len > 0 && is_ro(cons_cp) {
                20
            } else {
                10
            }
        }
        CharClass::Register => 30,
        CharClass::Vowel => 40,
        CharClass::Sign => 50,
        CharClass::Base | CharClass::Other => 0,
    }
}

/// Phase 2: partition into clusters, stably reorder each cluster's
/// trailing parts by priority, base-first.
fn reorder_clusters(text: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    let mut cluster: Vec<ClusterPart> = Vec::new();
    let mut order = 0usize;
    let mut i = 0;

    while i < text.len() {
        let (cp, len) = utf8::decode(&text[i..]);
        let len = len.max(1);
        let class = crate::constants::classify(cp);

        match class {
            CharClass::Base => {
                flush(&mut out, &mut cluster);
                cluster.push(ClusterPart {
                    bytes: text[i..i + len].to_vec(),
                    class,
                    cp,
                    order,
                });
                order += 1;
                i += len;
            }
            CharClass::Coeng => {
                let (next_cp, next_len) = utf8::decode(&text[i + len..]);
                if next_len > 0 && is_consonant(next_cp) {
                    let total = len + next_len;
                    cluster.push(ClusterPart {
                        bytes: text[i..i + total].to_vec(),
                        class,
                        cp,
                        order,
                    });
                    order += 1;
                    i += total;
                } else {
                    // Stray coeng becomes its own part.
                    cluster.push(ClusterPart {
                        bytes: text[i..i + len].to_vec(),
                        class,
                        cp,
                        order,
                    });
                    order += 1;
                    i += len;
                }
            }
            CharClass::Register | CharClass::Vowel | CharClass::Sign => {
                if cluster.is_empty() {
                    // Isolated modifier: pass through unchanged.
                    out.extend_from_slice(&text[i..i + len]);
                } else {
                    cluster.push(ClusterPart {
                        bytes: text[i..i + len].to_vec(),
                        class,
                        cp,
                        order,
                    });
                    order += 1;
                }
                i += len;
            }
            CharClass::Other => {
                flush(&mut out, &mut cluster);
                out.extend_from_slice(&text[i..i + len]);
                i += len;
            }
        }
    }
    flush(&mut out, &mut cluster);
    out
}

fn flush(out: &mut Vec<u8>, cluster: &mut Vec<ClusterPart>) {
    if cluster.is_empty() {
        return;
    }
    if cluster.len() > 2 {
        // Base stays first; everything after is stably sorted by
        // (priority, input order).
        let base = cluster[0].clone();
        let mut rest: Vec<ClusterPart> = cluster[1..].to_vec();
        rest.sort_by_key(|p| (priority(p), p.order));
        out.extend_from_slice(&base.bytes);
        for part in &rest {
            out.extend_from_slice(&part.bytes);
        }
    } else {
        for part in cluster.iter() {
            out.extend_from_slice(&part.bytes);
        }
    }
    cluster.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(s: &str) -> Vec<u8> {
        normalize(s.as_bytes())
    }

    #[test]
    fn drops_zero_width_space() {
        assert_eq!(n("\u{200B}"), Vec::<u8>::new());
    }

    #[test]
    fn composes_oe() {
        assert_eq!(n("\u{17C1}\u{17B8}"), "\u{17BE}".as_bytes());
    }

    #[test]
    fn composes_au() {
        assert_eq!(n("\u{17C1}\u{17B6}"), "\u{17C4}".as_bytes());
    }

    #[test]
    fn is_idempotent() {
        let s = "កម្ពុជាប្រទេស";
        let once = normalize(s.as_bytes());
        let twice = normalize(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn base_precedes_coeng_register_vowel_sign() {
        // Construct an out-of-order cluster: base + sign + vowel + register + coeng(non-ro)
        let base = "\u{1780}"; // KA
        let sign = "\u{17C6}";
        let vowel = "\u{17B6}";
        let register = "\u{17C9}";
        let coeng = "\u{17D2}\u{1781}"; // coeng + KHA (non-Ro)
        let input = format!("{base}{sign}{vowel}{register}{coeng}");
        let out = normalize(input.as_bytes());
        let out_str = std::str::from_utf8(&out).unwrap();
        let expected = format!("{base}{coeng}{register}{vowel}{sign}");
        assert_eq!(out_str, expected);
    }

    #[test]
    fn coeng_ro_sorts_after_other_coeng() {
        let base = "\u{1780}";
        let coeng_ro = "\u{17D2}\u{179A}";
        let coeng_other = "\u{17D2}\u{1781}";
        let input = format!("{base}{coeng_ro}{coeng_other}");
        let out = normalize(input.as_bytes());
        let out_str = std::str::from_utf8(&out).unwrap();
        let expected = format!("{base}{coeng_other}{coeng_ro}");
        assert_eq!(out_str, expected);
    }

    #[test]
    fn stray_coeng_without_consonant_is_its_own_part() {
        let input = "\u{17D2}\u{17B6}"; // coeng then vowel, no consonant
        let out = normalize(input.as_bytes());
        // Isolated modifier since no base/cluster is open.
        assert_eq!(out, input.as_bytes());
    }

    #[test]
    fn malformed_utf8_passes_through() {
        let input = [0xFF, b'a'];
        assert_eq!(normalize(&input), vec![0xFF, b'a']);
    }
}
