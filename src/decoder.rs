//! Least-cost (Viterbi) decoder over byte positions, generalized from
//! the codepoint-indexed `segment_raw` — the
//! DP array and backtrack are indexed by byte offset into the input so
//! that segment boundaries are UTF-8 byte offsets rather than codepoint
//! counts, matching the wire contract the rest of the pipeline expects.
//!
//! Edge proposals are tried in a fixed order at each reachable position:
//! repair, number/currency run, separator, acronym, dictionary sweep
//! (incremental DJB2 hash), unknown-cluster fallback. Each strictly
//! improves the destination cost (`<`, never `<=`) to keep the result
//! deterministic under equal-cost ties — the first discovered path wins.

use bumpalo::collections::Vec as BumpVec;
use bumpalo::Bump;

use crate::cluster::{acronym_length, cluster_length, is_acronym_start, number_run};
use crate::config::SegmenterConfig;
use crate::constants::{
    is_currency_symbol, is_digit, is_khmer_block, is_separator, is_valid_single_word,
};
use crate::dictionary::{djb2_step, DictionaryStore};
use crate::utf8;

const REPAIR_PENALTY: f32 = 50.0;
const NUMBER_COST: f32 = 1.0;
const SEPARATOR_COST: f32 = 0.1;
const ACRONYM_COST: f32 = 1.0;
const INVALID_SINGLE_PENALTY: f32 = 10.0;

struct Token {
    cp: u32,
    start: usize,
    len: usize,
}

fn tokenize(bytes: &[u8]) -> Vec<Token> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let (cp, len) = utf8::decode(&bytes[i..]);
        let len = len.max(1);
        out.push(Token { cp, start: i, len });
        i += len;
    }
    out
}

/// Decode `bytes` into a list of `(start, end)` byte ranges covering the
/// whole input, least-cost under the dictionary's per-word costs. The DP
/// array and the backtrack list it feeds both live in `bump` for the
/// duration of this call.
pub fn decode(
    bytes: &[u8],
    dictionary: &DictionaryStore,
    config: &SegmenterConfig,
    bump: &Bump,
) -> Vec<(usize, usize)> {
    if bytes.is_empty() {
        return Vec::new();
    }

    let tokens = tokenize(bytes);
    let n = bytes.len();
    let mut dp: BumpVec<(f32, isize)> = BumpVec::with_capacity_in(n + 1, bump);
    dp.resize(n + 1, (f32::INFINITY, -1));
    dp[0] = (0.0, -1);

    for k in 0..tokens.len() {
        let i = tokens[k].start;
        if dp[i].0.is_infinite() {
            continue;
        }
        let cp = tokens[k].cp;

        let prev_is_coeng = k > 0 && crate::constants::is_coeng(tokens[k - 1].cp);
        let force_repair =
            config.repair_mode && (prev_is_coeng || crate::constants::is_dependent_vowel(cp));

        if force_repair {
            let next_idx = i + tokens[k].len;
            relax(&mut dp, i, next_idx, dictionary.unknown_cost() + REPAIR_PENALTY);
            continue;
        }

        let is_digit_char = is_digit(cp);
        let is_curr = is_currency_symbol(cp)
            && tokens
                .get(k + 1)
                .map(|t| is_digit(t.cp))
                .unwrap_or(false);
        if is_digit_char {
            let len = number_run(bytes, i);
            relax(&mut dp, i, i + len, NUMBER_COST);
        } else if is_curr {
            // Consume the currency symbol too: the digit run proper
            // starts just past it.
            let sym_len = tokens[k].len;
            let digit_len = number_run(bytes, i + sym_len);
            relax(&mut dp, i, i + sym_len + digit_len, NUMBER_COST);
        }

        if is_separator(cp) {
            relax(&mut dp, i, i + tokens[k].len, SEPARATOR_COST);
        }

        if config.acronym_detection && is_acronym_start(bytes, i) {
            let len = acronym_length(bytes, i);
            relax(&mut dp, i, i + len, ACRONYM_COST);
        }

        sweep_dictionary(bytes, &tokens, k, dictionary, &mut dp);

        if is_khmer_block(cp) {
            let len = cluster_length(bytes, i);
            let cluster_cp_count = count_codepoints(&tokens, k, i + len);
            let mut cost = dictionary.unknown_cost();
            if cluster_cp_count == 1 && !is_valid_single_word(cp) {
                cost += INVALID_SINGLE_PENALTY;
            }
            relax(&mut dp, i, i + len, cost);
        } else {
            relax(&mut dp, i, i + tokens[k].len, dictionary.unknown_cost());
        }
    }

    backtrack(&dp, n, bump).to_vec()
}

#[inline]
fn relax(dp: &mut [(f32, isize)], from: usize, to: usize, step_cost: f32) {
    if to > dp.len() - 1 {
        return;
    }
    let new_cost = dp[from].0 + step_cost;
    if new_cost < dp[to].0 {
        dp[to] = (new_cost, from as isize);
    }
}

fn count_codepoints(tokens: &[Token], start_idx: usize, end_byte: usize) -> usize {
    tokens[start_idx..]
        .iter()
        .take_while(|t| t.start < end_byte)
        .count()
}

/// Dictionary sweep with an incrementally-maintained DJB2 hash: rather
/// than re-hashing `bytes[i..j]` from scratch for every candidate end
/// `j`, fold in one byte at a time and only probe the table at
/// codepoint boundaries.
fn sweep_dictionary(
    bytes: &[u8],
    tokens: &[Token],
    k: usize,
    dictionary: &DictionaryStore,
    dp: &mut [(f32, isize)],
) {
    let i = tokens[k].start;
    let end_limit = (i + dictionary.max_word_length()).min(bytes.len());

    let mut hash: u32 = 5381;
    let mut pos = i;
    let mut k2 = k;

    while pos < end_limit && k2 < tokens.len() {
        let tok_end = tokens[k2].start + tokens[k2].len;
        for &b in &bytes[pos..tok_end] {
            hash = djb2_step(hash, b);
        }
        pos = tok_end;
        k2 += 1;

        if pos <= end_limit {
            if let Some(cost) = dictionary.lookup_hash(hash, &bytes[i..pos]) {
                relax(dp, i, pos, cost);
            }
        }
    }
}

fn backtrack<'bump>(dp: &[(f32, isize)], n: usize, bump: &'bump Bump) -> BumpVec<'bump, (usize, usize)> {
    let mut spans = BumpVec::new_in(bump);
    let mut curr = n;
    while curr > 0 {
        let (_, prev) = dp[curr];
        if prev < 0 {
            break;
        }
        let prev = prev as usize;
        spans.push((prev, curr));
        curr = prev;
    }
    spans.reverse();
    spans
}
