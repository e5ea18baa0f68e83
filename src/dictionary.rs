//! Dictionary store: the baked `KDIC` binary format, an open-addressed
//! DJB2 hash table over an immutable string pool.
//!
//! Also hosts [`DictionaryBuilder`], an in-library equivalent of an
//! external baking tool — word filtering, frequency-to-cost conversion
//! and variant generation ported from
//! `Dictionary::new`/`load_words`/`calculate_costs`/`generate_variants`.

use std::path::Path;

use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};

use crate::constants::is_valid_single_word;
use crate::error::Error;

const MAGIC: &[u8; 4] = b"KDIC";
const VERSION: u32 = 1;
const HEADER_LEN: usize = 32;
const ENTRY_LEN: usize = 8;

/// `h = 5381; h = ((h << 5) + h) + b` for each byte.
#[inline]
pub fn djb2(bytes: &[u8]) -> u32 {
    let mut h: u32 = 5381;
    for &b in bytes {
        h = djb2_step(h, b);
    }
    h
}

/// Single DJB2 fold step, exposed so the decoder can maintain a rolling
/// hash across the dictionary sweep instead of rehashing the whole slice
/// at every candidate end position.
#[inline]
pub fn djb2_step(h: u32, byte: u8) -> u32 {
    h.wrapping_shl(5).wrapping_add(h).wrapping_add(byte as u32)
}

/// An immutable, loaded dictionary. Read-only for the lifetime of the
/// owning `Segmenter`; lookups never allocate.
pub struct DictionaryStore {
    blob: Vec<u8>,
    table_size: u32,
    default_cost: f32,
    unknown_cost: f32,
    max_word_length: usize,
    pool_offset: usize,
}

impl DictionaryStore {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let blob = std::fs::read(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                Error::DictionaryNotFound {
                    path: path.display().to_string(),
                }
            } else {
                Error::DictionaryUnreadable {
                    path: path.display().to_string(),
                    source,
                }
            }
        })?;
        Self::from_bytes(blob)
    }

    pub fn from_bytes(blob: Vec<u8>) -> Result<Self, Error> {
        if blob.len() < HEADER_LEN {
            return Err(Error::DictionaryMalformed {
                reason: "file shorter than header".into(),
            });
        }
        if &blob[0..4] != MAGIC {
            return Err(Error::DictionaryMalformed {
                reason: "bad magic".into(),
            });
        }
        let version = read_u32(&blob, 4);
        if version != VERSION {
            return Err(Error::DictionaryMalformed {
                reason: format!("unsupported version {version}"),
            });
        }
        let num_entries = read_u32(&blob, 8);
        let table_size = read_u32(&blob, 12);
        if table_size == 0 || !table_size.is_power_of_two() {
            return Err(Error::DictionaryMalformed {
                reason: "table_size is not a power of two".into(),
            });
        }
        let default_cost = read_f32(&blob, 16);
        let unknown_cost = read_f32(&blob, 20);
        let max_word_length = read_u32(&blob, 24) as usize;

        let entries_bytes = table_size as usize * ENTRY_LEN;
        let pool_offset = HEADER_LEN + entries_bytes;
        if blob.len() < pool_offset {
            return Err(Error::DictionaryMalformed {
                reason: "truncated entry table".into(),
            });
        }
        let _ = num_entries; // informational only; not load-bearing for lookups

        Ok(DictionaryStore {
            blob,
            table_size,
            default_cost,
            unknown_cost,
            max_word_length,
            pool_offset,
        })
    }

    #[inline]
    pub fn default_cost(&self) -> f32 {
        self.default_cost
    }

    #[inline]
    pub fn unknown_cost(&self) -> f32 {
        self.unknown_cost
    }

    #[inline]
    pub fn max_word_length(&self) -> usize {
        self.max_word_length
    }

    /// Look up a full key, computing its hash from scratch. Prefer
    /// [`Self::lookup_hash`] on the decoder's hot path where the hash is
    /// already incrementally maintained.
    #[inline]
    pub fn lookup(&self, word: &[u8]) -> Option<f32> {
        self.lookup_hash(djb2(word), word)
    }

    /// Look up `word` given its precomputed DJB2 hash. Every probe hit
    /// compares the stored bytes length-and-content against `word` —
    /// hash equality alone is never trusted.
    #[inline]
    pub fn lookup_hash(&self, hash: u32, word: &[u8]) -> Option<f32> {
        let mask = self.table_size - 1;
        let mut idx = hash & mask;

        for _ in 0..self.table_size {
            let entry_off = HEADER_LEN + idx as usize * ENTRY_LEN;
            let name_offset = read_u32(&self.blob, entry_off);
            if name_offset == 0 {
                return None;
            }
            let cost = read_f32(&self.blob, entry_off + 4);
            if self.pool_str_at(name_offset as usize) == Some(word) {
                return Some(cost);
            }
            idx = (idx + 1) & mask;
        }
        None
    }

    pub fn contains(&self, word: &[u8]) -> bool {
        self.lookup(word).is_some()
    }

    fn pool_str_at(&self, offset: usize) -> Option<&[u8]> {
        let start = self.pool_offset + offset;
        let rel_nul = self.blob[start..].iter().position(|&b| b == 0)?;
        Some(&self.blob[start..start + rel_nul])
    }
}

fn read_u32(blob: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes(blob[offset..offset + 4].try_into().unwrap())
}

fn read_f32(blob: &[u8], offset: usize) -> f32 {
    f32::from_le_bytes(blob[offset..offset + 4].try_into().unwrap())
}

/// Toggles that affect dictionary construction, mirroring the
/// `enable_*` flags a caller can also apply to the decoder/rule engine.
#[derive(Debug, Clone, Copy)]
pub struct BuilderConfig {
    pub frequency_costs: bool,
    pub variant_generation: bool,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        BuilderConfig {
            frequency_costs: true,
            variant_generation: true,
        }
    }
}

/// Builds a [`DictionaryStore`]-compatible byte blob from a word list and
/// optional frequency counts — an in-library stand-in for an external
/// baking tool.
pub struct DictionaryBuilder {
    words: HashSet<String>,
    default_cost: f32,
    unknown_cost: f32,
    word_costs: HashMap<String, f32>,
    max_word_length: usize,
}

impl DictionaryBuilder {
    /// `entries` pairs each dictionary word with an optional raw
    /// frequency count (used for cost calculation when
    /// `config.frequency_costs` is set).
    pub fn new<I>(entries: I, config: BuilderConfig) -> Self
    where
        I: IntoIterator<Item = (String, Option<f64>)>,
    {
        let mut raw_words: HashSet<String> = HashSet::default();
        let mut freq: HashMap<String, f64> = HashMap::default();

        for (word, count) in entries {
            let word = word.trim().to_string();
            if word.is_empty() {
                continue;
            }
            if word.chars().count() == 1 {
                let c = word.chars().next().unwrap();
                if !is_valid_single_word(c as u32) {
                    continue;
                }
            }
            if let Some(c) = count {
                freq.insert(word.clone(), c);
            }
            raw_words.insert(word);
        }

        let mut words = raw_words.clone();
        if config.variant_generation {
            for word in &raw_words {
                for variant in generate_variants(word) {
                    words.insert(variant);
                }
            }
        }

        filter_words(&mut words);

        let max_word_length = words
            .iter()
            .map(|w| w.as_bytes().len())
            .max()
            .unwrap_or(0);

        let (word_costs, default_cost, unknown_cost) = if config.frequency_costs && !freq.is_empty()
        {
            calculate_costs(&freq, &words, config.variant_generation)
        } else {
            (HashMap::default(), 10.0, 20.0)
        };

        DictionaryBuilder {
            words,
            default_cost,
            unknown_cost,
            word_costs,
            max_word_length,
        }
    }

    pub fn default_cost(&self) -> f32 {
        self.default_cost
    }

    pub fn unknown_cost(&self) -> f32 {
        self.unknown_cost
    }

    /// Serialize to the exact KDIC wire layout. Table size is the
    /// smallest power of two keeping load factor <= 0.5 (see
    /// DESIGN.md for the rationale).
    pub fn build_bytes(&self) -> Vec<u8> {
        let num_entries = self.words.len() as u32;
        let mut table_size: u32 = 16;
        while (table_size as usize) < self.words.len() * 2 {
            table_size *= 2;
        }

        let mut entries = vec![(0u32, 0.0f32); table_size as usize];
        // string pool: reserve offset 0 for an empty sentinel string.
        let mut pool: Vec<u8> = vec![0u8];

        let mask = table_size - 1;
        for word in &self.words {
            let cost = *self
                .word_costs
                .get(word)
                .unwrap_or(&self.default_cost);
            let name_offset = pool.len() as u32;
            pool.extend_from_slice(word.as_bytes());
            pool.push(0);

            let hash = djb2(word.as_bytes());
            let mut idx = hash & mask;
            loop {
                if entries[idx as usize].0 == 0 {
                    entries[idx as usize] = (name_offset, cost);
                    break;
                }
                idx = (idx + 1) & mask;
            }
        }

        let mut out = Vec::with_capacity(HEADER_LEN + entries.len() * ENTRY_LEN + pool.len());
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&VERSION.to_le_bytes());
        out.extend_from_slice(&num_entries.to_le_bytes());
        out.extend_from_slice(&table_size.to_le_bytes());
        out.extend_from_slice(&self.default_cost.to_le_bytes());
        out.extend_from_slice(&self.unknown_cost.to_le_bytes());
        out.extend_from_slice(&(self.max_word_length as u32).to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes()); // padding
        for (name_offset, cost) in &entries {
            out.extend_from_slice(&name_offset.to_le_bytes());
            out.extend_from_slice(&cost.to_le_bytes());
        }
        out.extend_from_slice(&pool);
        out
    }

    pub fn into_store(self) -> DictionaryStore {
        DictionaryStore::from_bytes(self.build_bytes()).expect("builder output is always well-formed")
    }
}

/// Ported from `Dictionary::load_words` filtering pass:
/// drop words containing the repetition sign, words beginning with a
/// stray coeng, and words containing the independent vowel ឬ when they
/// decompose into two already-present words by splitting on it.
fn filter_words(words: &mut HashSet<String>) {
    let mut remove = HashSet::default();
    for word in words.iter() {
        if word.contains('ឬ') && word.chars().count() > 1 {
            if let Some(suffix) = word.strip_prefix('ឬ') {
                if words.contains(suffix) {
                    remove.insert(word.clone());
                }
            } else if let Some(prefix) = word.strip_suffix('ឬ') {
                if words.contains(prefix) {
                    remove.insert(word.clone());
                }
            } else {
                let parts: Vec<&str> = word.split('ឬ').collect();
                if parts.iter().all(|p| p.is_empty() || words.contains(*p)) {
                    remove.insert(word.clone());
                }
            }
        }
        if word.contains('ៗ') {
            remove.insert(word.clone());
        }
        if word.starts_with('\u{17D2}') {
            remove.insert(word.clone());
        }
    }
    if !remove.is_empty() {
        tracing::debug!(dropped = remove.len(), "dictionary word list dropped variant-collapsed entries");
    }
    for w in remove {
        words.remove(&w);
    }
}

/// Ported from `Dictionary::calculate_costs`.
fn calculate_costs(
    freq: &HashMap<String, f64>,
    words: &HashSet<String>,
    variant_generation: bool,
) -> (HashMap<String, f32>, f32, f32) {
    const MIN_FREQ_FLOOR: f64 = 5.0;

    let mut effective: HashMap<String, f64> = HashMap::default();
    let mut total_tokens = 0.0f64;

    for (word, &count) in freq {
        let eff = count.max(MIN_FREQ_FLOOR);
        effective.insert(word.clone(), eff);
        if variant_generation {
            for variant in generate_variants(word) {
                effective.entry(variant).or_insert(eff);
            }
        }
        total_tokens += eff;
    }

    if total_tokens <= 0.0 {
        return (HashMap::default(), 10.0, 20.0);
    }

    let min_prob = MIN_FREQ_FLOOR / total_tokens;
    let default_cost = (-min_prob.log10()) as f32;
    let unknown_cost = default_cost + 5.0;

    let mut word_costs = HashMap::default();
    for (word, count) in effective {
        if words.contains(&word) {
            let prob = count / total_tokens;
            if prob > 0.0 {
                word_costs.insert(word, (-prob.log10()) as f32);
            }
        }
    }

    (word_costs, default_cost, unknown_cost)
}

/// Ported from `Dictionary::generate_variants`: Ta/Da coeng
/// swap (single swap per occurrence — see DESIGN.md) and coeng-Ro
/// reordering against another adjacent coeng subscript.
pub fn generate_variants(word: &str) -> HashSet<String> {
    let mut variants = HashSet::default();
    let coeng_ta = "\u{17D2}\u{178F}";
    let coeng_da = "\u{17D2}\u{178D}";

    if word.contains(coeng_ta) {
        variants.insert(word.replacen(coeng_ta, coeng_da, 1));
    }
    if word.contains(coeng_da) {
        variants.insert(word.replacen(coeng_da, coeng_ta, 1));
    }

    let mut base_set = variants.clone();
    base_set.insert(word.to_string());

    let coeng = '\u{17D2}';
    let ro = '\u{179A}';

    for w in base_set {
        let chars: Vec<char> = w.chars().collect();
        if chars.len() < 4 {
            continue;
        }

        if let Some(swapped) = swap_coeng_ro(&chars, coeng, ro, true) {
            variants.insert(swapped);
        }
        if let Some(swapped) = swap_coeng_ro(&chars, coeng, ro, false) {
            variants.insert(swapped);
        }
    }

    variants
}

/// `ro_first = true`: swap `(Coeng Ro)(Coeng NotRo) -> (Coeng NotRo)(Coeng Ro)`.
/// `ro_first = false`: the mirror image.
fn swap_coeng_ro(chars: &[char], coeng: char, ro: char, ro_first: bool) -> Option<String> {
    let mut out = chars.to_vec();
    let mut modified = false;
    let mut i = 0;
    while i + 3 < out.len() {
        let (c0, c1, c2, c3) = (out[i], out[i + 1], out[i + 2], out[i + 3]);
        let hit = if ro_first {
            c0 == coeng && c1 == ro && c2 == coeng && c3 != ro
        } else {
            c0 == coeng && c1 != ro && c2 == coeng && c3 == ro
        };
        if hit {
            out[i] = c2;
            out[i + 1] = c3;
            out[i + 2] = c0;
            out[i + 3] = c1;
            modified = true;
            i += 4;
        } else {
            i += 1;
        }
    }
    modified.then(|| out.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn djb2_matches_reference_constant() {
        // h = 5381; single byte 'a' (0x61) -> 5381*33 + 97
        assert_eq!(djb2(b"a"), 5381u32.wrapping_mul(33).wrapping_add(97));
    }

    #[test]
    fn round_trips_through_builder_and_store() {
        let builder = DictionaryBuilder::new(
            vec![
                ("សួស្តី".to_string(), Some(100.0)),
                ("កម្ពុជា".to_string(), Some(50.0)),
            ],
            BuilderConfig::default(),
        );
        let store = builder.into_store();
        assert!(store.contains("សួស្តី".as_bytes()));
        assert!(store.contains("កម្ពុជា".as_bytes()));
        assert!(!store.contains("xyz".as_bytes()));
    }

    #[test]
    fn lookup_hash_rejects_hash_collision_with_different_bytes() {
        // Two distinct words landing in the same bucket must not alias.
        let builder = DictionaryBuilder::new(
            vec![("ក".to_string(), None), ("ខ".to_string(), None)],
            BuilderConfig {
                frequency_costs: false,
                variant_generation: false,
            },
        );
        let store = builder.into_store();
        assert!(store.contains("ក".as_bytes()));
        assert!(store.contains("ខ".as_bytes()));
        assert!(!store.contains("គ".as_bytes()));
    }

    #[test]
    fn filters_single_char_non_valid_word() {
        let builder = DictionaryBuilder::new(
            vec![("ឥ".to_string(), None)], // not in the valid-single-word set
            BuilderConfig::default(),
        );
        let store = builder.into_store();
        assert!(!store.contains("ឥ".as_bytes()));
    }

    #[test]
    fn drops_repetition_sign_word() {
        let builder = DictionaryBuilder::new(
            vec![("ញឹកញាប់ៗ".to_string(), None)],
            BuilderConfig::default(),
        );
        let store = builder.into_store();
        assert!(!store.contains("ញឹកញាប់ៗ".as_bytes()));
    }

    #[test]
    fn generates_ta_da_variant() {
        let word = "\u{1780}\u{17D2}\u{178F}\u{1780}"; // contains coeng-Ta
        let variants = generate_variants(word);
        let da_variant = word.replace("\u{17D2}\u{178F}", "\u{17D2}\u{178D}");
        assert!(variants.contains(&da_variant));
    }

    #[test]
    fn rejects_bad_magic() {
        let mut bytes = DictionaryBuilder::new(Vec::<(String, Option<f64>)>::new(), BuilderConfig::default())
            .build_bytes();
        bytes[0] = b'X';
        assert!(matches!(
            DictionaryStore::from_bytes(bytes),
            Err(Error::DictionaryMalformed { .. })
        ));
    }
}
