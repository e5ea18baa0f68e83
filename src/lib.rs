//! Khmer word segmentation: a Unicode-aware normalizer feeding a
//! least-cost (Viterbi) decoder over byte positions, driven by a baked
//! dictionary and a small fixed rule engine.
//!
//! Split into a library (this crate) and a thin `kmseg` CLI driver, the
//! conventional Rust shape for a reusable engine with a batch-mode
//! front end.

pub mod arena;
pub mod cluster;
pub mod config;
pub mod constants;
pub mod decoder;
pub mod dictionary;
pub mod error;
pub mod normalizer;
pub mod regex_tiny;
pub mod rules;
pub mod unknown;
pub mod utf8;

use std::path::Path;

pub use config::SegmenterConfig;
pub use dictionary::{BuilderConfig, DictionaryBuilder, DictionaryStore};
pub use error::Error;

/// An immutable, loaded segmenter. Cheap to clone-by-reference and safe
/// to share across threads: all per-call state lives in a
/// [`arena::CallArena`] scoped to a single `segment` call.
pub struct Segmenter {
    dictionary: DictionaryStore,
    config: SegmenterConfig,
}

impl Segmenter {
    pub fn new(dictionary: DictionaryStore) -> Self {
        Segmenter {
            dictionary,
            config: SegmenterConfig::default(),
        }
    }

    pub fn with_config(dictionary: DictionaryStore, config: SegmenterConfig) -> Self {
        Segmenter { dictionary, config }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        Ok(Self::new(DictionaryStore::load(path)?))
    }

    pub fn load_with_config(path: impl AsRef<Path>, config: SegmenterConfig) -> Result<Self, Error> {
        Ok(Self::with_config(DictionaryStore::load(path)?, config))
    }

    /// Segment raw bytes, tolerating malformed UTF-8: a
    /// malformed lead byte decodes to a one-byte "replacement" token
    /// rather than causing the call to fail.
    pub fn segment(&self, text: &[u8]) -> Vec<Vec<u8>> {
        if text.is_empty() {
            return Vec::new();
        }

        let arena = arena::CallArena::new();
        let bump = arena.bump();

        let normalized = if self.config.normalization {
            normalizer::normalize(text)
        } else {
            text.to_vec()
        };

        let spans = decoder::decode(&normalized, &self.dictionary, &self.config, bump);
        if spans.is_empty() {
            tracing::warn!(
                len = normalized.len(),
                "decoder failed to cover input, returning normalized text unchanged"
            );
            return vec![normalized];
        }

        let segments: Vec<Vec<u8>> = spans
            .into_iter()
            .map(|(s, e)| normalized[s..e].to_vec())
            .collect();

        let ruled = rules::apply(segments, bump);

        if self.config.unknown_merging {
            let borrowed: Vec<&[u8]> = ruled.iter().map(|v| v.as_slice()).collect();
            unknown::merge_unknowns(borrowed, &self.dictionary, bump)
        } else {
            ruled
        }
    }

    /// Convenience wrapper over [`Self::segment`] for callers already
    /// holding valid UTF-8; never fails, since `&str` input is always
    /// valid UTF-8 going in.
    pub fn segment_str(&self, text: &str) -> Vec<String> {
        self.segment(text.as_bytes())
            .into_iter()
            .map(|bytes| {
                String::from_utf8(bytes)
                    .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segmenter(words: &[&str]) -> Segmenter {
        let store = DictionaryBuilder::new(
            words.iter().map(|w| (w.to_string(), None)),
            BuilderConfig {
                frequency_costs: false,
                variant_generation: false,
            },
        )
        .into_store();
        Segmenter::new(store)
    }

    #[test]
    fn empty_input_yields_no_segments() {
        let s = segmenter(&[]);
        assert!(s.segment_str("").is_empty());
    }

    #[test]
    fn dictionary_words_segment_cleanly() {
        let s = segmenter(&["សួស្តី", "កម្ពុជា"]);
        assert_eq!(
            s.segment_str("សួស្តីកម្ពុជា"),
            vec!["សួស្តី".to_string(), "កម្ពុជា".to_string()]
        );
    }

    #[test]
    fn zero_width_space_is_normalized_away() {
        let s = segmenter(&["ក"]);
        let out = s.segment_str("\u{200b}ក");
        assert_eq!(out, vec!["ក".to_string()]);
    }

    #[test]
    fn ascii_sentence_splits_on_separators() {
        let s = segmenter(&[]);
        let out = s.segment_str("hello world");
        assert!(out.contains(&"hello".to_string()));
        assert!(out.contains(&"world".to_string()));
    }

    #[test]
    fn malformed_utf8_does_not_panic() {
        let s = segmenter(&[]);
        let bytes: &[u8] = &[0xFF, b'a', b'b'];
        let segments = s.segment(bytes);
        let joined: Vec<u8> = segments.concat();
        assert_eq!(joined, bytes);
    }
}
