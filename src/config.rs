//! Segmenter feature toggles, deserializable with `serde` since this is
//! a config *file* format rather than CLI flags, mirroring the
//! reference `segmenter_config_default()`/`segmenter_config_disabled()`
//! pair.

use serde::Deserialize;

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct SegmenterConfig {
    pub frequency_costs: bool,
    pub variant_generation: bool,
    pub repair_mode: bool,
    pub acronym_detection: bool,
    pub unknown_merging: bool,
    pub normalization: bool,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        SegmenterConfig {
            frequency_costs: true,
            variant_generation: true,
            repair_mode: true,
            acronym_detection: true,
            unknown_merging: true,
            normalization: true,
        }
    }
}

impl SegmenterConfig {
    /// Mirrors the reference `segmenter_config_disabled()`: every
    /// optional pass turned off, leaving only the core decode+rules path.
    pub fn disabled() -> Self {
        SegmenterConfig {
            frequency_costs: false,
            variant_generation: false,
            repair_mode: false,
            acronym_detection: false,
            unknown_merging: false,
            normalization: false,
        }
    }
}
