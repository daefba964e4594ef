//! Configuration system for the cache simulator.
//!
//! This module defines the structures used to parameterize a simulation run. It provides:
//! 1. **Defaults:** Baseline values for optional run settings.
//! 2. **Structures:** A raw, partially-filled [`CacheConfig`] (from flags or JSON) and the
//!    validated, immutable [`Geometry`] the cache model is built from.
//! 3. **Enums:** The [`ReplacementPolicy`] selection.
//!
//! Raw configuration is never handed to the cache directly. [`CacheConfig::validate`]
//! checks every constraint once, so the model can assume power-of-two set counts and
//! line sizes everywhere else.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::common::constants::ADDRESS_BITS;
use crate::common::{ConfigError, DecodedAddr};

/// Default values for optional run settings.
mod defaults {
    /// Per-record hit/miss output is off unless requested.
    pub const VERBOSE: bool = false;

    /// The summary is printed as plain text unless JSON is requested.
    pub const JSON_SUMMARY: bool = false;
}

/// Cache eviction policy.
///
/// Both policies evict the line with the smallest recency stamp. They differ only in
/// when that stamp is refreshed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReplacementPolicy {
    /// First In First Out.
    ///
    /// Lines are stamped only when filled, so arrival order decides eviction.
    #[serde(alias = "Fifo", alias = "fifo")]
    Fifo,
    /// Least Recently Used.
    ///
    /// Lines are stamped when filled and again on every hit.
    #[serde(alias = "Lru", alias = "lru")]
    Lru,
}

impl ReplacementPolicy {
    /// Returns `true` if a hit refreshes the line's recency stamp.
    #[inline]
    pub const fn stamps_on_hit(self) -> bool {
        matches!(self, Self::Lru)
    }

    /// Canonical command-line name of the policy.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Fifo => "FIFO",
            Self::Lru => "LRU",
        }
    }
}

impl FromStr for ReplacementPolicy {
    type Err = ConfigError;

    /// Parses the exact command-line spellings `FIFO` and `LRU`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FIFO" => Ok(Self::Fifo),
            "LRU" => Ok(Self::Lru),
            other => Err(ConfigError::UnknownPolicy(other.to_owned())),
        }
    }
}

impl fmt::Display for ReplacementPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Root configuration structure.
///
/// # Examples
///
/// ```
/// use csim_core::config::{Config, ReplacementPolicy};
///
/// let json = r#"{
///     "cache": { "sets": 16, "ways": 2, "line_bytes": 32, "policy": "LRU" },
///     "general": { "verbose": true }
/// }"#;
///
/// let config = Config::from_json(json).unwrap();
/// let geometry = config.cache.validate().unwrap();
/// assert_eq!(geometry.sets(), 16);
/// assert_eq!(geometry.policy(), ReplacementPolicy::Lru);
/// assert!(config.general.verbose);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Cache geometry and policy.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Output and logging settings.
    #[serde(default)]
    pub general: GeneralConfig,
}

impl Config {
    /// Parses a configuration document from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] if the document is not valid JSON or contains
    /// values of the wrong type (an unknown policy name included).
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads and parses a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read and
    /// [`ConfigError::Json`] if it cannot be parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }
}

/// General run settings.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    /// Print the outcome of every replayed record.
    #[serde(default = "GeneralConfig::default_verbose")]
    pub verbose: bool,

    /// Print the final summary as a JSON object instead of the text line.
    #[serde(default = "GeneralConfig::default_json")]
    pub json: bool,
}

impl GeneralConfig {
    const fn default_verbose() -> bool {
        defaults::VERBOSE
    }

    const fn default_json() -> bool {
        defaults::JSON_SUMMARY
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verbose: defaults::VERBOSE,
            json: defaults::JSON_SUMMARY,
        }
    }
}

/// Unvalidated cache parameters.
///
/// Every field is optional so that a JSON file and command-line flags can each supply
/// part of the geometry. [`CacheConfig::validate`] rejects anything still missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct CacheConfig {
    /// Number of sets (`S`). Must be a power of two.
    #[serde(default)]
    pub sets: Option<usize>,
    /// Lines per set (`K`). Must be positive.
    #[serde(default)]
    pub ways: Option<usize>,
    /// Bytes per line (`B`). Must be a power of two.
    #[serde(default)]
    pub line_bytes: Option<usize>,
    /// Eviction policy (`p`).
    #[serde(default)]
    pub policy: Option<ReplacementPolicy>,
}

impl CacheConfig {
    /// Returns a copy of `self` where every field set in `overrides` replaces ours.
    #[must_use]
    pub fn merged_with(self, overrides: Self) -> Self {
        Self {
            sets: overrides.sets.or(self.sets),
            ways: overrides.ways.or(self.ways),
            line_bytes: overrides.line_bytes.or(self.line_bytes),
            policy: overrides.policy.or(self.policy),
        }
    }

    /// Checks every field and produces the immutable geometry for a run.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] for an absent field, and the error from
    /// [`Geometry::new`] for an invalid one.
    pub fn validate(&self) -> Result<Geometry, ConfigError> {
        Geometry::new(
            self.sets.ok_or(ConfigError::Missing("S"))?,
            self.ways.ok_or(ConfigError::Missing("K"))?,
            self.line_bytes.ok_or(ConfigError::Missing("B"))?,
            self.policy.ok_or(ConfigError::Missing("p"))?,
        )
    }
}

/// Validated, immutable cache geometry.
///
/// Holding a `Geometry` proves that `sets` and `line_bytes` are powers of two and
/// `ways` is positive, so address decoding never has to re-check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    sets: usize,
    ways: usize,
    line_bytes: usize,
    policy: ReplacementPolicy,
    index_bits: u32,
    offset_bits: u32,
}

impl Geometry {
    /// Validates raw parameters.
    ///
    /// # Errors
    ///
    /// * [`ConfigError::NotPowerOfTwo`] if `sets` or `line_bytes` is zero or not a power of two.
    /// * [`ConfigError::ZeroWays`] if `ways` is zero.
    /// * [`ConfigError::TooLarge`] if `sets * ways` overflows.
    pub fn new(
        sets: usize,
        ways: usize,
        line_bytes: usize,
        policy: ReplacementPolicy,
    ) -> Result<Self, ConfigError> {
        if !sets.is_power_of_two() {
            return Err(ConfigError::NotPowerOfTwo {
                field: "S",
                value: sets,
            });
        }
        if ways == 0 {
            return Err(ConfigError::ZeroWays);
        }
        if !line_bytes.is_power_of_two() {
            return Err(ConfigError::NotPowerOfTwo {
                field: "B",
                value: line_bytes,
            });
        }
        if sets.checked_mul(ways).is_none() {
            return Err(ConfigError::TooLarge { sets, ways });
        }

        Ok(Self {
            sets,
            ways,
            line_bytes,
            policy,
            index_bits: sets.trailing_zeros(),
            offset_bits: line_bytes.trailing_zeros(),
        })
    }

    /// Number of sets (`S`).
    #[inline]
    pub const fn sets(&self) -> usize {
        self.sets
    }

    /// Lines per set (`K`).
    #[inline]
    pub const fn ways(&self) -> usize {
        self.ways
    }

    /// Bytes per line (`B`).
    #[inline]
    pub const fn line_bytes(&self) -> usize {
        self.line_bytes
    }

    /// Eviction policy.
    #[inline]
    pub const fn policy(&self) -> ReplacementPolicy {
        self.policy
    }

    /// Total number of lines in the cache.
    #[inline]
    pub const fn total_lines(&self) -> usize {
        self.sets * self.ways
    }

    /// `log2(S)`.
    #[inline]
    pub const fn index_bits(&self) -> u32 {
        self.index_bits
    }

    /// `log2(B)`.
    #[inline]
    pub const fn offset_bits(&self) -> u32 {
        self.offset_bits
    }

    /// Number of address bits left for the tag.
    #[inline]
    pub const fn tag_bits(&self) -> u32 {
        ADDRESS_BITS.saturating_sub(self.index_bits + self.offset_bits)
    }

    /// Mask selecting the set-index field after the offset has been shifted out.
    #[inline]
    pub const fn set_mask(&self) -> u64 {
        self.sets as u64 - 1
    }

    /// Mask of `log2(B)` low bits.
    #[inline]
    pub const fn offset_mask(&self) -> u64 {
        self.line_bytes as u64 - 1
    }

    /// Splits an address into its set index and tag.
    ///
    /// ```
    /// use csim_core::config::{Geometry, ReplacementPolicy};
    ///
    /// // 4 sets of 16-byte lines: offset = bits 0..4, index = bits 4..6.
    /// let geometry = Geometry::new(4, 1, 16, ReplacementPolicy::Lru).unwrap();
    /// let decoded = geometry.decode(0x1234);
    /// assert_eq!(decoded.set_index, 3);
    /// assert_eq!(decoded.tag, 0x48);
    /// ```
    #[inline]
    pub const fn decode(&self, addr: u64) -> DecodedAddr {
        let set_index = ((addr >> self.offset_bits) & self.set_mask()) as usize;
        let tag = match addr.checked_shr(self.offset_bits + self.index_bits) {
            Some(tag) => tag,
            None => 0,
        };
        DecodedAddr::new(set_index, tag)
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "S={} K={} B={} p={}",
            self.sets, self.ways, self.line_bytes, self.policy
        )
    }
}
