//! Evaluation cache for repeated batch runs.
//!
//! Decoding and scanning a full-size photo dominates the cost of an
//! evaluation. This module lets the batch command skip both when neither the
//! photo nor the engine parameters changed since the last run.
//!
//! ## Cache keys
//!
//! The cache is **content-addressed**: lookups are by the combination of
//! `source_hash` and `params_hash`, not by photo path, so moving or renaming
//! a photo keeps its cached result.
//!
//! - **`source_hash`**: SHA-256 of the photo file contents.
//! - **`params_hash`**: SHA-256 of everything that can change a result: the
//!   engine version, the working bounds, every kernel constant and the
//!   feedback locale. Thread count is deliberately absent.
//!
//! ## Storage
//!
//! The manifest is a JSON file at `<cache_dir>/evaluations.json` holding the
//! full [`EvaluationResult`] of every entry. A missing, corrupt, or
//! older-version manifest loads as empty.
//!
//! ## Bypassing the cache
//!
//! Pass `--no-cache` to `evaluate` to skip both lookup and save.

use crate::config::EngineConfig;
use crate::evaluate::EvaluationResult;
use crate::suggest::Locale;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Name of the cache manifest file within the cache directory.
const MANIFEST_FILENAME: &str = "evaluations.json";

/// Version of the cache manifest format. Bump this to invalidate all
/// existing caches when the format or key computation changes.
const MANIFEST_VERSION: u32 = 1;

/// A cached evaluation of one photo.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheEntry {
    pub source_hash: String,
    pub params_hash: String,
    pub result: EvaluationResult,
}

/// On-disk manifest mapping photo paths to their cached evaluations.
///
/// Lookups go through a runtime `content_index` that maps
/// `"{source_hash}:{params_hash}"` to the stored photo path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationCache {
    pub version: u32,
    pub entries: HashMap<String, CacheEntry>,
    /// Runtime reverse index, built at load time and maintained on insert.
    #[serde(skip)]
    content_index: HashMap<String, String>,
}

fn content_key(source_hash: &str, params_hash: &str) -> String {
    format!("{}:{}", source_hash, params_hash)
}

impl EvaluationCache {
    /// Create an empty cache (used for `--no-cache` or a first run).
    pub fn empty() -> Self {
        Self {
            version: MANIFEST_VERSION,
            entries: HashMap::new(),
            content_index: HashMap::new(),
        }
    }

    /// Load from the cache directory. Returns an empty cache if the file
    /// doesn't exist or can't be parsed (version mismatch, corruption).
    pub fn load(cache_dir: &Path) -> Self {
        let path = manifest_path(cache_dir);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(_) => return Self::empty(),
        };
        let mut cache: Self = match serde_json::from_str(&content) {
            Ok(m) => m,
            Err(e) => {
                log::warn!("ignoring unreadable cache {}: {}", path.display(), e);
                return Self::empty();
            }
        };
        if cache.version != MANIFEST_VERSION {
            log::info!(
                "cache version {} != {}, starting fresh",
                cache.version,
                MANIFEST_VERSION
            );
            return Self::empty();
        }
        cache.content_index = cache
            .entries
            .iter()
            .map(|(path, entry)| {
                (
                    content_key(&entry.source_hash, &entry.params_hash),
                    path.clone(),
                )
            })
            .collect();
        cache
    }

    /// Save to the cache directory, creating it if needed.
    pub fn save(&self, cache_dir: &Path) -> io::Result<()> {
        std::fs::create_dir_all(cache_dir)?;
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(manifest_path(cache_dir), json)
    }

    /// Look up a cached result by content hashes.
    pub fn find_cached(&self, source_hash: &str, params_hash: &str) -> Option<&EvaluationResult> {
        let stored_path = self
            .content_index
            .get(&content_key(source_hash, params_hash))?;
        self.entries
            .get(stored_path)
            .filter(|entry| entry.source_hash == source_hash && entry.params_hash == params_hash)
            .map(|entry| &entry.result)
    }

    /// Record the result for a photo.
    ///
    /// If the same content was previously cached under a different path,
    /// the old entry is dropped so a moved photo is stored once.
    pub fn insert(
        &mut self,
        photo_path: String,
        source_hash: String,
        params_hash: String,
        result: EvaluationResult,
    ) {
        let key = content_key(&source_hash, &params_hash);

        if let Some(old_path) = self.content_index.get(&key)
            && *old_path != photo_path
        {
            self.entries.remove(old_path.as_str());
        }

        self.content_index.insert(key, photo_path.clone());
        self.entries.insert(
            photo_path,
            CacheEntry {
                source_hash,
                params_hash,
                result,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// SHA-256 hash of a file's contents, returned as a hex string.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    let digest = Sha256::digest(&bytes);
    Ok(format!("{:x}", digest))
}

/// SHA-256 hash of every engine parameter that affects a result.
pub fn hash_engine_params(config: &EngineConfig) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"framescore\0");
    hasher.update(env!("CARGO_PKG_VERSION").as_bytes());
    hasher.update(b"\0");

    hasher.update(config.working.max_width.to_le_bytes());
    hasher.update(config.working.max_height.to_le_bytes());

    let k = &config.kernels;
    hasher.update(k.dark_cutoff.to_le_bytes());
    hasher.update(k.bright_cutoff.to_le_bytes());
    hasher.update(k.thirds_window.to_le_bytes());
    for value in [
        k.contrast_divisor,
        k.edge_divisor,
        k.detail_threshold,
        k.detail_scale,
        k.center_radius_divisor,
        k.subject_threshold,
        k.subject_scale,
        k.center_density_scale,
    ] {
        hasher.update(value.to_le_bytes());
    }

    hasher.update(match config.feedback.locale {
        Locale::En => b"en".as_slice(),
        Locale::ZhCn => b"zh-CN".as_slice(),
    });
    format!("{:x}", hasher.finalize())
}

/// Summary of cache performance for a batch run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u32,
    pub misses: u32,
}

impl CacheStats {
    pub fn hit(&mut self) {
        self.hits += 1;
    }

    pub fn miss(&mut self) {
        self.misses += 1;
    }

    pub fn total(&self) -> u32 {
        self.hits + self.misses
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hits > 0 {
            write!(
                f,
                "{} cached, {} evaluated ({} total)",
                self.hits,
                self.misses,
                self.total()
            )
        } else {
            write!(f, "{} evaluated", self.misses)
        }
    }
}

/// Resolve the cache manifest path for a cache directory.
pub fn manifest_path(cache_dir: &Path) -> PathBuf {
    cache_dir.join(MANIFEST_FILENAME)
}
