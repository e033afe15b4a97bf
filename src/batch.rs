//! Batch evaluation of photos on disk.
//!
//! Used by the `evaluate` command. Inputs may be files or directories;
//! directories are walked recursively and filtered to the extensions the
//! decoder supports ([`is_supported_photo`]). Explicitly named files are
//! always attempted, whatever their extension, since the decoder sniffs
//! content.
//!
//! ## Parallel Processing
//!
//! Photos are evaluated in parallel using [rayon](https://docs.rs/rayon); the
//! global pool size comes from `processing.max_processes`. Each finished
//! photo is reported through an optional [`BatchEvent`] channel so the CLI
//! can print progress while the pool keeps working. Results come back in
//! input order.
//!
//! One photo failing never stops the batch: its error is recorded in its
//! [`PhotoEvaluation`] and the rest carry on.

use crate::cache::{CacheStats, EvaluationCache, hash_engine_params, hash_file};
use crate::config::EngineConfig;
use crate::evaluate::{EvaluationError, EvaluationResult, evaluate_with_decoder};
use crate::imaging::{ImageSource, RasterDecoder, RustDecoder, is_supported_photo};
use log::{debug, warn};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("No such file or directory: {0}")]
    NotFound(PathBuf),
}

/// Progress event sent as each photo finishes.
#[derive(Debug, Clone)]
pub enum BatchEvent {
    Evaluated {
        index: usize,
        path: PathBuf,
        result: EvaluationResult,
        cached: bool,
    },
    Failed {
        index: usize,
        path: PathBuf,
        error: String,
    },
}

/// Outcome for one photo.
#[derive(Debug)]
pub struct PhotoEvaluation {
    pub path: PathBuf,
    pub outcome: Result<EvaluationResult, EvaluationError>,
    /// Served from the cache without decoding.
    pub cached: bool,
}

#[derive(Debug)]
pub struct BatchResult {
    pub evaluations: Vec<PhotoEvaluation>,
    pub cache_stats: CacheStats,
}

impl BatchResult {
    pub fn failures(&self) -> usize {
        self.evaluations
            .iter()
            .filter(|e| e.outcome.is_err())
            .count()
    }
}

/// Expand files and directories into the list of photos to evaluate.
///
/// Directory contents are sorted by file name; duplicates are dropped, first
/// occurrence wins.
pub fn discover_photos(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, BatchError> {
    let mut photos: Vec<PathBuf> = Vec::new();
    let mut push = |path: PathBuf| {
        if !photos.contains(&path) {
            photos.push(path);
        }
    };

    for input in inputs {
        if input.is_file() {
            push(input.clone());
        } else if input.is_dir() {
            for entry in WalkDir::new(input).sort_by_file_name() {
                let entry = entry?;
                if entry.file_type().is_file() && is_supported_photo(entry.path()) {
                    push(entry.into_path());
                }
            }
        } else {
            return Err(BatchError::NotFound(input.clone()));
        }
    }
    Ok(photos)
}

/// Evaluate `photos` with the built-in decoder.
///
/// `cache_dir` enables the evaluation cache; `None` evaluates everything.
pub fn evaluate_batch(
    photos: &[PathBuf],
    config: &EngineConfig,
    cache_dir: Option<&Path>,
    progress: Option<Sender<BatchEvent>>,
) -> BatchResult {
    evaluate_batch_with_decoder(&RustDecoder::new(), photos, config, cache_dir, progress)
}

/// Evaluate photos using a specific decoder (allows testing with mock).
pub fn evaluate_batch_with_decoder(
    decoder: &impl RasterDecoder,
    photos: &[PathBuf],
    config: &EngineConfig,
    cache_dir: Option<&Path>,
    progress: Option<Sender<BatchEvent>>,
) -> BatchResult {
    let mut cache = match cache_dir {
        Some(dir) => EvaluationCache::load(dir),
        None => EvaluationCache::empty(),
    };
    let params_hash = hash_engine_params(config);

    let completed: Vec<(PhotoEvaluation, Option<String>)> = photos
        .par_iter()
        .enumerate()
        .map(|(index, path)| {
            // Unreadable files skip the cache; the decoder reports the error.
            let source_hash = match cache_dir {
                Some(_) => hash_file(path).ok(),
                None => None,
            };

            let cached = source_hash
                .as_deref()
                .and_then(|hash| cache.find_cached(hash, &params_hash))
                .cloned();

            let evaluation = match cached {
                Some(result) => {
                    debug!("{}: cache hit", path.display());
                    PhotoEvaluation {
                        path: path.clone(),
                        outcome: Ok(result),
                        cached: true,
                    }
                }
                None => PhotoEvaluation {
                    path: path.clone(),
                    outcome: evaluate_with_decoder(
                        decoder,
                        &ImageSource::Path(path.clone()),
                        config,
                    ),
                    cached: false,
                },
            };

            if let Some(tx) = &progress {
                let event = match &evaluation.outcome {
                    Ok(result) => BatchEvent::Evaluated {
                        index,
                        path: path.clone(),
                        result: result.clone(),
                        cached: evaluation.cached,
                    },
                    Err(e) => BatchEvent::Failed {
                        index,
                        path: path.clone(),
                        error: e.to_string(),
                    },
                };
                tx.send(event).ok();
            }

            (evaluation, source_hash)
        })
        .collect();

    let mut cache_stats = CacheStats::default();
    let mut evaluations = Vec::with_capacity(completed.len());
    for (evaluation, source_hash) in completed {
        match &evaluation.outcome {
            Ok(_) if evaluation.cached => cache_stats.hit(),
            Ok(result) => {
                cache_stats.miss();
                if let Some(hash) = source_hash {
                    cache.insert(
                        evaluation.path.display().to_string(),
                        hash,
                        params_hash.clone(),
                        result.clone(),
                    );
                }
            }
            Err(e) => warn!("{}: {}", evaluation.path.display(), e),
        }
        evaluations.push(evaluation);
    }

    if let Some(dir) = cache_dir
        && let Err(e) = cache.save(dir)
    {
        warn!("could not save cache to {}: {}", dir.display(), e);
    }

    BatchResult {
        evaluations,
        cache_stats,
    }
}
