//! Processing cache module
//!
//! A sidecar JSON file next to each output records a digest of the source
//! file and the options it was processed with, so unchanged inputs can be
//! skipped on re-runs. The digest covers source size, source mtime, and a
//! SHA-256 of the serialized options.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::pipeline::ProcessReport;

/// Bumped whenever the sidecar layout changes; mismatched caches are ignored.
pub const CACHE_VERSION: u32 = 1;

/// Appended to the output path to form the sidecar path.
const CACHE_SUFFIX: &str = ".bleedmakr.json";

/// Identity of a processed source: changes to the file or the options
/// invalidate the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheDigest {
    pub source_size: u64,
    pub source_modified: String,
    pub options_hash: String,
}

impl CacheDigest {
    /// Digest a source file plus the options JSON it will be processed with
    pub fn new(source: &Path, options_json: &str) -> io::Result<Self> {
        let metadata = fs::metadata(source)?;
        let modified: DateTime<Utc> = metadata.modified()?.into();

        let mut hasher = Sha256::new();
        hasher.update(options_json.as_bytes());

        Ok(Self {
            source_size: metadata.len(),
            source_modified: modified.to_rfc3339(),
            options_hash: format!("{:x}", hasher.finalize()),
        })
    }
}

/// Snapshot of a processing result, kept in the sidecar for reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheResult {
    pub original_size: (u32, u32),
    pub canvas_size: (u32, u32),
    pub area_reduction: f64,
    pub elapsed_seconds: f64,
    pub output_size: u64,
}

impl CacheResult {
    /// Snapshot the fields worth keeping from a process report
    pub fn from_report(report: &ProcessReport) -> Self {
        Self {
            original_size: report.original_size,
            canvas_size: report.canvas_size,
            area_reduction: report.detection.area_reduction,
            elapsed_seconds: report.elapsed_seconds,
            output_size: report.output_size,
        }
    }
}

/// The sidecar document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingCache {
    pub version: u32,
    /// Unix timestamp of the processing run
    pub processed_at: i64,
    pub digest: CacheDigest,
    pub result: CacheResult,
}

impl ProcessingCache {
    /// Create a cache entry for a just-finished run
    pub fn new(digest: CacheDigest, result: CacheResult) -> Self {
        Self {
            version: CACHE_VERSION,
            processed_at: Utc::now().timestamp(),
            digest,
            result,
        }
    }

    /// Sidecar path for an output file
    pub fn cache_path(output: &Path) -> PathBuf {
        let mut name = output.as_os_str().to_os_string();
        name.push(CACHE_SUFFIX);
        PathBuf::from(name)
    }

    /// Write the sidecar next to the output file
    pub fn save(&self, output: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(io::Error::other)?;
        fs::write(Self::cache_path(output), json)
    }

    /// Load the sidecar for an output file
    pub fn load(output: &Path) -> io::Result<Self> {
        let json = fs::read_to_string(Self::cache_path(output))?;
        serde_json::from_str(&json).map_err(io::Error::other)
    }
}

/// Decide whether processing can be skipped: the output and its sidecar must
/// exist, the cache version must match, and the source digest must be
/// unchanged. Returns the cache entry when skipping is safe.
pub fn should_skip_processing(
    input: &Path,
    output: &Path,
    options_json: &str,
) -> Option<ProcessingCache> {
    if !output.exists() {
        return None;
    }
    let cache = ProcessingCache::load(output).ok()?;
    if cache.version != CACHE_VERSION {
        return None;
    }
    let digest = CacheDigest::new(input, options_json).ok()?;
    (cache.digest == digest).then_some(cache)
}
