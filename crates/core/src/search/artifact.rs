//! On-disk files written by a search: the normalized transcript and the
//! segment set, both keyed by the source id.

use crate::segments::{DurationPolicy, SegmentSet};
use anyhow::{bail, Context, Result};
use sha2::{Digest, Sha256};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Path of the normalized transcript for `source_id`.
pub fn transcript_path(dir: &Path, source_id: &str) -> PathBuf {
    dir.join(format!("transcript_{source_id}.txt"))
}

/// Path of the segment set for a search of `source_id`.
/// The readable slug only covers the start of the query, so the name also
/// carries a digest of the full query and the policy it ran under.
pub fn segments_path(dir: &Path, source_id: &str, query: &str, policy: &DurationPolicy) -> PathBuf {
    dir.join(format!(
        "transcript_{}_{}_{}_segments.json",
        source_id,
        query_slug(query),
        search_key(query, policy)
    ))
}

/// File-name-safe form of the first 20 characters of `query`.
pub fn query_slug(query: &str) -> String {
    query
        .chars()
        .take(20)
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .map(|c| if c == ' ' { '_' } else { c })
        .collect()
}

/// First 8 hex digits of the SHA-256 of the query and policy.
fn search_key(query: &str, policy: &DurationPolicy) -> String {
    let mut hasher = Sha256::new();
    hasher.update(query.as_bytes());
    hasher.update([0u8]);
    hasher.update(format!("{policy:?}").as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..8].to_string()
}

/// Load the segment set stored for `query`, or `None` when there is none yet.
/// A file holding another query's results is an error rather than a hit.
pub fn load(path: &Path, query: &str) -> Result<Option<SegmentSet>> {
    trace!("load path={}", path.display());
    if !path.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(path)?;
    let set: SegmentSet = serde_json::from_str(&text)
        .with_context(|| format!("corrupt segment set {}", path.display()))?;
    if set.query != query {
        bail!(
            "{} holds results for {:?}, not {:?}",
            path.display(),
            set.query,
            query
        );
    }
    Ok(Some(set))
}

/// Store a segment set. Existing sets are never overwritten.
pub fn save(set: &SegmentSet, path: &Path) -> Result<()> {
    trace!("save path={}", path.display());
    let text = serde_json::to_string_pretty(set)?;
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .with_context(|| format!("cannot create {}", path.display()))?;
    file.write_all(text.as_bytes())?;
    debug!("saved {} segments to {}", set.total_segments, path.display());
    Ok(())
}
