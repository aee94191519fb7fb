//! Turning oracle proposals into a ranked, validated segment list.

use crate::timestamp::{self, Timestamp};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, trace};

mod policy;
mod response;

pub use policy::{DurationPolicy, ScoreScale};
pub use response::{decode_response, Proposal};

/// A validated time range with the oracle's description of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Timestamp,
    pub end: Timestamp,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance_score: Option<f64>,
}

impl Segment {
    pub fn duration_ms(&self) -> u64 {
        self.end.as_millis().saturating_sub(self.start.as_millis())
    }
}

/// The stored answer for one `(source, query)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentSet {
    pub query: String,
    pub source: String,
    pub segments: Vec<Segment>,
    pub total_segments: usize,
}

impl SegmentSet {
    pub fn new(query: impl Into<String>, source: impl Into<String>, segments: Vec<Segment>) -> Self {
        let total_segments = segments.len();
        Self {
            query: query.into(),
            source: source.into(),
            segments,
            total_segments,
        }
    }
}

/// Validate proposals against `policy` and rank the survivors.
/// Bad proposals are dropped one by one; overlapping ranges are kept.
pub fn map_proposals(proposals: Vec<Proposal>, policy: &DurationPolicy) -> Vec<Segment> {
    trace!("map_proposals: {} proposals", proposals.len());
    let mut segments: Vec<Segment> = proposals
        .into_iter()
        .filter_map(|p| validate(p, policy))
        .collect();
    // `sort_by` is stable, so equal scores keep the oracle's order.
    segments.sort_by(|a, b| by_score_desc(a.relevance_score, b.relevance_score));
    segments
}

fn validate(proposal: Proposal, policy: &DurationPolicy) -> Option<Segment> {
    let (start, end) = match (
        timestamp::parse(proposal.start.trim()),
        timestamp::parse(proposal.end.trim()),
    ) {
        (Ok(start), Ok(end)) => (start, end),
        (Err(e), _) | (_, Err(e)) => {
            debug!("dropping {:?}: {}", proposal.title, e);
            return None;
        }
    };
    if end <= start {
        debug!(
            "dropping {:?}: ends at {} before it starts at {}",
            proposal.title, proposal.end, proposal.start
        );
        return None;
    }
    if !policy.accepts(end - start) {
        debug!(
            "dropping {:?}: {} ms outside {}..={} ms",
            proposal.title,
            end - start,
            policy.minimum_ms(),
            policy.maximum_ms()
        );
        return None;
    }
    Some(Segment {
        start: Timestamp(start),
        end: Timestamp(end),
        title: bound_title(&proposal.title, policy.max_title_words),
        summary: proposal
            .summary
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        relevance_score: match (proposal.relevance_score, policy.score_scale) {
            (Some(score), Some(scale)) => Some(scale.clamp(score)),
            (score, _) => score,
        },
    })
}

fn bound_title(title: &str, max_words: Option<usize>) -> String {
    match max_words {
        Some(max) => title.split_whitespace().take(max).collect::<Vec<_>>().join(" "),
        None => title.trim().to_string(),
    }
}

/// Descending by score; unscored entries sink below scored ones.
fn by_score_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
