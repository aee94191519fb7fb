//! Decoding of the oracle's free-text answer into proposals.
//! Models wrap JSON in code fences or drop the outer brackets, so the text is
//! coerced into an array first and each entry is then decoded on its own.

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{trace, warn};

/// One time range proposed by the oracle, not yet validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    pub start: String,
    pub end: String,
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "score")]
    pub relevance_score: Option<f64>,
}

/// Decode the oracle's answer into proposals.
/// Fails with `MalformedOracleResponse` only when the body as a whole is not
/// a JSON array after cleanup; malformed entries are dropped.
pub fn decode_response(raw: &str) -> Result<Vec<Proposal>> {
    trace!("decode_response: {} bytes", raw.len());
    let cleaned = coerce_array(raw);
    let entries: Vec<Value> = serde_json::from_str(&cleaned)
        .map_err(|e| Error::MalformedOracleResponse(e.to_string()))?;
    let total = entries.len();
    let proposals: Vec<Proposal> = entries
        .into_iter()
        .enumerate()
        .filter_map(|(i, entry)| match serde_json::from_value(entry) {
            Ok(p) => Some(p),
            Err(e) => {
                warn!("dropping malformed proposal #{}: {}", i + 1, e);
                None
            }
        })
        .collect();
    trace!("decode_response: kept {} of {} entries", proposals.len(), total);
    Ok(proposals)
}

/// Strip code-fence markers and make sure the text is bracket delimited.
fn coerce_array(raw: &str) -> String {
    let mut content = raw.replace("```json", "").replace("```", "").trim().to_string();
    if !content.starts_with('[') {
        content.insert(0, '[');
    }
    if !content.ends_with(']') {
        content.push(']');
    }
    content
}

// Scores arrive as integers, floats and now and then as numeric strings.
fn score<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<f64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    let score: Option<f64> = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };
    Ok(score.filter(|s| s.is_finite()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_fenced_array() {
        let raw = "```json\n[{\"start\":\"00:00:00,160\",\"end\":\"00:00:35,200\",\"title\":\"Intro\",\"relevance_score\":9}]\n```";
        let proposals = decode_response(raw).unwrap();
        assert_eq!(proposals.len(), 1);
        assert_eq!(proposals[0].title, "Intro");
        assert_eq!(proposals[0].relevance_score, Some(9.0));
        assert_eq!(proposals[0].summary, None);
    }

    #[test]
    fn wraps_bare_objects() {
        let raw = "{\"start\":\"00:00:00,000\",\"end\":\"00:00:20,000\",\"title\":\"a\"},\n{\"start\":\"00:01:00,000\",\"end\":\"00:01:20,000\",\"title\":\"b\",\"summary\":\"s\"}";
        let proposals = decode_response(raw).unwrap();
        assert_eq!(proposals.len(), 2);
        assert_eq!(proposals[1].summary.as_deref(), Some("s"));
    }

    #[test]
    fn drops_malformed_entries() {
        let raw = r#"[{"start":"00:00:00,000","end":"00:00:20,000","title":"ok","relevance_score":"4"},
                      {"end":"00:00:20,000","title":"no start"},
                      42]"#;
        let proposals = decode_response(raw).unwrap();
        assert_eq!(proposals.len(), 1);
        assert_eq!(proposals[0].relevance_score, Some(4.0));
    }

    #[test]
    fn rejects_prose() {
        let err = decode_response("Sorry, I could not find anything.").unwrap_err();
        assert!(matches!(err, Error::MalformedOracleResponse(_)));
    }

    #[test]
    fn empty_array_is_fine() {
        assert!(decode_response("[]").unwrap().is_empty());
    }

    /// Ensure textual NaN and infinities never reach ranking.
    #[test]
    fn non_finite_scores_are_unscored() {
        let raw = r#"[
            {"start":"00:00:00,000","end":"00:00:20,000","title":"a","relevance_score":"NaN"},
            {"start":"00:00:00,000","end":"00:00:20,000","title":"b","relevance_score":"inf"},
            {"start":"00:00:00,000","end":"00:00:20,000","title":"c","relevance_score":"-inf"},
            {"start":"00:00:00,000","end":"00:00:20,000","title":"d","relevance_score":" 7.5 "}
        ]"#;
        let scores: Vec<Option<f64>> = decode_response(raw)
            .unwrap()
            .iter()
            .map(|p| p.relevance_score)
            .collect();
        assert_eq!(scores, vec![None, None, None, Some(7.5)]);
    }
}
