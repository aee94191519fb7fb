//! Instructions sent to the oracle along with the transcript.

use crate::segments::DurationPolicy;

/// System message shared by every search.
pub const SYSTEM: &str = "You are a helpful assistant that analyzes video transcripts to find \
segments matching a request. You must respond with only a valid JSON array.";

/// Render the task description for `query` under `policy`.
/// The transcript is sent separately in the plain caption form.
pub fn instructions(query: &str, policy: &DurationPolicy) -> String {
    let (pref_lo, pref_hi) = policy.preferred_range;
    let mut fields = vec![
        "  - \"start\": the start timestamp of the segment (string, format HH:MM:SS,mmm)".to_string(),
        "  - \"end\": the end timestamp of the segment (string, format HH:MM:SS,mmm)".to_string(),
        format!(
            "  - \"title\": a brief description of what is discussed in this segment (string{})",
            policy
                .max_title_words
                .map(|n| format!(", maximum {n} words"))
                .unwrap_or_default()
        ),
        "  - \"summary\": a summary of the segment (string, one to three sentences)".to_string(),
    ];
    if let Some(scale) = policy.score_scale {
        fields.push(format!(
            "  - \"relevance_score\": how relevant this segment is to the request, from {} to {} (integer)",
            scale.min, scale.max
        ));
    }
    let ordering = if policy.score_scale.is_some() {
        "- Sort segments by relevance_score in descending order (most relevant first).\n"
    } else {
        ""
    };

    format!(
        "You analyze video transcripts and find segments relevant to a request.

Input transcript format:
Each caption has a start and end timestamp in \"HH:MM:SS,mmm --> HH:MM:SS,mmm\" format, followed by the spoken text.

Request: {query}

Your task:
- Identify segments or contiguous groups of captions that match the request.
- Each segment MUST be:
  - At least {min} long
  - Never longer than {max}
  - Ideally between {pref_lo} and {pref_hi}
- Return a JSON array of objects, each with:
{fields}

IMPORTANT:
- Your response must be a valid JSON array starting with [ and ending with ].
- Do not include any other text.
- Use only timestamps that appear in the transcript.
{ordering}",
        min = describe_seconds(policy.minimum_seconds),
        max = describe_seconds(policy.maximum_seconds),
        pref_lo = describe_seconds(pref_lo),
        pref_hi = describe_seconds(pref_hi),
        fields = fields.join("\n"),
    )
}

/// `45 seconds`, `1:20`, `2:00`.
fn describe_seconds(seconds: f64) -> String {
    let whole = seconds.round() as u64;
    if whole < 60 {
        format!("{whole} seconds")
    } else {
        format!("{}:{:02}", whole / 60, whole % 60)
    }
}
