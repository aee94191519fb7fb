//! Collapse the rolling window of auto-generated captions into plain prose.
//!
//! Auto captions re-show the tail of the previous block before adding new
//! words, so the same phrase can appear two or three times in a row. The
//! rules below remove that repetition exactly once.

use super::CaptionRecord;
use tracing::trace;

/// Remove overlapping text and merge consecutive identical captions.
///
/// Each raw record is compared with the previous raw text and with the last
/// accepted record:
///
/// * a record that starts with the previous raw text only contributes the
///   remainder; an empty remainder, or one equal to the last accepted text,
///   just extends that record's end time;
/// * while the last accepted record has not been re-shown, an extension of
///   it grows that record; once it has, only the new words are appended;
/// * anything else is appended verbatim.
///
/// No record is left identical to, or a prefix of, its successor. Indices are
/// reassigned from 1 afterwards. Running this on its own output changes
/// nothing.
pub fn normalize(records: &[CaptionRecord]) -> Vec<CaptionRecord> {
    let mut out: Vec<CaptionRecord> = Vec::with_capacity(records.len());
    let mut prev_text: Option<&str> = None;
    // Set once the last accepted caption has been shown again, after which
    // an extension of it is a new line rather than the same line growing.
    let mut held = false;

    for record in records {
        let text = record.text.trim();
        if text.is_empty() {
            continue;
        }
        let Some(last) = out.last_mut() else {
            out.push(CaptionRecord { text: text.to_string(), ..record.clone() });
            prev_text = Some(text);
            continue;
        };

        let stripped = prev_text.and_then(|p| text.strip_prefix(p).map(|rest| (p, rest.trim())));
        let candidate = match stripped {
            Some((_, "")) => None,
            Some((prev, _)) if !held && last.text == prev => Some(text),
            Some((_, rest)) => Some(rest),
            None => Some(text),
        };
        let candidate = candidate
            .map(|t| match t.strip_prefix(last.text.as_str()) {
                Some(rest) if held => rest.trim(),
                _ => t,
            })
            .filter(|t| !t.is_empty() && *t != last.text);

        match candidate {
            Some(new_text) => {
                if new_text.starts_with(last.text.as_str()) {
                    trace!("caption {} grows to {:?}", last.index, new_text);
                    last.text = new_text.to_string();
                    last.end = record.end;
                } else {
                    out.push(CaptionRecord {
                        index: 0,
                        start: record.start,
                        end: record.end,
                        text: new_text.to_string(),
                    });
                }
                held = settle(&mut out);
            }
            // Pure repeat, or the same words split across a timing boundary.
            None => {
                last.end = last.end.max(record.end);
                held = true;
            }
        }
        prev_text = Some(text);
    }

    for (i, record) in out.iter_mut().enumerate() {
        record.index = i as u32 + 1;
    }
    out
}

/// Strip the predecessor's text off a record that grew to start with it.
/// Returns true when nothing was left and the two were merged.
fn settle(out: &mut Vec<CaptionRecord>) -> bool {
    while let [.., prev, last] = out.as_mut_slice() {
        let Some(rest) = last.text.strip_prefix(prev.text.as_str()) else {
            return false;
        };
        let rest = rest.trim().to_string();
        if rest.is_empty() {
            prev.end = prev.end.max(last.end);
            out.pop();
            return true;
        }
        last.text = rest;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::srt::{format, parse, Form};

    fn texts(records: &[CaptionRecord]) -> Vec<&str> {
        records.iter().map(|r| r.text.as_str()).collect()
    }

    fn assert_normalized(records: &[CaptionRecord]) {
        for (i, pair) in records.windows(2).enumerate() {
            assert!(
                !pair[1].text.starts_with(pair[0].text.as_str()),
                "record {} is a prefix of its successor",
                i + 1
            );
        }
        let indices: Vec<u32> = records.iter().map(|r| r.index).collect();
        assert_eq!(indices, (1..=records.len() as u32).collect::<Vec<_>>());
    }

    #[test]
    fn growing_caption_becomes_one_record() {
        let raw = parse(
            "1\n00:00:00,000 --> 00:00:02,000\nhello world\n\n2\n00:00:02,000 --> 00:00:05,000\nhello world and more\n\n",
        )
        .unwrap();
        let out = normalize(&raw);
        assert_eq!(out, vec![CaptionRecord::new(1, 0, 5000, "hello world and more")]);
    }

    #[test]
    fn rolling_window_is_collapsed() {
        // The shape yt-dlp produces for auto captions: each line is shown,
        // held for a few milliseconds, then scrolled up under the next one.
        let raw = vec![
            CaptionRecord::new(1, 160, 2790, "hello everyone welcome"),
            CaptionRecord::new(2, 2790, 2800, "hello everyone welcome"),
            CaptionRecord::new(3, 2800, 5000, "hello everyone welcome to the show"),
            CaptionRecord::new(4, 5000, 5010, "to the show"),
            CaptionRecord::new(5, 5010, 7000, "to the show today we talk"),
            CaptionRecord::new(6, 7000, 7010, "today we talk"),
        ];
        let out = normalize(&raw);
        assert_eq!(
            out,
            vec![
                CaptionRecord::new(1, 160, 2800, "hello everyone welcome"),
                CaptionRecord::new(2, 2800, 5010, "to the show"),
                CaptionRecord::new(3, 5010, 7010, "today we talk"),
            ]
        );
        assert_normalized(&out);
    }

    #[test]
    fn pure_repeat_extends_end() {
        let raw = vec![
            CaptionRecord::new(1, 0, 1000, "same words"),
            CaptionRecord::new(2, 1000, 1500, "same words"),
        ];
        assert_eq!(normalize(&raw), vec![CaptionRecord::new(1, 0, 1500, "same words")]);
    }

    #[test]
    fn split_duplicate_extends_end() {
        let raw = vec![
            CaptionRecord::new(1, 0, 1000, "first"),
            CaptionRecord::new(2, 1000, 1010, "first"),
            CaptionRecord::new(3, 1010, 2000, "first again"),
            CaptionRecord::new(4, 2000, 3000, "first again again"),
        ];
        let out = normalize(&raw);
        assert_eq!(
            out,
            vec![
                CaptionRecord::new(1, 0, 1010, "first"),
                CaptionRecord::new(2, 1010, 3000, "again"),
            ]
        );
    }

    #[test]
    fn unrelated_text_is_never_merged() {
        let raw = vec![
            CaptionRecord::new(1, 0, 1000, "we went to the"),
            CaptionRecord::new(2, 1000, 2000, "store yesterday"),
        ];
        let out = normalize(&raw);
        assert_eq!(texts(&out), vec!["we went to the", "store yesterday"]);
    }

    #[test]
    fn empty_and_single_inputs() {
        assert!(normalize(&[]).is_empty());
        let out = normalize(&[CaptionRecord::new(42, 10, 20, "only")]);
        assert_eq!(out, vec![CaptionRecord::new(1, 10, 20, "only")]);
    }

    #[test]
    fn blank_records_are_dropped() {
        let raw = vec![
            CaptionRecord::new(1, 0, 1000, "a"),
            CaptionRecord::new(2, 1000, 1010, "  "),
            CaptionRecord::new(3, 1010, 2000, "b"),
        ];
        assert_eq!(texts(&normalize(&raw)), vec!["a", "b"]);
    }

    #[test]
    fn normalizing_twice_is_a_no_op() {
        let raw = vec![
            CaptionRecord::new(1, 0, 900, "so the idea"),
            CaptionRecord::new(2, 900, 910, "so the idea"),
            CaptionRecord::new(3, 910, 2000, "so the idea is simple"),
            CaptionRecord::new(4, 2000, 2010, "is simple"),
            CaptionRecord::new(5, 2010, 3000, "unrelated words"),
            CaptionRecord::new(6, 3000, 4000, "unrelated words and then some"),
            CaptionRecord::new(7, 4000, 5000, "ab c"),
            CaptionRecord::new(8, 5000, 6000, "ab"),
            CaptionRecord::new(9, 6000, 7000, "ab c d"),
        ];
        let once = normalize(&raw);
        assert_normalized(&once);
        assert_eq!(
            texts(&once),
            vec!["so the idea", "is simple", "unrelated words and then some", "ab c", "d"]
        );
        assert_eq!(normalize(&once), once);
    }

    /// A shorter caption that grows back into its predecessor is merged with it.
    #[test]
    fn regrown_caption_merges_back() {
        let raw = vec![
            CaptionRecord::new(1, 0, 1000, "ab c"),
            CaptionRecord::new(2, 1000, 2000, "ab"),
            CaptionRecord::new(3, 2000, 3000, "ab c"),
        ];
        let out = normalize(&raw);
        assert_eq!(out, vec![CaptionRecord::new(1, 0, 3000, "ab c")]);
        assert_eq!(normalize(&out), out);
    }

    /// Text that continues the last accepted record but not the previous raw
    /// caption grows that record when it has not been re-shown.
    #[test]
    fn extension_of_accepted_text_after_discontinuity() {
        let raw = vec![
            CaptionRecord::new(1, 0, 1000, "a"),
            CaptionRecord::new(2, 1000, 1010, "a"),
            CaptionRecord::new(3, 1010, 2000, "a b"),
            CaptionRecord::new(4, 2000, 3000, "b c"),
        ];
        let out = normalize(&raw);
        assert_eq!(
            out,
            vec![
                CaptionRecord::new(1, 0, 1010, "a"),
                CaptionRecord::new(2, 1010, 3000, "b c"),
            ]
        );
        assert_normalized(&out);
    }

    /// Once re-shown, a record continued after a discontinuity only gains a new line.
    #[test]
    fn extension_of_held_text_after_discontinuity() {
        let raw = vec![
            CaptionRecord::new(1, 0, 1000, "x"),
            CaptionRecord::new(2, 1000, 1010, "x"),
            CaptionRecord::new(3, 1010, 2000, "x y"),
            CaptionRecord::new(4, 2000, 2010, "x y"),
            CaptionRecord::new(5, 2010, 3000, "y z"),
        ];
        let out = normalize(&raw);
        assert_eq!(texts(&out), vec!["x", "y", "z"]);
        assert_eq!(out[1].end.as_millis(), 2010);
        assert_eq!(out[2].start.as_millis(), 2010);
        assert_normalized(&out);
    }

    #[test]
    fn formatted_output_parses_back() {
        let raw = vec![
            CaptionRecord::new(1, 0, 1000, "one"),
            CaptionRecord::new(2, 1000, 1010, "one"),
            CaptionRecord::new(3, 1010, 2000, "one two"),
        ];
        let out = normalize(&raw);
        let doc = format(&out, Form::Indexed);
        assert_eq!(format(&parse(&doc).unwrap(), Form::Indexed), doc);
    }
}
