//! This module is responsible for SRT parsing and formatting.
//! Auto-generated caption tracks are noisy, so the parser skips blocks it
//! cannot read and `normalize` removes the rolling-window repetition.

use crate::error::{Error, Result};
use crate::timestamp::{self, Timestamp};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

mod normalize;

pub use normalize::normalize;

/// Represents a single caption block (index, time range, one line of text).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptionRecord {
    pub index: u32,
    pub start: Timestamp,
    pub end: Timestamp,
    pub text: String,
}

impl CaptionRecord {
    pub fn new(index: u32, start: u64, end: u64, text: impl Into<String>) -> Self {
        Self {
            index,
            start: Timestamp(start),
            end: Timestamp(end),
            text: text.into(),
        }
    }
}

/// Layout of a formatted caption document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Form {
    /// `index`, timing line, text.
    #[default]
    Indexed,
    /// Timing line and text only; meant for people and the oracle.
    Plain,
}

/// Parse SRT text into a list of caption records in document order.
/// Blocks may carry an index line or start directly with the timing line;
/// a non-numeric index is replaced by the block's position.
pub fn parse(input: &str) -> Result<Vec<CaptionRecord>> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let mut records = Vec::new();
    let mut chunk: Vec<&str> = Vec::new();
    let mut skipped = 0usize;
    let mut lines = input.lines();
    loop {
        let line = lines.next();
        match line {
            Some(l) if !l.trim().is_empty() => {
                chunk.push(l);
                continue;
            }
            _ => {}
        }
        if !chunk.is_empty() {
            let position = records.len() as u32 + 1;
            match parse_block(&chunk, position) {
                Some(record) => records.push(record),
                None => {
                    skipped += 1;
                    debug!("skipping unreadable caption block starting {:?}", chunk[0]);
                }
            }
            chunk.clear();
        }
        if line.is_none() {
            break;
        }
    }
    if records.is_empty() && skipped > 0 {
        return Err(Error::UnparsableCaptionBlock);
    }
    trace!("parse: {} records, {} blocks skipped", records.len(), skipped);
    Ok(records)
}

/// Format caption records back to text.
/// The way this works is by writing each block followed by a blank line.
pub fn format(records: &[CaptionRecord], form: Form) -> String {
    let mut out = String::new();
    for record in records {
        if form == Form::Indexed {
            out.push_str(&format!("{}\n", record.index));
        }
        out.push_str(&format!(
            "{} --> {}\n{}\n\n",
            record.start, record.end, record.text
        ));
    }
    out
}

/// Read one block of non-blank lines, or `None` if it has no timing line
/// in the first or second position.
fn parse_block(lines: &[&str], position: u32) -> Option<CaptionRecord> {
    let (index, (start, end), text) = match lines {
        [first, rest @ ..] if first.contains("-->") => (position, parse_times(first)?, rest),
        [first, second, rest @ ..] => {
            let times = parse_times(second)?;
            let index = first.trim().parse().unwrap_or(position);
            (index, times, rest)
        }
        _ => return None,
    };
    let text = text
        .iter()
        .map(|l| l.trim())
        .collect::<Vec<_>>()
        .join(" ");
    if text.is_empty() {
        return None;
    }
    Some(CaptionRecord::new(index, start, end, text))
}

/// Parse a time range like `00:00:01,000 --> 00:00:02,000` to milliseconds.
fn parse_times(line: &str) -> Option<(u64, u64)> {
    let (start, end) = line.split_once("-->")?;
    Some((
        timestamp::parse(start.trim()).ok()?,
        timestamp::parse(end.trim()).ok()?,
    ))
}
