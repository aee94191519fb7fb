//! Turning a chosen time range into a cut instruction for the downloader.

use crate::error::{Error, Result};
use crate::timestamp::Timestamp;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Where to seek and how much to keep when downloading a clip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrimInstruction {
    pub source: String,
    pub start: Timestamp,
    pub end: Timestamp,
    pub offset_seconds: f64,
    pub duration_seconds: f64,
}

/// Compute the seek offset and duration for `start..end` of `source`.
/// Fails with `NonPositiveDuration` unless `end` is after `start`.
pub fn resolve(source: &str, start: Timestamp, end: Timestamp) -> Result<TrimInstruction> {
    trace!("resolve(source={source}, start={start}, end={end})");
    if end <= start {
        return Err(Error::NonPositiveDuration {
            start: start.to_string(),
            end: end.to_string(),
        });
    }
    Ok(TrimInstruction {
        source: source.to_string(),
        start,
        end,
        offset_seconds: start.as_seconds(),
        duration_seconds: (end.as_millis() - start.as_millis()) as f64 / 1000.0,
    })
}

/// Same as [`resolve`] for timestamps still in `HH:MM:SS,mmm` form.
pub fn resolve_str(source: &str, start: &str, end: &str) -> Result<TrimInstruction> {
    resolve(source, start.trim().parse()?, end.trim().parse()?)
}

impl TrimInstruction {
    /// Output file for this clip inside `dir`, named after the video id and range.
    pub fn output_path(&self, dir: &Path, video_id: &str) -> PathBuf {
        dir.join(format!(
            "clip_{}_{}_{}.mp4",
            video_id,
            self.start.to_string().replace(',', "_"),
            self.end.to_string().replace(',', "_")
        ))
    }

    /// Build the `yt-dlp` arguments that download only this range, capped at 720p.
    pub fn yt_dlp_args(&self, output: &Path) -> Vec<String> {
        vec![
            "--no-cache-dir".to_string(),
            "--no-warnings".to_string(),
            "-f".to_string(),
            "best[height<=720]".to_string(),
            "--downloader".to_string(),
            "ffmpeg".to_string(),
            "--downloader-args".to_string(),
            format!(
                "ffmpeg_i:-ss {} -t {}",
                self.offset_seconds, self.duration_seconds
            ),
            "-o".to_string(),
            output.display().to_string(),
            self.source.clone(),
        ]
    }
}
