//! Video helpers backed by `yt-dlp`: caption download and clip download.

use crate::clip::TrimInstruction;
use crate::error::Error;
use anyhow::{anyhow, Context, Result};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;
use tracing::{debug, info, trace};

/// File name prefix used for everything fetched for a transcript.
const CAPTION_PREFIX: &str = "transcript";

fn video_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?:v=|/)([0-9A-Za-z_-]{11})").expect("valid video id regex"))
}

/// Extract the 11 character video id from a watch, short or embed URL.
pub fn extract_video_id(url: &str) -> Result<String> {
    video_id_pattern()
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| anyhow!("could not extract video id from {url}"))
}

/// Build the `yt-dlp` arguments that fetch English auto captions as SRT
/// into `dir` without downloading the video.
pub fn caption_fetch_args(url: &str, dir: &Path) -> Vec<String> {
    vec![
        "--write-auto-subs".to_string(),
        "--sub-lang".to_string(),
        "en".to_string(),
        "--skip-download".to_string(),
        "--convert-subs".to_string(),
        "srt".to_string(),
        "--no-warnings".to_string(),
        "-o".to_string(),
        dir.join(CAPTION_PREFIX).display().to_string(),
        url.to_string(),
    ]
}

/// Download the auto captions of `url` and return the raw SRT text.
/// Earlier caption files in `dir` are removed first so a refetch never mixes
/// old and new tracks.
pub fn fetch_captions(url: &str, dir: &Path) -> Result<String> {
    trace!("fetch_captions(url={url}, dir={})", dir.display());
    fs::create_dir_all(dir)?;
    remove_caption_files(dir)?;
    info!("downloading captions for {url}");
    let output = Command::new("yt-dlp")
        .args(caption_fetch_args(url, dir))
        .output()
        .context("failed to run yt-dlp")?;
    if !output.status.success() {
        return Err(anyhow!(
            "yt-dlp failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }
    let path = find_caption_file(dir)?
        .ok_or_else(|| Error::SourceNotFound(format!("no caption track for {url}")))?;
    let content = fs::read_to_string(&path)?;
    remove_caption_files(dir)?;
    Ok(content)
}

/// Download the range described by `cut` into `dir` and return the clip path.
pub fn download_clip(cut: &TrimInstruction, dir: &Path, video_id: &str) -> Result<PathBuf> {
    trace!(
        "download_clip(source={}, offset={}, duration={})",
        cut.source,
        cut.offset_seconds,
        cut.duration_seconds
    );
    fs::create_dir_all(dir)?;
    let out = cut.output_path(dir, video_id);
    info!("downloading clip from {} to {}", cut.start, cut.end);
    let status = Command::new("yt-dlp")
        .args(cut.yt_dlp_args(&out))
        .status()
        .context("failed to run yt-dlp")?;
    if !status.success() {
        return Err(anyhow!("yt-dlp failed with {status}"));
    }
    if !out.exists() {
        return Err(Error::SourceNotFound(out.display().to_string()).into());
    }
    Ok(out)
}

/// First `transcript*.srt` file in `dir`, in name order.
fn find_caption_file(dir: &Path) -> Result<Option<PathBuf>> {
    let mut found: Vec<PathBuf> = caption_files(dir)?
        .into_iter()
        .filter(|p| p.extension().map(|e| e == "srt").unwrap_or(false))
        .collect();
    found.sort();
    Ok(found.into_iter().next())
}

fn remove_caption_files(dir: &Path) -> Result<()> {
    for path in caption_files(dir)?
        .into_iter()
        .filter(|p| p.extension().map(|e| e == "srt").unwrap_or(false))
    {
        debug!("removing stale caption file {}", path.display());
        fs::remove_file(path)?;
    }
    Ok(())
}

fn caption_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_caption = path
            .file_name()
            .map(|n| n.to_string_lossy().starts_with(CAPTION_PREFIX))
            .unwrap_or(false);
        if is_caption && path.is_file() {
            files.push(path);
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn extracts_ids_from_common_urls() {
        for url in [
            "https://www.youtube.com/watch?v=RywoFvefNOE",
            "https://youtu.be/RywoFvefNOE",
            "https://www.youtube.com/embed/RywoFvefNOE?start=3",
            "https://www.youtube.com/watch?feature=share&v=RywoFvefNOE",
        ] {
            assert_eq!(extract_video_id(url).unwrap(), "RywoFvefNOE", "{url}");
        }
        assert!(extract_video_id("https://example.com/").is_err());
    }

    #[test]
    fn builds_expected_caption_args() {
        let args = caption_fetch_args("https://youtu.be/RywoFvefNOE", Path::new("tmp"));
        let expected = [
            "--write-auto-subs",
            "--sub-lang",
            "en",
            "--skip-download",
            "--convert-subs",
            "srt",
            "--no-warnings",
            "-o",
            "tmp/transcript",
            "https://youtu.be/RywoFvefNOE",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>();
        assert_eq!(args, expected);
    }

    #[test]
    fn finds_and_clears_caption_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("transcript.en.srt"), "1\n").unwrap();
        fs::write(dir.path().join("transcript_abc.txt"), "keep").unwrap();
        fs::write(dir.path().join("other.srt"), "keep").unwrap();
        let found = find_caption_file(dir.path()).unwrap();
        assert_eq!(found, Some(dir.path().join("transcript.en.srt")));
        remove_caption_files(dir.path()).unwrap();
        assert_eq!(find_caption_file(dir.path()).unwrap(), None);
        assert!(dir.path().join("transcript_abc.txt").exists());
        assert!(dir.path().join("other.srt").exists());
    }
}
