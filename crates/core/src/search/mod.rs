//! Search orchestration.
//! This module wires caption loading, normalization, the oracle call and
//! segment mapping, and stores what it produces under the work directory.

use crate::config::Config;
use crate::segments::{self, DurationPolicy, Proposal, SegmentSet};
use crate::srt::{self, CaptionRecord, Form};
use crate::video;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::time::timeout;
use tracing::{info, trace, warn};

pub mod artifact;
pub mod openai;
pub mod prompt;

/// Judges which parts of a transcript match a request.
/// Implementations return the raw answer text; decoding happens here.
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Propose segments of `transcript` for the task in `instructions`.
    async fn propose(&self, transcript: &str, instructions: &str) -> Result<String>;
}

/// Where caption text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptionSource {
    /// A local SRT file.
    File(PathBuf),
    /// A video URL whose auto captions are downloaded.
    Url(String),
}

impl CaptionSource {
    /// Treat arguments ending in `.srt` as files and everything else as URLs.
    pub fn from_arg(arg: &str) -> Self {
        let is_srt = Path::new(arg)
            .extension()
            .map(|e| e.eq_ignore_ascii_case("srt"))
            .unwrap_or(false);
        if is_srt {
            Self::File(PathBuf::from(arg))
        } else {
            Self::Url(arg.to_string())
        }
    }

    /// Stable id used in file names: the video id or the file stem.
    pub fn id(&self) -> Result<String> {
        match self {
            Self::File(path) => path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .ok_or_else(|| anyhow!("no file name in {}", path.display())),
            Self::Url(url) => video::extract_video_id(url),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Url(url) => url.clone(),
        }
    }
}

/// Read or download the captions for `source`, normalize them and store the
/// indexed transcript as `transcript_{id}.txt`, replacing any earlier one.
pub fn load_transcript(source: &CaptionSource, config: &Config) -> Result<Vec<CaptionRecord>> {
    trace!("load_transcript source={}", source.describe());
    let raw = match source {
        CaptionSource::File(path) => {
            info!("reading captions from {}", path.display());
            fs::read_to_string(path)
                .map_err(|e| crate::Error::SourceNotFound(format!("{}: {e}", path.display())))?
        }
        CaptionSource::Url(url) => video::fetch_captions(url, &config.work_dir)?,
    };
    let parsed = srt::parse(&raw)?;
    let records = srt::normalize(&parsed);
    info!(
        "normalized {} caption blocks into {}",
        parsed.len(),
        records.len()
    );
    fs::create_dir_all(&config.work_dir)?;
    let path = artifact::transcript_path(&config.work_dir, &source.id()?);
    fs::write(&path, srt::format(&records, Form::Indexed))?;
    info!("transcript saved to {}", path.display());
    Ok(records)
}

/// Find the segments of `source` that answer `query` under `policy`.
/// A segment set already stored for the same source, query and policy is
/// returned as is; otherwise the oracle is asked and the result is stored.
pub async fn find_segments<O: Oracle>(
    source: &CaptionSource,
    query: &str,
    policy: &DurationPolicy,
    oracle: &O,
    config: &Config,
) -> Result<SegmentSet> {
    trace!("find_segments source={} query={query}", source.describe());
    let id = source.id()?;
    let out_path = artifact::segments_path(&config.work_dir, &id, query, policy);
    if let Some(existing) = artifact::load(&out_path, query)? {
        info!("reusing {}", out_path.display());
        return Ok(existing);
    }

    let records = load_transcript(source, config)?;
    let transcript = srt::format(&records, Form::Plain);
    let instructions = prompt::instructions(query, policy);
    info!("analyzing transcript for query '{query}'");
    let proposals = ask_oracle(oracle, &transcript, &instructions, config).await?;
    let proposed = proposals.len();
    let segments = segments::map_proposals(proposals, policy);
    info!("kept {} of {} proposed segments", segments.len(), proposed);

    let set = SegmentSet::new(query, source.describe(), segments);
    artifact::save(&set, &out_path)?;
    info!("segments saved to {}", out_path.display());
    Ok(set)
}

/// Call the oracle until it yields a decodable answer.
/// Errors, timeouts and undecodable answers each use up one attempt.
async fn ask_oracle<O: Oracle>(
    oracle: &O,
    transcript: &str,
    instructions: &str,
    config: &Config,
) -> Result<Vec<Proposal>> {
    let attempts = config.oracle_attempts.max(1);
    let mut last_err = anyhow!("oracle was not called");
    for attempt in 1..=attempts {
        let begin = Instant::now();
        let answer = match timeout(config.oracle_timeout(), oracle.propose(transcript, instructions)).await {
            Ok(answer) => answer,
            Err(_) => Err(anyhow!(
                "oracle timed out after {} s",
                config.oracle_timeout_secs
            )),
        };
        match answer.and_then(|raw| segments::decode_response(&raw).map_err(Into::into)) {
            Ok(proposals) => {
                info!(
                    "oracle answered with {} proposals in {} ms",
                    proposals.len(),
                    begin.elapsed().as_millis()
                );
                return Ok(proposals);
            }
            Err(err) => {
                warn!("oracle attempt {attempt}/{attempts} failed: {err}");
                last_err = err;
            }
        }
    }
    Err(last_err).context("oracle gave no usable answer")
}
