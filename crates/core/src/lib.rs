//! Find relevant moments in long spoken-word videos.
//!
//! The pure pipeline lives in [`timestamp`], [`srt`], [`segments`] and
//! [`clip`]. [`search`] drives it end to end against an oracle, and
//! [`video`] wraps the `yt-dlp` collaborator.

pub mod clip;
pub mod config;
pub mod error;
pub mod search;
pub mod segments;
pub mod srt;
pub mod timestamp;
pub mod video;

pub use config::Config;
pub use error::{Error, Result};
pub use timestamp::Timestamp;
