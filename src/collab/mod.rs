//! External collaborators: the quote API and the media download tool.
//!
//! Commands only see the [`QuoteSource`] and [`MediaDownloader`] traits.
//! Production implementations live in [`quotable`] and [`ytdlp`]; whether
//! one could be constructed is decided once at startup and carried as a
//! [`Capability`].

pub mod quotable;
pub mod ytdlp;

use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::error::CommandError;

pub use quotable::QuotableClient;
pub use ytdlp::YtDlp;

/// A collaborator that is either ready to use or known to be absent.
#[derive(Debug)]
pub enum Capability<T> {
    Available(T),
    Missing {
        dependency: &'static str,
        reason: String,
    },
}

impl<T> Capability<T> {
    pub fn missing(dependency: &'static str, reason: impl Into<String>) -> Self {
        Capability::Missing {
            dependency,
            reason: reason.into(),
        }
    }

    /// Borrow the collaborator or report it as a missing dependency.
    pub fn get(&self) -> Result<&T, CommandError> {
        match self {
            Capability::Available(inner) => Ok(inner),
            Capability::Missing { dependency, reason } => Err(CommandError::DependencyMissing {
                dependency: *dependency,
                reason: reason.clone(),
            }),
        }
    }
}

/// One quote as returned by the quote API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QuoteRecord {
    pub content: String,
    pub author: String,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("malformed quote payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Anything that can hand out a random quote, optionally filtered by tag.
pub trait QuoteSource {
    fn fetch(&self, tag: Option<&str>) -> Result<QuoteRecord, FetchError>;
}

/// Audio extraction step requested for audio-only downloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioExtraction {
    pub format: String,
    pub codec: String,
    pub quality: String,
}

/// Settings passed to a [`MediaDownloader`] for a single URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOptions {
    pub output_template: PathBuf,
    pub no_playlist: bool,
    pub restrict_filenames: bool,
    pub no_check_certificate: bool,
    pub audio: Option<AudioExtraction>,
}

impl DownloadOptions {
    /// Files land in `dir` named after the media title and extension.
    pub fn for_directory(dir: &Path, audio_only: bool) -> Self {
        let audio = audio_only.then(|| AudioExtraction {
            format: "bestaudio/best".to_string(),
            codec: "mp3".to_string(),
            quality: "192".to_string(),
        });
        Self {
            output_template: dir.join("%(title)s.%(ext)s"),
            no_playlist: true,
            restrict_filenames: true,
            no_check_certificate: true,
            audio,
        }
    }
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("{program} exited with {status}")]
    Failed {
        program: String,
        status: std::process::ExitStatus,
    },
}

/// Anything that can fetch a media URL to disk.
pub trait MediaDownloader {
    fn download(&self, url: &str, options: &DownloadOptions) -> Result<(), DownloadError>;
}
