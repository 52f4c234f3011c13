//! [`MediaDownloader`] that shells out to the `yt-dlp` executable.

use std::env;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info};

use super::{DownloadError, DownloadOptions, MediaDownloader};

const PROGRAM: &str = "yt-dlp";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YtDlp {
    program: PathBuf,
}

impl YtDlp {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Use `explicit` when given, otherwise search `PATH` for `yt-dlp`.
    /// Only executable files are accepted.
    pub fn locate(explicit: Option<&Path>) -> Result<Self, String> {
        match explicit {
            Some(path) => which::which(path)
                .map(Self::new)
                .map_err(|err| format!("{} is not usable: {err}", path.display())),
            None => Self::locate_in(env::var_os("PATH").unwrap_or_default()),
        }
    }

    /// Search the `PATH`-style list `search` for `yt-dlp`.
    pub fn locate_in(search: impl AsRef<OsStr>) -> Result<Self, String> {
        which::which_in(PROGRAM, Some(search), Path::new("."))
            .map(Self::new)
            .map_err(|err| format!("{PROGRAM} not found on PATH: {err}"))
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Command-line arguments equivalent to `options` for one `url`.
    pub fn args(url: &str, options: &DownloadOptions) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "--output".into(),
            options.output_template.clone().into_os_string(),
        ];
        if options.no_playlist {
            args.push("--no-playlist".into());
        }
        if options.restrict_filenames {
            args.push("--restrict-filenames".into());
        }
        if options.no_check_certificate {
            args.push("--no-check-certificates".into());
        }
        if let Some(audio) = &options.audio {
            let extract: [OsString; 7] = [
                "--format".into(),
                audio.format.clone().into(),
                "--extract-audio".into(),
                "--audio-format".into(),
                audio.codec.clone().into(),
                "--audio-quality".into(),
                format!("{}K", audio.quality).into(),
            ];
            args.extend(extract);
        }
        args.push("--".into());
        args.push(url.into());
        args
    }
}

impl MediaDownloader for YtDlp {
    fn download(&self, url: &str, options: &DownloadOptions) -> Result<(), DownloadError> {
        let program = self.program.display().to_string();
        let args = Self::args(url, options);
        debug!(%program, ?args, "spawning downloader");
        let status = Command::new(&self.program)
            .args(&args)
            .status()
            .map_err(|source| DownloadError::Launch {
                program: program.clone(),
                source,
            })?;
        if !status.success() {
            return Err(DownloadError::Failed { program, status });
        }
        info!(url, "download finished");
        Ok(())
    }
}
