//! Video/audio download (`toybox ytdl`).

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::collab::{Capability, DownloadOptions, MediaDownloader};
use crate::error::CommandError;
use crate::registry::{Command, Context, OptionSpec, ResolvedArgs};

/// Arguments for `toybox ytdl`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YtdlArgs {
    pub url: String,
    pub audio_only: bool,
    /// Output directory; the working directory when omitted.
    pub out: Option<PathBuf>,
}

impl TryFrom<&ResolvedArgs> for YtdlArgs {
    type Error = CommandError;

    fn try_from(args: &ResolvedArgs) -> Result<Self, Self::Error> {
        let url = args
            .string("url")
            .ok_or_else(|| CommandError::validation("missing required argument <url>"))?;
        Ok(Self {
            url: url.to_string(),
            audio_only: args.flag("audio-only"),
            out: args.path("out").map(Path::to_path_buf),
        })
    }
}

pub fn command<D: MediaDownloader + 'static>(downloader: Capability<D>) -> Command {
    Command::new(
        "ytdl",
        "Download a video or its audio via yt-dlp",
        vec![
            OptionSpec::string("url").required().positional().help("Video URL"),
            OptionSpec::flag("audio-only").help("Download audio only (mp3)"),
            OptionSpec::path("out").help("Output directory"),
        ],
        move |args, ctx| {
            let args = YtdlArgs::try_from(args)?;
            run(&args, downloader.get()?, ctx)
        },
    )
}

/// Ensure the output directory exists and hand the URL to `downloader`.
pub fn run(
    args: &YtdlArgs,
    downloader: &dyn MediaDownloader,
    ctx: &mut Context<'_>,
) -> Result<(), CommandError> {
    let dir = match &args.out {
        Some(dir) => dir.clone(),
        None => env::current_dir()?,
    };
    ensure_dir(&dir)?;
    let options = DownloadOptions::for_directory(&dir, args.audio_only);
    info!(url = %args.url, dir = %dir.display(), audio_only = args.audio_only, "starting download");
    downloader
        .download(&args.url, &options)
        .map_err(|err| CommandError::external("download failed", err))?;
    writeln!(ctx.out, "Saved to {}", dir.display())?;
    Ok(())
}

/// Create `dir` and any missing parents; an existing directory is fine.
pub fn ensure_dir(dir: &Path) -> Result<(), CommandError> {
    fs::create_dir_all(dir).map_err(|err| {
        CommandError::external(&format!("cannot create {}", dir.display()), err)
    })
}
