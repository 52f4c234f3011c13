use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::{Context as _, Result};
use toybox::collab::{QuotableClient, YtDlp};
use toybox::{Capability, Config, Context, LinePrompter, SeededRandom, cli, logging};
use tracing::{debug, warn};

fn main() -> Result<ExitCode> {
    let config = Config::from_env().context("failed to load configuration")?;
    logging::init(&config.log_filter)?;
    debug!(?config, "configuration loaded");

    let quotes = match QuotableClient::new(config.quote_url.clone(), config.http_timeout) {
        Ok(client) => Capability::Available(client),
        Err(err) => {
            warn!(error = %err, "quote client unavailable");
            Capability::missing("HTTP client", err.to_string())
        }
    };
    let downloader = match YtDlp::locate(config.ytdlp_path.as_deref()) {
        Ok(ytdlp) => {
            debug!(program = %ytdlp.program().display(), "found yt-dlp");
            Capability::Available(ytdlp)
        }
        Err(reason) => Capability::missing("yt-dlp", reason),
    };

    let registry = cli::registry(quotes, downloader)?;

    let stdin = io::stdin();
    let mut prompter = LinePrompter::new(stdin.lock(), io::stdout());
    let mut random = SeededRandom::new(config.seed);
    let mut stdout = io::stdout();
    let mut stderr = io::stderr();
    let status = {
        let mut ctx = Context {
            out: &mut stdout,
            err: &mut stderr,
            prompter: &mut prompter,
            random: &mut random,
        };
        registry.dispatch(std::env::args_os(), &mut ctx)
    };
    stdout.flush().ok();
    Ok(status.into())
}
