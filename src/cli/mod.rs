//! Command wiring for the `toybox` binary.
//!
//! Each submodule declares one command's option table, converts the
//! resolved arguments into a typed struct and runs the handler.

use anyhow::Result;

use crate::collab::{Capability, MediaDownloader, QuoteSource};
use crate::registry::CommandRegistry;

pub mod dice;
pub mod guess;
pub mod quote;
pub mod ytdl;

pub const PROGRAM: &str = "toybox";

/// Build the registry with all four commands, injecting the collaborators.
pub fn registry<Q, D>(quotes: Capability<Q>, downloader: Capability<D>) -> Result<CommandRegistry>
where
    Q: QuoteSource + 'static,
    D: MediaDownloader + 'static,
{
    let mut registry = CommandRegistry::new(
        PROGRAM,
        "Small terminal toys: quotes, guessing, dice and media downloads",
        env!("CARGO_PKG_VERSION"),
    );
    registry.register(quote::command(quotes))?;
    registry.register(guess::command())?;
    registry.register(dice::command())?;
    registry.register(ytdl::command(downloader))?;
    Ok(registry)
}
