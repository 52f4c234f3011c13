//! Command dispatch and interactive-session framework behind the `toybox`
//! binary, plus the four commands that plug into it.

pub mod cli;
pub mod collab;
pub mod config;
mod dice;
mod error;
mod guess;
pub mod logging;
mod prompt;
mod random;
pub mod registry;

pub use collab::{
    Capability, DownloadError, DownloadOptions, FetchError, MediaDownloader, QuoteRecord,
    QuoteSource,
};
pub use config::{Config, ConfigError};
pub use dice::{DiceRoll, DiceSpec, average};
pub use error::{CommandError, ExitStatus};
pub use guess::{GuessOutcome, GuessSession, SessionState};
pub use prompt::{LinePrompter, Prompter, parse_integer};
pub use random::{RandomSource, SeededRandom};
pub use registry::{
    Command, CommandRegistry, Context, OptionSpec, OptionType, OptionValue, ResolvedArgs,
};
