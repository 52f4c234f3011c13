//! Random quote (`toybox quote`).

use crate::collab::{Capability, QuoteSource};
use crate::error::CommandError;
use crate::registry::{Command, Context, OptionSpec, ResolvedArgs};

/// Arguments for `toybox quote`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuoteArgs {
    /// Only return quotes carrying this tag. An empty tag means no filter.
    pub tag: Option<String>,
}

impl From<&ResolvedArgs> for QuoteArgs {
    fn from(args: &ResolvedArgs) -> Self {
        Self {
            tag: args
                .string("tag")
                .filter(|tag| !tag.is_empty())
                .map(str::to_string),
        }
    }
}

pub fn command<Q: QuoteSource + 'static>(source: Capability<Q>) -> Command {
    Command::new(
        "quote",
        "Fetch and display a random quote",
        vec![OptionSpec::string("tag").help("Filter by tag")],
        move |args, ctx| run(&QuoteArgs::from(args), source.get()?, ctx),
    )
}

/// Fetch one quote and print it.
pub fn run(
    args: &QuoteArgs,
    source: &dyn QuoteSource,
    ctx: &mut Context<'_>,
) -> Result<(), CommandError> {
    let quote = source
        .fetch(args.tag.as_deref())
        .map_err(|err| CommandError::external("failed to fetch quote", err))?;
    writeln!(ctx.out, "\n\"{}\" — {}\n", quote.content, quote.author)?;
    Ok(())
}
