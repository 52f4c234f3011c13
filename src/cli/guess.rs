//! Number guessing game (`toybox guess`).

use crate::error::CommandError;
use crate::guess::{GuessOutcome, GuessSession, SessionState};
use crate::registry::{Command, Context, OptionSpec, ResolvedArgs};

/// Arguments for `toybox guess`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuessArgs {
    pub low: i64,
    pub high: i64,
    pub attempts: u32,
}

impl TryFrom<&ResolvedArgs> for GuessArgs {
    type Error = CommandError;

    fn try_from(args: &ResolvedArgs) -> Result<Self, Self::Error> {
        let attempts = args.integer("attempts")?;
        let attempts = u32::try_from(attempts).map_err(|_| {
            CommandError::validation(format!("attempts must be between 0 and {}", u32::MAX))
        })?;
        Ok(Self {
            low: args.integer("low")?,
            high: args.integer("high")?,
            attempts,
        })
    }
}

pub fn command() -> Command {
    Command::new(
        "guess",
        "Number guessing game in the terminal",
        vec![
            OptionSpec::integer("low", 1).help("Smallest possible number"),
            OptionSpec::integer("high", 100).help("Largest possible number"),
            OptionSpec::integer("attempts", 7).help("Guesses allowed"),
        ],
        |args, ctx| run(&GuessArgs::try_from(args)?, ctx),
    )
}

/// Play one game. Winning and losing both return `Ok`.
pub fn run(args: &GuessArgs, ctx: &mut Context<'_>) -> Result<(), CommandError> {
    let session = GuessSession::start(args.low, args.high, args.attempts, &mut *ctx.random)?;
    play(session, ctx)
}

/// Drive an already started session until it reaches a terminal state.
pub fn play(mut session: GuessSession, ctx: &mut Context<'_>) -> Result<(), CommandError> {
    writeln!(
        ctx.out,
        "Guess a number between {} and {}. You have {} attempts.",
        session.low(),
        session.high(),
        session.attempts_remaining()
    )?;

    while session.state() == SessionState::AwaitingGuess {
        let label = format!("Attempt {}", session.turns_used() + 1);
        let value = match ctx.prompter.read_integer(&label) {
            Ok(value) => value,
            Err(CommandError::MalformedInput(_)) => {
                writeln!(ctx.out, "Please enter an integer.")?;
                continue;
            }
            Err(err) => return Err(err),
        };
        match session.guess(value) {
            Some(GuessOutcome::Correct) => {
                writeln!(ctx.out, "Correct! The number was {}.", session.secret())?;
                let turns = session.turns_used();
                let noun = if turns == 1 { "attempt" } else { "attempts" };
                writeln!(ctx.out, "Solved in {turns} {noun}.")?;
            }
            Some(GuessOutcome::Higher) => writeln!(ctx.out, "Try higher.")?,
            Some(GuessOutcome::Lower) => writeln!(ctx.out, "Try lower.")?,
            None => break,
        }
    }

    if session.state() == SessionState::Lost {
        writeln!(
            ctx.out,
            "Out of attempts! The number was {}.",
            session.secret()
        )?;
    }
    Ok(())
}
