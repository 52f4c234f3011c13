//! Dice roller (`toybox dice`).

use crate::dice::{DiceSpec, average};
use crate::error::CommandError;
use crate::registry::{Command, Context, OptionSpec, ResolvedArgs};

/// Arguments for `toybox dice`, unvalidated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiceArgs {
    pub count: i64,
    pub sides: i64,
    pub rolls: i64,
}

impl TryFrom<&ResolvedArgs> for DiceArgs {
    type Error = CommandError;

    fn try_from(args: &ResolvedArgs) -> Result<Self, Self::Error> {
        Ok(Self {
            count: args.integer("count")?,
            sides: args.integer("sides")?,
            rolls: args.integer("rolls")?,
        })
    }
}

pub fn command() -> Command {
    Command::new(
        "dice",
        "Roll dice and show totals",
        vec![
            OptionSpec::integer("count", 2).help("Dice per roll"),
            OptionSpec::integer("sides", 6).help("Faces per die"),
            OptionSpec::integer("rolls", 1).help("Number of rolls"),
        ],
        |args, ctx| run(&DiceArgs::try_from(args)?, ctx),
    )
}

pub fn run(args: &DiceArgs, ctx: &mut Context<'_>) -> Result<(), CommandError> {
    let spec = DiceSpec::new(args.count, args.sides, args.rolls)?;
    let mut rolls = Vec::new();
    for _ in 0..spec.rolls() {
        let roll = spec.roll(&mut *ctx.random);
        writeln!(ctx.out, "{roll}")?;
        rolls.push(roll);
    }
    if spec.rolls() > 1 {
        if let Some(avg) = average(&rolls) {
            writeln!(
                ctx.out,
                "Average total over {} rolls: {avg:.2}",
                spec.rolls()
            )?;
        }
    }
    Ok(())
}
