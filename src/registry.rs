//! Command registry: option schemas, argument resolution and dispatch.
//!
//! Each [`Command`] declares its options as an ordered [`OptionSpec`] table.
//! Tokenizing `argv` is left to clap; turning raw tokens into typed
//! [`OptionValue`]s, applying defaults and enforcing requiredness is driven
//! by the table so handlers only ever see validated [`ResolvedArgs`].

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::{Arg, ArgAction, ArgMatches, ColorChoice};
use tracing::{debug, info, warn};

use crate::error::{CommandError, ExitStatus};
use crate::prompt::Prompter;
use crate::random::RandomSource;

/// Declared type of a command-line option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionType {
    Integer,
    String,
    Boolean,
    Path,
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OptionType::Integer => "an integer",
            OptionType::String => "a string",
            OptionType::Boolean => "a boolean",
            OptionType::Path => "a path",
        };
        f.write_str(name)
    }
}

/// A typed, validated option value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Integer(i64),
    String(String),
    Boolean(bool),
    Path(PathBuf),
}

/// Declarative description of one option: name, type, default, requiredness.
#[derive(Debug, Clone)]
pub struct OptionSpec {
    pub name: &'static str,
    pub kind: OptionType,
    pub default: Option<OptionValue>,
    pub required: bool,
    pub positional: bool,
    pub help: &'static str,
}

impl OptionSpec {
    fn new(name: &'static str, kind: OptionType, default: Option<OptionValue>) -> Self {
        Self {
            name,
            kind,
            default,
            required: false,
            positional: false,
            help: "",
        }
    }

    /// `--name <int>` with a default.
    pub fn integer(name: &'static str, default: i64) -> Self {
        Self::new(name, OptionType::Integer, Some(OptionValue::Integer(default)))
    }

    /// `--name <text>` without a default.
    pub fn string(name: &'static str) -> Self {
        Self::new(name, OptionType::String, None)
    }

    /// `--name` switch, false unless present.
    pub fn flag(name: &'static str) -> Self {
        Self::new(name, OptionType::Boolean, Some(OptionValue::Boolean(false)))
    }

    /// `--name <path>` without a default.
    pub fn path(name: &'static str) -> Self {
        Self::new(name, OptionType::Path, None)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Accept the value as a bare positional argument instead of `--name`.
    pub fn positional(mut self) -> Self {
        self.positional = true;
        self
    }

    pub fn help(mut self, help: &'static str) -> Self {
        self.help = help;
        self
    }

    /// Coerce a raw token into this option's declared type.
    pub fn coerce(&self, raw: &str) -> Result<OptionValue, CommandError> {
        let invalid = || {
            CommandError::validation(format!(
                "invalid value '{}' for {}: expected {}",
                raw,
                self.display_name(),
                self.kind
            ))
        };
        match self.kind {
            OptionType::Integer => raw
                .trim()
                .parse::<i64>()
                .map(OptionValue::Integer)
                .map_err(|_| invalid()),
            OptionType::String => Ok(OptionValue::String(raw.to_string())),
            OptionType::Boolean => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Ok(OptionValue::Boolean(true)),
                "false" | "no" | "0" => Ok(OptionValue::Boolean(false)),
                _ => Err(invalid()),
            },
            OptionType::Path if raw.is_empty() => Err(invalid()),
            OptionType::Path => Ok(OptionValue::Path(PathBuf::from(raw))),
        }
    }

    fn display_name(&self) -> String {
        if self.positional {
            format!("<{}>", self.name)
        } else {
            format!("'--{}'", self.name)
        }
    }

    fn to_arg(&self) -> Arg {
        let mut arg = Arg::new(self.name).help(self.help).required(self.required);
        if !self.positional {
            arg = arg.long(self.name);
        }
        match self.kind {
            OptionType::Boolean => arg.action(ArgAction::SetTrue),
            OptionType::Integer => arg
                .action(ArgAction::Set)
                .value_name("INT")
                .allow_negative_numbers(true),
            OptionType::String => arg.action(ArgAction::Set).value_name("TEXT"),
            OptionType::Path => arg.action(ArgAction::Set).value_name("PATH"),
        }
    }

    fn raw_value(&self, matches: &ArgMatches) -> Option<String> {
        match self.kind {
            OptionType::Boolean => matches
                .get_flag(self.name)
                .then(|| "true".to_string()),
            _ => matches.get_one::<String>(self.name).cloned(),
        }
    }
}

/// Validated arguments handed to a command handler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedArgs {
    values: BTreeMap<&'static str, OptionValue>,
}

impl ResolvedArgs {
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.values.get(name)
    }

    pub fn integer(&self, name: &str) -> Result<i64, CommandError> {
        match self.get(name) {
            Some(OptionValue::Integer(v)) => Ok(*v),
            _ => Err(CommandError::validation(format!(
                "option '--{name}' requires an integer"
            ))),
        }
    }

    pub fn string(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(OptionValue::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn flag(&self, name: &str) -> bool {
        matches!(self.get(name), Some(OptionValue::Boolean(true)))
    }

    pub fn path(&self, name: &str) -> Option<&Path> {
        match self.get(name) {
            Some(OptionValue::Path(p)) => Some(p.as_path()),
            _ => None,
        }
    }
}

/// Everything a handler may touch while it runs.
pub struct Context<'a> {
    pub out: &'a mut dyn Write,
    pub err: &'a mut dyn Write,
    pub prompter: &'a mut dyn Prompter,
    pub random: &'a mut dyn RandomSource,
}

pub type Handler = Box<dyn Fn(&ResolvedArgs, &mut Context<'_>) -> Result<(), CommandError>>;

/// A named handler together with its option schema.
pub struct Command {
    pub name: &'static str,
    pub about: &'static str,
    pub options: Vec<OptionSpec>,
    handler: Handler,
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("about", &self.about)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Command {
    pub fn new<F>(name: &'static str, about: &'static str, options: Vec<OptionSpec>, handler: F) -> Self
    where
        F: Fn(&ResolvedArgs, &mut Context<'_>) -> Result<(), CommandError> + 'static,
    {
        Self {
            name,
            about,
            options,
            handler: Box::new(handler),
        }
    }

    /// Apply the option table to parsed matches: coerce, default, require.
    pub fn resolve(&self, matches: &ArgMatches) -> Result<ResolvedArgs, CommandError> {
        let mut values = BTreeMap::new();
        for spec in &self.options {
            let value = match spec.raw_value(matches) {
                Some(raw) => spec.coerce(&raw)?,
                None if spec.required => {
                    return Err(CommandError::validation(format!(
                        "missing required argument {}",
                        spec.display_name()
                    )));
                }
                None => match &spec.default {
                    Some(default) => default.clone(),
                    None => continue,
                },
            };
            values.insert(spec.name, value);
        }
        Ok(ResolvedArgs { values })
    }

    pub fn run(&self, args: &ResolvedArgs, ctx: &mut Context<'_>) -> Result<(), CommandError> {
        (self.handler)(args, ctx)
    }

    fn clap_command(&self) -> clap::Command {
        clap::Command::new(self.name)
            .about(self.about)
            .args(self.options.iter().map(OptionSpec::to_arg))
    }
}

/// Name-indexed set of commands behind a single program entrypoint.
pub struct CommandRegistry {
    program: &'static str,
    about: &'static str,
    version: &'static str,
    commands: Vec<Command>,
}

impl CommandRegistry {
    pub fn new(program: &'static str, about: &'static str, version: &'static str) -> Self {
        Self {
            program,
            about,
            version,
            commands: Vec::new(),
        }
    }

    /// Add a command. Names are unique; a clash is rejected.
    pub fn register(&mut self, command: Command) -> Result<()> {
        if self.get(command.name).is_some() {
            return Err(anyhow!("command '{}' is already registered", command.name));
        }
        debug!(command = command.name, "registered command");
        self.commands.push(command);
        Ok(())
    }

    /// Registered command names in registration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.commands.iter().map(|c| c.name).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Command> {
        self.commands.iter().find(|c| c.name == name)
    }

    /// Parse `argv` (program name first), run the selected handler and
    /// report any failure as one line on `ctx.err`.
    pub fn dispatch<I, T>(&self, argv: I, ctx: &mut Context<'_>) -> ExitStatus
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let argv: Vec<OsString> = argv.into_iter().map(Into::into).collect();
        if let Some(name) = argv.get(1).and_then(|a| a.to_str()) {
            if !name.starts_with('-') && self.get(name).is_none() {
                return self.fail(self.unknown(name), ctx);
            }
        }

        let mut root = self.clap_command();
        let matches = match root.try_get_matches_from_mut(argv) {
            Ok(matches) => matches,
            Err(err) => return self.report_parse_error(err, ctx),
        };
        let Some((name, sub_matches)) = matches.subcommand() else {
            return self.fail(self.unknown(""), ctx);
        };
        let Some(command) = self.get(name) else {
            return self.fail(self.unknown(name), ctx);
        };

        let args = match command.resolve(sub_matches) {
            Ok(args) => args,
            Err(err) => {
                warn!(command = name, error = %err, "argument validation failed");
                let usage = root
                    .find_subcommand_mut(name)
                    .map(|sub| sub.render_usage().to_string())
                    .unwrap_or_default();
                let _ = writeln!(ctx.err, "error: {err}\n\n{usage}");
                return err.exit_status();
            }
        };

        info!(command = name, "dispatching");
        match command.run(&args, ctx) {
            Ok(()) => ExitStatus::SUCCESS,
            Err(err) => {
                warn!(command = name, error = %err, "command failed");
                self.fail(err, ctx)
            }
        }
    }

    fn clap_command(&self) -> clap::Command {
        clap::Command::new(self.program)
            .about(self.about)
            .version(self.version)
            .color(ColorChoice::Never)
            .subcommand_required(true)
            .arg_required_else_help(true)
            .disable_help_subcommand(true)
            .subcommands(self.commands.iter().map(Command::clap_command))
    }

    fn unknown(&self, name: &str) -> CommandError {
        CommandError::UnknownCommand {
            name: name.to_string(),
            known: self.names().into_iter().map(String::from).collect(),
        }
    }

    fn fail(&self, err: CommandError, ctx: &mut Context<'_>) -> ExitStatus {
        let _ = writeln!(ctx.err, "error: {err}");
        err.exit_status()
    }

    fn report_parse_error(&self, err: clap::Error, ctx: &mut Context<'_>) -> ExitStatus {
        match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                let _ = write!(ctx.out, "{}", err.render());
                ExitStatus::SUCCESS
            }
            ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand | ErrorKind::MissingSubcommand => {
                let _ = write!(ctx.err, "{}", err.render());
                self.fail(self.unknown(""), ctx)
            }
            ErrorKind::InvalidSubcommand => {
                let name = match err.get(ContextKind::InvalidSubcommand) {
                    Some(ContextValue::String(name)) => name.clone(),
                    _ => String::new(),
                };
                self.fail(self.unknown(&name), ctx)
            }
            _ => {
                let _ = write!(ctx.err, "{}", err.render());
                ExitStatus::FAILURE
            }
        }
    }
}
