//! Number-guessing session state.

use tracing::debug;

use crate::error::CommandError;
use crate::random::RandomSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingGuess,
    Won,
    Lost,
}

/// Result of one accepted guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessOutcome {
    Correct,
    /// The secret is larger than the guess.
    Higher,
    /// The secret is smaller than the guess.
    Lower,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuessSession {
    low: i64,
    high: i64,
    secret: i64,
    attempts_remaining: u32,
    turns_used: u32,
    state: SessionState,
}

impl GuessSession {
    /// Validate bounds and draw the secret from `low..=high`.
    pub fn start(
        low: i64,
        high: i64,
        attempts: u32,
        random: &mut dyn RandomSource,
    ) -> Result<Self, CommandError> {
        check_bounds(low, high)?;
        let secret = random.between(low, high);
        Self::with_secret(low, high, attempts, secret)
    }

    /// Start a session around a known secret.
    pub fn with_secret(
        low: i64,
        high: i64,
        attempts: u32,
        secret: i64,
    ) -> Result<Self, CommandError> {
        check_bounds(low, high)?;
        if !(low..=high).contains(&secret) {
            return Err(CommandError::validation(format!(
                "secret {secret} is outside {low}..={high}"
            )));
        }
        let state = if attempts == 0 {
            SessionState::Lost
        } else {
            SessionState::AwaitingGuess
        };
        Ok(Self {
            low,
            high,
            secret,
            attempts_remaining: attempts,
            turns_used: 0,
            state,
        })
    }

    /// Apply one guess. Returns `None` once the session has ended.
    pub fn guess(&mut self, value: i64) -> Option<GuessOutcome> {
        if self.state != SessionState::AwaitingGuess {
            return None;
        }
        self.turns_used += 1;
        if value == self.secret {
            self.state = SessionState::Won;
            debug!(turns = self.turns_used, "secret found");
            return Some(GuessOutcome::Correct);
        }
        self.attempts_remaining -= 1;
        if self.attempts_remaining == 0 {
            self.state = SessionState::Lost;
            debug!("attempts exhausted");
        }
        Some(if value < self.secret {
            GuessOutcome::Higher
        } else {
            GuessOutcome::Lower
        })
    }

    pub fn low(&self) -> i64 {
        self.low
    }

    pub fn high(&self) -> i64 {
        self.high
    }

    pub fn secret(&self) -> i64 {
        self.secret
    }

    pub fn attempts_remaining(&self) -> u32 {
        self.attempts_remaining
    }

    pub fn turns_used(&self) -> u32 {
        self.turns_used
    }

    pub fn state(&self) -> SessionState {
        self.state
    }
}

fn check_bounds(low: i64, high: i64) -> Result<(), CommandError> {
    if low >= high {
        return Err(CommandError::validation(format!(
            "low must be < high (got low={low}, high={high})"
        )));
    }
    Ok(())
}
