//! Dice rolling.

use std::fmt;

use crate::error::CommandError;
use crate::random::RandomSource;

/// Validated dice request: `rolls` repetitions of `count` dice with `sides` faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiceSpec {
    count: u32,
    sides: u32,
    rolls: u32,
}

impl DiceSpec {
    /// Requires `count >= 1`, `sides >= 2` and `rolls >= 1`.
    pub fn new(count: i64, sides: i64, rolls: i64) -> Result<Self, CommandError> {
        if count < 1 || sides < 2 || rolls < 1 {
            return Err(CommandError::validation(format!(
                "count>=1, sides>=2, rolls>=1 required (got count={count}, sides={sides}, rolls={rolls})"
            )));
        }
        let fits = |name: &str, v: i64| {
            u32::try_from(v)
                .map_err(|_| CommandError::validation(format!("{name} {v} is too large")))
        };
        Ok(Self {
            count: fits("count", count)?,
            sides: fits("sides", sides)?,
            rolls: fits("rolls", rolls)?,
        })
    }

    pub fn rolls(&self) -> u32 {
        self.rolls
    }

    /// Roll every die once.
    pub fn roll(&self, random: &mut dyn RandomSource) -> DiceRoll {
        let values = (0..self.count)
            .map(|_| random.between(1, i64::from(self.sides)) as u32)
            .collect();
        DiceRoll::new(values)
    }
}

/// Faces shown by one roll and their sum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiceRoll {
    values: Vec<u32>,
    total: u64,
}

impl DiceRoll {
    pub fn new(values: Vec<u32>) -> Self {
        let total = values.iter().map(|v| u64::from(*v)).sum();
        Self { values, total }
    }

    pub fn values(&self) -> &[u32] {
        &self.values
    }

    pub fn total(&self) -> u64 {
        self.total
    }
}

impl fmt::Display for DiceRoll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Roll: {:?} -> total {}", self.values, self.total)
    }
}

/// Mean of the roll totals, `None` for no rolls.
pub fn average(rolls: &[DiceRoll]) -> Option<f64> {
    if rolls.is_empty() {
        return None;
    }
    let sum: u64 = rolls.iter().map(DiceRoll::total).sum();
    Some(sum as f64 / rolls.len() as f64)
}
