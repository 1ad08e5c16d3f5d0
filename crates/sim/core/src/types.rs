use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier of a buff definition.
pub type BuffId = String;

/// Identifier of a buff owner (a participant name, or [`ENEMY_OWNER`]).
pub type OwnerId = String;

/// Owner id used for debuffs carried by the enemy.
pub const ENEMY_OWNER: &str = "enemy";

/// Discrete simulation time unit.
///
/// The simulation advances at a fixed rate; every ordering guarantee in the
/// scheduler is expressed in whole ticks.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Self = Self(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Ticks elapsed since `earlier`, saturating at zero.
    pub fn since(self, earlier: Tick) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    pub fn next(self) -> Tick {
        Tick(self.0 + 1)
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

impl From<u64> for Tick {
    fn from(value: u64) -> Self {
        Self(value)
    }
}
