//! Records produced when a bar resolves.

use serde::{Deserialize, Serialize};

use super::{AnomalySnapshot, ElementType};
use crate::types::{OwnerId, Tick};

/// A same-element activation or refresh.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnomalyActivation {
    pub element: ElementType,
    pub snapshot: AnomalySnapshot,
    pub tick: Tick,
    /// True when the element (or its slot partner) was already Active.
    pub refreshed: bool,
    pub source: Option<OwnerId>,
}

/// Cross-element conversion: the retiring Active anomaly ends early and is
/// settled as damage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Disorder {
    pub retiring: ElementType,
    pub activating: ElementType,
    /// Snapshot the retiring element carried while Active.
    pub snapshot: AnomalySnapshot,
    /// Ticks the retiring anomaly still had left.
    pub remaining_ticks: u64,
    pub tick: Tick,
    pub source: Option<OwnerId>,
}

/// Disorder variant that settles the Active anomaly at a ratio without
/// retiring it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PolarityDisorder {
    pub element: ElementType,
    pub snapshot: AnomalySnapshot,
    pub ratio: f64,
    pub remaining_ticks: u64,
    pub tick: Tick,
    pub source: Option<OwnerId>,
}

/// Result of a bar resolution.
#[derive(Clone, Debug, PartialEq)]
pub enum AnomalyOutcome {
    Activated(AnomalyActivation),
    Disordered {
        disorder: Disorder,
        activation: AnomalyActivation,
    },
}

impl AnomalyOutcome {
    pub fn activation(&self) -> &AnomalyActivation {
        match self {
            Self::Activated(activation) => activation,
            Self::Disordered { activation, .. } => activation,
        }
    }

    pub fn disorder(&self) -> Option<&Disorder> {
        match self {
            Self::Activated(_) => None,
            Self::Disordered { disorder, .. } => Some(disorder),
        }
    }
}
