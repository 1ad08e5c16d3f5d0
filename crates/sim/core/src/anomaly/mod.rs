//! Anomaly accumulation and disorder conversion.
//!
//! Hits feed per-element [`AnomalyBar`]s; the [`AnomalyMachine`] turns a
//! full bar into an activation, a refresh, or a [`Disorder`] that retires
//! the previously Active element. Activations leave [`Dot`]s behind.
mod bar;
mod dot;
mod element;
mod machine;
mod record;

pub use bar::{AnomalyBar, AnomalySnapshot, AnomalyState, AttackerSnapshot};
pub use dot::{Dot, DotEffect, DotRule, DotStart, DotTracker};
pub use element::{AnomalySlot, ElementType};
pub use machine::{ActiveElements, AnomalyError, AnomalyMachine};
pub use record::{AnomalyActivation, AnomalyOutcome, Disorder, PolarityDisorder};
