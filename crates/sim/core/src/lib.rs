//! Deterministic tick-driven combat engine.
//!
//! `sim-core` settles every event of a tick through [`scheduler::EventScheduler`],
//! evaluates declarative buffs through [`buff::BuffEngine`] and tracks the
//! per-element anomaly bars in [`anomaly::AnomalyMachine`]. All mutable state
//! of one run lives in [`world::SimWorld`]; persistence, report writers and
//! the outer driver are supplied by `runtime` through the traits exported
//! here.
pub mod actor;
pub mod anomaly;
pub mod buff;
pub mod config;
pub mod damage;
pub mod enemy;
pub mod error;
pub mod event;
pub mod handlers;
pub mod report;
pub mod scheduler;
pub mod types;
pub mod world;

pub use actor::{BasicParticipant, CombatStats, Participant, Roster};
pub use anomaly::{
    ActiveElements, AnomalyActivation, AnomalyBar, AnomalyError, AnomalyMachine, AnomalyOutcome,
    AnomalySnapshot, AnomalyState, AttackerSnapshot, Disorder, Dot, DotEffect, DotRule, DotStart,
    DotTracker, ElementType, PolarityDisorder,
};
pub use buff::{
    BuffContext, BuffDefinition, BuffEngine, BuffError, BuffInstance, BuffRegistry, BuffStore,
    Comparator, Condition, ConfigError, DefinitionBackend, Effect, EffectError, EffectExecutor,
    EffectOutcome, MemoryBackend, RegistryError, StackingRule, StorageError, TargetScope,
    TargetSelector, Trigger,
};
pub use config::{AnomalyConfig, SimConfig};
pub use damage::{DamageModel, DamageResult, Modifiers, StandardDamageModel, TICKS_PER_SECOND};
pub use enemy::{Enemy, EnemyStatus};
pub use error::{ErrorSeverity, SimError};
pub use event::{Event, EventKind, ScheduledEvent};
pub use report::{MemorySink, NullSink, ReportRecord, ReportSink};
pub use scheduler::{
    EventHandler, EventScheduler, HandlerError, HandlerRegistry, ScheduleError, SettleStats,
    TickContext,
};
pub use types::{BuffId, ENEMY_OWNER, OwnerId, Tick};
pub use world::{AdvanceOutcome, SimWorld};
