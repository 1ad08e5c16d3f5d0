//! Declarative buff rule engine.
//!
//! ```text
//! dispatch(event_type, context)
//!   └─ EventRouter        event type → candidate buff ids (lazy index)
//!       └─ BuffRegistry   id → BuffDefinition
//!           └─ ConditionEvaluator   all conditions must hold
//!               └─ EffectExecutor   effects in declared order → BuffStore
//! ```
mod backend;
mod condition;
mod context;
mod definition;
mod effect;
mod engine;
mod error;
mod registry;
mod router;
mod store;

pub use backend::{DefinitionBackend, MemoryBackend};
pub use condition::{Comparator, Condition, ConditionEvaluator, resolve_path};
pub use context::BuffContext;
pub use definition::{
    BuffDefinition, Effect, StackingRule, TargetScope, TargetSelector, Trigger,
};
pub use effect::{
    APPLY_BUFF, AppliedBuff, ApplyBuffParams, EffectExecutor, EffectHandler, EffectOutcome,
    EffectParams, REMOVE_BUFF, RemoveBuffParams,
};
pub use engine::{BuffEngine, DispatchMatch};
pub use error::{BuffError, ConfigError, EffectError, RegistryError, StorageError};
pub use registry::BuffRegistry;
pub use router::EventRouter;
pub use store::{BuffInstance, BuffStore, MODIFIERS_KEY};
