//! Default handler for every event kind.
//!
//! Handlers settle their event against the [`SimWorld`](crate::world::SimWorld)
//! and emit follow-up events. A reference to an owner or buff that is gone is
//! logged and skipped; everything else propagates to the scheduler.

mod anomaly;
mod settlement;
mod skill;
mod special;
mod stun;
mod support;

pub use anomaly::{AnomalyHandler, DisorderHandler, DotTickHandler, PolarityDisorderHandler};
pub use settlement::BuffSettlementHandler;
pub use skill::SkillHitHandler;
pub use special::{SpecialActivationHandler, SpecialAssaultHandler};
pub use stun::ForcedTerminationHandler;
pub use support::{DelayedActionHandler, DelayedAssistHandler, RefreshHandler};

use serde_json::Value;
use tracing::warn;

use crate::event::{Event, EventKind};
use crate::scheduler::{EventHandler, HandlerError, HandlerRegistry, ScheduleError, TickContext};

/// Registry holding one handler per [`EventKind`].
pub fn default_handlers() -> Result<HandlerRegistry, ScheduleError> {
    let handlers: [Box<dyn EventHandler>; 12] = [
        Box::new(BuffSettlementHandler),
        Box::new(SkillHitHandler),
        Box::new(AnomalyHandler),
        Box::new(DisorderHandler),
        Box::new(PolarityDisorderHandler),
        Box::new(DotTickHandler),
        Box::new(SpecialActivationHandler),
        Box::new(SpecialAssaultHandler),
        Box::new(RefreshHandler),
        Box::new(DelayedAssistHandler),
        Box::new(DelayedActionHandler),
        Box::new(ForcedTerminationHandler),
    ];

    let mut registry = HandlerRegistry::new();
    for handler in handlers {
        registry.register(handler)?;
    }
    Ok(registry)
}

fn unexpected(expected: EventKind, event: &Event) -> HandlerError {
    HandlerError::UnexpectedEvent {
        expected,
        found: event.kind(),
    }
}

/// Logs a lookup miss; the event is dropped and the tick continues.
fn skip(ctx: &TickContext<'_>, kind: EventKind, missing: &str) {
    warn!(
        target: "sim::handlers",
        tick = ctx.tick().0,
        %kind,
        missing,
        "referenced entity not found, event skipped"
    );
}

/// Dispatches `event` to the buffs bound to its kind's trigger.
///
/// The event is exposed to conditions as `event.*`, with `event.type` set to
/// the trigger name.
fn dispatch_buffs(
    ctx: &mut TickContext<'_>,
    event: &Event,
    actor: Option<&str>,
) -> Result<(), HandlerError> {
    let trigger = event.kind().trigger();
    let mut encoded =
        serde_json::to_value(event).map_err(|e| HandlerError::Encode(e.to_string()))?;
    if let Value::Object(fields) = &mut encoded {
        fields.insert("type".into(), Value::from(trigger));
    }
    let tick = ctx.tick();
    ctx.world.dispatch_buffs(tick, trigger, encoded, actor)?;
    Ok(())
}

#[cfg(test)]
mod fixtures {
    use crate::actor::{BasicParticipant, CombatStats, Roster};
    use crate::anomaly::ElementType;
    use crate::config::SimConfig;
    use crate::event::{Event, EventKind, SkillHitEvent};
    use crate::report::{MemorySink, ReportRecord};
    use crate::scheduler::EventScheduler;
    use crate::world::SimWorld;

    /// Expected damage of a 1.0 ratio hit with default stats.
    pub const PLAIN_HIT: f64 = 1000.0 * (1.0 + 0.05 * 0.5);

    pub fn world(sink: &MemorySink) -> SimWorld {
        SimWorld::default()
            .with_roster(Roster::new().with(BasicParticipant::new("hero", CombatStats::default())))
            .with_sink(sink.clone())
    }

    pub fn scheduler() -> EventScheduler {
        EventScheduler::with_default_handlers(&SimConfig::default()).unwrap()
    }

    pub fn hit(element: ElementType, buildup: f64) -> Event {
        Event::SkillHit(
            SkillHitEvent::new("hero", "basic", element)
                .with_buildup(buildup)
                .with_stun(50.0),
        )
    }

    pub fn kinds(records: &[ReportRecord]) -> Vec<EventKind> {
        records.iter().map(|record| record.kind).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_a_default_handler() {
        let registry = default_handlers().unwrap();
        assert_eq!(registry.len(), EventKind::ALL.len());
        for kind in EventKind::ALL {
            assert!(registry.kinds().any(|k| k == kind));
        }
    }
}
