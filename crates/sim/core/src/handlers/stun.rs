use tracing::info;

use crate::event::{Event, EventKind};
use crate::scheduler::{EventHandler, HandlerError, TickContext};

use super::{dispatch_buffs, unexpected};

#[derive(Debug, Clone, Copy)]
pub struct ForcedTerminationHandler;

impl EventHandler for ForcedTerminationHandler {
    fn kind(&self) -> EventKind {
        EventKind::ForcedTermination
    }

    fn handle(&self, event: &Event, ctx: &mut TickContext<'_>) -> Result<(), HandlerError> {
        let Event::ForcedTermination(termination) = event else {
            return Err(unexpected(self.kind(), event));
        };

        if ctx.world.enemy.end_stun() {
            info!(
                target: "sim::handlers",
                tick = ctx.tick().0,
                reason = %termination.reason,
                "stun terminated early"
            );
            dispatch_buffs(ctx, event, None)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anomaly::ElementType;
    use crate::event::{ForcedTerminationEvent, ScheduledEvent, SkillHitEvent};
    use crate::handlers::fixtures::{scheduler, world};
    use crate::report::MemorySink;
    use crate::types::Tick;

    #[test]
    fn forced_termination_ends_stun() {
        let sink = MemorySink::new();
        let mut world = world(&sink);
        let mut scheduler = scheduler();
        scheduler.schedule(Event::SkillHit(
            SkillHitEvent::new("hero", "heavy", ElementType::Physical).with_stun(1000.0),
        ));
        scheduler.settle(Tick(0), &mut world).unwrap();
        assert!(world.enemy.is_stunned());
        assert!(sink.records()[0].status.stunned);

        scheduler.schedule(ScheduledEvent::at(
            Event::ForcedTermination(ForcedTerminationEvent {
                reason: "boss phase".into(),
            }),
            Tick(5),
        ));
        scheduler.settle(Tick(5), &mut world).unwrap();
        assert!(!world.enemy.is_stunned());
    }
}
