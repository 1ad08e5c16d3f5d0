use tracing::debug;

use crate::event::{Event, EventKind};
use crate::scheduler::{EventHandler, HandlerError, TickContext};

use super::{skip, unexpected};

/// Applies a buff the driver already resolved for this tick.
#[derive(Debug, Clone, Copy)]
pub struct BuffSettlementHandler;

impl EventHandler for BuffSettlementHandler {
    fn kind(&self) -> EventKind {
        EventKind::BuffSettlement
    }

    fn handle(&self, event: &Event, ctx: &mut TickContext<'_>) -> Result<(), HandlerError> {
        let Event::BuffSettlement(settlement) = event else {
            return Err(unexpected(self.kind(), event));
        };

        match ctx.world.buffs.apply(&settlement.buff_id, &settlement.owner) {
            Ok(stacks) => {
                debug!(
                    target: "sim::handlers",
                    tick = ctx.tick().0,
                    buff_id = %settlement.buff_id,
                    owner = %settlement.owner,
                    stacks,
                    "buff settled"
                );
                Ok(())
            }
            Err(err) if err.is_lookup_miss() => {
                skip(ctx, self.kind(), &settlement.buff_id);
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::anomaly::ElementType;
    use crate::buff::{BuffDefinition, Trigger};
    use crate::event::BuffSettlementEvent;
    use crate::handlers::fixtures::{PLAIN_HIT, hit, scheduler, world};
    use crate::report::MemorySink;
    use crate::types::Tick;

    fn settle(buff_id: &str) -> Event {
        Event::BuffSettlement(BuffSettlementEvent {
            buff_id: buff_id.into(),
            owner: "hero".into(),
        })
    }

    #[test]
    fn buff_settlement_lands_before_same_tick_hits() {
        let sink = MemorySink::new();
        let mut world = world(&sink);
        world
            .buffs
            .register_definition(
                BuffDefinition::new("buff.edge", "Edge")
                    .with_trigger(Trigger::new("buff.settle"))
                    .with_metadata("modifiers", json!({ "damage_bonus": 0.5 })),
            )
            .unwrap();
        let mut scheduler = scheduler();
        scheduler.schedule(hit(ElementType::Physical, 0.0));
        scheduler.schedule(settle("buff.edge"));

        scheduler.settle(Tick(0), &mut world).unwrap();
        assert_eq!(world.buffs.store().stacks_of("hero", "buff.edge"), 1);
        assert!((sink.records()[0].expected - PLAIN_HIT * 1.5).abs() < 1e-9);
    }

    #[test]
    fn settlement_of_unknown_buff_is_skipped() {
        let sink = MemorySink::new();
        let mut world = world(&sink);
        let mut scheduler = scheduler();
        scheduler.schedule(settle("buff.gone"));

        scheduler.settle(Tick(0), &mut world).unwrap();
        assert!(world.buffs.store().is_empty());
    }
}
