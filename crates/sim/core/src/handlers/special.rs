use crate::event::{Event, EventKind};
use crate::report::ReportRecord;
use crate::scheduler::{EventHandler, HandlerError, TickContext};

use super::{dispatch_buffs, skip, unexpected};

/// Extra settlement of the Active anomaly at a ratio of its full damage.
#[derive(Debug, Clone, Copy)]
pub struct SpecialActivationHandler;

impl EventHandler for SpecialActivationHandler {
    fn kind(&self) -> EventKind {
        EventKind::SpecialActivation
    }

    fn handle(&self, event: &Event, ctx: &mut TickContext<'_>) -> Result<(), HandlerError> {
        let Event::SpecialActivation(special) = event else {
            return Err(unexpected(self.kind(), event));
        };
        let tick = ctx.tick();

        let Some(element) = ctx.world.anomalies.active_element()? else {
            skip(ctx, self.kind(), "active anomaly");
            return Ok(());
        };
        let snapshot = ctx.world.anomalies.bar(element).active_snapshot;

        dispatch_buffs(ctx, event, Some(&special.source))?;

        let modifiers = ctx.world.modifiers(Some(&special.source));
        let damage = ctx
            .world
            .damage_model()
            .special_activation(element, &snapshot, special.ratio, &modifiers);
        ctx.world.report(
            ReportRecord::new(tick, self.kind(), element, damage)
                .with_source(Some(special.source.clone()))
                .with_label(format!("special:{}", element.anomaly_name())),
        )?;
        Ok(())
    }
}

/// Turns the Active anomaly into a polarity disorder without retiring it.
#[derive(Debug, Clone, Copy)]
pub struct SpecialAssaultHandler;

impl EventHandler for SpecialAssaultHandler {
    fn kind(&self) -> EventKind {
        EventKind::SpecialAssault
    }

    fn handle(&self, event: &Event, ctx: &mut TickContext<'_>) -> Result<(), HandlerError> {
        let Event::SpecialAssault(assault) = event else {
            return Err(unexpected(self.kind(), event));
        };
        let tick = ctx.tick();

        let record =
            ctx.world
                .anomalies
                .polarity_disorder(assault.ratio, tick, Some(assault.source.clone()))?;
        match record {
            Some(record) => ctx.emit(Event::PolarityDisorder(record)),
            None => skip(ctx, self.kind(), "active anomaly"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anomaly::ElementType;
    use crate::event::{ScheduledEvent, SpecialActivationEvent, SpecialAssaultEvent};
    use crate::handlers::fixtures::{hit, scheduler, world};
    use crate::report::MemorySink;
    use crate::types::Tick;

    #[test]
    fn special_activation_scales_the_active_anomaly() {
        let sink = MemorySink::new();
        let mut world = world(&sink);
        let mut scheduler = scheduler();
        scheduler.schedule(hit(ElementType::Ether, 600.0));
        scheduler.schedule(ScheduledEvent::at(
            Event::SpecialActivation(SpecialActivationEvent {
                source: "hero".into(),
                ratio: 0.5,
            }),
            Tick(3),
        ));

        scheduler.settle(Tick(0), &mut world).unwrap();
        scheduler.settle(Tick(3), &mut world).unwrap();

        let records = sink.records();
        assert_eq!(records.len(), 3);
        assert_eq!(records[2].kind, EventKind::SpecialActivation);
        assert_eq!(records[2].label, "special:corruption");
        assert!((records[2].expected - records[1].expected * 0.5).abs() < 1e-6);
    }

    #[test]
    fn special_assault_needs_an_active_anomaly() {
        let sink = MemorySink::new();
        let mut world = world(&sink);
        let mut scheduler = scheduler();
        let assault = || {
            Event::SpecialAssault(SpecialAssaultEvent {
                source: "hero".into(),
                ratio: 0.5,
            })
        };

        scheduler.schedule(assault());
        scheduler.settle(Tick(0), &mut world).unwrap();
        assert!(sink.is_empty());

        scheduler.schedule(ScheduledEvent::at(hit(ElementType::Electric, 600.0), Tick(1)));
        scheduler.schedule(ScheduledEvent::at(assault(), Tick(2)));
        scheduler.settle(Tick(1), &mut world).unwrap();
        scheduler.settle(Tick(2), &mut world).unwrap();

        let records = sink.records();
        assert_eq!(records.last().map(|r| r.kind), Some(EventKind::PolarityDisorder));
        assert_eq!(
            records.last().map(|r| r.label.as_str()),
            Some("polarity_disorder:shock")
        );
        assert_eq!(world.anomalies.active_element().unwrap(), Some(ElementType::Electric));
    }
}
