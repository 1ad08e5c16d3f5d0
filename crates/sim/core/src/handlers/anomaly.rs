use tracing::debug;

use crate::anomaly::DotEffect;
use crate::event::{Event, EventKind, ScheduledEvent};
use crate::report::ReportRecord;
use crate::scheduler::{EventHandler, HandlerError, TickContext};

use super::{dispatch_buffs, unexpected};

/// Settles the damage of an activated or refreshed anomaly.
#[derive(Debug, Clone, Copy)]
pub struct AnomalyHandler;

impl EventHandler for AnomalyHandler {
    fn kind(&self) -> EventKind {
        EventKind::AnomalyActivation
    }

    fn handle(&self, event: &Event, ctx: &mut TickContext<'_>) -> Result<(), HandlerError> {
        let Event::AnomalyActivation(activation) = event else {
            return Err(unexpected(self.kind(), event));
        };
        let tick = ctx.tick();
        let source = activation.source.as_deref();

        dispatch_buffs(ctx, event, source)?;

        let modifiers = ctx.world.modifiers(source);
        let damage = ctx.world.damage_model().anomaly(activation, &modifiers);
        ctx.world.report(
            ReportRecord::new(tick, self.kind(), activation.element, damage)
                .with_source(activation.source.clone())
                .with_label(activation.element.anomaly_name()),
        )?;
        Ok(())
    }
}

/// Settles the damage of a retired anomaly.
#[derive(Debug, Clone, Copy)]
pub struct DisorderHandler;

impl EventHandler for DisorderHandler {
    fn kind(&self) -> EventKind {
        EventKind::Disorder
    }

    fn handle(&self, event: &Event, ctx: &mut TickContext<'_>) -> Result<(), HandlerError> {
        let Event::Disorder(disorder) = event else {
            return Err(unexpected(self.kind(), event));
        };
        let tick = ctx.tick();
        let source = disorder.source.as_deref();

        dispatch_buffs(ctx, event, source)?;

        let modifiers = ctx.world.modifiers(source);
        let damage = ctx.world.damage_model().disorder(disorder, &modifiers);
        ctx.world.report(
            ReportRecord::new(tick, self.kind(), disorder.retiring, damage)
                .with_source(disorder.source.clone())
                .with_label(format!(
                    "disorder:{}>{}",
                    disorder.retiring.anomaly_name(),
                    disorder.activating.anomaly_name()
                )),
        )?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PolarityDisorderHandler;

impl EventHandler for PolarityDisorderHandler {
    fn kind(&self) -> EventKind {
        EventKind::PolarityDisorder
    }

    fn handle(&self, event: &Event, ctx: &mut TickContext<'_>) -> Result<(), HandlerError> {
        let Event::PolarityDisorder(record) = event else {
            return Err(unexpected(self.kind(), event));
        };
        let tick = ctx.tick();
        let source = record.source.as_deref();

        dispatch_buffs(ctx, event, source)?;

        let modifiers = ctx.world.modifiers(source);
        let damage = ctx.world.damage_model().polarity_disorder(record, &modifiers);
        ctx.world.report(
            ReportRecord::new(tick, self.kind(), record.element, damage)
                .with_source(record.source.clone())
                .with_label(format!("polarity_disorder:{}", record.element.anomaly_name())),
        )?;
        Ok(())
    }
}

/// Settles one scheduled dot: a periodic or on-hit tick, or the shatter
/// that ends a freeze.
///
/// Ticks of a dot that was replaced or removed settle nothing.
#[derive(Debug, Clone, Copy)]
pub struct DotTickHandler;

impl EventHandler for DotTickHandler {
    fn kind(&self) -> EventKind {
        EventKind::DotTick
    }

    fn handle(&self, event: &Event, ctx: &mut TickContext<'_>) -> Result<(), HandlerError> {
        let Event::DotTick(dot) = event else {
            return Err(unexpected(self.kind(), event));
        };
        let tick = ctx.tick();

        let Some(effect) = ctx.world.dots.settle(dot.serial, tick) else {
            debug!(
                target: "sim::handlers",
                tick = tick.0,
                serial = dot.serial,
                element = %dot.element,
                "stale dot tick"
            );
            return Ok(());
        };

        match effect {
            DotEffect::Shatter(activation) => ctx.emit(Event::AnomalyActivation(activation)),
            DotEffect::Tick { activation, next } => {
                let source = activation.source.as_deref();
                dispatch_buffs(ctx, event, source)?;

                let modifiers = ctx.world.modifiers(source);
                let damage = ctx.world.damage_model().dot_tick(&activation, &modifiers);
                ctx.world.report(
                    ReportRecord::new(tick, self.kind(), activation.element, damage)
                        .with_source(activation.source.clone())
                        .with_label(format!("{}:tick", activation.element.anomaly_name())),
                )?;
                if let Some(next) = next {
                    ctx.emit(ScheduledEvent::at(event.clone(), next));
                }
            }
        }
        Ok(())
    }
}
