use crate::anomaly::AnomalyOutcome;
use crate::event::{DotTickEvent, Event, EventKind, ScheduledEvent};
use crate::report::ReportRecord;
use crate::scheduler::{EventHandler, HandlerError, TickContext};

use super::{dispatch_buffs, skip, unexpected};

/// Settles a landed hit: buffs, damage, stun, on-hit dots, then anomaly
/// buildup.
///
/// A resolved anomaly is emitted as follow-up events for the same tick; see
/// [`emit_resolution`] for their order.
#[derive(Debug, Clone, Copy)]
pub struct SkillHitHandler;

impl EventHandler for SkillHitHandler {
    fn kind(&self) -> EventKind {
        EventKind::SkillHit
    }

    fn handle(&self, event: &Event, ctx: &mut TickContext<'_>) -> Result<(), HandlerError> {
        let Event::SkillHit(hit) = event else {
            return Err(unexpected(self.kind(), event));
        };
        let tick = ctx.tick();

        let Some(stats) = ctx.world.roster.get(&hit.attacker).map(|p| p.stats()) else {
            skip(ctx, self.kind(), &hit.attacker);
            return Ok(());
        };

        dispatch_buffs(ctx, event, Some(&hit.attacker))?;

        let modifiers = ctx.world.modifiers(Some(&hit.attacker));
        let damage = ctx.world.damage_model().hit(&stats, hit.ratio, &modifiers);
        ctx.world.enemy.add_stun(hit.stun, tick);
        ctx.world.report(
            ReportRecord::new(tick, self.kind(), hit.element, damage)
                .with_source(Some(hit.attacker.clone()))
                .with_label(&hit.skill_id)
                .with_stun(hit.stun, hit.buildup),
        )?;

        // Dots already on the target answer the hit before it can replace them.
        for (serial, element) in ctx.world.dots.on_hit(tick) {
            ctx.emit(Event::DotTick(DotTickEvent { element, serial }));
        }

        let outcome = ctx.world.anomalies.accumulate(
            hit.element,
            hit.buildup,
            &stats.snapshot(),
            tick,
            Some(hit.attacker.clone()),
        )?;
        if let Some(outcome) = outcome {
            emit_resolution(ctx, outcome);
        }

        if let Some(participant) = ctx.world.roster.get_mut(&hit.attacker) {
            participant.notify(self.kind(), tick);
        }
        Ok(())
    }
}

/// Emits a bar resolution in settlement order: shatters released by the
/// disorder, the disorder, a shatter released by a re-freeze, then the
/// activation itself unless a freeze holds it back. The new dot's first
/// settlement is scheduled last.
fn emit_resolution(ctx: &mut TickContext<'_>, outcome: AnomalyOutcome) {
    let tick = ctx.tick();
    let activation = match outcome {
        AnomalyOutcome::Activated(activation) => activation,
        AnomalyOutcome::Disordered {
            disorder,
            activation,
        } => {
            for shatter in ctx.world.dots.clear_for_disorder(&disorder) {
                ctx.emit(Event::AnomalyActivation(shatter));
            }
            ctx.emit(Event::Disorder(disorder));
            activation
        }
    };

    let element = activation.element;
    let start = ctx.world.dots.start(&activation, tick);
    if let Some(shatter) = start.released {
        ctx.emit(Event::AnomalyActivation(shatter));
    }
    if !start.deferred {
        ctx.emit(Event::AnomalyActivation(activation));
    }
    if let Some((serial, at)) = start.next {
        ctx.emit(ScheduledEvent::at(
            Event::DotTick(DotTickEvent { element, serial }),
            at,
        ));
    }
}
