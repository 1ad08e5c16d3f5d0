use crate::event::{Event, EventKind};
use crate::scheduler::{EventHandler, HandlerError, TickContext};

use super::{dispatch_buffs, skip, unexpected};

/// Applies resource updates to named participants.
#[derive(Debug, Clone, Copy)]
pub struct RefreshHandler;

impl EventHandler for RefreshHandler {
    fn kind(&self) -> EventKind {
        EventKind::Refresh
    }

    fn handle(&self, event: &Event, ctx: &mut TickContext<'_>) -> Result<(), HandlerError> {
        let Event::Refresh(refresh) = event else {
            return Err(unexpected(self.kind(), event));
        };
        let tick = ctx.tick();

        for update in &refresh.updates {
            match ctx.world.roster.get_mut(&update.participant) {
                Some(participant) => {
                    participant.update_resources(update.energy, update.decibel);
                    participant.notify(self.kind(), tick);
                }
                None => skip(ctx, self.kind(), &update.participant),
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DelayedAssistHandler;

impl EventHandler for DelayedAssistHandler {
    fn kind(&self) -> EventKind {
        EventKind::DelayedAssist
    }

    fn handle(&self, event: &Event, ctx: &mut TickContext<'_>) -> Result<(), HandlerError> {
        let Event::DelayedAssist(assist) = event else {
            return Err(unexpected(self.kind(), event));
        };
        let tick = ctx.tick();

        let Some(participant) = ctx.world.roster.get_mut(&assist.participant) else {
            skip(ctx, self.kind(), &assist.participant);
            return Ok(());
        };
        participant.notify(self.kind(), tick);

        dispatch_buffs(ctx, event, Some(&assist.participant))
    }
}

/// Fires a deferred action and queues its follow-up for the same tick.
#[derive(Debug, Clone, Copy)]
pub struct DelayedActionHandler;

impl EventHandler for DelayedActionHandler {
    fn kind(&self) -> EventKind {
        EventKind::DelayedAction
    }

    fn handle(&self, event: &Event, ctx: &mut TickContext<'_>) -> Result<(), HandlerError> {
        let Event::DelayedAction(action) = event else {
            return Err(unexpected(self.kind(), event));
        };
        let tick = ctx.tick();

        let Some(participant) = ctx.world.roster.get_mut(&action.actor) else {
            skip(ctx, self.kind(), &action.actor);
            return Ok(());
        };
        participant.notify(self.kind(), tick);

        dispatch_buffs(ctx, event, Some(&action.actor))?;
        if let Some(follow_up) = &action.follow_up {
            ctx.emit(follow_up.as_ref().clone());
        }
        Ok(())
    }
}
