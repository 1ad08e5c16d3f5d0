//! State owned by one simulation instance.

use serde_json::Value;
use tracing::trace;

use crate::actor::Roster;
use crate::anomaly::{AnomalyError, AnomalyMachine, DotTracker, ElementType};
use crate::buff::{BuffContext, BuffEngine, BuffError, DispatchMatch};
use crate::config::SimConfig;
use crate::damage::{DamageModel, Modifiers, StandardDamageModel};
use crate::enemy::Enemy;
use crate::report::{MemorySink, ReportRecord, ReportSink};
use crate::types::Tick;

/// Everything a handler may read or mutate while a tick settles.
///
/// Each simulation builds its own world; nothing in it is shared with other
/// instances, so independent runs can execute on separate threads.
pub struct SimWorld {
    pub config: SimConfig,
    pub buffs: BuffEngine,
    pub anomalies: AnomalyMachine,
    pub dots: DotTracker,
    pub roster: Roster,
    pub enemy: Enemy,
    damage: Box<dyn DamageModel>,
    sink: Box<dyn ReportSink>,
}

/// What [`SimWorld::advance`] changed at the start of a tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AdvanceOutcome {
    pub purged_buffs: usize,
    pub expired_anomalies: Vec<ElementType>,
    pub expired_dots: usize,
}

impl SimWorld {
    pub fn new(config: SimConfig, buffs: BuffEngine) -> Self {
        let anomalies = AnomalyMachine::new(config.anomaly.clone());
        let dots = DotTracker::new(config.anomaly.clone());
        Self {
            config,
            buffs,
            anomalies,
            dots,
            roster: Roster::new(),
            enemy: Enemy::default(),
            damage: Box::new(StandardDamageModel),
            sink: Box::new(MemorySink::new()),
        }
    }

    pub fn with_roster(mut self, roster: Roster) -> Self {
        self.roster = roster;
        self
    }

    pub fn with_enemy(mut self, enemy: Enemy) -> Self {
        self.enemy = enemy;
        self
    }

    pub fn with_damage_model(mut self, model: impl DamageModel + 'static) -> Self {
        self.damage = Box::new(model);
        self
    }

    pub fn with_sink(mut self, sink: impl ReportSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn damage_model(&self) -> &dyn DamageModel {
        self.damage.as_ref()
    }

    /// Start-of-tick upkeep: buff decay, anomaly and dot expiry, stun recovery.
    pub fn advance(&mut self, tick: Tick) -> AdvanceOutcome {
        let purged_buffs = self.buffs.advance(self.config.buff_tick_delta);
        let expired_anomalies = self.anomalies.expire_due(tick);
        let expired_dots = self.dots.purge_expired(tick);
        self.enemy.advance(tick);
        AdvanceOutcome {
            purged_buffs,
            expired_anomalies,
            expired_dots,
        }
    }

    /// Builds a dispatch context with the actor's attributes and the team view.
    pub fn buff_context(&self, tick: Tick, event: Value, actor: Option<&str>) -> BuffContext {
        let mut context = BuffContext::new(tick, event).with_team(self.roster.team_view());
        if let Some(name) = actor {
            let attributes = self
                .roster
                .get(name)
                .map(|participant| participant.attributes())
                .unwrap_or(Value::Null);
            context = context.with_actor(name, attributes);
        }
        context
    }

    pub fn dispatch_buffs(
        &mut self,
        tick: Tick,
        trigger: &str,
        event: Value,
        actor: Option<&str>,
    ) -> Result<Vec<DispatchMatch>, BuffError> {
        let context = self.buff_context(tick, event, actor);
        self.buffs.dispatch(trigger, &context)
    }

    /// Modifier totals of `owner`'s live buffs.
    pub fn modifiers(&self, owner: Option<&str>) -> Modifiers {
        owner
            .map(|owner| self.buffs.store().modifier_totals(owner))
            .unwrap_or_default()
    }

    /// Stamps the current enemy status onto `record` and forwards it.
    ///
    /// Fails without recording when more than one anomaly is Active.
    pub fn report(&mut self, mut record: ReportRecord) -> Result<(), AnomalyError> {
        let active = self.anomalies.active_element()?;
        record.status = self.enemy.status(active);
        record.status.frozen = self.dots.is_frozen();
        trace!(
            target: "sim::report",
            tick = record.tick.0,
            kind = %record.kind,
            expected = record.expected,
            "damage recorded"
        );
        self.sink.record(record);
        Ok(())
    }

    pub fn flush_reports(&mut self) {
        self.sink.flush();
    }
}

impl Default for SimWorld {
    fn default() -> Self {
        Self::new(SimConfig::default(), BuffEngine::default())
    }
}

impl std::fmt::Debug for SimWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimWorld")
            .field("config", &self.config)
            .field("buffs", &self.buffs)
            .field("roster", &self.roster)
            .field("dots", &self.dots)
            .field("enemy", &self.enemy)
            .finish_non_exhaustive()
    }
}
