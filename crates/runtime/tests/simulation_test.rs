use std::sync::Arc;

use runtime::{
    CancelFlag, FileDefinitionBackend, JsonlReportSink, RuntimeError, Scenario, Simulation,
    SweepJob, TimelineEntry, run_sweep,
};
use serde_json::json;
use sim_core::event::{BuffSettlementEvent, SkillHitEvent};
use sim_core::{
    BasicParticipant, BuffDefinition, BuffRegistry, CombatStats, Effect, ElementType, Event,
    EventKind, ReportRecord, SimConfig, Tick, Trigger,
};

fn hero(attack: f64) -> BasicParticipant {
    BasicParticipant::new(
        "hero",
        CombatStats {
            attack,
            ..CombatStats::default()
        },
    )
}

fn fire_hit(buildup: f64) -> Event {
    Event::SkillHit(SkillHitEvent::new("hero", "basic", ElementType::Fire).with_buildup(buildup))
}

fn scenario(attack: f64) -> Scenario {
    Scenario::default()
        .with_participant(hero(attack))
        .with_definition(
            BuffDefinition::new("buff.edge", "Edge")
                .with_duration(10.0)
                .with_trigger(Trigger::new("buff.settle"))
                .with_metadata("modifiers", json!({ "damage_bonus": 0.25 })),
        )
        .with_entry(TimelineEntry::new(
            Tick(0),
            Event::BuffSettlement(BuffSettlementEvent {
                buff_id: "buff.edge".into(),
                owner: "hero".into(),
            }),
        ))
        .with_entry(TimelineEntry::new(Tick(0), fire_hit(300.0)))
        .with_entry(TimelineEntry::new(Tick(1), fire_hit(300.0)))
}

#[test]
fn definitions_survive_reopening_the_store() {
    let dir = tempfile::tempdir().unwrap();

    {
        let backend = FileDefinitionBackend::new(dir.path()).unwrap();
        let mut registry = BuffRegistry::open(Box::new(backend)).unwrap();
        registry
            .register(
                BuffDefinition::new("buff.focus", "Focus")
                    .with_trigger(Trigger::new("skill.hit"))
                    .with_effect(Effect::new("apply_buff")),
            )
            .unwrap();
        registry
            .register(BuffDefinition::new("buff.calm", "Calm").with_trigger(Trigger::new("skill.hit")))
            .unwrap();
        assert!(registry.delete("buff.calm").unwrap());
    }

    let backend = FileDefinitionBackend::new(dir.path()).unwrap();
    let registry = BuffRegistry::open(Box::new(backend)).unwrap();
    assert!(registry.contains("buff.focus"));
    assert!(!registry.contains("buff.calm"));
    assert_eq!(registry.event_index()["skill.hit"], ["buff.focus"]);
}

#[test]
fn run_writes_jsonl_reports() {
    let dir = tempfile::tempdir().unwrap();
    let report_path = dir.path().join("report.jsonl");
    let config = SimConfig::default();
    let scenario = scenario(1000.0);

    let world = scenario
        .build_world(&config, BuffRegistry::in_memory())
        .unwrap()
        .with_sink(JsonlReportSink::create(&report_path).unwrap());
    let mut simulation = Simulation::new(world, scenario.timeline()).unwrap();
    let summary = simulation.run(4, &CancelFlag::new()).unwrap();
    assert_eq!(summary.ticks, 4);
    assert_eq!(summary.processed, 4);

    let records: Vec<ReportRecord> = std::fs::read_to_string(&report_path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    let kinds: Vec<_> = records.iter().map(|r| (r.tick, r.kind)).collect();
    assert_eq!(
        kinds,
        [
            (Tick(0), EventKind::SkillHit),
            (Tick(1), EventKind::SkillHit),
            (Tick(1), EventKind::AnomalyActivation),
        ]
    );
    assert_eq!(records[2].status.active_anomaly, Some(ElementType::Fire));
    assert_eq!(
        simulation
            .world()
            .buffs
            .store()
            .stacks_of("hero", "buff.edge"),
        1
    );
}

#[tokio::test]
async fn sweep_runs_independent_jobs_in_order() {
    let jobs = vec![
        SweepJob::new("weak", Arc::new(scenario(1000.0)), 4),
        SweepJob::new("strong", Arc::new(scenario(2000.0)), 4),
    ];

    let results = run_sweep(jobs, CancelFlag::new()).await.unwrap();
    let names: Vec<_> = results.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["weak", "strong"]);

    for result in &results {
        assert_eq!(result.totals.records, 3);
        assert_eq!(result.totals.anomalies, 1);
        assert!(!result.summary.cancelled);
    }
    let ratio = results[1].totals.expected / results[0].totals.expected;
    assert!((ratio - 2.0).abs() < 1e-9);
}

#[tokio::test]
async fn cancelled_sweep_settles_nothing() {
    let cancel = CancelFlag::new();
    cancel.cancel();
    let jobs = vec![SweepJob::new("only", Arc::new(scenario(1000.0)), 100)];

    let results = run_sweep(jobs, cancel).await.unwrap();
    assert!(results[0].summary.cancelled);
    assert_eq!(results[0].summary.ticks, 0);
    assert_eq!(results[0].totals.records, 0);
}

#[tokio::test]
async fn failing_job_fails_the_sweep() {
    let broken = scenario(1000.0).with_definition(BuffDefinition::new("buff.bad", "No trigger"));
    let jobs = vec![
        SweepJob::new("ok", Arc::new(scenario(1000.0)), 2),
        SweepJob::new("broken", Arc::new(broken), 2),
    ];

    let err = run_sweep(jobs, CancelFlag::new()).await.unwrap_err();
    assert!(matches!(err, RuntimeError::Registry(_)));
}
