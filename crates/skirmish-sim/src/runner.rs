//! Runs a scenario at a fixed frame rate and collects a report.

use std::collections::BTreeMap;

use serde::Serialize;
use skirmish_gameplay::{Arena, ArenaSummary, GameEvent};
use tracing::{debug, info, warn};

use crate::scenario::Scenario;
use crate::script::InputScript;

/// Host frame rate.
pub const FRAME_RATE: f32 = 60.0;

/// Result of a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Scenario name
    pub scenario: String,
    /// Simulated seconds requested
    pub seconds: f32,
    /// Events seen, by kind
    pub events: BTreeMap<&'static str, usize>,
    /// Events lost to a full event bus
    pub dropped_events: usize,
    /// Final arena state
    pub arena: ArenaSummary,
}

/// Short name of an event kind.
fn event_kind(event: &GameEvent) -> &'static str {
    match event {
        GameEvent::ActorSpawned { .. } => "actor_spawned",
        GameEvent::ActorDeactivated { .. } => "actor_deactivated",
        GameEvent::ActorDamaged { .. } => "actor_damaged",
        GameEvent::ActorKilled { .. } => "actor_killed",
        GameEvent::CuePlayed { .. } => "cue_played",
        GameEvent::TargetAcquired { .. } => "target_acquired",
        GameEvent::TargetLost { .. } => "target_lost",
        GameEvent::ProjectileFired { .. } => "projectile_fired",
        GameEvent::ProjectileHit { .. } => "projectile_hit",
        GameEvent::ConfigDefect { .. } => "config_defect",
    }
}

fn log_event(arena: &Arena, time: f32, event: &GameEvent) {
    let name = |actor| arena.name(actor).unwrap_or("projectile");
    match event {
        GameEvent::ActorDamaged {
            target,
            source,
            amount,
            remaining,
        } => info!(
            "[{:6.2}] {} hit {} for {} ({} left)",
            time,
            name(*source),
            name(*target),
            amount,
            remaining
        ),
        GameEvent::ActorKilled { target, source } => {
            info!("[{:6.2}] {} killed {}", time, name(*source), name(*target));
        },
        GameEvent::TargetAcquired { enemy, target } => {
            info!("[{:6.2}] {} spotted {}", time, name(*enemy), name(*target));
        },
        GameEvent::TargetLost { enemy, target } => {
            info!("[{:6.2}] {} lost {}", time, name(*enemy), name(*target));
        },
        GameEvent::ConfigDefect { actor, defect } => {
            warn!("{}: {}", name(*actor), defect);
        },
        other => debug!("[{:6.2}] {:?}", time, other),
    }
}

/// Run `scenario` for `seconds` of simulated time.
pub fn run(scenario: Scenario, seconds: f32) -> RunReport {
    let mut arena = Arena::from_config(&scenario.arena);
    let mut script = InputScript::new(scenario.script);
    let mut events = BTreeMap::new();

    let frame_dt = 1.0 / FRAME_RATE;
    let frames = (seconds.max(0.0) * FRAME_RATE).ceil() as u64;
    info!(
        "Running {} for {}s ({} frames, {} script steps)",
        scenario.name,
        seconds,
        frames,
        script.len()
    );

    let mut collect = |arena: &Arena, time: f32| {
        for event in arena.drain_events() {
            log_event(arena, time, &event);
            *events.entry(event_kind(&event)).or_insert(0) += 1;
        }
    };

    collect(&arena, 0.0);
    for frame in 0..frames {
        let time = frame as f32 * frame_dt;
        let input = script.sample(time);
        arena.tick(frame_dt, &input);
        collect(&arena, time);
    }

    let dropped_events = arena.events().dropped_count();
    if dropped_events > 0 {
        warn!("{} events were dropped", dropped_events);
    }

    RunReport {
        scenario: scenario.name,
        seconds,
        events,
        dropped_events,
        arena: arena.summary(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_scenario_runs() {
        let scenario = Scenario::embedded().expect("embedded scenario");
        let report = run(scenario, 8.0);

        assert_eq!(report.events.get("actor_spawned"), Some(&4));
        assert!(report.events.get("target_acquired").is_some());
        assert_eq!(report.arena.actors.len(), 4);
        assert!(report.arena.frames >= 480);
        assert_eq!(report.dropped_events, 0);
    }

    #[test]
    fn test_zero_seconds_runs_nothing() {
        let scenario = Scenario::parse("empty", "").expect("empty scenario");
        let report = run(scenario, 0.0);

        // No [player] table means an enemies-only arena
        assert_eq!(report.arena.frames, 0);
        assert!(report.arena.actors.is_empty());
        assert!(report.events.is_empty());
    }
}
