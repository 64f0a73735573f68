//! Cues and the event bus for inter-system communication.

use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_channel::{bounded, Receiver, Sender};
use serde::{Deserialize, Serialize};
use tracing::warn;

use skirmish_common::ActorId;

/// Animation/audio trigger requested by the core.
///
/// The host maps cues onto whatever its animator or audio system expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cue {
    /// An attack started (melee swing, ranged shot)
    Attack,
    /// Non-lethal damage was taken
    Damage,
    /// The actor died
    Die,
    /// Sprint flag set (`true`) or cleared (`false`)
    Sprint(bool),
    /// Death blink: normal look (`true`) or tinted (`false`)
    Blink(bool),
}

/// Event types that can be sent through the event bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Actor spawned
    ActorSpawned {
        /// Actor ID
        actor: ActorId,
    },
    /// Actor deactivated after its death sequence, or a projectile removed
    ActorDeactivated {
        /// Actor ID
        actor: ActorId,
    },
    /// Actor took damage and survived
    ActorDamaged {
        /// Damaged actor
        target: ActorId,
        /// Source actor
        source: ActorId,
        /// Damage amount
        amount: f32,
        /// Health left after the hit
        remaining: f32,
    },
    /// Actor health reached zero
    ActorKilled {
        /// Killed actor
        target: ActorId,
        /// Source actor
        source: ActorId,
    },
    /// A cue was played on an actor
    CuePlayed {
        /// Actor ID
        actor: ActorId,
        /// The cue
        cue: Cue,
    },
    /// An enemy acquired a chase target
    TargetAcquired {
        /// Enemy actor
        enemy: ActorId,
        /// Target actor
        target: ActorId,
    },
    /// An enemy lost its chase target
    TargetLost {
        /// Enemy actor
        enemy: ActorId,
        /// Target actor
        target: ActorId,
    },
    /// A projectile was launched
    ProjectileFired {
        /// Shooter
        owner: ActorId,
        /// Projectile actor
        projectile: ActorId,
    },
    /// A projectile struck a target
    ProjectileHit {
        /// Projectile actor
        projectile: ActorId,
        /// Struck actor
        target: ActorId,
    },
    /// A configuration defect was detected at spawn time
    ConfigDefect {
        /// Actor the defect belongs to
        actor: ActorId,
        /// Human-readable description
        defect: String,
    },
}

/// Event bus for broadcasting events to subscribers.
#[derive(Debug)]
pub struct EventBus {
    /// Sender for broadcasting events
    sender: Sender<GameEvent>,
    /// Receiver for collecting events
    receiver: Receiver<GameEvent>,
    /// Events lost to a full channel
    dropped: AtomicUsize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(4096)
    }
}

impl EventBus {
    /// Creates a new event bus with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            dropped: AtomicUsize::new(0),
        }
    }

    /// Publishes an event to the bus.
    ///
    /// Never blocks; when the bus is full the event is dropped and counted.
    pub fn publish(&self, event: GameEvent) {
        if let Err(err) = self.sender.try_send(event) {
            let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
            warn!("Event bus full, dropped {:?} ({} total)", err.into_inner(), dropped);
        }
    }

    /// Drains all pending events.
    pub fn drain(&self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.receiver.try_recv() {
            events.push(event);
        }
        events
    }

    /// Number of events dropped because the bus was full.
    #[must_use]
    pub fn dropped_count(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_bus_drain_in_order() {
        let bus = EventBus::new(8);
        let actor = ActorId::new();

        bus.publish(GameEvent::CuePlayed {
            actor,
            cue: Cue::Attack,
        });
        bus.publish(GameEvent::ActorDeactivated { actor });

        let events = bus.drain();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], GameEvent::CuePlayed { cue: Cue::Attack, .. }));
        assert!(bus.drain().is_empty());
    }

    #[test]
    fn test_event_bus_drops_when_full() {
        let bus = EventBus::new(1);
        let actor = ActorId::new();

        bus.publish(GameEvent::ActorSpawned { actor });
        bus.publish(GameEvent::ActorSpawned { actor });

        assert_eq!(bus.drain().len(), 1);
        assert_eq!(bus.dropped_count(), 1);

        bus.publish(GameEvent::ActorSpawned { actor });
        assert_eq!(bus.dropped_count(), 1);
    }
}
