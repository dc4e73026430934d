//! UI side of the event queue
//!
//! The simulation never reads UI state back; observers only receive what
//! happened this frame.

pub mod hud;
pub mod radar;

pub use hud::{HealthBand, Hud};
pub use radar::{Blip, Radar};

use crate::sim::GameEvent;

/// Receives scoreboard changes. Every method defaults to doing nothing.
pub trait GameObserver {
    fn health_changed(&mut self, _health: u8) {}
    fn score_changed(&mut self, _score: u64) {}
    fn game_over(&mut self, _score: u64) {}
}

/// Route one event to the matching observer method
pub fn notify(observer: &mut dyn GameObserver, event: &GameEvent) {
    match *event {
        GameEvent::HealthChanged(health) => observer.health_changed(health),
        GameEvent::ScoreChanged(score) => observer.score_changed(score),
        GameEvent::GameOver { score } => observer.game_over(score),
        _ => {}
    }
}

/// Fan-out to injected observers
#[derive(Default)]
pub struct EventBus {
    observers: Vec<Box<dyn GameObserver>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: Box<dyn GameObserver>) {
        self.observers.push(observer);
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn dispatch(&mut self, events: &[GameEvent]) {
        for observer in &mut self.observers {
            for event in events {
                notify(observer.as_mut(), event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::sim::EntityId;

    #[derive(Default)]
    struct Log(Rc<RefCell<Vec<String>>>);

    impl GameObserver for Log {
        fn health_changed(&mut self, health: u8) {
            self.0.borrow_mut().push(format!("health {health}"));
        }
        fn game_over(&mut self, score: u64) {
            self.0.borrow_mut().push(format!("over {score}"));
        }
    }

    #[test]
    fn test_bus_routes_scoreboard_events() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();
        bus.subscribe(Box::new(Log(seen.clone())));
        assert_eq!(bus.len(), 1);

        bus.dispatch(&[
            GameEvent::HealthChanged(90),
            GameEvent::ScoreChanged(10),
            GameEvent::Despawned { id: EntityId::PLAYER },
            GameEvent::GameOver { score: 10 },
        ]);

        // Score uses the default no-op; entity events are not UI business
        assert_eq!(*seen.borrow(), vec!["health 90", "over 10"]);
    }
}
