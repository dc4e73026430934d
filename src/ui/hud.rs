//! HUD model: health bar, score line and the game-over panel

use serde::Serialize;

use super::GameObserver;
use crate::sim::{GameState, Owner, World, count_fireballs};

/// Health bar color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HealthBand {
    /// Above half
    Healthy,
    /// Above a quarter
    Wounded,
    Critical,
}

impl HealthBand {
    pub fn for_percent(percent: f32) -> Self {
        if percent > 50.0 {
            HealthBand::Healthy
        } else if percent > 25.0 {
            HealthBand::Wounded
        } else {
            HealthBand::Critical
        }
    }
}

/// What the page shows, rebuilt from events
#[derive(Debug, Clone, Serialize)]
pub struct Hud {
    pub health: u8,
    pub max_health: u8,
    pub health_percent: f32,
    pub band: HealthBand,
    pub score: u64,
    pub score_text: String,
    /// Set once the game is over; cleared on restart
    pub final_score: Option<u64>,
    pub goblins: usize,
    pub player_fireballs: usize,
    pub enemy_fireballs: usize,
}

impl Hud {
    pub fn new(state: &GameState) -> Self {
        let mut hud = Self {
            health: 0,
            max_health: state.max_health,
            health_percent: 0.0,
            band: HealthBand::Critical,
            score: 0,
            score_text: String::new(),
            final_score: None,
            goblins: 0,
            player_fireballs: 0,
            enemy_fireballs: 0,
        };
        hud.health_changed(state.player_health);
        hud.score_changed(state.score);
        hud
    }

    /// Refresh the entity counters
    pub fn update_counts(&mut self, world: &World) {
        self.goblins = world.registry.goblin_count();
        self.player_fireballs = count_fireballs(world, Owner::Player);
        self.enemy_fireballs = count_fireballs(world, Owner::Enemy);
    }
}

impl GameObserver for Hud {
    fn health_changed(&mut self, health: u8) {
        self.health = health;
        self.health_percent = if self.max_health == 0 {
            0.0
        } else {
            f32::from(health) / f32::from(self.max_health) * 100.0
        };
        self.band = HealthBand::for_percent(self.health_percent);
        // Back above zero means a new session
        if health > 0 {
            self.final_score = None;
        }
    }

    fn score_changed(&mut self, score: u64) {
        self.score = score;
        self.score_text = format!("Score: {score}");
    }

    fn game_over(&mut self, score: u64) {
        self.final_score = Some(score);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;
    use crate::ui::notify;

    #[test]
    fn test_bands() {
        assert_eq!(HealthBand::for_percent(100.0), HealthBand::Healthy);
        assert_eq!(HealthBand::for_percent(50.0), HealthBand::Wounded);
        assert_eq!(HealthBand::for_percent(26.0), HealthBand::Wounded);
        assert_eq!(HealthBand::for_percent(25.0), HealthBand::Critical);
        assert_eq!(HealthBand::for_percent(0.0), HealthBand::Critical);
    }

    #[test]
    fn test_hud_follows_events() {
        let mut state = GameState::new(&Tuning::default());
        let mut hud = Hud::new(&state);
        assert_eq!(hud.health_percent, 100.0);
        assert_eq!(hud.score_text, "Score: 0");

        state.add_score(30);
        state.player_health = 20;
        state.damage(10);
        state.damage(10);
        for event in &state.events {
            notify(&mut hud, event);
        }
        assert_eq!(hud.score_text, "Score: 30");
        assert_eq!(hud.health, 0);
        assert_eq!(hud.band, HealthBand::Critical);
        assert_eq!(hud.final_score, Some(30));

        hud.health_changed(100);
        assert_eq!(hud.final_score, None);
    }
}
