//! Behavior arbitration: which procedural layers run and which gesture
//! plays, decided once per frame and otherwise reactive to trigger calls.

pub mod wander;

pub use wander::{Wander, WanderStep};

use crate::core::config::PuppetConfig;
use bevy::math::Vec3;

/// Current behavior of the puppet.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Behavior {
    /// Transient entry state; moves to wandering on the next update.
    Idle,
    /// Roaming between random targets. `walking` is the movement sub-state:
    /// true while the target is out of reach and the gait layer should run.
    Wandering { walking: bool },
    /// Conversing: wandering stops, base layers keep running.
    Talking,
    /// Pondering: wandering stops, layers run at reduced cadence.
    Thinking,
    /// Waving hello; returns to idle after the configured delay.
    Greeting { elapsed: f32 },
    /// Torn down; terminal.
    Disposed,
}

/// Per-frame layer directives derived from the behavior state.
#[derive(Clone, Copy, Debug)]
pub struct Directives {
    /// Whether the gait layer should run this frame.
    pub gait: bool,
    /// Whether idle sway may write the hip channel this frame.
    pub sway_hips: bool,
    /// Multiplier on the layer clocks.
    pub time_scale: f32,
}

/// The top-level behavior state machine. Does not own a render loop: it is
/// advanced once per external tick.
#[derive(Debug)]
pub struct BehaviorMachine {
    state: Behavior,
    wander: Wander,
    thinking_time_scale: f32,
    greeting_delay: f32,
}

impl BehaviorMachine {
    pub fn new(config: &PuppetConfig) -> Self {
        Self {
            state: Behavior::Idle,
            wander: Wander::new(config.wander.clone(), config.seed),
            thinking_time_scale: config.thinking_time_scale,
            greeting_delay: config.greeting_delay,
        }
    }

    pub fn behavior(&self) -> Behavior {
        self.state
    }

    pub fn body_position(&self) -> Vec3 {
        self.wander.position()
    }

    pub fn body_yaw(&self) -> f32 {
        self.wander.yaw()
    }

    pub fn wander(&self) -> &Wander {
        &self.wander
    }

    /// Resume idling (and with it, wandering).
    pub fn trigger_idle(&mut self) {
        if self.state != Behavior::Disposed {
            self.state = Behavior::Idle;
        }
    }

    pub fn trigger_talk(&mut self) {
        if self.state != Behavior::Disposed {
            self.state = Behavior::Talking;
        }
    }

    pub fn trigger_think(&mut self) {
        if self.state != Behavior::Disposed {
            self.state = Behavior::Thinking;
        }
    }

    pub fn trigger_greet(&mut self) {
        if self.state != Behavior::Disposed {
            self.state = Behavior::Greeting { elapsed: 0.0 };
        }
    }

    /// Terminal shutdown; no further transitions.
    pub fn shut_down(&mut self) {
        self.state = Behavior::Disposed;
    }

    /// Advance one tick and return the layer directives for this frame.
    pub fn update(&mut self, dt: f32) -> Directives {
        match self.state {
            Behavior::Idle => {
                self.state = Behavior::Wandering { walking: false };
            }
            Behavior::Wandering { .. } => {
                let walking = self.wander.advance(dt) == WanderStep::Moved;
                self.state = Behavior::Wandering { walking };
            }
            Behavior::Greeting { elapsed } => {
                let elapsed = elapsed + dt;
                if elapsed >= self.greeting_delay {
                    self.state = Behavior::Idle;
                } else {
                    self.state = Behavior::Greeting { elapsed };
                }
            }
            Behavior::Talking | Behavior::Thinking | Behavior::Disposed => {}
        }

        let walking = matches!(self.state, Behavior::Wandering { walking: true });
        Directives {
            gait: walking,
            sway_hips: !walking,
            time_scale: if self.state == Behavior::Thinking {
                self.thinking_time_scale
            } else {
                1.0
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine() -> BehaviorMachine {
        let config = PuppetConfig {
            seed: Some(11),
            ..Default::default()
        };
        BehaviorMachine::new(&config)
    }

    #[test]
    fn idle_starts_wandering_and_walking_enables_gait() {
        let mut machine = machine();
        assert_eq!(machine.behavior(), Behavior::Idle);

        // first update enters wandering; target is far, so we walk
        machine.update(0.016);
        let directives = machine.update(0.016);
        assert!(matches!(machine.behavior(), Behavior::Wandering { walking: true }));
        assert!(directives.gait);
        assert!(!directives.sway_hips);
    }

    #[test]
    fn talking_stops_wandering_but_keeps_layers_at_full_cadence() {
        let mut machine = machine();
        machine.update(0.016);
        machine.trigger_talk();
        let position = machine.body_position();

        let directives = machine.update(0.5);
        assert_eq!(machine.behavior(), Behavior::Talking);
        assert_eq!(machine.body_position(), position);
        assert!(!directives.gait);
        assert!(directives.sway_hips);
        assert_eq!(directives.time_scale, 1.0);
    }

    #[test]
    fn thinking_reduces_layer_cadence() {
        let mut machine = machine();
        machine.trigger_think();
        let directives = machine.update(0.016);
        assert_eq!(directives.time_scale, 0.5);
    }

    #[test]
    fn greeting_returns_to_idle_after_the_delay() {
        let mut machine = machine();
        machine.trigger_greet();

        let directives = machine.update(0.4);
        assert!(matches!(machine.behavior(), Behavior::Greeting { .. }));
        assert!(!directives.gait);

        machine.update(0.7);
        assert_eq!(machine.behavior(), Behavior::Idle);
        machine.update(0.016);
        assert!(matches!(machine.behavior(), Behavior::Wandering { .. }));
    }

    #[test]
    fn disposed_is_terminal() {
        let mut machine = machine();
        machine.shut_down();
        machine.trigger_talk();
        machine.trigger_greet();
        machine.update(1.0);
        assert_eq!(machine.behavior(), Behavior::Disposed);
    }

    #[test]
    fn wandering_moves_the_body_toward_the_target() {
        let mut machine = machine();
        machine.update(0.016);
        let before = machine.wander().distance_to_target();
        machine.update(0.1);
        assert!(machine.wander().distance_to_target() < before);
    }
}
