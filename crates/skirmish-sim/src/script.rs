//! Scripted player input.
//!
//! A script is a list of cues on a timeline. Axes are held for the cue's
//! duration; sprint/attack presses fire once, on the first frame at or after
//! the cue's start time.

use serde::{Deserialize, Serialize};
use skirmish_gameplay::PlayerInput;

/// One entry of an input script.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptStep {
    /// Start time (seconds)
    pub at: f32,
    /// How long the axes are held (seconds)
    pub duration: f32,
    /// Left/right axis
    pub horizontal: f32,
    /// Back/forward axis
    pub vertical: f32,
    /// Press sprint at `at`
    pub sprint: bool,
    /// Press attack at `at`
    pub attack: bool,
}

impl ScriptStep {
    fn holds_axes(&self, time: f32) -> bool {
        time >= self.at && time < self.at + self.duration
    }
}

/// Plays back a list of [`ScriptStep`]s.
#[derive(Debug, Clone)]
pub struct InputScript {
    steps: Vec<ScriptStep>,
    fired: Vec<bool>,
}

impl InputScript {
    /// Creates a script; steps are sorted by start time.
    pub fn new(mut steps: Vec<ScriptStep>) -> Self {
        steps.sort_by(|a, b| a.at.total_cmp(&b.at));
        let fired = vec![false; steps.len()];
        Self { steps, fired }
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Checks if the script has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Input for the frame starting at `time`.
    pub fn sample(&mut self, time: f32) -> PlayerInput {
        let mut input = PlayerInput::idle();

        for (step, fired) in self.steps.iter().zip(self.fired.iter_mut()) {
            if step.holds_axes(time) {
                input.horizontal = step.horizontal;
                input.vertical = step.vertical;
            }
            if !*fired && time >= step.at {
                *fired = true;
                input.sprint_pressed |= step.sprint;
                input.attack_pressed |= step.attack;
            }
        }

        input
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walk(at: f32, duration: f32, horizontal: f32) -> ScriptStep {
        ScriptStep {
            at,
            duration,
            horizontal,
            ..ScriptStep::default()
        }
    }

    #[test]
    fn test_axes_held_for_duration() {
        let mut script = InputScript::new(vec![walk(1.0, 0.5, 1.0)]);

        assert_eq!(script.sample(0.9).horizontal, 0.0);
        assert_eq!(script.sample(1.2).horizontal, 1.0);
        assert_eq!(script.sample(1.6).horizontal, 0.0);
    }

    #[test]
    fn test_presses_fire_once() {
        let mut script = InputScript::new(vec![ScriptStep {
            at: 0.5,
            attack: true,
            ..ScriptStep::default()
        }]);

        assert!(!script.sample(0.4).attack_pressed);
        assert!(script.sample(0.51).attack_pressed);
        assert!(!script.sample(0.6).attack_pressed);
    }

    #[test]
    fn test_later_step_overrides_axes() {
        let mut script = InputScript::new(vec![walk(1.0, 2.0, -1.0), walk(0.0, 2.0, 1.0)]);

        assert_eq!(script.sample(0.5).horizontal, 1.0);
        assert_eq!(script.sample(1.5).horizontal, -1.0);
        assert_eq!(script.len(), 2);
    }
}
