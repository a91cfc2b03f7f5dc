//! Numeric field with increment/decrement buttons
//!
//! Pressing a button applies one step right away. Holding it repeats the
//! step at a fixed interval once an initial delay has passed, until the
//! button is released.

use std::time::Duration;

use bevy::prelude::*;

use crate::io::import::lenient_number;

/// Which way a stepper button moves the value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDirection {
    Up,
    Down,
}

#[derive(Debug, Clone)]
struct HoldRepeat {
    direction: StepDirection,
    delay: Timer,
    repeat: Option<Timer>,
}

/// Bounds, step size and hold-to-repeat state of one numeric field
#[derive(Debug, Clone)]
pub struct NumberStepper {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: f64,
    hold_delay: Duration,
    repeat_interval: Duration,
    hold: Option<HoldRepeat>,
}

impl NumberStepper {
    pub fn new(step: f64, hold_delay: Duration, repeat_interval: Duration) -> Self {
        Self {
            min: None,
            max: None,
            step,
            hold_delay,
            repeat_interval,
            hold: None,
        }
    }

    pub fn with_min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn with_max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn clamp(&self, value: f64) -> f64 {
        let mut result = value;
        if let Some(min) = self.min {
            result = result.max(min);
        }
        if let Some(max) = self.max {
            result = result.min(max);
        }
        result
    }

    /// One step from `value`, clamped.
    pub fn step(&self, value: f64, direction: StepDirection) -> f64 {
        match direction {
            StepDirection::Up => self.clamp(value + self.step),
            StepDirection::Down => self.clamp(value - self.step),
        }
    }

    /// Whether a button in `direction` can still move `value`
    pub fn can_step(&self, value: f64, direction: StepDirection) -> bool {
        match direction {
            StepDirection::Up => self.max.is_none_or(|max| value < max),
            StepDirection::Down => self.min.is_none_or(|min| value > min),
        }
    }

    /// Button pressed: apply one step now and start the hold timer.
    pub fn press(&mut self, value: f64, direction: StepDirection) -> f64 {
        self.hold = Some(HoldRepeat {
            direction,
            delay: Timer::new(self.hold_delay, TimerMode::Once),
            repeat: None,
        });
        self.step(value, direction)
    }

    /// Advance the hold timer. Returns the new value when one or more
    /// repeats fired during `delta`.
    pub fn tick(&mut self, value: f64, delta: Duration) -> Option<f64> {
        let repeat_interval = self.repeat_interval;
        let hold = self.hold.as_mut()?;

        let Some(repeat) = hold.repeat.as_mut() else {
            hold.delay.tick(delta);
            if hold.delay.finished() {
                hold.repeat = Some(Timer::new(repeat_interval, TimerMode::Repeating));
            }
            return None;
        };

        repeat.tick(delta);
        let fired = repeat.times_finished_this_tick();
        if fired == 0 {
            return None;
        }
        let direction = hold.direction;
        let mut next = value;
        for _ in 0..fired {
            next = self.step(next, direction);
        }
        Some(next)
    }

    /// Button released, or the pointer left it
    pub fn release(&mut self) {
        self.hold = None;
    }

    /// Value for free text typed into the field: the leading number, clamped,
    /// or `current` when the text does not start with a number.
    pub fn parse_input(&self, text: &str, current: f64) -> f64 {
        match lenient_number(text) {
            Some(parsed) => self.clamp(parsed),
            None => current,
        }
    }

    /// Keyboard handling while the field has focus: arrow keys step.
    pub fn key(&self, value: f64, key: KeyCode) -> Option<f64> {
        match key {
            KeyCode::ArrowUp => Some(self.step(value, StepDirection::Up)),
            KeyCode::ArrowDown => Some(self.step(value, StepDirection::Down)),
            _ => None,
        }
    }
}
