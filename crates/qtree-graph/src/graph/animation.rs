//! Damped springs for camera moves
//!
//! A [`Spring`] chases its target every frame: call `tick(dt)`, then read
//! `get()`. The camera keeps one spring for its center and one for its zoom.
//! Presets (`fast`, `medium`, `slow`) come from `animation.springs` in the
//! graph settings.

use std::ops::{Add, Mul, Sub};

use egui::Vec2;

use crate::config::{global_config, AnimationSettings, SpringConfigYaml};

/// Distance and speed below which a spring counts as settled
const REST_EPSILON: f32 = 1e-4;

/// Frames longer than this are integrated as if they were this long
const MAX_STEP: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringConfig {
    pub stiffness: f32,
    /// 1.0 = critically damped
    pub damping: f32,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::from_preset("medium")
    }
}

impl From<SpringConfigYaml> for SpringConfig {
    fn from(yaml: SpringConfigYaml) -> Self {
        Self {
            stiffness: yaml.stiffness,
            damping: yaml.damping,
        }
    }
}

impl SpringConfig {
    /// Preset from the process-wide settings
    pub fn from_preset(name: &str) -> Self {
        Self::from_settings(&global_config().animation, name)
    }

    pub fn from_settings(settings: &AnimationSettings, name: &str) -> Self {
        settings.spring(name).into()
    }

    fn damping_coefficient(&self) -> f32 {
        2.0 * self.damping * self.stiffness.sqrt()
    }
}

/// Values a spring can animate
pub trait Animatable:
    Copy + Add<Output = Self> + Sub<Output = Self> + Mul<f32, Output = Self>
{
    const ZERO: Self;

    fn magnitude(self) -> f32;
}

impl Animatable for f32 {
    const ZERO: Self = 0.0;

    fn magnitude(self) -> f32 {
        self.abs()
    }
}

impl Animatable for Vec2 {
    const ZERO: Self = Vec2::ZERO;

    fn magnitude(self) -> f32 {
        self.length()
    }
}

#[derive(Debug, Clone)]
pub struct Spring<T> {
    current: T,
    target: T,
    velocity: T,
    config: SpringConfig,
}

pub type SpringF32 = Spring<f32>;
pub type SpringVec2 = Spring<Vec2>;

impl<T: Animatable> Spring<T> {
    pub fn new(initial: T, config: SpringConfig) -> Self {
        Self {
            current: initial,
            target: initial,
            velocity: T::ZERO,
            config,
        }
    }

    pub fn get(&self) -> T {
        self.current
    }

    pub fn target(&self) -> T {
        self.target
    }

    pub fn set_target(&mut self, target: T) {
        self.target = target;
    }

    /// Jump to `value` and stop
    pub fn set_immediate(&mut self, value: T) {
        self.current = value;
        self.target = value;
        self.velocity = T::ZERO;
    }

    pub fn set_config(&mut self, config: SpringConfig) {
        self.config = config;
    }

    /// Semi-implicit Euler step of `a = -k·x - c·v`
    pub fn tick(&mut self, dt: f32) {
        let dt = dt.min(MAX_STEP);
        let displacement = self.current - self.target;
        let accel = displacement * -self.config.stiffness
            + self.velocity * -self.config.damping_coefficient();

        self.velocity = self.velocity + accel * dt;
        self.current = self.current + self.velocity * dt;

        if !self.is_animating() {
            self.current = self.target;
            self.velocity = T::ZERO;
        }
    }

    pub fn is_animating(&self) -> bool {
        (self.current - self.target).magnitude() > REST_EPSILON
            || self.velocity.magnitude() > REST_EPSILON * 10.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f32 = 1.0 / 60.0;

    fn medium() -> SpringConfig {
        SpringConfig::from_settings(&AnimationSettings::default(), "medium")
    }

    #[test]
    fn test_spring_settles_on_target() {
        let mut spring = SpringF32::new(0.0, medium());
        spring.set_target(10.0);
        for _ in 0..600 {
            spring.tick(FRAME);
        }
        assert!(!spring.is_animating());
        assert_eq!(spring.get(), 10.0);
    }

    #[test]
    fn test_critically_damped_does_not_overshoot() {
        let mut spring = SpringF32::new(0.0, medium());
        spring.set_target(1.0);
        for _ in 0..300 {
            spring.tick(FRAME);
            assert!(spring.get() <= 1.0 + 1e-3);
        }
    }

    #[test]
    fn test_vec2_spring_moves_both_axes() {
        let mut spring = SpringVec2::new(Vec2::ZERO, medium());
        spring.set_target(Vec2::new(4.0, -2.0));
        spring.tick(FRAME);
        let step = spring.get();
        assert!(step.x > 0.0 && step.y < 0.0);

        spring.set_immediate(Vec2::new(2.0, 3.0));
        assert!(!spring.is_animating());
        assert_eq!(spring.get(), Vec2::new(2.0, 3.0));
    }

    #[test]
    fn test_long_frame_is_clamped() {
        let mut spring = SpringF32::new(0.0, medium());
        spring.set_target(1.0);
        spring.tick(5.0);
        assert!(spring.get().is_finite());
        assert!(spring.get() < 100.0);
    }
}
