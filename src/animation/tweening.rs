use crate::core::geo::GeoPoint;
use instant::Instant;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Easing functions for smooth animations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingFunction {
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    EaseOutQuad,
    EaseInOutCubic,
}

impl EasingFunction {
    /// Apply the easing function to a normalized time value (0.0 to 1.0)
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);

        match self {
            EasingFunction::Linear => t,
            EasingFunction::EaseIn => t * t,
            EasingFunction::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            EasingFunction::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - 2.0 * (1.0 - t) * (1.0 - t)
                }
            }
            EasingFunction::EaseOutQuad => t * (2.0 - t),
            EasingFunction::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - 4.0 * (1.0 - t).powi(3)
                }
            }
        }
    }
}

impl Default for EasingFunction {
    fn default() -> Self {
        EasingFunction::Linear
    }
}

/// Represents an animatable value that can be tweened
pub trait Tweenable {
    /// Interpolate between self and other by factor t (0.0 to 1.0)
    fn lerp(&self, other: &Self, t: f64) -> Self;
}

impl Tweenable for f64 {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        self + (other - self) * t
    }
}

impl Tweenable for GeoPoint {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        GeoPoint::new(
            self.longitude.lerp(&other.longitude, t),
            self.latitude.lerp(&other.latitude, t),
        )
    }
}

/// A tween between two values, driven by wall-clock time.
///
/// The value depends only on the time elapsed since `started_at`, so the
/// result is the same whatever the frame rate of the caller.
#[derive(Debug, Clone)]
pub struct Tween<T: Tweenable + Clone> {
    pub from: T,
    pub to: T,
    pub duration: Duration,
    pub easing: EasingFunction,
    started_at: Instant,
}

impl<T: Tweenable + Clone> Tween<T> {
    /// Create a linear tween starting at `now`
    pub fn new(from: T, to: T, duration: Duration, now: Instant) -> Self {
        Self::with_easing(from, to, duration, EasingFunction::Linear, now)
    }

    /// Create a tween with custom easing starting at `now`
    pub fn with_easing(
        from: T,
        to: T,
        duration: Duration,
        easing: EasingFunction,
        now: Instant,
    ) -> Self {
        Self {
            from,
            to,
            duration,
            easing,
            started_at: now,
        }
    }

    /// Progress in `0.0..=1.0` at the given instant
    pub fn progress_at(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started_at);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    pub fn is_finished_at(&self, now: Instant) -> bool {
        self.progress_at(now) >= 1.0
    }

    /// Value at the given instant
    pub fn value_at(&self, now: Instant) -> T {
        let progress = self.progress_at(now);
        if progress >= 1.0 {
            return self.to.clone();
        }
        self.from.lerp(&self.to, self.easing.apply(progress))
    }
}
