pub mod tweening;

pub use tweening::{EasingFunction, Tween, Tweenable};
