//! Skill activation timeline

pub mod builder;

pub use builder::{Activation, ActivationTimeline, EventKind, RollOutcome, SkillEvent};
