//! Stage Sim - Event-driven live scoring simulator
//!
//! Given a formation, a chart and a config, replays the live note by note
//! while skills activate and expire on a fixed timeline, and reports the
//! score under perfect play, random play, autoplay lag or timing abuse.

pub mod bonus;
pub mod core;
pub mod engine;
pub mod live;
pub mod results;
pub mod scenario;
pub mod simulator;
pub mod skills;
pub mod timeline;
pub mod unit;
