//! Run outputs: per-note / per-skill detail, abuse data, autoplay summary
//! and trial statistics

pub mod abuse;
pub mod autoplay;
pub mod detail;
pub mod statistics;

pub use abuse::{AbuseData, AbuseNote};
pub use autoplay::AutoplayResult;
pub use detail::{
    AmrBonus, AmrEntry, LiveDetail, MagicBonus, NoteDetail, NoteDetailSkill, SkillDetail, SkillInact, SkillStatus,
};
pub use statistics::ScoreStatistics;
