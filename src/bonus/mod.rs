//! Bonus resolution engine
//!
//! Activations are expanded into owned `LiveSkill` copies (`expansion`),
//! alternate / mutual / refrain copies read the `cache`, and the `resolver`
//! turns the active set into aggregated bonuses.

pub mod amr;
pub mod cache;
pub mod expansion;
pub mod live_skill;
pub mod resolver;

pub use cache::{is_all_zero, UnitCache};
pub use expansion::{Expanded, ExpansionContext};
pub use live_skill::{ActiveSkill, BonusKind, Grouping, LiveSkill, SkillValues};
pub use resolver::{BonusResolver, Bonuses, Contribution};
