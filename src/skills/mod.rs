//! Skill descriptors
//!
//! Raw metadata rows are mapped once into immutable `Skill` templates whose
//! `SkillFamily` drives every later resolution step.

pub mod definitions;
pub mod family;
pub mod skill;
pub mod tables;

pub use definitions::{RawSkill, SkillCatalog, SkillSource, CUSTOM_SKILL_ID_BASE};
pub use family::{BoostEffect, BoostScope, SkillFamily, SkillPriority};
pub use skill::{ColorRequirements, Skill, MAX_SKILL_LEVEL};
