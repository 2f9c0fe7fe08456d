//! Simulation configuration with documented flags
//!
//! Every behavioural switch of the state machine lives here so a run is a
//! pure function of (formation, live, config, seed).

use serde::{Deserialize, Serialize};

/// Configuration for one prepared simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    // === TIMING BOUNDARIES ===
    /// An activation at exactly a note's hit time is applied before the note
    pub left_inclusive: bool,

    /// A deactivation at exactly a note's hit time is applied after the note
    ///
    /// With both flags set a skill window is the closed interval [on, off].
    pub right_inclusive: bool,

    // === LIFE ===
    /// Start with double life (and double the cap)
    pub doublelife: bool,

    // === ENCORE INTERACTIONS ===
    /// An encore copying an alternate/mutual/refrain re-derives its values
    /// from the encore card's own sub-unit cache instead of the original's
    pub encore_amr_cache_to_encore_unit: bool,

    /// Copies of an encored magic count toward the encore card's sub-unit
    /// instead of the magic card's
    pub encore_magic_to_encore_unit: bool,

    /// Copies made by an encored magic aggregate like individual skills
    /// (summed under resonance) instead of collapsing to their max
    pub allow_encore_magic_to_escape_max_aggregation: bool,

    // === CHART ===
    /// Mirror lanes left to right (detail output only)
    pub mirror: bool,

    // === PROBABILITY ===
    /// Roll every activation against its probability in probabilistic runs
    pub fail_simulate: bool,

    // === OUTPUT ===
    /// Populate `LiveDetail` note/skill records
    ///
    /// Statistical trial loops switch this off; scores are unaffected.
    pub record_details: bool,

    /// Offset in microseconds used when probing either side of a skill event
    /// in abuse mode
    pub abuse_epsilon_us: i64,

    /// Override the level-derived score multiplier
    pub level_multiplier_override: Option<f64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            left_inclusive: true,
            right_inclusive: true,
            doublelife: false,
            encore_amr_cache_to_encore_unit: false,
            encore_magic_to_encore_unit: false,
            allow_encore_magic_to_escape_max_aggregation: false,
            mirror: false,
            fail_simulate: true,
            record_details: true,
            abuse_epsilon_us: 1,
            level_multiplier_override: None,
        }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from a TOML document (missing keys take defaults)
    pub fn from_toml_str(content: &str) -> crate::core::error::Result<Self> {
        let config: SimulationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> crate::core::error::Result<()> {
        use crate::core::error::SimError;

        if self.abuse_epsilon_us <= 0 {
            return Err(SimError::InvalidConfig(format!(
                "abuse_epsilon_us ({}) must be positive",
                self.abuse_epsilon_us
            )));
        }

        if let Some(multiplier) = self.level_multiplier_override {
            if !multiplier.is_finite() || multiplier <= 0.0 {
                return Err(SimError::InvalidConfig(format!(
                    "level_multiplier_override ({}) must be a positive number",
                    multiplier
                )));
            }
        }

        if self.encore_magic_to_encore_unit && self.allow_encore_magic_to_escape_max_aggregation {
            tracing::debug!("encored magic re-expands and escapes max aggregation");
        }

        Ok(())
    }
}
