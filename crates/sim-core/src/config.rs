use crate::TechId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Simulation configuration parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Fixed tick period in milliseconds (default: 1000).
    pub tick_ms: u64,
    /// Money at game start.
    pub starting_money: Decimal,
    /// Research points at game start.
    pub starting_research: Decimal,
    /// CO2 ceiling before any purchase raises it.
    pub co2_ceiling_base: Decimal,
    /// Share of an expansion's effective cost added to the CO2 ceiling (floored).
    pub ceiling_raise_fraction: Decimal,
    /// Techs unlocked at game start.
    pub starting_techs: Vec<TechId>,
    /// Upper clamp for the accumulated reduction modifiers, < 1.
    pub max_modifier: Decimal,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_ms: 1000,
            starting_money: Decimal::from(2000),
            starting_research: Decimal::ZERO,
            co2_ceiling_base: Decimal::from(100),
            ceiling_raise_fraction: Decimal::new(10, 2),
            starting_techs: vec![TechId::new("T1")],
            max_modifier: Decimal::new(95, 2),
        }
    }
}

impl SimConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }
}
