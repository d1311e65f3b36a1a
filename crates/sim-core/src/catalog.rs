//! Static content tables consumed by the economy engine.
//!
//! The catalog is pure data: per-level stat tables for every room and
//! equipment kind, the tech tree and the fixed map layout. Hard caps (level
//! counts, slot limits) are derived from this data rather than hardcoded in
//! the engine, so content can change without touching engine logic.

use crate::{AssetTypeId, Rect, RoomId, RoomKind, SectionId, TechId, ValidationError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// A 1-based table of per-level entries. The table length is the level cap.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelTable<T>(pub Vec<T>);

impl<T> LevelTable<T> {
    pub fn new(entries: Vec<T>) -> Self {
        Self(entries)
    }

    /// Entry for `level` (1-based). Level 0 and levels past the cap are `None`.
    pub fn at(&self, level: u8) -> Option<&T> {
        if level == 0 {
            return None;
        }
        self.0.get(usize::from(level) - 1)
    }

    /// Highest reachable level.
    pub fn max_level(&self) -> u8 {
        u8::try_from(self.0.len()).unwrap_or(u8::MAX)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Entries that carry their own level number, checked for contiguity.
pub trait Leveled {
    fn level(&self) -> u8;
}

/// Generator room level: defines the global power capacity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneratorLevel {
    pub level: u8,
    pub name: String,
    /// Upgrade price to reach this level.
    pub cost: Decimal,
    /// Power capacity in energy units.
    pub capacity: u32,
}

/// Server room level: slot container, tax rate and level-up requirements.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ServerRoomLevel {
    pub level: u8,
    pub name: String,
    pub cost: Decimal,
    /// Number of server slots at this level.
    pub slots: usize,
    /// Generator capacity required to reach this level.
    pub energy_req: u32,
    /// Fraction of gross server income withheld, in [0,1].
    pub tax_rate: Decimal,
    #[serde(default)]
    pub tech_req: Option<TechId>,
}

/// One grade of a server asset type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ServerGrade {
    pub grade: u8,
    pub name: String,
    /// Price to upgrade into this grade (grade 1 uses the type's base cost).
    pub upgrade_cost: Decimal,
    pub income: Decimal,
    pub co2: Decimal,
}

/// A purchasable server asset type with its grade table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ServerAssetType {
    pub id: AssetTypeId,
    pub name: String,
    pub base_cost: Decimal,
    /// Minimum server room level needed to install this type.
    pub min_room_level: u8,
    #[serde(default)]
    pub tech_req: Option<TechId>,
    pub grades: LevelTable<ServerGrade>,
}

/// Per-level stats shared by PCs, network gear, teachers, cooling and backup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EquipmentLevel {
    pub level: u8,
    pub name: String,
    pub cost: Decimal,
    /// Ongoing power draw.
    pub energy: u32,
    /// Income per tick.
    pub income: Decimal,
    /// CO2 contribution per tick.
    #[serde(default)]
    pub co2: Decimal,
    #[serde(default)]
    pub tech_req: Option<TechId>,
}

/// Equipment categories that live in slot arrays and draw power.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentKind {
    Pc,
    Network,
    Teacher,
    Cooling,
    Backup,
}

impl fmt::Display for EquipmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EquipmentKind::Pc => "PC",
            EquipmentKind::Network => "network",
            EquipmentKind::Teacher => "teacher",
            EquipmentKind::Cooling => "cooling",
            EquipmentKind::Backup => "backup",
        };
        f.write_str(name)
    }
}

/// Classroom progression step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassroomLevel {
    pub level: u8,
    pub name: String,
    pub cost: Decimal,
    /// Student capacity (informative).
    pub capacity: u32,
    #[serde(default)]
    pub tech_req: Option<TechId>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GymLevel {
    pub level: u8,
    pub name: String,
    pub cost: Decimal,
    pub description: String,
    #[serde(default)]
    pub tech_req: Option<TechId>,
}

/// Training goal chosen in the gym questionnaire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GymGoal {
    WeightLoss,
    MuscleGain,
    Endurance,
}

/// Training frequency chosen in the gym questionnaire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GymFrequency {
    Weekly,
    ThreePerWeek,
    Daily,
}

/// Activity template selected by a profile's goal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GymActivity {
    pub text: String,
    pub product: String,
    /// Top-tier bonus paid once the gym reaches the top reward tier.
    pub reward: Decimal,
}

/// Tiered reward schedule for `performGymActivity`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GymRewards {
    pub base: Decimal,
    pub mid_tier_level: u8,
    pub mid_tier_bonus: Decimal,
    pub top_tier_level: u8,
}

/// Research lab section with an exponential cost curve.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LabSection {
    pub id: SectionId,
    pub name: String,
    pub base_cost: Decimal,
    pub cost_multiplier: Decimal,
    /// Research points per tick per section level.
    pub base_rp: Decimal,
    pub max_level: u8,
}

impl LabSection {
    /// Catalog price of going from `level` to `level + 1`:
    /// `floor(base_cost * cost_multiplier^level)`.
    pub fn cost_at(&self, level: u8) -> Decimal {
        let mut cost = self.base_cost;
        for _ in 0..level {
            cost *= self.cost_multiplier;
        }
        cost.floor()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TechCategory {
    Infra,
    Classroom,
    Gym,
    Arcade,
    Ecology,
    Economy,
}

/// Effect applied when a tech node is unlocked.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TechEffect {
    /// Adds to the global CO2 reduction fraction.
    Co2Reduction { value: Decimal },
    /// Adds to the global cost reduction fraction.
    CostReduction { value: Decimal },
    /// Informative flag; gating reads the tech id directly.
    UnlockFeature { feature: String },
    /// Informative flag; gating reads the tech id directly.
    UnlockRoomLevel { target: RoomKind, level: u8 },
}

/// A vertex of the tech graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TechNode {
    pub id: TechId,
    pub name: String,
    /// Research point cost.
    pub cost: Decimal,
    #[serde(default)]
    pub description: String,
    pub category: TechCategory,
    #[serde(default)]
    pub prerequisites: Vec<TechId>,
    #[serde(default)]
    pub effects: Vec<TechEffect>,
}

/// A room on the fixed map as laid out at game start.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoomLayout {
    pub id: RoomId,
    pub kind: RoomKind,
    pub rect: Rect,
    pub unlocked: bool,
    pub cost: Decimal,
}

/// Slot caps and the server-room levels at which infrastructure slots appear.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlotLimits {
    /// PC slots per classroom instance.
    pub pc_slots: usize,
    /// Leading PC slots filled with a level-1 PC at game start.
    pub prefilled_pcs: usize,
    /// Network slots per classroom, opened by the first level-up.
    pub network_slots: usize,
    /// Teacher slots per classroom, one per level-up after the network slot.
    pub teacher_slots: usize,
    /// Cooling slots in the server room.
    pub cooling_slots: usize,
    /// Backup slots in the server room.
    pub backup_slots: usize,
    /// Server room level at which cooling slots appear.
    pub cooling_from_server_level: u8,
    /// First server room level that adds a backup slot; each later level adds one more.
    pub backup_from_server_level: u8,
}

/// The full content catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub generator: LevelTable<GeneratorLevel>,
    pub server_room: LevelTable<ServerRoomLevel>,
    pub server_assets: BTreeMap<AssetTypeId, ServerAssetType>,
    pub classroom: LevelTable<ClassroomLevel>,
    pub pcs: LevelTable<EquipmentLevel>,
    pub network: LevelTable<EquipmentLevel>,
    pub teachers: LevelTable<EquipmentLevel>,
    pub cooling: LevelTable<EquipmentLevel>,
    pub backup: LevelTable<EquipmentLevel>,
    pub gym: LevelTable<GymLevel>,
    pub gym_activities: BTreeMap<GymGoal, GymActivity>,
    pub gym_rewards: GymRewards,
    pub lab_sections: BTreeMap<SectionId, LabSection>,
    pub tech_tree: Vec<TechNode>,
    pub rooms: Vec<RoomLayout>,
    pub limits: SlotLimits,
}

/// Errors produced while loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog parse error: {0}")]
    Parse(String),
    #[error("invalid catalog: {0}")]
    Invalid(#[from] ValidationError),
}

impl Catalog {
    /// Parse and validate a catalog from YAML.
    pub fn from_yaml_str(text: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog =
            serde_yaml::from_str(text).map_err(|e| CatalogError::Parse(e.to_string()))?;
        crate::validate_catalog(&catalog)?;
        debug!(techs = catalog.tech_tree.len(), rooms = catalog.rooms.len(), "catalog loaded");
        Ok(catalog)
    }

    /// Parse and validate a catalog from JSON.
    pub fn from_json_str(text: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog =
            serde_json::from_str(text).map_err(|e| CatalogError::Parse(e.to_string()))?;
        crate::validate_catalog(&catalog)?;
        Ok(catalog)
    }

    pub fn equipment(&self, kind: EquipmentKind) -> &LevelTable<EquipmentLevel> {
        match kind {
            EquipmentKind::Pc => &self.pcs,
            EquipmentKind::Network => &self.network,
            EquipmentKind::Teacher => &self.teachers,
            EquipmentKind::Cooling => &self.cooling,
            EquipmentKind::Backup => &self.backup,
        }
    }

    pub fn tech(&self, id: &TechId) -> Option<&TechNode> {
        self.tech_tree.iter().find(|n| &n.id == id)
    }

    pub fn room(&self, id: &RoomId) -> Option<&RoomLayout> {
        self.rooms.iter().find(|r| &r.id == id)
    }

    pub fn server_asset(&self, id: &AssetTypeId) -> Option<&ServerAssetType> {
        self.server_assets.get(id)
    }

    pub fn lab_section(&self, id: &SectionId) -> Option<&LabSection> {
        self.lab_sections.get(id)
    }
}

impl Leveled for GeneratorLevel {
    fn level(&self) -> u8 {
        self.level
    }
}

impl Leveled for ServerRoomLevel {
    fn level(&self) -> u8 {
        self.level
    }
}

impl Leveled for ServerGrade {
    fn level(&self) -> u8 {
        self.grade
    }
}

impl Leveled for EquipmentLevel {
    fn level(&self) -> u8 {
        self.level
    }
}

impl Leveled for ClassroomLevel {
    fn level(&self) -> u8 {
        self.level
    }
}

impl Leveled for GymLevel {
    fn level(&self) -> u8 {
        self.level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_table_is_one_based() {
        let t = LevelTable::new(vec!["a", "b", "c"]);
        assert_eq!(t.at(0), None);
        assert_eq!(t.at(1), Some(&"a"));
        assert_eq!(t.at(3), Some(&"c"));
        assert_eq!(t.at(4), None);
        assert_eq!(t.max_level(), 3);
    }

    #[test]
    fn lab_section_cost_curve_floors() {
        let s = LabSection {
            id: SectionId::new("infra"),
            name: "Infrastructure".into(),
            base_cost: Decimal::from(2000),
            cost_multiplier: Decimal::new(15, 1),
            base_rp: Decimal::from(2),
            max_level: 10,
        };
        assert_eq!(s.cost_at(0), Decimal::from(2000));
        assert_eq!(s.cost_at(1), Decimal::from(3000));
        assert_eq!(s.cost_at(2), Decimal::from(4500));
        // 2000 * 1.5^3 = 6750
        assert_eq!(s.cost_at(3), Decimal::from(6750));
        // 2000 * 1.5^5 = 15187.5
        assert_eq!(s.cost_at(5), Decimal::from(15187));
    }

    #[test]
    fn tech_effect_tagged_serde() {
        let e = TechEffect::CostReduction {
            value: Decimal::new(5, 2),
        };
        let s = serde_json::to_string(&e).unwrap();
        assert!(s.contains("\"kind\":\"COST_REDUCTION\""));
        let back: TechEffect = serde_json::from_str(&s).unwrap();
        assert_eq!(back, e);
    }

    #[test]
    fn standard_catalog_roundtrips_through_yaml() {
        let catalog = Catalog::standard();
        let text = serde_yaml::to_string(&catalog).unwrap();
        let back = Catalog::from_yaml_str(&text).unwrap();
        assert_eq!(back.generator.max_level(), 10);
        assert_eq!(back.tech_tree.len(), catalog.tech_tree.len());
    }

    #[test]
    fn rejects_garbage_yaml() {
        assert!(matches!(
            Catalog::from_yaml_str("generator: 3"),
            Err(CatalogError::Parse(_))
        ));
    }
}
