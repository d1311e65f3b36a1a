//! Canonical game state owned by the economy engine.

use crate::{
    AssetTypeId, Catalog, EquipmentKind, GymFrequency, GymGoal, Rect, RoomId, RoomKind,
    SectionId, SimConfig, SlotLimits, TechId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// An installed server asset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSlot {
    pub type_id: AssetTypeId,
    /// 1-based grade into the asset type's grade table.
    pub grade: u8,
}

/// An installed piece of levelled equipment (PC, network, teacher, cooling, backup).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    /// 1-based level into the kind's equipment table.
    pub level: u8,
}

impl Equipment {
    pub const NEW: Equipment = Equipment { level: 1 };
}

/// A fixed-position container holding at most one equipment instance.
pub type Slot<T> = Option<T>;

/// Independent per-room classroom progression and equipment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Classroom {
    pub level: u8,
    pub pcs: Vec<Slot<Equipment>>,
    /// Empty until the classroom reaches level 2, then exactly one slot.
    pub network: Vec<Slot<Equipment>>,
    /// Grows one slot per level after the network slot exists.
    pub teachers: Vec<Slot<Equipment>>,
}

impl Classroom {
    pub fn new(limits: &SlotLimits) -> Self {
        let pcs = (0..limits.pc_slots)
            .map(|i| (i < limits.prefilled_pcs).then_some(Equipment::NEW))
            .collect();
        Self {
            level: 1,
            pcs,
            network: Vec::new(),
            teachers: Vec::new(),
        }
    }

    /// Slot array for a classroom equipment kind. Cooling and backup live in
    /// the server room and yield an empty slice here.
    pub fn slots(&self, kind: EquipmentKind) -> &[Slot<Equipment>] {
        match kind {
            EquipmentKind::Pc => &self.pcs,
            EquipmentKind::Network => &self.network,
            EquipmentKind::Teacher => &self.teachers,
            EquipmentKind::Cooling | EquipmentKind::Backup => &[],
        }
    }

    pub fn slots_mut(&mut self, kind: EquipmentKind) -> Option<&mut Vec<Slot<Equipment>>> {
        match kind {
            EquipmentKind::Pc => Some(&mut self.pcs),
            EquipmentKind::Network => Some(&mut self.network),
            EquipmentKind::Teacher => Some(&mut self.teachers),
            EquipmentKind::Cooling | EquipmentKind::Backup => None,
        }
    }

    pub fn installed_pcs(&self) -> usize {
        self.pcs.iter().flatten().count()
    }
}

/// A room on the map and its unlock state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoomInstance {
    pub id: RoomId,
    pub kind: RoomKind,
    pub rect: Rect,
    pub unlocked: bool,
    pub unlock_cost: Decimal,
}

/// Global reduction fractions, mutated only by tech unlocks.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalModifiers {
    pub co2_reduction: Decimal,
    pub cost_reduction: Decimal,
}

impl GlobalModifiers {
    /// Catalog cost after the cost reduction modifier.
    pub fn effective_cost(&self, catalog_cost: Decimal) -> Decimal {
        catalog_cost * (Decimal::ONE - self.cost_reduction)
    }

    /// Raw CO2 after the CO2 reduction modifier.
    pub fn effective_co2(&self, raw_co2: Decimal) -> Decimal {
        raw_co2 * (Decimal::ONE - self.co2_reduction)
    }
}

/// Player answers to the gym questionnaire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GymProfile {
    pub goal: GymGoal,
    pub frequency: GymFrequency,
}

/// Breakdown of the most recent tick.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    pub gross_server_income: Decimal,
    pub server_tax: Decimal,
    pub net_server_income: Decimal,
    pub classroom_income: Decimal,
    /// Cooling and backup income.
    pub infrastructure_income: Decimal,
    pub research_income: Decimal,
    /// Freshly computed CO2 level after the reduction modifier.
    pub co2: Decimal,
    pub energy_usage: u32,
    pub energy_capacity: u32,
    /// False when draw exceeded capacity and all income was withheld.
    pub powered: bool,
    /// Money actually credited this tick (zero in a brownout).
    pub money_credited: Decimal,
    /// Research actually credited this tick (zero in a brownout).
    pub research_credited: Decimal,
}

/// The whole simulation state. The economy engine is its only writer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Spendable money balance.
    pub money: Decimal,
    /// Research points, spent on tech unlocks.
    pub research: Decimal,
    /// Current CO2 level, recomputed every tick.
    pub co2: Decimal,
    /// CO2 ceiling, only ever raised.
    pub co2_ceiling: Decimal,
    /// Ticks elapsed since the game started.
    pub tick: u64,

    /// 1-based levels into the matching catalog tables.
    pub generator_level: u8,
    pub server_room_level: u8,
    pub gym_level: u8,
    /// Lab section levels; 0 means not yet built.
    pub lab_sections: BTreeMap<SectionId, u8>,

    /// Grows monotonically; never contains a node without its prerequisites.
    pub unlocked_techs: BTreeSet<TechId>,
    pub modifiers: GlobalModifiers,

    /// Sized by the server room level.
    pub server_slots: Vec<Slot<ServerSlot>>,
    /// Opened by server room level-ups, capped by the catalog slot limits.
    pub cooling_slots: Vec<Slot<Equipment>>,
    pub backup_slots: Vec<Slot<Equipment>>,
    /// One entry per classroom on the map, locked or not.
    pub classrooms: BTreeMap<RoomId, Classroom>,

    /// Required before the first gym upgrade.
    pub gym_profile: Option<GymProfile>,

    /// Map rooms in layout order.
    pub rooms: Vec<RoomInstance>,
    /// Room shown in the detail panel.
    pub inspected_room: Option<RoomId>,

    /// Projection of the energy accountant over the latest committed state.
    pub energy_capacity: u32,
    pub energy_usage: u32,
    /// Installed PCs across all classrooms.
    pub student_count: u32,
    pub last_tick: TickReport,

    /// Transient user-facing message from the last rejected command.
    pub message: Option<String>,
    /// Bumped on every committed mutation.
    pub revision: u64,
}

impl GameState {
    /// Fresh game state laid out from the catalog.
    pub fn new(catalog: &Catalog, config: &SimConfig) -> Self {
        let server_slots = catalog
            .server_room
            .at(1)
            .map(|l| vec![None; l.slots])
            .unwrap_or_default();
        let classrooms = catalog
            .rooms
            .iter()
            .filter(|r| r.kind == RoomKind::Classroom)
            .map(|r| (r.id.clone(), Classroom::new(&catalog.limits)))
            .collect();
        let rooms = catalog
            .rooms
            .iter()
            .map(|r| RoomInstance {
                id: r.id.clone(),
                kind: r.kind,
                rect: r.rect,
                unlocked: r.unlocked,
                unlock_cost: r.cost,
            })
            .collect();
        let lab_sections = catalog.lab_sections.keys().map(|id| (id.clone(), 0)).collect();

        Self {
            money: config.starting_money,
            research: config.starting_research,
            co2: Decimal::ZERO,
            co2_ceiling: config.co2_ceiling_base,
            tick: 0,
            generator_level: 1,
            server_room_level: 1,
            gym_level: 1,
            lab_sections,
            unlocked_techs: config.starting_techs.iter().cloned().collect(),
            modifiers: GlobalModifiers::default(),
            server_slots,
            cooling_slots: Vec::new(),
            backup_slots: Vec::new(),
            classrooms,
            gym_profile: None,
            rooms,
            inspected_room: None,
            energy_capacity: catalog.generator.at(1).map_or(0, |g| g.capacity),
            energy_usage: 0,
            student_count: 0,
            last_tick: TickReport::default(),
            message: None,
            revision: 0,
        }
    }

    pub fn room(&self, id: &RoomId) -> Option<&RoomInstance> {
        self.rooms.iter().find(|r| &r.id == id)
    }

    /// Whether any room of `kind` has been unlocked.
    pub fn has_unlocked(&self, kind: RoomKind) -> bool {
        self.rooms.iter().any(|r| r.kind == kind && r.unlocked)
    }

    pub fn has_tech(&self, id: &TechId) -> bool {
        self.unlocked_techs.contains(id)
    }

    /// Server-room infrastructure slots (cooling or backup).
    pub fn infrastructure_slots(&self, kind: EquipmentKind) -> &[Slot<Equipment>] {
        match kind {
            EquipmentKind::Cooling => &self.cooling_slots,
            EquipmentKind::Backup => &self.backup_slots,
            _ => &[],
        }
    }

    pub fn infrastructure_slots_mut(
        &mut self,
        kind: EquipmentKind,
    ) -> Option<&mut Vec<Slot<Equipment>>> {
        match kind {
            EquipmentKind::Cooling => Some(&mut self.cooling_slots),
            EquipmentKind::Backup => Some(&mut self.backup_slots),
            _ => None,
        }
    }
}
