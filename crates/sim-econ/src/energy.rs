//! Energy accountant: power draw derived from state alone.
//!
//! Draw is the sum over every occupied classroom slot (PCs, network,
//! teachers) in every classroom instance plus every cooling and backup slot,
//! each looked up at its current level. Server assets and the server room's
//! `energy_req` are not part of the ongoing draw.

use serde::{Deserialize, Serialize};
use sim_core::{Catalog, Equipment, EquipmentKind, GameState, Slot};

/// Draw versus capacity at one point in time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnergyReport {
    pub usage: u32,
    pub capacity: u32,
}

impl EnergyReport {
    /// True unless draw exceeds capacity.
    pub fn is_powered(&self) -> bool {
        self.usage <= self.capacity
    }
}

/// Replace one draw contribution by another, for hypothetical checks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrawChange {
    pub remove: u32,
    pub add: u32,
}

impl DrawChange {
    pub const NONE: DrawChange = DrawChange { remove: 0, add: 0 };

    pub fn install(add: u32) -> Self {
        Self { remove: 0, add }
    }

    pub fn replace(remove: u32, add: u32) -> Self {
        Self { remove, add }
    }
}

fn slots_draw(catalog: &Catalog, kind: EquipmentKind, slots: &[Slot<Equipment>]) -> u32 {
    let table = catalog.equipment(kind);
    slots
        .iter()
        .flatten()
        .map(|e| table.at(e.level).map_or(0, |l| l.energy))
        .sum()
}

/// Total power draw of all installed equipment.
pub fn total_draw(state: &GameState, catalog: &Catalog) -> u32 {
    let classrooms: u32 = state
        .classrooms
        .values()
        .map(|room| {
            [
                EquipmentKind::Pc,
                EquipmentKind::Network,
                EquipmentKind::Teacher,
            ]
            .into_iter()
            .map(|kind| slots_draw(catalog, kind, room.slots(kind)))
            .sum::<u32>()
        })
        .sum();
    classrooms
        + slots_draw(catalog, EquipmentKind::Cooling, &state.cooling_slots)
        + slots_draw(catalog, EquipmentKind::Backup, &state.backup_slots)
}

/// Capacity of the generator at its current level.
pub fn capacity(state: &GameState, catalog: &Catalog) -> u32 {
    catalog
        .generator
        .at(state.generator_level)
        .map_or(0, |g| g.capacity)
}

pub fn report(state: &GameState, catalog: &Catalog) -> EnergyReport {
    EnergyReport {
        usage: total_draw(state, catalog),
        capacity: capacity(state, catalog),
    }
}

/// Draw the state would have if `change` were committed.
pub fn projected_draw(state: &GameState, catalog: &Catalog, change: DrawChange) -> u32 {
    total_draw(state, catalog)
        .saturating_sub(change.remove)
        .saturating_add(change.add)
}
