//! Tick aggregation: income, CO2 and research from one state snapshot.

use crate::energy;
use rust_decimal::Decimal;
use sim_core::{Catalog, Equipment, EquipmentKind, GameState, RoomKind, Slot, TickReport};

#[derive(Default)]
struct Yield {
    income: Decimal,
    co2: Decimal,
}

impl Yield {
    fn add(&mut self, other: Yield) {
        self.income += other.income;
        self.co2 += other.co2;
    }
}

fn slots_yield(catalog: &Catalog, kind: EquipmentKind, slots: &[Slot<Equipment>]) -> Yield {
    let table = catalog.equipment(kind);
    let mut y = Yield::default();
    for level in slots.iter().flatten().filter_map(|e| table.at(e.level)) {
        y.income += level.income;
        y.co2 += level.co2;
    }
    y
}

/// Number of installed PCs across all classrooms.
pub fn student_count(state: &GameState) -> u32 {
    let n: usize = state.classrooms.values().map(|c| c.installed_pcs()).sum();
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// Compute the tick's deltas from `state` without mutating it.
pub fn aggregate(state: &GameState, catalog: &Catalog) -> TickReport {
    let mut servers = Yield::default();
    for slot in state.server_slots.iter().flatten() {
        let grade = catalog
            .server_asset(&slot.type_id)
            .and_then(|a| a.grades.at(slot.grade));
        if let Some(g) = grade {
            servers.income += g.income;
            servers.co2 += g.co2;
        }
    }
    let tax_rate = catalog
        .server_room
        .at(state.server_room_level)
        .map_or(Decimal::ZERO, |l| l.tax_rate);
    let server_tax = servers.income * tax_rate;
    let net_server_income = servers.income - server_tax;

    let mut classrooms = Yield::default();
    for room in state.classrooms.values() {
        for kind in [
            EquipmentKind::Pc,
            EquipmentKind::Network,
            EquipmentKind::Teacher,
        ] {
            classrooms.add(slots_yield(catalog, kind, room.slots(kind)));
        }
    }

    let mut infrastructure = slots_yield(catalog, EquipmentKind::Cooling, &state.cooling_slots);
    infrastructure.add(slots_yield(catalog, EquipmentKind::Backup, &state.backup_slots));

    let raw_co2 = servers.co2 + classrooms.co2 + infrastructure.co2;
    let co2 = state.modifiers.effective_co2(raw_co2);

    let research_income = if state.has_unlocked(RoomKind::Research) {
        state
            .lab_sections
            .iter()
            .filter_map(|(id, level)| {
                catalog
                    .lab_section(id)
                    .map(|s| s.base_rp * Decimal::from(*level))
            })
            .sum()
    } else {
        Decimal::ZERO
    };

    let power = energy::report(state, catalog);
    let powered = power.is_powered();
    let (money_credited, research_credited) = if powered {
        (
            net_server_income + classrooms.income + infrastructure.income,
            research_income,
        )
    } else {
        (Decimal::ZERO, Decimal::ZERO)
    };

    TickReport {
        gross_server_income: servers.income,
        server_tax,
        net_server_income,
        classroom_income: classrooms.income,
        infrastructure_income: infrastructure.income,
        research_income,
        co2,
        energy_usage: power.usage,
        energy_capacity: power.capacity,
        powered,
        money_credited,
        research_credited,
    }
}

/// Commit a report produced by [`aggregate`] on the same state.
pub fn apply(state: &mut GameState, report: TickReport) {
    state.money += report.money_credited;
    state.research += report.research_credited;
    state.co2 = report.co2;
    state.energy_usage = report.energy_usage;
    state.energy_capacity = report.energy_capacity;
    state.student_count = student_count(state);
    state.tick += 1;
    state.revision += 1;
    state.last_tick = report;
}
