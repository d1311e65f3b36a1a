//! Validation helpers for catalog, configuration and state invariants.

use crate::{Catalog, GameState, LevelTable, Leveled, SimConfig, TechId, TechNode};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Validation errors for domain invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// A level table has no entries.
    #[error("table `{0}` is empty")]
    EmptyTable(&'static str),
    /// Level numbers must run 1, 2, 3, ... without gaps.
    #[error("table `{table}` has level {found} at position {expected}")]
    LevelGap {
        table: &'static str,
        expected: u8,
        found: u8,
    },
    /// Fraction must be within [0, 1) (tax rates allow exactly 1).
    #[error("fraction out of range in `{0}`")]
    FractionOutOfRange(String),
    /// Server room tax rate must strictly decrease and end at zero.
    #[error("server room tax rates must strictly decrease to 0")]
    TaxNotDecreasing,
    /// Price or cost must be non-negative.
    #[error("negative monetary value in `{0}`")]
    NegativeMoney(String),
    /// Duplicate identifier.
    #[error("duplicate id: {0}")]
    DuplicateId(String),
    /// Missing dependency in tech tree or unknown tech requirement.
    #[error("dependency not found: {0}")]
    DependencyNotFound(String),
    /// Prerequisite graph contains a cycle through this node.
    #[error("tech tree cycle through {0}")]
    Cycle(String),
    /// Tick period must be positive.
    #[error("tick period must be > 0")]
    ZeroTickPeriod,
    /// Level recorded in state is outside its catalog table.
    #[error("`{what}` level {level} outside 1..={max}")]
    LevelOutOfRange { what: String, level: u8, max: u8 },
    /// Balances must stay non-negative.
    #[error("negative balance: {0}")]
    NegativeBalance(&'static str),
    /// Teacher slots exist without the network slot.
    #[error("classroom {0} has teacher slots but no network slot")]
    TeacherBeforeNetwork(String),
    /// A slot array does not have the length its room level or cap allows.
    #[error("`{bay}` has {len} slots, expected {expected}")]
    SlotCountMismatch {
        bay: String,
        len: usize,
        expected: String,
    },
    /// Server room slot counts must not shrink from one level to the next.
    #[error("server room level {0} has fewer slots than the level before")]
    SlotsShrink(u8),
}

fn check_levels<T: Leveled>(
    table: &'static str,
    levels: &LevelTable<T>,
) -> Result<(), ValidationError> {
    if levels.is_empty() {
        return Err(ValidationError::EmptyTable(table));
    }
    for (entry, expected) in levels.iter().zip(1u8..) {
        if entry.level() != expected {
            return Err(ValidationError::LevelGap {
                table,
                expected,
                found: entry.level(),
            });
        }
    }
    Ok(())
}

fn check_money(what: &str, value: Decimal) -> Result<(), ValidationError> {
    if value < Decimal::ZERO {
        return Err(ValidationError::NegativeMoney(what.to_string()));
    }
    Ok(())
}

fn check_fraction(what: &str, value: Decimal) -> Result<(), ValidationError> {
    if value < Decimal::ZERO || value >= Decimal::ONE {
        return Err(ValidationError::FractionOutOfRange(what.to_string()));
    }
    Ok(())
}

/// Validate the tech graph: unique ids, known prerequisites, no cycles.
pub fn validate_tech_tree(nodes: &[TechNode]) -> Result<(), ValidationError> {
    let mut by_id: BTreeMap<&TechId, &TechNode> = BTreeMap::new();
    for n in nodes {
        check_money(n.id.as_str(), n.cost)?;
        if by_id.insert(&n.id, n).is_some() {
            return Err(ValidationError::DuplicateId(n.id.0.clone()));
        }
    }
    for n in nodes {
        for dep in &n.prerequisites {
            if !by_id.contains_key(dep) {
                return Err(ValidationError::DependencyNotFound(dep.0.clone()));
            }
        }
    }

    // Iterative depth-first search with white/grey/black colouring.
    let mut done: BTreeSet<&TechId> = BTreeSet::new();
    for root in nodes {
        if done.contains(&root.id) {
            continue;
        }
        let mut on_path: BTreeSet<&TechId> = BTreeSet::new();
        let mut stack: Vec<(&TechNode, usize)> = vec![(root, 0)];
        on_path.insert(&root.id);
        while let Some((node, next)) = stack.pop() {
            if let Some(dep) = node.prerequisites.get(next) {
                stack.push((node, next + 1));
                if on_path.contains(dep) {
                    return Err(ValidationError::Cycle(dep.0.clone()));
                }
                if !done.contains(dep) {
                    if let Some(child) = by_id.get(dep) {
                        on_path.insert(dep);
                        stack.push((child, 0));
                    }
                }
            } else {
                on_path.remove(&node.id);
                done.insert(&node.id);
            }
        }
    }
    Ok(())
}

/// Validate a full catalog, including cross-references into the tech tree.
pub fn validate_catalog(c: &Catalog) -> Result<(), ValidationError> {
    validate_tech_tree(&c.tech_tree)?;
    let techs: BTreeSet<&TechId> = c.tech_tree.iter().map(|n| &n.id).collect();
    let known = |req: &Option<TechId>| -> Result<(), ValidationError> {
        match req {
            Some(id) if !techs.contains(id) => {
                Err(ValidationError::DependencyNotFound(id.0.clone()))
            }
            _ => Ok(()),
        }
    };

    check_levels("generator", &c.generator)?;
    for g in c.generator.iter() {
        check_money(&g.name, g.cost)?;
    }

    check_levels("server_room", &c.server_room)?;
    let mut previous_tax: Option<Decimal> = None;
    let mut previous_slots = 0;
    for l in c.server_room.iter() {
        if l.slots < previous_slots {
            return Err(ValidationError::SlotsShrink(l.level));
        }
        previous_slots = l.slots;
        check_money(&l.name, l.cost)?;
        known(&l.tech_req)?;
        if l.tax_rate < Decimal::ZERO || l.tax_rate > Decimal::ONE {
            return Err(ValidationError::FractionOutOfRange(l.name.clone()));
        }
        if previous_tax.is_some_and(|p| l.tax_rate >= p) {
            return Err(ValidationError::TaxNotDecreasing);
        }
        previous_tax = Some(l.tax_rate);
    }
    if previous_tax != Some(Decimal::ZERO) {
        return Err(ValidationError::TaxNotDecreasing);
    }

    for asset in c.server_assets.values() {
        check_money(asset.id.as_str(), asset.base_cost)?;
        known(&asset.tech_req)?;
        check_levels("server_grades", &asset.grades)?;
    }

    check_levels("classroom", &c.classroom)?;
    for l in c.classroom.iter() {
        known(&l.tech_req)?;
    }
    for (name, table) in [
        ("pcs", &c.pcs),
        ("network", &c.network),
        ("teachers", &c.teachers),
        ("cooling", &c.cooling),
        ("backup", &c.backup),
    ] {
        check_levels(name, table)?;
        for e in table.iter() {
            check_money(&e.name, e.cost)?;
            known(&e.tech_req)?;
        }
    }

    check_levels("gym", &c.gym)?;
    for l in c.gym.iter() {
        known(&l.tech_req)?;
    }

    for s in c.lab_sections.values() {
        check_money(s.id.as_str(), s.base_cost)?;
    }

    for n in &c.tech_tree {
        for e in &n.effects {
            match e {
                crate::TechEffect::Co2Reduction { value }
                | crate::TechEffect::CostReduction { value } => {
                    check_fraction(n.id.as_str(), *value)?
                }
                _ => {}
            }
        }
    }

    let mut room_ids = BTreeSet::new();
    for r in &c.rooms {
        check_money(r.id.as_str(), r.cost)?;
        if !room_ids.insert(&r.id) {
            return Err(ValidationError::DuplicateId(r.id.0.clone()));
        }
    }
    Ok(())
}

/// Validate simulation configuration.
pub fn validate_config(cfg: &SimConfig) -> Result<(), ValidationError> {
    if cfg.tick_ms == 0 {
        return Err(ValidationError::ZeroTickPeriod);
    }
    check_money("starting_money", cfg.starting_money)?;
    check_money("starting_research", cfg.starting_research)?;
    check_money("co2_ceiling_base", cfg.co2_ceiling_base)?;
    check_fraction("ceiling_raise_fraction", cfg.ceiling_raise_fraction)?;
    check_fraction("max_modifier", cfg.max_modifier)?;
    Ok(())
}

fn check_slot_cap<T>(bay: &str, slots: &[T], cap: usize) -> Result<(), ValidationError> {
    if slots.len() > cap {
        return Err(ValidationError::SlotCountMismatch {
            bay: bay.to_string(),
            len: slots.len(),
            expected: format!("at most {cap}"),
        });
    }
    Ok(())
}

fn check_level(what: &str, level: u8, max: u8) -> Result<(), ValidationError> {
    if level == 0 || level > max {
        return Err(ValidationError::LevelOutOfRange {
            what: what.to_string(),
            level,
            max,
        });
    }
    Ok(())
}

/// Validate a (possibly deserialized) state against the catalog it runs on.
pub fn validate_state(state: &GameState, catalog: &Catalog) -> Result<(), ValidationError> {
    if state.money < Decimal::ZERO {
        return Err(ValidationError::NegativeBalance("money"));
    }
    if state.research < Decimal::ZERO {
        return Err(ValidationError::NegativeBalance("research"));
    }
    check_level("generator", state.generator_level, catalog.generator.max_level())?;
    check_level("server_room", state.server_room_level, catalog.server_room.max_level())?;
    check_level("gym", state.gym_level, catalog.gym.max_level())?;

    let limits = &catalog.limits;
    let server_slots = catalog
        .server_room
        .at(state.server_room_level)
        .map_or(0, |l| l.slots);
    if state.server_slots.len() != server_slots {
        return Err(ValidationError::SlotCountMismatch {
            bay: "server_slots".to_string(),
            len: state.server_slots.len(),
            expected: server_slots.to_string(),
        });
    }
    check_slot_cap("cooling_slots", &state.cooling_slots, limits.cooling_slots)?;
    check_slot_cap("backup_slots", &state.backup_slots, limits.backup_slots)?;
    for slot in state.server_slots.iter().flatten() {
        let asset = catalog
            .server_asset(&slot.type_id)
            .ok_or_else(|| ValidationError::DependencyNotFound(slot.type_id.0.clone()))?;
        check_level(slot.type_id.as_str(), slot.grade, asset.grades.max_level())?;
    }
    for slot in state.cooling_slots.iter().flatten() {
        check_level("cooling", slot.level, catalog.cooling.max_level())?;
    }
    for slot in state.backup_slots.iter().flatten() {
        check_level("backup", slot.level, catalog.backup.max_level())?;
    }
    for (id, room) in &state.classrooms {
        check_level(id.as_str(), room.level, catalog.classroom.max_level())?;
        check_slot_cap(&format!("{id}.pcs"), &room.pcs, limits.pc_slots)?;
        check_slot_cap(&format!("{id}.network"), &room.network, limits.network_slots)?;
        check_slot_cap(&format!("{id}.teachers"), &room.teachers, limits.teacher_slots)?;
        if !room.teachers.is_empty() && room.network.is_empty() {
            return Err(ValidationError::TeacherBeforeNetwork(id.0.clone()));
        }
        for (kind, table) in [
            (crate::EquipmentKind::Pc, &catalog.pcs),
            (crate::EquipmentKind::Network, &catalog.network),
            (crate::EquipmentKind::Teacher, &catalog.teachers),
        ] {
            for slot in room.slots(kind).iter().flatten() {
                check_level(id.as_str(), slot.level, table.max_level())?;
            }
        }
    }
    for (id, level) in &state.lab_sections {
        let section = catalog
            .lab_section(id)
            .ok_or_else(|| ValidationError::DependencyNotFound(id.0.clone()))?;
        if *level > section.max_level {
            return Err(ValidationError::LevelOutOfRange {
                what: id.0.clone(),
                level: *level,
                max: section.max_level,
            });
        }
    }
    for id in &state.unlocked_techs {
        if catalog.tech(id).is_none() {
            return Err(ValidationError::DependencyNotFound(id.0.clone()));
        }
    }
    Ok(())
}
