//! Built-in content tables.

use crate::{
    AssetTypeId, Catalog, ClassroomLevel, EquipmentLevel, GeneratorLevel, GymActivity, GymGoal,
    GymLevel, GymRewards, LabSection, LevelTable, Rect, RoomId, RoomKind, RoomLayout,
    SectionId, ServerAssetType, ServerGrade, ServerRoomLevel, SlotLimits, TechCategory,
    TechEffect, TechId, TechNode,
};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

fn money(v: i64) -> Decimal {
    Decimal::from(v)
}

/// Fraction expressed in hundredths, e.g. `pct(45)` is 0.45.
fn pct(v: i64) -> Decimal {
    Decimal::new(v, 2)
}

fn tech(id: &str) -> Option<TechId> {
    Some(TechId::new(id))
}

fn equipment(
    level: u8,
    name: &str,
    cost: i64,
    energy: u32,
    income: i64,
    co2: i64,
    tech_req: Option<TechId>,
) -> EquipmentLevel {
    EquipmentLevel {
        level,
        name: name.to_string(),
        cost: money(cost),
        energy,
        income: money(income),
        co2: money(co2),
        tech_req,
    }
}

fn grade(grade: u8, name: &str, upgrade_cost: i64, income: i64, co2: i64) -> ServerGrade {
    ServerGrade {
        grade,
        name: name.to_string(),
        upgrade_cost: money(upgrade_cost),
        income: money(income),
        co2: money(co2),
    }
}

fn node(
    id: &str,
    name: &str,
    cost: i64,
    category: TechCategory,
    prerequisites: &[&str],
    effects: Vec<TechEffect>,
) -> TechNode {
    TechNode {
        id: TechId::new(id),
        name: name.to_string(),
        cost: money(cost),
        description: String::new(),
        category,
        prerequisites: prerequisites.iter().map(|p| TechId::new(*p)).collect(),
        effects,
    }
}

fn room_level(target: RoomKind, level: u8) -> Vec<TechEffect> {
    vec![TechEffect::UnlockRoomLevel { target, level }]
}

fn feature(name: &str) -> Vec<TechEffect> {
    vec![TechEffect::UnlockFeature {
        feature: name.to_string(),
    }]
}

fn room(id: &str, kind: RoomKind, rect: Rect, unlocked: bool, cost: i64) -> RoomLayout {
    RoomLayout {
        id: RoomId::new(id),
        kind,
        rect,
        unlocked,
        cost: money(cost),
    }
}

fn generator_levels() -> LevelTable<GeneratorLevel> {
    let rows: [(&str, i64, u32); 10] = [
        ("Household Hookup", 0, 30),
        ("Diesel Generator", 800, 60),
        ("Rooftop Solar Panels", 2000, 100),
        ("Private Wind Turbine", 5000, 150),
        ("Industrial Transformer", 10000, 220),
        ("Solar Field", 25000, 350),
        ("Hydro Dam Contract", 60000, 500),
        ("Biomass Reactor", 120000, 700),
        ("Micro Nuclear Reactor", 300000, 1000),
        ("Cold Fusion Ring", 1000000, 2000),
    ];
    LevelTable::new(
        rows.iter()
            .zip(1u8..)
            .map(|(&(name, cost, capacity), level)| GeneratorLevel {
                level,
                name: name.to_string(),
                cost: money(cost),
                capacity,
            })
            .collect(),
    )
}

fn server_room_levels() -> LevelTable<ServerRoomLevel> {
    let rows: [(&str, i64, usize, u32, i64, Option<&str>); 10] = [
        ("Server Closet", 0, 2, 10, 50, Some("T1")),
        ("Ventilated Room", 1500, 4, 25, 45, None),
        ("Small IT Room", 3500, 6, 45, 40, Some("T2")),
        ("Junior Data Center", 7500, 8, 80, 35, None),
        ("Air-Conditioned Room", 12000, 10, 120, 30, Some("T3")),
        ("High Density Bays", 25000, 12, 180, 25, Some("T4")),
        ("Cold Corridor Room", 45000, 16, 250, 20, Some("T5")),
        ("Green Data Center", 80000, 20, 350, 10, Some("T6")),
        ("Immersion Cooling", 150000, 24, 500, 5, Some("T7")),
        ("Quantum Sanctuary", 500000, 30, 800, 0, Some("T8")),
    ];
    LevelTable::new(
        rows.iter()
            .zip(1u8..)
            .map(
                |(&(name, cost, slots, energy_req, tax, tech_req), level)| ServerRoomLevel {
                    level,
                    name: name.to_string(),
                    cost: money(cost),
                    slots,
                    energy_req,
                    tax_rate: pct(tax),
                    tech_req: tech_req.map(TechId::new),
                },
            )
            .collect(),
    )
}

fn server_assets() -> BTreeMap<AssetTypeId, ServerAssetType> {
    let types = [
        ServerAssetType {
            id: AssetTypeId::new("tower"),
            name: "Obsolete Tower".into(),
            base_cost: money(200),
            min_room_level: 1,
            tech_req: None,
            grades: LevelTable::new(vec![
                grade(1, "Standard", 0, 15, 10),
                grade(2, "Optimized", 150, 22, 8),
                grade(3, "Overclocked", 300, 30, 6),
            ]),
        },
        ServerAssetType {
            id: AssetTypeId::new("rack"),
            name: "Rack Server".into(),
            base_cost: money(1200),
            min_room_level: 4,
            tech_req: tech("T_RACK"),
            grades: LevelTable::new(vec![
                grade(1, "Standard", 0, 80, 5),
                grade(2, "Optimized", 800, 120, 4),
                grade(3, "Green", 1600, 160, 3),
            ]),
        },
        ServerAssetType {
            id: AssetTypeId::new("quantum"),
            name: "Quantum Blade".into(),
            base_cost: money(8500),
            min_room_level: 8,
            tech_req: tech("T_QUANTUM"),
            grades: LevelTable::new(vec![
                grade(1, "Standard", 0, 450, 0),
                grade(2, "Stable", 5000, 675, 0),
                grade(3, "Perfect", 12000, 900, 0),
            ]),
        },
    ];
    types.into_iter().map(|t| (t.id.clone(), t)).collect()
}

fn classroom_levels() -> LevelTable<ClassroomLevel> {
    let rows: [(&str, i64, u32, Option<&str>); 5] = [
        ("Tutorial Room", 0, 5, None),
        ("Lecture Hall 101", 2000, 10, Some("C2")),
        ("Grand Lecture Hall", 5000, 20, Some("C3")),
        ("Digital Campus", 15000, 40, Some("C5")),
        ("Tech University", 50000, 80, Some("C8")),
    ];
    LevelTable::new(
        rows.iter()
            .zip(1u8..)
            .map(|(&(name, cost, capacity, tech_req), level)| ClassroomLevel {
                level,
                name: name.to_string(),
                cost: money(cost),
                capacity,
                tech_req: tech_req.map(TechId::new),
            })
            .collect(),
    )
}

fn pcs() -> LevelTable<EquipmentLevel> {
    LevelTable::new(vec![
        equipment(1, "Potato PC", 100, 1, 5, 1, None),
        equipment(2, "Office PC", 180, 2, 10, 2, tech("C2")),
        equipment(3, "Student Laptop", 325, 3, 20, 3, tech("C2")),
        equipment(4, "Gaming Tower", 600, 4, 40, 5, tech("C4")),
        equipment(5, "Editing Station", 1100, 5, 80, 8, tech("C7")),
        equipment(6, "Rack Server", 2000, 6, 160, 12, tech("C7")),
        equipment(7, "Mining Rig", 3600, 7, 320, 20, tech("C8")),
        equipment(8, "Supercomputer", 6500, 8, 640, 35, tech("C8")),
        equipment(9, "Quantum Computer", 12000, 9, 1280, 60, tech("T_QUANTUM")),
        equipment(10, "Supreme AI", 22000, 10, 2560, 100, tech("T_QUANTUM")),
    ])
}

fn network() -> LevelTable<EquipmentLevel> {
    LevelTable::new(vec![
        equipment(1, "Ethernet Cable", 500, 5, 10, 0, tech("C3")),
        equipment(2, "Public Wi-Fi", 1250, 5, 25, 0, tech("C3")),
        equipment(3, "100Mb Switch", 3100, 5, 50, 0, tech("C5")),
        equipment(4, "Optical Fiber", 7800, 5, 100, 0, tech("C6")),
        equipment(5, "Private 5G", 19500, 5, 200, 0, tech("C6")),
        equipment(6, "Local Cloud", 48000, 5, 400, 0, tech("C8")),
        equipment(7, "Satellite Link", 120000, 5, 800, 0, tech("C8")),
        equipment(8, "Neural Network", 300000, 5, 1600, 0, tech("T_QUANTUM")),
        equipment(9, "Telepathy", 750000, 5, 3200, 0, tech("T_QUANTUM")),
        equipment(10, "Galactic Internet", 2000000, 5, 6400, 0, tech("T_QUANTUM")),
    ])
}

fn teachers() -> LevelTable<EquipmentLevel> {
    LevelTable::new(vec![
        equipment(1, "Supervisor", 2500, 1, 150, 0, tech("C1")),
        equipment(2, "Adjunct", 4500, 2, 300, 0, tech("C1")),
        equipment(3, "Schoolteacher", 8500, 2, 600, 0, tech("C4")),
        equipment(4, "Certified Professor", 18000, 3, 1300, 0, tech("C4")),
        equipment(5, "Project Lead", 38000, 4, 3000, 0, tech("C4")),
        equipment(6, "IT Doctor", 85000, 5, 7000, 0, tech("C8")),
        equipment(7, "Star Speaker", 200000, 6, 18000, 0, tech("C8")),
        equipment(8, "Lone Genius", 500000, 8, 45000, 0, tech("C8")),
        equipment(9, "Digital Oracle", 1200000, 10, 120000, 0, tech("T_QUANTUM")),
        equipment(10, "AI Entity", 3000000, 15, 350000, 0, tech("T_QUANTUM")),
    ])
}

fn cooling() -> LevelTable<EquipmentLevel> {
    LevelTable::new(vec![
        equipment(1, "USB Fan", 300, 2, 20, 2, None),
        equipment(2, "120mm Fan", 800, 3, 50, 3, None),
        equipment(3, "Basic Watercooling", 2000, 4, 120, 4, None),
        equipment(4, "Dual Radiator", 5000, 5, 280, 5, None),
        equipment(5, "Phase Change Cooling", 12000, 6, 650, 6, None),
        equipment(6, "Liquid Nitrogen", 30000, 8, 1500, 7, None),
        equipment(7, "Full Immersion", 75000, 10, 3500, 8, None),
        equipment(8, "Cryogenics", 180000, 12, 8000, 9, None),
        equipment(9, "Quantum Vacuum", 450000, 15, 20000, 5, None),
        equipment(10, "Absolute Zero", 1200000, 20, 50000, 0, None),
    ])
}

fn backup() -> LevelTable<EquipmentLevel> {
    LevelTable::new(vec![
        equipment(1, "External Hard Drive", 500, 1, 30, 1, None),
        equipment(2, "Basic NAS", 1500, 2, 80, 2, None),
        equipment(3, "RAID 5", 4000, 3, 200, 3, None),
        equipment(4, "Cloud Backup", 10000, 4, 500, 4, None),
        equipment(5, "Tape Library", 25000, 5, 1200, 5, None),
        equipment(6, "Mirror Site", 60000, 6, 3000, 6, None),
        equipment(7, "Blockchain Backup", 150000, 8, 7500, 7, None),
        equipment(8, "Quantum Storage", 400000, 10, 20000, 8, None),
        equipment(9, "Parallel Dimension", 1000000, 12, 50000, 9, None),
        equipment(10, "Temporal Backup", 2500000, 15, 125000, 10, None),
    ])
}

fn gym_levels() -> LevelTable<GymLevel> {
    let rows: [(&str, i64, &str, &str); 4] = [
        ("Profiling", 0, "Define your training profile", "G1"),
        ("Coaching", 2000, "Personalised instructions", "G2"),
        ("Visuals", 5000, "Animated demonstrations", "G4"),
        ("Monetisation", 10000, "Commercial partnerships", "G5"),
    ];
    LevelTable::new(
        rows.iter()
            .zip(1u8..)
            .map(|(&(name, cost, description, tech_req), level)| GymLevel {
                level,
                name: name.to_string(),
                cost: money(cost),
                description: description.to_string(),
                tech_req: tech(tech_req),
            })
            .collect(),
    )
}

fn gym_activities() -> BTreeMap<GymGoal, GymActivity> {
    let activity = |text: &str, product: &str| GymActivity {
        text: text.to_string(),
        product: product.to_string(),
        reward: money(500),
    };
    BTreeMap::from([
        (
            GymGoal::WeightLoss,
            activity("Do 30 minutes of intense cardio.", "Running Shoes"),
        ),
        (
            GymGoal::MuscleGain,
            activity("Lift heavy weights (5x5).", "Weight Bench"),
        ),
        (
            GymGoal::Endurance,
            activity("Run 10km at a steady pace.", "Elliptical Bike"),
        ),
    ])
}

fn lab_sections() -> BTreeMap<SectionId, LabSection> {
    let rows: [(&str, &str, i64, i64, i64); 4] = [
        ("infra", "Infrastructure", 2000, 15, 2),
        ("classroom", "Pedagogy", 5000, 16, 5),
        ("gym", "Performance", 8000, 17, 8),
        ("arcade", "Entertainment", 15000, 18, 15),
    ];
    rows.iter()
        .map(|&(id, name, base_cost, mult_tenths, base_rp)| {
            let section = LabSection {
                id: SectionId::new(id),
                name: name.to_string(),
                base_cost: money(base_cost),
                cost_multiplier: Decimal::new(mult_tenths, 1),
                base_rp: money(base_rp),
                max_level: 10,
            };
            (section.id.clone(), section)
        })
        .collect()
}

fn tech_tree() -> Vec<TechNode> {
    use TechCategory::*;
    let co2 = |v| vec![TechEffect::Co2Reduction { value: pct(v) }];
    let cost = |v| vec![TechEffect::CostReduction { value: pct(v) }];
    vec![
        node("T1", "Basic Networking", 0, Infra, &[], room_level(RoomKind::Server, 1)),
        node("T2", "Active Directory", 1000, Infra, &["T1"], room_level(RoomKind::Server, 3)),
        node("T3", "Virtualisation", 5000, Infra, &["T2"], room_level(RoomKind::Server, 5)),
        node("T_RACK", "Rack Mounts", 7000, Infra, &["T3"], feature("rack")),
        node("T4", "Containerisation", 10000, Infra, &["T3"], room_level(RoomKind::Server, 6)),
        node("T5", "Energy Efficiency", 20000, Infra, &["T4"], room_level(RoomKind::Server, 7)),
        node("T6", "Hybrid Cloud", 40000, Infra, &["T5"], room_level(RoomKind::Server, 8)),
        node("T7", "Liquid Cooling", 80000, Infra, &["T5"], room_level(RoomKind::Server, 9)),
        node("T8", "Quantum Stability", 200000, Infra, &["T6", "T7"], room_level(RoomKind::Server, 10)),
        node("T_QUANTUM", "Quantum Physics", 300000, Infra, &["T8"], feature("quantum")),
        node("C1", "Pedagogy 1.0", 200, Classroom, &[], feature("teacher_1")),
        node("C2", "Computer Stations", 500, Classroom, &["C1"], feature("pc_1")),
        node("C3", "School Network", 1500, Classroom, &["C2"], feature("network_1")),
        node("C4", "Continuing Education", 4000, Classroom, &["C1"], feature("teacher_4")),
        node("C5", "E-Learning", 8000, Classroom, &["C3", "C4"], feature("pc_4")),
        node("C6", "Broadband", 15000, Classroom, &["C3"], feature("network_4")),
        node("C7", "Virtual Reality", 40000, Classroom, &["C5", "C6"], feature("pc_7")),
        node("C8", "AI Campus", 100000, Classroom, &["C7"], feature("teacher_6")),
        node("G1", "Physical Education", 1000, Gym, &[], room_level(RoomKind::Gym, 1)),
        node("G2", "Sports Nutrition", 3000, Gym, &["G1"], room_level(RoomKind::Gym, 2)),
        node("G3", "Pro Equipment", 8000, Gym, &["G2"], cost(5)),
        node("G4", "Sports Marketing", 15000, Gym, &["G2"], room_level(RoomKind::Gym, 3)),
        node("G5", "Sponsorship", 30000, Gym, &["G4"], room_level(RoomKind::Gym, 4)),
        node("G6", "Competitions", 60000, Gym, &["G5"], cost(10)),
        node("A1", "Arcade Cabinets", 5000, Arcade, &[], vec![]),
        node("A2", "Retro Games", 10000, Arcade, &["A1"], vec![]),
        node("A3", "Augmented Reality", 25000, Arcade, &["A2"], vec![]),
        node("A4", "Metaverse", 60000, Arcade, &["A3"], vec![]),
        node("A5", "eSports", 150000, Arcade, &["A4"], vec![]),
        node("E1", "Paper Recycling", 500, Ecology, &[], co2(5)),
        node("E2", "LED Lighting", 2000, Ecology, &["E1"], co2(10)),
        node("E3", "Zero Waste Policy", 8000, Ecology, &["E2"], co2(15)),
        node("M1", "Bulk Purchasing", 1500, Economy, &[], cost(5)),
        node("M2", "Tax Optimisation", 5000, Economy, &["M1"], cost(10)),
    ]
}

fn rooms() -> Vec<RoomLayout> {
    vec![
        room("research-main", RoomKind::Research, Rect::new(41, 9, 54, 22), false, 10000),
        room("server-main", RoomKind::Server, Rect::new(31, 28, 42, 41), false, 0),
        room("gym-main", RoomKind::Gym, Rect::new(55, 25, 68, 32), false, 5000),
        room("arcade-main", RoomKind::Arcade, Rect::new(55, 39, 68, 46), false, 8000),
        room("classroom-0", RoomKind::Classroom, Rect::new(8, 51, 19, 64), false, 5000),
        room("classroom-1", RoomKind::Classroom, Rect::new(24, 51, 35, 64), true, 0),
        room("classroom-2", RoomKind::Classroom, Rect::new(60, 51, 71, 64), false, 5000),
        room("classroom-3", RoomKind::Classroom, Rect::new(76, 51, 87, 64), false, 15000),
    ]
}

impl Catalog {
    /// The built-in content set.
    pub fn standard() -> Self {
        Catalog {
            generator: generator_levels(),
            server_room: server_room_levels(),
            server_assets: server_assets(),
            classroom: classroom_levels(),
            pcs: pcs(),
            network: network(),
            teachers: teachers(),
            cooling: cooling(),
            backup: backup(),
            gym: gym_levels(),
            gym_activities: gym_activities(),
            gym_rewards: GymRewards {
                base: money(100),
                mid_tier_level: 3,
                mid_tier_bonus: money(50),
                top_tier_level: 4,
            },
            lab_sections: lab_sections(),
            tech_tree: tech_tree(),
            rooms: rooms(),
            limits: SlotLimits {
                pc_slots: 8,
                prefilled_pcs: 1,
                network_slots: 1,
                teacher_slots: 3,
                cooling_slots: 1,
                backup_slots: 3,
                cooling_from_server_level: 2,
                backup_from_server_level: 3,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_catalog_is_valid() {
        crate::validate_catalog(&Catalog::standard()).unwrap();
    }

    #[test]
    fn standard_tables_match_expected_caps() {
        let c = Catalog::standard();
        assert_eq!(c.generator.at(1).unwrap().capacity, 30);
        assert_eq!(c.generator.max_level(), 10);
        assert_eq!(c.server_room.at(1).unwrap().tax_rate, Decimal::new(5, 1));
        assert_eq!(c.server_room.at(10).unwrap().tax_rate, Decimal::ZERO);
        assert_eq!(c.server_asset(&"tower".into()).unwrap().grades.max_level(), 3);
        assert_eq!(c.classroom.max_level(), 5);
        assert_eq!(c.pcs.at(1).unwrap().cost, Decimal::from(100));
        assert_eq!(c.gym.max_level(), 4);
        assert_eq!(c.rooms.iter().filter(|r| r.unlocked).count(), 1);
    }
}
