//! Buying and upgrading slotted equipment: servers, classroom gear and
//! server-room infrastructure.

use crate::energy::DrawChange;
use crate::engine::Purchase;
use crate::{CommandError, Engine};
use sim_core::{AssetTypeId, Equipment, EquipmentKind, RoomId, ServerSlot, Slot};

/// Where a levelled equipment slot array lives.
#[derive(Clone, Copy, Debug)]
enum Bay<'a> {
    Classroom(&'a RoomId, EquipmentKind),
    ServerRoom(EquipmentKind),
}

impl Bay<'_> {
    fn kind(&self) -> EquipmentKind {
        match *self {
            Bay::Classroom(_, kind) | Bay::ServerRoom(kind) => kind,
        }
    }
}

fn occupant<T: Clone>(slots: &[Slot<T>], index: usize) -> Result<Option<T>, CommandError> {
    slots
        .get(index)
        .cloned()
        .ok_or(CommandError::InvalidSlot(index))
}

impl Engine {
    fn bay_slots(&self, bay: Bay<'_>) -> Result<&[Slot<Equipment>], CommandError> {
        match bay {
            Bay::Classroom(id, kind) => Ok(self.open_classroom(id)?.slots(kind)),
            Bay::ServerRoom(kind) => Ok(self.state.infrastructure_slots(kind)),
        }
    }

    fn bay_slots_mut(&mut self, bay: Bay<'_>) -> Result<&mut Vec<Slot<Equipment>>, CommandError> {
        let slots = match bay {
            Bay::Classroom(id, kind) => self
                .state
                .classrooms
                .get_mut(id)
                .ok_or_else(|| CommandError::UnknownClassroom(id.clone()))?
                .slots_mut(kind),
            Bay::ServerRoom(kind) => self.state.infrastructure_slots_mut(kind),
        };
        slots.ok_or_else(|| CommandError::NoFreeSlot(bay.kind().to_string()))
    }

    /// Install a level-1 unit into an empty slot.
    fn buy_equipment(&mut self, bay: Bay<'_>, slot: usize) -> Result<(), CommandError> {
        if occupant(self.bay_slots(bay)?, slot)?.is_some() {
            return Err(CommandError::SlotOccupied(slot));
        }
        let kind = bay.kind();
        let level = self
            .catalog
            .equipment(kind)
            .at(1)
            .ok_or_else(|| CommandError::Maxed(kind.to_string()))?;
        let paid = self.authorize(
            Purchase::new(level.cost)
                .tech(level.tech_req.as_ref())
                .draw(DrawChange::install(level.energy)),
        )?;
        self.bay_slots_mut(bay)?[slot] = Some(Equipment::NEW);
        self.charge(paid);
        Ok(())
    }

    /// Raise an installed unit one level, swapping its draw for the next level's.
    fn upgrade_equipment(&mut self, bay: Bay<'_>, slot: usize) -> Result<(), CommandError> {
        let current = occupant(self.bay_slots(bay)?, slot)?.ok_or(CommandError::SlotEmpty(slot))?;
        let kind = bay.kind();
        let table = self.catalog.equipment(kind);
        let next = table
            .at(current.level + 1)
            .ok_or_else(|| CommandError::Maxed(kind.to_string()))?;
        let draw_now = table.at(current.level).map_or(0, |l| l.energy);
        let paid = self.authorize(
            Purchase::new(next.cost)
                .tech(next.tech_req.as_ref())
                .draw(DrawChange::replace(draw_now, next.energy)),
        )?;
        self.bay_slots_mut(bay)?[slot] = Some(Equipment {
            level: current.level + 1,
        });
        self.charge(paid);
        Ok(())
    }

    /// Install a grade-1 server of `asset` into the first empty server slot.
    pub fn buy_server(&mut self, asset: &AssetTypeId) -> Result<(), CommandError> {
        let outcome = self.try_buy_server(asset);
        self.settle("buy_server", outcome)
    }

    fn try_buy_server(&mut self, id: &AssetTypeId) -> Result<(), CommandError> {
        let asset = self
            .catalog
            .server_asset(id)
            .ok_or_else(|| CommandError::UnknownAssetType(id.clone()))?;
        let free = self
            .state
            .server_slots
            .iter()
            .position(Option::is_none)
            .ok_or_else(|| CommandError::NoFreeSlot("server".into()))?;
        if self.state.server_room_level < asset.min_room_level {
            return Err(CommandError::RoomLevelTooLow {
                required: asset.min_room_level,
                current: self.state.server_room_level,
            });
        }
        let paid =
            self.authorize(Purchase::new(asset.base_cost).tech(asset.tech_req.as_ref()))?;
        self.state.server_slots[free] = Some(ServerSlot {
            type_id: id.clone(),
            grade: 1,
        });
        self.charge(paid);
        Ok(())
    }

    /// Raise the server in `slot` to its next grade.
    pub fn upgrade_server(&mut self, slot: usize) -> Result<(), CommandError> {
        let outcome = self.try_upgrade_server(slot);
        self.settle("upgrade_server", outcome)
    }

    fn try_upgrade_server(&mut self, slot: usize) -> Result<(), CommandError> {
        let current =
            occupant(&self.state.server_slots, slot)?.ok_or(CommandError::SlotEmpty(slot))?;
        let asset = self
            .catalog
            .server_asset(&current.type_id)
            .ok_or_else(|| CommandError::UnknownAssetType(current.type_id.clone()))?;
        let next = asset
            .grades
            .at(current.grade + 1)
            .ok_or_else(|| CommandError::Maxed(asset.name.clone()))?;
        let paid = self.authorize(Purchase::new(next.upgrade_cost))?;
        self.state.server_slots[slot] = Some(ServerSlot {
            grade: current.grade + 1,
            ..current
        });
        self.charge(paid);
        Ok(())
    }

    pub fn buy_classroom_pc(&mut self, classroom: &RoomId, slot: usize) -> Result<(), CommandError> {
        let outcome = self.buy_equipment(Bay::Classroom(classroom, EquipmentKind::Pc), slot);
        self.settle("buy_classroom_pc", outcome)
    }

    pub fn upgrade_classroom_pc(
        &mut self,
        classroom: &RoomId,
        slot: usize,
    ) -> Result<(), CommandError> {
        let outcome = self.upgrade_equipment(Bay::Classroom(classroom, EquipmentKind::Pc), slot);
        self.settle("upgrade_classroom_pc", outcome)
    }

    pub fn buy_network(&mut self, classroom: &RoomId, slot: usize) -> Result<(), CommandError> {
        let outcome = self.buy_equipment(Bay::Classroom(classroom, EquipmentKind::Network), slot);
        self.settle("buy_network", outcome)
    }

    pub fn upgrade_network(&mut self, classroom: &RoomId, slot: usize) -> Result<(), CommandError> {
        let outcome =
            self.upgrade_equipment(Bay::Classroom(classroom, EquipmentKind::Network), slot);
        self.settle("upgrade_network", outcome)
    }

    pub fn buy_teacher(&mut self, classroom: &RoomId, slot: usize) -> Result<(), CommandError> {
        let outcome = self.buy_equipment(Bay::Classroom(classroom, EquipmentKind::Teacher), slot);
        self.settle("buy_teacher", outcome)
    }

    pub fn upgrade_teacher(&mut self, classroom: &RoomId, slot: usize) -> Result<(), CommandError> {
        let outcome =
            self.upgrade_equipment(Bay::Classroom(classroom, EquipmentKind::Teacher), slot);
        self.settle("upgrade_teacher", outcome)
    }

    pub fn buy_cooling(&mut self, slot: usize) -> Result<(), CommandError> {
        let outcome = self.buy_equipment(Bay::ServerRoom(EquipmentKind::Cooling), slot);
        self.settle("buy_cooling", outcome)
    }

    pub fn upgrade_cooling(&mut self, slot: usize) -> Result<(), CommandError> {
        let outcome = self.upgrade_equipment(Bay::ServerRoom(EquipmentKind::Cooling), slot);
        self.settle("upgrade_cooling", outcome)
    }

    pub fn buy_backup(&mut self, slot: usize) -> Result<(), CommandError> {
        let outcome = self.buy_equipment(Bay::ServerRoom(EquipmentKind::Backup), slot);
        self.settle("buy_backup", outcome)
    }

    pub fn upgrade_backup(&mut self, slot: usize) -> Result<(), CommandError> {
        let outcome = self.upgrade_equipment(Bay::ServerRoom(EquipmentKind::Backup), slot);
        self.settle("upgrade_backup", outcome)
    }
}

#[cfg(test)]
mod tests {
    use crate::{CommandError, Engine};
    use rust_decimal::Decimal;
    use sim_core::{Catalog, Equipment, RoomId, ServerSlot, SimConfig, TechId};

    fn engine() -> Engine {
        Engine::new(Catalog::standard(), SimConfig::default()).unwrap()
    }

    fn classroom_1() -> RoomId {
        RoomId::new("classroom-1")
    }

    #[test]
    fn buying_a_pc_charges_and_draws() {
        let mut e = engine();
        e.buy_classroom_pc(&classroom_1(), 1).unwrap();
        assert_eq!(e.state.money, Decimal::from(1900));
        assert_eq!(e.state.classrooms[&classroom_1()].pcs[1], Some(Equipment::NEW));
        assert_eq!(e.state.energy_usage, 5);
        assert_eq!(e.state.student_count, 5);
        // pre-filled slot
        assert_eq!(
            e.buy_classroom_pc(&classroom_1(), 0),
            Err(CommandError::SlotOccupied(0))
        );
        assert_eq!(
            e.buy_classroom_pc(&classroom_1(), 8),
            Err(CommandError::InvalidSlot(8))
        );
    }

    #[test]
    fn pc_upgrade_needs_tech_and_names_it() {
        let mut e = engine();
        let err = e.upgrade_classroom_pc(&classroom_1(), 0).unwrap_err();
        assert!(matches!(err, CommandError::MissingTech { ref id, .. } if id.as_str() == "C2"));
        assert_eq!(e.state.money, Decimal::from(2000));
        assert!(e.state.message.as_deref().unwrap_or("").contains("C2"));

        e.state.unlocked_techs.insert(TechId::new("C2"));
        e.upgrade_classroom_pc(&classroom_1(), 0).unwrap();
        assert_eq!(e.state.classrooms[&classroom_1()].pcs[0], Some(Equipment { level: 2 }));
        assert_eq!(e.state.money, Decimal::from(1820));
        assert_eq!(e.state.energy_usage, 5);
    }

    #[test]
    fn upgrade_rejected_when_power_would_overflow() {
        let mut e = engine();
        e.state.money = Decimal::from(1_000_000);
        let c1 = e.state.classrooms.get_mut(&classroom_1()).unwrap();
        // 3 other rooms draw 1 each: 3 + 3*9 = 30, at capacity
        c1.pcs = vec![Some(Equipment { level: 9 }); 3];
        c1.pcs.resize(8, None);
        e.state.unlocked_techs.insert(TechId::new("T_QUANTUM"));
        let before = e.state.clone();
        let err = e.upgrade_classroom_pc(&classroom_1(), 0).unwrap_err();
        assert_eq!(err, CommandError::InsufficientPower { draw: 31, capacity: 30 });
        assert_eq!(e.state.money, before.money);
        assert_eq!(e.state.classrooms, before.classrooms);
        assert!(e.state.message.is_some());
    }

    #[test]
    fn network_slot_appears_with_classroom_level() {
        let mut e = engine();
        e.state.money = Decimal::from(100_000);
        e.state.unlocked_techs.insert(TechId::new("C3"));
        assert_eq!(
            e.buy_network(&classroom_1(), 0),
            Err(CommandError::InvalidSlot(0))
        );
        e.state.classrooms.get_mut(&classroom_1()).unwrap().network.push(None);
        e.buy_network(&classroom_1(), 0).unwrap();
        assert_eq!(e.state.energy_usage, 4 + 5);
    }

    #[test]
    fn locked_classroom_rejects_purchases() {
        let mut e = engine();
        let id = RoomId::new("classroom-0");
        assert_eq!(e.buy_classroom_pc(&id, 1), Err(CommandError::RoomLocked(id.clone())));
        let unknown = RoomId::new("classroom-9");
        assert_eq!(
            e.buy_teacher(&unknown, 0),
            Err(CommandError::UnknownClassroom(unknown))
        );
    }

    #[test]
    fn tower_fills_first_free_slot_and_grades_up() {
        let mut e = engine();
        e.buy_server(&"tower".into()).unwrap();
        e.buy_server(&"tower".into()).unwrap();
        assert_eq!(e.state.money, Decimal::from(1600));
        assert_eq!(
            e.buy_server(&"tower".into()),
            Err(CommandError::NoFreeSlot("server".into()))
        );
        e.upgrade_server(1).unwrap();
        assert_eq!(
            e.state.server_slots[1],
            Some(ServerSlot {
                type_id: "tower".into(),
                grade: 2
            })
        );
        assert_eq!(e.state.money, Decimal::from(1450));
        e.upgrade_server(1).unwrap();
        assert!(matches!(e.upgrade_server(1), Err(CommandError::Maxed(_))));
    }

    #[test]
    fn rack_needs_room_level() {
        let mut e = engine();
        assert_eq!(
            e.buy_server(&"rack".into()),
            Err(CommandError::RoomLevelTooLow {
                required: 4,
                current: 1
            })
        );
        assert!(e.upgrade_server(0).is_err());
    }

    #[test]
    fn cooling_and_backup_use_server_room_slots() {
        let mut e = engine();
        assert_eq!(e.buy_cooling(0), Err(CommandError::InvalidSlot(0)));
        e.state.cooling_slots.push(None);
        e.state.backup_slots.push(None);
        e.buy_cooling(0).unwrap();
        e.buy_backup(0).unwrap();
        assert_eq!(e.state.money, Decimal::from(2000 - 300 - 500));
        assert_eq!(e.state.energy_usage, 4 + 2 + 1);
        e.upgrade_cooling(0).unwrap();
        assert_eq!(e.state.cooling_slots[0], Some(Equipment { level: 2 }));
        assert_eq!(e.upgrade_backup(1), Err(CommandError::InvalidSlot(1)));
    }
}
