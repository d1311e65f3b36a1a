//! Room unlocks and level progression for every subsystem.

use crate::engine::Purchase;
use crate::energy::{self, DrawChange};
use crate::{CommandError, Engine};
use sim_core::{Classroom, EquipmentKind, RoomId, SectionId};

impl Engine {
    /// Pay the room's unlock cost, raise the CO2 ceiling and inspect the room.
    pub fn unlock_room(&mut self, id: &RoomId) -> Result<(), CommandError> {
        let outcome = self.try_unlock_room(id);
        self.settle("unlock_room", outcome)
    }

    fn try_unlock_room(&mut self, id: &RoomId) -> Result<(), CommandError> {
        let room = self
            .state
            .room(id)
            .ok_or_else(|| CommandError::UnknownRoom(id.clone()))?;
        if room.unlocked {
            return Err(CommandError::RoomAlreadyUnlocked(id.clone()));
        }
        // unlock prices are fixed and ignore the cost reduction
        let cost = room.unlock_cost;
        if self.state.money < cost {
            return Err(CommandError::InsufficientFunds {
                needed: cost,
                available: self.state.money,
            });
        }

        if let Some(room) = self.state.rooms.iter_mut().find(|r| &r.id == id) {
            room.unlocked = true;
        }
        self.state.money -= cost;
        self.raise_ceiling(cost);
        self.state.inspected_room = Some(id.clone());
        Ok(())
    }

    /// Select the room shown in the detail panel, or clear the selection.
    pub fn inspect_room(&mut self, id: Option<&RoomId>) -> Result<(), CommandError> {
        let outcome = match id {
            Some(id) if self.state.room(id).is_none() => {
                Err(CommandError::UnknownRoom(id.clone()))
            }
            _ => {
                self.state.inspected_room = id.cloned();
                Ok(())
            }
        };
        self.settle("inspect_room", outcome)
    }

    pub fn upgrade_generator(&mut self) -> Result<(), CommandError> {
        let outcome = self.try_upgrade_generator();
        self.settle("upgrade_generator", outcome)
    }

    fn try_upgrade_generator(&mut self) -> Result<(), CommandError> {
        let next = self.state.generator_level + 1;
        let level = self
            .catalog
            .generator
            .at(next)
            .ok_or_else(|| CommandError::Maxed("Generator".into()))?;
        let paid = self.authorize(
            Purchase::new(level.cost)
                .capacity_after(level.capacity)
                .expanding(),
        )?;
        self.state.generator_level = next;
        self.charge(paid);
        Ok(())
    }

    pub fn upgrade_server_room(&mut self) -> Result<(), CommandError> {
        let outcome = self.try_upgrade_server_room();
        self.settle("upgrade_server_room", outcome)
    }

    fn try_upgrade_server_room(&mut self) -> Result<(), CommandError> {
        let next = self.state.server_room_level + 1;
        let level = self
            .catalog
            .server_room
            .at(next)
            .ok_or_else(|| CommandError::Maxed("Server room".into()))?;
        let (required, slots) = (level.energy_req, level.slots);
        let paid = self.authorize(
            Purchase::new(level.cost)
                .tech(level.tech_req.as_ref())
                .expanding(),
        )?;
        let capacity = energy::capacity(&self.state, &self.catalog);
        if capacity < required {
            return Err(CommandError::CapacityBelowRequirement { required, capacity });
        }

        let limits = &self.catalog.limits;
        let state = &mut self.state;
        state.server_room_level = next;
        if state.server_slots.len() < slots {
            state.server_slots.resize(slots, None);
        }
        if next >= limits.cooling_from_server_level && state.cooling_slots.len() < limits.cooling_slots
        {
            state.cooling_slots.push(None);
        }
        if next >= limits.backup_from_server_level && state.backup_slots.len() < limits.backup_slots {
            state.backup_slots.push(None);
        }
        self.charge(paid);
        Ok(())
    }

    /// Classroom that exists and has been unlocked.
    pub(crate) fn open_classroom(&self, id: &RoomId) -> Result<&Classroom, CommandError> {
        let classroom = self
            .state
            .classrooms
            .get(id)
            .ok_or_else(|| CommandError::UnknownClassroom(id.clone()))?;
        if !self.state.room(id).is_some_and(|r| r.unlocked) {
            return Err(CommandError::RoomLocked(id.clone()));
        }
        Ok(classroom)
    }

    /// Raise one classroom a level. Each step opens the network slot first,
    /// then one teacher slot per level until both categories are at their cap.
    pub fn upgrade_classroom(&mut self, id: &RoomId) -> Result<(), CommandError> {
        let outcome = self.try_upgrade_classroom(id);
        self.settle("upgrade_classroom", outcome)
    }

    fn try_upgrade_classroom(&mut self, id: &RoomId) -> Result<(), CommandError> {
        let next = self.open_classroom(id)?.level + 1;
        let level = self
            .catalog
            .classroom
            .at(next)
            .ok_or_else(|| CommandError::Maxed("Classroom".into()))?;
        let opens = self.next_classroom_slot(id)?;
        // the opened slot is budgeted at its entry-level draw
        let draw = opens.map_or(DrawChange::NONE, |kind| {
            DrawChange::install(self.catalog.equipment(kind).at(1).map_or(0, |l| l.energy))
        });
        let paid = self.authorize(
            Purchase::new(level.cost)
                .tech(level.tech_req.as_ref())
                .draw(draw)
                .expanding(),
        )?;

        let classroom = self
            .state
            .classrooms
            .get_mut(id)
            .ok_or_else(|| CommandError::UnknownClassroom(id.clone()))?;
        classroom.level = next;
        if let Some(kind) = opens {
            if let Some(slots) = classroom.slots_mut(kind) {
                slots.push(None);
            }
        }
        self.charge(paid);
        Ok(())
    }

    /// Slot category the next level-up of a classroom opens, if any.
    fn next_classroom_slot(&self, id: &RoomId) -> Result<Option<EquipmentKind>, CommandError> {
        let classroom = self.open_classroom(id)?;
        let limits = &self.catalog.limits;
        Ok(if classroom.network.len() < limits.network_slots {
            Some(EquipmentKind::Network)
        } else if classroom.teachers.len() < limits.teacher_slots {
            Some(EquipmentKind::Teacher)
        } else {
            None
        })
    }

    /// The first upgrade requires the gym questionnaire to be filled in.
    pub fn upgrade_gym(&mut self) -> Result<(), CommandError> {
        let outcome = self.try_upgrade_gym();
        self.settle("upgrade_gym", outcome)
    }

    fn try_upgrade_gym(&mut self) -> Result<(), CommandError> {
        let next = self.state.gym_level + 1;
        let level = self
            .catalog
            .gym
            .at(next)
            .ok_or_else(|| CommandError::Maxed("Gym".into()))?;
        if self.state.gym_level == 1 && self.state.gym_profile.is_none() {
            return Err(CommandError::ProfileMissing);
        }
        let paid = self.authorize(
            Purchase::new(level.cost)
                .tech(level.tech_req.as_ref())
                .expanding(),
        )?;
        self.state.gym_level = next;
        self.charge(paid);
        Ok(())
    }

    pub fn upgrade_lab_section(&mut self, id: &SectionId) -> Result<(), CommandError> {
        let outcome = self.try_upgrade_lab_section(id);
        self.settle("upgrade_lab_section", outcome)
    }

    fn try_upgrade_lab_section(&mut self, id: &SectionId) -> Result<(), CommandError> {
        let section = self
            .catalog
            .lab_section(id)
            .ok_or_else(|| CommandError::UnknownSection(id.clone()))?;
        let current = self.state.lab_sections.get(id).copied().unwrap_or(0);
        if current >= section.max_level {
            return Err(CommandError::Maxed(section.name.clone()));
        }
        let paid = self.authorize(Purchase::new(section.cost_at(current)).expanding())?;
        self.state.lab_sections.insert(id.clone(), current + 1);
        self.charge(paid);
        Ok(())
    }
}
