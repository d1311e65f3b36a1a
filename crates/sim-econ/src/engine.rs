//! The economy engine: sole owner and writer of the game state.
//!
//! Every command validates against the live state and either commits in full
//! or returns a [`CommandError`] having changed nothing except the transient
//! user-facing message. Ticks are driven externally through [`Engine::tick`].

use crate::energy::{self, DrawChange};
use crate::{tech, tick, Command, CommandError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sim_core::{
    validate_catalog, validate_config, validate_state, Catalog, GameState, SimConfig, TechId,
    ValidationError,
};
use tracing::{debug, info, warn};

/// Read-only view handed to presentation layers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(flatten)]
    pub state: GameState,
    /// Techs the player can unlock right now.
    pub unlockable_techs: Vec<TechId>,
}

/// A validated purchase, ready to be authorised against the live state.
pub(crate) struct Purchase {
    pub catalog_cost: Decimal,
    pub tech_req: Option<TechId>,
    pub draw: DrawChange,
    /// Capacity after commit when the purchase itself changes it.
    pub capacity_after: Option<u32>,
    /// Room level-ups and new slot categories raise the CO2 ceiling.
    pub expands: bool,
}

impl Purchase {
    pub fn new(catalog_cost: Decimal) -> Self {
        Self {
            catalog_cost,
            tech_req: None,
            draw: DrawChange::NONE,
            capacity_after: None,
            expands: false,
        }
    }

    pub fn tech(mut self, tech_req: Option<&TechId>) -> Self {
        self.tech_req = tech_req.cloned();
        self
    }

    pub fn draw(mut self, draw: DrawChange) -> Self {
        self.draw = draw;
        self
    }

    pub fn capacity_after(mut self, capacity: u32) -> Self {
        self.capacity_after = Some(capacity);
        self
    }

    pub fn expanding(mut self) -> Self {
        self.expands = true;
        self
    }
}

/// A price cleared by [`Engine::authorize`].
pub(crate) struct Authorized {
    cost: Decimal,
    expands: bool,
}

pub struct Engine {
    pub(crate) catalog: Catalog,
    pub(crate) config: SimConfig,
    pub(crate) state: GameState,
}

impl Engine {
    /// Start a new game.
    pub fn new(catalog: Catalog, config: SimConfig) -> Result<Self, ValidationError> {
        validate_catalog(&catalog)?;
        validate_config(&config)?;
        let state = GameState::new(&catalog, &config);
        let mut engine = Self {
            catalog,
            config,
            state,
        };
        engine.refresh_readouts();
        info!(
            money = %engine.state.money,
            capacity = engine.state.energy_capacity,
            "new game"
        );
        Ok(engine)
    }

    /// Resume from a previously saved state.
    pub fn from_state(
        catalog: Catalog,
        config: SimConfig,
        state: GameState,
    ) -> Result<Self, ValidationError> {
        validate_catalog(&catalog)?;
        validate_config(&config)?;
        validate_state(&state, &catalog)?;
        let mut engine = Self {
            catalog,
            config,
            state,
        };
        engine.refresh_readouts();
        Ok(engine)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state.clone(),
            unlockable_techs: tech::unlockable_now(&self.state, &self.catalog),
        }
    }

    pub fn energy(&self) -> energy::EnergyReport {
        energy::report(&self.state, &self.catalog)
    }

    /// Advance one fixed interval.
    pub fn tick(&mut self) -> &sim_core::TickReport {
        let was_powered = self.state.tick == 0 || self.state.last_tick.powered;
        let report = tick::aggregate(&self.state, &self.catalog);
        match (was_powered, report.powered) {
            (true, false) => warn!(
                usage = report.energy_usage,
                capacity = report.energy_capacity,
                "brownout: income withheld"
            ),
            (false, true) => info!("power restored"),
            _ => {}
        }
        debug!(
            tick = self.state.tick + 1,
            money = %report.money_credited,
            research = %report.research_credited,
            co2 = %report.co2,
            powered = report.powered,
            "tick"
        );
        tick::apply(&mut self.state, report);
        &self.state.last_tick
    }

    /// Dispatch a command received as data.
    pub fn execute(&mut self, command: Command) -> Result<(), CommandError> {
        match command {
            Command::UnlockRoom { room } => self.unlock_room(&room),
            Command::InspectRoom { room } => self.inspect_room(room.as_ref()),
            Command::DismissMessage => {
                self.dismiss_message();
                Ok(())
            }
            Command::UpgradeGenerator => self.upgrade_generator(),
            Command::UpgradeServerRoom => self.upgrade_server_room(),
            Command::UpgradeClassroom { classroom } => self.upgrade_classroom(&classroom),
            Command::UpgradeGym => self.upgrade_gym(),
            Command::UpgradeLabSection { section } => self.upgrade_lab_section(&section),
            Command::BuyServer { asset } => self.buy_server(&asset),
            Command::UpgradeServer { slot } => self.upgrade_server(slot),
            Command::BuyClassroomPc { classroom, slot } => self.buy_classroom_pc(&classroom, slot),
            Command::UpgradeClassroomPc { classroom, slot } => {
                self.upgrade_classroom_pc(&classroom, slot)
            }
            Command::BuyNetwork { classroom, slot } => self.buy_network(&classroom, slot),
            Command::UpgradeNetwork { classroom, slot } => self.upgrade_network(&classroom, slot),
            Command::BuyTeacher { classroom, slot } => self.buy_teacher(&classroom, slot),
            Command::UpgradeTeacher { classroom, slot } => self.upgrade_teacher(&classroom, slot),
            Command::BuyCooling { slot } => self.buy_cooling(slot),
            Command::UpgradeCooling { slot } => self.upgrade_cooling(slot),
            Command::BuyBackup { slot } => self.buy_backup(slot),
            Command::UpgradeBackup { slot } => self.upgrade_backup(slot),
            Command::UnlockTech { tech } => self.unlock_tech(&tech),
            Command::SetGymProfile { profile } => {
                self.set_gym_profile(profile);
                Ok(())
            }
            Command::PerformGymActivity => self.perform_gym_activity(),
        }
    }

    pub fn unlock_tech(&mut self, id: &TechId) -> Result<(), CommandError> {
        let cap = self.config.max_modifier;
        let outcome = tech::unlock(&mut self.state, &self.catalog, id, cap);
        self.settle("unlock_tech", outcome)
    }

    pub fn dismiss_message(&mut self) {
        if self.state.message.take().is_some() {
            self.state.revision += 1;
        }
    }

    /// Check funds, tech and power for `purchase`, in that order.
    pub(crate) fn authorize(&self, purchase: Purchase) -> Result<Authorized, CommandError> {
        let cost = self.state.modifiers.effective_cost(purchase.catalog_cost);
        if self.state.money < cost {
            return Err(CommandError::InsufficientFunds {
                needed: cost,
                available: self.state.money,
            });
        }
        if let Some(id) = purchase.tech_req {
            if !self.state.has_tech(&id) {
                let name = self
                    .catalog
                    .tech(&id)
                    .map(|n| n.name.clone())
                    .unwrap_or_default();
                return Err(CommandError::MissingTech { id, name });
            }
        }
        let draw = energy::projected_draw(&self.state, &self.catalog, purchase.draw);
        let capacity = purchase
            .capacity_after
            .unwrap_or_else(|| energy::capacity(&self.state, &self.catalog));
        if draw > capacity {
            return Err(CommandError::InsufficientPower { draw, capacity });
        }
        Ok(Authorized {
            cost,
            expands: purchase.expands,
        })
    }

    /// Deduct an authorised price and raise the CO2 ceiling for expansions.
    pub(crate) fn charge(&mut self, paid: Authorized) {
        self.state.money -= paid.cost;
        if paid.expands {
            self.raise_ceiling(paid.cost);
        }
    }

    pub(crate) fn raise_ceiling(&mut self, cost: Decimal) {
        self.state.co2_ceiling += (cost * self.config.ceiling_raise_fraction).floor();
    }

    /// Finish a command: refresh projections on success, surface the message
    /// on rejection.
    pub(crate) fn settle(
        &mut self,
        command: &'static str,
        outcome: Result<(), CommandError>,
    ) -> Result<(), CommandError> {
        match &outcome {
            Ok(()) => {
                self.refresh_readouts();
                self.state.revision += 1;
                debug!(command, money = %self.state.money, "command applied");
            }
            Err(err) => {
                if let Some(message) = err.user_message() {
                    self.state.message = Some(message);
                    self.state.revision += 1;
                }
                debug!(command, error = %err, "command rejected");
            }
        }
        outcome
    }

    fn refresh_readouts(&mut self) {
        let power = energy::report(&self.state, &self.catalog);
        self.state.energy_usage = power.usage;
        self.state.energy_capacity = power.capacity;
        self.state.student_count = tick::student_count(&self.state);
    }
}
