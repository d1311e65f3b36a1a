use rust_decimal::Decimal;
use sim_core::{AssetTypeId, GymGoal, RoomId, SectionId, TechId};
use thiserror::Error;

/// Rejection categories a presentation layer may react to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rejection {
    /// Not enough money or research; silent.
    InsufficientFunds,
    /// Power budget would be exceeded; surfaces a message.
    InsufficientPower,
    /// A tech prerequisite is missing; surfaces a message naming it.
    MissingTech,
    /// Room, category or slot is at its cap; surfaces a message.
    Exhausted,
    /// Unknown id, bad slot index or a precondition the UI should gate; silent.
    InvalidTarget,
}

/// Why a command was rejected. Rejections never leave partial state behind.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: Decimal, available: Decimal },
    #[error("insufficient research points: need {needed}, have {available}")]
    InsufficientResearch { needed: Decimal, available: Decimal },
    #[error("not enough power: draw {draw} would exceed capacity {capacity}")]
    InsufficientPower { draw: u32, capacity: u32 },
    #[error("generator capacity {capacity} is below the required {required}")]
    CapacityBelowRequirement { required: u32, capacity: u32 },
    #[error("research required: {name} ({id})")]
    MissingTech { id: TechId, name: String },
    #[error("missing prerequisites: {}", join_ids(.0))]
    MissingPrerequisites(Vec<TechId>),
    #[error("{0} is maxed out")]
    Maxed(String),
    #[error("no free {0} slot")]
    NoFreeSlot(String),
    #[error("slot {0} is already occupied")]
    SlotOccupied(usize),
    #[error("slot {0} is empty")]
    SlotEmpty(usize),
    #[error("slot {0} does not exist")]
    InvalidSlot(usize),
    #[error("unknown room: {0}")]
    UnknownRoom(RoomId),
    #[error("unknown classroom: {0}")]
    UnknownClassroom(RoomId),
    #[error("room {0} is locked")]
    RoomLocked(RoomId),
    #[error("room {0} is already unlocked")]
    RoomAlreadyUnlocked(RoomId),
    #[error("unknown server asset type: {0}")]
    UnknownAssetType(AssetTypeId),
    #[error("server room level {required} required (current {current})")]
    RoomLevelTooLow { required: u8, current: u8 },
    #[error("unknown lab section: {0}")]
    UnknownSection(SectionId),
    #[error("unknown tech: {0}")]
    UnknownTech(TechId),
    #[error("tech {0} is already unlocked")]
    TechAlreadyUnlocked(TechId),
    #[error("gym profile has not been set")]
    ProfileMissing,
    #[error("no gym activity for goal {0:?}")]
    NoActivity(GymGoal),
}

fn join_ids(ids: &[TechId]) -> String {
    ids.iter()
        .map(TechId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

impl CommandError {
    pub fn rejection(&self) -> Rejection {
        use CommandError::*;
        match self {
            InsufficientFunds { .. } | InsufficientResearch { .. } => Rejection::InsufficientFunds,
            InsufficientPower { .. } | CapacityBelowRequirement { .. } => {
                Rejection::InsufficientPower
            }
            MissingTech { .. } | MissingPrerequisites(_) => Rejection::MissingTech,
            Maxed(_) | NoFreeSlot(_) | RoomLevelTooLow { .. } | ProfileMissing => {
                Rejection::Exhausted
            }
            SlotOccupied(_)
            | SlotEmpty(_)
            | InvalidSlot(_)
            | UnknownRoom(_)
            | UnknownClassroom(_)
            | RoomLocked(_)
            | RoomAlreadyUnlocked(_)
            | UnknownAssetType(_)
            | UnknownSection(_)
            | UnknownTech(_)
            | TechAlreadyUnlocked(_)
            | NoActivity(_) => Rejection::InvalidTarget,
        }
    }

    /// Message shown to the player, if this rejection is not silent.
    pub fn user_message(&self) -> Option<String> {
        use CommandError::*;
        match self {
            InsufficientPower { .. } | CapacityBelowRequirement { .. } => {
                Some("Not enough power! Upgrade the generator.".to_string())
            }
            MissingTech { id, name } => Some(format!("Research required: {name} ({id})")),
            MissingPrerequisites(ids) => Some(format!("Research required: {}", join_ids(ids))),
            Maxed(what) => Some(format!("{what} is maxed out.")),
            NoFreeSlot(what) => Some(format!("No free {what} slot.")),
            RoomLevelTooLow { required, .. } => {
                Some(format!("Server room level {required} required."))
            }
            ProfileMissing => Some("Fill in the gym questionnaire first.".to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn funds_are_silent() {
        let e = CommandError::InsufficientFunds {
            needed: Decimal::from(100),
            available: Decimal::from(5),
        };
        assert_eq!(e.user_message(), None);
        assert_eq!(e.rejection(), Rejection::InsufficientFunds);
    }

    #[test]
    fn missing_tech_names_the_tech() {
        let e = CommandError::MissingTech {
            id: TechId::new("C3"),
            name: "School Network".into(),
        };
        let msg = e.user_message().unwrap();
        assert!(msg.contains("C3") && msg.contains("School Network"));
        let e = CommandError::MissingPrerequisites(vec![TechId::new("T6"), TechId::new("T7")]);
        assert_eq!(e.to_string(), "missing prerequisites: T6, T7");
    }

    #[test]
    fn power_rejection_surfaces_message() {
        let e = CommandError::InsufficientPower {
            draw: 31,
            capacity: 30,
        };
        assert_eq!(e.rejection(), Rejection::InsufficientPower);
        assert!(e.user_message().is_some());
    }
}
