use serde::{Deserialize, Serialize};
use sim_core::{AssetTypeId, GymProfile, RoomId, SectionId, TechId};

/// A player command as data, dispatched by [`crate::Engine::execute`].
///
/// Ticks are not commands: they are driven by the runtime's fixed-period
/// driver only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    UnlockRoom { room: RoomId },
    InspectRoom { room: Option<RoomId> },
    DismissMessage,
    UpgradeGenerator,
    UpgradeServerRoom,
    UpgradeClassroom { classroom: RoomId },
    UpgradeGym,
    UpgradeLabSection { section: SectionId },
    BuyServer { asset: AssetTypeId },
    UpgradeServer { slot: usize },
    BuyClassroomPc { classroom: RoomId, slot: usize },
    UpgradeClassroomPc { classroom: RoomId, slot: usize },
    BuyNetwork { classroom: RoomId, slot: usize },
    UpgradeNetwork { classroom: RoomId, slot: usize },
    BuyTeacher { classroom: RoomId, slot: usize },
    UpgradeTeacher { classroom: RoomId, slot: usize },
    BuyCooling { slot: usize },
    UpgradeCooling { slot: usize },
    BuyBackup { slot: usize },
    UpgradeBackup { slot: usize },
    UnlockTech { tech: TechId },
    SetGymProfile { profile: GymProfile },
    PerformGymActivity,
}

impl Command {
    /// Stable snake_case name, as used in scripts and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Command::UnlockRoom { .. } => "unlock_room",
            Command::InspectRoom { .. } => "inspect_room",
            Command::DismissMessage => "dismiss_message",
            Command::UpgradeGenerator => "upgrade_generator",
            Command::UpgradeServerRoom => "upgrade_server_room",
            Command::UpgradeClassroom { .. } => "upgrade_classroom",
            Command::UpgradeGym => "upgrade_gym",
            Command::UpgradeLabSection { .. } => "upgrade_lab_section",
            Command::BuyServer { .. } => "buy_server",
            Command::UpgradeServer { .. } => "upgrade_server",
            Command::BuyClassroomPc { .. } => "buy_classroom_pc",
            Command::UpgradeClassroomPc { .. } => "upgrade_classroom_pc",
            Command::BuyNetwork { .. } => "buy_network",
            Command::UpgradeNetwork { .. } => "upgrade_network",
            Command::BuyTeacher { .. } => "buy_teacher",
            Command::UpgradeTeacher { .. } => "upgrade_teacher",
            Command::BuyCooling { .. } => "buy_cooling",
            Command::UpgradeCooling { .. } => "upgrade_cooling",
            Command::BuyBackup { .. } => "buy_backup",
            Command::UpgradeBackup { .. } => "upgrade_backup",
            Command::UnlockTech { .. } => "unlock_tech",
            Command::SetGymProfile { .. } => "set_gym_profile",
            Command::PerformGymActivity => "perform_gym_activity",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_core::{GymFrequency, GymGoal};

    #[test]
    fn parses_yaml_script() {
        let text = r#"
- command: buy_classroom_pc
  classroom: classroom-1
  slot: 1
- command: upgrade_generator
- command: set_gym_profile
  profile:
    goal: weight_loss
    frequency: daily
- command: inspect_room
  room: null
"#;
        let script: Vec<Command> = serde_yaml::from_str(text).unwrap();
        assert_eq!(
            script[0],
            Command::BuyClassroomPc {
                classroom: RoomId::new("classroom-1"),
                slot: 1
            }
        );
        assert_eq!(script[1], Command::UpgradeGenerator);
        assert_eq!(
            script[2],
            Command::SetGymProfile {
                profile: GymProfile {
                    goal: GymGoal::WeightLoss,
                    frequency: GymFrequency::Daily
                }
            }
        );
        assert_eq!(script[3], Command::InspectRoom { room: None });
    }

    #[test]
    fn name_matches_serde_tag() {
        let cmd = Command::UnlockTech {
            tech: TechId::new("M1"),
        };
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["command"], cmd.name());
        assert_eq!(json["tech"], "M1");
    }
}
