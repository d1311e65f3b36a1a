use crate::{CommandError, Engine};
use rust_decimal::Decimal;
use sim_core::GymProfile;
use tracing::debug;

impl Engine {
    /// Record the questionnaire answers. Later calls overwrite earlier ones.
    pub fn set_gym_profile(&mut self, profile: GymProfile) {
        debug!(goal = ?profile.goal, frequency = ?profile.frequency, "gym profile set");
        self.state.gym_profile = Some(profile);
        self.state.revision += 1;
    }

    /// Reward the current profile's activity would pay at the current gym level.
    pub fn gym_reward(&self) -> Result<Decimal, CommandError> {
        let profile = self.state.gym_profile.ok_or(CommandError::ProfileMissing)?;
        let activity = self
            .catalog
            .gym_activities
            .get(&profile.goal)
            .ok_or(CommandError::NoActivity(profile.goal))?;
        let tiers = &self.catalog.gym_rewards;
        let mut reward = tiers.base;
        if self.state.gym_level >= tiers.mid_tier_level {
            reward += tiers.mid_tier_bonus;
        }
        if self.state.gym_level >= tiers.top_tier_level {
            reward += activity.reward;
        }
        Ok(reward)
    }

    /// Pay the activity reward. Not subject to the power gate.
    pub fn perform_gym_activity(&mut self) -> Result<(), CommandError> {
        let outcome = self.gym_reward().map(|reward| {
            self.state.money += reward;
        });
        self.settle("perform_gym_activity", outcome)
    }
}
