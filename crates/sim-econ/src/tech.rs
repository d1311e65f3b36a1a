//! Tech graph resolver: eligibility queries and the atomic unlock transition.

use crate::CommandError;
use rust_decimal::Decimal;
use sim_core::{Catalog, GameState, GlobalModifiers, TechEffect, TechId, TechNode};
use std::collections::BTreeSet;

/// Prerequisites of `node` that are not yet unlocked, in declaration order.
pub fn missing_prerequisites(node: &TechNode, unlocked: &BTreeSet<TechId>) -> Vec<TechId> {
    node.prerequisites
        .iter()
        .filter(|p| !unlocked.contains(*p))
        .cloned()
        .collect()
}

/// Not yet unlocked, every prerequisite unlocked, and research covers the cost.
pub fn is_unlockable(state: &GameState, node: &TechNode) -> bool {
    !state.unlocked_techs.contains(&node.id)
        && missing_prerequisites(node, &state.unlocked_techs).is_empty()
        && state.research >= node.cost
}

/// Every tech that could be unlocked right now, in catalog order.
pub fn unlockable_now(state: &GameState, catalog: &Catalog) -> Vec<TechId> {
    catalog
        .tech_tree
        .iter()
        .filter(|n| is_unlockable(state, n))
        .map(|n| n.id.clone())
        .collect()
}

/// Accumulate reduction effects, clamped to `cap`. Feature and room-level
/// effects are read through the unlocked set and need no materialisation.
pub fn apply_effects(modifiers: &mut GlobalModifiers, effects: &[TechEffect], cap: Decimal) {
    for effect in effects {
        match effect {
            TechEffect::Co2Reduction { value } => {
                modifiers.co2_reduction = (modifiers.co2_reduction + value).min(cap);
            }
            TechEffect::CostReduction { value } => {
                modifiers.cost_reduction = (modifiers.cost_reduction + value).min(cap);
            }
            TechEffect::UnlockFeature { .. } | TechEffect::UnlockRoomLevel { .. } => {}
        }
    }
}

/// Validate and perform an unlock: deduct research, record the id and apply
/// effects together, or change nothing.
pub fn unlock(
    state: &mut GameState,
    catalog: &Catalog,
    id: &TechId,
    cap: Decimal,
) -> Result<(), CommandError> {
    let node = catalog
        .tech(id)
        .ok_or_else(|| CommandError::UnknownTech(id.clone()))?;
    if state.unlocked_techs.contains(id) {
        return Err(CommandError::TechAlreadyUnlocked(id.clone()));
    }
    let missing = missing_prerequisites(node, &state.unlocked_techs);
    if !missing.is_empty() {
        return Err(CommandError::MissingPrerequisites(missing));
    }
    if state.research < node.cost {
        return Err(CommandError::InsufficientResearch {
            needed: node.cost,
            available: state.research,
        });
    }

    state.research -= node.cost;
    state.unlocked_techs.insert(id.clone());
    apply_effects(&mut state.modifiers, &node.effects, cap);
    Ok(())
}
