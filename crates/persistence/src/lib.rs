#![deny(warnings)]

//! Persistence layer: versioned JSON save files holding a full game state.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sim_core::{validate_state, Catalog, GameState};
use std::fs;
use std::path::Path;
use tracing::info;

/// Save format written by this build.
pub const FORMAT_VERSION: u32 = 1;

/// Returns the default path used for local saves.
pub fn default_save_path() -> &'static str {
    "./saves/campus.json"
}

/// A saved game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SaveFile {
    /// Layout version; loading rejects anything but [`FORMAT_VERSION`].
    pub format_version: u32,
    /// Wall-clock time of the save.
    pub saved_at: DateTime<Utc>,
    /// Full game state, checked against the catalog on load.
    pub state: GameState,
}

impl SaveFile {
    /// Wrap `state` for saving, stamped with the current time.
    pub fn new(state: GameState) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            saved_at: Utc::now(),
            state,
        }
    }

    /// Pretty-printed JSON text of the save.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("serialize save file")
    }

    /// Parse a save and check it against `catalog`.
    pub fn from_json(text: &str, catalog: &Catalog) -> Result<Self> {
        let save: SaveFile = serde_json::from_str(text).context("parse save file")?;
        if save.format_version != FORMAT_VERSION {
            bail!(
                "unsupported save format version {} (expected {FORMAT_VERSION})",
                save.format_version
            );
        }
        validate_state(&save.state, catalog).context("saved state is inconsistent")?;
        Ok(save)
    }
}

/// Write `state` to `path`, creating parent directories as needed.
pub fn save_to_path(path: impl AsRef<Path>, state: &GameState) -> Result<SaveFile> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create save directory {}", parent.display()))?;
    }
    let save = SaveFile::new(state.clone());
    fs::write(path, save.to_json()?).with_context(|| format!("write {}", path.display()))?;
    info!(path = %path.display(), tick = state.tick, "game saved");
    Ok(save)
}

/// Read and validate a save written by [`save_to_path`].
pub fn load_from_path(path: impl AsRef<Path>, catalog: &Catalog) -> Result<SaveFile> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let save =
        SaveFile::from_json(&text, catalog).with_context(|| format!("load {}", path.display()))?;
    info!(path = %path.display(), tick = save.state.tick, saved_at = %save.saved_at, "game loaded");
    Ok(save)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal::Decimal;
    use sim_core::{SimConfig, TechId};
    use std::path::PathBuf;

    fn state() -> GameState {
        GameState::new(&Catalog::standard(), &SimConfig::default())
    }

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("campus-persistence-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn default_path_is_json() {
        assert!(default_save_path().ends_with(".json"));
    }

    #[test]
    fn save_and_load_file() {
        let path = scratch("roundtrip/save.json");
        let mut s = state();
        s.tick = 42;
        s.unlocked_techs.insert(TechId::new("M1"));
        let saved = save_to_path(&path, &s).unwrap();
        let loaded = load_from_path(&path, &Catalog::standard()).unwrap();
        assert_eq!(loaded, saved);
        assert_eq!(loaded.state.tick, 42);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn rejects_unknown_version() {
        let mut save = SaveFile::new(state());
        save.format_version = FORMAT_VERSION + 1;
        let err = SaveFile::from_json(&save.to_json().unwrap(), &Catalog::standard())
            .unwrap_err();
        assert!(err.to_string().contains("unsupported save format"));
    }

    #[test]
    fn rejects_inconsistent_state() {
        let mut s = state();
        s.generator_level = 11;
        let text = SaveFile::new(s).to_json().unwrap();
        assert!(SaveFile::from_json(&text, &Catalog::standard()).is_err());
    }

    #[test]
    fn rejects_oversized_slot_arrays() {
        let catalog = Catalog::standard();
        let mut s = state();
        if let Some(room) = s.classrooms.values_mut().next() {
            room.pcs.resize(catalog.limits.pc_slots + 40, None);
        }
        s.server_slots.resize(99, None);
        let text = SaveFile::new(s).to_json().unwrap();
        let err = SaveFile::from_json(&text, &catalog).unwrap_err();
        assert!(format!("{err:#}").contains("slots"));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_from_path(scratch("absent.json"), &Catalog::standard()).unwrap_err();
        assert!(format!("{err:#}").contains("absent.json"));
    }

    proptest! {
        #[test]
        fn balances_survive_json(cents in 0i64..1_000_000_000, rp in 0i64..1_000_000) {
            let mut s = state();
            s.money = Decimal::new(cents, 2);
            s.research = Decimal::from(rp);
            let text = SaveFile::new(s.clone()).to_json().unwrap();
            let back = SaveFile::from_json(&text, &Catalog::standard()).unwrap();
            prop_assert_eq!(back.state.money, s.money);
            prop_assert_eq!(back.state.research, s.research);
        }
    }
}
