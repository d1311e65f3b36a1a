#![deny(warnings)]

//! Core domain models and invariants for Campus Tycoon.
//!
//! This crate defines the serializable content catalog, the engine
//! configuration and the canonical game state shared by the economy engine,
//! the runtime and persistence, together with validation helpers that guard
//! their basic invariants.

use serde::{Deserialize, Serialize};
use std::fmt;

mod catalog;
mod config;
mod standard;
mod state;
mod validate;

pub use catalog::*;
pub use config::*;
pub use state::*;
pub use validate::*;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

string_id!(
    /// Unique identifier for a tech node, e.g. "T1", "C3", "T_QUANTUM".
    TechId
);
string_id!(
    /// Identifier of a room on the fixed map, e.g. "server-main", "classroom-1".
    RoomId
);
string_id!(
    /// Server asset type, e.g. "tower", "rack", "quantum".
    AssetTypeId
);
string_id!(
    /// Research lab section, e.g. "infra", "gym".
    SectionId
);

/// Kinds of rooms on the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomKind {
    Generator,
    Server,
    Classroom,
    Gym,
    Research,
    Arcade,
}

impl fmt::Display for RoomKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RoomKind::Generator => "generator",
            RoomKind::Server => "server room",
            RoomKind::Classroom => "classroom",
            RoomKind::Gym => "gym",
            RoomKind::Research => "research lab",
            RoomKind::Arcade => "arcade",
        };
        f.write_str(name)
    }
}

/// Tile-space bounding rectangle of a room (inclusive corners).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Rect {
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }
}
