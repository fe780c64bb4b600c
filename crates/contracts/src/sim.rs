//! Simulation-side vocabulary shared by the engine and the loggers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Agent number, unique for the whole run
pub type AgentId = u64;

/// Read-only handle onto the running simulation
///
/// Handed to every logger during `init`.
#[derive(Debug, Clone)]
pub struct SimContext {
    /// Run directory; every artifact is written below it
    pub run_dir: PathBuf,
    /// Number of genes in every genome of this run
    pub genome_len: usize,
    /// Number of energy types tracked per agent
    pub energy_types: usize,
}

impl SimContext {
    pub fn new(run_dir: impl Into<PathBuf>, genome_len: usize, energy_types: usize) -> Self {
        Self {
            run_dir: run_dir.into(),
            genome_len,
            energy_types,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// How an agent came into the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BirthKind {
    /// Seeded at simulation start
    SimInit,
    /// Spontaneously created to keep the population up
    Create,
    /// Born to two parents
    Birth,
    /// Virtual birth recorded for passive replays
    Virtual,
}

impl BirthKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BirthKind::SimInit => "SIMINIT",
            BirthKind::Create => "CREATION",
            BirthKind::Birth => "BIRTH",
            BirthKind::Virtual => "VIRTUAL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeathCause {
    Natural,
    Starved,
    Fight,
    Eaten,
    Edge,
    Smite,
    SimEnd,
}

impl DeathCause {
    pub fn as_str(self) -> &'static str {
        match self {
            DeathCause::Natural => "NATURAL",
            DeathCause::Starved => "STARVED",
            DeathCause::Fight => "FIGHT",
            DeathCause::Eaten => "EATEN",
            DeathCause::Edge => "EDGE",
            DeathCause::Smite => "SMITE",
            DeathCause::SimEnd => "SIMEND",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CarryAction {
    Pickup,
    DropRecent,
    DropObject,
}

impl CarryAction {
    pub fn as_str(self) -> &'static str {
        match self {
            CarryAction::Pickup => "PICKUP",
            CarryAction::DropRecent => "DROP_RECENT",
            CarryAction::DropObject => "DROP_OBJECT",
        }
    }
}

/// Kind of world object an agent interacted with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    Agent,
    Food,
    Brick,
    Barrier,
    Edge,
}

impl ObjectType {
    pub fn as_str(self) -> &'static str {
        match self {
            ObjectType::Agent => "AGENT",
            ObjectType::Food => "FOOD",
            ObjectType::Brick => "BRICK",
            ObjectType::Barrier => "BARRIER",
            ObjectType::Edge => "EDGE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergyAction {
    Give,
    Fight,
    Eat,
}

impl EnergyAction {
    pub fn as_str(self) -> &'static str {
        match self {
            EnergyAction::Give => "GIVE",
            EnergyAction::Fight => "FIGHT",
            EnergyAction::Eat => "EAT",
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )*
    };
}

display_as_str!(BirthKind, DeathCause, CarryAction, ObjectType, EnergyAction);
