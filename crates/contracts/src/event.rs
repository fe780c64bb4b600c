//! Event catalog - engine → dispatcher input
//!
//! A closed set of event kinds, one bit each. Payloads borrow engine state
//! for the duration of a single dispatch call.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

use crate::{AgentId, BirthKind, CarryAction, DeathCause, EnergyAction, ObjectType, Position};

/// A single event kind (exactly one bit)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u32)]
pub enum EventKind {
    StepEnd = 1 << 0,
    AgentBirth = 1 << 1,
    AgentBodyUpdated = 1 << 2,
    AgentDeath = 1 << 3,
    Carry = 1 << 4,
    Collision = 1 << 5,
    AgentContactBegin = 1 << 6,
    AgentContactEnd = 1 << 7,
    Energy = 1 << 8,
}

impl EventKind {
    /// Number of kinds in the catalog
    pub const COUNT: usize = 9;

    /// All kinds, in bit order
    pub const ALL: [EventKind; Self::COUNT] = [
        EventKind::StepEnd,
        EventKind::AgentBirth,
        EventKind::AgentBodyUpdated,
        EventKind::AgentDeath,
        EventKind::Carry,
        EventKind::Collision,
        EventKind::AgentContactBegin,
        EventKind::AgentContactEnd,
        EventKind::Energy,
    ];

    /// Raw bit value
    #[inline]
    pub const fn bit(self) -> u32 {
        self as u32
    }

    /// Position of the bit, usable as a dense table index
    #[inline]
    pub const fn index(self) -> usize {
        (self as u32).trailing_zeros() as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            EventKind::StepEnd => "StepEnd",
            EventKind::AgentBirth => "AgentBirth",
            EventKind::AgentBodyUpdated => "AgentBodyUpdated",
            EventKind::AgentDeath => "AgentDeath",
            EventKind::Carry => "Carry",
            EventKind::Collision => "Collision",
            EventKind::AgentContactBegin => "AgentContactBegin",
            EventKind::AgentContactEnd => "AgentContactEnd",
            EventKind::Energy => "Energy",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Bitmask of event kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EventKinds(u32);

impl EventKinds {
    pub const NONE: EventKinds = EventKinds(0);

    /// Build a mask from a list of kinds
    pub const fn of(kinds: &[EventKind]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < kinds.len() {
            bits |= kinds[i].bit();
            i += 1;
        }
        Self(bits)
    }

    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn contains(self, kind: EventKind) -> bool {
        self.0 & kind.bit() != 0
    }

    /// True if every kind in `other` is also in `self`
    #[inline]
    pub const fn contains_all(self, other: EventKinds) -> bool {
        self.0 & other.0 == other.0
    }

    /// Kinds in this mask, in bit order
    pub fn iter(self) -> impl Iterator<Item = EventKind> {
        EventKind::ALL.into_iter().filter(move |k| self.contains(*k))
    }
}

impl From<EventKind> for EventKinds {
    fn from(kind: EventKind) -> Self {
        Self(kind.bit())
    }
}

impl BitOr for EventKinds {
    type Output = EventKinds;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOr<EventKind> for EventKinds {
    type Output = EventKinds;

    fn bitor(self, rhs: EventKind) -> Self::Output {
        Self(self.0 | rhs.bit())
    }
}

impl BitOrAssign for EventKinds {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for EventKinds {
    type Output = EventKinds;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self(self.0 & rhs.0)
    }
}

impl fmt::Display for EventKinds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for kind in self.iter() {
            if !first {
                f.write_str("|")?;
            }
            f.write_str(kind.name())?;
            first = false;
        }
        if first {
            f.write_str("(none)")?;
        }
        Ok(())
    }
}

/// Minimal per-agent view handed out at step end
#[derive(Debug, Clone, Copy)]
pub struct AgentView<'a> {
    pub id: AgentId,
    pub genome: &'a [u8],
}

/// End of one simulation step
#[derive(Debug, Clone, Copy)]
pub struct StepEnd<'a> {
    pub timestep: u64,
    /// Living population, sorted by agent id
    pub population: &'a [AgentView<'a>],
}

#[derive(Debug, Clone, Copy)]
pub struct AgentBirth<'a> {
    pub timestep: u64,
    pub agent: AgentId,
    pub kind: BirthKind,
    /// Parents, present for `BirthKind::Birth` only
    pub parents: Option<(AgentId, AgentId)>,
    pub position: Position,
    pub genome: &'a [u8],
}

#[derive(Debug, Clone, Copy)]
pub struct AgentBodyUpdated {
    pub timestep: u64,
    pub agent: AgentId,
    pub position: Position,
}

#[derive(Debug, Clone, Copy)]
pub struct AgentDeath {
    pub timestep: u64,
    pub agent: AgentId,
    pub cause: DeathCause,
    pub birth_timestep: u64,
    pub birth_kind: BirthKind,
}

#[derive(Debug, Clone, Copy)]
pub struct Carry {
    pub timestep: u64,
    pub agent: AgentId,
    pub action: CarryAction,
    pub object_type: ObjectType,
    pub object_number: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct Collision {
    pub timestep: u64,
    pub agent: AgentId,
    pub object_type: ObjectType,
}

#[derive(Debug, Clone, Copy)]
pub struct AgentContactBegin {
    pub timestep: u64,
    pub a: AgentId,
    pub b: AgentId,
}

/// Outcome of one interaction attempted during a contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactOutcome {
    #[default]
    NotAttempted,
    Succeeded,
    /// Attempted but prevented by a reason code (single ASCII letter)
    Prevented(char),
}

/// Per-agent block of an ended contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContactInfo {
    pub agent: AgentId,
    #[serde(default)]
    pub collided: bool,
    #[serde(default)]
    pub mate: ContactOutcome,
    #[serde(default)]
    pub fight: ContactOutcome,
    #[serde(default)]
    pub give: ContactOutcome,
}

#[derive(Debug, Clone, Copy)]
pub struct AgentContactEnd {
    pub timestep: u64,
    pub a: ContactInfo,
    pub b: ContactInfo,
}

#[derive(Debug, Clone, Copy)]
pub struct Energy<'a> {
    pub timestep: u64,
    pub agent: AgentId,
    /// Counterpart: an agent for give/fight, a food piece for eat
    pub other: u64,
    pub action: EnergyAction,
    pub neural_activation: f32,
    /// One delta per energy type
    pub energy: &'a [f32],
}

/// Tagged event value posted by the engine
#[derive(Debug, Clone, Copy)]
pub enum Event<'a> {
    StepEnd(StepEnd<'a>),
    AgentBirth(AgentBirth<'a>),
    AgentBodyUpdated(AgentBodyUpdated),
    AgentDeath(AgentDeath),
    Carry(Carry),
    Collision(Collision),
    AgentContactBegin(AgentContactBegin),
    AgentContactEnd(AgentContactEnd),
    Energy(Energy<'a>),
}

impl Event<'_> {
    #[inline]
    pub fn kind(&self) -> EventKind {
        match self {
            Event::StepEnd(_) => EventKind::StepEnd,
            Event::AgentBirth(_) => EventKind::AgentBirth,
            Event::AgentBodyUpdated(_) => EventKind::AgentBodyUpdated,
            Event::AgentDeath(_) => EventKind::AgentDeath,
            Event::Carry(_) => EventKind::Carry,
            Event::Collision(_) => EventKind::Collision,
            Event::AgentContactBegin(_) => EventKind::AgentContactBegin,
            Event::AgentContactEnd(_) => EventKind::AgentContactEnd,
            Event::Energy(_) => EventKind::Energy,
        }
    }

    /// Timestep the event belongs to
    pub fn timestep(&self) -> u64 {
        match self {
            Event::StepEnd(e) => e.timestep,
            Event::AgentBirth(e) => e.timestep,
            Event::AgentBodyUpdated(e) => e.timestep,
            Event::AgentDeath(e) => e.timestep,
            Event::Carry(e) => e.timestep,
            Event::Collision(e) => e.timestep,
            Event::AgentContactBegin(e) => e.timestep,
            Event::AgentContactEnd(e) => e.timestep,
            Event::Energy(e) => e.timestep,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_bits_are_distinct() {
        let mut seen = 0u32;
        for kind in EventKind::ALL {
            assert_eq!(kind.bit().count_ones(), 1);
            assert_eq!(seen & kind.bit(), 0, "{kind} overlaps");
            seen |= kind.bit();
        }
        assert_eq!(EventKind::ALL.len(), EventKind::COUNT);
    }

    #[test]
    fn test_kind_index_is_dense() {
        for (i, kind) in EventKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn test_mask_ops() {
        let mask = EventKinds::of(&[EventKind::AgentBirth, EventKind::AgentDeath]);
        assert!(mask.contains(EventKind::AgentBirth));
        assert!(!mask.contains(EventKind::StepEnd));
        assert!(mask.contains_all(EventKind::AgentDeath.into()));
        assert!(!mask.contains_all(mask | EventKind::Energy));
        assert_eq!(
            mask.iter().collect::<Vec<_>>(),
            vec![EventKind::AgentBirth, EventKind::AgentDeath]
        );
        assert_eq!(mask.to_string(), "AgentBirth|AgentDeath");
        assert_eq!(EventKinds::NONE.to_string(), "(none)");
    }

    #[test]
    fn test_event_kind_matches_payload() {
        let event = Event::Collision(Collision {
            timestep: 4,
            agent: 2,
            object_type: ObjectType::Barrier,
        });
        assert_eq!(event.kind(), EventKind::Collision);
        assert_eq!(event.timestep(), 4);
    }
}
