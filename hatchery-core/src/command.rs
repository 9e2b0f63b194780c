//! Control records: what to do, to which unit, and when.

use serde::{Deserialize, Serialize};

use crate::error::SimulationError;

/// Control actions, with the integer codes used on the inbound channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    HeatlampOn,
    HeatlampOff,
    DoorOpen,
    DoorClosed,
    BustHeatlamp,
    FixHeatlamp,
}

impl CommandKind {
    pub const ALL: [CommandKind; 6] = [
        CommandKind::HeatlampOn,
        CommandKind::HeatlampOff,
        CommandKind::DoorOpen,
        CommandKind::DoorClosed,
        CommandKind::BustHeatlamp,
        CommandKind::FixHeatlamp,
    ];

    pub fn code(self) -> i32 {
        match self {
            CommandKind::HeatlampOn => 1,
            CommandKind::HeatlampOff => 2,
            CommandKind::DoorOpen => 3,
            CommandKind::DoorClosed => 4,
            CommandKind::BustHeatlamp => 5,
            CommandKind::FixHeatlamp => 6,
        }
    }

    /// Room-wide commands act on every unit and carry no unit id.
    pub fn is_room_wide(self) -> bool {
        matches!(self, CommandKind::DoorOpen | CommandKind::DoorClosed)
    }
}

impl TryFrom<i32> for CommandKind {
    type Error = SimulationError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        CommandKind::ALL
            .into_iter()
            .find(|kind| kind.code() == code)
            .ok_or(SimulationError::UnknownCommand(code))
    }
}

/// An immutable, time-stamped control action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlRecord {
    pub scheduled_ms: i64,
    pub kind: CommandKind,
    pub unit_id: Option<i32>,
}

impl ControlRecord {
    /// Builds a record, discarding `unit_id` for room-wide commands.
    pub fn new(scheduled_ms: i64, kind: CommandKind, unit_id: Option<i32>) -> Self {
        Self {
            scheduled_ms,
            kind,
            unit_id: if kind.is_room_wide() { None } else { unit_id },
        }
    }

    pub fn for_unit(scheduled_ms: i64, kind: CommandKind, unit_id: i32) -> Self {
        Self::new(scheduled_ms, kind, Some(unit_id))
    }

    pub fn room_wide(scheduled_ms: i64, kind: CommandKind) -> Self {
        Self::new(scheduled_ms, kind, None)
    }
}
