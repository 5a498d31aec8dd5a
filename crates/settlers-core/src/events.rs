//! Events reported while a match runs.
//!
//! The game session pushes events into a [`ReportSink`] supplied by the caller.
//! Rendering and announcement live behind that trait; the default sink just
//! logs through `tracing`.

use crate::board::{Road, Structure};
use crate::game::{GamePhase, PlayerIndex};
use serde::{Deserialize, Serialize};
use std::sync::mpsc::Sender;
use tracing::info;

/// Events that occur as a match progresses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A phase began executing
    PhaseStarted { phase: GamePhase },

    /// The match moved to a new phase
    PhaseChanged { from: GamePhase, to: GamePhase },

    /// A settlement or city was built
    StructureBuilt {
        player: PlayerIndex,
        structure: Structure,
    },

    /// A road was built
    RoadBuilt { player: PlayerIndex, road: Road },

    /// A player won the game
    GameWon {
        player: PlayerIndex,
        name: String,
        victory_points: u32,
    },
}

/// Receives events from a running match
pub trait ReportSink {
    fn report(&mut self, event: GameEvent);
}

/// Sink that writes every event to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ReportSink for TracingReporter {
    fn report(&mut self, event: GameEvent) {
        match event {
            GameEvent::PhaseStarted { phase } => info!(?phase, "Executing phase"),
            GameEvent::PhaseChanged { from, to } => info!(?from, ?to, "Phase changed"),
            GameEvent::StructureBuilt { player, structure } => {
                info!(player, vertex = ?structure.vertex, kind = ?structure.kind, "Structure built")
            }
            GameEvent::RoadBuilt { player, road } => {
                info!(player, edge = ?road.edge, "Road built")
            }
            GameEvent::GameWon {
                player,
                name,
                victory_points,
            } => info!(player, %name, victory_points, "Game won"),
        }
    }
}

/// Collects events, mostly useful in tests and replays
impl ReportSink for Vec<GameEvent> {
    fn report(&mut self, event: GameEvent) {
        self.push(event);
    }
}

/// Forwards events to another thread. A hung-up receiver drops them.
impl ReportSink for Sender<GameEvent> {
    fn report(&mut self, event: GameEvent) {
        let _ = self.send(event);
    }
}
