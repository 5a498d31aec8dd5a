//! Settlers - board state and rules core for a settlers-on-a-hex-grid game
//!
//! This crate provides:
//! - Hex coordinate system with canonical vertex and edge addressing
//! - An immutable board with occupancy-checked placement
//! - Player ledgers
//! - The Setup -> Play -> End phase machine
//!
//! # Architecture
//!
//! Everything here is synchronous and in-memory. Dice, trading, scoring
//! policy, rendering and persistence are collaborators that plug in through
//! [`TurnOrchestrator`], [`ScoreProvider`], [`ReportSink`] and an injected
//! [`rand::Rng`].
//!
//! # Modules
//!
//! - [`hex`]: Coordinate system for hex tiles, vertices, and edges
//! - [`board`]: Tiles, harbors, structures, roads and the board factory
//! - [`player`]: Player ledgers and resource hands
//! - [`game`]: Match session and phase machine
//! - [`events`]: Events reported while a match runs
//! - [`config`]: Match configuration

pub mod board;
pub mod config;
pub mod events;
pub mod game;
pub mod hex;
pub mod player;

// Re-export commonly used types
pub use board::{
    create_initial_board, Board, BoardError, BoardSnapshot, Harbor, HarborKind, HexTile,
    ResourceKind, Road, Structure, StructureKind, TileKind,
};
pub use config::{ConfigError, GameConfig};
pub use events::{GameEvent, ReportSink, TracingReporter};
pub use game::{
    Game, GameError, GamePhase, LedgerScore, PassTurns, PlayerIndex, ScoreProvider,
    TurnOrchestrator,
};
pub use hex::{
    axial_spiral_coords, EdgeCoord, EdgeDirection, HexCoord, VertexCoord, VertexDirection,
};
pub use player::{Player, ResourceHand};
