//! Player state and resource bookkeeping.
//!
//! - `ResourceHand`: card counts per resource
//! - `Player`: append-only record of what a player owns
//!
//! The board is the source of truth for occupancy. A player only records what
//! they built, after the board accepted the placement.

use crate::board::{ResourceKind, Road, Structure};
use serde::{Deserialize, Serialize};

/// A hand of resources
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceHand {
    pub brick: u32,
    pub lumber: u32,
    pub ore: u32,
    pub sheep: u32,
    pub wheat: u32,
}

impl ResourceHand {
    pub fn new() -> Self {
        Self::default()
    }

    /// Amounts in `ResourceKind` order
    pub fn with_amounts(brick: u32, lumber: u32, ore: u32, sheep: u32, wheat: u32) -> Self {
        Self {
            brick,
            lumber,
            ore,
            sheep,
            wheat,
        }
    }

    /// Cards held across all resources
    pub fn total(&self) -> u32 {
        ResourceKind::ALL
            .iter()
            .map(|r| self.get(*r))
            .fold(0, u32::saturating_add)
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn get(&self, resource: ResourceKind) -> u32 {
        match resource {
            ResourceKind::Brick => self.brick,
            ResourceKind::Lumber => self.lumber,
            ResourceKind::Ore => self.ore,
            ResourceKind::Sheep => self.sheep,
            ResourceKind::Wheat => self.wheat,
        }
    }

    pub fn set(&mut self, resource: ResourceKind, count: u32) {
        match resource {
            ResourceKind::Brick => self.brick = count,
            ResourceKind::Lumber => self.lumber = count,
            ResourceKind::Ore => self.ore = count,
            ResourceKind::Sheep => self.sheep = count,
            ResourceKind::Wheat => self.wheat = count,
        }
    }
}

/// A single player's ledger.
///
/// Values are immutable: every change yields an updated copy that replaces the
/// previous one in the game session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    name: String,
    resources: ResourceHand,
    owned_structures: Vec<Structure>,
    owned_roads: Vec<Road>,
}

impl Player {
    /// Create a new player with no resources and nothing built
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resources: ResourceHand::new(),
            owned_structures: Vec::new(),
            owned_roads: Vec::new(),
        }
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current resources
    pub fn resources(&self) -> &ResourceHand {
        &self.resources
    }

    /// Structures in the order they were built
    pub fn owned_structures(&self) -> &[Structure] {
        &self.owned_structures
    }

    /// Roads in the order they were built
    pub fn owned_roads(&self) -> &[Road] {
        &self.owned_roads
    }

    /// Copy of this player holding a different hand
    pub fn with_resources(&self, resources: ResourceHand) -> Player {
        Player {
            resources,
            ..self.clone()
        }
    }

    /// Copy of this player with one more structure
    pub fn with_added_structure(&self, structure: Structure) -> Player {
        let mut updated = self.clone();
        updated.owned_structures.push(structure);
        updated
    }

    /// Copy of this player with one more road
    pub fn with_added_road(&self, road: Road) -> Player {
        let mut updated = self.clone();
        updated.owned_roads.push(road);
        updated
    }

    /// Victory points from structures on the board
    pub fn victory_points(&self) -> u32 {
        self.owned_structures
            .iter()
            .map(|s| s.kind.victory_points())
            .sum()
    }
}
