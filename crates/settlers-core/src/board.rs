//! Game board representation including tiles, structures, roads and harbors.
//!
//! This module contains:
//! - Resource, tile, harbor and structure kinds
//! - The `Board` value with its occupancy rules
//! - The standard board factory
//! - JSON-friendly board snapshots
//!
//! A `Board` is never mutated in place. Placement returns a new board and the
//! previous one stays valid, so callers can keep every revision for undo or
//! replay. Tiles and harbors are shared between revisions. Each placement
//! copies the occupancy map it writes to, so older revisions keep theirs.

use crate::hex::{axial_spiral_coords, EdgeCoord, EdgeDirection, HexCoord, VertexCoord};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Resource kinds produced by tiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceKind {
    Brick,
    Lumber,
    Ore,
    Sheep,
    Wheat,
}

impl ResourceKind {
    /// All resource kinds
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::Brick,
        ResourceKind::Lumber,
        ResourceKind::Ore,
        ResourceKind::Sheep,
        ResourceKind::Wheat,
    ];
}

/// Terrain of a land tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// No production, never carries a number token
    Desert,
    Forest,
    Hills,
    Mountains,
    Fields,
    Pasture,
}

impl TileKind {
    /// Production of this terrain; the desert yields nothing
    pub fn resource(&self) -> Option<ResourceKind> {
        match self {
            TileKind::Desert => None,
            TileKind::Forest => Some(ResourceKind::Lumber),
            TileKind::Hills => Some(ResourceKind::Brick),
            TileKind::Mountains => Some(ResourceKind::Ore),
            TileKind::Fields => Some(ResourceKind::Wheat),
            TileKind::Pasture => Some(ResourceKind::Sheep),
        }
    }
}

/// Maritime trade offered at a harbor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HarborKind {
    /// Any resource at 3:1
    Generic,
    /// One named resource at 2:1
    Specific(ResourceKind),
}

impl HarborKind {
    /// Cards given per card received
    pub fn rate(&self) -> u32 {
        match self {
            HarborKind::Generic => 3,
            HarborKind::Specific(_) => 2,
        }
    }
}

/// A harbor on a coastal edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Harbor {
    /// Coastal side, canonical
    pub edge: EdgeCoord,
    /// Generic or resource-specific
    pub kind: HarborKind,
}

impl Harbor {
    pub fn new(edge: EdgeCoord, kind: HarborKind) -> Self {
        Self {
            edge: edge.canonical(),
            kind,
        }
    }
}

/// Errors raised by board construction and placement
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum BoardError {
    #[error("Vertex {0:?} is already occupied")]
    OccupiedVertex(VertexCoord),

    #[error("Edge {0:?} is already occupied")]
    OccupiedEdge(EdgeCoord),

    #[error("Structure at {structure:?} cannot be placed on vertex {vertex:?}")]
    StructureMismatch {
        vertex: VertexCoord,
        structure: VertexCoord,
    },

    #[error("Road on {road:?} cannot be placed on edge {edge:?}")]
    RoadMismatch { edge: EdgeCoord, road: EdgeCoord },

    #[error("Tile at {0:?} needs a number token")]
    MissingNumberToken(HexCoord),

    #[error("Desert tile at {0:?} cannot carry a number token")]
    UnexpectedNumberToken(HexCoord),

    #[error("Invalid number token {0}")]
    InvalidNumberToken(u8),

    #[error("More than one tile at {0:?}")]
    DuplicateTile(HexCoord),
}

/// A single hex tile on the board.
///
/// Desert tiles never carry a number token and every other tile always does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HexTile {
    coord: HexCoord,
    kind: TileKind,
    number_token: Option<u8>,
}

impl HexTile {
    /// Create a tile, checking the token against the tile kind
    pub fn new(
        coord: HexCoord,
        kind: TileKind,
        number_token: Option<u8>,
    ) -> Result<Self, BoardError> {
        let tile = Self {
            coord,
            kind,
            number_token,
        };
        tile.validate()?;
        Ok(tile)
    }

    /// Tokenless desert at `coord`
    pub fn desert(coord: HexCoord) -> Self {
        Self {
            coord,
            kind: TileKind::Desert,
            number_token: None,
        }
    }

    fn validate(&self) -> Result<(), BoardError> {
        match (self.kind, self.number_token) {
            (TileKind::Desert, Some(_)) => Err(BoardError::UnexpectedNumberToken(self.coord)),
            (TileKind::Desert, None) => Ok(()),
            (_, None) => Err(BoardError::MissingNumberToken(self.coord)),
            (_, Some(n)) if !(2..=12).contains(&n) || n == 7 => {
                Err(BoardError::InvalidNumberToken(n))
            }
            (_, Some(_)) => Ok(()),
        }
    }

    pub fn coord(&self) -> HexCoord {
        self.coord
    }

    pub fn kind(&self) -> TileKind {
        self.kind
    }

    /// Dice number that triggers production (None only for the desert)
    pub fn number_token(&self) -> Option<u8> {
        self.number_token
    }

    pub fn resource(&self) -> Option<ResourceKind> {
        self.kind.resource()
    }
}

/// What can be built on a vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StructureKind {
    /// 1 VP
    Settlement,
    /// 2 VP
    City,
}

impl StructureKind {
    /// Victory points provided by this structure
    pub fn victory_points(&self) -> u32 {
        match self {
            StructureKind::Settlement => 1,
            StructureKind::City => 2,
        }
    }
}

/// A settlement or city standing on a vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Structure {
    pub vertex: VertexCoord,
    pub kind: StructureKind,
}

impl Structure {
    pub fn new(vertex: VertexCoord, kind: StructureKind) -> Self {
        Self {
            vertex: vertex.canonical(),
            kind,
        }
    }

    pub fn settlement(vertex: VertexCoord) -> Self {
        Self::new(vertex, StructureKind::Settlement)
    }

    pub fn city(vertex: VertexCoord) -> Self {
        Self::new(vertex, StructureKind::City)
    }
}

/// A road on an edge. Ownership lives in the player ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Road {
    pub edge: EdgeCoord,
}

impl Road {
    pub fn new(edge: EdgeCoord) -> Self {
        Self {
            edge: edge.canonical(),
        }
    }
}

/// Standard tile mix: 1 desert, 4 forest, 3 hills, 3 mountains, 4 fields, 4 pasture
const STANDARD_TILE_KINDS: [TileKind; 19] = [
    TileKind::Desert,
    TileKind::Forest,
    TileKind::Forest,
    TileKind::Forest,
    TileKind::Forest,
    TileKind::Hills,
    TileKind::Hills,
    TileKind::Hills,
    TileKind::Mountains,
    TileKind::Mountains,
    TileKind::Mountains,
    TileKind::Fields,
    TileKind::Fields,
    TileKind::Fields,
    TileKind::Fields,
    TileKind::Pasture,
    TileKind::Pasture,
    TileKind::Pasture,
    TileKind::Pasture,
];

/// One of each except 2 and 12, two of 3-6 and 8-11
const STANDARD_NUMBER_TOKENS: [u8; 18] =
    [2, 3, 3, 4, 4, 5, 5, 6, 6, 8, 8, 9, 9, 10, 10, 11, 11, 12];

/// Fixed harbor layout around the radius-2 island, clockwise from the top.
/// Each side faces the open sea.
const STANDARD_HARBORS: [(HexCoord, EdgeDirection, HarborKind); 9] = [
    (HexCoord::new(0, -2), EdgeDirection::NorthWest, HarborKind::Generic),
    (HexCoord::new(1, -2), EdgeDirection::NorthEast, HarborKind::Specific(ResourceKind::Lumber)),
    (HexCoord::new(2, -1), EdgeDirection::East, HarborKind::Generic),
    (HexCoord::new(2, 0), EdgeDirection::SouthEast, HarborKind::Specific(ResourceKind::Brick)),
    (HexCoord::new(0, 2), EdgeDirection::SouthEast, HarborKind::Generic),
    (HexCoord::new(-1, 2), EdgeDirection::SouthWest, HarborKind::Specific(ResourceKind::Ore)),
    (HexCoord::new(-2, 2), EdgeDirection::West, HarborKind::Generic),
    (HexCoord::new(-2, 0), EdgeDirection::West, HarborKind::Specific(ResourceKind::Wheat)),
    (HexCoord::new(-1, -1), EdgeDirection::NorthWest, HarborKind::Specific(ResourceKind::Sheep)),
];

/// Radius of the standard island
pub const STANDARD_RADIUS: u32 = 2;

/// The game board
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    /// Tiles in layout order
    tiles: Arc<[HexTile]>,
    /// Trade points along the coast
    harbors: Arc<[Harbor]>,
    /// Settlements and cities by vertex
    structures: Arc<HashMap<VertexCoord, Structure>>,
    /// Roads by edge
    roads: Arc<HashMap<EdgeCoord, Road>>,
}

impl Board {
    /// Create a board with the given layout and nothing built on it
    pub fn new(tiles: Vec<HexTile>, harbors: Vec<Harbor>) -> Result<Self, BoardError> {
        let mut seen = HashSet::new();
        for tile in &tiles {
            tile.validate()?;
            if !seen.insert(tile.coord) {
                return Err(BoardError::DuplicateTile(tile.coord));
            }
        }

        Ok(Self {
            tiles: tiles.into(),
            harbors: harbors.into(),
            structures: Arc::default(),
            roads: Arc::default(),
        })
    }

    /// Standard layout shuffled with the thread-local RNG
    pub fn standard() -> Self {
        create_initial_board(&mut rand::thread_rng())
    }

    /// Create the standard board layout with a provided RNG.
    ///
    /// Tile kinds and number tokens are shuffled independently; tokens are
    /// dealt to the non-desert tiles in layout order. Harbors are fixed.
    pub fn standard_with_rng<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let coords = axial_spiral_coords(STANDARD_RADIUS);

        let mut kinds = STANDARD_TILE_KINDS;
        kinds.shuffle(rng);

        let mut numbers = STANDARD_NUMBER_TOKENS;
        numbers.shuffle(rng);
        let mut numbers = numbers.into_iter();

        // Exactly one desert, so the 18 tokens cover the other 18 tiles
        let tiles: Vec<HexTile> = coords
            .into_iter()
            .zip(kinds)
            .map(|(coord, kind)| HexTile {
                coord,
                kind,
                number_token: match kind {
                    TileKind::Desert => None,
                    _ => numbers.next(),
                },
            })
            .collect();

        let harbors: Vec<Harbor> = STANDARD_HARBORS
            .iter()
            .map(|&(hex, dir, kind)| Harbor::new(EdgeCoord::new(hex, dir), kind))
            .collect();

        if let Some(desert) = tiles.iter().find(|t| t.kind == TileKind::Desert) {
            info!(desert = ?desert.coord, "Created standard board");
        }

        Self {
            tiles: tiles.into(),
            harbors: harbors.into(),
            structures: Arc::default(),
            roads: Arc::default(),
        }
    }

    // ==================== Query Methods ====================

    /// Tile at `coord`, if it is part of the island
    pub fn tile_at(&self, coord: HexCoord) -> Option<&HexTile> {
        self.tiles.iter().find(|t| t.coord == coord)
    }

    /// Get the structure on a vertex
    pub fn building_at(&self, vertex: VertexCoord) -> Option<&Structure> {
        self.structures.get(&vertex.canonical())
    }

    /// Get the road on an edge
    pub fn road_at(&self, edge: EdgeCoord) -> Option<&Road> {
        self.roads.get(&edge.canonical())
    }

    /// All tiles in layout order
    pub fn tiles(&self) -> &[HexTile] {
        &self.tiles
    }

    /// All harbors
    pub fn harbors(&self) -> &[Harbor] {
        &self.harbors
    }

    /// All placed structures, in no particular order
    pub fn structures(&self) -> impl Iterator<Item = &Structure> {
        self.structures.values()
    }

    /// All placed roads, in no particular order
    pub fn roads(&self) -> impl Iterator<Item = &Road> {
        self.roads.values()
    }

    /// Island tiles meeting at a corner (fewer than 3 on the coast)
    pub fn tiles_at_vertex(&self, vertex: &VertexCoord) -> Vec<&HexTile> {
        vertex
            .touching_hexes()
            .iter()
            .filter_map(|h| self.tile_at(*h))
            .collect()
    }

    /// Get harbors reachable from a vertex
    pub fn harbors_at_vertex(&self, vertex: &VertexCoord) -> Vec<&Harbor> {
        let vertex = vertex.canonical();
        self.harbors
            .iter()
            .filter(|h| h.edge.endpoints().contains(&vertex))
            .collect()
    }

    /// Check if a vertex satisfies the distance rule (no adjacent structures).
    ///
    /// Placement does not enforce this; turn validation calls it first.
    pub fn satisfies_distance_rule(&self, vertex: &VertexCoord) -> bool {
        vertex
            .canonical()
            .adjacent_vertices()
            .iter()
            .all(|adj| self.building_at(*adj).is_none())
    }

    // ==================== Placement Methods ====================

    /// Place a settlement or city on an empty vertex.
    ///
    /// Only occupancy is checked here. On failure `self` is untouched.
    pub fn place_building(
        &self,
        vertex: VertexCoord,
        structure: Structure,
    ) -> Result<Board, BoardError> {
        let vertex = vertex.canonical();
        let structure = Structure::new(structure.vertex, structure.kind);
        if structure.vertex != vertex {
            return Err(BoardError::StructureMismatch {
                vertex,
                structure: structure.vertex,
            });
        }
        if self.structures.contains_key(&vertex) {
            warn!(?vertex, "Vertex already occupied");
            return Err(BoardError::OccupiedVertex(vertex));
        }

        let mut next = self.clone();
        Arc::make_mut(&mut next.structures).insert(vertex, structure);
        debug!(?vertex, kind = ?structure.kind, "Placed structure");
        Ok(next)
    }

    /// Place a road on an empty edge.
    ///
    /// Connectivity to the owner's network is the caller's concern.
    pub fn place_road(&self, edge: EdgeCoord, road: Road) -> Result<Board, BoardError> {
        let edge = edge.canonical();
        let road = Road::new(road.edge);
        if road.edge != edge {
            return Err(BoardError::RoadMismatch {
                edge,
                road: road.edge,
            });
        }
        if self.roads.contains_key(&edge) {
            warn!(?edge, "Edge already occupied");
            return Err(BoardError::OccupiedEdge(edge));
        }

        let mut next = self.clone();
        Arc::make_mut(&mut next.roads).insert(edge, road);
        debug!(?edge, "Placed road");
        Ok(next)
    }

    /// Move the robber.
    ///
    /// The robber's position is not part of board state, so this returns an
    /// equal board. A robber-tracking layer wraps the board to give it meaning.
    pub fn move_robber(&self, hex: HexCoord) -> Board {
        debug!(?hex, "Robber move requested; board carries no robber state");
        self.clone()
    }

    // ==================== Snapshots ====================

    /// Flatten into plain vectors, sorted by coordinate, so the result
    /// serializes to JSON (which cannot key maps by structs)
    pub fn to_snapshot(&self) -> BoardSnapshot {
        let mut structures: Vec<Structure> = self.structures.values().copied().collect();
        structures.sort_by_key(|s| (s.vertex.hex.q, s.vertex.hex.r, s.vertex.direction));
        let mut roads: Vec<Road> = self.roads.values().copied().collect();
        roads.sort_by_key(|r| (r.edge.hex.q, r.edge.hex.r, r.edge.direction));

        BoardSnapshot {
            tiles: self.tiles.to_vec(),
            harbors: self.harbors.to_vec(),
            structures,
            roads,
        }
    }

    /// Rebuild a board from a snapshot, re-checking every invariant
    pub fn from_snapshot(snapshot: BoardSnapshot) -> Result<Self, BoardError> {
        let harbors = snapshot
            .harbors
            .into_iter()
            .map(|h| Harbor::new(h.edge, h.kind))
            .collect();
        let mut board = Self::new(snapshot.tiles, harbors)?;
        for structure in snapshot.structures {
            board = board.place_building(structure.vertex, structure)?;
        }
        for road in snapshot.roads {
            board = board.place_road(road.edge, road)?;
        }
        Ok(board)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self {
            tiles: Arc::from(Vec::new()),
            harbors: Arc::from(Vec::new()),
            structures: Arc::default(),
            roads: Arc::default(),
        }
    }
}

/// Build the standard starting board from an injected random source
pub fn create_initial_board<R: Rng + ?Sized>(rng: &mut R) -> Board {
    Board::standard_with_rng(rng)
}

/// Serializable form of a [`Board`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub tiles: Vec<HexTile>,
    pub harbors: Vec<Harbor>,
    pub structures: Vec<Structure>,
    pub roads: Vec<Road>,
}
