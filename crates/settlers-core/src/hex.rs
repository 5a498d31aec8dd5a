//! Axial hex coordinates plus the corner and side addressing built on them.
//!
//! - `HexCoord` names a tile
//! - `VertexCoord` names a corner (settlements, cities)
//! - `EdgeCoord` names a side (roads)
//!
//! Hexes are pointy-top. A corner is shared by three hexes and a side by two, so
//! the same physical vertex or edge can be named from several (hex, direction)
//! pairs. `VertexCoord::new` and `EdgeCoord::new` always return the canonical
//! pair: the one whose hex has the smallest `(q, r)`.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Corner of a pointy-top hex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VertexDirection {
    /// Top corner
    North,
    NorthEast,
    SouthEast,
    /// Bottom corner
    South,
    SouthWest,
    NorthWest,
}

impl VertexDirection {
    /// All corners in clockwise order starting from North
    pub const ALL: [VertexDirection; 6] = [
        VertexDirection::North,
        VertexDirection::NorthEast,
        VertexDirection::SouthEast,
        VertexDirection::South,
        VertexDirection::SouthWest,
        VertexDirection::NorthWest,
    ];

    fn index(self) -> usize {
        match self {
            VertexDirection::North => 0,
            VertexDirection::NorthEast => 1,
            VertexDirection::SouthEast => 2,
            VertexDirection::South => 3,
            VertexDirection::SouthWest => 4,
            VertexDirection::NorthWest => 5,
        }
    }

    fn from_index(index: usize) -> Self {
        Self::ALL[index % 6]
    }

    /// The two sides of the same hex that meet at this corner,
    /// counter-clockwise side first.
    pub fn flanking_edges(self) -> [EdgeDirection; 2] {
        let i = self.index();
        [EdgeDirection::from_index(i + 5), EdgeDirection::from_index(i)]
    }
}

/// Side of a pointy-top hex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EdgeDirection {
    NorthEast,
    East,
    SouthEast,
    SouthWest,
    West,
    NorthWest,
}

impl EdgeDirection {
    /// All sides, clockwise from NorthEast
    pub const ALL: [EdgeDirection; 6] = [
        EdgeDirection::NorthEast,
        EdgeDirection::East,
        EdgeDirection::SouthEast,
        EdgeDirection::SouthWest,
        EdgeDirection::West,
        EdgeDirection::NorthWest,
    ];

    fn index(self) -> usize {
        match self {
            EdgeDirection::NorthEast => 0,
            EdgeDirection::East => 1,
            EdgeDirection::SouthEast => 2,
            EdgeDirection::SouthWest => 3,
            EdgeDirection::West => 4,
            EdgeDirection::NorthWest => 5,
        }
    }

    fn from_index(index: usize) -> Self {
        Self::ALL[index % 6]
    }

    /// The side facing the other way
    pub fn opposite(self) -> Self {
        Self::from_index(self.index() + 3)
    }

    /// The two corners at the ends of this side, clockwise order
    pub fn corners(self) -> [VertexDirection; 2] {
        let i = self.index();
        [VertexDirection::from_index(i), VertexDirection::from_index(i + 1)]
    }
}

/// Position of a tile on an unbounded axial grid.
///
/// `q` grows eastward and `r` grows toward the south-east. The cube coordinate
/// `s` is derived so that `q + r + s == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct HexCoord {
    pub q: i32,
    pub r: i32,
}

impl HexCoord {
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Cube coordinate, always `-q - r`
    pub const fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// Rings away from the origin
    pub fn radius(&self) -> u32 {
        self.q.unsigned_abs().max(self.r.unsigned_abs()).max(self.s().unsigned_abs())
    }

    /// The six neighboring hexes in clockwise order starting from NorthEast
    pub fn neighbors(&self) -> [HexCoord; 6] {
        EdgeDirection::ALL.map(|dir| self.neighbor(dir))
    }

    /// Get the neighbor across a specific side
    pub fn neighbor(&self, direction: EdgeDirection) -> HexCoord {
        match direction {
            EdgeDirection::East => HexCoord::new(self.q + 1, self.r),
            EdgeDirection::NorthEast => HexCoord::new(self.q + 1, self.r - 1),
            EdgeDirection::NorthWest => HexCoord::new(self.q, self.r - 1),
            EdgeDirection::West => HexCoord::new(self.q - 1, self.r),
            EdgeDirection::SouthWest => HexCoord::new(self.q - 1, self.r + 1),
            EdgeDirection::SouthEast => HexCoord::new(self.q, self.r + 1),
        }
    }

    /// Number of steps between two tiles
    pub fn distance_to(&self, other: &HexCoord) -> u32 {
        let dq = (self.q - other.q).unsigned_abs();
        let dr = (self.r - other.r).unsigned_abs();
        let ds = (self.s() - other.s()).unsigned_abs();
        (dq + dr + ds) / 2
    }

    /// Corners of this tile in canonical form, clockwise from North
    pub fn vertices(&self) -> [VertexCoord; 6] {
        VertexDirection::ALL.map(|dir| VertexCoord::new(*self, dir))
    }

    /// Sides of this tile in canonical form, clockwise from NorthEast
    pub fn edges(&self) -> [EdgeCoord; 6] {
        EdgeDirection::ALL.map(|dir| EdgeCoord::new(*self, dir))
    }

    fn sort_key(&self) -> (i32, i32) {
        (self.q, self.r)
    }
}

/// Every hex within `radius` of the origin, ordered by `q` then `r`.
///
/// Radius 2 gives the 19 land hexes of the standard board.
pub fn axial_spiral_coords(radius: u32) -> Vec<HexCoord> {
    let radius = radius as i32;
    let mut coords = Vec::new();
    for q in -radius..=radius {
        let r_min = (-radius).max(-q - radius);
        let r_max = radius.min(-q + radius);
        for r in r_min..=r_max {
            coords.push(HexCoord::new(q, r));
        }
    }
    coords
}

/// A corner shared by three tiles. Settlements and cities sit here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VertexCoord {
    pub hex: HexCoord,
    pub direction: VertexDirection,
}

impl VertexCoord {
    /// Name a corner; the result is always canonical
    pub fn new(hex: HexCoord, direction: VertexDirection) -> Self {
        Self { hex, direction }.canonical()
    }

    /// Rename this corner from the touching tile with the smallest `(q, r)`
    pub fn canonical(self) -> Self {
        self.representations()
            .into_iter()
            .min_by_key(|v| v.hex.sort_key())
            .unwrap_or(self)
    }

    /// The 3 ways of naming this corner, starting with `self`.
    ///
    /// Crossing the counter-clockwise flanking side turns corner `i` into corner
    /// `i + 2` of the neighbor; crossing the clockwise side turns it into `i + 4`.
    pub fn representations(&self) -> [VertexCoord; 3] {
        let i = self.direction.index();
        let [ccw_side, cw_side] = self.direction.flanking_edges();
        [
            *self,
            Self {
                hex: self.hex.neighbor(ccw_side),
                direction: VertexDirection::from_index(i + 2),
            },
            Self {
                hex: self.hex.neighbor(cw_side),
                direction: VertexDirection::from_index(i + 4),
            },
        ]
    }

    /// Tiles meeting at this corner
    pub fn touching_hexes(&self) -> [HexCoord; 3] {
        self.representations().map(|v| v.hex)
    }

    /// Sides that end at this corner
    pub fn touching_edges(&self) -> [EdgeCoord; 3] {
        let [ccw_side, cw_side] = self.direction.flanking_edges();
        // The third side separates the two neighbors and points two steps
        // clockwise from the counter-clockwise flank.
        let between = EdgeDirection::from_index(ccw_side.index() + 2);
        [
            EdgeCoord::new(self.hex, ccw_side),
            EdgeCoord::new(self.hex, cw_side),
            EdgeCoord::new(self.hex.neighbor(ccw_side), between),
        ]
    }

    /// Corners one side away, as used by the distance rule
    pub fn adjacent_vertices(&self) -> [VertexCoord; 3] {
        let this = self.canonical();
        this.touching_edges().map(|edge| {
            let [a, b] = edge.endpoints();
            if a == this {
                b
            } else {
                a
            }
        })
    }
}

/// A side shared by two tiles. Roads sit here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeCoord {
    pub hex: HexCoord,
    pub direction: EdgeDirection,
}

impl EdgeCoord {
    /// Name a side; the result is always canonical
    pub fn new(hex: HexCoord, direction: EdgeDirection) -> Self {
        Self { hex, direction }.canonical()
    }

    /// Rename this side from whichever of its two tiles has the smaller `(q, r)`
    pub fn canonical(self) -> Self {
        let other = self.other_representation();
        if self.hex.sort_key() <= other.hex.sort_key() {
            self
        } else {
            other
        }
    }

    /// Same side, named from the tile across it
    fn other_representation(&self) -> Self {
        Self {
            hex: self.hex.neighbor(self.direction),
            direction: self.direction.opposite(),
        }
    }

    /// The tile on each side
    pub fn touching_hexes(&self) -> [HexCoord; 2] {
        [self.hex, self.hex.neighbor(self.direction)]
    }

    /// Corners at either end, clockwise
    pub fn endpoints(&self) -> [VertexCoord; 2] {
        self.direction
            .corners()
            .map(|corner| VertexCoord::new(self.hex, corner))
    }

    /// Sides sharing a corner with this one, as road networks grow
    pub fn adjacent_edges(&self) -> Vec<EdgeCoord> {
        let mut seen = HashSet::new();
        self.endpoints()
            .iter()
            .flat_map(VertexCoord::touching_edges)
            .filter(|edge| edge != self && seen.insert(*edge))
            .collect()
    }
}
