use std::fmt;

use serde::{Deserialize, Serialize};

use crate::math::Vec3;

/// Integer block coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockPos {
    /// East/west block index.
    pub x: i32,
    /// Vertical block index.
    pub y: i32,
    /// North/south block index.
    pub z: i32,
}

impl BlockPos {
    /// Create a block position.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The block containing a world-space point.
    pub fn containing(point: Vec3) -> Self {
        Self::new(
            point.x.floor() as i32,
            point.y.floor() as i32,
            point.z.floor() as i32,
        )
    }

    /// The position shifted by whole blocks.
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// The horizontal neighbour in the direction of `direction`.
    ///
    /// Each horizontal component is rounded to -1, 0, or 1, so diagonal
    /// directions select the diagonal neighbour. A zero direction yields
    /// `self`.
    pub fn step_towards(self, direction: Vec3) -> Self {
        let flat = direction.horizontal().normalize_or_zero();
        self.offset(flat.x.round() as i32, 0, flat.z.round() as i32)
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// The type of block occupying a position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Block {
    /// Empty space.
    #[default]
    Air,
    /// A bounce surface: inverts fast falls into an upward impulse.
    Slime,
    /// Any other block, by host type id.
    Other(String),
}

impl Block {
    /// Host type id for slime blocks.
    pub const SLIME_ID: &'static str = "minecraft:slime";
    /// Host type id for air.
    pub const AIR_ID: &'static str = "minecraft:air";

    /// Classify a host block type id.
    pub fn from_type_id(type_id: &str) -> Self {
        match type_id {
            Self::AIR_ID | "air" => Self::Air,
            Self::SLIME_ID | "slime" => Self::Slime,
            other => Self::Other(other.to_string()),
        }
    }

    /// Return `true` for empty space.
    pub fn is_air(&self) -> bool {
        matches!(self, Self::Air)
    }

    /// Return `true` for blocks that bounce falling entities.
    pub fn is_bounce_surface(&self) -> bool {
        matches!(self, Self::Slime)
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Air => write!(f, "{}", Self::AIR_ID),
            Self::Slime => write!(f, "{}", Self::SLIME_ID),
            Self::Other(type_id) => write!(f, "{type_id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containing_floors_negative_coordinates() {
        let pos = BlockPos::containing(Vec3::new(-0.5, 64.99, 3.2));
        assert_eq!(pos, BlockPos::new(-1, 64, 3));
    }

    #[test]
    fn step_towards_rounds_direction() {
        let origin = BlockPos::new(0, 10, 0);
        assert_eq!(origin.step_towards(Vec3::new(0.0, -1.0, 1.0)), BlockPos::new(0, 10, 1));
        assert_eq!(origin.step_towards(Vec3::new(-1.0, 0.0, 1.0)), BlockPos::new(-1, 10, 1));
        assert_eq!(origin.step_towards(Vec3::ZERO), origin);
    }

    #[test]
    fn classify_type_ids() {
        assert!(Block::from_type_id("minecraft:air").is_air());
        assert!(Block::from_type_id("minecraft:slime").is_bounce_surface());
        let stone = Block::from_type_id("minecraft:stone");
        assert!(!stone.is_air());
        assert!(!stone.is_bounce_surface());
        assert_eq!(stone.to_string(), "minecraft:stone");
    }
}
